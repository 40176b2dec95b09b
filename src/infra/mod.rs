//! Infrastructure - configuration, errors, and metrics
//!
//! - `config` - Application configuration (TOML loading, defaults)
//! - `error` - Sensor error taxonomy
//! - `metrics` - Lock-free reading counters

pub mod config;
pub mod error;
pub mod metrics;

// Re-export commonly used types
pub use config::Config;
pub use error::{SensorError, SensorResult};
pub use metrics::{Metrics, MetricsSummary};
