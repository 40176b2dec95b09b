//! Services - the sensor model and what drives it
//!
//! - `door_sensor` - Confusion-matrix sampling and Bayesian posterior
//! - `rng` - Seeded random source construction
//! - `self_test` - Statistical check of the configured detection rates

pub mod door_sensor;
pub mod rng;
pub mod self_test;

// Re-export commonly used types
pub use door_sensor::{is_in_front_of_door, DetectionRates, DoorSensor};
pub use self_test::{run_self_test, RateCheck, SelfTestReport};
