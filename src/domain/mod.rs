//! Domain models - readings and the world/robot collaborators
//!
//! - `types` - `Observation`, `SensorReading`, `Likelihoods`, `LikelihoodMode`
//! - `world` - `World` / `Robot` traits and the concrete `WorldState` / `RobotState`

pub mod types;
pub mod world;

// Re-export commonly used types at module level
pub use types::{Likelihoods, LikelihoodMode, Observation, SensorReading};
pub use world::{Robot, RobotState, World, WorldState};
