//! One-dimensional world and robot
//!
//! The sensor only sees these through the `World` and `Robot` traits:
//! "is this location in front of a door?" and "where is the robot?".
//! `WorldState` and `RobotState` are the concrete versions used by the CLI
//! self-test.
//!
//! Locations are normalized to [0, 1]. The world is divided into `n_bins`
//! equal bins and `door_width` is measured in bins, so a door centered at `d`
//! covers `[d - w / 2n, d + w / 2n]`.

use crate::infra::error::{SensorError, SensorResult};
use rand::Rng;

/// Number of rejection-sampling draws before giving up on a door-free location
const MAX_PLACEMENT_ATTEMPTS: usize = 1000;

/// World collaborator consumed by the sensor
pub trait World {
    /// Door center locations, in order
    fn doors(&self) -> &[f64];

    /// Door width in bins
    fn door_width(&self) -> f64;

    /// Number of discretization bins
    fn n_bins(&self) -> usize;

    /// Ground-truth occupancy query
    fn is_in_front_of_door(&self, location: f64) -> bool;

    fn door_count(&self) -> usize {
        self.doors().len()
    }
}

/// Robot collaborator consumed by the sensor
pub trait Robot {
    fn robot_loc(&self) -> f64;
}

/// Doors on a unit-length line
#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    doors: Vec<f64>,
    door_width: f64,
    n_bins: usize,
}

impl Default for WorldState {
    fn default() -> Self {
        Self { doors: vec![0.15, 0.45, 0.8], door_width: 1.0, n_bins: 20 }
    }
}

impl WorldState {
    /// Build a world, rejecting zero bins, negative widths and off-line doors
    pub fn new(doors: Vec<f64>, door_width: f64, n_bins: usize) -> SensorResult<Self> {
        if n_bins == 0 {
            return Err(SensorError::invalid("n_bins", 0.0, "must be positive"));
        }
        if !door_width.is_finite() || door_width < 0.0 {
            return Err(SensorError::invalid("door_width", door_width, "must be finite and >= 0"));
        }
        if let Some(&bad) = doors.iter().find(|d| !(0.0..=1.0).contains(*d)) {
            return Err(SensorError::invalid("door", bad, "location must lie in [0, 1]"));
        }
        Ok(Self { doors, door_width, n_bins })
    }

    /// Half the width of a door in normalized units
    pub fn half_span(&self) -> f64 {
        self.door_width / (2.0 * self.n_bins as f64)
    }

    /// Pick a location inside the span of a random door
    ///
    /// Returns None when the world has no doors.
    pub fn place_robot_in_front_of_door<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<f64> {
        if self.doors.is_empty() {
            return None;
        }
        let door = self.doors[rng.gen_range(0..self.doors.len())];
        let half = self.half_span();
        let offset = if half > 0.0 { rng.gen_range(-half..half) } else { 0.0 };
        Some((door + offset).clamp(0.0, 1.0))
    }

    /// Pick a location not covered by any door
    ///
    /// Returns None when no free location is found (doors cover the line).
    pub fn place_robot_not_in_front_of_door<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<f64> {
        (0..MAX_PLACEMENT_ATTEMPTS)
            .map(|_| rng.gen::<f64>())
            .find(|&loc| !self.is_in_front_of_door(loc))
    }
}

impl World for WorldState {
    fn doors(&self) -> &[f64] {
        &self.doors
    }

    fn door_width(&self) -> f64 {
        self.door_width
    }

    fn n_bins(&self) -> usize {
        self.n_bins
    }

    fn is_in_front_of_door(&self, location: f64) -> bool {
        let half = self.half_span();
        self.doors.iter().any(|&d| (location - d).abs() <= half)
    }
}

/// Robot position on the line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotState {
    pub robot_loc: f64,
}

impl Default for RobotState {
    fn default() -> Self {
        Self { robot_loc: 0.5 }
    }
}

impl RobotState {
    pub fn at(robot_loc: f64) -> Self {
        Self { robot_loc }
    }
}

impl Robot for RobotState {
    fn robot_loc(&self) -> f64 {
        self.robot_loc
    }
}
