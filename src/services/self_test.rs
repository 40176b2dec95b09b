//! Statistical self-test of the sensor model
//!
//! Places the robot away from and then in front of a door, samples many
//! readings at each spot, and checks that the fraction of detect readings
//! reproduces the configured detection rate within a tolerance.

use crate::domain::world::{Robot, RobotState, World, WorldState};
use crate::infra::error::SensorResult;
use crate::services::door_sensor::{is_in_front_of_door, DoorSensor};
use anyhow::{bail, Context};
use rand::Rng;
use tracing::{info, warn};

/// Outcome of comparing one measured detection rate against its expectation
#[derive(Debug, Clone, PartialEq)]
pub struct RateCheck {
    pub at_door: bool,
    pub expected: f64,
    pub observed: f64,
    pub samples: u64,
    pub tolerance: f64,
}

impl RateCheck {
    pub fn error(&self) -> f64 {
        (self.observed - self.expected).abs()
    }

    pub fn passed(&self) -> bool {
        self.error() <= self.tolerance
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelfTestReport {
    pub away_from_door: RateCheck,
    pub in_front_of_door: RateCheck,
}

/// Fraction of `samples` readings that report a door
pub fn measure_detection_rate<W, R, G>(
    sensor: &DoorSensor,
    world: &W,
    robot: &R,
    rng: &mut G,
    samples: u64,
) -> SensorResult<f64>
where
    W: World + ?Sized,
    R: Robot + ?Sized,
    G: Rng + ?Sized,
{
    if samples == 0 {
        return Ok(0.0);
    }
    let mut detections = 0u64;
    for _ in 0..samples {
        if sensor.sample_reading(world, robot, rng)?.observation.is_detect() {
            detections += 1;
        }
    }
    Ok(detections as f64 / samples as f64)
}

/// Run both placement checks, failing on the first mismatch
///
/// Leaves `robot` at the in-front-of-door location.
pub fn run_self_test<G: Rng + ?Sized>(
    sensor: &DoorSensor,
    world: &WorldState,
    robot: &mut RobotState,
    rng: &mut G,
    samples: u64,
    tolerance: f64,
) -> anyhow::Result<SelfTestReport> {
    if samples == 0 {
        bail!("self-test needs at least one sample");
    }
    let rates = sensor.rates();

    info!("self_test_away_from_door");
    robot.robot_loc = world
        .place_robot_not_in_front_of_door(rng)
        .context("no location clear of doors in this world")?;
    if is_in_front_of_door(world, &*robot) {
        bail!("the robot should NOT be in front of a door (loc={})", robot.robot_loc);
    }
    let expected = rates.p_detect_given_no_door();
    let away_from_door = check_rate(sensor, world, robot, rng, samples, tolerance, expected, false)?;

    info!("self_test_in_front_of_door");
    robot.robot_loc =
        world.place_robot_in_front_of_door(rng).context("world has no doors to stand at")?;
    if !is_in_front_of_door(world, &*robot) {
        bail!("the robot SHOULD be in front of a door (loc={})", robot.robot_loc);
    }
    let expected = rates.p_detect_given_door();
    let in_front_of_door = check_rate(sensor, world, robot, rng, samples, tolerance, expected, true)?;

    info!(
        away_rate = %format!("{:.3}", away_from_door.observed),
        door_rate = %format!("{:.3}", in_front_of_door.observed),
        samples = %samples,
        "self_test_passed"
    );
    Ok(SelfTestReport { away_from_door, in_front_of_door })
}

#[allow(clippy::too_many_arguments)]
fn check_rate<G: Rng + ?Sized>(
    sensor: &DoorSensor,
    world: &WorldState,
    robot: &RobotState,
    rng: &mut G,
    samples: u64,
    tolerance: f64,
    expected: f64,
    at_door: bool,
) -> anyhow::Result<RateCheck> {
    let observed = measure_detection_rate(sensor, world, robot, rng, samples)
        .context("sampling failed during self-test")?;
    let check = RateCheck { at_door, expected, observed, samples, tolerance };

    if !check.passed() {
        warn!(
            at_door = %at_door,
            expected = %expected,
            observed = %observed,
            tolerance = %tolerance,
            "self_test_rate_mismatch"
        );
        bail!("probability should be close to {expected}, is {observed}");
    }
    Ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::door_sensor::DetectionRates;
    use crate::services::rng::sensor_rng;

    #[test]
    fn test_self_test_passes_with_defaults() {
        let sensor = DoorSensor::new();
        let world = WorldState::default();
        let mut robot = RobotState::default();
        let mut rng = sensor_rng(42);

        let report = run_self_test(&sensor, &world, &mut robot, &mut rng, 1000, 0.1).unwrap();

        assert!(report.away_from_door.passed());
        assert!(!report.away_from_door.at_door);
        assert_eq!(report.away_from_door.expected, 0.2);
        assert!(report.in_front_of_door.passed());
        assert_eq!(report.in_front_of_door.expected, 0.8);
        assert!(world.is_in_front_of_door(robot.robot_loc));
    }

    #[test]
    fn test_self_test_passes_after_reconfiguration() {
        let sensor = DoorSensor::new();
        sensor.set_probabilities(0.95, 0.05).unwrap();
        let mut rng = sensor_rng(8);

        let report = run_self_test(
            &sensor,
            &WorldState::default(),
            &mut RobotState::default(),
            &mut rng,
            1000,
            0.1,
        )
        .unwrap();
        assert_eq!(report.in_front_of_door.expected, 0.95);
        assert_eq!(report.away_from_door.expected, 0.05);
    }

    #[test]
    fn test_self_test_fails_without_doors() {
        let sensor = DoorSensor::new();
        let world = WorldState::new(vec![], 1.0, 10).unwrap();
        let mut rng = sensor_rng(3);

        let err = run_self_test(&sensor, &world, &mut RobotState::default(), &mut rng, 1000, 0.1)
            .unwrap_err();
        assert!(err.to_string().contains("no doors"));
    }

    #[test]
    fn test_self_test_rejects_zero_samples() {
        let sensor = DoorSensor::new();
        let mut rng = sensor_rng(3);
        assert!(run_self_test(
            &sensor,
            &WorldState::default(),
            &mut RobotState::default(),
            &mut rng,
            0,
            0.1
        )
        .is_err());
    }

    #[test]
    fn test_measure_detection_rate() {
        let sensor = DoorSensor::with_rates(DetectionRates::new(1.0, 0.0).unwrap());
        let world = WorldState::default();
        let mut rng = sensor_rng(4);

        let rate = measure_detection_rate(&sensor, &world, &RobotState::at(0.45), &mut rng, 50);
        assert_eq!(rate.unwrap(), 1.0);
        let rate = measure_detection_rate(&sensor, &world, &RobotState::at(0.3), &mut rng, 50);
        assert_eq!(rate.unwrap(), 0.0);
        let rate = measure_detection_rate(&sensor, &world, &RobotState::at(0.3), &mut rng, 0);
        assert_eq!(rate.unwrap(), 0.0);
    }

    #[test]
    fn test_rate_check_tolerance() {
        let check =
            RateCheck { at_door: true, expected: 0.8, observed: 0.75, samples: 1000, tolerance: 0.1 };
        assert!(check.passed());
        let check = RateCheck { observed: 0.65, ..check };
        assert!(!check.passed());
    }
}
