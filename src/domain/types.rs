//! Shared value types for sensor readings

use serde::{Deserialize, Serialize};

/// Binary output of the door sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observation {
    Detect,
    NoDetect,
}

impl Observation {
    pub fn is_detect(self) -> bool {
        self == Observation::Detect
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Observation::Detect => "detect",
            Observation::NoDetect => "no_detect",
        }
    }
}

impl From<bool> for Observation {
    fn from(detect: bool) -> Self {
        if detect {
            Observation::Detect
        } else {
            Observation::NoDetect
        }
    }
}

impl From<Observation> for bool {
    fn from(obs: Observation) -> Self {
        obs.is_detect()
    }
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How conditional likelihoods are chosen for a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikelihoodMode {
    /// P(obs|door) and P(obs|no door) depend only on the observation
    #[default]
    Observation,
    /// Legacy 2x2 table keyed by (ground truth, observation)
    ///
    /// Away from a door the likelihoods depend on the hidden ground truth, so
    /// an uninformative sensor (equal detection rates) no longer leaves the
    /// posterior equal to the prior there. Only at a door do both modes agree.
    GroundTruth,
}

/// Conditional likelihoods of one observation under each hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Likelihoods {
    /// P(observation | door)
    pub given_door: f64,
    /// P(observation | no door)
    pub given_no_door: f64,
}

/// Result of a single one-shot inference
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorReading {
    /// Whether the robot actually stands in front of a door
    pub ground_truth: bool,
    pub observation: Observation,
    /// Geometric prior P(door)
    pub prior_door: f64,
    /// P(door | observation)
    pub posterior_door: f64,
    /// P(no door | observation)
    pub posterior_no_door: f64,
}

impl SensorReading {
    /// (observation, posterior_door, posterior_no_door)
    pub fn as_tuple(&self) -> (bool, f64, f64) {
        (self.observation.is_detect(), self.posterior_door, self.posterior_no_door)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_bool_conversion() {
        assert_eq!(Observation::from(true), Observation::Detect);
        assert_eq!(Observation::from(false), Observation::NoDetect);
        assert!(bool::from(Observation::Detect));
        assert!(!bool::from(Observation::NoDetect));
    }

    #[test]
    fn test_reading_serializes_snake_case() {
        let reading = SensorReading {
            ground_truth: true,
            observation: Observation::NoDetect,
            prior_door: 0.1,
            posterior_door: 0.25,
            posterior_no_door: 0.75,
        };
        let json = serde_json::to_string(&reading).unwrap();
        assert!(json.contains("\"observation\":\"no_detect\""));
        assert!(json.contains("\"ground_truth\":true"));
        assert_eq!(reading.as_tuple(), (false, 0.25, 0.75));
    }

    #[test]
    fn test_likelihood_mode_default() {
        assert_eq!(LikelihoodMode::default(), LikelihoodMode::Observation);
    }
}
