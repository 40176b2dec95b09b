//! Error types for the door sensor

use thiserror::Error;

/// Failure of a sensor configuration or inference call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    /// A rate outside [0,1], a non-positive bin count, or malformed world geometry
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter { name: &'static str, value: f64, reason: &'static str },

    /// Both terms of the Bayes denominator are zero
    #[error(
        "posterior undefined: P(obs|door)={given_door}, P(obs|no door)={given_no_door}, prior={prior_door}"
    )]
    DivisionUndefined { given_door: f64, given_no_door: f64, prior_door: f64 },
}

impl SensorError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        SensorError::InvalidParameter { name, value, reason }
    }
}

pub type SensorResult<T> = std::result::Result<T, SensorError>;

/// Check that a probability lies in [0,1] (NaN is rejected)
pub fn ensure_probability(name: &'static str, value: f64) -> SensorResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(SensorError::invalid(name, value, "must lie in [0, 1]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_probability_bounds() {
        assert_eq!(ensure_probability("p", 0.0), Ok(0.0));
        assert_eq!(ensure_probability("p", 1.0), Ok(1.0));
        assert!(ensure_probability("p", -0.01).is_err());
        assert!(ensure_probability("p", 1.01).is_err());
        assert!(ensure_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = SensorError::invalid("n_bins", 0.0, "must be positive");
        assert_eq!(err.to_string(), "invalid parameter n_bins = 0: must be positive");
    }
}
