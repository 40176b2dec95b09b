//! Lock-free reading counters and summary reporting
//!
//! NOTE: All atomics use Relaxed ordering intentionally. These are statistical
//! counters only and must not be used for coordination.

use crate::domain::types::SensorReading;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Posterior sums are stored in millionths to stay in integer atomics
const POSTERIOR_SCALE: f64 = 1_000_000.0;

/// Counters for sampled readings, split by ground truth
#[derive(Debug, Default)]
pub struct Metrics {
    readings_at_door: AtomicU64,
    detections_at_door: AtomicU64,
    readings_away: AtomicU64,
    detections_away: AtomicU64,
    posterior_door_sum_micro: AtomicU64,
    inference_errors: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful inference
    pub fn record_reading(&self, reading: &SensorReading) {
        let (readings, detections) = if reading.ground_truth {
            (&self.readings_at_door, &self.detections_at_door)
        } else {
            (&self.readings_away, &self.detections_away)
        };
        readings.fetch_add(1, Ordering::Relaxed);
        if reading.observation.is_detect() {
            detections.fetch_add(1, Ordering::Relaxed);
        }
        let micro = (reading.posterior_door * POSTERIOR_SCALE).round() as u64;
        self.posterior_door_sum_micro.fetch_add(micro, Ordering::Relaxed);
    }

    /// Record a failed inference (invalid parameter or undefined posterior)
    pub fn record_error(&self) {
        self.inference_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn readings_total(&self) -> u64 {
        self.readings_at_door.load(Ordering::Relaxed) + self.readings_away.load(Ordering::Relaxed)
    }

    /// Snapshot the counters without resetting them
    pub fn report(&self) -> MetricsSummary {
        let readings_at_door = self.readings_at_door.load(Ordering::Relaxed);
        let detections_at_door = self.detections_at_door.load(Ordering::Relaxed);
        let readings_away = self.readings_away.load(Ordering::Relaxed);
        let detections_away = self.detections_away.load(Ordering::Relaxed);
        let posterior_sum =
            self.posterior_door_sum_micro.load(Ordering::Relaxed) as f64 / POSTERIOR_SCALE;
        let total = readings_at_door + readings_away;

        MetricsSummary {
            readings_total: total,
            readings_at_door,
            readings_away,
            detection_rate_at_door: ratio(detections_at_door, readings_at_door),
            detection_rate_away: ratio(detections_away, readings_away),
            mean_posterior_door: (total > 0).then(|| posterior_sum / total as f64),
            inference_errors: self.inference_errors.load(Ordering::Relaxed),
        }
    }
}

fn ratio(num: u64, den: u64) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

/// Point-in-time view of `Metrics`
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    pub readings_total: u64,
    pub readings_at_door: u64,
    pub readings_away: u64,
    /// Empirical P(detect | door); None before any reading at a door
    pub detection_rate_at_door: Option<f64>,
    /// Empirical P(detect | no door); None before any reading away from doors
    pub detection_rate_away: Option<f64>,
    pub mean_posterior_door: Option<f64>,
    pub inference_errors: u64,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            readings_total = %self.readings_total,
            readings_at_door = %self.readings_at_door,
            readings_away = %self.readings_away,
            detect_rate_at_door = ?self.detection_rate_at_door.map(|r| format!("{r:.3}")),
            detect_rate_away = ?self.detection_rate_away.map(|r| format!("{r:.3}")),
            mean_posterior_door = ?self.mean_posterior_door.map(|p| format!("{p:.4}")),
            inference_errors = %self.inference_errors,
            "metrics"
        );
    }
}
