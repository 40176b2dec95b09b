//! Noisy binary door sensor with Bayesian posterior
//!
//! The sensor is a 2x2 confusion matrix: a true-positive rate
//! P(detect | door) and a false-positive rate P(detect | no door). Each call
//! looks up ground truth, samples an observation from the matching Bernoulli,
//! then inverts it with Bayes' rule against a geometric prior
//! `doors * door_width / n_bins`.
//!
//! No belief is carried between calls. The only mutable state is the pair of
//! rates, which is replaced as a unit under a lock.

use crate::domain::types::{Likelihoods, LikelihoodMode, Observation, SensorReading};
use crate::domain::world::{Robot, World};
use crate::infra::config::Config;
use crate::infra::error::{ensure_probability, SensorError, SensorResult};
use crate::infra::metrics::Metrics;
use parking_lot::RwLock;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Confusion-matrix rates; complements are derived, never stored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionRates {
    p_detect_given_door: f64,
    p_detect_given_no_door: f64,
}

impl Default for DetectionRates {
    fn default() -> Self {
        Self { p_detect_given_door: 0.8, p_detect_given_no_door: 0.2 }
    }
}

impl DetectionRates {
    pub fn new(p_detect_given_door: f64, p_detect_given_no_door: f64) -> SensorResult<Self> {
        Ok(Self {
            p_detect_given_door: ensure_probability("p_detect_given_door", p_detect_given_door)?,
            p_detect_given_no_door: ensure_probability(
                "p_detect_given_no_door",
                p_detect_given_no_door,
            )?,
        })
    }

    pub fn p_detect_given_door(&self) -> f64 {
        self.p_detect_given_door
    }

    pub fn p_detect_given_no_door(&self) -> f64 {
        self.p_detect_given_no_door
    }

    pub fn p_no_detect_given_door(&self) -> f64 {
        1.0 - self.p_detect_given_door
    }

    pub fn p_no_detect_given_no_door(&self) -> f64 {
        1.0 - self.p_detect_given_no_door
    }

    /// Probability of a detect reading under the given ground truth
    pub fn p_detect(&self, door_present: bool) -> f64 {
        if door_present {
            self.p_detect_given_door
        } else {
            self.p_detect_given_no_door
        }
    }
}

/// Ground truth at the robot's location
pub fn is_in_front_of_door<W, R>(world: &W, robot: &R) -> bool
where
    W: World + ?Sized,
    R: Robot + ?Sized,
{
    world.is_in_front_of_door(robot.robot_loc())
}

/// Geometric prior P(door) = doors * door_width / n_bins, clamped to [0, 1]
pub fn prior_door<W: World + ?Sized>(world: &W) -> SensorResult<f64> {
    let n_bins = world.n_bins();
    if n_bins == 0 {
        return Err(SensorError::invalid("n_bins", 0.0, "must be positive"));
    }
    let door_width = world.door_width();
    if !door_width.is_finite() || door_width < 0.0 {
        return Err(SensorError::invalid("door_width", door_width, "must be finite and >= 0"));
    }

    let prior = world.door_count() as f64 * door_width / n_bins as f64;
    if prior > 1.0 {
        warn!(prior = %prior, doors = %world.door_count(), "door_prior_clamped");
        return Ok(1.0);
    }
    Ok(prior)
}

/// Select P(obs | door) and P(obs | no door) for one reading
pub fn likelihoods(
    rates: &DetectionRates,
    mode: LikelihoodMode,
    ground_truth: bool,
    observation: Observation,
) -> Likelihoods {
    let detect = observation.is_detect();
    let (given_door, given_no_door) = match mode {
        LikelihoodMode::Observation => {
            if detect {
                (rates.p_detect_given_door(), rates.p_detect_given_no_door())
            } else {
                (rates.p_no_detect_given_door(), rates.p_no_detect_given_no_door())
            }
        }
        LikelihoodMode::GroundTruth => match (ground_truth, detect) {
            (true, true) => (rates.p_detect_given_door(), rates.p_detect_given_no_door()),
            (true, false) => (rates.p_no_detect_given_door(), rates.p_no_detect_given_no_door()),
            (false, true) => (rates.p_detect_given_no_door(), rates.p_no_detect_given_no_door()),
            (false, false) => (rates.p_no_detect_given_no_door(), rates.p_detect_given_no_door()),
        },
    };
    Likelihoods { given_door, given_no_door }
}

/// Bayes' rule: returns (P(door | obs), P(no door | obs))
pub fn posterior(likelihoods: Likelihoods, prior_door: f64) -> SensorResult<(f64, f64)> {
    let prior_door = ensure_probability("prior_door", prior_door)?;
    let Likelihoods { given_door, given_no_door } = likelihoods;

    // Uninformative reading leaves the prior unchanged
    if given_door == given_no_door && given_door > 0.0 {
        return Ok((prior_door, 1.0 - prior_door));
    }

    let numerator = given_door * prior_door;
    let denominator = numerator + given_no_door * (1.0 - prior_door);
    if denominator == 0.0 {
        return Err(SensorError::DivisionUndefined { given_door, given_no_door, prior_door });
    }

    let posterior_door = numerator / denominator;
    Ok((posterior_door, 1.0 - posterior_door))
}

#[derive(Debug, Clone, Copy)]
struct SensorState {
    rates: DetectionRates,
    mode: LikelihoodMode,
}

/// Door sensor model
///
/// Shareable across threads. Each inference copies the rates once, so a
/// concurrent `set_probabilities` is seen either entirely or not at all.
#[derive(Debug)]
pub struct DoorSensor {
    state: RwLock<SensorState>,
    metrics: Option<Arc<Metrics>>,
}

impl Default for DoorSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl DoorSensor {
    /// Sensor with the default 0.8 / 0.2 rates
    pub fn new() -> Self {
        Self::with_rates(DetectionRates::default())
    }

    pub fn with_rates(rates: DetectionRates) -> Self {
        Self {
            state: RwLock::new(SensorState { rates, mode: LikelihoodMode::default() }),
            metrics: None,
        }
    }

    pub fn from_config(config: &Config) -> SensorResult<Self> {
        let rates =
            DetectionRates::new(config.p_detect_given_door(), config.p_detect_given_no_door())?;
        let sensor = Self::with_rates(rates);
        sensor.set_likelihood_mode(config.likelihood_mode());
        Ok(sensor)
    }

    /// Attach counters that record every inference
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn metrics(&self) -> Option<&Arc<Metrics>> {
        self.metrics.as_ref()
    }

    /// Ground truth lookup; needs no sensor instance
    pub fn is_in_front_of_door<W, R>(world: &W, robot: &R) -> bool
    where
        W: World + ?Sized,
        R: Robot + ?Sized,
    {
        is_in_front_of_door(world, robot)
    }

    pub fn rates(&self) -> DetectionRates {
        self.state.read().rates
    }

    pub fn likelihood_mode(&self) -> LikelihoodMode {
        self.state.read().mode
    }

    pub fn set_likelihood_mode(&self, mode: LikelihoodMode) {
        self.state.write().mode = mode;
    }

    /// Replace both detection rates at once
    ///
    /// On error the previous rates stay in place.
    pub fn set_probabilities(
        &self,
        p_detect_given_door: f64,
        p_detect_given_no_door: f64,
    ) -> SensorResult<()> {
        let rates = DetectionRates::new(p_detect_given_door, p_detect_given_no_door)?;
        self.state.write().rates = rates;
        info!(
            p_detect_given_door = %p_detect_given_door,
            p_detect_given_no_door = %p_detect_given_no_door,
            "sensor_rates_updated"
        );
        Ok(())
    }

    /// Sample a noisy reading at the robot's location and invert it
    pub fn sample_reading<W, R, G>(
        &self,
        world: &W,
        robot: &R,
        rng: &mut G,
    ) -> SensorResult<SensorReading>
    where
        W: World + ?Sized,
        R: Robot + ?Sized,
        G: Rng + ?Sized,
    {
        let SensorState { rates, mode } = *self.state.read();
        let ground_truth = is_in_front_of_door(world, robot);

        let u: f64 = rng.gen();
        let observation = Observation::from(u < rates.p_detect(ground_truth));

        let result = evaluate(&rates, mode, world, ground_truth, observation);
        self.record(&result, robot.robot_loc());
        result
    }

    /// Posterior for a caller-supplied observation at the robot's location
    pub fn infer<W, R>(
        &self,
        world: &W,
        robot: &R,
        observation: Observation,
    ) -> SensorResult<SensorReading>
    where
        W: World + ?Sized,
        R: Robot + ?Sized,
    {
        let SensorState { rates, mode } = *self.state.read();
        let ground_truth = is_in_front_of_door(world, robot);

        let result = evaluate(&rates, mode, world, ground_truth, observation);
        self.record(&result, robot.robot_loc());
        result
    }

    fn record(&self, result: &SensorResult<SensorReading>, robot_loc: f64) {
        match result {
            Ok(reading) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_reading(reading);
                }
                debug!(
                    robot_loc = %robot_loc,
                    ground_truth = %reading.ground_truth,
                    observation = %reading.observation,
                    prior_door = %reading.prior_door,
                    posterior_door = %reading.posterior_door,
                    "reading_sampled"
                );
            }
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_error();
                }
                debug!(robot_loc = %robot_loc, error = %e, "reading_failed");
            }
        }
    }
}

fn evaluate<W: World + ?Sized>(
    rates: &DetectionRates,
    mode: LikelihoodMode,
    world: &W,
    ground_truth: bool,
    observation: Observation,
) -> SensorResult<SensorReading> {
    let prior = prior_door(world)?;
    let likelihoods = likelihoods(rates, mode, ground_truth, observation);
    let (posterior_door, posterior_no_door) = posterior(likelihoods, prior)?;

    Ok(SensorReading {
        ground_truth,
        observation,
        prior_door: prior,
        posterior_door,
        posterior_no_door,
    })
}
