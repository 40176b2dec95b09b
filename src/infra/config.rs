//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument (must exist and be valid)
//! 2. Default: config/dev.toml (defaults are used if it is missing)
//!
//! Every table and field is optional; missing values fall back to defaults.

use crate::domain::types::LikelihoodMode;
use crate::domain::world::WorldState;
use crate::infra::error::{ensure_probability, SensorResult};
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Config file read when no --config is given
pub const DEFAULT_CONFIG_PATH: &str = "config/dev.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct SensorConfig {
    /// P(sensor reports door | door present)
    #[serde(default = "default_p_detect_given_door")]
    pub p_detect_given_door: f64,
    /// P(sensor reports door | no door), the false-positive rate
    #[serde(default = "default_p_detect_given_no_door")]
    pub p_detect_given_no_door: f64,
    #[serde(default)]
    pub likelihood: LikelihoodMode,
}

fn default_p_detect_given_door() -> f64 {
    0.8
}

fn default_p_detect_given_no_door() -> f64 {
    0.2
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            p_detect_given_door: default_p_detect_given_door(),
            p_detect_given_no_door: default_p_detect_given_no_door(),
            likelihood: LikelihoodMode::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    /// Door center locations in [0, 1]
    #[serde(default = "default_doors")]
    pub doors: Vec<f64>,
    /// Door width in bins
    #[serde(default = "default_door_width")]
    pub door_width: f64,
    #[serde(default = "default_n_bins")]
    pub n_bins: usize,
}

fn default_doors() -> Vec<f64> {
    vec![0.15, 0.45, 0.8]
}

fn default_door_width() -> f64 {
    1.0
}

fn default_n_bins() -> usize {
    20
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { doors: default_doors(), door_width: default_door_width(), n_bins: default_n_bins() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelfTestConfig {
    #[serde(default = "default_samples")]
    pub samples: u64,
    /// Allowed gap between measured and configured detection rate
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// RNG seed (0 = seed from entropy)
    #[serde(default)]
    pub seed: u64,
}

fn default_samples() -> u64 {
    1000
}

fn default_tolerance() -> f64 {
    0.1
}

impl Default for SelfTestConfig {
    fn default() -> Self {
        Self { samples: default_samples(), tolerance: default_tolerance(), seed: 0 }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub self_test: SelfTestConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    p_detect_given_door: f64,
    p_detect_given_no_door: f64,
    likelihood_mode: LikelihoodMode,
    doors: Vec<f64>,
    door_width: f64,
    n_bins: usize,
    self_test_samples: u64,
    self_test_tolerance: f64,
    seed: u64,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default".to_string())
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: String) -> Self {
        Self {
            p_detect_given_door: toml_config.sensor.p_detect_given_door,
            p_detect_given_no_door: toml_config.sensor.p_detect_given_no_door,
            likelihood_mode: toml_config.sensor.likelihood,
            doors: toml_config.world.doors,
            door_width: toml_config.world.door_width,
            n_bins: toml_config.world.n_bins,
            self_test_samples: toml_config.self_test.samples,
            self_test_tolerance: toml_config.self_test.tolerance,
            seed: toml_config.self_test.seed,
            config_file,
        }
    }

    /// Load configuration from a TOML file
    ///
    /// Detection rates are validated here so a bad file fails at startup
    /// rather than on the first inference.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        let config = Self::from_toml(toml_config, path.display().to_string());
        config
            .validate()
            .with_context(|| format!("Invalid values in config file {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults only when the file is absent
    ///
    /// A file that exists but cannot be read, parsed or validated is an error.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(config_file = %path.display(), "config_file_missing_using_defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Check detection rates and world geometry
    pub fn validate(&self) -> SensorResult<()> {
        ensure_probability("p_detect_given_door", self.p_detect_given_door)?;
        ensure_probability("p_detect_given_no_door", self.p_detect_given_no_door)?;
        self.world()?;
        Ok(())
    }

    /// Build the configured world
    pub fn world(&self) -> SensorResult<WorldState> {
        WorldState::new(self.doors.clone(), self.door_width, self.n_bins)
    }

    pub fn p_detect_given_door(&self) -> f64 {
        self.p_detect_given_door
    }

    pub fn p_detect_given_no_door(&self) -> f64 {
        self.p_detect_given_no_door
    }

    pub fn likelihood_mode(&self) -> LikelihoodMode {
        self.likelihood_mode
    }

    pub fn doors(&self) -> &[f64] {
        &self.doors
    }

    pub fn door_width(&self) -> f64 {
        self.door_width
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    pub fn self_test_samples(&self) -> u64 {
        self.self_test_samples
    }

    pub fn self_test_tolerance(&self) -> f64 {
        self.self_test_tolerance
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to override detection rates
    #[cfg(test)]
    pub fn with_rates(mut self, p_detect_given_door: f64, p_detect_given_no_door: f64) -> Self {
        self.p_detect_given_door = p_detect_given_door;
        self.p_detect_given_no_door = p_detect_given_no_door;
        self
    }
}
