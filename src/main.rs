//! Door sensor CLI
//!
//! Module structure:
//! - `domain/` - Readings, world and robot collaborators
//! - `services/` - Sensor model, RNG construction, self-test
//! - `infra/` - Config, errors, metrics

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use door_sensor::domain::{Observation, RobotState};
use door_sensor::infra::config::DEFAULT_CONFIG_PATH;
use door_sensor::infra::{Config, Metrics};
use door_sensor::services::rng::sensor_rng;
use door_sensor::services::{run_self_test, DoorSensor};
use std::io::Write;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Door sensor - noisy door detection with Bayesian posterior
#[derive(Parser, Debug)]
#[command(name = "door-sensor", version, about)]
struct Args {
    /// Path to TOML configuration file [default: config/dev.toml]
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Override P(detect | door) from the config file
    #[arg(long, global = true)]
    p_detect_given_door: Option<f64>,

    /// Override P(detect | no door) from the config file
    #[arg(long, global = true)]
    p_detect_given_no_door: Option<f64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that repeated sampling reproduces the configured detection rates
    SelfTest {
        #[arg(long)]
        samples: Option<u64>,
        #[arg(long)]
        tolerance: Option<f64>,
        /// RNG seed (0 = entropy)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Sample noisy readings at a location and print them as JSON lines
    Sample {
        #[arg(long)]
        location: f64,
        #[arg(long, default_value_t = 1)]
        count: u64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the posterior for a fixed observation at a location
    Posterior {
        #[arg(long)]
        location: f64,
        #[arg(long, value_enum)]
        observation: ObservationArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ObservationArg {
    Detect,
    NoDetect,
}

impl From<ObservationArg> for Observation {
    fn from(arg: ObservationArg) -> Self {
        match arg {
            ObservationArg::Detect => Observation::Detect,
            ObservationArg::NoDetect => Observation::NoDetect,
        }
    }
}

fn init_logging(json: bool) {
    // Default: INFO, use RUST_LOG=debug to see every reading
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr so stdout carries only readings
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_json);

    info!(git_hash = %env!("GIT_HASH"), "door-sensor starting");

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_from_path(DEFAULT_CONFIG_PATH)?,
    };
    let world = config.world().context("invalid world geometry")?;

    let metrics = Arc::new(Metrics::new());
    let sensor = DoorSensor::from_config(&config)?.with_metrics(metrics.clone());

    if args.p_detect_given_door.is_some() || args.p_detect_given_no_door.is_some() {
        let current = sensor.rates();
        sensor
            .set_probabilities(
                args.p_detect_given_door.unwrap_or(current.p_detect_given_door()),
                args.p_detect_given_no_door.unwrap_or(current.p_detect_given_no_door()),
            )
            .context("invalid detection rate override")?;
    }

    let rates = sensor.rates();
    info!(
        config_file = %config.config_file(),
        p_detect_given_door = %rates.p_detect_given_door(),
        p_detect_given_no_door = %rates.p_detect_given_no_door(),
        likelihood = ?sensor.likelihood_mode(),
        doors = ?config.doors(),
        door_width = %config.door_width(),
        n_bins = %config.n_bins(),
        "config_loaded"
    );

    let command =
        args.command.unwrap_or(Command::SelfTest { samples: None, tolerance: None, seed: None });

    match command {
        Command::SelfTest { samples, tolerance, seed } => {
            let mut rng = sensor_rng(seed.unwrap_or(config.seed()));
            let mut robot = RobotState::default();
            let report = run_self_test(
                &sensor,
                &world,
                &mut robot,
                &mut rng,
                samples.unwrap_or(config.self_test_samples()),
                tolerance.unwrap_or(config.self_test_tolerance()),
            )?;
            println!(
                "Passed tests: away {:.3} (expected {}), at door {:.3} (expected {})",
                report.away_from_door.observed,
                report.away_from_door.expected,
                report.in_front_of_door.observed,
                report.in_front_of_door.expected,
            );
        }
        Command::Sample { location, count, seed } => {
            let mut rng = sensor_rng(seed.unwrap_or(config.seed()));
            let robot = RobotState::at(location);
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for _ in 0..count {
                let reading = sensor.sample_reading(&world, &robot, &mut rng)?;
                serde_json::to_writer(&mut out, &reading)?;
                writeln!(out)?;
            }
        }
        Command::Posterior { location, observation } => {
            let reading = sensor.infer(&world, &RobotState::at(location), observation.into())?;
            println!("{}", serde_json::to_string(&reading)?);
        }
    }

    info!(readings_total = %metrics.readings_total(), "door-sensor finished");
    metrics.report().log();
    Ok(())
}
