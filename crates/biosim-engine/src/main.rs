//! Headless runner for the BioSim island simulation.
//!
//! Loads the configuration, builds the island, simulates the configured
//! number of years, and prints a JSON report of the run to stdout. Logs go
//! to stderr through `tracing`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the first CLI argument, `BIOSIM_CONFIG`, or
//!    `biosim-config.yaml` (defaults when none exists)
//! 2. Initialize structured logging at the configured level and format
//!    (`RUST_LOG` wins over the level when set)
//! 3. Build the simulation: map, overrides, initial population
//! 4. Run the years, recording the population history
//! 5. Log the result and print the report

mod error;
mod history;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use biosim_core::{Simulation, SimulationConfig, SimulationResult, runner};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::history::{HistoryCallback, YearRecord};

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "biosim-config.yaml";

/// Environment variable naming the configuration file.
const CONFIG_ENV_VAR: &str = "BIOSIM_CONFIG";

/// The JSON document printed at the end of a run.
#[derive(Debug, Serialize)]
struct RunReport {
    /// Seed the run used.
    seed: u64,
    /// Outcome of the run.
    result: SimulationResult,
    /// Living animals per species name after the run.
    num_animals_per_species: BTreeMap<&'static str, usize>,
    /// One entry per simulated year.
    history: Vec<YearRecord>,
    /// Wall-clock duration of the simulated years.
    elapsed_seconds: f64,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, setup, a simulated year, or the
/// report fails.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr);
    if config.logging.format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(
        source = %source,
        seed = config.simulation.seed,
        years = config.simulation.years,
        population_records = config.population.len(),
        "Configuration loaded"
    );

    // 3. Build the simulation.
    let mut sim = Simulation::from_config(&config)?;
    info!(animals = sim.num_animals(), "Simulation initialized");

    // 4. Run.
    let mut history = HistoryCallback::new(config.simulation.report_every);
    let started = Instant::now();
    let result = sim.simulate_with(config.simulation.years, &mut history)?;
    let elapsed_seconds = started.elapsed().as_secs_f64();

    // 5. Report.
    runner::log_simulation_end(&result);
    info!(elapsed_seconds, "Simulation complete");

    let report = RunReport {
        seed: config.simulation.seed,
        result,
        num_animals_per_species: sim.num_animals_per_species(),
        history: history.into_records(),
        elapsed_seconds,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Locate and load the configuration.
///
/// Returns the config and a description of where it came from.
fn load_config() -> Result<(SimulationConfig, String), EngineError> {
    let explicit = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

    if let Some(path) = explicit {
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, path.display().to_string()));
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        let config = SimulationConfig::from_file(&default_path)?;
        Ok((config, DEFAULT_CONFIG_PATH.to_owned()))
    } else {
        Ok((SimulationConfig::default(), "defaults".to_owned()))
    }
}
