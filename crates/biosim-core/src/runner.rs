//! Multi-year runs and per-year callbacks.
//!
//! [`Simulation::simulate_with`](crate::simulation::Simulation::simulate_with)
//! runs a bounded number of years and hands every [`YearSummary`] to a
//! [`YearCallback`] together with the island state after that year. The
//! outcome of the whole run is a [`SimulationResult`].

use biosim_types::SpeciesCounts;
use biosim_world::Grid;
use serde::Serialize;
use tracing::{info, warn};

use crate::cycle::YearSummary;

/// Result of a multi-year run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Number of years simulated by this run.
    pub years_run: u32,
    /// The simulation's year counter after the run.
    pub final_year: u32,
    /// The summary of the last simulated year, if any year ran.
    pub final_summary: Option<YearSummary>,
    /// Living animals per species after the run.
    pub population: SpeciesCounts,
}

/// Callback invoked after each simulated year.
///
/// Implementations can record history, write reports, or stop caring; the
/// callback cannot change the simulation.
pub trait YearCallback {
    /// Called after a year completes successfully.
    fn on_year(&mut self, summary: &YearSummary, grid: &Grid);
}

/// A no-op year callback.
pub struct NoOpCallback;

impl YearCallback for NoOpCallback {
    fn on_year(&mut self, _summary: &YearSummary, _grid: &Grid) {}
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        years_run = result.years_run,
        final_year = result.final_year,
        herbivores = result.population.herbivores,
        carnivores = result.population.carnivores,
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            year = summary.year,
            births = summary.births.total(),
            deaths = summary.deaths.total(),
            predation_kills = summary.predation_kills,
            migrations = summary.migrations.total(),
            "Final year summary"
        );
    } else {
        warn!("Simulation ended with no years executed");
    }
}
