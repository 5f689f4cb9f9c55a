//! Year cycle, simulation facade, and configuration for the BioSim island
//! simulation.
//!
//! This crate owns the six-phase yearly cycle that drives the island:
//! Feeding, Procreation, Migration, Aging, Weight loss, and Death.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `biosim-config.yaml` into
//!   strongly-typed structs.
//! - [`cycle`] -- The six-phase year loop ([`run_year`]) and its
//!   [`YearSummary`].
//! - [`error`] -- [`SimulationError`] for the facade.
//! - [`rng`] -- The seeded generator shared by every draw.
//! - [`runner`] -- [`YearCallback`] and multi-year run results.
//! - [`simulation`] -- The [`Simulation`] facade drivers talk to.

pub mod config;
pub mod cycle;
pub mod error;
pub mod rng;
pub mod runner;
pub mod simulation;

// Re-export primary types at crate root.
pub use config::{ConfigError, SimulationConfig};
pub use cycle::{CycleError, Phase, YearSummary, run_year};
pub use error::SimulationError;
pub use rng::{SimRng, create_rng};
pub use runner::{NoOpCallback, SimulationResult, YearCallback, log_simulation_end};
pub use simulation::Simulation;
