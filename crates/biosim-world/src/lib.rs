//! Island geography and population bookkeeping for the BioSim simulation.
//!
//! This crate models the island: a rectangular map of terrain cells, the
//! fodder each land cell grows, the animals living in each cell, and the
//! island-wide population counters. It runs each yearly phase for a single
//! cell; the order of phases and cells is decided by `biosim-core`.
//!
//! # Modules
//!
//! - [`cell`] -- [`Cell`] and [`LandCell`]: residents, fodder, and the
//!   per-cell feeding, procreation, migration, aging, weight-loss, and
//!   death phases
//! - [`error`] -- Error types for map parsing and cell operations ([`WorldError`])
//! - [`grid`] -- [`Grid`]: map parsing, adjacency, counter hooks, and reporting
//! - [`population`] -- [`PopulationCounter`]: living animals per species
//! - [`terrain`] -- [`TerrainParameters`]: fodder capacity per terrain

pub mod cell;
pub mod error;
pub mod grid;
pub mod population;
pub mod terrain;

// Re-export primary types at crate root.
pub use cell::{Cell, FeedingOutcome, LandCell, Migration};
pub use error::WorldError;
pub use grid::{DEFAULT_MAP, Grid};
pub use population::PopulationCounter;
pub use terrain::TerrainParameters;
