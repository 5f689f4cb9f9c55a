//! Shared type definitions for the BioSim island simulation.
//!
//! This crate is the single source of truth for the plain data exchanged
//! between the agent model, the island grid, the year cycle and the driver.
//!
//! # Modules
//!
//! - [`enums`] -- [`Species`] and [`Terrain`]
//! - [`ids`] -- Sequential animal identifiers
//! - [`structs`] -- Coordinates, population records, per-species counts

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Species, Terrain};
pub use ids::{AnimalId, AnimalIdSequence};
pub use structs::{AnimalRecord, Coord, PopulationRecord, SpeciesCounts};
