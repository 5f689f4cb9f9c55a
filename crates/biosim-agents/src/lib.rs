//! Animal state, species parameters, and lifecycle rules for the BioSim
//! island simulation.
//!
//! This crate contains the per-animal logic layer: everything that operates
//! on a single animal (or a carnivore and its prey list) without knowing
//! about cells, the island, or phase ordering. It sits between
//! `biosim-types` and the world/core crates that own and schedule animals.
//!
//! # Modules
//!
//! - [`animal`] -- [`Animal`] state, fitness, grazing, birth, migration
//!   draw, aging, weight loss, and death
//! - [`chance`] -- Bernoulli draws that never touch the generator for
//!   certain outcomes
//! - [`error`] -- Error types for parameter and lifecycle operations ([`AgentError`])
//! - [`params`] -- Per-species parameter tables ([`SpeciesParameters`], [`ParameterSet`])
//! - [`predation`] -- Carnivore hunting ([`hunt`])

pub mod animal;
pub mod chance;
pub mod error;
pub mod params;
pub mod predation;

// Re-export primary types at crate root for convenience.
pub use animal::{Animal, logistic_q};
pub use error::AgentError;
pub use params::{ParameterSet, SpeciesParameters};
pub use predation::{HuntOutcome, PreyCandidate, hunt};
