//! Error types for the [`Simulation`](crate::simulation::Simulation) facade.
//!
//! `Configuration` and `Parameters` cover bad setup input and are raised
//! before any state changes. `MalformedPopulation` rejects an initial
//! population as a whole. `Cycle` means a year could not complete.

use biosim_agents::AgentError;
use biosim_world::WorldError;

use crate::cycle::CycleError;

/// Errors returned by the simulation facade.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The island map or a terrain override was rejected.
    #[error("configuration error: {source}")]
    Configuration {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// A species override or species name was rejected.
    #[error("parameter error: {source}")]
    Parameters {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// An initial-population record could not be placed.
    #[error("malformed population: {reason}")]
    MalformedPopulation {
        /// What was wrong with the record.
        reason: String,
    },

    /// A year failed to complete.
    #[error("simulation cycle failed: {source}")]
    Cycle {
        /// The underlying cycle error.
        #[from]
        source: CycleError,
    },

    /// The year counter reached its maximum.
    #[error("year counter overflow")]
    YearOverflow,
}
