//! Error types for the biosim-agents crate.
//!
//! Stochastic outcomes (a birth that does not happen, a prey that escapes)
//! are modelled results, never errors. The variants here cover rejected
//! configuration and broken invariants only.

use biosim_types::Species;

/// Errors that can occur during animal and parameter operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A parameter override named a key the species does not have.
    #[error("unknown parameter {key:?} for {species}")]
    UnknownParameter {
        /// The species whose table was being updated.
        species: Species,
        /// The unrecognised key.
        key: String,
    },

    /// A parameter override supplied a value outside the accepted range.
    #[error("invalid value {value} for {species} parameter {key:?}: {reason}")]
    InvalidParameter {
        /// The species whose table was being updated.
        species: Species,
        /// The parameter name.
        key: String,
        /// The rejected value.
        value: f64,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// A population record or override named a species that does not exist.
    #[error("unknown species: {0:?}")]
    UnknownSpecies(String),

    /// The birth-weight distribution could not be constructed.
    #[error("birth weight distribution rejected for {species}: {reason}")]
    BirthWeightDistribution {
        /// The species giving birth.
        species: Species,
        /// Description of the distribution error.
        reason: String,
    },

    /// An arithmetic overflow occurred during a lifecycle update.
    #[error("arithmetic overflow in lifecycle update: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
