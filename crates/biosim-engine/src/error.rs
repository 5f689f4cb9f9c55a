//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup, the run, and the final report.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: biosim_core::ConfigError,
    },

    /// Building or running the simulation failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: biosim_core::SimulationError,
    },

    /// The final report could not be serialised.
    #[error("report error: {source}")]
    Report {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
