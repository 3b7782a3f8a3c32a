//! Error types for the engine.
//!
//! [`EngineError`] is the top-level error that `main` reports before
//! exiting with a non-zero status.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: syndicate_core::ConfigError,
    },

    /// A termination signal handler could not be installed.
    #[error("failed to install signal handler: {source}")]
    Signal {
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The configured gang count does not fit the arrest table.
    #[error("cannot spawn {requested} gangs, arrest table holds {capacity}")]
    Capacity {
        /// Gangs the spawner wanted to create.
        requested: usize,
        /// Slots in the arrest table.
        capacity: usize,
    },
}
