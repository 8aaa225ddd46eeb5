//! Error types for the survey engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and the survey run.

/// Top-level error for the survey engine binary.
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
        source: waggle_core::ConfigError,
    },

    /// Map construction or a map query failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: waggle_world::WorldError,
    },

    /// A snapshot exchange between scouts failed.
    #[error("exchange error: {source}")]
    Exchange {
        /// The underlying exchange error.
        #[from]
        source: waggle_core::ExchangeError,
    },
}
