//! Error types for the simulation driver binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during deployment and the simulated run.

use investor_game::{BootstrapError, ClockError, ConfigError, GameError};

/// Top-level error for the simulation driver.
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
        source: ConfigError,
    },

    /// Deployment failed.
    #[error("bootstrap error: {source}")]
    Bootstrap {
        /// The underlying bootstrap error.
        #[from]
        source: BootstrapError,
    },

    /// A game operation failed unexpectedly.
    #[error("game error: {source}")]
    Game {
        /// The underlying game error.
        source: Box<GameError>,
    },

    /// The simulated clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The `simulation` section is missing values or out of range.
    #[error("scenario error: {message}")]
    Scenario {
        /// Description of the scenario failure.
        message: String,
    },

    /// The currency ledger stopped reconciling.
    #[error("conservation violated on day {day}: {message}")]
    Conservation {
        /// Simulated day on which the check failed.
        day: u32,
        /// The anomaly report.
        message: String,
    },
}

impl From<GameError> for EngineError {
    fn from(source: GameError) -> Self {
        Self::Game {
            source: Box::new(source),
        }
    }
}
