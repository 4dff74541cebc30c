//! Error types for the fleet engine binary.
//!
//! [`EngineError`] wraps every failure mode of engine startup and the
//! simulation run so `main` can propagate with `?`.

use fleet_station::ParkRejected;

/// Top-level error for the fleet engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: fleet_core::ConfigError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: fleet_core::RunnerError,
    },

    /// The initial fleet did not fit in its stations.
    #[error("spawner error: {source}")]
    Spawn {
        /// The refused park.
        #[from]
        source: ParkRejected,
    },
}
