//! Error types for the simulation harness.

use roomscan_core::ConfigError;
use roomscan_env::EnvError;
use thiserror::Error;

/// Errors that end a simulation run before it produces a result.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment error: {0}")]
    Env(#[from] EnvError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
