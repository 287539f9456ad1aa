//! Error types for the RoomScan environment abstraction.

use thiserror::Error;

/// Errors raised by external collaborators (sensors, screen).
///
/// These never originate inside the fusion core; they describe a
/// collaborator that could not deliver its per-frame snapshot.
#[derive(Debug, Error)]
pub enum EnvError {
    /// A sensor source is offline or not yet initialised
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Screen geometry is unusable (zero or negative size, NaN)
    #[error("Invalid screen geometry: {0}")]
    InvalidGeometry(String),
}

impl EnvError {
    /// Creates a source-unavailable error.
    pub fn unavailable(source: impl Into<String>) -> Self {
        Self::SourceUnavailable(source.into())
    }
}
