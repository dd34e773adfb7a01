use thiserror::Error;

/// Errors surfaced by the sculpture core.
///
/// Frame-level problems are reported so the caller can skip the frame; nothing
/// here is meant to stop the render loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A spectrum frame is shorter than the number of analysed bands.
    #[error("invalid input: expected at least {expected} bands, got {actual}")]
    InvalidInput { expected: usize, actual: usize },

    /// A spectrum frame carries a NaN or infinite magnitude.
    #[error("invalid input: non-finite magnitude in band {band}")]
    NonFiniteInput { band: usize },

    /// A configuration value cannot produce a working component.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
