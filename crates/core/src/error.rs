//! Error types for the spectrum core.

use thiserror::Error;

/// Errors produced by spectrum core operations.
#[derive(Debug, Error)]
pub enum SpectrumError {
    /// An out-of-range value or chroma, an unknown hue prefix, or a malformed
    /// hue string was supplied at construction.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The color-space index has no entries to resolve a lookup against.
    #[error("lookup failed: {0}")]
    LookupFailure(String),

    /// The mixing solver was invoked without a desired color or with an
    /// unusable palette.
    #[error("solver precondition violated: {0}")]
    SolverPrecondition(String),

    /// No weight combination with a nonzero total weight was found.
    #[error("solver exhausted: no weight combination produced a valid mix")]
    SolverExhausted,
}
