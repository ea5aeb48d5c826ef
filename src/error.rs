//! Error types for higher-order array transforms.

use thiserror::Error;

/// Result type alias using [`TransformError`].
pub type Result<T> = std::result::Result<T, TransformError>;

/// Error types for higher-order array transforms.
///
/// Every error aborts the whole call; no partial result column is ever
/// returned. All variants except [`TransformError::ColumnKind`] are
/// detected during type resolution or at the start of execution.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Too few arguments for the operation, or closure arity that does
    /// not match the inferred argument list.
    #[error("Argument count error in {function}: {message}")]
    ArgumentCount {
        function: &'static str,
        message: String,
    },

    /// Static type mismatch (non-array positional argument, missing
    /// closure, non-boolean predicate result, ...).
    #[error("Type error: {0}")]
    Type(String),

    /// A runtime column does not match its declared type.
    ///
    /// Unlike the other variants this can also surface mid-execution,
    /// when a concrete column fails a cast its static type promised.
    #[error("Column kind mismatch: {0}")]
    ColumnKind(String),

    /// Array arguments with differing per-row lengths in one call.
    #[error("Arrays passed to {function} must have equal size")]
    SizeMismatch { function: &'static str },

    /// Propagated failure from an Arrow kernel or array constructor.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
