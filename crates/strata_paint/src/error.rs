//! Paint error types

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors raised by path storage and the outline engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaintError {
    /// Growing a buffer failed; the target is left as it was
    #[error("Allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// Commands and points passed together do not line up
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The last contour of a path was not terminated by a close command
    #[error("Contour is not terminated by a close command")]
    UnterminatedContour,

    /// An operation needed at least one recorded point
    #[error("Path has no points")]
    EmptyPath,
}

/// Result type for paint operations
pub type Result<T> = std::result::Result<T, PaintError>;
