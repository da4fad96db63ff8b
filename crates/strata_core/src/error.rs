//! Scene error types

use strata_paint::PaintError;
use thiserror::Error;

/// Errors raised by scene nodes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error(transparent)]
    Paint(#[from] PaintError),

    /// No loader accepts the input, or the node kind cannot do this
    #[error("Operation not supported")]
    NonSupport,

    /// A loader accepted the input but could not read it
    #[error("Unknown failure while reading input")]
    Unknown,

    /// The node is not in a state that allows the call
    #[error("Insufficient condition: {0}")]
    InsufficientCondition(&'static str),

    /// The renderer refused a request
    #[error("Renderer backend failed: {0}")]
    Backend(&'static str),
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
