//! Error types for the board and interaction layer.
//!
//! Geometry functions are total and never return these; only the element
//! store, the drag session lifecycle and JSON loading can fail.

use crate::shapes::ElementId;
use thiserror::Error;

/// Errors raised by the element store and the drag state machine.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),
    #[error("Element is not a connector: {0}")]
    NotAConnector(ElementId),
    #[error("Element has no anchors to connect to: {0}")]
    NotConnectable(ElementId),
    #[error("A drag session is already in progress")]
    DragInProgress,
    #[error("No drag session is active")]
    NoActiveDrag,
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::Serialization(err.to_string())
    }
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;
