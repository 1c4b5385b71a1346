//! Error types for the editor

use pagecraft_parser::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Index {index} is outside 0..={len}")]
    InvalidIndex { index: usize, len: usize },

    #[error("Moving {node_id} under {parent_id} would create a cycle")]
    CycleDetected { node_id: String, parent_id: String },

    #[error("Invalid value for {property}: {value:?}")]
    InvalidValue { property: String, value: String },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Stored document is corrupt: {0}")]
    CorruptState(String),

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("No component selected")]
    NoSelection,

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] StorageError),

    #[error("Editor is not mounted")]
    NotMounted,
}

impl EditorError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        EditorError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn duplicate(kind: &'static str, id: impl Into<String>) -> Self {
        EditorError::DuplicateId {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid_value(property: impl Into<String>, value: impl Into<String>) -> Self {
        EditorError::InvalidValue {
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        EditorError::InvalidOperation(message.into())
    }
}

/// Failures reported by [`crate::Storage`] backends
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage quota exceeded: {needed} bytes needed, {capacity} available")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
