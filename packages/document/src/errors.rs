//! Error types for the document model

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Ownership index out of sync for {element_id}: {message}")]
    OwnershipIndex { element_id: String, message: String },

    #[error("Element {element_id} has both a literal and a binding for {property}")]
    BindingConflict { element_id: String, property: String },

    #[error("Element {0} carries an empty binding map")]
    EmptyBindingMap(String),

    #[error("Element list out of sync: {0}")]
    ElementList(String),
}
