//! Error types for model operations.

use thiserror::Error;

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while building or querying an [`EntityModel`](crate::EntityModel).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// An id that does not belong to this store was dereferenced
    #[error("{kind} id {index} is out of range for this store")]
    UnknownEntity {
        /// Entity kind of the id
        kind: &'static str,
        /// Raw index that was looked up
        index: usize,
    },

    /// A namespace with the same qualified name was already created
    #[error("namespace '{name}' is already registered")]
    DuplicateNamespace {
        /// Fully qualified namespace name
        name: String,
    },

    /// JSON export failed
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error details
        message: String,
    },
}

impl ModelError {
    /// Create an unknown entity error.
    pub fn unknown(kind: &'static str, index: usize) -> Self {
        Self::UnknownEntity { kind, index }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
