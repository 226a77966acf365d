//! Editor error taxonomy.

use crate::storage::StoreError;
use thiserror::Error;

/// Coarse error classes the UI reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    NotFound,
    Decode,
    Network,
    Internal,
}

/// Errors raised by editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Authentication required")]
    Authentication,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Failed to load image {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Export of {0} is already in progress")]
    ExportInProgress(String),
    #[error("No object with id {0}")]
    UnknownObject(uuid::Uuid),
    #[error("No frame named {0}")]
    UnknownFrame(String),
}

impl EditorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditorError::Validation(_) | EditorError::ExportInProgress(_) => ErrorKind::Validation,
            EditorError::Authentication => ErrorKind::Authentication,
            EditorError::NotFound(_)
            | EditorError::UnknownObject(_)
            | EditorError::UnknownFrame(_) => ErrorKind::NotFound,
            EditorError::Decode { .. } => ErrorKind::Decode,
            EditorError::Network(_) => ErrorKind::Network,
            EditorError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Text safe to show to the user. Internal details are not exposed.
    pub fn user_message(&self) -> String {
        match self {
            EditorError::Internal(_) => "Something went wrong. Please try again.".to_string(),
            EditorError::Authentication => "Please sign in to save your design.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for EditorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => EditorError::Validation(msg),
            StoreError::Unauthenticated => EditorError::Authentication,
            StoreError::NotFound(what) => EditorError::NotFound(what),
            StoreError::Unavailable(msg) => EditorError::Network(msg),
            StoreError::Serialization(msg) | StoreError::Io(msg) => EditorError::Internal(msg),
        }
    }
}

/// Result alias for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_kinds() {
        assert_eq!(
            EditorError::from(StoreError::Unauthenticated).kind(),
            ErrorKind::Authentication
        );
        assert_eq!(
            EditorError::from(StoreError::NotFound("user".into())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            EditorError::from(StoreError::Unavailable("offline".into())).kind(),
            ErrorKind::Network
        );
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = EditorError::Internal("pixmap allocation failed".into());
        assert!(!err.user_message().contains("pixmap"));
        let err = EditorError::Validation("width must be a number".into());
        assert!(err.user_message().contains("width must be a number"));
    }
}
