//! Error taxonomy surfaced by recorder operations.

use ct_core::{EventKind, SessionId, StateError, ValidationError};
use ct_store::StoreError;
use thiserror::Error;

/// Recorder errors.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// A caller-supplied argument was malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No live or persisted session exists for the id.
    #[error("session {id} not found")]
    NotFound { id: SessionId },
    /// Reading, writing or listing session documents failed.
    #[error(transparent)]
    Persistence(StoreError),
    /// The operation is not valid in the session's lifecycle state.
    #[error(transparent)]
    State(#[from] StateError),
    /// The debounce worker for a kind is no longer running.
    #[error("{kind} pipeline for session {id} has stopped")]
    PipelineClosed { id: SessionId, kind: EventKind },
}

impl From<StoreError> for RecorderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => Self::NotFound { id },
            other => Self::Persistence(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    #[test]
    fn store_not_found_maps_to_not_found() {
        let id = SessionId::new("s1").unwrap();
        let err = RecorderError::from(StoreError::NotFound {
            id: id.clone(),
            dir: PathBuf::from("/tmp"),
        });
        assert!(matches!(err, RecorderError::NotFound { id: ref found } if *found == id));
        assert_eq!(err.to_string(), "session s1 not found");
    }

    #[test]
    fn store_io_maps_to_persistence() {
        let err = RecorderError::from(StoreError::Io {
            context: "listing /nope".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert!(matches!(err, RecorderError::Persistence(_)));
        assert!(err.to_string().starts_with("listing /nope"));
    }
}
