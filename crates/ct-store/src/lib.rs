//! Storage layer for the session recorder.
//!
//! Each session lives in its own JSON document, `<save_path>/<id>.json`.
//!
//! # Write Semantics
//!
//! Every save rewrites the whole document: the snapshot is written to a
//! temporary file in the same directory and renamed over the target, so a
//! reader never observes a partially written session. There is no locking;
//! two processes saving the same session race and the last rename wins.
//!
//! The store never creates its directory. A missing save directory is a
//! persistence failure the caller has to see.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ct_core::{EXPORT_SUFFIX, Session, SessionId};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Extension of persisted session documents.
pub const SESSION_EXTENSION: &str = "json";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document exists for the session.
    #[error("session {id} not found in {}", dir.display())]
    NotFound { id: SessionId, dir: PathBuf },
    /// A filesystem operation failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    /// A document could not be encoded or decoded.
    #[error("invalid session document {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A directory of session documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `id`.
    pub fn path_for(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("{id}.{SESSION_EXTENSION}"))
    }

    /// Writes a full snapshot of `session`, replacing any previous one.
    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        let path = self.path_for(&session.id);
        let json = serde_json::to_vec_pretty(session).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        write_atomic(&path, &json)?;
        tracing::debug!(
            session = %session.id,
            events = session.events.len(),
            path = %path.display(),
            "saved session"
        );
        Ok(())
    }

    /// Reads the persisted document for `id`.
    pub fn load(&self, id: &SessionId) -> Result<Session, StoreError> {
        let path = self.path_for(id);
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    id: id.clone(),
                    dir: self.dir.clone(),
                });
            }
            Err(source) => {
                return Err(StoreError::Io {
                    context: format!("reading {}", path.display()),
                    source,
                });
            }
        };
        serde_json::from_slice(&content).map_err(|source| StoreError::Json { path, source })
    }

    /// Lists the ids of all persisted sessions, sorted.
    ///
    /// Files that are not session documents (export artifacts, temp files,
    /// names that are not valid ids) are skipped.
    pub fn list(&self) -> Result<Vec<SessionId>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::Io {
            context: format!("listing {}", self.dir.display()),
            source,
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                context: format!("listing {}", self.dir.display()),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SESSION_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.ends_with(EXPORT_SUFFIX) {
                continue;
            }
            match SessionId::new(stem) {
                Ok(id) => ids.push(id),
                Err(e) => tracing::debug!(file = %path.display(), error = %e, "skipping file"),
            }
        }

        ids.sort();
        Ok(ids)
    }
}

/// Atomic write: write to a temp file in the target's directory, then rename.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|source| StoreError::Io {
        context: format!("creating temp file in {}", dir.display()),
        source,
    })?;

    tmp.write_all(contents)
        .and_then(|()| tmp.flush())
        .map_err(|source| StoreError::Io {
            context: format!("writing temp file for {}", path.display()),
            source,
        })?;

    tmp.persist(path).map_err(|e| StoreError::Io {
        context: format!("persisting {}", path.display()),
        source: e.error,
    })?;

    Ok(())
}
