//! The registry of live sessions for one run.
//!
//! Each CLI invocation is its own process, so the registry only spans the
//! operations of a single run; anything that must survive between runs lives
//! in the session documents on disk.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ct_core::{CursorOccurrence, EditOccurrence, Session, SessionId, SessionState, StateError};
use ct_store::{SessionStore, StoreError};

use crate::config::RecorderConfig;
use crate::error::RecorderError;
use crate::live::LiveSession;

/// Resolves session ids to live sessions and runs lifecycle operations.
#[derive(Debug, Default)]
pub struct SessionManager {
    config: RecorderConfig,
    sessions: Mutex<HashMap<SessionId, Arc<LiveSession>>>,
}

impl SessionManager {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub const fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Creates, registers and persists a new session.
    ///
    /// An id that already has a document in `save_path` is rejected; use
    /// [`SessionManager::resume`] to continue it. If the initial save fails the
    /// session stays registered for the rest of the run but is not durable.
    pub async fn start(
        &self,
        id: &str,
        project_path: &str,
        save_path: &Path,
        output_format: &str,
    ) -> Result<Arc<LiveSession>, RecorderError> {
        let id = SessionId::new(id)?;
        let store = SessionStore::new(save_path);
        match store.load(&id) {
            Ok(existing) => {
                return Err(StateError {
                    id,
                    operation: "start",
                    state: existing.state(),
                }
                .into());
            }
            Err(StoreError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        let session = Session::new(id.clone(), project_path, save_path, output_format);
        let live = Arc::new(LiveSession::spawn(session, &self.config));
        self.register(Arc::clone(&live)).await;
        live.start()?;
        Ok(live)
    }

    /// Returns the live session for `id`, loading it from disk if needed.
    ///
    /// A document loaded from disk is registered only if it is active.
    pub async fn load(&self, id: &str, save_path: &Path) -> Result<Arc<LiveSession>, RecorderError> {
        let id = SessionId::new(id)?;
        if let Some(live) = self.get(&id) {
            return Ok(live);
        }

        let session = SessionStore::new(save_path).load(&id)?;
        let active = session.active;
        let live = Arc::new(LiveSession::spawn(session, &self.config));
        if active {
            self.register(Arc::clone(&live)).await;
        }
        tracing::debug!(session = %id, active, "loaded session from disk");
        Ok(live)
    }

    /// Reactivates a persisted session.
    ///
    /// Always re-reads the document from disk. A live session registered under
    /// the same id is replaced and its workers are stopped.
    pub async fn resume(&self, id: &str, save_path: &Path) -> Result<Arc<LiveSession>, RecorderError> {
        let id = SessionId::new(id)?;
        let session = SessionStore::new(save_path).load(&id)?;
        let live = Arc::new(LiveSession::spawn(session, &self.config));
        self.register(Arc::clone(&live)).await;
        live.resume()?;
        Ok(live)
    }

    /// Ends a session and returns its final snapshot.
    ///
    /// The session leaves the registry as soon as it has ended in memory, so a
    /// failed final save is reported without leaving it registered.
    pub async fn end(&self, id: &str, save_path: &Path) -> Result<Session, RecorderError> {
        let live = self.load(id, save_path).await?;
        let ended = live.end().await;
        if live.state() == SessionState::Ended {
            self.registry().remove(live.id());
        }
        ended
    }

    pub async fn annotate(&self, id: &str, save_path: &Path, note: &str) -> Result<(), RecorderError> {
        self.load(id, save_path).await?.add_annotation(note)
    }

    pub async fn record_edit(
        &self,
        id: &str,
        save_path: &Path,
        edit: EditOccurrence,
    ) -> Result<(), RecorderError> {
        self.load(id, save_path).await?.record_edit(edit).await
    }

    pub async fn record_cursor_move(
        &self,
        id: &str,
        save_path: &Path,
        cursor: CursorOccurrence,
    ) -> Result<(), RecorderError> {
        self.load(id, save_path).await?.record_cursor_move(cursor).await
    }

    pub async fn record_terminal_command(
        &self,
        id: &str,
        save_path: &Path,
        command: &str,
    ) -> Result<(), RecorderError> {
        self.load(id, save_path).await?.record_terminal_command(command)
    }

    /// Lists persisted session ids in `save_path`, sorted.
    pub fn list(&self, save_path: &Path) -> Result<Vec<SessionId>, RecorderError> {
        Ok(SessionStore::new(save_path).list()?)
    }

    /// Returns the registered live session for `id`, if any.
    pub fn get(&self, id: &SessionId) -> Option<Arc<LiveSession>> {
        self.registry().get(id).cloned()
    }

    /// Ids of all registered sessions, sorted.
    pub fn active_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.registry().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Stops every registered session's workers and clears the registry.
    ///
    /// With `flush_on_exit`, pending debounced occurrences are committed
    /// first; otherwise they are abandoned.
    pub async fn close(&self) {
        let sessions: Vec<_> = self.registry().drain().map(|(_, live)| live).collect();
        for live in sessions {
            if self.config.flush_on_exit {
                if let Err(e) = live.flush().await {
                    tracing::warn!(session = %live.id(), error = %e, "failed to flush session");
                }
            }
            live.shutdown().await;
        }
    }

    async fn register(&self, live: Arc<LiveSession>) {
        let previous = self.registry().insert(live.id().clone(), live);
        if let Some(previous) = previous {
            tracing::debug!(session = %previous.id(), "replacing live session");
            previous.shutdown().await;
        }
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<SessionId, Arc<LiveSession>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
