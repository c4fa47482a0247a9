//! A session held in memory for the duration of one run.
//!
//! [`LiveSession`] pairs the session document with its store and the two
//! debounce workers (file edits, cursor moves). Appending to the log and
//! saving the snapshot happen under one lock, whether the caller or a
//! debounce worker triggers them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use ct_core::{
    CursorOccurrence, EditOccurrence, Event, EventKind, Session, SessionId, SessionState,
    StateError,
};
use ct_store::SessionStore;
use tokio_util::sync::CancellationToken;

use crate::config::RecorderConfig;
use crate::debounce::{Coalesce, DebounceSettings, Debouncer, EventSink};
use crate::error::RecorderError;

/// The session document and the store it persists to.
struct SessionCell {
    session: Mutex<Session>,
    store: SessionStore,
}

impl SessionCell {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `change` and saves the result as one critical section.
    ///
    /// The in-memory change is kept even if the save fails.
    fn apply<F>(&self, change: F) -> Result<(), RecorderError>
    where
        F: FnOnce(&mut Session) -> Result<(), StateError>,
    {
        let mut session = self.lock();
        change(&mut session)?;
        self.store.save(&session)?;
        Ok(())
    }
}

impl EventSink for SessionCell {
    fn commit(&self, event: Event) {
        let kind = event.kind;
        match self.apply(|session| session.record(event)) {
            Ok(()) => {}
            Err(RecorderError::State(e)) => {
                tracing::warn!(kind = %kind, error = %e, "discarding debounced event");
            }
            Err(e) => {
                tracing::error!(kind = %kind, error = %e, "failed to save debounced event");
            }
        }
    }
}

/// A session with running debounce workers.
pub struct LiveSession {
    id: SessionId,
    cell: Arc<SessionCell>,
    edits: Debouncer<EditOccurrence>,
    cursor: Debouncer<CursorOccurrence>,
    cancel: CancellationToken,
    flush_on_end: bool,
}

impl LiveSession {
    /// Wraps `session` and spawns its workers on the current runtime.
    ///
    /// Snapshots are written to the session's own `save_path`.
    pub(crate) fn spawn(session: Session, config: &RecorderConfig) -> Self {
        let id = session.id.clone();
        let store = SessionStore::new(&session.save_path);
        let cell = Arc::new(SessionCell {
            session: Mutex::new(session),
            store,
        });
        let cancel = CancellationToken::new();
        let settings = DebounceSettings {
            quiet_period: config.quiet_period,
            capacity: config.queue_capacity,
        };
        let sink = Arc::clone(&cell) as Arc<dyn EventSink>;

        let edits = Debouncer::spawn(
            id.clone(),
            EventKind::FileEdit,
            Coalesce::Latest,
            settings,
            Arc::clone(&sink),
            cancel.child_token(),
        );
        let cursor = Debouncer::spawn(
            id.clone(),
            EventKind::CursorMove,
            Coalesce::Latest,
            settings,
            sink,
            cancel.child_token(),
        );

        Self {
            id,
            cell,
            edits,
            cursor,
            cancel,
            flush_on_end: config.flush_on_end,
        }
    }

    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.cell.lock().state()
    }

    /// A copy of the document as it currently stands in memory.
    pub fn snapshot(&self) -> Session {
        self.cell.lock().clone()
    }

    pub(crate) fn start(&self) -> Result<(), RecorderError> {
        self.cell.apply(|session| session.start(Utc::now()))?;
        tracing::info!(session = %self.id, "session started");
        Ok(())
    }

    pub(crate) fn resume(&self) -> Result<(), RecorderError> {
        self.cell.apply(|session| session.resume(Utc::now()))?;
        tracing::info!(session = %self.id, "session resumed");
        Ok(())
    }

    /// Ends the session and stops its workers.
    ///
    /// With `flush_on_end`, occurrences still inside their quiet period are
    /// committed before `session_end`; otherwise they are dropped. Once
    /// `session_end` is appended the workers are stopped, even when the final
    /// save fails and its error is returned.
    pub async fn end(&self) -> Result<Session, RecorderError> {
        self.cell.lock().ensure_active("end")?;
        if self.flush_on_end {
            self.flush().await?;
        }
        match self.cell.apply(|session| session.end(Utc::now())) {
            Err(e @ RecorderError::State(_)) => return Err(e),
            saved => {
                // The transition stands in memory even if the save failed.
                self.shutdown().await;
                saved?;
            }
        }
        tracing::info!(session = %self.id, "session ended");
        Ok(self.snapshot())
    }

    /// Appends an annotation immediately.
    pub fn add_annotation(&self, note: &str) -> Result<(), RecorderError> {
        self.cell
            .apply(|session| session.record(Event::annotation(note, Utc::now())))
    }

    /// Appends a terminal command immediately.
    pub fn record_terminal_command(&self, command: &str) -> Result<(), RecorderError> {
        self.cell
            .apply(|session| session.record(Event::terminal_command(command, Utc::now())))
    }

    /// Queues an edit for debounced commit.
    pub async fn record_edit(&self, edit: EditOccurrence) -> Result<(), RecorderError> {
        self.cell.lock().ensure_active("record to")?;
        self.edits.push(edit).await
    }

    /// Queues a cursor move for debounced commit.
    pub async fn record_cursor_move(&self, cursor: CursorOccurrence) -> Result<(), RecorderError> {
        self.cell.lock().ensure_active("record to")?;
        self.cursor.push(cursor).await
    }

    /// Commits every pending debounced occurrence now.
    pub async fn flush(&self) -> Result<(), RecorderError> {
        self.edits.flush().await?;
        self.cursor.flush().await
    }

    /// Stops both workers. Pending occurrences are dropped.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.edits.shutdown().await;
        self.cursor.shutdown().await;
    }
}

impl std::fmt::Debug for LiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSession")
            .field("id", &self.id)
            .field("flush_on_end", &self.flush_on_end)
            .finish_non_exhaustive()
    }
}
