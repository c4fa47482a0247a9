//! The session document and its lifecycle transitions.
//!
//! A [`Session`] is both the aggregate root held in memory and the exact shape
//! written to disk. Transitions here are pure: they mutate the document and
//! report invalid lifecycle use, leaving persistence and registration to the
//! caller.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::Event;
use crate::types::{OutputFormat, SessionId};

/// Lifecycle state derived from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created but never started.
    New,
    /// Between `start`/`resume` and the next `end`.
    Active,
    /// Ended; can be resumed.
    Ended,
}

impl SessionState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation was invoked outside its valid lifecycle state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot {operation} session {id}: session is {state}")]
pub struct StateError {
    pub id: SessionId,
    pub operation: &'static str,
    pub state: SessionState,
}

/// One tracked interval of developer activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub project_path: String,
    pub save_path: PathBuf,
    /// Raw format marker; see [`OutputFormat::from_marker`].
    pub output_format: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Append-only, in commit order.
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub active: bool,
}

impl Session {
    /// Creates a session in the [`SessionState::New`] state.
    pub fn new(
        id: SessionId,
        project_path: impl Into<String>,
        save_path: impl Into<PathBuf>,
        output_format: impl Into<String>,
    ) -> Self {
        Self {
            id,
            project_path: project_path.into(),
            save_path: save_path.into(),
            output_format: output_format.into(),
            start_time: Utc::now(),
            end_time: None,
            events: Vec::new(),
            active: false,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.active {
            SessionState::Active
        } else if self.events.is_empty() {
            SessionState::New
        } else {
            SessionState::Ended
        }
    }

    pub fn format(&self) -> OutputFormat {
        OutputFormat::from_marker(&self.output_format)
    }

    /// Marks the session started and logs `session_start`.
    pub fn start(&mut self, at: DateTime<Utc>) -> Result<(), StateError> {
        self.require("start", SessionState::New)?;
        self.start_time = at;
        self.active = true;
        self.events.push(Event::session_start(&self.project_path, at));
        Ok(())
    }

    /// Marks the session ended and logs `session_end`.
    pub fn end(&mut self, at: DateTime<Utc>) -> Result<(), StateError> {
        self.require("end", SessionState::Active)?;
        self.end_time = Some(at);
        self.active = false;
        self.events.push(Event::session_end(at));
        Ok(())
    }

    /// Reactivates a persisted session and logs `session_resume`.
    ///
    /// Resuming an already active session is allowed and still appends a
    /// resume marker; only a never-started session is rejected.
    pub fn resume(&mut self, at: DateTime<Utc>) -> Result<(), StateError> {
        if self.state() == SessionState::New {
            return Err(self.state_error("resume"));
        }
        self.active = true;
        self.events.push(Event::session_resume(at));
        Ok(())
    }

    /// Appends an activity event. Only valid while active.
    pub fn record(&mut self, event: Event) -> Result<(), StateError> {
        self.ensure_active("record to")?;
        self.events.push(event);
        Ok(())
    }

    /// Fails with a [`StateError`] naming `operation` unless the session is active.
    pub fn ensure_active(&self, operation: &'static str) -> Result<(), StateError> {
        self.require(operation, SessionState::Active)
    }

    fn require(&self, operation: &'static str, expected: SessionState) -> Result<(), StateError> {
        if self.state() == expected {
            Ok(())
        } else {
            Err(self.state_error(operation))
        }
    }

    fn state_error(&self, operation: &'static str) -> StateError {
        StateError {
            id: self.id.clone(),
            operation,
            state: self.state(),
        }
    }
}
