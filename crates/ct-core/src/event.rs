//! Recorded occurrences and the typed inputs that produce them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event_kind::EventKind;
use crate::lenient::parse_or_zero;

/// One immutable, timestamped entry in a session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The type of occurrence.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// When the event was committed to the log.
    pub timestamp: DateTime<Utc>,
    /// Kind-specific payload.
    #[serde(default)]
    pub data: EventData,
}

/// Kind-dependent payload fields.
///
/// Fields a kind does not use stay `None` and are omitted from the serialized
/// form, so "never set" survives a trip through storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// 1-based line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// 1-based column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Total lines in the buffer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_count: Option<u32>,
    /// Editor-internal change counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_tick: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Event {
    pub const fn new(kind: EventKind, data: EventData, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            timestamp,
            data,
        }
    }

    pub fn session_start(project_path: &str, at: DateTime<Utc>) -> Self {
        Self::new(
            EventKind::SessionStart,
            EventData::with_note(format!("Started recording session in {project_path}")),
            at,
        )
    }

    pub fn session_end(at: DateTime<Utc>) -> Self {
        Self::new(
            EventKind::SessionEnd,
            EventData::with_note("Recording session ended"),
            at,
        )
    }

    pub fn session_resume(at: DateTime<Utc>) -> Self {
        Self::new(
            EventKind::SessionResume,
            EventData::with_note("Session resumed"),
            at,
        )
    }

    pub fn annotation(note: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::new(EventKind::Annotation, EventData::with_note(note), at)
    }

    pub fn terminal_command(command: impl Into<String>, at: DateTime<Utc>) -> Self {
        let data = EventData {
            command: Some(command.into()),
            ..EventData::default()
        };
        Self::new(EventKind::TerminalCommand, data, at)
    }

    pub fn file_edit(edit: EditOccurrence, at: DateTime<Utc>) -> Self {
        Self::new(EventKind::FileEdit, edit.into(), at)
    }

    pub fn cursor_move(cursor: CursorOccurrence, at: DateTime<Utc>) -> Self {
        Self::new(EventKind::CursorMove, cursor.into(), at)
    }
}

impl EventData {
    fn with_note(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::default()
        }
    }
}

/// A buffer edit reported by the editor, before debouncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOccurrence {
    pub filename: String,
    pub line: u32,
    pub column: u32,
    pub line_count: u32,
    pub changed_tick: u64,
}

impl EditOccurrence {
    /// Builds an edit from raw editor text using the lenient parse policy.
    pub fn parse_lenient(
        filename: &str,
        line: &str,
        column: &str,
        line_count: &str,
        changed_tick: &str,
    ) -> Self {
        Self {
            filename: filename.to_string(),
            line: parse_or_zero("line", line),
            column: parse_or_zero("column", column),
            line_count: parse_or_zero("line_count", line_count),
            changed_tick: parse_or_zero("changed_tick", changed_tick),
        }
    }
}

impl From<EditOccurrence> for EventData {
    fn from(edit: EditOccurrence) -> Self {
        Self {
            filename: Some(edit.filename),
            line: Some(edit.line),
            column: Some(edit.column),
            line_count: Some(edit.line_count),
            changed_tick: Some(edit.changed_tick),
            ..Self::default()
        }
    }
}

/// A cursor position reported by the editor, before debouncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorOccurrence {
    pub filename: String,
    pub line: u32,
    pub column: u32,
}

impl CursorOccurrence {
    /// Builds a cursor move from raw editor text using the lenient parse policy.
    pub fn parse_lenient(filename: &str, line: &str, column: &str) -> Self {
        Self {
            filename: filename.to_string(),
            line: parse_or_zero("line", line),
            column: parse_or_zero("column", column),
        }
    }
}

impl From<CursorOccurrence> for EventData {
    fn from(cursor: CursorOccurrence) -> Self {
        Self {
            filename: Some(cursor.filename),
            line: Some(cursor.line),
            column: Some(cursor.column),
            ..Self::default()
        }
    }
}
