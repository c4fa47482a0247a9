//! Event kind enum as the single source of truth for event type strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of occurrence recorded in a session log.
///
/// Declaration order is the order used for per-kind summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    SessionStart,
    SessionEnd,
    Annotation,
    FileEdit,
    TerminalCommand,
    CursorMove,
    SessionResume,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::SessionStart,
        Self::SessionEnd,
        Self::Annotation,
        Self::FileEdit,
        Self::TerminalCommand,
        Self::CursorMove,
        Self::SessionResume,
    ];

    /// String representation used in the persisted document.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SessionStart => "session_start",
            Self::SessionEnd => "session_end",
            Self::Annotation => "annotation",
            Self::FileEdit => "file_edit",
            Self::TerminalCommand => "terminal_command",
            Self::CursorMove => "cursor_move",
            Self::SessionResume => "session_resume",
        }
    }

    /// Whether occurrences of this kind go through the debounce pipeline.
    #[must_use]
    pub const fn is_debounced(&self) -> bool {
        matches!(self, Self::FileEdit | Self::CursorMove)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

impl Serialize for EventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown event kind strings.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown event kind: {0}")]
pub struct UnknownEventKind(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_variants() {
        for kind in EventKind::ALL {
            let s = kind.to_string();
            let parsed: EventKind = s.parse().expect("should parse");
            assert_eq!(parsed, kind, "roundtrip failed for {kind:?}");
        }
    }

    #[test]
    fn only_edits_and_cursor_moves_are_debounced() {
        let debounced: Vec<_> = EventKind::ALL
            .into_iter()
            .filter(EventKind::is_debounced)
            .collect();
        assert_eq!(debounced, vec![EventKind::FileEdit, EventKind::CursorMove]);
    }

    #[test]
    fn unknown_kind_errors() {
        let result: Result<EventKind, _> = "keystroke".parse();
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "unknown event kind: keystroke");
    }

    #[test]
    fn serializes_as_snake_case_string() {
        let json = serde_json::to_string(&EventKind::TerminalCommand).unwrap();
        assert_eq!(json, r#""terminal_command""#);

        let parsed: EventKind = serde_json::from_str(r#""cursor_move""#).unwrap();
        assert_eq!(parsed, EventKind::CursorMove);
    }
}
