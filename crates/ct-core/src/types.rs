//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File stem suffix reserved for exported report artifacts.
pub const EXPORT_SUFFIX: &str = "_export";

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The value cannot be used as a file name inside the save directory.
    #[error("{field} must not contain path separators or control characters, got {value:?}")]
    InvalidCharacters { field: &'static str, value: String },

    /// The value collides with a name reserved for export artifacts.
    #[error("session ID {value:?} must not end with \"_export\"")]
    ReservedSuffix { value: String },
}

/// A validated session identifier.
///
/// Session IDs are chosen by the caller and double as the file stem of the
/// persisted document, so they must be safe to join onto a directory path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "session ID" });
        }
        let unsafe_char = id
            .chars()
            .any(|c| matches!(c, '/' | '\\') || c.is_control());
        if unsafe_char || id == "." || id == ".." {
            return Err(ValidationError::InvalidCharacters {
                field: "session ID",
                value: id,
            });
        }
        if id.ends_with(EXPORT_SUFFIX) {
            return Err(ValidationError::ReservedSuffix { value: id });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Report format selected by a session's `output_format` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Json,
    Markdown,
}

impl OutputFormat {
    /// The literal marker that selects JSON output.
    pub const JSON_MARKER: &'static str = "json";

    /// Resolves a configured format string.
    ///
    /// Only the exact JSON marker selects JSON; every other value means Markdown.
    #[must_use]
    pub fn from_marker(marker: &str) -> Self {
        if marker == Self::JSON_MARKER {
            Self::Json
        } else {
            Self::Markdown
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "markdown",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
