//! Core domain logic for the session recorder.
//!
//! This crate contains the fundamental types and logic for:
//! - Events: the kind-tagged, timestamped records appended to a session log
//! - Sessions: the persisted document and its lifecycle transitions
//! - Lenient parsing: the boundary policy for numeric editor input

pub mod event;
pub mod event_kind;
pub mod lenient;
pub mod session;
pub mod types;

pub use event::{CursorOccurrence, EditOccurrence, Event, EventData};
pub use event_kind::{EventKind, UnknownEventKind};
pub use session::{Session, SessionState, StateError};
pub use types::{EXPORT_SUFFIX, OutputFormat, SessionId, ValidationError};
