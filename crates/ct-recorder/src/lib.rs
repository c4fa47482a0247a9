//! Live recording for capytrace sessions.
//!
//! Provides the debounce pipeline that coalesces bursts of edits and cursor
//! moves, the in-memory [`LiveSession`] that serializes log appends with
//! saves, and the [`SessionManager`] that resolves ids to live sessions for
//! the duration of one run.

mod config;
pub mod debounce;
mod error;
mod live;
mod manager;

pub use config::{DEFAULT_QUEUE_CAPACITY, DEFAULT_QUIET_PERIOD, RecorderConfig};
pub use error::RecorderError;
pub use live::LiveSession;
pub use manager::SessionManager;
