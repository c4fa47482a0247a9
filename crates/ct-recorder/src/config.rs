//! Tunables for live sessions.

use std::time::Duration;

/// Quiet period after which a debounced occurrence is committed.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Pending occurrences a debounce queue holds before `push` waits.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Recorder behaviour shared by every session a manager opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Silence required on a kind before its latest occurrence is committed.
    pub quiet_period: Duration,
    /// Bounded queue size per debounced kind.
    pub queue_capacity: usize,
    /// Commit occurrences still inside their quiet period before `end`.
    pub flush_on_end: bool,
    /// Commit pending occurrences when the manager closes.
    pub flush_on_exit: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            flush_on_end: true,
            flush_on_exit: true,
        }
    }
}
