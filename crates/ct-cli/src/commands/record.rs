//! Activity commands invoked by the editor integration.
//!
//! Numeric arguments arrive as text and go through the lenient parse policy
//! here, at the process boundary. Edits and cursor moves are debounced; the
//! manager's close at the end of the run decides whether a pending one lands.

use std::path::Path;

use anyhow::{Context, Result};
use ct_core::{CursorOccurrence, EditOccurrence};
use ct_recorder::SessionManager;

/// Raw `record-edit` arguments.
#[derive(Debug, Clone, Copy)]
pub struct EditArgs<'a> {
    pub filename: &'a str,
    pub line: &'a str,
    pub column: &'a str,
    pub line_count: &'a str,
    pub changed_tick: &'a str,
}

impl EditArgs<'_> {
    fn parse(&self) -> EditOccurrence {
        EditOccurrence::parse_lenient(
            self.filename,
            self.line,
            self.column,
            self.line_count,
            self.changed_tick,
        )
    }
}

pub async fn edit(
    manager: &SessionManager,
    session_id: &str,
    save_path: &Path,
    args: EditArgs<'_>,
) -> Result<()> {
    manager
        .record_edit(session_id, save_path, args.parse())
        .await
        .context("failed to record edit")
}

pub async fn cursor(
    manager: &SessionManager,
    session_id: &str,
    save_path: &Path,
    filename: &str,
    line: &str,
    column: &str,
) -> Result<()> {
    let cursor = CursorOccurrence::parse_lenient(filename, line, column);
    manager
        .record_cursor_move(session_id, save_path, cursor)
        .await
        .context("failed to record cursor move")
}

pub async fn terminal(
    manager: &SessionManager,
    session_id: &str,
    save_path: &Path,
    command: &str,
) -> Result<()> {
    manager
        .record_terminal_command(session_id, save_path, command)
        .await
        .context("failed to record terminal command")
}
