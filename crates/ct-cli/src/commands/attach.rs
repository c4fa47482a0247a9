//! Attach command: a long-lived recorder fed by the editor over stdin.
//!
//! Each input line is one JSON request tagged by `op`:
//!
//! ```text
//! {"op":"edit","filename":"a.go","line":10,"column":4,"line_count":120,"changed_tick":3}
//! {"op":"cursor","filename":"a.go","line":"12","column":"1"}
//! {"op":"terminal","command":"go test ./..."}
//! {"op":"annotate","note":"flaky on CI"}
//! {"op":"end"}
//! ```
//!
//! Numbers may be sent as JSON numbers or text; both go through the lenient
//! parse policy. Malformed lines are logged and skipped. The loop stops after
//! `end` or at end of input.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ct_core::{CursorOccurrence, EditOccurrence};
use ct_recorder::SessionManager;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// One request read from the input stream.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request {
    Edit {
        filename: String,
        #[serde(default)]
        line: Value,
        #[serde(default)]
        column: Value,
        #[serde(default)]
        line_count: Value,
        #[serde(default)]
        changed_tick: Value,
    },
    Cursor {
        filename: String,
        #[serde(default)]
        line: Value,
        #[serde(default)]
        column: Value,
    },
    Terminal {
        command: String,
    },
    Annotate {
        note: String,
    },
    End,
}

/// Renders a JSON scalar as the raw text the lenient parser expects.
fn raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Reads requests until `end` or EOF. Returns the number of requests applied.
pub async fn run<R>(
    output: &mut impl Write,
    manager: &SessionManager,
    session_id: &str,
    save_path: &Path,
    input: R,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    // Fail fast on an unknown or ended session before reading anything.
    let live = manager
        .load(session_id, save_path)
        .await
        .context("failed to attach to session")?;
    live.snapshot()
        .ensure_active("attach to")
        .context("failed to attach to session")?;
    tracing::info!(session = %live.id(), "attached");

    let mut lines = input.lines();
    let mut applied = 0;
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, line, "skipping malformed request");
                continue;
            }
        };

        let ended = matches!(request, Request::End);
        match apply(output, manager, session_id, save_path, request).await {
            Ok(()) => applied += 1,
            Err(e) if ended => return Err(e),
            Err(e) => {
                let error = format!("{e:#}");
                tracing::warn!(%error, "request failed");
            }
        }
        if ended {
            return Ok(applied);
        }
    }

    tracing::info!(session = session_id, applied, "input closed");
    Ok(applied)
}

async fn apply(
    output: &mut impl Write,
    manager: &SessionManager,
    session_id: &str,
    save_path: &Path,
    request: Request,
) -> Result<()> {
    match request {
        Request::Edit {
            filename,
            line,
            column,
            line_count,
            changed_tick,
        } => {
            let edit = EditOccurrence::parse_lenient(
                &filename,
                &raw(&line),
                &raw(&column),
                &raw(&line_count),
                &raw(&changed_tick),
            );
            manager.record_edit(session_id, save_path, edit).await?;
        }
        Request::Cursor {
            filename,
            line,
            column,
        } => {
            let cursor = CursorOccurrence::parse_lenient(&filename, &raw(&line), &raw(&column));
            manager
                .record_cursor_move(session_id, save_path, cursor)
                .await?;
        }
        Request::Terminal { command } => {
            manager
                .record_terminal_command(session_id, save_path, &command)
                .await?;
        }
        Request::Annotate { note } => {
            crate::commands::annotate::run(output, manager, session_id, save_path, &note).await?;
        }
        Request::End => {
            crate::commands::end::run(output, manager, session_id, save_path).await?;
        }
    }
    Ok(())
}
