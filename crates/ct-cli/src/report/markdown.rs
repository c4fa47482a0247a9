use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use ct_core::{Event, EventKind, Session};

use super::Exporter;

/// Writes a human-readable timeline as `<id>.md`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownExporter;

impl Exporter for MarkdownExporter {
    fn export(&self, session: &Session, dest: &Path) -> Result<PathBuf> {
        let path = dest.join(format!("{}.md", session.id));
        std::fs::write(&path, render(session))
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote Markdown export");
        Ok(path)
    }
}

/// Renders the session header, timeline and per-kind summary.
pub fn render(session: &Session) -> String {
    let mut output = String::new();

    writeln!(output, "# Debug Session: {}", session.id).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "- **Project:** {}", session.project_path).unwrap();
    writeln!(output, "- **Started:** {}", rfc3339(session.start_time)).unwrap();
    if let Some(end) = session.end_time {
        writeln!(output, "- **Ended:** {}", rfc3339(end)).unwrap();
        writeln!(
            output,
            "- **Duration:** {}",
            format_duration(end - session.start_time)
        )
        .unwrap();
    }
    writeln!(output).unwrap();
    writeln!(output, "---").unwrap();
    writeln!(output).unwrap();

    writeln!(output, "## Timeline").unwrap();
    writeln!(output).unwrap();
    for event in &session.events {
        write_event(&mut output, event);
    }

    writeln!(output, "## Summary").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "- **Total Events:** {}", session.events.len()).unwrap();
    for (kind, count) in count_by_kind(&session.events) {
        writeln!(output, "- **{}:** {count}", kind_title(kind)).unwrap();
    }

    output
}

fn write_event(output: &mut String, event: &Event) {
    let time = event.timestamp.format("%H:%M:%S");
    let data = &event.data;
    let note = data.note.as_deref().unwrap_or_default();
    let filename = data.filename.as_deref().unwrap_or_default();

    match event.kind {
        EventKind::SessionStart => {
            writeln!(output, "### {time} - Session Started").unwrap();
            writeln!(output, "🚀 {note}").unwrap();
        }
        EventKind::SessionEnd => {
            writeln!(output, "### {time} - Session Ended").unwrap();
            writeln!(output, "🏁 {note}").unwrap();
        }
        EventKind::SessionResume => {
            writeln!(output, "### {time} - Session Resumed").unwrap();
            writeln!(output, "🔄 {note}").unwrap();
        }
        EventKind::Annotation => {
            writeln!(output, "### {time} - Note").unwrap();
            writeln!(output, "📝 {note}").unwrap();
        }
        EventKind::FileEdit => {
            writeln!(output, "### {time} - File Edit").unwrap();
            writeln!(output, "- 📄 **File:** `{filename}`").unwrap();
            writeln!(
                output,
                "- 📍 **Position:** Line {}, Column {}",
                or_unknown(data.line),
                or_unknown(data.column)
            )
            .unwrap();
            writeln!(output, "- 📊 **Total Lines:** {}", or_unknown(data.line_count)).unwrap();
        }
        EventKind::CursorMove => {
            writeln!(output, "### {time} - Cursor Movement").unwrap();
            writeln!(output, "- 👆 **File:** `{filename}`").unwrap();
            writeln!(
                output,
                "- 📍 **Position:** Line {}, Column {}",
                or_unknown(data.line),
                or_unknown(data.column)
            )
            .unwrap();
        }
        EventKind::TerminalCommand => {
            writeln!(output, "### {time} - Terminal Command").unwrap();
            writeln!(output, "💻 **Command:**").unwrap();
            writeln!(output, "```bash").unwrap();
            writeln!(output, "{}", data.command.as_deref().unwrap_or_default()).unwrap();
            writeln!(output, "```").unwrap();
        }
    }
    writeln!(output).unwrap();
}

/// Event counts keyed by kind, in kind declaration order.
fn count_by_kind(events: &[Event]) -> BTreeMap<EventKind, usize> {
    let mut counts = BTreeMap::new();
    for event in events {
        *counts.entry(event.kind).or_insert(0) += 1;
    }
    counts
}

/// `file_edit` becomes `File Edit`.
fn kind_title(kind: EventKind) -> String {
    kind.as_str()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Formats a duration as `1h 2m 3s`, dropping leading zero units.
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use ct_core::{CursorOccurrence, EditOccurrence, SessionId};
    use insta::assert_snapshot;

    use super::*;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, h, m, s).unwrap()
    }

    fn recorded_session() -> Session {
        let mut session = Session::new(SessionId::new("s1").unwrap(), "/proj", "/tmp", "markdown");
        session.start(at(12, 0, 0)).unwrap();
        session
            .record(Event::file_edit(
                EditOccurrence::parse_lenient("a.go", "10", "4", "120", "3"),
                at(12, 0, 5),
            ))
            .unwrap();
        session
            .record(Event::cursor_move(
                CursorOccurrence::parse_lenient("a.go", "12", "1"),
                at(12, 1, 0),
            ))
            .unwrap();
        session
            .record(Event::terminal_command("go test ./...", at(12, 2, 30)))
            .unwrap();
        session
            .record(Event::annotation("flaky on CI", at(12, 3, 0)))
            .unwrap();
        session.end(at(12, 5, 30)).unwrap();
        session
    }

    #[test]
    fn test_render_full_session() {
        assert_snapshot!(render(&recorded_session()), @r#"
# Debug Session: s1

- **Project:** /proj
- **Started:** 2025-01-29T12:00:00Z
- **Ended:** 2025-01-29T12:05:30Z
- **Duration:** 5m 30s

---

## Timeline

### 12:00:00 - Session Started
🚀 Started recording session in /proj

### 12:00:05 - File Edit
- 📄 **File:** `a.go`
- 📍 **Position:** Line 10, Column 4
- 📊 **Total Lines:** 120

### 12:01:00 - Cursor Movement
- 👆 **File:** `a.go`
- 📍 **Position:** Line 12, Column 1

### 12:02:30 - Terminal Command
💻 **Command:**
```bash
go test ./...
```

### 12:03:00 - Note
📝 flaky on CI

### 12:05:30 - Session Ended
🏁 Recording session ended

## Summary

- **Total Events:** 6
- **Session Start:** 1
- **Session End:** 1
- **Annotation:** 1
- **File Edit:** 1
- **Terminal Command:** 1
- **Cursor Move:** 1
"#);
    }

    #[test]
    fn test_summary_counts_match_the_log() {
        let mut session = recorded_session();
        session.resume(at(13, 0, 0)).unwrap();
        session
            .record(Event::annotation("second pass", at(13, 1, 0)))
            .unwrap();
        session.end(at(13, 2, 0)).unwrap();

        let output = render(&session);

        assert!(output.contains("- **Total Events:** 9\n"));
        assert!(output.contains("- **Annotation:** 2\n"));
        assert!(output.contains("- **Session End:** 2\n"));
        assert!(output.contains("- **Session Resume:** 1\n"));
        assert!(output.contains("### 13:00:00 - Session Resumed\n🔄 Session resumed\n"));
    }

    #[test]
    fn test_active_session_has_no_end_or_duration() {
        let mut session = Session::new(SessionId::new("s2").unwrap(), "/proj", "/tmp", "");
        session.start(at(9, 0, 0)).unwrap();

        let output = render(&session);

        assert!(!output.contains("**Ended:**"));
        assert!(!output.contains("**Duration:**"));
        assert!(output.contains("- **Total Events:** 1\n"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::seconds(45)), "45s");
        assert_eq!(format_duration(TimeDelta::seconds(125)), "2m 5s");
        assert_eq!(format_duration(TimeDelta::seconds(3723)), "1h 2m 3s");
        assert_eq!(format_duration(TimeDelta::seconds(-5)), "0s");
    }

    #[test]
    fn test_export_writes_markdown_file() {
        let temp = tempfile::tempdir().unwrap();
        let session = recorded_session();

        let path = MarkdownExporter.export(&session, temp.path()).unwrap();

        assert_eq!(path, temp.path().join("s1.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), render(&session));
    }
}
