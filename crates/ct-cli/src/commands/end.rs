//! End command: closes the session and writes its report.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ct_recorder::SessionManager;

use crate::report::exporter_for;

/// Ends the session, then exports it next to its document.
pub async fn run(
    output: &mut impl Write,
    manager: &SessionManager,
    session_id: &str,
    save_path: &Path,
) -> Result<()> {
    let session = manager
        .end(session_id, save_path)
        .await
        .context("failed to end session")?;

    let exporter = exporter_for(session.format());
    let path = exporter
        .export(&session, &session.save_path)
        .context("failed to export session")?;
    tracing::info!(session = %session.id, path = %path.display(), "exported session");

    writeln!(output, "Session ended and exported: {}", session.id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use ct_recorder::RecorderConfig;

    use super::*;

    async fn started(manager: &SessionManager, dir: &Path, format: &str) {
        manager.start("s1", "/proj", dir, format).await.unwrap();
    }

    #[tokio::test]
    async fn end_exports_markdown_by_default() {
        let temp = tempfile::tempdir().unwrap();
        let manager = SessionManager::new(RecorderConfig::default());
        started(&manager, temp.path(), "md").await;
        let mut output = Vec::new();

        run(&mut output, &manager, "s1", temp.path()).await.unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Session ended and exported: s1\n"
        );
        let report = std::fs::read_to_string(temp.path().join("s1.md")).unwrap();
        assert!(report.starts_with("# Debug Session: s1\n"));
        assert!(!temp.path().join("s1_export.json").exists());
    }

    #[tokio::test]
    async fn end_exports_json_for_json_marker() {
        let temp = tempfile::tempdir().unwrap();
        let manager = SessionManager::new(RecorderConfig::default());
        started(&manager, temp.path(), "json").await;
        let mut output = Vec::new();

        run(&mut output, &manager, "s1", temp.path()).await.unwrap();

        assert!(temp.path().join("s1_export.json").is_file());
        assert!(!temp.path().join("s1.md").exists());
    }

    #[tokio::test]
    async fn end_unknown_session_fails_without_output() {
        let temp = tempfile::tempdir().unwrap();
        let manager = SessionManager::new(RecorderConfig::default());
        let mut output = Vec::new();

        let err = run(&mut output, &manager, "ghost", temp.path())
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("ghost"));
        assert!(output.is_empty());
    }
}
