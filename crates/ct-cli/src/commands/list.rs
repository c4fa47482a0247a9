//! List command for recorded sessions.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ct_recorder::SessionManager;

/// Prints one session id per line, sorted.
pub fn run(output: &mut impl Write, manager: &SessionManager, save_path: &Path) -> Result<()> {
    let ids = manager
        .list(save_path)
        .with_context(|| format!("failed to list sessions in {}", save_path.display()))?;
    for id in ids {
        writeln!(output, "{id}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ct_recorder::RecorderConfig;

    use super::*;

    #[tokio::test]
    async fn list_prints_sorted_ids_without_exports() {
        let temp = tempfile::tempdir().unwrap();
        let manager = SessionManager::new(RecorderConfig::default());
        for id in ["beta", "alpha"] {
            manager.start(id, "/proj", temp.path(), "json").await.unwrap();
        }
        manager.end("alpha", temp.path()).await.unwrap();
        std::fs::write(temp.path().join("alpha_export.json"), "{}").unwrap();
        std::fs::write(temp.path().join("alpha.md"), "# Session").unwrap();
        let mut output = Vec::new();

        run(&mut output, &manager, temp.path()).unwrap();
        manager.close().await;

        assert_eq!(String::from_utf8(output).unwrap(), "alpha\nbeta\n");
    }

    #[test]
    fn list_missing_directory_fails() {
        let temp = tempfile::tempdir().unwrap();
        let manager = SessionManager::default();
        let mut output = Vec::new();

        let err = run(&mut output, &manager, &temp.path().join("missing")).unwrap_err();

        assert!(err.to_string().contains("failed to list sessions"));
    }
}
