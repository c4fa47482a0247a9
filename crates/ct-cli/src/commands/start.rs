//! Start command for opening a new session.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ct_recorder::SessionManager;

/// Creates the save directory if needed, then starts and persists the session.
pub async fn run(
    output: &mut impl Write,
    manager: &SessionManager,
    session_id: &str,
    project_path: &str,
    save_path: &Path,
    output_format: &str,
) -> Result<()> {
    std::fs::create_dir_all(save_path)
        .with_context(|| format!("failed to create save directory {}", save_path.display()))?;

    let live = manager
        .start(session_id, project_path, save_path, output_format)
        .await
        .context("failed to start session")?;

    writeln!(output, "Session started: {}", live.id())?;
    Ok(())
}
