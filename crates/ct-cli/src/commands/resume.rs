use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ct_recorder::SessionManager;

pub async fn run(
    output: &mut impl Write,
    manager: &SessionManager,
    session_id: &str,
    save_path: &Path,
) -> Result<()> {
    let live = manager
        .resume(session_id, save_path)
        .await
        .context("failed to resume session")?;
    writeln!(output, "Session resumed: {}", live.id())?;
    Ok(())
}
