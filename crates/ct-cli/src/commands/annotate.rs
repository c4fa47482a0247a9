use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ct_recorder::SessionManager;

pub async fn run(
    output: &mut impl Write,
    manager: &SessionManager,
    session_id: &str,
    save_path: &Path,
    note: &str,
) -> Result<()> {
    manager
        .annotate(session_id, save_path, note)
        .await
        .context("failed to add annotation")?;
    writeln!(output, "Annotation added")?;
    Ok(())
}
