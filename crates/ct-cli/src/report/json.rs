use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ct_core::{EXPORT_SUFFIX, Session};

use super::Exporter;

/// Writes the full session document as `<id>_export.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn export(&self, session: &Session, dest: &Path) -> Result<PathBuf> {
        let path = dest.join(format!("{}{EXPORT_SUFFIX}.json", session.id));
        let json = serde_json::to_string_pretty(session).context("failed to serialize session")?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote JSON export");
        Ok(path)
    }
}
