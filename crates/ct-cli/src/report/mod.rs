//! Session reports written when a session ends.

mod json;
mod markdown;

use std::path::{Path, PathBuf};

use anyhow::Result;
use ct_core::{OutputFormat, Session};

pub use json::JsonExporter;
pub use markdown::{MarkdownExporter, format_duration, render};

/// Renders a session to a report file inside a directory.
pub trait Exporter {
    /// Writes the report into `dest` and returns the path written.
    fn export(&self, session: &Session, dest: &Path) -> Result<PathBuf>;
}

/// Returns the exporter for a session's output format.
pub fn exporter_for(format: OutputFormat) -> Box<dyn Exporter> {
    match format {
        OutputFormat::Json => Box::new(JsonExporter),
        OutputFormat::Markdown => Box::new(MarkdownExporter),
    }
}
