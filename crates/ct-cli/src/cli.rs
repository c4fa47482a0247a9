//! Command-line argument definitions.
//!
//! The argv shape is fixed by the editor integration: positional arguments
//! only, numbers passed as text.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Editor session recorder.
///
/// Captures file edits, cursor movement, terminal commands and notes as a
/// timestamped session log, and renders it as a report when the session ends.
#[derive(Debug, Parser)]
#[command(name = "capytrace", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a new session.
    Start {
        session_id: String,
        project_path: String,
        save_path: PathBuf,
        /// `json` for a JSON export, anything else for Markdown.
        output_format: String,
    },

    /// End a session and export its report.
    End {
        session_id: String,
        save_path: PathBuf,
    },

    /// Add a free-text note to a session.
    Annotate {
        session_id: String,
        save_path: PathBuf,
        #[arg(allow_hyphen_values = true)]
        note: String,
    },

    /// Record a buffer edit (debounced).
    RecordEdit {
        session_id: String,
        save_path: PathBuf,
        filename: String,
        #[arg(allow_hyphen_values = true)]
        line: String,
        #[arg(allow_hyphen_values = true)]
        col: String,
        #[arg(allow_hyphen_values = true)]
        line_count: String,
        #[arg(allow_hyphen_values = true)]
        changed_tick: String,
    },

    /// Record a cursor move (debounced).
    RecordCursor {
        session_id: String,
        save_path: PathBuf,
        filename: String,
        #[arg(allow_hyphen_values = true)]
        line: String,
        #[arg(allow_hyphen_values = true)]
        col: String,
    },

    /// Record a terminal command.
    RecordTerminal {
        session_id: String,
        save_path: PathBuf,
        #[arg(allow_hyphen_values = true)]
        command: String,
    },

    /// List recorded sessions.
    List {
        /// Defaults to the configured save path.
        save_path: Option<PathBuf>,
    },

    /// Reactivate an ended session.
    Resume {
        session_id: String,
        save_path: PathBuf,
    },

    /// Record from newline-delimited JSON commands on stdin.
    Attach {
        session_id: String,
        save_path: PathBuf,
    },
}
