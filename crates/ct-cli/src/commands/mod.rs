//! CLI subcommand implementations.
//!
//! Each command writes its user-facing output to the given writer; diagnostics
//! go through `tracing`.

pub mod annotate;
pub mod attach;
pub mod end;
pub mod list;
pub mod record;
pub mod resume;
pub mod start;
