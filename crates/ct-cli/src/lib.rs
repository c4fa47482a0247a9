//! Editor session recorder CLI library.
//!
//! This crate provides the `capytrace` command-line interface and the report
//! generators that run when a session ends.

mod cli;
pub mod commands;
mod config;
pub mod report;

pub use cli::{Cli, Commands};
pub use config::Config;
