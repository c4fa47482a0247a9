//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ct_recorder::{DEFAULT_QUEUE_CAPACITY, DEFAULT_QUIET_PERIOD, RecorderConfig};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory used when a command is not given a save path.
    pub save_path: PathBuf,
    /// Quiet period for debounced edits and cursor moves, in milliseconds.
    pub quiet_period_ms: u64,
    /// Queue size per debounced kind before recording applies backpressure.
    pub queue_capacity: usize,
    /// Commit pending debounced occurrences before ending a session.
    pub flush_on_end: bool,
    /// Commit pending debounced occurrences before the process exits.
    pub flush_on_exit: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        let defaults = RecorderConfig::default();
        Self {
            save_path: data_dir.join("sessions"),
            quiet_period_ms: u64::try_from(DEFAULT_QUIET_PERIOD.as_millis()).unwrap_or(500),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            flush_on_end: defaults.flush_on_end,
            flush_on_exit: defaults.flush_on_exit,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Environment variables (CAPYTRACE_*)
        figment = figment.merge(Env::prefixed("CAPYTRACE_"));

        figment.extract()
    }

    /// Recorder settings derived from this configuration.
    pub fn recorder(&self) -> RecorderConfig {
        RecorderConfig {
            quiet_period: Duration::from_millis(self.quiet_period_ms),
            queue_capacity: self.queue_capacity,
            flush_on_end: self.flush_on_end,
            flush_on_exit: self.flush_on_exit,
        }
    }
}

/// Returns the platform-specific config directory for capytrace.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("capytrace"))
}

/// Returns the platform-specific data directory for capytrace.
///
/// On Linux: `~/.local/share/capytrace`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("capytrace"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_capytrace() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "capytrace");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_sessions() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.save_path, data_dir.join("sessions"));
    }

    #[test]
    fn test_default_recorder_matches_recorder_defaults() {
        assert_eq!(Config::default().recorder(), RecorderConfig::default());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "save_path = \"/tmp/traces\"\nquiet_period_ms = 250\nflush_on_end = false\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.save_path, PathBuf::from("/tmp/traces"));
        assert_eq!(config.quiet_period_ms, 250);
        assert!(!config.flush_on_end);
        assert!(config.flush_on_exit);
        assert_eq!(
            config.recorder().quiet_period,
            Duration::from_millis(250)
        );
    }
}
