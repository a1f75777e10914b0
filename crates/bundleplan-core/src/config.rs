use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime configuration for the bundleplan CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory (the project root).
    pub cwd: PathBuf,

    /// Whether to emit JSON logs and JSON command output.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Create a config rooted at `cwd`, resolving a relative path against
    /// the process working directory. Without a path, the working directory
    /// itself is used.
    #[must_use]
    pub fn resolved(cwd: Option<PathBuf>) -> Self {
        let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let cwd = match cwd {
            Some(path) if path.is_absolute() => path,
            Some(path) => base.join(path),
            None => base,
        };
        Self::new(cwd)
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}
