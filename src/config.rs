use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming a settings file when no path is given.
pub const CONFIG_ENV: &str = "SHEET_SEARCH_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Tunables shared by the GUI and the CLI.
///
/// Stored as JSON; every field is optional in the file:
///
/// ```json
/// { "debounce_ms": 200, "gui_max_results": 5000 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Quiet period after the last keystroke before the GUI searches.
    pub debounce_ms: u64,
    /// Row cap passed to searches started from the GUI.
    pub gui_max_results: usize,
    /// Rows rendered in the GUI result table.
    pub display_limit: usize,
    /// Rows printed after a CLI search.
    pub cli_preview_rows: usize,
    /// Column width cap for CLI tables.
    pub cli_column_width: usize,
    /// How many leading columns are selected when none are chosen.
    pub default_column_count: usize,
    /// Initial state of the GUI "Case sensitive" toggle.
    pub case_sensitive: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            gui_max_results: 10_000,
            display_limit: 1_000,
            cli_preview_rows: 10,
            cli_column_width: 20,
            default_column_count: 2,
            case_sensitive: false,
        }
    }
}

impl Settings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load settings from `path`, or from `$SHEET_SEARCH_CONFIG` when `path`
    /// is `None`. With neither, defaults are returned.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(p) if !p.is_empty() => PathBuf::from(p),
                _ => return Ok(Self::default()),
            },
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded settings from {}: {settings:?}", path.display());
        Ok(settings)
    }
}
