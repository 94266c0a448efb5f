//! Strata Configuration Module
//!
//! Config is stored in `~/.config/strata/config.yaml`.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. CLI flags
//! 2. Environment variables (`STRATA_THEME`, `STRATA_NO_SHADOW`)
//! 3. Config file
//! 4. Defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StrataError};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StrataConfig {
    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Visual options read by every render pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Draw drop shadows under dialogs
    pub shadow: bool,
    /// Shade level 1-4 for shadows (0 disables drawing but keeps the space)
    pub shadow_level: u8,
    /// Unicode box drawing (false = ASCII)
    pub line_characters: bool,
    /// Built-in theme name or path to a theme file
    pub theme: String,
    /// Expanded log panel height; `None` = half the terminal
    pub log_panel_height: Option<u16>,
    /// Event loop tick in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            shadow: true,
            shadow_level: 2,
            line_characters: true,
            theme: "classic".to_string(),
            log_panel_height: None,
            tick_rate_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Log file; `None` = `<data_dir>/strata/strata.log`
    pub file: Option<PathBuf>,
    /// Lines preloaded into the log panel
    pub backlog_lines: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            backlog_lines: 200,
        }
    }
}

impl StrataConfig {
    /// Returns `~/.config/strata/` on Unix, `%APPDATA%/strata/` on Windows
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("strata")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Load from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file
    ///
    /// Returns default config if the file doesn't exist.
    /// Returns error if the file exists but is malformed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| StrataError::ConfigError {
            reason: format!("Failed to read config file: {}", e),
        })?;

        serde_yaml::from_str(&content).map_err(|e| StrataError::ConfigError {
            reason: format!("Failed to parse config file: {}", e),
        })
    }

    /// Save configuration, creating the directory if needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| StrataError::ConfigError {
                    reason: format!("Failed to create config directory: {}", e),
                })?;
            }
        }

        let content = serde_yaml::to_string(self).map_err(|e| StrataError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| StrataError::ConfigError {
            reason: format!("Failed to write config file: {}", e),
        })
    }

    /// Merge with environment variables
    pub fn with_env(mut self) -> Self {
        if let Ok(theme) = std::env::var("STRATA_THEME") {
            if !theme.is_empty() {
                self.ui.theme = theme;
            }
        }
        if let Ok(flag) = std::env::var("STRATA_NO_SHADOW") {
            if matches!(flag.as_str(), "1" | "true" | "yes") {
                self.ui.shadow = false;
            }
        }
        self
    }

    /// Effective log file path
    pub fn log_file(&self) -> PathBuf {
        self.log.file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("strata")
                .join("strata.log")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_path_contains_strata() {
        let path = StrataConfig::config_path();
        assert!(path.to_string_lossy().contains("strata"));
        assert!(path.to_string_lossy().ends_with("config.yaml"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = StrataConfig::load_from(&dir.path().join("none.yaml")).unwrap();
        assert_eq!(config, StrataConfig::default());
        assert!(config.ui.shadow);
        assert_eq!(config.log.backlog_lines, 200);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "ui:\n  shadow: false\n  theme: midnight\n").unwrap();

        let config = StrataConfig::load_from(&path).unwrap();
        assert!(!config.ui.shadow);
        assert_eq!(config.ui.theme, "midnight");
        assert!(config.ui.line_characters);
        assert_eq!(config.ui.tick_rate_ms, 50);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "ui: [not, a, map").unwrap();
        let err = StrataConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, StrataError::ConfigError { .. }));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut config = StrataConfig::default();
        config.ui.shadow_level = 4;
        config.save_to(&path).unwrap();

        assert_eq!(StrataConfig::load_from(&path).unwrap(), config);
    }
}
