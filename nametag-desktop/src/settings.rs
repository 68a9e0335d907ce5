//! Application settings
//!
//! Read once at startup; the application never writes this file.

use std::path::PathBuf;
use std::time::Duration;

use nametag_registry::{DEFAULT_EXPORT_FILE, DEFAULT_SETTLE};
use serde::Deserialize;
use tracing::Level;

/// Application settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Where "Export .reg" writes
    pub export_path: PathBuf,
    /// Wait after re-enumeration before querying devices again
    pub settle_ms: u64,
    /// Initial diagnostics level: off, error, warn, info, debug or trace
    pub diagnostic_level: String,
    /// Use a simulated host instead of the OS
    pub simulate: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
            settle_ms: DEFAULT_SETTLE.as_millis() as u64,
            diagnostic_level: "info".to_string(),
            simulate: false,
        }
    }
}

impl Settings {
    /// Get the XDG config directory for nametag
    /// Uses $XDG_CONFIG_HOME/nametag, falls back to ~/.config/nametag
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("nametag"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("nametag"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::settings_path()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .map(|s| Self::from_json(&s))
            .unwrap_or_default()
    }

    /// Parse settings; invalid JSON yields defaults
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring invalid settings file: {}", e);
                Self::default()
            }
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Parsed diagnostics level; `None` means off
    pub fn diagnostic_level(&self) -> Option<Level> {
        match self.diagnostic_level.trim().to_ascii_lowercase().as_str() {
            "off" | "" => None,
            other => Some(other.parse().unwrap_or(Level::INFO)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "settle_ms": 500 }"#);

        assert_eq!(settings.settle(), Duration::from_millis(500));
        assert_eq!(settings.export_path, PathBuf::from("spoof_patch.reg"));
        assert!(!settings.simulate);
    }

    #[test]
    fn test_default_settle_matches_rescanner() {
        assert_eq!(Settings::default().settle(), DEFAULT_SETTLE);
        assert_eq!(Settings::from_json("{}").settle(), DEFAULT_SETTLE);
    }

    #[test]
    fn test_invalid_file_yields_defaults() {
        assert_eq!(Settings::from_json("{ not json"), Settings::default());
    }

    #[test]
    fn test_diagnostic_level() {
        let mut settings = Settings::default();
        assert_eq!(settings.diagnostic_level(), Some(Level::INFO));

        settings.diagnostic_level = "DEBUG".into();
        assert_eq!(settings.diagnostic_level(), Some(Level::DEBUG));

        settings.diagnostic_level = "off".into();
        assert_eq!(settings.diagnostic_level(), None);

        settings.diagnostic_level = "loud".into();
        assert_eq!(settings.diagnostic_level(), Some(Level::INFO));
    }
}
