use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::io::recovery::atomic_write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Board,
    Timeline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn parse_theme(s: &str) -> Option<Self> {
        match s {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

/// Persisted TUI state (written to .state.json), kept apart from the tasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    #[serde(default)]
    pub view: ViewMode,
    #[serde(default)]
    pub theme: ThemeMode,
}

/// Read .state.json from the data directory
pub fn read_ui_state(data_dir: &Path) -> Option<UiState> {
    let content = fs::read_to_string(data_dir.join(".state.json")).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the data directory
pub fn write_ui_state(data_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    fs::create_dir_all(data_dir)?;
    let content = serde_json::to_string_pretty(state)?;
    atomic_write(&data_dir.join(".state.json"), content.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let state = UiState {
            view: ViewMode::Timeline,
            theme: ThemeMode::Dark,
        };
        write_ui_state(dir.path(), &state).unwrap();
        assert_eq!(read_ui_state(dir.path()), Some(state));
    }

    #[test]
    fn read_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn read_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".state.json"), "not json {{{").unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn serde_defaults_on_partial_object() {
        let state: UiState = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(state.view, ViewMode::Board);
        assert_eq!(state.theme, ThemeMode::Dark);
    }

    #[test]
    fn theme_toggle() {
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
        assert_eq!(ThemeMode::parse_theme("dark"), Some(ThemeMode::Dark));
        assert_eq!(ThemeMode::parse_theme("blue"), None);
    }
}
