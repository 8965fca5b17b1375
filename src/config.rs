//! Editor preferences, persisted as JSON in the platform data directory.
//!
//! Loading is tolerant: a missing or unreadable file yields the defaults so
//! the editor always starts.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::log_warn;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Spacing of the coarse grid overlay, in image pixels. The fine
    /// 1-pixel grid is always drawn alongside it when zoomed in.
    pub tile_grid_spacing: u32,
    /// Canvas size used when the editor starts without an image file.
    pub blank_width: u32,
    pub blank_height: u32,
    /// Whether new sessions start with the minimap shown.
    pub minimap_default: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            tile_grid_spacing: 8,
            blank_width: 64,
            blank_height: 64,
            minimap_default: false,
        }
    }
}

pub fn config_path() -> PathBuf {
    data_dir().join("pixed").join("config.json")
}

pub fn load() -> EditorConfig {
    let path = config_path();
    match fs::read_to_string(&path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                log_warn!("ignoring malformed config {}: {}", path.display(), e);
                EditorConfig::default()
            }
        },
        Err(_) => EditorConfig::default(),
    }
}

/// Best effort; the editor runs fine without a writable data directory.
pub fn save(config: &EditorConfig) {
    let path = config_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(json) = serde_json::to_string_pretty(config) {
        let _ = fs::write(path, json);
    }
}

/// Platform data directory (without the app sub-folder).
pub(crate) fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support");
        }
    }
    // Linux / fallback
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::EditorConfig;

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{"tile_grid_spacing": 4}"#).unwrap();
        assert_eq!(config.tile_grid_spacing, 4);
        assert_eq!(config.blank_width, EditorConfig::default().blank_width);
        assert_eq!(config.minimap_default, EditorConfig::default().minimap_default);
    }
}
