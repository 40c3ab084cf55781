//! Configuration loading for Nova applications
//!
//! Provides utilities for loading and saving JSON configuration files in the
//! shared Nova config directory (`~/.config/nova/` by default).
//!
//! The directory can be overridden with the `NOVA_CONFIG_DIR` environment
//! variable, which tests use to point at a temporary directory.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Get the Nova config directory.
///
/// Honors `NOVA_CONFIG_DIR` if set, otherwise `~/.config/nova/`.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("NOVA_CONFIG_DIR")
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|p| p.join("nova"))
}

/// Get the path to a config file within the Nova config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    config_dir().map(|p| p.join(filename))
}

/// Check if a config file exists in the Nova config directory
pub fn config_exists(filename: &str) -> bool {
    config_path(filename).is_some_and(|p| p.exists())
}

/// Ensure the Nova config directory exists, creating it if necessary
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir().context("Could not determine config directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

/// Load and parse a JSON config file from the Nova config directory
pub fn load_json<T: DeserializeOwned>(filename: &str) -> Result<T> {
    let path = config_path(filename).context("Could not determine config directory")?;
    load_json_file(&path)
}

/// Load and parse a JSON file from an arbitrary path
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Save a value as pretty-printed JSON to a file in the Nova config directory
pub fn save_json<T: serde::Serialize>(filename: &str, value: &T) -> Result<()> {
    let dir = ensure_config_dir()?;
    let path = dir.join(filename);
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_under_config_dir() {
        let path = config_path("test.json");
        assert!(path.is_some());
        assert!(path.unwrap().ends_with("test.json"));
    }

    #[test]
    fn test_load_json_file_missing() {
        let result: Result<serde_json::Value> =
            load_json_file(Path::new("/nonexistent/nova/test.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value.json");
        std::fs::write(&path, r#"{"name": "nova"}"#).unwrap();

        let value: serde_json::Value = load_json_file(&path).unwrap();
        assert_eq!(value["name"], "nova");
    }
}
