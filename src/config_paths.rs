//! Centralized configuration paths for inputmap
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/inputmap/`
//! - Windows: `%APPDATA%\inputmap\`
//!
//! This module is the single source of truth for config paths.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "inputmap";
/// Prefix of the daily rolling log files
pub const LOG_FILE_NAME: &str = "inputmap.log";

/// Base config directory for inputmap
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/inputmap`
///   - Else: `~/.config/inputmap`
///
/// Windows:
///   - `%APPDATA%\inputmap`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/inputmap/config.yaml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// `~/.config/inputmap/keybindings.json`
pub fn user_keybindings_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("keybindings.json"))
}

/// `~/.config/inputmap/keymap.txt`, the pre-JSON keymap
pub fn legacy_keymap_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("keymap.txt"))
}

/// `~/.config/inputmap/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

fn ensure_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))
}

/// Ensure logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = logs_dir().ok_or_else(|| "No config directory available".to_string())?;
    ensure_dir(&logs)?;
    Ok(logs)
}
