//! Engine configuration persistence
//!
//! Stores user preferences in `~/.config/inputmap/config.yaml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::keymap::{InputManager, KeybindingPaths, KeyboardMode};

/// Engine configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Keyboard family sessions prefer
    pub keyboard_mode: KeyboardMode,
    /// Whether the input backend can report raw key codes
    pub keycode_mode_supported: bool,
    /// Ask before the editor removes bindings
    pub query_keybind_removal: bool,
    /// Rows the editor shows at once; unset fits the hotkey count
    pub editor_rows: Option<usize>,
    /// Replaces the embedded default keybindings
    pub defaults_file: Option<PathBuf>,
    /// Replaces the embedded vehicle keybindings
    pub vehicle_file: Option<PathBuf>,
    /// User preferences; defaults to `keybindings.json` in the config dir
    pub user_file: Option<PathBuf>,
    /// Old flat keymap; defaults to `keymap.txt` in the config dir
    pub legacy_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            keyboard_mode: KeyboardMode::default(),
            keycode_mode_supported: true,
            query_keybind_removal: true,
            editor_rows: None,
            defaults_file: None,
            vehicle_file: None,
            user_file: None,
            legacy_file: None,
        }
    }
}

impl EngineConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, or return defaults if it is missing or invalid
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Keybinding sources, with unset user and legacy files taken from the config dir
    pub fn keybinding_paths(&self) -> KeybindingPaths {
        KeybindingPaths {
            defaults: self.defaults_file.clone(),
            vehicle: self.vehicle_file.clone(),
            user: self
                .user_file
                .clone()
                .or_else(crate::config_paths::user_keybindings_file),
            legacy: self
                .legacy_file
                .clone()
                .or_else(crate::config_paths::legacy_keymap_file),
        }
    }

    /// Copy the engine-wide settings into `manager`
    pub fn apply(&self, manager: &mut InputManager) {
        manager.set_keycode_mode_supported(self.keycode_mode_supported);
        manager.set_query_keybind_removal(self.query_keybind_removal);
        manager.set_editor_rows(self.editor_rows);
    }
}
