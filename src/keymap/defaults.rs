//! Shipped keybindings and the layered startup load
//!
//! The default and vehicle keybinding files ship inside the binary. Either can
//! be replaced by a file on disk; the user preferences file is always on disk.

use std::path::{Path, PathBuf};

use super::config::KeymapError;
use super::legacy;
use super::manager::InputManager;

/// Default keybindings embedded at compile time
pub const DEFAULT_KEYBINDINGS_JSON: &str = include_str!("../../keybindings/default.json");

/// Vehicle keybindings embedded at compile time
pub const VEHICLE_KEYBINDINGS_JSON: &str = include_str!("../../keybindings/vehicle.json");

/// Where each layer of the binding table comes from.
///
/// `None` for `defaults`/`vehicle` selects the embedded file. `None` for
/// `user` disables the user layer and saving. `legacy` is only read when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeybindingPaths {
    pub defaults: Option<PathBuf>,
    pub vehicle: Option<PathBuf>,
    pub user: Option<PathBuf>,
    pub legacy: Option<PathBuf>,
}

impl KeybindingPaths {
    /// Embedded defaults plus the given user file
    pub fn with_user(user: impl Into<PathBuf>) -> Self {
        Self {
            user: Some(user.into()),
            ..Self::default()
        }
    }
}

/// Build the binding table for this process.
///
/// Loading order (each layer may add entries or overwrite event lists):
/// 1. Default keybindings (mandatory)
/// 2. Vehicle keybindings
/// 3. User preferences
///
/// A legacy keymap, if configured and present, is imported afterwards.
pub fn load_input_manager(paths: &KeybindingPaths) -> Result<InputManager, KeymapError> {
    let mut manager = InputManager::new();

    load_layer(
        &mut manager,
        paths.defaults.as_deref(),
        DEFAULT_KEYBINDINGS_JSON,
        "embedded defaults",
    )?;
    load_layer(
        &mut manager,
        paths.vehicle.as_deref(),
        VEHICLE_KEYBINDINGS_JSON,
        "embedded vehicle defaults",
    )?;

    if let Some(user) = &paths.user {
        manager.load_file(user, true)?;
        manager.set_user_path(Some(user.clone()));
    }

    if let Some(legacy_path) = &paths.legacy {
        if legacy_path.exists() {
            match legacy::import_legacy_keymap(&mut manager, legacy_path) {
                Ok(imported) => tracing::info!(
                    "Imported {} legacy keymap entries from {}",
                    imported,
                    legacy_path.display()
                ),
                Err(e) => tracing::warn!(
                    "Could not import legacy keymap {}: {}",
                    legacy_path.display(),
                    e
                ),
            }
        }
    }

    Ok(manager)
}

fn load_layer(
    manager: &mut InputManager,
    path: Option<&Path>,
    embedded: &str,
    origin: &str,
) -> Result<(), KeymapError> {
    match path {
        Some(path) => manager.load_file(path, false),
        None => manager.load_str(embedded, origin, false),
    }
}
