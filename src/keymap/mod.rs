//! Keybinding resolution engine
//!
//! This module maps raw input events to context-scoped action ids:
//! - Translates between portable key names and per-device key codes
//! - Merges shipped defaults, vehicle defaults and user preferences
//! - Resolves actions in a context with fallback to the global context
//! - Edits and persists bindings
//!
//! # Architecture
//!
//! ```text
//! keybindings.json → KeycodeRegistry → BindingTable → InputManager::resolve() → InputEvent list
//! ```
//!
//! # Loading
//!
//! ```ignore
//! // Embedded defaults plus the user's file
//! let mut manager = load_input_manager(&KeybindingPaths::with_user("keybindings.json"))?;
//! let resolved = manager.resolve("UP", "VEHICLE");
//! ```

mod binding;
mod config;
mod context;
mod defaults;
pub mod keycodes;
mod legacy;
mod manager;
mod registry;
mod types;

pub use binding::ActionAttributes;
pub use config::{
    parse_keybindings_json, serialize_table, BindingRecord, KeymapError,
    CURRENT_KEYBINDING_VERSION,
};
pub use context::{ActionNames, BindingTable, Context, IdAsName, Resolved, DEFAULT_CONTEXT};
pub use defaults::{
    load_input_manager, KeybindingPaths, DEFAULT_KEYBINDINGS_JSON, VEHICLE_KEYBINDINGS_JSON,
};
pub use legacy::{
    apply_legacy_keymap, import_legacy_keymap, parse_legacy_keymap, LegacyKeymap, LEGACY_CONTEXT,
};
pub use manager::{InputManager, NO_TIMEOUT};
pub use registry::{KeycodeRegistry, UNKNOWN_PREFIX};
pub use types::{
    DeviceFamily, InputEvent, InputKind, KeyboardMode, Modifier, Modifiers, Point, RawEvent,
};
