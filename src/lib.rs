//! inputmap - context-scoped keybinding resolution
//!
//! This crate maps raw input events (keyboard, gamepad, mouse) to named
//! actions, with layered JSON keybinding files, per-context overrides and an
//! interactive editor driven through a frontend trait.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod editor;
pub mod keymap;
pub mod session;
pub mod tracing;

// Re-export commonly used types
pub use config::EngineConfig;
pub use editor::{edit_keybindings, Frontend, Operator};
pub use keymap::{InputEvent, InputManager, KeymapError};
pub use session::{EventSource, InputSession};
