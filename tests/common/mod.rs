//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;

use inputmap::editor::{EditorView, Operator};
use inputmap::keymap::{
    DeviceFamily, InputEvent, InputKind, InputManager, KeyboardMode, Modifiers, Point, RawEvent,
    DEFAULT_KEYBINDINGS_JSON, VEHICLE_KEYBINDINGS_JSON,
};
use inputmap::session::EventSource;

/// Manager with the shipped default and vehicle bindings, saving to `user`
pub fn test_manager(user: &Path) -> InputManager {
    let mut manager = InputManager::new().with_user_path(user);
    manager
        .load_str(DEFAULT_KEYBINDINGS_JSON, "default.json", false)
        .unwrap();
    manager
        .load_str(VEHICLE_KEYBINDINGS_JSON, "vehicle.json", false)
        .unwrap();
    manager
}

/// A plain character key press
pub fn key(c: char) -> RawEvent {
    RawEvent::new(InputEvent::char(c))
}

/// A character key press with modifiers
pub fn key_with(c: char, modifiers: Modifiers) -> RawEvent {
    RawEvent::new(InputEvent::char(c).with_mods(modifiers))
}

/// A named key from the character family, e.g. `"ESC"`
pub fn named(manager: &InputManager, name: &str) -> RawEvent {
    let code = manager
        .registry()
        .resolve_name(DeviceFamily::KeyboardChar, name);
    RawEvent::new(InputEvent::key(InputKind::KeyboardChar, code))
}

/// A mouse event at `(x, y)`
pub fn mouse(manager: &InputManager, name: &str, x: i32, y: i32) -> RawEvent {
    let code = manager.registry().resolve_name(DeviceFamily::Mouse, name);
    RawEvent::at(InputEvent::key(InputKind::Mouse, code), Point::new(x, y))
}

/// Frontend replaying scripted input and answers.
///
/// Running out of script panics, so a test never hangs on a read loop.
#[derive(Default)]
pub struct ScriptedFrontend {
    pub events: VecDeque<RawEvent>,
    pub confirms: VecDeque<bool>,
    pub keys: VecDeque<InputEvent>,
    pub filters: VecDeque<Option<String>>,
    /// Messages passed to `confirm`, in order
    pub questions: Vec<String>,
    pub notices: Vec<String>,
    pub prompts: Vec<String>,
    pub views: Vec<EditorView>,
    /// Timeouts requested by each read
    pub waits: Vec<Option<u32>>,
}

impl ScriptedFrontend {
    pub fn new(events: impl IntoIterator<Item = RawEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn answering(mut self, confirms: impl IntoIterator<Item = bool>) -> Self {
        self.confirms.extend(confirms);
        self
    }

    pub fn capturing(mut self, keys: impl IntoIterator<Item = InputEvent>) -> Self {
        self.keys.extend(keys);
        self
    }

    pub fn last_view(&self) -> &EditorView {
        self.views.last().expect("editor never rendered")
    }

    pub fn is_exhausted(&self) -> bool {
        self.events.is_empty() && self.confirms.is_empty() && self.keys.is_empty()
    }
}

impl EventSource for ScriptedFrontend {
    fn next_event(&mut self, _mode: KeyboardMode, timeout: Option<u32>) -> RawEvent {
        self.waits.push(timeout);
        self.events.pop_front().expect("event script exhausted")
    }
}

impl Operator for ScriptedFrontend {
    fn confirm(&mut self, message: &str) -> bool {
        self.questions.push(message.to_string());
        self.confirms
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected confirmation: {message}"))
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn query_key(&mut self, prompt: &str, _mode: KeyboardMode) -> InputEvent {
        self.prompts.push(prompt.to_string());
        self.keys.pop_front().expect("key script exhausted")
    }

    fn filter_phrase(&mut self, _current: &str) -> Option<String> {
        self.filters.pop_front().flatten()
    }

    fn render(&mut self, view: &EditorView) {
        self.views.push(view.clone());
    }
}
