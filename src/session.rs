//! Per-screen input handling
//!
//! An [`InputSession`] belongs to one UI scope. It registers the actions the
//! scope understands, turns raw events into action ids through the
//! [`InputManager`], and offers the queries the keybinding editor needs.

use std::collections::HashMap;

use crate::editor::{self, Frontend};
use crate::keymap::{
    InputEvent, InputKind, InputManager, KeyboardMode, Point, RawEvent, DEFAULT_CONTEXT,
    NO_TIMEOUT,
};

/// Returned by [`InputSession::lookup`] when no registered action matches
pub const ACTION_ERROR: &str = "ERROR";
/// Catch-all action for input no other registered action handles
pub const ANY_INPUT: &str = "ANY_INPUT";
/// Opens the keybinding editor for the current session
pub const HELP_KEYBINDINGS: &str = "HELP_KEYBINDINGS";
/// Registering it makes the session accept pointer input
pub const COORDINATE: &str = "COORDINATE";
/// Returned by [`InputSession::consume_next`] when the wait timed out
pub const TIMEOUT: &str = "TIMEOUT";

/// Predicate selecting which bound events a description shows
pub type EventFilter = fn(&InputEvent) -> bool;

pub fn allow_all_keys(_: &InputEvent) -> bool {
    true
}

/// Hides lower-case character keys
pub fn disallow_lower_case(event: &InputEvent) -> bool {
    event.kind != InputKind::KeyboardChar
        || event.first_input() < 'a' as i32
        || event.first_input() > 'z' as i32
}

/// Producer of raw input events
pub trait EventSource {
    /// Block until an event arrives, or for at most `timeout` milliseconds.
    ///
    /// `mode` tells the source which keyboard family the caller prefers. A
    /// source that times out reports [`InputEvent::timeout`].
    fn next_event(&mut self, mode: KeyboardMode, timeout: Option<u32>) -> RawEvent;
}

/// Action registry and event translator for one UI scope
#[derive(Debug, Clone)]
pub struct InputSession {
    category: String,
    keyboard_mode: KeyboardMode,
    registered_actions: Vec<String>,
    action_name_overrides: HashMap<String, String>,
    registered_any_input: bool,
    handling_coordinate_input: bool,
    next_action: InputEvent,
    coordinate: Option<Point>,
    coordinate_input_received: bool,
    timeout: i32,
    iso_mode: bool,
}

impl InputSession {
    pub fn new(category: impl Into<String>, keyboard_mode: KeyboardMode) -> Self {
        Self {
            category: category.into(),
            keyboard_mode,
            registered_actions: Vec::new(),
            action_name_overrides: HashMap::new(),
            registered_any_input: false,
            handling_coordinate_input: false,
            next_action: InputEvent::error(),
            coordinate: None,
            coordinate_input_received: false,
            timeout: NO_TIMEOUT,
            iso_mode: false,
        }
    }

    /// Context this session resolves bindings in
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn keyboard_mode(&self) -> KeyboardMode {
        self.keyboard_mode
    }

    pub fn registered_actions(&self) -> &[String] {
        &self.registered_actions
    }

    // ========================================================================
    // Registration
    // ========================================================================

    pub fn register_action(&mut self, action_id: &str) {
        match action_id {
            ANY_INPUT => self.registered_any_input = true,
            COORDINATE => self.handling_coordinate_input = true,
            _ => {}
        }
        self.registered_actions.push(action_id.to_string());
    }

    /// Register an action with a session-specific display name
    pub fn register_action_named(&mut self, action_id: &str, name: impl Into<String>) {
        self.register_action(action_id);
        let name = name.into();
        if !name.is_empty() {
            self.action_name_overrides.insert(action_id.to_string(), name);
        }
    }

    pub fn register_updown(&mut self) {
        self.register_action("UP");
        self.register_action("DOWN");
    }

    pub fn register_leftright(&mut self) {
        self.register_action("LEFT");
        self.register_action("RIGHT");
    }

    pub fn register_cardinal(&mut self) {
        self.register_updown();
        self.register_leftright();
    }

    /// Cardinal and diagonal movement
    pub fn register_directions(&mut self) {
        self.register_cardinal();
        self.register_action("LEFTUP");
        self.register_action("LEFTDOWN");
        self.register_action("RIGHTUP");
        self.register_action("RIGHTDOWN");
    }

    /// Rotate directions by 1/8 turn for isometric views
    pub fn set_iso(&mut self, iso: bool) {
        self.iso_mode = iso;
    }

    /// Unit step for a movement action, or `None` for other actions
    pub fn direction_for(&self, action_id: &str) -> Option<Point> {
        let (dx, dy) = match action_id {
            "UP" => (0, -1),
            "DOWN" => (0, 1),
            "LEFT" => (-1, 0),
            "RIGHT" => (1, 0),
            "LEFTUP" => (-1, -1),
            "RIGHTUP" => (1, -1),
            "LEFTDOWN" => (-1, 1),
            "RIGHTDOWN" => (1, 1),
            _ => return None,
        };
        Some(if self.iso_mode {
            rotate_direction_cw(dx, dy)
        } else {
            Point::new(dx, dy)
        })
    }

    // ========================================================================
    // Timeout
    // ========================================================================

    /// Timeout applied while this session waits; negative waits forever
    pub fn set_timeout(&mut self, timeout: i32) {
        self.timeout = timeout;
    }

    pub fn reset_timeout(&mut self) {
        self.timeout = NO_TIMEOUT;
    }

    pub fn timeout(&self) -> i32 {
        self.timeout
    }

    // ========================================================================
    // Event translation
    // ========================================================================

    /// First registered action bound to `event`, or [`ACTION_ERROR`].
    ///
    /// Actions are tried in registration order, so when two actions share an
    /// event the one registered first wins.
    pub fn lookup(&self, manager: &mut InputManager, event: &InputEvent) -> &str {
        for action in self.bindable_actions() {
            if manager.resolve(action, &self.category).attributes.uses(event) {
                return action;
            }
        }
        ACTION_ERROR
    }

    /// Wait for input and translate it into a registered action.
    ///
    /// Loops until the input maps to an action, or to [`ANY_INPUT`] when that
    /// was registered. A bound [`HELP_KEYBINDINGS`] opens the keybinding editor
    /// and is then returned. Mouse input that matches nothing is ignored unless
    /// [`COORDINATE`] was registered.
    pub fn consume_next<F>(&mut self, manager: &mut InputManager, frontend: &mut F) -> String
    where
        F: Frontend + ?Sized,
    {
        self.read_action(manager, frontend, true)
    }

    /// The read loop behind [`consume_next`](Self::consume_next). Without
    /// `open_editor`, `HELP_KEYBINDINGS` is returned like any other action.
    pub(crate) fn read_action<F>(
        &mut self,
        manager: &mut InputManager,
        frontend: &mut F,
        open_editor: bool,
    ) -> String
    where
        F: Frontend + ?Sized,
    {
        let old_timeout = manager.timeout();
        if self.timeout >= 0 {
            manager.set_timeout(self.timeout);
        }
        self.next_action = InputEvent::error();

        let result = loop {
            let RawEvent { event, pointer } =
                frontend.next_event(self.keyboard_mode, manager.wait_limit());
            self.next_action = event;

            let kind = self.next_action.kind;
            if kind == InputKind::Timeout {
                break TIMEOUT.to_string();
            }
            if kind.family().is_some() && !self.is_event_type_enabled(manager, kind) {
                tracing::trace!("Ignoring {:?} input in {}", kind, self.category);
                continue;
            }

            let action = self.lookup(manager, &self.next_action).to_string();

            if open_editor && action == HELP_KEYBINDINGS {
                manager.reset_timeout();
                editor::edit_keybindings(self, manager, frontend, false);
                manager.set_timeout(self.timeout);
                break action;
            }

            if kind == InputKind::Mouse {
                if !self.handling_coordinate_input && action == ACTION_ERROR {
                    continue;
                }
                self.coordinate_input_received = true;
                self.coordinate = pointer;
            } else {
                self.coordinate_input_received = false;
            }

            if action != ACTION_ERROR {
                break action;
            }
            if self.registered_any_input {
                break ANY_INPUT.to_string();
            }
        };

        manager.set_timeout(old_timeout);
        result
    }

    /// Read exactly one event and look it up, without any fallback
    pub(crate) fn read_single<S>(&mut self, manager: &mut InputManager, source: &mut S) -> String
    where
        S: EventSource + ?Sized,
    {
        self.next_action = source.next_event(self.keyboard_mode, manager.wait_limit()).event;
        self.lookup(manager, &self.next_action).to_string()
    }

    /// The event consumed by the last read
    pub fn raw_input(&self) -> &InputEvent {
        &self.next_action
    }

    /// Pointer position of the last read, if it was mouse input
    pub fn coordinate(&self) -> Option<Point> {
        if self.coordinate_input_received {
            self.coordinate
        } else {
            None
        }
    }

    /// Whether events of `kind` are delivered under the current settings
    pub fn is_event_type_enabled(&self, manager: &InputManager, kind: InputKind) -> bool {
        match kind {
            InputKind::Error => false,
            InputKind::Timeout => true,
            InputKind::KeyboardChar => {
                self.keyboard_mode == KeyboardMode::Keychar || !manager.keycode_mode_supported()
            }
            InputKind::KeyboardCode => {
                self.keyboard_mode == KeyboardMode::Keycode && manager.keycode_mode_supported()
            }
            InputKind::Gamepad => manager.gamepad_available(),
            InputKind::Mouse => true,
        }
    }

    // ========================================================================
    // Conflicts
    // ========================================================================

    /// Whether `event` is bound to `action_id` in this session's context
    pub fn uses(&self, manager: &mut InputManager, action_id: &str, event: &InputEvent) -> bool {
        manager.resolve(action_id, &self.category).attributes.uses(event)
    }

    /// Display names of the registered actions other than `editing` bound to `event`
    pub fn conflicts_for(
        &self,
        manager: &mut InputManager,
        event: &InputEvent,
        editing: &str,
    ) -> Vec<String> {
        let mut names = Vec::new();
        for action in self.bindable_actions() {
            if action != editing && self.uses(manager, action, event) {
                names.push(self.action_name(manager, action));
            }
        }
        names
    }

    /// Strip `event` from the global and local bindings of every registered action
    pub fn clear_conflicts(&self, manager: &mut InputManager, event: &InputEvent) {
        for action in self.bindable_actions() {
            manager.strip_input_for_action(action, DEFAULT_CONTEXT, event);
            if self.category != DEFAULT_CONTEXT {
                manager.strip_input_for_action(action, &self.category, event);
            }
        }
    }

    // ========================================================================
    // Descriptions
    // ========================================================================

    /// Display name: session override, then the entry's name, then the
    /// global entry's name, then the id itself
    pub fn action_name(&self, manager: &mut InputManager, action_id: &str) -> String {
        if let Some(name) = self.action_name_overrides.get(action_id) {
            return name.clone();
        }
        if let Some(name) = &manager.resolve(action_id, &self.category).attributes.name {
            return name.clone();
        }
        if let Some(name) = &manager.resolve(action_id, DEFAULT_CONTEXT).attributes.name {
            return name.clone();
        }
        action_id.to_string()
    }

    /// Single-character keys bound to `action_id`
    pub fn keys_bound_to(
        &self,
        manager: &mut InputManager,
        action_id: &str,
        restrict_to_printable: bool,
    ) -> Vec<char> {
        manager
            .events_for(action_id, &self.category)
            .iter()
            .filter(|e| e.kind == InputKind::KeyboardChar && e.sequence.len() == 1)
            .filter_map(|e| {
                let code = e.first_input();
                let printable = (0x20..0x7F).contains(&code);
                if restrict_to_printable && !printable {
                    return None;
                }
                u32::try_from(code).ok().and_then(char::from_u32)
            })
            .collect()
    }

    /// The `index`th key of [`keys_bound_to`](Self::keys_bound_to), or an empty string
    pub fn key_bound_to(
        &self,
        manager: &mut InputManager,
        action_id: &str,
        index: usize,
        restrict_to_printable: bool,
    ) -> String {
        self.keys_bound_to(manager, action_id, restrict_to_printable)
            .get(index)
            .map(char::to_string)
            .unwrap_or_default()
    }

    /// `requested` minus every character that starts an unmodified binding of
    /// some registered action
    pub fn available_single_char_hotkeys(
        &self,
        manager: &mut InputManager,
        requested: &str,
    ) -> String {
        let mut available: Vec<char> = requested.chars().collect();
        for action in self.bindable_actions() {
            for event in manager.events_for(action, &self.category) {
                if event.kind == InputKind::KeyboardChar && event.modifiers.is_empty() {
                    available.retain(|&c| event.first_input() != c as i32);
                }
            }
        }
        available.into_iter().collect()
    }

    /// Bound keys of `action_id`, e.g. `"CTRL-A, B or C"`.
    ///
    /// Shows at most `max_limit` events (0 for all) that are enabled and pass
    /// `filter`.
    pub fn describe(
        &self,
        manager: &mut InputManager,
        action_id: &str,
        max_limit: usize,
        filter: EventFilter,
    ) -> String {
        if action_id == ANY_INPUT {
            return "(*)".to_string();
        }

        let resolved = manager.resolve(action_id, &self.category);
        let is_local = resolved.is_local;
        let events = resolved.attributes.input_events.clone();
        if events.is_empty() {
            return if is_local {
                "Unbound locally!".to_string()
            } else {
                "Unbound globally!".to_string()
            };
        }

        let mut shown = Vec::new();
        for event in &events {
            if self.is_event_type_enabled(manager, event.kind) && filter(event) {
                shown.push(event);
            }
            if max_limit > 0 && shown.len() == max_limit {
                break;
            }
        }
        if shown.is_empty() {
            return "Disabled".to_string();
        }

        let mut desc = String::new();
        for (i, event) in shown.iter().enumerate() {
            desc.push_str(&event_label(manager, event));
            if i + 2 == shown.len() {
                desc.push_str(" or ");
            } else if i + 1 < shown.len() {
                desc.push_str(", ");
            }
        }
        desc
    }

    /// `text` annotated with its key: `"(q)uit"` when the key occurs in the
    /// text, `"[CTRL-Q] Quit"` otherwise, `"[n/a] Quit"` when nothing usable
    /// is bound
    pub fn describe_with_text(
        &self,
        manager: &mut InputManager,
        action_id: &str,
        text: &str,
        filter: EventFilter,
    ) -> String {
        if action_id == ANY_INPUT {
            return format!("[any]\u{A0}{text}");
        }

        let events = manager.events_for(action_id, &self.category).to_vec();
        let mut usable = false;
        for event in &events {
            if !(self.is_event_type_enabled(manager, event.kind) && filter(event)) {
                continue;
            }
            usable = true;

            let is_keyboard = matches!(event.kind, InputKind::KeyboardChar | InputKind::KeyboardCode);
            if !is_keyboard || !event.modifiers.is_empty() || event.sequence.len() != 1 {
                continue;
            }
            let code = event.first_input();
            if code <= ' ' as i32 || code > '~' as i32 {
                continue;
            }
            let Some(key) = u32::try_from(code).ok().and_then(char::from_u32) else {
                continue;
            };
            if let Some((pos, _)) = text
                .char_indices()
                .find(|(_, c)| c.eq_ignore_ascii_case(&key))
            {
                return format!("{}({}){}", &text[..pos], key, &text[pos + 1..]);
            }
        }

        if usable {
            format!("[{}]\u{A0}{}", self.describe(manager, action_id, 1, filter), text)
        } else {
            format!("[n/a]\u{A0}{text}")
        }
    }

    /// [`describe_with_text`](Self::describe_with_text) with the action's own name
    pub fn describe_key_and_name(
        &self,
        manager: &mut InputManager,
        action_id: &str,
        filter: EventFilter,
    ) -> String {
        let name = self.action_name(manager, action_id);
        self.describe_with_text(manager, action_id, &name, filter)
    }

    /// `"Press X or Y"`, or `"Try"` when nothing enabled is bound
    pub fn press_x(&self, manager: &mut InputManager, action_id: &str) -> String {
        self.press_x_with(manager, action_id, "Press ", "", "Try")
    }

    pub fn press_x_with(
        &self,
        manager: &mut InputManager,
        action_id: &str,
        key_bound_pre: &str,
        key_bound_suf: &str,
        key_unbound: &str,
    ) -> String {
        match action_id {
            ANY_INPUT => return "any key".to_string(),
            COORDINATE => return "mouse movement".to_string(),
            _ => {}
        }

        let bound = manager.events_for(action_id, &self.category).to_vec();
        let events: Vec<InputEvent> = bound
            .into_iter()
            .filter(|e| self.is_event_type_enabled(manager, e.kind))
            .collect();
        if events.is_empty() {
            return key_unbound.to_string();
        }

        let labels: Vec<String> = events.iter().map(|e| event_label(manager, e)).collect();
        format!("{key_bound_pre}{}{key_bound_suf}", labels.join(" or "))
    }

    /// Actions whose display name contains `phrase`, ignoring case
    pub fn filter_by_phrase(
        &self,
        manager: &mut InputManager,
        actions: &[String],
        phrase: &str,
    ) -> Vec<String> {
        let phrase = phrase.to_lowercase();
        actions
            .iter()
            .filter(|action| {
                self.action_name(manager, action)
                    .to_lowercase()
                    .contains(&phrase)
            })
            .cloned()
            .collect()
    }

    /// Registered actions minus the pseudo actions, which never carry bindings
    fn bindable_actions(&self) -> impl Iterator<Item = &str> {
        self.registered_actions
            .iter()
            .map(String::as_str)
            .filter(|a| *a != ANY_INPUT && *a != COORDINATE)
    }
}

/// `"CTRL-SHIFT-A"` style label for one event
fn event_label(manager: &InputManager, event: &InputEvent) -> String {
    let mut label = String::new();
    for modifier in event.modifiers.iter() {
        label.push_str(&modifier.name().to_uppercase());
        label.push('-');
    }
    if let Some(family) = event.kind.family() {
        for &code in &event.sequence {
            label.push_str(&manager.key_name(family, code, false));
        }
    }
    label
}

/// Turn a unit step 1/8 turn clockwise
fn rotate_direction_cw(dx: i32, dy: i32) -> Point {
    // 0 1 2      1 2 5
    // 3 4 5  ->  0 4 8
    // 6 7 8      3 6 7
    const ROTATED: [i32; 9] = [1, 2, 5, 0, 4, 8, 3, 6, 7];
    let index = ((dy + 1) * 3 + dx + 1).clamp(0, 8) as usize;
    let rotated = ROTATED[index];
    Point::new(rotated % 3 - 1, rotated / 3 - 1)
}

/// Block until a key press (or an error) arrives; other input is ignored
pub fn wait_for_any_key<S>(manager: &InputManager, source: &mut S)
where
    S: EventSource + ?Sized,
{
    loop {
        let RawEvent { event, .. } = source.next_event(KeyboardMode::Keycode, manager.wait_limit());
        match event.kind {
            InputKind::KeyboardChar if !event.sequence.is_empty() => return,
            InputKind::KeyboardCode | InputKind::Error => return,
            _ => {}
        }
    }
}
