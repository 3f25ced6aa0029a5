//! Interactive keybinding editor
//!
//! Drives an [`InputSession`] and the [`InputManager`] to let an operator
//! inspect, add, remove and execute the bindings of the session's actions.
//! Drawing and prompting are delegated to an [`Operator`]; every edit happens
//! on the live table and is rolled back unless the operator saves.

use crate::keymap::{BindingTable, InputEvent, InputManager, KeyboardMode, DEFAULT_CONTEXT};
use crate::session::{
    allow_all_keys, EventSource, InputSession, ANY_INPUT, COORDINATE, HELP_KEYBINDINGS,
};
use crate::tracing::TableSnapshot;

/// Context holding the editor's own bindings
pub const EDITOR_CONTEXT: &str = HELP_KEYBINDINGS;

/// Characters offered as entry hotkeys. The hardcoded status keys
/// (`+ - = .`) are deliberately absent.
pub const HOTKEY_ALPHABET: &str =
    "abcdefghijkpqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789:;'\",/<>?!@#$%^&*()_[]\\{}|`~";

/// Prompts and rendering supplied by the UI
pub trait Operator {
    /// Ask a yes/no question
    fn confirm(&mut self, message: &str) -> bool;

    /// Show a message and wait for acknowledgement
    fn notify(&mut self, message: &str);

    /// Capture the next input as a new binding
    fn query_key(&mut self, prompt: &str, mode: KeyboardMode) -> InputEvent;

    /// Updated filter text, if the operator edited it
    fn filter_phrase(&mut self, _current: &str) -> Option<String> {
        None
    }

    fn render(&mut self, _view: &EditorView) {}
}

/// Everything the editor needs from the UI
pub trait Frontend: EventSource + Operator {}

impl<T: EventSource + Operator + ?Sized> Frontend for T {}

/// What selecting an entry does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorStatus {
    #[default]
    Show,
    Remove,
    AddLocal,
    AddGlobal,
    Execute,
}

/// Where an entry's effective bindings come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingScope {
    Unbound,
    Local,
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorEntry {
    pub hotkey: Option<char>,
    pub action_id: String,
    pub name: String,
    pub description: String,
    pub scope: BindingScope,
    /// False while adding a global binding over a local one
    pub selectable: bool,
}

/// One frame of the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    pub category: String,
    pub status: EditorStatus,
    pub legend: Vec<String>,
    pub filter: String,
    pub scroll_offset: usize,
    /// Number of actions matching the filter
    pub total: usize,
    pub entries: Vec<EditorEntry>,
}

/// Run the editor for `session`.
///
/// Returns the action chosen for execution when `permit_execute_action` is set
/// and the operator picked one.
pub fn edit_keybindings<F>(
    session: &InputSession,
    manager: &mut InputManager,
    frontend: &mut F,
    permit_execute_action: bool,
) -> Option<String>
where
    F: Frontend + ?Sized,
{
    KeybindingEditor::new(session, manager, permit_execute_action).run(manager, frontend)
}

struct KeybindingEditor<'s> {
    session: &'s InputSession,
    ctxt: InputSession,
    permit_execute_action: bool,
    hotkeys: Vec<char>,
    actions: Vec<String>,
    filtered: Vec<String>,
    filter: String,
    status: EditorStatus,
    scroll_offset: usize,
    display_height: usize,
    changed: bool,
}

impl<'s> KeybindingEditor<'s> {
    fn new(session: &'s InputSession, manager: &mut InputManager, permit_execute_action: bool) -> Self {
        let mut ctxt = InputSession::new(EDITOR_CONTEXT, KeyboardMode::Keychar);
        ctxt.register_action_named("UP", "Scroll up");
        ctxt.register_action_named("DOWN", "Scroll down");
        ctxt.register_action("PAGE_DOWN");
        ctxt.register_action("PAGE_UP");
        ctxt.register_action("REMOVE");
        ctxt.register_action("ADD_LOCAL");
        ctxt.register_action("ADD_GLOBAL");
        ctxt.register_action("EXECUTE");
        ctxt.register_action("QUIT");
        ctxt.register_action(ANY_INPUT);
        if session.category() != EDITOR_CONTEXT {
            ctxt.register_action(HELP_KEYBINDINGS);
        }

        let hotkeys: Vec<char> = ctxt
            .available_single_char_hotkeys(manager, HOTKEY_ALPHABET)
            .chars()
            .collect();
        let display_height = manager
            .editor_rows()
            .map_or(hotkeys.len(), |rows| rows.min(hotkeys.len()));

        let actions: Vec<String> = session
            .registered_actions()
            .iter()
            .filter(|a| *a != ANY_INPUT && *a != COORDINATE)
            .cloned()
            .collect();

        Self {
            session,
            ctxt,
            permit_execute_action,
            hotkeys,
            filtered: actions.clone(),
            actions,
            filter: String::new(),
            status: EditorStatus::Show,
            scroll_offset: 0,
            display_height,
            changed: false,
        }
    }

    fn run<F>(mut self, manager: &mut InputManager, frontend: &mut F) -> Option<String>
    where
        F: Frontend + ?Sized,
    {
        let snapshot = manager.snapshot();
        let mut action_to_execute = None;

        loop {
            let view = self.view(manager);
            frontend.render(&view);

            let action = if self.status == EditorStatus::Show {
                if let Some(phrase) = frontend.filter_phrase(&self.filter) {
                    self.filter = phrase;
                }
                self.ctxt.read_single(manager, frontend)
            } else {
                self.ctxt.read_action(manager, frontend, false)
            };
            let raw_char = self.ctxt.raw_input().first_input();

            self.filtered = self
                .session
                .filter_by_phrase(manager, &self.actions, &self.filter);
            if self.scroll_offset > self.filtered.len() {
                self.scroll_offset = 0;
            }
            if self.filtered.is_empty() && action != "QUIT" {
                continue;
            }

            // The hardcoded keys keep the status reachable even when the
            // operator unbinds the editor's own actions.
            if action == "ADD_LOCAL" || raw_char == '+' as i32 {
                self.status = EditorStatus::AddLocal;
            } else if action == "ADD_GLOBAL" || raw_char == '=' as i32 {
                self.status = EditorStatus::AddGlobal;
            } else if action == "REMOVE" || raw_char == '-' as i32 {
                self.status = EditorStatus::Remove;
            } else if (action == "EXECUTE" || raw_char == '.' as i32) && self.permit_execute_action {
                self.status = EditorStatus::Execute;
            } else if action == ANY_INPUT {
                let Some(hotkey_index) = self.hotkeys.iter().position(|&c| c as i32 == raw_char)
                else {
                    continue;
                };
                let Some(action_id) = self.filtered.get(hotkey_index + self.scroll_offset).cloned()
                else {
                    continue;
                };
                if let Some(chosen) = self.select(manager, frontend, &action_id) {
                    action_to_execute = Some(chosen);
                    break;
                }
                self.status = EditorStatus::Show;
            } else if action == "DOWN" {
                if self.filtered.len() > self.display_height
                    && self.scroll_offset < self.filtered.len() - self.display_height
                {
                    self.scroll_offset += 1;
                }
            } else if action == "UP" {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            } else if action == "PAGE_DOWN" {
                self.page_down();
            } else if action == "PAGE_UP" {
                self.page_up();
            } else if action == "QUIT" {
                if self.status == EditorStatus::Show {
                    break;
                }
                self.status = EditorStatus::Show;
            } else if action == HELP_KEYBINDINGS {
                self.hotkeys = self
                    .ctxt
                    .available_single_char_hotkeys(manager, HOTKEY_ALPHABET)
                    .chars()
                    .collect();
            }
        }

        self.finish(manager, frontend, snapshot);
        action_to_execute
    }

    /// Apply the current status to `action_id`; returns it when it is to be executed
    fn select<F>(
        &mut self,
        manager: &mut InputManager,
        frontend: &mut F,
        action_id: &str,
    ) -> Option<String>
    where
        F: Frontend + ?Sized,
    {
        let category = self.session.category();
        let resolved = manager.resolve(action_id, category);
        let is_local = resolved.is_local;
        let is_empty = resolved.attributes.is_unbound();
        let name = self.session.action_name(manager, action_id);

        match self.status {
            // A global entry is only cleared, never deleted outright.
            EditorStatus::Remove if is_local || !is_empty => {
                let message = if is_local && is_empty {
                    format!("Reset to global bindings for {name}?")
                } else {
                    format!("Clear keys for {name}?")
                };
                if !manager.query_keybind_removal() || frontend.confirm(&message) {
                    let context = if is_local { category } else { DEFAULT_CONTEXT };
                    manager.remove_input_for_action(action_id, context);
                    self.changed = true;
                }
            }
            EditorStatus::AddGlobal if is_local => {
                frontend.notify(
                    "There are already local keybindings defined for this action, please remove them first.",
                );
            }
            EditorStatus::AddLocal | EditorStatus::AddGlobal => {
                let event =
                    frontend.query_key(&format!("New key for {name}"), self.session.keyboard_mode());

                if self.session.uses(manager, action_id, &event) {
                    frontend.notify(&format!("This key is already used for {name}."));
                    return None;
                }

                let conflicts = self.session.conflicts_for(manager, &event, action_id);
                let proceed = conflicts.is_empty()
                    || frontend.confirm(&format!(
                        "This key conflicts with {}. Remove this key from the conflicting command(s), and continue?",
                        enumerate_names(&conflicts)
                    ));
                if proceed {
                    if !conflicts.is_empty() {
                        self.session.clear_conflicts(manager, &event);
                    }
                    let context = if self.status == EditorStatus::AddGlobal {
                        DEFAULT_CONTEXT
                    } else {
                        category
                    };
                    manager.add_input_for_action(action_id, context, event);
                    self.changed = true;
                }
            }
            EditorStatus::Execute if self.permit_execute_action => {
                return Some(action_id.to_string());
            }
            _ => {}
        }
        None
    }

    fn page_down(&mut self) {
        let len = self.filtered.len();
        if self.scroll_offset + self.display_height < len {
            self.scroll_offset += self
                .display_height
                .min(len - self.display_height - self.scroll_offset);
        } else if len > self.display_height {
            self.scroll_offset = 0;
        }
    }

    fn page_up(&mut self) {
        let len = self.filtered.len();
        if self.scroll_offset >= self.display_height && self.display_height > 0 {
            self.scroll_offset -= self.display_height;
        } else if self.scroll_offset > 0 {
            self.scroll_offset = 0;
        } else if len > self.display_height {
            self.scroll_offset = len - self.display_height;
        }
    }

    /// Offer to save; otherwise roll the table back
    fn finish<F>(&self, manager: &mut InputManager, frontend: &mut F, snapshot: BindingTable)
    where
        F: Frontend + ?Sized,
    {
        if !self.changed {
            return;
        }

        if !frontend.confirm("Save changes?") {
            tracing::debug!("Discarding keybinding changes for {}", self.session.category());
            manager.restore(snapshot);
            return;
        }

        let before = TableSnapshot::capture(&snapshot);
        match manager.save() {
            Ok(()) => {
                if let Some(diff) = before.diff(&TableSnapshot::capture(manager.table())) {
                    tracing::info!("Keybindings changed: {}", diff);
                }
            }
            Err(e) => {
                tracing::warn!("Saving keybindings failed: {}", e);
                frontend.notify(&format!("saving keybindings failed: {e}"));
                manager.restore(snapshot);
            }
        }
    }

    fn view(&self, manager: &mut InputManager) -> EditorView {
        let mut legend = vec![
            "Unbound keys".to_string(),
            "Keybinding active only on this screen".to_string(),
            "Keybinding active globally".to_string(),
            "Press - to remove keybinding".to_string(),
            "Press + to add local keybinding".to_string(),
            "Press = to add global keybinding".to_string(),
        ];
        if self.permit_execute_action {
            legend.push("Press . to execute action".to_string());
        }

        let category = self.session.category();
        let entries = self
            .filtered
            .iter()
            .skip(self.scroll_offset)
            .take(self.display_height)
            .enumerate()
            .map(|(i, action_id)| {
                let resolved = manager.resolve(action_id, category);
                let is_local = resolved.is_local;
                let scope = if resolved.attributes.is_unbound() {
                    BindingScope::Unbound
                } else if is_local {
                    BindingScope::Local
                } else {
                    BindingScope::Global
                };
                let hotkey = match self.status {
                    EditorStatus::Show => None,
                    _ => self.hotkeys.get(i).copied(),
                };
                EditorEntry {
                    hotkey,
                    action_id: action_id.clone(),
                    name: self.session.action_name(manager, action_id),
                    description: self.session.describe(manager, action_id, 0, allow_all_keys),
                    scope,
                    selectable: !(self.status == EditorStatus::AddGlobal && is_local),
                }
            })
            .collect();

        EditorView {
            category: category.to_string(),
            status: self.status,
            legend,
            filter: self.filter.clone(),
            scroll_offset: self.scroll_offset,
            total: self.filtered.len(),
            entries,
        }
    }
}

/// `"A"`, `"A and B"`, `"A, B and C"`
fn enumerate_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
