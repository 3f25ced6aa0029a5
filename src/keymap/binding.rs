//! Attributes of one action within one context

use super::types::InputEvent;

/// Everything the table knows about an action in a context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionAttributes {
    /// Display name; absent names are synthesized from the action id
    pub name: Option<String>,
    /// Bound events; order matters for display only
    pub input_events: Vec<InputEvent>,
    /// Created interactively rather than loaded from shipped defaults
    pub is_user_created: bool,
}

impl ActionAttributes {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_events(mut self, events: Vec<InputEvent>) -> Self {
        self.input_events = events;
        self
    }

    pub fn is_unbound(&self) -> bool {
        self.input_events.is_empty()
    }

    pub fn uses(&self, event: &InputEvent) -> bool {
        self.input_events.contains(event)
    }

    /// Append an event unless an equal one is already bound.
    /// Returns whether the list changed.
    pub fn add_event(&mut self, event: InputEvent) -> bool {
        if self.uses(&event) {
            return false;
        }
        self.input_events.push(event);
        true
    }

    /// Drop every occurrence of `event`. Returns whether the list changed.
    pub fn strip_event(&mut self, event: &InputEvent) -> bool {
        let before = self.input_events.len();
        self.input_events.retain(|e| e != event);
        before != self.input_events.len()
    }

    /// First code of the first bound event
    pub fn first_bound_code(&self) -> Option<i32> {
        self.input_events.first().map(InputEvent::first_input)
    }
}
