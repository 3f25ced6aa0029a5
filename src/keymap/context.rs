//! Context-scoped binding table
//!
//! Bindings live in named contexts. The `"default"` context holds the global
//! bindings; every other context only holds local overrides and falls back to
//! the global entry for actions it does not mention.

use indexmap::IndexMap;

use super::binding::ActionAttributes;

/// Name of the global context
pub const DEFAULT_CONTEXT: &str = "default";

/// Action id -> attributes, in insertion order
pub type Context = IndexMap<String, ActionAttributes>;

/// Context name -> context, in insertion order so saved files diff cleanly
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    contexts: IndexMap<String, Context>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.get(name)
    }

    pub fn context_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.get_mut(name)
    }

    /// The named context, created empty if missing
    pub fn context_or_default(&mut self, name: &str) -> &mut Context {
        self.contexts.entry(name.to_string()).or_default()
    }

    pub fn get(&self, context: &str, action_id: &str) -> Option<&ActionAttributes> {
        self.contexts.get(context)?.get(action_id)
    }

    pub fn get_mut(&mut self, context: &str, action_id: &str) -> Option<&mut ActionAttributes> {
        self.contexts.get_mut(context)?.get_mut(action_id)
    }

    pub fn contains(&self, context: &str, action_id: &str) -> bool {
        self.get(context, action_id).is_some()
    }

    /// Remove an entry, keeping the order of the remaining ones
    pub fn remove(&mut self, context: &str, action_id: &str) -> Option<ActionAttributes> {
        self.contexts.get_mut(context)?.shift_remove(action_id)
    }

    pub fn contexts(&self) -> impl Iterator<Item = (&str, &Context)> {
        self.contexts.iter().map(|(name, ctx)| (name.as_str(), ctx))
    }

    /// Every (context, action id, attributes) triple in table order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &ActionAttributes)> {
        self.contexts.iter().flat_map(|(ctx_name, ctx)| {
            ctx.iter()
                .map(move |(id, attrs)| (ctx_name.as_str(), id.as_str(), attrs))
        })
    }

    /// Total number of action entries across all contexts
    pub fn len(&self) -> usize {
        self.contexts.values().map(IndexMap::len).sum()
    }
}

/// Outcome of resolving an action in a context
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub attributes: &'a ActionAttributes,
    /// The entry came from the requested context rather than the global one
    pub is_local: bool,
}

/// Supplies display names for actions that have no configured name
pub trait ActionNames {
    fn default_name(&self, action_id: &str) -> String;
}

/// Uses the action id itself as the display name
#[derive(Debug, Clone, Copy, Default)]
pub struct IdAsName;

impl ActionNames for IdAsName {
    fn default_name(&self, action_id: &str) -> String {
        action_id.to_string()
    }
}

impl<F> ActionNames for F
where
    F: Fn(&str) -> String,
{
    fn default_name(&self, action_id: &str) -> String {
        self(action_id)
    }
}
