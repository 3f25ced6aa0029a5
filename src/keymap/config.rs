//! JSON keybinding file format
//!
//! Parses keybinding files into resolved [`BindingRecord`]s and serializes a
//! [`BindingTable`] back into the same format.
//!
//! ```json
//! [
//!   {
//!     "id": "QUIT",
//!     "category": "default",
//!     "name": "Quit",
//!     "bindings": [
//!       { "input_method": "keyboard_any", "mod": ["ctrl"], "key": "q" },
//!       { "input_method": "gamepad", "key": ["JOY_0", "JOY_1"] }
//!     ]
//!   }
//! ]
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::context::{BindingTable, DEFAULT_CONTEXT};
use super::registry::KeycodeRegistry;
use super::types::{DeviceFamily, InputEvent, InputKind, Modifier, Modifiers};

/// Schema version written into every saved record
pub const CURRENT_KEYBINDING_VERSION: i64 = 1;

const KEYBINDING_TYPE: &str = "keybinding";

/// Errors that can occur when loading or saving keybindings
#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("could not read {}", path.display())]
    Missing { path: PathBuf },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}: {source}")]
    Malformed {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{origin}: record {index}: missing required field '{field}'")]
    MissingField {
        origin: String,
        index: usize,
        field: &'static str,
    },

    #[error("{origin}: action '{action}': unknown input_method '{method}'")]
    UnknownInputMethod {
        origin: String,
        action: String,
        method: String,
    },

    #[error("{origin}: action '{action}': unknown modifier name '{name}'")]
    UnknownModifier {
        origin: String,
        action: String,
        name: String,
    },

    #[error("action '{action}' in '{context}' holds a {kind:?} event, which cannot be saved")]
    UnsavableEvent {
        context: String,
        action: String,
        kind: InputKind,
    },

    #[error("no user keybindings file configured")]
    NoUserPath,

    #[error("failed to serialize keybindings: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A record as it appears on disk
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<i64>,
    #[serde(default)]
    is_user_created: Option<bool>,
    #[serde(default)]
    bindings: Option<Vec<RawBinding>>,
}

#[derive(Debug, Deserialize)]
struct RawBinding {
    #[serde(default)]
    input_method: Option<String>,
    #[serde(rename = "mod", default)]
    modifiers: Vec<String>,
    #[serde(default)]
    key: Option<KeySpec>,
}

/// `key` is either one portable name or a sequence of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeySpec {
    One(String),
    Many(Vec<String>),
}

impl KeySpec {
    fn names(&self) -> &[String] {
        match self {
            KeySpec::One(name) => std::slice::from_ref(name),
            KeySpec::Many(names) => names,
        }
    }
}

/// A parsed record with its key names already resolved to codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingRecord {
    pub id: String,
    pub category: String,
    pub name: Option<String>,
    /// Schema version as written; `None` when the field is absent
    pub version: Option<i64>,
    pub is_user_created: Option<bool>,
    pub events: Vec<InputEvent>,
}

/// Parse a keybinding document.
///
/// `origin` names the source in error messages. Records whose `type` is not
/// `keybinding` are logged and skipped.
pub fn parse_keybindings_json(
    json: &str,
    origin: &str,
    registry: &KeycodeRegistry,
) -> Result<Vec<BindingRecord>, KeymapError> {
    let raw: Vec<RawRecord> = serde_json::from_str(json).map_err(|source| KeymapError::Malformed {
        origin: origin.to_string(),
        source,
    })?;

    let mut records = Vec::with_capacity(raw.len());
    for (index, record) in raw.into_iter().enumerate() {
        let kind = record.kind.as_deref().unwrap_or(KEYBINDING_TYPE);
        if kind != KEYBINDING_TYPE {
            tracing::warn!(
                "Only objects of type 'keybinding' (not {}) should appear in the keybindings file '{}'",
                kind,
                origin
            );
            continue;
        }

        let id = record.id.ok_or_else(|| KeymapError::MissingField {
            origin: origin.to_string(),
            index,
            field: "id",
        })?;
        let raw_bindings = record.bindings.ok_or_else(|| KeymapError::MissingField {
            origin: origin.to_string(),
            index,
            field: "bindings",
        })?;

        let mut events = Vec::new();
        for binding in &raw_bindings {
            events.extend(parse_binding(binding, &id, index, origin, registry)?);
        }

        records.push(BindingRecord {
            id,
            category: record.category.unwrap_or_else(|| DEFAULT_CONTEXT.to_string()),
            name: record.name,
            version: record.version,
            is_user_created: record.is_user_created,
            events,
        });
    }

    Ok(records)
}

/// Expand one binding entry into its events (two for `keyboard_any`)
fn parse_binding(
    binding: &RawBinding,
    action: &str,
    index: usize,
    origin: &str,
    registry: &KeycodeRegistry,
) -> Result<Vec<InputEvent>, KeymapError> {
    let method = binding
        .input_method
        .as_deref()
        .ok_or_else(|| KeymapError::MissingField {
            origin: origin.to_string(),
            index,
            field: "input_method",
        })?;
    let families = DeviceFamily::families_for_input_method(method).ok_or_else(|| {
        KeymapError::UnknownInputMethod {
            origin: origin.to_string(),
            action: action.to_string(),
            method: method.to_string(),
        }
    })?;

    let mut modifiers = Modifiers::NONE;
    for name in &binding.modifiers {
        let modifier = Modifier::from_name(name).ok_or_else(|| KeymapError::UnknownModifier {
            origin: origin.to_string(),
            action: action.to_string(),
            name: name.clone(),
        })?;
        modifiers.insert(modifier);
    }

    let key = binding.key.as_ref().ok_or_else(|| KeymapError::MissingField {
        origin: origin.to_string(),
        index,
        field: "key",
    })?;

    Ok(families
        .iter()
        .map(|&family| {
            let sequence = key
                .names()
                .iter()
                .map(|name| registry.resolve_name(family, name))
                .collect();
            InputEvent::new(family.into(), modifiers, sequence)
        })
        .collect())
}

/// A record as written by [`serialize_table`]
#[derive(Debug, Serialize)]
struct SavedRecord<'a> {
    id: &'a str,
    version: i64,
    category: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_user_created: bool,
    bindings: Vec<SavedBinding>,
}

#[derive(Debug, Serialize)]
struct SavedBinding {
    input_method: &'static str,
    #[serde(rename = "mod")]
    modifiers: Vec<&'static str>,
    key: Vec<String>,
}

/// Serialize every context and action of `table` with portable key names
pub fn serialize_table(
    table: &BindingTable,
    registry: &KeycodeRegistry,
) -> Result<String, KeymapError> {
    let mut records = Vec::with_capacity(table.len());
    for (context, id, attributes) in table.entries() {
        let mut bindings = Vec::with_capacity(attributes.input_events.len());
        for event in &attributes.input_events {
            let family = event.kind.family().ok_or_else(|| KeymapError::UnsavableEvent {
                context: context.to_string(),
                action: id.to_string(),
                kind: event.kind,
            })?;
            bindings.push(SavedBinding {
                input_method: family.input_method(),
                modifiers: event.modifiers.iter().map(Modifier::name).collect(),
                key: event
                    .sequence
                    .iter()
                    .map(|&code| registry.resolve_code(family, code, true))
                    .collect(),
            });
        }
        records.push(SavedRecord {
            id,
            version: CURRENT_KEYBINDING_VERSION,
            category: context,
            is_user_created: attributes.is_user_created,
            bindings,
        });
    }

    serde_json::to_string_pretty(&records).map_err(KeymapError::Serialize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::keycodes::{keycode, KEY_UP, MOUSE_BUTTON_LEFT};

    fn parse(json: &str) -> Result<Vec<BindingRecord>, KeymapError> {
        parse_keybindings_json(json, "test.json", &KeycodeRegistry::new())
    }

    #[test]
    fn test_parse_simple_record() {
        let records = parse(
            r#"[{ "id": "QUIT", "name": "Quit",
                  "bindings": [{ "input_method": "keyboard_char", "key": "q" }] }]"#,
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, "QUIT");
        assert_eq!(record.category, DEFAULT_CONTEXT);
        assert_eq!(record.name.as_deref(), Some("Quit"));
        assert_eq!(record.version, None);
        assert_eq!(record.events, vec![InputEvent::char('q')]);
    }

    #[test]
    fn test_keyboard_alias() {
        let records = parse(
            r#"[{ "id": "A", "bindings": [{ "input_method": "keyboard", "key": "a" }] }]"#,
        )
        .unwrap();
        assert_eq!(records[0].events[0].kind, InputKind::KeyboardChar);
    }

    #[test]
    fn test_keyboard_any_expands_to_twins() {
        let records = parse(
            r#"[{ "id": "UP", "bindings": [
                  { "input_method": "keyboard_any", "mod": ["shift"], "key": "UP" }] }]"#,
        )
        .unwrap();

        let events = &records[0].events;
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            InputEvent::new(InputKind::KeyboardChar, Modifiers::SHIFT, vec![KEY_UP])
        );
        assert_eq!(
            events[1],
            InputEvent::new(InputKind::KeyboardCode, Modifiers::SHIFT, vec![keycode::UP])
        );
    }

    #[test]
    fn test_key_sequence() {
        let records = parse(
            r#"[{ "id": "X", "bindings": [
                  { "input_method": "mouse", "key": ["MOUSE_LEFT", "UNKNOWN_77"] }] }]"#,
        )
        .unwrap();
        assert_eq!(records[0].events[0].sequence, vec![MOUSE_BUTTON_LEFT, 77]);
    }

    #[test]
    fn test_duplicate_modifiers_collapse() {
        let records = parse(
            r#"[{ "id": "X", "bindings": [
                  { "input_method": "keyboard_char", "mod": ["ctrl", "ctrl"], "key": "x" }] }]"#,
        )
        .unwrap();
        assert_eq!(records[0].events[0].modifiers, Modifiers::CTRL);
    }

    #[test]
    fn test_unknown_input_method_is_fatal() {
        let err = parse(
            r#"[{ "id": "X", "bindings": [{ "input_method": "joystick", "key": "x" }] }]"#,
        )
        .unwrap_err();
        assert!(matches!(err, KeymapError::UnknownInputMethod { ref method, .. } if method == "joystick"));
        assert!(err.to_string().contains("test.json"));
    }

    #[test]
    fn test_unknown_modifier_is_fatal() {
        let err = parse(
            r#"[{ "id": "X", "bindings": [
                  { "input_method": "keyboard_char", "mod": ["meta"], "key": "x" }] }]"#,
        )
        .unwrap_err();
        assert!(matches!(err, KeymapError::UnknownModifier { ref name, .. } if name == "meta"));
    }

    #[test]
    fn test_missing_fields_are_fatal() {
        let err = parse(r#"[{ "bindings": [] }]"#).unwrap_err();
        assert!(matches!(err, KeymapError::MissingField { field: "id", .. }));

        let err = parse(r#"[{ "id": "X" }]"#).unwrap_err();
        assert!(matches!(err, KeymapError::MissingField { field: "bindings", .. }));

        let err = parse(r#"[{ "id": "X", "bindings": [{ "input_method": "mouse" }] }]"#)
            .unwrap_err();
        assert!(matches!(err, KeymapError::MissingField { field: "key", .. }));
    }

    #[test]
    fn test_malformed_document() {
        let err = parse("{ not json").unwrap_err();
        assert!(matches!(err, KeymapError::Malformed { .. }));
    }

    #[test]
    fn test_foreign_type_is_skipped() {
        let records = parse(
            r#"[{ "type": "keybinding_group", "id": "G" },
                { "type": "keybinding", "id": "X", "bindings": [] }]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "X");
    }

    #[test]
    fn test_serialize_writes_portable_names() {
        let registry = KeycodeRegistry::new();
        let mut table = BindingTable::new();
        let mut attrs = crate::keymap::binding::ActionAttributes::named("Up");
        attrs.input_events = vec![
            InputEvent::new(InputKind::KeyboardCode, Modifiers::CTRL | Modifiers::SHIFT, vec![keycode::UP]),
            InputEvent::key(InputKind::Gamepad, 4242),
        ];
        table.context_or_default("vehicle").insert("UP".into(), attrs);

        let json = serialize_table(&table, &registry).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let record = &value[0];
        assert_eq!(record["id"], "UP");
        assert_eq!(record["category"], "vehicle");
        assert_eq!(record["version"], CURRENT_KEYBINDING_VERSION);
        assert!(record.get("is_user_created").is_none());
        assert!(record.get("name").is_none());
        assert_eq!(record["bindings"][0]["input_method"], "keyboard_code");
        assert_eq!(record["bindings"][0]["mod"], serde_json::json!(["ctrl", "shift"]));
        assert_eq!(record["bindings"][0]["key"], serde_json::json!(["UP"]));
        assert_eq!(record["bindings"][1]["key"], serde_json::json!(["UNKNOWN_4242"]));
    }

    #[test]
    fn test_serialize_rejects_sentinel_events() {
        let mut table = BindingTable::new();
        table.context_or_default(DEFAULT_CONTEXT).insert(
            "X".into(),
            crate::keymap::binding::ActionAttributes::default()
                .with_events(vec![InputEvent::timeout()]),
        );
        let err = serialize_table(&table, &KeycodeRegistry::new()).unwrap_err();
        assert!(matches!(err, KeymapError::UnsavableEvent { .. }));
    }
}
