//! One-shot import of the old flat keymap file
//!
//! The old format is plain text: `<action_id> <char>` binds a character,
//! `unbind <action_id>` removes the shipped bindings, `#` starts a comment.
//! There are no contexts; bindings land in the global context when the action
//! exists there and in [`LEGACY_CONTEXT`] otherwise.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::config::KeymapError;
use super::context::DEFAULT_CONTEXT;
use super::manager::InputManager;
use super::types::InputEvent;

/// Context that receives legacy bindings of non-global actions
pub const LEGACY_CONTEXT: &str = "DEFAULTMODE";

/// Parsed content of a legacy keymap file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyKeymap {
    /// Character -> action id; a character bound twice keeps the last action
    pub bindings: BTreeMap<char, String>,
    pub unbound: BTreeSet<String>,
}

impl LegacyKeymap {
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.unbound.is_empty()
    }
}

/// Parse legacy keymap text. Unreadable lines are logged and skipped.
pub fn parse_legacy_keymap(text: &str) -> LegacyKeymap {
    let mut keymap = LegacyKeymap::default();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(first), Some(second), None) = (parts.next(), parts.next(), parts.next()) else {
            tracing::warn!("Skipping legacy keymap line {}: {:?}", line_no + 1, line);
            continue;
        };

        if first == "unbind" {
            keymap.unbound.insert(second.to_string());
            continue;
        }

        let mut chars = second.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                keymap.bindings.insert(c, first.to_string());
            }
            _ => tracing::warn!(
                "Skipping legacy keymap line {}: key {:?} is not a single character",
                line_no + 1,
                second
            ),
        }
    }

    keymap
}

/// Merge a parsed legacy keymap into the table
pub fn apply_legacy_keymap(manager: &mut InputManager, keymap: &LegacyKeymap) {
    let mut touched = BTreeSet::new();

    for (&c, action_id) in &keymap.bindings {
        let context = if manager.table().contains(DEFAULT_CONTEXT, action_id) {
            DEFAULT_CONTEXT
        } else {
            // Drop the shipped bindings once, keeping only what the user had.
            // A missing entry is left to `add_input_for_action`, which marks
            // it user-created.
            if touched.insert(action_id.as_str())
                && manager.table().contains(LEGACY_CONTEXT, action_id)
            {
                manager.clear_input_for_action(action_id, LEGACY_CONTEXT);
            }
            LEGACY_CONTEXT
        };
        manager.add_input_for_action(action_id, context, InputEvent::char(c));
    }

    for action_id in &keymap.unbound {
        manager.clear_input_for_action(action_id, LEGACY_CONTEXT);
    }
}

/// Import the legacy keymap at `path`, save the result and delete the file.
///
/// The file is only deleted after the new table was saved, so a failed save
/// leaves it in place for the next start. Returns the number of imported
/// lines.
pub fn import_legacy_keymap(manager: &mut InputManager, path: &Path) -> Result<usize, KeymapError> {
    let text = std::fs::read_to_string(path).map_err(|source| KeymapError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let keymap = parse_legacy_keymap(&text);
    if keymap.is_empty() {
        tracing::debug!("Legacy keymap {} has no entries", path.display());
        return Ok(0);
    }

    apply_legacy_keymap(manager, &keymap);
    manager.save()?;

    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!("Could not remove legacy keymap {}: {}", path.display(), e);
    }
    Ok(keymap.bindings.len() + keymap.unbound.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_lines() {
        let keymap = parse_legacy_keymap(
            "# old keymap\n\
             pause_game p\n\
             UP k\n\
             unbind sleep\n\
             broken\n\
             too many tokens\n\
             UP kk\n",
        );
        assert_eq!(keymap.bindings.len(), 2);
        assert_eq!(keymap.bindings[&'k'], "UP");
        assert_eq!(keymap.bindings[&'p'], "pause_game");
        assert!(keymap.unbound.contains("sleep"));
    }

    #[test]
    fn test_later_line_wins_for_same_char() {
        let keymap = parse_legacy_keymap("first x\nsecond x\n");
        assert_eq!(keymap.bindings[&'x'], "second");
    }

    #[test]
    fn test_apply_routes_by_global_existence() {
        let mut manager = InputManager::new();
        manager
            .load_str(
                r#"[{ "id": "UP", "bindings": [{ "input_method": "keyboard", "key": "UP" }] },
                    { "id": "pause_game", "category": "DEFAULTMODE",
                      "bindings": [{ "input_method": "keyboard", "key": "z" }] }]"#,
                "defaults",
                false,
            )
            .unwrap();

        let keymap = parse_legacy_keymap("UP k\npause_game p\npause_game q\nunbind sleep\n");
        apply_legacy_keymap(&mut manager, &keymap);

        let up = manager.table().get(DEFAULT_CONTEXT, "UP").unwrap();
        assert_eq!(up.input_events.len(), 2);
        assert!(up.uses(&InputEvent::char('k')));

        let pause = manager.table().get(LEGACY_CONTEXT, "pause_game").unwrap();
        assert_eq!(
            pause.input_events,
            vec![InputEvent::char('p'), InputEvent::char('q')]
        );

        let sleep = manager.table().get(LEGACY_CONTEXT, "sleep").unwrap();
        assert!(sleep.input_events.is_empty());
    }

    #[test]
    fn test_apply_creates_user_entry_for_unknown_action() {
        let mut manager = InputManager::new();
        manager
            .load_str(
                r#"[{ "id": "UP", "bindings": [{ "input_method": "keyboard", "key": "UP" }] }]"#,
                "defaults",
                false,
            )
            .unwrap();

        apply_legacy_keymap(&mut manager, &parse_legacy_keymap("fire f\n"));

        let fire = manager.table().get(LEGACY_CONTEXT, "fire").unwrap();
        assert!(fire.is_user_created);
        assert_eq!(fire.name.as_deref(), Some("fire"));
        assert_eq!(fire.input_events, vec![InputEvent::char('f')]);

        // Removing it deletes the entry instead of leaving an explicit unbind
        manager.remove_input_for_action("fire", LEGACY_CONTEXT);
        assert!(!manager.table().contains(LEGACY_CONTEXT, "fire"));
    }
}
