//! The binding store: layered loading, context resolution and editing

use std::fmt;
use std::path::{Path, PathBuf};

use super::binding::ActionAttributes;
use super::config::{parse_keybindings_json, serialize_table, BindingRecord, KeymapError};
use super::context::{ActionNames, BindingTable, IdAsName, Resolved, DEFAULT_CONTEXT};
use super::registry::KeycodeRegistry;
use super::types::{DeviceFamily, InputEvent, InputKind};

/// Timeout value meaning "wait forever"
pub const NO_TIMEOUT: i32 = -1;

/// Owns the binding table and everything needed to load, query and save it.
///
/// Constructed once at startup and passed by reference to every consumer.
pub struct InputManager {
    registry: KeycodeRegistry,
    table: BindingTable,
    names: Box<dyn ActionNames>,
    user_path: Option<PathBuf>,
    timeout: i32,
    keycode_mode_supported: bool,
    gamepad_available: bool,
    query_keybind_removal: bool,
    editor_rows: Option<usize>,
}

impl InputManager {
    /// An empty store with the standard key names registered
    pub fn new() -> Self {
        Self {
            registry: KeycodeRegistry::new(),
            table: BindingTable::new(),
            names: Box::new(IdAsName),
            user_path: None,
            timeout: NO_TIMEOUT,
            keycode_mode_supported: true,
            gamepad_available: false,
            query_keybind_removal: true,
            editor_rows: None,
        }
    }

    /// Use `names` to synthesize display names for unnamed actions
    pub fn with_names(mut self, names: impl ActionNames + 'static) -> Self {
        self.names = Box::new(names);
        self
    }

    /// File that [`save`](Self::save) writes user preferences to
    pub fn with_user_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_path = Some(path.into());
        self
    }

    pub fn user_path(&self) -> Option<&Path> {
        self.user_path.as_deref()
    }

    pub fn set_user_path(&mut self, path: Option<PathBuf>) {
        self.user_path = path;
    }

    pub fn registry(&self) -> &KeycodeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut KeycodeRegistry {
        &mut self.registry
    }

    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    // ========================================================================
    // Platform capabilities
    // ========================================================================

    /// Whether this build can deliver raw keyboard codes at all
    pub fn keycode_mode_supported(&self) -> bool {
        self.keycode_mode_supported
    }

    pub fn set_keycode_mode_supported(&mut self, supported: bool) {
        self.keycode_mode_supported = supported;
    }

    pub fn gamepad_available(&self) -> bool {
        self.gamepad_available
    }

    pub fn set_gamepad_available(&mut self, available: bool) {
        self.gamepad_available = available;
    }

    /// Ask before removing bindings in the editor
    pub fn query_keybind_removal(&self) -> bool {
        self.query_keybind_removal
    }

    pub fn set_query_keybind_removal(&mut self, query: bool) {
        self.query_keybind_removal = query;
    }

    /// Rows of bindings the editor shows at once; `None` fits all hotkeys
    pub fn editor_rows(&self) -> Option<usize> {
        self.editor_rows
    }

    pub fn set_editor_rows(&mut self, rows: Option<usize>) {
        self.editor_rows = rows;
    }

    // ========================================================================
    // Timeout
    // ========================================================================

    pub fn timeout(&self) -> i32 {
        self.timeout
    }

    /// Set the wait timeout; negative values disable it
    pub fn set_timeout(&mut self, timeout: i32) {
        self.timeout = timeout;
    }

    pub fn reset_timeout(&mut self) {
        self.timeout = NO_TIMEOUT;
    }

    /// The timeout in the form event sources expect
    pub fn wait_limit(&self) -> Option<u32> {
        u32::try_from(self.timeout).ok()
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load a keybinding file.
    ///
    /// A missing or unreadable file is an error only while the table is still
    /// empty; later layers are optional and skipped silently.
    pub fn load_file(&mut self, path: &Path, is_user_preferences: bool) -> Result<(), KeymapError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                if self.table.is_empty() {
                    return Err(match e.kind() {
                        std::io::ErrorKind::NotFound => KeymapError::Missing {
                            path: path.to_path_buf(),
                        },
                        _ => KeymapError::Io {
                            path: path.to_path_buf(),
                            source: e,
                        },
                    });
                }
                tracing::debug!("Skipping keybindings file {}: {}", path.display(), e);
                return Ok(());
            }
        };

        self.load_str(&content, &path.display().to_string(), is_user_preferences)
    }

    /// Load keybindings from a JSON document; `origin` is used in messages
    pub fn load_str(
        &mut self,
        json: &str,
        origin: &str,
        is_user_preferences: bool,
    ) -> Result<(), KeymapError> {
        let records = parse_keybindings_json(json, origin, &self.registry)?;
        tracing::info!(
            "Loaded {} keybinding records from {}{}",
            records.len(),
            origin,
            if is_user_preferences { " (user)" } else { "" }
        );
        for record in records {
            self.merge_record(record, is_user_preferences);
        }
        Ok(())
    }

    /// Merge one parsed record into the table.
    ///
    /// Shipped records always count as the current schema version and are the
    /// only source of display names. User records may replace event lists.
    fn merge_record(&mut self, record: BindingRecord, is_user_preferences: bool) {
        let BindingRecord {
            id,
            category,
            name,
            version,
            is_user_created,
            mut events,
        } = record;

        let actions = self.table.context_or_default(&category);
        if !is_user_preferences {
            if let Some(name) = name {
                actions.entry(id.clone()).or_default().name = Some(name);
            }
        }

        // Empty local user entries are leftovers of older builds, unless they
        // override something that already exists.
        let keep = !is_user_preferences
            || !events.is_empty()
            || category == DEFAULT_CONTEXT
            || actions.contains_key(&id);
        if !keep {
            tracing::debug!("Dropping empty user keybinding {} in {}", id, category);
            return;
        }

        let attributes = actions.entry(id).or_default();
        if is_user_preferences && version.unwrap_or(0) == 0 {
            // Version 0 files predate raw keyboard codes; keep the defaults'.
            events.extend(
                attributes
                    .input_events
                    .iter()
                    .filter(|e| e.kind == InputKind::KeyboardCode)
                    .cloned(),
            );
        }
        attributes.input_events = events;
        if let Some(is_user_created) = is_user_created {
            attributes.is_user_created = is_user_created;
        }
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Serialize the whole table in the on-disk format
    pub fn to_json(&self) -> Result<String, KeymapError> {
        serialize_table(&self.table, &self.registry)
    }

    /// Write the table to the user preferences file
    pub fn save(&self) -> Result<(), KeymapError> {
        let path = self.user_path.as_deref().ok_or(KeymapError::NoUserPath)?;
        self.save_to(path)
    }

    /// Write the table to `path`.
    ///
    /// The content goes to a sibling temp file first, so a failed save never
    /// leaves a truncated file behind.
    pub fn save_to(&self, path: &Path) -> Result<(), KeymapError> {
        let json = self.to_json()?;
        let write_err = |source| KeymapError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        std::fs::write(&tmp_path, json).map_err(write_err)?;
        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }

        tracing::info!("Saved {} keybindings to {}", self.table.len(), path.display());
        Ok(())
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Deep copy of the current table
    pub fn snapshot(&self) -> BindingTable {
        self.table.clone()
    }

    /// Replace the table with a previously taken snapshot
    pub fn restore(&mut self, snapshot: BindingTable) {
        self.table = snapshot;
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Effective attributes of `action_id` in `context`.
    ///
    /// Checks the context first, then the global context. A global entry that
    /// does not exist yet is created (empty, with a synthesized name), so every
    /// action ever resolved shows up in the next save.
    pub fn resolve(&mut self, action_id: &str, context: &str) -> Resolved<'_> {
        let is_local = context != DEFAULT_CONTEXT && self.table.contains(context, action_id);

        if !is_local && !self.table.contains(DEFAULT_CONTEXT, action_id) {
            let name = self.synthesized_name(action_id);
            tracing::debug!("Creating empty global entry for {}", action_id);
            self.table
                .context_or_default(DEFAULT_CONTEXT)
                .insert(action_id.to_string(), ActionAttributes::named(name));
        }

        let owner = if is_local { context } else { DEFAULT_CONTEXT };
        let attributes = &self.table.context_or_default(owner)[action_id];
        Resolved {
            attributes,
            is_local,
        }
    }

    /// Events bound to `action_id` in `context` (see [`resolve`](Self::resolve))
    pub fn events_for(&mut self, action_id: &str, context: &str) -> &[InputEvent] {
        &self.resolve(action_id, context).attributes.input_events
    }

    /// First code of the first bound event
    pub fn first_bound_code(&mut self, action_id: &str, context: &str) -> Option<i32> {
        self.resolve(action_id, context).attributes.first_bound_code()
    }

    /// Read-only counterpart of [`resolve`](Self::resolve) that never creates entries
    pub fn peek(&self, action_id: &str, context: &str) -> Option<Resolved<'_>> {
        if context != DEFAULT_CONTEXT {
            if let Some(attributes) = self.table.get(context, action_id) {
                return Some(Resolved {
                    attributes,
                    is_local: true,
                });
            }
        }
        self.table
            .get(DEFAULT_CONTEXT, action_id)
            .map(|attributes| Resolved {
                attributes,
                is_local: false,
            })
    }

    /// Name of the global entry if it has one, else the injected default
    pub fn default_action_name(&self, action_id: &str) -> String {
        self.table
            .get(DEFAULT_CONTEXT, action_id)
            .and_then(|attrs| attrs.name.clone())
            .unwrap_or_else(|| self.synthesized_name(action_id))
    }

    fn synthesized_name(&self, action_id: &str) -> String {
        let name = self.names.default_name(action_id);
        if name.is_empty() {
            action_id.to_string()
        } else {
            name
        }
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Bind `event` to `action_id` in `context`; binding an equal event twice is a no-op.
    ///
    /// Creates the context and a user-created entry when they do not exist.
    pub fn add_input_for_action(&mut self, action_id: &str, context: &str, event: InputEvent) {
        if !self.table.contains(context, action_id) {
            let mut attributes = ActionAttributes::named(self.default_action_name(action_id));
            attributes.is_user_created = true;
            self.table
                .context_or_default(context)
                .insert(action_id.to_string(), attributes);
        }

        let Some(attributes) = self.table.get_mut(context, action_id) else {
            return;
        };
        if attributes.add_event(event) {
            tracing::debug!("Bound new input to {} in {}", action_id, context);
        }
    }

    /// Remove bindings of `action_id` in `context`.
    ///
    /// User-created entries are deleted so the action falls back to the global
    /// binding. Other entries are cleared, producing an explicit unbind; an
    /// already empty one is deleted.
    pub fn remove_input_for_action(&mut self, action_id: &str, context: &str) {
        let Some(attributes) = self.table.get_mut(context, action_id) else {
            return;
        };

        if attributes.is_user_created || attributes.input_events.is_empty() {
            self.table.remove(context, action_id);
            tracing::debug!("Removed {} from {}", action_id, context);
        } else {
            attributes.input_events.clear();
            tracing::debug!("Cleared bindings of {} in {}", action_id, context);
        }
    }

    /// Empty the event list of `action_id` in `context`, creating the entry if needed
    pub fn clear_input_for_action(&mut self, action_id: &str, context: &str) {
        self.table
            .context_or_default(context)
            .entry(action_id.to_string())
            .or_default()
            .input_events
            .clear();
    }

    /// Strip `event` from the bindings of `action_id` in `context`, if present
    pub fn strip_input_for_action(&mut self, action_id: &str, context: &str, event: &InputEvent) {
        if let Some(attributes) = self.table.get_mut(context, action_id) {
            if attributes.strip_event(event) {
                tracing::debug!("Cleared conflicting input from {} in {}", action_id, context);
            }
        }
    }

    /// Display name of a key code
    pub fn key_name(&self, family: DeviceFamily, code: i32, portable: bool) -> String {
        self.registry.resolve_code(family, code, portable)
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InputManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputManager")
            .field("table", &self.table)
            .field("user_path", &self.user_path)
            .field("timeout", &self.timeout)
            .field("keycode_mode_supported", &self.keycode_mode_supported)
            .field("gamepad_available", &self.gamepad_available)
            .field("query_keybind_removal", &self.query_keybind_removal)
            .finish_non_exhaustive()
    }
}
