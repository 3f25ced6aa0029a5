//! Tracing setup and diagnostics helpers
//!
//! Provides structured logging with scoped filtering for debugging binding
//! loads, lookups and editor sessions.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=inputmap::keymap=debug` - module-level filtering
//! - `RUST_LOG=inputmap::session=trace` - every ignored event
//!
//! # Log Files
//!
//! Logs are written to `~/.config/inputmap/logs/inputmap.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use indexmap::IndexMap;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::keymap::{BindingTable, InputEvent};

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG env var for filtering (default `warn`).
/// File logging writes to `~/.config/inputmap/logs/inputmap.log` with daily rotation.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(
                logs_dir,
                crate::config_paths::LOG_FILE_NAME,
            );
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight copy of every entry's bindings for diffing
#[derive(Debug, Clone, Default)]
pub struct TableSnapshot {
    entries: IndexMap<(String, String), Vec<InputEvent>>,
}

impl TableSnapshot {
    pub fn capture(table: &BindingTable) -> Self {
        Self {
            entries: table
                .entries()
                .map(|(ctx, id, attrs)| {
                    ((ctx.to_string(), id.to_string()), attrs.input_events.clone())
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &TableSnapshot) -> Option<String> {
        let mut changes = Vec::new();

        for ((ctx, id), before) in &self.entries {
            match other.entries.get(&(ctx.clone(), id.clone())) {
                None => changes.push(format!("{ctx}/{id}: removed")),
                Some(after) if after != before => changes.push(format!(
                    "{ctx}/{id}: {} → {} bindings",
                    before.len(),
                    after.len()
                )),
                Some(_) => {}
            }
        }
        for ((ctx, id), after) in &other.entries {
            if !self.entries.contains_key(&(ctx.clone(), id.clone())) {
                changes.push(format!("{ctx}/{id}: added ({} bindings)", after.len()));
            }
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{InputManager, DEFAULT_CONTEXT};

    #[test]
    fn test_diff_reports_changes() {
        let mut manager = InputManager::new();
        manager.add_input_for_action("QUIT", DEFAULT_CONTEXT, InputEvent::char('q'));
        manager.add_input_for_action("UP", DEFAULT_CONTEXT, InputEvent::char('k'));
        let before = TableSnapshot::capture(manager.table());
        assert_eq!(before.diff(&before.clone()), None);

        manager.add_input_for_action("QUIT", DEFAULT_CONTEXT, InputEvent::char('x'));
        manager.remove_input_for_action("UP", DEFAULT_CONTEXT);
        manager.add_input_for_action("FIRE", "combat", InputEvent::char('f'));
        let after = TableSnapshot::capture(manager.table());

        let diff = before.diff(&after).unwrap();
        assert!(diff.contains("default/QUIT: 1 → 2 bindings"));
        assert!(diff.contains("default/UP: removed"));
        assert!(diff.contains("combat/FIRE: added (1 bindings)"));
        assert_eq!(after.len(), 2);
    }
}
