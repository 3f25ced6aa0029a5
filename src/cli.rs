//! Command-line interface for inspecting and maintaining keybinding files
//!
//! Supports:
//! - Validating the layered keybinding files
//! - Listing effective bindings per context
//! - Looking up which action an input maps to
//! - Importing a legacy keymap and exporting the merged table

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};

use crate::config::EngineConfig;
use crate::keymap::{
    import_legacy_keymap, load_input_manager, DeviceFamily, InputEvent, InputManager, Modifier,
    Modifiers, DEFAULT_CONTEXT,
};
use crate::session::{InputSession, ACTION_ERROR};

/// Keybinding resolution engine
#[derive(Parser, Debug)]
#[command(name = "inputmap", version, about = "Inspect and maintain keybinding files")]
pub struct CliArgs {
    /// Engine config file (defaults to the one in the config directory)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Default keybindings file replacing the embedded one
    #[arg(long, value_name = "FILE", global = true)]
    pub defaults: Option<PathBuf>,

    /// Vehicle keybindings file replacing the embedded one
    #[arg(long, value_name = "FILE", global = true)]
    pub vehicle: Option<PathBuf>,

    /// User keybindings file
    #[arg(long, value_name = "FILE", global = true)]
    pub user: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Load every layer and report what was found
    Check,

    /// Print effective bindings
    Show {
        /// Only this context
        #[arg(long)]
        context: Option<String>,
    },

    /// Print the action an input maps to
    Lookup {
        #[arg(long, default_value = DEFAULT_CONTEXT)]
        context: String,

        /// keyboard_char, keyboard_code, gamepad or mouse
        #[arg(long, default_value = "keyboard_char")]
        method: String,

        /// ctrl, alt or shift; repeatable
        #[arg(long = "mod", value_name = "MODIFIER")]
        modifiers: Vec<String>,

        /// Portable key names forming the input sequence
        #[arg(value_name = "KEY", required = true)]
        keys: Vec<String>,
    },

    /// Import a legacy keymap into the user keybindings file
    ImportLegacy {
        /// Legacy keymap (defaults to keymap.txt in the config directory)
        path: Option<PathBuf>,
    },

    /// Write the merged binding table to a file
    Export { path: PathBuf },
}

impl CliArgs {
    /// Engine config with command-line overrides applied
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load_from(path),
            None => EngineConfig::load(),
        };
        if let Some(defaults) = &self.defaults {
            config.defaults_file = Some(defaults.clone());
        }
        if let Some(vehicle) = &self.vehicle {
            config.vehicle_file = Some(vehicle.clone());
        }
        if let Some(user) = &self.user {
            config.user_file = Some(user.clone());
        }
        config
    }

    /// Run the selected command, writing its report to `out`
    pub fn run(&self, out: &mut impl Write) -> Result<()> {
        let config = self.engine_config();
        let mut paths = config.keybinding_paths();
        // Only `import-legacy` may rewrite files.
        let legacy = paths.legacy.take();

        let mut manager = load_input_manager(&paths).context("Failed to load keybindings")?;
        config.apply(&mut manager);

        match &self.command {
            CliCommand::Check => check(&manager, out),
            CliCommand::Show { context } => show(&manager, context.as_deref(), out),
            CliCommand::Lookup {
                context,
                method,
                modifiers,
                keys,
            } => lookup(&mut manager, &config, context, method, modifiers, keys, out),
            CliCommand::ImportLegacy { path } => {
                let Some(path) = path.clone().or(legacy) else {
                    bail!("No legacy keymap path available");
                };
                let imported = import_legacy_keymap(&mut manager, &path)
                    .with_context(|| format!("Failed to import {}", path.display()))?;
                writeln!(out, "imported {} entries from {}", imported, path.display())?;
                Ok(())
            }
            CliCommand::Export { path } => {
                manager
                    .save_to(path)
                    .with_context(|| format!("Failed to export to {}", path.display()))?;
                writeln!(out, "exported {} entries to {}", manager.table().len(), path.display())?;
                Ok(())
            }
        }
    }
}

fn check(manager: &InputManager, out: &mut impl Write) -> Result<()> {
    for (name, context) in manager.table().contexts() {
        let unbound = context.values().filter(|a| a.is_unbound()).count();
        writeln!(out, "{name}: {} actions ({unbound} unbound)", context.len())?;
    }
    writeln!(out, "ok: {} entries", manager.table().len())?;
    Ok(())
}

fn show(manager: &InputManager, only: Option<&str>, out: &mut impl Write) -> Result<()> {
    if let Some(name) = only {
        if manager.table().context(name).is_none() {
            bail!("Unknown context '{}'", name);
        }
    }

    for (ctx, id, attrs) in manager.table().entries() {
        if only.is_some_and(|name| name != ctx) {
            continue;
        }
        let events: Vec<String> = attrs
            .input_events
            .iter()
            .map(|e| portable_label(manager, e))
            .collect();
        writeln!(
            out,
            "{ctx}\t{id}\t{}{}\t{}",
            attrs.name.as_deref().unwrap_or(id),
            if attrs.is_user_created { " (user)" } else { "" },
            if events.is_empty() {
                "-".to_string()
            } else {
                events.join(", ")
            }
        )?;
    }
    Ok(())
}

fn lookup(
    manager: &mut InputManager,
    config: &EngineConfig,
    context: &str,
    method: &str,
    modifiers: &[String],
    keys: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let Some(family) = DeviceFamily::from_input_method(method) else {
        bail!("Unknown input method '{}'", method);
    };

    let mut mods = Modifiers::NONE;
    for name in modifiers {
        let Some(modifier) = Modifier::from_name(name) else {
            bail!("Unknown modifier '{}'", name);
        };
        mods.insert(modifier);
    }

    let sequence = keys
        .iter()
        .map(|key| manager.registry().resolve_name(family, key))
        .collect();
    let event = InputEvent::new(family.into(), mods, sequence);

    // Every action the context or the global context knows, local ones first
    let mut session = InputSession::new(context, config.keyboard_mode);
    let mut candidates: Vec<String> = Vec::new();
    for ctx in [context, DEFAULT_CONTEXT] {
        if let Some(actions) = manager.table().context(ctx) {
            for id in actions.keys() {
                if !candidates.contains(id) {
                    candidates.push(id.clone());
                }
            }
        }
    }
    for id in &candidates {
        session.register_action(id);
    }

    let action = session.lookup(manager, &event).to_string();
    if action == ACTION_ERROR {
        writeln!(out, "no action bound to {}", portable_label(manager, &event))?;
    } else {
        writeln!(out, "{action}")?;
    }
    Ok(())
}

/// `"keyboard_char ctrl+q"` style label using portable names
fn portable_label(manager: &InputManager, event: &InputEvent) -> String {
    let Some(family) = event.kind.family() else {
        return format!("{:?}", event.kind);
    };
    let keys: Vec<String> = event
        .sequence
        .iter()
        .map(|&code| manager.key_name(family, code, true))
        .collect();
    if event.modifiers.is_empty() {
        format!("{} {}", family.input_method(), keys.join(" "))
    } else {
        format!("{} {}+{}", family.input_method(), event.modifiers, keys.join(" "))
    }
}
