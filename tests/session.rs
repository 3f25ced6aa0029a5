//! Input session tests
//!
//! Tests for the read loop: lookups, sentinels, mouse handling and timeouts.

mod common;

use common::{key, key_with, mouse, named, test_manager, ScriptedFrontend};
use inputmap::keymap::{
    DeviceFamily, InputEvent, InputKind, KeyboardMode, Modifiers, Point, RawEvent, NO_TIMEOUT,
};
use inputmap::session::{
    wait_for_any_key, InputSession, ANY_INPUT, COORDINATE, HELP_KEYBINDINGS, TIMEOUT,
};

fn vehicle_session() -> InputSession {
    let mut session = InputSession::new("VEHICLE", KeyboardMode::Keychar);
    session.register_updown();
    session.register_action("TOGGLE_ENGINE");
    session.register_action("QUIT");
    session
}

// ========================================================================
// Lookups
// ========================================================================

#[test]
fn test_consume_skips_unbound_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = test_manager(&dir.path().join("keybindings.json"));
    let mut session = vehicle_session();
    let mut frontend = ScriptedFrontend::new([key('k'), key('w')]);

    assert_eq!(session.consume_next(&mut manager, &mut frontend), "UP");
    assert_eq!(session.raw_input(), &InputEvent::char('w'));
    assert!(frontend.is_exhausted());
}

#[test]
fn test_modifiers_must_match() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = test_manager(&dir.path().join("keybindings.json"));
    let mut session = vehicle_session();
    let mut frontend = ScriptedFrontend::new([key('e'), key_with('e', Modifiers::CTRL)]);

    assert_eq!(session.consume_next(&mut manager, &mut frontend), "TOGGLE_ENGINE");
    assert_eq!(frontend.waits.len(), 2);
}

#[test]
fn test_local_bindings_only_apply_in_their_context() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = test_manager(&dir.path().join("keybindings.json"));
    let mut session = InputSession::new("default", KeyboardMode::Keychar);
    session.register_updown();
    session.register_action("QUIT");

    let esc = named(&manager, "ESC");
    let mut frontend = ScriptedFrontend::new([key('w'), esc]);
    assert_eq!(session.consume_next(&mut manager, &mut frontend), "QUIT");
}

#[test]
fn test_shared_key_goes_to_first_registered() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = test_manager(&dir.path().join("keybindings.json"));
    manager
        .load_str(
            r#"[
                { "id": "FOO", "bindings": [{ "input_method": "keyboard_char", "key": "x" }] },
                { "id": "BAR", "bindings": [{ "input_method": "keyboard_char", "key": "x" }] }
            ]"#,
            "shared.json",
            false,
        )
        .unwrap();

    let mut session = InputSession::new("default", KeyboardMode::Keychar);
    session.register_action("BAR");
    session.register_action("FOO");
    let mut frontend = ScriptedFrontend::new([key('x')]);
    assert_eq!(session.consume_next(&mut manager, &mut frontend), "BAR");

    let mut session = InputSession::new("default", KeyboardMode::Keychar);
    session.register_action("FOO");
    session.register_action("BAR");
    let mut frontend = ScriptedFrontend::new([key('x')]);
    assert_eq!(session.consume_next(&mut manager, &mut frontend), "FOO");
}

#[test]
fn test_unknown_actions_are_created_globally() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = test_manager(&dir.path().join("keybindings.json"));
    let mut session = InputSession::new("VEHICLE", KeyboardMode::Keychar);
    session.register_action("NEVER_DEFINED");
    session.register_action(ANY_INPUT);

    let mut frontend = ScriptedFrontend::new([key('k')]);
    assert_eq!(session.consume_next(&mut manager, &mut frontend), ANY_INPUT);

    let created = manager.table().get("default", "NEVER_DEFINED").unwrap();
    assert!(created.is_unbound());
    assert!(!manager.table().contains("default", ANY_INPUT));
}

// ========================================================================
// Sentinels
// ========================================================================

#[test]
fn test_timeout_short_circuits_and_restores() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = test_manager(&dir.path().join("keybindings.json"));
    let mut session = vehicle_session();
    session.set_timeout(50);

    let mut frontend = ScriptedFrontend::new([RawEvent::new(InputEvent::timeout())]);
    assert_eq!(session.consume_next(&mut manager, &mut frontend), TIMEOUT);
    assert_eq!(frontend.waits, vec![Some(50)]);
    assert_eq!(manager.timeout(), NO_TIMEOUT);
}

#[test]
fn test_any_input_catches_unbound_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = test_manager(&dir.path().join("keybindings.json"));
    let mut session = vehicle_session();
    session.register_action(ANY_INPUT);

    let mut frontend = ScriptedFrontend::new([key('k'), key('w')]);
    assert_eq!(session.consume_next(&mut manager, &mut frontend), ANY_INPUT);
    assert_eq!(session.consume_next(&mut manager, &mut frontend), "UP");
}

#[test]
fn test_help_opens_editor_then_returns() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = test_manager(&dir.path().join("keybindings.json"));
    let mut session = vehicle_session();
    session.register_action(HELP_KEYBINDINGS);
    session.set_timeout(100);

    let esc = named(&manager, "ESC");
    let mut frontend = ScriptedFrontend::new([key('?'), esc]);
    assert_eq!(
        session.consume_next(&mut manager, &mut frontend),
        HELP_KEYBINDINGS
    );

    // The editor rendered once and read without a timeout
    assert_eq!(frontend.views.len(), 1);
    assert_eq!(frontend.last_view().category, "VEHICLE");
    assert_eq!(frontend.waits, vec![Some(100), None]);
    assert!(frontend.questions.is_empty());
    assert_eq!(manager.timeout(), NO_TIMEOUT);
}

#[test]
fn test_disabled_families_are_filtered() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = test_manager(&dir.path().join("keybindings.json"));
    let mut session = InputSession::new("default", KeyboardMode::Keychar);
    session.register_updown();

    let joy_up = manager.registry().resolve_name(DeviceFamily::Gamepad, "JOY_UP");
    let gamepad_up = RawEvent::new(InputEvent::key(InputKind::Gamepad, joy_up));
    let down = named(&manager, "DOWN");

    let mut frontend = ScriptedFrontend::new([gamepad_up.clone(), down]);
    assert_eq!(session.consume_next(&mut manager, &mut frontend), "DOWN");

    manager.set_gamepad_available(true);
    let mut frontend = ScriptedFrontend::new([gamepad_up]);
    assert_eq!(session.consume_next(&mut manager, &mut frontend), "UP");
}

// ========================================================================
// Mouse
// ========================================================================

#[test]
fn test_unbound_mouse_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = test_manager(&dir.path().join("keybindings.json"));
    let mut session = vehicle_session();
    session.register_action(ANY_INPUT);

    let motion = mouse(&manager, "MOUSE_MOVE", 3, 4);
    let esc = named(&manager, "ESC");
    let mut frontend = ScriptedFrontend::new([motion, esc]);
    assert_eq!(session.consume_next(&mut manager, &mut frontend), "QUIT");
    assert_eq!(session.coordinate(), None);
}

#[test]
fn test_bound_mouse_reports_coordinate() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = test_manager(&dir.path().join("keybindings.json"));
    let mut session = vehicle_session();
    session.register_action("SELECT");

    let click = mouse(&manager, "MOUSE_LEFT", 7, 2);
    let mut frontend = ScriptedFrontend::new([click, key('w')]);
    assert_eq!(session.consume_next(&mut manager, &mut frontend), "SELECT");
    assert_eq!(session.coordinate(), Some(Point::new(7, 2)));

    // Keyboard input clears the coordinate again
    assert_eq!(session.consume_next(&mut manager, &mut frontend), "UP");
    assert_eq!(session.coordinate(), None);
}

#[test]
fn test_coordinate_input_accepts_motion() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = test_manager(&dir.path().join("keybindings.json"));
    let mut session = vehicle_session();
    session.register_action(COORDINATE);
    session.register_action(ANY_INPUT);

    let motion = mouse(&manager, "MOUSE_MOVE", 10, 11);
    let mut frontend = ScriptedFrontend::new([motion]);
    assert_eq!(session.consume_next(&mut manager, &mut frontend), ANY_INPUT);
    assert_eq!(session.coordinate(), Some(Point::new(10, 11)));
    assert!(!manager.table().contains("default", COORDINATE));
}

#[test]
fn test_wait_for_any_key_ignores_mouse() {
    let dir = tempfile::tempdir().unwrap();
    let manager = test_manager(&dir.path().join("keybindings.json"));

    let motion = mouse(&manager, "MOUSE_MOVE", 1, 1);
    let mut frontend = ScriptedFrontend::new([motion, key('z'), key('y')]);
    wait_for_any_key(&manager, &mut frontend);
    assert_eq!(frontend.events.len(), 1);
}
