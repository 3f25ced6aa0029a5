//! Core types for the keymap system: InputEvent, Modifiers, InputKind

use std::fmt;

use serde::{Deserialize, Serialize};

use super::keycodes::UNKNOWN_UNICODE;

/// Device family a key code belongs to.
///
/// Each family owns its own code/name table in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceFamily {
    /// Translated character input (curses-style codes)
    KeyboardChar,
    /// Raw keyboard codes, independent of layout
    KeyboardCode,
    Gamepad,
    Mouse,
}

impl DeviceFamily {
    pub const ALL: [DeviceFamily; 4] = [
        DeviceFamily::KeyboardChar,
        DeviceFamily::KeyboardCode,
        DeviceFamily::Gamepad,
        DeviceFamily::Mouse,
    ];

    /// Name used for `input_method` in keybinding files
    pub const fn input_method(self) -> &'static str {
        match self {
            DeviceFamily::KeyboardChar => "keyboard_char",
            DeviceFamily::KeyboardCode => "keyboard_code",
            DeviceFamily::Gamepad => "gamepad",
            DeviceFamily::Mouse => "mouse",
        }
    }

    /// Inverse of [`input_method`](Self::input_method); `keyboard` is accepted for `keyboard_char`
    pub fn from_input_method(method: &str) -> Option<DeviceFamily> {
        match method {
            "keyboard_char" | "keyboard" => Some(DeviceFamily::KeyboardChar),
            "keyboard_code" => Some(DeviceFamily::KeyboardCode),
            "gamepad" => Some(DeviceFamily::Gamepad),
            "mouse" => Some(DeviceFamily::Mouse),
            _ => None,
        }
    }

    /// Families a binding's `input_method` expands to; `keyboard_any` yields
    /// both keyboard families
    pub fn families_for_input_method(method: &str) -> Option<&'static [DeviceFamily]> {
        if method == "keyboard_any" {
            return Some(&[DeviceFamily::KeyboardChar, DeviceFamily::KeyboardCode]);
        }
        let families: &'static [DeviceFamily] = match Self::from_input_method(method)? {
            DeviceFamily::KeyboardChar => &[DeviceFamily::KeyboardChar],
            DeviceFamily::KeyboardCode => &[DeviceFamily::KeyboardCode],
            DeviceFamily::Gamepad => &[DeviceFamily::Gamepad],
            DeviceFamily::Mouse => &[DeviceFamily::Mouse],
        };
        Some(families)
    }
}

/// Type tag of an input event: one of the device families or a sentinel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    KeyboardChar,
    KeyboardCode,
    Gamepad,
    Mouse,
    /// No usable input was produced
    Error,
    /// The wait timeout elapsed before any input arrived
    Timeout,
}

impl InputKind {
    /// The device family backing this kind, `None` for sentinels
    pub const fn family(self) -> Option<DeviceFamily> {
        match self {
            InputKind::KeyboardChar => Some(DeviceFamily::KeyboardChar),
            InputKind::KeyboardCode => Some(DeviceFamily::KeyboardCode),
            InputKind::Gamepad => Some(DeviceFamily::Gamepad),
            InputKind::Mouse => Some(DeviceFamily::Mouse),
            InputKind::Error | InputKind::Timeout => None,
        }
    }
}

impl From<DeviceFamily> for InputKind {
    fn from(family: DeviceFamily) -> Self {
        match family {
            DeviceFamily::KeyboardChar => InputKind::KeyboardChar,
            DeviceFamily::KeyboardCode => InputKind::KeyboardCode,
            DeviceFamily::Gamepad => InputKind::Gamepad,
            DeviceFamily::Mouse => InputKind::Mouse,
        }
    }
}

/// Which keyboard family a session wants to receive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardMode {
    #[default]
    Keychar,
    Keycode,
}

/// A single modifier key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
}

impl Modifier {
    /// Modifiers in their canonical (serialization and display) order
    pub const ALL: [Modifier; 3] = [Modifier::Ctrl, Modifier::Alt, Modifier::Shift];

    pub const fn name(self) -> &'static str {
        match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Alt => "alt",
            Modifier::Shift => "shift",
        }
    }

    pub fn from_name(name: &str) -> Option<Modifier> {
        match name {
            "ctrl" => Some(Modifier::Ctrl),
            "alt" => Some(Modifier::Alt),
            "shift" => Some(Modifier::Shift),
            _ => None,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Modifier::Ctrl => 0b001,
            Modifier::Alt => 0b010,
            Modifier::Shift => 0b100,
        }
    }
}

/// Modifier keys as a bitfield; a set, so each modifier appears at most once
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b001);
    pub const ALT: Modifiers = Modifiers(0b010);
    pub const SHIFT: Modifiers = Modifiers(0b100);

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, alt: bool, shift: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b001;
        }
        if alt {
            bits |= 0b010;
        }
        if shift {
            bits |= 0b100;
        }
        Modifiers(bits)
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b001 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b010 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b100 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn has(self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    /// Add a modifier; inserting one twice is a no-op
    pub fn insert(&mut self, modifier: Modifier) {
        self.0 |= modifier.bit();
    }

    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// Held modifiers in canonical order
    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL.into_iter().filter(move |m| self.has(*m))
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl From<Modifier> for Modifiers {
    fn from(modifier: Modifier) -> Self {
        Modifiers(modifier.bit())
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut mods = Modifiers::NONE;
        for modifier in iter {
            mods.insert(modifier);
        }
        mods
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.iter().map(Modifier::name).collect();
        write!(f, "{}", parts.join("+"))
    }
}

/// One input: device kind, held modifiers and the code sequence.
///
/// Sequences have length 1 for plain keys; longer sequences come from
/// multi-key bindings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InputEvent {
    pub kind: InputKind,
    pub modifiers: Modifiers,
    pub sequence: Vec<i32>,
}

impl InputEvent {
    pub fn new(kind: InputKind, modifiers: Modifiers, sequence: Vec<i32>) -> Self {
        Self {
            kind,
            modifiers,
            sequence,
        }
    }

    /// A single-code event without modifiers
    pub fn key(kind: InputKind, code: i32) -> Self {
        Self::new(kind, Modifiers::NONE, vec![code])
    }

    /// A keyboard-char event for a character
    pub fn char(c: char) -> Self {
        Self::key(InputKind::KeyboardChar, c as i32)
    }

    pub fn with_mods(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn error() -> Self {
        Self::new(InputKind::Error, Modifiers::NONE, Vec::new())
    }

    pub fn timeout() -> Self {
        Self::new(InputKind::Timeout, Modifiers::NONE, Vec::new())
    }

    /// First code of the sequence, or `UNKNOWN_UNICODE` if empty
    pub fn first_input(&self) -> i32 {
        self.sequence.first().copied().unwrap_or(UNKNOWN_UNICODE)
    }
}

/// A pointer position in screen units
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An event as delivered by the backend, with the pointer position when the
/// device reports one. The position never takes part in binding comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawEvent {
    pub event: InputEvent,
    pub pointer: Option<Point>,
}

impl RawEvent {
    pub fn new(event: InputEvent) -> Self {
        Self {
            event,
            pointer: None,
        }
    }

    pub fn at(event: InputEvent, pointer: Point) -> Self {
        Self {
            event,
            pointer: Some(pointer),
        }
    }
}

impl From<InputEvent> for RawEvent {
    fn from(event: InputEvent) -> Self {
        RawEvent::new(event)
    }
}
