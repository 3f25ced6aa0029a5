//! Bidirectional key code <-> portable key name tables, one pair per device family

use std::collections::HashMap;

use super::keycodes::*;
use super::types::DeviceFamily;

/// Prefix of portable names that carry a raw numeric code
pub const UNKNOWN_PREFIX: &str = "UNKNOWN_";

#[derive(Debug, Clone, Default)]
struct FamilyTable {
    code_to_name: HashMap<i32, String>,
    name_to_code: HashMap<String, i32>,
}

/// Translates between numeric key codes and portable key names.
///
/// Registration is last-wins in both directions: re-registering a code or a
/// name silently replaces the earlier pairing for that direction.
#[derive(Debug, Clone)]
pub struct KeycodeRegistry {
    tables: [FamilyTable; 4],
}

impl KeycodeRegistry {
    /// A registry with no entries at all
    pub fn empty() -> Self {
        Self {
            tables: Default::default(),
        }
    }

    /// A registry populated with the standard key names of every family
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_defaults();
        registry
    }

    fn table(&self, family: DeviceFamily) -> &FamilyTable {
        &self.tables[family as usize]
    }

    fn table_mut(&mut self, family: DeviceFamily) -> &mut FamilyTable {
        &mut self.tables[family as usize]
    }

    /// Pair `code` and `name` for one device family
    pub fn register(&mut self, family: DeviceFamily, code: i32, name: impl Into<String>) {
        let name = name.into();
        let table = self.table_mut(family);
        table.code_to_name.insert(code, name.clone());
        table.name_to_code.insert(name, code);
    }

    /// Code for a portable name.
    ///
    /// Falls back to parsing `UNKNOWN_<digits>`, then to 0.
    pub fn resolve_name(&self, family: DeviceFamily, name: &str) -> i32 {
        if let Some(&code) = self.table(family).name_to_code.get(name) {
            return code;
        }
        name.strip_prefix(UNKNOWN_PREFIX)
            .and_then(parse_leading_int)
            .unwrap_or(0)
    }

    /// Name for a code.
    ///
    /// With `portable` the result is the stable on-disk name (`UNKNOWN_<code>`
    /// when unregistered); otherwise it is meant for display.
    pub fn resolve_code(&self, family: DeviceFamily, code: i32, portable: bool) -> String {
        let Some(name) = self.table(family).code_to_name.get(&code) else {
            return if portable {
                format!("{UNKNOWN_PREFIX}{code}")
            } else {
                format!("unknown key {code}")
            };
        };

        if !portable && family == DeviceFamily::KeyboardChar && is_f_key(code) {
            return format!("F{}", f_key_num(code));
        }
        name.clone()
    }

    /// Whether a code has a registered name for the family
    pub fn contains_code(&self, family: DeviceFamily, code: i32) -> bool {
        self.table(family).code_to_name.contains_key(&code)
    }

    fn register_defaults(&mut self) {
        use DeviceFamily::*;

        for c in CHAR_KEY_BEG..=CHAR_KEY_END {
            let name = char::from_u32(c as u32).map(String::from).unwrap_or_default();
            self.register(KeyboardChar, c, name.clone());
            self.register(KeyboardCode, c, name);
        }

        let char_keys = [
            (KEY_TAB, "TAB"),
            (KEY_BTAB, "BACKTAB"),
            (CHAR_KEY_BEG, "SPACE"),
            (KEY_UP, "UP"),
            (KEY_DOWN, "DOWN"),
            (KEY_LEFT, "LEFT"),
            (KEY_RIGHT, "RIGHT"),
            (KEY_NPAGE, "NPAGE"),
            (KEY_PPAGE, "PPAGE"),
            (KEY_ESCAPE, "ESC"),
            (KEY_BACKSPACE, "BACKSPACE"),
            (KEY_HOME, "HOME"),
            (KEY_BREAK, "BREAK"),
            (KEY_END, "END"),
            (KEY_RETURN, "RETURN"),
        ];
        for (code, name) in char_keys {
            self.register(KeyboardChar, code, name);
        }
        for n in F_KEY_NUM_BEG..=F_KEY_NUM_END {
            self.register(KeyboardChar, key_f(n), format!("F{n}"));
        }

        let code_keys = [
            (keycode::BACKSPACE, "BACKSPACE"),
            (keycode::TAB, "TAB"),
            (keycode::RETURN, "RETURN"),
            (keycode::ESCAPE, "ESC"),
            (keycode::SPACE, "SPACE"),
            (keycode::F1, "F1"),
            (keycode::F2, "F2"),
            (keycode::F3, "F3"),
            (keycode::F4, "F4"),
            (keycode::F5, "F5"),
            (keycode::F6, "F6"),
            (keycode::F7, "F7"),
            (keycode::F8, "F8"),
            (keycode::F9, "F9"),
            (keycode::F10, "F10"),
            (keycode::F11, "F11"),
            (keycode::F12, "F12"),
            (keycode::PPAGE, "PPAGE"),
            (keycode::HOME, "HOME"),
            (keycode::END, "END"),
            (keycode::NPAGE, "NPAGE"),
            (keycode::RIGHT, "RIGHT"),
            (keycode::LEFT, "LEFT"),
            (keycode::DOWN, "DOWN"),
            (keycode::UP, "UP"),
            (keycode::KP_DIVIDE, "KEYPAD_DIVIDE"),
            (keycode::KP_MULTIPLY, "KEYPAD_MULTIPLY"),
            (keycode::KP_MINUS, "KEYPAD_MINUS"),
            (keycode::KP_PLUS, "KEYPAD_PLUS"),
            (keycode::KP_ENTER, "KEYPAD_ENTER"),
            (keycode::KP_1, "KEYPAD_1"),
            (keycode::KP_2, "KEYPAD_2"),
            (keycode::KP_3, "KEYPAD_3"),
            (keycode::KP_4, "KEYPAD_4"),
            (keycode::KP_5, "KEYPAD_5"),
            (keycode::KP_6, "KEYPAD_6"),
            (keycode::KP_7, "KEYPAD_7"),
            (keycode::KP_8, "KEYPAD_8"),
            (keycode::KP_9, "KEYPAD_9"),
            (keycode::KP_0, "KEYPAD_0"),
            (keycode::KP_PERIOD, "KEYPAD_PERIOD"),
            (keycode::F13, "F13"),
            (keycode::F14, "F14"),
            (keycode::F15, "F15"),
            (keycode::F16, "F16"),
            (keycode::F17, "F17"),
            (keycode::F18, "F18"),
            (keycode::F19, "F19"),
            (keycode::F20, "F20"),
            (keycode::F21, "F21"),
            (keycode::F22, "F22"),
            (keycode::F23, "F23"),
            (keycode::F24, "F24"),
        ];
        for (code, name) in code_keys {
            self.register(KeyboardCode, code, name);
        }

        let gamepad_keys = [
            (JOY_LEFT, "JOY_LEFT"),
            (JOY_RIGHT, "JOY_RIGHT"),
            (JOY_UP, "JOY_UP"),
            (JOY_DOWN, "JOY_DOWN"),
            (JOY_LEFTUP, "JOY_LEFTUP"),
            (JOY_LEFTDOWN, "JOY_LEFTDOWN"),
            (JOY_RIGHTUP, "JOY_RIGHTUP"),
            (JOY_RIGHTDOWN, "JOY_RIGHTDOWN"),
            (JOY_0, "JOY_0"),
            (JOY_1, "JOY_1"),
            (JOY_2, "JOY_2"),
            (JOY_3, "JOY_3"),
            (JOY_4, "JOY_4"),
            (JOY_5, "JOY_5"),
            (JOY_6, "JOY_6"),
            (JOY_7, "JOY_7"),
        ];
        for (code, name) in gamepad_keys {
            self.register(Gamepad, code, name);
        }

        let mouse_keys = [
            (MOUSE_BUTTON_LEFT, "MOUSE_LEFT"),
            (MOUSE_BUTTON_RIGHT, "MOUSE_RIGHT"),
            (SCROLLWHEEL_UP, "SCROLL_UP"),
            (SCROLLWHEEL_DOWN, "SCROLL_DOWN"),
            (MOUSE_MOVE, "MOUSE_MOVE"),
        ];
        for (code, name) in mouse_keys {
            self.register(Mouse, code, name);
        }
    }
}

impl Default for KeycodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an optionally signed run of leading digits, ignoring trailing junk
fn parse_leading_int(s: &str) -> Option<i32> {
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve_both_ways() {
        let mut registry = KeycodeRegistry::empty();
        registry.register(DeviceFamily::KeyboardChar, 65, "A");

        assert_eq!(registry.resolve_name(DeviceFamily::KeyboardChar, "A"), 65);
        assert_eq!(registry.resolve_code(DeviceFamily::KeyboardChar, 65, true), "A");
    }

    #[test]
    fn test_families_are_independent() {
        let mut registry = KeycodeRegistry::empty();
        registry.register(DeviceFamily::Gamepad, 7, "JOY_X");

        assert_eq!(registry.resolve_name(DeviceFamily::Mouse, "JOY_X"), 0);
        assert_eq!(registry.resolve_code(DeviceFamily::Mouse, 7, true), "UNKNOWN_7");
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = KeycodeRegistry::empty();
        registry.register(DeviceFamily::KeyboardChar, 1, "ONE");
        registry.register(DeviceFamily::KeyboardChar, 1, "UNO");

        assert_eq!(registry.resolve_code(DeviceFamily::KeyboardChar, 1, true), "UNO");
        // the old name still points at the code
        assert_eq!(registry.resolve_name(DeviceFamily::KeyboardChar, "ONE"), 1);
    }

    #[test]
    fn test_unknown_code_round_trip() {
        let registry = KeycodeRegistry::new();
        let name = registry.resolve_code(DeviceFamily::KeyboardChar, 9999, true);
        assert_eq!(name, "UNKNOWN_9999");
        assert_eq!(registry.resolve_name(DeviceFamily::KeyboardChar, &name), 9999);
    }

    #[test]
    fn test_unknown_code_display() {
        let registry = KeycodeRegistry::new();
        assert_eq!(
            registry.resolve_code(DeviceFamily::Gamepad, 9999, false),
            "unknown key 9999"
        );
    }

    #[test]
    fn test_unresolvable_name_is_zero() {
        let registry = KeycodeRegistry::new();
        assert_eq!(registry.resolve_name(DeviceFamily::KeyboardChar, "NOPE"), 0);
        assert_eq!(registry.resolve_name(DeviceFamily::KeyboardChar, "UNKNOWN_"), 0);
    }

    #[test]
    fn test_printable_self_mapping() {
        let registry = KeycodeRegistry::new();
        for family in [DeviceFamily::KeyboardChar, DeviceFamily::KeyboardCode] {
            assert_eq!(registry.resolve_name(family, "a"), 'a' as i32);
            assert_eq!(registry.resolve_code(family, '~' as i32, false), "~");
        }
    }

    #[test]
    fn test_space_is_named() {
        let registry = KeycodeRegistry::new();
        assert_eq!(registry.resolve_code(DeviceFamily::KeyboardChar, 32, true), "SPACE");
        assert_eq!(registry.resolve_name(DeviceFamily::KeyboardChar, "SPACE"), 32);
        assert_eq!(registry.resolve_name(DeviceFamily::KeyboardChar, " "), 32);
        assert_eq!(
            registry.resolve_code(DeviceFamily::KeyboardCode, keycode::SPACE, true),
            "SPACE"
        );
    }

    #[test]
    fn test_function_key_display() {
        let mut registry = KeycodeRegistry::new();
        registry.register(DeviceFamily::KeyboardChar, key_f(5), "FUNC_5");

        assert_eq!(
            registry.resolve_code(DeviceFamily::KeyboardChar, key_f(5), true),
            "FUNC_5"
        );
        assert_eq!(
            registry.resolve_code(DeviceFamily::KeyboardChar, key_f(5), false),
            "F5"
        );
    }

    #[test]
    fn test_named_keys_per_family() {
        let registry = KeycodeRegistry::new();
        assert_eq!(registry.resolve_name(DeviceFamily::KeyboardChar, "UP"), KEY_UP);
        assert_eq!(registry.resolve_name(DeviceFamily::KeyboardCode, "UP"), keycode::UP);
        assert_eq!(registry.resolve_name(DeviceFamily::Gamepad, "JOY_3"), JOY_3);
        assert_eq!(
            registry.resolve_name(DeviceFamily::Mouse, "SCROLL_DOWN"),
            SCROLLWHEEL_DOWN
        );
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("42abc"), Some(42));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("abc"), None);
    }
}
