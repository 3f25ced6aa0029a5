//! Numeric key codes produced by the input backends
//!
//! Character-keyboard codes follow the curses numbering, raw keyboard codes
//! follow the SDL keycode numbering (scancode-derived keys carry bit 30).

/// Returned as the first input of an event with an empty sequence
pub const UNKNOWN_UNICODE: i32 = 0xFFFD;

/// First and last printable ASCII code; these self-map to one-character names
pub const CHAR_KEY_BEG: i32 = b' ' as i32;
pub const CHAR_KEY_END: i32 = b'~' as i32;

// ============================================================================
// Character keyboard (curses)
// ============================================================================

pub const KEY_TAB: i32 = b'\t' as i32;
pub const KEY_RETURN: i32 = b'\n' as i32;
pub const KEY_ESCAPE: i32 = 27;
pub const KEY_BREAK: i32 = 0o401;
pub const KEY_DOWN: i32 = 0o402;
pub const KEY_UP: i32 = 0o403;
pub const KEY_LEFT: i32 = 0o404;
pub const KEY_RIGHT: i32 = 0o405;
pub const KEY_HOME: i32 = 0o406;
pub const KEY_BACKSPACE: i32 = 0o407;
pub const KEY_F0: i32 = 0o410;
pub const KEY_NPAGE: i32 = 0o522;
pub const KEY_PPAGE: i32 = 0o523;
pub const KEY_BTAB: i32 = 0o541;
pub const KEY_END: i32 = 0o550;

pub const F_KEY_NUM_BEG: i32 = 0;
pub const F_KEY_NUM_END: i32 = 63;

/// Code of function key `n`
pub const fn key_f(n: i32) -> i32 {
    KEY_F0 + n
}

pub const fn is_f_key(code: i32) -> bool {
    code >= key_f(F_KEY_NUM_BEG) && code <= key_f(F_KEY_NUM_END)
}

/// Function key number of an F-key code
pub const fn f_key_num(code: i32) -> i32 {
    code - KEY_F0
}

// ============================================================================
// Raw keyboard (SDL keycodes)
// ============================================================================

pub mod keycode {
    const MASK: i32 = 1 << 30;

    const fn scancode(n: i32) -> i32 {
        n | MASK
    }

    pub const BACKSPACE: i32 = 8;
    pub const TAB: i32 = 9;
    pub const RETURN: i32 = 13;
    pub const ESCAPE: i32 = 27;
    pub const SPACE: i32 = 32;

    pub const F1: i32 = scancode(58);
    pub const F2: i32 = scancode(59);
    pub const F3: i32 = scancode(60);
    pub const F4: i32 = scancode(61);
    pub const F5: i32 = scancode(62);
    pub const F6: i32 = scancode(63);
    pub const F7: i32 = scancode(64);
    pub const F8: i32 = scancode(65);
    pub const F9: i32 = scancode(66);
    pub const F10: i32 = scancode(67);
    pub const F11: i32 = scancode(68);
    pub const F12: i32 = scancode(69);

    pub const HOME: i32 = scancode(74);
    pub const PPAGE: i32 = scancode(75);
    pub const END: i32 = scancode(77);
    pub const NPAGE: i32 = scancode(78);
    pub const RIGHT: i32 = scancode(79);
    pub const LEFT: i32 = scancode(80);
    pub const DOWN: i32 = scancode(81);
    pub const UP: i32 = scancode(82);

    pub const KP_DIVIDE: i32 = scancode(84);
    pub const KP_MULTIPLY: i32 = scancode(85);
    pub const KP_MINUS: i32 = scancode(86);
    pub const KP_PLUS: i32 = scancode(87);
    pub const KP_ENTER: i32 = scancode(88);
    pub const KP_1: i32 = scancode(89);
    pub const KP_2: i32 = scancode(90);
    pub const KP_3: i32 = scancode(91);
    pub const KP_4: i32 = scancode(92);
    pub const KP_5: i32 = scancode(93);
    pub const KP_6: i32 = scancode(94);
    pub const KP_7: i32 = scancode(95);
    pub const KP_8: i32 = scancode(96);
    pub const KP_9: i32 = scancode(97);
    pub const KP_0: i32 = scancode(98);
    pub const KP_PERIOD: i32 = scancode(99);

    pub const F13: i32 = scancode(104);
    pub const F14: i32 = scancode(105);
    pub const F15: i32 = scancode(106);
    pub const F16: i32 = scancode(107);
    pub const F17: i32 = scancode(108);
    pub const F18: i32 = scancode(109);
    pub const F19: i32 = scancode(110);
    pub const F20: i32 = scancode(111);
    pub const F21: i32 = scancode(112);
    pub const F22: i32 = scancode(113);
    pub const F23: i32 = scancode(114);
    pub const F24: i32 = scancode(115);
}

// ============================================================================
// Gamepad
// ============================================================================

pub const JOY_0: i32 = 0x1000;
pub const JOY_1: i32 = 0x1001;
pub const JOY_2: i32 = 0x1002;
pub const JOY_3: i32 = 0x1003;
pub const JOY_4: i32 = 0x1004;
pub const JOY_5: i32 = 0x1005;
pub const JOY_6: i32 = 0x1006;
pub const JOY_7: i32 = 0x1007;

pub const JOY_LEFT: i32 = 0x1100;
pub const JOY_RIGHT: i32 = 0x1101;
pub const JOY_UP: i32 = 0x1102;
pub const JOY_DOWN: i32 = 0x1103;
pub const JOY_LEFTUP: i32 = 0x1104;
pub const JOY_LEFTDOWN: i32 = 0x1105;
pub const JOY_RIGHTUP: i32 = 0x1106;
pub const JOY_RIGHTDOWN: i32 = 0x1107;

// ============================================================================
// Mouse
// ============================================================================

pub const MOUSE_BUTTON_LEFT: i32 = 1;
pub const MOUSE_BUTTON_RIGHT: i32 = 3;
pub const SCROLLWHEEL_UP: i32 = 4;
pub const SCROLLWHEEL_DOWN: i32 = 5;
pub const MOUSE_MOVE: i32 = 6;
