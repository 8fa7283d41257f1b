//! Positional mapping from hardware key codes to layout buttons.
//!
//! Hardware codes describe *where* a key is (`KeyQ` is the second key of the
//! second row), not what it prints. The mapper lays the first five rows of
//! the visible layout over a fixed QWERTY geometry, so `KeyQ` yields whatever
//! button sits in that slot: `q` on an English layout, `/` on a Hebrew one.

use crate::layout::{Layout, DEFAULT_LAYOUT_NAME, SHIFT_LAYOUT_NAME};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Physical rows, 14/14/13/12/3 keys wide.
pub const PHYSICAL_ROWS: [&[&str]; 5] = [
    &[
        "Backquote", "Digit1", "Digit2", "Digit3", "Digit4", "Digit5", "Digit6", "Digit7",
        "Digit8", "Digit9", "Digit0", "Minus", "Equal", "Backspace",
    ],
    &[
        "Tab", "KeyQ", "KeyW", "KeyE", "KeyR", "KeyT", "KeyY", "KeyU", "KeyI", "KeyO", "KeyP",
        "BracketLeft", "BracketRight", "Backslash",
    ],
    &[
        "CapsLock", "KeyA", "KeyS", "KeyD", "KeyF", "KeyG", "KeyH", "KeyJ", "KeyK", "KeyL",
        "Semicolon", "Quote", "Enter",
    ],
    &[
        "ShiftLeft", "KeyZ", "KeyX", "KeyC", "KeyV", "KeyB", "KeyN", "KeyM", "Comma", "Period",
        "Slash", "ShiftRight",
    ],
    &["ControlLeft", "AltLeft", "Space"],
];

/// Code → (row, column) in [`PHYSICAL_ROWS`].
static CODE_POSITIONS: Lazy<HashMap<&'static str, (usize, usize)>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for (row, codes) in PHYSICAL_ROWS.iter().enumerate() {
        for (col, code) in codes.iter().enumerate() {
            m.insert(*code, (row, col));
        }
    }
    m
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Down,
    Up,
}

/// A hardware key event as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalKeyEvent {
    /// Position code, e.g. `"KeyQ"`
    pub code: String,
    /// Character or key name the host reported, e.g. `"q"` or `"ArrowLeft"`
    pub key: String,
    pub state: KeyState,
}

impl PhysicalKeyEvent {
    pub fn down<C: Into<String>, K: Into<String>>(code: C, key: K) -> Self {
        Self {
            code: code.into(),
            key: key.into(),
            state: KeyState::Down,
        }
    }

    pub fn up<C: Into<String>, K: Into<String>>(code: C, key: K) -> Self {
        Self {
            code: code.into(),
            key: key.into(),
            state: KeyState::Up,
        }
    }
}

/// Buttons occupying one physical slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub normal: String,
    pub shift: String,
}

#[derive(Debug, Clone, Default)]
pub struct PhysicalKeyMapper {
    table: HashMap<String, KeyPair>,
    shift_active: bool,
    capslock_active: bool,
}

impl PhysicalKeyMapper {
    /// Build from the `default` and `shift` layouts. A missing `shift` layout
    /// reuses the normal buttons.
    pub fn from_layout(layout: &Layout) -> Self {
        let normal = layout.buttons(DEFAULT_LAYOUT_NAME, &[]);
        let shift = if layout.contains(SHIFT_LAYOUT_NAME) {
            layout.buttons(SHIFT_LAYOUT_NAME, &[])
        } else {
            normal.clone()
        };
        Self::from_rows(&normal, &shift)
    }

    pub fn from_rows(normal: &[Vec<String>], shift: &[Vec<String>]) -> Self {
        let normal = positional_table(normal);
        let shift = positional_table(shift);

        let mut table = HashMap::new();
        for (row, codes) in PHYSICAL_ROWS.iter().enumerate() {
            for (col, code) in codes.iter().enumerate() {
                let normal_token = &normal[row][col];
                if normal_token.is_empty() {
                    continue;
                }
                let shift_token = match shift[row][col].as_str() {
                    "" => normal_token.clone(),
                    token => token.to_string(),
                };
                table.insert(
                    code.to_string(),
                    KeyPair {
                        normal: normal_token.clone(),
                        shift: shift_token,
                    },
                );
            }
        }

        Self {
            table,
            shift_active: false,
            capslock_active: false,
        }
    }

    pub fn pair(&self, code: &str) -> Option<&KeyPair> {
        self.table.get(code)
    }

    pub fn shift_active(&self) -> bool {
        self.shift_active
    }

    pub fn capslock_active(&self) -> bool {
        self.capslock_active
    }

    fn shifted(&self) -> bool {
        self.shift_active != self.capslock_active
    }

    /// Button for `code` under the current modifier state, without changing
    /// that state. Unknown codes fall back to `key`: single characters as-is,
    /// key names lower-cased and wrapped as function buttons.
    pub fn resolve(&self, code: &str, key: &str) -> Option<String> {
        if let Some(pair) = self.table.get(code) {
            let token = if self.shifted() { &pair.shift } else { &pair.normal };
            return Some(token.clone());
        }
        fallback_token(key)
    }

    /// Track Shift/CapsLock and return the button a key-down activates.
    pub fn handle(&mut self, event: &PhysicalKeyEvent) -> Option<String> {
        let is_shift = matches!(event.code.as_str(), "ShiftLeft" | "ShiftRight");
        match event.state {
            KeyState::Down => {
                if is_shift {
                    self.shift_active = true;
                } else if event.code == "CapsLock" {
                    self.capslock_active = !self.capslock_active;
                }
                let token = self.resolve(&event.code, &event.key);
                tracing::debug!(code = %event.code, ?token, "physical key down");
                token
            }
            KeyState::Up => {
                if is_shift {
                    self.shift_active = false;
                }
                None
            }
        }
    }
}

/// Lay `rows` over the physical geometry, padding with empty slots.
fn positional_table(rows: &[Vec<String>]) -> Vec<Vec<String>> {
    PHYSICAL_ROWS
        .iter()
        .enumerate()
        .map(|(row, codes)| {
            (0..codes.len())
                .map(|col| {
                    rows.get(row)
                        .and_then(|r| r.get(col))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect()
}

fn fallback_token(key: &str) -> Option<String> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (None, _) => None,
        (Some(_), None) => Some(key.to_string()),
        _ => Some(format!("{{{}}}", key.to_lowercase())),
    }
}

/// Whether `code` has a slot in the physical geometry.
pub fn is_positional_code(code: &str) -> bool {
    CODE_POSITIONS.contains_key(code)
}

/// (row, column) of `code` in the physical geometry.
pub fn code_position(code: &str) -> Option<(usize, usize)> {
    CODE_POSITIONS.get(code).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hebrew_like() -> Layout {
        let mut layout = Layout::new();
        layout.insert(
            DEFAULT_LAYOUT_NAME,
            [
                "; 1 2 3 4 5 6 7 8 9 0 - = {bksp}",
                "{tab} / ' ק ר א ט ו ן ם פ ] [ \\",
            ],
        );
        layout
    }

    #[test]
    fn test_geometry_widths() {
        let widths: Vec<usize> = PHYSICAL_ROWS.iter().map(|r| r.len()).collect();
        assert_eq!(widths, vec![14, 14, 13, 12, 3]);
        assert_eq!(code_position("KeyQ"), Some((1, 1)));
        assert!(is_positional_code("Space"));
        assert!(!is_positional_code("ArrowLeft"));
    }

    #[test]
    fn test_positional_mapping_follows_layout() {
        let qwerty = PhysicalKeyMapper::from_layout(&Layout::qwerty());
        assert_eq!(qwerty.resolve("KeyQ", "q").as_deref(), Some("q"));
        assert_eq!(qwerty.resolve("Space", " ").as_deref(), Some("{space}"));

        let hebrew = PhysicalKeyMapper::from_layout(&hebrew_like());
        assert_eq!(hebrew.resolve("KeyQ", "q").as_deref(), Some("/"));
        assert_eq!(hebrew.resolve("KeyE", "e").as_deref(), Some("ק"));
    }

    #[test]
    fn test_short_rows_fall_back_to_key() {
        let hebrew = PhysicalKeyMapper::from_layout(&hebrew_like());
        // Third row is not in the layout at all
        assert_eq!(hebrew.resolve("KeyA", "a").as_deref(), Some("a"));
        // Missing shift layout reuses the normal buttons
        assert_eq!(hebrew.pair("KeyW").unwrap().shift, "'");
    }

    #[test]
    fn test_unknown_code_fallback() {
        let mapper = PhysicalKeyMapper::from_layout(&Layout::qwerty());
        assert_eq!(
            mapper.resolve("ArrowLeft", "ArrowLeft").as_deref(),
            Some("{arrowleft}")
        );
        assert_eq!(mapper.resolve("Numpad1", "1").as_deref(), Some("1"));
        assert_eq!(mapper.resolve("Unidentified", ""), None);
    }

    #[test]
    fn test_shift_is_held_and_capslock_toggles() {
        let mut mapper = PhysicalKeyMapper::from_layout(&Layout::qwerty());

        assert_eq!(
            mapper.handle(&PhysicalKeyEvent::down("ShiftLeft", "Shift")).as_deref(),
            Some("{shift}")
        );
        assert!(mapper.shift_active());
        assert_eq!(
            mapper.handle(&PhysicalKeyEvent::down("KeyQ", "Q")).as_deref(),
            Some("Q")
        );
        assert_eq!(mapper.handle(&PhysicalKeyEvent::up("ShiftLeft", "Shift")), None);
        assert!(!mapper.shift_active());

        mapper.handle(&PhysicalKeyEvent::down("CapsLock", "CapsLock"));
        assert!(mapper.capslock_active());
        assert_eq!(
            mapper.handle(&PhysicalKeyEvent::down("Digit1", "!")).as_deref(),
            Some("!")
        );

        // Shift while caps lock is on cancels it out
        mapper.handle(&PhysicalKeyEvent::down("ShiftRight", "Shift"));
        assert_eq!(
            mapper.handle(&PhysicalKeyEvent::down("KeyA", "a")).as_deref(),
            Some("a")
        );

        mapper.handle(&PhysicalKeyEvent::up("ShiftRight", "Shift"));
        mapper.handle(&PhysicalKeyEvent::down("CapsLock", "CapsLock"));
        assert!(!mapper.capslock_active());
    }

    #[test]
    fn test_key_up_activates_nothing() {
        let mut mapper = PhysicalKeyMapper::from_layout(&Layout::qwerty());
        assert_eq!(mapper.handle(&PhysicalKeyEvent::up("KeyQ", "q")), None);
    }
}
