//! Declarative button layouts.
//!
//! A layout maps a layout name (`"default"`, `"shift"`, ...) to rows; each
//! row is a space-separated list of button tokens.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Layout name shown when none is configured.
pub const DEFAULT_LAYOUT_NAME: &str = "default";
/// Layout holding the shifted variant of each key.
pub const SHIFT_LAYOUT_NAME: &str = "shift";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout(BTreeMap<String, Vec<String>>);

impl Layout {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// The built-in QWERTY layout with `default` and `shift` variants.
    pub fn qwerty() -> Self {
        let mut layout = Self::new();
        layout.insert(
            DEFAULT_LAYOUT_NAME,
            [
                "` 1 2 3 4 5 6 7 8 9 0 - = {bksp}",
                "{tab} q w e r t y u i o p [ ] \\",
                "{lock} a s d f g h j k l ; ' {enter}",
                "{shift} z x c v b n m , . / {shift}",
                ".com @ {space}",
            ],
        );
        layout.insert(
            SHIFT_LAYOUT_NAME,
            [
                "~ ! @ # $ % ^ & * ( ) _ + {bksp}",
                "{tab} Q W E R T Y U I O P { } |",
                "{lock} A S D F G H J K L : \" {enter}",
                "{shift} Z X C V B N M < > ? {shift}",
                ".com @ {space}",
            ],
        );
        layout
    }

    pub fn insert<N, I, R>(&mut self, name: N, rows: I)
    where
        N: Into<String>,
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.0
            .insert(name.into(), rows.into_iter().map(Into::into).collect());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Raw row strings of a layout.
    pub fn rows(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Tokenized rows of a layout, without the excluded tokens.
    pub fn buttons(&self, name: &str, exclude: &[String]) -> Vec<Vec<String>> {
        self.rows(name)
            .unwrap_or_default()
            .iter()
            .map(|row| {
                row.split(' ')
                    .filter(|token| !token.is_empty())
                    .filter(|token| !exclude.iter().any(|e| e == token))
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::qwerty()
    }
}

static DEFAULT_DISPLAY: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("{bksp}", "backspace");
    m.insert("{backspace}", "backspace");
    m.insert("{enter}", "< enter");
    m.insert("{shift}", "shift");
    m.insert("{shiftleft}", "shift");
    m.insert("{shiftright}", "shift");
    m.insert("{alt}", "alt");
    m.insert("{s}", "shift");
    m.insert("{tab}", "tab");
    m.insert("{lock}", "caps");
    m.insert("{capslock}", "caps");
    m.insert("{accept}", "Submit");
    m.insert("{space}", " ");
    m.insert("{//}", " ");
    m.insert("{esc}", "esc");
    m.insert("{escape}", "esc");
    m.insert("{f1}", "f1");
    m.insert("{f2}", "f2");
    m.insert("{f3}", "f3");
    m.insert("{f4}", "f4");
    m.insert("{f5}", "f5");
    m.insert("{f6}", "f6");
    m.insert("{f7}", "f7");
    m.insert("{f8}", "f8");
    m.insert("{f9}", "f9");
    m.insert("{f10}", "f10");
    m.insert("{f11}", "f11");
    m.insert("{f12}", "f12");
    m.insert("{numpaddivide}", "/");
    m.insert("{numlock}", "lock");
    m.insert("{arrowup}", "↑");
    m.insert("{arrowleft}", "←");
    m.insert("{arrowdown}", "↓");
    m.insert("{arrowright}", "→");
    m.insert("{prtscr}", "print");
    m.insert("{scrolllock}", "scroll");
    m.insert("{pause}", "pause");
    m.insert("{insert}", "ins");
    m.insert("{home}", "home");
    m.insert("{pageup}", "up");
    m.insert("{delete}", "del");
    m.insert("{forwarddelete}", "del");
    m.insert("{end}", "end");
    m.insert("{pagedown}", "down");
    m.insert("{numpadmultiply}", "*");
    m.insert("{numpadsubtract}", "-");
    m.insert("{numpadadd}", "+");
    m.insert("{numpadenter}", "enter");
    m.insert("{period}", ".");
    m.insert("{numpaddecimal}", ".");
    m.insert("{numpad0}", "0");
    m.insert("{numpad1}", "1");
    m.insert("{numpad2}", "2");
    m.insert("{numpad3}", "3");
    m.insert("{numpad4}", "4");
    m.insert("{numpad5}", "5");
    m.insert("{numpad6}", "6");
    m.insert("{numpad7}", "7");
    m.insert("{numpad8}", "8");
    m.insert("{numpad9}", "9");
    m
});

/// Label a renderer should draw for `token`.
///
/// `display` overrides the built-in labels; with `merge` set the two are
/// combined, otherwise a custom map replaces the defaults entirely.
pub fn display_label(token: &str, display: Option<&HashMap<String, String>>, merge: bool) -> String {
    if let Some(custom) = display {
        if let Some(label) = custom.get(token) {
            return label.clone();
        }
        if !merge {
            return token.to_string();
        }
    }
    DEFAULT_DISPLAY
        .get(token)
        .map(|label| label.to_string())
        .unwrap_or_else(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qwerty_geometry() {
        let layout = Layout::qwerty();
        let rows = layout.buttons(DEFAULT_LAYOUT_NAME, &[]);
        let widths: Vec<usize> = rows.iter().map(Vec::len).collect();
        assert_eq!(widths, vec![14, 14, 13, 12, 3]);

        let shifted = layout.buttons(SHIFT_LAYOUT_NAME, &[]);
        assert_eq!(shifted[1][1], "Q");
    }

    #[test]
    fn test_exclude_from_layout() {
        let layout = Layout::qwerty();
        let exclude = vec![".com".to_string(), "@".to_string()];
        let rows = layout.buttons(DEFAULT_LAYOUT_NAME, &exclude);
        assert_eq!(rows[4], vec!["{space}"]);
    }

    #[test]
    fn test_unknown_layout_is_empty() {
        assert!(Layout::qwerty().buttons("numeric", &[]).is_empty());
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("{bksp}", None, false), "backspace");
        assert_eq!(display_label("q", None, false), "q");

        let mut custom = HashMap::new();
        custom.insert("{enter}".to_string(), "return".to_string());
        assert_eq!(display_label("{enter}", Some(&custom), false), "return");
        assert_eq!(display_label("{bksp}", Some(&custom), false), "{bksp}");
        assert_eq!(display_label("{bksp}", Some(&custom), true), "backspace");
    }
}
