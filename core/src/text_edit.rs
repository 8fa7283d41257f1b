//! Button token interpretation and pure text edits.
//!
//! A button token is either *standard* (literal text such as `"q"` or
//! `".com"`) or a *function* token wrapped in braces (`"{bksp}"`). This
//! module maps a token to an [`EditCommand`] and applies it to a source
//! string at a caret range, producing a [`TextEdit`].
//!
//! All offsets are UTF-16 code units, the unit rendering hosts report
//! selections in. An offset that lands inside a surrogate pair is floored to
//! the preceding character boundary.

use std::borrow::Cow;

/// Placeholder token used to pad layouts. Never mutates anything.
pub const NOOP_BUTTON: &str = "{//}";

/// Classification of a layout token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonType {
    /// Literal text inserted at the caret.
    Standard,
    /// `{name}` control button.
    Function,
    /// The `{//}` spacer.
    Placeholder,
}

/// Classify a token the way the layout renderer and the edit engine see it.
pub fn button_type(token: &str) -> ButtonType {
    if token == NOOP_BUTTON {
        ButtonType::Placeholder
    } else if token.contains('{') && token.contains('}') {
        ButtonType::Function
    } else {
        ButtonType::Standard
    }
}

/// Options that gate individual edit rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRules {
    /// `{enter}` / `{numpadenter}` insert `"\n"`.
    pub new_line_on_enter: bool,
    /// `{tab}` inserts `"\t"`.
    pub tab_char_on_tab: bool,
}

impl Default for EditRules {
    fn default() -> Self {
        Self {
            new_line_on_enter: false,
            tab_char_on_tab: true,
        }
    }
}

/// The concrete operation a token stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand<'a> {
    /// `{//}`: nothing happens and nothing is reported.
    Noop,
    /// Remove the selection, or one character before the caret.
    DeleteBackward,
    /// Remove the selection, or one character after the caret.
    DeleteForward,
    /// Replace the selection (or insert at the caret) with text.
    Insert(Cow<'a, str>),
    /// Function token with no text effect; the press is still reported.
    Unhandled,
}

/// Map a token to its edit command.
pub fn interpret<'a>(token: &'a str, rules: &EditRules) -> EditCommand<'a> {
    match token {
        NOOP_BUTTON => EditCommand::Noop,
        "{bksp}" | "{backspace}" => EditCommand::DeleteBackward,
        "{delete}" | "{forwarddelete}" => EditCommand::DeleteForward,
        "{space}" => EditCommand::Insert(Cow::Borrowed(" ")),
        "{tab}" if rules.tab_char_on_tab => EditCommand::Insert(Cow::Borrowed("\t")),
        "{enter}" | "{numpadenter}" if rules.new_line_on_enter => {
            EditCommand::Insert(Cow::Borrowed("\n"))
        }
        "{numpaddivide}" => EditCommand::Insert(Cow::Borrowed("/")),
        "{numpadmultiply}" => EditCommand::Insert(Cow::Borrowed("*")),
        "{numpadsubtract}" => EditCommand::Insert(Cow::Borrowed("-")),
        "{numpadadd}" => EditCommand::Insert(Cow::Borrowed("+")),
        "{numpaddecimal}" => EditCommand::Insert(Cow::Borrowed(".")),
        "{" | "}" => EditCommand::Insert(Cow::Borrowed(token)),
        _ => {
            if let Some(digit) = numpad_digit(token) {
                return EditCommand::Insert(Cow::Owned(digit.to_string()));
            }
            if token.contains('{') || token.contains('}') {
                EditCommand::Unhandled
            } else {
                EditCommand::Insert(Cow::Borrowed(token))
            }
        }
    }
}

fn numpad_digit(token: &str) -> Option<char> {
    let rest = token.strip_prefix("{numpad")?.strip_suffix('}')?;
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(d), None) if d.is_ascii_digit() => Some(d),
        _ => None,
    }
}

/// Result of applying a token to a source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Text after the edit.
    pub text: String,
    /// Collapsed caret after the edit. `None` when no caret was supplied.
    pub caret: Option<usize>,
    /// Whether the text differs from the source.
    pub changed: bool,
}

impl TextEdit {
    fn unchanged(source: &str, caret: Option<(usize, usize)>) -> Self {
        Self {
            text: source.to_string(),
            caret: caret.map(|(start, _)| start),
            changed: false,
        }
    }
}

/// Apply `token` to `source` at `caret` (`(start, end)` in UTF-16 units).
///
/// With no caret, insertions append and backspace removes the last
/// character.
pub fn apply(
    token: &str,
    source: &str,
    caret: Option<(usize, usize)>,
    rules: &EditRules,
) -> TextEdit {
    match interpret(token, rules) {
        EditCommand::Noop | EditCommand::Unhandled => TextEdit::unchanged(source, caret),
        EditCommand::DeleteBackward => delete_backward(source, caret),
        EditCommand::DeleteForward => delete_forward(source, caret),
        EditCommand::Insert(text) => insert(source, &text, caret),
    }
}

/// Insert `text` at the caret, replacing any selection.
pub fn insert(source: &str, text: &str, caret: Option<(usize, usize)>) -> TextEdit {
    let Some((start, end)) = caret else {
        let mut out = String::with_capacity(source.len() + text.len());
        out.push_str(source);
        out.push_str(text);
        let changed = !text.is_empty();
        return TextEdit {
            text: out,
            caret: None,
            changed,
        };
    };

    let (from, to) = byte_range(source, start, end);
    let mut out = String::with_capacity(source.len() + text.len());
    out.push_str(&source[..from]);
    out.push_str(text);
    out.push_str(&source[to..]);
    let caret = utf16_len(&source[..from]) + utf16_len(text);
    let changed = out != source;
    TextEdit {
        text: out,
        caret: Some(caret),
        changed,
    }
}

/// Backspace: remove the selection, else the character before the caret.
pub fn delete_backward(source: &str, caret: Option<(usize, usize)>) -> TextEdit {
    if source.is_empty() {
        return TextEdit::unchanged(source, caret);
    }

    let Some((start, end)) = caret else {
        let mut out = source.to_string();
        out.pop();
        return TextEdit {
            text: out,
            caret: None,
            changed: true,
        };
    };

    let (from, to) = byte_range(source, start, end);
    if from != to {
        return remove_span(source, from, to);
    }
    match source[..from].chars().next_back() {
        Some(ch) => remove_span(source, from - ch.len_utf8(), from),
        None => TextEdit::unchanged(source, caret),
    }
}

/// Forward delete: remove the selection, else the character after the caret.
/// The caret stays where it is.
pub fn delete_forward(source: &str, caret: Option<(usize, usize)>) -> TextEdit {
    let Some((start, end)) = caret else {
        return TextEdit::unchanged(source, caret);
    };
    if source.is_empty() {
        return TextEdit::unchanged(source, caret);
    }

    let (from, to) = byte_range(source, start, end);
    if from != to {
        return remove_span(source, from, to);
    }
    match source[from..].chars().next() {
        Some(ch) => remove_span(source, from, from + ch.len_utf8()),
        None => TextEdit::unchanged(source, caret),
    }
}

fn remove_span(source: &str, from: usize, to: usize) -> TextEdit {
    let mut out = String::with_capacity(source.len() - (to - from));
    out.push_str(&source[..from]);
    out.push_str(&source[to..]);
    TextEdit {
        text: out,
        caret: Some(utf16_len(&source[..from])),
        changed: to > from,
    }
}

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Byte index of the character boundary at or before `offset` UTF-16 units.
/// Offsets past the end clamp to `s.len()`.
pub fn byte_index(s: &str, offset: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in s.char_indices() {
        let next = units + ch.len_utf16();
        if next > offset {
            return idx;
        }
        units = next;
    }
    s.len()
}

fn byte_range(s: &str, start: usize, end: usize) -> (usize, usize) {
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    (byte_index(s, lo), byte_index(s, hi))
}
