//! Caret tracking for a keyboard instance.
//!
//! Offsets are UTF-16 code units into the undecorated (marker-free) text of
//! the active input.

use serde::{Deserialize, Serialize};

/// Right-to-left embedding mark prepended to decorated text.
pub const RTL_START: char = '\u{202B}';
/// Pop-directional-formatting mark appended to decorated text.
pub const RTL_END: char = '\u{202C}';

/// A caret or selection. `start == end` is a collapsed caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaretRange {
    pub start: usize,
    pub end: usize,
}

impl CaretRange {
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn collapsed(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn as_tuple(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}

/// Per-instance caret state. `None` means caret tracking has no context
/// (disabled, or focus is elsewhere): edits then apply at the end of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaretModel {
    range: Option<CaretRange>,
}

impl CaretModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(&self) -> Option<CaretRange> {
        self.range
    }

    pub fn position(&self) -> Option<usize> {
        self.range.map(|r| r.start)
    }

    pub fn position_end(&self) -> Option<usize> {
        self.range.map(|r| r.end)
    }

    /// Set the caret. Passing no `end` collapses it at `pos`.
    pub fn set_caret_position(&mut self, pos: usize, end: Option<usize>) {
        self.range = Some(CaretRange::new(pos, end.unwrap_or(pos)));
    }

    pub fn set_range(&mut self, range: Option<CaretRange>) {
        self.range = range;
    }

    pub fn clear(&mut self) {
        self.range = None;
    }

    /// Collapse a stale selection onto its end.
    pub fn collapse_to_end(&mut self) {
        if let Some(range) = self.range {
            self.range = Some(CaretRange::collapsed(range.end));
        }
    }

    /// Move the caret to where an edit left it. A stale selection is
    /// collapsed even when the edit reported no position.
    pub fn resolve_edit(&mut self, pos: Option<usize>) {
        match pos {
            Some(pos) => self.range = Some(CaretRange::collapsed(pos)),
            None => self.collapse_to_end(),
        }
    }
}

/// Convert an offset measured against RTL-decorated text into an offset
/// against the undecorated buffer.
///
/// Each marker that sits strictly before `index` (in UTF-16 units) shifts it
/// back by one. The result never goes below zero.
pub fn get_rtl_offset(index: usize, decorated: &str) -> usize {
    let mut units = 0;
    let mut markers_before = 0;
    for ch in decorated.chars() {
        if units >= index {
            break;
        }
        if ch == RTL_START || ch == RTL_END {
            markers_before += 1;
        }
        units += ch.len_utf16();
    }
    index.saturating_sub(markers_before)
}

/// Wrap `text` in the RTL markers.
pub fn decorate_rtl(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 6);
    out.push(RTL_START);
    out.push_str(text);
    out.push(RTL_END);
    out
}

/// Remove any RTL markers from `text`.
pub fn strip_rtl(text: &str) -> String {
    text.chars()
        .filter(|&c| c != RTL_START && c != RTL_END)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_caret_collapses_without_end() {
        let mut caret = CaretModel::new();
        assert_eq!(caret.range(), None);

        caret.set_caret_position(3, None);
        assert_eq!(caret.range(), Some(CaretRange::collapsed(3)));

        caret.set_caret_position(1, Some(4));
        assert_eq!(caret.position(), Some(1));
        assert_eq!(caret.position_end(), Some(4));
    }

    #[test]
    fn test_reversed_range_is_normalized() {
        let range = CaretRange::new(5, 2);
        assert_eq!(range.as_tuple(), (2, 5));
    }

    #[test]
    fn test_resolve_edit_collapses_selection() {
        let mut caret = CaretModel::new();
        caret.set_caret_position(0, Some(5));
        caret.resolve_edit(Some(1));
        assert_eq!(caret.range(), Some(CaretRange::collapsed(1)));

        caret.set_caret_position(2, Some(6));
        caret.resolve_edit(None);
        assert_eq!(caret.range(), Some(CaretRange::collapsed(6)));
    }

    #[test]
    fn test_rtl_offset_beyond_both_markers() {
        let decorated = decorate_rtl("שלום");
        // 4 letters + 2 markers
        assert_eq!(get_rtl_offset(6, &decorated), 4);
        assert_eq!(get_rtl_offset(5, &decorated), 4);
    }

    #[test]
    fn test_rtl_offset_after_start_marker() {
        let decorated = decorate_rtl("abc");
        assert_eq!(get_rtl_offset(0, &decorated), 0);
        assert_eq!(get_rtl_offset(1, &decorated), 0);
        assert_eq!(get_rtl_offset(2, &decorated), 1);
    }

    #[test]
    fn test_rtl_offset_between_markers_of_empty_text() {
        let decorated = decorate_rtl("");
        assert_eq!(get_rtl_offset(1, &decorated), 0);
        assert_eq!(get_rtl_offset(2, &decorated), 0);
    }

    #[test]
    fn test_rtl_offset_on_plain_text() {
        assert_eq!(get_rtl_offset(3, "abcdef"), 3);
    }

    #[test]
    fn test_strip_and_decorate() {
        let decorated = decorate_rtl("ab");
        assert!(decorated.starts_with(RTL_START));
        assert!(decorated.ends_with(RTL_END));
        assert_eq!(strip_rtl(&decorated), "ab");
    }
}
