//! Candidate dictionary, trailing-trigger lookup and replacement.
//!
//! A dictionary maps a trigger (e.g. `"ni"`) to a whitespace-separated list
//! of suggestions (e.g. `"你 尼 泥"`). Lookup looks at the text before the
//! caret and picks the longest trigger that ends it. Selecting a suggestion
//! swaps that trailing trigger for the suggestion.

use crate::text_edit::{byte_index, utf16_len};
use unicode_normalization::UnicodeNormalization;

/// A dictionary entry whose trigger ends the text before the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMatch {
    pub trigger: String,
    pub suggestions: String,
}

impl CandidateMatch {
    /// Suggestions split into single candidates.
    pub fn tokens(&self) -> Vec<String> {
        self.suggestions
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// Text and caret after a candidate replaced its trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateReplacement {
    pub text: String,
    pub caret: usize,
}

/// Ordered trigger to suggestion-string table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateDictionary {
    entries: Vec<(String, String)>,
}

impl CandidateDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary, skipping entries with an empty trigger or no
    /// suggestions.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut dict = Self::new();
        for (trigger, suggestions) in entries {
            dict.insert(trigger, suggestions);
        }
        dict
    }

    /// Add or replace an entry. Returns `false` (and logs) for a malformed
    /// entry, which is left out.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, trigger: K, suggestions: V) -> bool {
        let trigger = trigger.into();
        let suggestions = suggestions.into();
        if trigger.is_empty() || suggestions.trim().is_empty() {
            tracing::warn!(
                trigger = %trigger,
                suggestions = %suggestions,
                "skipping malformed candidate entry"
            );
            return false;
        }

        match self.entries.iter_mut().find(|(k, _)| *k == trigger) {
            Some(entry) => entry.1 = suggestions,
            None => self.entries.push((trigger, suggestions)),
        }
        true
    }

    pub fn remove(&mut self, trigger: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == trigger)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn get(&self, trigger: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == trigger)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Find the longest trigger that ends the text before `caret_end`.
    ///
    /// Equal-length matches resolve to the entry inserted first.
    pub fn lookup(
        &self,
        input: &str,
        caret_end: Option<usize>,
        case_sensitive: bool,
    ) -> Option<CandidateMatch> {
        let prefix = considered_prefix(input, caret_end);
        let mut best: Option<(&str, &str, usize)> = None;

        for (trigger, suggestions) in &self.entries {
            if suffix_start(prefix, trigger, case_sensitive).is_none() {
                continue;
            }
            let len = utf16_len(trigger);
            if best.map_or(true, |(_, _, best_len)| len > best_len) {
                best = Some((trigger, suggestions, len));
            }
        }

        best.map(|(trigger, suggestions, _)| CandidateMatch {
            trigger: trigger.to_string(),
            suggestions: suggestions.to_string(),
        })
    }
}

/// The part of `input` a lookup considers: everything before the caret, or
/// the whole text when the caret is unset, zero, or past the end.
pub fn considered_prefix(input: &str, caret_end: Option<usize>) -> &str {
    match caret_end {
        Some(end) if end > 0 => {
            let prefix = &input[..byte_index(input, end)];
            if prefix.is_empty() {
                input
            } else {
                prefix
            }
        }
        _ => input,
    }
}

/// Split a suggestion string into pages of `page_size` candidates.
pub fn paginate(suggestions: &str, page_size: usize) -> Vec<Vec<String>> {
    let tokens: Vec<String> = suggestions.split_whitespace().map(str::to_string).collect();
    tokens
        .chunks(page_size.max(1))
        .map(<[String]>::to_vec)
        .collect()
}

/// Replace the trailing `trigger` before the caret with `candidate`.
///
/// When `normalize` is set the candidate is NFD-normalized first. The new
/// caret sits right after the inserted candidate.
pub fn select(
    candidate: &str,
    trigger: &str,
    input: &str,
    caret_end: Option<usize>,
    case_sensitive: bool,
    normalize: bool,
) -> CandidateReplacement {
    let candidate: String = if normalize {
        candidate.nfd().collect()
    } else {
        candidate.to_string()
    };

    let prefix = considered_prefix(input, caret_end);
    let rest = &input[prefix.len()..];

    let mut new_prefix = String::with_capacity(prefix.len() + candidate.len());
    match suffix_start(prefix, trigger, case_sensitive) {
        Some(start) => {
            new_prefix.push_str(&prefix[..start]);
            new_prefix.push_str(&candidate);
        }
        None => new_prefix.push_str(prefix),
    }

    let caret = utf16_len(&new_prefix);
    new_prefix.push_str(rest);
    CandidateReplacement {
        text: new_prefix,
        caret,
    }
}

/// Byte index where `needle` starts if it ends `haystack`.
fn suffix_start(haystack: &str, needle: &str, case_sensitive: bool) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    if case_sensitive {
        return haystack
            .ends_with(needle)
            .then(|| haystack.len() - needle.len());
    }

    let mut hay = haystack.char_indices().rev();
    let mut start = haystack.len();
    for n in needle.chars().rev() {
        let (idx, h) = hay.next()?;
        if !eq_ignore_case(h, n) {
            return None;
        }
        start = idx;
    }
    Some(start)
}

fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> CandidateDictionary {
        CandidateDictionary::from_entries([("a", "1 2 3"), ("aa", "6 7 8")])
    }

    #[test]
    fn test_longest_match_wins() {
        let found = dict().lookup("aa", Some(2), true).unwrap();
        assert_eq!(found.trigger, "aa");
        assert_eq!(found.tokens(), vec!["6", "7", "8"]);

        let found = dict().lookup("ba", Some(2), true).unwrap();
        assert_eq!(found.trigger, "a");
    }

    #[test]
    fn test_lookup_respects_caret() {
        // Only "a" precedes the caret
        let found = dict().lookup("aab", Some(1), true).unwrap();
        assert_eq!(found.trigger, "a");
        assert!(dict().lookup("aab", Some(3), true).is_none());
    }

    #[test]
    fn test_lookup_without_caret_uses_whole_text() {
        assert_eq!(dict().lookup("xaa", None, true).unwrap().trigger, "aa");
        assert_eq!(dict().lookup("xaa", Some(0), true).unwrap().trigger, "aa");
        assert_eq!(dict().lookup("xaa", Some(99), true).unwrap().trigger, "aa");
    }

    #[test]
    fn test_lookup_empty_dictionary() {
        assert!(CandidateDictionary::new().lookup("aa", None, true).is_none());
    }

    #[test]
    fn test_case_insensitive_match() {
        let dict = CandidateDictionary::from_entries([("ni", "你 尼")]);
        assert!(dict.lookup("NI", None, true).is_none());
        assert_eq!(dict.lookup("NI", None, false).unwrap().trigger, "ni");
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let dict = CandidateDictionary::from_entries([("", "1"), ("b", "  "), ("c", "3")]);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("c"), Some("3"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut dict = dict();
        assert!(dict.insert("a", "9"));
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.iter().next(), Some(("a", "9")));
        assert_eq!(dict.remove("a"), Some("9".to_string()));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_paginate() {
        let pages = paginate("1 2 3 4 5 6", 3);
        assert_eq!(pages, vec![vec!["1", "2", "3"], vec!["4", "5", "6"]]);

        let pages = paginate("1 2 3 4", 3);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], vec!["4"]);

        assert!(paginate("   ", 3).is_empty());
    }

    #[test]
    fn test_select_replaces_trailing_trigger() {
        let out = select("2", "a", "a", Some(1), true, true);
        assert_eq!(out.text, "2");
        assert_eq!(out.caret, 1);

        let out = select("你", "ni", "xni yz", Some(3), true, true);
        assert_eq!(out.text, "x你 yz");
        assert_eq!(out.caret, 2);
    }

    #[test]
    fn test_select_clamps_caret() {
        let out = select("long", "a", "ba", Some(0), true, true);
        assert_eq!(out.text, "blong");
        assert_eq!(out.caret, 5);

        let out = select("long", "a", "ba", Some(40), true, true);
        assert_eq!(out.text, "blong");
        assert_eq!(out.caret, 5);
    }

    #[test]
    fn test_select_normalizes_to_nfd() {
        // U+00E9 decomposes into 'e' + U+0301
        let out = select("\u{e9}", "e", "e", None, true, true);
        assert_eq!(out.text, "e\u{301}");
        assert_eq!(out.caret, 2);

        let out = select("\u{e9}", "e", "e", None, true, false);
        assert_eq!(out.text, "\u{e9}");
        assert_eq!(out.caret, 1);
    }

    #[test]
    fn test_select_then_lookup_does_not_repeat_trigger() {
        let dict = dict();
        let out = select("2", "a", "a", None, true, true);
        assert!(dict.lookup(&out.text, Some(out.caret), true).is_none());
    }
}
