//! Paginated candidate box state.
//!
//! The box is what a renderer draws above the keys: one page of suggestions
//! for the trigger currently ending the input, plus previous/next page
//! controls. Every fresh `show` starts on the first page.

use crate::candidate::{paginate, CandidateMatch};

/// Default number of candidates per page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Snapshot of the visible page, handed to listeners and renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePage {
    pub trigger: String,
    pub candidates: Vec<String>,
    /// 0-based index of this page
    pub page: usize,
    pub num_pages: usize,
}

impl CandidatePage {
    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.num_pages
    }
}

#[derive(Debug, Clone)]
pub struct CandidateBox {
    /// Suggestions for the active trigger, split into pages
    pages: Vec<Vec<String>>,

    /// Trigger the suggestions replace on selection
    trigger: Option<String>,

    /// Number of candidates per page
    page_size: usize,

    /// Current page index (0-based)
    current_page: usize,
}

impl CandidateBox {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            pages: Vec::new(),
            trigger: None,
            page_size: page_size.max(1),
            current_page: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Change the page size, re-paginating and going back to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        let all: Vec<String> = self.pages.drain(..).flatten().collect();
        self.pages = all
            .chunks(self.page_size)
            .map(<[String]>::to_vec)
            .collect();
        self.current_page = 0;
    }

    /// Open the box for `found`, starting on page 0.
    pub fn show(&mut self, found: &CandidateMatch) {
        self.pages = paginate(&found.suggestions, self.page_size);
        self.trigger = Some(found.trigger.clone());
        self.current_page = 0;
    }

    /// Close the box and forget its suggestions.
    pub fn destroy(&mut self) {
        self.pages.clear();
        self.trigger = None;
        self.current_page = 0;
    }

    pub fn is_open(&self) -> bool {
        self.trigger.is_some() && !self.pages.is_empty()
    }

    pub fn trigger(&self) -> Option<&str> {
        self.trigger.as_deref()
    }

    /// Total number of candidates across all pages.
    pub fn len(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn num_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn current_page_candidates(&self) -> &[String] {
        self.pages
            .get(self.current_page)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Candidate at `index` on the current page.
    pub fn candidate_at(&self, index: usize) -> Option<&str> {
        self.current_page_candidates()
            .get(index)
            .map(String::as_str)
    }

    /// Move to the previous page. Returns true if the page changed.
    pub fn prev_page(&mut self) -> bool {
        if self.current_page > 0 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Move to the next page. Returns true if the page changed.
    pub fn next_page(&mut self) -> bool {
        let num_pages = self.num_pages();
        if num_pages > 0 && self.current_page < num_pages - 1 {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn snapshot(&self) -> Option<CandidatePage> {
        let trigger = self.trigger.clone()?;
        if self.pages.is_empty() {
            return None;
        }
        Some(CandidatePage {
            trigger,
            candidates: self.current_page_candidates().to_vec(),
            page: self.current_page,
            num_pages: self.num_pages(),
        })
    }
}

impl Default for CandidateBox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(trigger: &str, suggestions: &str) -> CandidateMatch {
        CandidateMatch {
            trigger: trigger.to_string(),
            suggestions: suggestions.to_string(),
        }
    }

    #[test]
    fn test_new_box_is_closed() {
        let candidate_box = CandidateBox::new();
        assert!(!candidate_box.is_open());
        assert_eq!(candidate_box.page_size(), 5);
        assert_eq!(candidate_box.num_pages(), 0);
        assert!(candidate_box.snapshot().is_none());
    }

    #[test]
    fn test_pagination_bounds() {
        let mut candidate_box = CandidateBox::with_page_size(3);
        candidate_box.show(&found("a", "1 2 3 4 5 6"));

        assert_eq!(candidate_box.num_pages(), 2);
        assert_eq!(candidate_box.current_page_candidates(), ["1", "2", "3"]);

        // previous page at the first page is a no-op
        assert!(!candidate_box.prev_page());
        assert_eq!(candidate_box.current_page(), 0);

        assert!(candidate_box.next_page());
        assert_eq!(candidate_box.current_page_candidates(), ["4", "5", "6"]);

        // next page at the last page is a no-op
        assert!(!candidate_box.next_page());
        assert_eq!(candidate_box.current_page(), 1);
    }

    #[test]
    fn test_show_resets_to_first_page() {
        let mut candidate_box = CandidateBox::with_page_size(2);
        candidate_box.show(&found("a", "1 2 3 4"));
        candidate_box.next_page();
        assert_eq!(candidate_box.current_page(), 1);

        candidate_box.show(&found("a", "1 2 3 4"));
        assert_eq!(candidate_box.current_page(), 0);
    }

    #[test]
    fn test_short_last_page() {
        let mut candidate_box = CandidateBox::with_page_size(3);
        candidate_box.show(&found("a", "1 2 3 4"));
        assert_eq!(candidate_box.len(), 4);
        candidate_box.next_page();
        assert_eq!(candidate_box.current_page_candidates(), ["4"]);
        assert_eq!(candidate_box.candidate_at(0), Some("4"));
        assert_eq!(candidate_box.candidate_at(1), None);
    }

    #[test]
    fn test_set_page_size_repaginates() {
        let mut candidate_box = CandidateBox::with_page_size(2);
        candidate_box.show(&found("a", "1 2 3 4 5"));
        candidate_box.next_page();
        candidate_box.set_page_size(5);
        assert_eq!(candidate_box.num_pages(), 1);
        assert_eq!(candidate_box.current_page(), 0);
        assert_eq!(candidate_box.current_page_candidates().len(), 5);
    }

    #[test]
    fn test_snapshot_and_destroy() {
        let mut candidate_box = CandidateBox::with_page_size(2);
        candidate_box.show(&found("ni", "你 尼 泥"));
        let page = candidate_box.snapshot().unwrap();
        assert_eq!(page.trigger, "ni");
        assert_eq!(page.candidates, vec!["你", "尼"]);
        assert!(!page.has_prev());
        assert!(page.has_next());

        candidate_box.destroy();
        assert!(!candidate_box.is_open());
        assert!(candidate_box.trigger().is_none());
    }
}
