//! Keyboard options.
//!
//! Keys use the camelCase names hosts already pass around (`layoutName`,
//! `syncInstanceInputs`, ...), so the same options load from TOML files and
//! from JSON handed over by a rendering host.

use crate::candidate_box::DEFAULT_PAGE_SIZE;
use crate::error::{KeyboardError, Result};
use crate::input_store::DEFAULT_INPUT_NAME;
use crate::layout::{Layout, DEFAULT_LAYOUT_NAME};
use crate::text_edit::{utf16_len, EditRules};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Length limit for one input or for all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxLength {
    All(usize),
    PerInput(BTreeMap<String, usize>),
}

impl MaxLength {
    /// Limit applying to `input_name`, if any.
    pub fn limit_for(&self, input_name: &str) -> Option<usize> {
        match self {
            MaxLength::All(limit) => Some(*limit),
            MaxLength::PerInput(limits) => limits.get(input_name).copied(),
        }
    }

    /// Whether replacing `current` with `updated` breaks the limit. Edits
    /// that do not grow the text always pass.
    pub fn exceeded(&self, input_name: &str, current: &str, updated: &str) -> bool {
        let Some(limit) = self.limit_for(input_name) else {
            return false;
        };
        let new_len = utf16_len(updated);
        new_len > utf16_len(current) && new_len > limit
    }
}

/// Regex every accepted value must match, for one input or for all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputPattern {
    All(String),
    PerInput(BTreeMap<String, String>),
}

impl InputPattern {
    pub fn compile(&self) -> Result<CompiledPatterns> {
        let compile = |input: &str, pattern: &str| {
            Regex::new(pattern).map_err(|source| KeyboardError::InvalidInputPattern {
                input: input.to_string(),
                source,
            })
        };
        match self {
            InputPattern::All(pattern) => Ok(CompiledPatterns {
                all: Some(compile("*", pattern)?),
                per_input: HashMap::new(),
            }),
            InputPattern::PerInput(patterns) => {
                let mut per_input = HashMap::new();
                for (input, pattern) in patterns {
                    per_input.insert(input.clone(), compile(input, pattern)?);
                }
                Ok(CompiledPatterns {
                    all: None,
                    per_input,
                })
            }
        }
    }
}

/// Input patterns ready for matching.
#[derive(Debug, Clone, Default)]
pub struct CompiledPatterns {
    all: Option<Regex>,
    per_input: HashMap<String, Regex>,
}

impl CompiledPatterns {
    /// Whether `value` is acceptable for `input_name`. Inputs without a
    /// pattern accept anything.
    pub fn allows(&self, input_name: &str, value: &str) -> bool {
        let pattern = self.all.as_ref().or_else(|| self.per_input.get(input_name));
        match pattern {
            Some(re) => {
                let ok = re.is_match(value);
                if !ok {
                    tracing::debug!(input = input_name, "input does not match pattern");
                }
                ok
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyboardOptions {
    /// Named layouts. Defaults to QWERTY with `default` and `shift`.
    pub layout: Layout,

    /// Layout currently shown
    pub layout_name: String,

    /// Input buffer the keyboard edits
    pub input_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<MaxLength>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_pattern: Option<InputPattern>,

    /// Decorate visible text with RTL embedding marks
    pub rtl: bool,

    /// Mirror buffers and caret to every other instance after each change
    pub sync_instance_inputs: bool,

    /// Look up candidates after every change
    /// Default: true
    pub enable_layout_candidates: bool,

    /// Trigger → space-separated suggestions
    pub layout_candidates: BTreeMap<String, String>,

    /// Default: 5
    pub layout_candidates_page_size: usize,

    pub layout_candidates_case_sensitive_match: bool,

    /// Insert candidates as given instead of NFD-normalizing them
    pub disable_candidate_normalization: bool,

    /// Report a selected candidate as a key press
    pub enable_layout_candidates_key_press: bool,

    /// `{enter}` inserts a newline
    pub new_line_on_enter: bool,

    /// `{tab}` inserts a tab character
    /// Default: true
    pub tab_char_on_tab: bool,

    /// Ignore caret reports from the host; edits then apply at the end
    pub disable_caret_positioning: bool,

    /// Layout name → buttons to leave out of that layout
    pub exclude_from_layout: BTreeMap<String, Vec<String>>,

    /// Custom button labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<HashMap<String, String>>,

    /// Merge `display` into the built-in labels instead of replacing them
    pub merge_display: bool,
}

impl Default for KeyboardOptions {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            layout_name: DEFAULT_LAYOUT_NAME.to_string(),
            input_name: DEFAULT_INPUT_NAME.to_string(),
            max_length: None,
            input_pattern: None,
            rtl: false,
            sync_instance_inputs: false,
            enable_layout_candidates: true,
            layout_candidates: BTreeMap::new(),
            layout_candidates_page_size: DEFAULT_PAGE_SIZE,
            layout_candidates_case_sensitive_match: false,
            disable_candidate_normalization: false,
            enable_layout_candidates_key_press: false,
            new_line_on_enter: false,
            tab_char_on_tab: true,
            disable_caret_positioning: false,
            exclude_from_layout: BTreeMap::new(),
            display: None,
            merge_display: false,
        }
    }
}

impl KeyboardOptions {
    /// Load options from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save options to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load options from the JSON a rendering host passes in.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    // ========== Derived Settings ==========

    pub fn edit_rules(&self) -> EditRules {
        EditRules {
            new_line_on_enter: self.new_line_on_enter,
            tab_char_on_tab: self.tab_char_on_tab,
        }
    }

    /// Compile `inputPattern`. No pattern compiles to an accept-all set.
    pub fn compile_patterns(&self) -> Result<CompiledPatterns> {
        match &self.input_pattern {
            Some(pattern) => pattern.compile(),
            None => Ok(CompiledPatterns::default()),
        }
    }

    /// Buttons of the current layout after `excludeFromLayout`.
    pub fn visible_buttons(&self) -> Vec<Vec<String>> {
        let exclude = self
            .exclude_from_layout
            .get(&self.layout_name)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        self.layout.buttons(&self.layout_name, exclude)
    }

    // ========== Toggles ==========

    pub fn set_rtl(&mut self, enabled: bool) {
        self.rtl = enabled;
    }

    pub fn set_sync_instance_inputs(&mut self, enabled: bool) {
        self.sync_instance_inputs = enabled;
    }

    pub fn set_max_length(&mut self, max_length: Option<MaxLength>) {
        self.max_length = max_length;
    }

    /// Set the candidate page size. Zero is ignored.
    pub fn set_candidates_page_size(&mut self, size: usize) {
        if size > 0 {
            self.layout_candidates_page_size = size;
        }
    }

    /// Add or replace a candidate trigger.
    pub fn add_candidate<K: Into<String>, V: Into<String>>(&mut self, trigger: K, suggestions: V) {
        self.layout_candidates.insert(trigger.into(), suggestions.into());
    }
}
