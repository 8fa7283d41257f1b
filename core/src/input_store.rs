//! Named input buffers for a keyboard instance.
//!
//! Buffers never contain RTL markers. Decoration is applied by
//! [`InputStore::get_input`] and stripped by [`InputStore::set_input`].

use crate::caret::{decorate_rtl, strip_rtl};
use std::collections::BTreeMap;

/// Name of the input a keyboard edits when none is configured.
pub const DEFAULT_INPUT_NAME: &str = "default";

/// Input name to text.
pub type InputMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputStore {
    inputs: InputMap,
    rtl: bool,
}

impl InputStore {
    pub fn new(rtl: bool) -> Self {
        Self {
            inputs: InputMap::new(),
            rtl,
        }
    }

    pub fn is_rtl(&self) -> bool {
        self.rtl
    }

    pub fn set_rtl(&mut self, rtl: bool) {
        self.rtl = rtl;
    }

    /// Create an empty buffer for `name` if it does not exist yet.
    pub fn ensure(&mut self, name: &str) {
        if !self.inputs.contains_key(name) {
            self.inputs.insert(name.to_string(), String::new());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inputs.contains_key(name)
    }

    /// Store `text` under `name`, removing any RTL markers.
    pub fn set_input(&mut self, text: &str, name: &str) {
        let value = if text.contains([crate::caret::RTL_START, crate::caret::RTL_END]) {
            strip_rtl(text)
        } else {
            text.to_string()
        };
        self.inputs.insert(name.to_string(), value);
    }

    /// Externally visible value of `name`, decorated when RTL is on.
    /// Unknown names read as empty.
    pub fn get_input(&self, name: &str) -> String {
        let raw = self.raw(name);
        if self.rtl {
            decorate_rtl(raw)
        } else {
            raw.to_string()
        }
    }

    /// Undecorated buffer contents.
    pub fn raw(&self, name: &str) -> &str {
        self.inputs.get(name).map(String::as_str).unwrap_or("")
    }

    /// Decorated snapshot of every buffer.
    pub fn get_all_inputs(&self) -> InputMap {
        self.inputs
            .keys()
            .map(|name| (name.clone(), self.get_input(name)))
            .collect()
    }

    /// Undecorated view of every buffer.
    pub fn inputs(&self) -> &InputMap {
        &self.inputs
    }

    /// Swap the whole buffer set at once.
    pub fn replace_input(&mut self, inputs: InputMap) {
        self.inputs = inputs
            .into_iter()
            .map(|(name, text)| (name, strip_rtl(&text)))
            .collect();
    }

    pub fn clear_input(&mut self, name: &str) {
        self.inputs.insert(name.to_string(), String::new());
    }
}
