//! Mount targets and the instance identifiers derived from them.

use crate::error::{KeyboardError, Result};
use std::fmt;

/// Class a keyboard mounts on when the host does not name one.
pub const DEFAULT_MOUNT_CLASS: &str = "simple-keyboard";

/// Where a keyboard instance is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MountTarget {
    /// The default `.simple-keyboard` container.
    #[default]
    Default,
    /// A class selector such as `".keyboard-2"`.
    Selector(String),
    /// An element the host already resolved, identified by its class list.
    Element { class_name: String },
}

impl MountTarget {
    /// The class the keyboard is mounted on.
    pub fn class_name(&self) -> Result<String> {
        match self {
            MountTarget::Default => Ok(DEFAULT_MOUNT_CLASS.to_string()),
            MountTarget::Selector(selector) => {
                let class: String = selector.split('.').collect();
                if class.is_empty() || class.chars().any(char::is_whitespace) {
                    return Err(KeyboardError::InvalidMountTarget(selector.clone()));
                }
                Ok(class)
            }
            MountTarget::Element { class_name } => class_name
                .split_whitespace()
                .next()
                .map(str::to_string)
                .ok_or_else(|| KeyboardError::InvalidMountTarget(class_name.clone())),
        }
    }
}

/// Registry key of a keyboard instance: its mount class, camel-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn from_mount(mount: &MountTarget) -> Result<Self> {
        Ok(Self(camel_case(&mount.class_name()?)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `"simple-keyboard"` → `"simpleKeyboard"`. Separators are `.`, `-`, `_`
/// and whitespace; the first word stays lower-case.
pub fn camel_case(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut words = lowered
        .split(|c: char| c == '.' || c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty());

    let mut out = words.next().unwrap_or_default().to_string();
    for word in words {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
