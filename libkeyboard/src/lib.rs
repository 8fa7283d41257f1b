//! libkeyboard crate root
//!
//! Bundled layouts and a line-oriented session driver on top of
//! `libkeyboard-core`. The `libkeyboard` binary wraps [`Session`] in a
//! terminal prompt.
//!
//! Public API exported here:
//! - `preset`, `english`, `hebrew` from `layouts`
//! - `Session` and `Command` from `session`

pub mod layouts;
pub mod session;

pub use layouts::{english, hebrew, preset, PRESET_NAMES};
pub use session::{split_buttons, Command, Session, HELP};

// Convenience re-exports for callers that only depend on this crate.
pub use libkeyboard_core::{
    ActivationResult, InstanceRegistry, Keyboard, KeyboardEvent, KeyboardOptions, Layout,
    MountTarget, RTL_END, RTL_START,
};
