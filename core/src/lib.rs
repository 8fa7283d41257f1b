//! libkeyboard-core
//!
//! Input and caret state engine for on-screen virtual keyboards. Rendering
//! is left to the host: this crate turns button activations into edits on
//! named input buffers, keeps carets (UTF-16, RTL-aware), mirrors state
//! between keyboard instances and runs the trailing-trigger candidate box.
//!
//! Public API:
//! - `Keyboard` - One keyboard instance and its activation pipeline
//! - `InstanceRegistry` - Live instances, used for sync and global release
//! - `KeyboardOptions` - Serde-backed options (TOML / JSON)
//! - `CandidateDictionary` / `CandidateBox` - Candidate lookup and paging
//! - `PhysicalKeyMapper` - Hardware key codes to layout buttons
//! - `KeyboardModule` - Plugins loaded into a keyboard

pub mod error;
pub use error::{KeyboardError, Result};

// Text and caret primitives
pub mod text_edit;
pub use text_edit::{button_type, ButtonType, EditCommand, EditRules, TextEdit, NOOP_BUTTON};

pub mod caret;
pub use caret::{get_rtl_offset, CaretModel, CaretRange, RTL_END, RTL_START};

pub mod input_store;
pub use input_store::{InputMap, InputStore, DEFAULT_INPUT_NAME};

// Instances
pub mod mount;
pub use mount::{InstanceId, MountTarget};

pub mod registry;
pub use registry::{Registry, Shared};

pub mod sync;
pub use sync::{SyncSnapshot, Synchronized};

// Candidates
pub mod candidate;
pub use candidate::{CandidateDictionary, CandidateMatch, CandidateReplacement};

pub mod candidate_box;
pub use candidate_box::{CandidateBox, CandidatePage, DEFAULT_PAGE_SIZE};

// Layouts and hardware keys
pub mod layout;
pub use layout::{display_label, Layout, DEFAULT_LAYOUT_NAME, SHIFT_LAYOUT_NAME};

pub mod physical;
pub use physical::{KeyState, PhysicalKeyEvent, PhysicalKeyMapper};

pub mod hold;
pub use hold::{HoldTimer, HOLD_DELAY, HOLD_INTERVAL};

// Keyboard
pub mod config;
pub use config::{InputPattern, KeyboardOptions, MaxLength};

pub mod event;
pub use event::{ActivationResult, KeyboardEvent, Listener};

pub mod module;
pub use module::{KeyboardModule, ModuleSpec};

pub mod keyboard;
pub use keyboard::{CaretEvent, InstanceRegistry, Keyboard, KeyboardState};
