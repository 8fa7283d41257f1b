//! Error types for keyboard construction and cross-instance dispatch.
//!
//! Constraint rejections (maxLength, inputPattern) are not errors: they are
//! reported through [`crate::ActivationResult::Rejected`]. Malformed candidate
//! entries are skipped with a diagnostic instead of failing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyboardError {
    /// `dispatch` was used while no registry is live (nothing registered yet,
    /// or the registry was cleared).
    #[error("instance registry is unavailable: no live keyboard instances")]
    RegistryUnavailable,

    /// The mount selector is empty or does not name a class.
    #[error("invalid mount target {0:?}: expected a class selector such as \".simple-keyboard\"")]
    InvalidMountTarget(String),

    /// An `inputPattern` entry failed to compile.
    #[error("invalid input pattern for input {input:?}")]
    InvalidInputPattern {
        input: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML options: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("failed to serialize TOML options: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("failed to parse JSON options: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KeyboardError>;
