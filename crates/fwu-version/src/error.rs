//! Error types for version handling.

use thiserror::Error;

/// Errors that can occur while interpreting version metadata.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The text does not name a known version format
    #[error("unknown version format: {0}")]
    UnknownFormat(String),
}
