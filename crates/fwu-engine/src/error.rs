//! Error types for the install engine.

use std::fmt;

use thiserror::Error;

/// Category of a failure, independent of its message.
///
/// Callers use the kind to decide how to present a rejection; the message
/// carries the concrete device, version and format identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No device matches the component
    NotFound,
    /// A policy rule rejects the operation
    NotSupported,
    /// The installed version is newer than the release
    VersionNewer,
    /// The release is already installed
    VersionSame,
    /// Release metadata is missing or malformed
    InvalidFile,
    /// The device reported inconsistent state
    Internal,
    /// A release signature could not be checked
    SignatureInvalid,
}

impl ErrorKind {
    /// Stable identifier, e.g. `not-supported`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not-found",
            Self::NotSupported => "not-supported",
            Self::VersionNewer => "version-newer",
            Self::VersionSame => "version-same",
            Self::InvalidFile => "invalid-file",
            Self::Internal => "internal",
            Self::SignatureInvalid => "signature-invalid",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected install task.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NotSupported(String),

    #[error("{0}")]
    VersionNewer(String),

    #[error("{0}")]
    VersionSame(String),

    #[error("{0}")]
    InvalidFile(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    SignatureInvalid(String),
}

impl ValidationError {
    /// Build an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::NotSupported => Self::NotSupported(message),
            ErrorKind::VersionNewer => Self::VersionNewer(message),
            ErrorKind::VersionSame => Self::VersionSame(message),
            ErrorKind::InvalidFile => Self::InvalidFile(message),
            ErrorKind::Internal => Self::Internal(message),
            ErrorKind::SignatureInvalid => Self::SignatureInvalid(message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotSupported(_) => ErrorKind::NotSupported,
            Self::VersionNewer(_) => ErrorKind::VersionNewer,
            Self::VersionSame(_) => ErrorKind::VersionSame,
            Self::InvalidFile(_) => ErrorKind::InvalidFile,
            Self::Internal(_) => ErrorKind::Internal,
            Self::SignatureInvalid(_) => ErrorKind::SignatureInvalid,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m)
            | Self::NotSupported(m)
            | Self::VersionNewer(m)
            | Self::VersionSame(m)
            | Self::InvalidFile(m)
            | Self::Internal(m)
            | Self::SignatureInvalid(m) => m,
        }
    }

    /// Prepend context to the message, keeping the kind.
    pub fn prefixed(self, prefix: &str) -> Self {
        let message = format!("{}{}", prefix, self.message());
        Self::new(self.kind(), message)
    }
}

/// Errors from loading configuration, keys and metadata.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// A trusted key could not be parsed
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Metadata declares the same component twice
    #[error("duplicate component id: {0}")]
    DuplicateComponent(String),

    /// An install task was rejected
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}
