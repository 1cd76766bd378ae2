//! Configuration structures for the install engine.
//!
//! Defines the pinned release-signing keys, the policy action namespace
//! and the default log level used by front-ends.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::action::DEFAULT_ACTION_NAMESPACE;
use crate::error::EngineError;
use crate::trust::Ed25519Keyring;

/// Main engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Trust configuration
    #[serde(default)]
    pub trust: TrustConfig,

    /// Authorization policy configuration
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), EngineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Keyring built from the pinned keys.
    pub fn keyring(&self) -> Result<Ed25519Keyring, EngineError> {
        Ok(Ed25519Keyring::new(self.trust.parse_keys()?))
    }
}

/// Pinned keys for release signature verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustConfig {
    /// Ed25519 public keys, hex or base64 encoded.
    /// Format: "ed25519:<hex_or_base64_public_key>"
    #[serde(default)]
    pub keys: Vec<String>,
}

impl TrustConfig {
    /// Parse the configured keys into Ed25519 verifying keys.
    pub fn parse_keys(&self) -> Result<Vec<VerifyingKey>, EngineError> {
        self.keys.iter().map(|k| parse_ed25519_key(k)).collect()
    }
}

/// Parse an Ed25519 public key from string format.
///
/// Supports formats:
/// - "ed25519:<hex_encoded_32_bytes>"
/// - "ed25519:<base64_encoded_32_bytes>"
pub fn parse_ed25519_key(s: &str) -> Result<VerifyingKey, EngineError> {
    let encoded = s
        .strip_prefix("ed25519:")
        .ok_or_else(|| EngineError::InvalidKey("key must start with 'ed25519:'".to_string()))?;

    let key_data = match hex::decode(encoded) {
        Ok(bytes) => bytes,
        Err(_) => STANDARD
            .decode(encoded.trim())
            .map_err(|e| EngineError::InvalidKey(format!("invalid key encoding: {}", e)))?,
    };

    let key_bytes: [u8; 32] = key_data.try_into().map_err(|_| {
        EngineError::InvalidKey("Ed25519 public key must be 32 bytes".to_string())
    })?;

    VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| EngineError::InvalidKey(format!("invalid Ed25519 public key: {}", e)))
}

/// Authorization policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Namespace prepended to action identifiers
    #[serde(default = "default_action_namespace")]
    pub action_namespace: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            action_namespace: default_action_namespace(),
        }
    }
}

/// Logging configuration for front-ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. "warn" or "fwu_engine=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_action_namespace() -> String {
    DEFAULT_ACTION_NAMESPACE.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}
