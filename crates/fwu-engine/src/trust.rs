//! Release trust verification.
//!
//! The validator asks a [`TrustVerifier`] what can be vouched for about the
//! selected release. The answer is a [`TrustFlags`] set; a verifier that has
//! no way of checking a release answers [`TrustError::NotSupported`], which
//! the validator treats as "untrusted but allowed".
//!
//! # Security
//!
//! [`Ed25519Keyring`] checks a detached Ed25519 signature over the raw
//! SHA-256 payload checksum declared in the metadata:
//! - Only pinned keys are accepted
//! - Malformed checksums or signatures are rejected outright
//! - A well-formed signature that no pinned key accepts leaves the release
//!   untrusted rather than failing the install

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::component::Release;
use crate::error::{ErrorKind, ValidationError};
use crate::flags::TrustFlags;

/// Signature scheme handled by [`Ed25519Keyring`].
pub const SIGNATURE_KIND_ED25519: &str = "ed25519";

/// Errors reported by a trust verifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrustError {
    /// The verifier cannot check this release; not fatal
    #[error("verification not supported: {0}")]
    NotSupported(String),

    /// A signature is present but unusable
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Release metadata needed for verification is malformed
    #[error("invalid release metadata: {0}")]
    InvalidFile(String),

    #[error("verification failed: {0}")]
    Internal(String),
}

impl TrustError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotSupported(_) => ErrorKind::NotSupported,
            Self::InvalidSignature(_) => ErrorKind::SignatureInvalid,
            Self::InvalidFile(_) => ErrorKind::InvalidFile,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }
}

impl From<TrustError> for ValidationError {
    fn from(err: TrustError) -> Self {
        ValidationError::new(err.kind(), err.to_string())
    }
}

/// Produces the trust verdict for a release.
pub trait TrustVerifier: Send + Sync {
    fn verify(&self, release: &Release) -> Result<TrustFlags, TrustError>;
}

/// Verifier for builds without any keyring; every release is unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrustVerifier;

impl TrustVerifier for NoTrustVerifier {
    fn verify(&self, _release: &Release) -> Result<TrustFlags, TrustError> {
        Err(TrustError::NotSupported("no keyring available".to_string()))
    }
}

/// Verifier returning a fixed verdict.
///
/// Useful for metadata from a source that is trusted as a whole, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTrust(pub TrustFlags);

impl TrustVerifier for StaticTrust {
    fn verify(&self, _release: &Release) -> Result<TrustFlags, TrustError> {
        Ok(self.0)
    }
}

/// Hex-encoded SHA-256 of a payload, in the form releases declare it.
pub fn payload_checksum(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Ed25519 keyring with pinned public keys.
pub struct Ed25519Keyring {
    trusted_keys: Vec<VerifyingKey>,
}

impl Ed25519Keyring {
    pub fn new(trusted_keys: Vec<VerifyingKey>) -> Self {
        Self { trusted_keys }
    }

    pub fn trusted_keys(&self) -> &[VerifyingKey] {
        &self.trusted_keys
    }

    fn decode_checksum(release: &Release) -> Result<[u8; 32], TrustError> {
        let checksum = release
            .checksum
            .as_deref()
            .ok_or_else(|| TrustError::InvalidFile("signed release has no checksum".to_string()))?;
        let bytes = hex::decode(checksum)
            .map_err(|e| TrustError::InvalidFile(format!("checksum is not hex: {}", e)))?;
        bytes.try_into().map_err(|_| {
            TrustError::InvalidFile("checksum must be a 32-byte SHA-256 digest".to_string())
        })
    }

    fn decode_signature(value: &str) -> Result<Signature, TrustError> {
        let bytes = match hex::decode(value) {
            Ok(bytes) => bytes,
            Err(_) => STANDARD.decode(value.trim()).map_err(|e| {
                TrustError::InvalidSignature(format!("signature encoding: {}", e))
            })?,
        };
        let bytes: [u8; 64] = bytes.try_into().map_err(|_| {
            TrustError::InvalidSignature("Ed25519 signature must be 64 bytes".to_string())
        })?;
        Ok(Signature::from_bytes(&bytes))
    }
}

impl TrustVerifier for Ed25519Keyring {
    fn verify(&self, release: &Release) -> Result<TrustFlags, TrustError> {
        let Some(signature) = &release.signature else {
            tracing::debug!("release has no detached signature");
            return Ok(TrustFlags::empty());
        };

        if signature.kind != SIGNATURE_KIND_ED25519 {
            return Err(TrustError::NotSupported(format!(
                "no keyring for {} signatures",
                signature.kind
            )));
        }

        let digest = Self::decode_checksum(release)?;
        let sig = Self::decode_signature(&signature.value)?;

        if self.trusted_keys.iter().any(|key| key.verify(&digest, &sig).is_ok()) {
            tracing::debug!(key_id = %signature.key_id, "payload signature verified");
            return Ok(TrustFlags::PAYLOAD);
        }

        tracing::warn!(
            key_id = %signature.key_id,
            trusted_keys = self.trusted_keys.len(),
            "payload signature not made by a pinned key, treating release as untrusted"
        );
        Ok(TrustFlags::empty())
    }
}
