//! # fwu-engine
//!
//! Install-eligibility and trust engine for firmware updates.
//!
//! Given a device snapshot and a candidate firmware component, this crate
//! decides:
//! - Whether the release may be applied at all ([`RequirementValidator`])
//! - Whether the operation is a downgrade
//! - What trust level the payload carries ([`TrustVerifier`])
//! - Which policy action must be authorized before flashing ([`ActionId`])
//! - In which order a batch of installs should run ([`sort_tasks`])
//!
//! ## Security
//!
//! Every flash must pass through [`RequirementValidator::validate`]:
//! - Checks run in a fixed order and the first failure is final
//! - Trust is derived last, after every cheap rejection
//! - Downgrades always map to the downgrade policy action
//!
//! The engine performs no I/O of its own during validation and never mutates
//! the device or component it is given.

pub mod action;
pub mod component;
pub mod config;
pub mod device;
pub mod error;
pub mod flags;
pub mod metadata;
pub mod plan;
#[cfg(test)]
mod proptests;
pub mod task;
pub mod trust;
pub mod validator;

// Re-export main types for convenience
pub use action::{select_action_id, ActionId, DEFAULT_ACTION_NAMESPACE};
pub use component::{Component, DetachedSignature, Provide, Release, Requirement, RequirementKind};
pub use config::{EngineConfig, LoggingConfig, PolicyConfig, TrustConfig};
pub use device::Device;
pub use error::{EngineError, ErrorKind, ValidationError};
pub use flags::{DeviceFlags, InstallFlags, TrustFlags};
pub use fwu_version::VersionFormat;
pub use metadata::MetadataStore;
pub use plan::{InstallPlan, PlannedInstall, Rejection};
pub use task::{compare_tasks, sort_tasks, InstallTask};
pub use trust::{
    payload_checksum, Ed25519Keyring, NoTrustVerifier, StaticTrust, TrustError, TrustVerifier,
};
pub use validator::{Diagnostic, RequirementValidator, ValidationReport};
