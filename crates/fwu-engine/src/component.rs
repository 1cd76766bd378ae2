//! Component metadata.
//!
//! A [`Component`] describes one firmware stream published for a family of
//! devices: which hardware it targets, what it requires from the device, and
//! its releases (newest first). The store that produces these is read-only;
//! the engine only queries them.

use serde::{Deserialize, Serialize};

/// `provides` kind naming a GUID that the firmware can be flashed onto.
pub const PROVIDE_FLASHED: &str = "flashed";

/// Kind of a requirement node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    /// Requirement on the device firmware
    Firmware,
    /// Requirement on another component id
    Id,
    /// Requirement on the host hardware
    Hardware,
    /// Requirement on the client performing the update
    Client,
    #[serde(other)]
    Other,
}

/// One entry of a component's `requires` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub kind: RequirementKind,
    #[serde(default)]
    pub text: Option<String>,
}

impl Requirement {
    /// A bare `firmware` requirement: "check the installed version".
    pub fn version_check() -> Self {
        Self {
            kind: RequirementKind::Firmware,
            text: None,
        }
    }

    /// Whether this is a `firmware` requirement without any text.
    pub fn is_version_check(&self) -> bool {
        self.kind == RequirementKind::Firmware
            && self.text.as_deref().map_or(true, str::is_empty)
    }
}

/// One entry of a component's `provides` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provide {
    pub kind: String,
    pub value: String,
}

/// Detached signature attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachedSignature {
    /// Signature scheme, e.g. `ed25519`
    pub kind: String,
    /// Identifier of the signing key, informational only
    #[serde(default)]
    pub key_id: String,
    /// Encoded signature bytes (hex or base64)
    pub value: String,
}

/// A single published firmware release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub version: Option<String>,
    /// Hex SHA-256 of the payload
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub signature: Option<DetachedSignature>,
}

impl Release {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            checksum: None,
            signature: None,
        }
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    pub fn with_signature(mut self, signature: DetachedSignature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Release version, treating an empty string as absent.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.is_empty())
    }
}

/// Firmware component metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Component identifier, e.g. `com.vendor.Dock.firmware`
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub requires: Vec<Requirement>,
    #[serde(default)]
    pub provides: Vec<Provide>,
    /// Update protocol the payload is built for
    #[serde(default)]
    pub update_protocol: Option<String>,
    /// Version formats the release versions are written in
    #[serde(default)]
    pub version_formats: Vec<String>,
    /// Firmware branch; `None` is the default branch
    #[serde(default)]
    pub branch: Option<String>,
    /// Releases, newest first
    #[serde(default)]
    pub releases: Vec<Release>,
}

impl Component {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            requires: Vec::new(),
            provides: Vec::new(),
            update_protocol: None,
            version_formats: Vec::new(),
            branch: None,
            releases: Vec::new(),
        }
    }

    /// Claim that the firmware can be flashed onto devices with `guid`.
    pub fn with_flashed_guid(mut self, guid: impl Into<String>) -> Self {
        self.provides.push(Provide {
            kind: PROVIDE_FLASHED.to_string(),
            value: guid.into(),
        });
        self
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requires.push(requirement);
        self
    }

    pub fn with_update_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.update_protocol = Some(protocol.into());
        self
    }

    pub fn with_version_format(mut self, format: impl Into<String>) -> Self {
        self.version_formats.push(format.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_release(mut self, release: Release) -> Self {
        self.releases.push(release);
        self
    }

    /// Name for messages, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// GUIDs this firmware can be flashed onto.
    pub fn flashed_guids(&self) -> impl Iterator<Item = &str> {
        self.provides
            .iter()
            .filter(|p| p.kind == PROVIDE_FLASHED)
            .map(|p| p.value.as_str())
    }

    pub fn has_version_check_requirement(&self) -> bool {
        self.requires.iter().any(Requirement::is_version_check)
    }

    /// The newest release, if any.
    pub fn latest_release(&self) -> Option<&Release> {
        self.releases.first()
    }
}
