//! Device snapshots.
//!
//! A [`Device`] is a read-only view of what the device registry knows about a
//! piece of hardware at the moment an install is considered. The engine never
//! mutates it.

use fwu_version::VersionFormat;
use serde::{Deserialize, Serialize};

use crate::flags::DeviceFlags;

/// Snapshot of an updatable device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Stable device identifier
    pub id: String,
    /// Human-readable name used in messages
    pub name: String,
    /// Capability flags
    #[serde(default)]
    pub flags: DeviceFlags,
    /// Hardware GUIDs the device answers to
    #[serde(default)]
    pub guids: Vec<String>,
    /// Update protocols the device speaks; empty means unconstrained
    #[serde(default)]
    pub protocols: Vec<String>,
    /// Currently installed firmware version
    #[serde(default)]
    pub version: Option<String>,
    /// Lowest firmware version the device may run
    #[serde(default)]
    pub version_lowest: Option<String>,
    /// Numbering scheme of `version` and `version_lowest`
    #[serde(default)]
    pub version_format: VersionFormat,
    /// Firmware branch currently installed; `None` is the default branch
    #[serde(default)]
    pub branch: Option<String>,
    /// Position in a batch install, lower goes first
    #[serde(default)]
    pub order: i32,
}

impl Device {
    /// Create a device with no flags, GUIDs or version.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            flags: DeviceFlags::empty(),
            guids: Vec::new(),
            protocols: Vec::new(),
            version: None,
            version_lowest: None,
            version_format: VersionFormat::Unknown,
            branch: None,
            order: 0,
        }
    }

    pub fn with_flags(mut self, flags: DeviceFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guids.push(guid.into());
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocols.push(protocol.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>, format: VersionFormat) -> Self {
        self.version = Some(version.into());
        self.version_format = format;
        self
    }

    pub fn with_version_lowest(mut self, version: impl Into<String>) -> Self {
        self.version_lowest = Some(version.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn has_flag(&self, flag: DeviceFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Whether the device answers to `guid`. GUIDs compare case-insensitively.
    pub fn has_guid(&self, guid: &str) -> bool {
        self.guids.iter().any(|g| g.eq_ignore_ascii_case(guid))
    }

    pub fn has_protocol(&self, protocol: &str) -> bool {
        self.protocols.iter().any(|p| p == protocol)
    }

    /// Installed version, treating an empty string as absent.
    pub fn current_version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.is_empty())
    }

    /// Lowest allowed version, treating an empty string as absent.
    pub fn lowest_version(&self) -> Option<&str> {
        self.version_lowest.as_deref().filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_match_ignores_case() {
        let device = Device::new("dev1", "Dock").with_guid("2082B5E0-7A64-478A-B1B2-E3404FAB6DAD");
        assert!(device.has_guid("2082b5e0-7a64-478a-b1b2-e3404fab6dad"));
        assert!(!device.has_guid("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_empty_version_is_absent() {
        let device = Device::new("dev1", "Dock").with_version("", VersionFormat::Plain);
        assert!(device.current_version().is_none());
        let device = device.with_version("1.0", VersionFormat::Pair);
        assert_eq!(device.current_version(), Some("1.0"));
    }

    #[test]
    fn test_deserialize_minimal() {
        let json = r#"{
            "id": "dev1",
            "name": "Dock",
            "flags": "UPDATABLE | INTERNAL",
            "guids": ["guid-a"],
            "version": "1.2.3",
            "version_format": "triplet"
        }"#;
        let device: Device = serde_json::from_str(json).unwrap();
        assert!(device.has_flag(DeviceFlags::UPDATABLE | DeviceFlags::INTERNAL));
        assert!(!device.has_flag(DeviceFlags::LOCKED));
        assert_eq!(device.version_format, VersionFormat::Triplet);
        assert!(device.protocols.is_empty());
        assert_eq!(device.order, 0);
    }
}
