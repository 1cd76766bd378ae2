//! Flag sets shared by devices, install requests and trust verdicts.
//!
//! Serialized flag sets use the flag names joined by `|`, e.g.
//! `"UPDATABLE | INTERNAL"`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Capabilities and restrictions reported by a device.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DeviceFlags: u32 {
        /// Only firmware declaring a version-check requirement may be applied
        const VERSION_CHECK_REQUIRED = 1 << 0;
        /// Device must be unlocked before it can be updated
        const LOCKED = 1 << 1;
        /// Device can currently be updated
        const UPDATABLE = 1 << 2;
        /// Updates may only be applied offline (on next boot)
        const ONLY_OFFLINE = 1 << 3;
        /// Device refuses anything but a strictly newer version
        const ONLY_VERSION_UPGRADE = 1 << 4;
        /// Device is permanently attached to the host
        const INTERNAL = 1 << 5;
    }
}

bitflags! {
    /// Options chosen by the caller for one install operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct InstallFlags: u32 {
        /// Override protocol, offline, format and version-floor checks
        const FORCE = 1 << 0;
        /// The update will be applied offline
        const OFFLINE = 1 << 1;
        /// Allow installing an older version
        const ALLOW_OLDER = 1 << 2;
        /// Allow reinstalling the current version
        const ALLOW_REINSTALL = 1 << 3;
        /// Allow moving the device to another firmware branch
        const ALLOW_BRANCH_SWITCH = 1 << 4;
    }
}

bitflags! {
    /// What was verified about a release.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TrustFlags: u32 {
        /// The payload checksum carries a valid signature from a pinned key
        const PAYLOAD = 1 << 0;
        /// The metadata describing the release was signed
        const METADATA = 1 << 1;
    }
}

/// Lowercase, dash-separated names of the flags set in `flags`.
///
/// Used for log fields and CLI output.
pub fn flag_names<B: bitflags::Flags>(flags: &B) -> Vec<String> {
    flags
        .iter_names()
        .map(|(name, _)| name.to_ascii_lowercase().replace('_', "-"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_empty() {
        assert!(DeviceFlags::default().is_empty());
        assert!(InstallFlags::default().is_empty());
        assert!(TrustFlags::default().is_empty());
    }

    #[test]
    fn test_flag_names() {
        let flags = InstallFlags::ALLOW_OLDER | InstallFlags::ALLOW_BRANCH_SWITCH;
        assert_eq!(flag_names(&flags), vec!["allow-older", "allow-branch-switch"]);
        assert!(flag_names(&TrustFlags::empty()).is_empty());
    }

    #[test]
    fn test_serde_uses_names() {
        let flags = DeviceFlags::UPDATABLE | DeviceFlags::INTERNAL;
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, "\"UPDATABLE | INTERNAL\"");
        let back: DeviceFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);
    }
}
