//! Policy action selection.
//!
//! The orchestration layer authorizes every flash against a policy action.
//! Removable ("hotplug") devices get a more relaxed action than internal
//! ones, and any downgrade uses the downgrade action whatever its trust.

use std::fmt;

use crate::flags::{DeviceFlags, TrustFlags};
use crate::task::InstallTask;

/// Default namespace prepended by [`ActionId::qualified`].
pub const DEFAULT_ACTION_NAMESPACE: &str = "org.freedesktop.fwupd";

/// Authorization policy action for an install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionId {
    DowngradeHotplug,
    UpdateHotplugTrusted,
    UpdateHotplug,
    DowngradeInternal,
    UpdateInternalTrusted,
    UpdateInternal,
}

impl ActionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DowngradeHotplug => "downgrade-hotplug",
            Self::UpdateHotplugTrusted => "update-hotplug-trusted",
            Self::UpdateHotplug => "update-hotplug",
            Self::DowngradeInternal => "downgrade-internal",
            Self::UpdateInternalTrusted => "update-internal-trusted",
            Self::UpdateInternal => "update-internal",
        }
    }

    /// Fully qualified action, e.g. `org.freedesktop.fwupd.update-internal`.
    pub fn qualified(&self, namespace: &str) -> String {
        if namespace.is_empty() {
            return self.as_str().to_string();
        }
        format!("{}.{}", namespace.trim_end_matches('.'), self.as_str())
    }

    /// Decision table over the three inputs.
    pub fn from_state(internal: bool, downgrade: bool, payload_trusted: bool) -> Self {
        match (internal, downgrade, payload_trusted) {
            (false, true, _) => Self::DowngradeHotplug,
            (false, false, true) => Self::UpdateHotplugTrusted,
            (false, false, false) => Self::UpdateHotplug,
            (true, true, _) => Self::DowngradeInternal,
            (true, false, true) => Self::UpdateInternalTrusted,
            (true, false, false) => Self::UpdateInternal,
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the policy action for a task.
///
/// Reads the computed fields, so it is only meaningful after validation.
pub fn select_action_id(task: &InstallTask<'_>) -> ActionId {
    ActionId::from_state(
        task.device().has_flag(DeviceFlags::INTERNAL),
        task.is_downgrade(),
        task.trust_flags().contains(TrustFlags::PAYLOAD),
    )
}
