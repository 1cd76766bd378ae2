//! Install tasks.
//!
//! An [`InstallTask`] pairs one device snapshot with one candidate component.
//! The trust flags and downgrade state are computed by
//! [`RequirementValidator`](crate::validator::RequirementValidator) and are
//! only meaningful once a validation pass has succeeded; before that they
//! read as empty / `false`.

use std::cmp::Ordering;

use crate::action::{select_action_id, ActionId};
use crate::component::Component;
use crate::device::Device;
use crate::error::ValidationError;
use crate::flags::{InstallFlags, TrustFlags};
use crate::trust::TrustVerifier;
use crate::validator::{RequirementValidator, ValidationReport};

/// A (device, component) pairing considered for one install operation.
#[derive(Debug, Clone)]
pub struct InstallTask<'a> {
    device: &'a Device,
    component: &'a Component,
    trust_flags: TrustFlags,
    is_downgrade: bool,
    validated: bool,
}

impl<'a> InstallTask<'a> {
    /// Create a task that may or may not be valid.
    pub fn new(device: &'a Device, component: &'a Component) -> Self {
        Self {
            device,
            component,
            trust_flags: TrustFlags::empty(),
            is_downgrade: false,
            validated: false,
        }
    }

    pub fn device(&self) -> &'a Device {
        self.device
    }

    pub fn component(&self) -> &'a Component {
        self.component
    }

    /// What was verified about the release.
    ///
    /// Only set after a successful validation pass.
    pub fn trust_flags(&self) -> TrustFlags {
        self.trust_flags
    }

    /// Whether the release version is older than the installed one.
    ///
    /// Only set after a successful validation pass.
    pub fn is_downgrade(&self) -> bool {
        self.is_downgrade
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Policy action that must be authorized before flashing.
    pub fn action_id(&self) -> ActionId {
        select_action_id(self)
    }

    /// Validate this task with `verifier` as the trust source.
    pub fn check_requirements(
        &mut self,
        flags: InstallFlags,
        verifier: &dyn TrustVerifier,
    ) -> Result<ValidationReport, ValidationError> {
        RequirementValidator::new(verifier).validate(self, flags)
    }

    /// Store the outcome of a successful validation pass.
    pub(crate) fn commit(&mut self, trust_flags: TrustFlags, is_downgrade: bool) {
        self.trust_flags = trust_flags;
        self.is_downgrade = is_downgrade;
        self.validated = true;
    }
}

/// Order two tasks by their device's install order, lowest first.
pub fn compare_tasks(a: &InstallTask<'_>, b: &InstallTask<'_>) -> Ordering {
    a.device.order.cmp(&b.device.order)
}

/// Sort a batch of tasks into install order. Ties keep their relative order.
pub fn sort_tasks(tasks: &mut [InstallTask<'_>]) {
    tasks.sort_by(compare_tasks);
}
