//! Batch install planning.
//!
//! Builds one task per (device, candidate component), validates each, and
//! orders the accepted tasks so that devices with a lower install order are
//! flashed first.

use tracing::{debug, info};

use crate::device::Device;
use crate::error::ValidationError;
use crate::flags::InstallFlags;
use crate::metadata::MetadataStore;
use crate::task::{compare_tasks, InstallTask};
use crate::trust::TrustVerifier;
use crate::validator::{RequirementValidator, ValidationReport};

/// A validated task ready for the flash step.
#[derive(Debug, Clone)]
pub struct PlannedInstall<'a> {
    pub task: InstallTask<'a>,
    pub report: ValidationReport,
}

/// A (device, component) pairing that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub device_id: String,
    pub component_id: String,
    pub error: ValidationError,
}

/// Result of planning a batch install.
#[derive(Debug, Clone, Default)]
pub struct InstallPlan<'a> {
    /// Accepted tasks in install order
    pub accepted: Vec<PlannedInstall<'a>>,
    pub rejected: Vec<Rejection>,
}

impl<'a> InstallPlan<'a> {
    /// Validate every candidate component of every device.
    pub fn build(
        devices: &'a [Device],
        store: &'a MetadataStore,
        flags: InstallFlags,
        verifier: &dyn TrustVerifier,
    ) -> Self {
        let validator = RequirementValidator::new(verifier);
        let mut plan = Self::default();

        for device in devices {
            let candidates = store.components_for_device(device);
            debug!(device = %device.id, candidates = candidates.len(), "planning device");

            for component in candidates {
                let mut task = InstallTask::new(device, component);
                match validator.validate(&mut task, flags) {
                    Ok(report) => plan.accepted.push(PlannedInstall { task, report }),
                    Err(error) => {
                        debug!(
                            device = %device.id,
                            component = %component.id,
                            kind = %error.kind(),
                            %error,
                            "install rejected"
                        );
                        plan.rejected.push(Rejection {
                            device_id: device.id.clone(),
                            component_id: component.id.clone(),
                            error,
                        });
                    }
                }
            }
        }

        plan.accepted.sort_by(|a, b| compare_tasks(&a.task, &b.task));

        info!(
            accepted = plan.accepted.len(),
            rejected = plan.rejected.len(),
            "install plan built"
        );
        plan
    }

    /// Accepted tasks in install order.
    pub fn tasks(&self) -> impl Iterator<Item = &InstallTask<'a>> {
        self.accepted.iter().map(|p| &p.task)
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}
