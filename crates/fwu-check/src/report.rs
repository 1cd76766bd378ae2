//! Serializable results of `check` and `plan`.
//!
//! The engine types borrow their device and component; these owned rows are
//! what the formatter renders as tables or JSON.

use fwu_engine::flags::flag_names;
use fwu_engine::{
    Component, Device, ErrorKind, InstallFlags, InstallPlan, InstallTask, MetadataStore,
    RequirementValidator, TrustVerifier, ValidationError, ValidationReport,
};
use serde::Serialize;

use crate::ExitCode;

/// Outcome of validating one (device, component) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub device_id: String,
    pub component_id: String,
    pub release: Option<String>,
    pub allowed: bool,
    #[serde(skip)]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub downgrade: bool,
    pub trust: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub warnings: Vec<String>,
}

impl CheckOutcome {
    /// Row for a task that passed validation.
    pub fn accepted(task: &InstallTask<'_>, report: &ValidationReport, namespace: &str) -> Self {
        Self {
            device_id: task.device().id.clone(),
            component_id: task.component().id.clone(),
            release: release_version(task.component()),
            allowed: true,
            kind: None,
            error_kind: None,
            message: None,
            downgrade: task.is_downgrade(),
            trust: flag_names(&task.trust_flags()),
            action: Some(task.action_id().qualified(namespace)),
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
        }
    }

    /// Row for a pair the engine refused.
    pub fn rejected(device_id: &str, component: &Component, error: &ValidationError) -> Self {
        Self {
            device_id: device_id.to_string(),
            component_id: component.id.clone(),
            release: release_version(component),
            allowed: false,
            kind: Some(error.kind()),
            error_kind: Some(error.kind().to_string()),
            message: Some(error.message().to_string()),
            downgrade: false,
            trust: Vec::new(),
            action: None,
            warnings: Vec::new(),
        }
    }

    fn exit_code(&self) -> ExitCode {
        self.kind.map(ExitCode::from).unwrap_or(ExitCode::Success)
    }
}

fn release_version(component: &Component) -> Option<String> {
    component
        .latest_release()
        .and_then(|r| r.version())
        .map(str::to_string)
}

/// Every candidate component checked against a single device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceCheck {
    pub device_id: String,
    pub device_name: String,
    pub current_version: Option<String>,
    pub outcomes: Vec<CheckOutcome>,
}

impl DeviceCheck {
    /// Validate each component in `store` that targets `device`.
    pub fn run(
        device: &Device,
        store: &MetadataStore,
        flags: InstallFlags,
        verifier: &dyn TrustVerifier,
        namespace: &str,
    ) -> Self {
        let validator = RequirementValidator::new(verifier);
        let outcomes = store
            .components_for_device(device)
            .into_iter()
            .map(|component| {
                let mut task = InstallTask::new(device, component);
                match validator.validate(&mut task, flags) {
                    Ok(report) => CheckOutcome::accepted(&task, &report, namespace),
                    Err(error) => CheckOutcome::rejected(&device.id, component, &error),
                }
            })
            .collect();

        Self {
            device_id: device.id.clone(),
            device_name: device.name.clone(),
            current_version: device.current_version().map(str::to_string),
            outcomes,
        }
    }

    /// Success when any candidate is allowed, otherwise the first rejection.
    pub fn exit_code(&self) -> ExitCode {
        if self.outcomes.is_empty() {
            return ExitCode::NotFound;
        }
        if self.outcomes.iter().any(|o| o.allowed) {
            return ExitCode::Success;
        }
        self.outcomes
            .first()
            .map(CheckOutcome::exit_code)
            .unwrap_or(ExitCode::NotFound)
    }
}

/// Owned view of an [`InstallPlan`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    /// Accepted installs in flash order
    pub accepted: Vec<CheckOutcome>,
    pub rejected: Vec<CheckOutcome>,
}

impl PlanSummary {
    pub fn from_plan(plan: &InstallPlan<'_>, store: &MetadataStore, namespace: &str) -> Self {
        let accepted = plan
            .accepted
            .iter()
            .map(|p| CheckOutcome::accepted(&p.task, &p.report, namespace))
            .collect();

        let rejected = plan
            .rejected
            .iter()
            .filter_map(|r| {
                store
                    .get(&r.component_id)
                    .map(|component| CheckOutcome::rejected(&r.device_id, component, &r.error))
            })
            .collect();

        Self { accepted, rejected }
    }

    /// Success when anything can be installed or nothing was attempted.
    pub fn exit_code(&self) -> ExitCode {
        if !self.accepted.is_empty() {
            return ExitCode::Success;
        }
        self.rejected
            .first()
            .map(CheckOutcome::exit_code)
            .unwrap_or(ExitCode::Success)
    }
}
