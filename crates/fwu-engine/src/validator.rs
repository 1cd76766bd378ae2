//! Install requirement validation.
//!
//! [`RequirementValidator::validate`] decides whether a component may be
//! flashed onto a device. Stages run from cheap identity checks, through
//! policy checks, to trust verification, and the first failing stage ends
//! the pass:
//!
//! 1. The component provides a GUID the device has
//! 2. Version-check requirement, when the device demands one
//! 3. Update protocol
//! 4. Lock state
//! 5. Firmware branch
//! 6. Updatable flag
//! 7. Offline-only devices
//! 8. Installed version present
//! 9. Latest release and its version
//! 10. Version format agreement
//! 11. Lowest supported version
//! 12. Version ordering (upgrade-only, reinstall, downgrade)
//! 13. Trust verification
//!
//! The task's trust flags and downgrade state are committed together, only
//! when every stage passed.

use std::cmp::Ordering;
use std::fmt;

use fwu_version::{compare, parse_from_format, VersionFormat};
use tracing::{debug, info, warn};

use crate::component::{Component, Release};
use crate::device::Device;
use crate::error::ValidationError;
use crate::flags::{flag_names, DeviceFlags, InstallFlags, TrustFlags};
use crate::task::InstallTask;
use crate::trust::{TrustError, TrustVerifier};

/// Branch name used in messages when none is declared.
const DEFAULT_BRANCH: &str = "default";

/// A non-fatal finding from a successful validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Version formats disagree but `FORCE` overrode the check
    VersionFormatIgnored {
        device_format: VersionFormat,
        release_formats: String,
    },
    /// The trust verifier could not check the release
    VerificationUnsupported { device: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionFormatIgnored {
                device_format,
                release_formats,
            } => write!(
                f,
                "ignoring version format difference {}:{}",
                device_format, release_formats
            ),
            Self::VerificationUnsupported { device, reason } => {
                write!(f, "Ignoring verification for {}: {}", device, reason)
            }
        }
    }
}

/// Outcome of a successful validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    fn warn(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.warnings.push(diagnostic);
    }
}

/// Checks install tasks against device state, install flags and trust.
pub struct RequirementValidator<'v> {
    verifier: &'v dyn TrustVerifier,
}

impl<'v> RequirementValidator<'v> {
    pub fn new(verifier: &'v dyn TrustVerifier) -> Self {
        Self { verifier }
    }

    /// Run every stage against `task`.
    ///
    /// On success the task's trust flags and downgrade state are set and any
    /// warnings are returned in the report. A task that already passed cannot
    /// be validated again; a task that failed may be retried, e.g. with
    /// different flags.
    pub fn validate(
        &self,
        task: &mut InstallTask<'_>,
        flags: InstallFlags,
    ) -> Result<ValidationReport, ValidationError> {
        let device = task.device();
        let component = task.component();

        if task.is_validated() {
            return Err(ValidationError::Internal(format!(
                "install task for {} [{}] has already been validated",
                device.name, device.id
            )));
        }

        debug!(
            device = %device.id,
            component = %component.id,
            flags = ?flag_names(&flags),
            "checking install requirements"
        );

        let mut report = ValidationReport::default();

        check_guid(device, component)?;
        check_version_requirement(device, component)?;
        check_protocol(device, component, flags)?;
        check_locked(device)?;
        check_branch(device, component, flags)?;
        check_updatable(device)?;
        check_offline(device, flags)?;
        let current = current_version(device)?;
        let (release, release_raw) = latest_release(device, component)?;
        check_version_format(device, component, flags, &mut report)?;
        check_version_lowest(device, current, flags)?;
        let is_downgrade = check_version_order(device, current, release_raw, flags)?;
        let trust_flags = self.derive_trust(device, release, &mut report)?;

        task.commit(trust_flags, is_downgrade);

        info!(
            device = %device.id,
            component = %component.id,
            version = %release_raw,
            is_downgrade,
            trust = ?flag_names(&trust_flags),
            "install requirements passed"
        );

        Ok(report)
    }

    fn derive_trust(
        &self,
        device: &Device,
        release: &Release,
        report: &mut ValidationReport,
    ) -> Result<TrustFlags, ValidationError> {
        match self.verifier.verify(release) {
            Ok(flags) => Ok(flags),
            Err(TrustError::NotSupported(reason)) => {
                report.warn(Diagnostic::VerificationUnsupported {
                    device: device.name.clone(),
                    reason,
                });
                Ok(TrustFlags::empty())
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn check_guid(device: &Device, component: &Component) -> Result<(), ValidationError> {
    if component.flashed_guids().any(|guid| device.has_guid(guid)) {
        return Ok(());
    }
    debug!(device = %device.id, component = %component.id, "no flashed GUID matches");
    Err(ValidationError::NotFound("No supported devices found".to_string()))
}

fn check_version_requirement(device: &Device, component: &Component) -> Result<(), ValidationError> {
    if !device.has_flag(DeviceFlags::VERSION_CHECK_REQUIRED) {
        return Ok(());
    }
    if component.has_version_check_requirement() {
        return Ok(());
    }
    Err(ValidationError::NotSupported("no firmware requirement".to_string())
        .prefixed("device requires firmware with a version check: "))
}

fn check_protocol(
    device: &Device,
    component: &Component,
    flags: InstallFlags,
) -> Result<(), ValidationError> {
    let Some(protocol) = component.update_protocol.as_deref() else {
        return Ok(());
    };
    if device.protocols.is_empty()
        || device.has_protocol(protocol)
        || flags.contains(InstallFlags::FORCE)
    {
        return Ok(());
    }
    Err(ValidationError::NotSupported(format!(
        "Device {} does not support {}, only {}",
        device.name,
        protocol,
        device.protocols.join("|")
    )))
}

fn check_locked(device: &Device) -> Result<(), ValidationError> {
    if device.has_flag(DeviceFlags::LOCKED) {
        return Err(ValidationError::NotSupported(format!(
            "Device {} [{}] is locked",
            device.name, device.id
        )));
    }
    Ok(())
}

/// An absent branch on either side is the default branch, so a device with
/// no branch accepts a component declared on "default".
fn check_branch(
    device: &Device,
    component: &Component,
    flags: InstallFlags,
) -> Result<(), ValidationError> {
    let branch_old = device.branch.as_deref().unwrap_or(DEFAULT_BRANCH);
    let branch_new = component.branch.as_deref().unwrap_or(DEFAULT_BRANCH);
    if branch_old == branch_new || flags.contains(InstallFlags::ALLOW_BRANCH_SWITCH) {
        return Ok(());
    }
    Err(ValidationError::NotSupported(format!(
        "Device {} [{}] would switch firmware branch from {} to {}",
        device.name, device.id, branch_old, branch_new
    )))
}

fn check_updatable(device: &Device) -> Result<(), ValidationError> {
    if !device.has_flag(DeviceFlags::UPDATABLE) {
        return Err(ValidationError::NotSupported(format!(
            "Device {} [{}] does not currently allow updates",
            device.name, device.id
        )));
    }
    Ok(())
}

fn check_offline(device: &Device, flags: InstallFlags) -> Result<(), ValidationError> {
    if device.has_flag(DeviceFlags::ONLY_OFFLINE)
        && !flags.intersects(InstallFlags::OFFLINE | InstallFlags::FORCE)
    {
        return Err(ValidationError::NotSupported(format!(
            "Device {} [{}] only allows offline updates",
            device.name, device.id
        )));
    }
    Ok(())
}

fn current_version(device: &Device) -> Result<&str, ValidationError> {
    device.current_version().ok_or_else(|| {
        ValidationError::Internal(format!(
            "Device {} [{}] has no firmware version",
            device.name, device.id
        ))
    })
}

fn latest_release<'c>(
    device: &Device,
    component: &'c Component,
) -> Result<(&'c Release, &'c str), ValidationError> {
    let release = component.latest_release().ok_or_else(|| {
        ValidationError::InvalidFile(format!(
            "{} [{}] has no firmware update metadata",
            device.name, device.id
        ))
    })?;
    let version = release.version().ok_or_else(|| {
        ValidationError::InvalidFile("Release has no firmware version".to_string())
    })?;
    Ok((release, version))
}

fn check_version_format(
    device: &Device,
    component: &Component,
    flags: InstallFlags,
    report: &mut ValidationReport,
) -> Result<(), ValidationError> {
    let force = flags.contains(InstallFlags::FORCE);
    if component.version_formats.is_empty()
        || (flags.contains(InstallFlags::ALLOW_BRANCH_SWITCH) && !force)
    {
        return Ok(());
    }

    let fmt_dev = device.version_format;
    let release_formats = component.version_formats.join(";");

    if fmt_dev == VersionFormat::Unknown && !force {
        return Err(ValidationError::NotSupported(format!(
            "release version format '{}' but no device version format",
            release_formats
        )));
    }

    let matches = component
        .version_formats
        .iter()
        .any(|fmt| VersionFormat::from_str_lossy(fmt) == fmt_dev);
    if matches && fmt_dev != VersionFormat::Unknown {
        return Ok(());
    }

    if !force {
        return Err(ValidationError::NotSupported(format!(
            "Firmware version formats were different, device was '{}' and release is '{}'",
            fmt_dev, release_formats
        )));
    }

    report.warn(Diagnostic::VersionFormatIgnored {
        device_format: fmt_dev,
        release_formats,
    });
    Ok(())
}

fn check_version_lowest(
    device: &Device,
    current: &str,
    flags: InstallFlags,
) -> Result<(), ValidationError> {
    let Some(lowest) = device.lowest_version() else {
        return Ok(());
    };
    if flags.contains(InstallFlags::FORCE) {
        return Ok(());
    }
    if compare(lowest, current, device.version_format) == Ordering::Greater {
        return Err(ValidationError::VersionNewer(format!(
            "Specified firmware is older than the minimum required version '{} < {}'",
            current, lowest
        )));
    }
    Ok(())
}

/// Returns whether the release is a downgrade.
fn check_version_order(
    device: &Device,
    current: &str,
    release_raw: &str,
    flags: InstallFlags,
) -> Result<bool, ValidationError> {
    let release = parse_from_format(release_raw, device.version_format);
    let ordering = compare(current, &release, device.version_format);

    debug!(
        device = %device.id,
        current,
        release = %release,
        format = %device.version_format,
        ?ordering,
        "compared versions"
    );

    if device.has_flag(DeviceFlags::ONLY_VERSION_UPGRADE) && ordering != Ordering::Less {
        return Err(ValidationError::NotSupported(
            "Device only supports version upgrades".to_string(),
        ));
    }

    if ordering == Ordering::Equal && !flags.contains(InstallFlags::ALLOW_REINSTALL) {
        return Err(ValidationError::VersionSame(format!(
            "Specified firmware is already installed '{}'",
            release
        )));
    }

    let is_downgrade = ordering == Ordering::Greater;
    if is_downgrade
        && !flags.intersects(InstallFlags::ALLOW_OLDER | InstallFlags::ALLOW_BRANCH_SWITCH)
    {
        return Err(ValidationError::VersionNewer(format!(
            "Specified firmware is older than installed '{} < {}'",
            release, current
        )));
    }

    Ok(is_downgrade)
}
