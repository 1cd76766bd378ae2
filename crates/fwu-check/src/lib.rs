//! fwu-check - CLI for firmware install eligibility
//!
//! This crate provides a command-line interface for:
//! - Checking whether a device may install the components that target it
//! - Planning an ordered batch install across several devices
//! - Comparing two version strings under a version format

pub mod cli;
pub mod output;
pub mod report;

pub use cli::Cli;
pub use output::{OutputFormat, OutputFormatter};
pub use report::{CheckOutcome, DeviceCheck, PlanSummary};

use fwu_engine::ErrorKind;

/// Exit codes for CLI operations
///
/// Rejections map to one code per engine error kind so scripts can tell a
/// missing update from a refused downgrade:
/// - 0: Success - at least one install is allowed
/// - 1: General error - bad input files, config or arguments
/// - 2: Not found - no matching component or metadata
/// - 3: Not supported - the device or flags forbid the install
/// - 4: Version newer - the release is older than what is installed
/// - 5: Version same - the release is already installed
/// - 6: Invalid file - the release itself is malformed
/// - 7: Internal - engine misuse
/// - 8: Signature invalid - a signature failed to verify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    NotSupported = 3,
    VersionNewer = 4,
    VersionSame = 5,
    InvalidFile = 6,
    Internal = 7,
    SignatureInvalid = 8,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ErrorKind> for ExitCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::NotSupported => Self::NotSupported,
            ErrorKind::VersionNewer => Self::VersionNewer,
            ErrorKind::VersionSame => Self::VersionSame,
            ErrorKind::InvalidFile => Self::InvalidFile,
            ErrorKind::Internal => Self::Internal,
            ErrorKind::SignatureInvalid => Self::SignatureInvalid,
        }
    }
}

impl ExitCode {
    /// Convert to process exit code
    pub fn to_exit_code(self) -> std::process::ExitCode {
        std::process::ExitCode::from(self as u8)
    }

    /// Get the exit code name as a string
    pub fn name(&self) -> &'static str {
        match self {
            ExitCode::Success => "SUCCESS",
            ExitCode::GeneralError => "GENERAL_ERROR",
            ExitCode::NotFound => "NOT_FOUND",
            ExitCode::NotSupported => "NOT_SUPPORTED",
            ExitCode::VersionNewer => "VERSION_NEWER",
            ExitCode::VersionSame => "VERSION_SAME",
            ExitCode::InvalidFile => "INVALID_FILE",
            ExitCode::Internal => "INTERNAL",
            ExitCode::SignatureInvalid => "SIGNATURE_INVALID",
        }
    }
}
