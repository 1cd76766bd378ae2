//! CLI command definitions and argument parsing

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use fwu_engine::{
    Device, EngineConfig, InstallFlags, InstallPlan, MetadataStore, NoTrustVerifier, TrustVerifier,
};
use fwu_version::VersionFormat;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::output::{OutputFormat, OutputFormatter};
use crate::report::{DeviceCheck, PlanSummary};
use crate::ExitCode;

/// fwu-check - firmware install eligibility checker
#[derive(Parser, Debug)]
#[command(name = "fwu-check")]
#[command(version, about = "Check whether firmware may be installed on a device")]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: table, json, quiet
    #[arg(long, default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Config file path
    #[arg(long, env = "FWU_CHECK_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every component that targets one device
    Check(CheckArgs),
    /// Plan an ordered install across several devices
    Plan(PlanArgs),
    /// Compare two versions, printing -1, 0 or 1
    Compare(CompareArgs),
}

/// Install flags shared by `check` and `plan`
#[derive(Args, Debug, Clone, Default)]
pub struct InstallFlagArgs {
    /// Override advisory checks
    #[arg(long)]
    pub force: bool,

    /// Install on next boot
    #[arg(long)]
    pub offline: bool,

    /// Allow installing an older release
    #[arg(long)]
    pub allow_older: bool,

    /// Allow reinstalling the installed release
    #[arg(long)]
    pub allow_reinstall: bool,

    /// Allow switching firmware branch
    #[arg(long)]
    pub allow_branch_switch: bool,
}

impl InstallFlagArgs {
    pub fn to_install_flags(&self) -> InstallFlags {
        let mut flags = InstallFlags::empty();
        flags.set(InstallFlags::FORCE, self.force);
        flags.set(InstallFlags::OFFLINE, self.offline);
        flags.set(InstallFlags::ALLOW_OLDER, self.allow_older);
        flags.set(InstallFlags::ALLOW_REINSTALL, self.allow_reinstall);
        flags.set(InstallFlags::ALLOW_BRANCH_SWITCH, self.allow_branch_switch);
        flags
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Device snapshot (JSON)
    #[arg(long)]
    pub device: PathBuf,

    /// Component metadata (JSON)
    #[arg(long)]
    pub metadata: PathBuf,

    #[command(flatten)]
    pub flags: InstallFlagArgs,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Array of device snapshots (JSON)
    #[arg(long)]
    pub devices: PathBuf,

    /// Component metadata (JSON)
    #[arg(long)]
    pub metadata: PathBuf,

    #[command(flatten)]
    pub flags: InstallFlagArgs,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// First version
    #[arg(allow_hyphen_values = true)]
    pub a: String,

    /// Second version
    #[arg(allow_hyphen_values = true)]
    pub b: String,

    /// Version format of both values
    #[arg(long, default_value = "unknown")]
    pub format: VersionFormat,
}

impl Cli {
    /// Load the configuration named by `--config`, or the defaults.
    ///
    /// An explicitly named file that cannot be loaded is an error.
    pub fn load_config(&self) -> anyhow::Result<EngineConfig> {
        match &self.config {
            Some(path) => EngineConfig::load_from_file(path)
                .with_context(|| format!("failed to load config {}", path.display())),
            None => Ok(EngineConfig::default()),
        }
    }

    /// Execute the CLI command with a pre-loaded configuration
    pub fn execute_with_config(self, config: EngineConfig) -> anyhow::Result<ExitCode> {
        let formatter = OutputFormatter::new(self.output, self.verbose);
        let verifier = build_verifier(&config)?;
        let namespace = config.policy.action_namespace.as_str();

        match self.command {
            Commands::Check(args) => {
                let device: Device = read_json(&args.device)?;
                let store = load_store(&args.metadata)?;
                let flags = args.flags.to_install_flags();
                debug!(device = %device.id, ?flags, "checking device");

                let check = DeviceCheck::run(&device, &store, flags, verifier.as_ref(), namespace);
                emit(&formatter, formatter.format_check(&check));
                Ok(check.exit_code())
            }
            Commands::Plan(args) => {
                let devices: Vec<Device> = read_json(&args.devices)?;
                let store = load_store(&args.metadata)?;
                let flags = args.flags.to_install_flags();
                debug!(devices = devices.len(), ?flags, "planning install");

                let plan = InstallPlan::build(&devices, &store, flags, verifier.as_ref());
                let summary = PlanSummary::from_plan(&plan, &store, namespace);
                emit(&formatter, formatter.format_plan(&summary));
                Ok(summary.exit_code())
            }
            Commands::Compare(args) => {
                let ordering = fwu_version::compare(&args.a, &args.b, args.format);
                emit(
                    &formatter,
                    formatter.format_compare(&args.a, &args.b, args.format, ordering),
                );
                Ok(ExitCode::Success)
            }
        }
    }
}

/// Keyring from the pinned keys, or no verification when none are pinned.
fn build_verifier(config: &EngineConfig) -> anyhow::Result<Box<dyn TrustVerifier>> {
    if config.trust.keys.is_empty() {
        return Ok(Box::new(NoTrustVerifier));
    }
    let keyring = config.keyring().context("invalid trust key in config")?;
    Ok(Box::new(keyring))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn load_store(path: &Path) -> anyhow::Result<MetadataStore> {
    MetadataStore::load_from_file(path)
        .with_context(|| format!("failed to load metadata {}", path.display()))
}

fn emit(formatter: &OutputFormatter, text: String) {
    if !formatter.is_quiet() && !text.is_empty() {
        println!("{text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_flags() {
        let cli = Cli::try_parse_from([
            "fwu-check",
            "check",
            "--device",
            "dev.json",
            "--metadata",
            "meta.json",
            "--force",
            "--allow-older",
        ])
        .unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.device, PathBuf::from("dev.json"));
                assert_eq!(
                    args.flags.to_install_flags(),
                    InstallFlags::FORCE | InstallFlags::ALLOW_OLDER
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_compare_with_format() {
        let cli = Cli::try_parse_from([
            "fwu-check",
            "--output",
            "json",
            "compare",
            "0x0102",
            "1.3",
            "--format",
            "pair",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Commands::Compare(args) => {
                assert_eq!(args.a, "0x0102");
                assert_eq!(args.format, VersionFormat::Pair);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["fwu-check", "compare", "1", "2", "--format", "roman"]).is_err());
    }

    #[test]
    fn test_default_flags_are_empty() {
        assert!(InstallFlagArgs::default().to_install_flags().is_empty());
    }

    #[test]
    fn test_build_verifier_rejects_bad_key() {
        let mut config = EngineConfig::default();
        config.trust.keys.push("ed25519:zz".to_string());
        assert!(build_verifier(&config).is_err());
    }
}
