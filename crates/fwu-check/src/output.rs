//! Output formatting for CLI results
//!
//! Supports three output formats:
//! - Table: Human-readable tables (default)
//! - JSON: Structured JSON for scripting and automation
//! - Quiet: No output, exit codes only

use std::cmp::Ordering;
use std::str::FromStr;

use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;

use crate::report::{CheckOutcome, DeviceCheck, PlanSummary};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Quiet,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("Unknown output format: {s}")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Quiet => write!(f, "quiet"),
        }
    }
}

#[derive(Serialize)]
struct CompareOutput<'a> {
    a: &'a str,
    b: &'a str,
    format: String,
    result: i32,
}

/// Formats command results for the selected output mode
pub struct OutputFormatter {
    format: OutputFormat,
    verbose: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.format == OutputFormat::Quiet
    }

    /// Format the result of `check`
    pub fn format_check(&self, check: &DeviceCheck) -> String {
        match self.format {
            OutputFormat::Table => self.check_table(check),
            OutputFormat::Json => to_json(check),
            OutputFormat::Quiet => String::new(),
        }
    }

    /// Format the result of `plan`
    pub fn format_plan(&self, plan: &PlanSummary) -> String {
        match self.format {
            OutputFormat::Table => self.plan_table(plan),
            OutputFormat::Json => to_json(plan),
            OutputFormat::Quiet => String::new(),
        }
    }

    /// Format the result of `compare`
    pub fn format_compare(
        &self,
        a: &str,
        b: &str,
        format: fwu_version::VersionFormat,
        ordering: Ordering,
    ) -> String {
        let result = ordering as i32;
        match self.format {
            OutputFormat::Table => result.to_string(),
            OutputFormat::Json => to_json(&CompareOutput {
                a,
                b,
                format: format.to_string(),
                result,
            }),
            OutputFormat::Quiet => String::new(),
        }
    }

    fn check_table(&self, check: &DeviceCheck) -> String {
        if check.outcomes.is_empty() {
            return format!(
                "No firmware found for {} [{}]",
                check.device_name, check.device_id
            );
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Component", "Release", "Verdict", "Downgrade", "Trust", "Action"]);
        for outcome in &check.outcomes {
            table.add_row(vec![
                outcome.component_id.clone(),
                outcome.release.clone().unwrap_or_else(|| "-".to_string()),
                verdict(outcome),
                yes_no(outcome.downgrade),
                trust_column(outcome),
                outcome.action.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }

        let mut out = format!(
            "{} [{}] version {}\n{}",
            check.device_name,
            check.device_id,
            check.current_version.as_deref().unwrap_or("unknown"),
            table
        );
        self.append_details(&mut out, &check.outcomes);
        out
    }

    fn plan_table(&self, plan: &PlanSummary) -> String {
        let mut out = String::new();

        if plan.accepted.is_empty() {
            out.push_str("No installs planned");
        } else {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["#", "Device", "Component", "Release", "Downgrade", "Action"]);
            for (i, outcome) in plan.accepted.iter().enumerate() {
                table.add_row(vec![
                    (i + 1).to_string(),
                    outcome.device_id.clone(),
                    outcome.component_id.clone(),
                    outcome.release.clone().unwrap_or_else(|| "-".to_string()),
                    yes_no(outcome.downgrade),
                    outcome.action.clone().unwrap_or_else(|| "-".to_string()),
                ]);
            }
            out.push_str(&table.to_string());
        }

        if !plan.rejected.is_empty() {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Device", "Component", "Reason"]);
            for outcome in &plan.rejected {
                table.add_row(vec![
                    outcome.device_id.clone(),
                    outcome.component_id.clone(),
                    verdict(outcome),
                ]);
            }
            out.push_str(&format!("\nRejected:\n{}", table));
        }

        self.append_details(&mut out, &plan.accepted);
        self.append_details(&mut out, &plan.rejected);
        out
    }

    /// Rejection messages and warnings, shown with --verbose.
    fn append_details(&self, out: &mut String, outcomes: &[CheckOutcome]) {
        if !self.verbose {
            return;
        }
        for outcome in outcomes {
            if let Some(message) = &outcome.message {
                out.push_str(&format!("\n{}: {}", outcome.component_id, message));
            }
            for warning in &outcome.warnings {
                out.push_str(&format!("\n{}: warning: {}", outcome.component_id, warning));
            }
        }
    }
}

fn verdict(outcome: &CheckOutcome) -> String {
    match &outcome.error_kind {
        None => "allowed".to_string(),
        Some(kind) => format!("rejected ({})", kind),
    }
}

fn trust_column(outcome: &CheckOutcome) -> String {
    if outcome.trust.is_empty() {
        "none".to_string()
    } else {
        outcome.trust.join(", ")
    }
}

fn yes_no(value: bool) -> String {
    let s = if value { "yes" } else { "no" };
    s.to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(allowed: bool) -> CheckOutcome {
        CheckOutcome {
            device_id: "dev1".to_string(),
            component_id: "fw.a".to_string(),
            release: Some("1.1.0".to_string()),
            allowed,
            kind: None,
            error_kind: if allowed { None } else { Some("version-same".to_string()) },
            message: if allowed { None } else { Some("already installed".to_string()) },
            downgrade: false,
            trust: Vec::new(),
            action: allowed.then(|| "org.freedesktop.fwupd.update-hotplug".to_string()),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("quiet".parse::<OutputFormat>().unwrap(), OutputFormat::Quiet);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_check_table_contents() {
        let check = DeviceCheck {
            device_id: "dev1".to_string(),
            device_name: "Dock".to_string(),
            current_version: Some("1.0.0".to_string()),
            outcomes: vec![outcome(true)],
        };
        let out = OutputFormatter::new(OutputFormat::Table, false).format_check(&check);
        assert!(out.starts_with("Dock [dev1] version 1.0.0"));
        assert!(out.contains("allowed"));
        assert!(out.contains("org.freedesktop.fwupd.update-hotplug"));
    }

    #[test]
    fn test_verbose_shows_rejection_message() {
        let plan = PlanSummary {
            accepted: Vec::new(),
            rejected: vec![outcome(false)],
        };
        let quiet = OutputFormatter::new(OutputFormat::Table, false).format_plan(&plan);
        assert!(quiet.contains("rejected (version-same)"));
        assert!(!quiet.contains("already installed"));

        let verbose = OutputFormatter::new(OutputFormat::Table, true).format_plan(&plan);
        assert!(verbose.contains("fw.a: already installed"));
    }

    #[test]
    fn test_json_omits_internal_kind() {
        let json = OutputFormatter::new(OutputFormat::Json, false).format_plan(&PlanSummary {
            accepted: Vec::new(),
            rejected: vec![outcome(false)],
        });
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rejected"][0]["error_kind"], "version-same");
        assert!(value["rejected"][0].get("kind").is_none());
    }

    #[test]
    fn test_compare_output() {
        use fwu_version::VersionFormat;
        let table = OutputFormatter::new(OutputFormat::Table, false);
        assert_eq!(table.format_compare("1", "2", VersionFormat::Plain, Ordering::Less), "-1");
        assert_eq!(table.format_compare("2", "2", VersionFormat::Plain, Ordering::Equal), "0");
        let json = OutputFormatter::new(OutputFormat::Json, false);
        let value: serde_json::Value =
            serde_json::from_str(&json.format_compare("2", "1", VersionFormat::Triplet, Ordering::Greater)).unwrap();
        assert_eq!(value["result"], 1);
        assert_eq!(value["format"], "triplet");
        assert!(OutputFormatter::new(OutputFormat::Quiet, false)
            .format_compare("1", "2", VersionFormat::Plain, Ordering::Less)
            .is_empty());
    }
}
