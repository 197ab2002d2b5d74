//! Report formatting for CLI output
//!
//! Provides Console and JSON renderings of validation reports, guard variant
//! descriptions and encoded states via the [`ReportFormatter`] facade.

use crate::covenant::InputOutcome;
use crate::errors::AppResult;
use crate::validator::ValidationReport;
use bitcoin::Network;
use serde::Serialize;
use std::fmt::Write;

/// Output format options for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

impl OutputFormat {
    /// Parse a format name, falling back to console
    pub fn parse(format_str: &str) -> Self {
        match format_str.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Console,
        }
    }
}

/// Guard variant description
#[derive(Debug, Clone, Serialize)]
pub struct GuardDescription {
    pub variant: String,
    pub input_capacity: usize,
    pub output_capacity: usize,
    pub type_capacity: usize,
    pub script_hash: String,
    pub locking_script: String,
}

/// Encoded state and its commitment
#[derive(Debug, Clone, Serialize)]
pub struct EncodedState {
    pub kind: String,
    pub serialized: String,
    pub state_hash: String,
}

/// Facade for all report formatting operations
pub struct ReportFormatter;

impl ReportFormatter {
    fn to_json<T: Serialize>(value: &T, pretty: bool) -> AppResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(format!("{}\n", json))
    }

    pub fn format_validation(
        report: &ValidationReport,
        format: OutputFormat,
        network: Network,
        pretty: bool,
    ) -> AppResult<String> {
        if format == OutputFormat::Json {
            return Self::to_json(report, pretty);
        }

        let mut out = String::new();
        let _ = writeln!(out, "Transaction ACCEPTED");
        let _ = writeln!(
            out,
            "  Inputs: {}  Outputs: {}",
            report.input_count, report.output_count
        );
        for (i, outcome) in report.outcomes.iter().enumerate() {
            let line = match outcome {
                InputOutcome::Token {
                    owner,
                    amount,
                    spend_type,
                } => format!(
                    "token  {} from {} ({:?} spend)",
                    amount,
                    owner.display(network),
                    spend_type
                ),
                InputOutcome::Guard(summary) => {
                    format!("guard  {} ({} token types)", summary.variant, summary.types.len())
                }
                InputOutcome::Mint {
                    amount,
                    premine,
                    next_remaining_counts,
                } => format!(
                    "minter {} {} (next remaining: {:?})",
                    if *premine { "premined" } else { "minted" },
                    amount,
                    next_remaining_counts
                ),
                InputOutcome::Admin { method } => format!("admin  {}", method),
                InputOutcome::Plain => "plain".to_string(),
            };
            let _ = writeln!(out, "  [{}] {}", i, line);
        }

        if let Some(guard) = report.guard() {
            let _ = writeln!(out, "  Conservation:");
            for totals in &guard.types {
                let _ = writeln!(
                    out,
                    "    slot {} {}: in {} = out {} + burn {}",
                    totals.slot,
                    totals.token_script_hash,
                    totals.input,
                    totals.output,
                    totals.burn
                );
            }
        }
        Ok(out)
    }

    pub fn format_guard(
        description: &GuardDescription,
        format: OutputFormat,
        pretty: bool,
    ) -> AppResult<String> {
        if format == OutputFormat::Json {
            return Self::to_json(description, pretty);
        }
        let mut out = String::new();
        let _ = writeln!(out, "Guard variant: {}", description.variant);
        let _ = writeln!(
            out,
            "  Capacity: {} inputs, {} outputs, {} token types",
            description.input_capacity, description.output_capacity, description.type_capacity
        );
        let _ = writeln!(out, "  Script hash: {}", description.script_hash);
        let _ = writeln!(out, "  Locking script: {}", description.locking_script);
        Ok(out)
    }

    pub fn format_state(
        state: &EncodedState,
        format: OutputFormat,
        pretty: bool,
    ) -> AppResult<String> {
        if format == OutputFormat::Json {
            return Self::to_json(state, pretty);
        }
        let mut out = String::new();
        let _ = writeln!(out, "{} state", state.kind);
        let _ = writeln!(out, "  Serialized: {}", state.serialized);
        let _ = writeln!(out, "  State hash: {}", state.state_hash);
        Ok(out)
    }
}
