use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::report::{OutputFormat, ReportFormatter};
use crate::validator::{TransactionBundle, TransactionValidator, ValidationReport};
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::info;

/// Validate a transaction bundle
#[derive(Args)]
pub struct VerifyCommand {
    /// Path to the bundle JSON file
    pub bundle: PathBuf,

    /// Output format: console, json (overrides config.toml)
    #[arg(long)]
    pub format: Option<String>,
}

impl VerifyCommand {
    pub fn run(&self) -> AppResult<()> {
        let config = AppConfig::get_defaults()
            .map_err(|e| AppError::Config(format!("Failed to load configuration: {}", e)))?;
        let network = config
            .network()
            .map_err(|e| AppError::Config(e.to_string()))?;
        let format = OutputFormat::parse(self.format.as_deref().unwrap_or(&config.output.format));

        let report = verify_file(&self.bundle)?;
        let output =
            ReportFormatter::format_validation(&report, format, network, config.output.pretty)?;
        print!("{}", output);
        Ok(())
    }
}

/// Read, parse and validate a bundle file
pub fn verify_file(path: &Path) -> AppResult<ValidationReport> {
    info!("Loading transaction bundle from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let bundle: TransactionBundle = serde_json::from_str(&content)?;
    Ok(TransactionValidator::validate_bundle(&bundle)?)
}
