use crate::config::AppConfig;
use crate::covenant::{GuardRegistry, GUARD_REGISTRY};
use crate::errors::{AppError, AppResult};
use crate::report::{GuardDescription, OutputFormat, ReportFormatter};
use crate::types::GuardVariant;
use clap::Args;

/// Select the smallest guard variant for a transaction shape
#[derive(Args)]
pub struct GuardCommand {
    /// Number of transaction inputs
    #[arg(long)]
    pub inputs: usize,

    /// Number of transaction outputs
    #[arg(long)]
    pub outputs: usize,

    /// Number of distinct token types
    #[arg(long, default_value_t = 1)]
    pub types: usize,

    /// Output format: console, json (overrides config.toml)
    #[arg(long)]
    pub format: Option<String>,
}

impl GuardCommand {
    pub fn run(&self) -> AppResult<()> {
        let config = AppConfig::get_defaults()
            .map_err(|e| AppError::Config(format!("Failed to load configuration: {}", e)))?;
        let format = OutputFormat::parse(self.format.as_deref().unwrap_or(&config.output.format));

        let description = describe(self.inputs, self.outputs, self.types)?;
        print!(
            "{}",
            ReportFormatter::format_guard(&description, format, config.output.pretty)?
        );
        Ok(())
    }
}

pub fn describe(inputs: usize, outputs: usize, types: usize) -> AppResult<GuardDescription> {
    let variant = GuardVariant::select(inputs, outputs, types)?;
    Ok(GuardDescription {
        variant: variant.to_string(),
        input_capacity: variant.input_capacity(),
        output_capacity: variant.output_capacity(),
        type_capacity: variant.type_capacity(),
        script_hash: GUARD_REGISTRY.script_hash(variant).to_hex(),
        locking_script: hex::encode(GuardRegistry::locking_script(variant).as_bytes()),
    })
}
