use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use clap::Args;

/// Print the effective configuration as TOML
#[derive(Args)]
pub struct ConfigCommand {}

impl ConfigCommand {
    pub fn run(&self) -> AppResult<()> {
        let config = AppConfig::load()
            .map_err(|e| AppError::Config(format!("Failed to load configuration: {}", e)))?;
        print!("{}", toml::to_string(&config)?);
        Ok(())
    }
}
