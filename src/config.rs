use bitcoin::Network;
use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Application configuration loaded from config.toml or environment variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub chain: ChainConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Network used to render P2PKH owners as addresses
    pub network: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default report format: "console" or "json"
    pub format: String,
    /// Pretty-print JSON reports
    pub pretty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig {
                network: "regtest".to_string(),
            },
            output: OutputConfig {
                format: "console".to_string(),
                pretty: true,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from config.toml file and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Config::builder()
            .set_default("chain.network", defaults.chain.network)?
            .set_default("output.format", defaults.output.format)?
            .set_default("output.pretty", defaults.output.pretty)?
            // Load from config.toml if it exists
            .add_source(File::with_name("config").required(false))
            // TOKEN_COVENANT_CHAIN__NETWORK=signet etc.
            .add_source(
                config::Environment::with_prefix("TOKEN_COVENANT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.network()?;
        if !matches!(app_config.output.format.as_str(), "console" | "json") {
            return Err(ConfigError::Message(format!(
                "output.format must be \"console\" or \"json\", got \"{}\"",
                app_config.output.format
            )));
        }

        Ok(app_config)
    }

    /// Get default config values for CLI argument defaults
    pub fn get_defaults() -> Result<Self, ConfigError> {
        // Try to load config for defaults, but don't fail if not found
        match Self::load() {
            Ok(config) => Ok(config),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn network(&self) -> Result<Network, ConfigError> {
        Network::from_str(&self.chain.network).map_err(|e| {
            ConfigError::Message(format!(
                "chain.network \"{}\" is not a known network: {}",
                self.chain.network, e
            ))
        })
    }
}
