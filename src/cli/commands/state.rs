use crate::codec::StateCodec;
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::report::{EncodedState, OutputFormat, ReportFormatter};
use crate::types::{AdminState, GuardState, OpenMinterState, TokenState};
use clap::{Args, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Covenant state families
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateKind {
    Token,
    Guard,
    Minter,
    Admin,
}

/// Encode a state from JSON, or decode serialized state bytes back to JSON
#[derive(Args)]
pub struct StateCommand {
    /// State family
    #[arg(value_enum)]
    pub kind: StateKind,

    /// State JSON, or hex bytes with --decode
    pub input: String,

    /// Treat the input as hex-encoded serialized state
    #[arg(long)]
    pub decode: bool,

    /// Output format: console, json (overrides config.toml)
    #[arg(long)]
    pub format: Option<String>,
}

impl StateCommand {
    pub fn run(&self) -> AppResult<()> {
        let config = AppConfig::get_defaults()
            .map_err(|e| AppError::Config(format!("Failed to load configuration: {}", e)))?;

        if self.decode {
            let json = decode_state(self.kind, &self.input)?;
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }

        let format = OutputFormat::parse(self.format.as_deref().unwrap_or(&config.output.format));
        let encoded = encode_state(self.kind, &self.input)?;
        print!(
            "{}",
            ReportFormatter::format_state(&encoded, format, config.output.pretty)?
        );
        Ok(())
    }
}

fn encode<T: StateCodec + DeserializeOwned>(kind: StateKind, json: &str) -> AppResult<EncodedState> {
    let state: T = serde_json::from_str(json)?;
    Ok(EncodedState {
        kind: format!("{:?}", kind).to_lowercase(),
        serialized: hex::encode(StateCodec::serialize(&state)),
        state_hash: state.state_hash().to_hex(),
    })
}

fn decode<T: StateCodec + Serialize>(bytes: &[u8]) -> AppResult<serde_json::Value> {
    let state = <T as StateCodec>::deserialize(bytes)?;
    Ok(serde_json::to_value(&state)?)
}

/// Serialize a JSON-described state and compute its commitment
pub fn encode_state(kind: StateKind, json: &str) -> AppResult<EncodedState> {
    match kind {
        StateKind::Token => encode::<TokenState>(kind, json),
        StateKind::Guard => encode::<GuardState>(kind, json),
        StateKind::Minter => encode::<OpenMinterState>(kind, json),
        StateKind::Admin => encode::<AdminState>(kind, json),
    }
}

/// Decode hex state bytes into their JSON form
pub fn decode_state(kind: StateKind, hex_bytes: &str) -> AppResult<serde_json::Value> {
    let bytes = hex::decode(hex_bytes.trim())
        .map_err(|e| AppError::InvalidData(format!("Invalid hex: {}", e)))?;
    match kind {
        StateKind::Token => decode::<TokenState>(&bytes),
        StateKind::Guard => decode::<GuardState>(&bytes),
        StateKind::Minter => decode::<OpenMinterState>(&bytes),
        StateKind::Admin => decode::<AdminState>(&bytes),
    }
}
