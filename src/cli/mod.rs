use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// Covenant Token Verifier
#[derive(Parser)]
#[command(name = "token-covenant")]
#[command(about = "Covenant Token Verifier")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Validate a transaction bundle (context plus one spend per input)
    Verify(commands::verify::VerifyCommand),
    /// Encode a covenant state from JSON, or decode serialized state bytes
    State(commands::state::StateCommand),
    /// Select and describe the guard variant for a transaction shape
    Guard(commands::guard::GuardCommand),
    /// Print the effective configuration
    Config(commands::config::ConfigCommand),
}

pub fn run() -> AppResult<()> {
    // Initialise tracing subscriber to capture info!() macros
    // Uses RUST_LOG environment variable (defaults to "error" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Verify(command) => command.run(),
        Commands::State(command) => command.run(),
        Commands::Guard(command) => command.run(),
        Commands::Config(command) => command.run(),
    }
}
