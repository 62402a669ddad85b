//! audiocodec - inspect WAV files and convert them between PCM presets.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{InfoCommand, PresetsCommand, ResampleCommand};

/// Inspect WAV files and convert them between PCM presets.
///
/// Codecs are named by preset keys such as PCM_16000_16 (case-insensitive).
/// Logging follows RUST_LOG when it is set.
#[derive(Parser)]
#[command(name = "audiocodec")]
#[command(about = "WAV inspection and PCM resampling tool")]
#[command(version)]
pub struct Cli {
    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in codec presets
    Presets(PresetsCommand),
    /// Show the codec and size of a WAV file
    Info(InfoCommand),
    /// Resample a WAV file to another PCM preset
    Resample(ResampleCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Presets(cmd) => cmd.run(&cli),
        Commands::Info(cmd) => cmd.run(&cli),
        Commands::Resample(cmd) => cmd.run(&cli).await,
    }
}
