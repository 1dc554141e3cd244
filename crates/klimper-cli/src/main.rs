//! Klimper CLI - play and render the klimper synthesizer.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "klimper")]
#[command(author, version, about = "Klimper FM wavetable synthesizer", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config file if it exists)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the sequencer live on an audio device
    Play(commands::play::PlayArgs),

    /// Render the sequencer to a 16-bit WAV file
    Render(commands::render::RenderArgs),

    /// Show, create or check the configuration
    Config(commands::config::ConfigArgs),

    /// List audio output devices
    Devices,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so rendered menus and listings stay clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    tracing_log::LogTracer::init().ok();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Play(args) => commands::play::run(args, config),
        Commands::Render(args) => commands::render::run(args, config),
        Commands::Config(args) => commands::config::run(args, config),
        Commands::Devices => commands::devices::run(),
    }
}
