use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

use situs::config::{SitusConfig, config_path};
use situs::log_format::CallsignFirstFormat;

mod commands;

use commands::{handle_check_config, handle_replay};

#[derive(Parser)]
#[command(name = "situs")]
#[command(about = "Ground elevation, altitude correction and on-ground guessing for remote aircraft")]
#[command(version)]
struct Cli {
    /// Config file (default: $SITUS_CONFIG or ./situs.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored log output
    #[arg(long, global = true, default_value_t = false)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recorded position reports (CSV) and write processed situations as JSON lines
    Replay {
        /// CSV file with position reports
        #[arg(long)]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate and print the effective configuration
    CheckConfig,
}

fn init_tracing(ansi: bool) {
    // RUST_LOG overrides, info otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(CallsignFirstFormat::new(ansi))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let path = cli.config.unwrap_or_else(config_path);
    let config = SitusConfig::load_or_default(&path)?;

    match cli.command {
        Commands::Replay { input, output } => handle_replay(&input, output.as_deref(), &config),
        Commands::CheckConfig => handle_check_config(&path, &config),
    }
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(!cli.no_color);

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
