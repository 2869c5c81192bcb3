//! EcoHAB CLI - social-structure analysis from the command line.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ecohab")]
#[command(author, version, about = "EcoHAB - social structure of RFID-tracked mice", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Dataset file (JSON)
    #[arg(short, long, global = true, default_value = "dataset.json")]
    data: PathBuf,

    /// Directory for result files
    #[arg(short, long, global = true, default_value = "results")]
    output: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default ecohab.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Time each mouse spends alone, per compartment and dark phase
    Solitude,

    /// Time pairs spend together versus chance
    Sociability {
        /// Bin width in seconds (overrides [sociability] bin_secs)
        #[arg(short, long)]
        bin_secs: Option<f64>,
    },

    /// Following / avoidance counts and significance per pair
    Following {
        /// Forward window in seconds (overrides [detector] threshold_secs)
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Antenna-transition durations and registration trains
    Transitions,

    /// Show dataset statistics
    Summary,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = commands::Context {
        data: cli.data,
        output: cli.output,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Solitude => commands::solitude::run(&ctx),
        Commands::Sociability { bin_secs } => commands::sociability::run(&ctx, bin_secs),
        Commands::Following { threshold } => commands::following::run(&ctx, threshold),
        Commands::Transitions => commands::transitions::run(&ctx),
        Commands::Summary => commands::summary::run(&ctx),
    }
}
