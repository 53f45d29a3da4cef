//! meshline - MeSH descriptor files to JSON Lines and Parquet
//!
//! Streams NLM MeSH descriptor XML (`desc2025.xml[.gz]`) and converts it
//! into formats convenient for downstream analysis.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "meshline")]
#[command(about = "Stream MeSH descriptor XML into JSON Lines and Parquet")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    quiet: bool,

    /// Config file path (default: ./meshline.toml or ~/.config/meshline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Write descriptors as JSON Lines
    Dump(cmd::dump::DumpArgs),
    /// Convert a descriptor file to Parquet
    Convert(cmd::convert::ConvertArgs),
    /// Print descriptor statistics
    Stats(cmd::stats::StatsArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = Arc::new(meshline_core::ProgressContext::new());

    // TTY: progress lines show activity, so stay at warn unless --debug.
    // Non-TTY: logs are the only progress indicator.
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = cli.quiet || (is_tty && !cli.debug);
    if let Err(e) = meshline_core::init_logging(quiet, cli.debug, multi) {
        eprintln!("logger already initialized: {e}");
    }

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Dump(args) => cmd::dump::run(args, &config),
        Command::Convert(args) => cmd::convert::run(args, &config, &progress),
        Command::Stats(args) => cmd::stats::run(args, &progress),
        Command::Config => {
            cmd::print_table(
                "Setting",
                &[
                    (
                        "Output directory",
                        config.output.default_dir.display().to_string(),
                    ),
                    (
                        "Compression level",
                        config.output.compression_level.to_string(),
                    ),
                    ("Pretty JSON", config.dump.pretty.to_string()),
                ],
            );
            Ok(())
        }
    }
}
