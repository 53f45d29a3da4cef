//! Convert subcommand - descriptor XML to Parquet

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use meshline_core::{SharedProgress, fmt_num};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// MeSH descriptor XML file (plain or .gz)
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum number of descriptors to convert
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Rows per record batch
    #[arg(long, default_value_t = 10_000)]
    pub batch_size: usize,

    /// Zstd compression level (1-22)
    #[arg(short, long)]
    pub zstd_level: Option<i32>,
}

impl ConvertArgs {
    fn into_config(self, config: &Config) -> meshline_desc::Config {
        meshline_desc::Config {
            input: self.input,
            output_dir: self
                .output
                .unwrap_or_else(|| config.output.default_dir.clone()),
            zstd_level: self.zstd_level.unwrap_or(config.output.compression_level),
            batch_size: self.batch_size,
            max_records: self.limit,
        }
    }
}

pub fn run(args: ConvertArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let desc_config = args.into_config(config);

    log::info!("Converting MeSH descriptors");
    log::info!("  Input: {}", desc_config.input.display());
    log::info!("  Output: {}", desc_config.output_dir.display());

    let pb = progress.stage_line(&desc_config.output_name());
    pb.set_message("descriptors");
    let summary = meshline_desc::run(&desc_config, &pb)?;

    super::print_table(
        "MeSH",
        &[
            ("Descriptors", fmt_num(summary.total_records)),
            ("Concepts", fmt_num(summary.total_concepts)),
            ("Terms", fmt_num(summary.total_terms)),
            ("Output", summary.output_path.display().to_string()),
            ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
        ],
    );

    Ok(())
}
