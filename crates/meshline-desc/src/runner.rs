//! Descriptor file → Parquet conversion

use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use meshline_core::{ParquetSink, is_valid_parquet};

use crate::config::Config;
use crate::schema;
use crate::stream::parse_mesh;
use crate::transform::DescriptorAccumulator;

/// Conversion summary
#[derive(Debug)]
pub struct Summary {
    pub total_records: usize,
    pub total_concepts: usize,
    pub total_terms: usize,
    pub output_path: std::path::PathBuf,
    pub elapsed: std::time::Duration,
}

/// Convert `config.input` into `<output_dir>/<stem>.parquet`.
///
/// `pb` receives the running record count; pass `ProgressBar::hidden()`
/// when no progress display is wanted.
pub fn run(config: &Config, pb: &ProgressBar) -> Result<Summary> {
    let start = Instant::now();

    std::fs::create_dir_all(&config.output_dir).context("Failed to create output directory")?;

    let stream = parse_mesh(&config.input)
        .with_context(|| format!("Failed to open {}", config.input.display()))?;
    let limit = config.max_records.unwrap_or(usize::MAX);

    let mut sink = ParquetSink::new(
        &config.output_name(),
        &config.output_dir,
        schema::descriptors(),
        config.zstd_level,
    )
    .context("Failed to create parquet sink")?;
    if sink.path().exists() {
        let state = if is_valid_parquet(sink.path()) { "existing" } else { "corrupt" };
        log::warn!("Replacing {state} output {}", sink.path().display());
    }

    let batch_size = config.batch_size.max(1);
    let mut acc = DescriptorAccumulator::new(batch_size);
    let mut total_records = 0;
    let mut total_concepts = 0;
    let mut total_terms = 0;

    log::info!("Converting {}", config.input.display());

    for rec in stream.take(limit) {
        let rec = rec.with_context(|| {
            format!(
                "Failed to parse {} after {} descriptors",
                config.input.display(),
                total_records
            )
        })?;
        total_records += 1;
        total_concepts += rec.concepts.len();
        total_terms += rec.term_count();
        acc.push(rec);

        if acc.len() >= batch_size {
            sink.write_batch(&acc.take_batch()?)?;
            pb.set_position(total_records as u64);
        }
    }

    if !acc.is_empty() {
        sink.write_batch(&acc.take_batch()?)?;
    }
    pb.set_position(total_records as u64);

    let output_path = sink.path().to_path_buf();
    sink.finalize()?;
    if !is_valid_parquet(&output_path) {
        anyhow::bail!("Output {} has no valid parquet footer", output_path.display());
    }
    pb.finish_and_clear();

    let summary = Summary {
        total_records,
        total_concepts,
        total_terms,
        output_path,
        elapsed: start.elapsed(),
    };

    log::info!("=== MeSH Conversion Summary ===");
    log::info!("Descriptors: {}", summary.total_records);
    log::info!(
        "Concepts: {} / Terms: {}",
        summary.total_concepts,
        summary.total_terms
    );
    log::info!("Output: {}", summary.output_path.display());
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    if summary.total_records > 0 {
        let rate = summary.total_records as f64 / summary.elapsed.as_secs_f64();
        log::info!("Throughput: {:.0} descriptors/sec", rate);
    }

    Ok(summary)
}
