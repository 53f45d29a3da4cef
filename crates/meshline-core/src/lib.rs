//! Meshline Core - Shared infrastructure for MeSH data pipelines
//!
//! Logging, TTY-aware progress reporting and the Parquet output sink
//! used by the descriptor crate and the CLI.

pub mod logging;
pub mod progress;
pub mod sink;

// Re-exports for convenience
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use sink::{ParquetSink, is_valid_parquet};
