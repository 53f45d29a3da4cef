//! Conversion runtime configuration

use std::path::PathBuf;

/// Runtime configuration for converting a descriptor file to Parquet
#[derive(Debug, Clone)]
pub struct Config {
    /// MeSH descriptor XML file (plain or gzip)
    pub input: PathBuf,
    /// Output directory for parquet files
    pub output_dir: PathBuf,
    /// Zstd compression level for parquet output
    pub zstd_level: i32,
    /// Rows per record batch
    pub batch_size: usize,
    /// Stop after this many descriptors (for testing)
    pub max_records: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("desc.xml"),
            output_dir: PathBuf::from("output"),
            zstd_level: 3,
            batch_size: 10_000,
            max_records: None,
        }
    }
}

impl Config {
    /// Output file stem derived from the input name (`desc2025.xml.gz` → `desc2025`).
    pub fn output_name(&self) -> String {
        let name = self
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base = name.strip_suffix(".gz").unwrap_or(&name);
        let stem = base.strip_suffix(".xml").unwrap_or(base);
        if stem.is_empty() {
            "descriptors".to_string()
        } else {
            stem.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(config.max_records.is_none());
        assert_eq!(config.zstd_level, 3);
        assert_eq!(config.batch_size, 10_000);
    }

    fn name_for(input: &str) -> String {
        Config {
            input: PathBuf::from(input),
            ..Default::default()
        }
        .output_name()
    }

    #[test]
    fn output_name_strips_extensions() {
        assert_eq!(name_for("data/desc2025.xml"), "desc2025");
        assert_eq!(name_for("data/desc2025.xml.gz"), "desc2025");
        assert_eq!(name_for("desc2025.gz"), "desc2025");
        assert_eq!(name_for("desc2025"), "desc2025");
    }

    #[test]
    fn output_name_fallback() {
        assert_eq!(name_for("/"), "descriptors");
        assert_eq!(name_for(".xml"), "descriptors");
    }
}
