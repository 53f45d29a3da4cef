//! Parquet output sink

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::Schema;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;

/// Buffered parquet writer with atomic tmp→rename
pub struct ParquetSink {
    writer: ArrowWriter<File>,
    tmp_path: PathBuf,
    final_path: PathBuf,
    row_count: usize,
}

impl std::fmt::Debug for ParquetSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParquetSink")
            .field("final_path", &self.final_path)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

impl ParquetSink {
    /// Create a sink for `<output_dir>/<name>.parquet`, writing to a tmp file first
    pub fn new(
        name: &str,
        output_dir: &Path,
        schema: &Schema,
        zstd_level: i32,
    ) -> Result<Self, std::io::Error> {
        let filename = format!("{name}.parquet");
        let final_path = output_dir.join(&filename);
        let tmp_path = output_dir.join(format!("{filename}.tmp"));

        // Clean up stale tmp file
        if tmp_path.exists() {
            log::warn!("Removing stale tmp file: {}", tmp_path.display());
            fs::remove_file(&tmp_path)?;
        }

        let file = File::create(&tmp_path)?;
        let level = ZstdLevel::try_new(zstd_level)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let props = WriterProperties::builder()
            .set_compression(Compression::ZSTD(level))
            .build();

        let writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props))
            .map_err(std::io::Error::other)?;

        Ok(Self {
            writer,
            tmp_path,
            final_path,
            row_count: 0,
        })
    }

    /// Write a record batch
    pub fn write_batch(&mut self, batch: &RecordBatch) -> Result<(), std::io::Error> {
        self.row_count += batch.num_rows();
        self.writer.write(batch).map_err(std::io::Error::other)
    }

    /// Final output path (valid once `finalize` returns)
    pub fn path(&self) -> &Path {
        &self.final_path
    }

    /// Finalize: flush footer and atomically rename tmp → final
    pub fn finalize(self) -> Result<usize, std::io::Error> {
        let row_count = self.row_count;
        self.writer.close().map_err(std::io::Error::other)?;
        fs::rename(&self.tmp_path, &self.final_path)?;
        log::debug!(
            "Wrote {} rows to {}",
            row_count,
            self.final_path.display()
        );
        Ok(row_count)
    }
}

/// Check if a completed parquet file exists and has a valid footer
pub fn is_valid_parquet(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    parquet::file::reader::SerializedFileReader::new(file).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::StringArray;
    use arrow::datatypes::{DataType, Field};
    use tempfile::TempDir;

    fn ui_schema() -> Schema {
        Schema::new(vec![Field::new("descriptor_ui", DataType::Utf8, false)])
    }

    fn ui_batch(uis: Vec<&str>) -> RecordBatch {
        RecordBatch::try_new(
            Arc::new(ui_schema()),
            vec![Arc::new(StringArray::from(uis))],
        )
        .unwrap()
    }

    #[test]
    fn is_valid_parquet_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(!is_valid_parquet(&dir.path().join("nope.parquet")));
    }

    #[test]
    fn is_valid_parquet_not_parquet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.parquet");
        std::fs::write(&path, b"this is not parquet").unwrap();
        assert!(!is_valid_parquet(&path));
    }

    #[test]
    fn sink_writes_and_renames() {
        let dir = TempDir::new().unwrap();
        let mut sink = ParquetSink::new("desc", dir.path(), &ui_schema(), 3).unwrap();
        sink.write_batch(&ui_batch(vec!["D000001", "D000002"])).unwrap();
        sink.write_batch(&ui_batch(vec!["D000003"])).unwrap();
        let path = sink.path().to_path_buf();
        assert_eq!(sink.finalize().unwrap(), 3);

        assert!(is_valid_parquet(&path));
        assert!(!dir.path().join("desc.parquet.tmp").exists());
    }

    #[test]
    fn sink_replaces_stale_tmp() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("desc.parquet.tmp"), b"stale").unwrap();
        let sink = ParquetSink::new("desc", dir.path(), &ui_schema(), 3).unwrap();
        assert_eq!(sink.finalize().unwrap(), 0);
        assert!(is_valid_parquet(&dir.path().join("desc.parquet")));
    }

    #[test]
    fn sink_rejects_bad_zstd_level() {
        let dir = TempDir::new().unwrap();
        let err = ParquetSink::new("desc", dir.path(), &ui_schema(), 99).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
