//! CSV output format writer.

use crate::error::{Error, Result};
use crate::output::OutputWriter;
use crate::segment::SegmentRecord;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Column names, in the order `SegmentRecord` serializes its fields.
pub const HEADER: [&str; 5] = ["time", "env_max", "env_mean", "env_std", "env_delta"];

/// CSV format output writer.
pub struct CsvWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl CsvWriter {
    /// Create a new CSV writer.
    pub fn new(path: &Path) -> Result<Self> {
        // Header is written explicitly so header-only tables still carry it
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|e| Error::CsvWrite {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
        })
    }

    fn csv_error(&self, source: csv::Error) -> Error {
        Error::CsvWrite {
            path: self.path.clone(),
            source,
        }
    }
}

impl OutputWriter for CsvWriter {
    fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(HEADER)
            .map_err(|e| self.csv_error(e))
    }

    fn write_record(&mut self, record: &SegmentRecord) -> Result<()> {
        self.writer
            .serialize(record)
            .map_err(|e| self.csv_error(e))
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
