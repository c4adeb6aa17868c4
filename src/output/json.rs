//! JSON output format writer.

use crate::error::{Error, Result};
use crate::output::{OutputWriter, TableInfo};
use crate::segment::SegmentRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// JSON segment table file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonTableFile {
    /// Run metadata.
    #[serde(flatten)]
    pub info: TableInfo,
    /// Analysis timestamp.
    pub analysis_date: DateTime<Utc>,
    /// Retained segments in time order.
    pub segments: Vec<SegmentRecord>,
    /// Summary statistics.
    pub summary: JsonSummary,
}

/// Summary statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSummary {
    /// Total number of segments.
    pub total_segments: usize,
    /// Segments per minute of audio.
    pub segments_per_minute: f64,
    /// Largest envelope rise among the segments (dB).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_env_delta: Option<f64>,
}

/// Writer for JSON segment tables.
pub struct JsonWriter {
    /// Collected records.
    records: Vec<SegmentRecord>,
    /// Output file path.
    output_path: PathBuf,
    /// Run metadata.
    info: TableInfo,
}

impl JsonWriter {
    /// Create a new JSON writer.
    pub fn new(output_path: &Path, info: TableInfo) -> Self {
        Self {
            records: Vec::new(),
            output_path: output_path.to_path_buf(),
            info,
        }
    }

    /// Compute summary from records.
    #[allow(clippy::cast_precision_loss)]
    fn compute_summary(&self) -> JsonSummary {
        let minutes = self.info.audio_duration_seconds / 60.0;
        let segments_per_minute = if minutes > 0.0 {
            self.records.len() as f64 / minutes
        } else {
            0.0
        };

        JsonSummary {
            total_segments: self.records.len(),
            segments_per_minute,
            max_env_delta: self
                .records
                .iter()
                .map(|r| r.env_delta)
                .reduce(f64::max),
        }
    }
}

impl OutputWriter for JsonWriter {
    fn write_header(&mut self) -> Result<()> {
        // No header for JSON - written at finalize
        Ok(())
    }

    fn write_record(&mut self, record: &SegmentRecord) -> Result<()> {
        self.records.push(*record);
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let table = JsonTableFile {
            info: self.info.clone(),
            analysis_date: Utc::now(),
            summary: self.compute_summary(),
            segments: std::mem::take(&mut self.records),
        };

        let file = File::create(&self.output_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &table).map_err(|e| Error::JsonWrite {
            path: self.output_path.clone(),
            source: e,
        })?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::onset::StrategyKind;
    use tempfile::tempdir;

    fn info(duration: f64) -> TableInfo {
        TableInfo {
            source_file: "dawn.wav".to_string(),
            strategy: StrategyKind::Envelope,
            sample_rate: 22050,
            db_delta_thresh: 2.5,
            audio_duration_seconds: duration,
        }
    }

    fn record(time: f64, env_delta: f64) -> SegmentRecord {
        SegmentRecord {
            time,
            env_max: -20.0,
            env_mean: -30.0,
            env_std: 4.0,
            env_delta,
        }
    }

    #[test]
    fn test_json_writer_basic() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("dawn.segments.json");

        let mut writer = JsonWriter::new(&output_path, info(120.0));
        writer.write_header().unwrap();
        writer.write_record(&record(1.0, 5.0)).unwrap();
        writer.write_record(&record(4.0, 9.5)).unwrap();
        writer.finalize().unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        let table: JsonTableFile = serde_json::from_str(&content).unwrap();

        assert_eq!(table.info.source_file, "dawn.wav");
        assert_eq!(table.info.strategy, StrategyKind::Envelope);
        assert_eq!(table.segments.len(), 2);
        assert_eq!(table.summary.total_segments, 2);
        assert_eq!(table.summary.segments_per_minute, 1.0);
        assert_eq!(table.summary.max_env_delta, Some(9.5));
    }

    #[test]
    fn test_json_writer_empty_table() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("quiet.segments.json");

        let mut writer = JsonWriter::new(&output_path, info(0.0));
        writer.write_header().unwrap();
        writer.finalize().unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(!content.contains("max_env_delta"));
        let table: JsonTableFile = serde_json::from_str(&content).unwrap();
        assert!(table.segments.is_empty());
        assert_eq!(table.summary.segments_per_minute, 0.0);
    }
}
