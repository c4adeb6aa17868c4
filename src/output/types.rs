//! Output type definitions.

use crate::onset::StrategyKind;
use crate::segment::SegmentTable;
use serde::{Deserialize, Serialize};

/// Run metadata written alongside segment records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Source audio file name.
    pub source_file: String,
    /// Strategy that produced the onsets.
    pub strategy: StrategyKind,
    /// Sample rate the recording was analysed at.
    pub sample_rate: u32,
    /// Minimum envelope rise a segment needed to be kept.
    pub db_delta_thresh: f64,
    /// Length of the recording in seconds.
    pub audio_duration_seconds: f64,
}

impl TableInfo {
    /// Metadata of a computed table.
    pub fn from_table(table: &SegmentTable) -> Self {
        Self {
            source_file: table.source.file_name().map_or_else(
                || table.source.display().to_string(),
                |n| n.to_string_lossy().into_owned(),
            ),
            strategy: table.strategy,
            sample_rate: table.sample_rate,
            db_delta_thresh: table.db_delta_thresh,
            audio_duration_seconds: table.duration_secs,
        }
    }
}
