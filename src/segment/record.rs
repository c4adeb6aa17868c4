//! Segment records and tables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::onset::StrategyKind;

/// Envelope statistics for the window following one onset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    /// Onset time in seconds.
    pub time: f64,
    /// Maximum of the log envelope in the window (dB).
    pub env_max: f64,
    /// Mean of the log envelope in the window (dB).
    pub env_mean: f64,
    /// Population standard deviation of the log envelope in the window (dB).
    pub env_std: f64,
    /// Window maximum minus the recording's mean envelope level (dB).
    pub env_delta: f64,
}

impl SegmentRecord {
    /// Summarise an envelope window that starts at `time`.
    ///
    /// Returns `None` for an empty window.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_window(time: f64, window: &[f64], reference: f64) -> Option<Self> {
        if window.is_empty() {
            return None;
        }

        let n = window.len() as f64;
        let env_max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let env_mean = window.iter().sum::<f64>() / n;
        let variance = window
            .iter()
            .map(|v| (v - env_mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            time,
            env_max,
            env_mean,
            env_std: variance.sqrt(),
            env_delta: env_max - reference,
        })
    }
}

/// Time-ordered segment records for one recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTable {
    /// Recording the table was computed from.
    pub source: PathBuf,
    /// Sample rate the recording was analysed at.
    pub sample_rate: u32,
    /// Length of the recording in seconds.
    pub duration_secs: f64,
    /// Strategy that produced the onsets.
    pub strategy: StrategyKind,
    /// Minimum `env_delta` a record needed to be kept.
    pub db_delta_thresh: f64,
    /// Retained records in time order.
    pub records: Vec<SegmentRecord>,
}

impl SegmentTable {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no onset survived.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Onset times of the retained records.
    pub fn times(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.time).collect()
    }
}
