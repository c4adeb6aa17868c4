//! Pitch/amplitude traces consumed by the voicing strategy.
//!
//! Pitch tracking itself happens outside this crate. A tracker run leaves a
//! CSV trace with `time,frequency,amplitude` rows, either next to the audio
//! file (`<stem>.f0.csv`) or at an explicit path.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::hll::TRACE_SUFFIX;
use crate::error::{Error, Result};

/// Aligned time, frequency and amplitude sequences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchTrace {
    /// Frame times in seconds.
    pub times: Vec<f64>,
    /// Estimated fundamental frequency per frame.
    pub frequencies: Vec<f64>,
    /// Estimated amplitude per frame.
    pub amplitudes: Vec<f64>,
}

impl PitchTrace {
    /// Number of frames.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the trace has no frames.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Source of pitch/amplitude traces for an audio file.
pub trait PitchTracker {
    /// Produce the trace for `audio`.
    fn track(&self, audio: &Path) -> Result<PitchTrace>;
}

#[derive(Debug, Deserialize)]
struct TraceRow {
    time: f64,
    frequency: f64,
    amplitude: f64,
}

/// Reads traces from CSV files written by an external tracker.
#[derive(Debug, Clone, Default)]
pub struct CsvPitchTrack {
    /// Explicit trace file; when unset the sidecar next to the audio is used.
    pub trace_path: Option<PathBuf>,
}

impl CsvPitchTrack {
    /// Read every trace from the sidecar file next to its audio.
    pub fn sidecar() -> Self {
        Self { trace_path: None }
    }

    /// Always read the trace at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            trace_path: Some(path.into()),
        }
    }

    /// Sidecar trace path for an audio file.
    pub fn sidecar_path(audio: &Path) -> PathBuf {
        let stem = audio.file_stem().map_or_else(
            || std::borrow::Cow::Borrowed("trace"),
            |s| s.to_string_lossy(),
        );
        audio.with_file_name(format!("{stem}{TRACE_SUFFIX}"))
    }
}

impl PitchTracker for CsvPitchTrack {
    fn track(&self, audio: &Path) -> Result<PitchTrace> {
        let path = self
            .trace_path
            .clone()
            .unwrap_or_else(|| Self::sidecar_path(audio));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| Error::PitchTraceRead {
                path: path.clone(),
                source: Box::new(e),
            })?;

        let mut trace = PitchTrace::default();
        for (line_num, row) in reader.deserialize::<TraceRow>().enumerate() {
            let row = row.map_err(|e| Error::InvalidPitchTrace {
                path: path.clone(),
                message: format!("line {}: {e}", line_num + 2),
            })?;

            if trace.times.last().is_some_and(|&prev| row.time <= prev) {
                return Err(Error::InvalidPitchTrace {
                    path,
                    message: format!(
                        "line {}: time {} does not increase",
                        line_num + 2,
                        row.time
                    ),
                });
            }

            trace.times.push(row.time);
            trace.frequencies.push(row.frequency);
            trace.amplitudes.push(row.amplitude);
        }

        tracing::debug!("Loaded {} trace frames from {}", trace.len(), path.display());
        Ok(trace)
    }
}
