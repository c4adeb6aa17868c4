//! Onset segmentation with energy validation.
//!
//! A [`Segmenter`] runs an onset strategy over a recording and keeps only
//! the onsets whose following envelope window rises far enough above the
//! recording's mean level.

mod record;

pub use record::{SegmentRecord, SegmentTable};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::{Waveform, load_waveform};
use crate::constants::{DEFAULT_DB_DELTA_THRESH, DEFAULT_SAMPLE_RATE, DEFAULT_WINDOW_SECS, envelope};
use crate::dsp::log_envelope;
use crate::error::{Error, Result};
use crate::onset::{Backends, OnsetInput, OnsetStrategy};

/// Segmentation settings shared by all strategies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentParams {
    /// Minimum envelope rise (dB) for an onset to be kept.
    pub db_delta_thresh: f64,
    /// Rate recordings are resampled to before analysis.
    pub sample_rate: u32,
    /// Hann smoothing length of the validation envelope.
    pub envelope_smoothing: usize,
    /// Length of the envelope window analysed after each onset, in seconds.
    pub window_secs: f64,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            db_delta_thresh: DEFAULT_DB_DELTA_THRESH,
            sample_rate: DEFAULT_SAMPLE_RATE,
            envelope_smoothing: envelope::DEFAULT_SMOOTHING,
            window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

/// Detects and validates segments in recordings.
#[derive(Debug)]
pub struct Segmenter {
    strategy: OnsetStrategy,
    params: SegmentParams,
    backends: Backends,
}

impl Segmenter {
    /// Create a segmenter with the default collaborators.
    pub fn new(strategy: OnsetStrategy, params: SegmentParams) -> Self {
        Self {
            strategy,
            params,
            backends: Backends::default(),
        }
    }

    /// Replace the pitch tracker and spectral transform.
    #[must_use]
    pub fn with_backends(mut self, backends: Backends) -> Self {
        self.backends = backends;
        self
    }

    /// The configured strategy.
    pub const fn strategy(&self) -> &OnsetStrategy {
        &self.strategy
    }

    /// The segmentation settings.
    pub const fn params(&self) -> &SegmentParams {
        &self.params
    }

    /// Load `path` as mono at the configured rate and segment it.
    pub fn segment(&self, path: &Path) -> Result<SegmentTable> {
        if self.params.sample_rate == 0 {
            return Err(Error::invalid("sample_rate", "sample rate must be positive"));
        }
        let waveform = load_waveform(path, self.params.sample_rate)?;
        self.segment_waveform(path, &waveform)
    }

    /// Segment an already-decoded recording.
    ///
    /// `path` is passed to strategies that work from the file rather than
    /// the samples.
    pub fn segment_waveform(&self, path: &Path, waveform: &Waveform) -> Result<SegmentTable> {
        let onsets = self.strategy.detect(&OnsetInput { path, waveform }, &self.backends)?;
        let candidates = self.candidates(waveform, &onsets)?;

        let thresh = self.params.db_delta_thresh;
        let records: Vec<SegmentRecord> = candidates
            .into_iter()
            .filter(|rec| rec.env_delta > thresh)
            .collect();

        tracing::info!(
            "{}: kept {} of {} onsets ({} strategy, delta > {} dB)",
            path.display(),
            records.len(),
            onsets.len(),
            self.strategy.kind(),
            thresh
        );

        Ok(SegmentTable {
            source: path.to_path_buf(),
            sample_rate: waveform.sample_rate,
            duration_secs: waveform.duration_secs(),
            strategy: self.strategy.kind(),
            db_delta_thresh: thresh,
            records,
        })
    }

    /// Envelope statistics for every onset with a non-empty window, unfiltered.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn candidates(&self, waveform: &Waveform, onsets: &[f64]) -> Result<Vec<SegmentRecord>> {
        if !self.params.window_secs.is_finite() || self.params.window_secs <= 0.0 {
            return Err(Error::invalid(
                "window_secs",
                format!("window must be positive, got {}", self.params.window_secs),
            ));
        }
        if onsets.is_empty() {
            return Ok(Vec::new());
        }

        let env = log_envelope(&waveform.samples, self.params.envelope_smoothing)?;
        let reference = env.iter().sum::<f64>() / env.len().max(1) as f64;
        let sr = f64::from(waveform.sample_rate);
        let window_len = (self.params.window_secs * sr) as usize;

        let records = onsets
            .iter()
            .filter_map(|&time| {
                let start = ((time * sr) as usize).min(env.len());
                let end = start.saturating_add(window_len).min(env.len());
                SegmentRecord::from_window(time, &env[start..end], reference)
            })
            .collect();

        Ok(records)
    }
}
