//! Voicing-based onsets from a pitch/amplitude trace.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::tracker::PitchTracker;
use crate::constants::{self, hll};
use crate::dsp::{PeakPickParams, edge_kernel, lfilter, medfilt, onset_detect};
use crate::error::{Error, Result};

/// Tuning for the voicing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HllParams {
    /// Median filter length for the frequency and amplitude traces (odd).
    pub median_len: usize,
    /// A frame is voiced when `frequency * amplitude` exceeds this.
    pub threshold: f64,
    /// Peak-picking threshold above the local mean of the rising edge.
    pub delta: f64,
    /// Minimum spacing between onsets, in trace frames.
    pub wait: usize,
}

impl Default for HllParams {
    fn default() -> Self {
        Self {
            median_len: hll::MEDIAN_LEN,
            threshold: hll::THRESHOLD,
            delta: constants::onset_detect::DELTA,
            wait: hll::WAIT,
        }
    }
}

/// Detect onsets where the trace switches from unvoiced to voiced.
///
/// The trace is loaded through `tracker` from the audio path; the decoded
/// samples are not consulted.
pub fn hll_onsets(audio: &Path, tracker: &dyn PitchTracker, params: &HllParams) -> Result<Vec<f64>> {
    let trace = tracker.track(audio)?;
    if trace.frequencies.len() != trace.len() || trace.amplitudes.len() != trace.len() {
        return Err(Error::InvalidPitchTrace {
            path: audio.to_path_buf(),
            message: "time, frequency and amplitude lengths differ".to_string(),
        });
    }
    if trace.is_empty() {
        return Ok(Vec::new());
    }

    let frequencies = medfilt(&trace.frequencies, params.median_len)?;
    let amplitudes = medfilt(&trace.amplitudes, params.median_len)?;

    let voicing: Vec<f64> = frequencies
        .iter()
        .zip(&amplitudes)
        .map(|(f, a)| if f * a > params.threshold { 1.0 } else { 0.0 })
        .collect();

    let kernel = edge_kernel(hll::KERNEL_LENGTH, hll::KERNEL_SPREAD, 1)?;
    let rising: Vec<f64> = lfilter(&kernel, &voicing)
        .into_iter()
        .map(|v| v.max(0.0))
        .collect();

    let peak_params = PeakPickParams::default()
        .with_delta(params.delta)
        .with_wait(params.wait);
    let peaks = onset_detect(&rising, &peak_params);
    tracing::debug!(
        "Voicing strategy: {} voiced of {} frames, {} onsets",
        voicing.iter().filter(|&&v| v > 0.0).count(),
        voicing.len(),
        peaks.len()
    );

    Ok(peaks.into_iter().map(|idx| trace.times[idx]).collect())
}
