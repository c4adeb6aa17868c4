//! Envelope-novelty onsets.

use serde::{Deserialize, Serialize};

use crate::audio::Waveform;
use crate::constants::{envelope, envelope_onsets};
use crate::dsp::{PeakPickParams, edge_kernel, lfilter, log_envelope, normalize_l1, peak_pick};
use crate::error::{Error, Result};

/// Tuning for the envelope strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeParams {
    /// Hann smoothing length of the log envelope, in samples.
    pub smoothing_length: usize,
    /// Decimation applied to the smoothed envelope.
    pub hop: usize,
    /// Edge kernel length, in decimated frames.
    pub kernel_length: usize,
    /// Edge kernel spread.
    pub spread: f64,
    /// Frames before a peak it must dominate.
    pub pre_max: usize,
    /// Frames after a peak it must dominate.
    pub post_max: usize,
    /// Averaging window before a peak.
    pub pre_avg: usize,
    /// Averaging window after a peak.
    pub post_avg: usize,
    /// Minimum height above the local average.
    pub delta: f64,
    /// Minimum spacing between onsets, in decimated frames.
    pub wait: usize,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            smoothing_length: envelope::DEFAULT_SMOOTHING,
            hop: envelope_onsets::HOP,
            kernel_length: envelope_onsets::KERNEL_LENGTH,
            spread: envelope_onsets::KERNEL_SPREAD,
            pre_max: envelope_onsets::PRE_MAX,
            post_max: envelope_onsets::POST_MAX,
            pre_avg: envelope_onsets::PRE_AVG,
            post_avg: envelope_onsets::POST_AVG,
            delta: envelope_onsets::DELTA,
            wait: envelope_onsets::WAIT,
        }
    }
}

impl EnvelopeParams {
    const fn peak_params(&self) -> PeakPickParams {
        PeakPickParams {
            pre_max: self.pre_max,
            post_max: self.post_max,
            pre_avg: self.pre_avg,
            post_avg: self.post_avg,
            delta: self.delta,
            wait: self.wait,
        }
    }
}

/// Detect onsets as sharp rises of the decimated log envelope.
///
/// Unlike the other strategies the novelty curve is not rescaled before
/// peak picking, so `delta` is an absolute level and a silent input yields
/// no onsets.
pub fn envelope_onsets(waveform: &Waveform, params: &EnvelopeParams) -> Result<Vec<f64>> {
    if params.hop == 0 {
        return Err(Error::invalid("hop", "decimation hop must be positive"));
    }

    let env = log_envelope(&waveform.samples, params.smoothing_length)?;
    let floor = env.iter().copied().fold(f64::INFINITY, f64::min);
    let decimated: Vec<f64> = env.iter().step_by(params.hop).map(|v| v - floor).collect();

    let mut kernel = edge_kernel(params.kernel_length, params.spread, 1)?;
    normalize_l1(&mut kernel);

    let rising: Vec<f64> = lfilter(&kernel, &decimated)
        .into_iter()
        .map(|v| v.max(0.0))
        .collect();

    let peaks = peak_pick(&rising, &params.peak_params());
    tracing::debug!(
        "Envelope strategy: {} frames, {} onsets",
        rising.len(),
        peaks.len()
    );

    let sr = f64::from(waveform.sample_rate);
    #[allow(clippy::cast_precision_loss)]
    let times = peaks
        .into_iter()
        .map(|frame| (frame * params.hop) as f64 / sr)
        .collect();
    Ok(times)
}
