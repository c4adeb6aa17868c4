//! Peak picking on novelty curves.
//!
//! A frame `n` is reported as a peak when
//!
//! 1. `x[n]` is non-zero and equals the maximum of `x[n - pre_max .. n + post_max]`,
//! 2. `x[n] >= mean(x[n - pre_avg .. n + post_avg]) + delta`,
//! 3. more than `wait` frames have passed since the previous peak.
//!
//! Windows are truncated at the signal boundaries. Peaks are scanned left
//! to right, so among close candidates the earliest wins.

use serde::{Deserialize, Serialize};

use crate::constants::onset_detect;

/// Window and threshold settings for [`peak_pick`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakPickParams {
    /// Frames before `n` covered by the max filter.
    pub pre_max: usize,
    /// Frames after `n` covered by the max filter.
    pub post_max: usize,
    /// Frames before `n` covered by the moving average.
    pub pre_avg: usize,
    /// Frames after `n` covered by the moving average.
    pub post_avg: usize,
    /// Minimum height above the moving average.
    pub delta: f64,
    /// Minimum spacing between peaks, in frames.
    pub wait: usize,
}

impl Default for PeakPickParams {
    fn default() -> Self {
        Self {
            pre_max: onset_detect::PRE_MAX,
            post_max: onset_detect::POST_MAX,
            pre_avg: onset_detect::PRE_AVG,
            post_avg: onset_detect::POST_AVG,
            delta: onset_detect::DELTA,
            wait: onset_detect::WAIT,
        }
    }
}

impl PeakPickParams {
    /// Override the peak height threshold.
    #[must_use]
    pub const fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Override the minimum peak spacing.
    #[must_use]
    pub const fn with_wait(mut self, wait: usize) -> Self {
        self.wait = wait;
        self
    }
}

/// Return the strictly increasing indices of peaks in `x`.
pub fn peak_pick(x: &[f64], params: &PeakPickParams) -> Vec<usize> {
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }

    // Prefix sums give O(1) window means
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    let mut acc = 0.0;
    for &v in x {
        acc += v;
        prefix.push(acc);
    }

    let mut peaks = Vec::new();
    let mut last: Option<usize> = None;

    for i in 0..n {
        let value = x[i];
        if value == 0.0 {
            continue;
        }

        let max_lo = i.saturating_sub(params.pre_max);
        let max_hi = (i + params.post_max).min(n).max(i + 1);
        let local_max = x[max_lo..max_hi]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        if value != local_max {
            continue;
        }

        let avg_lo = i.saturating_sub(params.pre_avg);
        let avg_hi = (i + params.post_avg).min(n).max(i + 1);
        #[allow(clippy::cast_precision_loss)]
        let mean = (prefix[avg_hi] - prefix[avg_lo]) / (avg_hi - avg_lo) as f64;
        if value < mean + params.delta {
            continue;
        }

        if last.is_some_and(|prev| i <= prev + params.wait) {
            continue;
        }

        peaks.push(i);
        last = Some(i);
    }

    tracing::trace!("Picked {} peaks from {} frames", peaks.len(), n);
    peaks
}

/// Normalize a novelty curve to `[0, 1]` and pick its peaks.
///
/// An all-zero curve has no onsets and yields an empty result.
pub fn onset_detect(novelty: &[f64], params: &PeakPickParams) -> Vec<usize> {
    if novelty.iter().all(|&v| v == 0.0) {
        return Vec::new();
    }

    let min = novelty.iter().copied().fold(f64::INFINITY, f64::min);
    let shifted: Vec<f64> = novelty.iter().map(|&v| v - min).collect();
    let max = shifted.iter().copied().fold(0.0, f64::max);
    if max <= 0.0 {
        return Vec::new();
    }
    let normalized: Vec<f64> = shifted.iter().map(|&v| v / max).collect();

    peak_pick(&normalized, params)
}
