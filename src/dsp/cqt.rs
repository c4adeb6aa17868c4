//! Constant-Q magnitude spectrum.
//!
//! A direct time-domain implementation: every bin owns a Hann-windowed
//! complex exponential whose length shrinks with frequency so that all bins
//! share the same quality factor. Frames are centred on multiples of the
//! hop, with zeros assumed outside the signal.

use serde::{Deserialize, Serialize};

use crate::constants::logcqt;
use crate::error::{Error, Result};

/// Layout of a constant-Q analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CqtParams {
    /// Samples between frame centres.
    pub hop_length: usize,
    /// Centre frequency of the lowest bin in Hz.
    pub fmin: f64,
    /// Number of bins per octave.
    pub bins_per_octave: usize,
    /// Total number of bins.
    pub n_bins: usize,
}

impl Default for CqtParams {
    fn default() -> Self {
        Self {
            hop_length: logcqt::HOP_LENGTH,
            fmin: logcqt::FMIN,
            bins_per_octave: logcqt::BINS_PER_OCTAVE,
            n_bins: logcqt::BINS_PER_OCTAVE * logcqt::OCTAVES,
        }
    }
}

impl CqtParams {
    /// Number of frames produced for a signal of `len` samples.
    pub const fn frame_count(&self, len: usize) -> usize {
        1 + len / self.hop_length
    }

    /// Centre frequency of bin `k`.
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_frequency(&self, k: usize) -> f64 {
        self.fmin * (k as f64 / self.bins_per_octave as f64).exp2()
    }

    fn validate(&self, sample_rate: u32) -> Result<()> {
        if self.hop_length == 0 {
            return Err(Error::invalid("hop_length", "hop length must be positive"));
        }
        if self.bins_per_octave == 0 || self.n_bins == 0 {
            return Err(Error::invalid("n_bins", "bin counts must be positive"));
        }
        if !self.fmin.is_finite() || self.fmin <= 0.0 {
            return Err(Error::invalid(
                "fmin",
                format!("minimum frequency must be positive, got {}", self.fmin),
            ));
        }
        let nyquist = f64::from(sample_rate) / 2.0;
        let top = self.bin_frequency(self.n_bins - 1);
        if top >= nyquist {
            return Err(Error::invalid(
                "n_bins",
                format!("highest bin ({top:.1} Hz) exceeds Nyquist ({nyquist:.1} Hz)"),
            ));
        }
        Ok(())
    }
}

/// A log-frequency spectral transform.
pub trait SpectralTransform {
    /// Magnitude spectrum as `n_bins` rows of `frame_count(len)` frames.
    fn magnitude(&self, signal: &[f32], sample_rate: u32, params: &CqtParams)
    -> Result<Vec<Vec<f64>>>;
}

/// Direct constant-Q transform.
///
/// Every frame correlates each bin's full kernel with the signal, so the
/// cost per frame is the summed kernel length: about a million
/// multiply-adds for the default 192 bins from 27.5 Hz at 22050 Hz. Long
/// recordings take seconds per minute of audio in release builds and far
/// longer in debug builds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantQ;

/// One bin's analysis kernel.
struct BinKernel {
    re: Vec<f32>,
    im: Vec<f32>,
}

impl ConstantQ {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn kernels(sample_rate: u32, params: &CqtParams) -> Vec<BinKernel> {
        let q = 1.0 / ((1.0 / params.bins_per_octave as f64).exp2() - 1.0);
        let sr = f64::from(sample_rate);

        (0..params.n_bins)
            .map(|k| {
                let freq = params.bin_frequency(k);
                let len = ((q * sr / freq).ceil() as usize).max(1);
                let window = super::hann_window(len);
                let (re, im) = window
                    .iter()
                    .enumerate()
                    .map(|(n, &w)| {
                        let phase = -2.0 * std::f64::consts::PI * freq * n as f64 / sr;
                        ((w * phase.cos()) as f32, (w * phase.sin()) as f32)
                    })
                    .unzip();
                BinKernel { re, im }
            })
            .collect()
    }
}

impl SpectralTransform for ConstantQ {
    fn magnitude(
        &self,
        signal: &[f32],
        sample_rate: u32,
        params: &CqtParams,
    ) -> Result<Vec<Vec<f64>>> {
        params.validate(sample_rate)?;

        let kernels = Self::kernels(sample_rate, params);
        let frames = params.frame_count(signal.len());
        tracing::debug!(
            "Constant-Q: {} bins x {} frames (hop {})",
            params.n_bins,
            frames,
            params.hop_length
        );

        let spectrum = kernels
            .iter()
            .map(|kernel| {
                let len = kernel.re.len();
                let half = len / 2;
                (0..frames)
                    .map(|t| {
                        let centre = t * params.hop_length;
                        let (mut re, mut im) = (0.0f32, 0.0f32);
                        for n in 0..len {
                            // Kernel tap n lines up with sample centre + n - half
                            let Some(idx) = (centre + n).checked_sub(half) else {
                                continue;
                            };
                            let Some(&s) = signal.get(idx) else {
                                break;
                            };
                            re += s * kernel.re[n];
                            im += s * kernel.im[n];
                        }
                        f64::from(re.hypot(im))
                    })
                    .collect()
            })
            .collect();

        Ok(spectrum)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn small_params() -> CqtParams {
        CqtParams {
            hop_length: 512,
            fmin: 110.0,
            bins_per_octave: 12,
            n_bins: 36,
        }
    }

    #[test]
    fn test_shape() {
        let signal = vec![0.0f32; 4096];
        let params = small_params();
        let spec = ConstantQ.magnitude(&signal, 22050, &params).unwrap();
        assert_eq!(spec.len(), 36);
        assert!(spec.iter().all(|row| row.len() == params.frame_count(4096)));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let params = small_params();
        // 440 Hz is two octaves above fmin: bin 24
        #[allow(clippy::cast_precision_loss)]
        let signal: Vec<f32> = (0..22050)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 22050.0).sin())
            .collect();
        let spec = ConstantQ.magnitude(&signal, 22050, &params).unwrap();
        let mid = params.frame_count(signal.len()) / 2;
        let best = (0..params.n_bins)
            .max_by(|&a, &b| spec[a][mid].total_cmp(&spec[b][mid]))
            .unwrap();
        assert_eq!(best, 24);
    }

    #[test]
    fn test_rejects_bins_above_nyquist() {
        let params = CqtParams {
            n_bins: 24 * 10,
            ..CqtParams::default()
        };
        assert!(ConstantQ.magnitude(&[0.0; 100], 22050, &params).is_err());
    }

    #[test]
    fn test_default_layout_fits_22050() {
        assert!(CqtParams::default().validate(22050).is_ok());
        assert_eq!(CqtParams::default().n_bins, 192);
    }
}
