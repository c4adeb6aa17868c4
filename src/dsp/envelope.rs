//! Smoothed log-power envelope.

use super::filter::filtfilt;
use crate::constants::envelope::POWER_FLOOR;
use crate::error::{Error, Result};

/// Compute the smoothed log-power envelope of `samples`, in dB.
///
/// Each sample becomes `10 * log10(floor + s^2)` and the result is smoothed
/// with a unit-gain Hann window of `smoothing_length` points using
/// zero-phase filtering, so `output[i]` stays aligned with `samples[i]`.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `smoothing_length` is zero.
pub fn log_envelope(samples: &[f32], smoothing_length: usize) -> Result<Vec<f64>> {
    if smoothing_length == 0 {
        return Err(Error::invalid(
            "smoothing_length",
            "envelope smoothing length must be positive",
        ));
    }

    let log_power: Vec<f64> = samples
        .iter()
        .map(|&s| {
            let s = f64::from(s);
            10.0 * s.mul_add(s, POWER_FLOOR).log10()
        })
        .collect();

    Ok(filtfilt(&hann_window(smoothing_length), &log_power))
}

/// Symmetric Hann window normalized to unit sum.
///
/// The endpoints are zero, so lengths 1 and 2 degenerate to a plain
/// average rather than an all-zero window.
#[allow(clippy::cast_precision_loss)]
pub fn hann_window(length: usize) -> Vec<f64> {
    if length <= 2 {
        return vec![1.0 / length.max(1) as f64; length.max(1)];
    }

    let denom = (length - 1) as f64;
    let window: Vec<f64> = (0..length)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / denom).cos())
        .collect();
    let sum: f64 = window.iter().sum();
    window.into_iter().map(|w| w / sum).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_length_matches_input() {
        for len in [1, 2, 50, 301, 2205] {
            #[allow(clippy::cast_precision_loss)]
            let samples: Vec<f32> = (0..len).map(|i| (i as f32 * 0.3).sin()).collect();
            assert_eq!(log_envelope(&samples, 100).unwrap().len(), len);
        }
        assert!(log_envelope(&[], 100).unwrap().is_empty());
    }

    #[test]
    fn test_silence_sits_at_the_floor() {
        let env = log_envelope(&[0.0; 1000], 100).unwrap();
        for v in env {
            assert!((v + 45.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_loud_section_raises_envelope() {
        let mut samples = vec![0.0f32; 4000];
        for s in &mut samples[2000..3000] {
            *s = 0.5;
        }
        let env = log_envelope(&samples, 100).unwrap();
        assert!(env[2500] > -7.0);
        assert!(env[500] < -44.0);
    }

    #[test]
    fn test_zero_smoothing_rejected() {
        assert!(matches!(
            log_envelope(&[0.0; 10], 0),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_hann_window_is_normalized() {
        let w = hann_window(100);
        assert_eq!(w.len(), 100);
        assert_eq!(w[0], 0.0);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }
}
