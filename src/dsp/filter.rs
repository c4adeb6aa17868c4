//! FIR filtering primitives.

use crate::error::{Error, Result};

/// Causal FIR filter with zero initial state.
///
/// `y[n] = sum_k b[k] * x[n - k]`, with samples before the start taken as
/// zero. Output length equals input length.
pub fn lfilter(b: &[f64], x: &[f64]) -> Vec<f64> {
    (0..x.len())
        .map(|n| {
            b.iter()
                .take(n + 1)
                .enumerate()
                .map(|(k, &coef)| coef * x[n - k])
                .sum()
        })
        .collect()
}

/// Zero-phase FIR filtering.
///
/// The signal is extended at both ends by odd reflection (up to three
/// kernel lengths), filtered forward and backward with steady-state initial
/// conditions, and cropped back. The result is aligned with the input and
/// has the same length.
pub fn filtfilt(b: &[f64], x: &[f64]) -> Vec<f64> {
    if x.is_empty() || b.is_empty() {
        return x.to_vec();
    }

    let pad = (3 * b.len()).min(x.len() - 1);
    let extended = odd_extend(x, pad);

    let mut forward = lfilter_steady(b, &extended);
    forward.reverse();
    let mut backward = lfilter_steady(b, &forward);
    backward.reverse();

    backward[pad..pad + x.len()].to_vec()
}

/// Median filter with an odd window, zero-padded at the edges.
pub fn medfilt(x: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 || window % 2 == 0 {
        return Err(Error::invalid(
            "median_len",
            format!("median window must be odd and positive, got {window}"),
        ));
    }

    let half = window / 2;
    let mut scratch = Vec::with_capacity(window);
    let filtered = (0..x.len())
        .map(|i| {
            scratch.clear();
            for j in 0..window {
                // Index into the zero-padded signal
                let value = (i + j)
                    .checked_sub(half)
                    .and_then(|idx| x.get(idx))
                    .copied()
                    .unwrap_or(0.0);
                scratch.push(value);
            }
            scratch.sort_by(f64::total_cmp);
            scratch[half]
        })
        .collect();

    Ok(filtered)
}

/// Causal FIR filter whose state starts as if `x[0]` had always been the input.
fn lfilter_steady(b: &[f64], x: &[f64]) -> Vec<f64> {
    let first = x.first().copied().unwrap_or(0.0);
    (0..x.len())
        .map(|n| {
            b.iter()
                .enumerate()
                .map(|(k, &coef)| coef * n.checked_sub(k).map_or(first, |idx| x[idx]))
                .sum()
        })
        .collect()
}

/// Extend `x` by `pad` samples of odd reflection at each end.
fn odd_extend(x: &[f64], pad: usize) -> Vec<f64> {
    let n = x.len();
    let (head, tail) = (x[0], x[n - 1]);

    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|i| 2.0 * head - x[i]));
    out.extend_from_slice(x);
    out.extend((1..=pad).map(|i| 2.0 * tail - x[n - 1 - i]));
    out
}
