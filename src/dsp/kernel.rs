//! Derivative-of-Gaussian edge kernels.

use crate::error::{Error, Result};

/// FIR filter coefficients.
pub type Kernel = Vec<f64>;

/// Build a derivative-of-Gaussian kernel.
///
/// `length` points are sampled evenly over `[-spread, spread]` standard
/// deviations and the `order`-th derivative of a unit Gaussian is evaluated
/// there. Order 0 is a smoothing window; order 1 is positive on its leading
/// half, so a rising step filtered causally gives a positive response.
///
/// The result is not normalized; callers scale it as they need.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `length` is zero or `spread` is
/// not a positive finite number.
pub fn edge_kernel(length: usize, spread: f64, order: u32) -> Result<Kernel> {
    if length == 0 {
        return Err(Error::invalid("length", "kernel length must be positive"));
    }
    if !spread.is_finite() || spread <= 0.0 {
        return Err(Error::invalid(
            "spread",
            format!("kernel spread must be positive, got {spread}"),
        ));
    }

    let sign = if order % 2 == 0 { 1.0 } else { -1.0 };
    let kernel = sample_points(length, spread)
        .map(|x| sign * hermite(order, x) * (-0.5 * x * x).exp())
        .collect();

    Ok(kernel)
}

/// Scale a kernel so its absolute values sum to one.
///
/// A kernel that is identically zero is returned unchanged.
pub fn normalize_l1(kernel: &mut [f64]) {
    let norm: f64 = kernel.iter().map(|c| c.abs()).sum();
    if norm > 0.0 {
        for c in kernel.iter_mut() {
            *c /= norm;
        }
    }
}

/// Evenly spaced abscissae over `[-spread, spread]`.
#[allow(clippy::cast_precision_loss)]
fn sample_points(length: usize, spread: f64) -> impl Iterator<Item = f64> {
    let step = if length > 1 {
        2.0 * spread / (length - 1) as f64
    } else {
        0.0
    };
    let start = if length > 1 { -spread } else { 0.0 };
    (0..length).map(move |i| (i as f64).mul_add(step, start))
}

/// Probabilists' Hermite polynomial `He_n(x)`.
fn hermite(order: u32, x: f64) -> f64 {
    let (mut prev, mut cur) = (1.0, x);
    if order == 0 {
        return prev;
    }
    for n in 1..order {
        let next = x.mul_add(cur, -f64::from(n) * prev);
        prev = cur;
        cur = next;
    }
    cur
}
