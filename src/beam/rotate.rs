//! Rotation of beam-mismatch kernels.
//!
//! The six coefficients transform as a scalar (`d00`), a 2D vector
//! (`d10`, `d01`) and a symmetric rank-2 tensor (`d11`, `d20`, `d02`).
//! The tensor part mixes through the usual double-angle combinations of
//! `cos θ` and `sin θ`. Downstream identities (e.g. zero net leakage for a
//! matched pair) depend on these exact formulas.

use crate::types::{Kernel6, D00, D01, D02, D10, D11, D20};

/// Rotate a kernel by the angle `theta` (radians).
///
/// Pure function: the input kernel is never modified, a rotated copy is
/// returned. Rotating by `0.0` is the identity; rotating by `theta` and
/// then `-theta` round-trips up to floating-point error.
pub fn rotate_kernel(kernel: &Kernel6, theta: f64) -> Kernel6 {
    let c = theta.cos();
    let s = theta.sin();

    let mut out = Kernel6::zeros();
    out[D00] = kernel[D00];

    out[D10] = c * kernel[D10] - s * kernel[D01];
    out[D01] = s * kernel[D10] + c * kernel[D01];

    out[D20] = c * c * kernel[D20] - 2.0 * c * s * kernel[D11] + s * s * kernel[D02];
    out[D02] = s * s * kernel[D20] + 2.0 * c * s * kernel[D11] + c * c * kernel[D02];
    out[D11] = (c * c - s * s) * kernel[D11] + c * s * (kernel[D20] - kernel[D02]);

    out
}

/// Rotate a kernel by each angle of a slice, one rotated kernel per angle.
///
/// Elementwise broadcast of [`rotate_kernel`], used when a whole scan's
/// worth of orientation angles is processed at once.
pub fn rotate_kernel_many(kernel: &Kernel6, thetas: &[f64]) -> Vec<Kernel6> {
    thetas
        .iter()
        .map(|&theta| rotate_kernel(kernel, theta))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn sample_kernel() -> Kernel6 {
        Kernel6::new(0.7, -1.3, 2.1, 0.4, -0.9, 1.6)
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let k = sample_kernel();
        assert_eq!(rotate_kernel(&k, 0.0), k);
    }

    #[test]
    fn test_rotation_round_trip() {
        let k = sample_kernel();
        let back = rotate_kernel(&rotate_kernel(&k, 0.83), -0.83);
        for i in 0..6 {
            assert!((back[i] - k[i]).abs() < 1e-14, "coefficient {i}");
        }
    }

    #[test]
    fn test_scalar_part_is_invariant() {
        let k = sample_kernel();
        for theta in [0.3, 1.7, -2.4, PI] {
            assert_eq!(rotate_kernel(&k, theta)[D00], k[D00]);
        }
    }

    #[test]
    fn test_quarter_turn_of_vector_part() {
        // (d10, d01) rotates like an ordinary 2D vector: a quarter turn
        // maps it to (-d01, d10).
        let k = sample_kernel();
        let r = rotate_kernel(&k, FRAC_PI_2);
        assert!((r[D10] - (-k[D01])).abs() < 1e-15);
        assert!((r[D01] - k[D10]).abs() < 1e-15);
    }

    #[test]
    fn test_quarter_turn_of_tensor_part() {
        // A quarter turn swaps the two pure second derivatives and flips
        // the sign of the mixed one.
        let k = sample_kernel();
        let r = rotate_kernel(&k, FRAC_PI_2);
        assert!((r[D20] - k[D02]).abs() < 1e-15);
        assert!((r[D02] - k[D20]).abs() < 1e-15);
        assert!((r[D11] - (-k[D11])).abs() < 1e-15);
    }

    #[test]
    fn test_tensor_trace_is_invariant() {
        // d20 + d02 is the rotation-invariant (spin-0) combination.
        let k = sample_kernel();
        for theta in [0.1, 0.9, 2.2] {
            let r = rotate_kernel(&k, theta);
            assert!(((r[D20] + r[D02]) - (k[D20] + k[D02])).abs() < 1e-14);
        }
    }

    #[test]
    fn test_broadcast_matches_scalar_calls() {
        let k = sample_kernel();
        let thetas = [0.0, 0.5, -1.2, 3.1];
        let rotated = rotate_kernel_many(&k, &thetas);
        assert_eq!(rotated.len(), thetas.len());
        for (r, &theta) in rotated.iter().zip(thetas.iter()) {
            assert_eq!(*r, rotate_kernel(&k, theta));
        }
    }
}
