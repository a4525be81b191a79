//! Gain-drift generators.
//!
//! Bolometer gains drift between retunings. These generators produce
//! per-sample gain curves starting at 1 and drifting towards an endpoint
//! drawn from `Normal(mean, std)`, with the timestream broken into
//! `nbreaks` retuning segments (gains reset to 1 after each break). Both
//! detectors of a pair share the same break endpoints, so the drift alone
//! never fakes a differential-gain signal unless explicitly requested via
//! [`DriftSign::Opposite`].

use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Relative sign of the two gain curves within a detector pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftSign {
    /// Both detectors of a pair drift identically.
    Same,
    /// The second detector of each pair mirrors the first (`g ↦ 2 − g`),
    /// injecting differential gain.
    Opposite,
}

/// Step gain curves: flat at 1, then flat at the drawn endpoint for the
/// second half of each retuning segment.
///
/// # Arguments
///
/// * `nbolos` - Number of bolometers (must be even: endpoints are drawn
///   per pair and shared by both members)
/// * `nsamples` - Length of the timestreams
/// * `mean` - Mean of the endpoint distribution (1 = no drift)
/// * `std` - Width of the endpoint distribution
/// * `nbreaks` - Number of retuning segments
/// * `sign` - Same or opposite drift within a pair
/// * `seed` - Seed for the endpoint draws
///
/// # Returns
///
/// `nbolos` gain curves of `nsamples` samples each.
///
/// # Panics
///
/// Panics if `nbolos` is odd or zero, or if `nbreaks` is zero.
pub fn step_drift(
    nbolos: usize,
    nsamples: usize,
    mean: f64,
    std: f64,
    nbreaks: usize,
    sign: DriftSign,
    seed: u64,
) -> Vec<Vec<f64>> {
    let mut gains = init_gains(nbolos, nsamples, nbreaks);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let length = nsamples / nbreaks;
    let sublength = nsamples / (2 * nbreaks);

    for pos in 0..nbreaks {
        let end_points = draw_pair_endpoints(&mut rng, nbolos / 2, mean, std);
        let shift = pos * length;

        // Second half of the segment sits at the endpoint.
        let start = (shift + sublength).min(nsamples);
        let stop = (shift + 2 * sublength).min(nsamples);
        for (bolo, row) in gains.iter_mut().enumerate() {
            let end = end_points[bolo / 2];
            for sample in &mut row[start..stop] {
                *sample = end;
            }
        }
    }

    apply_sign(&mut gains, sign);
    gains
}

/// Linear gain curves: ramp from 1 at the start of each retuning segment
/// to the drawn endpoint at its last sample.
///
/// Arguments, return value and panics are as for [`step_drift`].
pub fn linear_drift(
    nbolos: usize,
    nsamples: usize,
    mean: f64,
    std: f64,
    nbreaks: usize,
    sign: DriftSign,
    seed: u64,
) -> Vec<Vec<f64>> {
    let mut gains = init_gains(nbolos, nsamples, nbreaks);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let length = nsamples / nbreaks;

    for pos in 0..nbreaks {
        let end_points = draw_pair_endpoints(&mut rng, nbolos / 2, mean, std);
        let shift = pos * length;
        let stop = (shift + length).min(nsamples);

        for (bolo, row) in gains.iter_mut().enumerate() {
            let end = end_points[bolo / 2];
            for (t, sample) in row[shift..stop].iter_mut().enumerate() {
                // Interpolate 1 → end across [shift, shift + length - 1].
                *sample = if length > 1 {
                    1.0 + (end - 1.0) * t as f64 / (length - 1) as f64
                } else {
                    end
                };
            }
        }
    }

    apply_sign(&mut gains, sign);
    gains
}

/// Allocate the all-ones gain array, validating the common preconditions.
fn init_gains(nbolos: usize, nsamples: usize, nbreaks: usize) -> Vec<Vec<f64>> {
    assert!(
        nbolos > 0 && nbolos % 2 == 0,
        "gain drifts are drawn per pair; nbolos must be even and non-zero, got {nbolos}"
    );
    assert!(nbreaks > 0, "at least one retuning segment is required");
    vec![vec![1.0; nsamples]; nbolos]
}

/// One endpoint per pair, drawn from `Normal(mean, std)`.
fn draw_pair_endpoints(
    rng: &mut Xoshiro256PlusPlus,
    npair: usize,
    mean: f64,
    std: f64,
) -> Vec<f64> {
    (0..npair)
        .map(|_| {
            let z: f64 = StandardNormal.sample(rng);
            mean + std * z
        })
        .collect()
}

/// Mirror every odd row for [`DriftSign::Opposite`].
fn apply_sign(gains: &mut [Vec<f64>], sign: DriftSign) {
    if sign == DriftSign::Opposite {
        for row in gains.iter_mut().skip(1).step_by(2) {
            for sample in row.iter_mut() {
                *sample = 2.0 - *sample;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_drift_pattern() {
        let gains = step_drift(4, 8, 1.0, 0.05, 1, DriftSign::Same, 0);
        assert_eq!(gains.len(), 4);
        assert_eq!(gains[0].len(), 8);

        // One break: first half at 1, second half at the endpoint.
        let end = gains[0][4];
        assert_eq!(&gains[0][..4], &[1.0; 4]);
        assert_eq!(&gains[0][4..], &[end; 4]);
        assert!(end != 1.0);
    }

    #[test]
    fn test_pair_members_share_endpoints() {
        let gains = step_drift(6, 10, 1.0, 0.05, 2, DriftSign::Same, 7);
        for p in 0..3 {
            assert_eq!(gains[2 * p], gains[2 * p + 1], "pair {p}");
        }
        // Different pairs drift differently.
        assert_ne!(gains[0], gains[2]);
    }

    #[test]
    fn test_opposite_sign_mirrors_odd_rows() {
        let same = step_drift(4, 8, 1.0, 0.05, 1, DriftSign::Same, 3);
        let opposite = step_drift(4, 8, 1.0, 0.05, 1, DriftSign::Opposite, 3);

        for bolo in (0..4).step_by(2) {
            assert_eq!(same[bolo], opposite[bolo], "even rows unchanged");
        }
        for bolo in (1..4).step_by(2) {
            for t in 0..8 {
                assert!((opposite[bolo][t] - (2.0 - same[bolo][t])).abs() < 1e-15);
            }
        }
        // Differential gain: the pair means stay centred on 1.
        assert!((opposite[0][7] + opposite[1][7] - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_linear_drift_ramps_to_endpoint() {
        let gains = linear_drift(2, 9, 1.0, 0.05, 1, DriftSign::Same, 11);
        let end = gains[0][8];

        assert_eq!(gains[0][0], 1.0);
        assert!(end != 1.0);
        // Linear in between: second differences vanish.
        for t in 1..8 {
            let second = gains[0][t + 1] - 2.0 * gains[0][t] + gains[0][t - 1];
            assert!(second.abs() < 1e-12, "sample {t}");
        }
    }

    #[test]
    fn test_linear_drift_resets_after_break() {
        let gains = linear_drift(2, 12, 1.0, 0.2, 2, DriftSign::Same, 4);
        // Each segment restarts the ramp at 1.
        assert_eq!(gains[0][0], 1.0);
        assert_eq!(gains[0][6], 1.0);
    }

    #[test]
    fn test_drift_is_deterministic() {
        let a = step_drift(4, 16, 1.0, 0.05, 2, DriftSign::Same, 42);
        let b = step_drift(4, 16, 1.0, 0.05, 2, DriftSign::Same, 42);
        assert_eq!(a, b);

        let c = linear_drift(4, 16, 1.0, 0.05, 2, DriftSign::Same, 42);
        let d = linear_drift(4, 16, 1.0, 0.05, 2, DriftSign::Same, 42);
        assert_eq!(c, d);
    }

    #[test]
    #[should_panic(expected = "must be even")]
    fn test_odd_bolometer_count_panics() {
        step_drift(3, 8, 1.0, 0.05, 1, DriftSign::Same, 0);
    }

    #[test]
    #[should_panic(expected = "retuning segment")]
    fn test_zero_breaks_panics() {
        linear_drift(2, 8, 1.0, 0.05, 0, DriftSign::Same, 0);
    }
}
