//! Leakage injection under the two coupling models.
//!
//! Both models add, to each detector's timestream, a weighted sum of the
//! *original* timestreams of its neighbours: every coupling is computed from
//! one immutable pre-mutation snapshot, never from partially updated data,
//! so results do not depend on detector iteration order.
//!
//! Each model comes as an in-place function and an `_into` variant that
//! writes into a caller-provided buffer and leaves the input untouched.

use crate::config::CrosstalkConfig;

use super::network::{draw_cross_amplitudes, SquidGroups};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-target list of `(source detector, weight)` couplings.
type Couplings = Vec<Vec<(usize, f64)>>;

/// Introduce leakage between neighbouring bolometers within each SQUID.
///
/// Detectors `i`, `j` in the same SQUID couple iff
/// `0 < |channel(i) − channel(j)| ≤ radius`, with weight
/// `cross_amp[j] / |channel(i) − channel(j)|^beta`. Timestreams are
/// modified in place.
///
/// A `radius` exceeding the channel span of a SQUID is not an error:
/// separations beyond the existing channels simply never occur.
///
/// # Arguments
///
/// * `data` - Timestream array, one row per detector
/// * `groups` - SQUID grouping of the detectors (see [`SquidGroups`])
/// * `config` - Leakage distribution and coupling parameters
///
/// # Panics
///
/// Panics if the grouping does not describe exactly `data.len()` detectors
/// or if the rows of `data` differ in length.
pub fn inject_intra_squid(data: &mut [Vec<f64>], groups: &SquidGroups, config: &CrosstalkConfig) {
    let snapshot = data.to_vec();
    let couplings = intra_squid_couplings(groups, config, data.len());
    apply_couplings(&snapshot, &couplings, data);
}

/// Like [`inject_intra_squid`], but write the modified timestreams into
/// `out` and leave `data` untouched.
///
/// # Panics
///
/// Panics on the same conditions as [`inject_intra_squid`], or if `out`
/// does not have the same shape as `data`.
pub fn inject_intra_squid_into(
    data: &[Vec<f64>],
    groups: &SquidGroups,
    config: &CrosstalkConfig,
    out: &mut [Vec<f64>],
) {
    assert_shape_matches(data, out);
    let couplings = intra_squid_couplings(groups, config, data.len());
    apply_couplings(data, &couplings, out);
}

/// Introduce leakage between bolometers in *different* SQUIDs.
///
/// Every cross-SQUID detector pair couples with the flat weight
/// `cross_amp[j] / squid_attenuation` (full bipartite coupling, O(N²) in
/// the number of detectors). Same-SQUID pairs never couple under this
/// model, so a single-SQUID layout is a no-op. Timestreams are modified
/// in place.
///
/// # Panics
///
/// Panics if the grouping does not describe exactly `data.len()` detectors
/// or if the rows of `data` differ in length.
pub fn inject_inter_squid(data: &mut [Vec<f64>], groups: &SquidGroups, config: &CrosstalkConfig) {
    let snapshot = data.to_vec();
    let couplings = inter_squid_couplings(groups, config, data.len());
    apply_couplings(&snapshot, &couplings, data);
}

/// Like [`inject_inter_squid`], but write the modified timestreams into
/// `out` and leave `data` untouched.
///
/// # Panics
///
/// Panics on the same conditions as [`inject_inter_squid`], or if `out`
/// does not have the same shape as `data`.
pub fn inject_inter_squid_into(
    data: &[Vec<f64>],
    groups: &SquidGroups,
    config: &CrosstalkConfig,
    out: &mut [Vec<f64>],
) {
    assert_shape_matches(data, out);
    let couplings = inter_squid_couplings(groups, config, data.len());
    apply_couplings(data, &couplings, out);
}

/// Build the intra-SQUID weighted adjacency.
///
/// The full amplitude vector is materialized up front so that the draw
/// order (and hence determinism) never depends on how the couplings are
/// later applied.
fn intra_squid_couplings(
    groups: &SquidGroups,
    config: &CrosstalkConfig,
    n_detectors: usize,
) -> Couplings {
    assert_eq!(
        groups.n_detectors(),
        n_detectors,
        "SQUID grouping describes {} detectors but the timestream array has {}",
        groups.n_detectors(),
        n_detectors
    );

    let cross_amp = draw_cross_amplitudes(n_detectors, config.mu, config.sigma, config.seed);

    let mut couplings: Couplings = vec![Vec::new(); n_detectors];
    for members in groups.iter() {
        for &(channel, target) in members {
            for &(other_channel, source) in members {
                let separation = (channel - other_channel).unsigned_abs() as usize;
                if separation > 0 && separation <= config.radius {
                    let weight = cross_amp[source] / (separation as f64).powf(config.beta);
                    couplings[target].push((source, weight));
                }
            }
        }
    }
    couplings
}

/// Build the inter-SQUID weighted adjacency (full bipartite across groups).
fn inter_squid_couplings(
    groups: &SquidGroups,
    config: &CrosstalkConfig,
    n_detectors: usize,
) -> Couplings {
    assert_eq!(
        groups.n_detectors(),
        n_detectors,
        "SQUID grouping describes {} detectors but the timestream array has {}",
        groups.n_detectors(),
        n_detectors
    );

    let cross_amp = draw_cross_amplitudes(n_detectors, config.mu, config.sigma, config.seed);

    let mut couplings: Couplings = vec![Vec::new(); n_detectors];
    for (g1, members) in groups.iter().enumerate() {
        for &(_, target) in members {
            for (g2, others) in groups.iter().enumerate() {
                if g1 == g2 {
                    continue;
                }
                for &(_, source) in others {
                    couplings[target].push((source, cross_amp[source] / config.squid_attenuation));
                }
            }
        }
    }
    couplings
}

/// Apply a weighted adjacency to a snapshot of the timestreams.
///
/// `out[i] = snapshot[i] + Σ_j weight_ij · snapshot[j]`. Every row of `out`
/// is written in full, so `out` may alias the array `snapshot` was cloned
/// from (the in-place path) or be a separate buffer (the `_into` path).
fn apply_couplings(snapshot: &[Vec<f64>], couplings: &Couplings, out: &mut [Vec<f64>]) {
    let nsamples = snapshot.first().map_or(0, Vec::len);
    for row in snapshot {
        assert_eq!(row.len(), nsamples, "timestreams must all have the same length");
    }

    #[cfg(feature = "parallel")]
    out.par_iter_mut()
        .enumerate()
        .for_each(|(i, row)| fill_row(i, row, snapshot, &couplings[i]));

    #[cfg(not(feature = "parallel"))]
    for (i, row) in out.iter_mut().enumerate() {
        fill_row(i, row, snapshot, &couplings[i]);
    }
}

/// Fill one output row from the snapshot and its coupling list.
fn fill_row(i: usize, row: &mut [f64], snapshot: &[Vec<f64>], couplings: &[(usize, f64)]) {
    row.copy_from_slice(&snapshot[i]);
    for &(source, weight) in couplings {
        let neighbour = &snapshot[source];
        for (sample, &value) in row.iter_mut().zip(neighbour.iter()) {
            *sample += weight * value;
        }
    }
}

/// Check that `out` mirrors the shape of `data` row by row.
fn assert_shape_matches(data: &[Vec<f64>], out: &[Vec<f64>]) {
    assert_eq!(
        data.len(),
        out.len(),
        "output buffer must have one row per detector"
    );
    for (i, (src, dst)) in data.iter().zip(out.iter()).enumerate() {
        assert_eq!(
            src.len(),
            dst.len(),
            "output row {i} must match the input timestream length"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_squid_layout() -> (Vec<&'static str>, Vec<i32>) {
        // 2 SQUIDs of 2 bolometers each, channels 0/1 within each SQUID.
        (vec!["Sq0", "Sq0", "Sq1", "Sq1"], vec![0, 1, 0, 1])
    }

    fn test_data() -> Vec<Vec<f64>> {
        vec![
            vec![40.95, 1.0, -2.0],
            vec![3.0, 0.5, 7.0],
            vec![-1.0, 2.5, 0.0],
            vec![10.0, -4.0, 1.5],
        ]
    }

    #[test]
    fn test_intra_squid_matches_closed_form() {
        let (squids, channels) = two_squid_layout();
        let groups = SquidGroups::from_ids(&squids, &channels);
        let config = CrosstalkConfig::default();

        let mut data = test_data();
        let original = data.clone();
        inject_intra_squid(&mut data, &groups, &config);

        // With radius = 1 and channels {0, 1}, each detector couples only
        // with its SQUID partner at separation 1, so the result is exactly
        // ts[i] + cross_amp[partner] * ts[partner].
        let amp = draw_cross_amplitudes(4, config.mu, config.sigma, config.seed);
        let partner = [1usize, 0, 3, 2];
        for i in 0..4 {
            for t in 0..3 {
                let expected = original[i][t] + amp[partner[i]] * original[partner[i]][t];
                assert_eq!(data[i][t], expected, "detector {i}, sample {t}");
            }
        }
    }

    #[test]
    fn test_intra_squid_radius_zero_is_noop() {
        let (squids, channels) = two_squid_layout();
        let groups = SquidGroups::from_ids(&squids, &channels);
        let config = CrosstalkConfig {
            radius: 0,
            ..CrosstalkConfig::default()
        };

        let mut data = test_data();
        let original = data.clone();
        inject_intra_squid(&mut data, &groups, &config);
        assert_eq!(data, original);
    }

    #[test]
    fn test_intra_squid_singleton_squids_are_noop() {
        let squids = ["Sq0", "Sq1", "Sq2", "Sq3"];
        let channels = [0, 0, 0, 0];
        let groups = SquidGroups::from_ids(&squids, &channels);

        let mut data = test_data();
        let original = data.clone();
        inject_intra_squid(&mut data, &groups, &CrosstalkConfig::default());
        assert_eq!(data, original);
    }

    #[test]
    fn test_intra_squid_oversized_radius_degrades_silently() {
        let (squids, channels) = two_squid_layout();
        let groups = SquidGroups::from_ids(&squids, &channels);

        // radius far beyond the SQUID's channel span: only separation 1
        // exists, so the result equals the radius = 1 injection.
        let wide = CrosstalkConfig {
            radius: 100,
            ..CrosstalkConfig::default()
        };
        let narrow = CrosstalkConfig::default();

        let mut a = test_data();
        let mut b = test_data();
        inject_intra_squid(&mut a, &groups, &wide);
        inject_intra_squid(&mut b, &groups, &narrow);
        assert_eq!(a, b);
    }

    #[test]
    fn test_inter_squid_single_squid_is_noop() {
        let squids = ["Sq0", "Sq0", "Sq0", "Sq0"];
        let channels = [0, 1, 2, 3];
        let groups = SquidGroups::from_ids(&squids, &channels);

        let mut data = test_data();
        let original = data.clone();
        inject_inter_squid(&mut data, &groups, &CrosstalkConfig::default());
        assert_eq!(data, original);
    }

    #[test]
    fn test_inter_squid_matches_closed_form() {
        let (squids, channels) = two_squid_layout();
        let groups = SquidGroups::from_ids(&squids, &channels);
        let config = CrosstalkConfig::default();

        let mut data = test_data();
        let original = data.clone();
        inject_inter_squid(&mut data, &groups, &config);

        let amp = draw_cross_amplitudes(4, config.mu, config.sigma, config.seed);
        // Detector 0 (Sq0) couples with detectors 2 and 3 (Sq1), flat
        // attenuation, summed in group order.
        for t in 0..3 {
            let expected = original[0][t]
                + amp[2] / config.squid_attenuation * original[2][t]
                + amp[3] / config.squid_attenuation * original[3][t];
            assert_eq!(data[0][t], expected);
        }
    }

    #[test]
    fn test_into_variant_preserves_input() {
        let (squids, channels) = two_squid_layout();
        let groups = SquidGroups::from_ids(&squids, &channels);
        let config = CrosstalkConfig::default();

        let data = test_data();
        let mut out = vec![vec![0.0; 3]; 4];
        inject_intra_squid_into(&data, &groups, &config, &mut out);

        assert_eq!(data, test_data(), "input must stay untouched");

        let mut in_place = test_data();
        inject_intra_squid(&mut in_place, &groups, &config);
        assert_eq!(out, in_place, "both variants must agree exactly");
    }

    #[test]
    fn test_injection_is_deterministic() {
        let (squids, channels) = two_squid_layout();
        let groups = SquidGroups::from_ids(&squids, &channels);
        let config = CrosstalkConfig::default();

        let mut a = test_data();
        let mut b = test_data();
        inject_intra_squid(&mut a, &groups, &config);
        inject_intra_squid(&mut b, &groups, &config);
        assert_eq!(a, b);

        let mut c = test_data();
        let mut d = test_data();
        inject_inter_squid(&mut c, &groups, &config);
        inject_inter_squid(&mut d, &groups, &config);
        assert_eq!(c, d);
    }

    #[test]
    #[should_panic(expected = "one row per detector")]
    fn test_into_variant_rejects_wrong_shape() {
        let (squids, channels) = two_squid_layout();
        let groups = SquidGroups::from_ids(&squids, &channels);
        let data = test_data();
        let mut out = vec![vec![0.0; 3]; 3];
        inject_intra_squid_into(&data, &groups, &CrosstalkConfig::default(), &mut out);
    }

    #[test]
    #[should_panic(expected = "timestream array has")]
    fn test_layout_detector_count_mismatch_panics() {
        let squids = ["Sq0", "Sq0"];
        let channels = [0, 1];
        let groups = SquidGroups::from_ids(&squids, &channels);
        let mut data = test_data(); // 4 rows, grouping has 2
        inject_intra_squid(&mut data, &groups, &CrosstalkConfig::default());
    }
}
