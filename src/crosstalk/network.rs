//! SQUID grouping and leakage-amplitude draws.
//!
//! The readout electronics multiplex several bolometers per SQUID, and
//! crosstalk strength differs for same-SQUID and cross-SQUID detector
//! pairs. This module builds the explicit grouping used by both coupling
//! models and draws the per-detector leakage amplitudes from a seeded
//! normal distribution.

use std::collections::HashMap;

use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Detectors grouped by the SQUID they are read out through.
///
/// Each group holds the ordered list of `(channel, detector)` pairs for one
/// SQUID, where `channel` is the detector's position within the SQUID and
/// `detector` its row in the timestream array. Groups appear in first-seen
/// order of their SQUID id, and members in input order, so iteration is
/// deterministic for a given layout.
#[derive(Debug, Clone)]
pub struct SquidGroups {
    groups: Vec<Vec<(i32, usize)>>,
    n_detectors: usize,
}

impl SquidGroups {
    /// Build the grouping from per-detector SQUID ids and channel indices.
    ///
    /// # Arguments
    ///
    /// * `squid_ids` - SQUID id for each detector
    /// * `channels` - Position of each detector within its SQUID
    ///
    /// # Panics
    ///
    /// Panics if the two slices differ in length.
    pub fn from_ids<S: AsRef<str>>(squid_ids: &[S], channels: &[i32]) -> Self {
        assert_eq!(
            squid_ids.len(),
            channels.len(),
            "SQUID ids and channel indices must have the same length"
        );

        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<Vec<(i32, usize)>> = Vec::new();

        for (detector, (id, &channel)) in squid_ids.iter().zip(channels.iter()).enumerate() {
            let slot = *index.entry(id.as_ref()).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push((channel, detector));
        }

        Self {
            groups,
            n_detectors: squid_ids.len(),
        }
    }

    /// Number of SQUIDs in the layout.
    pub fn n_squids(&self) -> usize {
        self.groups.len()
    }

    /// Number of detectors in the layout.
    pub fn n_detectors(&self) -> usize {
        self.n_detectors
    }

    /// Iterate over the per-SQUID member lists, in first-seen SQUID order.
    pub fn iter(&self) -> impl Iterator<Item = &[(i32, usize)]> {
        self.groups.iter().map(|g| g.as_slice())
    }
}

/// Draw one leakage amplitude per detector from `Normal(mu/100, sigma/100)`.
///
/// `mu` and `sigma` are given in percent. A fresh `Xoshiro256PlusPlus` is
/// seeded per call, so identical `(n, mu, sigma, seed)` inputs reproduce
/// identical amplitudes regardless of which coupling model consumes them.
///
/// # Panics
///
/// Panics if `mu` is non-finite or `sigma` is negative or non-finite.
pub fn draw_cross_amplitudes(n: usize, mu: f64, sigma: f64, seed: u64) -> Vec<f64> {
    assert!(mu.is_finite(), "leakage mean must be finite, got {mu}");
    assert!(
        sigma.is_finite() && sigma >= 0.0,
        "leakage width must be finite and non-negative, got {sigma}"
    );

    let mean = mu / 100.0;
    let width = sigma / 100.0;

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let z: f64 = StandardNormal.sample(&mut rng);
            mean + width * z
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_preserve_first_seen_order() {
        let squids = ["Sq1", "Sq0", "Sq1", "Sq0"];
        let channels = [0, 0, 1, 1];
        let groups = SquidGroups::from_ids(&squids, &channels);

        assert_eq!(groups.n_squids(), 2);
        assert_eq!(groups.n_detectors(), 4);

        let members: Vec<&[(i32, usize)]> = groups.iter().collect();
        // "Sq1" was seen first, so it forms the first group.
        assert_eq!(members[0], &[(0, 0), (1, 2)]);
        assert_eq!(members[1], &[(0, 1), (1, 3)]);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_mismatched_layout_lengths_panic() {
        let squids = ["Sq0", "Sq0"];
        let channels = [0, 1, 2];
        SquidGroups::from_ids(&squids, &channels);
    }

    #[test]
    fn test_amplitude_draws_are_deterministic() {
        let a = draw_cross_amplitudes(16, -3.0, 1.0, 5_438_765);
        let b = draw_cross_amplitudes(16, -3.0, 1.0, 5_438_765);
        assert_eq!(a, b);

        let c = draw_cross_amplitudes(16, -3.0, 1.0, 5_438_766);
        assert_ne!(a, c);
    }

    #[test]
    fn test_amplitude_draws_respect_percent_units() {
        // With sigma = 0 every amplitude collapses onto mu / 100.
        let amps = draw_cross_amplitudes(8, -3.0, 0.0, 1);
        for &a in &amps {
            assert!((a - (-0.03)).abs() < 1e-15);
        }
    }
}
