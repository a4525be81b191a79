//! Configuration for crosstalk injection.

use serde::{Deserialize, Serialize};

/// Configuration options for the crosstalk injection routines.
///
/// The same leakage-amplitude distribution (`mu`, `sigma`, `seed`) feeds both
/// coupling models; `radius`/`beta` apply to the intra-SQUID model only and
/// `squid_attenuation` to the inter-SQUID model only. Defaults reproduce the
/// reference instrument configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosstalkConfig {
    /// Mean of the leakage-coefficient distribution, in percent (default: −3).
    ///
    /// `mu = 1.0` means leakage coefficients centred around 1%.
    pub mu: f64,

    /// Width of the leakage-coefficient distribution, in percent (default: 1).
    pub sigma: f64,

    /// Seed for the leakage-coefficient draws (default: 5438765).
    ///
    /// A fresh generator is seeded on every injection call, so the same seed
    /// and layout always produce the same amplitudes, whichever coupling
    /// model is applied.
    pub seed: u64,

    /// Coupling radius within a SQUID, in channel steps (default: 1).
    ///
    /// Channels `i` and `j` in the same SQUID couple iff
    /// `0 < |i − j| ≤ radius`. A radius larger than the channel span of a
    /// SQUID degrades silently: channels outside the SQUID simply do not
    /// exist, so no extra couplings occur.
    pub radius: usize,

    /// Exponent of the channel-separation attenuation (default: 2).
    ///
    /// A coupling at separation `d` is attenuated by `d^beta`. Hardware
    /// considerations for a fixed frequency spacing suggest `beta = 2`.
    pub beta: f64,

    /// Flat attenuation between detectors in different SQUIDs (default: 100).
    pub squid_attenuation: f64,
}

impl Default for CrosstalkConfig {
    fn default() -> Self {
        Self {
            mu: -3.0,
            sigma: 1.0,
            seed: 5_438_765,
            radius: 1,
            beta: 2.0,
            squid_attenuation: 100.0,
        }
    }
}
