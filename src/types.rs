//! Type aliases and common types.

use nalgebra::SVector;

/// 6-coefficient beam-mismatch kernel.
///
/// The coefficients multiply the sky intensity and its flat-sky derivatives,
/// in the fixed order `(I, dI/dθ, dI/dφ, d²I/dθdφ, d²I/dθ², d²I/dφ²)`.
/// Use the [`D00`]..[`D02`] index constants instead of bare integers.
pub type Kernel6 = SVector<f64, 6>;

/// Kernel index: temperature (I) term.
pub const D00: usize = 0;
/// Kernel index: first θ derivative.
pub const D10: usize = 1;
/// Kernel index: first φ derivative.
pub const D01: usize = 2;
/// Kernel index: mixed second derivative d²I/dθdφ.
pub const D11: usize = 3;
/// Kernel index: second θ derivative.
pub const D20: usize = 4;
/// Kernel index: second φ derivative.
pub const D02: usize = 5;

/// Sentinel pixel index marking an invalid/unobserved pointing sample.
///
/// Samples carrying this value contribute zero leakage and are skipped
/// by the projector rather than treated as errors.
pub const UNSEEN: i64 = -1;

/// A polarization-sensitive pixel made of two co-pointed detectors.
///
/// Both members share the same pointing solution and differ only through
/// their beam/gain systematics. The fields are indices into the timestream
/// array handed to the injection routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DetectorPair {
    /// Index of the pair's first ("top") detector.
    pub top: usize,
    /// Index of the pair's second ("bottom") detector.
    pub bottom: usize,
}

impl DetectorPair {
    /// Pair detectors `2p` and `2p + 1` for each `p` in `0..npair`.
    ///
    /// This is the conventional focal-plane ordering assumed by
    /// [`crate::leakage::add_diffbeam_leakage`].
    pub fn consecutive(npair: usize) -> Vec<DetectorPair> {
        (0..npair)
            .map(|p| DetectorPair {
                top: 2 * p,
                bottom: 2 * p + 1,
            })
            .collect()
    }
}
