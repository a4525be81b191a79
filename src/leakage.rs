//! T→P leakage synthesis from differential-beam kernels.
//!
//! A perfectly matched pair beam produces zero net leakage; any mismatch
//! leaks total-intensity structure into the polarization difference. The
//! projector walks a pair's pointing solution sample by sample, rotates the
//! pair's static kernel into the detector frame at that sample, and
//! accumulates the dot product of the rotated kernel with the local
//! intensity derivatives. The orchestrating entry point then adds the
//! leakage to one detector of the pair and subtracts it from the other.

use crate::beam::{rotate_kernel, select_spins, SpinSelection};
use crate::types::{Kernel6, D00, D10, D11, UNSEEN};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pixelized sky intensity and its derivatives, in kernel order.
///
/// Six equal-length maps `(I, dI/dθ, dI/dφ, d²I/dθdφ, d²I/dθ², d²I/dφ²)`
/// over a shared pixelization; read-only input to the projector. Pointing
/// pixel indices refer into these maps.
#[derive(Debug, Clone)]
pub struct IntensityDerivatives {
    maps: [Vec<f64>; 6],
    npix: usize,
}

impl IntensityDerivatives {
    /// Wrap six derivative maps, validating that they share one
    /// pixelization.
    ///
    /// # Panics
    ///
    /// Panics if the maps differ in length.
    pub fn new(maps: [Vec<f64>; 6]) -> Self {
        let npix = maps[0].len();
        for (k, map) in maps.iter().enumerate() {
            assert_eq!(
                map.len(),
                npix,
                "intensity-derivative map {k} must match the shared pixelization"
            );
        }
        Self { maps, npix }
    }

    /// Number of pixels in the shared pixelization.
    pub fn npix(&self) -> usize {
        self.npix
    }

    /// Value of derivative channel `coeff` at `pixel`.
    #[inline]
    pub fn value(&self, coeff: usize, pixel: usize) -> f64 {
        self.maps[coeff][pixel]
    }
}

/// Bring a fitted kernel into the detector-frame convention.
///
/// Zeroes the temperature term (pure temperature mismatch is calibrated
/// away upstream) and flips the sign of the odd-θ-derivative terms
/// (`d10`, `d11`), then applies the spin selection. The input kernel is
/// consumed by copy, never mutated.
pub fn detector_frame_kernel(kernel: &Kernel6, spins: SpinSelection) -> Kernel6 {
    let mut k = *kernel;
    k[D00] = 0.0;
    k[D10] = -k[D10];
    k[D11] = -k[D11];
    select_spins(&k, spins)
}

/// Accumulate one pair's leakage timestream into `out`.
///
/// For each sample with a valid pixel index, the kernel is rotated by the
/// *negative* of that sample's orientation angle and its dot product with
/// the local intensity derivatives is added to `out`. Samples carrying the
/// [`UNSEEN`] sentinel are skipped and leave `out` untouched (zero
/// leakage, not an error).
///
/// # Arguments
///
/// * `out` - Per-sample leakage accumulator for this pair
/// * `stack` - Intensity-derivative maps
/// * `pixels` - Per-sample pixel index, or [`UNSEEN`]
/// * `angles` - Per-sample detector-frame orientation angle, radians
/// * `kernel` - The pair's static kernel, already in the detector frame
///   (see [`detector_frame_kernel`])
///
/// # Panics
///
/// Panics if `pixels` or `angles` differ in length from `out`.
pub fn project_pair(
    out: &mut [f64],
    stack: &IntensityDerivatives,
    pixels: &[i64],
    angles: &[f64],
    kernel: &Kernel6,
) {
    assert_eq!(
        pixels.len(),
        out.len(),
        "pointing must have one pixel index per output sample"
    );
    assert_eq!(
        angles.len(),
        out.len(),
        "pointing must have one orientation angle per output sample"
    );

    for (t, sample) in out.iter_mut().enumerate() {
        let pixel = pixels[t];
        if pixel == UNSEEN {
            continue;
        }
        let pixel = pixel as usize;

        let rotated = rotate_kernel(kernel, -angles[t]);
        let mut leak = 0.0;
        for coeff in 0..6 {
            leak += rotated[coeff] * stack.value(coeff, pixel);
        }
        *sample += leak;
    }
}

/// Inject T→P leakage from beam mismatch into a wafer's timestreams.
///
/// Rows `2p` and `2p + 1` of `timestreams` form pair `p`. For every pair
/// with a fitted kernel, the detector-frame kernel (see
/// [`detector_frame_kernel`]) is projected along the pair's pointing and
/// the resulting leakage timestream is added to row `2p` and subtracted
/// from row `2p + 1`. Pairs whose kernel is absent (`None`, e.g. the beam
/// maps could not be rendered) contribute zero leakage.
///
/// # Arguments
///
/// * `timestreams` - Timestream array, two consecutive rows per pair
/// * `pointing` - Per-pair, per-sample pixel indices ([`UNSEEN`] = skip)
/// * `orientation` - Per-pair, per-sample orientation angles, radians
/// * `stack` - Intensity-derivative maps
/// * `kernels` - Per-pair fitted kernels, `None` = no kernel available
/// * `spins` - Spin components to include in the injected leakage
///
/// # Panics
///
/// Panics if `timestreams` does not hold exactly two rows per kernel, if
/// `pointing`/`orientation` do not hold one row per pair, or if any
/// per-pair row lengths disagree.
pub fn add_diffbeam_leakage(
    timestreams: &mut [Vec<f64>],
    pointing: &[Vec<i64>],
    orientation: &[Vec<f64>],
    stack: &IntensityDerivatives,
    kernels: &[Option<Kernel6>],
    spins: SpinSelection,
) {
    let npair = kernels.len();
    assert_eq!(
        timestreams.len(),
        2 * npair,
        "timestream array must hold two rows per detector pair"
    );
    assert_eq!(
        pointing.len(),
        npair,
        "pointing must hold one row per detector pair"
    );
    assert_eq!(
        orientation.len(),
        npair,
        "orientation must hold one row per detector pair"
    );

    #[cfg(feature = "parallel")]
    timestreams
        .par_chunks_exact_mut(2)
        .enumerate()
        .for_each(|(p, rows)| {
            leak_into_pair(p, rows, &pointing[p], &orientation[p], stack, &kernels[p], spins);
        });

    #[cfg(not(feature = "parallel"))]
    for (p, rows) in timestreams.chunks_exact_mut(2).enumerate() {
        leak_into_pair(p, rows, &pointing[p], &orientation[p], stack, &kernels[p], spins);
    }
}

/// Project one pair's leakage and fold it into its two timestream rows.
fn leak_into_pair(
    pair: usize,
    rows: &mut [Vec<f64>],
    pixels: &[i64],
    angles: &[f64],
    stack: &IntensityDerivatives,
    kernel: &Option<Kernel6>,
    spins: SpinSelection,
) {
    let Some(kernel) = kernel else {
        return; // no kernel for this pair: zero leakage
    };

    let nsamples = rows[0].len();
    assert_eq!(
        rows[1].len(),
        nsamples,
        "pair {pair}: both timestreams must have the same length"
    );

    let frame_kernel = detector_frame_kernel(kernel, spins);
    let mut leakage = vec![0.0; nsamples];
    project_pair(&mut leakage, stack, pixels, angles, &frame_kernel);

    for (t, &leak) in leakage.iter().enumerate() {
        rows[0][t] += leak;
        rows[1][t] -= leak;
    }
}
