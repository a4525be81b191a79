//! Least-squares fit of the differential-beam kernel.
//!
//! The difference beam of a detector pair is modelled as a convolution of
//! the sum beam with a short differential operator,
//! `B⁻ = K ∗ B⁺` with `K = a · D`, where
//! `D = (I, dI/dθ, dI/dφ, d²I/dθdφ, d²I/dθ², d²I/dφ²)` and `a` are the six
//! kernel coefficients. Fitting `a` reduces to an ordinary least-squares
//! problem over the pixels of the rendered beam maps.

use nalgebra::{DMatrix, DVector, SVD};

use crate::constants::SIGMA_TO_FWHM;
use crate::types::{DetectorPair, Kernel6};

use super::derivative::derivs;

/// Collaborator seam: renders sum/difference beam maps for a detector pair.
///
/// Implementations wrap whatever beam model the instrument simulation uses.
/// Returning `None` means the pair cannot be rendered; the fit then records
/// an absent kernel for that pair instead of failing.
pub trait BeamMapSource {
    /// Render the `(sum, difference)` beam maps for the pair
    /// `(top, bottom)` on an `nx × nx` grid of `pixel_size`-radian pixels.
    fn pair_maps(
        &self,
        top: usize,
        bottom: usize,
        nx: usize,
        pixel_size: f64,
    ) -> Option<(DMatrix<f64>, DMatrix<f64>)>;
}

/// Fit the 6 kernel coefficients for one sum/difference beam-map pair.
///
/// Builds the design matrix from the derivative maps of the sum beam
/// (rows = pixels, columns = the 6 derivative channels), flattens the
/// difference beam into the target vector, and solves the least-squares
/// problem by SVD. Rank-deficient systems (tiny `nx`, degenerate beams)
/// are not an error: singular values at machine precision are truncated
/// and the minimum-norm solution is returned. The coefficients of such a
/// fit may be numerically unstable, which is an accepted modelling
/// limitation.
///
/// # Arguments
///
/// * `sum_beam` - Sum beam map of the pair
/// * `diff_beam` - Difference beam map, same shape as `sum_beam`
/// * `pixel_size` - Size of a map pixel, in radians
///
/// # Panics
///
/// Panics if the two maps differ in shape.
pub fn fit_kernel(sum_beam: &DMatrix<f64>, diff_beam: &DMatrix<f64>, pixel_size: f64) -> Kernel6 {
    assert_eq!(
        sum_beam.shape(),
        diff_beam.shape(),
        "sum and difference beam maps must have the same shape"
    );

    let (nrows, ncols) = sum_beam.shape();
    let npix = nrows * ncols;
    let ds = derivs(sum_beam, pixel_size);

    // Row-major flattening: one design-matrix row per beam-map pixel.
    let mut design = DMatrix::zeros(npix, 6);
    for (k, map) in ds.iter().enumerate() {
        let mut p = 0;
        for r in 0..nrows {
            for c in 0..ncols {
                design[(p, k)] = map[(r, c)];
                p += 1;
            }
        }
    }

    let mut target = DVector::zeros(npix);
    let mut p = 0;
    for r in 0..nrows {
        for c in 0..ncols {
            target[p] = diff_beam[(r, c)];
            p += 1;
        }
    }

    let svd = SVD::new(design, true, true);
    let solution = svd
        .solve(&target, f64::EPSILON)
        .unwrap_or_else(|_| DVector::zeros(6));

    Kernel6::from_iterator(solution.iter().copied())
}

/// Fit one kernel per detector pair through a [`BeamMapSource`].
///
/// Pairs the source cannot render come back as `None` ("no kernel
/// available"); the leakage projector treats those as zero leakage.
///
/// # Arguments
///
/// * `source` - Beam-map collaborator
/// * `pairs` - Detector pairs to fit
/// * `nx` - Beam-map grid size, in pixels per side; `nx · pixel_size`
///   should comfortably cover the beam so all its features are captured
/// * `pixel_size` - Map pixel size, in radians (see [`default_pixel_size`])
pub fn fit_pair_kernels<S: BeamMapSource>(
    source: &S,
    pairs: &[DetectorPair],
    nx: usize,
    pixel_size: f64,
) -> Vec<Option<Kernel6>> {
    pairs
        .iter()
        .map(|pair| {
            source
                .pair_maps(pair.top, pair.bottom, nx, pixel_size)
                .map(|(sum, diff)| fit_kernel(&sum, &diff, pixel_size))
        })
        .collect()
}

/// Default beam-map pixel size: 1/7th of the mean beam size.
///
/// `mean_sigma1`/`mean_sigma2` are the focal-plane means of the beams'
/// semi-major and semi-minor Gaussian widths, in radians.
pub fn default_pixel_size(mean_sigma1: f64, mean_sigma2: f64) -> f64 {
    let size_x = mean_sigma1 / SIGMA_TO_FWHM;
    let size_y = mean_sigma2 / SIGMA_TO_FWHM;
    (size_x + size_y) / 2.0 / 7.0
}
