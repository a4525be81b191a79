//! Finite-difference derivatives of flat-sky 2D maps.
//!
//! Derivatives use the centered 3-tap stencil `[1, 0, −1] / (2·pixel_size)`
//! applied as a same-size convolution with zero-padded borders, and return
//! the *negative* of the raw finite difference. Downstream kernel formulas
//! depend on this sign convention; do not change it.

use nalgebra::DMatrix;

/// Derivative of a 2D map with respect to the x coordinate.
///
/// x varies along a row (the column index). Border columns see a zero
/// neighbour outside the map, matching a zero-padded "same" convolution.
///
/// # Arguments
///
/// * `m` - Input 2D map
/// * `pixel_size` - Size of a pixel, in radians
pub fn xderiv(m: &DMatrix<f64>, pixel_size: f64) -> DMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let inv = 1.0 / (2.0 * pixel_size);

    DMatrix::from_fn(nrows, ncols, |r, c| {
        let left = if c > 0 { m[(r, c - 1)] } else { 0.0 };
        let right = if c + 1 < ncols { m[(r, c + 1)] } else { 0.0 };
        (left - right) * inv
    })
}

/// Derivative of a 2D map with respect to the y coordinate.
///
/// y varies along a column (the row index); otherwise identical to
/// [`xderiv`].
pub fn yderiv(m: &DMatrix<f64>, pixel_size: f64) -> DMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let inv = 1.0 / (2.0 * pixel_size);

    DMatrix::from_fn(nrows, ncols, |r, c| {
        let up = if r > 0 { m[(r - 1, c)] } else { 0.0 };
        let down = if r + 1 < nrows { m[(r + 1, c)] } else { 0.0 };
        (up - down) * inv
    })
}

/// Full first and second derivatives of a 2D map, in kernel order.
///
/// Returns `(m00, m10, m01, m11, m20, m02)` where `m00` is the map itself
/// and second derivatives are built by composing the first-order operators:
/// `m11 = ∂y m10`, `m20 = ∂x m10`, `m02 = ∂y m01`.
pub fn derivs(m: &DMatrix<f64>, pixel_size: f64) -> [DMatrix<f64>; 6] {
    let m00 = m.clone();
    let m10 = xderiv(m, pixel_size);
    let m01 = yderiv(m, pixel_size);
    let m11 = yderiv(&m10, pixel_size);
    let m20 = xderiv(&m10, pixel_size);
    let m02 = yderiv(&m01, pixel_size);

    [m00, m10, m01, m11, m20, m02]
}
