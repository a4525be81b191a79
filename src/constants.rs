//! Numeric constants shared across the crate.

use std::f64::consts::PI;

/// Arcseconds to radians.
pub const ARCSEC_TO_RAD: f64 = PI / 180.0 / 3600.0;

/// Arcminutes to radians.
pub const ARCMIN_TO_RAD: f64 = PI / 180.0 / 60.0;

/// Degrees to radians.
pub const DEG_TO_RAD: f64 = PI / 180.0;

/// Ratio between the FWHM and the Gaussian width of a beam: `sqrt(8 ln 2)`.
///
/// `fwhm = SIGMA_TO_FWHM * sigma` for an azimuthally symmetric Gaussian beam.
pub const SIGMA_TO_FWHM: f64 = 2.354_820_045_030_949_3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigma_to_fwhm_matches_closed_form() {
        let expected = (8.0 * 2.0_f64.ln()).sqrt();
        assert!((SIGMA_TO_FWHM - expected).abs() < 1e-15);
    }

    #[test]
    fn test_angle_conversions_are_consistent() {
        assert!((ARCMIN_TO_RAD - 60.0 * ARCSEC_TO_RAD).abs() < 1e-18);
        assert!((DEG_TO_RAD - 60.0 * ARCMIN_TO_RAD).abs() < 1e-18);
    }
}
