//! Seeded perturbations of beam parameters.
//!
//! These helpers perturb the beam model *before* beam maps are rendered:
//! differential pointing moves the two centroids of a pair apart, and
//! (differential) ellipticity stretches the Gaussian widths. The perturbed
//! parameters feed the beam-map collaborator, whose rendered sum/difference
//! maps then carry the mismatch picked up by the kernel fit.

use rand::Rng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::constants::{ARCSEC_TO_RAD, DEG_TO_RAD};

/// Inject differential pointing between the two detectors of each pair.
///
/// Per pair, a displacement magnitude `rho ~ Normal(mu, sigma)` (in
/// arcseconds) and a direction `theta ~ Uniform(0°, 360°)` are drawn; the
/// pair's first detector moves by `+(rho/2)·(cos θ, sin θ)` and the second
/// by the opposite, so the pair centroid is preserved. Positions are in
/// radians and are modified in place; detectors `2p` and `2p + 1` form
/// pair `p`.
///
/// # Arguments
///
/// * `xpos` - Beam centroid x positions, radians
/// * `ypos` - Beam centroid y positions, radians
/// * `mu_arcsec` - Mean differential-pointing magnitude, arcseconds
/// * `sigma_arcsec` - Width of the magnitude distribution, arcseconds
/// * `seed` - Seed for the draws
///
/// # Panics
///
/// Panics if `xpos` and `ypos` differ in length or the length is odd.
pub fn perturb_beam_offsets(
    xpos: &mut [f64],
    ypos: &mut [f64],
    mu_arcsec: f64,
    sigma_arcsec: f64,
    seed: u64,
) {
    assert_eq!(
        xpos.len(),
        ypos.len(),
        "x and y bolometer coordinates must have the same length"
    );
    assert!(
        xpos.len() % 2 == 0,
        "differential pointing is drawn per pair; the layout must pair up"
    );

    let npair = xpos.len() / 2;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    // Magnitudes first, then directions, so either draw can be reasoned
    // about independently of the other for a fixed seed.
    let rho: Vec<f64> = (0..npair)
        .map(|_| {
            let z: f64 = StandardNormal.sample(&mut rng);
            (mu_arcsec + sigma_arcsec * z) * ARCSEC_TO_RAD
        })
        .collect();
    let theta: Vec<f64> = (0..npair)
        .map(|_| rng.random_range(0.0..360.0) * DEG_TO_RAD)
        .collect();

    for p in 0..npair {
        let dx = rho[p] / 2.0 * theta[p].cos();
        let dy = rho[p] / 2.0 * theta[p].sin();
        xpos[2 * p] += dx;
        xpos[2 * p + 1] -= dx;
        ypos[2 * p] += dy;
        ypos[2 * p + 1] -= dy;
    }
}

/// Perturbed elliptical-Gaussian beam widths and orientations.
///
/// Produced by [`perturb_beam_ellipticity`]; feed these to the beam model
/// in place of the unperturbed circular widths.
#[derive(Debug, Clone)]
pub struct EllipticityPerturbation {
    /// Semi-major Gaussian widths, radians, one per bolometer.
    pub sig1: Vec<f64>,
    /// Semi-minor Gaussian widths, radians, one per bolometer.
    pub sig2: Vec<f64>,
    /// Ellipse orientation angles, degrees, one per bolometer.
    pub angle_deg: Vec<f64>,
}

/// Inject (differential) beam ellipticity.
///
/// Ellipticities `eps ~ Normal(mu/100, sigma/100)` are drawn per bolometer
/// and converted into a width split `d` via
/// `eps = (sig1² − sig2²) / (sig1² + sig2²)` with `sig1 = sig2 + d`,
/// keeping the smaller of the two admissible roots. Ellipse angles are
/// uniform in (−90°, 90°). When `differential` is false both members of a
/// pair share the same ellipticity (no differential ellipticity within
/// pairs, only across them).
///
/// An ellipticity draw of exactly zero makes the width split `0/0`; the
/// distribution parameters must keep draws away from zero. This edge case
/// is intentionally not guarded here.
///
/// # Arguments
///
/// * `sigma_beam` - Unperturbed circular beam width, radians
/// * `mu_percent` - Mean ellipticity, percent (−100..100)
/// * `sigma_percent` - Width of the ellipticity distribution, percent
/// * `nbolo` - Number of bolometers to perturb (must be even)
/// * `differential` - Whether pair members get independent ellipticities
/// * `seed` - Seed for the draws
///
/// # Panics
///
/// Panics if `nbolo` is odd.
pub fn perturb_beam_ellipticity(
    sigma_beam: f64,
    mu_percent: f64,
    sigma_percent: f64,
    nbolo: usize,
    differential: bool,
    seed: u64,
) -> EllipticityPerturbation {
    assert!(
        nbolo % 2 == 0,
        "ellipticity pairing assumes an even number of bolometers, got {nbolo}"
    );

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let mut eps: Vec<f64> = (0..nbolo)
        .map(|_| {
            let z: f64 = StandardNormal.sample(&mut rng);
            mu_percent / 100.0 + sigma_percent / 100.0 * z
        })
        .collect();

    if !differential {
        // Pair members share the ellipticity of the pair's first member.
        for p in 0..nbolo / 2 {
            eps[2 * p + 1] = eps[2 * p];
        }
    }

    let mut sig1 = Vec::with_capacity(nbolo);
    let mut sig2 = Vec::with_capacity(nbolo);
    for &e in &eps {
        let d = 2.0 * sigma_beam / e * (1.0 - (1.0 - e * e).sqrt());
        sig1.push(sigma_beam + d / 2.0);
        sig2.push(sigma_beam - d / 2.0);
    }

    let angle_deg: Vec<f64> = (0..nbolo).map(|_| rng.random_range(-90.0..90.0)).collect();

    EllipticityPerturbation {
        sig1,
        sig2,
        angle_deg,
    }
}
