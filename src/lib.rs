//! # tod-systematics
//!
//! Inject realistic instrument systematics into simulated time-ordered
//! detector data (TOD) from a polarization-sensitive CMB telescope.
//!
//! Instrument designers use this crate to quantify how hardware
//! imperfections corrupt the recovered sky signal. It provides:
//! - Crosstalk injection between bolometer timestreams, within a SQUID
//!   (distance-weighted) and across SQUIDs (flat attenuation)
//! - Differential-beam T→P leakage: least-squares beam-mismatch kernels,
//!   spin selection, per-sample kernel rotation and projection through a
//!   stack of intensity-derivative maps
//! - Gain-drift generators (retuning steps and linear ramps)
//! - Beam-parameter perturbations (differential pointing and ellipticity)
//!
//! Boresight pointing, beam-map rendering and sky-map I/O live in the
//! surrounding simulation; they enter through plain data arguments and the
//! [`BeamMapSource`] seam.
//!
//! ## ⚠️ Determinism Contract
//!
//! Every stochastic routine seeds a fresh generator per call and draws its
//! full random vector before touching any timestream. Fixed inputs
//! therefore reproduce bit-identical outputs, serial or parallel. Do not
//! try to share a generator across calls to get "independent" draws —
//! pass distinct seeds instead:
//!
//! ```ignore
//! // ❌ WRONG - same seed, both calls draw identical amplitudes
//! inject_intra_squid(&mut d, &groups, &config);
//! inject_inter_squid(&mut d, &groups, &config);
//!
//! // ✅ CORRECT - decorrelate the two injections explicitly
//! let inter = CrosstalkConfig { seed: config.seed + 1, ..config.clone() };
//! inject_intra_squid(&mut d, &groups, &config);
//! inject_inter_squid(&mut d, &groups, &inter);
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use tod_systematics::{inject_crosstalk, CrosstalkConfig, SquidGroups};
//!
//! // One row of samples per bolometer, plus the readout layout.
//! let mut tod: Vec<Vec<f64>> = load_simulated_timestreams();
//! let squid_ids = focal_plane.squid_ids();
//! let channels = focal_plane.channels_in_squid();
//!
//! // Default intra-SQUID leakage (mu = -3%, sigma = 1%, radius = 1).
//! inject_crosstalk(&mut tod, &squid_ids, &channels);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod constants;
mod types;

// Functional modules
pub mod beam;
pub mod crosstalk;
pub mod gains;
pub mod leakage;
pub mod perturb;

// Re-exports for public API
pub use config::CrosstalkConfig;
pub use constants::{ARCMIN_TO_RAD, ARCSEC_TO_RAD, DEG_TO_RAD, SIGMA_TO_FWHM};
pub use types::{DetectorPair, Kernel6, D00, D01, D02, D10, D11, D20, UNSEEN};

pub use beam::{
    default_pixel_size, derivs, fit_kernel, fit_pair_kernels, rotate_kernel, rotate_kernel_many,
    select_spins, xderiv, yderiv, BeamMapSource, SpinSelection,
};
pub use crosstalk::{
    draw_cross_amplitudes, inject_inter_squid, inject_inter_squid_into, inject_intra_squid,
    inject_intra_squid_into, SquidGroups,
};
pub use gains::{linear_drift, step_drift, DriftSign};
pub use leakage::{
    add_diffbeam_leakage, detector_frame_kernel, project_pair, IntensityDerivatives,
};
pub use perturb::{perturb_beam_ellipticity, perturb_beam_offsets, EllipticityPerturbation};

/// Convenience function: default intra-SQUID crosstalk injection.
///
/// Builds the SQUID grouping from the layout and applies
/// [`inject_intra_squid`] with [`CrosstalkConfig::default`]. Use the
/// module-level functions directly for custom parameters, the inter-SQUID
/// model, or the into-buffer variants.
///
/// # Arguments
///
/// * `data` - Timestream array, one row per bolometer; modified in place
/// * `squid_ids` - SQUID id for each bolometer
/// * `channels` - Position of each bolometer within its SQUID
///
/// # Panics
///
/// Panics if the layout slices do not match `data` in length.
pub fn inject_crosstalk<S: AsRef<str>>(data: &mut [Vec<f64>], squid_ids: &[S], channels: &[i32]) {
    let groups = SquidGroups::from_ids(squid_ids, channels);
    inject_intra_squid(data, &groups, &CrosstalkConfig::default());
}
