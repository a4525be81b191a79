//! Differential-beam kernel machinery.
//!
//! This module turns a detector pair's rendered beam maps into the static
//! 6-coefficient kernel used by the leakage projector:
//! - Finite-difference derivative operator over 2D maps
//! - Least-squares kernel fit (difference beam against sum-beam derivatives)
//! - Spin selection of the fitted coefficients
//! - Kernel rotation into the per-sample detector frame

pub(crate) mod derivative;
mod kernel;
mod rotate;
mod spin;

pub use derivative::{derivs, xderiv, yderiv};
pub use kernel::{default_pixel_size, fit_kernel, fit_pair_kernels, BeamMapSource};
pub use rotate::{rotate_kernel, rotate_kernel_many};
pub use spin::{select_spins, SpinSelection};
