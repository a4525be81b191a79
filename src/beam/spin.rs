//! Spin decomposition of beam-mismatch kernels.
//!
//! Beam-mismatch modes classify by angular multipole: spin 0 (size
//! mismatch), spin 1 (pointing offset), spin 2 (ellipticity). Selecting a
//! subset isolates one leakage mechanism, e.g. differential ellipticity
//! uses spins 0 and 2 while differential pointing uses spin 1 alone.

use serde::{Deserialize, Serialize};

use crate::types::{Kernel6, D00, D01, D02, D10, D11, D20};

/// Which spin components of a kernel to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinSelection {
    /// Keep the spin-0 (monopole, size-mismatch) part.
    pub spin0: bool,
    /// Keep the spin-1 (dipole, pointing-offset) part.
    pub spin1: bool,
    /// Keep the spin-2 (quadrupole, ellipticity) part.
    pub spin2: bool,
}

impl SpinSelection {
    /// All three spins: the identity selection.
    pub const ALL: SpinSelection = SpinSelection {
        spin0: true,
        spin1: true,
        spin2: true,
    };

    /// Parse a selection from a `"012"`-style subset string.
    ///
    /// Each character enables one spin; order and repetition are
    /// irrelevant (`"20"` equals `"002"`).
    ///
    /// # Panics
    ///
    /// Panics on any character other than `'0'`, `'1'` or `'2'`.
    pub fn parse(spins: &str) -> Self {
        let mut selection = SpinSelection {
            spin0: false,
            spin1: false,
            spin2: false,
        };
        for ch in spins.chars() {
            match ch {
                '0' => selection.spin0 = true,
                '1' => selection.spin1 = true,
                '2' => selection.spin2 = true,
                _ => panic!("invalid spin character {ch:?}; expected a subset of \"012\""),
            }
        }
        selection
    }
}

impl Default for SpinSelection {
    fn default() -> Self {
        Self::ALL
    }
}

/// Keep only the requested spin components of a kernel.
///
/// The second-order coefficients are first recomposed into their symmetric
/// part `x = (d20 + d02) / 2` (spin 0) and antisymmetric part
/// `y = (d20 − d02) / 2` (spin 2, together with `d11`). Summing the
/// selections for spins 0, 1 and 2 reproduces the input kernel exactly.
pub fn select_spins(kernel: &Kernel6, spins: SpinSelection) -> Kernel6 {
    let x = (kernel[D20] + kernel[D02]) * 0.5;
    let y = (kernel[D20] - kernel[D02]) * 0.5;

    let mut out = Kernel6::zeros();
    if spins.spin0 {
        out[D00] += kernel[D00];
        out[D20] += x;
        out[D02] += x;
    }
    if spins.spin1 {
        out[D10] += kernel[D10];
        out[D01] += kernel[D01];
    }
    if spins.spin2 {
        out[D11] += kernel[D11];
        out[D20] += y;
        out[D02] -= y;
    }
    out
}
