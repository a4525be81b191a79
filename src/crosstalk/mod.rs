//! Crosstalk injection between bolometer timestreams.
//!
//! The readout multiplexes several bolometers per SQUID; electrical
//! crosstalk leaks a fraction of every detector's signal into its
//! neighbours. This module provides the two coupling models:
//! - intra-SQUID: distance-weighted coupling between nearby channels
//!   within one SQUID
//! - inter-SQUID: flat, fully bipartite coupling across SQUID groups
//!
//! Leakage amplitudes are drawn once per call from a seeded normal
//! distribution; fixed inputs reproduce bit-identical outputs.

mod inject;
mod network;

pub use inject::{
    inject_inter_squid, inject_inter_squid_into, inject_intra_squid, inject_intra_squid_into,
};
pub use network::{draw_cross_amplitudes, SquidGroups};
