//! Built-in reference candidates.
//!
//! The harness treats candidates as black boxes behind the
//! [`BondingCurve`](crate::candidate::BondingCurve) trait; these two ship
//! with the crate so a run is exercisable end-to-end without external
//! implementations. They deliberately differ in ratio representation,
//! precision and cost profile:
//!
//! - [`PpmCurve`]: parts-per-million ratio over `rust_decimal` arithmetic.
//! - [`IntExpCurve`]: small-integer exponent over Q64.64 `u128` fixed point.

mod int_exp;
mod ppm;

pub use int_exp::IntExpCurve;
pub use ppm::PpmCurve;

use crate::candidate::CandidateRegistry;

/// Registry with the two stock candidates, ppm first ("A"), integer
/// exponent second ("B").
pub fn default_registry() -> CandidateRegistry {
    let mut registry = CandidateRegistry::new();
    registry.register(Box::new(PpmCurve));
    registry.register(Box::new(IntExpCurve));
    registry
}
