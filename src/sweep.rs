//! Parameter space generator: the lazy Cartesian sweep over
//! balance × ratio × direction × amount, and the unit-scaling
//! conventions applied before tuples are emitted.
//!
//! Dimensions follow the published comparison methodology: one
//! representative reserve balance, a sparse inverse-ratio set spanning the
//! linear curve (1) to extreme curvature (1000), supply derived as
//! `balance * ratio`, and amounts generated by dividing the base quantity
//! (supply for sales, balance for purchases) by a fixed divisor list.
//! The divisor scheme concentrates samples at both extremes of the valid
//! amount range, where fixed-point approximation error is typically
//! largest. Amounts are always floored from the unscaled base; the
//! unit-scaling convention is then applied uniformly to supply, balance,
//! and the floored amount, so every convention evaluates the same set of
//! relative points and emits the same number of tuples.
//!
//! The generator is the single validation gate: every tuple it emits
//! satisfies the `CurveParams` and amount invariants. Amounts that floor
//! to zero are dropped silently (a degenerate, uninformative case), not
//! surfaced as errors. The iterator is finite, restartable, and
//! deterministic; re-running it yields the identical sequence.

use serde::Serialize;

use crate::params::{CurveParams, Direction};

/// Monotonic unit-scaling conventions applied uniformly to supply,
/// balance, and amount base quantities. The ratio dimension is never
/// scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitScale {
    /// Identity: quantities as given.
    Raw,
    /// Multiply by 10^9.
    Giga,
    /// Multiply by 10^18 (smallest-unit-per-whole-token convention).
    BaseUnits,
}

pub const ALL_SCALES: [UnitScale; 3] = [UnitScale::Raw, UnitScale::Giga, UnitScale::BaseUnits];

impl UnitScale {
    pub fn factor(&self) -> u128 {
        match self {
            UnitScale::Raw => 1,
            UnitScale::Giga => 1_000_000_000,
            UnitScale::BaseUnits => 1_000_000_000_000_000_000,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UnitScale::Raw => "raw",
            UnitScale::Giga => "giga",
            UnitScale::BaseUnits => "base",
        }
    }

    pub fn apply(&self, value: u128) -> Option<u128> {
        value.checked_mul(self.factor())
    }
}

impl std::fmt::Display for UnitScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Representative reserve balances (pre-scaling).
pub const RESERVE_BALANCES: [u128; 1] = [100];

/// Inverse reserve ratios, tight to extreme curvature. Ratio 1 is the
/// linear boundary and is deliberately swept, not special-cased.
pub const INVERSE_RATIOS: [u32; 9] = [1, 2, 3, 5, 10, 20, 50, 100, 1000];

/// Amount divisors as exact rationals `(numerator, denominator)`, deep
/// (base/1000) to shallow (the full base). Fractional divisors like 1.001
/// are kept exact so they survive unit scaling without float loss.
pub const DIVISORS: [(u128, u128); 17] = [
    (1000, 1),
    (500, 1),
    (333, 1),
    (200, 1),
    (100, 1),
    (50, 1),
    (25, 1),
    (10, 1),
    (5, 1),
    (3, 1),
    (2, 1),
    (11, 10),
    (21, 20),
    (101, 100),
    (201, 200),
    (1001, 1000),
    (1, 1),
];

/// One fully validated evaluation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepTuple {
    pub params: CurveParams,
    pub amount: u128,
    pub direction: Direction,
}

/// `floor(base * den / num)`, `None` on overflow or a zero result.
fn scaled_amount(base: u128, divisor: (u128, u128)) -> Option<u128> {
    let (num, den) = divisor;
    let amount = base.checked_mul(den)? / num;
    if amount == 0 {
        None
    } else {
        Some(amount)
    }
}

/// Lazy Cartesian iterator over the sweep dimensions.
///
/// Enumeration order: for each balance, for each ratio, all sale amounts
/// (deep to shallow), then all purchase amounts. Report emission order
/// equals this order.
pub struct ParameterSweep {
    scale: UnitScale,
    balance_idx: usize,
    ratio_idx: usize,
    direction: Direction,
    divisor_idx: usize,
}

impl ParameterSweep {
    pub fn new(scale: UnitScale) -> Self {
        Self {
            scale,
            balance_idx: 0,
            ratio_idx: 0,
            direction: Direction::Sale,
            divisor_idx: 0,
        }
    }

    fn advance(&mut self) {
        self.divisor_idx += 1;
        if self.divisor_idx < DIVISORS.len() {
            return;
        }
        self.divisor_idx = 0;
        match self.direction {
            Direction::Sale => {
                self.direction = Direction::Purchase;
            }
            Direction::Purchase => {
                self.direction = Direction::Sale;
                self.ratio_idx += 1;
                if self.ratio_idx == INVERSE_RATIOS.len() {
                    self.ratio_idx = 0;
                    self.balance_idx += 1;
                }
            }
        }
    }

    /// Builds the tuple at the current cursor, or `None` if it fails the
    /// invariant gate (dropped, not an error).
    fn current(&self) -> Option<SweepTuple> {
        let balance = RESERVE_BALANCES[self.balance_idx];
        let ratio = INVERSE_RATIOS[self.ratio_idx];
        let supply = balance.checked_mul(u128::from(ratio))?;

        // Amounts are derived from the unscaled base, so every convention
        // samples the same relative points; the convention then transforms
        // supply, balance, and the floored amount uniformly.
        let base = match self.direction {
            Direction::Sale => supply,
            Direction::Purchase => balance,
        };
        let amount = scaled_amount(base, DIVISORS[self.divisor_idx])?;

        let scaled_balance = self.scale.apply(balance)?;
        let scaled_supply = self.scale.apply(supply)?;
        let amount = self.scale.apply(amount)?;
        let params = CurveParams::new(scaled_supply, scaled_balance, ratio).ok()?;
        params.check_amount(amount, self.direction).ok()?;

        Some(SweepTuple {
            params,
            amount,
            direction: self.direction,
        })
    }
}

impl Iterator for ParameterSweep {
    type Item = SweepTuple;

    fn next(&mut self) -> Option<SweepTuple> {
        while self.balance_idx < RESERVE_BALANCES.len() {
            let tuple = self.current();
            self.advance();
            if tuple.is_some() {
                return tuple;
            }
        }
        None
    }
}
