//! Small-integer-exponent candidate over Q64.64 `u128` fixed point.
//!
//! Takes the inverse reserve ratio as a plain integer exponent offset by
//! one (`inverse_ratio - 1`), so the linear ratio-1 curve arrives as
//! exponent 0. Sales raise the kept-supply fraction to the exponent with
//! square-and-multiply; purchases take the matching nth root with Newton
//! iteration. Everything is checked `u128` arithmetic; quantities at or
//! above 2^64 cannot be lifted into Q64.64 and revert, as do exponents
//! beyond [`MAX_EXPONENT`]. Those are this candidate's domain limits, and
//! probing them is the point of the sweep.

use crate::candidate::{BondingCurve, OpMeter, RatioKind};
use crate::error::CurveError;

const FRAC_BITS: u32 = 64;
const ONE_Q64: u128 = 1 << FRAC_BITS;
const LO_MASK: u128 = ONE_Q64 - 1;

/// Largest representable exponent (inverse ratio 256). Ratio 1000 sweeps
/// exercise the rejection path.
pub const MAX_EXPONENT: u64 = 255;

const MAX_ROOT_ITERS: u32 = 32;

// Operation weights for the deterministic cost meter.
const GAS_BASE: u64 = 327;
const GAS_MUL: u64 = 52;
const GAS_DIV: u64 = 68;
const GAS_ROOT_ITER: u64 = 215;

/// Lift an integer quantity into Q64.64.
fn to_q64(value: u128) -> Result<u128, CurveError> {
    if value > (u128::MAX >> FRAC_BITS) {
        return Err(CurveError::Overflow("quantity -> Q64.64"));
    }
    Ok(value << FRAC_BITS)
}

/// Q64.64 multiply via 64-bit limb decomposition; `None` on overflow.
fn mul_q64(a: u128, b: u128) -> Option<u128> {
    let (ah, al) = (a >> FRAC_BITS, a & LO_MASK);
    let (bh, bl) = (b >> FRAC_BITS, b & LO_MASK);

    let mut acc = (al * bl) >> FRAC_BITS;
    acc = acc.checked_add(ah.checked_mul(bl)?)?;
    acc = acc.checked_add(al.checked_mul(bh)?)?;
    let hh = ah.checked_mul(bh)?;
    if hh > (u128::MAX >> FRAC_BITS) {
        return None;
    }
    acc.checked_add(hh << FRAC_BITS)
}

/// Q64.64 divide by long division: integer part, then two 32-bit
/// fractional steps, exact to the last fractional bit.
fn div_q64(a: u128, b: u128) -> Option<u128> {
    if b == 0 {
        return None;
    }
    let int = a / b;
    if int > (u128::MAX >> FRAC_BITS) {
        return None;
    }
    let mut result = int << FRAC_BITS;
    let mut rem = a % b;
    for shift in [32u32, 0u32] {
        if rem == 0 {
            break;
        }
        if rem > (u128::MAX >> 32) {
            return None;
        }
        let q = (rem << 32) / b;
        rem = (rem << 32) % b;
        result = result.checked_add(q << shift)?;
    }
    Some(result)
}

/// Square-and-multiply power in Q64.64.
fn pow_q64(mut base: u128, mut exp: u64, meter: &mut OpMeter) -> Option<u128> {
    let mut acc = ONE_Q64;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul_q64(acc, base)?;
            meter.charge(GAS_MUL);
        }
        exp >>= 1;
        if exp > 0 {
            base = mul_q64(base, base)?;
            meter.charge(GAS_MUL);
        }
    }
    Some(acc)
}

/// Newton nth root of `x >= 1.0` in Q64.64.
///
/// Starts from the Bernoulli upper bound `1 + (x-1)/n` and iterates
/// `y <- ((n-1)y + x/y^(n-1)) / n` until the update is within one ulp or
/// the iteration cap is hit; either way the result is deterministic.
fn nth_root_q64(x: u128, n: u64, meter: &mut OpMeter) -> Option<u128> {
    debug_assert!(n >= 2);
    debug_assert!(x >= ONE_Q64);
    let n_wide = u128::from(n);
    let mut y = ONE_Q64 + (x - ONE_Q64) / n_wide;
    for _ in 0..MAX_ROOT_ITERS {
        meter.charge(GAS_ROOT_ITER);
        let y_pow = pow_q64(y, n - 1, meter)?;
        let quot = div_q64(x, y_pow)?;
        meter.charge(GAS_DIV);
        let next = y.checked_mul(n_wide - 1)?.checked_add(quot)? / n_wide;
        if next.abs_diff(y) <= 1 {
            return Some(next);
        }
        y = next;
    }
    Some(y)
}

fn check_exponent(ratio: u64) -> Result<u64, CurveError> {
    if ratio > MAX_EXPONENT {
        return Err(CurveError::InvalidRatio(format!(
            "exponent {ratio} exceeds maximum {MAX_EXPONENT}"
        )));
    }
    Ok(ratio + 1)
}

/// Simple fixed-point candidate with an integer-exponent curve family.
pub struct IntExpCurve;

impl IntExpCurve {
    fn purchase_metered(
        &self,
        supply: u128,
        reserve_balance: u128,
        ratio: u64,
        amount: u128,
        meter: &mut OpMeter,
    ) -> Result<u128, CurveError> {
        meter.charge(GAS_BASE);
        let n = check_exponent(ratio)?;
        if amount == 0 {
            return Err(CurveError::ZeroAmount);
        }
        if reserve_balance == 0 {
            return Err(CurveError::Domain("zero reserve balance".into()));
        }

        if n == 1 {
            // Linear curve: supply * amount / balance.
            meter.charge(GAS_MUL + GAS_DIV);
            return supply
                .checked_mul(amount)
                .map(|v| v / reserve_balance)
                .ok_or(CurveError::Overflow("supply * amount"));
        }

        // (1 + amount/balance)^(1/n) - 1, scaled by supply.
        let amount_q = to_q64(amount)?;
        let base = ONE_Q64
            .checked_add(amount_q / reserve_balance)
            .ok_or(CurveError::Overflow("1 + amount/balance"))?;
        meter.charge(GAS_DIV);

        let root = nth_root_q64(base, n, meter).ok_or(CurveError::Overflow("nth root"))?;
        let gain = root.max(ONE_Q64) - ONE_Q64;

        meter.charge(GAS_MUL);
        supply
            .checked_mul(gain)
            .map(|v| v >> FRAC_BITS)
            .ok_or(CurveError::Overflow("supply * gain"))
    }

    fn sale_metered(
        &self,
        supply: u128,
        reserve_balance: u128,
        ratio: u64,
        amount: u128,
        meter: &mut OpMeter,
    ) -> Result<u128, CurveError> {
        meter.charge(GAS_BASE);
        let n = check_exponent(ratio)?;
        if amount == 0 {
            return Err(CurveError::ZeroAmount);
        }
        if amount > supply {
            return Err(CurveError::AmountExceedsSupply { amount, supply });
        }
        if amount == supply {
            return Ok(reserve_balance);
        }

        // kept = ((supply - amount)/supply)^n; payout = balance * (1 - kept).
        let remaining_q = to_q64(supply - amount)?;
        let kept_ratio = remaining_q / supply;
        meter.charge(GAS_DIV);

        let kept = pow_q64(kept_ratio, n, meter).ok_or(CurveError::Overflow("pow"))?;
        let payout_frac = ONE_Q64 - kept;

        meter.charge(GAS_MUL);
        reserve_balance
            .checked_mul(payout_frac)
            .map(|v| v >> FRAC_BITS)
            .ok_or(CurveError::Overflow("balance * payout"))
    }
}

impl BondingCurve for IntExpCurve {
    fn name(&self) -> &'static str {
        "int-exp"
    }

    fn ratio_kind(&self) -> RatioKind {
        RatioKind::ExponentOffsetOne
    }

    fn purchase_return(
        &self,
        supply: u128,
        reserve_balance: u128,
        ratio: u64,
        amount: u128,
    ) -> Result<u128, CurveError> {
        self.purchase_metered(supply, reserve_balance, ratio, amount, &mut OpMeter::new())
    }

    fn sale_return(
        &self,
        supply: u128,
        reserve_balance: u128,
        ratio: u64,
        amount: u128,
    ) -> Result<u128, CurveError> {
        self.sale_metered(supply, reserve_balance, ratio, amount, &mut OpMeter::new())
    }

    fn purchase_cost(
        &self,
        supply: u128,
        reserve_balance: u128,
        ratio: u64,
        amount: u128,
    ) -> Result<u64, CurveError> {
        let mut meter = OpMeter::new();
        self.purchase_metered(supply, reserve_balance, ratio, amount, &mut meter)?;
        Ok(meter.total())
    }

    fn sale_cost(
        &self,
        supply: u128,
        reserve_balance: u128,
        ratio: u64,
        amount: u128,
    ) -> Result<u64, CurveError> {
        let mut meter = OpMeter::new();
        self.sale_metered(supply, reserve_balance, ratio, amount, &mut meter)?;
        Ok(meter.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(supply: u128, balance: u128, offset: u64, amount: u128) -> Result<u128, CurveError> {
        IntExpCurve.sale_return(supply, balance, offset, amount)
    }

    fn purchase(supply: u128, balance: u128, offset: u64, amount: u128) -> Result<u128, CurveError> {
        IntExpCurve.purchase_return(supply, balance, offset, amount)
    }

    #[test]
    fn linear_curve_at_offset_zero() {
        assert_eq!(purchase(1000, 100, 0, 50).unwrap(), 500);
        assert_eq!(sale(1000, 100, 0, 200).unwrap(), 20);
    }

    #[test]
    fn matches_oracle_on_reference_scenario() {
        // supply=1000, balance=100, 1/r=5 (offset 4), sell 200 -> 67.232
        assert_eq!(sale(1000, 100, 4, 200).unwrap(), 67);
    }

    #[test]
    fn purchase_root_close_to_real_value() {
        // supply=500, balance=100, 1/r=5: 500*((1+50/100)^(1/5)-1) = 42.0048...
        let got = purchase(500, 100, 4, 50).unwrap();
        assert_eq!(got, 42);
    }

    #[test]
    fn rejects_oversized_exponent() {
        // Inverse ratio 1000 arrives as offset 999.
        assert!(matches!(sale(100_000, 100, 999, 50), Err(CurveError::InvalidRatio(_))));
        assert!(matches!(purchase(100_000, 100, 999, 50), Err(CurveError::InvalidRatio(_))));
    }

    #[test]
    fn reverts_above_q64_range() {
        // Base-unit scale quantities exceed the Q64.64 integer range.
        let supply = 1u128 << 70;
        assert!(matches!(
            sale(supply, 100, 4, 1000),
            Err(CurveError::Overflow(_))
        ));
    }

    #[test]
    fn full_sale_returns_reserve() {
        assert_eq!(sale(1000, 100, 4, 1000).unwrap(), 100);
    }

    #[test]
    fn cost_grows_with_exponent() {
        let small = IntExpCurve.sale_cost(1000, 100, 1, 200).unwrap();
        let large = IntExpCurve.sale_cost(10_000, 100, 99, 200).unwrap();
        assert!(large > small);
    }

    #[test]
    fn q64_division_is_exact_on_integers() {
        let six = div_q64(12 << FRAC_BITS, 2 << FRAC_BITS).unwrap();
        assert_eq!(six, 6 << FRAC_BITS);
        let half = div_q64(ONE_Q64, 2 << FRAC_BITS).unwrap();
        assert_eq!(half, ONE_Q64 / 2);
    }

    #[test]
    fn pow_of_one_is_identity() {
        let mut meter = OpMeter::new();
        assert_eq!(pow_q64(ONE_Q64, 17, &mut meter), Some(ONE_Q64));
    }
}
