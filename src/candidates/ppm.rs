//! Parts-per-million candidate over `rust_decimal` fixed-point arithmetic.
//!
//! Takes the reserve ratio as a direct ratio scaled by 1,000,000
//! (`1_000_000 / inverse_ratio`), so ratio 1 arrives as `1_000_000` ppm and
//! the extreme 1/1000 curve as `1_000` ppm. All arithmetic runs on
//! 96-bit-mantissa `Decimal` with checked operations; any unrepresentable
//! intermediate surfaces as a revert, never a panic.
//!
//! Note the representation distortion this encoding carries: an inverse
//! ratio of 3 becomes 333,333 ppm, so the candidate evaluates a slightly
//! different curve than the oracle. That distortion is part of what the
//! harness measures.

use num_traits::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::candidate::{BondingCurve, OpMeter, RatioKind};
use crate::error::CurveError;

const PPM_SCALE: Decimal = dec!(1000000);
pub const MAX_RATIO_PPM: u64 = 1_000_000;

// Operation weights for the deterministic cost meter.
const GAS_BASE: u64 = 498;
const GAS_CONVERT: u64 = 64;
const GAS_ARITH: u64 = 133;
const GAS_POW: u64 = 27_406;

fn dec_from_u128(value: u128, what: &'static str) -> Result<Decimal, CurveError> {
    let signed = i128::try_from(value).map_err(|_| CurveError::Overflow(what))?;
    Decimal::try_from_i128_with_scale(signed, 0).map_err(|_| CurveError::Overflow(what))
}

fn floor_to_u128(value: Decimal, what: &'static str) -> Result<u128, CurveError> {
    value.floor().to_u128().ok_or(CurveError::Overflow(what))
}

fn check_ratio(ppm: u64) -> Result<Decimal, CurveError> {
    if ppm == 0 || ppm > MAX_RATIO_PPM {
        return Err(CurveError::InvalidRatio(format!(
            "ratio {ppm} ppm outside (0, {MAX_RATIO_PPM}]"
        )));
    }
    Ok(Decimal::from(ppm))
}

/// Bancor-style ppm candidate.
pub struct PpmCurve;

impl PpmCurve {
    fn purchase_metered(
        &self,
        supply: u128,
        reserve_balance: u128,
        ratio: u64,
        amount: u128,
        meter: &mut OpMeter,
    ) -> Result<u128, CurveError> {
        meter.charge(GAS_BASE);
        let ppm = check_ratio(ratio)?;
        if amount == 0 {
            return Err(CurveError::ZeroAmount);
        }

        let s = dec_from_u128(supply, "supply -> Decimal")?;
        let b = dec_from_u128(reserve_balance, "balance -> Decimal")?;
        let a = dec_from_u128(amount, "amount -> Decimal")?;
        meter.charge(3 * GAS_CONVERT);

        // supply * ((1 + amount/balance)^(ppm/1e6) - 1)
        let base = Decimal::ONE + a.checked_div(b).ok_or(CurveError::Overflow("amount/balance"))?;
        let exponent = ppm / PPM_SCALE;
        meter.charge(2 * GAS_ARITH);

        let powered = base
            .checked_powd(exponent)
            .ok_or(CurveError::Overflow("powd"))?;
        meter.charge(GAS_POW);

        let gain = s
            .checked_mul(powered - Decimal::ONE)
            .ok_or(CurveError::Overflow("supply * gain"))?;
        meter.charge(2 * GAS_ARITH);

        floor_to_u128(gain, "result -> u128")
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
        let ppm = check_ratio(ratio)?;
        if amount == 0 {
            return Err(CurveError::ZeroAmount);
        }
        if amount > supply {
            return Err(CurveError::AmountExceedsSupply { amount, supply });
        }
        // Selling the entire supply drains the reserve exactly.
        if amount == supply {
            return Ok(reserve_balance);
        }

        let s = dec_from_u128(supply, "supply -> Decimal")?;
        let b = dec_from_u128(reserve_balance, "balance -> Decimal")?;
        let a = dec_from_u128(amount, "amount -> Decimal")?;
        meter.charge(3 * GAS_CONVERT);

        // balance * (1 - (1 - amount/supply)^(1e6/ppm))
        let base = Decimal::ONE - a.checked_div(s).ok_or(CurveError::Overflow("amount/supply"))?;
        let exponent = PPM_SCALE / ppm;
        meter.charge(2 * GAS_ARITH);

        let powered = base
            .checked_powd(exponent)
            .ok_or(CurveError::Overflow("powd"))?;
        meter.charge(GAS_POW);

        let payout = b
            .checked_mul(Decimal::ONE - powered)
            .ok_or(CurveError::Overflow("balance * payout"))?;
        meter.charge(2 * GAS_ARITH);

        floor_to_u128(payout, "result -> u128")
    }
}

impl BondingCurve for PpmCurve {
    fn name(&self) -> &'static str {
        "ppm"
    }

    fn ratio_kind(&self) -> RatioKind {
        RatioKind::PartsPerMillion
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
