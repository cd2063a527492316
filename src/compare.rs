//! Comparator: evaluates one tuple against the oracle and both
//! candidates, derives error and cost metrics, and classifies the outcome.
//!
//! Metric policy (deliberately asymmetric): a single candidate's domain
//! failure does not block measurement of the other; both outcomes are
//! recorded verbatim. Such a row then carries no comparative metrics at
//! all. Absent means absent (`None`), never zero or infinity, so failure
//! rows cannot pollute aggregate statistics. The same fully-guarded path
//! serves both the sale and purchase sides.

use serde::Serialize;

use crate::candidate::{BondingCurve, Invoker};
use crate::oracle;
use crate::outcome::CallOutcome;
use crate::params::Direction;
use crate::sweep::SweepTuple;

/// One evaluated tuple: positional identity, outcomes, derived metrics.
///
/// Row identity is always reconstructable from the positional fields
/// alone, independent of emission order.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub supply: u128,
    pub reserve_balance: u128,
    pub inverse_ratio: u32,
    pub amount: u128,
    pub direction: Direction,
    pub real_return: f64,
    pub outcome_a: CallOutcome,
    pub outcome_b: CallOutcome,
    pub error_a: Option<f64>,
    pub error_b: Option<f64>,
    pub rel_error_a: Option<f64>,
    pub rel_error_b: Option<f64>,
    pub cost_delta_ratio: Option<f64>,
}

impl ComparisonRow {
    pub fn all_succeeded(&self) -> bool {
        self.outcome_a.is_success() && self.outcome_b.is_success()
    }
}

/// Optional observer receiving each row as it is produced. Presentation
/// concerns (progress output, colored revert logs) hang off this hook
/// rather than living in the comparator.
pub trait RowObserver {
    fn on_row(&mut self, row: &ComparisonRow);
}

/// Absolute error of a candidate value against the oracle, `None` when
/// the oracle value is not a finite real (overflow to infinity at the
/// extremes of the swept range).
fn absolute_error(value: u128, real: f64) -> Option<f64> {
    if real.is_finite() {
        Some(value as f64 - real)
    } else {
        None
    }
}

/// Relative error; undefined when the reference value is zero.
fn relative_error(abs_error: Option<f64>, real: f64) -> Option<f64> {
    match abs_error {
        Some(err) if real != 0.0 => Some(err / real),
        _ => None,
    }
}

/// Pairs two candidates ("A" and "B") against the reference oracle.
pub struct Comparator<'a> {
    invoker_a: Invoker<'a>,
    invoker_b: Invoker<'a>,
}

impl<'a> Comparator<'a> {
    pub fn new(candidate_a: &'a dyn BondingCurve, candidate_b: &'a dyn BondingCurve) -> Self {
        Self {
            invoker_a: Invoker::new(candidate_a),
            invoker_b: Invoker::new(candidate_b),
        }
    }

    pub fn candidate_names(&self) -> (&'static str, &'static str) {
        (self.invoker_a.name(), self.invoker_b.name())
    }

    /// Evaluates one tuple: oracle plus both candidates plus metrics.
    pub fn evaluate(&self, tuple: &SweepTuple) -> ComparisonRow {
        let real = oracle::real_return(&tuple.params, tuple.amount, tuple.direction);
        let outcome_a = self.invoker_a.call(&tuple.params, tuple.amount, tuple.direction);
        let outcome_b = self.invoker_b.call(&tuple.params, tuple.amount, tuple.direction);

        let (error_a, error_b, rel_error_a, rel_error_b, cost_delta_ratio) =
            match (&outcome_a, &outcome_b) {
                (
                    CallOutcome::Success { value: va, cost: ca },
                    CallOutcome::Success { value: vb, cost: cb },
                ) => {
                    let err_a = absolute_error(*va, real);
                    let err_b = absolute_error(*vb, real);
                    let rel_a = relative_error(err_a, real);
                    let rel_b = relative_error(err_b, real);
                    let delta = match (ca.gas(), cb.gas()) {
                        (Some(ga), Some(gb)) if ga > 0 => {
                            Some((gb as f64 - ga as f64) / ga as f64)
                        }
                        _ => None,
                    };
                    (err_a, err_b, rel_a, rel_b, delta)
                }
                // Any failure: outcomes recorded verbatim, metrics absent.
                _ => (None, None, None, None, None),
            };

        ComparisonRow {
            supply: tuple.params.supply,
            reserve_balance: tuple.params.reserve_balance,
            inverse_ratio: tuple.params.inverse_ratio,
            amount: tuple.amount,
            direction: tuple.direction,
            real_return: real,
            outcome_a,
            outcome_b,
            error_a,
            error_b,
            rel_error_a,
            rel_error_b,
            cost_delta_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::RatioKind;
    use crate::candidates::{IntExpCurve, PpmCurve};
    use crate::error::CurveError;
    use crate::params::CurveParams;

    fn tuple(supply: u128, balance: u128, ratio: u32, amount: u128, direction: Direction) -> SweepTuple {
        SweepTuple {
            params: CurveParams::new(supply, balance, ratio).unwrap(),
            amount,
            direction,
        }
    }

    #[test]
    fn reference_scenario_real_return() {
        let cmp = Comparator::new(&PpmCurve, &IntExpCurve);
        let row = cmp.evaluate(&tuple(1000, 100, 5, 200, Direction::Sale));
        assert!((row.real_return - 67.232).abs() < 1e-9);
        assert!(row.all_succeeded());
    }

    #[test]
    fn relative_error_recomputable_from_row() {
        let cmp = Comparator::new(&PpmCurve, &IntExpCurve);
        let row = cmp.evaluate(&tuple(1000, 100, 5, 200, Direction::Sale));
        let err = row.error_a.unwrap();
        let rel = row.rel_error_a.unwrap();
        assert_eq!(rel, err / row.real_return);
        let va = row.outcome_a.value().unwrap();
        assert_eq!(err, va as f64 - row.real_return);
    }

    struct AlwaysRevert;

    impl BondingCurve for AlwaysRevert {
        fn name(&self) -> &'static str {
            "always-revert"
        }
        fn ratio_kind(&self) -> RatioKind {
            RatioKind::ExponentOffsetOne
        }
        fn purchase_return(&self, _: u128, _: u128, _: u64, _: u128) -> Result<u128, CurveError> {
            Err(CurveError::Domain("synthetic".into()))
        }
        fn sale_return(&self, _: u128, _: u128, _: u64, _: u128) -> Result<u128, CurveError> {
            Err(CurveError::Domain("synthetic".into()))
        }
        fn purchase_cost(&self, _: u128, _: u128, _: u64, _: u128) -> Result<u64, CurveError> {
            Err(CurveError::Domain("synthetic".into()))
        }
        fn sale_cost(&self, _: u128, _: u128, _: u64, _: u128) -> Result<u64, CurveError> {
            Err(CurveError::Domain("synthetic".into()))
        }
    }

    #[test]
    fn single_failure_blanks_all_metrics_but_keeps_outcomes() {
        let cmp = Comparator::new(&PpmCurve, &AlwaysRevert);
        let row = cmp.evaluate(&tuple(1000, 100, 5, 200, Direction::Sale));
        // Oracle and the surviving candidate are still recorded verbatim.
        assert!((row.real_return - 67.232).abs() < 1e-9);
        assert!(row.outcome_a.is_success());
        assert!(!row.outcome_b.is_success());
        // Metrics are genuinely absent, not zero.
        assert!(row.error_a.is_none());
        assert!(row.error_b.is_none());
        assert!(row.rel_error_a.is_none());
        assert!(row.rel_error_b.is_none());
        assert!(row.cost_delta_ratio.is_none());
    }

    #[test]
    fn ratio_one_is_not_special_cased() {
        let cmp = Comparator::new(&PpmCurve, &IntExpCurve);
        let row = cmp.evaluate(&tuple(100, 100, 1, 50, Direction::Purchase));
        assert!(row.all_succeeded());
        // Linear identity: amount * supply / balance = 50.
        assert!((row.real_return - 50.0).abs() < 1e-9);
        assert_eq!(row.outcome_a.value(), Some(50));
        assert_eq!(row.outcome_b.value(), Some(50));
    }
}
