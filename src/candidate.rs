//! Capability interface for candidate curve implementations, plus the
//! invoker that isolates their faults.
//!
//! Each candidate exposes, per direction, a value-computation entry point
//! and a matching cost-estimation entry point with identical argument
//! lists. Both are pure: no cross-call state, same arguments give the same
//! result and the same cost. The [`Invoker`] wraps a candidate behind a
//! uniform fallible-call contract: any candidate fault becomes a
//! [`CallOutcome::Failure`], never a propagated error, so one candidate
//! being undefined at a point cannot stop the sweep.

use crate::error::CurveError;
use crate::outcome::{CallOutcome, Cost};
use crate::params::{CurveParams, Direction};

/// How a candidate expects the reserve ratio to be encoded.
///
/// The harness holds the ratio in inverse form (`1/r`); this is the single
/// translation point to implementation-specific representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioKind {
    /// Direct ratio scaled to parts-per-million: `1_000_000 / inverse_ratio`.
    PartsPerMillion,
    /// Inverse ratio as a small integer exponent, offset by one so ratio 1
    /// is representable as exponent 0.
    ExponentOffsetOne,
}

impl RatioKind {
    pub fn encode(&self, inverse_ratio: u32) -> u64 {
        match self {
            RatioKind::PartsPerMillion => 1_000_000 / u64::from(inverse_ratio),
            RatioKind::ExponentOffsetOne => u64::from(inverse_ratio) - 1,
        }
    }
}

/// Deterministic operation meter standing in for gas metering.
///
/// Candidates charge weighted operation counts while computing; the cost
/// probe re-runs the computation against a fresh meter, the way an
/// `estimateGas` call re-executes the underlying call.
#[derive(Debug, Default)]
pub struct OpMeter {
    gas: u64,
}

impl OpMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn charge(&mut self, units: u64) {
        self.gas = self.gas.saturating_add(units);
    }

    pub fn total(&self) -> u64 {
        self.gas
    }
}

/// One candidate fixed-point implementation of the bonding curve.
///
/// Each direction exposes a value-computation entry point and a matching
/// cost-estimation entry point with identical argument lists; both must
/// be pure, so estimating cost never perturbs a value result. `ratio`
/// arrives pre-encoded per [`RatioKind`]. Implementations must return
/// `Err` for any input they cannot represent (overflow, domain
/// violation, unsupported ratio) and must never panic on the documented
/// input range.
pub trait BondingCurve: Send + Sync {
    fn name(&self) -> &'static str;

    fn ratio_kind(&self) -> RatioKind;

    fn purchase_return(
        &self,
        supply: u128,
        reserve_balance: u128,
        ratio: u64,
        amount: u128,
    ) -> Result<u128, CurveError>;

    fn sale_return(
        &self,
        supply: u128,
        reserve_balance: u128,
        ratio: u64,
        amount: u128,
    ) -> Result<u128, CurveError>;

    fn purchase_cost(
        &self,
        supply: u128,
        reserve_balance: u128,
        ratio: u64,
        amount: u128,
    ) -> Result<u64, CurveError>;

    fn sale_cost(
        &self,
        supply: u128,
        reserve_balance: u128,
        ratio: u64,
        amount: u128,
    ) -> Result<u64, CurveError>;
}

/// Uniform fallible-call wrapper around one candidate.
pub struct Invoker<'a> {
    curve: &'a dyn BondingCurve,
}

impl<'a> Invoker<'a> {
    pub fn new(curve: &'a dyn BondingCurve) -> Self {
        Self { curve }
    }

    pub fn name(&self) -> &'static str {
        self.curve.name()
    }

    fn compute_value(
        &self,
        params: &CurveParams,
        amount: u128,
        direction: Direction,
    ) -> Result<u128, CurveError> {
        let ratio = self.curve.ratio_kind().encode(params.inverse_ratio);
        match direction {
            Direction::Sale => {
                self.curve
                    .sale_return(params.supply, params.reserve_balance, ratio, amount)
            }
            Direction::Purchase => {
                self.curve
                    .purchase_return(params.supply, params.reserve_balance, ratio, amount)
            }
        }
    }

    fn estimate_cost(
        &self,
        params: &CurveParams,
        amount: u128,
        direction: Direction,
    ) -> Result<u64, CurveError> {
        let ratio = self.curve.ratio_kind().encode(params.inverse_ratio);
        match direction {
            Direction::Sale => {
                self.curve
                    .sale_cost(params.supply, params.reserve_balance, ratio, amount)
            }
            Direction::Purchase => {
                self.curve
                    .purchase_cost(params.supply, params.reserve_balance, ratio, amount)
            }
        }
    }

    /// Value call plus parallel cost probe.
    ///
    /// The probe is an independent call to the candidate's cost entry
    /// point with identical arguments; if it fails while the value call
    /// succeeded, cost is reported as [`Cost::Unavailable`] rather than
    /// failing the outcome.
    pub fn call(&self, params: &CurveParams, amount: u128, direction: Direction) -> CallOutcome {
        match self.compute_value(params, amount, direction) {
            Ok(value) => {
                let cost = match self.estimate_cost(params, amount, direction) {
                    Ok(gas) => Cost::Gas(gas),
                    Err(_) => Cost::Unavailable,
                };
                CallOutcome::Success { value, cost }
            }
            Err(reason) => {
                tracing::debug!(
                    candidate = self.curve.name(),
                    %direction,
                    supply = %params.supply,
                    balance = %params.reserve_balance,
                    ratio = params.inverse_ratio,
                    amount = %amount,
                    %reason,
                    "candidate revert"
                );
                CallOutcome::Failure {
                    reason: reason.to_string(),
                }
            }
        }
    }
}

/// Named candidate set for one run, in registration order.
///
/// The comparator pairs the first two registered candidates as "A" and "B"
/// for the two-candidate report schema; single-candidate sweeps look up by
/// name.
#[derive(Default)]
pub struct CandidateRegistry {
    entries: Vec<Box<dyn BondingCurve>>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, curve: Box<dyn BondingCurve>) {
        self.entries.push(curve);
    }

    pub fn get(&self, name: &str) -> Option<&dyn BondingCurve> {
        self.entries
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|c| c.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_encoding() {
        assert_eq!(RatioKind::PartsPerMillion.encode(1), 1_000_000);
        assert_eq!(RatioKind::PartsPerMillion.encode(3), 333_333);
        assert_eq!(RatioKind::PartsPerMillion.encode(1000), 1_000);
        assert_eq!(RatioKind::ExponentOffsetOne.encode(1), 0);
        assert_eq!(RatioKind::ExponentOffsetOne.encode(1000), 999);
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
    fn registry_tracks_registration_order() {
        let mut registry = CandidateRegistry::new();
        assert!(registry.is_empty());
        registry.register(Box::new(AlwaysRevert));
        registry.register(Box::new(CostlessCurve));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["always-revert", "costless"]);
        assert!(registry.get("costless").is_some());
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn invoker_converts_faults_to_failure() {
        let curve = AlwaysRevert;
        let invoker = Invoker::new(&curve);
        let params = CurveParams::new(1000, 100, 5).unwrap();
        let outcome = invoker.call(&params, 10, Direction::Sale);
        match outcome {
            CallOutcome::Failure { reason } => assert!(reason.contains("synthetic")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    // Value entry points succeed, cost entry points revert.
    struct CostlessCurve;

    impl BondingCurve for CostlessCurve {
        fn name(&self) -> &'static str {
            "costless"
        }
        fn ratio_kind(&self) -> RatioKind {
            RatioKind::ExponentOffsetOne
        }
        fn purchase_return(&self, _: u128, _: u128, _: u64, amount: u128) -> Result<u128, CurveError> {
            Ok(amount)
        }
        fn sale_return(&self, _: u128, _: u128, _: u64, amount: u128) -> Result<u128, CurveError> {
            Ok(amount)
        }
        fn purchase_cost(&self, _: u128, _: u128, _: u64, _: u128) -> Result<u64, CurveError> {
            Err(CurveError::Domain("no meter".into()))
        }
        fn sale_cost(&self, _: u128, _: u128, _: u64, _: u128) -> Result<u64, CurveError> {
            Err(CurveError::Domain("no meter".into()))
        }
    }

    #[test]
    fn failed_cost_probe_is_unavailable_not_failure() {
        let curve = CostlessCurve;
        let invoker = Invoker::new(&curve);
        let params = CurveParams::new(1000, 100, 5).unwrap();
        let outcome = invoker.call(&params, 10, Direction::Sale);
        assert_eq!(
            outcome,
            CallOutcome::Success {
                value: 10,
                cost: Cost::Unavailable,
            }
        );
        assert_eq!(outcome.gas(), None);
    }
}
