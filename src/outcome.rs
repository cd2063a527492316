//! Tagged result of one candidate invocation.

use serde::Serialize;

/// Resource consumption reported by a candidate's cost probe.
///
/// `Unavailable` is an explicit sentinel for "the cost probe itself failed
/// even though the value call succeeded"; it is never conflated with a
/// cost of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cost {
    Gas(u64),
    Unavailable,
}

impl Cost {
    pub fn gas(&self) -> Option<u64> {
        match self {
            Cost::Gas(g) => Some(*g),
            Cost::Unavailable => None,
        }
    }
}

/// Outcome of invoking one candidate for one tuple.
///
/// A `Failure` is a deterministic rejection ("revert"), not a crash: the
/// invoker converts every candidate fault into this variant so the sweep
/// can keep evaluating the remaining candidates and tuples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CallOutcome {
    Success { value: u128, cost: Cost },
    Failure { reason: String },
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success { .. })
    }

    pub fn value(&self) -> Option<u128> {
        match self {
            CallOutcome::Success { value, .. } => Some(*value),
            CallOutcome::Failure { .. } => None,
        }
    }

    pub fn gas(&self) -> Option<u64> {
        match self {
            CallOutcome::Success { cost, .. } => cost.gas(),
            CallOutcome::Failure { .. } => None,
        }
    }
}
