//! Bonding-curve fixed-point comparison harness.
//!
//! Benchmarks and cross-validates competing fixed-point implementations
//! of the continuous bonding-curve pricing formula against a closed-form
//! real-valued reference oracle. For every swept
//! (supply, balance, ratio, amount) tuple the harness records each
//! candidate's return value and metered cost, derives absolute/relative
//! error against the oracle, and appends one row to a sale-side or
//! purchase-side CSV table. Reverting candidates are isolated per call
//! and never abort the sweep.

pub mod candidate;
pub mod candidates;
pub mod compare;
pub mod error;
pub mod oracle;
pub mod outcome;
pub mod params;
pub mod report;
pub mod scenario;
pub mod sweep;

pub use candidate::{BondingCurve, CandidateRegistry, Invoker, OpMeter, RatioKind};
pub use candidates::{default_registry, IntExpCurve, PpmCurve};
pub use compare::{Comparator, ComparisonRow, RowObserver};
pub use error::{BenchError, CurveError};
pub use outcome::{CallOutcome, Cost};
pub use params::{CurveParams, Direction};
pub use report::{ReportSink, ReportTable};
pub use scenario::{run_all, RunConfig, Stats, SweepMode, SweepSummary};
pub use sweep::{ParameterSweep, SweepTuple, UnitScale, ALL_SCALES};
