//! Scenario driver: runs the generator → comparator → sink pipeline once
//! per unit-scaling convention, and aggregates per-convention summaries.
//!
//! Conventions run sequentially and share no mutable state; a setup
//! failure in one (its sink cannot be opened) aborts that convention only
//! and later conventions still run. Per-tuple evaluation is sequential,
//! so report emission order equals generator enumeration order.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::candidate::{CandidateRegistry, Invoker};
use crate::compare::{Comparator, RowObserver};
use crate::error::BenchError;
use crate::oracle;
use crate::params::Direction;
use crate::report::ReportSink;
use crate::sweep::{ParameterSweep, UnitScale};

/// What each tuple evaluation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepMode {
    /// Oracle + both candidates + metrics + CSV rows.
    Compare,
    /// Oracle only, results logged; no CSV output.
    OracleOnly,
    /// One named candidate, results logged; no CSV output.
    Single(String),
}

/// Per-metric aggregation over one convention's rows.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self {
                mean: 0.0,
                min: 0.0,
                max: 0.0,
                n: 0,
            };
        }
        Self {
            mean: samples.iter().sum::<f64>() / n as f64,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

/// Outcome of one convention's sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub scale: UnitScale,
    pub candidate_a: String,
    pub candidate_b: String,
    pub sale_rows: u64,
    pub purchase_rows: u64,
    pub reverts_a: u64,
    pub reverts_b: u64,
    pub rel_error_a: Stats,
    pub rel_error_b: Stats,
    pub cost_delta_ratio: Stats,
    pub elapsed_ms: u128,
}

/// Run configuration for the full driver.
pub struct RunConfig {
    pub out_dir: PathBuf,
    pub mode: SweepMode,
    pub scales: Vec<UnitScale>,
    /// CSV file name stem; tables land as
    /// `<stem>_<scale>_sale.csv` / `<stem>_<scale>_purchase.csv`.
    pub file_stem: String,
}

impl RunConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            mode: SweepMode::Compare,
            scales: crate::sweep::ALL_SCALES.to_vec(),
            file_stem: "bonding_curve_comparison".to_string(),
        }
    }
}

/// Runs one full-comparison sweep for one convention.
pub fn run_comparison(
    scale: UnitScale,
    registry: &CandidateRegistry,
    out_dir: &Path,
    file_stem: &str,
    mut observer: Option<&mut dyn RowObserver>,
) -> Result<SweepSummary, BenchError> {
    if registry.len() < 2 {
        return Err(BenchError::Setup(
            "comparison sweep needs two registered candidates".into(),
        ));
    }
    let names = registry.names();
    let candidate_a = registry
        .get(names[0])
        .ok_or_else(|| BenchError::UnknownCandidate(names[0].into()))?;
    let candidate_b = registry
        .get(names[1])
        .ok_or_else(|| BenchError::UnknownCandidate(names[1].into()))?;
    let comparator = Comparator::new(candidate_a, candidate_b);

    let prefix = format!("{file_stem}_{}", scale.label());
    let mut sink = ReportSink::open(out_dir, &prefix)?;

    let start = Instant::now();
    let mut reverts_a = 0u64;
    let mut reverts_b = 0u64;
    let mut rel_a = Vec::new();
    let mut rel_b = Vec::new();
    let mut deltas = Vec::new();

    for tuple in ParameterSweep::new(scale) {
        let row = comparator.evaluate(&tuple);
        if !row.outcome_a.is_success() {
            reverts_a += 1;
        }
        if !row.outcome_b.is_success() {
            reverts_b += 1;
        }
        if let Some(r) = row.rel_error_a {
            rel_a.push(r);
        }
        if let Some(r) = row.rel_error_b {
            rel_b.push(r);
        }
        if let Some(d) = row.cost_delta_ratio {
            deltas.push(d);
        }
        sink.append(&row)?;
        if let Some(obs) = observer.as_deref_mut() {
            obs.on_row(&row);
        }
    }

    let (sale_rows, purchase_rows) = sink.close()?;
    let (name_a, name_b) = comparator.candidate_names();

    Ok(SweepSummary {
        scale,
        candidate_a: name_a.to_string(),
        candidate_b: name_b.to_string(),
        sale_rows,
        purchase_rows,
        reverts_a,
        reverts_b,
        rel_error_a: Stats::from_samples(&rel_a),
        rel_error_b: Stats::from_samples(&rel_b),
        cost_delta_ratio: Stats::from_samples(&deltas),
        elapsed_ms: start.elapsed().as_millis(),
    })
}

/// Oracle-only sweep: logs each real return, emits no CSV.
pub fn run_oracle_only(scale: UnitScale) -> SweepSummary {
    let start = Instant::now();
    let mut sales = 0u64;
    let mut purchases = 0u64;
    for tuple in ParameterSweep::new(scale) {
        let real = oracle::real_return(&tuple.params, tuple.amount, tuple.direction);
        tracing::info!(
            %scale,
            direction = %tuple.direction,
            supply = %tuple.params.supply,
            balance = %tuple.params.reserve_balance,
            ratio = tuple.params.inverse_ratio,
            amount = %tuple.amount,
            real,
            "oracle"
        );
        match tuple.direction {
            Direction::Sale => sales += 1,
            Direction::Purchase => purchases += 1,
        }
    }
    SweepSummary {
        scale,
        candidate_a: String::new(),
        candidate_b: String::new(),
        sale_rows: sales,
        purchase_rows: purchases,
        reverts_a: 0,
        reverts_b: 0,
        rel_error_a: Stats::from_samples(&[]),
        rel_error_b: Stats::from_samples(&[]),
        cost_delta_ratio: Stats::from_samples(&[]),
        elapsed_ms: start.elapsed().as_millis(),
    }
}

/// Single-candidate sweep: logs each outcome, emits no CSV.
pub fn run_single_candidate(
    scale: UnitScale,
    registry: &CandidateRegistry,
    name: &str,
) -> Result<SweepSummary, BenchError> {
    let curve = registry
        .get(name)
        .ok_or_else(|| BenchError::UnknownCandidate(name.to_string()))?;
    let invoker = Invoker::new(curve);

    let start = Instant::now();
    let mut sales = 0u64;
    let mut purchases = 0u64;
    let mut reverts = 0u64;
    for tuple in ParameterSweep::new(scale) {
        let outcome = invoker.call(&tuple.params, tuple.amount, tuple.direction);
        if !outcome.is_success() {
            reverts += 1;
        }
        tracing::info!(
            %scale,
            candidate = name,
            direction = %tuple.direction,
            supply = %tuple.params.supply,
            balance = %tuple.params.reserve_balance,
            ratio = tuple.params.inverse_ratio,
            amount = %tuple.amount,
            value = outcome.value().map(|v| v.to_string()).unwrap_or_else(|| "revert".into()),
            "candidate"
        );
        match tuple.direction {
            Direction::Sale => sales += 1,
            Direction::Purchase => purchases += 1,
        }
    }
    Ok(SweepSummary {
        scale,
        candidate_a: name.to_string(),
        candidate_b: String::new(),
        sale_rows: sales,
        purchase_rows: purchases,
        reverts_a: reverts,
        reverts_b: 0,
        rel_error_a: Stats::from_samples(&[]),
        rel_error_b: Stats::from_samples(&[]),
        cost_delta_ratio: Stats::from_samples(&[]),
        elapsed_ms: start.elapsed().as_millis(),
    })
}

/// Runs every configured convention sequentially. A failed convention is
/// reported in its slot; the remaining conventions still run.
pub fn run_all(
    config: &RunConfig,
    registry: &CandidateRegistry,
) -> Vec<Result<SweepSummary, BenchError>> {
    let mut results = Vec::with_capacity(config.scales.len());
    for &scale in &config.scales {
        let span = tracing::info_span!("sweep", %scale);
        let _guard = span.enter();
        let result = match &config.mode {
            SweepMode::Compare => {
                run_comparison(scale, registry, &config.out_dir, &config.file_stem, None)
            }
            SweepMode::OracleOnly => Ok(run_oracle_only(scale)),
            SweepMode::Single(name) => run_single_candidate(scale, registry, name),
        };
        if let Err(err) = &result {
            tracing::error!(%scale, error = %err, "convention aborted");
        }
        results.push(result);
    }
    results
}
