// Structured JSON run summary written next to the CSV tables.

use serde::Serialize;

use curvebench::{Stats, SweepSummary};

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub timestamp: String,
    pub version: &'static str,
    pub mode: String,
    pub summary: RunTotals,
    pub conventions: Vec<ConventionReport>,
}

#[derive(Debug, Serialize)]
pub struct RunTotals {
    pub conventions: usize,
    pub completed: usize,
    pub failed: usize,
    pub total_rows: u64,
}

#[derive(Debug, Serialize)]
pub struct ConventionReport {
    pub scale: String,
    pub ok: bool,
    pub error: Option<String>,
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

impl ConventionReport {
    pub fn from_summary(summary: &SweepSummary) -> Self {
        Self {
            scale: summary.scale.label().to_string(),
            ok: true,
            error: None,
            candidate_a: summary.candidate_a.clone(),
            candidate_b: summary.candidate_b.clone(),
            sale_rows: summary.sale_rows,
            purchase_rows: summary.purchase_rows,
            reverts_a: summary.reverts_a,
            reverts_b: summary.reverts_b,
            rel_error_a: summary.rel_error_a.clone(),
            rel_error_b: summary.rel_error_b.clone(),
            cost_delta_ratio: summary.cost_delta_ratio.clone(),
            elapsed_ms: summary.elapsed_ms,
        }
    }

    pub fn from_failure(scale: &str, error: String) -> Self {
        Self {
            scale: scale.to_string(),
            ok: false,
            error: Some(error),
            candidate_a: String::new(),
            candidate_b: String::new(),
            sale_rows: 0,
            purchase_rows: 0,
            reverts_a: 0,
            reverts_b: 0,
            rel_error_a: Stats::from_samples(&[]),
            rel_error_b: Stats::from_samples(&[]),
            cost_delta_ratio: Stats::from_samples(&[]),
            elapsed_ms: 0,
        }
    }
}
