//! Report sink: two independent append-only CSV tables (sale, purchase)
//! with a fixed column schema.
//!
//! Each table is opened once per run with its header written first; rows
//! are serialized as one delimited line each, in evaluation order, and
//! never reordered. Failed candidate calls write `revert!` in the value
//! column; absent metrics and unavailable costs write the `-` marker;
//! explicit markers, never blanks or zeros.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::compare::ComparisonRow;
use crate::error::BenchError;
use crate::outcome::CallOutcome;
use crate::params::Direction;

/// Marker for an absent metric or unavailable cost.
pub const ABSENT: &str = "-";
/// Marker for a candidate value call that reverted.
pub const REVERT: &str = "revert!";

pub const SALE_HEADER: &str = "supply, reserveBalance, inverseRatio, sellAmount, realReturn, \
     candidateAReturn, candidateBReturn, candidateAError, candidateBError, \
     candidateARelError, candidateBRelError, candidateACost, candidateBCost, costDeltaRatio";

pub const PURCHASE_HEADER: &str = "supply, reserveBalance, inverseRatio, buyAmount, realReturn, \
     candidateAReturn, candidateBReturn, candidateAError, candidateBError, \
     candidateARelError, candidateBRelError, candidateACost, candidateBCost, costDeltaRatio";

fn format_value(outcome: &CallOutcome) -> String {
    match outcome.value() {
        Some(v) => v.to_string(),
        None => REVERT.to_string(),
    }
}

fn format_metric(metric: Option<f64>) -> String {
    match metric {
        Some(m) => m.to_string(),
        None => ABSENT.to_string(),
    }
}

fn format_cost(outcome: &CallOutcome) -> String {
    match outcome.gas() {
        Some(g) => g.to_string(),
        None => ABSENT.to_string(),
    }
}

/// Serializes one row in the fixed column order.
pub fn format_row(row: &ComparisonRow) -> String {
    [
        row.supply.to_string(),
        row.reserve_balance.to_string(),
        row.inverse_ratio.to_string(),
        row.amount.to_string(),
        row.real_return.to_string(),
        format_value(&row.outcome_a),
        format_value(&row.outcome_b),
        format_metric(row.error_a),
        format_metric(row.error_b),
        format_metric(row.rel_error_a),
        format_metric(row.rel_error_b),
        format_cost(&row.outcome_a),
        format_cost(&row.outcome_b),
        format_metric(row.cost_delta_ratio),
    ]
    .join(", ")
}

/// One append-only delimited table backed by a buffered file writer.
pub struct ReportTable {
    writer: BufWriter<File>,
    path: PathBuf,
    rows_written: u64,
}

impl ReportTable {
    pub fn open(path: PathBuf, header: &str) -> Result<Self, BenchError> {
        let file = File::create(&path).map_err(|source| BenchError::SinkOpen {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{header}")?;
        Ok(Self {
            writer,
            path,
            rows_written: 0,
        })
    }

    pub fn append(&mut self, row: &ComparisonRow) -> Result<(), BenchError> {
        writeln!(self.writer, "{}", format_row(row))?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Explicit flush-and-close; `Drop` also flushes best-effort so early
    /// abort paths cannot lose buffered rows.
    pub fn close(mut self) -> Result<u64, BenchError> {
        self.writer.flush()?;
        Ok(self.rows_written)
    }
}

impl Drop for ReportTable {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// The pair of tables for one sweep context. Sale and purchase are
/// independently addressable and never merged.
pub struct ReportSink {
    sale: ReportTable,
    purchase: ReportTable,
}

impl ReportSink {
    /// Opens both tables under `dir` as `<prefix>_sale.csv` and
    /// `<prefix>_purchase.csv`, writing headers immediately.
    pub fn open(dir: &Path, prefix: &str) -> Result<Self, BenchError> {
        std::fs::create_dir_all(dir).map_err(|source| BenchError::SinkOpen {
            path: dir.to_path_buf(),
            source,
        })?;
        let sale = ReportTable::open(dir.join(format!("{prefix}_sale.csv")), SALE_HEADER)?;
        let purchase =
            ReportTable::open(dir.join(format!("{prefix}_purchase.csv")), PURCHASE_HEADER)?;
        Ok(Self { sale, purchase })
    }

    /// Routes a row to the direction-appropriate table.
    pub fn append(&mut self, row: &ComparisonRow) -> Result<(), BenchError> {
        match row.direction {
            Direction::Sale => self.sale.append(row),
            Direction::Purchase => self.purchase.append(row),
        }
    }

    /// Closes both tables, returning `(sale_rows, purchase_rows)`.
    pub fn close(self) -> Result<(u64, u64), BenchError> {
        let sale_rows = self.sale.close()?;
        let purchase_rows = self.purchase.close()?;
        Ok((sale_rows, purchase_rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{CallOutcome, Cost};

    fn success_row() -> ComparisonRow {
        ComparisonRow {
            supply: 1000,
            reserve_balance: 100,
            inverse_ratio: 5,
            amount: 200,
            direction: Direction::Sale,
            real_return: 67.232,
            outcome_a: CallOutcome::Success {
                value: 67,
                cost: Cost::Gas(30_000),
            },
            outcome_b: CallOutcome::Success {
                value: 67,
                cost: Cost::Gas(1_500),
            },
            error_a: Some(-0.232),
            error_b: Some(-0.232),
            rel_error_a: Some(-0.00345),
            rel_error_b: Some(-0.00345),
            cost_delta_ratio: Some(-0.95),
        }
    }

    #[test]
    fn row_has_fixed_column_count() {
        let line = format_row(&success_row());
        assert_eq!(line.split(", ").count(), 14);
        assert_eq!(SALE_HEADER.split(", ").count(), 14);
        assert_eq!(PURCHASE_HEADER.split(", ").count(), 14);
    }

    #[test]
    fn failure_row_uses_markers() {
        let mut row = success_row();
        row.outcome_b = CallOutcome::Failure {
            reason: "overflow".into(),
        };
        row.error_a = None;
        row.error_b = None;
        row.rel_error_a = None;
        row.rel_error_b = None;
        row.cost_delta_ratio = None;

        let line = format_row(&row);
        let cols: Vec<&str> = line.split(", ").collect();
        assert_eq!(cols[6], REVERT); // candidate B value
        assert_eq!(cols[7], ABSENT); // errors
        assert_eq!(cols[8], ABSENT);
        assert_eq!(cols[9], ABSENT);
        assert_eq!(cols[10], ABSENT);
        assert_eq!(cols[12], ABSENT); // candidate B cost
        assert_eq!(cols[13], ABSENT); // cost delta
        // The surviving candidate's value and cost stay numeric.
        assert_eq!(cols[5], "67");
        assert_eq!(cols[11], "30000");
    }

    #[test]
    fn unavailable_cost_is_marker_not_zero() {
        let mut row = success_row();
        row.outcome_a = CallOutcome::Success {
            value: 67,
            cost: Cost::Unavailable,
        };
        row.cost_delta_ratio = None;
        let line = format_row(&row);
        let cols: Vec<&str> = line.split(", ").collect();
        assert_eq!(cols[11], ABSENT);
        assert_ne!(cols[11], "0");
    }

    #[test]
    fn table_reports_its_path_and_row_count() {
        let path = std::env::temp_dir().join("curvebench-table-test.csv");
        let mut table = ReportTable::open(path.clone(), SALE_HEADER).unwrap();
        assert_eq!(table.path(), path.as_path());
        assert_eq!(table.rows_written(), 0);
        table.append(&success_row()).unwrap();
        assert_eq!(table.rows_written(), 1);
        assert_eq!(table.close().unwrap(), 1);
    }

    #[test]
    fn tables_route_by_direction() {
        let dir = std::env::temp_dir().join("curvebench-report-test");
        let mut sink = ReportSink::open(&dir, "routing").unwrap();
        let sale = success_row();
        let mut purchase = success_row();
        purchase.direction = Direction::Purchase;
        sink.append(&sale).unwrap();
        sink.append(&purchase).unwrap();
        sink.append(&sale).unwrap();
        let (sale_rows, purchase_rows) = sink.close().unwrap();
        assert_eq!(sale_rows, 2);
        assert_eq!(purchase_rows, 1);

        let sale_text = std::fs::read_to_string(dir.join("routing_sale.csv")).unwrap();
        assert_eq!(sale_text.lines().count(), 3); // header + 2 rows
        assert!(sale_text.starts_with("supply, reserveBalance"));
    }
}
