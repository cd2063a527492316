// Bonding Curve Comparison Runner
// Sweeps the parameter space under each unit-scaling convention and
// writes one sale-side and one purchase-side CSV table per convention.
//
// Usage:
//   cargo run --release --bin bench                        # full comparison, all scales
//   cargo run --release --bin bench -- --out results       # output directory
//   cargo run --release --bin bench -- --scale giga        # single convention
//   cargo run --release --bin bench -- --mode oracle       # oracle-only sweep
//   cargo run --release --bin bench -- --mode single --candidate int-exp
//   cargo run --release --bin bench -- --quiet              # suppress console table

mod summary;

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use curvebench::{default_registry, run_all, RunConfig, SweepMode, UnitScale, ALL_SCALES};

use summary::{ConventionReport, RunReport, RunTotals};

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    out_dir: String,
    mode: SweepMode,
    scales: Vec<UnitScale>,
    quiet: bool,
}

fn parse_args() -> Result<CliArgs> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut out_dir = "comparison-results".to_string();
    let mut mode_arg = "compare".to_string();
    let mut candidate: Option<String> = None;
    let mut scales: Vec<UnitScale> = ALL_SCALES.to_vec();
    let mut quiet = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--out" => {
                i += 1;
                if i < args.len() {
                    out_dir = args[i].clone();
                }
            }
            "--mode" => {
                i += 1;
                if i < args.len() {
                    mode_arg = args[i].clone();
                }
            }
            "--candidate" => {
                i += 1;
                if i < args.len() {
                    candidate = Some(args[i].clone());
                }
            }
            "--scale" => {
                i += 1;
                if i < args.len() {
                    scales = vec![match args[i].as_str() {
                        "raw" => UnitScale::Raw,
                        "giga" => UnitScale::Giga,
                        "base" => UnitScale::BaseUnits,
                        other => bail!("unknown scale: {other} (expected raw|giga|base)"),
                    }];
                }
            }
            "--quiet" => {
                quiet = true;
            }
            other => {
                bail!("unknown argument: {other}");
            }
        }
        i += 1;
    }

    let mode = match mode_arg.as_str() {
        "compare" => SweepMode::Compare,
        "oracle" => SweepMode::OracleOnly,
        "single" => match candidate {
            Some(name) => SweepMode::Single(name),
            None => bail!("--mode single requires --candidate NAME"),
        },
        other => bail!("unknown mode: {other} (expected compare|oracle|single)"),
    };

    Ok(CliArgs {
        out_dir,
        mode,
        scales,
        quiet,
    })
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let cli = parse_args()?;
    let registry = default_registry();

    if !cli.quiet {
        println!("\n  Bonding Curve Comparison Runner");
        println!(
            "  Candidates: {} | Conventions: {}",
            registry.names().join(", "),
            cli.scales
                .iter()
                .map(|s| s.label())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!(
            "  {:<8} {:>6} {:>6} {:>7} {:>7} {:>12} {:>12} {:>9} {:>7}",
            "Scale", "Sale", "Buy", "RevA", "RevB", "MaxRelErrA", "MaxRelErrB", "CostDelta", "Time"
        );
        println!("  {}", "-".repeat(82));
    }

    let mut config = RunConfig::new(&cli.out_dir);
    config.mode = cli.mode.clone();
    config.scales = cli.scales.clone();

    let results = run_all(&config, &registry);

    let mut conventions = Vec::with_capacity(results.len());
    let mut completed = 0usize;
    let mut failed = 0usize;
    let mut total_rows = 0u64;

    for (scale, result) in cli.scales.iter().zip(&results) {
        match result {
            Ok(s) => {
                completed += 1;
                total_rows += s.sale_rows + s.purchase_rows;
                if !cli.quiet {
                    println!(
                        "  {:<8} {:>6} {:>6} {:>7} {:>7} {:>12.3e} {:>12.3e} {:>9.3} {:>5}ms",
                        s.scale.label(),
                        s.sale_rows,
                        s.purchase_rows,
                        s.reverts_a,
                        s.reverts_b,
                        s.rel_error_a.max,
                        s.rel_error_b.max,
                        s.cost_delta_ratio.mean,
                        s.elapsed_ms,
                    );
                }
                conventions.push(ConventionReport::from_summary(s));
            }
            Err(e) => {
                failed += 1;
                if !cli.quiet {
                    println!("  {:<8} FAILED: {e}", scale.label());
                }
                conventions.push(ConventionReport::from_failure(scale.label(), e.to_string()));
            }
        }
    }

    if !cli.quiet {
        println!("  {}", "-".repeat(82));
        println!(
            "  Conventions: {}  Completed: {}  Failed: {}  Rows: {}\n",
            results.len(),
            completed,
            failed,
            total_rows
        );
    }

    // ─── JSON Summary ───────────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before epoch")?
        .as_millis();
    let report = RunReport {
        timestamp: format!("{ts}"),
        version: env!("CARGO_PKG_VERSION"),
        mode: match &cli.mode {
            SweepMode::Compare => "compare".to_string(),
            SweepMode::OracleOnly => "oracle".to_string(),
            SweepMode::Single(name) => format!("single:{name}"),
        },
        summary: RunTotals {
            conventions: results.len(),
            completed,
            failed,
            total_rows,
        },
        conventions,
    };

    let dir = std::path::Path::new(&cli.out_dir);
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(format!("summary-{ts}.json"));
    let json = serde_json::to_string_pretty(&report).context("failed to serialize summary")?;
    std::fs::write(&path, &json)
        .with_context(|| format!("failed to write {}", path.display()))?;
    if !cli.quiet {
        println!("  Summary saved to: {}\n", path.display());
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
