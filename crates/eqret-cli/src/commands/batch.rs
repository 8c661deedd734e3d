//! `eqret batch`: scenario sweep

use anyhow::{Context, Result};
use eqret_algo::{EquitableRetirement, LpSolverKind, ModelOptions, SolverConfig};
use eqret_batch::{load_scenarios_from_path, resolve_scenarios, run_batch, BatchRunnerConfig};
use eqret_cli::BatchArgs;
use eqret_io::load_parameter_dir;
use std::io::Write;
use tabwriter::TabWriter;
use tracing::info;

pub fn handle(args: &BatchArgs) -> Result<()> {
    let solver: LpSolverKind = args.solver.parse()?;
    let loaded = load_parameter_dir(&args.params)?;
    let problem = EquitableRetirement::new(loaded.sets, loaded.params)?.with_options(ModelOptions {
        enforce_site_min_capacity: args.enforce_site_min_capacity,
    });

    let set = load_scenarios_from_path(&args.scenarios)?;
    let scenarios = resolve_scenarios(&set)
        .with_context(|| format!("resolving scenarios in {}", args.scenarios.display()))?;
    info!("resolved {} scenarios", scenarios.len());

    let config = BatchRunnerConfig {
        problem,
        scenarios,
        output_root: args.out.clone(),
        solver: SolverConfig::with_solver(solver),
        threads: args.threads,
    };
    let summary = run_batch(&config)?;

    let mut tw = TabWriter::new(std::io::stdout());
    writeln!(tw, "SCENARIO\tSTATUS\tOBJECTIVE\tSOLVE_MS")?;
    for record in &summary.scenarios {
        let objective = record
            .objective
            .map(|z| format!("{z:.2}"))
            .unwrap_or_else(|| "-".to_string());
        let solve_ms = record
            .solve_time_ms
            .map(|ms| ms.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            tw,
            "{}\t{}\t{}\t{}",
            record.scenario_id, record.status, objective, solve_ms
        )?;
    }
    tw.flush()?;

    println!(
        "\n{} optimal, {} failed; manifest written to {}",
        summary.optimal,
        summary.failure,
        summary.manifest_path.display()
    );
    Ok(())
}
