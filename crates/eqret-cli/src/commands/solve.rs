//! `eqret solve`: one scenario

use anyhow::{bail, Context, Result};
use eqret_algo::{
    EquitableRetirement, LpSolverKind, ModelOptions, ObjectiveWeights, SolverConfig,
};
use eqret_cli::SolveArgs;
use eqret_io::load_parameter_dir;
use std::fs;

pub fn handle(args: &SolveArgs) -> Result<()> {
    let solver: LpSolverKind = args.solver.parse()?;
    let loaded = load_parameter_dir(&args.params)?;
    let problem = EquitableRetirement::new(loaded.sets, loaded.params)?.with_options(ModelOptions {
        enforce_site_min_capacity: args.enforce_site_min_capacity,
    });

    let weights = ObjectiveWeights::new(args.alpha, args.beta, args.gamma);
    let result = problem
        .solve(weights, args.discount_rate, &SolverConfig::with_solver(solver))
        .context("solving retirement scenario")?;

    let Some(output) = &result.output else {
        bail!(
            "no optimal solution for ({}, {}, {}): termination condition is {}",
            args.alpha,
            args.beta,
            args.gamma,
            result.report.termination
        );
    };

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;
    output.to_json(&args.out.join("output.json"))?;
    output.to_csv(&args.out)?;

    println!("{}", output.summary());
    println!("Solver: {} ({:.2?})", result.report.solver, result.report.solve_time);
    println!("Results written to {}", args.out.display());
    Ok(())
}
