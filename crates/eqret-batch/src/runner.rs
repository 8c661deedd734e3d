use crate::job::{ScenarioRecord, ScenarioStatus};
use crate::manifest::{write_batch_manifest, BatchManifest, BATCH_MANIFEST_FILE};
use crate::spec::ResolvedScenario;
use anyhow::{Context, Result};
use chrono::Utc;
use eqret_algo::{EquitableRetirement, SolverConfig};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name of each optimal scenario's full output
pub const OUTPUT_FILE: &str = "output.json";

/// Sweep settings: one shared problem, many independent scenarios.
pub struct BatchRunnerConfig {
    pub problem: EquitableRetirement,
    pub scenarios: Vec<ResolvedScenario>,
    pub output_root: PathBuf,
    pub solver: SolverConfig,
    /// Worker threads; 0 uses the CPU count
    pub threads: usize,
}

/// Summary returned after the run so clients can log success/failure counts and manifest location.
pub struct BatchSummary {
    pub optimal: usize,
    pub failure: usize,
    pub manifest_path: PathBuf,
    pub scenarios: Vec<ScenarioRecord>,
}

pub fn run_batch(config: &BatchRunnerConfig) -> Result<BatchSummary> {
    fs::create_dir_all(&config.output_root).with_context(|| {
        format!(
            "creating batch output root '{}'",
            config.output_root.display()
        )
    })?;

    let thread_count = if config.threads == 0 {
        num_cpus::get()
    } else {
        config.threads
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .context("building Rayon thread pool for scenario sweep")?;

    info!(
        scenarios = config.scenarios.len(),
        threads = thread_count,
        solver = config.solver.solver.as_str(),
        "starting scenario sweep"
    );

    // Each scenario builds its own model; only the problem is shared.
    let records: Vec<ScenarioRecord> = pool.install(|| {
        config
            .scenarios
            .par_iter()
            .map(|scenario| run_scenario(scenario, config))
            .collect()
    });

    let optimal = records.iter().filter(|record| record.is_optimal()).count();
    let failure = records.len() - optimal;

    let manifest = BatchManifest {
        created_at: Utc::now(),
        solver: config.solver.solver.as_str().to_string(),
        num_scenarios: records.len(),
        optimal,
        failure,
        scenarios: records.clone(),
    };
    let manifest_path = config.output_root.join(BATCH_MANIFEST_FILE);
    write_batch_manifest(&manifest_path, &manifest)?;
    Ok(BatchSummary {
        optimal,
        failure,
        manifest_path,
        scenarios: records,
    })
}

/// Solve one scenario and write its outputs; failures become the record's status.
fn run_scenario(scenario: &ResolvedScenario, config: &BatchRunnerConfig) -> ScenarioRecord {
    let mut record = ScenarioRecord {
        scenario_id: scenario.scenario_id.clone(),
        description: scenario.description.clone(),
        tags: scenario.tags.clone(),
        weights: scenario.weights,
        discount_rate: scenario.discount_rate,
        status: ScenarioStatus::Error,
        termination: None,
        objective: None,
        breakdown: None,
        solve_time_ms: None,
        error: None,
        output: None,
    };

    let result = match config
        .problem
        .solve(scenario.weights, scenario.discount_rate, &config.solver)
    {
        Ok(result) => result,
        Err(err) => {
            warn!("scenario {} failed: {err}", scenario.scenario_id);
            record.error = Some(err.to_string());
            return record;
        }
    };

    record.status = ScenarioStatus::from(&result.report.termination);
    record.termination = Some(result.report.termination.to_string());
    record.solve_time_ms = Some(result.report.solve_time.as_millis() as u64);

    if let Some(output) = &result.output {
        record.objective = Some(output.objective);
        record.breakdown = Some(output.breakdown);
        let dir = config
            .output_root
            .join(sanitize_name(&scenario.scenario_id));
        match write_scenario_output(&dir, output) {
            Ok(()) => record.output = Some(dir.display().to_string()),
            Err(err) => {
                warn!("writing outputs of scenario {} failed: {err:#}", scenario.scenario_id);
                record.status = ScenarioStatus::Error;
                record.error = Some(format!("{err:#}"));
            }
        }
    }
    record
}

fn write_scenario_output(dir: &Path, output: &eqret_algo::RetirementOutput) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating scenario directory '{}'", dir.display()))?;
    output.to_json(&dir.join(OUTPUT_FILE))?;
    output.to_csv(dir)?;
    Ok(())
}

fn sanitize_name(value: &str) -> String {
    let filtered: String = value
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    if filtered.is_empty() || filtered == "." || filtered == ".." {
        "scenario".to_string()
    } else {
        filtered
    }
}
