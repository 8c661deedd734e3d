pub mod job;
pub mod manifest;
pub mod runner;
pub mod spec;

pub use job::{ScenarioRecord, ScenarioStatus};
pub use manifest::{load_batch_manifest, write_batch_manifest, BatchManifest, BATCH_MANIFEST_FILE};
pub use runner::{run_batch, BatchRunnerConfig, BatchSummary, OUTPUT_FILE};
pub use spec::{
    load_scenarios_from_path, resolve_scenarios, validate, ResolvedScenario, ScenarioDefaults,
    ScenarioSet, ScenarioSpec, SweepSpec,
};
