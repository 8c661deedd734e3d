use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eqret", author, version, about = "Equitable coal retirement and renewable replacement planning", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and validate a parameter directory
    Validate {
        /// Directory holding coal_plants.csv, re_sites.csv, pair_limits.csv and employment_factors.csv
        #[arg(long)]
        params: PathBuf,
    },
    /// Solve a single (alpha, beta, gamma) scenario
    Solve(SolveArgs),
    /// Solve every scenario of a YAML/JSON scenario set in parallel
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Parameter directory
    #[arg(long)]
    pub params: PathBuf,

    /// Weight on system cost
    #[arg(long)]
    pub alpha: f64,

    /// Weight on health damage cost
    #[arg(long)]
    pub beta: f64,

    /// Weight on jobs (subtracted from the objective)
    #[arg(long)]
    pub gamma: f64,

    /// Annual discount rate applied by year position
    #[arg(long, default_value_t = 0.05, allow_negative_numbers = true)]
    pub discount_rate: f64,

    /// MILP backend (microlp, highs, coin_cbc)
    #[arg(long, default_value = "microlp")]
    pub solver: String,

    /// Enforce each site's minimum capacity
    #[arg(long)]
    pub enforce_site_min_capacity: bool,

    /// Output directory for output.json and result CSVs
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Parameter directory
    #[arg(long)]
    pub params: PathBuf,

    /// Scenario set file (YAML or JSON)
    #[arg(long)]
    pub scenarios: PathBuf,

    /// Output root; one subdirectory per scenario plus batch_manifest.json
    #[arg(long)]
    pub out: PathBuf,

    /// Worker threads (0 = CPU count)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// MILP backend (microlp, highs, coin_cbc)
    #[arg(long, default_value = "microlp")]
    pub solver: String,

    /// Enforce each site's minimum capacity
    #[arg(long)]
    pub enforce_site_min_capacity: bool,
}
