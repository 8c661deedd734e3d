//! # eqret-algo: Equitable coal retirement planning
//!
//! Builds the multi-year retirement MILP from an [`eqret_core::ParameterTable`],
//! solves it through `good_lp`, and extracts dense result arrays.
//!
//! | Stage | Entry point |
//! |-------|-------------|
//! | Model Builder | [`build_model`] |
//! | Solver Adapter | [`solve_model`] with [`SolverConfig`] / [`LpSolverKind`] |
//! | Result Extractor | [`extract`] → [`RetirementOutput`] |
//! | All three, per scenario | [`EquitableRetirement::solve`] |
//!
//! ## Example
//!
//! ```ignore
//! use eqret_algo::{EquitableRetirement, ObjectiveWeights, SolverConfig};
//!
//! let problem = EquitableRetirement::new(sets, params)?;
//! let result = problem.solve(ObjectiveWeights::new(1.0, 1.0, 0.0), 0.05, &SolverConfig::default())?;
//! if let Some(output) = &result.output {
//!     println!("{}", output.summary());
//! }
//! ```

pub mod retirement;

pub use retirement::{
    build_model, extract, round_objective, solve_model, ConstraintFamily, EquitableRetirement,
    LinearConstraint, LinearExpr, LpSolverKind, ModelOptions, ObjectiveBreakdown,
    ObjectiveComponents, ObjectiveWeights, RetirementModel, RetirementOutput, ScenarioResult,
    Sense, SolveReport, SolverConfig, SolverStatus, TerminationCondition, VarId, VariableFamily,
    VariableKind, VariableLayout, COAL_RESULTS_FILE, RE_RESULTS_FILE,
};
