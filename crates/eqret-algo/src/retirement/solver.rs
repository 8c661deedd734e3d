//! Solver adapter
//!
//! Translates a [`RetirementModel`] into a `good_lp` problem, runs the selected
//! backend, and reports the outcome. Infeasible and unbounded problems are
//! reported through [`TerminationCondition`]; only an unusable backend is an
//! error.

use super::model::{RetirementModel, Sense, VariableKind};
use eqret_core::{EqretError, EqretResult};
use good_lp::{
    constraint, variable, Constraint, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// MILP backend reachable through `good_lp`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpSolverKind {
    #[default]
    Microlp,
    #[cfg(feature = "solver-coin_cbc")]
    CoinCbc,
    #[cfg(feature = "solver-highs")]
    Highs,
}

impl LpSolverKind {
    pub fn available() -> &'static [&'static str] {
        AVAILABLE_LP_SOLVERS
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LpSolverKind::Microlp => "microlp",
            #[cfg(feature = "solver-coin_cbc")]
            LpSolverKind::CoinCbc => "coin_cbc",
            #[cfg(feature = "solver-highs")]
            LpSolverKind::Highs => "highs",
        }
    }
}

impl fmt::Display for LpSolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const AVAILABLE_LP_SOLVERS: &[&str] = &[
    "microlp",
    #[cfg(feature = "solver-coin_cbc")]
    "coin_cbc",
    #[cfg(feature = "solver-highs")]
    "highs",
];

fn unavailable_solver_error(label: &str) -> EqretError {
    EqretError::SolverUnavailable(format!(
        "lp solver '{}' is unknown or not compiled in; supported values: {}",
        label,
        LpSolverKind::available().join(", ")
    ))
}

impl FromStr for LpSolverKind {
    type Err = EqretError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.to_ascii_lowercase();
        match normalized.as_str() {
            "microlp" | "default" => Ok(LpSolverKind::Microlp),
            "coin_cbc" | "cbc" => {
                #[cfg(feature = "solver-coin_cbc")]
                {
                    Ok(LpSolverKind::CoinCbc)
                }
                #[cfg(not(feature = "solver-coin_cbc"))]
                {
                    Err(unavailable_solver_error(&normalized))
                }
            }
            "highs" => {
                #[cfg(feature = "solver-highs")]
                {
                    Ok(LpSolverKind::Highs)
                }
                #[cfg(not(feature = "solver-highs"))]
                {
                    Err(unavailable_solver_error(&normalized))
                }
            }
            other => Err(unavailable_solver_error(other)),
        }
    }
}

/// Solver adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Backend to invoke
    pub solver: LpSolverKind,
    /// Largest row violation or integrality gap accepted without a warning
    pub feasibility_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver: LpSolverKind::default(),
            feasibility_tolerance: 1e-6,
        }
    }
}

impl SolverConfig {
    pub fn with_solver(solver: LpSolverKind) -> Self {
        Self {
            solver,
            ..Self::default()
        }
    }
}

/// Why the solver stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "condition", content = "message", rename_all = "snake_case")]
pub enum TerminationCondition {
    Optimal,
    Infeasible,
    Unbounded,
    /// Backend failure, with the backend's message
    Error(String),
}

impl TerminationCondition {
    pub fn is_optimal(&self) -> bool {
        matches!(self, TerminationCondition::Optimal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationCondition::Optimal => "optimal",
            TerminationCondition::Infeasible => "infeasible",
            TerminationCondition::Unbounded => "unbounded",
            TerminationCondition::Error(_) => "error",
        }
    }
}

impl fmt::Display for TerminationCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationCondition::Error(msg) => write!(f, "error ({msg})"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl From<ResolutionError> for TerminationCondition {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::Infeasible => TerminationCondition::Infeasible,
            ResolutionError::Unbounded => TerminationCondition::Unbounded,
            other => TerminationCondition::Error(other.to_string()),
        }
    }
}

/// Coarse solver status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverStatus {
    Ok,
    Warning,
    Error,
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverStatus::Ok => write!(f, "ok"),
            SolverStatus::Warning => write!(f, "warning"),
            SolverStatus::Error => write!(f, "error"),
        }
    }
}

/// Outcome of one solve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    pub solver: LpSolverKind,
    pub status: SolverStatus,
    pub termination: TerminationCondition,
    /// Unrounded objective value at the solution
    pub objective: Option<f64>,
    /// Variable values indexed by `VarId::index`, present when a solution exists
    pub values: Option<Vec<f64>>,
    /// Largest constraint violation of the returned values
    pub max_violation: Option<f64>,
    pub solve_time: Duration,
}

/// Solve a retirement model with the configured backend.
///
/// Blocks until the backend returns. Errors only when the backend cannot be
/// used; every solver outcome is carried in the report.
pub fn solve_model(model: &RetirementModel, config: &SolverConfig) -> EqretResult<SolveReport> {
    let start = Instant::now();

    let mut vars = ProblemVariables::new();
    let handles: Vec<Variable> = model
        .variable_kinds()
        .iter()
        .map(|kind| match kind {
            VariableKind::Continuous => vars.add(variable().min(0.0)),
            VariableKind::Binary => vars.add(variable().binary()),
        })
        .collect();

    let objective = expression(&model.objective().terms, &handles);
    let constraints: Vec<Constraint> = model
        .constraints()
        .iter()
        .map(|row| {
            let lhs = expression(&row.terms, &handles);
            match row.sense {
                Sense::Eq => constraint!(lhs == row.rhs),
                Sense::Le => constraint!(lhs <= row.rhs),
                Sense::Ge => constraint!(lhs >= row.rhs),
            }
        })
        .collect();

    debug!(
        solver = config.solver.as_str(),
        variables = handles.len(),
        constraints = constraints.len(),
        "invoking MILP backend"
    );

    let problem = vars.minimise(objective);
    let outcome = match config.solver {
        LpSolverKind::Microlp => run_backend(
            problem.using(good_lp::solvers::microlp::microlp),
            constraints,
            &handles,
        ),
        #[cfg(feature = "solver-coin_cbc")]
        LpSolverKind::CoinCbc => run_backend(
            problem.using(good_lp::solvers::coin_cbc::coin_cbc),
            constraints,
            &handles,
        ),
        #[cfg(feature = "solver-highs")]
        LpSolverKind::Highs => run_backend(
            problem.using(good_lp::solvers::highs::highs),
            constraints,
            &handles,
        ),
    };
    let solve_time = start.elapsed();

    let report = match outcome {
        Ok(values) => {
            let violation = model.max_violation(&values);
            let status = if violation > config.feasibility_tolerance {
                warn!(
                    violation,
                    tolerance = config.feasibility_tolerance,
                    "solution violates constraints beyond tolerance"
                );
                SolverStatus::Warning
            } else {
                SolverStatus::Ok
            };
            SolveReport {
                solver: config.solver,
                status,
                termination: TerminationCondition::Optimal,
                objective: Some(model.objective().evaluate(&values)),
                values: Some(values),
                max_violation: Some(violation),
                solve_time,
            }
        }
        Err(err) => {
            let termination = TerminationCondition::from(err);
            let status = match termination {
                TerminationCondition::Error(_) => SolverStatus::Error,
                _ => SolverStatus::Warning,
            };
            warn!(
                solver = config.solver.as_str(),
                termination = %termination,
                "solver did not find an optimal solution"
            );
            SolveReport {
                solver: config.solver,
                status,
                termination,
                objective: None,
                values: None,
                max_violation: None,
                solve_time,
            }
        }
    };

    Ok(report)
}

fn expression(terms: &[(super::model::VarId, f64)], handles: &[Variable]) -> Expression {
    let mut expr = Expression::from(0.0);
    for (var, coef) in terms {
        expr += *coef * handles[var.index()];
    }
    expr
}

fn run_backend<M>(
    mut problem: M,
    constraints: Vec<Constraint>,
    handles: &[Variable],
) -> Result<Vec<f64>, ResolutionError>
where
    M: SolverModel<Error = ResolutionError>,
{
    for c in constraints {
        problem = problem.with(c);
    }
    let solution = problem.solve()?;
    Ok(handles.iter().map(|v| solution.value(*v)).collect())
}
