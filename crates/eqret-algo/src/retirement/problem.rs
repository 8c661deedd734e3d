//! Retirement problem definition
//!
//! [`EquitableRetirement`] holds the index sets and parameter table of one
//! region. Each call to [`EquitableRetirement::solve`] builds a fresh model
//! from them, solves it, and extracts the output.

use super::model::{build_model, ModelOptions, ObjectiveWeights, RetirementModel};
use super::solution::{extract, RetirementOutput};
use super::solver::{solve_model, SolveReport, SolverConfig};
use eqret_core::{EqretError, EqretResult, IndexSets, ParameterTable};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Sets and parameters of a retirement study
#[derive(Debug, Clone)]
pub struct EquitableRetirement {
    sets: IndexSets,
    params: ParameterTable,
    options: ModelOptions,
}

/// Result of one (weights, discount rate) scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub weights: ObjectiveWeights,
    pub discount_rate: f64,
    pub report: SolveReport,
    /// Present only when the solve terminated optimally
    pub output: Option<RetirementOutput>,
}

impl ScenarioResult {
    pub fn is_optimal(&self) -> bool {
        self.output.is_some()
    }

    /// The output, or [`EqretError::NoSolution`] with the termination condition
    pub fn into_output(self) -> EqretResult<RetirementOutput> {
        match self.output {
            Some(output) => Ok(output),
            None => Err(EqretError::NoSolution(self.report.termination.to_string())),
        }
    }
}

impl EquitableRetirement {
    /// Create a problem, checking that `params` is complete over `sets`
    pub fn new(sets: IndexSets, params: ParameterTable) -> EqretResult<Self> {
        params.resolve(&sets)?;
        Ok(Self {
            sets,
            params,
            options: ModelOptions::default(),
        })
    }

    /// Set formulation options
    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    pub fn sets(&self) -> &IndexSets {
        &self.sets
    }

    pub fn params(&self) -> &ParameterTable {
        &self.params
    }

    pub fn options(&self) -> ModelOptions {
        self.options
    }

    /// Build the MILP for one scenario without solving it
    pub fn build(&self, weights: ObjectiveWeights, discount_rate: f64) -> EqretResult<RetirementModel> {
        build_model(&self.sets, &self.params, weights, discount_rate, self.options)
    }

    /// Build, solve and extract one scenario.
    ///
    /// A non-optimal solve is not an error: the result carries the report
    /// and no output.
    pub fn solve(
        &self,
        weights: ObjectiveWeights,
        discount_rate: f64,
        config: &SolverConfig,
    ) -> EqretResult<ScenarioResult> {
        info!(
            "running ({}, {}, {})...",
            weights.alpha, weights.beta, weights.gamma
        );
        let model = self.build(weights, discount_rate)?;
        let report = solve_model(&model, config)?;
        info!(
            "solver status is {} and termination condition is {}",
            report.status, report.termination
        );

        let output = if report.termination.is_optimal() {
            Some(extract(&model, &self.sets, &report)?)
        } else {
            warn!(
                alpha = weights.alpha,
                beta = weights.beta,
                gamma = weights.gamma,
                "no output extracted for non-optimal scenario"
            );
            None
        };

        Ok(ScenarioResult {
            weights,
            discount_rate,
            report,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retirement::test_fixtures::single_pair_problem;
    use eqret_core::{CoalPlantId, IndexSets, ReSiteId, YearSet};

    #[test]
    fn test_new_rejects_incomplete_params() {
        let sets = IndexSets::new(
            YearSet::consecutive(1, 2).unwrap(),
            vec![CoalPlantId::new("c1")],
            vec![ReSiteId::new("r1")],
        )
        .unwrap();
        let err = EquitableRetirement::new(sets, ParameterTable::new()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_build_uses_options() {
        let (sets, params) = single_pair_problem(100.0, 0.5);
        let problem = EquitableRetirement::new(sets, params)
            .unwrap()
            .with_options(ModelOptions {
                enforce_site_min_capacity: true,
            });
        let model = problem
            .build(ObjectiveWeights::new(1.0, 0.0, 0.0), 0.05)
            .unwrap();
        assert!(model.options().enforce_site_min_capacity);
        assert_eq!(model.discount_rate(), 0.05);
    }

    #[test]
    fn test_builds_are_independent() {
        let (sets, params) = single_pair_problem(100.0, 0.5);
        let problem = EquitableRetirement::new(sets, params).unwrap();
        let a = problem.build(ObjectiveWeights::new(1.0, 0.0, 0.0), 0.0).unwrap();
        let b = problem.build(ObjectiveWeights::new(0.0, 1.0, 0.0), 0.0).unwrap();
        assert_ne!(a.objective(), b.objective());
        assert_eq!(a.constraints(), b.constraints());
    }
}
