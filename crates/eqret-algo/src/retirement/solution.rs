//! Retirement solution data structures
//!
//! [`extract`] reads the solved variable values of a [`RetirementModel`] into
//! dense arrays laid out `(RE, Coal, Year)` or `(Coal, Year)` in set order.

use super::model::{RetirementModel, VariableFamily};
use super::solver::SolveReport;
use eqret_core::{CoalPlantId, EqretError, EqretResult, IndexSets, ReSiteId};
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

/// Binary values above this are read as 1
const BINARY_THRESHOLD: f64 = 0.5;

/// Unweighted, discounted objective components at the solution
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveBreakdown {
    pub system_cost: f64,
    pub health_cost: f64,
    pub jobs: f64,
}

/// Per-scenario optimization output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementOutput {
    /// Objective value Z, rounded to 2 decimals
    pub objective: f64,
    pub breakdown: ObjectiveBreakdown,
    pub years: Vec<u32>,
    pub coal_plants: Vec<CoalPlantId>,
    pub re_sites: Vec<ReSiteId>,
    /// MW newly built, `(RE, Coal, Year)`
    pub cap_invest: Array3<f64>,
    /// MWh generated by RE, `(RE, Coal, Year)`
    pub re_gen: Array3<f64>,
    /// MW installed, `(RE, Coal, Year)`
    pub re_cap: Array3<f64>,
    pub re_invest: Array3<f64>,
    pub re_online: Array3<f64>,
    /// MW retired, `(Coal, Year)`
    pub cap_retire: Array2<f64>,
    /// MWh generated by coal, `(Coal, Year)`
    pub coal_gen: Array2<f64>,
    pub coal_retire: Array2<f64>,
    pub coal_online: Array2<f64>,
}

/// Round to two decimal places
pub fn round_objective(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Read the solved values of `model` into a [`RetirementOutput`].
///
/// Refuses with [`EqretError::NoSolution`] unless the report's termination
/// condition is optimal.
pub fn extract(
    model: &RetirementModel,
    sets: &IndexSets,
    report: &SolveReport,
) -> EqretResult<RetirementOutput> {
    if !report.termination.is_optimal() {
        return Err(EqretError::NoSolution(report.termination.to_string()));
    }
    let values = report
        .values
        .as_deref()
        .ok_or_else(|| EqretError::NoSolution("solver returned no values".into()))?;

    if sets != model.sets() {
        return Err(EqretError::config(
            "index sets differ from the sets the model was built over",
        ));
    }
    let layout = model.layout();
    let shape = (layout.num_re, layout.num_coal, layout.num_years);
    if values.len() != model.num_variables() {
        return Err(EqretError::Other(format!(
            "solver returned {} values for {} variables",
            values.len(),
            model.num_variables()
        )));
    }

    let site_array = |family: VariableFamily| {
        Array3::from_shape_fn(shape, |(r, c, y)| values[layout.rcy(family, r, c, y).index()])
    };
    let plant_array = |family: VariableFamily| {
        Array2::from_shape_fn((layout.num_coal, layout.num_years), |(c, y)| {
            values[layout.cy(family, c, y).index()]
        })
    };

    let components = model.components();
    let objective = report
        .objective
        .unwrap_or_else(|| model.objective().evaluate(values));

    Ok(RetirementOutput {
        objective: round_objective(objective),
        breakdown: ObjectiveBreakdown {
            system_cost: components.system_cost.evaluate(values),
            health_cost: components.health_cost.evaluate(values),
            jobs: components.jobs.evaluate(values),
        },
        years: sets.years.as_slice().to_vec(),
        coal_plants: sets.coal_plants.clone(),
        re_sites: sets.re_sites.clone(),
        cap_invest: site_array(VariableFamily::CapInvest),
        re_gen: site_array(VariableFamily::ReGen),
        re_cap: site_array(VariableFamily::ReCap),
        re_invest: site_array(VariableFamily::ReInvest),
        re_online: site_array(VariableFamily::ReOnline),
        cap_retire: plant_array(VariableFamily::CapRetire),
        coal_gen: plant_array(VariableFamily::CoalGen),
        coal_retire: plant_array(VariableFamily::CoalRetire),
        coal_online: plant_array(VariableFamily::CoalOnline),
    })
}

impl RetirementOutput {
    /// Year in which each coal plant retires, `None` if it stays online
    pub fn retirement_years(&self) -> Vec<(CoalPlantId, Option<u32>)> {
        self.coal_plants
            .iter()
            .enumerate()
            .map(|(c, id)| {
                let year = self
                    .years
                    .iter()
                    .enumerate()
                    .find(|(y, _)| self.coal_retire[[c, *y]] > BINARY_THRESHOLD)
                    .map(|(_, year)| *year);
                (id.clone(), year)
            })
            .collect()
    }

    /// Number of plants retired by the end of the horizon
    pub fn plants_retired(&self) -> usize {
        self.retirement_years()
            .iter()
            .filter(|(_, year)| year.is_some())
            .count()
    }

    /// Installed RE capacity per site in the final year, summed over plants
    pub fn final_re_capacity(&self) -> Vec<(ReSiteId, f64)> {
        let last = self.years.len().saturating_sub(1);
        self.re_sites
            .iter()
            .enumerate()
            .map(|(r, id)| {
                let total = (0..self.coal_plants.len())
                    .map(|c| self.re_cap[[r, c, last]])
                    .sum();
                (id.clone(), total)
            })
            .collect()
    }

    /// Total MW of RE built over the horizon
    pub fn total_capacity_invested(&self) -> f64 {
        self.cap_invest.sum()
    }

    /// Format a human-readable summary
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Retirement Plan Summary\n{}\n", "=".repeat(40)));
        s.push_str(&format!("Objective: {:.2}\n", self.objective));
        s.push_str(&format!("  System Cost: ${:.2}\n", self.breakdown.system_cost));
        s.push_str(&format!("  Health Cost: ${:.2}\n", self.breakdown.health_cost));
        s.push_str(&format!("  Jobs: {:.2}\n", self.breakdown.jobs));
        s.push_str(&format!(
            "Plants Retired: {} of {}\n",
            self.plants_retired(),
            self.coal_plants.len()
        ));
        s.push_str(&format!(
            "RE Capacity Built: {:.2} MW\n",
            self.total_capacity_invested()
        ));

        s.push_str("\nCoal Plants:\n");
        for (id, year) in self.retirement_years() {
            match year {
                Some(year) => s.push_str(&format!("  [RETIRE] {id} in {year}\n")),
                None => s.push_str(&format!("  [KEEP]   {id}\n")),
            }
        }

        let built: Vec<_> = self
            .final_re_capacity()
            .into_iter()
            .filter(|(_, mw)| *mw > 0.0)
            .collect();
        if !built.is_empty() {
            s.push_str("\nRE Sites (final year):\n");
            for (id, mw) in built {
                s.push_str(&format!("  [BUILD] {id} - {mw:.2} MW\n"));
            }
        }

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retirement::model::{build_model, ModelOptions, ObjectiveWeights};
    use crate::retirement::solver::{LpSolverKind, SolverStatus, TerminationCondition};
    use crate::retirement::test_fixtures::single_pair_problem;
    use eqret_core::YearSet;
    use std::time::Duration;

    fn report(termination: TerminationCondition, values: Option<Vec<f64>>) -> SolveReport {
        SolveReport {
            solver: LpSolverKind::Microlp,
            status: SolverStatus::Ok,
            termination,
            objective: None,
            values,
            max_violation: None,
            solve_time: Duration::ZERO,
        }
    }

    #[test]
    fn test_round_objective() {
        assert_eq!(round_objective(1234.5678), 1234.57);
        assert_eq!(round_objective(-0.004), -0.0);
        assert_eq!(round_objective(10.0), 10.0);
    }

    #[test]
    fn test_extract_refuses_non_optimal() {
        let (sets, params) = single_pair_problem(100.0, 0.5);
        let model = build_model(
            &sets,
            &params,
            ObjectiveWeights::new(1.0, 0.0, 0.0),
            0.0,
            ModelOptions::default(),
        )
        .unwrap();
        let err = extract(&model, &sets, &report(TerminationCondition::Infeasible, None))
            .unwrap_err();
        assert!(matches!(err, EqretError::NoSolution(ref t) if t == "infeasible"));
    }

    #[test]
    fn test_extract_layout_and_helpers() {
        let (sets, params) = single_pair_problem(100.0, 0.5);
        let model = build_model(
            &sets,
            &params,
            ObjectiveWeights::new(1.0, 0.0, 0.0),
            0.0,
            ModelOptions::default(),
        )
        .unwrap();
        let layout = *model.layout();

        // Plant retires in the second year, replaced by 100/(0.5*8760) MW.
        let cap = 100.0 / (0.5 * 8760.0);
        let mut values = vec![0.0; model.num_variables()];
        values[layout.cy(VariableFamily::CoalOnline, 0, 0).index()] = 1.0;
        values[layout.cy(VariableFamily::CoalGen, 0, 0).index()] = 100.0;
        values[layout.cy(VariableFamily::CoalRetire, 0, 1).index()] = 1.0;
        values[layout.rcy(VariableFamily::ReCap, 0, 0, 1).index()] = cap;
        values[layout.rcy(VariableFamily::CapInvest, 0, 0, 1).index()] = cap;

        let output = extract(&model, &sets, &report(TerminationCondition::Optimal, Some(values)))
            .unwrap();
        assert_eq!(output.re_cap.shape(), &[1, 1, 2]);
        assert_eq!(output.coal_online.shape(), &[1, 2]);
        assert_eq!(output.coal_online[[0, 0]], 1.0);
        assert_eq!(output.re_cap[[0, 0, 1]], cap);

        let years = output.retirement_years();
        assert_eq!(years[0].1, Some(sets.years.as_slice()[1]));
        assert_eq!(output.plants_retired(), 1);
        assert!((output.final_re_capacity()[0].1 - cap).abs() < 1e-12);

        let summary = output.summary();
        assert!(summary.contains("Plants Retired: 1 of 1"));
        assert!(summary.contains("[RETIRE] c1"));
        assert!(summary.contains("[BUILD] r1"));
    }

    #[test]
    fn test_extract_rejects_foreign_sets() {
        let (sets, params) = single_pair_problem(100.0, 0.5);
        let model = build_model(
            &sets,
            &params,
            ObjectiveWeights::new(1.0, 0.0, 0.0),
            0.0,
            ModelOptions::default(),
        )
        .unwrap();
        // Same shape, different labels.
        let relabelled = IndexSets::new(
            YearSet::consecutive(2031, 2).unwrap(),
            vec![CoalPlantId::new("other")],
            sets.re_sites.clone(),
        )
        .unwrap();
        let values = vec![0.0; model.num_variables()];
        let err = extract(
            &model,
            &relabelled,
            &report(TerminationCondition::Optimal, Some(values)),
        )
        .unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(model.sets(), &sets);
    }

    #[test]
    fn test_extract_rejects_wrong_value_count() {
        let (sets, params) = single_pair_problem(100.0, 0.5);
        let model = build_model(
            &sets,
            &params,
            ObjectiveWeights::new(1.0, 0.0, 0.0),
            0.0,
            ModelOptions::default(),
        )
        .unwrap();
        let result = extract(
            &model,
            &sets,
            &report(TerminationCondition::Optimal, Some(vec![0.0; 3])),
        );
        assert!(result.is_err());
    }
}
