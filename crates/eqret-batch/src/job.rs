use eqret_algo::{ObjectiveBreakdown, ObjectiveWeights, TerminationCondition};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome category of one scenario in a sweep
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Error,
}

impl ScenarioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioStatus::Optimal => "optimal",
            ScenarioStatus::Infeasible => "infeasible",
            ScenarioStatus::Unbounded => "unbounded",
            ScenarioStatus::Error => "error",
        }
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&TerminationCondition> for ScenarioStatus {
    fn from(termination: &TerminationCondition) -> Self {
        match termination {
            TerminationCondition::Optimal => ScenarioStatus::Optimal,
            TerminationCondition::Infeasible => ScenarioStatus::Infeasible,
            TerminationCondition::Unbounded => ScenarioStatus::Unbounded,
            TerminationCondition::Error(_) => ScenarioStatus::Error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub scenario_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub weights: ObjectiveWeights,
    pub discount_rate: f64,
    pub status: ScenarioStatus,
    pub termination: Option<String>,
    pub objective: Option<f64>,
    pub breakdown: Option<ObjectiveBreakdown>,
    pub solve_time_ms: Option<u64>,
    pub error: Option<String>,
    /// Scenario output directory, set when results were written
    pub output: Option<String>,
}

impl ScenarioRecord {
    pub fn is_optimal(&self) -> bool {
        self.status == ScenarioStatus::Optimal
    }
}
