use anyhow::{anyhow, Context, Result};
use eqret_algo::ObjectiveWeights;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub version: Option<u32>,
    #[serde(default)]
    pub defaults: ScenarioDefaults,
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
    /// Cartesian grid of weights and discount rates, expanded after `scenarios`
    #[serde(default)]
    pub sweep: Option<SweepSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefaults {
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_discount_rate() -> f64 {
    0.05
}

impl Default for ScenarioDefaults {
    fn default() -> Self {
        Self {
            discount_rate: default_discount_rate(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub scenario_id: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
    pub discount_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSpec {
    pub alpha: Vec<f64>,
    pub beta: Vec<f64>,
    pub gamma: Vec<f64>,
    /// Falls back to the default discount rate when empty
    #[serde(default)]
    pub discount_rate: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedScenario {
    pub scenario_id: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub weights: ObjectiveWeights,
    pub discount_rate: f64,
}

pub fn load_scenarios_from_path(path: &Path) -> Result<ScenarioSet> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading scenario set '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing scenario set yaml")
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing scenario set json")
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing scenario set"),
    }
}

pub fn resolve_scenarios(set: &ScenarioSet) -> Result<Vec<ResolvedScenario>> {
    let defaults = &set.defaults;
    let mut resolved = Vec::with_capacity(set.scenarios.len());
    for scenario in &set.scenarios {
        let id = scenario.scenario_id.as_str();
        let weight = |value: Option<f64>, name: &str| {
            value.ok_or_else(|| anyhow!("scenario '{}' is missing weight '{}'", id, name))
        };
        let weights = ObjectiveWeights::new(
            weight(scenario.alpha, "alpha")?,
            weight(scenario.beta, "beta")?,
            weight(scenario.gamma, "gamma")?,
        );
        resolved.push(ResolvedScenario {
            scenario_id: scenario.scenario_id.clone(),
            description: scenario.description.clone(),
            tags: scenario
                .tags
                .as_ref()
                .cloned()
                .unwrap_or_else(|| defaults.tags.clone()),
            weights,
            discount_rate: scenario.discount_rate.unwrap_or(defaults.discount_rate),
        });
    }
    if let Some(sweep) = &set.sweep {
        resolved.extend(expand_sweep(sweep, defaults)?);
    }

    if resolved.is_empty() {
        return Err(anyhow!("scenario set contains no scenarios"));
    }
    let mut seen = HashSet::new();
    for scenario in &resolved {
        if scenario.scenario_id.trim().is_empty() {
            return Err(anyhow!("scenario_id cannot be empty"));
        }
        if !seen.insert(scenario.scenario_id.as_str()) {
            return Err(anyhow!(
                "duplicate scenario_id '{}' in scenario set",
                scenario.scenario_id
            ));
        }
        let ObjectiveWeights { alpha, beta, gamma } = scenario.weights;
        if ![alpha, beta, gamma].iter().all(|w| w.is_finite()) {
            return Err(anyhow!(
                "scenario '{}' has non-finite weights",
                scenario.scenario_id
            ));
        }
        if !scenario.discount_rate.is_finite() || scenario.discount_rate <= -1.0 {
            return Err(anyhow!(
                "scenario '{}' discount rate must be greater than -1 (got {})",
                scenario.scenario_id,
                scenario.discount_rate
            ));
        }
    }
    Ok(resolved)
}

pub fn validate(set: &ScenarioSet) -> Result<()> {
    resolve_scenarios(set).map(|_| ())
}

fn expand_sweep(sweep: &SweepSpec, defaults: &ScenarioDefaults) -> Result<Vec<ResolvedScenario>> {
    if sweep.alpha.is_empty() || sweep.beta.is_empty() || sweep.gamma.is_empty() {
        return Err(anyhow!("sweep needs at least one value for each of alpha, beta and gamma"));
    }
    let rates = if sweep.discount_rate.is_empty() {
        vec![defaults.discount_rate]
    } else {
        sweep.discount_rate.clone()
    };
    let mut scenarios = Vec::new();
    for &alpha in &sweep.alpha {
        for &beta in &sweep.beta {
            for &gamma in &sweep.gamma {
                for &rate in &rates {
                    scenarios.push(ResolvedScenario {
                        scenario_id: format!("a{alpha}_b{beta}_g{gamma}_r{rate}"),
                        description: None,
                        tags: defaults.tags.clone(),
                        weights: ObjectiveWeights::new(alpha, beta, gamma),
                        discount_rate: rate,
                    });
                }
            }
        }
    }
    Ok(scenarios)
}
