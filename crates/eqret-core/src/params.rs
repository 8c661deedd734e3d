//! Parameter table of the retirement model
//!
//! Parameters are stored keyed by explicit IDs (plant, site, site × plant,
//! site × year). [`ParameterTable::resolve`] checks the table for
//! completeness over a set of [`IndexSets`] and lays the values out densely
//! in set order, which is the form the model builder consumes.
//!
//! | Symbol | Field | Index | Units |
//! |--------|-------|-------|-------|
//! | COALCAP | [`CoalPlant::capacity_mw`] | c | MW |
//! | HISTGEN | [`CoalPlant::historical_generation_mwh`] | c | MWh/yr |
//! | COALFOPEX | [`CoalPlant::fixed_opex`] | c | $/MW-yr |
//! | COALVOPEX | [`CoalPlant::variable_opex`] | c | $/MWh |
//! | HD | [`CoalPlant::health_damage`] | c | $/MWh |
//! | RETEF | [`CoalPlant::retirement_ef`] | c | jobs/MW |
//! | COALOMEF | [`CoalPlant::om_ef`] | c | jobs/MWh |
//! | MAXSITES | [`CoalPlant::max_sites`] | c | count |
//! | CF | [`ReSite::capacity_factor`] | r | fraction |
//! | RECAPEX | [`ReSite::capex`] | r | $/MW |
//! | REFOPEX | [`ReSite::fixed_opex`] | r | $/MW-yr |
//! | REVOPEX | [`ReSite::variable_opex`] | r | $/MWh |
//! | SITEMAXCAP | [`ReSite::max_capacity_mw`] | r | MW |
//! | SITEMINCAP | [`ReSite::min_capacity_mw`] | r | MW |
//! | MAXCAP | pair limit | r, c | MW |
//! | CONEF | construction EF | r, y | jobs/MW |
//! | REOMEF | O&M EF | r, y | jobs/MW |

use crate::error::{EqretError, EqretResult};
use crate::sets::{CoalPlantId, IndexSets, ReSiteId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Maximum number of individual problems listed in a validation error
const MAX_REPORTED_ISSUES: usize = 10;

/// Renewable technology of a site (informational only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technology {
    Wind,
    Solar,
    Other,
}

impl Technology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Technology::Wind => "wind",
            Technology::Solar => "solar",
            Technology::Other => "other",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Technology {
    type Err = EqretError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wind" => Ok(Technology::Wind),
            "solar" | "pv" => Ok(Technology::Solar),
            "other" | "" => Ok(Technology::Other),
            other => Err(EqretError::Parse(format!(
                "unknown technology '{other}'; supported values: wind, solar, other"
            ))),
        }
    }
}

/// Per-plant coal parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoalPlant {
    pub id: CoalPlantId,
    /// Nameplate capacity (COALCAP)
    pub capacity_mw: f64,
    /// Historical annual generation (HISTGEN)
    pub historical_generation_mwh: f64,
    /// Fixed O&M cost per MW of nameplate (COALFOPEX)
    pub fixed_opex: f64,
    /// Variable cost per MWh generated (COALVOPEX)
    pub variable_opex: f64,
    /// Monetized health damage per MWh generated (HD)
    pub health_damage: f64,
    /// Jobs per MW retired (RETEF)
    pub retirement_ef: f64,
    /// Jobs per MWh generated (COALOMEF)
    pub om_ef: f64,
    /// Maximum number of RE sites that may replace this plant (MAXSITES)
    pub max_sites: f64,
}

/// Per-site renewable parameters (year-independent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReSite {
    pub id: ReSiteId,
    pub technology: Technology,
    /// Annual capacity factor (CF)
    pub capacity_factor: f64,
    /// Capital cost per MW built (RECAPEX)
    pub capex: f64,
    /// Fixed O&M per MW installed (REFOPEX)
    pub fixed_opex: f64,
    /// Variable O&M per MWh generated (REVOPEX)
    pub variable_opex: f64,
    /// Physical capacity limit of the site (SITEMAXCAP)
    pub max_capacity_mw: f64,
    /// Minimum build size, only enforced when the model enables it (SITEMINCAP)
    pub min_capacity_mw: f64,
}

/// Construction and O&M employment factors for one site in one year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmploymentFactors {
    /// Jobs per MW built (CONEF)
    pub construction: f64,
    /// Jobs per MW installed (REOMEF)
    pub om: f64,
}

/// All parameters of a retirement problem, keyed by ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterTable {
    coal_plants: HashMap<CoalPlantId, CoalPlant>,
    re_sites: HashMap<ReSiteId, ReSite>,
    pair_max_capacity: HashMap<(ReSiteId, CoalPlantId), f64>,
    employment: HashMap<(ReSiteId, u32), EmploymentFactors>,
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a coal plant's parameters
    pub fn insert_coal_plant(&mut self, plant: CoalPlant) {
        self.coal_plants.insert(plant.id.clone(), plant);
    }

    /// Insert (or replace) a renewable site's parameters
    pub fn insert_re_site(&mut self, site: ReSite) {
        self.re_sites.insert(site.id.clone(), site);
    }

    /// Set MAXCAP for a site/plant pair
    pub fn set_pair_max_capacity(&mut self, site: ReSiteId, plant: CoalPlantId, max_mw: f64) {
        self.pair_max_capacity.insert((site, plant), max_mw);
    }

    /// Set CONEF and REOMEF for a site in a year
    pub fn set_employment_factors(&mut self, site: ReSiteId, year: u32, factors: EmploymentFactors) {
        self.employment.insert((site, year), factors);
    }

    pub fn coal_plant(&self, id: &CoalPlantId) -> Option<&CoalPlant> {
        self.coal_plants.get(id)
    }

    pub fn re_site(&self, id: &ReSiteId) -> Option<&ReSite> {
        self.re_sites.get(id)
    }

    pub fn pair_max_capacity(&self, site: &ReSiteId, plant: &CoalPlantId) -> Option<f64> {
        self.pair_max_capacity
            .get(&(site.clone(), plant.clone()))
            .copied()
    }

    pub fn employment_factors(&self, site: &ReSiteId, year: u32) -> Option<EmploymentFactors> {
        self.employment.get(&(site.clone(), year)).copied()
    }

    /// Check completeness over `sets` and lay the table out in set order.
    ///
    /// Every missing entry and every negative or non-finite value is
    /// collected; the returned configuration error lists the first few.
    pub fn resolve(&self, sets: &IndexSets) -> EqretResult<DenseParameters> {
        let mut issues = Vec::new();

        let plants: Vec<Option<&CoalPlant>> = sets
            .coal_plants
            .iter()
            .map(|id| {
                let plant = self.coal_plants.get(id);
                if plant.is_none() {
                    issues.push(format!("coal plant '{id}' has no parameters"));
                }
                plant
            })
            .collect();
        let sites: Vec<Option<&ReSite>> = sets
            .re_sites
            .iter()
            .map(|id| {
                let site = self.re_sites.get(id);
                if site.is_none() {
                    issues.push(format!("renewable site '{id}' has no parameters"));
                }
                site
            })
            .collect();

        for plant in plants.iter().flatten() {
            check_finite(&mut issues, "COALFOPEX", &plant.id, plant.fixed_opex);
            check_finite(&mut issues, "COALVOPEX", &plant.id, plant.variable_opex);
            check_finite(&mut issues, "HD", &plant.id, plant.health_damage);
            check_finite(&mut issues, "RETEF", &plant.id, plant.retirement_ef);
            check_finite(&mut issues, "COALOMEF", &plant.id, plant.om_ef);
            check_non_negative(&mut issues, "COALCAP", &plant.id, plant.capacity_mw);
            check_non_negative(&mut issues, "HISTGEN", &plant.id, plant.historical_generation_mwh);
            check_non_negative(&mut issues, "MAXSITES", &plant.id, plant.max_sites);
        }
        for site in sites.iter().flatten() {
            check_finite(&mut issues, "RECAPEX", &site.id, site.capex);
            check_finite(&mut issues, "REFOPEX", &site.id, site.fixed_opex);
            check_finite(&mut issues, "REVOPEX", &site.id, site.variable_opex);
            check_non_negative(&mut issues, "CF", &site.id, site.capacity_factor);
            check_non_negative(&mut issues, "SITEMAXCAP", &site.id, site.max_capacity_mw);
            check_non_negative(&mut issues, "SITEMINCAP", &site.id, site.min_capacity_mw);
        }

        let mut max_capacity = Vec::with_capacity(sets.num_re());
        let mut construction_ef = Vec::with_capacity(sets.num_re());
        let mut re_om_ef = Vec::with_capacity(sets.num_re());
        for site_id in &sets.re_sites {
            let mut row = Vec::with_capacity(sets.num_coal());
            for plant_id in &sets.coal_plants {
                match self.pair_max_capacity(site_id, plant_id) {
                    Some(value) => {
                        check_non_negative(
                            &mut issues,
                            "MAXCAP",
                            &format!("{site_id}, {plant_id}"),
                            value,
                        );
                        row.push(value);
                    }
                    None => {
                        issues.push(format!("MAXCAP missing for ({site_id}, {plant_id})"));
                        row.push(0.0);
                    }
                }
            }
            max_capacity.push(row);

            let mut con_row = Vec::with_capacity(sets.num_years());
            let mut om_row = Vec::with_capacity(sets.num_years());
            for year in sets.years.iter() {
                match self.employment_factors(site_id, year) {
                    Some(factors) => {
                        let label = format!("{site_id}, {year}");
                        check_finite(&mut issues, "CONEF", &label, factors.construction);
                        check_finite(&mut issues, "REOMEF", &label, factors.om);
                        con_row.push(factors.construction);
                        om_row.push(factors.om);
                    }
                    None => {
                        issues.push(format!(
                            "CONEF/REOMEF missing for ({site_id}, {year})"
                        ));
                        con_row.push(0.0);
                        om_row.push(0.0);
                    }
                }
            }
            construction_ef.push(con_row);
            re_om_ef.push(om_row);
        }

        if !issues.is_empty() {
            return Err(EqretError::config(format_issues(&issues)));
        }

        let plants: Vec<&CoalPlant> = plants.into_iter().flatten().collect();
        let sites: Vec<&ReSite> = sites.into_iter().flatten().collect();

        for (r, site) in sites.iter().enumerate() {
            for (c, plant) in plants.iter().enumerate() {
                if max_capacity[r][c] > site.max_capacity_mw {
                    warn!(
                        site = %site.id,
                        plant = %plant.id,
                        maxcap = max_capacity[r][c],
                        sitemaxcap = site.max_capacity_mw,
                        "pair capacity limit exceeds site capacity"
                    );
                }
            }
        }

        Ok(DenseParameters {
            coal_capacity: plants.iter().map(|p| p.capacity_mw).collect(),
            historical_generation: plants.iter().map(|p| p.historical_generation_mwh).collect(),
            coal_fixed_opex: plants.iter().map(|p| p.fixed_opex).collect(),
            coal_variable_opex: plants.iter().map(|p| p.variable_opex).collect(),
            health_damage: plants.iter().map(|p| p.health_damage).collect(),
            retirement_ef: plants.iter().map(|p| p.retirement_ef).collect(),
            coal_om_ef: plants.iter().map(|p| p.om_ef).collect(),
            max_sites: plants.iter().map(|p| p.max_sites).collect(),
            capacity_factor: sites.iter().map(|s| s.capacity_factor).collect(),
            re_capex: sites.iter().map(|s| s.capex).collect(),
            re_fixed_opex: sites.iter().map(|s| s.fixed_opex).collect(),
            re_variable_opex: sites.iter().map(|s| s.variable_opex).collect(),
            site_max_capacity: sites.iter().map(|s| s.max_capacity_mw).collect(),
            site_min_capacity: sites.iter().map(|s| s.min_capacity_mw).collect(),
            max_capacity,
            construction_ef,
            re_om_ef,
        })
    }
}

/// Parameters laid out by set position: `[c]`, `[r]`, `[r][c]` or `[r][y]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseParameters {
    pub coal_capacity: Vec<f64>,
    pub historical_generation: Vec<f64>,
    pub coal_fixed_opex: Vec<f64>,
    pub coal_variable_opex: Vec<f64>,
    pub health_damage: Vec<f64>,
    pub retirement_ef: Vec<f64>,
    pub coal_om_ef: Vec<f64>,
    pub max_sites: Vec<f64>,
    pub capacity_factor: Vec<f64>,
    pub re_capex: Vec<f64>,
    pub re_fixed_opex: Vec<f64>,
    pub re_variable_opex: Vec<f64>,
    pub site_max_capacity: Vec<f64>,
    pub site_min_capacity: Vec<f64>,
    pub max_capacity: Vec<Vec<f64>>,
    pub construction_ef: Vec<Vec<f64>>,
    pub re_om_ef: Vec<Vec<f64>>,
}

fn check_finite(issues: &mut Vec<String>, name: &str, key: &dyn fmt::Display, value: f64) {
    if !value.is_finite() {
        issues.push(format!("{name} for ({key}) is not finite ({value})"));
    }
}

fn check_non_negative(issues: &mut Vec<String>, name: &str, key: &dyn fmt::Display, value: f64) {
    if !value.is_finite() || value < 0.0 {
        issues.push(format!("{name} for ({key}) must be finite and >= 0 (got {value})"));
    }
}

fn format_issues(issues: &[String]) -> String {
    let shown = issues
        .iter()
        .take(MAX_REPORTED_ISSUES)
        .cloned()
        .collect::<Vec<_>>()
        .join("; ");
    if issues.len() > MAX_REPORTED_ISSUES {
        format!(
            "{shown}; and {} more",
            issues.len() - MAX_REPORTED_ISSUES
        )
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sets::YearSet;

    fn plant(id: &str) -> CoalPlant {
        CoalPlant {
            id: CoalPlantId::new(id),
            capacity_mw: 500.0,
            historical_generation_mwh: 2_000_000.0,
            fixed_opex: 40_000.0,
            variable_opex: 25.0,
            health_damage: 60.0,
            retirement_ef: 0.5,
            om_ef: 0.0001,
            max_sites: 2.0,
        }
    }

    fn site(id: &str) -> ReSite {
        ReSite {
            id: ReSiteId::new(id),
            technology: Technology::Wind,
            capacity_factor: 0.35,
            capex: 1_500_000.0,
            fixed_opex: 30_000.0,
            variable_opex: 0.0,
            max_capacity_mw: 800.0,
            min_capacity_mw: 0.0,
        }
    }

    fn sets() -> IndexSets {
        IndexSets::new(
            YearSet::consecutive(1, 2).unwrap(),
            vec![CoalPlantId::new("c1")],
            vec![ReSiteId::new("r1"), ReSiteId::new("r2")],
        )
        .unwrap()
    }

    fn complete_table() -> ParameterTable {
        let mut table = ParameterTable::new();
        table.insert_coal_plant(plant("c1"));
        for id in ["r1", "r2"] {
            table.insert_re_site(site(id));
            table.set_pair_max_capacity(ReSiteId::new(id), CoalPlantId::new("c1"), 600.0);
            for year in 1..=2 {
                table.set_employment_factors(
                    ReSiteId::new(id),
                    year,
                    EmploymentFactors {
                        construction: 2.0 + year as f64,
                        om: 0.2,
                    },
                );
            }
        }
        table
    }

    #[test]
    fn test_resolve_dense_layout() {
        let dense = complete_table().resolve(&sets()).unwrap();
        assert_eq!(dense.historical_generation, vec![2_000_000.0]);
        assert_eq!(dense.max_capacity, vec![vec![600.0], vec![600.0]]);
        assert_eq!(dense.construction_ef[1], vec![3.0, 4.0]);
        assert_eq!(dense.capacity_factor.len(), 2);
    }

    #[test]
    fn test_missing_pair_limit_is_configuration_error() {
        let mut table = complete_table();
        table.pair_max_capacity.clear();
        let err = table.resolve(&sets()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("MAXCAP missing for (r1, c1)"));
    }

    #[test]
    fn test_missing_employment_year_is_reported() {
        let mut table = complete_table();
        table.employment.remove(&(ReSiteId::new("r2"), 2));
        let err = table.resolve(&sets()).unwrap_err();
        assert!(err.to_string().contains("CONEF/REOMEF missing for (r2, 2)"));
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let mut table = complete_table();
        let mut bad = plant("c1");
        bad.historical_generation_mwh = -1.0;
        table.insert_coal_plant(bad);
        let err = table.resolve(&sets()).unwrap_err();
        assert!(err.to_string().contains("HISTGEN"));
    }

    #[test]
    fn test_unknown_plant_in_sets() {
        let table = complete_table();
        let sets = IndexSets::new(
            YearSet::consecutive(1, 2).unwrap(),
            vec![CoalPlantId::new("c9")],
            vec![ReSiteId::new("r1")],
        )
        .unwrap();
        let err = table.resolve(&sets).unwrap_err();
        assert!(err.to_string().contains("coal plant 'c9' has no parameters"));
    }

    #[test]
    fn test_issue_list_is_capped() {
        let issues: Vec<String> = (0..15).map(|i| format!("issue {i}")).collect();
        let text = format_issues(&issues);
        assert!(text.contains("issue 9"));
        assert!(!text.contains("issue 10;"));
        assert!(text.ends_with("and 5 more"));
    }

    #[test]
    fn test_technology_parse() {
        assert_eq!("Solar".parse::<Technology>().unwrap(), Technology::Solar);
        assert_eq!("wind".parse::<Technology>().unwrap(), Technology::Wind);
        assert!("hydro".parse::<Technology>().is_err());
    }
}
