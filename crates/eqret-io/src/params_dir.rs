//! Parameter directory loader
//!
//! A parameter directory holds four CSV tables with headers:
//!
//! | File | Columns |
//! |------|---------|
//! | `coal_plants.csv` | plant_id, capacity_mw, historical_generation_mwh, fixed_opex, variable_opex, health_damage, retirement_ef, om_ef, max_sites |
//! | `re_sites.csv` | site_id, technology, capacity_factor, capex, fixed_opex, variable_opex, max_capacity_mw, min_capacity_mw |
//! | `pair_limits.csv` | site_id, plant_id, max_capacity_mw |
//! | `employment_factors.csv` | site_id, year, construction_ef, om_ef |
//!
//! Plants and sites are indexed in file order. Years are the sorted distinct
//! years of `employment_factors.csv`.

use anyhow::{anyhow, bail, Context, Result};
use eqret_core::{
    CoalPlant, CoalPlantId, EmploymentFactors, IndexSets, ParameterTable, ReSite, ReSiteId,
    Technology, YearSet,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, info};

pub const COAL_PLANTS_FILE: &str = "coal_plants.csv";
pub const RE_SITES_FILE: &str = "re_sites.csv";
pub const PAIR_LIMITS_FILE: &str = "pair_limits.csv";
pub const EMPLOYMENT_FILE: &str = "employment_factors.csv";

/// Index sets and parameter table read from one directory
#[derive(Debug, Clone)]
pub struct ParameterSet {
    pub sets: IndexSets,
    pub params: ParameterTable,
}

#[derive(Debug, Deserialize)]
struct CoalPlantRow {
    plant_id: String,
    capacity_mw: f64,
    historical_generation_mwh: f64,
    fixed_opex: f64,
    variable_opex: f64,
    health_damage: f64,
    retirement_ef: f64,
    om_ef: f64,
    max_sites: f64,
}

#[derive(Debug, Deserialize)]
struct ReSiteRow {
    site_id: String,
    #[serde(default)]
    technology: String,
    capacity_factor: f64,
    capex: f64,
    fixed_opex: f64,
    variable_opex: f64,
    max_capacity_mw: f64,
    #[serde(default)]
    min_capacity_mw: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PairLimitRow {
    site_id: String,
    plant_id: String,
    max_capacity_mw: f64,
}

#[derive(Debug, Deserialize)]
struct EmploymentRow {
    site_id: String,
    year: u32,
    construction_ef: f64,
    om_ef: f64,
}

/// Load and validate a parameter directory.
///
/// Fails with file and line context on malformed rows, unknown IDs, or an
/// incomplete table.
pub fn load_parameter_dir(dir: &Path) -> Result<ParameterSet> {
    if !dir.is_dir() {
        bail!("parameter directory '{}' does not exist", dir.display());
    }

    let plant_rows: Vec<CoalPlantRow> = read_table(&dir.join(COAL_PLANTS_FILE))?;
    let site_rows: Vec<ReSiteRow> = read_table(&dir.join(RE_SITES_FILE))?;
    let pair_rows: Vec<PairLimitRow> = read_table(&dir.join(PAIR_LIMITS_FILE))?;
    let employment_rows: Vec<EmploymentRow> = read_table(&dir.join(EMPLOYMENT_FILE))?;

    let mut params = ParameterTable::new();

    let mut plants = Vec::with_capacity(plant_rows.len());
    for row in plant_rows {
        let id = CoalPlantId::new(row.plant_id.trim());
        plants.push(id.clone());
        params.insert_coal_plant(CoalPlant {
            id,
            capacity_mw: row.capacity_mw,
            historical_generation_mwh: row.historical_generation_mwh,
            fixed_opex: row.fixed_opex,
            variable_opex: row.variable_opex,
            health_damage: row.health_damage,
            retirement_ef: row.retirement_ef,
            om_ef: row.om_ef,
            max_sites: row.max_sites,
        });
    }

    let mut sites = Vec::with_capacity(site_rows.len());
    for (idx, row) in site_rows.into_iter().enumerate() {
        let id = ReSiteId::new(row.site_id.trim());
        let technology: Technology = row.technology.parse().with_context(|| {
            format!("{} line {}: technology of site '{}'", RE_SITES_FILE, idx + 2, id)
        })?;
        sites.push(id.clone());
        params.insert_re_site(ReSite {
            id,
            technology,
            capacity_factor: row.capacity_factor,
            capex: row.capex,
            fixed_opex: row.fixed_opex,
            variable_opex: row.variable_opex,
            max_capacity_mw: row.max_capacity_mw,
            min_capacity_mw: row.min_capacity_mw.unwrap_or(0.0),
        });
    }

    let known_plants: HashSet<&CoalPlantId> = plants.iter().collect();
    let known_sites: HashSet<&ReSiteId> = sites.iter().collect();

    for (idx, row) in pair_rows.into_iter().enumerate() {
        let site = ReSiteId::new(row.site_id.trim());
        let plant = CoalPlantId::new(row.plant_id.trim());
        if !known_sites.contains(&site) {
            bail!("{} line {}: unknown site '{}'", PAIR_LIMITS_FILE, idx + 2, site);
        }
        if !known_plants.contains(&plant) {
            bail!("{} line {}: unknown plant '{}'", PAIR_LIMITS_FILE, idx + 2, plant);
        }
        params.set_pair_max_capacity(site, plant, row.max_capacity_mw);
    }

    let mut years = BTreeSet::new();
    for (idx, row) in employment_rows.into_iter().enumerate() {
        let site = ReSiteId::new(row.site_id.trim());
        if !known_sites.contains(&site) {
            bail!("{} line {}: unknown site '{}'", EMPLOYMENT_FILE, idx + 2, site);
        }
        years.insert(row.year);
        params.set_employment_factors(
            site,
            row.year,
            EmploymentFactors {
                construction: row.construction_ef,
                om: row.om_ef,
            },
        );
    }

    let years = YearSet::new(years.into_iter().collect())
        .with_context(|| format!("deriving planning years from {EMPLOYMENT_FILE}"))?;
    let sets = IndexSets::new(years, plants, sites).context("building index sets")?;
    params
        .resolve(&sets)
        .with_context(|| format!("validating parameters in '{}'", dir.display()))?;

    info!(
        plants = sets.num_coal(),
        sites = sets.num_re(),
        years = sets.num_years(),
        "loaded parameter directory {}",
        dir.display()
    );

    Ok(ParameterSet { sets, params })
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize().enumerate() {
        let row: T = record.with_context(|| {
            format!("parsing {} line {}", path.display(), idx + 2)
        })?;
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(anyhow!("{} contains no rows", path.display()));
    }
    debug!(rows = rows.len(), "read {}", path.display());
    Ok(rows)
}
