//! Small problems shared by the unit tests

use eqret_core::{
    CoalPlant, CoalPlantId, EmploymentFactors, IndexSets, ParameterTable, ReSite, ReSiteId,
    Technology, YearSet,
};

pub(crate) fn plant(id: &str, histgen: f64) -> CoalPlant {
    CoalPlant {
        id: CoalPlantId::new(id),
        capacity_mw: 50.0,
        historical_generation_mwh: histgen,
        fixed_opex: 1.0,
        variable_opex: 1.0,
        health_damage: 10.0,
        retirement_ef: 1.0,
        om_ef: 0.01,
        max_sites: 1.0,
    }
}

pub(crate) fn site(id: &str, cf: f64) -> ReSite {
    ReSite {
        id: ReSiteId::new(id),
        technology: Technology::Solar,
        capacity_factor: cf,
        capex: 1e6,
        fixed_opex: 10.0,
        variable_opex: 0.0,
        max_capacity_mw: 1000.0,
        min_capacity_mw: 0.0,
    }
}

pub(crate) fn table(
    sets: &IndexSets,
    plants: Vec<CoalPlant>,
    sites: Vec<ReSite>,
) -> ParameterTable {
    let mut params = ParameterTable::new();
    for plant in plants {
        params.insert_coal_plant(plant);
    }
    for site in sites {
        params.insert_re_site(site);
    }
    for site in &sets.re_sites {
        for plant in &sets.coal_plants {
            params.set_pair_max_capacity(site.clone(), plant.clone(), 1000.0);
        }
        for year in sets.years.iter() {
            params.set_employment_factors(
                site.clone(),
                year,
                EmploymentFactors {
                    construction: 1.0,
                    om: 0.1,
                },
            );
        }
    }
    params
}

/// One plant, one site, two years
pub(crate) fn single_pair_problem(histgen: f64, cf: f64) -> (IndexSets, ParameterTable) {
    let sets = IndexSets::new(
        YearSet::consecutive(2025, 2).unwrap(),
        vec![CoalPlantId::new("c1")],
        vec![ReSiteId::new("r1")],
    )
    .unwrap();
    let params = table(&sets, vec![plant("c1", histgen)], vec![site("r1", cf)]);
    (sets, params)
}

/// Two plants, two sites, `years` consecutive years
pub(crate) fn two_by_two_problem(years: usize) -> (IndexSets, ParameterTable) {
    let sets = IndexSets::new(
        YearSet::consecutive(2025, years).unwrap(),
        vec![CoalPlantId::new("c1"), CoalPlantId::new("c2")],
        vec![ReSiteId::new("r1"), ReSiteId::new("r2")],
    )
    .unwrap();
    let params = table(
        &sets,
        vec![plant("c1", 1000.0), plant("c2", 2000.0)],
        vec![site("r1", 0.3), site("r2", 0.25)],
    );
    (sets, params)
}
