//! MILP model builder
//!
//! [`build_model`] turns index sets, a parameter table, objective weights and
//! a discount rate into a solver-independent [`RetirementModel`]: a list of
//! typed variables, linear constraint rows and a linear objective. The solver
//! adapter translates it into a concrete backend problem.
//!
//! Variables are laid out in contiguous blocks, one per [`VariableFamily`],
//! each in `(r, c, y)` or `(c, y)` row-major order over the set positions.

use eqret_core::{
    DenseParameters, EqretError, EqretResult, IndexSets, ParameterTable, HOURS_PER_YEAR,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Index of a decision variable within a [`RetirementModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(usize);

impl VarId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Domain of a decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    /// Non-negative real
    Continuous,
    /// 0 or 1
    Binary,
}

/// The nine decision variable families, in block order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableFamily {
    CapInvest,
    CapRetire,
    ReGen,
    CoalGen,
    ReCap,
    ReInvest,
    CoalRetire,
    ReOnline,
    CoalOnline,
}

impl VariableFamily {
    pub const ALL: [VariableFamily; 9] = [
        VariableFamily::CapInvest,
        VariableFamily::CapRetire,
        VariableFamily::ReGen,
        VariableFamily::CoalGen,
        VariableFamily::ReCap,
        VariableFamily::ReInvest,
        VariableFamily::CoalRetire,
        VariableFamily::ReOnline,
        VariableFamily::CoalOnline,
    ];

    pub fn kind(&self) -> VariableKind {
        match self {
            VariableFamily::ReInvest
            | VariableFamily::CoalRetire
            | VariableFamily::ReOnline
            | VariableFamily::CoalOnline => VariableKind::Binary,
            _ => VariableKind::Continuous,
        }
    }

    /// True for families indexed by (site, plant, year); false for (plant, year)
    pub fn is_site_indexed(&self) -> bool {
        matches!(
            self,
            VariableFamily::CapInvest
                | VariableFamily::ReGen
                | VariableFamily::ReCap
                | VariableFamily::ReInvest
                | VariableFamily::ReOnline
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableFamily::CapInvest => "capInvest",
            VariableFamily::CapRetire => "capRetire",
            VariableFamily::ReGen => "reGen",
            VariableFamily::CoalGen => "coalGen",
            VariableFamily::ReCap => "reCap",
            VariableFamily::ReInvest => "reInvest",
            VariableFamily::CoalRetire => "coalRetire",
            VariableFamily::ReOnline => "reOnline",
            VariableFamily::CoalOnline => "coalOnline",
        }
    }

    fn block(&self) -> usize {
        *self as usize
    }
}

/// Constraint families; the numbering follows the formulation in the module docs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintFamily {
    /// (1) coalGen = HISTGEN · coalOnline
    CoalGeneration,
    /// (2) Σ_r reGen + coalGen = HISTGEN
    GenerationBalance,
    /// (3) reGen = CF · reCap · 8760
    ReGeneration,
    /// (4) reCap ≤ MAXCAP · reOnline
    PairCapacity,
    /// (5) Σ_c reCap ≤ SITEMAXCAP
    SiteCapacity,
    /// (6) capInvest = reCap − reCap[y−1]
    CapacityInvestment,
    /// (7) capInvest ≤ MAXCAP · reInvest
    InvestmentLimit,
    /// (8) capRetire = COALCAP · coalRetire
    CapacityRetirement,
    /// (9) reInvest = reOnline − reOnline[y−1]
    InvestmentEvent,
    /// (10) Σ_r reInvest ≤ MAXSITES · coalRetire
    ReplacementSites,
    /// (11) coalRetire = coalOnline[y−1] − coalOnline
    RetirementEvent,
    /// Σ_c reCap ≥ SITEMINCAP (only with [`ModelOptions::enforce_site_min_capacity`])
    SiteMinimumCapacity,
}

/// Relation between a row's left-hand side and its right-hand side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Eq,
    Le,
    Ge,
}

/// Sparse linear expression Σ coef · var
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    /// Value of the expression for a full assignment of variable values
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coef)| coef * values[var.index()])
            .sum()
    }
}

/// One constraint row: `terms (sense) rhs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    pub family: ConstraintFamily,
    pub terms: Vec<(VarId, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Amount by which `values` violate this row (0 when satisfied)
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs: f64 = self
            .terms
            .iter()
            .map(|(var, coef)| coef * values[var.index()])
            .sum();
        match self.sense {
            Sense::Eq => (lhs - self.rhs).abs(),
            Sense::Le => (lhs - self.rhs).max(0.0),
            Sense::Ge => (self.rhs - lhs).max(0.0),
        }
    }
}

/// Weights of the three objective terms: `alpha·cost + beta·health − gamma·jobs`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl ObjectiveWeights {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }
}

/// Optional formulation switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Add Σ_c reCap[r,c,y] ≥ SITEMINCAP[r] for every site and year
    pub enforce_site_min_capacity: bool,
}

/// Position of every variable block within the model's variable vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableLayout {
    pub num_re: usize,
    pub num_coal: usize,
    pub num_years: usize,
    offsets: [usize; 9],
}

impl VariableLayout {
    fn new(num_re: usize, num_coal: usize, num_years: usize) -> Self {
        let mut offsets = [0; 9];
        let mut next = 0;
        for family in VariableFamily::ALL {
            offsets[family.block()] = next;
            next += if family.is_site_indexed() {
                num_re * num_coal * num_years
            } else {
                num_coal * num_years
            };
        }
        Self {
            num_re,
            num_coal,
            num_years,
            offsets,
        }
    }

    /// Total number of variables
    pub fn len(&self) -> usize {
        let last = VariableFamily::CoalOnline;
        self.offsets[last.block()] + self.num_coal * self.num_years
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Variable of a site-indexed family at set positions (r, c, y)
    #[inline]
    pub fn rcy(&self, family: VariableFamily, r: usize, c: usize, y: usize) -> VarId {
        debug_assert!(family.is_site_indexed());
        debug_assert!(r < self.num_re && c < self.num_coal && y < self.num_years);
        VarId(self.offsets[family.block()] + (r * self.num_coal + c) * self.num_years + y)
    }

    /// Variable of a plant-indexed family at set positions (c, y)
    #[inline]
    pub fn cy(&self, family: VariableFamily, c: usize, y: usize) -> VarId {
        debug_assert!(!family.is_site_indexed());
        debug_assert!(c < self.num_coal && y < self.num_years);
        VarId(self.offsets[family.block()] + c * self.num_years + y)
    }
}

/// Unweighted, discounted objective components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveComponents {
    pub system_cost: LinearExpr,
    pub health_cost: LinearExpr,
    pub jobs: LinearExpr,
}

/// A fully constructed retirement MILP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementModel {
    sets: IndexSets,
    layout: VariableLayout,
    kinds: Vec<VariableKind>,
    constraints: Vec<LinearConstraint>,
    objective: LinearExpr,
    components: ObjectiveComponents,
    weights: ObjectiveWeights,
    discount_rate: f64,
    options: ModelOptions,
}

impl RetirementModel {
    /// Index sets the model was built over
    pub fn sets(&self) -> &IndexSets {
        &self.sets
    }

    pub fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    /// Domain of every variable, indexed by [`VarId::index`]
    pub fn variable_kinds(&self) -> &[VariableKind] {
        &self.kinds
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Objective to minimise: `alpha·system + beta·health − gamma·jobs`
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn components(&self) -> &ObjectiveComponents {
        &self.components
    }

    pub fn weights(&self) -> ObjectiveWeights {
        self.weights
    }

    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    pub fn options(&self) -> ModelOptions {
        self.options
    }

    pub fn num_variables(&self) -> usize {
        self.kinds.len()
    }

    pub fn num_binary(&self) -> usize {
        self.kinds
            .iter()
            .filter(|k| **k == VariableKind::Binary)
            .count()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Rows of one constraint family, in build order
    pub fn constraints_of(
        &self,
        family: ConstraintFamily,
    ) -> impl Iterator<Item = &LinearConstraint> + '_ {
        self.constraints.iter().filter(move |c| c.family == family)
    }

    /// Largest row violation and integrality gap of an assignment
    pub fn max_violation(&self, values: &[f64]) -> f64 {
        let rows = self
            .constraints
            .iter()
            .map(|c| c.violation(values))
            .fold(0.0, f64::max);
        let domains = self
            .kinds
            .iter()
            .zip(values)
            .map(|(kind, v)| match kind {
                VariableKind::Continuous => (-v).max(0.0),
                VariableKind::Binary => (v - v.round()).abs().max((-v).max(0.0)).max(v - 1.0),
            })
            .fold(0.0, f64::max);
        rows.max(domains)
    }
}

/// Build the retirement MILP.
///
/// Fails with a configuration error when the parameter table is incomplete
/// over `sets`, holds invalid values, or `discount_rate` is not above -1.
pub fn build_model(
    sets: &IndexSets,
    params: &ParameterTable,
    weights: ObjectiveWeights,
    discount_rate: f64,
    options: ModelOptions,
) -> EqretResult<RetirementModel> {
    if !discount_rate.is_finite() || discount_rate <= -1.0 {
        return Err(EqretError::config(format!(
            "discount rate must be finite and greater than -1 (got {discount_rate})"
        )));
    }
    for (name, value) in [
        ("alpha", weights.alpha),
        ("beta", weights.beta),
        ("gamma", weights.gamma),
    ] {
        if !value.is_finite() {
            return Err(EqretError::config(format!(
                "objective weight {name} must be finite (got {value})"
            )));
        }
    }

    let dense = params.resolve(sets)?;
    let builder = ModelBuilder::new(sets, &dense, discount_rate, options);
    let model = builder.finish(weights);

    debug!(
        variables = model.num_variables(),
        binaries = model.num_binary(),
        constraints = model.num_constraints(),
        "built retirement model"
    );
    Ok(model)
}

struct ModelBuilder<'a> {
    sets: &'a IndexSets,
    params: &'a DenseParameters,
    layout: VariableLayout,
    discount: Vec<f64>,
    options: ModelOptions,
    discount_rate: f64,
    constraints: Vec<LinearConstraint>,
}

impl<'a> ModelBuilder<'a> {
    fn new(
        sets: &'a IndexSets,
        params: &'a DenseParameters,
        discount_rate: f64,
        options: ModelOptions,
    ) -> Self {
        let layout = VariableLayout::new(sets.num_re(), sets.num_coal(), sets.num_years());
        // Discounting is by year position, so the first year is undiscounted.
        let discount = (0..sets.num_years())
            .map(|pos| (1.0 + discount_rate).powi(pos as i32))
            .collect();
        Self {
            sets,
            params,
            layout,
            discount,
            options,
            discount_rate,
            constraints: Vec::new(),
        }
    }

    fn finish(mut self, weights: ObjectiveWeights) -> RetirementModel {
        self.add_coal_generation();
        self.add_generation_balance();
        self.add_re_generation();
        self.add_pair_capacity();
        self.add_site_capacity();
        self.add_capacity_investment();
        self.add_investment_limit();
        self.add_capacity_retirement();
        self.add_investment_event();
        self.add_replacement_sites();
        self.add_retirement_event();
        if self.options.enforce_site_min_capacity {
            self.add_site_minimum_capacity();
        }

        let components = self.objective_components();
        let objective = combine(
            self.layout.len(),
            &[
                (weights.alpha, &components.system_cost),
                (weights.beta, &components.health_cost),
                (-weights.gamma, &components.jobs),
            ],
        );
        let kinds = VariableFamily::ALL
            .iter()
            .flat_map(|family| {
                let count = if family.is_site_indexed() {
                    self.layout.num_re * self.layout.num_coal * self.layout.num_years
                } else {
                    self.layout.num_coal * self.layout.num_years
                };
                std::iter::repeat(family.kind()).take(count)
            })
            .collect();

        RetirementModel {
            sets: self.sets.clone(),
            layout: self.layout,
            kinds,
            constraints: self.constraints,
            objective,
            components,
            weights,
            discount_rate: self.discount_rate,
            options: self.options,
        }
    }

    fn rcy(&self, family: VariableFamily, r: usize, c: usize, y: usize) -> VarId {
        self.layout.rcy(family, r, c, y)
    }

    fn cy(&self, family: VariableFamily, c: usize, y: usize) -> VarId {
        self.layout.cy(family, c, y)
    }

    fn push(&mut self, family: ConstraintFamily, terms: Vec<(VarId, f64)>, sense: Sense, rhs: f64) {
        self.constraints.push(LinearConstraint {
            family,
            terms,
            sense,
            rhs,
        });
    }

    fn plant_years(&self) -> impl Iterator<Item = (usize, usize)> {
        let (nc, ny) = (self.layout.num_coal, self.layout.num_years);
        (0..nc).flat_map(move |c| (0..ny).map(move |y| (c, y)))
    }

    fn site_plant_years(&self) -> impl Iterator<Item = (usize, usize, usize)> {
        let (nr, nc, ny) = (self.layout.num_re, self.layout.num_coal, self.layout.num_years);
        (0..nr).flat_map(move |r| (0..nc).flat_map(move |c| (0..ny).map(move |y| (r, c, y))))
    }

    fn site_years(&self) -> impl Iterator<Item = (usize, usize)> {
        let (nr, ny) = (self.layout.num_re, self.layout.num_years);
        (0..nr).flat_map(move |r| (0..ny).map(move |y| (r, y)))
    }

    fn add_coal_generation(&mut self) {
        for (c, y) in self.plant_years().collect::<Vec<_>>() {
            let terms = vec![
                (self.cy(VariableFamily::CoalGen, c, y), 1.0),
                (
                    self.cy(VariableFamily::CoalOnline, c, y),
                    -self.params.historical_generation[c],
                ),
            ];
            self.push(ConstraintFamily::CoalGeneration, terms, Sense::Eq, 0.0);
        }
    }

    fn add_generation_balance(&mut self) {
        for (c, y) in self.plant_years().collect::<Vec<_>>() {
            let mut terms: Vec<(VarId, f64)> = (0..self.layout.num_re)
                .map(|r| (self.rcy(VariableFamily::ReGen, r, c, y), 1.0))
                .collect();
            terms.push((self.cy(VariableFamily::CoalGen, c, y), 1.0));
            let rhs = self.params.historical_generation[c];
            self.push(ConstraintFamily::GenerationBalance, terms, Sense::Eq, rhs);
        }
    }

    fn add_re_generation(&mut self) {
        for (r, c, y) in self.site_plant_years().collect::<Vec<_>>() {
            let terms = vec![
                (self.rcy(VariableFamily::ReGen, r, c, y), 1.0),
                (
                    self.rcy(VariableFamily::ReCap, r, c, y),
                    -self.params.capacity_factor[r] * HOURS_PER_YEAR,
                ),
            ];
            self.push(ConstraintFamily::ReGeneration, terms, Sense::Eq, 0.0);
        }
    }

    fn add_pair_capacity(&mut self) {
        for (r, c, y) in self.site_plant_years().collect::<Vec<_>>() {
            let terms = vec![
                (self.rcy(VariableFamily::ReCap, r, c, y), 1.0),
                (
                    self.rcy(VariableFamily::ReOnline, r, c, y),
                    -self.params.max_capacity[r][c],
                ),
            ];
            self.push(ConstraintFamily::PairCapacity, terms, Sense::Le, 0.0);
        }
    }

    fn site_capacity_terms(&self, r: usize, y: usize) -> Vec<(VarId, f64)> {
        (0..self.layout.num_coal)
            .map(|c| (self.rcy(VariableFamily::ReCap, r, c, y), 1.0))
            .collect()
    }

    fn add_site_capacity(&mut self) {
        for (r, y) in self.site_years().collect::<Vec<_>>() {
            let terms = self.site_capacity_terms(r, y);
            let rhs = self.params.site_max_capacity[r];
            self.push(ConstraintFamily::SiteCapacity, terms, Sense::Le, rhs);
        }
    }

    fn add_site_minimum_capacity(&mut self) {
        for (r, y) in self.site_years().collect::<Vec<_>>() {
            let terms = self.site_capacity_terms(r, y);
            let rhs = self.params.site_min_capacity[r];
            self.push(ConstraintFamily::SiteMinimumCapacity, terms, Sense::Ge, rhs);
        }
    }

    fn add_capacity_investment(&mut self) {
        for (r, c, y) in self.site_plant_years().collect::<Vec<_>>() {
            let mut terms = vec![
                (self.rcy(VariableFamily::CapInvest, r, c, y), 1.0),
                (self.rcy(VariableFamily::ReCap, r, c, y), -1.0),
            ];
            if let Some(prev) = self.sets.years.previous(y) {
                terms.push((self.rcy(VariableFamily::ReCap, r, c, prev), 1.0));
            }
            self.push(ConstraintFamily::CapacityInvestment, terms, Sense::Eq, 0.0);
        }
    }

    fn add_investment_limit(&mut self) {
        for (r, c, y) in self.site_plant_years().collect::<Vec<_>>() {
            let terms = vec![
                (self.rcy(VariableFamily::CapInvest, r, c, y), 1.0),
                (
                    self.rcy(VariableFamily::ReInvest, r, c, y),
                    -self.params.max_capacity[r][c],
                ),
            ];
            self.push(ConstraintFamily::InvestmentLimit, terms, Sense::Le, 0.0);
        }
    }

    fn add_capacity_retirement(&mut self) {
        for (c, y) in self.plant_years().collect::<Vec<_>>() {
            let terms = vec![
                (self.cy(VariableFamily::CapRetire, c, y), 1.0),
                (
                    self.cy(VariableFamily::CoalRetire, c, y),
                    -self.params.coal_capacity[c],
                ),
            ];
            self.push(ConstraintFamily::CapacityRetirement, terms, Sense::Eq, 0.0);
        }
    }

    fn add_investment_event(&mut self) {
        for (r, c, y) in self.site_plant_years().collect::<Vec<_>>() {
            let mut terms = vec![
                (self.rcy(VariableFamily::ReInvest, r, c, y), 1.0),
                (self.rcy(VariableFamily::ReOnline, r, c, y), -1.0),
            ];
            if let Some(prev) = self.sets.years.previous(y) {
                terms.push((self.rcy(VariableFamily::ReOnline, r, c, prev), 1.0));
            }
            self.push(ConstraintFamily::InvestmentEvent, terms, Sense::Eq, 0.0);
        }
    }

    fn add_replacement_sites(&mut self) {
        for (c, y) in self.plant_years().collect::<Vec<_>>() {
            let mut terms: Vec<(VarId, f64)> = (0..self.layout.num_re)
                .map(|r| (self.rcy(VariableFamily::ReInvest, r, c, y), 1.0))
                .collect();
            terms.push((
                self.cy(VariableFamily::CoalRetire, c, y),
                -self.params.max_sites[c],
            ));
            self.push(ConstraintFamily::ReplacementSites, terms, Sense::Le, 0.0);
        }
    }

    fn add_retirement_event(&mut self) {
        for (c, y) in self.plant_years().collect::<Vec<_>>() {
            let retire = (self.cy(VariableFamily::CoalRetire, c, y), 1.0);
            let online = (self.cy(VariableFamily::CoalOnline, c, y), 1.0);
            match self.sets.years.previous(y) {
                // First year: the plant counts as online before the horizon.
                None => self.push(
                    ConstraintFamily::RetirementEvent,
                    vec![retire, online],
                    Sense::Eq,
                    1.0,
                ),
                Some(prev) => {
                    let online_prev = (self.cy(VariableFamily::CoalOnline, c, prev), -1.0);
                    self.push(
                        ConstraintFamily::RetirementEvent,
                        vec![retire, online, online_prev],
                        Sense::Eq,
                        0.0,
                    )
                }
            }
        }
    }

    fn objective_components(&self) -> ObjectiveComponents {
        let p = self.params;
        let n = self.layout.len();
        let mut system = vec![0.0; n];
        let mut health = vec![0.0; n];
        let mut jobs = vec![0.0; n];

        for (c, y) in self.plant_years() {
            let df = self.discount[y];
            let online = self.cy(VariableFamily::CoalOnline, c, y).index();
            let gen = self.cy(VariableFamily::CoalGen, c, y).index();
            let retire = self.cy(VariableFamily::CapRetire, c, y).index();

            system[online] += p.coal_fixed_opex[c] * p.coal_capacity[c] / df;
            system[gen] += p.coal_variable_opex[c] / df;
            health[gen] += p.health_damage[c] / df;
            jobs[retire] += p.retirement_ef[c] / df;
            jobs[gen] += p.coal_om_ef[c] / df;
        }

        for (r, c, y) in self.site_plant_years() {
            let df = self.discount[y];
            let cap = self.rcy(VariableFamily::ReCap, r, c, y).index();
            let invest = self.rcy(VariableFamily::CapInvest, r, c, y).index();
            let gen = self.rcy(VariableFamily::ReGen, r, c, y).index();

            system[cap] += p.re_fixed_opex[r] / df;
            system[invest] += p.re_capex[r] / df;
            system[gen] += p.re_variable_opex[r] / df;
            jobs[invest] += p.construction_ef[r][y] / df;
            jobs[cap] += p.re_om_ef[r][y] / df;
        }

        ObjectiveComponents {
            system_cost: sparse(&system),
            health_cost: sparse(&health),
            jobs: sparse(&jobs),
        }
    }
}

fn sparse(dense: &[f64]) -> LinearExpr {
    LinearExpr {
        terms: dense
            .iter()
            .enumerate()
            .filter(|(_, coef)| **coef != 0.0)
            .map(|(i, coef)| (VarId(i), *coef))
            .collect(),
    }
}

fn combine(n: usize, parts: &[(f64, &LinearExpr)]) -> LinearExpr {
    let mut dense = vec![0.0; n];
    for (weight, expr) in parts {
        for (var, coef) in &expr.terms {
            dense[var.index()] += weight * coef;
        }
    }
    sparse(&dense)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retirement::test_fixtures::{
        plant, single_pair_problem, site, table, two_by_two_problem,
    };
    use eqret_core::{CoalPlantId, ReSiteId, YearSet};

    #[test]
    fn test_layout_blocks_are_contiguous() {
        let layout = VariableLayout::new(2, 3, 4);
        assert_eq!(layout.rcy(VariableFamily::CapInvest, 0, 0, 0).index(), 0);
        assert_eq!(layout.rcy(VariableFamily::CapInvest, 1, 2, 3).index(), 23);
        assert_eq!(layout.cy(VariableFamily::CapRetire, 0, 0).index(), 24);
        // 5 site-indexed blocks of 24, 4 plant-indexed blocks of 12
        assert_eq!(layout.len(), 5 * 24 + 4 * 12);
    }

    #[test]
    fn test_variable_counts() {
        let (sets, params) = two_by_two_problem(3);
        let model = build_model(
            &sets,
            &params,
            ObjectiveWeights::new(1.0, 1.0, 1.0),
            0.05,
            ModelOptions::default(),
        )
        .unwrap();
        // rcy: 2*2*3 = 12 per family, cy: 2*3 = 6 per family
        assert_eq!(model.num_variables(), 5 * 12 + 4 * 6);
        assert_eq!(model.num_binary(), 2 * 12 + 2 * 6);
        // 6 rcy families of 12 rows, 5 cy families of 6 rows, site capacity 2*3
        assert_eq!(model.num_constraints(), 5 * 12 + 5 * 6 + 6);
        assert_eq!(model.constraints_of(ConstraintFamily::SiteMinimumCapacity).count(), 0);
    }

    #[test]
    fn test_first_year_boundary_rows() {
        let (sets, params) = single_pair_problem(100.0, 0.5);
        let model = build_model(
            &sets,
            &params,
            ObjectiveWeights::new(1.0, 0.0, 0.0),
            0.0,
            ModelOptions::default(),
        )
        .unwrap();
        let layout = model.layout();

        let invest: Vec<_> = model.constraints_of(ConstraintFamily::CapacityInvestment).collect();
        assert_eq!(invest.len(), 2);
        assert_eq!(invest[0].terms.len(), 2);
        assert_eq!(invest[1].terms.len(), 3);
        assert!(invest[1]
            .terms
            .contains(&(layout.rcy(VariableFamily::ReCap, 0, 0, 0), 1.0)));

        let retire: Vec<_> = model.constraints_of(ConstraintFamily::RetirementEvent).collect();
        assert_eq!(retire[0].rhs, 1.0);
        assert_eq!(retire[0].terms.len(), 2);
        assert_eq!(retire[1].rhs, 0.0);
        assert!(retire[1]
            .terms
            .contains(&(layout.cy(VariableFamily::CoalOnline, 0, 0), -1.0)));
    }

    #[test]
    fn test_lag_follows_year_position_not_label() {
        let sets = IndexSets::new(
            YearSet::new(vec![2025, 2030, 2040]).unwrap(),
            vec![CoalPlantId::new("c1")],
            vec![ReSiteId::new("r1")],
        )
        .unwrap();
        let params = table(&sets, vec![plant("c1", 100.0)], vec![site("r1", 0.5)]);
        let model = build_model(
            &sets,
            &params,
            ObjectiveWeights::new(1.0, 0.0, 0.0),
            0.0,
            ModelOptions::default(),
        )
        .unwrap();
        let layout = model.layout();

        let events: Vec<_> = model.constraints_of(ConstraintFamily::InvestmentEvent).collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].terms.len(), 2);
        assert!(events[2]
            .terms
            .contains(&(layout.rcy(VariableFamily::ReOnline, 0, 0, 1), 1.0)));

        let retire: Vec<_> = model.constraints_of(ConstraintFamily::RetirementEvent).collect();
        assert!(retire[2]
            .terms
            .contains(&(layout.cy(VariableFamily::CoalOnline, 0, 1), -1.0)));
    }

    #[test]
    fn test_re_generation_coefficient() {
        let (sets, params) = single_pair_problem(100.0, 0.5);
        let model = build_model(
            &sets,
            &params,
            ObjectiveWeights::new(1.0, 0.0, 0.0),
            0.0,
            ModelOptions::default(),
        )
        .unwrap();
        let row = model
            .constraints_of(ConstraintFamily::ReGeneration)
            .next()
            .unwrap();
        let cap = model.layout().rcy(VariableFamily::ReCap, 0, 0, 0);
        assert!(row.terms.contains(&(cap, -0.5 * HOURS_PER_YEAR)));
    }

    #[test]
    fn test_discounting_uses_year_position() {
        let (sets, params) = single_pair_problem(100.0, 0.5);
        let model = build_model(
            &sets,
            &params,
            ObjectiveWeights::new(0.0, 1.0, 0.0),
            0.10,
            ModelOptions::default(),
        )
        .unwrap();
        let layout = model.layout();
        let hd = params
            .coal_plant(&sets.coal_plants[0])
            .unwrap()
            .health_damage;
        let y0 = layout.cy(VariableFamily::CoalGen, 0, 0);
        let y1 = layout.cy(VariableFamily::CoalGen, 0, 1);
        let coef = |var: VarId| {
            model
                .objective()
                .terms
                .iter()
                .find(|(v, _)| *v == var)
                .map(|(_, c)| *c)
                .unwrap()
        };
        assert!((coef(y0) - hd).abs() < 1e-12);
        assert!((coef(y1) - hd / 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_jobs_enter_objective_negatively() {
        let (sets, params) = single_pair_problem(100.0, 0.5);
        let model = build_model(
            &sets,
            &params,
            ObjectiveWeights::new(0.0, 0.0, 2.0),
            0.0,
            ModelOptions::default(),
        )
        .unwrap();
        let retire = model.layout().cy(VariableFamily::CapRetire, 0, 0);
        let (_, coef) = model
            .objective()
            .terms
            .iter()
            .find(|(v, _)| *v == retire)
            .copied()
            .unwrap();
        let retef = params.coal_plant(&sets.coal_plants[0]).unwrap().retirement_ef;
        assert!((coef + 2.0 * retef).abs() < 1e-12);
    }

    #[test]
    fn test_build_is_deterministic() {
        let (sets, params) = two_by_two_problem(4);
        let weights = ObjectiveWeights::new(1.0, 0.5, 1000.0);
        let a = build_model(&sets, &params, weights, 0.03, ModelOptions::default()).unwrap();
        let b = build_model(&sets, &params, weights, 0.03, ModelOptions::default()).unwrap();
        assert_eq!(a, b);
        let bits = |m: &RetirementModel| -> Vec<u64> {
            m.objective().terms.iter().map(|(_, c)| c.to_bits()).collect()
        };
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn test_site_minimum_capacity_option() {
        let (sets, params) = two_by_two_problem(2);
        let options = ModelOptions {
            enforce_site_min_capacity: true,
        };
        let model = build_model(
            &sets,
            &params,
            ObjectiveWeights::new(1.0, 0.0, 0.0),
            0.0,
            options,
        )
        .unwrap();
        let rows: Vec<_> = model
            .constraints_of(ConstraintFamily::SiteMinimumCapacity)
            .collect();
        assert_eq!(rows.len(), 2 * 2);
        assert!(rows.iter().all(|r| r.sense == Sense::Ge));
    }

    #[test]
    fn test_invalid_discount_rate() {
        let (sets, params) = single_pair_problem(100.0, 0.5);
        let err = build_model(
            &sets,
            &params,
            ObjectiveWeights::new(1.0, 0.0, 0.0),
            -1.0,
            ModelOptions::default(),
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_violation_of_assignment() {
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
        // Coal stays online in both years, nothing built.
        let mut values = vec![0.0; model.num_variables()];
        for y in 0..2 {
            values[layout.cy(VariableFamily::CoalOnline, 0, y).index()] = 1.0;
            values[layout.cy(VariableFamily::CoalGen, 0, y).index()] = 100.0;
        }
        assert!(model.max_violation(&values) < 1e-12);

        values[layout.cy(VariableFamily::CoalGen, 0, 1).index()] = 50.0;
        assert!(model.max_violation(&values) >= 50.0 - 1e-12);
    }
}
