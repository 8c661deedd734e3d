//! Index sets of the retirement model
//!
//! Three ordered sets index every parameter and decision variable: planning
//! years, coal plants and renewable-energy sites. Order is significant. Years
//! are walked by position so that "previous year" is `years[i - 1]`, and the
//! dense output arrays are laid out in the declared order of each set.

use crate::error::{EqretError, EqretResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identifier of a coal plant (e.g. an ORISPL code)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoalPlantId(String);

/// Identifier of a candidate renewable-energy site
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReSiteId(String);

impl CoalPlantId {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        CoalPlantId(value.into())
    }
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ReSiteId {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        ReSiteId(value.into())
    }
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoalPlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ReSiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, strictly increasing sequence of planning years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct YearSet(Vec<u32>);

impl YearSet {
    /// Create a year set, rejecting empty or non-increasing sequences.
    pub fn new(years: Vec<u32>) -> EqretResult<Self> {
        if years.is_empty() {
            return Err(EqretError::config("year set is empty"));
        }
        if let Some(pair) = years.windows(2).find(|w| w[0] >= w[1]) {
            return Err(EqretError::config(format!(
                "years must be strictly increasing (found {} followed by {})",
                pair[0], pair[1]
            )));
        }
        Ok(YearSet(years))
    }

    /// `count` consecutive years starting at `start`.
    pub fn consecutive(start: u32, count: usize) -> EqretResult<Self> {
        Self::new((0..count as u32).map(|offset| start + offset).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Position of the year preceding position `pos`, or `None` for the first year.
    #[inline]
    pub fn previous(&self, pos: usize) -> Option<usize> {
        pos.checked_sub(1)
    }
}

impl TryFrom<Vec<u32>> for YearSet {
    type Error = EqretError;

    fn try_from(years: Vec<u32>) -> Result<Self, Self::Error> {
        YearSet::new(years)
    }
}

impl From<YearSet> for Vec<u32> {
    fn from(set: YearSet) -> Self {
        set.0
    }
}

/// The three index sets of a retirement problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSets {
    pub years: YearSet,
    pub coal_plants: Vec<CoalPlantId>,
    pub re_sites: Vec<ReSiteId>,
}

impl IndexSets {
    /// Combine the sets, rejecting empty or duplicated plant and site lists.
    pub fn new(
        years: YearSet,
        coal_plants: Vec<CoalPlantId>,
        re_sites: Vec<ReSiteId>,
    ) -> EqretResult<Self> {
        if coal_plants.is_empty() {
            return Err(EqretError::config("coal plant set is empty"));
        }
        if re_sites.is_empty() {
            return Err(EqretError::config("renewable site set is empty"));
        }
        if let Some(dup) = first_duplicate(&coal_plants) {
            return Err(EqretError::config(format!("duplicate coal plant id '{dup}'")));
        }
        if let Some(dup) = first_duplicate(&re_sites) {
            return Err(EqretError::config(format!("duplicate renewable site id '{dup}'")));
        }
        Ok(Self {
            years,
            coal_plants,
            re_sites,
        })
    }

    pub fn num_years(&self) -> usize {
        self.years.len()
    }

    pub fn num_coal(&self) -> usize {
        self.coal_plants.len()
    }

    pub fn num_re(&self) -> usize {
        self.re_sites.len()
    }
}

fn first_duplicate<T: Eq + std::hash::Hash + Clone>(items: &[T]) -> Option<T> {
    let mut seen = HashSet::new();
    items.iter().find(|item| !seen.insert(*item)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_set_positions() {
        let years = YearSet::new(vec![2025, 2026, 2030]).unwrap();
        assert_eq!(years.len(), 3);
        assert_eq!(years.as_slice()[2], 2030);
        assert_eq!(years.previous(0), None);
        assert_eq!(years.previous(2), Some(1));
    }

    #[test]
    fn test_year_set_rejects_unsorted() {
        assert!(YearSet::new(vec![2026, 2025]).is_err());
        assert!(YearSet::new(vec![2025, 2025]).is_err());
        assert!(YearSet::new(vec![]).is_err());
    }

    #[test]
    fn test_consecutive_years() {
        let years = YearSet::consecutive(1, 7).unwrap();
        assert_eq!(years.as_slice(), &[1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_year_set_serde_validates() {
        let parsed: Result<YearSet, _> = serde_json::from_str("[3, 1]");
        assert!(parsed.is_err());
        let parsed: YearSet = serde_json::from_str("[1, 3]").unwrap();
        assert_eq!(parsed.as_slice(), &[1, 3]);
    }

    #[test]
    fn test_index_sets_reject_duplicates() {
        let years = YearSet::consecutive(2025, 2).unwrap();
        let err = IndexSets::new(
            years,
            vec![CoalPlantId::new("3"), CoalPlantId::new("3")],
            vec![ReSiteId::new("w1")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate coal plant id '3'"));
    }

    #[test]
    fn test_index_sets_reject_empty() {
        let years = YearSet::consecutive(2025, 2).unwrap();
        assert!(IndexSets::new(years, vec![CoalPlantId::new("3")], vec![]).is_err());
    }
}
