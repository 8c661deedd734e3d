//! # eqret-core: data model of the equitable coal retirement problem
//!
//! Index sets ([`IndexSets`]: years, coal plants, renewable sites), the typed
//! [`ParameterTable`], and the shared [`EqretError`] type. The optimisation
//! model itself lives in `eqret-algo`.

pub mod error;
pub mod params;
pub mod sets;

pub use error::{EqretError, EqretResult};
pub use params::{CoalPlant, DenseParameters, EmploymentFactors, ParameterTable, ReSite, Technology};
pub use sets::{CoalPlantId, IndexSets, ReSiteId, YearSet};

/// Hours in a (non-leap) year, converting capacity factor × MW into MWh/yr
pub const HOURS_PER_YEAR: f64 = 8760.0;
