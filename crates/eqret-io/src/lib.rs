//! # eqret-io: Parameter table loading
//!
//! Reads the cleaned CSV tables of a retirement study into
//! [`eqret_core::IndexSets`] and a validated [`eqret_core::ParameterTable`].

pub mod params_dir;

pub use params_dir::{
    load_parameter_dir, ParameterSet, COAL_PLANTS_FILE, EMPLOYMENT_FILE, PAIR_LIMITS_FILE,
    RE_SITES_FILE,
};
