//! `eqret validate`

use anyhow::Result;
use eqret_io::load_parameter_dir;
use std::path::Path;

pub fn handle(params: &Path) -> Result<()> {
    let loaded = load_parameter_dir(params)?;
    let sets = &loaded.sets;
    let years = sets.years.as_slice();

    println!("Parameter directory is valid");
    println!("  {} coal plants", sets.num_coal());
    println!("  {} RE sites", sets.num_re());
    if let (Some(first), Some(last)) = (years.first(), years.last()) {
        println!("  {} years ({first}-{last})", sets.num_years());
    }
    Ok(())
}
