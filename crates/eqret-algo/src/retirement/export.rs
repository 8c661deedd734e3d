//! Export of [`RetirementOutput`] to JSON and long-format CSV

use super::solution::RetirementOutput;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// File name of the per-plant result table
pub const COAL_RESULTS_FILE: &str = "coal_results.csv";
/// File name of the per-site/plant result table
pub const RE_RESULTS_FILE: &str = "re_results.csv";

#[derive(Serialize)]
struct CoalRow<'a> {
    plant_id: &'a str,
    year: u32,
    coal_online: f64,
    coal_retire: f64,
    coal_gen: f64,
    cap_retire: f64,
}

#[derive(Serialize)]
struct ReRow<'a> {
    site_id: &'a str,
    plant_id: &'a str,
    year: u32,
    re_online: f64,
    re_invest: f64,
    re_cap: f64,
    cap_invest: f64,
    re_gen: f64,
}

impl RetirementOutput {
    /// Export to JSON format
    pub fn to_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("serializing RetirementOutput to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing JSON to {}", path.display()))?;
        Ok(())
    }

    /// Convert to JSON value (for streaming/stdout)
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).context("converting RetirementOutput to JSON value")
    }

    /// Write `coal_results.csv` and `re_results.csv` into `dir`
    pub fn to_csv(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;

        let coal_path = dir.join(COAL_RESULTS_FILE);
        let mut wtr = csv::Writer::from_path(&coal_path)
            .with_context(|| format!("creating CSV writer for {}", coal_path.display()))?;
        for (c, plant) in self.coal_plants.iter().enumerate() {
            for (y, year) in self.years.iter().enumerate() {
                wtr.serialize(CoalRow {
                    plant_id: plant.as_str(),
                    year: *year,
                    coal_online: self.coal_online[[c, y]],
                    coal_retire: self.coal_retire[[c, y]],
                    coal_gen: self.coal_gen[[c, y]],
                    cap_retire: self.cap_retire[[c, y]],
                })
                .context("writing coal CSV record")?;
            }
        }
        wtr.flush().context("flushing coal CSV writer")?;

        let re_path = dir.join(RE_RESULTS_FILE);
        let mut wtr = csv::Writer::from_path(&re_path)
            .with_context(|| format!("creating CSV writer for {}", re_path.display()))?;
        for (r, site) in self.re_sites.iter().enumerate() {
            for (c, plant) in self.coal_plants.iter().enumerate() {
                for (y, year) in self.years.iter().enumerate() {
                    wtr.serialize(ReRow {
                        site_id: site.as_str(),
                        plant_id: plant.as_str(),
                        year: *year,
                        re_online: self.re_online[[r, c, y]],
                        re_invest: self.re_invest[[r, c, y]],
                        re_cap: self.re_cap[[r, c, y]],
                        cap_invest: self.cap_invest[[r, c, y]],
                        re_gen: self.re_gen[[r, c, y]],
                    })
                    .context("writing RE CSV record")?;
                }
            }
        }
        wtr.flush().context("flushing RE CSV writer")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retirement::solution::ObjectiveBreakdown;
    use eqret_core::{CoalPlantId, ReSiteId};
    use ndarray::{Array2, Array3};
    use tempfile::TempDir;

    fn create_test_output() -> RetirementOutput {
        let mut coal_online = Array2::zeros((2, 2));
        coal_online[[0, 0]] = 1.0;
        coal_online[[1, 0]] = 1.0;
        coal_online[[1, 1]] = 1.0;
        let mut coal_retire = Array2::zeros((2, 2));
        coal_retire[[0, 1]] = 1.0;
        let mut re_cap = Array3::zeros((1, 2, 2));
        re_cap[[0, 0, 1]] = 25.0;

        RetirementOutput {
            objective: 12345.67,
            breakdown: ObjectiveBreakdown {
                system_cost: 12000.0,
                health_cost: 345.67,
                jobs: 3.5,
            },
            years: vec![2025, 2026],
            coal_plants: vec![CoalPlantId::new("c1"), CoalPlantId::new("c2")],
            re_sites: vec![ReSiteId::new("wind_a")],
            cap_invest: re_cap.clone(),
            re_gen: Array3::zeros((1, 2, 2)),
            re_cap,
            re_invest: Array3::zeros((1, 2, 2)),
            re_online: Array3::zeros((1, 2, 2)),
            cap_retire: Array2::zeros((2, 2)),
            coal_gen: Array2::zeros((2, 2)),
            coal_retire,
            coal_online,
        }
    }

    #[test]
    fn test_to_json_value() {
        let output = create_test_output();
        let json = output.to_json_value().unwrap();
        assert!(json.is_object());
        assert_eq!(json["objective"], 12345.67);
        assert_eq!(json["coal_plants"][1], "c2");
        assert!(json.get("re_cap").is_some());
    }

    #[test]
    fn test_to_json_file_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("output.json");
        let output = create_test_output();
        output.to_json(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: RetirementOutput = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, output);
    }

    #[test]
    fn test_to_csv_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("scenario");
        create_test_output().to_csv(&dir).unwrap();

        let coal = std::fs::read_to_string(dir.join(COAL_RESULTS_FILE)).unwrap();
        let lines: Vec<&str> = coal.lines().collect();
        assert_eq!(
            lines[0],
            "plant_id,year,coal_online,coal_retire,coal_gen,cap_retire"
        );
        assert_eq!(lines.len(), 1 + 2 * 2);
        assert!(lines[2].starts_with("c1,2026,0.0,1.0"));

        let re = std::fs::read_to_string(dir.join(RE_RESULTS_FILE)).unwrap();
        let lines: Vec<&str> = re.lines().collect();
        assert_eq!(
            lines[0],
            "site_id,plant_id,year,re_online,re_invest,re_cap,cap_invest,re_gen"
        );
        assert_eq!(lines.len(), 1 + 2 * 2);
        assert!(lines[2].starts_with("wind_a,c1,2026,0.0,0.0,25.0,25.0"));
    }
}
