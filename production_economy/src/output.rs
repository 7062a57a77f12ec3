//! Export of tax sweeps and optimal-tax summaries to CSV and JSON.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::params::ModelParams;
use crate::taxation::{SweepPoint, TaxOptimum};

/// Flat, serialisable view of a tax optimum
#[derive(Debug, Clone, Serialize)]
pub struct OptimumSummary {
    pub tau: f64,
    pub transfer: f64,
    pub welfare: f64,
    pub p1: f64,
    pub p2: f64,
    pub labor: f64,
    pub y1: f64,
    pub y2: f64,
    pub residual: f64,
    pub evaluations: usize,
    pub failed_trials: usize,
}

impl From<&TaxOptimum> for OptimumSummary {
    fn from(optimum: &TaxOptimum) -> Self {
        let outcome = &optimum.equilibrium.outcome;
        OptimumSummary {
            tau: optimum.tau,
            transfer: optimum.transfer,
            welfare: optimum.welfare,
            p1: outcome.p1,
            p2: outcome.p2,
            labor: outcome.consumer.labor,
            y1: outcome.firm1.output,
            y2: outcome.firm2.output,
            residual: optimum.equilibrium.residual,
            evaluations: optimum.evaluations,
            failed_trials: optimum.failed_trials,
        }
    }
}

/// Everything a sweep run produces
#[derive(Debug, Clone, Serialize)]
pub struct SweepOutput {
    pub name: String,
    pub model: ModelParams,
    pub points: Vec<SweepPoint>,
    pub optimum: Option<OptimumSummary>,
}

impl SweepOutput {
    /// Write the sweep as one CSV row per tax rate; failed solves leave empty cells
    pub fn write_sweep_csv<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record([
            "tau", "p1", "p2", "transfer", "labor", "l1", "l2", "y1", "y2", "c1", "c2", "welfare",
        ])?;

        for point in &self.points {
            let mut record = vec![point.tau.to_string()];
            match &point.outcome {
                Some(o) => record.extend(
                    [
                        o.p1,
                        o.p2,
                        o.transfer,
                        o.consumer.labor,
                        o.firm1.labor,
                        o.firm2.labor,
                        o.firm1.output,
                        o.firm2.output,
                        o.consumer.c1,
                        o.consumer.c2,
                    ]
                    .iter()
                    .map(|v| v.to_string()),
                ),
                None => record.extend(std::iter::repeat(String::new()).take(10)),
            }
            record.push(point.welfare.map(|w| w.to_string()).unwrap_or_default());
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn write_summary_json<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Write all outputs to a directory
    ///
    /// Creates:
    /// - tax_sweep.csv
    /// - summary.json
    pub fn write_all<P: AsRef<Path>>(&self, dir: P) -> Result<(), Box<dyn std::error::Error>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        self.write_sweep_csv(dir.join("tax_sweep.csv"))?;
        self.write_summary_json(dir.join("summary.json"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::default_solver;
    use crate::taxation::tax_sweep;

    #[test]
    fn writes_csv_and_json() {
        let params = ModelParams::default();
        let output = SweepOutput {
            name: "unit".to_string(),
            points: tax_sweep(&params, &[0.0, -0.5], &default_solver()),
            model: params,
            optimum: None,
        };

        let dir = std::env::temp_dir()
            .join(format!("production_economy_output_{}", std::process::id()));
        output.write_all(&dir).unwrap();

        let csv = fs::read_to_string(dir.join("tax_sweep.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("tau,p1,p2"));
        assert_eq!(lines[2], "-0.5,,,,,,,,,,,");

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("summary.json")).unwrap()).unwrap();
        assert_eq!(json["name"], "unit");
        assert_eq!(json["points"].as_array().unwrap().len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }
}
