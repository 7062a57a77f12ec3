//! Batch Tax Sweep Runner
//!
//! Solves the production economy over a range of tax rates described in a
//! TOML file, optionally searches for the optimal rate, and writes the
//! results as CSV and JSON.
//!
//! Usage:
//!   cargo run --release --bin run_tax_sweep -- experiments/co2_tax.toml

use production_economy::output::{OptimumSummary, SweepOutput};
use production_economy::{default_solver, default_tax_grid, optimal_tax, tax_sweep, ModelParams};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// Top-level experiment configuration
#[derive(Debug, Clone, Deserialize)]
struct ExperimentConfig {
    experiment: ExperimentMetadata,
    #[serde(default)]
    model: ModelParams,
    #[serde(default)]
    sweep: SweepConfig,
    #[serde(default)]
    output: OutputSettings,
}

#[derive(Debug, Clone, Deserialize)]
struct ExperimentMetadata {
    name: String,
    description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SweepConfig {
    /// Tax rates to solve at; the default grid when absent
    values: Option<Vec<f64>>,
    /// Also search for the welfare-maximising rate
    optimize: Option<bool>,
    /// Search interval for the optimal rate
    bounds: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OutputSettings {
    directory: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <experiment_config.toml>", args[0]);
        eprintln!("Example: {} experiments/co2_tax.toml", args[0]);
        std::process::exit(1);
    }

    let config_path = &args[1];
    println!("=== Production Economy Tax Sweep ===\n");
    println!("Loading experiment config: {}\n", config_path);

    let config_str = fs::read_to_string(config_path)?;
    let config: ExperimentConfig = toml::from_str(&config_str)?;
    config.model.validate()?;

    println!("Experiment: {}", config.experiment.name);
    if let Some(description) = &config.experiment.description {
        println!("Description: {}", description);
    }

    let taxes = config.sweep.values.clone().unwrap_or_else(default_tax_grid);
    let solver = default_solver();
    let start = Instant::now();

    println!("Solving {} tax rates...", taxes.len());
    let points = tax_sweep(&config.model, &taxes, &solver);
    let failed = points.iter().filter(|p| p.outcome.is_none()).count();
    println!(
        "  done in {:.2}s ({} failed)",
        start.elapsed().as_secs_f64(),
        failed
    );

    let optimum = if config.sweep.optimize.unwrap_or(true) {
        let [low, high] = config.sweep.bounds.unwrap_or([0.0, 1.0]);
        println!("Searching for the optimal tax on [{}, {}]...", low, high);
        let optimum = optimal_tax(&config.model, low, high, &solver)?;
        println!(
            "  tau* = {:.4}, T* = {:.4}, SWF* = {:.6}",
            optimum.tau, optimum.transfer, optimum.welfare
        );
        Some(OptimumSummary::from(&optimum))
    } else {
        None
    };

    let output = SweepOutput {
        name: config.experiment.name.clone(),
        model: config.model.clone(),
        points,
        optimum,
    };

    let output_dir = PathBuf::from(config.output.directory.as_deref().unwrap_or("results"))
        .join(&config.experiment.name);
    output.write_all(&output_dir)?;
    println!("\nResults written to {}", output_dir.display());

    Ok(())
}
