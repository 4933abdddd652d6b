use std::path::{Path, PathBuf};

use clap::Parser;
use lane_departure_rs::checker::LaneDepartureChecker;
use lane_departure_rs::config::{load_config, CheckerConfig};
use lane_departure_rs::diagnostics::{
    lane_departure_status, trajectory_deviation_status, DiagnosticLevel, DiagnosticStatus,
};
use lane_departure_rs::scenario::{load_scenario, output_to_json};
use serde_json::{json, Value};

#[derive(Parser, Debug)]
struct Args {
    /// Path to a scenario .json[.gz]
    #[arg(long, conflicts_with = "scenario_dir")]
    scenario: Option<PathBuf>,

    /// Directory of scenarios to batch check (processes *.json[.gz])
    #[arg(long)]
    scenario_dir: Option<PathBuf>,

    /// Checker config; overrides any config embedded in the scenario
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON result
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn log_status(name: &str, status: &DiagnosticStatus) {
    match status.level {
        DiagnosticLevel::Ok => log::info!("[{}] {}", name, status.message),
        DiagnosticLevel::Warn => log::warn!("[{}] {}", name, status.message),
        DiagnosticLevel::Error => log::error!("[{}] {}", name, status.message),
    }
}

fn run_once(path: &Path, config_override: Option<&CheckerConfig>) -> anyhow::Result<Value> {
    let prepared = load_scenario(path)?.prepare();

    let config = match config_override {
        Some(config) => config.clone(),
        None => prepared.config.clone().unwrap_or_default(),
    };
    let checker = LaneDepartureChecker::from_config(config)?;

    let output = checker.update(&prepared.input())?;

    let lane_status = lane_departure_status(&output);
    let deviation_status = trajectory_deviation_status(&output.trajectory_deviation, checker.param());
    log_status("lane_departure", &lane_status);
    log_status("trajectory_deviation", &deviation_status);

    Ok(json!({
        "scenario": path.display().to_string(),
        "output": output_to_json(&output),
        "diagnostics": {
            "lane_departure": lane_status,
            "trajectory_deviation": deviation_status,
        },
    }))
}

fn is_scenario_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    path.is_file() && (name.ends_with(".json") || name.ends_with(".json.gz"))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config_override = match args.config.as_ref() {
        Some(path) => Some(load_config(path)?),
        None => None,
    };

    let mut results = Vec::new();
    if let Some(dir) = args.scenario_dir.as_ref() {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if is_scenario_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            match run_once(&path, config_override.as_ref()) {
                Ok(res) => results.push(res),
                Err(e) => log::error!("Failed {}: {}", path.display(), e),
            }
        }
    } else if let Some(scenario) = args.scenario.as_ref() {
        results.push(run_once(scenario, config_override.as_ref())?);
    } else {
        anyhow::bail!("Provide --scenario or --scenario-dir");
    }

    let document = if results.len() == 1 && args.scenario.is_some() {
        results.remove(0)
    } else {
        Value::Array(results)
    };

    if args.pretty {
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        println!("{}", serde_json::to_string(&document)?);
    }
    Ok(())
}
