//! MageSim - discrete-event mage combat simulator
//!
//! Loads a scenario, runs it headless and prints (or saves) the JSON report.

use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::filter::EnvFilter;

use magesim::cli::{parse_args, Args};
use magesim::headless::{run_scenario, ScenarioConfig};
use magesim::SimError;

/// Initialize logging to stderr, `info` unless `RUST_LOG` says otherwise.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<ScenarioConfig, SimError> {
    let mut config = match &args.scenario {
        Some(path) => ScenarioConfig::load_from_file(path).map_err(SimError::Config)?,
        None => ScenarioConfig::default(),
    };

    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(seed) = args.seed {
        config.random_seed = Some(seed);
    }
    if let Some(options) = &args.options {
        config.options_path = Some(options.display().to_string());
    }
    if let Some(output) = &args.output {
        config.output_path = Some(output.display().to_string());
    }

    config.validate().map_err(SimError::Config)?;
    Ok(config)
}

fn run(args: &Args) -> Result<(), SimError> {
    let config = load_config(args)?;
    let report = run_scenario(&config)?;

    match &config.output_path {
        Some(path) => {
            report.save_to_file(Path::new(path))?;
            println!("Simulation complete. Report saved to: {}", path);
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    let args = parse_args();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Simulation failed");
            ExitCode::FAILURE
        }
    }
}
