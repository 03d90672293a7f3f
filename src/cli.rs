//! Command-line interface for MageSim

use clap::Parser;
use std::path::PathBuf;

/// Discrete-event mage combat simulator
#[derive(Parser, Debug)]
#[command(name = "magesim")]
#[command(about = "Discrete-event mage combat simulator")]
#[command(version)]
pub struct Args {
    /// JSON scenario file (defaults apply when omitted)
    #[arg(long, value_name = "SCENARIO_FILE")]
    pub scenario: Option<PathBuf>,

    /// Output path for the JSON report (overrides the scenario's output_path)
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Number of iterations (overrides the scenario)
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Random seed (overrides the scenario)
    #[arg(long)]
    pub seed: Option<u64>,

    /// RON mage options file (overrides the scenario)
    #[arg(long, value_name = "OPTIONS_FILE")]
    pub options: Option<PathBuf>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
