//! Headless mode for batch simulation
//!
//! Runs mage scenarios without any interactive output, suitable for automated
//! testing and theorycrafting sweeps.
//!
//! ## Usage
//!
//! ```bash
//! # Run a scenario and write the report
//! cargo run --release -- --scenario scenario.json --output report.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "name": "Cleave",
//!   "targets": 3,
//!   "max_duration_secs": 180,
//!   "iterations": 100,
//!   "random_seed": 42,
//!   "rotation": "Fire",
//!   "burn_phase": { "start_secs": 0, "end_secs": 40 }
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::{BurnWindow, Rotation, ScenarioConfig};
pub use runner::{run_iteration, run_scenario, simulate_iteration, IterationResult, SimReport};
