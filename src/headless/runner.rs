//! Headless scenario execution
//!
//! Runs a scenario for a number of iterations, each one a fresh world driven
//! by a fixed-priority rotation, and aggregates the results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::combat::{GameRng, SimTime, TargetId};
use crate::error::SimError;
use crate::mage::{ActionKind, Mage, MageOptions, Procs, ShatterSources, Simulation};

use super::config::{Rotation, ScenarioConfig};

/// Result of a single iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationResult {
    pub iteration: u32,
    /// Seed used for this iteration (if deterministic mode)
    pub seed: Option<u64>,
    /// Fight length in seconds
    pub duration_secs: f64,
    pub damage: f64,
    pub dps: f64,
    pub damage_by_action: BTreeMap<String, f64>,
    pub targets_killed: usize,
    pub procs: Procs,
    pub shatter_sources: ShatterSources,
    /// Fraction of the fight spent in the burn phase
    pub burn_uptime: f64,
    /// Lengths of completed burn phases in seconds
    pub burn_durations: Vec<f64>,
}

/// Aggregated result of a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimReport {
    pub scenario: String,
    pub iterations: u32,
    pub mean_dps: f64,
    pub min_dps: f64,
    pub max_dps: f64,
    /// Proc counters summed over all iterations
    pub procs: Procs,
    /// Shatter sources summed over all iterations
    pub shatter_sources: ShatterSources,
    pub results: Vec<IterationResult>,
}

impl SimReport {
    pub fn from_iterations(scenario: &str, results: Vec<IterationResult>) -> Self {
        let count = results.len().max(1) as f64;
        let mean_dps = results.iter().map(|r| r.dps).sum::<f64>() / count;
        let min_dps = results.iter().map(|r| r.dps).fold(f64::INFINITY, f64::min);
        let max_dps = results.iter().map(|r| r.dps).fold(f64::NEG_INFINITY, f64::max);

        let mut procs = Procs::default();
        let mut shatter_sources = ShatterSources::default();
        for result in &results {
            procs.merge(&result.procs);
            shatter_sources.merge(&result.shatter_sources);
        }

        Self {
            scenario: scenario.to_string(),
            iterations: results.len() as u32,
            mean_dps,
            min_dps: if min_dps.is_finite() { min_dps } else { 0.0 },
            max_dps: if max_dps.is_finite() { max_dps } else { 0.0 },
            procs,
            shatter_sources,
            results,
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn save_to_file(&self, path: &Path) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Rotation {
    /// Next action to cast at `target`
    pub fn next_action(self, sim: &Simulation, target: TargetId) -> ActionKind {
        match self {
            Rotation::Frost => {
                if sim.mage.buffs.brain_freeze {
                    ActionKind::Flurry
                } else if sim.ready(ActionKind::GlacialSpike, target) {
                    ActionKind::GlacialSpike
                } else if sim.mage.buffs.fingers_of_frost_up() {
                    ActionKind::IceLance
                } else {
                    ActionKind::Frostbolt
                }
            }
            Rotation::Fire => ActionKind::Fireball,
        }
    }
}

/// Run every iteration of a scenario
pub fn run_scenario(config: &ScenarioConfig) -> Result<SimReport, SimError> {
    config.validate().map_err(SimError::Config)?;
    let options = config.mage_options().map_err(SimError::Config)?;

    info!(
        "Running scenario '{}': {} target(s), {} iteration(s), {:.0}s",
        config.name, config.targets, config.iterations, config.max_duration_secs
    );

    let mut results = Vec::with_capacity(config.iterations as usize);
    for iteration in 0..config.iterations {
        let result = run_iteration(config, &options, iteration)?;
        debug!(
            "Iteration {}/{} - {:.0} dps over {:.1}s",
            iteration + 1,
            config.iterations,
            result.dps,
            result.duration_secs
        );
        results.push(result);
    }

    let report = SimReport::from_iterations(&config.name, results);
    info!(
        "Scenario '{}' complete: mean {:.0} dps (min {:.0}, max {:.0})",
        report.scenario, report.mean_dps, report.min_dps, report.max_dps
    );
    Ok(report)
}

/// Build and run one iteration's world up to the scenario's time limit.
///
/// Nothing scheduled past `max_duration_secs` is processed: casts that would
/// execute later are skipped and the world is finished at the limit.
pub fn simulate_iteration(
    config: &ScenarioConfig,
    options: &MageOptions,
    seed: Option<u64>,
) -> Result<Simulation, SimError> {
    let rotation = config.rotation().map_err(SimError::Config)?;
    let rng = match seed {
        Some(seed) => GameRng::from_seed(seed),
        None => GameRng::from_entropy(),
    };

    let mut sim = Simulation::new(Mage::new("Mage", options.clone()), rng);
    for i in 0..config.targets {
        sim.add_target(format!("Target {}", i + 1), config.target_health);
    }

    let end = SimTime::from_secs_f64(config.max_duration_secs);
    sim.arise();

    while sim.now() < end {
        let Some(target) = sim.targets.non_sleeping().next().map(|t| t.id) else {
            break;
        };

        if let Some(window) = &config.burn_phase {
            let burning = window.contains(sim.now().as_secs_f64());
            if burning && sim.ready(ActionKind::StartBurnPhase, target) {
                sim.cast_by(ActionKind::StartBurnPhase, target, end)?;
            } else if !burning && sim.ready(ActionKind::StopBurnPhase, target) {
                sim.cast_by(ActionKind::StopBurnPhase, target, end)?;
            }
        }

        let action = rotation.next_action(&sim, target);
        if sim.now() + sim.execute_time(action) > end {
            break;
        }
        if !sim.cast_by(action, target, end)? {
            let idle = (sim.now() + sim.mage.options.gcd()).min(end);
            sim.run_until(idle)?;
        }
    }

    // Ticks and travelling spells still land until the limit
    if sim.targets.non_sleeping().next().is_some() {
        sim.run_until(end)?;
    }
    sim.finish();
    Ok(sim)
}

/// Run one iteration with a fresh world
pub fn run_iteration(
    config: &ScenarioConfig,
    options: &MageOptions,
    iteration: u32,
) -> Result<IterationResult, SimError> {
    let seed = config.random_seed.map(|seed| seed.wrapping_add(iteration as u64));
    let sim = simulate_iteration(config, options, seed)?;

    let duration = sim.now().max(SimTime::from_millis(1));
    let damage = sim.total_damage();
    let damage_by_action = sim.log.damage_by_action().into_iter().collect();

    Ok(IterationResult {
        iteration,
        seed,
        duration_secs: duration.as_secs_f64(),
        damage,
        dps: damage / duration.as_secs_f64(),
        damage_by_action,
        targets_killed: sim.targets.iter().filter(|t| t.sleeping).count(),
        procs: sim.mage.procs,
        shatter_sources: sim.mage.shatter_sources.clone(),
        burn_uptime: sim.mage.burn_phase.burn_uptime.fraction(sim.now(), duration),
        burn_durations: sim.mage.burn_phase.duration_history.clone(),
    })
}
