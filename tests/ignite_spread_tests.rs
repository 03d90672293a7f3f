//! Integration tests for ignite banking and the spread engine
//!
//! These tests verify that:
//! - A single target never spreads
//! - Destinations are unique per pass and always end up holding a larger bank
//! - Cloned ignites keep the source's tick schedule
//! - Sleeping targets are never picked
//! - Equal banks do not spread onto each other

use std::collections::HashSet;

use magesim::combat::{CombatLogEventType, GameRng, SimTime, TargetId};
use magesim::mage::{ActionKind, Mage, MageOptions, Simulation};

fn create_sim(targets: usize, seed: u64) -> (Simulation, Vec<TargetId>) {
    let options = MageOptions {
        base_crit: 0.0,
        ..Default::default()
    };
    let mut sim = Simulation::new(Mage::new("Mage", options), GameRng::from_seed(seed));
    let ids = (0..targets)
        .map(|i| sim.add_target(format!("Target {}", i + 1), 1e12))
        .collect();
    (sim, ids)
}

fn bank(sim: &Simulation, target: TargetId) -> f64 {
    sim.targets.get(target).unwrap().ignite.bank()
}

// =============================================================================
// Spread pass
// =============================================================================

#[test]
fn test_single_target_never_spreads() {
    let (mut sim, ids) = create_sim(1, 1);
    sim.deposit_ignite(ids[0], 900.0).unwrap();
    sim.arise();
    // The first pass lands within one period, then one every two seconds
    sim.run_until(SimTime::from_millis(9999)).unwrap();

    assert_eq!(sim.mage.procs.ignite_spread_events, 5, "every pass is counted");
    assert_eq!(sim.mage.procs.ignite_new_spreads, 0);
    assert_eq!(sim.mage.procs.ignite_overwrites, 0);
    assert!(sim.log.filter_by_type(CombatLogEventType::Spread).is_empty());
}

#[test]
fn test_destinations_unique_and_end_with_larger_bank() {
    for seed in 0..30 {
        let (mut sim, ids) = create_sim(4, seed);
        sim.deposit_ignite(ids[0], 900.0).unwrap();
        sim.deposit_ignite(ids[1], 300.0).unwrap();

        let plan = sim.ignite_spread().unwrap();
        assert_eq!(plan.len(), 2, "seed {}: both ignites should spread", seed);

        let mut destinations = HashSet::new();
        for op in &plan {
            assert!(
                destinations.insert(op.destination),
                "seed {}: {} picked twice",
                seed,
                op.destination
            );
            assert!(op.bank > op.replaced_bank, "seed {}: spread onto an equal or larger bank", seed);
            assert_eq!(bank(&sim, op.destination), op.bank, "seed {}: destination bank", seed);
        }
    }
}

#[test]
fn test_spread_counts_new_and_overwritten() {
    let (mut sim, ids) = create_sim(2, 3);
    sim.deposit_ignite(ids[0], 900.0).unwrap();
    sim.deposit_ignite(ids[1], 300.0).unwrap();

    let plan = sim.ignite_spread().unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].source, ids[0]);
    assert_eq!(plan[0].destination, ids[1]);
    assert!(plan[0].overwrite);

    assert_eq!(sim.mage.procs.ignite_overwrites, 1);
    assert_eq!(sim.mage.procs.ignite_new_spreads, 0);
    assert_eq!(
        sim.log.filter_by_type(CombatLogEventType::Spread)[0].message,
        "Ignite spreads from Target 1 to Target 2 (900 banked)"
    );
}

#[test]
fn test_spread_copies_next_tick_time() {
    let (mut sim, ids) = create_sim(2, 5);
    sim.deposit_ignite(ids[0], 900.0).unwrap();

    sim.run_until(SimTime::from_millis(500)).unwrap();
    sim.ignite_spread().unwrap();
    assert_eq!(bank(&sim, ids[1]), 900.0);

    sim.run_until(SimTime::from_millis(1000)).unwrap();

    let ticks: Vec<(i64, String)> = sim
        .log
        .filter_by_type(CombatLogEventType::Damage)
        .iter()
        .map(|e| (e.timestamp.as_millis(), e.message.clone()))
        .collect();
    assert_eq!(
        ticks,
        vec![
            (1000, "Ignite hits Target 1 for 100".to_string()),
            (1000, "Ignite hits Target 2 for 100".to_string()),
        ]
    );
    assert_eq!(sim.targets.get(ids[1]).unwrap().ignite.ticks_left, 8);
}

#[test]
fn test_sleeping_targets_are_never_destinations() {
    for seed in 0..20 {
        let (mut sim, ids) = create_sim(3, seed);
        sim.deal_damage(ActionKind::Frostbolt, ids[1], 1e13, false).unwrap();
        sim.deposit_ignite(ids[0], 900.0).unwrap();

        let plan = sim.ignite_spread().unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].destination, ids[2], "seed {}: spread onto a dead target", seed);
    }
}

#[test]
fn test_equal_banks_stop_spreading() {
    let (mut sim, ids) = create_sim(2, 11);
    sim.deposit_ignite(ids[0], 900.0).unwrap();
    sim.arise();

    // The first pass lands somewhere in the first spread period
    sim.run_until(SimTime::from_millis(1999)).unwrap();
    assert_eq!(sim.mage.procs.ignite_spread_events, 1);
    assert_eq!(sim.mage.procs.ignite_new_spreads, 1);

    // Both ignites now tick in lockstep, so their banks stay equal
    sim.run_until(SimTime::from_secs_f64(10.0)).unwrap();
    assert!(sim.mage.procs.ignite_spread_events > 1);
    assert_eq!(sim.mage.procs.ignite_new_spreads, 1);
    assert_eq!(sim.mage.procs.ignite_overwrites, 0);
}

// =============================================================================
// Banking and ticking
// =============================================================================

#[test]
fn test_deposit_adds_to_remaining_bank() {
    let (mut sim, ids) = create_sim(1, 1);
    sim.deposit_ignite(ids[0], 900.0).unwrap();
    sim.run_until(SimTime::from_millis(3000)).unwrap();

    sim.deposit_ignite(ids[0], 300.0).unwrap();

    let ignite = &sim.targets.get(ids[0]).unwrap().ignite;
    assert_eq!(ignite.tick_amount, 100.0);
    assert_eq!(ignite.ticks_left, 9);
    assert_eq!(sim.log.damage_by_action().get("Ignite"), Some(&300.0));
    assert_eq!(sim.mage.procs.ignite_applied, 1, "a refresh is not a new ignite");
}

#[test]
fn test_ignite_pays_out_its_whole_bank() {
    let (mut sim, ids) = create_sim(1, 1);
    sim.deposit_ignite(ids[0], 900.0).unwrap();
    sim.run_until(SimTime::from_secs_f64(20.0)).unwrap();

    assert_eq!(sim.log.hits_by_action().get("Ignite"), Some(&9));
    assert_eq!(sim.log.damage_by_action().get("Ignite"), Some(&900.0));
    assert!(!sim.targets.get(ids[0]).unwrap().ignite.is_ticking());
    assert_eq!(sim.sched.pending_count(), 0);
}

#[test]
fn test_fireball_banks_mastery_share() {
    let (mut sim, ids) = create_sim(1, 1);
    sim.execute(ActionKind::Fireball, ids[0]).unwrap();
    assert!(!sim.targets.get(ids[0]).unwrap().ignite.is_ticking());

    sim.run_until(SimTime::from_millis(800)).unwrap();

    assert_eq!(sim.log.damage_by_action().get("Fireball"), Some(&1200.0));
    assert_eq!(bank(&sim, ids[0]), 900.0);
    assert_eq!(sim.mage.procs.ignite_applied, 1);
}
