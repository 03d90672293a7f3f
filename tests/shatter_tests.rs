//! Integration tests for frozen classification and shatter
//!
//! These tests verify that:
//! - Shatter only changes crit chance for frozen, shatter-eligible hits
//! - Deferred actions read the frozen state at impact
//! - The Ice Lance Fingers of Frost flag follows the `bugs` option
//! - Hits are credited to the right frozen source

use magesim::combat::{GameRng, SimTime, TargetId};
use magesim::mage::shatter::shatter_crit_chance;
use magesim::mage::{ActionKind, FrozenFlags, FrozenType, Mage, MageOptions, ShatterCounts, Simulation};

/// Options with no random procs and no crits outside of shatter
fn options(bugs: bool, shatter_crit_bonus: f64) -> MageOptions {
    MageOptions {
        bugs,
        base_crit: 0.0,
        shatter_crit_bonus,
        fingers_of_frost_chance: 0.0,
        brain_freeze_chance: 0.0,
        ..Default::default()
    }
}

fn create_sim(options: MageOptions) -> (Simulation, TargetId) {
    let mut sim = Simulation::new(Mage::new("Mage", options), GameRng::from_seed(99));
    let target = sim.add_target("Target 1", 1e12);
    (sim, target)
}

fn counts(sim: &Simulation, source: &str) -> ShatterCounts {
    sim.mage.shatter_sources.get(source).copied().unwrap_or_default()
}

fn damage_messages(sim: &Simulation, action: &str) -> Vec<String> {
    sim.log
        .entries
        .iter()
        .filter(|e| e.damage.as_ref().is_some_and(|d| d.action == action))
        .map(|e| e.message.clone())
        .collect()
}

// =============================================================================
// Crit chance and classification
// =============================================================================

#[test]
fn test_shatter_needs_frozen_and_eligible() {
    let opts = MageOptions::default();

    assert_eq!(shatter_crit_chance(0.2, FrozenFlags::empty(), true, &opts), 0.2);
    assert_eq!(shatter_crit_chance(0.2, FrozenFlags::ROOT, false, &opts), 0.2);

    let shattered = shatter_crit_chance(0.2, FrozenFlags::ROOT, true, &opts);
    assert!((shattered - 0.8).abs() < 1e-9, "expected 0.2 * 1.5 + 0.5, got {}", shattered);
}

#[test]
fn test_shatter_adds_rank2_bonus() {
    let opts = MageOptions {
        shatter_rank2_crit_bonus: 0.1,
        ..Default::default()
    };
    let shattered = shatter_crit_chance(0.0, FrozenFlags::WINTERS_CHILL, true, &opts);
    assert!((shattered - 0.6).abs() < 1e-9);
}

#[test]
fn test_classification_priority() {
    let all = FrozenFlags::WINTERS_CHILL | FrozenFlags::FINGERS_OF_FROST | FrozenFlags::ROOT;
    assert_eq!(FrozenType::classify(all), FrozenType::WintersChill);
    assert_eq!(
        FrozenType::classify(FrozenFlags::FINGERS_OF_FROST | FrozenFlags::ROOT),
        FrozenType::Root
    );
    assert_eq!(FrozenType::classify(FrozenFlags::FINGERS_OF_FROST), FrozenType::FingersOfFrost);
    assert_eq!(FrozenType::classify(FrozenFlags::empty()), FrozenType::None);
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_frost_nova_root_shatters_frostbolt() {
    let (mut sim, target) = create_sim(options(true, 1.0));

    sim.execute(ActionKind::FrostNova, target).unwrap();
    assert_eq!(damage_messages(&sim, "Frost Nova"), vec!["Frost Nova hits Target 1 for 80"]);
    assert!(sim.targets.get(target).unwrap().is_rooted(sim.now()));

    sim.execute(ActionKind::Frostbolt, target).unwrap();
    sim.run_until(SimTime::from_millis(800)).unwrap();

    assert_eq!(
        damage_messages(&sim, "Frostbolt"),
        vec!["Frostbolt hits Target 1 for 2000 (crit)"]
    );
    assert_eq!(counts(&sim, "Frostbolt").root, 1);
}

#[test]
fn test_frostbolt_reads_frozen_state_at_impact() {
    let (mut sim, target) = create_sim(options(true, 1.0));

    // Root lands while the bolt is in the air
    sim.execute(ActionKind::Frostbolt, target).unwrap();
    sim.run_until(SimTime::from_millis(400)).unwrap();
    sim.apply_root(target).unwrap();
    sim.run_until(SimTime::from_millis(800)).unwrap();

    assert_eq!(counts(&sim, "Frostbolt").root, 1);
    assert_eq!(counts(&sim, "Frostbolt").none, 0);
}

#[test]
fn test_ice_lance_with_bugs_reads_latest_execute() {
    let (mut sim, target) = create_sim(options(true, 0.0));

    sim.mage.buffs.fingers_of_frost = 1;
    sim.execute(ActionKind::IceLance, target).unwrap();
    sim.execute(ActionKind::IceLance, target).unwrap();
    sim.run_until(SimTime::from_millis(1000)).unwrap();

    let lance = counts(&sim, "Ice Lance");
    assert_eq!(lance.none, 2, "the second execute cleared the flag for both lances");
    assert_eq!(lance.fingers_of_frost, 0);
    assert_eq!(
        damage_messages(&sim, "Ice Lance"),
        vec!["Ice Lance hits Target 1 for 600", "Ice Lance hits Target 1 for 600"]
    );
}

#[test]
fn test_ice_lance_with_bugs_shares_late_proc() {
    let (mut sim, target) = create_sim(options(true, 0.0));

    sim.execute(ActionKind::IceLance, target).unwrap();
    sim.mage.buffs.fingers_of_frost = 1;
    sim.execute(ActionKind::IceLance, target).unwrap();
    sim.run_until(SimTime::from_millis(1000)).unwrap();

    assert_eq!(counts(&sim, "Ice Lance").fingers_of_frost, 2);
    assert_eq!(sim.log.damage_by_action().get("Ice Lance"), Some(&3600.0));
}

#[test]
fn test_ice_lance_without_bugs_keeps_own_snapshot() {
    let (mut sim, target) = create_sim(options(false, 0.0));

    sim.mage.buffs.fingers_of_frost = 1;
    sim.execute(ActionKind::IceLance, target).unwrap();
    sim.execute(ActionKind::IceLance, target).unwrap();
    sim.run_until(SimTime::from_millis(1000)).unwrap();

    let lance = counts(&sim, "Ice Lance");
    assert_eq!(lance.fingers_of_frost, 1);
    assert_eq!(lance.none, 1);
    assert_eq!(
        damage_messages(&sim, "Ice Lance"),
        vec!["Ice Lance hits Target 1 for 1800", "Ice Lance hits Target 1 for 600"]
    );
    assert_eq!(sim.mage.buffs.fingers_of_frost, 0);
}

#[test]
fn test_fingers_of_frost_on_rooted_target_is_wasted() {
    let (mut sim, target) = create_sim(options(false, 0.0));
    sim.apply_root(target).unwrap();

    sim.mage.buffs.fingers_of_frost = 1;
    sim.execute(ActionKind::IceLance, target).unwrap();
    sim.run_until(SimTime::from_millis(1000)).unwrap();

    assert_eq!(sim.mage.procs.fingers_of_frost_wasted, 1);
    assert_eq!(counts(&sim, "Ice Lance").root, 1);
}

#[test]
fn test_brain_freeze_flurry_sets_up_winters_chill() {
    let (mut sim, target) = create_sim(options(true, 0.0));
    sim.mage.buffs.brain_freeze = true;

    assert_eq!(sim.execute_time(ActionKind::Flurry), SimTime::ZERO);
    sim.execute(ActionKind::Flurry, target).unwrap();
    assert!(sim.mage.state.brain_freeze_active);
    assert_eq!(sim.mage.procs.brain_freeze_used, 1);

    sim.run_until(SimTime::from_millis(500)).unwrap();
    assert!(sim.targets.get(target).unwrap().has_winters_chill(sim.now()));

    sim.execute(ActionKind::IceLance, target).unwrap();
    sim.run_until(SimTime::from_millis(1500)).unwrap();

    assert_eq!(counts(&sim, "Ice Lance").winters_chill, 1);
    assert_eq!(sim.log.hits_by_action().get("Flurry Bolt"), Some(&3));
    assert_eq!(sim.log.damage_by_action().get("Flurry Bolt"), Some(&1350.0));
}

#[test]
fn test_flurry_without_brain_freeze_applies_no_chill() {
    let (mut sim, target) = create_sim(options(true, 0.0));

    sim.execute(ActionKind::Flurry, target).unwrap();
    sim.run_until(SimTime::from_millis(1500)).unwrap();

    assert!(!sim.mage.state.brain_freeze_active);
    assert!(!sim.targets.get(target).unwrap().has_winters_chill(sim.now()));
    assert_eq!(sim.log.damage_by_action().get("Flurry Bolt"), Some(&900.0));
}
