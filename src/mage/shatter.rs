//! Frozen/Shatter Classifier
//!
//! Decides why (if at all) a hit counts as landing on a frozen target, and
//! derives the shatter crit bonus from that.
//!
//! Frozen sources, each an independent bit:
//! - `WINTERS_CHILL`: timed chill debuff from a Brain Freeze Flurry
//! - `FINGERS_OF_FROST`: one-shot consumable proc held by the mage
//! - `ROOT`: timed root (Frost Nova, Glacial Spike)
//!
//! The bits are computed once per resolution, at execute or (for actions that
//! defer their snapshot) at impact, and never change afterwards.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::combat::{SimTime, Target};

use super::constants::SHATTER_CRIT_FACTOR;
use super::options::MageOptions;

bitflags! {
    /// Why a resolution is considered frozen
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FrozenFlags: u32 {
        const WINTERS_CHILL    = 1 << 0;
        const FINGERS_OF_FROST = 1 << 1;
        const ROOT             = 1 << 2;
    }
}

/// Frozen bits contributed by the target's debuffs at `now`.
pub fn target_frozen(target: &Target, now: SimTime) -> FrozenFlags {
    let mut flags = FrozenFlags::empty();

    if target.has_winters_chill(now) {
        flags |= FrozenFlags::WINTERS_CHILL;
    }
    if target.is_rooted(now) {
        flags |= FrozenFlags::ROOT;
    }

    flags
}

/// Shattered crit chance.
///
/// Only frozen resolutions of shatter-eligible actions are affected: the crit
/// chance is multiplied by 1.5 and both shatter bonuses are added.
pub fn shatter_crit_chance(
    crit: f64,
    frozen: FrozenFlags,
    shatter_eligible: bool,
    options: &MageOptions,
) -> f64 {
    if frozen.is_empty() || !shatter_eligible {
        return crit;
    }

    crit * SHATTER_CRIT_FACTOR + options.shatter_crit_bonus + options.shatter_rank2_crit_bonus
}

/// Which frozen source gets credit for a hit, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FrozenType {
    WintersChill,
    FingersOfFrost,
    Root,
    None,
}

impl FrozenType {
    /// Credit Winter's Chill first, then any non-proc source, then the proc.
    pub fn classify(frozen: FrozenFlags) -> Self {
        if frozen.contains(FrozenFlags::WINTERS_CHILL) {
            FrozenType::WintersChill
        } else if !frozen.difference(FrozenFlags::FINGERS_OF_FROST).is_empty() {
            FrozenType::Root
        } else if frozen.contains(FrozenFlags::FINGERS_OF_FROST) {
            FrozenType::FingersOfFrost
        } else {
            FrozenType::None
        }
    }
}

/// Per-source counts of how a tracked action's hits were frozen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShatterCounts {
    pub winters_chill: u64,
    pub fingers_of_frost: u64,
    pub root: u64,
    pub none: u64,
}

impl ShatterCounts {
    fn occur(&mut self, kind: FrozenType) {
        let slot = match kind {
            FrozenType::WintersChill => &mut self.winters_chill,
            FrozenType::FingersOfFrost => &mut self.fingers_of_frost,
            FrozenType::Root => &mut self.root,
            FrozenType::None => &mut self.none,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u64 {
        self.winters_chill + self.fingers_of_frost + self.root + self.none
    }
}

/// Shatter source table keyed by source name ("Ice Lance", "Frostbolt", ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShatterSources {
    pub sources: BTreeMap<String, ShatterCounts>,
}

impl ShatterSources {
    pub fn record(&mut self, source: &str, frozen: FrozenFlags) {
        self.sources
            .entry(source.to_string())
            .or_default()
            .occur(FrozenType::classify(frozen));
    }

    pub fn get(&self, source: &str) -> Option<&ShatterCounts> {
        self.sources.get(source)
    }

    /// Fold another run's counts into this table.
    pub fn merge(&mut self, other: &ShatterSources) {
        for (name, counts) in &other.sources {
            let entry = self.sources.entry(name.clone()).or_default();
            entry.winters_chill += counts.winters_chill;
            entry.fingers_of_frost += counts.fingers_of_frost;
            entry.root += counts.root;
            entry.none += counts.none;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::TargetId;

    #[test]
    fn test_root_only_sets_one_bit() {
        let mut target = Target::new(TargetId(0), "Dummy", 1.0);
        target.frozen_until = SimTime::from_millis(5000);

        let flags = target_frozen(&target, SimTime::ZERO);
        assert_eq!(flags, FrozenFlags::ROOT);
        assert_eq!(flags.bits().count_ones(), 1);
    }

    #[test]
    fn test_root_and_chill_set_two_bits() {
        let mut target = Target::new(TargetId(0), "Dummy", 1.0);
        target.frozen_until = SimTime::from_millis(5000);
        target.winters_chill_until = SimTime::from_millis(1000);

        let flags = target_frozen(&target, SimTime::ZERO);
        assert_eq!(flags.bits().count_ones(), 2);
        assert!(flags.contains(FrozenFlags::ROOT | FrozenFlags::WINTERS_CHILL));
    }

    #[test]
    fn test_crit_bonus_requires_frozen_and_eligible() {
        let options = MageOptions::default();
        let base = 0.2;

        assert_eq!(shatter_crit_chance(base, FrozenFlags::empty(), true, &options), base);
        assert_eq!(shatter_crit_chance(base, FrozenFlags::ROOT, false, &options), base);

        let shattered = shatter_crit_chance(base, FrozenFlags::ROOT, true, &options);
        let expected = base * 1.5 + options.shatter_crit_bonus + options.shatter_rank2_crit_bonus;
        assert!((shattered - expected).abs() < 1e-12);
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(
            FrozenType::classify(FrozenFlags::WINTERS_CHILL | FrozenFlags::ROOT),
            FrozenType::WintersChill
        );
        assert_eq!(
            FrozenType::classify(FrozenFlags::ROOT | FrozenFlags::FINGERS_OF_FROST),
            FrozenType::Root
        );
        assert_eq!(FrozenType::classify(FrozenFlags::FINGERS_OF_FROST), FrozenType::FingersOfFrost);
        assert_eq!(FrozenType::classify(FrozenFlags::empty()), FrozenType::None);
    }

    #[test]
    fn test_record_credits_each_frozen_type() {
        let mut sources = ShatterSources::default();
        sources.record("Frostbolt", FrozenFlags::WINTERS_CHILL);
        sources.record("Frostbolt", FrozenFlags::FINGERS_OF_FROST);
        sources.record("Frostbolt", FrozenFlags::ROOT);
        sources.record("Frostbolt", FrozenFlags::ROOT | FrozenFlags::FINGERS_OF_FROST);
        sources.record("Frostbolt", FrozenFlags::empty());

        let counts = sources.get("Frostbolt").copied().unwrap_or_default();
        assert_eq!(
            counts,
            ShatterCounts {
                winters_chill: 1,
                fingers_of_frost: 1,
                root: 2,
                none: 1,
            }
        );
    }

    #[test]
    fn test_shatter_sources_merge() {
        let mut a = ShatterSources::default();
        a.record("Ice Lance", FrozenFlags::FINGERS_OF_FROST);
        let mut b = ShatterSources::default();
        b.record("Ice Lance", FrozenFlags::empty());
        a.merge(&b);

        let counts = a.get("Ice Lance").copied().unwrap_or_default();
        assert_eq!(counts.fingers_of_frost, 1);
        assert_eq!(counts.none, 1);
        assert_eq!(counts.total(), 2);
    }
}
