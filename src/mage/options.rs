//! Data-Driven Mage Options
//!
//! Tunable values for the mage mechanics, loadable from a RON file so balance
//! changes don't require recompilation. Every field falls back to the value
//! in [`constants`](super::constants) when omitted.
//!
//! ## Example
//! ```ron
//! (
//!     bugs: false,
//!     spell_haste: 0.25,
//!     glacial_spike: true,
//! )
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::combat::SimTime;

use super::constants::*;

/// Complete option set for one mage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MageOptions {
    /// Reproduce known in-game quirks (Ice Lance Fingers of Frost flag race)
    pub bugs: bool,
    /// Haste as a fraction (0.25 = 25%). Spell speed is `1 / (1 + haste)`.
    pub spell_haste: f64,
    /// Base crit chance before shatter
    pub base_crit: f64,
    /// Damage multiplier on a critical strike
    pub crit_multiplier: f64,
    /// Glacial Spike talent: Ice Lance no longer launches stored icicles
    pub glacial_spike: bool,

    // === Icicles ===
    pub icicle_capacity: usize,
    pub icicle_duration: f64,
    pub icicle_first_delay: f64,
    pub icicle_cadence: f64,

    // === Ignite ===
    pub ignite_period: f64,
    pub ignite_tick: f64,
    pub ignite_duration: f64,
    pub ignite_mastery: f64,

    // === Shatter ===
    pub shatter_crit_bonus: f64,
    pub shatter_rank2_crit_bonus: f64,

    // === Procs & debuffs ===
    pub fingers_of_frost_chance: f64,
    pub fingers_of_frost_max_stack: u32,
    pub brain_freeze_chance: f64,
    pub fingers_of_frost_duration: f64,
    pub brain_freeze_duration: f64,
    pub winters_chill_duration: f64,
    pub root_duration: f64,
}

impl Default for MageOptions {
    fn default() -> Self {
        Self {
            bugs: true,
            spell_haste: 0.0,
            base_crit: BASE_CRIT,
            crit_multiplier: CRIT_MULTIPLIER,
            glacial_spike: false,
            icicle_capacity: ICICLE_CAPACITY,
            icicle_duration: ICICLE_DURATION,
            icicle_first_delay: ICICLE_FIRST_DELAY,
            icicle_cadence: ICICLE_CADENCE,
            ignite_period: IGNITE_SPREAD_PERIOD,
            ignite_tick: IGNITE_TICK,
            ignite_duration: IGNITE_DURATION,
            ignite_mastery: IGNITE_MASTERY,
            shatter_crit_bonus: SHATTER_CRIT_BONUS,
            shatter_rank2_crit_bonus: SHATTER_RANK2_CRIT_BONUS,
            fingers_of_frost_chance: FINGERS_OF_FROST_CHANCE,
            fingers_of_frost_max_stack: FINGERS_OF_FROST_MAX_STACK,
            brain_freeze_chance: BRAIN_FREEZE_CHANCE,
            fingers_of_frost_duration: FINGERS_OF_FROST_DURATION,
            brain_freeze_duration: BRAIN_FREEZE_DURATION,
            winters_chill_duration: WINTERS_CHILL_DURATION,
            root_duration: ROOT_DURATION,
        }
    }
}

impl MageOptions {
    /// Load options from a RON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

        let options = Self::from_ron(&contents)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

        info!("Loaded mage options from {}", path.display());
        Ok(options)
    }

    /// Parse and validate options from a RON string
    pub fn from_ron(contents: &str) -> Result<Self, String> {
        let options: MageOptions = ron::from_str(contents).map_err(|e| e.to_string())?;
        options.validate()?;
        Ok(options)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), String> {
        if self.icicle_capacity == 0 {
            return Err("icicle_capacity must be at least 1".to_string());
        }
        if self.spell_haste <= -1.0 {
            return Err("spell_haste must be greater than -1.0".to_string());
        }
        if self.ignite_period <= 0.0 || self.ignite_tick <= 0.0 || self.ignite_duration <= 0.0 {
            return Err("ignite period, tick and duration must be positive".to_string());
        }
        if self.icicle_cadence <= 0.0 {
            return Err("icicle_cadence must be positive".to_string());
        }
        if self.fingers_of_frost_duration <= 0.0 || self.brain_freeze_duration <= 0.0 {
            return Err("proc buff durations must be positive".to_string());
        }
        if self.fingers_of_frost_max_stack == 0 {
            return Err("fingers_of_frost_max_stack must be at least 1".to_string());
        }
        Ok(())
    }

    /// Cast/cadence time multiplier. Shrinks as haste grows.
    pub fn spell_speed(&self) -> f64 {
        1.0 / (1.0 + self.spell_haste)
    }

    pub fn icicle_duration(&self) -> SimTime {
        SimTime::from_secs_f64(self.icicle_duration)
    }

    pub fn icicle_first_delay(&self) -> SimTime {
        SimTime::from_secs_f64(self.icicle_first_delay)
    }

    /// Haste-scaled interval between chained icicles
    pub fn icicle_cadence(&self) -> SimTime {
        SimTime::from_secs_f64(self.icicle_cadence * self.spell_speed())
    }

    pub fn ignite_period(&self) -> SimTime {
        SimTime::from_secs_f64(self.ignite_period)
    }

    pub fn ignite_tick(&self) -> SimTime {
        SimTime::from_secs_f64(self.ignite_tick)
    }

    /// Number of ticks a fresh ignite deposit is spread over
    pub fn ignite_ticks(&self) -> u32 {
        ((self.ignite_duration / self.ignite_tick).round() as u32).max(1)
    }

    /// Hasted global cooldown
    pub fn gcd(&self) -> SimTime {
        SimTime::from_secs_f64((GCD * self.spell_speed()).max(MIN_GCD))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_uses_defaults() {
        let options = MageOptions::from_ron("(bugs: false, spell_haste: 0.25)").unwrap();
        assert!(!options.bugs);
        assert_eq!(options.icicle_capacity, ICICLE_CAPACITY);
        assert_eq!(options.spell_speed(), 0.8);
    }

    #[test]
    fn test_cadence_scales_with_haste() {
        let options = MageOptions {
            spell_haste: 0.25,
            ..Default::default()
        };
        assert_eq!(options.icicle_cadence().as_millis(), 320);
        assert_eq!(MageOptions::default().icicle_cadence().as_millis(), 400);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = MageOptions::from_ron("(icicle_capacity: 0)").unwrap_err();
        assert!(err.contains("icicle_capacity"));
    }

    #[test]
    fn test_ignite_ticks() {
        assert_eq!(MageOptions::default().ignite_ticks(), 9);
    }
}
