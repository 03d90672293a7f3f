//! Mage Constants
//!
//! Default values for the mechanics. Every one of these can be overridden
//! through `MageOptions`; these are the values used when an options file
//! leaves a field out.

// ============================================================================
// Icicles
// ============================================================================

/// Maximum number of stored icicles. Gaining one more fires the oldest.
pub const ICICLE_CAPACITY: usize = 5;

/// Lifetime of a stored icicle in seconds.
pub const ICICLE_DURATION: f64 = 60.0;

/// Delay before the first icicle of a chain is fired.
pub const ICICLE_FIRST_DELAY: f64 = 0.25;

/// Base interval between chained icicles, multiplied by spell speed.
pub const ICICLE_CADENCE: f64 = 0.4;

// ============================================================================
// Ignite
// ============================================================================

/// Interval between ignite spread passes.
pub const IGNITE_SPREAD_PERIOD: f64 = 2.0;

/// Interval between ignite damage ticks.
pub const IGNITE_TICK: f64 = 1.0;

/// Duration a fresh ignite deposit is spread over.
pub const IGNITE_DURATION: f64 = 9.0;

/// Fraction of fire damage banked into ignite.
pub const IGNITE_MASTERY: f64 = 0.75;

// ============================================================================
// Shatter
// ============================================================================

/// Crit chance multiplier against frozen targets.
pub const SHATTER_CRIT_FACTOR: f64 = 1.5;

/// Additive crit chance against frozen targets.
pub const SHATTER_CRIT_BONUS: f64 = 0.50;

/// Additive crit chance from the second Shatter rank.
pub const SHATTER_RANK2_CRIT_BONUS: f64 = 0.0;

/// Ice Lance damage multiplier against frozen targets.
pub const ICE_LANCE_FROZEN_MULTIPLIER: f64 = 3.0;

// ============================================================================
// Procs & debuffs
// ============================================================================

pub const FINGERS_OF_FROST_CHANCE: f64 = 0.15;
pub const FINGERS_OF_FROST_MAX_STACK: u32 = 2;
pub const BRAIN_FREEZE_CHANCE: f64 = 0.15;

/// Lifetime of the proc buffs in seconds. A new proc restarts the timer.
pub const FINGERS_OF_FROST_DURATION: f64 = 15.0;
pub const BRAIN_FREEZE_DURATION: f64 = 15.0;

/// Flurry bolt damage bonus while Brain Freeze was consumed by the Flurry.
pub const BRAIN_FREEZE_FLURRY_BONUS: f64 = 0.50;

/// Bolts launched by one Flurry impact.
pub const FLURRY_BOLTS: u32 = 3;

/// Base interval between Flurry bolts, multiplied by spell speed.
pub const FLURRY_BOLT_CADENCE: f64 = 0.4;
pub const WINTERS_CHILL_DURATION: f64 = 1.0;
pub const ROOT_DURATION: f64 = 8.0;

// ============================================================================
// Casting
// ============================================================================

/// Global cooldown in seconds before haste.
pub const GCD: f64 = 1.5;

/// Floor for the hasted global cooldown.
pub const MIN_GCD: f64 = 0.75;

pub const BASE_CRIT: f64 = 0.20;
pub const CRIT_MULTIPLIER: f64 = 2.0;
