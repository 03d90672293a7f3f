//! Mage combat state
//!
//! Per-actor mutable state read and written by the action layer. Owned by the
//! [`Mage`](super::Mage) and passed by reference into every resolution, so a
//! test can always start from a fresh copy.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::combat::TimerId;

/// Timed proc buffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuffKind {
    FingersOfFrost,
    BrainFreeze,
}

impl fmt::Display for BuffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuffKind::FingersOfFrost => write!(f, "Fingers of Frost"),
            BuffKind::BrainFreeze => write!(f, "Brain Freeze"),
        }
    }
}

/// Proc buffs held by the mage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buffs {
    /// Fingers of Frost stacks
    pub fingers_of_frost: u32,
    pub brain_freeze: bool,
    /// Expiry of the whole Fingers of Frost stack
    pub fingers_of_frost_timer: Option<TimerId>,
    pub brain_freeze_timer: Option<TimerId>,
}

impl Buffs {
    pub fn fingers_of_frost_up(&self) -> bool {
        self.fingers_of_frost > 0
    }

    /// Add one stack, capped at `max_stack`.
    pub fn gain_fingers_of_frost(&mut self, max_stack: u32) {
        self.fingers_of_frost = (self.fingers_of_frost + 1).min(max_stack);
    }

    /// Remove one stack. Returns whether a stack was there to remove.
    pub fn decrement_fingers_of_frost(&mut self) -> bool {
        if self.fingers_of_frost == 0 {
            return false;
        }
        self.fingers_of_frost -= 1;
        true
    }

    /// Consume Brain Freeze, returning whether it was up.
    pub fn consume_brain_freeze(&mut self) -> bool {
        std::mem::take(&mut self.brain_freeze)
    }

    /// Drop a buff entirely. Returns whether any of it was up.
    pub fn expire(&mut self, buff: BuffKind) -> bool {
        match buff {
            BuffKind::FingersOfFrost => {
                self.fingers_of_frost_timer = None;
                std::mem::take(&mut self.fingers_of_frost) > 0
            }
            BuffKind::BrainFreeze => {
                self.brain_freeze_timer = None;
                std::mem::take(&mut self.brain_freeze)
            }
        }
    }

    /// Mutable slot holding the expiry timer of `buff`.
    pub fn timer_mut(&mut self, buff: BuffKind) -> &mut Option<TimerId> {
        match buff {
            BuffKind::FingersOfFrost => &mut self.fingers_of_frost_timer,
            BuffKind::BrainFreeze => &mut self.brain_freeze_timer,
        }
    }
}

/// Flags latched by one action and read by a later resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatState {
    /// Set by every Ice Lance execute from whether Fingers of Frost was up.
    /// Read at Ice Lance impact when `bugs` is on.
    pub fingers_of_frost_active: bool,
    /// Set by every Flurry execute from whether Brain Freeze was up.
    pub brain_freeze_active: bool,
}

/// Proc counters for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procs {
    pub icicles_gained: u64,
    pub icicles_fired: u64,
    pub icicles_expired: u64,
    pub icicles_overflowed: u64,
    pub ignite_applied: u64,
    /// Spread passes run, whether or not anything spread
    pub ignite_spread_events: u64,
    pub ignite_new_spreads: u64,
    pub ignite_overwrites: u64,
    pub fingers_of_frost: u64,
    pub fingers_of_frost_wasted: u64,
    pub brain_freeze: u64,
    pub brain_freeze_used: u64,
}

impl Procs {
    /// Add another run's counters to these.
    pub fn merge(&mut self, other: &Procs) {
        self.icicles_gained += other.icicles_gained;
        self.icicles_fired += other.icicles_fired;
        self.icicles_expired += other.icicles_expired;
        self.icicles_overflowed += other.icicles_overflowed;
        self.ignite_applied += other.ignite_applied;
        self.ignite_spread_events += other.ignite_spread_events;
        self.ignite_new_spreads += other.ignite_new_spreads;
        self.ignite_overwrites += other.ignite_overwrites;
        self.fingers_of_frost += other.fingers_of_frost;
        self.fingers_of_frost_wasted += other.fingers_of_frost_wasted;
        self.brain_freeze += other.brain_freeze;
        self.brain_freeze_used += other.brain_freeze_used;
    }
}
