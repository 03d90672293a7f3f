//! Target registry
//!
//! Holds every combatant the mage can act on, their health and the debuff
//! state the mage's mechanics query:
//! - Root ("Frozen") and Winter's Chill expiry times
//! - The residual ignite dot (at most one per target)
//!
//! Debuffs are stored as absolute expiry timestamps, so checking one never
//! needs a timer.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::scheduler::TimerId;
use super::time::SimTime;

/// Stable index of a target inside its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(pub usize);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Residual damage-over-time state ("ignite").
///
/// Bank = `tick_amount * ticks_left`. The dot is ticking while it holds a
/// pending tick timer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResidualDot {
    pub tick_amount: f64,
    pub ticks_left: u32,
    pub tick_timer: Option<TimerId>,
}

impl ResidualDot {
    pub fn is_ticking(&self) -> bool {
        self.tick_timer.is_some() && self.ticks_left > 0
    }

    /// Total damage still to be dealt. Zero when not ticking.
    pub fn bank(&self) -> f64 {
        if self.is_ticking() {
            self.tick_amount * self.ticks_left as f64
        } else {
            0.0
        }
    }
}

/// A single combat target.
#[derive(Debug, Clone)]
pub struct Target {
    pub id: TargetId,
    pub name: String,
    pub max_health: f64,
    pub health: f64,
    /// Enemies are the only valid ignite spread candidates
    pub enemy: bool,
    /// Dead or otherwise out of combat
    pub sleeping: bool,
    pub frozen_until: SimTime,
    pub winters_chill_until: SimTime,
    pub ignite: ResidualDot,
    pub damage_taken: f64,
}

impl Target {
    pub fn new(id: TargetId, name: impl Into<String>, max_health: f64) -> Self {
        Self {
            id,
            name: name.into(),
            max_health,
            health: max_health,
            enemy: true,
            sleeping: false,
            frozen_until: SimTime::NEVER,
            winters_chill_until: SimTime::NEVER,
            ignite: ResidualDot::default(),
            damage_taken: 0.0,
        }
    }

    /// Rooted by Frost Nova / Glacial Spike
    pub fn is_rooted(&self, now: SimTime) -> bool {
        now < self.frozen_until
    }

    pub fn has_winters_chill(&self, now: SimTime) -> bool {
        now < self.winters_chill_until
    }
}

/// Registry of all targets in a simulation run.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: Vec<Target>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new target and return its id.
    pub fn add(&mut self, name: impl Into<String>, max_health: f64) -> TargetId {
        let id = TargetId(self.targets.len());
        self.targets.push(Target::new(id, name, max_health));
        id
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(id.0)
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut Target> {
        self.targets.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    /// Alive, in-combat targets in registration order.
    pub fn non_sleeping(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| !t.sleeping)
    }

    pub fn is_sleeping(&self, id: TargetId) -> bool {
        self.get(id).map_or(true, |t| t.sleeping)
    }

    /// Apply damage. Returns `true` if this damage put the target to sleep.
    ///
    /// The caller is responsible for cancelling timers owned by the target
    /// (its ignite tick) when this returns `true`.
    pub fn apply_damage(&mut self, id: TargetId, amount: f64) -> bool {
        let Some(target) = self.get_mut(id) else {
            return false;
        };
        if target.sleeping {
            return false;
        }

        target.health -= amount;
        target.damage_taken += amount;
        if target.health <= 0.0 {
            target.health = 0.0;
            target.sleeping = true;
            return true;
        }
        false
    }
}
