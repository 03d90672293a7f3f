//! Mage Actions
//!
//! Closed set of action kinds with a static definition table per kind. Every
//! kind resolves through the same generic routine in [`Simulation`]; the
//! per-kind differences are the flags in its [`ActionDef`] plus the hooks of
//! the [`Capability`] trait.
//!
//! ## Resolution
//! 1. Execute: frozen snapshot (unless deferred), `on_execute`, impact scheduled
//!    after travel time
//! 2. Impact: deferred frozen snapshot, crit roll, damage, ignite deposit,
//!    shatter bookkeeping, `on_impact`

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::combat::{SimTime, TargetId};
use crate::error::SimError;

use super::constants::{
    BRAIN_FREEZE_FLURRY_BONUS, FLURRY_BOLTS, FLURRY_BOLT_CADENCE, ICE_LANCE_FROZEN_MULTIPLIER,
};
use super::ignite;
use super::shatter::{shatter_crit_chance, target_frozen, FrozenFlags};
use super::sim::Simulation;

/// Every action the mage can execute.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ActionKind {
    Frostbolt,
    Flurry,
    FlurryBolt,      // Background pulse launched by a Flurry impact
    IceLance,
    FrostboltIcicle, // Stored by Frostbolt
    FlurryIcicle,    // Stored by Flurry
    GlacialSpike,
    FrostNova,
    Fireball,
    Ignite,          // Residual fire dot, only ever ticks
    StartBurnPhase,
    StopBurnPhase,
}

/// Static data for one action kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionDef {
    pub name: &'static str,
    pub base_damage: f64,
    /// Unhasted cast time in seconds
    pub execute_time: f64,
    /// Seconds between execute and impact
    pub travel_time: f64,
    /// Needs a live target and produces an impact
    pub harmful: bool,
    /// Gains shatter crit against frozen targets
    pub shatter: bool,
    /// Frozen state and damage are computed at impact rather than execute
    pub calculate_on_impact: bool,
    /// Banks a share of its damage into the target's ignite
    pub triggers_ignite: bool,
    /// Fired by another mechanic, never cast from a rotation
    pub background: bool,
    /// Impacts are recorded in the shatter source table
    pub track_shatter: bool,
    /// Triggers the global cooldown
    pub gcd: bool,
}

const NO_DEF: ActionDef = ActionDef {
    name: "",
    base_damage: 0.0,
    execute_time: 0.0,
    travel_time: 0.0,
    harmful: true,
    shatter: false,
    calculate_on_impact: false,
    triggers_ignite: false,
    background: false,
    track_shatter: false,
    gcd: true,
};

const FROSTBOLT: ActionDef = ActionDef {
    name: "Frostbolt",
    base_damage: 1000.0,
    execute_time: 2.0,
    travel_time: 0.8,
    shatter: true,
    calculate_on_impact: true,
    track_shatter: true,
    ..NO_DEF
};

const FLURRY: ActionDef = ActionDef {
    name: "Flurry",
    execute_time: 3.0,
    travel_time: 0.4,
    ..NO_DEF
};

const FLURRY_BOLT: ActionDef = ActionDef {
    name: "Flurry Bolt",
    base_damage: 300.0,
    shatter: true,
    background: true,
    gcd: false,
    ..NO_DEF
};

const ICE_LANCE: ActionDef = ActionDef {
    name: "Ice Lance",
    base_damage: 600.0,
    travel_time: 1.0,
    shatter: true,
    calculate_on_impact: true,
    track_shatter: true,
    ..NO_DEF
};

const FROSTBOLT_ICICLE: ActionDef = ActionDef {
    name: "Frostbolt Icicle",
    base_damage: 450.0,
    travel_time: 0.6,
    shatter: true,
    background: true,
    gcd: false,
    ..NO_DEF
};

const FLURRY_ICICLE: ActionDef = ActionDef {
    name: "Flurry Icicle",
    ..FROSTBOLT_ICICLE
};

const GLACIAL_SPIKE: ActionDef = ActionDef {
    name: "Glacial Spike",
    base_damage: 3500.0,
    execute_time: 3.0,
    travel_time: 1.0,
    shatter: true,
    calculate_on_impact: true,
    track_shatter: true,
    ..NO_DEF
};

const FROST_NOVA: ActionDef = ActionDef {
    name: "Frost Nova",
    base_damage: 80.0,
    shatter: true,
    ..NO_DEF
};

const FIREBALL: ActionDef = ActionDef {
    name: "Fireball",
    base_damage: 1200.0,
    execute_time: 2.25,
    travel_time: 0.8,
    triggers_ignite: true,
    ..NO_DEF
};

const IGNITE: ActionDef = ActionDef {
    name: "Ignite",
    background: true,
    gcd: false,
    ..NO_DEF
};

const START_BURN_PHASE: ActionDef = ActionDef {
    name: "Start Burn Phase",
    harmful: false,
    gcd: false,
    ..NO_DEF
};

const STOP_BURN_PHASE: ActionDef = ActionDef {
    name: "Stop Burn Phase",
    harmful: false,
    gcd: false,
    ..NO_DEF
};

impl ActionKind {
    pub fn def(self) -> &'static ActionDef {
        match self {
            ActionKind::Frostbolt => &FROSTBOLT,
            ActionKind::Flurry => &FLURRY,
            ActionKind::FlurryBolt => &FLURRY_BOLT,
            ActionKind::IceLance => &ICE_LANCE,
            ActionKind::FrostboltIcicle => &FROSTBOLT_ICICLE,
            ActionKind::FlurryIcicle => &FLURRY_ICICLE,
            ActionKind::GlacialSpike => &GLACIAL_SPIKE,
            ActionKind::FrostNova => &FROST_NOVA,
            ActionKind::Fireball => &FIREBALL,
            ActionKind::Ignite => &IGNITE,
            ActionKind::StartBurnPhase => &START_BURN_PHASE,
            ActionKind::StopBurnPhase => &STOP_BURN_PHASE,
        }
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn is_icicle(self) -> bool {
        matches!(self, ActionKind::FrostboltIcicle | ActionKind::FlurryIcicle)
    }

    /// Frozen bits for a resolution of this action at the current instant.
    ///
    /// Ice Lance adds the Fingers of Frost bit from one of two places. With
    /// `bugs` on it reads the mage-wide flag latched by the most recent Ice
    /// Lance execute, so two lances in flight can both or neither get the
    /// bonus. With `bugs` off it reads the flag snapshotted into this lance's
    /// own state.
    pub fn frozen(self, sim: &Simulation, state: &ActionState) -> FrozenFlags {
        let mut flags = sim
            .targets
            .get(state.target)
            .map(|t| target_frozen(t, sim.now()))
            .unwrap_or_default();

        if self == ActionKind::IceLance {
            let fingers_of_frost = if sim.mage.options.bugs {
                sim.mage.state.fingers_of_frost_active
            } else {
                state.fingers_of_frost
            };
            if fingers_of_frost {
                flags |= FrozenFlags::FINGERS_OF_FROST;
            }
        }

        flags
    }

    /// Damage multiplier applied to frozen resolutions.
    pub fn frozen_multiplier(self) -> f64 {
        match self {
            ActionKind::IceLance => ICE_LANCE_FROZEN_MULTIPLIER,
            _ => 1.0,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State of one action resolution, carried from execute to impact.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionState {
    pub action: ActionKind,
    pub target: TargetId,
    pub executed_at: SimTime,
    pub frozen: FrozenFlags,
    pub frozen_multiplier: f64,
    /// Ice Lance: Fingers of Frost was up when this lance executed
    pub fingers_of_frost: bool,
    pub crit_chance: f64,
    pub critical: bool,
    pub amount: f64,
}

impl ActionState {
    pub fn new(action: ActionKind, target: TargetId, executed_at: SimTime) -> Self {
        Self {
            action,
            target,
            executed_at,
            frozen: FrozenFlags::empty(),
            frozen_multiplier: 1.0,
            fingers_of_frost: false,
            crit_chance: 0.0,
            critical: false,
            amount: 0.0,
        }
    }

    /// Compute and store the frozen bits and frozen multiplier.
    pub fn snapshot_frozen(&mut self, sim: &Simulation) {
        self.frozen = self.action.frozen(sim, self);
        self.frozen_multiplier = if self.frozen.is_empty() {
            1.0
        } else {
            self.action.frozen_multiplier()
        };
    }
}

/// Behaviour hooks consulted by the generic resolution routine.
pub trait Capability {
    fn on_execute(&self, sim: &mut Simulation, state: &mut ActionState) -> Result<(), SimError>;

    fn on_impact(&self, sim: &mut Simulation, state: &ActionState) -> Result<(), SimError>;

    /// One periodic tick against `target`.
    fn on_tick(&self, sim: &mut Simulation, target: TargetId) -> Result<(), SimError>;

    fn modify_multiplier(&self, sim: &Simulation, state: &ActionState) -> f64;

    fn modify_crit_chance(&self, sim: &Simulation, state: &ActionState, crit: f64) -> f64;
}

impl Capability for ActionKind {
    fn on_execute(&self, sim: &mut Simulation, state: &mut ActionState) -> Result<(), SimError> {
        let target = state.target;

        match self {
            ActionKind::Frostbolt => {
                sim.trigger_icicle_gain(target, ActionKind::FrostboltIcicle)?;

                let fof_chance = sim.mage.options.fingers_of_frost_chance;
                if sim.rng.roll(fof_chance) {
                    sim.trigger_fingers_of_frost();
                }

                let bf_chance = sim.mage.options.brain_freeze_chance;
                if sim.rng.roll(bf_chance) {
                    sim.trigger_brain_freeze();
                }
            }
            ActionKind::Flurry => {
                sim.trigger_icicle_gain(target, ActionKind::FlurryIcicle)?;

                let brain_freeze = sim.consume_brain_freeze();
                sim.mage.state.brain_freeze_active = brain_freeze;
                if brain_freeze {
                    sim.mage.procs.brain_freeze_used += 1;
                }
            }
            ActionKind::IceLance => {
                let fingers_of_frost = sim.mage.buffs.fingers_of_frost_up();
                sim.mage.state.fingers_of_frost_active = fingers_of_frost;
                state.fingers_of_frost = fingers_of_frost;
                sim.consume_fingers_of_frost();

                if !sim.mage.options.glacial_spike {
                    sim.begin_icicle_chain(target);
                }
            }
            ActionKind::GlacialSpike => {
                let consumed = sim.mage.icicles.consume_all(&mut sim.sched);
                debug!("{} consumed {} icicles", sim.mage.name, consumed);
            }
            ActionKind::StartBurnPhase => sim.start_burn_phase(*self)?,
            ActionKind::StopBurnPhase => sim.stop_burn_phase(*self)?,
            _ => {}
        }

        Ok(())
    }

    fn on_impact(&self, sim: &mut Simulation, state: &ActionState) -> Result<(), SimError> {
        let target = state.target;

        match self {
            ActionKind::Flurry => {
                let period = SimTime::from_secs_f64(FLURRY_BOLT_CADENCE * sim.mage.options.spell_speed());
                sim.start_pulses(*self, target, FLURRY_BOLTS, period)?;
            }
            ActionKind::FlurryBolt => {
                if sim.mage.state.brain_freeze_active {
                    sim.apply_winters_chill(target)?;
                }
            }
            ActionKind::IceLance => {
                if state.frozen.contains(FrozenFlags::FINGERS_OF_FROST)
                    && !state.frozen.difference(FrozenFlags::FINGERS_OF_FROST).is_empty()
                {
                    sim.mage.procs.fingers_of_frost_wasted += 1;
                }
            }
            ActionKind::GlacialSpike => sim.apply_root(target)?,
            ActionKind::FrostNova => {
                let enemies: Vec<TargetId> = sim
                    .targets
                    .non_sleeping()
                    .filter(|t| t.enemy)
                    .map(|t| t.id)
                    .collect();
                for enemy in enemies {
                    sim.apply_root(enemy)?;
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn on_tick(&self, sim: &mut Simulation, target: TargetId) -> Result<(), SimError> {
        match self {
            ActionKind::Ignite => {
                let period = sim.mage.options.ignite_tick();
                if let Some(amount) = ignite::tick(&mut sim.targets, &mut sim.sched, target, period) {
                    sim.deal_damage(*self, target, amount, false)?;
                }
            }
            ActionKind::Flurry => sim.execute(ActionKind::FlurryBolt, target)?,
            _ => {}
        }

        Ok(())
    }

    fn modify_multiplier(&self, sim: &Simulation, _state: &ActionState) -> f64 {
        match self {
            ActionKind::FlurryBolt if sim.mage.state.brain_freeze_active => 1.0 + BRAIN_FREEZE_FLURRY_BONUS,
            _ => 1.0,
        }
    }

    fn modify_crit_chance(&self, sim: &Simulation, state: &ActionState, crit: f64) -> f64 {
        shatter_crit_chance(crit, state.frozen, self.def().shatter, &sim.mage.options)
    }
}
