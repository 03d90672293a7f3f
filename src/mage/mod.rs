//! Mage
//!
//! The simulated actor and everything it owns exclusively:
//! - Icicle accumulator and its chain timer
//! - Ignite spread timer
//! - Burn phase switch
//! - Proc buffs, latched combat flags and reporting counters

pub mod actions;
pub mod constants;
pub mod icicles;
pub mod ignite;
pub mod options;
pub mod phase;
pub mod shatter;
pub mod sim;
pub mod state;

pub use actions::{ActionDef, ActionKind, ActionState, Capability};
pub use icicles::{ChainStep, IcicleAccumulator};
pub use ignite::{IgniteSpreader, SpreadOp, SpreadPlan, SpreadSlot};
pub use options::MageOptions;
pub use phase::{BurnPhase, StateSwitch, Uptime};
pub use shatter::{FrozenFlags, FrozenType, ShatterCounts, ShatterSources};
pub use sim::Simulation;
pub use state::{BuffKind, Buffs, CombatState, Procs};

/// One mage and its per-actor state.
#[derive(Debug, Clone)]
pub struct Mage {
    pub name: String,
    pub options: MageOptions,
    pub icicles: IcicleAccumulator,
    pub spreader: IgniteSpreader,
    pub burn_phase: BurnPhase,
    pub buffs: Buffs,
    pub state: CombatState,
    pub procs: Procs,
    pub shatter_sources: ShatterSources,
}

impl Mage {
    pub fn new(name: impl Into<String>, options: MageOptions) -> Self {
        Self {
            name: name.into(),
            icicles: IcicleAccumulator::new(options.icicle_capacity),
            options,
            spreader: IgniteSpreader::default(),
            burn_phase: BurnPhase::default(),
            buffs: Buffs::default(),
            state: CombatState::default(),
            procs: Procs::default(),
            shatter_sources: ShatterSources::default(),
        }
    }
}
