//! Combat events
//!
//! Payloads carried by the scheduler. Every pending timer in a run is one of
//! these; the simulation dispatches on the variant when the timer fires.

use crate::mage::actions::{ActionKind, ActionState};
use crate::mage::BuffKind;

use super::target::TargetId;
use super::time::SimTime;

/// A scheduled simulation event
#[derive(Debug, Clone)]
pub enum SimEvent {
    /// A stored icicle reached its buff duration without being fired.
    /// The fired timer id identifies which icicle.
    IcicleExpired,
    /// Next step of an auto-chaining icicle discharge
    IcicleChain {
        /// Target every icicle in the chain is fired at
        target: TargetId,
    },
    /// A proc buff ran out without being consumed
    BuffExpired { buff: BuffKind },
    /// Periodic ignite spread pass
    IgniteSpread,
    /// Periodic damage tick of a target's ignite
    IgniteTick {
        /// Target carrying the ignite
        target: TargetId,
    },
    /// A travelling action lands on its target
    Impact(Box<ActionState>),
    /// Next pulse of a multi-pulse action (Flurry bolts)
    Pulse {
        action: ActionKind,
        target: TargetId,
        /// Pulses still to fire, including this one
        remaining: u32,
        period: SimTime,
    },
}

impl SimEvent {
    /// Short name used in trace logging
    pub fn name(&self) -> &'static str {
        match self {
            SimEvent::IcicleExpired => "icicle_expiration",
            SimEvent::IcicleChain { .. } => "icicle_event",
            SimEvent::BuffExpired { .. } => "buff_expiration",
            SimEvent::IgniteSpread => "ignite_spread_event",
            SimEvent::IgniteTick { .. } => "ignite_tick",
            SimEvent::Impact(_) => "impact",
            SimEvent::Pulse { .. } => "pulse",
        }
    }
}
