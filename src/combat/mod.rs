//! Combat system
//!
//! The engine plumbing the mage mechanics plug into:
//! - Simulation time (`SimTime`)
//! - The discrete-event scheduler with cancellable, generation-checked timers
//! - The target registry (health, debuffs, residual dots)
//! - Seeded RNG
//! - Combat logging

pub mod events;
pub mod log;
pub mod rng;
pub mod scheduler;
pub mod target;
pub mod time;

pub use events::SimEvent;
pub use log::{CombatLog, CombatLogEventType};
pub use rng::GameRng;
pub use scheduler::{Fired, Scheduler, TimerId};
pub use target::{ResidualDot, Target, TargetId, TargetRegistry};
pub use time::SimTime;
