//! MageSim - discrete-event mage combat simulator
//!
//! The proc and resource core of a mage: the icicle accumulator, the ignite
//! spread engine, the frozen/shatter classifier and the burn phase switch,
//! running on a small discrete-event engine.
//!
//! This library exposes the engine and mage modules for testing and reuse.

pub mod cli;
pub mod combat;
pub mod error;
pub mod headless;
pub mod mage;

// Re-export commonly used types
pub use combat::log::{CombatLog, CombatLogEventType};
pub use combat::{GameRng, SimTime, TargetId};
pub use error::SimError;
pub use headless::{ScenarioConfig, SimReport};
pub use mage::{ActionKind, Mage, MageOptions, Simulation};
