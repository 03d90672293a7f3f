//! Simulation errors

use thiserror::Error;

use crate::combat::{SimTime, TargetId};

#[derive(Debug, Error)]
pub enum SimError {
    /// A phase switch was toggled twice at the same instant. Signals an
    /// action that re-triggers itself without time advancing.
    #[error("{actor} action {action} infinite loop detected (no time passing between executes) at {time}")]
    InfiniteLoop {
        actor: String,
        action: String,
        time: SimTime,
    },

    #[error("unknown target {0}")]
    UnknownTarget(TargetId),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
