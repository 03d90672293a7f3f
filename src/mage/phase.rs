//! Phase Switch Tracker
//!
//! An exclusive on/off toggle ("burn" vs "conserve") with re-entrancy
//! protection, plus the uptime and duration bookkeeping built on top of it.
//!
//! `enable`/`disable` refuse a second call at the exact same timestamp. An
//! action that toggles the phase without time advancing would otherwise loop
//! forever inside one instant; callers escalate the refusal to a fatal
//! [`SimError::InfiniteLoop`](crate::error::SimError::InfiniteLoop).

use serde::{Deserialize, Serialize};

use crate::combat::SimTime;

/// Two-state toggle with timestamped edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSwitch {
    active: bool,
    last_enable: SimTime,
    last_disable: SimTime,
}

impl Default for StateSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl StateSwitch {
    pub fn new() -> Self {
        Self {
            active: false,
            last_enable: SimTime::NEVER,
            last_disable: SimTime::NEVER,
        }
    }

    /// Turn the switch on. Fails if it was already enabled at `now`.
    pub fn enable(&mut self, now: SimTime) -> bool {
        if self.last_enable == now {
            return false;
        }

        self.active = true;
        self.last_enable = now;
        true
    }

    /// Turn the switch off. Fails if it was already disabled at `now`.
    pub fn disable(&mut self, now: SimTime) -> bool {
        if self.last_disable == now {
            return false;
        }

        self.active = false;
        self.last_disable = now;
        true
    }

    pub fn on(&self) -> bool {
        self.active
    }

    /// Time since the last enable while on, zero while off.
    pub fn duration(&self, now: SimTime) -> SimTime {
        if self.active {
            now - self.last_enable
        } else {
            SimTime::ZERO
        }
    }

    pub fn last_enable(&self) -> SimTime {
        self.last_enable
    }

    pub fn last_disable(&self) -> SimTime {
        self.last_disable
    }

    /// Back to off with both edges at "never".
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Accumulated time a condition has been true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Uptime {
    up_since: Option<SimTime>,
    total: SimTime,
}

impl Uptime {
    /// Record the condition's state at `now`. Repeated updates with the same
    /// state are harmless.
    pub fn update(&mut self, up: bool, now: SimTime) {
        match (up, self.up_since) {
            (true, None) => self.up_since = Some(now),
            (false, Some(since)) => {
                self.total += now.saturating_sub(since);
                self.up_since = None;
            }
            _ => {}
        }
    }

    /// Total uptime including an interval still open at `now`.
    pub fn total(&self, now: SimTime) -> SimTime {
        match self.up_since {
            Some(since) => self.total + now.saturating_sub(since),
            None => self.total,
        }
    }

    /// Uptime as a fraction of `elapsed`.
    pub fn fraction(&self, now: SimTime, elapsed: SimTime) -> f64 {
        if elapsed.as_millis() <= 0 {
            return 0.0;
        }
        self.total(now).as_secs_f64() / elapsed.as_secs_f64()
    }
}

/// Burn phase state with its reporting data.
#[derive(Debug, Clone, Default)]
pub struct BurnPhase {
    pub switch: StateSwitch,
    pub burn_uptime: Uptime,
    pub conserve_uptime: Uptime,
    /// Lengths of completed burn phases in seconds
    pub duration_history: Vec<f64>,
}

impl BurnPhase {
    /// Called when combat begins: the actor starts out conserving.
    pub fn combat_begin(&mut self, now: SimTime) {
        self.burn_uptime.update(false, now);
        self.conserve_uptime.update(true, now);
    }

    /// Called when combat ends: close every open uptime interval.
    pub fn combat_end(&mut self, now: SimTime) {
        self.burn_uptime.update(false, now);
        self.conserve_uptime.update(false, now);
    }

    /// Start burning. Returns `false` when rejected by the switch.
    pub fn start(&mut self, now: SimTime) -> bool {
        if !self.switch.enable(now) {
            return false;
        }
        self.burn_uptime.update(true, now);
        self.conserve_uptime.update(false, now);
        true
    }

    /// Stop burning and record the completed burn length.
    pub fn stop(&mut self, now: SimTime) -> bool {
        let length = self.switch.duration(now);
        if !self.switch.disable(now) {
            return false;
        }
        self.duration_history.push(length.as_secs_f64());
        self.burn_uptime.update(false, now);
        self.conserve_uptime.update(true, now);
        true
    }

    pub fn on(&self) -> bool {
        self.switch.on()
    }

    pub fn duration(&self, now: SimTime) -> SimTime {
        self.switch.duration(now)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
