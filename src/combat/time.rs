//! Simulation time
//!
//! Timestamps and durations share one integer representation (milliseconds)
//! so that "same instant" comparisons are exact. The phase switch relies on
//! this to detect actions that re-trigger without time advancing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

/// A point in (or span of) simulated time, in whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SimTime(i64);

impl SimTime {
    /// Sentinel for "never happened". Compares below every real timestamp.
    pub const NEVER: SimTime = SimTime(i64::MIN);
    pub const ZERO: SimTime = SimTime(0);

    pub const fn from_millis(ms: i64) -> Self {
        SimTime(ms)
    }

    /// Convert seconds to simulation time, rounding to the nearest millisecond.
    pub fn from_secs_f64(secs: f64) -> Self {
        SimTime((secs * 1000.0).round() as i64)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub fn is_never(self) -> bool {
        self == Self::NEVER
    }

    /// Saturating subtraction that never goes below zero.
    pub fn saturating_sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(rhs.0).max(0))
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for SimTime {
    fn add_assign(&mut self, rhs: SimTime) {
        *self = *self + rhs;
    }
}

impl Sub for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(rhs.0))
    }
}

/// Scale a duration (haste, cadence multipliers). Rounds to the nearest millisecond.
impl Mul<f64> for SimTime {
    type Output = SimTime;

    fn mul(self, rhs: f64) -> SimTime {
        SimTime((self.0 as f64 * rhs).round() as i64)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_never() {
            write!(f, "never")
        } else {
            write!(f, "{:.3}s", self.as_secs_f64())
        }
    }
}
