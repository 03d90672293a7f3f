//! Icicle Accumulator
//!
//! A bounded FIFO of stored follow-up strikes. Each stored icicle owns an
//! expiration timer; the accumulator cancels that timer whenever it removes
//! the icicle by any other route, so an expiration can never fire against an
//! icicle that is already gone.
//!
//! ## Discharging
//! - `gain` at capacity pops the oldest icicle first and hands it back to the
//!   caller to fire at the gain's target.
//! - `discharge_one` pops the oldest icicle; the caller fires it at whatever
//!   target it chooses.
//! - `begin_chain` starts an auto-firing sequence: first icicle after a short
//!   fixed delay, then one per haste-scaled cadence until the queue is empty
//!   or the chain target is asleep. Icicles gained while the chain runs are
//!   fired by it too.
//!
//! The accumulator never executes actions itself. It only decides *which*
//! stored action fires; the simulation resolves it.

use std::collections::VecDeque;
use tracing::debug;

use crate::combat::{Scheduler, SimEvent, SimTime, TargetId, TimerId};

use super::actions::ActionKind;

/// One stored icicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcicleEntry {
    /// Action fired when this icicle is discharged
    pub action: ActionKind,
    /// Timer that silently removes the icicle when it fires
    pub expiration: TimerId,
}

/// Outcome of one step of an icicle chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStep {
    /// Fire this action at the chain target
    Fire(ActionKind),
    /// Chain target is asleep; the rest of the chain is abandoned
    TargetAsleep,
    /// Nothing left to fire
    Empty,
}

#[derive(Debug, Clone)]
pub struct IcicleAccumulator {
    entries: VecDeque<IcicleEntry>,
    capacity: usize,
    chain: Option<TimerId>,
}

impl IcicleAccumulator {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            chain: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Visible stack count of the icicles buff. Always equals the number of
    /// stored icicles, so it is capped at capacity.
    pub fn stacks(&self) -> usize {
        self.entries.len()
    }

    /// Stored actions, oldest first.
    pub fn actions(&self) -> impl Iterator<Item = ActionKind> + '_ {
        self.entries.iter().map(|e| e.action)
    }

    pub fn chain_running(&self) -> bool {
        self.chain.is_some()
    }

    /// Store a new icicle.
    ///
    /// At capacity the oldest icicle is popped first and returned; the caller
    /// must fire it (at the gain's target) to keep the queue bounded.
    pub fn gain(
        &mut self,
        sched: &mut Scheduler<SimEvent>,
        action: ActionKind,
        duration: SimTime,
    ) -> Option<ActionKind> {
        let overflow = if self.is_full() {
            self.discharge_one(sched)
        } else {
            None
        };

        let expiration = sched.schedule(duration, SimEvent::IcicleExpired);
        self.entries.push_back(IcicleEntry { action, expiration });
        debug_assert!(self.entries.len() <= self.capacity);

        overflow
    }

    /// Pop the oldest icicle and cancel its expiration.
    pub fn discharge_one(&mut self, sched: &mut Scheduler<SimEvent>) -> Option<ActionKind> {
        let entry = self.entries.pop_front()?;
        sched.cancel(entry.expiration);
        Some(entry.action)
    }

    /// Start an auto-firing chain at `target`.
    ///
    /// Returns `false` if a chain is already running or nothing is stored.
    pub fn begin_chain(
        &mut self,
        sched: &mut Scheduler<SimEvent>,
        target: TargetId,
        first_delay: SimTime,
    ) -> bool {
        if self.chain.is_some() || self.entries.is_empty() {
            return false;
        }

        self.chain = Some(sched.schedule(first_delay, SimEvent::IcicleChain { target }));
        true
    }

    /// Handle a fired chain timer.
    ///
    /// Pops the next icicle and, if more remain, schedules the following step
    /// `cadence` later.
    pub fn chain_step(
        &mut self,
        sched: &mut Scheduler<SimEvent>,
        target: TargetId,
        target_asleep: bool,
        cadence: SimTime,
    ) -> ChainStep {
        self.chain = None;

        if target_asleep {
            debug!("icicle chain on {} stopping: target is asleep", target);
            return ChainStep::TargetAsleep;
        }

        let Some(action) = self.discharge_one(sched) else {
            return ChainStep::Empty;
        };

        if !self.entries.is_empty() {
            self.chain = Some(sched.schedule(cadence, SimEvent::IcicleChain { target }));
            debug!("icicle chain on {} continues, total={}", target, self.entries.len());
        }

        ChainStep::Fire(action)
    }

    /// Handle a fired expiration timer. Removes the matching icicle without
    /// firing it. Returns `false` if no stored icicle owns that timer.
    pub fn expire(&mut self, timer: TimerId) -> bool {
        match self.entries.iter().position(|e| e.expiration == timer) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every stored icicle without firing any. Returns how many were
    /// removed.
    pub fn consume_all(&mut self, sched: &mut Scheduler<SimEvent>) -> usize {
        let mut removed = 0;
        while self.discharge_one(sched).is_some() {
            removed += 1;
        }
        removed
    }

    /// Stop a running chain. Safe to call when no chain is running.
    pub fn cancel_chain(&mut self, sched: &mut Scheduler<SimEvent>) {
        sched.cancel_opt(&mut self.chain);
    }

    /// Drop all state and cancel every owned timer.
    pub fn reset(&mut self, sched: &mut Scheduler<SimEvent>) {
        self.consume_all(sched);
        self.cancel_chain(sched);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DURATION: SimTime = SimTime::from_millis(60_000);

    fn setup(capacity: usize) -> (IcicleAccumulator, Scheduler<SimEvent>) {
        (IcicleAccumulator::new(capacity), Scheduler::new())
    }

    #[test]
    fn test_gain_below_capacity_does_not_discharge() {
        let (mut icicles, mut sched) = setup(5);
        assert_eq!(icicles.gain(&mut sched, ActionKind::FrostboltIcicle, DURATION), None);
        assert_eq!(icicles.stacks(), 1);
    }

    #[test]
    fn test_gain_at_capacity_discharges_oldest() {
        let (mut icicles, mut sched) = setup(2);
        icicles.gain(&mut sched, ActionKind::FrostboltIcicle, DURATION);
        icicles.gain(&mut sched, ActionKind::FlurryIcicle, DURATION);

        let overflow = icicles.gain(&mut sched, ActionKind::FrostboltIcicle, DURATION);
        assert_eq!(overflow, Some(ActionKind::FrostboltIcicle));
        assert_eq!(icicles.len(), 2);
        assert_eq!(
            icicles.actions().collect::<Vec<_>>(),
            vec![ActionKind::FlurryIcicle, ActionKind::FrostboltIcicle]
        );
        // The discharged icicle's expiration was cancelled
        assert_eq!(sched.pending_count(), 2);
    }

    #[test]
    fn test_discharge_is_fifo() {
        let (mut icicles, mut sched) = setup(5);
        icicles.gain(&mut sched, ActionKind::FlurryIcicle, DURATION);
        icicles.gain(&mut sched, ActionKind::FrostboltIcicle, DURATION);

        assert_eq!(icicles.discharge_one(&mut sched), Some(ActionKind::FlurryIcicle));
        assert_eq!(icicles.discharge_one(&mut sched), Some(ActionKind::FrostboltIcicle));
        assert_eq!(icicles.discharge_one(&mut sched), None);
    }

    #[test]
    fn test_expiration_removes_without_firing() {
        let (mut icicles, mut sched) = setup(5);
        icicles.gain(&mut sched, ActionKind::FrostboltIcicle, DURATION);

        let fired = sched.pop().expect("expiration should be pending");
        assert!(icicles.expire(fired.id));
        assert!(icicles.is_empty());
        // A second expire with the same handle finds nothing
        assert!(!icicles.expire(fired.id));
        assert_eq!(icicles.discharge_one(&mut sched), None);
    }

    #[test]
    fn test_begin_chain_requires_icicles_and_no_running_chain() {
        let (mut icicles, mut sched) = setup(5);
        let first = SimTime::from_millis(250);
        assert!(!icicles.begin_chain(&mut sched, TargetId(0), first));

        icicles.gain(&mut sched, ActionKind::FrostboltIcicle, DURATION);
        assert!(icicles.begin_chain(&mut sched, TargetId(0), first));
        assert!(!icicles.begin_chain(&mut sched, TargetId(0), first));
    }

    #[test]
    fn test_chain_step_stops_on_sleeping_target() {
        let (mut icicles, mut sched) = setup(5);
        icicles.gain(&mut sched, ActionKind::FrostboltIcicle, DURATION);
        icicles.gain(&mut sched, ActionKind::FrostboltIcicle, DURATION);

        let step = icicles.chain_step(&mut sched, TargetId(0), true, SimTime::from_millis(400));
        assert_eq!(step, ChainStep::TargetAsleep);
        assert_eq!(icicles.len(), 2, "no icicle is consumed by an aborted chain");
        assert!(!icicles.chain_running());
    }

    #[test]
    fn test_consume_all_cancels_expirations() {
        let (mut icicles, mut sched) = setup(5);
        for _ in 0..3 {
            icicles.gain(&mut sched, ActionKind::FrostboltIcicle, DURATION);
        }
        assert_eq!(icicles.consume_all(&mut sched), 3);
        assert_eq!(sched.pending_count(), 0);
    }
}
