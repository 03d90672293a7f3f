//! Ignite: residual damage and its spread engine
//!
//! Fire damage banks a share of itself into the target's ignite, a residual
//! dot that pays the bank out over a fixed number of ticks. Every spread
//! period the mage copies ignites from heavily banked targets onto targets
//! with nothing (or less) banked.
//!
//! ## Spread pass
//! 1. Split enemies into ticking ignites (sources) and the rest (candidates).
//! 2. Sort sources by descending bank.
//! 3. Pop the smallest source. Skip candidates at the tail of the candidate
//!    list whose bank equals the source's exactly. If none remain, this
//!    source does not spread. Otherwise pick a destination uniformly among
//!    the remaining prefix, remove it from the candidates and clone the
//!    source onto it.
//! 4. Push the source onto the candidate list and repeat.
//!
//! Because sources are popped smallest first and pushed back in that order,
//! the candidate list stays sorted by bank with its largest banks at the
//! tail. Every source is therefore at least as large as any destination it
//! can pick, and each destination is chosen once per pass, without any
//! pairwise validity checks.

use smallvec::SmallVec;
use std::cmp::Ordering;
use tracing::trace;

use crate::combat::{GameRng, Scheduler, SimEvent, SimTime, TargetId, TargetRegistry, TimerId};
use crate::error::SimError;

/// Per-target view of ignite used by a spread pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadSlot {
    pub target: TargetId,
    pub bank: f64,
    pub ticking: bool,
}

/// One planned spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadOp {
    pub source: TargetId,
    pub destination: TargetId,
    /// Source bank copied onto the destination
    pub bank: f64,
    /// Destination's bank before it was overwritten
    pub replaced_bank: f64,
    /// Destination already had a ticking ignite
    pub overwrite: bool,
}

pub type SpreadPlan = SmallVec<[SpreadOp; 8]>;

/// Plan one spread pass over `slots` (all eligible enemies).
///
/// With one slot or fewer nothing spreads.
pub fn plan_spread(slots: &[SpreadSlot], rng: &mut GameRng) -> SpreadPlan {
    let mut plan = SpreadPlan::new();
    if slots.len() <= 1 {
        return plan;
    }

    let mut sources: SmallVec<[SpreadSlot; 8]> = slots.iter().filter(|s| s.ticking).copied().collect();
    let mut candidates: SmallVec<[SpreadSlot; 8]> = slots.iter().filter(|s| !s.ticking).copied().collect();

    // Stable, descending by bank
    sources.sort_by(|a, b| b.bank.partial_cmp(&a.bank).unwrap_or(Ordering::Equal));

    while let Some(source) = sources.pop() {
        if !candidates.is_empty() {
            let mut end = candidates.len();
            while end > 0 && candidates[end - 1].bank == source.bank {
                end -= 1;
            }

            if end == 0 {
                trace!("ignite on {} has no valid spread destination", source.target);
                continue;
            }

            let index = rng.index_inclusive(end - 1);
            let destination = candidates.remove(index);
            plan.push(SpreadOp {
                source: source.target,
                destination: destination.target,
                bank: source.bank,
                replaced_bank: destination.bank,
                overwrite: destination.ticking,
            });
        }

        candidates.push(source);
    }

    plan
}

/// Collect spread slots for every non-sleeping enemy, in registry order.
pub fn spread_slots(targets: &TargetRegistry) -> SmallVec<[SpreadSlot; 8]> {
    targets
        .non_sleeping()
        .filter(|t| t.enemy)
        .map(|t| SpreadSlot {
            target: t.id,
            bank: t.ignite.bank(),
            ticking: t.ignite.is_ticking(),
        })
        .collect()
}

/// Bank `amount` into a target's ignite.
///
/// The new bank is the remaining bank plus `amount`, paid out over a fresh
/// `ticks`. A target that was not ticking starts ticking one `tick_period`
/// from now. Returns `true` when this created a new ignite.
pub fn deposit(
    targets: &mut TargetRegistry,
    sched: &mut Scheduler<SimEvent>,
    target: TargetId,
    amount: f64,
    ticks: u32,
    tick_period: SimTime,
) -> Result<bool, SimError> {
    let t = targets.get_mut(target).ok_or(SimError::UnknownTarget(target))?;
    if t.sleeping || amount <= 0.0 {
        return Ok(false);
    }

    let fresh = !t.ignite.is_ticking();
    let bank = t.ignite.bank() + amount;
    let ticks = ticks.max(1);
    t.ignite.ticks_left = ticks;
    t.ignite.tick_amount = bank / ticks as f64;

    if fresh {
        sched.cancel_opt(&mut t.ignite.tick_timer);
        t.ignite.tick_timer = Some(sched.schedule(tick_period, SimEvent::IgniteTick { target }));
    }

    Ok(fresh)
}

/// Copy the source ignite onto the destination, replacing whatever was there.
///
/// Tick amount, ticks left and the time of the next tick are all copied.
pub fn clone_onto(
    targets: &mut TargetRegistry,
    sched: &mut Scheduler<SimEvent>,
    source: TargetId,
    destination: TargetId,
) -> Result<(), SimError> {
    let src = targets.get(source).ok_or(SimError::UnknownTarget(source))?.ignite.clone();
    let next_tick = src.tick_timer.and_then(|id| sched.fire_time(id));

    let dst = targets
        .get_mut(destination)
        .ok_or(SimError::UnknownTarget(destination))?;
    sched.cancel_opt(&mut dst.ignite.tick_timer);

    let Some(next_tick) = next_tick else {
        dst.ignite.ticks_left = 0;
        return Ok(());
    };

    dst.ignite.tick_amount = src.tick_amount;
    dst.ignite.ticks_left = src.ticks_left;
    dst.ignite.tick_timer = Some(sched.schedule_at(next_tick, SimEvent::IgniteTick { target: destination }));
    Ok(())
}

/// Process a fired tick timer. Returns the damage dealt by this tick.
pub fn tick(
    targets: &mut TargetRegistry,
    sched: &mut Scheduler<SimEvent>,
    target: TargetId,
    tick_period: SimTime,
) -> Option<f64> {
    let t = targets.get_mut(target)?;
    t.ignite.tick_timer = None;
    if t.sleeping || t.ignite.ticks_left == 0 {
        t.ignite.ticks_left = 0;
        return None;
    }

    let amount = t.ignite.tick_amount;
    t.ignite.ticks_left -= 1;
    if t.ignite.ticks_left > 0 {
        t.ignite.tick_timer = Some(sched.schedule(tick_period, SimEvent::IgniteTick { target }));
    }
    Some(amount)
}

/// Remove a target's ignite, cancelling its tick timer.
pub fn cancel(targets: &mut TargetRegistry, sched: &mut Scheduler<SimEvent>, target: TargetId) {
    if let Some(t) = targets.get_mut(target) {
        sched.cancel_opt(&mut t.ignite.tick_timer);
        t.ignite.ticks_left = 0;
    }
}

/// Owner of the recurring spread timer.
#[derive(Debug, Clone, Default)]
pub struct IgniteSpreader {
    timer: Option<TimerId>,
}

impl IgniteSpreader {
    /// Schedule the next spread pass `delay` from now, replacing any pending one.
    pub fn schedule(&mut self, sched: &mut Scheduler<SimEvent>, delay: SimTime) {
        sched.cancel_opt(&mut self.timer);
        self.timer = Some(sched.schedule(delay, SimEvent::IgniteSpread));
    }

    /// Forget the timer that just fired.
    pub fn fired(&mut self) {
        self.timer = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.timer.is_some()
    }

    pub fn cancel(&mut self, sched: &mut Scheduler<SimEvent>) {
        sched.cancel_opt(&mut self.timer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: usize, bank: f64) -> SpreadSlot {
        SpreadSlot {
            target: TargetId(id),
            bank,
            ticking: bank > 0.0,
        }
    }

    #[test]
    fn test_single_target_never_spreads() {
        let mut rng = GameRng::from_seed(1);
        assert!(plan_spread(&[slot(0, 500.0)], &mut rng).is_empty());
    }

    #[test]
    fn test_one_source_spreads_to_empty_target() {
        let mut rng = GameRng::from_seed(1);
        let plan = plan_spread(&[slot(0, 500.0), slot(1, 0.0)], &mut rng);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].source, TargetId(0));
        assert_eq!(plan[0].destination, TargetId(1));
        assert!(!plan[0].overwrite);
    }

    #[test]
    fn test_equal_banks_do_not_spread_to_each_other() {
        let mut rng = GameRng::from_seed(9);
        let plan = plan_spread(&[slot(0, 300.0), slot(1, 300.0)], &mut rng);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_larger_overwrites_smaller() {
        let mut rng = GameRng::from_seed(4);
        let plan = plan_spread(&[slot(0, 100.0), slot(1, 900.0)], &mut rng);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].source, TargetId(1));
        assert_eq!(plan[0].destination, TargetId(0));
        assert!(plan[0].overwrite);
        assert_eq!(plan[0].replaced_bank, 100.0);
    }

    #[test]
    fn test_destinations_unique_and_never_larger() {
        for seed in 0..50 {
            let mut rng = GameRng::from_seed(seed);
            let slots = [
                slot(0, 0.0),
                slot(1, 400.0),
                slot(2, 0.0),
                slot(3, 800.0),
                slot(4, 400.0),
                slot(5, 0.0),
            ];
            let plan = plan_spread(&slots, &mut rng);

            let mut seen = std::collections::HashSet::new();
            for op in &plan {
                assert!(seen.insert(op.destination), "seed {}: duplicate destination", seed);
                assert!(op.replaced_bank < op.bank, "seed {}: spread into a bank >= source", seed);
                assert_ne!(op.source, op.destination);
            }
        }
    }
}
