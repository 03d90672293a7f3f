//! Timed Event Scheduler
//!
//! A min-heap of future callbacks keyed by absolute time, backed by an
//! arena-indexed timer table.
//!
//! ## Handles
//! `schedule` returns a [`TimerId`] made of a slot index and a generation.
//! Every time a slot's timer fires or is cancelled the generation is bumped,
//! so an old handle can never cancel (or observe) a newer timer that happens
//! to reuse the same slot. This makes `cancel` safe to call on timers that
//! already fired or were already cancelled.
//!
//! ## Ordering
//! Events fire in increasing time order. Events scheduled for the same
//! instant fire in the order they were scheduled.
//!
//! Cancelled timers stay in the heap and are skipped lazily when popped.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::time::SimTime;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId {
    index: u32,
    generation: u32,
}

/// A timer that has fired, returned by [`Scheduler::pop`].
#[derive(Debug)]
pub struct Fired<E> {
    pub id: TimerId,
    pub time: SimTime,
    pub payload: E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Queued {
    time: SimTime,
    seq: u64,
    id: TimerId,
}

#[derive(Debug)]
struct Slot<E> {
    generation: u32,
    time: SimTime,
    payload: Option<E>,
}

/// Discrete-event scheduler owning the simulation clock.
#[derive(Debug)]
pub struct Scheduler<E> {
    now: SimTime,
    seq: u64,
    heap: BinaryHeap<Reverse<Queued>>,
    slots: Vec<Slot<E>>,
    free: Vec<u32>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: SimTime::ZERO,
            seq: 0,
            heap: BinaryHeap::new(),
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Current simulation time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Schedule `payload` to fire `delay` after now.
    pub fn schedule(&mut self, delay: SimTime, payload: E) -> TimerId {
        let at = self.now + delay.max(SimTime::ZERO);
        self.schedule_at(at, payload)
    }

    /// Schedule `payload` at an absolute time. Times in the past are clamped to now.
    pub fn schedule_at(&mut self, time: SimTime, payload: E) -> TimerId {
        let time = time.max(self.now);

        let index = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.time = time;
                slot.payload = Some(payload);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    time,
                    payload: Some(payload),
                });
                (self.slots.len() - 1) as u32
            }
        };

        let id = TimerId {
            index,
            generation: self.slots[index as usize].generation,
        };

        self.seq += 1;
        self.heap.push(Reverse(Queued { time, seq: self.seq, id }));
        id
    }

    /// Cancel a pending timer.
    ///
    /// Returns `false` (and does nothing) if the timer already fired or was
    /// already cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.live_slot_mut(id) {
            Some(slot) => {
                slot.payload = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                true
            }
            None => false,
        }
    }

    /// Cancel through an optional handle, clearing it.
    pub fn cancel_opt(&mut self, id: &mut Option<TimerId>) -> bool {
        match id.take() {
            Some(id) => self.cancel(id),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|slot| slot.generation == id.generation && slot.payload.is_some())
    }

    /// Absolute time a pending timer will fire at.
    pub fn fire_time(&self, id: TimerId) -> Option<SimTime> {
        if self.is_pending(id) {
            Some(self.slots[id.index as usize].time)
        } else {
            None
        }
    }

    /// Time remaining until a pending timer fires.
    pub fn remains(&self, id: TimerId) -> Option<SimTime> {
        self.fire_time(id).map(|t| t - self.now)
    }

    /// Time of the next live event, if any.
    pub fn peek_time(&mut self) -> Option<SimTime> {
        while let Some(Reverse(queued)) = self.heap.peek().copied() {
            if self.is_pending(queued.id) {
                return Some(queued.time);
            }
            self.heap.pop();
        }
        None
    }

    /// Pop the next live event and advance the clock to its time.
    pub fn pop(&mut self) -> Option<Fired<E>> {
        while let Some(Reverse(queued)) = self.heap.pop() {
            let Some(slot) = self.live_slot_mut(queued.id) else {
                continue;
            };
            let Some(payload) = slot.payload.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(queued.id.index);
            self.now = queued.time;
            return Some(Fired {
                id: queued.id,
                time: queued.time,
                payload,
            });
        }
        None
    }

    /// Advance the clock without firing anything. Never moves backwards.
    pub fn advance_to(&mut self, time: SimTime) {
        if time > self.now {
            self.now = time;
        }
    }

    /// Number of live timers.
    pub fn pending_count(&self) -> usize {
        self.slots.iter().filter(|s| s.payload.is_some()).count()
    }

    /// Drop every pending timer and rewind the clock to zero.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.payload.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.heap.clear();
        self.now = SimTime::ZERO;
        self.seq = 0;
    }

    fn live_slot_mut(&mut self, id: TimerId) -> Option<&mut Slot<E>> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation && slot.payload.is_some())
    }
}
