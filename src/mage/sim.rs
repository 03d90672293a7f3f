//! Simulation world
//!
//! Owns the scheduler, the target registry, the RNG, the combat log and the
//! mage, and runs the generic action resolution on top of them. Every event
//! callback runs here, strictly in timestamp order on one thread.

use tracing::{debug, info, trace};

use crate::combat::{
    CombatLog, CombatLogEventType, Fired, GameRng, Scheduler, SimEvent, SimTime, TargetId, TargetRegistry,
};
use crate::error::SimError;

use super::actions::{ActionKind, ActionState, Capability};
use super::icicles::ChainStep;
use super::ignite::{self, SpreadPlan};
use super::state::BuffKind;
use super::Mage;

pub struct Simulation {
    pub sched: Scheduler<SimEvent>,
    pub targets: TargetRegistry,
    pub rng: GameRng,
    pub log: CombatLog,
    pub mage: Mage,
}

impl Simulation {
    pub fn new(mage: Mage, rng: GameRng) -> Self {
        Self {
            sched: Scheduler::new(),
            targets: TargetRegistry::new(),
            rng,
            log: CombatLog::default(),
            mage,
        }
    }

    pub fn add_target(&mut self, name: impl Into<String>, max_health: f64) -> TargetId {
        self.targets.add(name, max_health)
    }

    pub fn now(&self) -> SimTime {
        self.sched.now()
    }

    pub fn total_damage(&self) -> f64 {
        self.log.total_damage()
    }

    // ------------------------------------------------------------------------
    // Combat lifecycle
    // ------------------------------------------------------------------------

    /// Enter combat: the first ignite spread fires at a random point within
    /// one spread period, and the burn phase tracker starts out conserving.
    pub fn arise(&mut self) {
        let now = self.now();
        let period = self.mage.options.ignite_period();
        let first_spread = SimTime::from_millis((period.as_millis() as f64 * self.rng.real()) as i64);
        self.mage.spreader.schedule(&mut self.sched, first_spread);
        self.mage.burn_phase.combat_begin(now);

        self.log.log(
            now,
            CombatLogEventType::MatchEvent,
            format!("{} enters combat", self.mage.name),
        );
        debug!("{} first ignite spread in {}", self.mage.name, first_spread);
    }

    /// Leave combat: close uptime intervals and cancel every actor-owned timer.
    pub fn finish(&mut self) {
        let now = self.now();
        self.mage.burn_phase.combat_end(now);
        self.mage.icicles.reset(&mut self.sched);
        self.mage.spreader.cancel(&mut self.sched);
        self.sched.cancel_opt(&mut self.mage.buffs.fingers_of_frost_timer);
        self.sched.cancel_opt(&mut self.mage.buffs.brain_freeze_timer);

        self.log.log(
            now,
            CombatLogEventType::MatchEvent,
            format!("{} leaves combat", self.mage.name),
        );
        info!(
            "{} finished at {} with {:.0} damage",
            self.mage.name,
            now,
            self.total_damage()
        );
    }

    // ------------------------------------------------------------------------
    // Event loop
    // ------------------------------------------------------------------------

    /// Process every event due at or before `end`, then move the clock to `end`.
    pub fn run_until(&mut self, end: SimTime) -> Result<(), SimError> {
        while let Some(time) = self.sched.peek_time() {
            if time > end {
                break;
            }
            self.step()?;
        }
        self.sched.advance_to(end);
        Ok(())
    }

    /// Process the next event. Returns `false` if nothing is pending.
    pub fn step(&mut self) -> Result<bool, SimError> {
        let Some(fired) = self.sched.pop() else {
            return Ok(false);
        };
        trace!("{} at {}", fired.payload.name(), fired.time);
        self.dispatch(fired)?;
        Ok(true)
    }

    fn dispatch(&mut self, fired: Fired<SimEvent>) -> Result<(), SimError> {
        match fired.payload {
            SimEvent::IcicleExpired => {
                if self.mage.icicles.expire(fired.id) {
                    self.mage.procs.icicles_expired += 1;
                    self.log.log(
                        fired.time,
                        CombatLogEventType::AuraRemoved,
                        format!("{} loses an Icicle (expired), total={}", self.mage.name, self.mage.icicles.len()),
                    );
                }
            }
            SimEvent::IcicleChain { target } => {
                let asleep = self.targets.is_sleeping(target);
                let cadence = self.mage.options.icicle_cadence();
                if let ChainStep::Fire(action) =
                    self.mage.icicles.chain_step(&mut self.sched, target, asleep, cadence)
                {
                    self.execute(action, target)?;
                }
            }
            SimEvent::BuffExpired { buff } => {
                if self.mage.buffs.expire(buff) {
                    self.log.log(
                        fired.time,
                        CombatLogEventType::AuraRemoved,
                        format!("{} loses {} (expired)", self.mage.name, buff),
                    );
                }
            }
            SimEvent::IgniteSpread => {
                self.mage.spreader.fired();
                self.mage.procs.ignite_spread_events += 1;
                self.ignite_spread()?;
                let period = self.mage.options.ignite_period();
                self.mage.spreader.schedule(&mut self.sched, period);
            }
            SimEvent::IgniteTick { target } => ActionKind::Ignite.on_tick(self, target)?,
            SimEvent::Impact(state) => self.impact(*state)?,
            SimEvent::Pulse {
                action,
                target,
                remaining,
                period,
            } => self.pulse(action, target, remaining, period)?,
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Action resolution
    // ------------------------------------------------------------------------

    /// Whether `action` may be cast at `target` right now.
    pub fn ready(&self, action: ActionKind, target: TargetId) -> bool {
        let def = action.def();
        if def.background {
            return false;
        }
        if def.harmful && self.targets.is_sleeping(target) {
            return false;
        }

        match action {
            ActionKind::GlacialSpike => self.mage.options.glacial_spike && self.mage.icicles.is_full(),
            ActionKind::StartBurnPhase => !self.mage.burn_phase.on(),
            ActionKind::StopBurnPhase => self.mage.burn_phase.on(),
            _ => true,
        }
    }

    /// Hasted cast time. Flurry is instant while Brain Freeze is up.
    pub fn execute_time(&self, action: ActionKind) -> SimTime {
        if action == ActionKind::Flurry && self.mage.buffs.brain_freeze {
            return SimTime::ZERO;
        }
        SimTime::from_secs_f64(action.def().execute_time * self.mage.options.spell_speed())
    }

    /// Cast `action`: wait out its cast time, execute it, then wait out the
    /// rest of the global cooldown. Returns `false` if it was not ready.
    pub fn cast(&mut self, action: ActionKind, target: TargetId) -> Result<bool, SimError> {
        self.cast_within(action, target, None)
    }

    /// Like [`cast`](Self::cast), but nothing happens after `deadline`.
    ///
    /// Returns `false` without acting if the execute would land past the
    /// deadline. The global cooldown wait is cut short at the deadline.
    pub fn cast_by(&mut self, action: ActionKind, target: TargetId, deadline: SimTime) -> Result<bool, SimError> {
        self.cast_within(action, target, Some(deadline))
    }

    fn cast_within(
        &mut self,
        action: ActionKind,
        target: TargetId,
        deadline: Option<SimTime>,
    ) -> Result<bool, SimError> {
        if !self.ready(action, target) {
            return Ok(false);
        }

        let start = self.now();
        let execute_time = self.execute_time(action);
        let gcd = if action.def().gcd {
            self.mage.options.gcd()
        } else {
            SimTime::ZERO
        };

        let executes_at = start + execute_time;
        if deadline.is_some_and(|deadline| executes_at > deadline) {
            debug!("{} {} would finish past the deadline", self.mage.name, action);
            return Ok(false);
        }

        self.run_until(executes_at)?;
        self.execute(action, target)?;

        let mut recovered = start + execute_time.max(gcd);
        if let Some(deadline) = deadline {
            recovered = recovered.min(deadline);
        }
        self.run_until(recovered)?;
        Ok(true)
    }

    /// Execute `action` against `target` immediately.
    ///
    /// Harmful actions against a sleeping target are dropped.
    pub fn execute(&mut self, action: ActionKind, target: TargetId) -> Result<(), SimError> {
        let def = action.def();
        let now = self.now();

        if def.harmful {
            let t = self.targets.get(target).ok_or(SimError::UnknownTarget(target))?;
            if t.sleeping {
                debug!("{} {} on {} dropped: target is asleep", self.mage.name, action, t.name);
                return Ok(());
            }
            self.log.log(
                now,
                CombatLogEventType::AbilityUsed,
                format!("{} uses {} on {}", self.mage.name, action, t.name),
            );
        } else {
            self.log.log(
                now,
                CombatLogEventType::AbilityUsed,
                format!("{} uses {}", self.mage.name, action),
            );
        }

        let mut state = ActionState::new(action, target, now);
        if def.harmful && !def.calculate_on_impact {
            state.snapshot_frozen(self);
        }

        action.on_execute(self, &mut state)?;

        if action.is_icicle() {
            self.mage.procs.icicles_fired += 1;
        }

        if def.harmful {
            let travel = SimTime::from_secs_f64(def.travel_time);
            if travel > SimTime::ZERO {
                self.sched.schedule(travel, SimEvent::Impact(Box::new(state)));
            } else {
                self.impact(state)?;
            }
        }

        Ok(())
    }

    fn impact(&mut self, mut state: ActionState) -> Result<(), SimError> {
        let action = state.action;
        let def = action.def();

        let target = self
            .targets
            .get(state.target)
            .ok_or(SimError::UnknownTarget(state.target))?;
        if target.sleeping {
            debug!("{} impact on {} skipped: target is asleep", action, target.name);
            return Ok(());
        }

        if def.calculate_on_impact {
            state.snapshot_frozen(self);
        }

        state.crit_chance = action.modify_crit_chance(self, &state, self.mage.options.base_crit);
        if def.base_damage > 0.0 {
            state.critical = self.rng.roll(state.crit_chance);
            state.amount = def.base_damage * action.modify_multiplier(self, &state) * state.frozen_multiplier;
            if state.critical {
                state.amount *= self.mage.options.crit_multiplier;
            }
            self.deal_damage(action, state.target, state.amount, state.critical)?;
        }

        if def.triggers_ignite && state.amount > 0.0 {
            let banked = state.amount * self.mage.options.ignite_mastery;
            self.deposit_ignite(state.target, banked)?;
        }

        if def.track_shatter {
            self.mage.shatter_sources.record(action.name(), state.frozen);
        }

        action.on_impact(self, &state)
    }

    fn pulse(&mut self, action: ActionKind, target: TargetId, remaining: u32, period: SimTime) -> Result<(), SimError> {
        if self.targets.is_sleeping(target) {
            debug!("{} pulses on {} stopping: target is asleep", action, target);
            return Ok(());
        }
        self.start_pulses(action, target, remaining, period)
    }

    /// Fire the first of `count` periodic ticks now and schedule the rest.
    pub fn start_pulses(
        &mut self,
        action: ActionKind,
        target: TargetId,
        count: u32,
        period: SimTime,
    ) -> Result<(), SimError> {
        if count == 0 {
            return Ok(());
        }

        action.on_tick(self, target)?;

        if count > 1 {
            self.sched.schedule(
                period,
                SimEvent::Pulse {
                    action,
                    target,
                    remaining: count - 1,
                    period,
                },
            );
        }
        Ok(())
    }

    /// Log and apply damage. A killing blow puts the target to sleep and
    /// removes its ignite.
    pub fn deal_damage(
        &mut self,
        action: ActionKind,
        target: TargetId,
        amount: f64,
        critical: bool,
    ) -> Result<(), SimError> {
        let now = self.now();
        let t = self.targets.get(target).ok_or(SimError::UnknownTarget(target))?;
        if t.sleeping {
            return Ok(());
        }
        let name = t.name.clone();

        self.log.log_damage(now, action.name(), &name, amount, critical);

        if self.targets.apply_damage(target, amount) {
            ignite::cancel(&mut self.targets, &mut self.sched, target);
            self.log.log(now, CombatLogEventType::MatchEvent, format!("{} dies", name));
            debug!("{} died at {}", name, now);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Icicles
    // ------------------------------------------------------------------------

    /// Store an icicle. At capacity the oldest one is fired at `target` first.
    pub fn trigger_icicle_gain(&mut self, target: TargetId, action: ActionKind) -> Result<(), SimError> {
        let duration = self.mage.options.icicle_duration();
        let overflow = self.mage.icicles.gain(&mut self.sched, action, duration);
        self.mage.procs.icicles_gained += 1;

        self.log.log(
            self.now(),
            CombatLogEventType::Proc,
            format!("{} gains {}, total={}", self.mage.name, action, self.mage.icicles.len()),
        );

        if let Some(oldest) = overflow {
            self.mage.procs.icicles_overflowed += 1;
            debug!("{} icicle use on {} (capped), total={}", self.mage.name, target, self.mage.icicles.len());
            self.execute(oldest, target)?;
        }
        Ok(())
    }

    /// Fire the oldest stored icicle at `target`. Returns `false` if none was stored.
    pub fn discharge_icicle(&mut self, target: TargetId) -> Result<bool, SimError> {
        let Some(action) = self.mage.icicles.discharge_one(&mut self.sched) else {
            return Ok(false);
        };
        debug!("{} icicle use on {}, total={}", self.mage.name, target, self.mage.icicles.len());
        self.execute(action, target)?;
        Ok(true)
    }

    /// Start firing every stored icicle at `target`.
    pub fn begin_icicle_chain(&mut self, target: TargetId) -> bool {
        let first_delay = self.mage.options.icicle_first_delay();
        let started = self.mage.icicles.begin_chain(&mut self.sched, target, first_delay);
        if started {
            debug!(
                "{} icicle use on {} (chained), total={}",
                self.mage.name,
                target,
                self.mage.icicles.len()
            );
        }
        started
    }

    // ------------------------------------------------------------------------
    // Procs and debuffs
    // ------------------------------------------------------------------------

    pub fn trigger_fingers_of_frost(&mut self) {
        let max_stack = self.mage.options.fingers_of_frost_max_stack;
        self.mage.buffs.gain_fingers_of_frost(max_stack);
        self.mage.procs.fingers_of_frost += 1;
        let duration = SimTime::from_secs_f64(self.mage.options.fingers_of_frost_duration);
        self.refresh_buff(BuffKind::FingersOfFrost, duration);
        self.log.log(
            self.now(),
            CombatLogEventType::Proc,
            format!("{} gains Fingers of Frost ({})", self.mage.name, self.mage.buffs.fingers_of_frost),
        );
    }

    pub fn trigger_brain_freeze(&mut self) {
        self.mage.buffs.brain_freeze = true;
        self.mage.procs.brain_freeze += 1;
        let duration = SimTime::from_secs_f64(self.mage.options.brain_freeze_duration);
        self.refresh_buff(BuffKind::BrainFreeze, duration);
        self.log.log(
            self.now(),
            CombatLogEventType::Proc,
            format!("{} gains Brain Freeze", self.mage.name),
        );
    }

    /// Use one Fingers of Frost stack. The expiry goes with the last stack.
    pub fn consume_fingers_of_frost(&mut self) -> bool {
        let consumed = self.mage.buffs.decrement_fingers_of_frost();
        if !self.mage.buffs.fingers_of_frost_up() {
            self.sched.cancel_opt(&mut self.mage.buffs.fingers_of_frost_timer);
        }
        consumed
    }

    pub fn consume_brain_freeze(&mut self) -> bool {
        self.sched.cancel_opt(&mut self.mage.buffs.brain_freeze_timer);
        self.mage.buffs.consume_brain_freeze()
    }

    fn refresh_buff(&mut self, buff: BuffKind, duration: SimTime) {
        let slot = self.mage.buffs.timer_mut(buff);
        self.sched.cancel_opt(slot);
        *slot = Some(self.sched.schedule(duration, SimEvent::BuffExpired { buff }));
    }

    /// Root `target` for the configured root duration.
    pub fn apply_root(&mut self, target: TargetId) -> Result<(), SimError> {
        let until = self.now() + SimTime::from_secs_f64(self.mage.options.root_duration);
        self.apply_debuff(target, "Frozen", |t| t.frozen_until = t.frozen_until.max(until))
    }

    pub fn apply_winters_chill(&mut self, target: TargetId) -> Result<(), SimError> {
        let until = self.now() + SimTime::from_secs_f64(self.mage.options.winters_chill_duration);
        self.apply_debuff(target, "Winter's Chill", |t| t.winters_chill_until = until)
    }

    fn apply_debuff(
        &mut self,
        target: TargetId,
        debuff: &str,
        apply: impl FnOnce(&mut crate::combat::Target),
    ) -> Result<(), SimError> {
        let now = self.now();
        let t = self.targets.get_mut(target).ok_or(SimError::UnknownTarget(target))?;
        if t.sleeping {
            return Ok(());
        }
        apply(t);
        let message = format!("{} is afflicted by {}", t.name, debuff);
        self.log.log(now, CombatLogEventType::AuraApplied, message);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Ignite
    // ------------------------------------------------------------------------

    /// Bank `amount` into the target's ignite.
    pub fn deposit_ignite(&mut self, target: TargetId, amount: f64) -> Result<(), SimError> {
        let ticks = self.mage.options.ignite_ticks();
        let period = self.mage.options.ignite_tick();
        if ignite::deposit(&mut self.targets, &mut self.sched, target, amount, ticks, period)? {
            self.mage.procs.ignite_applied += 1;
        }
        Ok(())
    }

    /// Run one spread pass and apply it. Returns the spreads performed.
    pub fn ignite_spread(&mut self) -> Result<SpreadPlan, SimError> {
        let slots = ignite::spread_slots(&self.targets);
        let plan = ignite::plan_spread(&slots, &mut self.rng);
        let now = self.now();

        for op in &plan {
            ignite::clone_onto(&mut self.targets, &mut self.sched, op.source, op.destination)?;

            if op.overwrite {
                self.mage.procs.ignite_overwrites += 1;
            } else {
                self.mage.procs.ignite_new_spreads += 1;
            }

            let source = self.target_name(op.source);
            let destination = self.target_name(op.destination);
            self.log.log(
                now,
                CombatLogEventType::Spread,
                format!("Ignite spreads from {} to {} ({:.0} banked)", source, destination, op.bank),
            );
        }

        Ok(plan)
    }

    fn target_name(&self, id: TargetId) -> String {
        self.targets
            .get(id)
            .map_or_else(|| id.to_string(), |t| t.name.clone())
    }

    // ------------------------------------------------------------------------
    // Burn phase
    // ------------------------------------------------------------------------

    pub fn start_burn_phase(&mut self, action: ActionKind) -> Result<(), SimError> {
        let now = self.now();
        if !self.mage.burn_phase.start(now) {
            return Err(self.infinite_loop(action));
        }
        self.log.log(now, CombatLogEventType::PhaseChange, format!("{} starts burning", self.mage.name));
        debug!("{} burn phase started at {}", self.mage.name, now);
        Ok(())
    }

    pub fn stop_burn_phase(&mut self, action: ActionKind) -> Result<(), SimError> {
        let now = self.now();
        if !self.mage.burn_phase.stop(now) {
            return Err(self.infinite_loop(action));
        }
        self.log.log(now, CombatLogEventType::PhaseChange, format!("{} stops burning", self.mage.name));
        debug!("{} burn phase stopped at {}", self.mage.name, now);
        Ok(())
    }

    fn infinite_loop(&self, action: ActionKind) -> SimError {
        SimError::InfiniteLoop {
            actor: self.mage.name.clone(),
            action: action.name().to_string(),
            time: self.now(),
        }
    }
}
