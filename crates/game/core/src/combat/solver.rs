//! Phase state machine.
//!
//! ```text
//! Init ──► AttackerPhase ◄──► DefenderPhase
//!   │            │                 │
//!   └────────────┴──► Terminal ◄───┘
//! ```
//!
//! Each call to [`CombatPhaseSolver::step`] resolves at most one exchange and
//! then picks the next state. Every state change goes through the action log
//! immediately, so the log is always a faithful record of the combat so far.
use tracing::{debug, info, warn};

use super::records::{CombatRecords, apply_exp, combat_exp};
use super::script::{Outcome, ScriptDirective, ScriptQueue};
use super::setup::{self, CombatSetup, ResolvedSetup, item_usable};
use super::{CombatError, PlaybackEntry, Side};
use crate::action::{
    Action, ActionLog, AddStatusAction, GainExpAction, GainWeaponExpAction, RandomStateAction,
    SetHpAction, SetItemUsesAction,
};
use crate::aggregate::{Aggregator, Hook, HookContext, Layers};
use crate::config::RngMode;
use crate::env::{CombatEnv, OracleError, RandomStream};
use crate::formula::{CombatMode, FormulaEngine};
use crate::state::{BoardQuery, CombatState, ItemId, Team, UnitId, UnitState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SolverState {
    Init,
    AttackerPhase,
    DefenderPhase,
    Terminal,
}

impl From<Side> for SolverState {
    fn from(side: Side) -> Self {
        match side {
            Side::Attacker => SolverState::AttackerPhase,
            Side::Defender => SolverState::DefenderPhase,
        }
    }
}

/// What one step produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepOutput {
    pub actions: Vec<Action>,
    pub playback: Vec<PlaybackEntry>,
}

impl StepOutput {
    fn extend(&mut self, other: StepOutput) {
        self.actions.extend(other.actions);
        self.playback.extend(other.playback);
    }
}

/// Sub-attack and full-phase counters for one side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct PhaseCounter {
    strikes: u32,
    phases: u32,
}

impl PhaseCounter {
    fn strike(&mut self, multiattacks: u32) {
        self.strikes += 1;
        if self.strikes >= multiattacks {
            self.strikes = 0;
            self.phases += 1;
        }
    }

    fn mid_phase(&self) -> bool {
        self.strikes > 0
    }
}

/// One directed (unit, item) vs target resolution.
#[derive(Clone, Copy, Debug)]
struct Pairing {
    side: Side,
    unit: UnitId,
    item: ItemId,
    target: UnitId,
    def_item: Option<ItemId>,
    mode: CombatMode,
}

impl Pairing {
    fn context<'s>(&self, board: &'s CombatState) -> Result<HookContext<'s>, CombatError> {
        let unit = unit_ref(board, self.unit)?;
        let target = unit_ref(board, self.target)?;
        let item = board
            .item(self.item)
            .ok_or(OracleError::ItemNotFound(self.item))?;
        let def_item = self.def_item.and_then(|id| board.item(id));
        Ok(HookContext::new(unit, Some(item))
            .against(Some(target), def_item)
            .in_mode(self.mode))
    }

    /// Self-targeted resolutions (a unit healing itself) have no defender to
    /// announce.
    fn has_defender(&self) -> bool {
        self.unit != self.target
    }
}

/// Values a landed hit applies, computed before any of them is recorded.
struct HitEffects {
    heal: Option<i32>,
    damage: Option<i32>,
    status: Option<String>,
}

fn unit_ref(board: &CombatState, id: UnitId) -> Result<&UnitState, CombatError> {
    Ok(board.unit(id).ok_or(OracleError::UnitNotFound(id))?)
}

/// Deterministic, caller-driven combat state machine.
#[derive(Clone, Debug)]
pub struct CombatPhaseSolver {
    setup: ResolvedSetup,
    script: ScriptQueue,
    state: SolverState,
    directive: ScriptDirective,
    attacker: PhaseCounter,
    defender: PhaseCounter,
    playback: Vec<PlaybackEntry>,
    finished: bool,
}

impl CombatPhaseSolver {
    /// Validates the setup and parses the script. Records nothing.
    pub fn new(
        env: CombatEnv<'_>,
        board: &dyn BoardQuery,
        setup: &CombatSetup,
    ) -> Result<Self, CombatError> {
        let script = ScriptQueue::parse(&setup.script)?;
        let resolved = setup::resolve(env, board, setup)?;
        debug!(
            attacker = %resolved.attacker,
            defender = ?resolved.defender,
            engagements = resolved.engagements.len(),
            can_counter = resolved.can_counter,
            scripted = script.len(),
            "combat set up"
        );
        Ok(Self {
            setup: resolved,
            script,
            state: SolverState::Init,
            directive: ScriptDirective::Default,
            attacker: PhaseCounter::default(),
            defender: PhaseCounter::default(),
            playback: Vec::new(),
            finished: false,
        })
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state == SolverState::Terminal
    }

    pub fn setup(&self) -> &ResolvedSetup {
        &self.setup
    }

    /// Every playback entry produced so far.
    pub fn playback(&self) -> &[PlaybackEntry] {
        &self.playback
    }

    /// Advances the machine by one state.
    ///
    /// `Init` only picks the opening side; phase states resolve one exchange
    /// and then transition. Stepping a finished combat is an error.
    pub fn step(
        &mut self,
        env: CombatEnv<'_>,
        state: &mut CombatState,
        log: &mut ActionLog,
    ) -> Result<StepOutput, CombatError> {
        let start = log.cursor();
        let mut playback = Vec::new();
        let from = self.state;

        self.state = match from {
            SolverState::Init => self.opening(env, state)?,
            SolverState::AttackerPhase => {
                self.attacker_exchange(env, state, log, &mut playback)?;
                self.after_attacker(env, state)?
            }
            SolverState::DefenderPhase => {
                self.defender_exchange(env, state, log, &mut playback)?;
                self.after_defender(env, state)?
            }
            SolverState::Terminal => return Err(CombatError::AlreadyTerminal),
        };
        debug!(%from, to = %self.state, entries = playback.len(), "combat step");

        self.playback.extend(playback.iter().cloned());
        Ok(StepOutput {
            actions: log.applied()[start..].to_vec(),
            playback,
        })
    }

    /// Steps until `Terminal` without pacing. Outcomes are identical to
    /// stepping one at a time.
    pub fn run_to_end(
        &mut self,
        env: CombatEnv<'_>,
        state: &mut CombatState,
        log: &mut ActionLog,
    ) -> Result<StepOutput, CombatError> {
        let mut output = StepOutput::default();
        while !self.is_terminal() {
            output.extend(self.step(env, state, log)?);
        }
        Ok(output)
    }

    /// Records experience for surviving player units and returns the combat
    /// records. Only valid once, after `Terminal`.
    pub fn finish(
        &mut self,
        env: CombatEnv<'_>,
        state: &mut CombatState,
        log: &mut ActionLog,
    ) -> Result<CombatRecords, CombatError> {
        if !self.is_terminal() {
            return Err(CombatError::NotTerminal);
        }
        if self.finished {
            return Err(CombatError::AlreadyTerminal);
        }
        self.finished = true;

        let records = CombatRecords::from_playback(&self.playback);
        let opponent = self
            .setup
            .defender
            .or_else(|| self.setup.engagements.iter().find_map(|e| e.defender));
        let mut participants = vec![(self.setup.attacker, opponent, Some(self.setup.primary_item()))];
        if let Some(defender) = self.setup.defender {
            participants.push((defender, Some(self.setup.attacker), self.setup.def_item));
        }

        log.mark();
        for (unit, opponent, item) in participants {
            let awards = {
                let board: &CombatState = state;
                let wielder = unit_ref(board, unit)?;
                if !wielder.is_alive() || wielder.team != Team::Player {
                    continue;
                }
                let record = records.get(unit);
                let opponent_level = opponent
                    .and_then(|id| board.unit(id))
                    .map_or(wielder.level, |o| o.level);
                let ctx = HookContext::new(wielder, item.and_then(|id| board.item(id)));
                let agg = Aggregator::new(env.components);
                let bonus = agg.sum(Hook::ModifyExp, Layers::ALL, &ctx);
                let exp = combat_exp(env.config, &record, wielder.level, opponent_level, bonus);
                let weapon = match record.exchanges() {
                    0 => None,
                    exchanges => agg.text(Hook::WeaponType, Layers::ITEM, &ctx).map(|kind| {
                        let old = wielder.weapon_exp.get(&kind).copied();
                        let gain = env.config.weapon_exp_per_exchange.saturating_mul(exchanges);
                        (kind, old, gain)
                    }),
                };
                (wielder.level, wielder.exp, exp, weapon)
            };
            let (level, old_exp, gain, weapon) = awards;

            let (new_level, new_exp) = apply_exp(level, old_exp, gain);
            if (new_level, new_exp) != (level, old_exp) {
                info!(%unit, gain, new_level, "experience gained");
                log.record(
                    GainExpAction {
                        unit,
                        old_level: level,
                        old_exp,
                        new_level,
                        new_exp,
                    },
                    state,
                )?;
            }
            if let Some((weapon_type, old, gain)) = weapon.filter(|(_, _, gain)| *gain > 0) {
                let new = old.unwrap_or(0).saturating_add(gain);
                log.record(
                    GainWeaponExpAction {
                        unit,
                        weapon_type,
                        old,
                        new,
                    },
                    state,
                )?;
            }
        }
        Ok(records)
    }

    // ===== transitions =====

    fn opening(&mut self, env: CombatEnv<'_>, board: &CombatState) -> Result<SolverState, CombatError> {
        if let Some(next) = self.scripted_route(env, board)? {
            return Ok(next);
        }
        let counter = self.defender_can_counter(env, board)?;
        let vantage = match self.defender_context(board)? {
            Some(ctx) => Aggregator::new(env.components).any(Hook::Vantage, Layers::ALL, &ctx),
            None => false,
        };
        Ok(if counter && vantage {
            SolverState::DefenderPhase
        } else {
            SolverState::AttackerPhase
        })
    }

    fn after_attacker(
        &mut self,
        env: CombatEnv<'_>,
        board: &CombatState,
    ) -> Result<SolverState, CombatError> {
        let engine = FormulaEngine::new(env, board);
        let ctx = self.attacker_context(board)?;
        self.attacker.strike(engine.compute_multiattacks(&ctx));

        if self.someone_down(board)? {
            return Ok(SolverState::Terminal);
        }
        if let Some(next) = self.scripted_route(env, board)? {
            return Ok(next);
        }

        let attacker_ready = self.attacker_ready(env, board)?;
        let counter = self.defender_can_counter(env, board)?;
        if attacker_ready && self.attacker.mid_phase() {
            return Ok(SolverState::AttackerPhase);
        }
        if counter && self.defender.phases < self.defender_outspeed(&engine, board)? {
            return Ok(SolverState::DefenderPhase);
        }
        if attacker_ready && self.attacker.phases < engine.outspeed(&ctx)? {
            return Ok(SolverState::AttackerPhase);
        }
        Ok(SolverState::Terminal)
    }

    fn after_defender(
        &mut self,
        env: CombatEnv<'_>,
        board: &CombatState,
    ) -> Result<SolverState, CombatError> {
        let engine = FormulaEngine::new(env, board);
        if let Some(ctx) = self.defender_context(board)? {
            self.defender.strike(engine.compute_multiattacks(&ctx));
        }

        if self.someone_down(board)? {
            return Ok(SolverState::Terminal);
        }
        if let Some(next) = self.scripted_route(env, board)? {
            return Ok(next);
        }

        let attacker_ready = self.attacker_ready(env, board)?;
        let counter = self.defender_can_counter(env, board)?;
        // The defender finishes its multiattack before the attacker doubles.
        if counter && self.defender.mid_phase() {
            return Ok(SolverState::DefenderPhase);
        }
        let ctx = self.attacker_context(board)?;
        if attacker_ready && self.attacker.phases < engine.outspeed(&ctx)? {
            return Ok(SolverState::AttackerPhase);
        }
        if counter && self.defender.phases < self.defender_outspeed(&engine, board)? {
            return Ok(SolverState::DefenderPhase);
        }
        Ok(SolverState::Terminal)
    }

    /// Pops the next directive. `end` terminates; a side directive routes to
    /// that side when it can act and otherwise falls back to `--`.
    fn scripted_route(
        &mut self,
        env: CombatEnv<'_>,
        board: &CombatState,
    ) -> Result<Option<SolverState>, CombatError> {
        self.directive = self.script.next_directive();
        let side = match self.directive {
            ScriptDirective::End => return Ok(Some(SolverState::Terminal)),
            ScriptDirective::Default => return Ok(None),
            directive => match directive.side() {
                Some(side) => side,
                None => return Ok(None),
            },
        };
        let able = match side {
            Side::Attacker => self.attacker_ready(env, board)?,
            Side::Defender => self.defender_can_counter(env, board)?,
        };
        if able {
            return Ok(Some(side.into()));
        }
        warn!(directive = %self.directive, %side, "scripted side cannot act, resolving normally");
        self.directive = ScriptDirective::Default;
        Ok(None)
    }

    // ===== exchanges =====

    fn attacker_exchange(
        &mut self,
        env: CombatEnv<'_>,
        state: &mut CombatState,
        log: &mut ActionLog,
        playback: &mut Vec<PlaybackEntry>,
    ) -> Result<(), CombatError> {
        log.mark();
        let attacker = self.setup.attacker;
        if !self.attacker.mid_phase() {
            playback.push(PlaybackEntry::PhaseStart {
                side: Side::Attacker,
                unit: attacker,
            });
        }

        for engagement in &self.setup.engagements {
            let mut used = false;
            if let Some(defender) = engagement.defender {
                if unit_ref(state, defender)?.is_alive() {
                    let def_item = if Some(defender) == self.setup.defender {
                        self.setup.def_item
                    } else {
                        unit_ref(state, defender)?.equipped
                    };
                    let pairing = Pairing {
                        side: Side::Attacker,
                        unit: attacker,
                        item: engagement.item,
                        target: defender,
                        def_item,
                        mode: CombatMode::Attack,
                    };
                    resolve_pair(env, state, log, playback, pairing, self.directive)?;
                    used = true;
                }
            }
            for &target in &engagement.splash {
                if !unit_ref(state, target)?.is_alive() {
                    continue;
                }
                let pairing = Pairing {
                    side: Side::Attacker,
                    unit: attacker,
                    item: engagement.item,
                    target,
                    def_item: unit_ref(state, target)?.equipped,
                    mode: CombatMode::Splash,
                };
                // Splash targets always roll for themselves.
                resolve_pair(env, state, log, playback, pairing, ScriptDirective::Default)?;
                used = true;
            }
            if used {
                consume_use(state, log, engagement.item)?;
            }
        }
        Ok(())
    }

    fn defender_exchange(
        &mut self,
        env: CombatEnv<'_>,
        state: &mut CombatState,
        log: &mut ActionLog,
        playback: &mut Vec<PlaybackEntry>,
    ) -> Result<(), CombatError> {
        let (Some(defender), Some(def_item)) = (self.setup.defender, self.setup.def_item) else {
            return Ok(());
        };
        log.mark();
        if !self.defender.mid_phase() {
            playback.push(PlaybackEntry::PhaseStart {
                side: Side::Defender,
                unit: defender,
            });
        }
        let pairing = Pairing {
            side: Side::Defender,
            unit: defender,
            item: def_item,
            target: self.setup.attacker,
            def_item: Some(self.setup.primary_item()),
            mode: CombatMode::Defense,
        };
        resolve_pair(env, state, log, playback, pairing, self.directive)?;
        consume_use(state, log, def_item)
    }

    // ===== queries =====

    fn attacker_context<'s>(&self, board: &'s CombatState) -> Result<HookContext<'s>, CombatError> {
        let unit = unit_ref(board, self.setup.attacker)?;
        let item = board.item(self.setup.primary_item());
        let target = self.setup.defender.and_then(|id| board.unit(id));
        let def_item = self.setup.def_item.and_then(|id| board.item(id));
        Ok(HookContext::new(unit, item).against(target, def_item))
    }

    /// The attacker context seen from the defender, in defense mode.
    fn defender_context<'s>(
        &self,
        board: &'s CombatState,
    ) -> Result<Option<HookContext<'s>>, CombatError> {
        Ok(self.attacker_context(board)?.reversed())
    }

    fn defender_outspeed(
        &self,
        engine: &FormulaEngine<'_>,
        board: &CombatState,
    ) -> Result<u32, CombatError> {
        match self.defender_context(board)? {
            Some(ctx) => Ok(engine.outspeed(&ctx)?),
            None => Ok(0),
        }
    }

    fn attacker_ready(&self, env: CombatEnv<'_>, board: &CombatState) -> Result<bool, CombatError> {
        let unit = unit_ref(board, self.setup.attacker)?;
        let agg = Aggregator::new(env.components);
        Ok(self.setup.engagements.iter().all(|engagement| {
            board
                .item(engagement.item)
                .is_some_and(|item| item_usable(&agg, unit, item))
        }))
    }

    fn defender_can_counter(
        &self,
        env: CombatEnv<'_>,
        board: &CombatState,
    ) -> Result<bool, CombatError> {
        let (true, Some(defender), Some(def_item)) =
            (self.setup.can_counter, self.setup.defender, self.setup.def_item)
        else {
            return Ok(false);
        };
        let unit = unit_ref(board, defender)?;
        let agg = Aggregator::new(env.components);
        Ok(board
            .item(def_item)
            .is_some_and(|item| item_usable(&agg, unit, item)))
    }

    fn someone_down(&self, board: &CombatState) -> Result<bool, CombatError> {
        if !unit_ref(board, self.setup.attacker)?.is_alive() {
            return Ok(true);
        }
        match self.setup.defender {
            Some(defender) => Ok(!unit_ref(board, defender)?.is_alive()),
            None => Ok(false),
        }
    }
}

/// Resolves one pairing: decide the outcome, record the stream bracket, then
/// apply the item's effects.
fn resolve_pair(
    env: CombatEnv<'_>,
    state: &mut CombatState,
    log: &mut ActionLog,
    playback: &mut Vec<PlaybackEntry>,
    pairing: Pairing,
    directive: ScriptDirective,
) -> Result<(), CombatError> {
    let (hit, crit) = {
        let board: &CombatState = state;
        let ctx = pairing.context(board)?;
        let engine = FormulaEngine::new(env, board);
        (engine.compute_hit(&ctx)?, engine.compute_crit(&ctx)?.unwrap_or(0))
    };

    let before = state.rng.snapshot();
    let outcome = match directive.forced_for(pairing.side) {
        Some(forced) => forced,
        None => roll_outcome(&mut state.rng, env.config.rng_mode, hit, crit),
    };
    let after = state.rng.snapshot();
    log.record(RandomStateAction::new(before, after), state)?;
    debug!(
        unit = %pairing.unit,
        target = %pairing.target,
        hit,
        crit,
        ?outcome,
        forced = directive.forced_for(pairing.side).is_some(),
        "exchange resolved"
    );

    if pairing.has_defender() {
        let (attacker, defender) = (pairing.unit, pairing.target);
        playback.push(match outcome {
            Outcome::Hit => PlaybackEntry::Hit { attacker, defender },
            Outcome::Crit => PlaybackEntry::Crit { attacker, defender },
            Outcome::Miss => PlaybackEntry::Miss { attacker, defender },
        });
    }
    if outcome == Outcome::Miss {
        return Ok(());
    }
    apply_hit(env, state, log, playback, pairing, outcome == Outcome::Crit)
}

/// Rolls against the displayed odds. A crit is only rolled on a hit and only
/// when the crit chance is positive.
fn roll_outcome(rng: &mut impl RandomStream, mode: RngMode, hit: i32, crit: i32) -> Outcome {
    let mut roll = || -> i32 {
        let value = match mode {
            RngMode::Classic => rng.roll_percent(),
            RngMode::TrueHit => (rng.roll_percent() + rng.roll_percent()) / 2,
        };
        i32::try_from(value).unwrap_or(i32::MAX)
    };
    if roll() >= hit {
        Outcome::Miss
    } else if crit > 0 && roll() < crit {
        Outcome::Crit
    } else {
        Outcome::Hit
    }
}

fn apply_hit(
    env: CombatEnv<'_>,
    state: &mut CombatState,
    log: &mut ActionLog,
    playback: &mut Vec<PlaybackEntry>,
    pairing: Pairing,
    crit: bool,
) -> Result<(), CombatError> {
    let effects = {
        let board: &CombatState = state;
        let ctx = pairing.context(board)?;
        let engine = FormulaEngine::new(env, board);
        HitEffects {
            heal: engine.compute_heal(&ctx)?,
            damage: engine.compute_damage(&ctx, crit)?,
            status: engine
                .aggregator()
                .text(Hook::InflictStatus, Layers::ITEM, &ctx),
        }
    };
    let (source, target) = (pairing.unit, pairing.target);

    if let Some(amount) = effects.heal {
        let unit = unit_ref(state, target)?;
        let old = unit.hp;
        let new = old
            .saturating_add(u32::try_from(amount).unwrap_or(0))
            .min(unit.max_hp)
            .max(old);
        if new != old {
            log.record(SetHpAction::new(target, old, new), state)?;
        }
        playback.push(PlaybackEntry::Heal {
            source,
            target,
            amount,
            restored: new - old,
        });
    }

    if let Some(amount) = effects.damage {
        let old = unit_ref(state, target)?.hp;
        let dealt = u32::try_from(amount).unwrap_or(0).min(old);
        let new = old - dealt;
        if dealt > 0 {
            log.record(SetHpAction::new(target, old, new), state)?;
        }
        playback.push(PlaybackEntry::Damage {
            source,
            target,
            amount,
            dealt,
        });
        if old > 0 && new == 0 {
            debug!(unit = %target, killer = %source, "unit defeated");
            playback.push(PlaybackEntry::Death {
                unit: target,
                killer: source,
            });
        }
    }

    if let Some(status) = effects.status {
        let unit = unit_ref(state, target)?;
        if unit.is_alive() && !unit.statuses.contains(&status) {
            log.record(AddStatusAction::new(target, status.clone()), state)?;
            playback.push(PlaybackEntry::Status {
                source,
                target,
                status,
            });
        }
    }
    Ok(())
}

/// Spends one use of a limited item.
fn consume_use(state: &mut CombatState, log: &mut ActionLog, item: ItemId) -> Result<(), CombatError> {
    let uses = state
        .item(item)
        .ok_or(OracleError::ItemNotFound(item))?
        .uses;
    if let Some(remaining @ 1..) = uses {
        log.record(
            SetItemUsesAction::new(item, Some(remaining), Some(remaining - 1)),
            state,
        )?;
    }
    Ok(())
}
