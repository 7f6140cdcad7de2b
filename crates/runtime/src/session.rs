//! Combat session: one board and one action log, combats fought in sequence.
//!
//! The session is the caller the phase solver expects. It paces a combat one
//! step at a time or skips to the end, hands out playback for presentation,
//! and owns the time-travel controls. Rewind and forward move over exchange
//! marks and are only available between combats.

use tactics_content::Content;
use tactics_core::{
    ActionLog, CombatPhaseSolver, CombatRecords, CombatSetup, CombatState, PlaybackEntry,
    SolverState, StepOutput,
};
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};
use crate::repository::SaveFile;

/// Result of a finished combat.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatReport {
    pub playback: Vec<PlaybackEntry>,
    pub records: CombatRecords,
}

struct ActiveCombat {
    solver: CombatPhaseSolver,
    /// Log cursor when the combat began.
    start: usize,
}

pub struct CombatSession {
    content: Content,
    state: CombatState,
    log: ActionLog,
    active: Option<ActiveCombat>,
}

impl CombatSession {
    pub fn new(content: Content, state: CombatState) -> Self {
        Self {
            content,
            state,
            log: ActionLog::new(),
            active: None,
        }
    }

    /// Resumes a verified save, history included.
    pub fn resume(content: Content, save: SaveFile) -> Result<Self> {
        save.verify()?;
        let (state, log) = save.into_parts();
        info!(actions = log.len(), cursor = log.cursor(), "session resumed");
        Ok(Self {
            content,
            state,
            log,
            active: None,
        })
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn state(&self) -> &CombatState {
        &self.state
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn in_combat(&self) -> bool {
        self.active.is_some()
    }

    pub fn solver_state(&self) -> Option<SolverState> {
        self.active.as_ref().map(|combat| combat.solver.state())
    }

    /// Validates `setup` and opens a combat. Starting after a rewind discards
    /// the reversed history.
    pub fn start(&mut self, setup: &CombatSetup) -> Result<()> {
        if self.active.is_some() {
            return Err(SessionError::CombatInProgress);
        }
        let solver = CombatPhaseSolver::new(self.content.env(), &self.state, setup)?;
        self.log.mark();
        info!(attacker = %setup.attacker, item = %setup.item, "combat started");
        self.active = Some(ActiveCombat {
            solver,
            start: self.log.cursor(),
        });
        Ok(())
    }

    /// Advances the open combat by one solver state.
    pub fn step(&mut self) -> Result<StepOutput> {
        let combat = self.active.as_mut().ok_or(SessionError::NoActiveCombat)?;
        Ok(combat
            .solver
            .step(self.content.env(), &mut self.state, &mut self.log)?)
    }

    /// Runs the open combat to its end without pacing.
    pub fn skip(&mut self) -> Result<StepOutput> {
        let combat = self.active.as_mut().ok_or(SessionError::NoActiveCombat)?;
        Ok(combat
            .solver
            .run_to_end(self.content.env(), &mut self.state, &mut self.log)?)
    }

    /// Awards experience and closes a combat that reached `Terminal`.
    pub fn finish(&mut self) -> Result<CombatReport> {
        let combat = self.active.as_mut().ok_or(SessionError::NoActiveCombat)?;
        let records = combat
            .solver
            .finish(self.content.env(), &mut self.state, &mut self.log)?;
        let playback = combat.solver.playback().to_vec();
        self.active = None;
        info!(
            entries = playback.len(),
            actions = self.log.len(),
            "combat finished"
        );
        Ok(CombatReport { playback, records })
    }

    /// Start, skip and finish in one call.
    pub fn fight(&mut self, setup: &CombatSetup) -> Result<CombatReport> {
        self.start(setup)?;
        self.skip()?;
        self.finish()
    }

    /// Reverses the open combat's actions and drops it.
    pub fn abort(&mut self) -> Result<()> {
        let combat = self.active.take().ok_or(SessionError::NoActiveCombat)?;
        while self.log.cursor() > combat.start {
            if !self.log.rewind(&mut self.state)? {
                break;
            }
        }
        // Re-marking drops the aborted actions from the redo tail.
        self.log.mark();
        warn!(cursor = self.log.cursor(), "combat aborted");
        Ok(())
    }

    /// Reverses the most recent exchange. Returns `false` at the beginning of
    /// history.
    pub fn rewind(&mut self) -> Result<bool> {
        if self.active.is_some() {
            return Err(SessionError::CombatInProgress);
        }
        let moved = self.log.rewind(&mut self.state)?;
        debug!(moved, cursor = self.log.cursor(), "rewind");
        Ok(moved)
    }

    /// Replays the next reversed exchange. Returns `false` when nothing is
    /// left to replay.
    pub fn forward(&mut self) -> Result<bool> {
        if self.active.is_some() {
            return Err(SessionError::CombatInProgress);
        }
        let moved = self.log.forward(&mut self.state)?;
        debug!(moved, cursor = self.log.cursor(), "forward");
        Ok(moved)
    }

    /// Rewinds up to `exchanges` times and returns how many succeeded.
    pub fn rewind_by(&mut self, exchanges: usize) -> Result<usize> {
        let mut done = 0;
        while done < exchanges && self.rewind()? {
            done += 1;
        }
        Ok(done)
    }

    pub fn save(&self) -> Result<SaveFile> {
        if self.active.is_some() {
            return Err(SessionError::CombatInProgress);
        }
        Ok(SaveFile::new(self.state.clone(), self.log.clone())?)
    }
}
