//! Freeloop Game Engine
//!
//! Platform-agnostic core of the Freeloop freelancer career simulation.
//! This crate provides all game mechanics without UI or platform-specific dependencies.

pub mod actions;
pub mod career;
pub mod challenge;
pub mod competition;
pub mod constants;
pub mod data;
pub mod jobs;
pub mod numbers;
pub mod outcome;
pub mod quiz;
pub mod rng;
pub mod seed;
pub mod session;
pub mod state;
pub mod storage;

// Re-export commonly used types
pub use actions::{
    ActionEffect, ActionOutcome, ActionRejection, DailyAction, apply_action, upgrade_cost,
};
pub use career::{CareerStats, CareerSummary};
pub use challenge::{SkillChallenge, challenge_question_count, start_challenge};
pub use competition::{
    Competition, CompetitionVerdict, JobAttempt, qualification_check, start_competition,
};
pub use data::{JobPool, JobPoolSource, JobTemplate, PoolError, StaticJobPool};
pub use jobs::{Job, JobBoardError, OfferSlot, generate_offers, required_range};
pub use outcome::{JobPayout, JobResult, SkillGrowth, pc_bonus, resolve_job, work_quality};
pub use quiz::{
    Countdown, FailReason, Operator, Question, QuizConfig, QuizError, QuizSession, QuizStatus,
    QuizStep,
};
pub use rng::{CountingRng, RngBundle};
pub use seed::{run_code_for_seed, run_code_from_entropy, seed_from_run_code};
pub use session::{
    FreelanceSession, SessionError, SessionEvent, SessionPhase, TimerId, game_over_message,
};
pub use state::{GameOverCause, PlayerState, SkillDecay, SkillKind};
pub use storage::{FileStorage, GameStorage, MemoryStorage, SaveRecord, StorageError};

/// Main game engine binding a job pool source to a save backend
pub struct GameEngine<P, S>
where
    P: JobPoolSource,
    S: GameStorage,
{
    pool_source: P,
    storage: S,
}

impl<P, S> GameEngine<P, S>
where
    P: JobPoolSource,
    S: GameStorage,
{
    /// Create a new game engine with the provided pool source and storage
    pub const fn new(pool_source: P, storage: S) -> Self {
        Self {
            pool_source,
            storage,
        }
    }

    /// Read and validate the job-template pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be loaded or cannot fill a board.
    pub fn load_job_pool(&self) -> Result<JobPool, anyhow::Error>
    where
        P::Error: Into<anyhow::Error>,
    {
        let pool = self.pool_source.load_job_pool().map_err(Into::into)?;
        pool.validate()?;
        Ok(pool)
    }

    /// Continue the stored career, or start fresh when there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the job pool cannot be loaded.
    pub fn resume_session(&self, seed: u64) -> Result<FreelanceSession<S>, anyhow::Error>
    where
        P::Error: Into<anyhow::Error>,
        S: Clone,
    {
        let pool = self.load_job_pool()?;
        Ok(FreelanceSession::resume(pool, self.storage.clone(), seed))
    }

    /// Discard the stored career and start a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the job pool cannot be loaded.
    pub fn new_session(&self, seed: u64) -> Result<FreelanceSession<S>, anyhow::Error>
    where
        P::Error: Into<anyhow::Error>,
        S: Clone,
    {
        let pool = self.load_job_pool()?;
        Ok(FreelanceSession::new_career(pool, self.storage.clone(), seed))
    }

    /// Save a player state
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    pub fn save_state(&self, slot: &str, state: &PlayerState) -> Result<(), S::Error> {
        self.storage.save_state(slot, state)
    }

    /// Load a player state; corrupt records come back as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn load_state(&self, slot: &str) -> Result<Option<PlayerState>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let loaded = self.storage.load_state(slot).map_err(Into::into)?;
        Ok(loaded.map(|mut state| {
            state.clamp();
            state
        }))
    }

    /// Delete a saved state
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_state(&self, slot: &str) -> Result<(), S::Error> {
        self.storage.delete_state(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SAVE_SLOT;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Copy, Default)]
    struct TinyPool;

    impl JobPoolSource for TinyPool {
        type Error = Infallible;

        fn load_job_pool(&self) -> Result<JobPool, Self::Error> {
            Ok(JobPool::from_templates(vec![JobTemplate {
                title: "Lonely Gig".to_string(),
                skill: SkillKind::Dev,
            }]))
        }
    }

    #[derive(Clone, Debug, Default)]
    struct PlainStorage {
        saves: Rc<RefCell<HashMap<String, PlayerState>>>,
    }

    impl GameStorage for PlainStorage {
        type Error = Infallible;

        fn save_state(&self, slot: &str, state: &PlayerState) -> Result<(), Self::Error> {
            self.saves
                .borrow_mut()
                .insert(slot.to_string(), state.clone());
            Ok(())
        }

        fn load_state(&self, slot: &str) -> Result<Option<PlayerState>, Self::Error> {
            Ok(self.saves.borrow().get(slot).cloned())
        }

        fn delete_state(&self, slot: &str) -> Result<(), Self::Error> {
            self.saves.borrow_mut().remove(slot);
            Ok(())
        }
    }

    #[test]
    fn engine_roundtrips_state() {
        let engine = GameEngine::new(StaticJobPool, PlainStorage::default());
        let mut session = engine.new_session(0xABCD).unwrap();
        session.with_state_mut(|state| {
            state.money = 250.0;
            state.day = 3;
        });
        let snapshot = session.into_state();
        engine.save_state("slot-one", &snapshot).unwrap();

        let loaded = engine.load_state("slot-one").unwrap().expect("save exists");
        assert!((loaded.money - 250.0).abs() < f64::EPSILON);
        assert_eq!(loaded.day, 3);
        assert!(engine.load_state("missing-slot").unwrap().is_none());
        engine.delete_state("slot-one").unwrap();
        assert!(engine.load_state("slot-one").unwrap().is_none());
    }

    #[test]
    fn sessions_share_the_engine_storage() {
        let engine = GameEngine::new(StaticJobPool, MemoryStorage::new());
        let mut session = engine.new_session(7).unwrap();
        session.apply_action(DailyAction::Relax).unwrap();

        let saved = engine.load_state(SAVE_SLOT).unwrap().expect("autosaved");
        assert_eq!(saved.day, 2);
        let resumed = engine.resume_session(7).unwrap();
        assert_eq!(resumed.state().day, 2);
    }

    #[test]
    fn undersized_pool_is_refused() {
        let engine = GameEngine::new(TinyPool, PlainStorage::default());
        let err = engine.new_session(1).unwrap_err();
        assert!(err.to_string().contains("at least 3"));
    }
}
