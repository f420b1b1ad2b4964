use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::OFFERS_PER_BOARD;
use crate::state::SkillKind;

const DEFAULT_JOB_DATA: &str = include_str!("../data/jobs.json");

/// Static job listing the board draws offers from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTemplate {
    pub title: String,
    pub skill: SkillKind,
}

/// Errors raised when a job pool cannot back a job board.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("job pool could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("job pool needs at least {needed} distinct templates (got {available})")]
    TooSmall { needed: usize, available: usize },
}

/// Container for the full template pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct JobPool {
    pub jobs: Vec<JobTemplate>,
}

impl JobPool {
    /// Create an empty pool (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self { jobs: Vec::new() }
    }

    /// Load a pool from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into job templates.
    pub fn from_json(json: &str) -> Result<Self, PoolError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn from_templates(jobs: Vec<JobTemplate>) -> Self {
        Self { jobs }
    }

    /// The pool that ships with the game.
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_JOB_DATA).unwrap_or_else(|err| {
            log::warn!("bundled job pool unreadable: {err}");
            Self::empty()
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Templates with duplicate entries removed, first occurrence wins.
    #[must_use]
    pub fn distinct(&self) -> Vec<&JobTemplate> {
        let mut seen: Vec<&JobTemplate> = Vec::with_capacity(self.jobs.len());
        for job in &self.jobs {
            if !seen.contains(&job) {
                seen.push(job);
            }
        }
        seen
    }

    /// Check the pool can fill a whole board.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::TooSmall`] when fewer distinct templates exist than a board shows.
    pub fn validate(&self) -> Result<(), PoolError> {
        let available = self.distinct().len();
        if available < OFFERS_PER_BOARD {
            return Err(PoolError::TooSmall {
                needed: OFFERS_PER_BOARD,
                available,
            });
        }
        Ok(())
    }
}

/// Source of the job-template pool.
/// Platform-specific implementations should provide this
pub trait JobPoolSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the complete template pool
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be loaded.
    fn load_job_pool(&self) -> Result<JobPool, Self::Error>;
}

/// Serves the pool bundled with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticJobPool;

impl JobPoolSource for StaticJobPool {
    type Error = PoolError;

    fn load_job_pool(&self) -> Result<JobPool, Self::Error> {
        let pool = JobPool::from_json(DEFAULT_JOB_DATA)?;
        pool.validate()?;
        Ok(pool)
    }
}
