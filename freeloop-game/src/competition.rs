//! Proposal round: three quick questions decide whether the client picks you.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::constants::{HEADLINE_RIVAL, RIVAL_POOL};
use crate::jobs::Job;
use crate::quiz::{FailReason, QuizConfig, QuizSession, QuizStatus};
use crate::state::PlayerState;

/// Where control goes once a competition or challenge quiz is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionVerdict {
    /// Qualified player won the job outright.
    Won,
    /// Won the pitch but under-qualified: a skill challenge decides.
    Escalate,
    /// Wrong answer or timeout.
    Lost(FailReason),
}

/// Inputs handed to the job result calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAttempt {
    pub success: bool,
    pub from_skill_challenge: bool,
}

impl JobAttempt {
    #[must_use]
    pub const fn won() -> Self {
        Self {
            success: true,
            from_skill_challenge: false,
        }
    }

    #[must_use]
    pub const fn won_challenge() -> Self {
        Self {
            success: true,
            from_skill_challenge: true,
        }
    }

    #[must_use]
    pub const fn lost() -> Self {
        Self {
            success: false,
            from_skill_challenge: false,
        }
    }
}

/// A live competition for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    pub job: Job,
    pub quiz: QuizSession,
    /// Names on the other three proposal cards.
    pub rivals: [String; 3],
}

impl Competition {
    /// Verdict for the quiz as it stands, `None` while still running.
    #[must_use]
    pub fn verdict(&self, state: &PlayerState) -> Option<CompetitionVerdict> {
        match self.quiz.status() {
            QuizStatus::Active => None,
            QuizStatus::Failed(reason) => Some(CompetitionVerdict::Lost(reason)),
            QuizStatus::Passed => Some(qualification_check(&self.job, state)),
        }
    }
}

/// Generate the three-question pitch and pick today's rivals.
pub fn start_competition(job: Job, rng: &mut impl Rng) -> Competition {
    let quiz = QuizSession::generate(QuizConfig::competition(), rng);
    let rivals = draw_rivals(rng);
    log::debug!("competition started for '{}' against {rivals:?}", job.title);
    Competition { job, quiz, rivals }
}

/// After a clean pitch: under-qualified players escalate to a skill challenge.
#[must_use]
pub fn qualification_check(job: &Job, state: &PlayerState) -> CompetitionVerdict {
    if state.skill(job.skill) < job.required {
        CompetitionVerdict::Escalate
    } else {
        CompetitionVerdict::Won
    }
}

fn draw_rivals(rng: &mut impl Rng) -> [String; 3] {
    let mut pool = RIVAL_POOL;
    pool.shuffle(rng);
    [
        pool[0].to_string(),
        pool[1].to_string(),
        HEADLINE_RIVAL.to_string(),
    ]
}
