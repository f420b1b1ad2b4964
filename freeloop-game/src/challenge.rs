//! Skill challenge: the harder escalation quiz for under-qualified winners.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::competition::CompetitionVerdict;
use crate::constants::{
    CHALLENGE_GAP_PER_QUESTION, CHALLENGE_MAX_QUESTIONS, CHALLENGE_MIN_QUESTIONS,
};
use crate::jobs::Job;
use crate::numbers::floor_f64_to_usize;
use crate::quiz::{QuizConfig, QuizSession, QuizStatus};
use crate::state::PlayerState;

/// `clamp(floor(|required - skill| / 10) + 5, 5, 8)`
#[must_use]
pub fn challenge_question_count(required: f64, player_skill: f64) -> usize {
    let gap = (required - player_skill).abs();
    let extra = floor_f64_to_usize(gap / CHALLENGE_GAP_PER_QUESTION);
    extra
        .saturating_add(CHALLENGE_MIN_QUESTIONS)
        .clamp(CHALLENGE_MIN_QUESTIONS, CHALLENGE_MAX_QUESTIONS)
}

/// A live skill challenge for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillChallenge {
    pub job: Job,
    pub quiz: QuizSession,
}

impl SkillChallenge {
    /// `Won` on a clean run, `Lost` on any miss; `None` while running.
    ///
    /// A challenge never escalates further.
    #[must_use]
    pub const fn verdict(&self) -> Option<CompetitionVerdict> {
        match self.quiz.status() {
            QuizStatus::Active => None,
            QuizStatus::Passed => Some(CompetitionVerdict::Won),
            QuizStatus::Failed(reason) => Some(CompetitionVerdict::Lost(reason)),
        }
    }
}

/// Size the challenge by the skill gap and generate its questions.
pub fn start_challenge(job: Job, state: &PlayerState, rng: &mut impl Rng) -> SkillChallenge {
    let count = challenge_question_count(job.required, state.skill(job.skill));
    let quiz = QuizSession::generate(QuizConfig::challenge(count), rng);
    log::debug!(
        "skill challenge for '{}' with {count} questions (required {:.1}, skill {:.2})",
        job.title,
        job.required,
        state.skill(job.skill)
    );
    SkillChallenge { job, quiz }
}
