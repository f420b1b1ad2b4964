//! The live career: one player state driven through the day's phases.
//!
//! A presentation layer only ever talks to [`FreelanceSession`]. It begins
//! a day, applies one daily action or browses the job board, answers quiz
//! questions, and forwards timer ticks. The session owns sequencing, so the
//! caller never re-implements a business rule.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::actions::{ActionOutcome, ActionRejection, DailyAction, apply_action};
use crate::career::{CareerStats, CareerSummary};
use crate::challenge::{SkillChallenge, start_challenge};
use crate::competition::{Competition, CompetitionVerdict, JobAttempt, start_competition};
use crate::constants::SAVE_SLOT;
use crate::data::JobPool;
use crate::jobs::{Job, JobBoardError, generate_offers};
use crate::outcome::{JobResult, resolve_job};
use crate::quiz::{QuizError, QuizSession, QuizStep};
use crate::rng::RngBundle;
use crate::seed::run_code_for_seed;
use crate::state::{GameOverCause, PlayerState};
use crate::storage::GameStorage;

/// Which screen the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Day view with the four action cards.
    Planning,
    JobBoard,
    Competition,
    Challenge,
    /// Outcome shown, waiting for "continue".
    DayOver,
    GameOver,
}

impl SessionPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::JobBoard => "job_board",
            Self::Competition => "competition",
            Self::Challenge => "challenge",
            Self::DayOver => "day_over",
            Self::GameOver => "game_over",
        }
    }

    #[must_use]
    pub const fn is_quiz(self) -> bool {
        matches!(self, Self::Competition | Self::Challenge)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle for one quiz's countdown. Ticks carrying an older id are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{operation} is not available during {phase}")]
    WrongPhase {
        operation: &'static str,
        phase: SessionPhase,
    },
    #[error(transparent)]
    Rejected(#[from] ActionRejection),
    #[error("offer {index} does not exist (board has {available})")]
    NoSuchOffer { index: usize, available: usize },
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    JobBoard(#[from] JobBoardError),
}

/// What an answer or tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The quiz is still running.
    Quiz(QuizStep),
    /// The competition was won under-qualified; a skill challenge started.
    Escalated { timer: TimerId, questions: usize },
    /// The job attempt is over and the state updated.
    Resolved(JobResult),
    /// Tick addressed to a cancelled or finished quiz.
    StaleTick,
}

#[derive(Debug, Clone)]
enum Phase {
    Planning,
    JobBoard {
        offers: Vec<Job>,
    },
    Competition {
        offers: Vec<Job>,
        competition: Competition,
        timer: TimerId,
    },
    Challenge {
        offers: Vec<Job>,
        challenge: SkillChallenge,
        timer: TimerId,
    },
    DayOver {
        message: String,
    },
    GameOver {
        summary: CareerSummary,
    },
}

impl Phase {
    const fn kind(&self) -> SessionPhase {
        match self {
            Self::Planning => SessionPhase::Planning,
            Self::JobBoard { .. } => SessionPhase::JobBoard,
            Self::Competition { .. } => SessionPhase::Competition,
            Self::Challenge { .. } => SessionPhase::Challenge,
            Self::DayOver { .. } => SessionPhase::DayOver,
            Self::GameOver { .. } => SessionPhase::GameOver,
        }
    }
}

/// One player's career persisted through `S`.
#[derive(Debug)]
pub struct FreelanceSession<S: GameStorage> {
    state: PlayerState,
    rngs: RngBundle,
    pool: JobPool,
    storage: S,
    phase: Phase,
    next_timer: u64,
    stats: CareerStats,
}

impl<S: GameStorage> FreelanceSession<S> {
    /// Continue the saved career, or start a fresh one when none is stored.
    pub fn resume(pool: JobPool, storage: S, seed: u64) -> Self {
        let state = match storage.load_state(SAVE_SLOT) {
            Ok(Some(state)) => {
                log::info!("resuming saved career on day {}", state.day);
                state
            }
            Ok(None) => PlayerState::default(),
            Err(err) => {
                log::warn!("save backend unreadable, starting fresh: {err}");
                PlayerState::default()
            }
        };
        Self::from_state(pool, storage, seed, state)
    }

    /// Throw away any save and start a new career.
    pub fn new_career(pool: JobPool, storage: S, seed: u64) -> Self {
        discard_save(&storage);
        Self::from_state(pool, storage, seed, PlayerState::default())
    }

    /// Drive an explicit state, e.g. a fixture or an imported save.
    pub fn from_state(pool: JobPool, storage: S, seed: u64, mut state: PlayerState) -> Self {
        state.clamp();
        let mut session = Self {
            state,
            rngs: RngBundle::from_user_seed(seed),
            pool,
            storage,
            phase: Phase::Planning,
            next_timer: 0,
            stats: CareerStats::default(),
        };
        session.enter_day();
        session
    }

    #[must_use]
    pub const fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Edit the state directly; the result is clamped and saved.
    pub fn with_state_mut<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut PlayerState) -> R,
    {
        let out = f(&mut self.state);
        self.state.clamp();
        self.persist();
        out
    }

    #[must_use]
    pub fn into_state(self) -> PlayerState {
        self.state
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase.kind()
    }

    #[must_use]
    pub const fn stats(&self) -> &CareerStats {
        &self.stats
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rngs.seed()
    }

    #[must_use]
    pub fn run_code(&self) -> String {
        run_code_for_seed(self.rngs.seed())
    }

    /// Random draws consumed so far across every stream.
    #[must_use]
    pub const fn rng_draws(&self) -> u64 {
        self.rngs.total_draws()
    }

    /// Today's offers while the board or a quiz on one of them is open.
    #[must_use]
    pub fn offers(&self) -> Option<&[Job]> {
        match &self.phase {
            Phase::JobBoard { offers }
            | Phase::Competition { offers, .. }
            | Phase::Challenge { offers, .. } => Some(offers),
            _ => None,
        }
    }

    #[must_use]
    pub const fn competition(&self) -> Option<&Competition> {
        match &self.phase {
            Phase::Competition { competition, .. } => Some(competition),
            _ => None,
        }
    }

    #[must_use]
    pub const fn challenge(&self) -> Option<&SkillChallenge> {
        match &self.phase {
            Phase::Challenge { challenge, .. } => Some(challenge),
            _ => None,
        }
    }

    /// The running quiz and the timer its ticks must carry.
    #[must_use]
    pub const fn active_quiz(&self) -> Option<(&QuizSession, TimerId)> {
        match &self.phase {
            Phase::Competition {
                competition, timer, ..
            } => Some((&competition.quiz, *timer)),
            Phase::Challenge {
                challenge, timer, ..
            } => Some((&challenge.quiz, *timer)),
            _ => None,
        }
    }

    /// Message on screen: the day's outcome or the game-over reason.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match &self.phase {
            Phase::DayOver { message } => Some(message.clone()),
            Phase::GameOver { summary } => Some(game_over_message(summary.cause)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn summary(&self) -> Option<&CareerSummary> {
        match &self.phase {
            Phase::GameOver { summary } => Some(summary),
            _ => None,
        }
    }

    /// Open (or re-open) the day view.
    ///
    /// Upkeep is charged once per day, so re-entering the same day is free.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongPhase`] outside the day view and the
    /// outcome screen.
    pub fn begin_day(&mut self) -> Result<SessionPhase, SessionError> {
        self.expect_phase(&[SessionPhase::Planning, SessionPhase::DayOver], "begin_day")?;
        self.enter_day();
        Ok(self.phase())
    }

    /// Dismiss the outcome screen and start the next day.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongPhase`] unless an outcome is showing.
    pub fn continue_day(&mut self) -> Result<SessionPhase, SessionError> {
        self.expect_phase(&[SessionPhase::DayOver], "continue_day")?;
        self.enter_day();
        Ok(self.phase())
    }

    /// Apply one of the four daily actions.
    ///
    /// `FindJob` opens the job board; the others consume the day.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Rejected`] when the action's precondition fails
    /// (state untouched, the action stays available) and
    /// [`SessionError::WrongPhase`] once the day's action was taken.
    pub fn apply_action(&mut self, action: DailyAction) -> Result<ActionOutcome, SessionError> {
        self.expect_phase(&[SessionPhase::Planning], "apply_action")?;
        let offers = if action == DailyAction::FindJob {
            Some(generate_offers(&self.pool, &self.state, self.rngs.jobs())?)
        } else {
            None
        };
        let outcome = match apply_action(action, &mut self.state, self.rngs.actions()) {
            Ok(outcome) => outcome,
            Err(rejection) => {
                log::warn!("{action} rejected on day {}: {rejection}", self.state.day);
                return Err(rejection.into());
            }
        };
        self.stats.record_action(&outcome, &self.state);

        if let Some(cause) = outcome.game_over {
            self.finish(cause);
        } else if let Some(offers) = offers {
            self.phase = Phase::JobBoard { offers };
            self.persist();
        } else {
            self.phase = Phase::DayOver {
                message: outcome.message(),
            };
            self.persist();
        }
        Ok(outcome)
    }

    /// Back out of the job board; the day's action is still available.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongPhase`] unless the board is open.
    pub fn leave_job_board(&mut self) -> Result<(), SessionError> {
        self.expect_phase(&[SessionPhase::JobBoard], "leave_job_board")?;
        self.phase = Phase::Planning;
        Ok(())
    }

    /// Pick an offer and start its competition.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSuchOffer`] for an index past the board and
    /// [`SessionError::WrongPhase`] unless the board is open.
    pub fn select_job(&mut self, index: usize) -> Result<TimerId, SessionError> {
        let phase = self.phase();
        let Phase::JobBoard { offers } = &mut self.phase else {
            return Err(SessionError::WrongPhase {
                operation: "select_job",
                phase,
            });
        };
        let Some(job) = offers.get(index).cloned() else {
            return Err(SessionError::NoSuchOffer {
                index,
                available: offers.len(),
            });
        };
        let offers = std::mem::take(offers);
        let competition = start_competition(job, self.rngs.quiz());
        let timer = self.issue_timer();
        self.phase = Phase::Competition {
            offers,
            competition,
            timer,
        };
        Ok(timer)
    }

    /// Pick option `option_index` on the current question.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Quiz`] for an out-of-range option and
    /// [`SessionError::WrongPhase`] when no quiz is running.
    pub fn answer(&mut self, option_index: usize) -> Result<SessionEvent, SessionError> {
        let phase = self.phase();
        let step = match &mut self.phase {
            Phase::Competition { competition, .. } => competition.quiz.answer(option_index)?,
            Phase::Challenge { challenge, .. } => challenge.quiz.answer(option_index)?,
            _ => {
                return Err(SessionError::WrongPhase {
                    operation: "answer",
                    phase,
                });
            }
        };
        Ok(self.after_step(step))
    }

    /// Deliver one countdown tick for `timer`.
    pub fn tick(&mut self, timer: TimerId) -> SessionEvent {
        let step = match &mut self.phase {
            Phase::Competition {
                competition,
                timer: live,
                ..
            } if *live == timer => competition.quiz.tick(),
            Phase::Challenge {
                challenge,
                timer: live,
                ..
            } if *live == timer => challenge.quiz.tick(),
            _ => {
                log::debug!("dropping stale tick for timer {}", timer.get());
                return SessionEvent::StaleTick;
            }
        };
        self.after_step(step)
    }

    /// Walk away from the running quiz back to the board. Nothing is charged.
    ///
    /// The same offer can be picked again right away; it gets fresh questions
    /// and a full countdown.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongPhase`] when no quiz is running.
    pub fn cancel_quiz(&mut self) -> Result<(), SessionError> {
        let phase = self.phase();
        match std::mem::replace(&mut self.phase, Phase::Planning) {
            Phase::Competition { offers, .. } | Phase::Challenge { offers, .. } => {
                log::debug!("quiz cancelled during {phase}");
                self.phase = Phase::JobBoard { offers };
                Ok(())
            }
            other => {
                self.phase = other;
                Err(SessionError::WrongPhase {
                    operation: "cancel_quiz",
                    phase,
                })
            }
        }
    }

    /// Delete the save and start over on day one.
    pub fn restart(&mut self) {
        discard_save(&self.storage);
        self.state = PlayerState::default();
        self.stats = CareerStats::default();
        log::info!("career restarted");
        self.enter_day();
    }

    fn enter_day(&mut self) {
        if self.state.apply_daily_upkeep() {
            self.stats.record_upkeep();
        }
        if let Some(cause) = self.state.check_terminal() {
            self.finish(cause);
            return;
        }
        self.phase = Phase::Planning;
        self.persist();
        log::info!("day {} begins: {}", self.state.day, self.state.stats_line());
    }

    fn after_step(&mut self, step: QuizStep) -> SessionEvent {
        match step {
            QuizStep::Advanced { .. } | QuizStep::Ticked { .. } => SessionEvent::Quiz(step),
            QuizStep::Passed | QuizStep::Failed(_) => self.conclude_quiz(step),
        }
    }

    fn conclude_quiz(&mut self, step: QuizStep) -> SessionEvent {
        match std::mem::replace(&mut self.phase, Phase::Planning) {
            Phase::Competition {
                offers,
                competition,
                timer,
            } => match competition.verdict(&self.state) {
                Some(CompetitionVerdict::Won) => self.resolve(&competition.job, JobAttempt::won()),
                Some(CompetitionVerdict::Lost(_)) => {
                    self.resolve(&competition.job, JobAttempt::lost())
                }
                Some(CompetitionVerdict::Escalate) => {
                    self.stats.record_challenge_entered();
                    let challenge =
                        start_challenge(competition.job, &self.state, self.rngs.quiz());
                    let questions = challenge.quiz.len();
                    let timer = self.issue_timer();
                    self.phase = Phase::Challenge {
                        offers,
                        challenge,
                        timer,
                    };
                    SessionEvent::Escalated { timer, questions }
                }
                None => {
                    self.phase = Phase::Competition {
                        offers,
                        competition,
                        timer,
                    };
                    SessionEvent::Quiz(step)
                }
            },
            Phase::Challenge {
                offers,
                challenge,
                timer,
            } => match challenge.verdict() {
                Some(CompetitionVerdict::Won) => {
                    self.resolve(&challenge.job, JobAttempt::won_challenge())
                }
                Some(_) => self.resolve(&challenge.job, JobAttempt::lost()),
                None => {
                    self.phase = Phase::Challenge {
                        offers,
                        challenge,
                        timer,
                    };
                    SessionEvent::Quiz(step)
                }
            },
            other => {
                self.phase = other;
                SessionEvent::StaleTick
            }
        }
    }

    fn resolve(&mut self, job: &Job, attempt: JobAttempt) -> SessionEvent {
        let result = resolve_job(job, attempt, &mut self.state, self.rngs.outcome());
        self.stats.record_job(&result, &self.state);
        if let Some(cause) = result.game_over {
            self.finish(cause);
        } else {
            self.phase = Phase::DayOver {
                message: result.message(),
            };
            self.persist();
        }
        SessionEvent::Resolved(result)
    }

    fn finish(&mut self, cause: GameOverCause) {
        log::info!(
            "game over on day {}: {cause} ({})",
            self.state.day,
            self.state.stats_line()
        );
        self.phase = Phase::GameOver {
            summary: CareerSummary::new(cause, &self.state, &self.stats),
        };
        self.persist();
    }

    fn issue_timer(&mut self) -> TimerId {
        self.next_timer += 1;
        TimerId(self.next_timer)
    }

    fn expect_phase(
        &self,
        allowed: &[SessionPhase],
        operation: &'static str,
    ) -> Result<(), SessionError> {
        let phase = self.phase();
        if allowed.contains(&phase) {
            Ok(())
        } else {
            Err(SessionError::WrongPhase { operation, phase })
        }
    }

    fn persist(&self) {
        if let Err(err) = self.storage.save_state(SAVE_SLOT, &self.state) {
            log::warn!("could not save day {}: {err}", self.state.day);
        }
    }
}

fn discard_save<S: GameStorage>(storage: &S) {
    if let Err(err) = storage.delete_state(SAVE_SLOT) {
        log::warn!("could not delete save: {err}");
    }
}

/// Text of the game-over card.
#[must_use]
pub fn game_over_message(cause: GameOverCause) -> String {
    format!("\u{1f480} Game Over\n\n{}", cause.reason())
}
