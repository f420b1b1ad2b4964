use anyhow::{Context, Result, bail};
use freeloop_game::constants::{
    OFFERS_PER_BOARD, PC_LEVEL_MAX, PC_LEVEL_MIN, SKILL_MAX, SKILL_MIN, STRESS_MAX, STRESS_MIN,
};
use freeloop_game::{
    CareerStats, DailyAction, FreelanceSession, GameOverCause, GameStorage, Job, JobPool,
    MemoryStorage, OfferSlot, PlayerState, SessionError, SessionPhase, SkillKind, required_range,
};
use serde::Serialize;
use thiserror::Error;

use super::policy::{PlayerPolicy, Strategy};
use super::quiz_player::{QuizPlayer, QuizProfile};

const POLICY_STREAM: u64 = 0x504F_4C49_4359;
const PLAYER_STREAM: u64 = 0x504C_4159_4552;
const STEPS_PER_DAY: u32 = 64;

/// Configuration for one simulated career.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: Strategy,
    pub max_days: u32,
    pub quiz: QuizProfile,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(strategy: Strategy, seed: u64) -> Self {
        Self {
            seed,
            strategy,
            max_days: 365,
            quiz: QuizProfile::default(),
        }
    }

    #[must_use]
    pub const fn with_max_days(mut self, max_days: u32) -> Self {
        self.max_days = max_days;
        self
    }

    #[must_use]
    pub const fn with_quiz(mut self, quiz: QuizProfile) -> Self {
        self.quiz = quiz;
        self
    }
}

/// A broken rule spotted while a career was running.
#[derive(Debug, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("{skill} skill out of range: {value}")]
    Skill { skill: SkillKind, value: f64 },
    #[error("stress out of range: {0}")]
    Stress(f64),
    #[error("PC level out of range: {0}")]
    PcLevel(u32),
    #[error("money negative while still playing: {0}")]
    Money(f64),
    #[error("day moved from {before} to {after}")]
    Day { before: u32, after: u32 },
    #[error("job board shows {0} offers")]
    BoardSize(usize),
    #[error("offer {index} requires {required}, outside [{min}, {max}]")]
    OfferBand {
        index: usize,
        required: f64,
        min: f64,
        max: f64,
    },
}

/// Final tally of one career.
#[derive(Debug, Clone, Serialize)]
pub struct CareerRecord {
    pub strategy: String,
    pub seed: u64,
    pub run_code: String,
    pub final_day: u32,
    /// `None` when the career hit the day cap.
    pub ended_by: Option<GameOverCause>,
    pub final_state: PlayerState,
    pub stats: CareerStats,
    pub rejected_actions: u32,
    pub answers: u32,
    pub ticks_waited: u32,
    pub challenge_questions: usize,
    pub rng_draws: u64,
}

impl CareerRecord {
    #[must_use]
    pub const fn survived(&self) -> bool {
        self.ended_by.is_none()
    }
}

/// Check the state-range rules that must hold after every step.
///
/// # Errors
///
/// Returns the first rule the state breaks.
pub fn check_state(state: &PlayerState, playing: bool) -> Result<(), InvariantViolation> {
    for skill in SkillKind::ALL {
        let value = state.skill(skill);
        if !(SKILL_MIN..=SKILL_MAX).contains(&value) {
            return Err(InvariantViolation::Skill { skill, value });
        }
    }
    if !(STRESS_MIN..=STRESS_MAX).contains(&state.stress) {
        return Err(InvariantViolation::Stress(state.stress));
    }
    if !(PC_LEVEL_MIN..=PC_LEVEL_MAX).contains(&state.pc_level) {
        return Err(InvariantViolation::PcLevel(state.pc_level));
    }
    if playing && state.money < 0.0 {
        return Err(InvariantViolation::Money(state.money));
    }
    Ok(())
}

/// Check the board shape and each offer's required-skill band.
///
/// # Errors
///
/// Returns the first offer that breaks its band.
pub fn check_offers(state: &PlayerState, offers: &[Job]) -> Result<(), InvariantViolation> {
    if offers.len() != OFFERS_PER_BOARD {
        return Err(InvariantViolation::BoardSize(offers.len()));
    }
    for (index, job) in offers.iter().enumerate() {
        let slot = if index == 0 {
            OfferSlot::Doable
        } else {
            OfferSlot::Market
        };
        let (min, max) = required_range(slot, state.skill(job.skill));
        if job.required < min - 1e-9 || job.required > max + 1e-9 {
            return Err(InvariantViolation::OfferBand {
                index,
                required: job.required,
                min,
                max,
            });
        }
    }
    Ok(())
}

/// Play one career to game over or the day cap.
///
/// # Errors
///
/// Returns an error when a rule is broken, the session refuses a legal
/// move, or the career stops making progress.
pub fn run_career(pool: &JobPool, config: &SimulationConfig) -> Result<CareerRecord> {
    let mut session = FreelanceSession::new_career(pool.clone(), MemoryStorage::new(), config.seed);
    let mut policy = config.strategy.create_policy(config.seed ^ POLICY_STREAM);
    let mut player = QuizPlayer::new(config.quiz, config.seed ^ PLAYER_STREAM);
    let mut tally = Tally::default();

    let step_limit = config.max_days.saturating_mul(STEPS_PER_DAY);
    let mut steps = 0u32;
    while session.phase() != SessionPhase::GameOver && session.state().day <= config.max_days {
        steps += 1;
        if steps > step_limit {
            bail!(
                "career stalled on day {} in {}",
                session.state().day,
                session.phase()
            );
        }
        let day_before = session.state().day;
        step(&mut session, policy.as_mut(), &mut player, &mut tally)
            .with_context(|| format!("day {day_before}"))?;

        let state = session.state();
        let playing = session.phase() != SessionPhase::GameOver;
        check_state(state, playing).with_context(|| format!("after day {day_before}"))?;
        if state.day < day_before || state.day > day_before + 1 {
            return Err(InvariantViolation::Day {
                before: day_before,
                after: state.day,
            }
            .into());
        }
    }

    log::debug!(
        "{} career {} ended on day {}",
        policy.name(),
        session.run_code(),
        session.state().day
    );
    Ok(CareerRecord {
        strategy: config.strategy.label().to_string(),
        seed: config.seed,
        run_code: session.run_code(),
        final_day: session.state().day,
        ended_by: session.summary().map(|summary| summary.cause),
        final_state: session.state().clone(),
        stats: session.stats().clone(),
        rejected_actions: tally.rejected_actions,
        answers: tally.answers,
        ticks_waited: tally.ticks_waited,
        challenge_questions: tally.challenge_questions,
        rng_draws: session.rng_draws(),
    })
}

#[derive(Debug, Default)]
struct Tally {
    rejected_actions: u32,
    answers: u32,
    ticks_waited: u32,
    challenge_questions: usize,
}

fn step<S: GameStorage>(
    session: &mut FreelanceSession<S>,
    policy: &mut dyn PlayerPolicy,
    player: &mut QuizPlayer,
    tally: &mut Tally,
) -> Result<()> {
    match session.phase() {
        SessionPhase::Planning => {
            let action = policy.pick_action(session.state());
            match session.apply_action(action) {
                Ok(_) => {}
                Err(SessionError::Rejected(rejection)) => {
                    log::debug!("{} fell back to job hunting: {rejection}", policy.name());
                    tally.rejected_actions += 1;
                    session.apply_action(DailyAction::FindJob)?;
                }
                Err(err) => return Err(err.into()),
            }
        }
        SessionPhase::JobBoard => {
            let offers = session.offers().context("job board without offers")?;
            check_offers(session.state(), offers)?;
            let pick = policy.pick_offer(session.state(), offers);
            let timer = session.select_job(pick)?;
            let run = player.play(session, timer)?;
            tally.answers += run.answers;
            tally.ticks_waited += run.ticks_waited;
            tally.challenge_questions += run.challenge_questions.unwrap_or(0);
            log::debug!(
                "{} took \"{}\": {}",
                policy.name(),
                run.result.job.title,
                if run.result.attempt.success { "won" } else { "lost" }
            );
        }
        SessionPhase::DayOver => {
            session.continue_day()?;
        }
        phase @ (SessionPhase::Competition | SessionPhase::Challenge) => {
            bail!("quiz left running in {phase}");
        }
        SessionPhase::GameOver => {}
    }
    Ok(())
}
