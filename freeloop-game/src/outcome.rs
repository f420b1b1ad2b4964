//! Job result: payout, bonuses, stress, and skill growth after a job attempt.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::competition::JobAttempt;
use crate::constants::{
    CHALLENGE_BASE_GAIN, GAIN_GAP_DIVISOR, JOB_BASE_GAIN, LOSS_STRESS, PC_BONUS_PER_LEVEL,
    QA_BONUS, QA_BONUS_THRESHOLD, QUALITY_BONUS, QUALITY_BONUS_THRESHOLD, SKILL_MAX, WIN_STRESS,
};
use crate::jobs::Job;
use crate::numbers::{i64_to_f64, round_f64_to_i64, round_to_places};
use crate::state::{GameOverCause, PlayerState, SkillKind};

/// Skill growth awarded for a completed job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillGrowth {
    pub skill: SkillKind,
    pub gain: f64,
    pub before: f64,
    pub after: f64,
    /// `|required - before|` measured on `skill`, which may differ from the job's skill.
    pub skill_gap: f64,
}

/// Everything a completed job paid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayout {
    pub quality: f64,
    pub pc_bonus: f64,
    pub payout: i64,
    pub bonus: i64,
    pub growth: SkillGrowth,
}

/// Result of resolving a job attempt against the player state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub job: Job,
    pub attempt: JobAttempt,
    /// `None` when the attempt failed.
    pub payout: Option<JobPayout>,
    pub stress_delta: f64,
    pub game_over: Option<GameOverCause>,
}

impl JobResult {
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Money credited by this result.
    #[must_use]
    pub fn earned(&self) -> i64 {
        result_earned(self.payout.as_ref())
    }
}

impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(paid) = &self.payout else {
            return write!(
                f,
                "\u{274c} You failed to win the job\nYou earned nothing.\nStress increased."
            );
        };
        write!(
            f,
            "\u{2705} You won and completed the job\nSkill: {}\nWork Quality: {:.0}%\nClient Paid: ${}",
            self.job.skill.tag(),
            paid.quality * 100.0,
            paid.payout
        )?;
        if paid.bonus > 0 {
            write!(f, "\nBonus: +${}", paid.bonus)?;
        }
        write!(
            f,
            "\n+{} {} Skill{}",
            paid.growth.gain,
            paid.growth.skill.tag(),
            if self.attempt.from_skill_challenge {
                " (Bonus)"
            } else {
                ""
            }
        )
    }
}

fn result_earned(payout: Option<&JobPayout>) -> i64 {
    payout.map_or(0, |paid| paid.payout.saturating_add(paid.bonus))
}

/// `1 + pcLevel * 0.05`
#[must_use]
pub fn pc_bonus(pc_level: u32) -> f64 {
    1.0 + f64::from(pc_level) * PC_BONUS_PER_LEVEL
}

/// `min(1, skill / required)`; a non-positive requirement counts as fully met.
#[must_use]
pub fn work_quality(player_skill: f64, required: f64) -> f64 {
    if required <= 0.0 {
        return 1.0;
    }
    (player_skill / required).clamp(0.0, 1.0)
}

/// Quality bonus at 90%+, plus an independent QA bonus at QA 80+.
#[must_use]
pub fn completion_bonus(quality: f64, qa_skill: f64) -> i64 {
    let mut bonus = 0.0;
    if quality >= QUALITY_BONUS_THRESHOLD {
        bonus += QUALITY_BONUS;
    }
    if qa_skill >= QA_BONUS_THRESHOLD {
        bonus += QA_BONUS;
    }
    round_f64_to_i64(bonus)
}

/// `round(base * (1 + gap / 50), 2)` with base 0.3 after a challenge, else 0.1.
#[must_use]
pub fn skill_gain(skill_gap: f64, from_skill_challenge: bool) -> f64 {
    let base = if from_skill_challenge {
        CHALLENGE_BASE_GAIN
    } else {
        JOB_BASE_GAIN
    };
    round_to_places(base * (1.0 + skill_gap / GAIN_GAP_DIVISOR), 2)
}

/// Growth goes to the job's own skill or to QA with equal odds.
pub fn pick_growth_target(job_skill: SkillKind, rng: &mut impl Rng) -> SkillKind {
    if rng.gen_bool(0.5) {
        job_skill
    } else {
        SkillKind::Qa
    }
}

/// Apply a job attempt to the player: money, stress, skill, and the next day.
///
/// The state is mutated in place; the returned [`JobResult`] carries the
/// narrative and a game-over cause if the new state is terminal.
pub fn resolve_job(
    job: &Job,
    attempt: JobAttempt,
    state: &mut PlayerState,
    rng: &mut impl Rng,
) -> JobResult {
    let payout = if attempt.success {
        let paid = pay_out(job, attempt, state, rng);
        state.money += i64_to_f64(paid.payout.saturating_add(paid.bonus));
        state.add_stress(WIN_STRESS);
        Some(paid)
    } else {
        state.add_stress(LOSS_STRESS);
        None
    };
    let stress_delta = if attempt.success {
        WIN_STRESS
    } else {
        LOSS_STRESS
    };

    state.day = state.day.saturating_add(1);
    let game_over = state.check_terminal();
    log::info!(
        "job '{}' resolved: success={} challenge={} earned={} -> {}",
        job.title,
        attempt.success,
        attempt.from_skill_challenge,
        result_earned(payout.as_ref()),
        state.stats_line()
    );

    JobResult {
        job: job.clone(),
        attempt,
        payout,
        stress_delta,
        game_over,
    }
}

fn pay_out(
    job: &Job,
    attempt: JobAttempt,
    state: &mut PlayerState,
    rng: &mut impl Rng,
) -> JobPayout {
    let quality = work_quality(state.skill(job.skill), job.required);
    let pc_bonus = pc_bonus(state.pc_level);
    let payout = round_f64_to_i64(quality * job.max_pay_f64() * pc_bonus).max(0);
    let bonus = completion_bonus(quality, state.qa_skill);

    // The gap is measured on whichever skill was drawn, even QA for a design job.
    let target = pick_growth_target(job.skill, rng);
    let before = state.skill(target);
    let skill_gap = (job.required - before).abs();
    let gain = skill_gain(skill_gap, attempt.from_skill_challenge);
    let after = round_to_places(before + gain, 2).min(SKILL_MAX);
    state.set_skill(target, after);

    JobPayout {
        quality,
        pc_bonus,
        payout,
        bonus,
        growth: SkillGrowth {
            skill: target,
            gain,
            before,
            after: state.skill(target),
            skill_gap,
        },
    }
}
