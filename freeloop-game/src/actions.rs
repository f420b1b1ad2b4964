//! The four daily actions and the neglect/terminal checks that follow them.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{
    LEARN_COST, LEARN_GAIN_MAX, LEARN_GAIN_MIN, PC_LEVEL_MAX, RELAX_COST, RELAX_STRESS_RELIEF,
    SKILL_MAX, UPGRADE_COST_PER_LEVEL,
};
use crate::numbers::round_to_places;
use crate::state::{GameOverCause, PlayerState, SkillDecay, SkillKind};

/// One card on the day view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyAction {
    FindJob,
    Relax,
    UpgradePc,
    Learn,
}

impl DailyAction {
    pub const ALL: [Self; 4] = [Self::FindJob, Self::Relax, Self::UpgradePc, Self::Learn];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FindJob => "find_job",
            Self::Relax => "relax",
            Self::UpgradePc => "upgrade_pc",
            Self::Learn => "learn",
        }
    }
}

impl fmt::Display for DailyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DailyAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "find_job" | "job" => Ok(Self::FindJob),
            "relax" => Ok(Self::Relax),
            "upgrade_pc" | "upgrade" => Ok(Self::UpgradePc),
            "learn" => Ok(Self::Learn),
            _ => Err(()),
        }
    }
}

/// A daily action whose precondition does not hold. State is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ActionRejection {
    #[error("You can't afford to relax today. Maybe tomorrow.")]
    CannotAffordRelax,
    #[error("Your PC is already at the highest level. Nothing more to upgrade.")]
    PcMaxed,
    #[error("You need ${cost} to upgrade to level {next_level}. Try again later.")]
    CannotAffordUpgrade { cost: f64, next_level: u32 },
    #[error("You don't have $100 to invest in learning today.")]
    CannotAffordLearn,
}

/// What an accepted action did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ActionEffect {
    /// Skipped-day counter reset; the job board takes over.
    JobHunt,
    Relaxed,
    Upgraded { level: u32, cost: f64 },
    Learned { skill: SkillKind, gain: f64 },
}

impl fmt::Display for ActionEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JobHunt => f.write_str("Time to find some work."),
            Self::Relaxed => write!(
                f,
                "You decided to take the day off and unwind. Stress decreased by {RELAX_STRESS_RELIEF}."
            ),
            Self::Upgraded { level, .. } => {
                write!(f, "Upgrade successful! Your PC is now level {level}.")
            }
            Self::Learned { skill, gain } => write!(
                f,
                "You took a course in {}. Skill increased by +{gain}.",
                skill.course_name()
            ),
        }
    }
}

/// Result of an accepted daily action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub action: DailyAction,
    pub effect: ActionEffect,
    pub decay: Option<SkillDecay>,
    pub game_over: Option<GameOverCause>,
}

impl ActionOutcome {
    /// Whether the action consumed the day.
    #[must_use]
    pub const fn ends_day(&self) -> bool {
        !matches!(self.effect, ActionEffect::JobHunt)
    }

    /// The one message to show: game over, then decay, then the action's own.
    #[must_use]
    pub fn message(&self) -> String {
        if let Some(cause) = self.game_over {
            return cause.reason().to_string();
        }
        if let Some(decay) = &self.decay {
            return decay.message();
        }
        self.effect.to_string()
    }
}

/// `(pcLevel + 1) * 100`
#[must_use]
pub fn upgrade_cost(pc_level: u32) -> f64 {
    f64::from(pc_level.saturating_add(1)) * UPGRADE_COST_PER_LEVEL
}

/// Check and apply one daily action.
///
/// Day-consuming actions advance the day and bump the skipped-day counter,
/// then run the neglect decay check and the game-over check.
///
/// # Errors
///
/// Returns an [`ActionRejection`] when the precondition fails; `state` is not modified.
pub fn apply_action(
    action: DailyAction,
    state: &mut PlayerState,
    rng: &mut impl Rng,
) -> Result<ActionOutcome, ActionRejection> {
    let effect = match action {
        DailyAction::FindJob => {
            state.skipped_job_days = 0;
            return Ok(ActionOutcome {
                action,
                effect: ActionEffect::JobHunt,
                decay: None,
                game_over: None,
            });
        }
        DailyAction::Relax => relax(state)?,
        DailyAction::UpgradePc => upgrade_pc(state)?,
        DailyAction::Learn => learn(state, rng)?,
    };
    state.day = state.day.saturating_add(1);
    state.skipped_job_days = state.skipped_job_days.saturating_add(1);

    let decay = state.apply_skill_decay(rng);
    let game_over = state.check_terminal();
    log::info!("action {action} applied -> {}", state.stats_line());
    Ok(ActionOutcome {
        action,
        effect,
        decay,
        game_over,
    })
}

fn relax(state: &mut PlayerState) -> Result<ActionEffect, ActionRejection> {
    if state.money < RELAX_COST {
        return Err(ActionRejection::CannotAffordRelax);
    }
    state.money -= RELAX_COST;
    state.add_stress(-RELAX_STRESS_RELIEF);
    Ok(ActionEffect::Relaxed)
}

fn upgrade_pc(state: &mut PlayerState) -> Result<ActionEffect, ActionRejection> {
    if state.pc_level >= PC_LEVEL_MAX {
        return Err(ActionRejection::PcMaxed);
    }
    let cost = upgrade_cost(state.pc_level);
    if state.money < cost {
        return Err(ActionRejection::CannotAffordUpgrade {
            cost,
            next_level: state.pc_level + 1,
        });
    }
    state.money -= cost;
    state.pc_level += 1;
    Ok(ActionEffect::Upgraded {
        level: state.pc_level,
        cost,
    })
}

fn learn(state: &mut PlayerState, rng: &mut impl Rng) -> Result<ActionEffect, ActionRejection> {
    if state.money < LEARN_COST {
        return Err(ActionRejection::CannotAffordLearn);
    }
    let skill = SkillKind::random(rng);
    let gain = round_to_places(rng.gen_range(LEARN_GAIN_MIN..=LEARN_GAIN_MAX), 2);
    let next = round_to_places(state.skill(skill) + gain, 2).min(SKILL_MAX);
    state.set_skill(skill, next);
    state.money -= LEARN_COST;
    Ok(ActionEffect::Learned { skill, gain })
}
