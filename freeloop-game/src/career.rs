//! Per-session career counters and the summary shown at game over.
use serde::{Deserialize, Serialize};

use crate::actions::{ActionEffect, ActionOutcome};
use crate::constants::{DAILY_UPKEEP, LEARN_COST, RELAX_COST};
use crate::outcome::JobResult;
use crate::state::{GameOverCause, PlayerState};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerStats {
    pub days_played: u32,
    pub relax_days: u32,
    pub upgrades: u32,
    pub courses: u32,
    pub jobs_won: u32,
    pub jobs_lost: u32,
    pub challenges_entered: u32,
    pub challenges_won: u32,
    pub money_earned: i64,
    pub money_spent: f64,
    pub skill_decays: u32,
    pub peak_money: f64,
}

impl CareerStats {
    #[must_use]
    pub const fn jobs_attempted(&self) -> u32 {
        self.jobs_won + self.jobs_lost
    }

    /// Share of attempted jobs that paid out, `0.0` before the first attempt.
    #[must_use]
    pub fn job_win_rate(&self) -> f64 {
        match self.jobs_attempted() {
            0 => 0.0,
            attempted => f64::from(self.jobs_won) / f64::from(attempted),
        }
    }

    pub fn record_upkeep(&mut self) {
        self.money_spent += DAILY_UPKEEP;
    }

    pub fn record_action(&mut self, outcome: &ActionOutcome, state: &PlayerState) {
        match outcome.effect {
            ActionEffect::JobHunt => return,
            ActionEffect::Relaxed => {
                self.relax_days += 1;
                self.money_spent += RELAX_COST;
            }
            ActionEffect::Upgraded { cost, .. } => {
                self.upgrades += 1;
                self.money_spent += cost;
            }
            ActionEffect::Learned { .. } => {
                self.courses += 1;
                self.money_spent += LEARN_COST;
            }
        }
        if outcome.decay.is_some() {
            self.skill_decays += 1;
        }
        self.end_day(state);
    }

    pub const fn record_challenge_entered(&mut self) {
        self.challenges_entered += 1;
    }

    pub fn record_job(&mut self, result: &JobResult, state: &PlayerState) {
        if result.attempt.success {
            self.jobs_won += 1;
            self.money_earned += result.earned();
            if result.attempt.from_skill_challenge {
                self.challenges_won += 1;
            }
        } else {
            self.jobs_lost += 1;
        }
        self.end_day(state);
    }

    fn end_day(&mut self, state: &PlayerState) {
        self.days_played += 1;
        self.peak_money = self.peak_money.max(state.money);
    }
}

/// Everything worth showing once a career has ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerSummary {
    pub cause: GameOverCause,
    pub final_day: u32,
    pub final_state: PlayerState,
    pub stats: CareerStats,
}

impl CareerSummary {
    #[must_use]
    pub fn new(cause: GameOverCause, state: &PlayerState, stats: &CareerStats) -> Self {
        Self {
            cause,
            final_day: state.day,
            final_state: state.clone(),
            stats: stats.clone(),
        }
    }

    /// Multi-line recap for the game-over screen.
    #[must_use]
    pub fn headline(&self) -> String {
        format!(
            "Game Over\n\n{}\n\nDays survived: {}\nJobs won: {}/{}\nMoney earned: ${}",
            self.cause.reason(),
            self.final_day,
            self.stats.jobs_won,
            self.stats.jobs_attempted(),
            self.stats.money_earned
        )
    }
}
