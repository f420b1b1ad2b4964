use std::fmt;

use freeloop_game::constants::{DAILY_UPKEEP, LEARN_COST, PC_LEVEL_MAX, RELAX_COST};
use freeloop_game::{DailyAction, Job, PlayerState, upgrade_cost};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Choose the day's action. Rejected picks fall back to looking for work.
    fn pick_action(&mut self, state: &PlayerState) -> DailyAction;

    /// Choose one of the offers on the job board.
    fn pick_offer(&mut self, state: &PlayerState, offers: &[Job]) -> usize;
}

/// Built-in play strategies for automated careers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    Grinder,
    Balanced,
    Scholar,
    Random,
}

impl Strategy {
    pub const ALL: [Self; 4] = [Self::Grinder, Self::Balanced, Self::Scholar, Self::Random];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Grinder => "grinder",
            Self::Balanced => "balanced",
            Self::Scholar => "scholar",
            Self::Random => "random",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Grinder => "Grinder",
            Self::Balanced => "Balanced",
            Self::Scholar => "Scholar",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Grinder => "always takes the safe job, relaxes only near burnout",
            Self::Balanced => "keeps stress low, reinvests savings, prefers jobs it qualifies for",
            Self::Scholar => "spends spare cash on courses and chases the best-paying job",
            Self::Random => "uniformly random actions and offers",
        }
    }

    /// Case-insensitive lookup by key.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy> {
        match self {
            Self::Grinder => Box::new(GrinderPolicy),
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Scholar => Box::new(ScholarPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct GrinderPolicy;
struct BalancedPolicy;
struct ScholarPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

/// Cash left after paying for something and surviving `days` of upkeep.
fn can_spend(state: &PlayerState, cost: f64, days: f64) -> bool {
    state.money - cost >= DAILY_UPKEEP * days
}

/// Highest-paying offer the player already qualifies for, else the safe one.
fn best_qualified(state: &PlayerState, offers: &[Job]) -> usize {
    offers
        .iter()
        .enumerate()
        .filter(|(_, job)| job.is_qualified(state))
        .max_by_key(|(_, job)| job.max_pay)
        .map_or(0, |(idx, _)| idx)
}

impl PlayerPolicy for GrinderPolicy {
    fn name(&self) -> &'static str {
        "Grinder"
    }

    fn pick_action(&mut self, state: &PlayerState) -> DailyAction {
        if state.stress >= 8.0 && can_spend(state, RELAX_COST, 1.0) {
            DailyAction::Relax
        } else {
            DailyAction::FindJob
        }
    }

    fn pick_offer(&mut self, _state: &PlayerState, _offers: &[Job]) -> usize {
        0
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn pick_action(&mut self, state: &PlayerState) -> DailyAction {
        if state.stress >= 6.0 && can_spend(state, RELAX_COST, 3.0) {
            return DailyAction::Relax;
        }
        if state.pc_level < PC_LEVEL_MAX && can_spend(state, upgrade_cost(state.pc_level), 30.0)
        {
            return DailyAction::UpgradePc;
        }
        if state.skipped_job_days == 0 && can_spend(state, LEARN_COST, 40.0) {
            return DailyAction::Learn;
        }
        DailyAction::FindJob
    }

    fn pick_offer(&mut self, state: &PlayerState, offers: &[Job]) -> usize {
        best_qualified(state, offers)
    }
}

impl PlayerPolicy for ScholarPolicy {
    fn name(&self) -> &'static str {
        "Scholar"
    }

    fn pick_action(&mut self, state: &PlayerState) -> DailyAction {
        if state.stress >= 7.0 && can_spend(state, RELAX_COST, 2.0) {
            DailyAction::Relax
        } else if state.skipped_job_days < 2 && can_spend(state, LEARN_COST, 5.0) {
            DailyAction::Learn
        } else {
            DailyAction::FindJob
        }
    }

    fn pick_offer(&mut self, _state: &PlayerState, offers: &[Job]) -> usize {
        offers
            .iter()
            .enumerate()
            .max_by_key(|(_, job)| job.max_pay)
            .map_or(0, |(idx, _)| idx)
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn pick_action(&mut self, _state: &PlayerState) -> DailyAction {
        DailyAction::ALL
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(DailyAction::FindJob)
    }

    fn pick_offer(&mut self, _state: &PlayerState, offers: &[Job]) -> usize {
        if offers.is_empty() {
            0
        } else {
            self.rng.gen_range(0..offers.len())
        }
    }
}
