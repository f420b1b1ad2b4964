//! Job board: turns the template pool into three offers scaled to the player.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::constants::{
    JOB_DESCRIPTION, MARKET_MAX_FACTOR, MARKET_MIN_FACTOR, OFFERS_PER_BOARD, PAY_JITTER_MAX,
    PAY_PER_REQUIRED, REQUIRED_CEILING, REQUIRED_FLOOR,
};
use crate::data::{JobPool, JobTemplate};
use crate::numbers::{ceil_tenth, floor_tenth, i64_to_f64, round_f64_to_i64, round_tenth};
use crate::state::{PlayerState, SkillKind};

/// A concrete, ephemeral offer on today's board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    pub skill: SkillKind,
    pub description: String,
    /// Skill level the client asks for, one decimal.
    pub required: f64,
    pub max_pay: i64,
}

impl Job {
    #[must_use]
    pub fn max_pay_f64(&self) -> f64 {
        i64_to_f64(self.max_pay)
    }

    /// Whether the player can take this job without a skill challenge.
    #[must_use]
    pub fn is_qualified(&self, state: &PlayerState) -> bool {
        state.skill(self.skill) >= self.required
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | Skill: {} | Required: {:.1} | Max Pay: ${}",
            self.title,
            self.skill.tag(),
            self.required,
            self.max_pay
        )
    }
}

/// Errors raised while filling a job board.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobBoardError {
    #[error("job pool has {available} distinct templates, a board needs {needed}")]
    NotEnoughTemplates { needed: usize, available: usize },
}

/// Which pricing rule an offer slot follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferSlot {
    /// Requirement drawn from `[1, max(1, skill)]` so one fair job always exists.
    Doable,
    /// Requirement drawn from 80%..150% of the player's skill.
    Market,
}

/// Inclusive requirement band for a slot, already bounded to `[1, 100]`.
#[must_use]
pub fn required_range(slot: OfferSlot, player_skill: f64) -> (f64, f64) {
    match slot {
        OfferSlot::Doable => (REQUIRED_FLOOR, REQUIRED_FLOOR.max(player_skill)),
        OfferSlot::Market => {
            let min = REQUIRED_FLOOR.max(player_skill * MARKET_MIN_FACTOR);
            let max = REQUIRED_CEILING.min(player_skill * MARKET_MAX_FACTOR);
            // Below 2/3 skill the market band inverts; collapse it onto the floor.
            (min, max.max(min))
        }
    }
}

/// Draw a one-decimal requirement that stays inside the slot's band.
pub fn draw_required(slot: OfferSlot, player_skill: f64, rng: &mut impl Rng) -> f64 {
    let (min, max) = required_range(slot, player_skill);
    let raw = if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    };
    let mut required = round_tenth(raw);
    if required > max {
        required = floor_tenth(max);
    }
    if required < min {
        required = ceil_tenth(min);
    }
    required
}

/// `round(required * 80 + randint(0, 50))`
pub fn draw_max_pay(required: f64, rng: &mut impl Rng) -> i64 {
    let jitter = rng.gen_range(0..=PAY_JITTER_MAX);
    round_f64_to_i64(required * PAY_PER_REQUIRED + f64::from(jitter))
}

/// Build one offer from a template.
pub fn generate_job(
    template: &JobTemplate,
    slot: OfferSlot,
    state: &PlayerState,
    rng: &mut impl Rng,
) -> Job {
    let player_skill = state.skill(template.skill);
    let required = draw_required(slot, player_skill, rng);
    let max_pay = draw_max_pay(required, rng);
    Job {
        title: template.title.clone(),
        skill: template.skill,
        description: JOB_DESCRIPTION.to_string(),
        required,
        max_pay,
    }
}

/// Shuffle the pool and price the first three distinct templates.
///
/// Reads `state` only; nothing is mutated until a competition resolves.
///
/// # Errors
///
/// Returns [`JobBoardError::NotEnoughTemplates`] when the pool cannot supply
/// three distinct templates.
pub fn generate_offers(
    pool: &JobPool,
    state: &PlayerState,
    rng: &mut impl Rng,
) -> Result<Vec<Job>, JobBoardError> {
    let mut templates = pool.distinct();
    if templates.len() < OFFERS_PER_BOARD {
        return Err(JobBoardError::NotEnoughTemplates {
            needed: OFFERS_PER_BOARD,
            available: templates.len(),
        });
    }
    templates.shuffle(rng);

    let offers: Vec<Job> = templates
        .into_iter()
        .take(OFFERS_PER_BOARD)
        .enumerate()
        .map(|(idx, template)| {
            let slot = if idx == 0 {
                OfferSlot::Doable
            } else {
                OfferSlot::Market
            };
            generate_job(template, slot, state, rng)
        })
        .collect();
    log::debug!(
        "job board for day {}: {:?}",
        state.day,
        offers
            .iter()
            .map(|job| (job.title.as_str(), job.required))
            .collect::<Vec<_>>()
    );
    Ok(offers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn template(title: &str, skill: SkillKind) -> JobTemplate {
        JobTemplate {
            title: title.to_string(),
            skill,
        }
    }

    #[test]
    fn board_has_three_distinct_offers() {
        let pool = JobPool::load_from_static();
        let state = PlayerState::default();
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let offers = generate_offers(&pool, &state, &mut rng).unwrap();
        assert_eq!(offers.len(), 3);
        assert_ne!(offers[0].title, offers[1].title);
        assert_ne!(offers[1].title, offers[2].title);
        assert_ne!(offers[0].title, offers[2].title);
    }

    #[test]
    fn first_offer_is_always_doable() {
        let pool = JobPool::load_from_static();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        for skill in [0.0, 0.4, 1.0, 3.06, 17.33, 64.0, 100.0] {
            let state = PlayerState {
                design_skill: skill,
                dev_skill: skill,
                qa_skill: skill,
                ..PlayerState::default()
            };
            for _ in 0..50 {
                let offers = generate_offers(&pool, &state, &mut rng).unwrap();
                let first = &offers[0];
                assert!(first.required >= 1.0);
                assert!(first.required <= skill.max(1.0) + 1e-9, "{skill} -> {first:?}");
            }
        }
    }

    #[test]
    fn market_offers_stay_in_band() {
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        for skill in [0.5, 0.9, 1.0, 1.3, 10.0, 80.0, 99.9] {
            let (min, max) = required_range(OfferSlot::Market, skill);
            for _ in 0..200 {
                let required = draw_required(OfferSlot::Market, skill, &mut rng);
                assert!(required >= min - 1e-9 && required <= max + 1e-9, "{skill}: {required}");
                assert!((required * 10.0 - (required * 10.0).round()).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn inverted_market_band_collapses_to_floor() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert_eq!(required_range(OfferSlot::Market, 0.5), (1.0, 1.0));
        assert!((draw_required(OfferSlot::Market, 0.5, &mut rng) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pay_tracks_requirement() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        for _ in 0..100 {
            let pay = draw_max_pay(12.5, &mut rng);
            assert!((1000..=1050).contains(&pay));
        }
    }

    #[test]
    fn small_pool_is_rejected() {
        let pool = JobPool::from_templates(vec![
            template("One", SkillKind::Dev),
            template("Two", SkillKind::Qa),
            template("One", SkillKind::Dev),
        ]);
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert_eq!(
            generate_offers(&pool, &PlayerState::default(), &mut rng),
            Err(JobBoardError::NotEnoughTemplates {
                needed: 3,
                available: 2
            })
        );
    }

    #[test]
    fn board_generation_does_not_touch_state() {
        let pool = JobPool::load_from_static();
        let state = PlayerState {
            dev_skill: 22.0,
            ..PlayerState::default()
        };
        let snapshot = state.clone();
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let _ = generate_offers(&pool, &state, &mut rng).unwrap();
        assert_eq!(state, snapshot);
    }
}
