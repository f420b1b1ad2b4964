use freeloop_game::{
    DailyAction, JobAttempt, JobPool, OfferSlot, PlayerState, SkillKind, apply_action,
    challenge_question_count, generate_offers, numbers::round_tenth, required_range, resolve_job,
    storage::{decode_record, encode_record},
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn arb_state() -> impl Strategy<Value = PlayerState> {
    (
        1u32..500,
        0.0f64..=100.0,
        0.0f64..=100.0,
        0.0f64..=100.0,
        0.0f64..10.0,
        0.0f64..20_000.0,
        1u32..=100,
        0u32..3,
    )
        .prop_map(
            |(day, design, dev, qa, stress, money, pc_level, skipped)| PlayerState {
                day,
                design_skill: design,
                dev_skill: dev,
                qa_skill: qa,
                stress,
                money,
                pc_level,
                skipped_job_days: skipped,
                upkeep_paid_day: 0,
            },
        )
}

fn arb_action() -> impl Strategy<Value = DailyAction> {
    prop_oneof![
        Just(DailyAction::FindJob),
        Just(DailyAction::Relax),
        Just(DailyAction::UpgradePc),
        Just(DailyAction::Learn),
    ]
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Action(DailyAction),
    Job(usize, u8),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        arb_action().prop_map(Step::Action),
        (0usize..3, 0u8..3).prop_map(|(slot, how)| Step::Job(slot, how)),
    ]
}

fn in_bounds(state: &PlayerState) -> bool {
    SkillKind::ALL
        .iter()
        .all(|kind| (0.0..=100.0).contains(&state.skill(*kind)))
        && (0.0..=10.0).contains(&state.stress)
        && (1..=100).contains(&state.pc_level)
}

proptest! {
    #[test]
    fn prop_state_stays_in_bounds(
        start in arb_state(),
        steps in prop::collection::vec(arb_step(), 1..60),
        seed in any::<u64>(),
    ) {
        let pool = JobPool::load_from_static();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut state = start;
        for step in steps {
            match step {
                Step::Action(action) => {
                    let _ = apply_action(action, &mut state, &mut rng);
                }
                Step::Job(slot, how) => {
                    let offers = generate_offers(&pool, &state, &mut rng).unwrap();
                    let attempt = match how {
                        0 => JobAttempt::won(),
                        1 => JobAttempt::won_challenge(),
                        _ => JobAttempt::lost(),
                    };
                    let _ = resolve_job(&offers[slot], attempt, &mut state, &mut rng);
                }
            }
            prop_assert!(in_bounds(&state), "{state:?}");
        }
    }

    #[test]
    fn prop_offers_respect_their_bands(state in arb_state(), seed in any::<u64>()) {
        let pool = JobPool::load_from_static();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let offers = generate_offers(&pool, &state, &mut rng).unwrap();
        prop_assert_eq!(offers.len(), 3);
        for (idx, job) in offers.iter().enumerate() {
            let slot = if idx == 0 { OfferSlot::Doable } else { OfferSlot::Market };
            let (min, max) = required_range(slot, state.skill(job.skill));
            prop_assert!(job.required >= min - 1e-9 && job.required <= max + 1e-9,
                "{:?} {} not in [{}, {}]", slot, job.required, min, max);
            prop_assert!((round_tenth(job.required) - job.required).abs() < 1e-9);
        }
        let first = &offers[0];
        prop_assert!(first.required <= state.skill(first.skill).max(1.0) + 1e-9);
    }

    #[test]
    fn prop_results_are_well_formed(
        state in arb_state(),
        required in 1.0f64..=100.0,
        max_pay in 80i64..8_050,
        challenge in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut state = state;
        let job = freeloop_game::Job {
            title: "Prop Gig".to_string(),
            skill: SkillKind::Dev,
            description: String::new(),
            required,
            max_pay,
        };
        let attempt = if challenge { JobAttempt::won_challenge() } else { JobAttempt::won() };
        let result = resolve_job(&job, attempt, &mut state, &mut rng);
        let paid = result.payout.unwrap();
        prop_assert!((0.0..=1.0).contains(&paid.quality));
        prop_assert!(paid.payout >= 0);
        prop_assert!(paid.growth.after <= 100.0);
        prop_assert!(paid.growth.gain > 0.0);
    }

    #[test]
    fn prop_challenge_size_is_monotonic(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let n_small = challenge_question_count(small, 0.0);
        let n_large = challenge_question_count(large, 0.0);
        prop_assert!(n_small <= n_large);
        prop_assert!((5..=8).contains(&n_small) && (5..=8).contains(&n_large));
    }

    #[test]
    fn prop_saves_roundtrip(state in arb_state()) {
        let decoded = decode_record(&encode_record(&state).unwrap()).unwrap();
        prop_assert_eq!(decoded, state);
    }
}
