use anyhow::{Result, bail};
use freeloop_game::{FreelanceSession, GameStorage, JobResult, QuizStep, SessionEvent, TimerId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// How a simulated player handles arithmetic questions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizProfile {
    /// Chance of picking the right option on any question.
    pub accuracy: f64,
    /// Upper bound on ticks spent thinking before answering.
    pub reaction_ticks: u8,
}

impl QuizProfile {
    #[must_use]
    pub fn new(accuracy: f64, reaction_ticks: u8) -> Self {
        Self {
            accuracy: accuracy.clamp(0.0, 1.0),
            reaction_ticks,
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn perfect() -> Self {
        Self::new(1.0, 0)
    }
}

impl Default for QuizProfile {
    fn default() -> Self {
        Self::new(0.9, 4)
    }
}

/// What happened between picking an offer and the job result.
#[derive(Debug, Clone)]
pub struct QuizRun {
    pub answers: u32,
    pub ticks_waited: u32,
    pub challenge_questions: Option<usize>,
    pub result: JobResult,
}

/// Plays quizzes through the session, answering and ticking like a person would.
pub struct QuizPlayer {
    profile: QuizProfile,
    rng: ChaCha20Rng,
}

impl QuizPlayer {
    #[must_use]
    pub fn new(profile: QuizProfile, seed: u64) -> Self {
        Self {
            profile,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Drive the running quiz, and any challenge it escalates into, to a result.
    ///
    /// # Errors
    ///
    /// Fails when the session stops offering a quiz mid-run, reports the live
    /// timer as stale, or rejects an answer.
    pub fn play<S: GameStorage>(
        &mut self,
        session: &mut FreelanceSession<S>,
        timer: TimerId,
    ) -> Result<QuizRun> {
        let mut timer = timer;
        let mut answers = 0;
        let mut ticks_waited = 0;
        let mut challenge_questions = None;

        loop {
            let Some((quiz, live)) = session.active_quiz() else {
                bail!("no quiz running during {}", session.phase());
            };
            if live != timer {
                bail!("quiz timer moved from {} to {}", timer.get(), live.get());
            }
            let Some(question) = quiz.current() else {
                bail!("quiz in {} has no current question", session.phase());
            };
            let correct = question.correct_index();
            let options = question.options.len();

            let delay = self.rng.gen_range(0..=self.profile.reaction_ticks);
            let mut event = None;
            for _ in 0..delay {
                ticks_waited += 1;
                match session.tick(timer) {
                    SessionEvent::Quiz(QuizStep::Ticked { .. }) => {}
                    other => {
                        event = Some(other);
                        break;
                    }
                }
            }
            let event = match event {
                Some(event) => event,
                None => {
                    answers += 1;
                    session.answer(self.pick(correct, options))?
                }
            };

            match event {
                SessionEvent::Resolved(result) => {
                    return Ok(QuizRun {
                        answers,
                        ticks_waited,
                        challenge_questions,
                        result,
                    });
                }
                SessionEvent::Escalated {
                    timer: next,
                    questions,
                } => {
                    log::debug!("escalated to a {questions}-question challenge");
                    timer = next;
                    challenge_questions = Some(questions);
                }
                SessionEvent::Quiz(_) => {}
                SessionEvent::StaleTick => bail!("live timer {} reported stale", timer.get()),
            }
        }
    }

    fn pick(&mut self, correct: usize, options: usize) -> usize {
        if options < 2 || self.rng.gen_bool(self.profile.accuracy) {
            correct
        } else {
            (correct + self.rng.gen_range(1..options)) % options
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freeloop_game::{DailyAction, JobPool, MemoryStorage, SessionPhase};

    fn board_session(seed: u64) -> FreelanceSession<MemoryStorage> {
        let mut session =
            FreelanceSession::new_career(JobPool::load_from_static(), MemoryStorage::new(), seed);
        session.apply_action(DailyAction::FindJob).unwrap();
        session
    }

    #[test]
    fn perfect_player_wins_the_doable_job() {
        let mut session = board_session(21);
        let timer = session.select_job(0).unwrap();
        let run = QuizPlayer::new(QuizProfile::perfect(), 1)
            .play(&mut session, timer)
            .unwrap();
        assert!(run.result.attempt.success);
        assert_eq!(run.ticks_waited, 0);
        assert_eq!(run.answers, 3);
        assert!(run.challenge_questions.is_none());
        assert_eq!(session.phase(), SessionPhase::DayOver);
    }

    #[test]
    fn hopeless_player_loses_on_the_first_answer() {
        let mut session = board_session(22);
        let timer = session.select_job(0).unwrap();
        let run = QuizPlayer::new(QuizProfile::new(0.0, 0), 2)
            .play(&mut session, timer)
            .unwrap();
        assert!(!run.result.attempt.success);
        assert_eq!(run.answers, 1);
    }

    #[test]
    fn slow_player_times_out() {
        let mut session = board_session(23);
        let timer = session.select_job(0).unwrap();
        let mut player = QuizPlayer::new(QuizProfile::new(1.0, u8::MAX), 3);
        let mut run = player.play(&mut session, timer).unwrap();
        // A slow draw can still land under the timer; keep going until one doesn't.
        let mut guard = 0;
        while run.result.attempt.success && session.phase() != SessionPhase::GameOver {
            guard += 1;
            assert!(guard < 50);
            session.continue_day().unwrap();
            session.apply_action(DailyAction::FindJob).unwrap();
            let timer = session.select_job(0).unwrap();
            run = player.play(&mut session, timer).unwrap();
        }
        assert!(!run.result.attempt.success);
        assert!(run.ticks_waited >= 10);
    }

    #[test]
    fn accuracy_is_clamped() {
        assert!((QuizProfile::new(3.0, 1).accuracy - 1.0).abs() < f64::EPSILON);
        assert!(QuizProfile::new(-1.0, 1).accuracy.abs() < f64::EPSILON);
    }
}
