//! Timed multiple-choice arithmetic quizzes.
//!
//! A [`QuizSession`] is a small state machine: each question is shown with a
//! fresh [`Countdown`]; a correct pick advances, a wrong pick or an expired
//! countdown fails the whole session at once. Time is measured in ticks
//! delivered by an external driver through [`QuizSession::tick`]; the quiz
//! never looks at a wall clock.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

use crate::constants::{
    CHALLENGE_MAX_QUESTIONS, CHALLENGE_OPERAND_MAX, CHALLENGE_OPERAND_MIN, CHALLENGE_TICKS,
    COMPETITION_OPERAND_MAX, COMPETITION_OPERAND_MIN, COMPETITION_QUESTIONS, COMPETITION_TICKS,
    FAR_OFFSET_MAX, FAR_OFFSET_MIN, NEAR_OFFSET_MAX, NEAR_OFFSET_MIN, OPTIONS_PER_QUESTION,
};

/// Question storage sized for the longest skill challenge.
pub type QuestionList = SmallVec<[Question; CHALLENGE_MAX_QUESTIONS]>;

/// The fixed operator set; evaluated with a plain match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Sub,
    Mul,
}

impl Operator {
    pub const ALL: [Self; 3] = [Self::Add, Self::Sub, Self::Mul];

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
        }
    }

    #[must_use]
    pub const fn apply(self, lhs: i32, rhs: i32) -> i32 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
        }
    }
}

/// One arithmetic prompt with four answer buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub lhs: i32,
    pub rhs: i32,
    pub operator: Operator,
    pub answer: i32,
    pub options: [i32; OPTIONS_PER_QUESTION],
}

impl Question {
    /// Roll operands and operator, then build the shuffled option set
    /// `{answer, answer+[1,3], answer-[1,3], answer+[4,6]}`.
    pub fn generate(operand_min: i32, operand_max: i32, rng: &mut impl Rng) -> Self {
        let lhs = rng.gen_range(operand_min..=operand_max);
        let rhs = rng.gen_range(operand_min..=operand_max);
        let operator = Operator::ALL[rng.gen_range(0..Operator::ALL.len())];
        let answer = operator.apply(lhs, rhs);
        let mut options = [
            answer,
            answer + rng.gen_range(NEAR_OFFSET_MIN..=NEAR_OFFSET_MAX),
            answer - rng.gen_range(NEAR_OFFSET_MIN..=NEAR_OFFSET_MAX),
            answer + rng.gen_range(FAR_OFFSET_MIN..=FAR_OFFSET_MAX),
        ];
        options.shuffle(rng);
        Self {
            lhs,
            rhs,
            operator,
            answer,
            options,
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        format!("{} {} {}", self.lhs, self.operator.symbol(), self.rhs)
    }

    /// Index of the first option equal to the answer.
    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.options
            .iter()
            .position(|option| *option == self.answer)
            .unwrap_or(0)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Shape of a quiz: how many questions, operand range, and per-question timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfig {
    pub questions: usize,
    pub operand_min: i32,
    pub operand_max: i32,
    pub ticks_per_question: u8,
}

impl QuizConfig {
    /// Proposal round that decides whether the client picks the player.
    #[must_use]
    pub const fn competition() -> Self {
        Self {
            questions: COMPETITION_QUESTIONS,
            operand_min: COMPETITION_OPERAND_MIN,
            operand_max: COMPETITION_OPERAND_MAX,
            ticks_per_question: COMPETITION_TICKS,
        }
    }

    /// Escalation round with `question_count` questions on a shorter timer.
    #[must_use]
    pub const fn challenge(question_count: usize) -> Self {
        Self {
            questions: question_count,
            operand_min: CHALLENGE_OPERAND_MIN,
            operand_max: CHALLENGE_OPERAND_MAX,
            ticks_per_question: CHALLENGE_TICKS,
        }
    }
}

/// Per-question timer measured in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    start: u8,
    remaining: u8,
}

impl Countdown {
    #[must_use]
    pub const fn new(ticks: u8) -> Self {
        Self {
            start: ticks,
            remaining: ticks,
        }
    }

    pub const fn reset(&mut self) {
        self.remaining = self.start;
    }

    /// Decrement once; returns `true` when the countdown has run out.
    pub const fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }

    #[must_use]
    pub const fn remaining(&self) -> u8 {
        self.remaining
    }
}

/// Why a quiz session ended in failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    WrongAnswer,
    Timeout,
}

/// Lifecycle of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    Active,
    Passed,
    Failed(FailReason),
}

impl QuizStatus {
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// What a single input (answer or tick) did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStep {
    /// Correct answer; the next question is now shown with a fresh timer.
    Advanced { question: usize },
    /// Tick consumed; time left on the current question.
    Ticked { remaining: u8 },
    Passed,
    Failed(FailReason),
}

/// Rejected quiz input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("option {index} does not exist (question has {available} options)")]
    OptionOutOfRange { index: usize, available: usize },
    #[error("quiz already finished")]
    Finished,
}

/// Ordered questions, a cursor, a countdown, and a tally of correct answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSession {
    config: QuizConfig,
    questions: QuestionList,
    cursor: usize,
    countdown: Countdown,
    correct: usize,
    status: QuizStatus,
}

impl QuizSession {
    /// Generate every question up front and start the first countdown.
    pub fn generate(config: QuizConfig, rng: &mut impl Rng) -> Self {
        let questions = (0..config.questions)
            .map(|_| Question::generate(config.operand_min, config.operand_max, rng))
            .collect();
        Self::from_questions(config, questions)
    }

    /// Build a session around prepared questions.
    #[must_use]
    pub fn from_questions(config: QuizConfig, questions: QuestionList) -> Self {
        let status = if questions.is_empty() {
            QuizStatus::Passed
        } else {
            QuizStatus::Active
        };
        Self {
            config,
            questions,
            cursor: 0,
            countdown: Countdown::new(config.ticks_per_question),
            correct: 0,
            status,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current(&self) -> Option<&Question> {
        if self.status.is_finished() {
            return None;
        }
        self.questions.get(self.cursor)
    }

    /// Zero-based index of the question on screen.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub const fn correct_answers(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub const fn time_left(&self) -> u8 {
        self.countdown.remaining()
    }

    #[must_use]
    pub const fn status(&self) -> QuizStatus {
        self.status
    }

    /// Pick one of the four options on the current question.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::Finished`] once the session is over and
    /// [`QuizError::OptionOutOfRange`] for an index past the options.
    pub fn answer(&mut self, option_index: usize) -> Result<QuizStep, QuizError> {
        let question = self.current().ok_or(QuizError::Finished)?;
        let picked = *question
            .options
            .get(option_index)
            .ok_or(QuizError::OptionOutOfRange {
                index: option_index,
                available: question.options.len(),
            })?;
        let correct = picked == question.answer;
        Ok(self.submit(correct))
    }

    /// Submit a raw value instead of an option index.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::Finished`] once the session is over.
    pub fn answer_value(&mut self, value: i32) -> Result<QuizStep, QuizError> {
        let question = self.current().ok_or(QuizError::Finished)?;
        let correct = value == question.answer;
        Ok(self.submit(correct))
    }

    fn submit(&mut self, correct: bool) -> QuizStep {
        if !correct {
            return self.fail(FailReason::WrongAnswer);
        }
        self.correct += 1;
        self.cursor += 1;
        if self.cursor >= self.questions.len() {
            self.status = QuizStatus::Passed;
            log::debug!("quiz passed ({} correct)", self.correct);
            return QuizStep::Passed;
        }
        self.countdown.reset();
        QuizStep::Advanced {
            question: self.cursor,
        }
    }

    /// One time unit elapses on the current question.
    ///
    /// Ticks after the session finished are ignored and report the final step.
    pub fn tick(&mut self) -> QuizStep {
        match self.status {
            QuizStatus::Passed => return QuizStep::Passed,
            QuizStatus::Failed(reason) => return QuizStep::Failed(reason),
            QuizStatus::Active => {}
        }
        if self.countdown.tick() {
            return self.fail(FailReason::Timeout);
        }
        QuizStep::Ticked {
            remaining: self.countdown.remaining(),
        }
    }

    fn fail(&mut self, reason: FailReason) -> QuizStep {
        self.status = QuizStatus::Failed(reason);
        log::debug!(
            "quiz failed on question {} of {}: {reason:?}",
            self.cursor + 1,
            self.questions.len()
        );
        QuizStep::Failed(reason)
    }
}
