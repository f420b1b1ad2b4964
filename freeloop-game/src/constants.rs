//! Centralized balance and tuning constants for Freeloop game logic.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Persistence --------------------------------------------------------------
/// Well-known storage slot holding the single live save.
pub const SAVE_SLOT: &str = "freeloopSave";
pub(crate) const SAVE_FORMAT_VERSION: u32 = 1;
pub(crate) const SAVE_CHECKSUM_SEED: u64 = 0x00F2_EE10_0F00;

// Starting profile ---------------------------------------------------------
pub const START_DAY: u32 = 1;
pub const START_SKILL: f64 = 1.0;
pub const START_STRESS: f64 = 0.0;
pub const START_MONEY: f64 = 100.0;
pub const START_PC_LEVEL: u32 = 1;

// State bounds -------------------------------------------------------------
pub const SKILL_MIN: f64 = 0.0;
pub const SKILL_MAX: f64 = 100.0;
pub const STRESS_MIN: f64 = 0.0;
pub const STRESS_MAX: f64 = 10.0;
pub const PC_LEVEL_MIN: u32 = 1;
pub const PC_LEVEL_MAX: u32 = 100;

// Daily economy ------------------------------------------------------------
pub const DAILY_UPKEEP: f64 = 10.0;
pub const RELAX_COST: f64 = 30.0;
pub const RELAX_STRESS_RELIEF: f64 = 1.0;
pub const LEARN_COST: f64 = 100.0;
pub const LEARN_GAIN_MIN: f64 = 0.5;
pub const LEARN_GAIN_MAX: f64 = 1.0;
pub const UPGRADE_COST_PER_LEVEL: f64 = 100.0;

// Neglect decay ------------------------------------------------------------
pub const DECAY_SKIPPED_DAYS: u32 = 3;
pub const DECAY_AMOUNT: f64 = 0.1;

// Job board ----------------------------------------------------------------
pub const OFFERS_PER_BOARD: usize = 3;
pub(crate) const REQUIRED_FLOOR: f64 = 1.0;
pub(crate) const REQUIRED_CEILING: f64 = 100.0;
pub(crate) const MARKET_MIN_FACTOR: f64 = 0.8;
pub(crate) const MARKET_MAX_FACTOR: f64 = 1.5;
pub(crate) const PAY_PER_REQUIRED: f64 = 80.0;
pub(crate) const PAY_JITTER_MAX: u32 = 50;
pub(crate) const JOB_DESCRIPTION: &str =
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit.";

// Quizzes ------------------------------------------------------------------
pub const COMPETITION_QUESTIONS: usize = 3;
pub const COMPETITION_OPERAND_MIN: i32 = 1;
pub const COMPETITION_OPERAND_MAX: i32 = 10;
pub const COMPETITION_TICKS: u8 = 10;
pub const CHALLENGE_MIN_QUESTIONS: usize = 5;
pub const CHALLENGE_MAX_QUESTIONS: usize = 8;
pub(crate) const CHALLENGE_GAP_PER_QUESTION: f64 = 10.0;
pub const CHALLENGE_OPERAND_MIN: i32 = 2;
pub const CHALLENGE_OPERAND_MAX: i32 = 12;
pub const CHALLENGE_TICKS: u8 = 5;
pub(crate) const OPTIONS_PER_QUESTION: usize = 4;
pub(crate) const NEAR_OFFSET_MIN: i32 = 1;
pub(crate) const NEAR_OFFSET_MAX: i32 = 3;
pub(crate) const FAR_OFFSET_MIN: i32 = 4;
pub(crate) const FAR_OFFSET_MAX: i32 = 6;

// Rivals -------------------------------------------------------------------
pub(crate) const RIVAL_POOL: [&str; 10] = [
    "PixelGuru",
    "Devzilla",
    "KarenUX",
    "CSSSultan",
    "BudgetBobby",
    "NodeNinja",
    "JuniorSenior",
    "FloatyMcBug",
    "ClickWhisperer",
    "AltF4Andy",
];
pub(crate) const HEADLINE_RIVAL: &str = "Faraz The Web Guy";

// Job results --------------------------------------------------------------
pub(crate) const PC_BONUS_PER_LEVEL: f64 = 0.05;
pub(crate) const QUALITY_BONUS_THRESHOLD: f64 = 0.9;
pub(crate) const QUALITY_BONUS: f64 = 25.0;
pub(crate) const QA_BONUS_THRESHOLD: f64 = 80.0;
pub(crate) const QA_BONUS: f64 = 25.0;
pub(crate) const JOB_BASE_GAIN: f64 = 0.1;
pub(crate) const CHALLENGE_BASE_GAIN: f64 = 0.3;
pub(crate) const GAIN_GAP_DIVISOR: f64 = 50.0;
pub const WIN_STRESS: f64 = 1.0;
pub const LOSS_STRESS: f64 = 3.0;
