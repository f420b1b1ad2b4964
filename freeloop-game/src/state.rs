use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DAILY_UPKEEP, DECAY_AMOUNT, DECAY_SKIPPED_DAYS, PC_LEVEL_MAX, PC_LEVEL_MIN, SKILL_MAX,
    SKILL_MIN, START_DAY, START_MONEY, START_PC_LEVEL, START_SKILL, START_STRESS, STRESS_MAX,
    STRESS_MIN,
};
use crate::numbers::round_to_places;

const MSG_BROKE: &str =
    "You ran out of money and couldn't find any work. The freelancing journey ends here.";
const MSG_BURNOUT: &str = "You burned out from stress. The gig is over.";

/// One of the three trades a freelancer can practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillKind {
    Design,
    Dev,
    Qa,
}

impl SkillKind {
    pub const ALL: [Self; 3] = [Self::Design, Self::Dev, Self::Qa];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Design => "design",
            Self::Dev => "dev",
            Self::Qa => "qa",
        }
    }

    /// Short upper-case tag used on job cards and result screens.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Design => "DESIGN",
            Self::Dev => "DEV",
            Self::Qa => "QA",
        }
    }

    /// Course name shown when a skill is studied.
    #[must_use]
    pub const fn course_name(self) -> &'static str {
        match self {
            Self::Design => "Design",
            Self::Dev => "Development",
            Self::Qa => "QA",
        }
    }

    /// Pick one of the three skills uniformly.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for SkillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "design" => Ok(Self::Design),
            "dev" => Ok(Self::Dev),
            "qa" => Ok(Self::Qa),
            _ => Err(()),
        }
    }
}

/// Why a career ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOverCause {
    /// Money dropped below zero
    Broke,
    /// Stress reached the ceiling
    Burnout,
}

impl GameOverCause {
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Broke => MSG_BROKE,
            Self::Burnout => MSG_BURNOUT,
        }
    }
}

impl fmt::Display for GameOverCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broke => write!(f, "broke"),
            Self::Burnout => write!(f, "burnout"),
        }
    }
}

/// Skill lost to neglect after too many days away from jobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillDecay {
    pub skill: SkillKind,
    pub before: f64,
    pub after: f64,
}

impl SkillDecay {
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "You've been skipping jobs for days. Your {} skill decreased by {DECAY_AMOUNT:.2}.",
            self.skill
        )
    }
}

/// The save-game record: every component reads and writes this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub day: u32,
    pub design_skill: f64,
    pub dev_skill: f64,
    pub qa_skill: f64,
    pub stress: f64,
    pub money: f64,
    pub pc_level: u32,
    #[serde(default)]
    pub skipped_job_days: u32,
    /// Last day whose upkeep has been charged; 0 when none has.
    #[serde(default)]
    pub upkeep_paid_day: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            day: START_DAY,
            design_skill: START_SKILL,
            dev_skill: START_SKILL,
            qa_skill: START_SKILL,
            stress: START_STRESS,
            money: START_MONEY,
            pc_level: START_PC_LEVEL,
            skipped_job_days: 0,
            upkeep_paid_day: 0,
        }
    }
}

impl PlayerState {
    #[must_use]
    pub const fn skill(&self, kind: SkillKind) -> f64 {
        match kind {
            SkillKind::Design => self.design_skill,
            SkillKind::Dev => self.dev_skill,
            SkillKind::Qa => self.qa_skill,
        }
    }

    pub const fn skill_mut(&mut self, kind: SkillKind) -> &mut f64 {
        match kind {
            SkillKind::Design => &mut self.design_skill,
            SkillKind::Dev => &mut self.dev_skill,
            SkillKind::Qa => &mut self.qa_skill,
        }
    }

    /// Overwrite a skill, keeping it inside the legal band.
    pub fn set_skill(&mut self, kind: SkillKind, value: f64) {
        *self.skill_mut(kind) = sanitize(value, START_SKILL).clamp(SKILL_MIN, SKILL_MAX);
    }

    /// Add stress, saturating at the burnout ceiling.
    pub fn add_stress(&mut self, delta: f64) {
        self.stress = (self.stress + delta).clamp(STRESS_MIN, STRESS_MAX);
    }

    /// Bring every field back inside its documented range.
    pub fn clamp(&mut self) {
        self.day = self.day.max(START_DAY);
        for kind in SkillKind::ALL {
            let value = self.skill(kind);
            self.set_skill(kind, value);
        }
        self.stress = sanitize(self.stress, START_STRESS).clamp(STRESS_MIN, STRESS_MAX);
        self.money = sanitize(self.money, 0.0);
        self.pc_level = self.pc_level.clamp(PC_LEVEL_MIN, PC_LEVEL_MAX);
        self.upkeep_paid_day = self.upkeep_paid_day.min(self.day);
    }

    /// Charge the daily living cost once per day, starting on day two.
    ///
    /// Returns `true` when a charge was applied.
    pub fn apply_daily_upkeep(&mut self) -> bool {
        if self.day <= START_DAY || self.upkeep_paid_day >= self.day {
            return false;
        }
        self.money -= DAILY_UPKEEP;
        self.upkeep_paid_day = self.day;
        log::debug!(
            "day {} upkeep charged, money now {:.2}",
            self.day,
            self.money
        );
        true
    }

    /// Game-over check: money is evaluated before stress.
    #[must_use]
    pub fn check_terminal(&self) -> Option<GameOverCause> {
        if self.money < 0.0 {
            return Some(GameOverCause::Broke);
        }
        if self.stress >= STRESS_MAX {
            return Some(GameOverCause::Burnout);
        }
        None
    }

    /// Apply neglect decay once the skipped-day counter hits its threshold.
    pub fn apply_skill_decay(&mut self, rng: &mut impl Rng) -> Option<SkillDecay> {
        if self.skipped_job_days < DECAY_SKIPPED_DAYS {
            return None;
        }
        let skill = SkillKind::random(rng);
        let before = self.skill(skill);
        let after = round_to_places(before - DECAY_AMOUNT, 2).max(SKILL_MIN);
        self.set_skill(skill, after);
        self.skipped_job_days = 0;
        log::info!("skill decay: {skill} {before:.2} -> {after:.2}");
        Some(SkillDecay {
            skill,
            before,
            after: self.skill(skill),
        })
    }

    /// Money formatted the way the stats panel shows it.
    #[must_use]
    pub fn stats_line(&self) -> String {
        format!(
            "Day {} | Design {:.1} | Dev {:.1} | QA {:.1} | PC {} | Stress {}/10 | ${:.2}",
            self.day,
            self.design_skill,
            self.dev_skill,
            self.qa_skill,
            self.pc_level,
            self.stress,
            self.money
        )
    }
}

fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
