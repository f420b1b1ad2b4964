use anyhow::Result;
use colored::Colorize;
use freeloop_game::GameOverCause;
use freeloop_game::numbers::{i64_to_f64, usize_to_f64};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::simulation::CareerRecord;

/// A career that aborted because a rule broke.
#[derive(Debug, Clone, Serialize)]
pub struct CareerFailure {
    pub strategy: String,
    pub seed: u64,
    pub run_code: String,
    pub error: String,
}

/// Balance statistics for one strategy across all of its careers.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyAggregate {
    pub strategy: String,
    pub careers: usize,
    pub mean_days: f64,
    pub std_days: f64,
    pub min_days: u32,
    pub max_days: u32,
    pub capped_pct: f64,
    pub broke_pct: f64,
    pub burnout_pct: f64,
    pub mean_final_money: f64,
    pub mean_money_earned: f64,
    pub job_win_rate: f64,
    pub challenge_win_rate: f64,
    pub mean_skill_decays: f64,
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        values.sum::<f64>() / usize_to_f64(count)
    }
}

fn share(hits: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        usize_to_f64(hits) / usize_to_f64(count)
    }
}

fn ratio(num: u32, den: u32) -> f64 {
    if den == 0 {
        0.0
    } else {
        f64::from(num) / f64::from(den)
    }
}

/// Group records by strategy, keeping first-seen order.
#[must_use]
pub fn aggregate(records: &[CareerRecord]) -> Vec<StrategyAggregate> {
    let mut order: Vec<&str> = Vec::new();
    for record in records {
        if !order.contains(&record.strategy.as_str()) {
            order.push(&record.strategy);
        }
    }
    order
        .into_iter()
        .map(|strategy| {
            let group: Vec<&CareerRecord> =
                records.iter().filter(|r| r.strategy == strategy).collect();
            aggregate_group(strategy, &group)
        })
        .collect()
}

fn aggregate_group(strategy: &str, group: &[&CareerRecord]) -> StrategyAggregate {
    let n = group.len();
    let days = || group.iter().map(|r| f64::from(r.final_day));
    let mean_days = mean(days(), n);
    let variance = mean(days().map(|d| (d - mean_days).powi(2)), n);
    let ended = |cause: GameOverCause| group.iter().filter(|r| r.ended_by == Some(cause)).count();
    let won: u32 = group.iter().map(|r| r.stats.jobs_won).sum();
    let attempted: u32 = group.iter().map(|r| r.stats.jobs_attempted()).sum();
    let challenges_won: u32 = group.iter().map(|r| r.stats.challenges_won).sum();
    let challenges: u32 = group.iter().map(|r| r.stats.challenges_entered).sum();
    let mean_money_earned = mean(group.iter().map(|r| i64_to_f64(r.stats.money_earned)), n);

    StrategyAggregate {
        strategy: strategy.to_string(),
        careers: n,
        mean_days,
        std_days: variance.sqrt(),
        min_days: group.iter().map(|r| r.final_day).min().unwrap_or(0),
        max_days: group.iter().map(|r| r.final_day).max().unwrap_or(0),
        capped_pct: share(group.iter().filter(|r| r.survived()).count(), n),
        broke_pct: share(ended(GameOverCause::Broke), n),
        burnout_pct: share(ended(GameOverCause::Burnout), n),
        mean_final_money: mean(group.iter().map(|r| r.final_state.money), n),
        mean_money_earned,
        job_win_rate: ratio(won, attempted),
        challenge_win_rate: ratio(challenges_won, challenges),
        mean_skill_decays: mean(group.iter().map(|r| f64::from(r.stats.skill_decays)), n),
    }
}

pub fn generate_console_report(
    out: &mut dyn Write,
    aggregates: &[StrategyAggregate],
    failures: &[CareerFailure],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Career Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "============================".cyan())?;

    for agg in aggregates {
        writeln!(out, "{} ({} careers)", agg.strategy.bold(), agg.careers)?;
        writeln!(
            out,
            "   Days survived: {:.1} ± {:.1} (min {}, max {})",
            agg.mean_days, agg.std_days, agg.min_days, agg.max_days
        )?;
        writeln!(
            out,
            "   Outcome: {} reached the cap, {} broke, {} burned out",
            format!("{:.1}%", agg.capped_pct * 100.0).green(),
            format!("{:.1}%", agg.broke_pct * 100.0).yellow(),
            format!("{:.1}%", agg.burnout_pct * 100.0).red()
        )?;
        writeln!(
            out,
            "   Money: ${:.0} at the end, ${:.0} earned",
            agg.mean_final_money, agg.mean_money_earned
        )?;
        writeln!(
            out,
            "   Win rates: jobs {:.1}%, challenges {:.1}%",
            agg.job_win_rate * 100.0,
            agg.challenge_win_rate * 100.0
        )?;
        writeln!(out, "   Skill decays: {:.2}", agg.mean_skill_decays)?;
        writeln!(out)?;
    }

    if failures.is_empty() {
        writeln!(out, "{}", "✅ No invariant violations".green())?;
    } else {
        writeln!(
            out,
            "{}",
            format!("❌ {} careers broke a rule", failures.len()).red().bold()
        )?;
        for failure in failures {
            writeln!(
                out,
                "   • [{} {}] {}",
                failure.strategy,
                failure.run_code,
                failure.error.red()
            )?;
        }
    }
    writeln!(out, "Simulation time: {total_duration:?}")?;
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a [StrategyAggregate],
    failures: &'a [CareerFailure],
    careers: &'a [CareerRecord],
}

pub fn generate_json_report(
    out: &mut dyn Write,
    aggregates: &[StrategyAggregate],
    failures: &[CareerFailure],
    records: &[CareerRecord],
) -> Result<()> {
    let report = JsonReport {
        summary: aggregates,
        failures,
        careers: records,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    aggregates: &[StrategyAggregate],
    failures: &[CareerFailure],
) -> Result<()> {
    writeln!(out, "# Freeloop Career Simulation\n")?;
    writeln!(out, "## Summary\n")?;
    writeln!(
        out,
        "| Strategy | Careers | Mean days | Capped | Broke | Burnout | Job wins | Challenge wins |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|---|")?;
    for agg in aggregates {
        writeln!(
            out,
            "| {} | {} | {:.1} | {:.1}% | {:.1}% | {:.1}% | {:.1}% | {:.1}% |",
            agg.strategy,
            agg.careers,
            agg.mean_days,
            agg.capped_pct * 100.0,
            agg.broke_pct * 100.0,
            agg.burnout_pct * 100.0,
            agg.job_win_rate * 100.0,
            agg.challenge_win_rate * 100.0
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Invariant Violations\n")?;
    if failures.is_empty() {
        writeln!(out, "_None._")?;
    } else {
        for failure in failures {
            writeln!(
                out,
                "- **{}** `{}`: {}",
                failure.strategy, failure.run_code, failure.error
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use freeloop_game::{CareerStats, PlayerState};

    fn record(strategy: &str, final_day: u32, ended_by: Option<GameOverCause>) -> CareerRecord {
        CareerRecord {
            strategy: strategy.to_string(),
            seed: 1,
            run_code: "FL-INVOICE01".to_string(),
            final_day,
            ended_by,
            final_state: PlayerState::default(),
            stats: CareerStats {
                jobs_won: 3,
                jobs_lost: 1,
                ..CareerStats::default()
            },
            rejected_actions: 0,
            answers: 9,
            ticks_waited: 4,
            challenge_questions: 0,
            rng_draws: 100,
        }
    }

    fn sample() -> Vec<CareerRecord> {
        vec![
            record("Grinder", 10, Some(GameOverCause::Burnout)),
            record("Scholar", 4, Some(GameOverCause::Broke)),
            record("Grinder", 30, None),
        ]
    }

    #[test]
    fn aggregates_per_strategy_in_order() {
        let aggs = aggregate(&sample());
        assert_eq!(aggs.len(), 2);
        assert_eq!(aggs[0].strategy, "Grinder");
        assert_eq!(aggs[0].careers, 2);
        assert!((aggs[0].mean_days - 20.0).abs() < 1e-9);
        assert!((aggs[0].std_days - 10.0).abs() < 1e-9);
        assert!((aggs[0].capped_pct - 0.5).abs() < 1e-9);
        assert!((aggs[0].burnout_pct - 0.5).abs() < 1e-9);
        assert!((aggs[0].job_win_rate - 0.75).abs() < 1e-9);
        assert!(aggs[0].challenge_win_rate.abs() < f64::EPSILON);
        assert!((aggs[1].broke_pct - 1.0).abs() < 1e-9);
    }

    #[test]
    fn json_report_lists_summary_and_careers() {
        let records = sample();
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &aggregate(&records), &[], &records).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["summary"].as_array().unwrap().len(), 2);
        assert_eq!(value["careers"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn markdown_report_has_a_row_per_strategy() {
        let mut buf = Vec::new();
        generate_markdown_report(&mut buf, &aggregate(&sample()), &[]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("# Freeloop Career Simulation"));
        assert!(text.contains("| Grinder | 2 |"));
        assert!(text.contains("_None._"));
    }

    #[test]
    fn console_report_flags_failures() {
        let failure = CareerFailure {
            strategy: "Random".to_string(),
            seed: 3,
            run_code: "FL-INVOICE03".to_string(),
            error: "stress out of range: 11".to_string(),
        };
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &aggregate(&sample()), &[failure], Duration::ZERO)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Career Simulation Summary"));
        assert!(text.contains("broke a rule"));
        assert!(text.contains("FL-INVOICE03"));
    }
}
