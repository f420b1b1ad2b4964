mod logic;

use anyhow::{Context, Result, bail, ensure};
use clap::Parser;
use colored::Colorize;
use freeloop_game::JobPool;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{
    CareerFailure, CareerRecord, QuizProfile, SeedInfo, SimulationConfig, StrategyAggregate,
    Strategy, aggregate, resolve_seed_inputs, run_career,
};

#[derive(Debug, Parser)]
#[command(name = "freeloop-tester", version = "0.1.0")]
#[command(
    about = "Autoplay QA for the Freeloop career engine - scripted careers and balance reports"
)]
struct Args {
    /// Strategies to run (comma-separated: grinder, balanced, scholar, random, all)
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List the built-in strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Seeds or run codes to start from (comma-separated, `all` for every run code)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Careers per seed and strategy
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Stop a career once it has survived this many days
    #[arg(long, default_value_t = 365)]
    max_days: u32,

    /// Chance the simulated player answers a question correctly
    #[arg(long, default_value_t = 0.9)]
    accuracy: f64,

    /// Most ticks the simulated player thinks before answering
    #[arg(long, default_value_t = 4)]
    reaction_ticks: u8,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Print one line per career to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }
    ensure!(
        (0.0..=1.0).contains(&args.accuracy),
        "--accuracy must be between 0 and 1, got {}",
        args.accuracy
    );
    ensure!(args.max_days > 0, "--max-days must be at least 1");

    if args.report == "console" && args.output.is_none() {
        announce_banner();
    }

    let start_time = Instant::now();
    let strategies = expand_strategies(&args.strategies)?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let pool = JobPool::load_from_static();
    pool.validate().context("bundled job pool is unusable")?;

    let (records, failures) = run_careers(&args, &pool, &strategies, &seeds);
    let aggregates = aggregate(&records);
    write_reports(&args, &records, &aggregates, &failures, start_time)?;

    if !failures.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in Strategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:10} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "💼 Freeloop Career Tester".bright_cyan().bold());
    println!("{}", "=========================".cyan());
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn expand_strategies(arg: &str) -> Result<Vec<Strategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(arg) {
        let picked: Vec<Strategy> = if token.eq_ignore_ascii_case("all") {
            Strategy::ALL.to_vec()
        } else if let Some(strategy) = Strategy::parse(&token) {
            vec![strategy]
        } else {
            bail!("Unknown strategy: {token}");
        };
        for strategy in picked {
            if !strategies.contains(&strategy) {
                strategies.push(strategy);
            }
        }
    }
    if strategies.is_empty() {
        strategies.extend(Strategy::ALL);
    }
    Ok(strategies)
}

fn run_careers(
    args: &Args,
    pool: &JobPool,
    strategies: &[Strategy],
    seeds: &[SeedInfo],
) -> (Vec<CareerRecord>, Vec<CareerFailure>) {
    let quiz = QuizProfile::new(args.accuracy, args.reaction_ticks);
    let mut records = Vec::new();
    let mut failures = Vec::new();

    for &strategy in strategies {
        for seed_info in seeds {
            for iteration in 0..args.iterations {
                let seed = seed_info.iteration_seed(iteration as u64);
                let config = SimulationConfig::new(strategy, seed)
                    .with_max_days(args.max_days)
                    .with_quiz(quiz);
                match run_career(pool, &config) {
                    Ok(record) => {
                        if args.verbose {
                            let ending = record
                                .ended_by
                                .map_or_else(|| "day cap".to_string(), |cause| cause.to_string());
                            eprintln!(
                                "✅ [{} {}] day {} ({ending})",
                                strategy.label().green(),
                                record.run_code,
                                record.final_day
                            );
                        }
                        records.push(record);
                    }
                    Err(err) => {
                        let run_code = freeloop_game::run_code_for_seed(seed);
                        eprintln!(
                            "❌ [{} {}] {:#}",
                            strategy.label().red(),
                            run_code,
                            err
                        );
                        failures.push(CareerFailure {
                            strategy: strategy.label().to_string(),
                            seed,
                            run_code,
                            error: format!("{err:#}"),
                        });
                    }
                }
            }
        }
    }

    (records, failures)
}

fn write_reports(
    args: &Args,
    records: &[CareerRecord],
    aggregates: &[StrategyAggregate],
    failures: &[CareerFailure],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            logic::reports::generate_json_report(
                &mut output_target,
                aggregates,
                failures,
                records,
            )?;
        }
        "markdown" => {
            logic::reports::generate_markdown_report(&mut output_target, aggregates, failures)?;
        }
        _ => {
            if aggregates.is_empty() {
                writeln!(&mut output_target, "No careers completed.")?;
            }
            logic::reports::generate_console_report(
                &mut output_target,
                aggregates,
                failures,
                start_time.elapsed(),
            )?;
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
