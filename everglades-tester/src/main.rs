mod logic;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use everglades_game::{DataLoader, JsonWorld, WorldData};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use logic::{GameplayStrategy, RunResult, SimulationConfig, run_simulation};

#[derive(Debug, Parser)]
#[command(name = "everglades-tester", version = "0.1.0")]
#[command(about = "Automated playthroughs of Everglades Escape with scripted strategies")]
struct Args {
    /// Strategies to run (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of runs per strategy and seed; each iteration offsets the seed
    #[arg(long, default_value_t = 1)]
    iterations: usize,

    /// Give up on a run after this many actions
    #[arg(long, default_value_t = 200)]
    max_turns: u32,

    /// Chance of a random event after each day that passes
    #[arg(long, default_value_t = 0.0)]
    event_chance: f64,

    /// Optional world JSON to play instead of the bundled Everglades map
    #[arg(long)]
    world: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    /// Progress lines would corrupt machine-readable reports on stdout.
    fn show_progress(&self) -> bool {
        self.output.is_some() || self.report == "console"
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    if args.show_progress() {
        announce_banner();
    }

    let start_time = Instant::now();
    let strategies = expand_strategies(&args.strategies)?;
    let seeds = parse_seeds(&args.seeds)?;
    let world = load_world(args.world.as_deref())?;

    let results = run_all(&args, &world, &strategies, &seeds);
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed()) {
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
    for strategy in GameplayStrategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:12} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🐊 Everglades Escape Tester".bright_cyan().bold());
    println!("{}", "===========================".cyan());
}

fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn expand_strategies(input: &str) -> Result<Vec<GameplayStrategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(input) {
        if token.eq_ignore_ascii_case("all") {
            for strategy in GameplayStrategy::ALL {
                if !strategies.contains(&strategy) {
                    strategies.push(strategy);
                }
            }
            continue;
        }
        let Some(strategy) = GameplayStrategy::from_key(&token) else {
            let known: Vec<_> = GameplayStrategy::ALL.iter().map(|s| s.key()).collect();
            bail!("unknown strategy `{token}` (known: {})", known.join(", "));
        };
        if !strategies.contains(&strategy) {
            strategies.push(strategy);
        }
    }
    if strategies.is_empty() {
        bail!("no strategies selected");
    }
    Ok(strategies)
}

fn parse_seeds(input: &str) -> Result<Vec<u64>> {
    let seeds = split_csv(input)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed `{token}`"))
        })
        .collect::<Result<Vec<_>>>()?;
    if seeds.is_empty() {
        bail!("no seeds provided");
    }
    Ok(seeds)
}

fn load_world(path: Option<&Path>) -> Result<WorldData> {
    let Some(path) = path else {
        return WorldData::bundled().context("bundled world failed to load");
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    JsonWorld(json)
        .load_world()
        .with_context(|| format!("invalid world file {}", path.display()))
}

fn run_all(
    args: &Args,
    world: &WorldData,
    strategies: &[GameplayStrategy],
    seeds: &[u64],
) -> Vec<RunResult> {
    let mut results = Vec::new();
    for &strategy in strategies {
        if args.show_progress() {
            println!("{}", format!("🧭 {strategy}").bright_yellow().bold());
        }
        for &base_seed in seeds {
            for iteration in 0..args.iterations.max(1) {
                let seed = base_seed.wrapping_add(iteration as u64);
                let config = SimulationConfig::new(strategy, seed)
                    .with_max_turns(args.max_turns)
                    .with_event_chance(args.event_chance);
                let result = match run_simulation(world, config, args.verbose) {
                    Ok(record) => RunResult {
                        strategy: strategy.key().to_string(),
                        seed,
                        iteration,
                        record: Some(record),
                        error: None,
                    },
                    Err(err) => RunResult {
                        strategy: strategy.key().to_string(),
                        seed,
                        iteration,
                        record: None,
                        error: Some(format!("{err:#}")),
                    },
                };
                if args.show_progress() {
                    print_progress(&result);
                }
                results.push(result);
            }
        }
    }
    results
}

fn print_progress(result: &RunResult) {
    match (&result.record, &result.error) {
        (Some(record), _) => {
            let label = if record.won {
                record.outcome.green()
            } else {
                record.outcome.yellow()
            };
            println!(
                "  ✅ [{} seed {}] {label} on day {}",
                result.strategy, result.seed, record.days
            );
        }
        (None, error) => eprintln!(
            "  ❌ [{} seed {}] {}",
            result.strategy,
            result.seed,
            error.as_deref().unwrap_or("no record").red()
        ),
    }
}

fn write_reports(args: &Args, results: &[RunResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, results)?,
        _ => {
            logic::reports::generate_console_report(
                &mut output_target,
                results,
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
