mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::scenario::{TestScenario, get_scenario, list_scenarios};
use common::{FileStore, split_csv};
use gugudan_game::{JsonGateway, MemoryStore, Messages};
use logic::{LogicTester, ScenarioResult, SeedInfo, StoreSelection, resolve_seed_inputs};

#[derive(Debug, Parser)]
#[command(name = "gugudan-tester", version = "0.1.0")]
#[command(about = "Automated QA testing for the Gugudan multiplication quiz engine")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated; decimal, 0x-hex, `today`, `sweep`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Persist scores and ranking in this directory instead of memory
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Draw operands from 1..=9 and keep the times-one table
    #[arg(long)]
    include_ones: bool,

    /// Play the first scenario and seed in real time with tokio timers
    #[arg(long)]
    live: bool,

    /// JSON file overriding player-facing messages (live mode)
    #[arg(long)]
    messages: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = resolve_scenarios(&args);
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;

    if args.live {
        return run_live(&args, &scenarios, &seed_infos).await;
    }

    let seeds: Vec<u64> = seed_infos.iter().map(|s| s.seed).collect();
    let all_results = run_logic_scenarios(&args, &scenarios, &seeds);
    write_reports(&args, &all_results, start_time)?;

    if all_results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:12} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🧮 Gugudan Automated Tester".bright_cyan().bold());
    println!("{}", "===========================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for (key, _) in list_scenarios() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn resolve_scenarios(args: &Args) -> Vec<TestScenario> {
    let mut resolved = Vec::new();
    for name in expand_scenarios(&args.scenarios) {
        match get_scenario(&name) {
            Some(scenario) if args.include_ones => resolved.push(scenario.including_ones()),
            Some(scenario) => resolved.push(scenario),
            None => eprintln!("⚠️  Unknown scenario: {}", name.yellow()),
        }
    }
    resolved
}

fn store_selection(args: &Args) -> StoreSelection {
    args.store_dir
        .clone()
        .map_or(StoreSelection::Memory, StoreSelection::Directory)
}

fn run_logic_scenarios(
    args: &Args,
    scenarios: &[TestScenario],
    seeds: &[u64],
) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(store_selection(args), args.verbose);
    let mut results = Vec::new();
    for scenario in scenarios {
        results.extend(logic_tester.run_scenario(scenario, seeds, args.iterations));
    }
    results
}

async fn run_live(args: &Args, scenarios: &[TestScenario], seed_infos: &[SeedInfo]) -> Result<()> {
    let scenario = scenarios
        .first()
        .context("live mode needs at least one known scenario")?;
    let seed = seed_infos.first().map_or(1337, |info| info.seed);
    let messages = match &args.messages {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Messages::from_json(&json)?
        }
        None => Messages::default(),
    };

    println!(
        "{} {} (seed {seed})",
        "🎬 Live session:".bright_blue().bold(),
        scenario.name
    );

    let mut output_target = OutputTarget::new(args.output.clone())?;
    match store_selection(args) {
        StoreSelection::Memory => {
            let gateway = JsonGateway::new(MemoryStore::new());
            logic::run_live_session(&scenario.plan, seed, gateway, &messages, &mut output_target)
                .await?;
        }
        StoreSelection::Directory(dir) => {
            let gateway = JsonGateway::new(FileStore::open(dir)?);
            logic::run_live_session(&scenario.plan, seed, gateway, &messages, &mut output_target)
                .await?;
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Gugudan Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if results.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, results, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
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
