mod common;
mod logic;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;
use trekday_engine::{Itinerary, ToggleRequest, handle_toggle};

use common::scenario::{get_scenario, list_scenarios, reference_fixture};
use common::{load_itinerary, split_csv};
use logic::{LogicTester, RunContext, resolve_seed_inputs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Coloured summary for terminals
    Console,
    /// Machine-readable scenario results
    Json,
    /// Markdown summary for CI job pages
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "trekday-tester", version = "0.1.0")]
#[command(about = "Scenario runner and seeded invariant sweeps for the trekday selection engine")]
struct Args {
    /// Itinerary JSON to test (defaults to the bundled Alpine Traverse sample)
    #[arg(long)]
    itinerary: Option<PathBuf>,

    /// Scenarios to run (comma-separated, `all` for every scenario)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated integers or 0x hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of walks per seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Override the number of toggles in each walk
    #[arg(long)]
    walk_steps: Option<usize>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Evaluate a single toggle request (JSON file) and print the response
    #[arg(long)]
    request: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    let itinerary = load_itinerary(args.itinerary.as_deref())?;

    if let Some(path) = args.request.as_deref() {
        return answer_request(&args, &itinerary, path);
    }

    announce_banner(&itinerary);

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let fixture = reference_fixture()?;

    let results = run_scenarios(&args, &scenarios, &itinerary, &fixture, &seeds);

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
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
        let kind = match get_scenario(key) {
            Some(scenario) if scenario.is_walk() => "seeded walk",
            Some(_) => "scripted",
            None => "unavailable",
        };
        writeln!(output_target.writer(), "  {key:25} - {description} [{kind}]")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn answer_request(args: &Args, itinerary: &Itinerary, path: &Path) -> Result<()> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let request = ToggleRequest::from_json(&body)
        .with_context(|| format!("invalid toggle request in {}", path.display()))?;
    let response = handle_toggle(itinerary, &request);
    log::debug!("day {} -> {:?}", request.day, response.outcome);

    let mut output_target = OutputTarget::new(args.output.clone())?;
    serde_json::to_writer_pretty(output_target.writer(), &response)?;
    writeln!(output_target.writer())?;
    output_target.flush_inner()?;
    Ok(())
}

fn announce_banner(itinerary: &Itinerary) {
    println!("{}", "🥾 Trekday Selection Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
    println!(
        "Itinerary: {} ({} days, {} linked groups)",
        itinerary.name().bold(),
        itinerary.catalog().len(),
        itinerary.linkage().len()
    );
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        scenarios.extend(list_scenarios().into_iter().map(|(key, _)| key.to_string()));
    }
    scenarios
}

fn run_scenarios(
    args: &Args,
    scenarios: &[String],
    itinerary: &Itinerary,
    fixture: &Itinerary,
    seeds: &[u64],
) -> Vec<logic::ScenarioResult> {
    println!("{}", "🧠 Running Selection Scenarios".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let tester = LogicTester::new(args.verbose).with_walk_steps(args.walk_steps);
    let ctx = RunContext {
        itinerary,
        fixture,
        seeds,
        iterations: args.iterations,
    };

    let mut results = Vec::new();
    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.extend(tester.run_scenario(&scenario, &ctx));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }
    results
}

fn write_reports(args: &Args, results: &[logic::ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => {
            logic::reports::generate_json_report(&mut output_target, results)?;
        }
        ReportFormat::Markdown => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Trekday Selection Engine Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
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
