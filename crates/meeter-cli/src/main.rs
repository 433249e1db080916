//! `meeter` CLI: replay an availability scenario and rank meeting times.
//!
//! ## Usage
//!
//! ```sh
//! # Best meeting start times (stdin → stdout)
//! cat scenario.json | meeter best-times
//!
//! # Top five with scores, as JSON
//! meeter best-times -i scenario.json --cutoff 5 --json
//!
//! # Per-slot availability counts for every day, or one day
//! meeter counts -i scenario.json
//! meeter counts -i scenario.json --day 2
//!
//! # Log every grid edit and the resolved search bounds to stderr
//! meeter --verbose best-times -i scenario.json
//! ```

mod scenario;

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use meeter_engine::{CountGrid, SearchConfig, DAYS};
use tracing::debug;

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(
    name = "meeter",
    version,
    about = "Find the best meeting times for a group"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log engine activity at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the best meeting start times, best first
    BestTimes {
        /// Scenario JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Number of results (defaults to the scenario config, then 3)
        #[arg(long)]
        cutoff: Option<usize>,
        /// Minimum lead time in minutes before a proposed start
        #[arg(long)]
        delay_minutes: Option<i64>,
        /// Emit JSON instead of one start time per line
        #[arg(long)]
        json: bool,
        /// Include each window's score in text output
        #[arg(long)]
        scores: bool,
    },
    /// Print the number of available members for every slot
    Counts {
        /// Scenario JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Only print this day index
        #[arg(long)]
        day: Option<usize>,
        /// Emit JSON rows instead of a text grid
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::BestTimes {
            input,
            output,
            cutoff,
            delay_minutes,
            json,
            scores,
        } => {
            let scenario = Scenario::parse(&read_input(input.as_deref())?)?;
            let config = SearchConfig {
                cutoff: cutoff.unwrap_or(scenario.config.cutoff),
                search_delay_minutes: delay_minutes.unwrap_or(scenario.config.search_delay_minutes),
                ..scenario.config
            };
            config.validate().context("Invalid search config")?;
            debug!(?config, "resolved search config");

            let (planner, event_id) = scenario.replay(config)?;
            let candidates = planner
                .find_best_candidates(&scenario.event.admin, event_id)
                .context("Failed to search for best times")?;

            let rendered = if json {
                let mut out = serde_json::to_string_pretty(&candidates)?;
                out.push('\n');
                out
            } else {
                candidates
                    .iter()
                    .map(|c| {
                        let start = c.start.format("%Y-%m-%d %H:%M");
                        if scores {
                            format!("{start}  score={}\n", c.score)
                        } else {
                            format!("{start}\n")
                        }
                    })
                    .collect()
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Counts { input, day, json } => {
            let scenario = Scenario::parse(&read_input(input.as_deref())?)?;
            let (planner, event_id) = scenario.replay(scenario.config)?;
            let counts = planner
                .aggregate_availability(&scenario.event.admin, event_id)
                .context("Failed to aggregate availability")?;

            let days: Vec<usize> = match day {
                Some(d) if d >= DAYS => {
                    anyhow::bail!("Day {} is outside the {}-day horizon", d, DAYS)
                }
                Some(d) => vec![d],
                None => (0..counts.days()).collect(),
            };

            let rendered = if json {
                let rows: Vec<Vec<u32>> = days
                    .iter()
                    .filter_map(|&d| counts.row(d).map(|row| row.to_vec()))
                    .collect();
                let mut out = serde_json::to_string(&rows)?;
                out.push('\n');
                out
            } else {
                render_counts(&counts, &days)
            };
            print!("{}", rendered);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(io::stderr)
        .init();
}

/// One line per day: `.` for nobody, a digit for 1-9 members, `+` for more.
fn render_counts(counts: &CountGrid, days: &[usize]) -> String {
    let mut out = String::new();
    for &day in days {
        let Some(row) = counts.row(day) else { continue };
        let cells: String = row
            .iter()
            .map(|&n| match n {
                0 => '.',
                1..=9 => char::from_digit(n, 10).unwrap_or('+'),
                _ => '+',
            })
            .collect();
        out.push_str(&format!("{:>2} {}\n", day, cells));
    }
    out
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
