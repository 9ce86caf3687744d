#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plans, checks and interactively drives Wrappy runs.

mod checker;
mod config;
mod interactive;
mod report;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wrappy_core::{BoosterKind, TaskDescription};
use wrappy_system_coverage::CoveragePlanner;
use wrappy_world::{query, Session, World};

use crate::{
    checker::{Checker, ExternalChecker, Verdict},
    config::Config,
    report::Report,
};

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "wrappy", version, about = "Plan and check wrapping robot runs")]
struct Cli {
    /// Configuration file (defaults to wrappy.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Tracing filter directives, overriding RUST_LOG and the configuration
    #[arg(long, global = true, value_name = "FILTER")]
    log: Option<String>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Plan a walk covering every free cell and print it as a command stream
    Solve {
        /// Task description file
        task: PathBuf,
        /// Write the solution here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Replay a solution and report the coverage it reaches
    Check {
        /// Task description file
        task: PathBuf,
        /// Solution file holding a command stream
        solution: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Also score the solution with the configured external checker
        #[arg(long)]
        external: bool,
        /// Booster codes bought before the run, forwarded to the external checker
        #[arg(long, value_name = "BOOSTERS")]
        buy: Option<String>,
    },
    /// Drive the agent from stdin, one run of symbols per line (U undoes)
    Interactive {
        /// Task description file
        task: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct CheckOutput<'a> {
    #[serde(flatten)]
    report: &'a Report,
    verdict: Option<&'a Verdict>,
}

/// Entry point for the Wrappy command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(cli.log.as_deref(), config.log_filter.as_deref())?;

    match cli.command {
        CliCommand::Solve { task, output } => solve(&task, output.as_deref()),
        CliCommand::Check {
            task,
            solution,
            json,
            external,
            buy,
        } => {
            let checker = if external {
                let Some(checker) = config.checker else {
                    bail!("--external needs a [checker] section in the configuration");
                };
                Some(ExternalChecker::new(checker))
            } else {
                None
            };
            check(
                &task,
                &solution,
                json,
                checker.as_ref().map(|checker| checker as &dyn Checker),
                buy.as_deref(),
            )
        }
        CliCommand::Interactive { task } => {
            let mut session = Session::new(load_task(&task)?)
                .with_context(|| format!("failed to build the grid for {}", task.display()))?;
            interactive::run(&mut session, io::stdin().lock(), io::stdout().lock())
        }
    }
}

fn init_tracing(cli_filter: Option<&str>, config_filter: Option<&str>) -> Result<()> {
    let filter = match cli_filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid --log filter `{directives}`"))?,
        None => match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => {
                let directives = config_filter.unwrap_or(DEFAULT_LOG_FILTER);
                EnvFilter::try_new(directives)
                    .with_context(|| format!("invalid log_filter `{directives}`"))?
            }
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}

fn load_task(path: &Path) -> Result<TaskDescription> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read task at {}", path.display()))?;
    TaskDescription::parse(&text)
        .with_context(|| format!("failed to parse task description in {}", path.display()))
}

fn solve(task_path: &Path, output: Option<&Path>) -> Result<()> {
    let task = load_task(task_path)?;
    let world = World::from_task(&task)
        .with_context(|| format!("failed to build the grid for {}", task_path.display()))?;

    let mut commands = Vec::new();
    let summary = CoveragePlanner::new()
        .plan(query::grid_view(&world), task.start(), &mut commands)
        .context("coverage planner failed")?;

    let report = Report::replay(&task, &commands)?;
    if !report.complete || report.rejected > 0 {
        bail!("planned walk does not replay cleanly: {report}");
    }
    info!(
        task = %task_path.display(),
        moves = summary.moves,
        cells = summary.total,
        "solved"
    );

    let solution = wrappy_core::encode(&commands);
    match output {
        Some(path) => fs::write(path, format!("{solution}\n"))
            .with_context(|| format!("failed to write solution to {}", path.display())),
        None => {
            println!("{solution}");
            Ok(())
        }
    }
}

fn check(
    task_path: &Path,
    solution_path: &Path,
    json: bool,
    checker: Option<&dyn Checker>,
    purchase: Option<&str>,
) -> Result<()> {
    if let Some(purchase) = purchase {
        if let Some(code) = purchase.chars().find(|&code| BoosterKind::from_code(code).is_none()) {
            bail!("unknown booster code `{code}` in --buy");
        }
        if checker.is_none() {
            warn!("--buy only affects the external checker");
        }
    }

    let task = load_task(task_path)?;
    let text = fs::read_to_string(solution_path)
        .with_context(|| format!("failed to read solution at {}", solution_path.display()))?;
    let commands = wrappy_core::parse(&text)
        .with_context(|| format!("failed to parse solution in {}", solution_path.display()))?;
    let report = Report::replay(&task, &commands)?;

    let verdict = checker
        .map(|checker| checker.check(task_path, solution_path, purchase))
        .transpose()?;

    if json {
        let output = CheckOutput {
            report: &report,
            verdict: verdict.as_ref(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("failed to serialize report")?
        );
    } else {
        println!("{report}");
        if let Some(verdict) = &verdict {
            println!("checker: {verdict}");
        }
    }

    if !report.complete {
        bail!(
            "solution leaves {} cells unwrapped",
            report.total.saturating_sub(report.wrapped)
        );
    }
    Ok(())
}
