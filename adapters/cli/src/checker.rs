//! External scoring of solutions.
//!
//! The configured checker program receives the task and solution paths, plus
//! the booster purchase string when one is given. Its verdict is the last
//! non-empty line it prints on stdout.

use std::{fmt, path::Path, process};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::config::CheckerConfig;

/// Scores a solution file against a task file.
pub(crate) trait Checker {
    /// Runs the check, forwarding the optional booster purchase string.
    fn check(&self, task: &Path, solution: &Path, purchase: Option<&str>) -> Result<Verdict>;
}

/// Final message reported by a checker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Verdict {
    /// Last non-empty line of checker output.
    pub(crate) message: String,
    /// Score when the message is a bare number.
    pub(crate) score: Option<u64>,
}

impl Verdict {
    /// Extracts the verdict from the checker's standard output.
    pub(crate) fn from_output(stdout: &str) -> Result<Self> {
        let Some(line) = stdout.lines().rev().map(str::trim).find(|line| !line.is_empty()) else {
            bail!("checker produced no output");
        };
        Ok(Self {
            message: line.to_owned(),
            score: line.parse().ok(),
        })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.score {
            Some(score) => write!(f, "score {score}"),
            None => f.write_str(&self.message),
        }
    }
}

/// Checker that runs a configured program as a child process.
#[derive(Clone, Debug)]
pub(crate) struct ExternalChecker {
    config: CheckerConfig,
}

impl ExternalChecker {
    pub(crate) fn new(config: CheckerConfig) -> Self {
        Self { config }
    }
}

impl Checker for ExternalChecker {
    fn check(&self, task: &Path, solution: &Path, purchase: Option<&str>) -> Result<Verdict> {
        let program = &self.config.program;
        let mut command = process::Command::new(program);
        let _ = command.args(&self.config.args).arg(task).arg(solution);
        if let Some(purchase) = purchase {
            let _ = command.arg(purchase);
        }

        debug!(program = %program.display(), "invoking external checker");
        let output = command
            .output()
            .with_context(|| format!("failed to run checker {}", program.display()))?;
        if !output.status.success() {
            bail!(
                "checker {} exited with {}: {}",
                program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Verdict::from_output(&String::from_utf8_lossy(&output.stdout))
    }
}
