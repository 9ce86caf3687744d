//! Local replay of a solution into a coverage report.

use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;
use wrappy_core::{Command, Event, TaskDescription};
use wrappy_world::{self as world, query, World};

/// Outcome of replaying a solution locally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Report {
    /// Commands in the solution.
    pub(crate) commands: usize,
    /// Commands whose preconditions were not met.
    pub(crate) rejected: usize,
    /// Cells wrapped once the solution has run.
    pub(crate) wrapped: usize,
    /// Non-wall cells on the map.
    pub(crate) total: usize,
    /// Whether every non-wall cell ended up wrapped.
    pub(crate) complete: bool,
}

impl Report {
    /// Replays the commands on a fresh world built from the task.
    pub(crate) fn replay(task: &TaskDescription, commands: &[Command]) -> Result<Self> {
        let mut world = World::from_task(task).context("failed to build the task grid")?;
        let mut events = Vec::new();
        let mut rejected = 0;

        for &command in commands {
            events.clear();
            world::apply(&mut world, command, &mut events);
            rejected += events
                .iter()
                .filter(|event| matches!(event, Event::CommandRejected { .. }))
                .count();
        }

        let coverage = query::coverage(&world);
        Ok(Self {
            commands: commands.len(),
            rejected,
            wrapped: coverage.wrapped,
            total: coverage.total,
            complete: coverage.is_complete(),
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} commands ({} rejected), wrapped {}/{} cells{}",
            self.commands,
            self.rejected,
            self.wrapped,
            self.total,
            if self.complete { "" } else { ", incomplete" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> TaskDescription {
        TaskDescription::parse("(0,0),(3,0),(3,2),(0,2)#(0,0)##").expect("task parses")
    }

    #[test]
    fn covering_walk_is_complete() {
        let commands = wrappy_core::parse("WD").expect("stream parses");
        let report = Report::replay(&task(), &commands).expect("replays");

        assert_eq!(
            report,
            Report {
                commands: 2,
                rejected: 0,
                wrapped: 6,
                total: 6,
                complete: true,
            }
        );
        assert_eq!(report.to_string(), "2 commands (0 rejected), wrapped 6/6 cells");
    }

    #[test]
    fn rejected_commands_are_counted() {
        let commands = wrappy_core::parse("ASF").expect("stream parses");
        let report = Report::replay(&task(), &commands).expect("replays");

        assert_eq!(report.rejected, 3);
        assert!(!report.complete);
        assert!(report.to_string().ends_with("incomplete"));
    }
}
