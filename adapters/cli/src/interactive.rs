//! Line-oriented interactive driver with undo.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use wrappy_core::{tokenize, Event};
use wrappy_world::{query, Session};

/// Reads symbol runs line by line, applying them to the session.
///
/// Malformed lines and rejected commands are reported and the session carries
/// on. The recorded stream is written once the input ends.
pub(crate) fn run(session: &mut Session, input: impl BufRead, mut output: impl Write) -> Result<()> {
    let mut events = Vec::new();

    for line in input.lines() {
        let line = line.context("failed to read interactive input")?;
        let tokens = match tokenize(&line) {
            Ok(tokens) => tokens,
            Err(error) => {
                writeln!(output, "error: {error}")?;
                continue;
            }
        };

        for token in tokens {
            events.clear();
            let applied = session
                .feed(token, &mut events)
                .context("failed to rebuild the world while undoing")?;
            if !applied {
                writeln!(output, "nothing to undo")?;
            }
            for event in &events {
                if let Event::CommandRejected { command, reason } = event {
                    writeln!(output, "rejected {command}: {reason}")?;
                }
            }
        }

        write_status(session, &mut output)?;
    }

    writeln!(output, "{}", session.solution())?;
    output.flush()?;
    Ok(())
}

fn write_status(session: &Session, output: &mut impl Write) -> Result<()> {
    let world = session.world();
    let agent = query::agent(world);
    let resources = agent.resources();
    let coverage = query::coverage(world);
    let manipulators = agent
        .manipulators()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    writeln!(
        output,
        "at {} facing [{manipulators}] wrapped {}/{} | B{} F{} L{} R{} | fast {} drill {}",
        agent.position(),
        coverage.wrapped,
        coverage.total,
        resources.manipulators,
        resources.fast_moves,
        resources.drills,
        resources.teleports,
        resources.fast_move_turns,
        resources.drill_turns,
    )?;
    Ok(())
}
