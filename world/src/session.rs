//! Command history with undo by replay.

use tracing::{debug, trace};
use wrappy_core::{Command, DescriptionError, Event, TaskDescription, Token};

use crate::{apply, World};

/// Rebuilds the world for a task by applying the provided commands in order.
pub fn replay(task: &TaskDescription, commands: &[Command]) -> Result<World, DescriptionError> {
    let mut world = World::from_task(task)?;
    let mut events = Vec::new();
    for &command in commands {
        events.clear();
        apply(&mut world, command, &mut events);
    }
    Ok(world)
}

/// Interactive run over one task.
///
/// The accepted command history is the only source of truth: undo drops the
/// last command and rebuilds the world from the task by replaying the rest.
#[derive(Clone, Debug)]
pub struct Session {
    task: TaskDescription,
    world: World,
    commands: Vec<Command>,
}

impl Session {
    /// Starts a fresh session on the provided task.
    pub fn new(task: TaskDescription) -> Result<Self, DescriptionError> {
        let world = World::from_task(&task)?;
        Ok(Self {
            task,
            world,
            commands: Vec::new(),
        })
    }

    /// Task the session runs on.
    #[must_use]
    pub fn task(&self) -> &TaskDescription {
        &self.task
    }

    /// Current world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Commands executed so far, rejected ones included.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Applies a command and appends it to the history.
    pub fn execute(&mut self, command: Command, out_events: &mut Vec<Event>) {
        trace!(%command, step = self.commands.len(), "executing command");
        apply(&mut self.world, command, out_events);
        self.commands.push(command);
    }

    /// Applies a token from the interactive stream.
    ///
    /// Returns `false` when the token was an undo with nothing to undo.
    pub fn feed(
        &mut self,
        token: Token,
        out_events: &mut Vec<Event>,
    ) -> Result<bool, DescriptionError> {
        match token {
            Token::Command(command) => {
                self.execute(command, out_events);
                Ok(true)
            }
            Token::Undo => Ok(self.undo()?.is_some()),
        }
    }

    /// Removes the most recent command and rebuilds the world without it.
    ///
    /// Returns the removed command, or `None` when the history is empty. The
    /// session is left unchanged if the rebuild fails.
    pub fn undo(&mut self) -> Result<Option<Command>, DescriptionError> {
        let Some((&last, rest)) = self.commands.split_last() else {
            return Ok(None);
        };
        let world = replay(&self.task, rest)?;
        let _ = self.commands.pop();
        self.world = world;
        debug!(command = %last, remaining = self.commands.len(), "undid command");
        Ok(Some(last))
    }

    /// Clears the history and restores the initial world.
    pub fn reset(&mut self) -> Result<(), DescriptionError> {
        self.world = World::from_task(&self.task)?;
        self.commands.clear();
        Ok(())
    }

    /// Renders the history in wire form.
    #[must_use]
    pub fn solution(&self) -> String {
        wrappy_core::encode(&self.commands)
    }
}
