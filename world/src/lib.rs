#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative map and agent state for Wrappy.

use std::collections::BTreeSet;

use tracing::debug;
use wrappy_core::{
    BoosterKind, CellState, Command, DescriptionError, Direction, Event, IllegalCommand, Offset,
    Point, TaskDescription,
};

mod agent;
mod grid;
mod session;
mod visibility;

pub use agent::{Agent, Resources, DRILL_TURNS, FAST_MOVE_TURNS, INITIAL_MANIPULATORS};
pub use grid::Grid;
pub use session::{replay, Session};
pub use visibility::visible;

/// Represents the authoritative state of one run on one task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct World {
    grid: Grid,
    agent: Agent,
    beacons: BTreeSet<Point>,
}

impl World {
    /// Builds the grid for the task and places the agent on its start cell.
    ///
    /// The start cell and every cell visible through the initial manipulators
    /// are wrapped immediately; a booster lying on the start cell is collected.
    pub fn from_task(task: &TaskDescription) -> Result<Self, DescriptionError> {
        let grid = Grid::build(task)?;
        let mut world = Self {
            grid,
            agent: Agent::new(task.start()),
            beacons: BTreeSet::new(),
        };

        let mut events = Vec::new();
        world.arrive(&mut events);
        Ok(world)
    }

    fn move_agent(
        &mut self,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> Result<(), IllegalCommand> {
        self.step(direction, out_events)?;
        if self.agent.resources().fast_move_active() {
            // The second step of a fast move is silently clipped.
            let _ = self.step(direction, out_events);
        }
        Ok(())
    }

    fn step(
        &mut self,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> Result<(), IllegalCommand> {
        let from = self.agent.position();
        let to = from.step(direction).ok_or(IllegalCommand::OutOfBounds)?;

        match self.grid.get(to) {
            None => return Err(IllegalCommand::OutOfBounds),
            Some(CellState::Wall) => {
                if !self.agent.resources().drill_active() {
                    return Err(IllegalCommand::Blocked);
                }
                self.grid.set(to, CellState::Free);
                out_events.push(Event::WallDrilled { cell: to });
            }
            Some(_) => {}
        }

        self.agent.move_to(to);
        out_events.push(Event::AgentMoved { from, to });
        self.arrive(out_events);
        Ok(())
    }

    /// Collects any booster under the agent and wraps everything it covers.
    fn arrive(&mut self, out_events: &mut Vec<Event>) {
        let position = self.agent.position();
        if let Some(CellState::Booster { kind, wrapped }) = self.grid.get(position) {
            self.agent.resources_mut().collect(kind);
            let state = if wrapped {
                CellState::Wrapped
            } else {
                CellState::Free
            };
            self.grid.set(position, state);
            out_events.push(Event::BoosterCollected {
                kind,
                cell: position,
            });
        }

        wrap(&mut self.grid, position, out_events);
        for &offset in self.agent.manipulators() {
            let Some(target) = position.offset(offset) else {
                continue;
            };
            if visible(&self.grid, position, target) {
                wrap(&mut self.grid, target, out_events);
            }
        }
    }

    fn attach(
        &mut self,
        offset: Offset,
        out_events: &mut Vec<Event>,
    ) -> Result<(), IllegalCommand> {
        // No cell of the grid lies further away than its larger dimension.
        let reach = self.grid.width().max(self.grid.height());
        if offset.dx().unsigned_abs() >= reach || offset.dy().unsigned_abs() >= reach {
            return Err(IllegalCommand::InvalidManipulator);
        }
        self.agent.attach(offset)?;
        out_events.push(Event::ManipulatorAttached { offset });
        Ok(())
    }

    fn activate(
        &mut self,
        kind: BoosterKind,
        out_events: &mut Vec<Event>,
    ) -> Result<(), IllegalCommand> {
        let resources = self.agent.resources_mut();
        resources.spend(kind)?;
        match kind {
            BoosterKind::FastMove => {
                resources.fast_move_turns = FAST_MOVE_TURNS;
                out_events.push(Event::FastMoveActivated);
            }
            BoosterKind::Drill => {
                resources.drill_turns = DRILL_TURNS;
                out_events.push(Event::DrillActivated);
            }
            BoosterKind::ManipulatorExtra
            | BoosterKind::SpawnPoint
            | BoosterKind::TeleportBeaconResource => {}
        }
        Ok(())
    }

    fn place_beacon(&mut self, out_events: &mut Vec<Event>) -> Result<(), IllegalCommand> {
        let cell = self.agent.position();
        if self.beacons.contains(&cell) {
            return Err(IllegalCommand::BeaconExists);
        }
        self.agent
            .resources_mut()
            .spend(BoosterKind::TeleportBeaconResource)?;
        let _ = self.beacons.insert(cell);
        self.grid.set(cell, CellState::Beacon);
        out_events.push(Event::BeaconPlaced { cell });
        Ok(())
    }

    fn teleport(
        &mut self,
        target: Point,
        out_events: &mut Vec<Event>,
    ) -> Result<(), IllegalCommand> {
        if !self.beacons.contains(&target) {
            return Err(IllegalCommand::UnknownBeacon);
        }
        let from = self.agent.position();
        self.agent.move_to(target);
        out_events.push(Event::Teleported { from, to: target });
        Ok(())
    }
}

fn wrap(grid: &mut Grid, cell: Point, out_events: &mut Vec<Event>) {
    let wrapped = match grid.get(cell) {
        Some(CellState::Free) => CellState::Wrapped,
        Some(CellState::Booster {
            kind,
            wrapped: false,
        }) => CellState::Booster {
            kind,
            wrapped: true,
        },
        _ => return,
    };
    grid.set(cell, wrapped);
    out_events.push(Event::CellWrapped { cell });
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands whose preconditions are not met are consumed without effect and
/// reported through [`Event::CommandRejected`]. Every command, rejected or not,
/// counts down the active fast-move and drill effects by one turn.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let outcome = match command {
        Command::Move { direction } => world.move_agent(direction, out_events),
        Command::Rotate { rotation } => {
            world.agent.rotate(rotation);
            out_events.push(Event::ManipulatorsRotated { rotation });
            Ok(())
        }
        Command::AttachManipulator { offset } => world.attach(offset, out_events),
        Command::ActivateFastMove => world.activate(BoosterKind::FastMove, out_events),
        Command::ActivateDrill => world.activate(BoosterKind::Drill, out_events),
        Command::PlaceBeacon => world.place_beacon(out_events),
        Command::Teleport { target } => world.teleport(target, out_events),
    };

    world.agent.resources_mut().tick();

    if let Err(reason) = outcome {
        debug!(%command, %reason, position = %world.agent.position(), "command rejected");
        out_events.push(Event::CommandRejected { command, reason });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{visible, Agent, Grid, World};
    use wrappy_core::{CellState, GridView, Point};

    /// Provides read-only access to the world's cell grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Exposes a read-only view of the cell grid for systems.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.grid.view()
    }

    /// Provides read-only access to the agent.
    #[must_use]
    pub fn agent(world: &World) -> &Agent {
        &world.agent
    }

    /// Enumerates placed beacons in ascending cell order.
    pub fn beacons(world: &World) -> impl Iterator<Item = Point> + '_ {
        world.beacons.iter().copied()
    }

    /// Cells the manipulators currently reach, honouring line of sight.
    ///
    /// Renderers use this to highlight the agent's reach.
    #[must_use]
    pub fn reachable_manipulator_cells(world: &World) -> Vec<Point> {
        let position = world.agent.position();
        world
            .agent
            .manipulators()
            .iter()
            .filter_map(|&offset| position.offset(offset))
            .filter(|&target| visible(&world.grid, position, target))
            .collect()
    }

    /// Summarises how much of the map has been wrapped.
    #[must_use]
    pub fn coverage(world: &World) -> Coverage {
        let cells = world.grid.cells();
        Coverage {
            wrapped: cells.iter().filter(|state| state.is_covered()).count(),
            total: cells.iter().filter(|state| state.is_passable()).count(),
        }
    }

    /// Reports whether the provided cell is wrapped.
    #[must_use]
    pub fn is_wrapped(world: &World, cell: Point) -> bool {
        world.grid.get(cell).is_some_and(CellState::is_covered)
    }

    /// Wrapped and total non-wall cell counts.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Coverage {
        /// Cells wrapped so far, beacon cells included.
        pub wrapped: usize,
        /// Cells that are not walls.
        pub total: usize,
    }

    impl Coverage {
        /// Cells still waiting to be wrapped.
        #[must_use]
        pub const fn remaining(&self) -> usize {
            self.total.saturating_sub(self.wrapped)
        }

        /// Reports whether every non-wall cell is wrapped.
        #[must_use]
        pub const fn is_complete(&self) -> bool {
            self.wrapped >= self.total
        }
    }
}

#[cfg(test)]
mod tests {
    use wrappy_core::Rotation;

    use super::*;

    fn world(description: &str) -> World {
        let task = TaskDescription::parse(description).expect("task parses");
        World::from_task(&task).expect("world builds")
    }

    fn run(world: &mut World, stream: &str) -> Vec<Event> {
        let mut events = Vec::new();
        for command in wrappy_core::parse(stream).expect("stream parses") {
            apply(world, command, &mut events);
        }
        events
    }

    #[test]
    fn start_cell_and_initial_reach_are_wrapped() {
        let world = world("(0,0),(4,0),(4,4),(0,4)#(1,1)##");
        for (x, y) in [(1, 1), (2, 0), (2, 1), (2, 2)] {
            assert!(query::is_wrapped(&world, Point::new(x, y)), "({x},{y}) should be wrapped");
        }
        assert_eq!(query::coverage(&world).wrapped, 4);
    }

    #[test]
    fn moves_wrap_and_walls_reject() {
        let mut world = world("(0,0),(3,0),(3,3),(0,3)#(0,0)##");
        let events = run(&mut world, "WWW");

        assert_eq!(query::agent(&world).position(), Point::new(0, 2));
        assert_eq!(
            events.last(),
            Some(&Event::CommandRejected {
                command: Command::Move {
                    direction: Direction::North
                },
                reason: IllegalCommand::Blocked,
            })
        );

        let events = run(&mut world, "A");
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                command: Command::Move {
                    direction: Direction::West
                },
                reason: IllegalCommand::OutOfBounds,
            }]
        );
    }

    #[test]
    fn boosters_are_collected_on_arrival() {
        let mut world = world("(0,0),(4,0),(4,4),(0,4)#(0,0)##B(0,1);L(0,2);R(0,3)");
        let events = run(&mut world, "WWW");

        let resources = query::agent(&world).resources();
        assert_eq!(resources.count(BoosterKind::ManipulatorExtra), 1);
        assert_eq!(resources.count(BoosterKind::Drill), 1);
        assert_eq!(resources.count(BoosterKind::TeleportBeaconResource), 1);
        assert!(events.contains(&Event::BoosterCollected {
            kind: BoosterKind::Drill,
            cell: Point::new(0, 2),
        }));
        assert_eq!(
            query::grid(&world).get(Point::new(0, 1)),
            Some(CellState::Wrapped)
        );
    }

    #[test]
    fn manipulators_wrap_booster_cells_without_collecting_them() {
        let mut world = world("(0,0),(2,0),(2,2),(0,2)#(0,0)##B(1,1)");
        let booster = Point::new(1, 1);

        assert_eq!(
            query::grid(&world).get(booster),
            Some(CellState::Booster {
                kind: BoosterKind::ManipulatorExtra,
                wrapped: true,
            })
        );
        assert!(query::reachable_manipulator_cells(&world).contains(&booster));
        assert!(query::is_wrapped(&world, booster));

        let _ = run(&mut world, "W");
        assert_eq!(
            query::coverage(&world),
            query::Coverage {
                wrapped: 4,
                total: 4
            }
        );
        assert!(query::coverage(&world).is_complete());
        assert_eq!(query::agent(&world).resources().manipulators, 0);

        let events = run(&mut world, "D");
        assert!(events.contains(&Event::BoosterCollected {
            kind: BoosterKind::ManipulatorExtra,
            cell: booster,
        }));
        assert!(
            !events.contains(&Event::CellWrapped { cell: booster }),
            "cell was already wrapped"
        );
        assert_eq!(query::agent(&world).resources().manipulators, 1);
        assert_eq!(query::grid(&world).get(booster), Some(CellState::Wrapped));
    }

    #[test]
    fn manipulators_beyond_the_grid_extent_are_rejected() {
        let mut world = world("(0,0),(3,0),(3,3),(0,3)#(0,0)##B(0,1)");
        let events = run(&mut world, "WB(-2147483648,0)B(0,4)E");

        let rejections: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Event::CommandRejected { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            rejections,
            vec![
                IllegalCommand::InvalidManipulator,
                IllegalCommand::InvalidManipulator
            ]
        );
        assert_eq!(query::agent(&world).manipulators().len(), 3);
        assert_eq!(query::agent(&world).resources().manipulators, 1);

        let _ = run(&mut world, "B(0,3)E");
        assert_eq!(
            query::agent(&world).manipulators().last(),
            Some(&Offset::new(3, 0))
        );
    }

    #[test]
    fn attached_manipulator_wraps_only_visible_cells() {
        let open = "(0,0),(3,0),(3,8),(0,8)#(1,1)##B(1,2)";
        let walled = "(0,0),(3,0),(3,8),(0,8)#(1,1)#(1,4),(2,4),(2,5),(1,5)#B(1,2)";

        let mut clear = world(open);
        let _ = run(&mut clear, "WB(0,2)");
        assert!(!query::is_wrapped(&clear, Point::new(1, 5)));
        let _ = run(&mut clear, "W");
        assert!(query::is_wrapped(&clear, Point::new(1, 5)));

        let mut blocked = world(walled);
        let _ = run(&mut blocked, "WB(0,2)W");
        assert_eq!(query::agent(&blocked).position(), Point::new(1, 3));
        assert!(!visible(query::grid(&blocked), Point::new(1, 3), Point::new(1, 5)));
        assert!(!query::is_wrapped(&blocked, Point::new(1, 5)));
    }

    #[test]
    fn rotation_changes_reach() {
        let mut world = world("(0,0),(5,0),(5,5),(0,5)#(2,2)##");
        let _ = run(&mut world, "Q");
        assert_eq!(
            query::agent(&world).manipulators(),
            &[Offset::new(0, 1), Offset::new(-1, 1), Offset::new(1, 1)]
        );
        let events = run(&mut world, "E");
        assert_eq!(
            events,
            vec![Event::ManipulatorsRotated {
                rotation: Rotation::Clockwise
            }]
        );
        assert_eq!(query::agent(&world).manipulators(), &INITIAL_MANIPULATORS);
    }

    #[test]
    fn fast_move_takes_two_steps_and_clips_at_walls() {
        let mut world = world("(0,0),(6,0),(6,3),(0,3)#(1,1)##F(2,1)");

        let _ = run(&mut world, "DF");
        assert_eq!(query::agent(&world).resources().fast_move_turns, 49);

        let _ = run(&mut world, "D");
        assert_eq!(query::agent(&world).position(), Point::new(4, 1));
        assert_eq!(query::agent(&world).resources().fast_move_turns, 48);

        let _ = run(&mut world, "D");
        assert_eq!(query::agent(&world).position(), Point::new(5, 1));
    }

    #[test]
    fn fast_move_wears_off() {
        let mut world = world("(0,0),(6,0),(6,3),(0,3)#(1,1)##F(2,1)");
        let _ = run(&mut world, "DF");
        for _ in 0..49 {
            let _ = run(&mut world, "E");
        }
        assert!(!query::agent(&world).resources().fast_move_active());

        let _ = run(&mut world, "A");
        assert_eq!(query::agent(&world).position(), Point::new(1, 1));
    }

    #[test]
    fn drill_cuts_through_walls() {
        let mut world = world("(0,0),(5,0),(5,3),(0,3)#(0,1)#(2,0),(3,0),(3,3),(2,3)#L(1,1)");
        let _ = run(&mut world, "D");
        let events = run(&mut world, "D");
        assert!(matches!(
            events.last(),
            Some(Event::CommandRejected {
                reason: IllegalCommand::Blocked,
                ..
            })
        ));

        let events = run(&mut world, "LD");
        assert!(events.contains(&Event::WallDrilled {
            cell: Point::new(2, 1)
        }));
        assert_eq!(query::agent(&world).position(), Point::new(2, 1));
        assert_eq!(
            query::grid(&world).get(Point::new(2, 1)),
            Some(CellState::Wrapped)
        );
        assert_eq!(query::agent(&world).resources().drill_turns, DRILL_TURNS - 2);
    }

    #[test]
    fn beacons_enable_teleport() {
        let mut world = world("(0,0),(5,0),(5,5),(0,5)#(0,0)##R(1,0)");

        let events = run(&mut world, "T(1,0)");
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                command: Command::Teleport {
                    target: Point::new(1, 0)
                },
                reason: IllegalCommand::UnknownBeacon,
            }]
        );

        let _ = run(&mut world, "DRWWW");
        assert_eq!(query::beacons(&world).collect::<Vec<_>>(), vec![Point::new(1, 0)]);
        assert_eq!(query::grid(&world).get(Point::new(1, 0)), Some(CellState::Beacon));

        let events = run(&mut world, "T(1,0)");
        assert_eq!(
            events,
            vec![Event::Teleported {
                from: Point::new(1, 3),
                to: Point::new(1, 0),
            }]
        );

        let events = run(&mut world, "R");
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                command: Command::PlaceBeacon,
                reason: IllegalCommand::BeaconExists,
            }]
        );
    }

    #[test]
    fn missing_boosters_are_rejected_without_side_effects() {
        let mut world = world("(0,0),(3,0),(3,3),(0,3)#(0,0)##");
        let before = world.clone();
        let events = run(&mut world, "FLRB(0,1)");

        assert_eq!(world, before);
        assert_eq!(events.len(), 4);
        assert!(events
            .iter()
            .all(|event| matches!(event, Event::CommandRejected { .. })));
    }
}
