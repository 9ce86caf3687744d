#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Wrappy simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired agent actions, the world executes those commands via its
//! `apply` entry point, and then reports [`Event`] values describing what
//! actually happened. Systems read immutable views such as [`GridView`] and
//! respond exclusively with new command batches.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod stream;
mod task;

pub use stream::{encode, parse, tokenize, StreamError, Token, UNDO_SYMBOL};
pub use task::{BoosterPlacement, DescriptionError, Polygon, TaskDescription};

/// Commands that express every action the agent can perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Moves the agent one cell (two while fast-move is active).
    Move {
        /// Direction of travel.
        direction: Direction,
    },
    /// Rotates every manipulator offset by a quarter turn about the agent.
    Rotate {
        /// Sense of the quarter turn.
        rotation: Rotation,
    },
    /// Spends a manipulator booster to extend the agent's reach.
    AttachManipulator {
        /// Position of the new manipulator relative to the agent.
        offset: Offset,
    },
    /// Spends a fast-move booster.
    ActivateFastMove,
    /// Spends a drill booster.
    ActivateDrill,
    /// Spends a teleport booster to mark the agent's cell as a beacon.
    PlaceBeacon,
    /// Jumps to a previously placed beacon.
    Teleport {
        /// Beacon cell the agent should land on.
        target: Point,
    },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { direction } => write!(f, "{}", direction.symbol()),
            Self::Rotate { rotation } => write!(f, "{}", rotation.symbol()),
            Self::AttachManipulator { offset } => write!(f, "B{offset}"),
            Self::ActivateFastMove => f.write_str("F"),
            Self::ActivateDrill => f.write_str("L"),
            Self::PlaceBeacon => f.write_str("R"),
            Self::Teleport { target } => write!(f, "T{target}"),
        }
    }
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the agent stepped between two adjacent cells.
    AgentMoved {
        /// Cell the agent occupied before the step.
        from: Point,
        /// Cell the agent occupies after the step.
        to: Point,
    },
    /// Announces that a previously uncovered cell is now wrapped.
    CellWrapped {
        /// Cell that became wrapped.
        cell: Point,
    },
    /// Announces that an active drill turned a wall cell into a wrapped cell.
    WallDrilled {
        /// Cell that was drilled through.
        cell: Point,
    },
    /// Confirms that the agent picked up a booster lying on the map.
    BoosterCollected {
        /// Kind of booster that was collected.
        kind: BoosterKind,
        /// Cell the booster was lying on.
        cell: Point,
    },
    /// Confirms that every manipulator was rotated.
    ManipulatorsRotated {
        /// Sense of the applied rotation.
        rotation: Rotation,
    },
    /// Confirms that a manipulator was attached.
    ManipulatorAttached {
        /// Offset of the new manipulator.
        offset: Offset,
    },
    /// Confirms that fast-move became active.
    FastMoveActivated,
    /// Confirms that the drill became active.
    DrillActivated,
    /// Confirms that a beacon was placed.
    BeaconPlaced {
        /// Cell that now holds the beacon.
        cell: Point,
    },
    /// Confirms that the agent teleported to a beacon.
    Teleported {
        /// Cell the agent left.
        from: Point,
        /// Beacon cell the agent arrived on.
        to: Point,
    },
    /// Reports that a command was consumed without effect.
    CommandRejected {
        /// Command that could not be carried out.
        command: Command,
        /// Specific precondition that was not met.
        reason: IllegalCommand,
    },
}

/// Preconditions a command may fail to meet.
///
/// These never abort a session: the world consumes the command, leaves its
/// state untouched and reports the reason through [`Event::CommandRejected`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum IllegalCommand {
    /// The destination lies outside the grid.
    #[error("destination lies outside the grid")]
    OutOfBounds,
    /// The destination is a wall and no drill is active.
    #[error("destination is a wall")]
    Blocked,
    /// The agent holds no unused booster of the required kind.
    #[error("no unused {0} booster")]
    MissingBooster(BoosterKind),
    /// The manipulator offset targets the agent itself, reaches beyond the
    /// grid extent or is already attached.
    #[error("manipulator offset is the agent's own cell, out of reach or already attached")]
    InvalidManipulator,
    /// The agent's cell already holds a beacon.
    #[error("a beacon already occupies this cell")]
    BeaconExists,
    /// The teleport target is not a placed beacon.
    #[error("no beacon at the teleport target")]
    UnknownBeacon,
}

/// Cardinal movement directions available to the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing x, written `A`.
    West,
    /// Movement toward increasing x, written `D`.
    East,
    /// Movement toward decreasing y, written `S`.
    South,
    /// Movement toward increasing y, written `W`.
    North,
}

impl Direction {
    /// Every direction in the planner's exploration order.
    pub const ALL: [Direction; 4] = [
        Direction::West,
        Direction::East,
        Direction::South,
        Direction::North,
    ];

    /// Unit offset travelled by a single step.
    #[must_use]
    pub const fn delta(self) -> Offset {
        match self {
            Self::West => Offset::new(-1, 0),
            Self::East => Offset::new(1, 0),
            Self::South => Offset::new(0, -1),
            Self::North => Offset::new(0, 1),
        }
    }

    /// Direction that undoes a step in this direction.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::West => Self::East,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::North => Self::South,
        }
    }

    /// Wire symbol of the move command.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::West => 'A',
            Self::East => 'D',
            Self::South => 'S',
            Self::North => 'W',
        }
    }

    /// Resolves a move command symbol.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'A' => Some(Self::West),
            'D' => Some(Self::East),
            'S' => Some(Self::South),
            'W' => Some(Self::North),
            _ => None,
        }
    }
}

/// Sense of a quarter-turn manipulator rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    /// Clockwise turn, written `E`.
    Clockwise,
    /// Counter-clockwise turn, written `Q`.
    CounterClockwise,
}

impl Rotation {
    /// Wire symbol of the rotate command.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Clockwise => 'E',
            Self::CounterClockwise => 'Q',
        }
    }
}

/// Location of a single grid cell. `x` grows east and `y` grows north.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    x: u32,
    y: u32,
}

impl Point {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Cell displaced by the offset, or `None` when either axis would turn negative.
    #[must_use]
    pub fn offset(self, offset: Offset) -> Option<Self> {
        let x = self.x.checked_add_signed(offset.dx())?;
        let y = self.y.checked_add_signed(offset.dy())?;
        Some(Self::new(x, y))
    }

    /// Adjacent cell in the provided direction.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        self.offset(direction.delta())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Signed displacement relative to the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    dx: i32,
    dy: i32,
}

impl Offset {
    /// Creates a new displacement.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Vertical component.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Offset turned a quarter about the origin.
    ///
    /// Clockwise maps `(dx, dy)` to `(dy, -dx)`; counter-clockwise maps it to
    /// `(-dy, dx)`. Negation saturates, so `i32::MIN` turns into `i32::MAX`.
    #[must_use]
    pub const fn rotated(self, rotation: Rotation) -> Self {
        match rotation {
            Rotation::Clockwise => Self::new(self.dy, self.dx.saturating_neg()),
            Rotation::CounterClockwise => Self::new(self.dy.saturating_neg(), self.dx),
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.dx, self.dy)
    }
}

/// Kinds of boosters that may lie on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoosterKind {
    /// Extra manipulator arm, code `B`.
    ManipulatorExtra,
    /// Fast wheels, code `F`.
    FastMove,
    /// Drill, code `L`.
    Drill,
    /// Spawn point, code `X`. It grants nothing when stepped on.
    SpawnPoint,
    /// Teleport beacon resource, code `R`.
    TeleportBeaconResource,
}

impl BoosterKind {
    /// Resolves a booster code from the task description.
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'B' => Some(Self::ManipulatorExtra),
            'F' => Some(Self::FastMove),
            'L' => Some(Self::Drill),
            'X' => Some(Self::SpawnPoint),
            'R' => Some(Self::TeleportBeaconResource),
            _ => None,
        }
    }

    /// Code used for the booster in task descriptions.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::ManipulatorExtra => 'B',
            Self::FastMove => 'F',
            Self::Drill => 'L',
            Self::SpawnPoint => 'X',
            Self::TeleportBeaconResource => 'R',
        }
    }
}

impl fmt::Display for BoosterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ManipulatorExtra => "manipulator",
            Self::FastMove => "fast-move",
            Self::Drill => "drill",
            Self::SpawnPoint => "spawn point",
            Self::TeleportBeaconResource => "teleport",
        };
        f.write_str(name)
    }
}

/// State held by a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Impassable cell outside the map or inside an obstacle.
    Wall,
    /// Passable cell not yet covered.
    Free,
    /// Passable cell already covered.
    Wrapped,
    /// Passable cell holding an uncollected booster.
    ///
    /// A manipulator may wrap the cell while the booster still lies on it.
    Booster {
        /// Kind of booster lying on the cell.
        kind: BoosterKind,
        /// Whether the cell has been wrapped.
        wrapped: bool,
    },
    /// Covered cell holding a placed teleport beacon.
    Beacon,
}

impl CellState {
    /// Reports whether the agent may stand on the cell without drilling.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// Reports whether the cell counts toward coverage.
    #[must_use]
    pub const fn is_covered(self) -> bool {
        matches!(
            self,
            Self::Wrapped | Self::Beacon | Self::Booster { wrapped: true, .. }
        )
    }
}

/// Read-only view into the dense cell grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [CellState],
    width: u32,
    height: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [CellState], width: u32, height: u32) -> Self {
        Self {
            cells,
            width,
            height,
        }
    }

    /// Returns the state of the provided cell, if it lies within the grid.
    #[must_use]
    pub fn get(&self, cell: Point) -> Option<CellState> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell lies within the grid and is not a wall.
    #[must_use]
    pub fn is_passable(&self, cell: Point) -> bool {
        self.get(cell).is_some_and(CellState::is_passable)
    }

    /// Number of cells that are not walls.
    #[must_use]
    pub fn passable_count(&self) -> usize {
        self.cells.iter().filter(|state| state.is_passable()).count()
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellState> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the width and height of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn index(&self, cell: Point) -> Option<usize> {
        if cell.x() < self.width && cell.y() < self.height {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoosterKind, CellState, Command, Direction, GridView, Offset, Point, Rotation};

    #[test]
    fn rotation_follows_quarter_turn_rules() {
        let offset = Offset::new(1, 2);
        assert_eq!(offset.rotated(Rotation::Clockwise), Offset::new(2, -1));
        assert_eq!(offset.rotated(Rotation::CounterClockwise), Offset::new(-2, 1));
    }

    #[test]
    fn four_rotations_restore_the_offset() {
        let offset = Offset::new(1, -1);
        let turned = (0..4).fold(offset, |acc, _| acc.rotated(Rotation::Clockwise));
        assert_eq!(turned, offset);
    }

    #[test]
    fn rotating_extreme_offsets_saturates() {
        let offset = Offset::new(i32::MIN, i32::MIN);
        assert_eq!(
            offset.rotated(Rotation::Clockwise),
            Offset::new(i32::MIN, i32::MAX)
        );
        assert_eq!(
            offset.rotated(Rotation::CounterClockwise),
            Offset::new(i32::MAX, i32::MIN)
        );
    }

    #[test]
    fn offset_rejects_negative_coordinates() {
        let origin = Point::new(0, 3);
        assert_eq!(origin.step(Direction::West), None);
        assert_eq!(origin.step(Direction::South), Some(Point::new(0, 2)));
        assert_eq!(origin.offset(Offset::new(2, -3)), Some(Point::new(2, 0)));
    }

    #[test]
    fn inverse_directions_cancel() {
        for direction in Direction::ALL {
            let start = Point::new(5, 5);
            let there = start.step(direction).expect("step inside grid");
            assert_eq!(there.step(direction.inverse()), Some(start));
        }
    }

    #[test]
    fn booster_and_move_codes_are_independent() {
        assert_eq!(BoosterKind::from_code('R'), Some(BoosterKind::TeleportBeaconResource));
        assert_eq!(Command::PlaceBeacon.to_string(), "R");
        assert_eq!(BoosterKind::from_code('A'), None);
        assert_eq!(Direction::from_symbol('R'), None);
    }

    #[test]
    fn commands_render_in_wire_form() {
        let rendered: String = [
            Command::Move {
                direction: Direction::North,
            },
            Command::Rotate {
                rotation: Rotation::CounterClockwise,
            },
            Command::AttachManipulator {
                offset: Offset::new(-1, 2),
            },
            Command::Teleport {
                target: Point::new(3, 4),
            },
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(rendered, "WQB(-1,2)T(3,4)");
    }

    #[test]
    fn command_survives_json_round_trip() {
        let command = Command::AttachManipulator {
            offset: Offset::new(0, 2),
        };
        let json = serde_json::to_string(&command).expect("serialize");
        let restored: Command = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, command);
    }

    #[test]
    fn grid_view_reports_bounds_and_walls() {
        let cells = [
            CellState::Wall,
            CellState::Free,
            CellState::Booster {
                kind: BoosterKind::Drill,
                wrapped: true,
            },
            CellState::Wrapped,
        ];
        let view = GridView::new(&cells, 2, 2);
        assert!(!view.is_passable(Point::new(0, 0)));
        assert!(view.is_passable(Point::new(0, 1)));
        assert_eq!(view.get(Point::new(1, 1)), Some(CellState::Wrapped));
        assert_eq!(view.get(Point::new(2, 0)), None);
        assert_eq!(view.passable_count(), 3);
        assert_eq!(view.iter().filter(|state| state.is_covered()).count(), 2);
    }
}
