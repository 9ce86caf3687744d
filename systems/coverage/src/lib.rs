#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Offline coverage planner that walks the agent over every non-wall cell.

use thiserror::Error;
use tracing::{debug, info};
use wrappy_core::{Command, Direction, GridView, Point};

/// Failures reported by the coverage planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CoverageError {
    /// The search ran out of cells before covering the map.
    ///
    /// Grids built from a task never trigger this; every non-wall cell is
    /// reachable from the start.
    #[error("search exhausted after visiting {visited} of {total} cells")]
    IncompleteCoverage {
        /// Cells visited when the search gave up.
        visited: usize,
        /// Non-wall cells in the grid.
        total: usize,
    },
    /// The start cell lies outside the grid or on a wall.
    #[error("start cell {0} is not passable")]
    StartNotPassable(Point),
}

/// Outcome of a successful plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanSummary {
    /// Cells visited by the plan.
    pub visited: usize,
    /// Non-wall cells in the grid.
    pub total: usize,
    /// Move commands emitted.
    pub moves: usize,
}

/// Depth-first planner using single-cell moves only.
///
/// Neighbours are explored west, east, south, north. Each descent emits the
/// move into the new cell, and each retreat from a finished subtree emits the
/// inverse move, so the output is a walk the agent can replay verbatim. The
/// walk ends the moment the last cell is visited.
#[derive(Debug, Default)]
pub struct CoveragePlanner {
    visited: Vec<bool>,
    frames: Vec<Frame>,
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    cell: Point,
    next_direction: usize,
    entered_by: Option<Direction>,
}

impl CoveragePlanner {
    /// Creates a planner with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a covering walk from `start` to `out`.
    pub fn plan(
        &mut self,
        view: GridView<'_>,
        start: Point,
        out: &mut Vec<Command>,
    ) -> Result<PlanSummary, CoverageError> {
        if !view.is_passable(start) {
            return Err(CoverageError::StartNotPassable(start));
        }

        let (width, height) = view.dimensions();
        let cell_count = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        self.visited.clear();
        self.visited.resize(cell_count, false);
        self.frames.clear();

        let total = view.passable_count();
        let first_move = out.len();
        let mut visited = 0;

        self.mark(width, start);
        visited += 1;
        self.frames.push(Frame {
            cell: start,
            next_direction: 0,
            entered_by: None,
        });

        while visited < total {
            let Some(frame) = self.frames.last_mut() else {
                debug!(visited, total, "coverage search exhausted");
                return Err(CoverageError::IncompleteCoverage { visited, total });
            };

            let Some(&direction) = Direction::ALL.get(frame.next_direction) else {
                if let Some(direction) = frame.entered_by {
                    out.push(Command::Move {
                        direction: direction.inverse(),
                    });
                }
                let _ = self.frames.pop();
                continue;
            };
            frame.next_direction += 1;
            let cell = frame.cell;

            let Some(next) = cell.step(direction) else {
                continue;
            };
            if !view.is_passable(next) || self.is_visited(width, next) {
                continue;
            }

            out.push(Command::Move { direction });
            self.mark(width, next);
            visited += 1;
            self.frames.push(Frame {
                cell: next,
                next_direction: 0,
                entered_by: Some(direction),
            });
        }

        let summary = PlanSummary {
            visited,
            total,
            moves: out.len() - first_move,
        };
        info!(
            visited = summary.visited,
            moves = summary.moves,
            "coverage plan complete"
        );
        Ok(summary)
    }

    fn mark(&mut self, width: u32, cell: Point) {
        if let Some(slot) = slot(width, cell).and_then(|index| self.visited.get_mut(index)) {
            *slot = true;
        }
    }

    fn is_visited(&self, width: u32, cell: Point) -> bool {
        slot(width, cell)
            .and_then(|index| self.visited.get(index).copied())
            .unwrap_or(false)
    }
}

fn slot(width: u32, cell: Point) -> Option<usize> {
    let index = u64::from(cell.y()) * u64::from(width) + u64::from(cell.x());
    usize::try_from(index).ok()
}
