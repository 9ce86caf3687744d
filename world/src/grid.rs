//! Grid construction from polygon task descriptions.

use wrappy_core::{CellState, DescriptionError, Direction, GridView, Point, Polygon, TaskDescription};

/// Dense cell grid derived from a task description.
///
/// Cells are stored in row-major order. The grid spans the bounding box of the
/// outer polygon plus one extra column and row so the wall traced along the
/// north and east edges stays inside the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<CellState>,
}

impl Grid {
    /// Builds the grid for the provided task.
    ///
    /// Walls are traced one cell thick along the outside of the boundary and
    /// the inside of every obstacle. A flood fill from the start point then
    /// marks the reachable interior free, every untouched cell becomes a wall,
    /// and boosters are laid onto free cells.
    pub fn build(task: &TaskDescription) -> Result<Self, DescriptionError> {
        let (max_x, max_y) = task.boundary().extent();
        let mut canvas = Canvas::new(max_x.saturating_add(1), max_y.saturating_add(1))?;

        canvas.trace(task.boundary(), Side::Boundary);
        for obstacle in task.obstacles() {
            canvas.trace(obstacle, Side::Obstacle);
        }
        canvas.flood_fill(task.start())?;

        let mut grid = canvas.finish();
        for placement in task.boosters() {
            if !grid.is_passable(placement.cell) {
                return Err(DescriptionError::BoosterOnWall {
                    kind: placement.kind,
                    cell: placement.cell,
                });
            }
            grid.set(
                placement.cell,
                CellState::Booster {
                    kind: placement.kind,
                    wrapped: false,
                },
            );
        }

        Ok(grid)
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns the state of the provided cell, if it lies within the grid.
    #[must_use]
    pub fn get(&self, cell: Point) -> Option<CellState> {
        self.index(cell).map(|index| self.cells[index])
    }

    /// Reports whether the cell lies within the grid and is not a wall.
    #[must_use]
    pub fn is_passable(&self, cell: Point) -> bool {
        self.get(cell).is_some_and(CellState::is_passable)
    }

    /// Borrows the grid as a read-only view for systems.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.width, self.height)
    }

    pub(crate) fn set(&mut self, cell: Point, state: CellState) {
        if let Some(index) = self.index(cell) {
            self.cells[index] = state;
        }
    }

    pub(crate) fn cells(&self) -> &[CellState] {
        &self.cells
    }

    fn index(&self, cell: Point) -> Option<usize> {
        index(self.width, self.height, cell)
    }
}

#[derive(Clone, Copy, Debug)]
enum Side {
    Boundary,
    Obstacle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Paint {
    Unset,
    Wall,
    Free,
}

/// Largest number of cells a grid may hold.
const MAX_CELLS: u64 = 1 << 26;

/// Scratch surface used while the grid is under construction.
#[derive(Debug)]
struct Canvas {
    width: u32,
    height: u32,
    paint: Vec<Paint>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Result<Self, DescriptionError> {
        let too_large = || DescriptionError::MapTooLarge { width, height };
        let cells = u64::from(width) * u64::from(height);
        if cells > MAX_CELLS {
            return Err(too_large());
        }
        let capacity = usize::try_from(cells).map_err(|_| too_large())?;
        Ok(Self {
            width,
            height,
            paint: vec![Paint::Unset; capacity],
        })
    }

    /// Marks the cells bordering each edge on the side away from the free region.
    ///
    /// Outlines run counter-clockwise, so the map interior lies to the left of
    /// every boundary edge and the obstacle interior to the left of every
    /// obstacle edge.
    fn trace(&mut self, polygon: &Polygon, side: Side) {
        let (outside, inside) = match side {
            Side::Boundary => (1, 0),
            Side::Obstacle => (0, 1),
        };

        for (from, to) in polygon.edges() {
            let (from_x, from_y) = (i64::from(from.x()), i64::from(from.y()));
            let (to_x, to_y) = (i64::from(to.x()), i64::from(to.y()));

            if from_x < to_x {
                let y = from_y - outside;
                for x in from_x..to_x {
                    self.paint_wall(x, y);
                }
            } else if from_y < to_y {
                let x = from_x - inside;
                for y in from_y..to_y {
                    self.paint_wall(x, y);
                }
            } else if from_x > to_x {
                let y = from_y - inside;
                for x in to_x..from_x {
                    self.paint_wall(x, y);
                }
            } else {
                let x = from_x - outside;
                for y in to_y..from_y {
                    self.paint_wall(x, y);
                }
            }
        }
    }

    fn paint_wall(&mut self, x: i64, y: i64) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if let Some(index) = index(self.width, self.height, Point::new(x, y)) {
            self.paint[index] = Paint::Wall;
        }
    }

    fn flood_fill(&mut self, start: Point) -> Result<(), DescriptionError> {
        let start_index = index(self.width, self.height, start)
            .filter(|&index| self.paint[index] == Paint::Unset)
            .ok_or(DescriptionError::StartNotFree(start))?;

        self.paint[start_index] = Paint::Free;
        let mut pending = vec![start];

        while let Some(cell) = pending.pop() {
            for direction in Direction::ALL {
                let Some(neighbor) = cell.step(direction) else {
                    continue;
                };
                let Some(neighbor_index) = index(self.width, self.height, neighbor) else {
                    continue;
                };
                if self.paint[neighbor_index] == Paint::Unset {
                    self.paint[neighbor_index] = Paint::Free;
                    pending.push(neighbor);
                }
            }
        }

        Ok(())
    }

    fn finish(self) -> Grid {
        let cells = self
            .paint
            .into_iter()
            .map(|paint| match paint {
                Paint::Free => CellState::Free,
                Paint::Unset | Paint::Wall => CellState::Wall,
            })
            .collect();

        Grid {
            width: self.width,
            height: self.height,
            cells,
        }
    }
}

fn index(width: u32, height: u32, cell: Point) -> Option<usize> {
    if cell.x() >= width || cell.y() >= height {
        return None;
    }
    let row = usize::try_from(cell.y()).ok()?;
    let column = usize::try_from(cell.x()).ok()?;
    let width = usize::try_from(width).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
