//! Line-of-sight test between cell centers.

use wrappy_core::{CellState, Point};

use crate::Grid;

/// Corners of a unit cell relative to its center, in half-cell units.
const CORNERS: [(i64, i64); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Reports whether the straight segment between two cell centers is clear.
///
/// Both endpoints must lie inside the grid and must not be walls; a cell is
/// never visible from itself. A wall cell inside the segment's bounding box
/// blocks the segment when the line passes through its square, that is when
/// its corners fall on both sides of the line. Corners exactly on the line
/// count for either side, so grazing a wall corner does not block.
///
/// The test is symmetric in its endpoints.
#[must_use]
pub fn visible(grid: &Grid, from: Point, to: Point) -> bool {
    if from == to || !grid.is_passable(from) || !grid.is_passable(to) {
        return false;
    }

    let direction = (
        i64::from(from.x()) - i64::from(to.x()),
        i64::from(from.y()) - i64::from(to.y()),
    );

    for y in from.y().min(to.y())..=from.y().max(to.y()) {
        for x in from.x().min(to.x())..=from.x().max(to.x()) {
            let cell = Point::new(x, y);
            if cell == from || cell == to {
                continue;
            }
            if grid.get(cell) == Some(CellState::Wall) && straddles(from, direction, cell) {
                return false;
            }
        }
    }

    true
}

fn straddles(origin: Point, direction: (i64, i64), wall: Point) -> bool {
    let mut left = false;
    let mut right = false;

    for (corner_x, corner_y) in CORNERS {
        let to_origin_x = 2 * (i64::from(origin.x()) - i64::from(wall.x())) - corner_x;
        let to_origin_y = 2 * (i64::from(origin.y()) - i64::from(wall.y())) - corner_y;
        let cross = direction.0 * to_origin_y - direction.1 * to_origin_x;
        left |= cross > 0;
        right |= cross < 0;
    }

    left && right
}

#[cfg(test)]
mod tests {
    use wrappy_core::TaskDescription;

    use super::*;

    fn grid(description: &str) -> Grid {
        let task = TaskDescription::parse(description).expect("task parses");
        Grid::build(&task).expect("grid builds")
    }

    #[test]
    fn cell_is_not_visible_from_itself() {
        let grid = grid("(0,0),(4,0),(4,4),(0,4)#(0,0)##");
        assert!(!visible(&grid, Point::new(1, 1), Point::new(1, 1)));
    }

    #[test]
    fn open_room_is_fully_visible() {
        let grid = grid("(0,0),(4,0),(4,4),(0,4)#(0,0)##");
        assert!(visible(&grid, Point::new(0, 0), Point::new(3, 3)));
        assert!(visible(&grid, Point::new(0, 0), Point::new(3, 1)));
        assert!(visible(&grid, Point::new(2, 0), Point::new(2, 3)));
    }

    #[test]
    fn walls_and_out_of_range_targets_are_never_visible() {
        let grid = grid("(0,0),(4,0),(4,4),(0,4)#(0,0)##");
        assert!(!visible(&grid, Point::new(3, 3), Point::new(4, 3)));
        assert!(!visible(&grid, Point::new(3, 3), Point::new(9, 3)));
    }

    #[test]
    fn wall_on_the_line_blocks() {
        let grid = grid("(0,0),(5,0),(5,5),(0,5)#(0,0)#(2,0),(3,0),(3,3),(2,3)#");
        assert!(!visible(&grid, Point::new(1, 1), Point::new(3, 1)));
        assert!(!visible(&grid, Point::new(0, 0), Point::new(4, 2)));
        assert!(visible(&grid, Point::new(1, 4), Point::new(3, 4)));
    }

    #[test]
    fn grazing_a_wall_corner_does_not_block() {
        // Single wall cell at (1,1); the diagonal from (0,1) to (1,2) only
        // touches its corner region without crossing its interior.
        let grid = grid("(0,0),(3,0),(3,3),(0,3)#(0,0)#(1,1),(2,1),(2,2),(1,2)#");
        assert!(visible(&grid, Point::new(0, 0), Point::new(2, 0)));
        assert!(!visible(&grid, Point::new(0, 1), Point::new(2, 1)));
        assert!(visible(&grid, Point::new(0, 1), Point::new(1, 2)));
        assert!(!visible(&grid, Point::new(0, 0), Point::new(2, 2)));
    }

    #[test]
    fn visibility_is_symmetric() {
        let grid = grid("(0,0),(6,0),(6,6),(0,6)#(0,0)#(2,2),(3,2),(3,4),(2,4)#");
        for a in 0..36u32 {
            for b in 0..36u32 {
                let from = Point::new(a % 6, a / 6);
                let to = Point::new(b % 6, b / 6);
                assert_eq!(
                    visible(&grid, from, to),
                    visible(&grid, to, from),
                    "asymmetric visibility between {from} and {to}"
                );
            }
        }
    }
}
