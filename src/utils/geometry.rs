//! # Grid Geometry
//!
//! Line rasterization, area iteration and line-of-sight tests on the
//! integer grid. Everything here is pure and allocation-light; the map and
//! visibility code build on it.

use crate::game::Position;

/// Rasterizes the line from `from` to `to` with Bresenham's algorithm.
///
/// The starting cell is excluded and the end cell is included, so a line
/// from a point to itself is empty.
///
/// # Examples
///
/// ```
/// use delve::{rasterize_line, Position};
///
/// let cells = rasterize_line(Position::new(0, 0), Position::new(3, 1));
/// assert_eq!(cells.first(), Some(&Position::new(1, 0)));
/// assert_eq!(cells.last(), Some(&Position::new(3, 1)));
/// assert_eq!(cells.len(), 3);
///
/// assert!(rasterize_line(Position::new(2, 2), Position::new(2, 2)).is_empty());
/// ```
pub fn rasterize_line(from: Position, to: Position) -> Vec<Position> {
    let delta_x = (to.x - from.x).abs();
    let delta_y = -(to.y - from.y).abs();
    let step_x = if from.x < to.x { 1 } else { -1 };
    let step_y = if from.y < to.y { 1 } else { -1 };

    let mut cells = Vec::with_capacity(delta_x.max(-delta_y) as usize);
    let mut error = delta_x + delta_y;
    let mut current = from;

    while current != to {
        let doubled = 2 * error;
        if doubled >= delta_y {
            error += delta_y;
            current.x += step_x;
        }
        if doubled <= delta_x {
            error += delta_x;
            current.y += step_y;
        }
        cells.push(current);
    }

    cells
}

/// Calls `f` for every cell of the rectangle, bounds inclusive, row by row.
pub fn for_each_in_rect<F>(top_left: Position, bottom_right: Position, mut f: F)
where
    F: FnMut(Position),
{
    for y in top_left.y..=bottom_right.y {
        for x in top_left.x..=bottom_right.x {
            f(Position::new(x, y));
        }
    }
}

/// Calls `f` for every cell strictly inside the circle `dx² + dy² < r²`.
///
/// Cells exactly on the boundary are skipped.
///
/// # Examples
///
/// ```
/// use delve::{for_each_in_circle, Position};
///
/// let mut cells = Vec::new();
/// for_each_in_circle(Position::new(0, 0), 2, |p| cells.push(p));
/// assert!(cells.contains(&Position::new(1, 1)));
/// assert!(!cells.contains(&Position::new(2, 0))); // on the boundary
/// ```
pub fn for_each_in_circle<F>(center: Position, radius: i32, mut f: F)
where
    F: FnMut(Position),
{
    let radius_squared = radius * radius;
    let top_left = Position::new(center.x - radius, center.y - radius);
    let bottom_right = Position::new(center.x + radius, center.y + radius);
    for_each_in_rect(top_left, bottom_right, |cell| {
        if cell.distance_squared(center) < radius_squared {
            f(cell);
        }
    });
}

/// Tests whether `from` can be seen from `to`.
///
/// Walks the rasterized line from `to` towards `from` and fails on the first
/// opaque cell met before `from` itself. The endpoints are never tested, so
/// an opaque target is still visible.
pub fn has_line_of_sight<F>(from: Position, to: Position, is_opaque: F) -> bool
where
    F: Fn(Position) -> bool,
{
    rasterize_line(to, from)
        .into_iter()
        .take_while(|&cell| cell != from)
        .all(|cell| !is_opaque(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rasterize_horizontal_line() {
        let cells = rasterize_line(Position::new(0, 0), Position::new(4, 0));
        assert_eq!(
            cells,
            vec![
                Position::new(1, 0),
                Position::new(2, 0),
                Position::new(3, 0),
                Position::new(4, 0),
            ]
        );
    }

    #[test]
    fn test_rasterize_diagonal_line() {
        let cells = rasterize_line(Position::new(3, 3), Position::new(0, 0));
        assert_eq!(
            cells,
            vec![
                Position::new(2, 2),
                Position::new(1, 1),
                Position::new(0, 0),
            ]
        );
    }

    #[test]
    fn test_rect_is_inclusive() {
        let mut count = 0;
        for_each_in_rect(Position::new(1, 1), Position::new(3, 2), |_| count += 1);
        assert_eq!(count, 6);
    }

    #[test]
    fn test_circle_excludes_boundary() {
        let mut cells = Vec::new();
        for_each_in_circle(Position::new(5, 5), 1, |p| cells.push(p));
        assert_eq!(cells, vec![Position::new(5, 5)]);
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall_between() {
        let wall = Position::new(2, 0);
        let opaque = |p: Position| p == wall;
        assert!(!has_line_of_sight(Position::new(4, 0), Position::new(0, 0), opaque));
        assert!(has_line_of_sight(Position::new(1, 0), Position::new(0, 0), opaque));
        // the wall itself is visible
        assert!(has_line_of_sight(wall, Position::new(0, 0), opaque));
    }

    proptest! {
        #[test]
        fn prop_line_ends_at_target(ax in -20i32..20, ay in -20i32..20, bx in -20i32..20, by in -20i32..20) {
            let a = Position::new(ax, ay);
            let b = Position::new(bx, by);
            let cells = rasterize_line(a, b);
            let expected_len = (bx - ax).abs().max((by - ay).abs()) as usize;
            prop_assert_eq!(cells.len(), expected_len);
            if a != b {
                prop_assert_eq!(cells.last().copied(), Some(b));
                prop_assert!(!cells.contains(&a));
            }
        }

        #[test]
        fn prop_line_steps_are_adjacent(ax in -20i32..20, ay in -20i32..20, bx in -20i32..20, by in -20i32..20) {
            let a = Position::new(ax, ay);
            let mut previous = a;
            for cell in rasterize_line(a, Position::new(bx, by)) {
                prop_assert!((cell.x - previous.x).abs() <= 1 && (cell.y - previous.y).abs() <= 1);
                previous = cell;
            }
        }

        #[test]
        fn prop_circle_cells_strictly_inside(radius in 0i32..10) {
            let center = Position::new(0, 0);
            let mut cells = Vec::new();
            for_each_in_circle(center, radius, |p| cells.push(p));
            for cell in &cells {
                prop_assert!(cell.distance_squared(center) < radius * radius);
            }
            if radius > 0 {
                prop_assert!(!cells.contains(&Position::new(radius, 0)));
            }
        }
    }
}
