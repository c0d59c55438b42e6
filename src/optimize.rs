//! Post-processing of planned routes.

use crate::algorithm::path_cost;
use crate::common::Path;
use crate::map::Grid;

pub trait RouteOptimizer {
    /// Returns a route visiting a subset of `path`'s cells, same endpoints, same order.
    fn optimize(&self, path: &[(usize, usize)]) -> Path;
}

/// Drops intermediate waypoints wherever a straight grid line connects two of them
/// without touching an obstacle and without costing more than the steps it replaces.
///
/// The output is a list of waypoints, so consecutive cells are generally not adjacent.
pub struct LineOfSight<'a> {
    grid: &'a Grid,
}

impl<'a> LineOfSight<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        LineOfSight { grid }
    }

    fn shortcut_allowed(&self, segment: &[(usize, usize)]) -> bool {
        let (Some(&from), Some(&to)) = (segment.first(), segment.last()) else {
            return false;
        };
        let line = grid_line(from, to);
        match (path_cost(self.grid, &line), path_cost(self.grid, segment)) {
            (Some(direct), Some(original)) => direct <= original + 1e-9,
            // A segment that is not a valid step chain can still be cut if the line is clear.
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

impl RouteOptimizer for LineOfSight<'_> {
    fn optimize(&self, path: &[(usize, usize)]) -> Path {
        if path.len() <= 2 {
            return path.to_vec();
        }

        let mut result = Vec::new();
        let mut current = 0;
        while current < path.len() - 1 {
            result.push(path[current]);
            // Furthest waypoint that can be reached directly.
            let next = (current + 2..path.len())
                .rev()
                .find(|&end| self.shortcut_allowed(&path[current..=end]))
                .unwrap_or(current + 1);
            current = next;
        }
        result.push(path[path.len() - 1]);
        result
    }
}

/// Cells on the Bresenham line from `from` to `to`, both included.
pub fn grid_line(from: (usize, usize), to: (usize, usize)) -> Path {
    let (mut x, mut y) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut line = vec![from];
    while (x, y) != (x1, y1) {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        line.push((x as usize, y as usize));
    }
    line
}
