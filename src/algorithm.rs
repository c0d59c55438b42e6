mod astar;

pub use astar::{plan, OpenPolicy, Planner};

use std::collections::HashMap;
use std::f64::consts::SQRT_2;

use crate::common::{Node, Path};
use crate::map::Grid;

/// 8-connected moves as `(dx, dy, motion cost)`, in expansion order.
pub const MOTIONS: [(isize, isize, f64); 8] = [
    (1, 0, 1.0),
    (0, 1, 1.0),
    (-1, 0, 1.0),
    (0, -1, 1.0),
    (-1, -1, SQRT_2),
    (-1, 1, SQRT_2),
    (1, -1, SQRT_2),
    (1, 1, SQRT_2),
];

/// Weighted Euclidean distance. Cell costs make this inadmissible even at weight 1.
pub(crate) fn heuristic(position: (usize, usize), goal: (usize, usize), weight: f64) -> f64 {
    let dx = position.0 as f64 - goal.0 as f64;
    let dy = position.1 as f64 - goal.1 as f64;
    weight * dx.hypot(dy)
}

/// Walks predecessor links from `goal` through the closed set. Goal comes first.
pub(crate) fn construct_path(goal: &Node, closed: &HashMap<usize, Node>) -> Path {
    let mut path = vec![goal.position];
    let mut predecessor = goal.predecessor;
    while let Some(index) = predecessor {
        // Every predecessor was expanded before its successor was discovered.
        let Some(node) = closed.get(&index) else {
            debug_assert!(false, "predecessor {index} missing from closed set");
            break;
        };
        path.push(node.position);
        predecessor = node.predecessor;
    }
    path
}

/// Motion cost of a single step, or `None` if `from` and `to` are not 8-adjacent.
pub fn step_cost(from: (usize, usize), to: (usize, usize)) -> Option<f64> {
    let dx = to.0 as isize - from.0 as isize;
    let dy = to.1 as isize - from.1 as isize;
    MOTIONS
        .iter()
        .find(|&&(mx, my, _)| mx == dx && my == dy)
        .map(|&(_, _, cost)| cost)
}

/// Recomputes what the planner charges for `path`, given start first: motion cost plus
/// the cost of each entered cell. `None` if a step is not a unit move or enters a blocked
/// or out-of-bounds cell.
pub fn path_cost(grid: &Grid, path: &[(usize, usize)]) -> Option<f64> {
    path.windows(2).try_fold(0.0, |total, step| {
        let motion = step_cost(step[0], step[1])?;
        let (x, y) = step[1];
        if !grid.is_passable(x, y) {
            return None;
        }
        Some(total + motion + f64::from(grid.cost(x, y)?))
    })
}
