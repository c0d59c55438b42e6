use std::fmt;

/// Which end of a planning request a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Start,
    Goal,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Goal => write!(f, "goal"),
        }
    }
}

/// Failures reported by a planning call. None of them is fatal; the grid stays usable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// The endpoint is out of bounds or lies on an obstacle cell.
    #[error("{which} point ({x}, {y}) is not a traversable cell")]
    InvalidEndpoint { which: Endpoint, x: usize, y: usize },

    /// The open set ran dry before the goal was popped.
    #[error("no route from {start:?} to {goal:?}: open set is empty")]
    Unreachable {
        start: (usize, usize),
        goal: (usize, usize),
    },

    #[error("search cancelled")]
    Cancelled,

    #[error("search stopped after expanding {limit} nodes")]
    ExpansionLimit { limit: usize },
}

/// Failures while building a cost field with an explicit extent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("grid extent {width}x{height} has no cells")]
    EmptyExtent { width: usize, height: usize },

    #[error("obstacle ({x}, {y}) lies outside the {width}x{height} grid")]
    ObstacleOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}
