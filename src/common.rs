mod lowlevel;

pub(crate) use lowlevel::{Node, OpenKey};

use serde::{Deserialize, Serialize};

/// Cells from goal back to start, in the order reconstruction produces them.
pub type Path = Vec<(usize, usize)>;

/// The outcome of a successful planning call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub start: (usize, usize),
    pub goal: (usize, usize),
    /// Goal-to-start order, as reconstructed.
    pub steps: Path,
    /// Accumulated g cost of the goal node.
    pub cost: f64,
}

impl Route {
    /// Steps in travel order, start first.
    pub fn forward(&self) -> Path {
        self.steps.iter().rev().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
