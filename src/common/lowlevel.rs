use std::cmp::Ordering;

/// A search node. Owned by exactly one of the open or closed sets of a single planning call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Node {
    pub(crate) position: (usize, usize),
    pub(crate) g_cost: f64,
    // None marks the start node.
    pub(crate) predecessor: Option<usize>,
}

impl Node {
    pub(crate) fn new(position: (usize, usize), g_cost: f64, predecessor: Option<usize>) -> Self {
        Node {
            position,
            g_cost,
            predecessor,
        }
    }
}

/// Priority key of an open node. Orders by f cost, then by linear index so that ties
/// resolve the same way on every run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenKey {
    pub(crate) f_cost: f64,
    pub(crate) index: usize,
}

impl PartialEq for OpenKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenKey {}

impl PartialOrd for OpenKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .total_cmp(&other.f_cost)
            .then_with(|| self.index.cmp(&other.index))
    }
}
