use tracing::info;

/// Counters accumulated by a planner across its calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    pub routes_found: usize,
    pub routes_failed: usize,
    pub total_cost: f64,
    pub time_us: u64,
    pub expanded_nodes: usize,
    pub discovered_nodes: usize,
    pub relaxed_nodes: usize,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Routes found {:?} failed {:?} Cost {:.3} Time(microseconds) {:?} Expanded nodes number: {:?} Discovered nodes number: {:?} Relaxed nodes number: {:?}",
            self.routes_found,
            self.routes_failed,
            self.total_cost,
            self.time_us,
            self.expanded_nodes,
            self.discovered_nodes,
            self.relaxed_nodes
        );
    }
}
