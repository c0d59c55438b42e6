use super::{construct_path, heuristic, MOTIONS};
use crate::common::{Node, OpenKey, Route};
use crate::error::{Endpoint, PlanError};
use crate::map::{Grid, OBSTACLE};
use crate::observer::{NodeTag, SearchEvent, SearchObserver};
use crate::stat::Stats;

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, instrument, trace};

/// What to do when a node already in the open set is reached again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenPolicy {
    /// The first discovery wins and the node is never updated. Cheaper paths found later
    /// are dropped, so the route is not guaranteed to be the cheapest one.
    #[default]
    FirstDiscovery,
    /// Decrease the node's cost and re-point its predecessor when a cheaper path shows up.
    /// With heuristic weight 0 this makes the search an exact Dijkstra.
    Relax,
}

/// Weighted best-first search over a cost field.
///
/// Each call to [`Planner::plan`] starts from fresh open and closed sets; only the
/// statistics carry over between calls.
pub struct Planner<'a> {
    grid: &'a Grid,
    policy: OpenPolicy,
    expansion_limit: Option<usize>,
    cancel: Option<&'a AtomicBool>,
    observer: Option<&'a mut dyn SearchObserver>,
    stats: Stats,
}

impl<'a> Planner<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Planner {
            grid,
            policy: OpenPolicy::default(),
            expansion_limit: None,
            cancel: None,
            observer: None,
            stats: Stats::default(),
        }
    }

    pub fn with_policy(mut self, policy: OpenPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Give up with [`PlanError::ExpansionLimit`] once this many nodes were expanded.
    pub fn with_expansion_limit(mut self, limit: usize) -> Self {
        self.expansion_limit = Some(limit);
        self
    }

    /// Checked once per iteration; setting it makes the call return [`PlanError::Cancelled`].
    pub fn with_cancel_flag(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_observer(mut self, observer: &'a mut dyn SearchObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Plans a route from `start` to `goal`. The returned steps run goal to start.
    #[instrument(skip_all, name = "weighted_a_star", fields(start = format!("{start:?}"), goal = format!("{goal:?}"), weight = heuristic_weight), level = "debug")]
    pub fn plan(
        &mut self,
        start: (usize, usize),
        goal: (usize, usize),
        heuristic_weight: f64,
    ) -> Result<Route, PlanError> {
        let search_start_time = Instant::now();
        let result = self.search(start, goal, heuristic_weight);
        self.stats.time_us += u64::try_from(search_start_time.elapsed().as_micros())
            .unwrap_or(u64::MAX);

        match &result {
            Ok(route) => {
                self.stats.routes_found += 1;
                self.stats.total_cost += route.cost;
                debug!("found route of {} cells, cost {:.3}", route.len(), route.cost);
            }
            Err(err) => {
                self.stats.routes_failed += 1;
                debug!("search failed: {err}");
            }
        }
        result
    }

    fn search(
        &mut self,
        start: (usize, usize),
        goal: (usize, usize),
        heuristic_weight: f64,
    ) -> Result<Route, PlanError> {
        let grid = self.grid;
        if !grid.verify(start.0, start.1) {
            return Err(PlanError::InvalidEndpoint {
                which: Endpoint::Start,
                x: start.0,
                y: start.1,
            });
        }
        if !grid.verify(goal.0, goal.1) {
            return Err(PlanError::InvalidEndpoint {
                which: Endpoint::Goal,
                x: goal.0,
                y: goal.1,
            });
        }

        let mut open_list = BTreeSet::new();
        let mut open_nodes: HashMap<usize, Node> = HashMap::new();
        let mut closed_list: HashMap<usize, Node> = HashMap::new();

        let start_index = grid.index_of(start.0, start.1);
        open_list.insert(OpenKey {
            f_cost: heuristic(start, goal, heuristic_weight),
            index: start_index,
        });
        open_nodes.insert(start_index, Node::new(start, 0.0, None));
        self.notify(start, NodeTag::Start);

        let mut expanded = 0;
        loop {
            if self
                .cancel
                .is_some_and(|cancel| cancel.load(Ordering::Relaxed))
            {
                return Err(PlanError::Cancelled);
            }
            let Some(key) = open_list.pop_first() else {
                return Err(PlanError::Unreachable { start, goal });
            };
            let Some(current) = open_nodes.remove(&key.index) else {
                // Keys and nodes are inserted and removed together.
                debug_assert!(false, "open key {} has no node", key.index);
                continue;
            };
            trace!("expand node: {current:?}");
            self.notify(current.position, NodeTag::Current);

            if current.position == goal {
                let goal_node = Node::new(goal, current.g_cost, current.predecessor);
                return Ok(Route {
                    start,
                    goal,
                    steps: construct_path(&goal_node, &closed_list),
                    cost: goal_node.g_cost,
                });
            }

            // Only expansions count against the cap; reaching the goal needs none.
            if let Some(limit) = self.expansion_limit {
                if expanded >= limit {
                    return Err(PlanError::ExpansionLimit { limit });
                }
            }

            let (x, y) = current.position;
            let g_cost = current.g_cost;
            closed_list.insert(key.index, current);
            self.notify((x, y), NodeTag::Closed);
            expanded += 1;
            self.stats.expanded_nodes += 1;

            for &(dx, dy, motion_cost) in &MOTIONS {
                let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy))
                else {
                    continue;
                };
                let Some(cell_cost) = grid.cost(nx, ny) else {
                    continue;
                };
                if cell_cost == OBSTACLE {
                    continue;
                }
                let index = grid.index_of(nx, ny);
                if closed_list.contains_key(&index) {
                    continue;
                }

                let tentative_g_cost = g_cost + motion_cost + f64::from(cell_cost);
                let h_cost = heuristic((nx, ny), goal, heuristic_weight);

                if let Some(existing) = open_nodes.get_mut(&index) {
                    if self.policy == OpenPolicy::Relax && tentative_g_cost < existing.g_cost {
                        open_list.remove(&OpenKey {
                            f_cost: existing.g_cost + h_cost,
                            index,
                        });
                        existing.g_cost = tentative_g_cost;
                        existing.predecessor = Some(key.index);
                        open_list.insert(OpenKey {
                            f_cost: tentative_g_cost + h_cost,
                            index,
                        });
                        self.stats.relaxed_nodes += 1;
                        self.notify((nx, ny), NodeTag::Discovered);
                    }
                    continue;
                }

                open_list.insert(OpenKey {
                    f_cost: tentative_g_cost + h_cost,
                    index,
                });
                open_nodes.insert(index, Node::new((nx, ny), tentative_g_cost, Some(key.index)));
                self.stats.discovered_nodes += 1;
                self.notify((nx, ny), NodeTag::Discovered);
            }
        }
    }

    fn notify(&mut self, position: (usize, usize), tag: NodeTag) {
        if let Some(observer) = self.observer.as_mut() {
            observer.observe(&SearchEvent::new(position, tag));
        }
    }
}

/// Plans one route with the default policy and no hook attached.
pub fn plan(
    grid: &Grid,
    start: (usize, usize),
    goal: (usize, usize),
    heuristic_weight: f64,
) -> Result<Route, PlanError> {
    Planner::new(grid).plan(start, goal, heuristic_weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::path_cost;
    use crate::obstacle::load_map_file;
    use std::f64::consts::SQRT_2;

    // Helper function to setup tracing
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .try_init();
    }

    fn load_grid(path: &str, inflation_rounds: usize) -> Grid {
        load_map_file(path)
            .unwrap()
            .into_grid(inflation_rounds)
            .unwrap()
    }

    // Every step must be one of the eight unit moves.
    fn assert_connected(route: &Route) {
        for step in route.steps.windows(2) {
            let dx = step[0].0.abs_diff(step[1].0);
            let dy = step[0].1.abs_diff(step[1].1);
            assert!(dx <= 1 && dy <= 1 && dx + dy > 0, "bad step {step:?}");
        }
    }

    fn assert_cost_consistent(grid: &Grid, route: &Route) {
        let recomputed = path_cost(grid, &route.forward()).unwrap();
        assert!(
            (recomputed - route.cost).abs() < 1e-9,
            "route cost {} but steps cost {recomputed}",
            route.cost
        );
    }

    // Ideal Path
    // [(2, 2), (2, 1), (1, 0), (0, 0)]
    #[test]
    fn test_plan_around_single_obstacle() {
        init_tracing();
        let grid = Grid::with_extent(3, 3, &[(1, 1)], 0).unwrap();
        let route = plan(&grid, (0, 0), (2, 2), 0.0).unwrap();
        debug!("{route:?}");

        assert_eq!(route.steps, vec![(2, 2), (2, 1), (1, 0), (0, 0)]);
        assert!((route.cost - (2.0 + SQRT_2)).abs() < 1e-9);
        assert_cost_consistent(&grid, &route);

        let weighted = plan(&grid, (0, 0), (2, 2), 0.5).unwrap();
        assert_eq!(weighted.len(), 4);
        assert!((weighted.cost - (2.0 + SQRT_2)).abs() < 1e-9);
    }

    #[test]
    fn test_plan_open_grid_endpoints() {
        init_tracing();
        let grid = Grid::open(10, 10).unwrap();
        for weight in [0.0, 0.5, 1.0, 3.0] {
            let route = plan(&grid, (1, 2), (8, 7), weight).unwrap();
            assert_eq!(route.steps.first(), Some(&(8, 7)));
            assert_eq!(route.steps.last(), Some(&(1, 2)));
            assert_eq!(route.forward().first(), Some(&(1, 2)));
            assert_connected(&route);
            assert_cost_consistent(&grid, &route);
        }
    }

    #[test]
    fn test_plan_start_is_goal() {
        let grid = Grid::open(4, 4).unwrap();
        let route = plan(&grid, (2, 3), (2, 3), 0.5).unwrap();
        assert_eq!(route.steps, vec![(2, 3)]);
        assert_eq!(route.cost, 0.0);
    }

    #[test]
    fn test_plan_through_wall_gap() {
        init_tracing();
        let grid = load_grid("map_file/test/wall.map", 2);
        for policy in [OpenPolicy::FirstDiscovery, OpenPolicy::Relax] {
            for weight in [0.0, 0.5, 2.0] {
                let route = Planner::new(&grid)
                    .with_policy(policy)
                    .plan((0, 0), (0, 5), weight)
                    .unwrap();
                debug!("{policy:?} {weight}: {route:?}");
                assert!(route.steps.contains(&(8, 2)));
                assert_connected(&route);
                assert_cost_consistent(&grid, &route);
            }
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        let grid = load_grid("map_file/test/wall.map", 3);
        let first = plan(&grid, (2, 0), (3, 4), 0.5).unwrap();
        let second = plan(&grid, (2, 0), (3, 4), 0.5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_uniform_cost_relaxed_is_never_worse() {
        init_tracing();
        let grid = load_grid("map_file/test/wall.map", 3);
        let optimal = Planner::new(&grid)
            .with_policy(OpenPolicy::Relax)
            .plan((0, 0), (9, 5), 0.0)
            .unwrap();
        for policy in [OpenPolicy::FirstDiscovery, OpenPolicy::Relax] {
            for weight in [0.0, 0.5, 1.0, 4.0] {
                let route = Planner::new(&grid)
                    .with_policy(policy)
                    .plan((0, 0), (9, 5), weight)
                    .unwrap();
                assert!(optimal.cost <= route.cost + 1e-9);
            }
        }
    }

    #[test]
    fn test_heavy_weight_expands_fewer_nodes() {
        let grid = Grid::open(30, 30).unwrap();
        let mut uniform = Planner::new(&grid);
        uniform.plan((0, 0), (29, 29), 0.0).unwrap();
        let mut greedy = Planner::new(&grid);
        greedy.plan((0, 0), (29, 29), 5.0).unwrap();

        assert!(greedy.stats().expanded_nodes < uniform.stats().expanded_nodes);
    }

    #[test]
    fn test_invalid_endpoints() {
        let grid = Grid::with_extent(3, 3, &[(1, 1)], 0).unwrap();
        assert_eq!(
            plan(&grid, (1, 1), (2, 2), 0.5),
            Err(PlanError::InvalidEndpoint {
                which: Endpoint::Start,
                x: 1,
                y: 1
            })
        );
        assert_eq!(
            plan(&grid, (0, 0), (3, 0), 0.5),
            Err(PlanError::InvalidEndpoint {
                which: Endpoint::Goal,
                x: 3,
                y: 0
            })
        );
        // Start is reported when both are bad.
        assert!(matches!(
            plan(&grid, (0, 9), (1, 1), 0.5),
            Err(PlanError::InvalidEndpoint {
                which: Endpoint::Start,
                ..
            })
        ));
    }

    #[test]
    fn test_unreachable_goal_in_ring() {
        init_tracing();
        let grid = load_grid("map_file/test/ring.map", 0);
        let mut planner = Planner::new(&grid);
        assert_eq!(
            planner.plan((0, 0), (3, 3), 0.5),
            Err(PlanError::Unreachable {
                start: (0, 0),
                goal: (3, 3)
            })
        );
        assert_eq!(planner.stats().routes_failed, 1);
        // Every free cell outside the ring got expanded.
        assert_eq!(planner.stats().expanded_nodes, grid.free_cells() - 1);
    }

    #[test]
    fn test_cancelled() {
        let grid = Grid::open(5, 5).unwrap();
        let cancel = AtomicBool::new(true);
        let result = Planner::new(&grid)
            .with_cancel_flag(&cancel)
            .plan((0, 0), (4, 4), 0.5);
        assert_eq!(result, Err(PlanError::Cancelled));
    }

    #[test]
    fn test_expansion_limit() {
        let grid = Grid::open(20, 20).unwrap();
        let result = Planner::new(&grid)
            .with_expansion_limit(1)
            .plan((0, 0), (19, 19), 0.0);
        assert_eq!(result, Err(PlanError::ExpansionLimit { limit: 1 }));

        let route = Planner::new(&grid)
            .with_expansion_limit(1000)
            .plan((0, 0), (19, 19), 0.5);
        assert!(route.is_ok());
    }

    #[test]
    fn test_expansion_limit_is_inclusive() {
        let grid = Grid::open(2, 1).unwrap();
        let mut unlimited = Planner::new(&grid);
        unlimited.plan((0, 0), (1, 0), 0.5).unwrap();
        assert_eq!(unlimited.stats().expanded_nodes, 1);

        let mut capped = Planner::new(&grid).with_expansion_limit(1);
        let route = capped.plan((0, 0), (1, 0), 0.5).unwrap();
        assert_eq!(route.steps, vec![(1, 0), (0, 0)]);
        assert_eq!(capped.stats().expanded_nodes, 1);

        // Start equal to goal expands nothing.
        let route = Planner::new(&grid)
            .with_expansion_limit(0)
            .plan((1, 0), (1, 0), 0.5)
            .unwrap();
        assert_eq!(route.steps, vec![(1, 0)]);

        assert_eq!(
            Planner::new(&grid)
                .with_expansion_limit(0)
                .plan((0, 0), (1, 0), 0.5),
            Err(PlanError::ExpansionLimit { limit: 0 })
        );
    }

    #[test]
    fn test_observer_does_not_change_route() {
        let grid = load_grid("map_file/test/wall.map", 2);
        let mut events = Vec::new();
        let mut record = |event: &SearchEvent| events.push(*event);

        let observed = Planner::new(&grid)
            .with_observer(&mut record)
            .plan((0, 0), (0, 5), 0.5)
            .unwrap();
        let plain = plan(&grid, (0, 0), (0, 5), 0.5).unwrap();
        assert_eq!(observed, plain);

        assert_eq!(events.first().map(|event| event.tag), Some(NodeTag::Start));
        assert_eq!(events.last().map(|event| event.position), Some((0, 5)));
        assert_eq!(events.last().map(|event| event.tag), Some(NodeTag::Current));
        assert!(events.iter().any(|event| event.tag == NodeTag::Closed));
    }

    #[test]
    fn test_shared_grid_across_threads() {
        let grid = load_grid("map_file/test/wall.map", 2);
        let expected = plan(&grid, (0, 0), (9, 5), 0.5).unwrap();

        let routes: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| plan(&grid, (0, 0), (9, 5), 0.5)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap().unwrap())
                .collect()
        });
        assert!(routes.iter().all(|route| *route == expected));
    }
}
