use crate::error::MapError;

use tracing::debug;

/// Cost of an impassable cell.
pub const OBSTACLE: u8 = 0xff;
/// Highest cost a traversable cell can reach through inflation.
pub const MAX_TRAVERSABLE: u8 = 0xfe;
/// Increment applied to a cell each round it borders a costlier cell.
pub const NCOST: u8 = 5;

const AXIS_NEIGHBORS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Cost field over a rectangular grid pinned at the origin.
///
/// Cells are addressed as `(x, y)` and stored densely by linear index `y * width + x`.
/// The field never changes after construction, so it can be shared between planners
/// on different threads without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    max_index: usize,
    costs: Vec<u8>,
}

impl Grid {
    /// Builds a cost field whose extent is the tight box around `obstacles`.
    ///
    /// Inflation is a breadth-limited diffusion over axis neighbours, not a true distance
    /// transform: cells more than `inflation_rounds` axis steps away from every obstacle
    /// keep cost 0, and diagonal proximity only shows up one round late.
    ///
    /// # Panics
    ///
    /// Panics if `obstacles` is empty, since there is no box to derive.
    pub fn build(obstacles: &[(usize, usize)], inflation_rounds: usize) -> Self {
        assert!(
            !obstacles.is_empty(),
            "cost field needs at least one obstacle to derive its extent"
        );
        let width = obstacles.iter().map(|&(x, _)| x).max().unwrap_or(0) + 1;
        let height = obstacles.iter().map(|&(_, y)| y).max().unwrap_or(0) + 1;

        let mut grid = Self::open_unchecked(width, height);
        for &(x, y) in obstacles {
            grid.costs[y * width + x] = OBSTACLE;
        }
        grid.inflate(inflation_rounds);
        grid
    }

    /// Builds a cost field with an explicit extent, e.g. the dimensions of a source image.
    pub fn with_extent(
        width: usize,
        height: usize,
        obstacles: &[(usize, usize)],
        inflation_rounds: usize,
    ) -> Result<Self, MapError> {
        let mut grid = Self::open(width, height)?;
        for &(x, y) in obstacles {
            if x >= width || y >= height {
                return Err(MapError::ObstacleOutOfBounds {
                    x,
                    y,
                    width,
                    height,
                });
            }
            grid.costs[y * width + x] = OBSTACLE;
        }
        grid.inflate(inflation_rounds);
        Ok(grid)
    }

    /// An obstacle-free grid where every cell costs 0.
    pub fn open(width: usize, height: usize) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::EmptyExtent { width, height });
        }
        Ok(Self::open_unchecked(width, height))
    }

    fn open_unchecked(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            max_index: width * height - 1,
            costs: vec![0; width * height],
        }
    }

    fn inflate(&mut self, rounds: usize) {
        for round in 0..rounds {
            // Each round reads only the previous snapshot so propagation is order independent.
            let mut next = self.costs.clone();
            for y in 0..self.height {
                for x in 0..self.width {
                    let index = y * self.width + x;
                    let own = self.costs[index];
                    if own == OBSTACLE {
                        continue;
                    }
                    let exposed = self
                        .axis_neighbors(x, y)
                        .any(|(nx, ny)| self.costs[ny * self.width + nx] > own);
                    if exposed {
                        next[index] = own.saturating_add(NCOST).min(MAX_TRAVERSABLE);
                    }
                }
            }
            self.costs = next;
            debug!("inflation round {} done", round + 1);
        }
    }

    fn axis_neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        AXIS_NEIGHBORS.iter().filter_map(move |&(dx, dy)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add_signed(dy)?;
            (nx < self.width && ny < self.height).then_some((nx, ny))
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn max_index(&self) -> usize {
        self.max_index
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Cost of `(x, y)`, or `None` outside the grid.
    pub fn cost(&self, x: usize, y: usize) -> Option<u8> {
        self.in_bounds(x, y).then(|| self.costs[y * self.width + x])
    }

    pub fn is_obstacle(&self, x: usize, y: usize) -> bool {
        self.cost(x, y) == Some(OBSTACLE)
    }

    /// True for in-bounds cells that can be stepped on.
    pub fn is_passable(&self, x: usize, y: usize) -> bool {
        matches!(self.cost(x, y), Some(cost) if cost != OBSTACLE)
    }

    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn position_of(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// A cell is a valid endpoint when it resolves to an in-bounds, non-obstacle index.
    pub fn verify(&self, x: usize, y: usize) -> bool {
        self.in_bounds(x, y) && self.index_of(x, y) <= self.max_index && self.is_passable(x, y)
    }

    /// Number of traversable cells.
    pub fn free_cells(&self) -> usize {
        self.costs.iter().filter(|&&cost| cost != OBSTACLE).count()
    }
}
