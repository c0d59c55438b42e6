use crate::map::Grid;

use rand::prelude::*;
use tracing::{debug, info};

const MAX_ATTEMPTS: usize = 1000;

/// Draws random route endpoints for batch runs.
///
/// Areas are `[x0, y0, x1, y1]` rectangles; a point is taken from the left or right edge of
/// a random area. Without areas any traversable cell can be drawn.
#[derive(Debug, Clone, Default)]
pub struct EndpointSampler {
    areas: Vec<[usize; 4]>,
}

impl EndpointSampler {
    pub fn new(areas: Vec<[usize; 4]>) -> Self {
        EndpointSampler { areas }
    }

    /// Returns a traversable cell, or `None` if none was hit within the attempt budget.
    pub fn sample<R: Rng + ?Sized>(&self, grid: &Grid, rng: &mut R) -> Option<(usize, usize)> {
        for _ in 0..MAX_ATTEMPTS {
            let point = if self.areas.is_empty() {
                (rng.gen_range(0..grid.width()), rng.gen_range(0..grid.height()))
            } else {
                self.sample_area(rng)?
            };
            if grid.verify(point.0, point.1) {
                return Some(point);
            }
            debug!("sampled point {point:?} is not traversable, retrying");
        }
        None
    }

    fn sample_area<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(usize, usize)> {
        let [x0, y0, x1, y1] = *self.areas.choose(rng)?;
        let x = if rng.gen_bool(0.5) { x0 } else { x1 };
        let y = rng.gen_range(y0.min(y1)..=y0.max(y1));
        Some((x, y))
    }

    /// A start and goal pair, both traversable.
    pub fn sample_route<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        rng: &mut R,
    ) -> Option<((usize, usize), (usize, usize))> {
        let route = (self.sample(grid, rng)?, self.sample(grid, rng)?);
        info!("Generate route: {route:?}");
        Some(route)
    }
}
