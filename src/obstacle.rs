use crate::error::MapError;
use crate::map::Grid;

use anyhow::{anyhow, bail, Context};
use image::DynamicImage;
use std::fs;
use tracing::info;

/// Obstacle cells together with the extent of the source they were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleMap {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<(usize, usize)>,
}

impl ObstacleMap {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Builds the cost field over the source extent.
    pub fn into_grid(&self, inflation_rounds: usize) -> Result<Grid, MapError> {
        Grid::with_extent(self.width, self.height, &self.cells, inflation_rounds)
    }
}

/// Pixels whose 8-bit luma is below `threshold` become obstacles.
pub fn from_image(img: &DynamicImage, threshold: u8) -> ObstacleMap {
    let gray = img.to_luma8();
    let (width, height) = gray.dimensions();

    let mut cells = Vec::new();
    for x in 0..width {
        for y in 0..height {
            if gray.get_pixel(x, y).0[0] < threshold {
                cells.push((x as usize, y as usize));
            }
        }
    }

    ObstacleMap {
        width: width as usize,
        height: height as usize,
        cells,
    }
}

pub fn load_image(path: &str, threshold: u8) -> anyhow::Result<ObstacleMap> {
    let img = image::open(path).with_context(|| format!("failed to decode image {path}"))?;
    let obstacles = from_image(&img, threshold);
    info!(
        "image loaded with {}x{}, {} obstacle cells",
        obstacles.width,
        obstacles.height,
        obstacles.cells.len()
    );
    Ok(obstacles)
}

/// Reads a MovingAI `.map` file. `.`, `G` and `S` are passable, everything else blocks.
pub fn load_map_file(path: &str) -> anyhow::Result<ObstacleMap> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read map {path}"))?;
    parse_map(&text).with_context(|| format!("error with map file: {path}"))
}

pub fn parse_map(text: &str) -> anyhow::Result<ObstacleMap> {
    let mut lines = text.lines();
    let mut next_line = |what: &str| {
        lines
            .next()
            .ok_or_else(|| anyhow!("unexpected end of map while reading {what}"))
    };

    let _type = next_line("type")?;
    let height = header_value(next_line("height")?, "height")?;
    let width = header_value(next_line("width")?, "width")?;
    if next_line("map")?.trim() != "map" {
        bail!("expected `map` line after the header");
    }

    let mut cells = Vec::new();
    for y in 0..height {
        let row = next_line("grid rows")?.trim_end();
        if row.chars().count() < width {
            bail!(
                "row {y} has {} cells, expected {width}",
                row.chars().count()
            );
        }
        for (x, ch) in row.chars().take(width).enumerate() {
            if !matches!(ch, '.' | 'G' | 'S') {
                cells.push((x, y));
            }
        }
    }

    Ok(ObstacleMap {
        width,
        height,
        cells,
    })
}

fn header_value(line: &str, key: &str) -> anyhow::Result<usize> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some(key) {
        bail!("expected `{key}` header, got `{line}`");
    }
    parts
        .next()
        .ok_or_else(|| anyhow!("missing value for `{key}`"))?
        .parse()
        .with_context(|| format!("invalid `{key}` value in `{line}`"))
}
