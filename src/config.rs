use crate::algorithm::OpenPolicy;

use anyhow::{anyhow, bail};
use clap::{Parser, ValueEnum};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `[x0,y0,x1,y1,...]` per route, start first.
    #[default]
    Text,
    /// One JSON route object per line.
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "weighted_routing",
    about = "Weighted A* routing over an obstacle-inflated occupancy grid.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(help = "Route as x0,y0,x1,y1; sampled at random when omitted", value_parser = parse_route)]
    pub route: Option<[usize; 4]>,

    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the grayscale map image")]
    pub image_path: Option<String>,

    #[arg(long, help = "Path to a MovingAI .map file")]
    pub map_path: Option<String>,

    #[arg(long, help = "Pixels darker than this become obstacles")]
    pub threshold: Option<u8>,

    #[arg(long, help = "Rounds of obstacle cost inflation")]
    pub inflation_rounds: Option<usize>,

    #[arg(long, help = "Weight of the A* heuristic (0 -> no distance term)")]
    pub heuristic_weight: Option<f64>,

    #[arg(long, help = "How many routes to output")]
    pub route_count: Option<usize>,

    #[arg(long, help = "Seed for endpoint sampling")]
    pub seed: Option<u64>,

    #[arg(long, help = "Shorten routes by line of sight", default_value_t = false)]
    pub optimize: bool,

    #[arg(
        long,
        help = "Relax open nodes when a cheaper path is found",
        default_value_t = false
    )]
    pub relax: bool,

    #[arg(long, help = "Stop a search after this many expansions")]
    pub expansion_limit: Option<usize>,

    #[arg(long, value_enum, help = "Output format")]
    pub output: Option<OutputFormat>,

    #[arg(
        long,
        help = "Log every search event at trace level",
        default_value_t = false
    )]
    pub trace_search: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub image_path: Option<String>,
    pub map_path: Option<String>,
    pub threshold: u8,
    pub inflation_rounds: usize,
    pub heuristic_weight: f64,
    pub route_count: usize,
    pub seed: Option<u64>,
    pub optimize: bool,
    pub relax: bool,
    pub expansion_limit: Option<usize>,
    pub output: OutputFormat,
    pub trace_search: bool,
    pub route: Option<[usize; 4]>,
    /// Rectangles `[x0, y0, x1, y1]` to sample endpoints from.
    pub sample_areas: Vec<[usize; 4]>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            image_path: None,
            map_path: None,
            threshold: 200,
            inflation_rounds: 6,
            heuristic_weight: 0.5,
            route_count: 1,
            seed: None,
            optimize: false,
            relax: false,
            expansion_limit: None,
            output: OutputFormat::Text,
            trace_search: false,
            route: None,
            sample_areas: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Command-line values win over the config file; flags can only switch features on.
    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(image_path) = &cli.image_path {
            self.image_path = Some(image_path.clone());
        }
        if let Some(map_path) = &cli.map_path {
            self.map_path = Some(map_path.clone());
        }
        if let Some(threshold) = cli.threshold {
            self.threshold = threshold;
        }
        if let Some(inflation_rounds) = cli.inflation_rounds {
            self.inflation_rounds = inflation_rounds;
        }
        if let Some(heuristic_weight) = cli.heuristic_weight {
            self.heuristic_weight = heuristic_weight;
        }
        if let Some(route_count) = cli.route_count {
            self.route_count = route_count;
        }
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
        if cli.expansion_limit.is_some() {
            self.expansion_limit = cli.expansion_limit;
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
        if cli.route.is_some() {
            self.route = cli.route;
        }
        self.optimize |= cli.optimize;
        self.relax |= cli.relax;
        self.trace_search |= cli.trace_search;

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        match (&self.image_path, &self.map_path) {
            (Some(_), Some(_)) => bail!("image_path and map_path are mutually exclusive"),
            (None, None) => bail!("either image_path or map_path is required"),
            _ => {}
        }

        if !self.heuristic_weight.is_finite() || self.heuristic_weight < 0.0 {
            return Err(anyhow!(
                "Heuristic weight must be a finite value of at least 0.0, got {}",
                self.heuristic_weight
            ));
        }

        if self.route_count == 0 {
            bail!("route_count must be at least 1");
        }

        if let Some(area) = self
            .sample_areas
            .iter()
            .find(|[x0, y0, x1, y1]| x0 > x1 || y0 > y1)
        {
            bail!("sample area {area:?} must be ordered as [x0, y0, x1, y1] with x0 <= x1, y0 <= y1");
        }
        Ok(())
    }

    pub fn open_policy(&self) -> OpenPolicy {
        if self.relax {
            OpenPolicy::Relax
        } else {
            OpenPolicy::FirstDiscovery
        }
    }
}

fn parse_route(arg: &str) -> Result<[usize; 4], String> {
    let values = arg
        .split(',')
        .map(|value| value.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("Not x0,y0,x1,y1: {err}"))?;
    values
        .try_into()
        .map_err(|values: Vec<usize>| format!("Not x0,y0,x1,y1: got {} values", values.len()))
}
