use weighted_routing::config::{Cli, Config, OutputFormat};
use weighted_routing::observer::TraceObserver;
use weighted_routing::obstacle::{load_image, load_map_file, ObstacleMap};
use weighted_routing::optimize::{LineOfSight, RouteOptimizer};
use weighted_routing::scenario::EndpointSampler;
use weighted_routing::{Planner, Route};

use anyhow::{bail, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let grid = load_obstacles(&config)?
        .into_grid(config.inflation_rounds)
        .context("error building cost field")?;
    info!(
        "cost field {}x{} built with {} inflation rounds",
        grid.width(),
        grid.height(),
        config.inflation_rounds
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let sampler = EndpointSampler::new(config.sample_areas.clone());
    let optimizer = LineOfSight::new(&grid);

    let mut trace_observer = TraceObserver;
    let mut planner = Planner::new(&grid).with_policy(config.open_policy());
    if let Some(limit) = config.expansion_limit {
        planner = planner.with_expansion_limit(limit);
    }
    if config.trace_search {
        planner = planner.with_observer(&mut trace_observer);
    }

    let mut requested = config.route.map(|[x0, y0, x1, y1]| ((x0, y0), (x1, y1)));
    for _ in 0..config.route_count {
        let Some((start, goal)) = requested
            .take()
            .or_else(|| sampler.sample_route(&grid, &mut rng))
        else {
            bail!("could not sample traversable route endpoints");
        };
        info!("Routing {start:?}-{goal:?}");

        let mut route = match planner.plan(start, goal, config.heuristic_weight) {
            Ok(route) => route,
            Err(err) => {
                error!("{err}");
                continue;
            }
        };
        if config.optimize {
            route.steps = optimizer
                .optimize(&route.forward())
                .into_iter()
                .rev()
                .collect();
        }
        print_route(&route, config.output)?;
    }

    planner.stats().print();
    Ok(())
}

fn load_obstacles(config: &Config) -> anyhow::Result<ObstacleMap> {
    match (&config.image_path, &config.map_path) {
        (Some(image_path), _) => load_image(image_path, config.threshold),
        (None, Some(map_path)) => load_map_file(map_path),
        (None, None) => bail!("no map source configured"),
    }
}

fn print_route(route: &Route, output: OutputFormat) -> anyhow::Result<()> {
    match output {
        OutputFormat::Text => {
            let coords: Vec<String> = route
                .forward()
                .iter()
                .map(|(x, y)| format!("{x},{y}"))
                .collect();
            println!("[{}]", coords.join(","));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(route)?),
    }
    Ok(())
}
