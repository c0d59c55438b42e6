use criterion::{black_box, criterion_group, criterion_main, Criterion};
use weighted_routing::{Grid, OpenPolicy, Planner};

// Vertical walls with alternating gaps, so routes have to zigzag.
fn load_zigzag_map(size: usize) -> Grid {
    let mut obstacles = Vec::new();
    for (wall, x) in (size / 8..size).step_by(size / 8).enumerate() {
        for y in 0..size {
            let gap = if wall % 2 == 0 { y >= size - 3 } else { y < 3 };
            if !gap {
                obstacles.push((x, y));
            }
        }
    }
    Grid::with_extent(size, size, &obstacles, 6).unwrap()
}

fn bench_map(c: &mut Criterion, size: usize, policy: OpenPolicy, weight: f64) {
    let grid = load_zigzag_map(size);
    let goal = (size - 1, size / 2);

    c.bench_function(&format!("map_{size}_{policy:?}_w{weight}"), |b| {
        b.iter(|| {
            let mut planner = Planner::new(&grid).with_policy(policy);
            let route = planner.plan(black_box((0, size / 2)), black_box(goal), weight);
            assert!(route.is_ok());
        })
    });
}

pub fn map_small(c: &mut Criterion) {
    bench_map(c, 64, OpenPolicy::FirstDiscovery, 0.5);
}

pub fn map_large(c: &mut Criterion) {
    bench_map(c, 256, OpenPolicy::FirstDiscovery, 0.5);
}

pub fn map_large_relaxed(c: &mut Criterion) {
    bench_map(c, 256, OpenPolicy::Relax, 0.0);
}

criterion_group!(benches, map_small, map_large, map_large_relaxed);
criterion_main!(benches);
