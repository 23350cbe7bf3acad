use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use swarm_proto::{Entity, Food, Snapshot};
use swarm_view::{classify, PixelSurface, Rgb, SceneRenderer};

fn synthetic_snapshot(population: usize, food: usize, teams: i64) -> Snapshot {
    let entities = (0..population)
        .map(|i| Entity {
            x: (i * 37 % 1000) as f64,
            y: (i * 53 % 600) as f64,
            width: 5.0 + (i % 10) as f64,
            team_id: i as i64 % teams,
            active: i % 7 != 0,
            invulnerable: i % 11 == 0,
        })
        .collect();
    let foods = (0..food)
        .map(|i| Food {
            x: (i * 29 % 1000) as f64,
            y: (i * 31 % 600) as f64,
            size: 2.0 + (i % 3) as f64,
            active: i % 5 != 0,
        })
        .collect();
    Snapshot {
        entities,
        foods,
        team_count: teams,
    }
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let renderer = SceneRenderer::new();

    for population in [10usize, 100, 1000] {
        let snapshot = synthetic_snapshot(population, 200, 4);
        group.bench_with_input(
            BenchmarkId::new("pixel_surface", population),
            &snapshot,
            |b, snapshot| {
                b.iter_batched(
                    || PixelSurface::new(1000, 600, 4.0, Rgb::new(0, 0, 0)),
                    |mut surface| {
                        let classified = classify(snapshot).expect("valid snapshot");
                        renderer.render(&mut surface, &classified)
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

criterion_group!(render_benches, bench_render);
criterion_main!(render_benches);
