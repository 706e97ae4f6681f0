//! Benchmarks for stepping a scene and batching its geometry.
//!
//! Run with: cargo bench --bench quad_batch

use actionviz::renderer::quads::QuadBatch;
use actionviz::scene::synthetic::SyntheticLog;
use actionviz::scene::Scene;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn busy_scene(events: usize) -> Scene {
    let mut scene = Scene::new();
    for entry in SyntheticLog::new(42, 6).take(events) {
        let _ = scene.record(&entry);
    }
    // Move everything past its apply so the bench measures steady state
    scene.step(0.001);
    scene
}

fn bench_emit_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit_geometry");

    for events in [100, 1_000, 10_000].iter() {
        let scene = busy_scene(*events);
        let mut batch = QuadBatch::with_capacity(*events * 2);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_actions", events)),
            events,
            |b, _| {
                b.iter(|| {
                    batch.clear();
                    scene.emit_geometry(&mut batch);
                    black_box(batch.quad_count())
                });
            },
        );
    }

    group.finish();
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_step");

    for events in [100, 1_000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_actions", events)),
            events,
            |b, &events| {
                b.iter_batched(
                    || busy_scene(events),
                    |mut scene| black_box(scene.step(1.0 / 60.0)),
                    criterion::BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_emit_geometry, bench_step);
criterion_main!(benches);
