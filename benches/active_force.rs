//! Benchmarks for the active force kernel.
//!
//! Run with: `cargo bench`

use abpe::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn sim_with_active(n: usize, rotation_diff: f64, constrained: bool) -> Simulation {
    let mut sim = Simulation::new(n).with_spawner(1, |ctx| {
        let tag = ctx.tag;
        Particle::at(tag, ctx.random_on_sphere(3.0))
    });
    let mut builder = ActiveForce::builder(Group::all(n), 42)
        .uniform_force(DVec3::new(1.0, 0.0, 0.0))
        .rotation_diff(rotation_diff);
    if constrained {
        let surface = ConstraintSurface::sphere(DVec3::ZERO, 3.0).unwrap();
        builder = builder.constraint(surface);
    }
    sim.add_force(builder.build().unwrap()).unwrap();
    sim
}

fn bench_diffusion_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("diffusion_step");

    for &n in &[1_000usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("free", n), &n, |b, &n| {
            let mut sim = sim_with_active(n, 3.0, false);
            b.iter(|| {
                sim.step().unwrap();
                black_box(sim.net_force(0))
            })
        });

        group.bench_with_input(BenchmarkId::new("constrained", n), &n, |b, &n| {
            let mut sim = sim_with_active(n, 3.0, true);
            b.iter(|| {
                sim.step().unwrap();
                black_box(sim.net_force(0))
            })
        });
    }

    group.finish();
}

fn bench_no_diffusion(c: &mut Criterion) {
    // D_r = 0 short-circuits the random draw entirely
    c.bench_function("zero_diffusion_10k", |b| {
        let mut sim = sim_with_active(10_000, 0.0, false);
        b.iter(|| {
            sim.step().unwrap();
            black_box(sim.net_force(0))
        })
    });
}

fn bench_stream_derivation(c: &mut Criterion) {
    use abpe::rng::ParticleStream;

    c.bench_function("particle_stream_draws", |b| {
        b.iter(|| {
            let mut s = ParticleStream::new(black_box(7), black_box(3), black_box(100));
            let v = s.unit_vector();
            let g = s.standard_normal();
            black_box((v, g))
        })
    });
}

criterion_group!(
    benches,
    bench_diffusion_step,
    bench_no_diffusion,
    bench_stream_derivation
);
criterion_main!(benches);
