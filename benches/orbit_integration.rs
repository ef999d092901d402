use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Vector3;

use gaia3d::orbit::potential::{MilkyWayPotential, Potential};
use gaia3d::orbit::{integrate_orbit, OrbitParams};

fn bench_potential(c: &mut Criterion) {
    let mw = MilkyWayPotential::mw2014();
    let pos = Vector3::new(5.0, -3.0, 0.4);

    c.bench_function("mw2014/acceleration", |b| {
        b.iter(|| mw.acceleration(black_box(&pos)))
    });
}

fn bench_orbit(c: &mut Criterion) {
    let mw = MilkyWayPotential::mw2014();
    let mut group = c.benchmark_group("integrate_orbit");
    group.sample_size(10);

    let one_gyr = OrbitParams::builder()
        .duration(1.0)
        .samples(100)
        .build()
        .unwrap();
    group.bench_function("circular_1Gyr", |b| {
        b.iter(|| integrate_orbit(&mw, black_box(&one_gyr)).unwrap())
    });

    let eccentric = OrbitParams::builder()
        .tangential_velocity(Some(150.0))
        .duration(1.0)
        .samples(100)
        .build()
        .unwrap();
    group.bench_function("eccentric_1Gyr", |b| {
        b.iter(|| integrate_orbit(&mw, black_box(&eccentric)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_potential, bench_orbit);
criterion_main!(benches);
