use criterion::{Criterion, criterion_group, criterion_main};
use forge_core::NoiseParams;
use forge_procgen::{DensityField, SmoothedRandom, generate_universe};
use std::hint::black_box;

const SEED: u64 = 12345;

fn bench_density_field(c: &mut Criterion) {
    let params = NoiseParams::default();
    c.bench_function("density_field_64", |b| {
        b.iter(|| {
            let mut field = DensityField::new([64, 64, 64]);
            black_box(field.generate(black_box(SEED), &params).mean());
        });
    });
    c.bench_function("smoothed_random_field_64", |b| {
        b.iter(|| {
            let mut field =
                DensityField::with_backend([64, 64, 64], Box::new(SmoothedRandom::default()));
            black_box(field.generate(black_box(SEED), &params).mean());
        });
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_universe");
    group.sample_size(10);
    group.bench_function("64x10", |b| {
        b.iter(|| black_box(generate_universe(Some(SEED), [64, 64, 64], 10, 200.0)));
    });
    group.finish();
}

criterion_group!(benches, bench_density_field, bench_full_pipeline);
criterion_main!(benches);
