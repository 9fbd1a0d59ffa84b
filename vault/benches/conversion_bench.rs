// Conversion benchmarks for the Strata vault engine.
//
// Covers the 256-bit mul-div primitive and both conversion directions at
// realistic and near-limit pool sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use strata_vault::math::mul_div;
use strata_vault::{ExchangeRate, Rounding};

fn bench_mul_div(c: &mut Criterion) {
    c.bench_function("math/mul_div_down", |b| {
        b.iter(|| {
            mul_div(
                black_box(1_000_000_000_000_000_000),
                black_box(3_333_333_333_333),
                black_box(7_777_777),
                Rounding::Down,
            )
        });
    });

    c.bench_function("math/mul_div_up_wide", |b| {
        b.iter(|| {
            mul_div(
                black_box(u128::MAX / 3),
                black_box(u128::MAX / 5),
                black_box(u128::MAX / 7),
                Rounding::Up,
            )
        });
    });
}

fn bench_conversions(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion/to_shares");
    for &(total_assets, total_shares) in &[
        (0u128, 0u128),
        (1_000_000, 1_000_000),
        (u64::MAX as u128, (u64::MAX as u128) * 1_000),
    ] {
        let rate = ExchangeRate::from_parts(total_assets, total_shares, 1_000_000);
        group.bench_with_input(
            BenchmarkId::from_parameter(total_assets),
            &rate,
            |b, rate| {
                b.iter(|| rate.to_shares(black_box(123_456_789), Rounding::Down));
            },
        );
    }
    group.finish();

    let rate = ExchangeRate::from_parts(5_000_000_000, 4_000_000_000_000, 1_000);
    c.bench_function("conversion/to_assets_up", |b| {
        b.iter(|| rate.to_assets(black_box(987_654_321), Rounding::Up));
    });
}

criterion_group!(benches, bench_mul_div, bench_conversions);
criterion_main!(benches);
