use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use hobart_stats::{RollingConfig, RollingRegression};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn bench_rolling_simple(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_simple");
    let roll = RollingRegression::new(RollingConfig::default()).unwrap();

    for n in [120usize, 600, 2400] {
        let mut rng = StdRng::seed_from_u64(7);
        let periods: Vec<i64> = (0..n as i64).collect();
        let x: Vec<f64> = (0..n).map(|_| rng.gen_range(-0.1..0.1)).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|m| 1.2 * m + rng.gen_range(-0.02..0.02))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| roll.simple(black_box(&periods), black_box(&y), black_box(&x)))
        });
    }
    group.finish();
}

fn bench_rolling_multiple(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let n = 600;
    let periods: Vec<i64> = (0..n as i64).collect();
    let x = Array2::from_shape_fn((n, 2), |_| rng.gen_range(-0.1..0.1));
    let y = Array1::from_shape_fn(n, |i| 0.9 * x[[i, 0]] + 0.3 * x[[i, 1]]);
    let roll = RollingRegression::new(RollingConfig::default()).unwrap();

    c.bench_function("rolling_multiple_600", |b| {
        b.iter(|| roll.multiple(black_box(&periods), black_box(&y), black_box(&x)))
    });
}

criterion_group!(benches, bench_rolling_simple, bench_rolling_multiple);
criterion_main!(benches);
