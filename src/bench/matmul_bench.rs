//! Criterion benchmarks: naive vs Strassen vs dispatch.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use haifisch::{Config, Matrix, Multiplier, Strategy};

fn operands(size: usize) -> (Matrix<f64>, Matrix<f64>) {
    let n = size * size;
    let a = Matrix::from_vec(size, size, (0..n).map(|i| (i % 100) as f64).collect()).unwrap();
    let b = Matrix::from_vec(size, size, (0..n).map(|i| (i % 97) as f64).collect()).unwrap();
    (a, b)
}

fn bench_strategies(c: &mut Criterion) {
    let multiplier = Multiplier::new(Config::default()).unwrap();
    let mut group = c.benchmark_group("strategies");

    for size in [32, 64, 128] {
        let (a, b) = operands(size);

        group.bench_with_input(BenchmarkId::new("naive", size), &size, |bench, _| {
            bench.iter(|| {
                multiplier
                    .multiply_using(Strategy::Naive, black_box(&a), black_box(&b))
                    .unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("strassen", size), &size, |bench, _| {
            bench.iter(|| {
                multiplier
                    .multiply_using(Strategy::Strassen, black_box(&a), black_box(&b))
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_strassen_leaf(c: &mut Criterion) {
    let mut group = c.benchmark_group("strassen_leaf");
    let (a, b) = operands(256);

    for leaf in [1, 16, 64] {
        let multiplier = Multiplier::new(Config::default().with_strassen_leaf(leaf)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(leaf), &leaf, |bench, _| {
            bench.iter(|| multiplier.multiply(black_box(&a), black_box(&b)).unwrap());
        });
    }

    group.finish();
}

fn bench_dispatch_odd_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for size in [127, 129] {
        let (a, b) = operands(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bench, _| {
            bench.iter(|| &a * &b);
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_strategies,
    bench_strassen_leaf,
    bench_dispatch_odd_sizes
);
criterion_main!(benches);
