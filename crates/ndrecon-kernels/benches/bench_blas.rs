use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndrecon_kernels::blas::{dotc, nrm2};
use num_complex::Complex;
use rand::Rng;

fn bench_dotc(c: &mut Criterion) {
    let mut group = c.benchmark_group("dotc");
    let mut rng = rand::rng();

    let test_sizes = vec![8, 128, 1024, 16384];

    for size in test_sizes.clone() {
        let a: Vec<f32> = (0..size).map(|_| rng.random::<f32>()).collect();
        let b: Vec<f32> = (0..size).map(|_| rng.random::<f32>()).collect();

        group.bench_function(format!("f32_size_{}", size), |bencher| {
            bencher.iter(|| black_box(dotc(&a, &b).unwrap()))
        });
    }

    for size in test_sizes {
        let a: Vec<Complex<f32>> = (0..size)
            .map(|_| Complex::new(rng.random::<f32>(), rng.random::<f32>()))
            .collect();
        let b = a.clone();

        group.bench_function(format!("c32_size_{}", size), |bencher| {
            bencher.iter(|| black_box(dotc(&a, &b).unwrap()))
        });
    }

    group.finish();
}

fn bench_nrm2(c: &mut Criterion) {
    let mut group = c.benchmark_group("nrm2");
    let mut rng = rand::rng();

    for size in [128, 16384] {
        let a: Vec<f64> = (0..size).map(|_| rng.random::<f64>()).collect();

        group.bench_function(format!("f64_size_{}", size), |bencher| {
            bencher.iter(|| black_box(nrm2(&a)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dotc, bench_nrm2);
criterion_main!(benches);
