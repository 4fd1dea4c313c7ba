use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndrecon_ops::{
    reduce::rss,
    resample::{downsample, upsample_lin},
    shrink::shrink1,
    DeviceSelector, Placement,
};
use ndrecon_tensor::{Device, Tensor};
use num_complex::Complex;
use rand::Rng;

fn random_complex(shape: &[usize]) -> Tensor<Complex<f32>> {
    let mut rng = rand::rng();
    let n = shape.iter().product::<usize>();
    let data = (0..n)
        .map(|_| Complex::new(rng.random::<f32>(), rng.random::<f32>()))
        .collect();
    Tensor::from_shape_vec(shape, data, Device::Cpu).unwrap()
}

fn bench_rss(c: &mut Criterion) {
    let mut group = c.benchmark_group("rss");

    for (coils, size) in [(4, 128), (8, 256), (32, 256)] {
        let x = random_complex(&[coils, size, size]);
        group.bench_with_input(
            BenchmarkId::new("coils", format!("{coils}x{size}x{size}")),
            &x,
            |b, x| b.iter(|| black_box(rss(x, 0, Placement::ARRAY).unwrap())),
        );
    }

    group.finish();
}

fn bench_shrink1(c: &mut Criterion) {
    let mut group = c.benchmark_group("shrink1");

    for size in [64, 256, 512] {
        let x = random_complex(&[size, size]);
        let mut out = x.try_clone().unwrap();
        group.bench_function(format!("c32_{size}x{size}"), |b| {
            b.iter(|| shrink1(0.5, black_box(&x), &mut out, DeviceSelector::ArrayDevice).unwrap())
        });
    }

    group.finish();
}

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample");
    let mut rng = rand::rng();

    for size in [64, 256] {
        let data = (0..size * size).map(|_| rng.random::<f32>()).collect();
        let x = Tensor::from_shape_vec(&[size, size], data, Device::Cpu).unwrap();

        group.bench_function(format!("downsample_{size}"), |b| {
            b.iter(|| black_box(downsample::<_, 2>(&x, Placement::ARRAY).unwrap()))
        });
        group.bench_function(format!("upsample_lin_{size}"), |b| {
            b.iter(|| black_box(upsample_lin::<_, 2>(&x, Placement::ARRAY).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rss, bench_shrink1, bench_resample);
criterion_main!(benches);
