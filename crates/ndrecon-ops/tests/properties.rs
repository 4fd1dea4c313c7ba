use approx::assert_relative_eq;
use ndrecon_ops::{
    blas::amax,
    convert::c_abs,
    elementwise::{axpy, clear, reciprocal, scal},
    reduce::{rss, rss_normalize},
    region::{crop, origin_mirror},
    resample::{downsample, upsample_nn},
    shrink::shrink1,
    Coefficient, DeviceSelector, ErrorKind, Placement,
};
use ndrecon_tensor::{Device, Tensor};
use num_complex::Complex;
use rand::Rng;

const COMPUTE: DeviceSelector = DeviceSelector::ArrayDevice;

fn random_real(shape: &[usize], lo: f32, hi: f32) -> Tensor<f32> {
    let mut rng = rand::rng();
    let n = shape.iter().product::<usize>();
    let data = (0..n).map(|_| rng.random_range(lo..hi)).collect();
    Tensor::from_shape_vec(shape, data, Device::Cpu).unwrap()
}

fn random_complex(shape: &[usize]) -> Tensor<Complex<f64>> {
    let mut rng = rand::rng();
    let n = shape.iter().product::<usize>();
    let data = (0..n)
        .map(|_| Complex::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)))
        .collect();
    Tensor::from_shape_vec(shape, data, Device::Cpu).unwrap()
}

#[test]
fn test_scal_by_one_is_identity() -> Result<(), Box<dyn std::error::Error>> {
    let x = random_complex(&[3, 7]);
    let mut y = x.try_clone()?;
    scal(Complex::new(1.0, 0.0), &mut y, COMPUTE)?;
    assert_eq!(y.as_slice(), x.as_slice());
    Ok(())
}

#[test]
fn test_axpy_with_zero_is_identity() -> Result<(), Box<dyn std::error::Error>> {
    let x = random_real(&[5, 4], -10.0, 10.0);
    let y0 = random_real(&[5, 4], -10.0, 10.0);
    let mut y = y0.try_clone()?;
    axpy(Coefficient::Scalar(0.0), &x, &mut y, COMPUTE)?;
    assert_eq!(y.as_slice(), y0.as_slice());
    Ok(())
}

#[test]
fn test_reciprocal_twice() -> Result<(), Box<dyn std::error::Error>> {
    let x = random_real(&[64], 0.5, 4.0);
    let mut y = x.try_clone()?;
    reciprocal(&mut y, COMPUTE)?;
    reciprocal(&mut y, COMPUTE)?;
    for (a, b) in x.as_slice().iter().zip(y.as_slice()) {
        assert_relative_eq!(a, b, max_relative = 1e-6);
    }
    Ok(())
}

#[test]
fn test_shrink1_below_gamma_vanishes() -> Result<(), Box<dyn std::error::Error>> {
    let x = random_real(&[4, 4], -0.5, 0.5);
    let mut out = Tensor::from_shape_val(&[4, 4], 1.0f32, Device::Cpu)?;
    shrink1(0.5, &x, &mut out, COMPUTE)?;
    assert!(out.as_slice().iter().all(|v| *v == 0.0));
    Ok(())
}

#[test]
fn test_downsample_upsample_shape() -> Result<(), Box<dyn std::error::Error>> {
    let x = random_real(&[3, 8, 6], -1.0, 1.0);
    let down = downsample::<_, 2>(&x, Placement::ARRAY)?;
    assert_eq!(down.shape, vec![3, 4, 3]);
    let up = upsample_nn::<_, 2>(&down, Placement::ARRAY)?;
    assert_eq!(up.shape, x.shape);
    Ok(())
}

#[test]
fn test_crop_at_origin_is_identity() -> Result<(), Box<dyn std::error::Error>> {
    let x = random_real(&[2, 5, 3], -1.0, 1.0);
    let mut out = Tensor::from_shape_val(&[2, 5, 3], 0.0f32, Device::Cpu)?;
    crop([0, 0], &x, &mut out, COMPUTE)?;
    assert_eq!(out.as_slice(), x.as_slice());
    Ok(())
}

#[test]
fn test_rss_follows_permutation_of_kept_axis() -> Result<(), Box<dyn std::error::Error>> {
    let x = random_complex(&[4, 5]);
    let xs = x.as_slice();
    let perm = |j: usize| (2 * j + 1) % 5;
    let shuffled = Tensor::from_shape_fn(&[4, 5], Device::Cpu, |i| xs[i[0] * 5 + perm(i[1])])?;
    let r = rss(&x, 0, Placement::ARRAY)?;
    let r_shuffled = rss(&shuffled, 0, Placement::ARRAY)?;
    assert_eq!(r_shuffled.shape, r.shape);
    for j in 0..5 {
        assert_relative_eq!(r_shuffled.as_slice()[j], r.as_slice()[perm(j)], epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn test_rss_after_rss_normalize_is_one() -> Result<(), Box<dyn std::error::Error>> {
    let mut x = random_complex(&[4, 6, 5]);
    rss_normalize(&mut x, 0, COMPUTE)?;
    let r = rss(&x, 0, Placement::ARRAY)?;
    assert_eq!(r.shape, vec![6, 5]);
    for v in r.as_slice() {
        assert_relative_eq!(*v, 1.0, epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn test_origin_mirror_twice_on_odd_sizes() -> Result<(), Box<dyn std::error::Error>> {
    let x = random_complex(&[5, 7]);
    let mut once = Tensor::from_shape_val(&[5, 7], Complex::new(0.0, 0.0), Device::Cpu)?;
    let mut twice = once.try_clone()?;
    origin_mirror::<_, 2>(&x, &mut once, false, COMPUTE)?;
    origin_mirror::<_, 2>(&once, &mut twice, false, COMPUTE)?;
    assert_eq!(twice.as_slice(), x.as_slice());
    Ok(())
}

#[test]
fn test_bad_axis_fails_without_mutation() -> Result<(), Box<dyn std::error::Error>> {
    let x = random_complex(&[3, 3]);
    let mut y = x.try_clone()?;
    let err = rss_normalize(&mut y, 2, COMPUTE).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    assert_eq!(y.as_slice(), x.as_slice());
    assert!(rss(&x, 5, Placement::ARRAY).is_err());
    Ok(())
}

#[test]
fn test_clear_then_amax() -> Result<(), Box<dyn std::error::Error>> {
    let mut x = Tensor::from_shape_val(&[4, 4], 2.0f32, Device::Cpu)?;
    assert_eq!(amax(&x, COMPUTE)?, 2.0);
    clear(&mut x, 0.0, COMPUTE)?;
    assert_eq!(amax(&x, COMPUTE)?, 0.0);
    Ok(())
}

#[test]
fn test_c_abs_values() -> Result<(), Box<dyn std::error::Error>> {
    let x = Tensor::from_shape_vec(
        &[3],
        vec![Complex::new(3.0f32, 4.0), Complex::new(0.0, 0.0), Complex::new(1.0, 1.0)],
        Device::Cpu,
    )?;
    let m = c_abs(&x, Placement::ARRAY)?;
    assert_relative_eq!(m.as_slice()[0], 5.0);
    assert_eq!(m.as_slice()[1], 0.0);
    assert_relative_eq!(m.as_slice()[2], std::f32::consts::SQRT_2);
    Ok(())
}
