//! Axis reductions and the other value-returning whole-array transforms.

use ndrecon_kernels::{Element, RealScalar, Scalar, VectorTd};
use ndrecon_tensor::Tensor;
use num_traits::Float;
use num_traits::Zero;

use crate::{
    elementwise::map_new,
    error::TensorOpsError,
    parallel::for_each_indexed,
    placement::{ComputeScope, DeviceSelector, Placement},
};

/// Layout of a reduction over one axis of a row-major array.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AxisSplit {
    /// Shape of the result.
    out_shape: Vec<usize>,
    /// Product of the axes before `dim`.
    outer: usize,
    /// Length of `dim`.
    len: usize,
    /// Product of the axes after `dim`.
    inner: usize,
}

impl AxisSplit {
    fn new(shape: &[usize], dim: usize) -> Result<Self, TensorOpsError> {
        if dim >= shape.len() {
            return Err(TensorOpsError::DimOutOfBounds(
                dim,
                shape.len().saturating_sub(1),
            ));
        }
        let mut out_shape: Vec<usize> = shape[..dim]
            .iter()
            .chain(&shape[dim + 1..])
            .copied()
            .collect();
        if out_shape.is_empty() {
            out_shape.push(1);
        }
        Ok(Self {
            out_shape,
            outer: shape[..dim].iter().product(),
            len: shape[dim],
            inner: shape[dim + 1..].iter().product(),
        })
    }

    /// Input offset of element `k` along the axis for output offset `j`.
    #[inline]
    fn source(&self, j: usize, k: usize) -> usize {
        let (o, i) = (j / self.inner, j % self.inner);
        (o * self.len + k) * self.inner + i
    }

    /// Output offset that input offset `j` reduces into.
    #[inline]
    fn target(&self, j: usize) -> usize {
        let o = j / (self.len * self.inner);
        o * self.inner + j % self.inner
    }
}

fn reduce_axis<T, U, F, P>(
    x: &Tensor<T>,
    dim: usize,
    placement: Placement,
    init: U,
    fold: F,
    post: P,
) -> Result<Tensor<U>, TensorOpsError>
where
    T: Copy + Send + Sync,
    U: Copy + Send + Sync,
    F: Fn(U, &T) -> U + Send + Sync,
    P: Fn(U) -> U + Send + Sync,
{
    let split = AxisSplit::new(&x.shape, dim)?;
    let resolved = placement.resolve(x);
    let scope = ComputeScope::enter(resolved.compute)?;
    let src = scope.stage(x)?;
    let data = src.as_slice();
    let mut out = scope.alloc(&split.out_shape, init)?;
    for_each_indexed(scope.strategy(), out.as_slice_mut(), |j, d| {
        let acc = (0..split.len).fold(init, |acc, k| fold(acc, &data[split.source(j, k)]));
        *d = post(acc);
    })?;
    log::trace!(
        "reduced axis {} of {:?} -> {:?} ({} outer, {} inner)",
        dim,
        x.shape,
        split.out_shape,
        split.outer,
        split.inner
    );
    scope.finish(out, resolved.alloc)
}

/// Sum along axis `dim`, removing it.
///
/// Reducing the only axis of a rank-1 array yields shape `[1]`.
///
/// # Example
///
/// ```
/// use ndrecon_ops::{reduce::sum, Placement};
/// use ndrecon_tensor::{Device, Tensor};
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![1.0f32, 1.0, 1.0, 2.0, 2.0, 2.0], Device::Cpu).unwrap();
/// let s = sum(&t, 1, Placement::ARRAY).unwrap();
/// assert_eq!(s.shape, vec![2]);
/// assert_eq!(s.as_slice(), &[3.0, 6.0]);
/// ```
pub fn sum<T>(x: &Tensor<T>, dim: usize, placement: Placement) -> Result<Tensor<T>, TensorOpsError>
where
    T: Copy + Send + Sync + Zero,
{
    reduce_axis(x, dim, placement, T::zero(), |acc, v| acc + *v, |s| s)
}

/// Sum of squared magnitudes along axis `dim`.
pub fn ss<T: Element>(
    x: &Tensor<T>,
    dim: usize,
    placement: Placement,
) -> Result<Tensor<T::Real>, TensorOpsError> {
    let zero = <T::Real as Element>::ZERO;
    reduce_axis(x, dim, placement, zero, |acc, v| acc + v.norm_squared(), |s| s)
}

/// Root sum of squares along axis `dim`.
pub fn rss<T: Element>(
    x: &Tensor<T>,
    dim: usize,
    placement: Placement,
) -> Result<Tensor<T::Real>, TensorOpsError> {
    let zero = <T::Real as Element>::ZERO;
    reduce_axis(x, dim, placement, zero, |acc, v| acc + v.norm_squared(), |s| s.sqrt())
}

/// Reciprocal of the root sum of squares along axis `dim`.
///
/// Indices whose sum is zero hold `inf`.
pub fn reciprocal_rss<T: Element>(
    x: &Tensor<T>,
    dim: usize,
    placement: Placement,
) -> Result<Tensor<T::Real>, TensorOpsError> {
    let zero = <T::Real as Element>::ZERO;
    reduce_axis(
        x,
        dim,
        placement,
        zero,
        |acc, v| acc + v.norm_squared(),
        |s| s.sqrt().recip(),
    )
}

/// Euclidean length of every vector element.
pub fn norm<R: RealScalar, const D: usize>(
    x: &Tensor<VectorTd<R, D>>,
    placement: Placement,
) -> Result<Tensor<R>, TensorOpsError> {
    map_new(x, placement, R::ZERO, |v| v.length())
}

/// Squared Euclidean length of every vector element.
pub fn norm_squared<R: RealScalar, const D: usize>(
    x: &Tensor<VectorTd<R, D>>,
    placement: Placement,
) -> Result<Tensor<R>, TensorOpsError> {
    map_new(x, placement, R::ZERO, |v| v.dot(*v))
}

/// Repeats `x` `n` times along a new leading axis.
pub fn expand<T>(x: &Tensor<T>, n: usize, placement: Placement) -> Result<Tensor<T>, TensorOpsError>
where
    T: Copy + Send + Sync + Zero,
{
    if n == 0 {
        return Err(TensorOpsError::InvalidGeometry(
            "expand requires a non-zero repeat count".to_string(),
        ));
    }
    let out_shape: Vec<usize> = std::iter::once(n).chain(x.shape.iter().copied()).collect();
    let resolved = placement.resolve(x);
    let scope = ComputeScope::enter(resolved.compute)?;
    let src = scope.stage(x)?;
    let data = src.as_slice();
    let numel = data.len();
    let mut out = scope.alloc(&out_shape, T::zero())?;
    for_each_indexed(scope.strategy(), out.as_slice_mut(), |j, d| {
        *d = data[j % numel]
    })?;
    scope.finish(out, resolved.alloc)
}

/// Outer-product correlation across the last axis.
///
/// For an input of shape `[.., C]` the result has shape `[.., C, C]` with
/// `out[.., i, j] = x[.., i] * conj(x[.., j])`.
pub fn correlation<T: Scalar>(x: &Tensor<T>, placement: Placement) -> Result<Tensor<T>, TensorOpsError> {
    let Some(&channels) = x.shape.last() else {
        return Err(TensorOpsError::DimOutOfBounds(0, 0));
    };
    let out_shape: Vec<usize> = x.shape.iter().copied().chain(std::iter::once(channels)).collect();
    let resolved = placement.resolve(x);
    let scope = ComputeScope::enter(resolved.compute)?;
    let src = scope.stage(x)?;
    let data = src.as_slice();
    let mut out = scope.alloc(&out_shape, T::ZERO)?;
    let block = channels * channels;
    for_each_indexed(scope.strategy(), out.as_slice_mut(), |j, d| {
        let (m, r) = (j / block, j % block);
        let (a, b) = (r / channels, r % channels);
        *d = data[m * channels + a] * data[m * channels + b].conj();
    })?;
    scope.finish(out, resolved.alloc)
}

/// Divides every element by the root sum of squares of its group along `dim`.
///
/// Groups whose root sum of squares is zero are left untouched.
pub fn rss_normalize<T: Scalar>(
    x: &mut Tensor<T>,
    dim: usize,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError> {
    let split = AxisSplit::new(&x.shape, dim)?;
    let scope = ComputeScope::enter(compute.resolve(x))?;
    let strategy = scope.strategy();
    let mut norms = scope.alloc(&split.out_shape, <T::Real as Element>::ZERO)?;
    scope.update(x, |t| {
        let data = t.as_slice();
        for_each_indexed(strategy, norms.as_slice_mut(), |j, d| {
            let s = (0..split.len).fold(<T::Real as Element>::ZERO, |acc, k| {
                acc + data[split.source(j, k)].norm_squared()
            });
            *d = s.sqrt();
        })?;
        let norms = norms.as_slice();
        for_each_indexed(strategy, t.as_slice_mut(), |j, v| {
            let r = norms[split.target(j)];
            if !r.is_exact_zero() {
                *v = v.scale_real(r.recip());
            }
        })?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndrecon_tensor::Device;
    use num_complex::Complex;

    #[test]
    fn test_axis_split() -> Result<(), TensorOpsError> {
        let s = AxisSplit::new(&[2, 3, 4], 1)?;
        assert_eq!(s.out_shape, vec![2, 4]);
        assert_eq!((s.outer, s.len, s.inner), (2, 3, 4));
        assert_eq!(s.source(5, 2), 1 * 12 + 2 * 4 + 1);
        assert_eq!(s.target(1 * 12 + 2 * 4 + 1), 5);

        assert_eq!(AxisSplit::new(&[5], 0)?.out_shape, vec![1]);
        assert_eq!(
            AxisSplit::new(&[2, 3], 2),
            Err(TensorOpsError::DimOutOfBounds(2, 1))
        );
        Ok(())
    }

    #[test]
    fn test_sum_each_axis() -> Result<(), TensorOpsError> {
        let x = Tensor::from_shape_vec(&[2, 3], vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], Device::Cpu)?;
        let s0 = sum(&x, 0, Placement::ARRAY)?;
        assert_eq!(s0.shape, vec![3]);
        assert_eq!(s0.as_slice(), &[5.0, 7.0, 9.0]);
        let s1 = sum(&x, 1, Placement::ARRAY)?;
        assert_eq!(s1.as_slice(), &[6.0, 15.0]);
        Ok(())
    }

    #[test]
    fn test_sum_unsigned_vectors() -> Result<(), TensorOpsError> {
        let x = Tensor::from_shape_vec(
            &[3],
            vec![VectorTd([1u32, 2]), VectorTd([3, 4]), VectorTd([5, 6])],
            Device::Cpu,
        )?;
        let s = sum(&x, 0, Placement::ARRAY)?;
        assert_eq!(s.shape, vec![1]);
        assert_eq!(s.as_slice(), &[VectorTd([9, 12])]);
        Ok(())
    }

    #[test]
    fn test_ss_rss_complex() -> Result<(), TensorOpsError> {
        let x = Tensor::from_shape_vec(
            &[2, 2],
            vec![
                Complex::new(3.0f32, 0.0),
                Complex::new(0.0, 1.0),
                Complex::new(0.0, 4.0),
                Complex::new(0.0, 0.0),
            ],
            Device::Cpu,
        )?;
        let s = ss(&x, 0, Placement::ARRAY)?;
        assert_eq!(s.as_slice(), &[25.0, 1.0]);
        let r = rss(&x, 0, Placement::ARRAY)?;
        assert_eq!(r.as_slice(), &[5.0, 1.0]);
        let rr = reciprocal_rss(&x, 0, Placement::ARRAY)?;
        assert_relative_eq!(rr.as_slice()[0], 0.2);
        Ok(())
    }

    #[test]
    fn test_reciprocal_rss_zero_is_inf() -> Result<(), TensorOpsError> {
        let x = Tensor::from_shape_val(&[3, 1], 0.0f64, Device::Cpu)?;
        let rr = reciprocal_rss(&x, 0, Placement::ARRAY)?;
        assert!(rr.as_slice()[0].is_infinite());
        Ok(())
    }

    #[test]
    fn test_length_one_axis_is_identity() -> Result<(), TensorOpsError> {
        let x = Tensor::from_shape_vec(&[1, 3], vec![-1.0f32, 2.0, -3.0], Device::Cpu)?;
        let r = rss(&x, 0, Placement::ARRAY)?;
        assert_eq!(r.as_slice(), &[1.0, 2.0, 3.0]);
        let s = sum(&x, 0, Placement::ARRAY)?;
        assert_eq!(s.as_slice(), x.as_slice());
        Ok(())
    }

    #[test]
    fn test_norm_vectors() -> Result<(), TensorOpsError> {
        let x = Tensor::from_shape_vec(
            &[2],
            vec![VectorTd([3.0f32, 4.0]), VectorTd([0.0, -2.0])],
            Device::Cpu,
        )?;
        assert_eq!(norm(&x, Placement::ARRAY)?.as_slice(), &[5.0, 2.0]);
        assert_eq!(norm_squared(&x, Placement::ARRAY)?.as_slice(), &[25.0, 4.0]);
        Ok(())
    }

    #[test]
    fn test_expand() -> Result<(), TensorOpsError> {
        let x = Tensor::from_shape_vec(&[2], vec![1.0f64, 2.0], Device::Cpu)?;
        let e = expand(&x, 3, Placement::ARRAY)?;
        assert_eq!(e.shape, vec![3, 2]);
        assert_eq!(e.as_slice(), &[1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
        assert!(matches!(
            expand(&x, 0, Placement::ARRAY),
            Err(TensorOpsError::InvalidGeometry(_))
        ));
        Ok(())
    }

    #[test]
    fn test_correlation() -> Result<(), TensorOpsError> {
        let x = Tensor::from_shape_vec(
            &[1, 2],
            vec![Complex::new(1.0f32, 0.0), Complex::new(0.0, 1.0)],
            Device::Cpu,
        )?;
        let c = correlation(&x, Placement::ARRAY)?;
        assert_eq!(c.shape, vec![1, 2, 2]);
        assert_eq!(
            c.as_slice(),
            &[
                Complex::new(1.0, 0.0),
                Complex::new(0.0, -1.0),
                Complex::new(0.0, 1.0),
                Complex::new(1.0, 0.0),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_rss_normalize() -> Result<(), TensorOpsError> {
        let mut x = Tensor::from_shape_vec(&[2, 2], vec![3.0f64, 0.0, 4.0, 0.0], Device::Cpu)?;
        rss_normalize(&mut x, 0, DeviceSelector::ArrayDevice)?;
        assert_relative_eq!(x.as_slice()[0], 0.6);
        assert_relative_eq!(x.as_slice()[2], 0.8);
        // zero group untouched
        assert_eq!(x.as_slice()[1], 0.0);
        assert_eq!(x.as_slice()[3], 0.0);
        Ok(())
    }

    #[test]
    fn test_bad_axis_leaves_input() -> Result<(), TensorOpsError> {
        let mut x = Tensor::from_shape_val(&[2, 2], 1.0f32, Device::Cpu)?;
        let err = rss_normalize(&mut x, 2, DeviceSelector::ArrayDevice).unwrap_err();
        assert_eq!(err, TensorOpsError::DimOutOfBounds(2, 1));
        assert_eq!(x.as_slice(), &[1.0; 4]);
        assert!(sum(&x, 5, Placement::ARRAY).is_err());
        Ok(())
    }
}
