//! Soft-thresholding (shrinkage) operators used by sparsity-promoting solvers.

use ndrecon_kernels::Scalar;
use ndrecon_tensor::Tensor;

use crate::{
    elementwise::check_same_shape,
    error::TensorOpsError,
    parallel::{for_each_indexed, zip_for_each},
    placement::{ComputeScope, DeviceSelector},
};

#[inline]
fn shrink_factor<R: ndrecon_kernels::RealScalar>(norm: R, gamma: R) -> R {
    if norm.is_exact_zero() {
        return R::ZERO;
    }
    (norm - gamma).max(R::ZERO) / norm
}

/// Element-wise soft threshold: `out = x / |x| * max(|x| - gamma, 0)`.
///
/// Elements with `|x| == 0` map to zero. `input` may not alias `out`; use a
/// copy for an in-place shrink.
///
/// # Errors
///
/// Fails when `input` and `out` differ in shape.
pub fn shrink1<T: Scalar>(
    gamma: T::Real,
    input: &Tensor<T>,
    out: &mut Tensor<T>,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError> {
    check_same_shape(input, out)?;
    let scope = ComputeScope::enter(compute.resolve(input))?;
    let strategy = scope.strategy();
    let src = scope.stage(input)?;
    scope.update(out, |t| {
        Ok(zip_for_each(strategy, src.as_slice(), t.as_slice_mut(), |x, d| {
            *d = x.scale_real(shrink_factor(x.magnitude(), gamma))
        })?)
    })
}

/// Group soft threshold with precomputed group norms `s_k`.
///
/// `s_k` covers the trailing axes of `input` and is broadcast over the
/// leading ones: `out[i] = x[i] / s * max(s - gamma, 0)` with
/// `s = s_k[i % s_k.numel()]`. Groups whose norm is zero map to zero.
///
/// # Errors
///
/// Fails when `input` and `out` differ in shape or `s_k` is not a trailing
/// sub-shape of `input`.
pub fn shrinkd<T: Scalar>(
    gamma: T::Real,
    s_k: &Tensor<T::Real>,
    input: &Tensor<T>,
    out: &mut Tensor<T>,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError> {
    check_same_shape(input, out)?;
    if s_k.shape.is_empty() || !input.shape.ends_with(&s_k.shape) {
        return Err(TensorOpsError::ShapeMismatch(input.shape.clone(), s_k.shape.clone()));
    }
    let scope = ComputeScope::enter(compute.resolve(input))?;
    let strategy = scope.strategy();
    let (src, norms) = (scope.stage(input)?, scope.stage(s_k)?);
    let (src, norms) = (src.as_slice(), norms.as_slice());
    let group = norms.len();
    scope.update(out, |t| {
        Ok(for_each_indexed(strategy, t.as_slice_mut(), |i, d| {
            *d = src[i].scale_real(shrink_factor(norms[i % group], gamma))
        })?)
    })
}
