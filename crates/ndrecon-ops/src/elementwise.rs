//! In-place element-wise operations.
//!
//! Every kernel here touches each element independently, so the order in which
//! elements are visited does not affect the result.

use ndrecon_kernels::{
    ComponentAbs, Element, HostBlas, LinearAlgebra, RealScalar, Reciprocal, Scalar,
};
use ndrecon_tensor::Tensor;
use num_traits::Float;

use crate::{
    error::TensorOpsError,
    parallel::{for_each_mut, zip_for_each},
    placement::{ComputeScope, DeviceSelector, Placement},
};

/// Right-hand side of [`scale`] and [`scale_conj`].
#[derive(Debug, Clone, Copy)]
pub enum Multiplier<'a, T: Scalar> {
    /// Element-wise multiplier of the same element type.
    Same(&'a Tensor<T>),
    /// Real multiplier broadcast into each (complex) element.
    Real(&'a Tensor<T::Real>),
}

/// The `a` in `y := a * x + y`.
#[derive(Debug, Clone, Copy)]
pub enum Coefficient<'a, T: Scalar> {
    /// One coefficient for every element.
    Scalar(T),
    /// Per-element coefficients.
    Array(&'a Tensor<T>),
    /// Per-element real coefficients applied to a complex `x`.
    RealArray(&'a Tensor<T::Real>),
}

pub(crate) fn check_same_shape<A, B>(a: &Tensor<A>, b: &Tensor<B>) -> Result<(), TensorOpsError> {
    if a.shape != b.shape {
        return Err(TensorOpsError::ShapeMismatch(a.shape.clone(), b.shape.clone()));
    }
    Ok(())
}

/// Builds a new array with `f` applied to every element of `x`.
pub(crate) fn map_new<T, U, F>(
    x: &Tensor<T>,
    placement: Placement,
    init: U,
    f: F,
) -> Result<Tensor<U>, TensorOpsError>
where
    T: Copy + Send + Sync,
    U: Copy + Send + Sync,
    F: Fn(&T) -> U + Send + Sync,
{
    let resolved = placement.resolve(x);
    let scope = ComputeScope::enter(resolved.compute)?;
    let src = scope.stage(x)?;
    let mut out = scope.alloc(&x.shape, init)?;
    zip_for_each(scope.strategy(), src.as_slice(), out.as_slice_mut(), |s, d| {
        *d = f(s)
    })?;
    scope.finish(out, resolved.alloc)
}

fn update_each<T, F>(x: &mut Tensor<T>, compute: DeviceSelector, f: F) -> Result<(), TensorOpsError>
where
    T: Copy + Send + Sync,
    F: Fn(&mut T) + Send + Sync,
{
    let scope = ComputeScope::enter(compute.resolve(x))?;
    let strategy = scope.strategy();
    scope.update(x, |t| Ok(for_each_mut(strategy, t.as_slice_mut(), f)?))
}

/// Runs `f(&aux[i], &mut x[i])` with `aux` resolved as the first array argument.
fn update_zip<S, T, F>(
    aux: &Tensor<S>,
    x: &mut Tensor<T>,
    compute: DeviceSelector,
    f: F,
) -> Result<(), TensorOpsError>
where
    S: Copy + Send + Sync,
    T: Copy + Send + Sync,
    F: Fn(&S, &mut T) + Send + Sync,
{
    check_same_shape(aux, x)?;
    let scope = ComputeScope::enter(compute.resolve(aux))?;
    let strategy = scope.strategy();
    let aux = scope.stage(aux)?;
    scope.update(x, |t| Ok(zip_for_each(strategy, aux.as_slice(), t.as_slice_mut(), f)?))
}

/// Sets every element to `value`.
pub fn clear<T>(x: &mut Tensor<T>, value: T, compute: DeviceSelector) -> Result<(), TensorOpsError>
where
    T: Copy + Send + Sync,
{
    update_each(x, compute, |v| *v = value)
}

/// Replaces every element by its reciprocal; vector elements invert each component.
///
/// Zero elements become the IEEE sentinel (`inf` for reals).
pub fn reciprocal<T: Reciprocal>(
    x: &mut Tensor<T>,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError> {
    update_each(x, compute, |v| *v = v.reciprocal())
}

/// Element-wise square root. Real element types only.
pub fn sqrt<T: Scalar>(x: &mut Tensor<T>, compute: DeviceSelector) -> Result<(), TensorOpsError> {
    if T::KIND != ndrecon_kernels::ElementKind::Real {
        return Err(TensorOpsError::unsupported::<T>("sqrt"));
    }
    update_each(x, compute, |v| *v = T::from_real(v.re().sqrt()))
}

/// Element-wise `1 / sqrt(x)`. Real element types only.
pub fn reciprocal_sqrt<T: Scalar>(
    x: &mut Tensor<T>,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError> {
    if T::KIND != ndrecon_kernels::ElementKind::Real {
        return Err(TensorOpsError::unsupported::<T>("reciprocal_sqrt"));
    }
    update_each(x, compute, |v| *v = T::from_real(v.re().sqrt().recip()))
}

/// Component-wise absolute value of real scalars and real vectors.
pub fn abs<T: ComponentAbs>(x: &mut Tensor<T>, compute: DeviceSelector) -> Result<(), TensorOpsError> {
    update_each(x, compute, |v| *v = v.component_abs())
}

/// Replaces elements whose magnitude is below `min` by `to_value`.
pub fn threshold_min<T: Element>(
    min: T::Real,
    x: &mut Tensor<T>,
    to_value: T,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError> {
    update_each(x, compute, |v| {
        if v.magnitude() < min {
            *v = to_value;
        }
    })
}

/// Replaces elements whose magnitude is above `max` by `to_value`.
pub fn threshold_max<T: Element>(
    max: T::Real,
    x: &mut Tensor<T>,
    to_value: T,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError> {
    update_each(x, compute, |v| {
        if v.magnitude() > max {
            *v = to_value;
        }
    })
}

/// `x := a * x`.
pub fn scal<T: Scalar>(a: T, x: &mut Tensor<T>, compute: DeviceSelector) -> Result<(), TensorOpsError> {
    let scope = ComputeScope::enter(compute.resolve(x))?;
    scope.update(x, |t| {
        HostBlas.scal(a, t.as_slice_mut());
        Ok(())
    })
}

/// `x := a * x` with a real factor, typically applied to complex arrays.
pub fn scal_real<T: Scalar>(
    a: T::Real,
    x: &mut Tensor<T>,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError> {
    update_each(x, compute, |v| *v = v.scale_real(a))
}

/// `x[i] := a[i] * x[i]`.
pub fn scale<T: Scalar>(
    a: Multiplier<'_, T>,
    x: &mut Tensor<T>,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError> {
    match a {
        Multiplier::Same(a) => update_zip(a, x, compute, |a, v| *v = *a * *v),
        Multiplier::Real(a) => update_zip(a, x, compute, |a, v| *v = v.scale_real(*a)),
    }
}

/// `x[i] := conj(a[i]) * x[i]`. A real multiplier is its own conjugate.
pub fn scale_conj<T: Scalar>(
    a: Multiplier<'_, T>,
    x: &mut Tensor<T>,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError> {
    match a {
        Multiplier::Same(a) => update_zip(a, x, compute, |a, v| *v = a.conj() * *v),
        Multiplier::Real(a) => update_zip(a, x, compute, |a, v| *v = v.scale_real(*a)),
    }
}

/// `y := a * x + y`.
pub fn axpy<T: Scalar>(
    a: Coefficient<'_, T>,
    x: &Tensor<T>,
    y: &mut Tensor<T>,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError> {
    check_same_shape(x, y)?;
    match a {
        Coefficient::Scalar(a) => {
            let scope = ComputeScope::enter(compute.resolve(x))?;
            let x = scope.stage(x)?;
            scope.update(y, |t| Ok(HostBlas.axpy(a, x.as_slice(), t.as_slice_mut())?))
        }
        Coefficient::Array(a) => {
            check_same_shape(a, x)?;
            let scope = ComputeScope::enter(compute.resolve(a))?;
            let strategy = scope.strategy();
            let (a, x) = (scope.stage(a)?, scope.stage(x)?);
            let (a, x) = (a.as_slice(), x.as_slice());
            scope.update(y, |t| {
                Ok(crate::parallel::for_each_indexed(
                    strategy,
                    t.as_slice_mut(),
                    |i, v| *v += a[i] * x[i],
                )?)
            })
        }
        Coefficient::RealArray(a) => {
            check_same_shape(a, x)?;
            let scope = ComputeScope::enter(compute.resolve(a))?;
            let strategy = scope.strategy();
            let (a, x) = (scope.stage(a)?, scope.stage(x)?);
            let (a, x) = (a.as_slice(), x.as_slice());
            scope.update(y, |t| {
                Ok(crate::parallel::for_each_indexed(
                    strategy,
                    t.as_slice_mut(),
                    |i, v| *v += x[i].scale_real(a[i]),
                )?)
            })
        }
    }
}

/// `x := x + a`.
pub fn add<T: Scalar>(a: T, x: &mut Tensor<T>, compute: DeviceSelector) -> Result<(), TensorOpsError> {
    update_each(x, compute, |v| *v += a)
}

/// Rescales `x` so its largest magnitude equals `new_max` and returns the applied factor.
///
/// An all-zero array is left unchanged and the factor is one.
pub fn normalize<R: RealScalar>(
    x: &mut Tensor<R>,
    new_max: R,
    compute: DeviceSelector,
) -> Result<R, TensorOpsError> {
    let scope = ComputeScope::enter(compute.resolve(x))?;
    let mut factor = R::one();
    scope.update(x, |t| {
        if t.is_empty() {
            return Ok(());
        }
        let blas = HostBlas;
        let peak = t.as_slice()[blas.iamax(t.as_slice())?].magnitude();
        if peak.is_exact_zero() {
            return Ok(());
        }
        factor = new_max / peak;
        blas.scal(factor, t.as_slice_mut());
        Ok(())
    })?;
    log::debug!("normalize: max scaled to {:?} by factor {:?}", new_max, factor);
    Ok(factor)
}
