use num_traits::Float;

use crate::{
    element::{Element, Scalar},
    error::KernelError,
};

/// Conjugated dot product `sum(conj(x[i]) * y[i])`.
///
/// Example:
/// ```
/// use ndrecon_kernels::blas::dotc;
/// use num_complex::Complex;
///
/// let x = [Complex::new(0.0f32, 1.0)];
/// let y = [Complex::new(0.0f32, 1.0)];
/// assert_eq!(dotc(&x, &y).unwrap(), Complex::new(1.0, 0.0));
/// ```
pub fn dotc<T: Scalar>(x: &[T], y: &[T]) -> Result<T, KernelError> {
    if x.len() != y.len() {
        return Err(KernelError::LengthMismatch(x.len(), y.len()));
    }
    Ok(x.iter()
        .zip(y.iter())
        .fold(T::ZERO, |acc, (a, b)| acc + a.conj() * *b))
}

/// Sum of element magnitudes.
pub fn asum<T: Element>(x: &[T]) -> T::Real {
    x.iter()
        .fold(<T::Real as Element>::ZERO, |acc, v| acc + v.magnitude())
}

/// Euclidean norm of the whole slice.
///
/// Accumulates with a running scale so large magnitudes do not overflow.
pub fn nrm2<T: Element>(x: &[T]) -> T::Real {
    let zero = <T::Real as Element>::ZERO;
    let one = <T::Real as num_traits::One>::one();
    let mut scale = zero;
    let mut ssq = one;
    for v in x {
        let m = v.magnitude();
        if m == zero {
            continue;
        }
        if scale < m {
            let r = scale / m;
            ssq = one + ssq * r * r;
            scale = m;
        } else {
            let r = m / scale;
            ssq = ssq + r * r;
        }
    }
    scale * ssq.sqrt()
}

fn select_by_magnitude<T: Element>(
    x: &[T],
    name: &'static str,
    better: impl Fn(T::Real, T::Real) -> bool,
) -> Result<usize, KernelError> {
    let first = x.first().ok_or(KernelError::EmptyInput(name))?;
    let mut best = (0, first.magnitude());
    for (i, v) in x.iter().enumerate().skip(1) {
        let m = v.magnitude();
        if better(m, best.1) {
            best = (i, m);
        }
    }
    Ok(best.0)
}

/// Index of the first element with the largest magnitude.
pub fn iamax<T: Element>(x: &[T]) -> Result<usize, KernelError> {
    select_by_magnitude(x, "iamax", |m, best| m > best)
}

/// Index of the first element with the smallest magnitude.
pub fn iamin<T: Element>(x: &[T]) -> Result<usize, KernelError> {
    select_by_magnitude(x, "iamin", |m, best| m < best)
}

/// `y := a * x + y`.
pub fn axpy<T: Scalar>(a: T, x: &[T], y: &mut [T]) -> Result<(), KernelError> {
    if x.len() != y.len() {
        return Err(KernelError::LengthMismatch(x.len(), y.len()));
    }
    y.iter_mut().zip(x.iter()).for_each(|(yi, xi)| *yi += a * *xi);
    Ok(())
}

/// `x := a * x`.
pub fn scal<T: Scalar>(a: T, x: &mut [T]) {
    x.iter_mut().for_each(|v| *v *= a);
}

/// Linear-algebra service consumed by the operation layer.
pub trait LinearAlgebra<T: Scalar>: Send + Sync {
    /// Conjugated dot product.
    fn dotc(&self, x: &[T], y: &[T]) -> Result<T, KernelError>;
    /// Sum of magnitudes.
    fn asum(&self, x: &[T]) -> T::Real;
    /// Euclidean norm.
    fn nrm2(&self, x: &[T]) -> T::Real;
    /// Index of the largest magnitude.
    fn iamax(&self, x: &[T]) -> Result<usize, KernelError>;
    /// Index of the smallest magnitude.
    fn iamin(&self, x: &[T]) -> Result<usize, KernelError>;
    /// `y := a * x + y`.
    fn axpy(&self, a: T, x: &[T], y: &mut [T]) -> Result<(), KernelError>;
    /// `x := a * x`.
    fn scal(&self, a: T, x: &mut [T]);
}

/// Host implementation of [`LinearAlgebra`] built on the slice kernels in this module.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostBlas;

impl<T: Scalar> LinearAlgebra<T> for HostBlas {
    fn dotc(&self, x: &[T], y: &[T]) -> Result<T, KernelError> {
        dotc(x, y)
    }

    fn asum(&self, x: &[T]) -> T::Real {
        asum(x)
    }

    fn nrm2(&self, x: &[T]) -> T::Real {
        nrm2(x)
    }

    fn iamax(&self, x: &[T]) -> Result<usize, KernelError> {
        iamax(x)
    }

    fn iamin(&self, x: &[T]) -> Result<usize, KernelError> {
        iamin(x)
    }

    fn axpy(&self, a: T, x: &[T], y: &mut [T]) -> Result<(), KernelError> {
        axpy(a, x, y)
    }

    fn scal(&self, a: T, x: &mut [T]) {
        scal(a, x)
    }
}
