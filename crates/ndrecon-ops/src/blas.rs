//! Whole-array scalar reductions delegated to the linear-algebra service.
//!
//! Results are returned by value, so the compute device is always
//! synchronized before returning.

use ndrecon_kernels::{HostBlas, LinearAlgebra, Scalar};
use ndrecon_tensor::Tensor;

use crate::{
    elementwise::check_same_shape,
    error::TensorOpsError,
    placement::{ComputeScope, DeviceSelector},
};

fn with_staged<T, R, F>(x: &Tensor<T>, compute: DeviceSelector, f: F) -> Result<R, TensorOpsError>
where
    T: Scalar,
    F: FnOnce(&[T]) -> Result<R, TensorOpsError>,
{
    let scope = ComputeScope::enter(compute.resolve(x))?;
    let x = scope.stage(x)?;
    let res = f(x.as_slice())?;
    scope.synchronize()?;
    Ok(res)
}

/// Inner product `sum(conj(x[i]) * y[i])`.
pub fn dot<T: Scalar>(x: &Tensor<T>, y: &Tensor<T>, compute: DeviceSelector) -> Result<T, TensorOpsError> {
    check_same_shape(x, y)?;
    let scope = ComputeScope::enter(compute.resolve(x))?;
    let (x, y) = (scope.stage(x)?, scope.stage(y)?);
    let res = HostBlas.dotc(x.as_slice(), y.as_slice())?;
    scope.synchronize()?;
    Ok(res)
}

/// Sum of element magnitudes.
pub fn asum<T: Scalar>(x: &Tensor<T>, compute: DeviceSelector) -> Result<T::Real, TensorOpsError> {
    with_staged(x, compute, |x| Ok(HostBlas.asum(x)))
}

/// Euclidean norm of the whole array.
pub fn nrm2<T: Scalar>(x: &Tensor<T>, compute: DeviceSelector) -> Result<T::Real, TensorOpsError> {
    with_staged(x, compute, |x| Ok(HostBlas.nrm2(x)))
}

/// The element of largest magnitude; the first one on ties.
///
/// # Errors
///
/// Fails on an empty array.
pub fn amax<T: Scalar>(x: &Tensor<T>, compute: DeviceSelector) -> Result<T, TensorOpsError> {
    with_staged(x, compute, |x| Ok(x[HostBlas.iamax(x)?]))
}

/// The element of smallest magnitude; the first one on ties.
///
/// # Errors
///
/// Fails on an empty array.
pub fn amin<T: Scalar>(x: &Tensor<T>, compute: DeviceSelector) -> Result<T, TensorOpsError> {
    with_staged(x, compute, |x| Ok(x[HostBlas.iamin(x)?]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndrecon_kernels::KernelError;
    use ndrecon_tensor::Device;
    use num_complex::Complex;

    const COMPUTE: DeviceSelector = DeviceSelector::ArrayDevice;

    #[test]
    fn test_dot_conjugates_first() -> Result<(), TensorOpsError> {
        let x = Tensor::from_shape_val(&[2], Complex::new(0.0f32, 1.0), Device::Cpu)?;
        let y = Tensor::from_shape_val(&[2], Complex::new(0.0f32, 1.0), Device::accelerator(0))?;
        assert_eq!(dot(&x, &y, COMPUTE)?, Complex::new(2.0, 0.0));
        Ok(())
    }

    #[test]
    fn test_dot_shape_mismatch() -> Result<(), TensorOpsError> {
        let x = Tensor::from_shape_val(&[2, 1], 1.0f64, Device::Cpu)?;
        let y = Tensor::from_shape_val(&[2], 1.0f64, Device::Cpu)?;
        assert_eq!(
            dot(&x, &y, COMPUTE),
            Err(TensorOpsError::ShapeMismatch(vec![2, 1], vec![2]))
        );
        Ok(())
    }

    #[test]
    fn test_asum_nrm2() -> Result<(), TensorOpsError> {
        let x = Tensor::from_shape_vec(&[3], vec![3.0f64, -4.0, 0.0], Device::Cpu)?;
        assert_relative_eq!(asum(&x, COMPUTE)?, 7.0);
        assert_relative_eq!(nrm2(&x, COMPUTE)?, 5.0);
        Ok(())
    }

    #[test]
    fn test_amax_amin() -> Result<(), TensorOpsError> {
        let x = Tensor::from_shape_vec(&[4], vec![1.0f32, -7.0, 7.0, -0.5], Device::Cpu)?;
        assert_eq!(amax(&x, COMPUTE)?, -7.0);
        assert_eq!(amin(&x, COMPUTE)?, -0.5);
        Ok(())
    }

    #[test]
    fn test_amax_empty() -> Result<(), TensorOpsError> {
        let x = Tensor::<f32>::from_shape_vec(&[0], vec![], Device::Cpu)?;
        assert_eq!(
            amax(&x, COMPUTE),
            Err(TensorOpsError::KernelError(KernelError::EmptyInput("iamax")))
        );
        Ok(())
    }
}
