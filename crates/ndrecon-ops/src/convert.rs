//! Value-returning element-wise conversions between element kinds.

use ndrecon_kernels::{Element, Scalar};
use ndrecon_tensor::Tensor;

use crate::{elementwise::map_new, error::TensorOpsError, placement::Placement};

/// Element-wise magnitude `|x|`.
///
/// # Example
///
/// ```
/// use ndrecon_ops::{convert::c_abs, Placement};
/// use ndrecon_tensor::{Device, Tensor};
/// use num_complex::Complex;
///
/// let x = Tensor::from_shape_vec(&[2], vec![Complex::new(3.0f32, 4.0), Complex::new(0.0, 0.0)], Device::Cpu).unwrap();
/// let m = c_abs(&x, Placement::ARRAY).unwrap();
/// assert_eq!(m.as_slice(), &[5.0, 0.0]);
/// ```
pub fn c_abs<T: Scalar>(x: &Tensor<T>, placement: Placement) -> Result<Tensor<T::Real>, TensorOpsError> {
    map_new(x, placement, <T::Real as Element>::ZERO, |v| v.magnitude())
}

/// Element-wise squared magnitude `|x|^2`.
pub fn c_norm<T: Scalar>(x: &Tensor<T>, placement: Placement) -> Result<Tensor<T::Real>, TensorOpsError> {
    map_new(x, placement, <T::Real as Element>::ZERO, |v| v.norm_squared())
}

/// Embeds a real array into the scalar type `C` (zero imaginary part).
pub fn real_to_complex<C: Scalar>(
    x: &Tensor<C::Real>,
    placement: Placement,
) -> Result<Tensor<C>, TensorOpsError> {
    map_new(x, placement, C::ZERO, |v| C::from_real(*v))
}

/// Real part of every element.
pub fn complex_to_real<T: Scalar>(
    x: &Tensor<T>,
    placement: Placement,
) -> Result<Tensor<T::Real>, TensorOpsError> {
    map_new(x, placement, <T::Real as Element>::ZERO, |v| v.re())
}
