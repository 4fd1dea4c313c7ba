#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use ndrecon_tensor as tensor;

#[doc(inline)]
pub use ndrecon_kernels as kernels;

#[doc(inline)]
pub use ndrecon_ops as ops;
