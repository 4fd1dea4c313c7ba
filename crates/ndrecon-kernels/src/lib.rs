#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Linear-algebra kernels over slices.
pub mod blas;

/// Element type abstraction: real, complex and vector families.
pub mod element;

/// Error types for the kernels module.
pub mod error;

/// Fixed-size vector element type.
pub mod vector;

pub use crate::blas::{HostBlas, LinearAlgebra};
pub use crate::element::{ComponentAbs, Element, ElementKind, RealScalar, Reciprocal, Scalar};
pub use crate::error::KernelError;
pub use crate::vector::VectorTd;
