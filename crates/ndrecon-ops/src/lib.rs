#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! Every operation takes its device placement explicitly. Value-returning
//! operations take a [`Placement`] naming where the result is allocated and
//! where the kernel runs; in-place operations take a [`DeviceSelector`] for the
//! compute device only. Inputs living elsewhere are staged to the compute device
//! and the caller's current device is restored on every exit path.
//!
//! ```rust
//! use ndrecon_ops::{elementwise::scal, reduce::rss, DeviceSelector, Placement};
//! use ndrecon_tensor::{Device, Tensor};
//!
//! let mut x = Tensor::from_shape_vec(&[2, 2], vec![3.0f32, 4.0, 0.0, 1.0], Device::Cpu).unwrap();
//! scal(2.0, &mut x, DeviceSelector::ArrayDevice).unwrap();
//! let r = rss(&x, 1, Placement::ARRAY).unwrap();
//! assert_eq!(r.as_slice(), &[10.0, 2.0]);
//! ```

/// Whole-array inner products, norms and magnitude searches.
pub mod blas;

/// Conversions between real and complex arrays.
pub mod convert;

/// In-place element-wise arithmetic.
pub mod elementwise;

/// Error types for array operations.
///
/// Defines [`TensorOpsError`] and its coarse classification [`ErrorKind`].
pub mod error;

/// Kernel scheduling over slices.
pub mod parallel;

/// Allocation and compute device selection.
pub mod placement;

/// Axis reductions, expansion and correlation.
pub mod reduce;

/// Crop, pad, border masking and mirroring over spatial axes.
pub mod region;

/// Factor-two down- and upsampling.
pub mod resample;

/// Soft-thresholding operators.
pub mod shrink;

/// Logging adapters for success-flag callers.
pub mod soft;

/// Spatial index arithmetic.
pub mod spatial;

pub use crate::elementwise::{Coefficient, Multiplier};
pub use crate::error::{ErrorKind, TensorOpsError};
pub use crate::placement::{ComputeScope, DeviceSelector, Placement, ResolvedPlacement};
pub use crate::soft::SoftResult;
pub use crate::spatial::SpatialShape;
