#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `ndrecon-tensor` owns the memory side of the array layer: which devices
//! exist, how buffers are allocated and moved between them, and which device
//! the calling thread currently submits work to.
//!
//! - **Device**: host or accelerator ordinal
//! - **Backend**: per-device allocation, transfer and synchronization
//! - **DeviceRegistry**: process-wide table of backends built from a [`RuntimeConfig`]
//! - **DeviceContext** / **DeviceGuard**: current-device query and scoped switching
//! - **Tensor**: owned, contiguous, row-major array with a runtime rank
//!
//! # Quick Start
//!
//! ```rust
//! use ndrecon_tensor::{Device, Tensor};
//!
//! let host = Tensor::from_shape_vec(&[2, 3], vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], Device::Cpu).unwrap();
//! let accel = host.to_device(Device::accelerator(0)).unwrap();
//! assert_eq!(accel.get(&[1, 2]), Some(&6.0));
//! ```

/// Allocator module containing host memory management.
pub mod allocator;

/// Backend module containing per-device operations.
pub mod backend;

/// Runtime configuration types.
pub mod config;

/// Current-device tracking and scoped device switching.
pub mod context;

/// Device module containing the device identifier.
pub mod device;

/// Process-wide device registry.
pub mod registry;

/// Storage module containing the owned device buffer.
pub mod storage;

/// Tensor module containing the array type and its error type.
pub mod tensor;

pub use crate::allocator::{CpuAllocator, TensorAllocator, TensorAllocatorError};
pub use crate::backend::{Backend, CpuBackend, EmulatedBackend};
pub use crate::config::{ExecutionMode, ExecutionStrategy, RuntimeConfig};
pub use crate::context::{
    current_device, set_current_device, DeviceContext, DeviceGuard, ThreadDeviceContext,
    THREAD_CONTEXT,
};
pub use crate::device::Device;
pub use crate::registry::{install, registry, DeviceRegistry};
pub use crate::storage::TensorStorage;
pub use crate::tensor::{Tensor, TensorError};
