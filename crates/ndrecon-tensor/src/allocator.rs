use std::alloc;
use std::alloc::Layout;

use thiserror::Error;

use crate::device::Device;

/// An error type for tensor allocator and device memory operations.
#[derive(Debug, Error, PartialEq)]
pub enum TensorAllocatorError {
    /// The requested layout is invalid.
    #[error("Invalid tensor layout {0}")]
    LayoutError(core::alloc::LayoutError),

    /// The allocator returned a null pointer.
    #[error("Null pointer")]
    NullPointer,

    /// The device does not have enough free memory for the request.
    #[error("Out of memory on {device}: requested {requested} bytes, {available} bytes available")]
    OutOfMemory {
        /// The device the allocation was attempted on
        device: Device,
        /// Number of bytes requested
        requested: usize,
        /// Number of bytes still available on the device
        available: usize,
    },

    /// The device is not known to the registry.
    #[error("Device {0} is not available")]
    DeviceUnavailable(Device),

    /// A memory transfer between devices failed.
    #[error("Copy of {len} bytes from {src} to {dst} failed")]
    CopyFailed {
        /// Source device
        src: Device,
        /// Destination device
        dst: Device,
        /// Number of bytes
        len: usize,
    },

    /// The device reported an execution error while synchronizing.
    #[error("Device {device} failed: {reason}")]
    DeviceFault {
        /// The failing device
        device: Device,
        /// Description reported by the device runtime
        reason: String,
    },
}

impl TensorAllocatorError {
    /// Returns true if the error is recoverable by freeing memory.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. } | Self::NullPointer)
    }

    /// Returns true if the error was raised by the device runtime while running work.
    pub fn is_device_fault(&self) -> bool {
        matches!(self, Self::DeviceFault { .. } | Self::CopyFailed { .. })
    }
}

/// A trait for allocating and deallocating memory for tensors.
///
/// # Safety
///
/// The tensor allocator must be thread-safe.
pub trait TensorAllocator: Clone + Send + Sync {
    /// Allocates memory for a tensor with the given layout.
    fn alloc(&self, layout: Layout) -> Result<*mut u8, TensorAllocatorError>;

    /// Deallocates memory for a tensor with the given layout.
    fn dealloc(&self, ptr: *mut u8, layout: Layout);
}

/// A tensor allocator that uses the system allocator.
#[derive(Clone, Default)]
pub struct CpuAllocator;

impl TensorAllocator for CpuAllocator {
    /// Allocates memory for a tensor with the given layout.
    ///
    /// Zero-sized layouts return a dangling, well-aligned pointer that is never dereferenced.
    fn alloc(&self, layout: Layout) -> Result<*mut u8, TensorAllocatorError> {
        if layout.size() == 0 {
            return Ok(layout.align() as *mut u8);
        }
        let ptr = unsafe { alloc::alloc(layout) };
        if ptr.is_null() {
            Err(TensorAllocatorError::NullPointer)?
        }
        Ok(ptr)
    }

    /// Deallocates memory for a tensor with the given layout.
    ///
    /// # Safety
    ///
    /// The pointer must come from [`CpuAllocator::alloc`] with the same layout.
    #[allow(clippy::not_unsafe_ptr_arg_deref)]
    fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if !ptr.is_null() && layout.size() != 0 {
            unsafe { alloc::dealloc(ptr, layout) }
        }
    }
}
