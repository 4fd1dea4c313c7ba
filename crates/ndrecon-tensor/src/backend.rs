//! Backend abstraction for device operations.
//!
//! Every device the registry knows about is served by one [`Backend`]. The host
//! uses [`CpuBackend`]; accelerator ordinals are served by [`EmulatedBackend`],
//! a host-memory device with its own memory accounting and an optional
//! capacity limit.

use std::alloc::Layout;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    allocator::{CpuAllocator, TensorAllocator, TensorAllocatorError},
    device::Device,
};

/// Backend trait defining core device operations.
///
/// Implementations must be `Send + Sync` so a single backend can be shared by
/// every tensor resident on its device.
pub trait Backend: Send + Sync + 'static {
    /// Returns the device served by this backend.
    fn device(&self) -> Device;

    /// Allocates memory on the device.
    ///
    /// # Errors
    ///
    /// Returns [`TensorAllocatorError::OutOfMemory`] when the device cannot hold
    /// the request.
    fn alloc(&self, layout: Layout) -> Result<*mut u8, TensorAllocatorError>;

    /// Deallocates memory on the device.
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    /// - `ptr` was allocated by this backend
    /// - `ptr` is not used after deallocation
    /// - `layout` matches the original allocation
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout);

    /// Copies `len` bytes from `src`, resident on `src_device`, into `dst` on this device.
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    /// - `src` is valid for reads of `len` bytes
    /// - `dst` is valid for writes of `len` bytes
    /// - the two regions do not overlap
    unsafe fn copy(
        &self,
        src: *const u8,
        dst: *mut u8,
        len: usize,
        src_device: &Device,
    ) -> Result<(), TensorAllocatorError>;

    /// Blocks until all pending work on the device has completed.
    fn synchronize(&self) -> Result<(), TensorAllocatorError> {
        Ok(())
    }

    /// Number of bytes currently allocated on the device.
    fn memory_in_use(&self) -> usize {
        0
    }
}

/// CPU backend implementation.
#[derive(Clone, Default)]
pub struct CpuBackend {
    allocator: CpuAllocator,
}

impl CpuBackend {
    /// Creates a new CPU backend.
    pub fn new() -> Self {
        Self {
            allocator: CpuAllocator,
        }
    }
}

impl Backend for CpuBackend {
    fn device(&self) -> Device {
        Device::Cpu
    }

    fn alloc(&self, layout: Layout) -> Result<*mut u8, TensorAllocatorError> {
        self.allocator.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.allocator.dealloc(ptr, layout);
    }

    unsafe fn copy(
        &self,
        src: *const u8,
        dst: *mut u8,
        len: usize,
        _src_device: &Device,
    ) -> Result<(), TensorAllocatorError> {
        if len > 0 {
            std::ptr::copy_nonoverlapping(src, dst, len);
        }
        Ok(())
    }
}

/// Accelerator backend backed by host memory.
///
/// Tracks the bytes it hands out and refuses allocations beyond `memory_limit`.
pub struct EmulatedBackend {
    device_id: usize,
    allocator: CpuAllocator,
    in_use: AtomicUsize,
    memory_limit: Option<usize>,
}

impl EmulatedBackend {
    /// Creates the backend for accelerator `device_id` with an optional capacity in bytes.
    pub fn new(device_id: usize, memory_limit: Option<usize>) -> Self {
        Self {
            device_id,
            allocator: CpuAllocator,
            in_use: AtomicUsize::new(0),
            memory_limit,
        }
    }

    /// Returns the accelerator ordinal.
    pub fn device_id(&self) -> usize {
        self.device_id
    }

    fn reserve(&self, requested: usize) -> Result<(), TensorAllocatorError> {
        let Some(limit) = self.memory_limit else {
            self.in_use.fetch_add(requested, Ordering::AcqRel);
            return Ok(());
        };
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(requested).filter(|total| *total <= limit)
            })
            .map(|_| ())
            .map_err(|used| TensorAllocatorError::OutOfMemory {
                device: self.device(),
                requested,
                available: limit.saturating_sub(used),
            })
    }
}

impl Backend for EmulatedBackend {
    fn device(&self) -> Device {
        Device::accelerator(self.device_id)
    }

    fn alloc(&self, layout: Layout) -> Result<*mut u8, TensorAllocatorError> {
        self.reserve(layout.size())?;
        self.allocator.alloc(layout).inspect_err(|_| {
            self.in_use.fetch_sub(layout.size(), Ordering::AcqRel);
        })
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.allocator.dealloc(ptr, layout);
        self.in_use.fetch_sub(layout.size(), Ordering::AcqRel);
    }

    unsafe fn copy(
        &self,
        src: *const u8,
        dst: *mut u8,
        len: usize,
        src_device: &Device,
    ) -> Result<(), TensorAllocatorError> {
        if src.is_null() || dst.is_null() {
            return Err(TensorAllocatorError::CopyFailed {
                src: *src_device,
                dst: self.device(),
                len,
            });
        }
        if len > 0 {
            std::ptr::copy_nonoverlapping(src, dst, len);
        }
        Ok(())
    }

    fn memory_in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_backend_alloc_dealloc() -> Result<(), TensorAllocatorError> {
        let backend = CpuBackend::new();
        let layout = Layout::from_size_align(1024, 8).unwrap();

        let ptr = backend.alloc(layout)?;
        assert!(!ptr.is_null());

        unsafe {
            backend.dealloc(ptr, layout);
        }
        Ok(())
    }

    #[test]
    fn test_cpu_backend_copy() -> Result<(), TensorAllocatorError> {
        let backend = CpuBackend::new();
        let src = vec![1u8, 2, 3, 4, 5];
        let mut dst = vec![0u8; 5];

        unsafe {
            backend.copy(src.as_ptr(), dst.as_mut_ptr(), 5, &Device::Cpu)?;
        }

        assert_eq!(dst, src);
        Ok(())
    }

    #[test]
    fn test_emulated_backend_accounting() -> Result<(), TensorAllocatorError> {
        let backend = EmulatedBackend::new(2, None);
        assert_eq!(backend.device(), Device::accelerator(2));

        let layout = Layout::from_size_align(256, 8).unwrap();
        let ptr = backend.alloc(layout)?;
        assert_eq!(backend.memory_in_use(), 256);

        unsafe { backend.dealloc(ptr, layout) };
        assert_eq!(backend.memory_in_use(), 0);
        Ok(())
    }

    #[test]
    fn test_emulated_backend_copy_completes_eagerly() -> Result<(), TensorAllocatorError> {
        let backend = EmulatedBackend::new(0, None);
        let src = [7u8; 16];
        let mut dst = [0u8; 16];
        unsafe { backend.copy(src.as_ptr(), dst.as_mut_ptr(), 16, &Device::Cpu)? };
        assert_eq!(dst, src);
        backend.synchronize()?;
        assert_eq!(dst, src);
        Ok(())
    }

    #[test]
    fn test_emulated_backend_memory_limit() -> Result<(), TensorAllocatorError> {
        let backend = EmulatedBackend::new(0, Some(100));
        let small = Layout::from_size_align(64, 8).unwrap();
        let ptr = backend.alloc(small)?;

        let err = backend.alloc(small).unwrap_err();
        assert_eq!(
            err,
            TensorAllocatorError::OutOfMemory {
                device: Device::accelerator(0),
                requested: 64,
                available: 36,
            }
        );
        assert_eq!(backend.memory_in_use(), 64);

        unsafe { backend.dealloc(ptr, small) };
        Ok(())
    }

    #[test]
    fn test_backend_trait_object() {
        let backends: Vec<Box<dyn Backend>> = vec![
            Box::new(CpuBackend::new()),
            Box::new(EmulatedBackend::new(0, None)),
        ];

        for backend in backends {
            assert!(backend.synchronize().is_ok());
        }
    }
}
