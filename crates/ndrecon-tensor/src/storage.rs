use std::{alloc::Layout, ptr::NonNull, sync::Arc};

use crate::{
    allocator::TensorAllocatorError, backend::Backend, device::Device, registry::registry,
};

/// Owned, contiguous device buffer of `len` elements.
///
/// The buffer is allocated by the backend of the device it lives on and is
/// returned to the same backend when dropped. All backends in this build are
/// host-addressable, so the contents can be viewed as a slice directly.
pub struct TensorStorage<T> {
    /// The pointer to the buffer, never null.
    ptr: NonNull<T>,
    /// Number of elements.
    len: usize,
    /// The layout used for the allocation.
    layout: Layout,
    /// The backend that owns the memory.
    backend: Arc<dyn Backend>,
}

impl<T> std::fmt::Debug for TensorStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorStorage")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("device", &self.backend.device())
            .finish()
    }
}

impl<T: Copy> TensorStorage<T> {
    fn alloc(len: usize, backend: Arc<dyn Backend>) -> Result<Self, TensorAllocatorError> {
        let layout = Layout::array::<T>(len).map_err(TensorAllocatorError::LayoutError)?;
        let raw = backend.alloc(layout)?;
        let ptr = NonNull::new(raw as *mut T).ok_or(TensorAllocatorError::NullPointer)?;
        Ok(Self {
            ptr,
            len,
            layout,
            backend,
        })
    }

    /// Moves host data into a new buffer on `device`.
    pub fn from_vec(data: Vec<T>, device: Device) -> Result<Self, TensorAllocatorError> {
        let backend = registry().backend(device)?;
        let storage = Self::alloc(data.len(), backend)?;
        // SAFETY: both regions hold `len` elements of `T` and are distinct allocations.
        unsafe {
            storage.backend.copy(
                data.as_ptr() as *const u8,
                storage.ptr.as_ptr() as *mut u8,
                storage.layout.size(),
                &Device::Cpu,
            )?;
        }
        Ok(storage)
    }

    /// Allocates `len` copies of `value` on `device`.
    pub fn from_elem(len: usize, value: T, device: Device) -> Result<Self, TensorAllocatorError> {
        let backend = registry().backend(device)?;
        let storage = Self::alloc(len, backend)?;
        let ptr = storage.ptr.as_ptr();
        for i in 0..len {
            // SAFETY: `i < len` and the buffer holds `len` elements.
            unsafe { ptr.add(i).write(value) };
        }
        Ok(storage)
    }

    /// Copies the buffer to `device`, returning a new owned buffer.
    pub fn to_device(&self, device: Device) -> Result<Self, TensorAllocatorError> {
        let backend = registry().backend(device)?;
        let dst = Self::alloc(self.len, backend)?;
        // SAFETY: same element count, distinct allocations.
        unsafe {
            dst.backend.copy(
                self.ptr.as_ptr() as *const u8,
                dst.ptr.as_ptr() as *mut u8,
                self.layout.size(),
                &self.device(),
            )?;
        }
        if device != self.device() {
            log::debug!(
                "copied {} bytes {} -> {}",
                self.layout.size(),
                self.device(),
                device
            );
        }
        Ok(dst)
    }

    /// Deep copy on the same device.
    pub fn try_clone(&self) -> Result<Self, TensorAllocatorError> {
        self.to_device(self.device())
    }

    /// Overwrites this buffer with the contents of `src`, which may live on another device.
    pub fn copy_from(&mut self, src: &Self) -> Result<(), TensorAllocatorError> {
        if src.len != self.len {
            return Err(TensorAllocatorError::CopyFailed {
                src: src.device(),
                dst: self.device(),
                len: src.layout.size(),
            });
        }
        if std::ptr::eq(self.ptr.as_ptr(), src.ptr.as_ptr()) {
            return Ok(());
        }
        // SAFETY: equal lengths; `&mut self` and `&src` cannot alias the same storage.
        unsafe {
            self.backend.copy(
                src.ptr.as_ptr() as *const u8,
                self.ptr.as_ptr() as *mut u8,
                self.layout.size(),
                &src.device(),
            )
        }
    }

    /// Copies the buffer into a host vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

impl<T> TensorStorage<T> {
    /// The device that owns the buffer.
    #[inline]
    pub fn device(&self) -> Device {
        self.backend.device()
    }

    /// The backend that owns the buffer.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the allocation in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.layout.size()
    }

    /// Returns the pointer to the buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns the mutable pointer to the buffer.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Views the buffer as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the buffer is host-addressable and holds `len` initialized elements.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Views the buffer as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: see `as_slice`; `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> Drop for TensorStorage<T> {
    fn drop(&mut self) {
        // SAFETY: the pointer and layout come from `self.backend.alloc`.
        unsafe {
            self.backend
                .dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
        }
    }
}

// SAFETY: the storage owns its buffer exclusively; the backend is `Send + Sync`.
unsafe impl<T: Send> Send for TensorStorage<T> {}

// SAFETY: shared access only hands out `&[T]`.
unsafe impl<T: Sync> Sync for TensorStorage<T> {}
