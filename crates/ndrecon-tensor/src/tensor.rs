use thiserror::Error;

use crate::{allocator::TensorAllocatorError, device::Device, storage::TensorStorage};

/// An error type for tensor operations.
#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    /// Tensor shape does not match the provided data.
    ///
    /// The product of the shape must equal the number of elements exactly.
    #[error("Shape mismatch: expected {expected} elements for shape, but got {actual} elements in data")]
    InvalidShape {
        /// Expected number of elements based on shape
        expected: usize,
        /// Actual number of elements in the data
        actual: usize,
    },

    /// Index exceeds tensor bounds.
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index that was attempted
        index: usize,
        /// The size of the dimension being indexed
        size: usize,
    },

    /// Underlying storage operation failed.
    ///
    /// Wraps allocation, transfer and device errors. See [`TensorAllocatorError`].
    #[error("Storage error: {0}")]
    StorageError(#[from] TensorAllocatorError),

    /// Tensor dimensions incompatible for the requested operation.
    #[error("Dimension mismatch: {message}. Expected shape: {expected}, got: {actual}")]
    DimensionMismatch {
        /// Human-readable description of the mismatch
        message: String,
        /// Expected shape description
        expected: String,
        /// Actual shape description
        actual: String,
    },

    /// Operation not supported for this tensor configuration.
    #[error("Unsupported operation: {operation} - {reason}")]
    UnsupportedOperation {
        /// Name of the operation that failed
        operation: String,
        /// Reason why the operation is not supported
        reason: String,
    },
}

impl TensorError {
    /// Creates an InvalidShape error.
    pub fn invalid_shape(expected: usize, actual: usize) -> Self {
        Self::InvalidShape { expected, actual }
    }

    /// Creates an IndexOutOfBounds error.
    pub fn index_out_of_bounds(index: usize, size: usize) -> Self {
        Self::IndexOutOfBounds { index, size }
    }

    /// Creates a DimensionMismatch error with formatted shapes.
    pub fn dimension_mismatch(
        message: impl Into<String>,
        expected: &[usize],
        actual: &[usize],
    ) -> Self {
        Self::DimensionMismatch {
            message: message.into(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }

    /// Creates an UnsupportedOperation error.
    pub fn unsupported_operation(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error is recoverable by freeing memory.
    pub fn is_out_of_memory(&self) -> bool {
        match self {
            Self::StorageError(e) => e.is_out_of_memory(),
            _ => false,
        }
    }
}

/// Computes the strides for a row-major (C-contiguous) layout.
///
/// ```rust
/// use ndrecon_tensor::tensor::get_strides_from_shape;
///
/// assert_eq!(get_strides_from_shape(&[2, 3, 4]), vec![12, 4, 1]);
/// ```
pub fn get_strides_from_shape(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// Owned, contiguous, row-major N-dimensional array resident on one device.
///
/// The rank is a runtime value: reductions remove axes and `expand` adds one.
/// The last axis varies fastest in memory.
///
/// # Example
///
/// ```
/// use ndrecon_tensor::{Device, Tensor};
///
/// let t = Tensor::from_shape_vec(&[2, 2], vec![1.0f32, 2.0, 3.0, 4.0], Device::Cpu).unwrap();
/// assert_eq!(t.get(&[1, 0]), Some(&3.0));
/// assert_eq!(t.numel(), 4);
/// ```
pub struct Tensor<T> {
    /// The storage of the tensor.
    pub storage: TensorStorage<T>,
    /// The shape of the tensor.
    pub shape: Vec<usize>,
    /// The strides of the tensor data in memory.
    pub strides: Vec<usize>,
}

impl<T> std::fmt::Debug for Tensor<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("device", &self.device())
            .field("data", &self.as_slice())
            .finish()
    }
}

impl<T: Copy> Tensor<T> {
    fn from_storage(shape: &[usize], storage: TensorStorage<T>) -> Self {
        Self {
            storage,
            shape: shape.to_vec(),
            strides: get_strides_from_shape(shape),
        }
    }

    /// Creates a tensor on `device` from host data.
    ///
    /// # Errors
    ///
    /// Fails if `data.len()` differs from the product of `shape` or the device cannot allocate.
    pub fn from_shape_vec(shape: &[usize], data: Vec<T>, device: Device) -> Result<Self, TensorError> {
        let numel = shape.iter().product::<usize>();
        if numel != data.len() {
            return Err(TensorError::invalid_shape(numel, data.len()));
        }
        let storage = TensorStorage::from_vec(data, device)?;
        Ok(Self::from_storage(shape, storage))
    }

    /// Creates a tensor on `device` from a host slice.
    pub fn from_shape_slice(shape: &[usize], data: &[T], device: Device) -> Result<Self, TensorError> {
        Self::from_shape_vec(shape, data.to_vec(), device)
    }

    /// Creates a tensor on `device` filled with `value`.
    pub fn from_shape_val(shape: &[usize], value: T, device: Device) -> Result<Self, TensorError> {
        let numel = shape.iter().product::<usize>();
        let storage = TensorStorage::from_elem(numel, value, device)?;
        Ok(Self::from_storage(shape, storage))
    }

    /// Creates a tensor on `device` whose elements are `f(index)`.
    ///
    /// ```
    /// use ndrecon_tensor::{Device, Tensor};
    ///
    /// let eye = Tensor::from_shape_fn(&[2, 2], Device::Cpu, |idx| {
    ///     if idx[0] == idx[1] { 1u8 } else { 0 }
    /// }).unwrap();
    /// assert_eq!(eye.as_slice(), &[1, 0, 0, 1]);
    /// ```
    pub fn from_shape_fn<F>(shape: &[usize], device: Device, f: F) -> Result<Self, TensorError>
    where
        F: Fn(&[usize]) -> T,
    {
        let strides = get_strides_from_shape(shape);
        let numel = shape.iter().product::<usize>();
        let mut index = vec![0; shape.len()];
        let data = (0..numel)
            .map(|offset| {
                let mut rem = offset;
                for (idx, stride) in index.iter_mut().zip(&strides) {
                    *idx = rem / stride;
                    rem %= stride;
                }
                f(&index)
            })
            .collect();
        Self::from_shape_vec(shape, data, device)
    }

    /// Creates a zero-filled tensor on `device`.
    pub fn zeros(shape: &[usize], device: Device) -> Result<Self, TensorError>
    where
        T: num_traits::Zero,
    {
        Self::from_shape_val(shape, T::zero(), device)
    }

    /// Deep copy on the same device.
    pub fn try_clone(&self) -> Result<Self, TensorError> {
        Ok(Self {
            storage: self.storage.try_clone()?,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
        })
    }

    /// Copies the tensor to `device`.
    pub fn to_device(&self, device: Device) -> Result<Self, TensorError> {
        Ok(Self {
            storage: self.storage.to_device(device)?,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
        })
    }

    /// Overwrites this tensor with `src`, which must have the same shape.
    pub fn copy_from(&mut self, src: &Tensor<T>) -> Result<(), TensorError> {
        if self.shape != src.shape {
            return Err(TensorError::dimension_mismatch(
                "copy requires identical shapes",
                &self.shape,
                &src.shape,
            ));
        }
        self.storage.copy_from(&src.storage)?;
        Ok(())
    }

    /// Reinterprets the tensor with a new shape holding the same number of elements.
    pub fn reshape(self, shape: &[usize]) -> Result<Self, TensorError> {
        let numel = shape.iter().product::<usize>();
        if numel != self.numel() {
            return Err(TensorError::DimensionMismatch {
                message: "Reshape operation requires same number of elements".to_string(),
                expected: format!("{:?} ({} elements)", shape, numel),
                actual: format!("{:?} ({} elements)", self.shape, self.numel()),
            });
        }
        Ok(Self {
            storage: self.storage,
            shape: shape.to_vec(),
            strides: get_strides_from_shape(shape),
        })
    }

    /// Applies `f` to each element, producing a new tensor on the same device.
    pub fn map<U: Copy, F>(&self, f: F) -> Result<Tensor<U>, TensorError>
    where
        F: Fn(&T) -> U,
    {
        let data = self.as_slice().iter().map(f).collect();
        Tensor::from_shape_vec(&self.shape, data, self.device())
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.as_slice_mut().fill(value);
    }

    /// Copies the contents into a host vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.storage.to_vec()
    }
}

impl<T> Tensor<T> {
    /// The device the tensor lives on.
    #[inline]
    pub fn device(&self) -> Device {
        self.storage.device()
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    #[inline]
    pub fn numel(&self) -> usize {
        self.storage.len()
    }

    /// Returns true if the tensor holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Returns the data as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Returns the data as a mutable slice.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }

    /// Returns the pointer to the data.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Get the offset of the element at the given index.
    pub fn get_iter_offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for ((&idx, &dim_size), &stride) in index.iter().zip(&self.shape).zip(&self.strides) {
            if idx >= dim_size {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// Get the index of the element at the given offset.
    ///
    /// # Errors
    ///
    /// If the offset is out of bounds (>= numel), an error is returned.
    pub fn get_index(&self, offset: usize) -> Result<Vec<usize>, TensorError> {
        let numel = self.numel();
        if offset >= numel {
            return Err(TensorError::index_out_of_bounds(offset, numel));
        }
        let mut rem = offset;
        Ok(self
            .strides
            .iter()
            .map(|s| {
                let idx = rem / s;
                rem %= s;
                idx
            })
            .collect())
    }

    /// Get the element at the given index, checking bounds.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        self.get_iter_offset(index)
            .and_then(|i| self.as_slice().get(i))
    }
}
