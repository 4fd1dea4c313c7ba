use ndrecon_kernels::{ElementKind, KernelError};
use ndrecon_tensor::{TensorAllocatorError, TensorError};
use thiserror::Error;

use crate::parallel::ParallelError;

/// Failure classes reported at the operation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Incompatible operand shapes, bad axis index or bad geometry.
    ShapeMismatch,
    /// The element type does not support the operation.
    UnsupportedElementKind,
    /// Device or host memory exhausted.
    AllocationFailure,
    /// The device runtime reported an error.
    DeviceExecutionFailure,
}

/// An error type for array operations.
#[derive(Error, Debug, PartialEq)]
pub enum TensorOpsError {
    /// The dimension to perform the operation over is greater than the number of dimensions of the tensor.
    #[error("Dimension out of bounds. The dimension {0} is out of bounds ({1}).")]
    DimOutOfBounds(usize, usize),

    /// Shape mismatch
    #[error("Shape mismatch: {0:?} != {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Shapes are individually valid but the requested region does not fit.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The element type does not support the operation.
    #[error("Operation {operation} is not supported for {kind} elements")]
    UnsupportedElementKind {
        /// Name of the operation
        operation: &'static str,
        /// Element family of the operand
        kind: ElementKind,
    },

    /// The device runtime failed while running a kernel.
    #[error("Device execution failure: {0}")]
    DeviceExecutionFailure(String),

    /// Tensor error
    #[error("Error with the tensor: {0}")]
    TensorError(#[from] TensorError),

    /// Kernel error
    #[error(transparent)]
    KernelError(#[from] KernelError),

    /// Worker pool error
    #[error(transparent)]
    ParallelError(#[from] ParallelError),
}

impl From<TensorAllocatorError> for TensorOpsError {
    fn from(e: TensorAllocatorError) -> Self {
        Self::TensorError(TensorError::StorageError(e))
    }
}

impl TensorOpsError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DimOutOfBounds(..) | Self::ShapeMismatch(..) | Self::InvalidGeometry(_) => {
                ErrorKind::ShapeMismatch
            }
            Self::UnsupportedElementKind { .. } => ErrorKind::UnsupportedElementKind,
            Self::DeviceExecutionFailure(_) => ErrorKind::DeviceExecutionFailure,
            Self::TensorError(e) => match e {
                TensorError::StorageError(s) if s.is_out_of_memory() => {
                    ErrorKind::AllocationFailure
                }
                TensorError::StorageError(TensorAllocatorError::LayoutError(_)) => {
                    ErrorKind::AllocationFailure
                }
                TensorError::StorageError(_) | TensorError::UnsupportedOperation { .. } => {
                    ErrorKind::DeviceExecutionFailure
                }
                TensorError::InvalidShape { .. }
                | TensorError::IndexOutOfBounds { .. }
                | TensorError::DimensionMismatch { .. } => ErrorKind::ShapeMismatch,
            },
            Self::KernelError(_) => ErrorKind::ShapeMismatch,
            Self::ParallelError(e) => match e {
                ParallelError::SizeMismatch => ErrorKind::ShapeMismatch,
                _ => ErrorKind::DeviceExecutionFailure,
            },
        }
    }

    pub(crate) fn unsupported<T: ndrecon_kernels::Element>(operation: &'static str) -> Self {
        Self::UnsupportedElementKind {
            operation,
            kind: T::KIND,
        }
    }
}
