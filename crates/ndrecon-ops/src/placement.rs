//! Device placement: where results are allocated and where kernels run.
//!
//! Both sides of a [`Placement`] are resolved to concrete devices before the
//! compute device is made current, so `Current` always refers to the caller's
//! device and never to one switched in by this layer.

use std::ops::Deref;
use std::sync::Arc;

use ndrecon_tensor::{
    current_device, registry, Backend, Device, DeviceGuard, ExecutionMode, ExecutionStrategy,
    Tensor, ThreadDeviceContext, THREAD_CONTEXT,
};

use crate::error::TensorOpsError;

/// Selects a device for one side of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceSelector {
    /// The calling thread's current device.
    #[default]
    Current,
    /// The device holding the operation's first array argument.
    ArrayDevice,
}

impl DeviceSelector {
    /// Resolves the selector against `array`.
    pub fn resolve<T>(self, array: &Tensor<T>) -> Device {
        match self {
            DeviceSelector::Current => current_device(),
            DeviceSelector::ArrayDevice => array.device(),
        }
    }
}

/// Allocation and compute device selection for value-returning operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    /// Where the result buffer is allocated.
    pub alloc: DeviceSelector,
    /// Where the kernel runs.
    pub compute: DeviceSelector,
}

impl Placement {
    /// Allocate and compute on the current device.
    pub const CURRENT: Placement = Placement {
        alloc: DeviceSelector::Current,
        compute: DeviceSelector::Current,
    };

    /// Allocate and compute on the first input's device.
    pub const ARRAY: Placement = Placement {
        alloc: DeviceSelector::ArrayDevice,
        compute: DeviceSelector::ArrayDevice,
    };

    /// Creates a placement from its two selectors.
    pub fn new(alloc: DeviceSelector, compute: DeviceSelector) -> Self {
        Self { alloc, compute }
    }

    /// Resolves both selectors against the first input.
    pub fn resolve<T>(&self, first: &Tensor<T>) -> ResolvedPlacement {
        let resolved = ResolvedPlacement {
            alloc: self.alloc.resolve(first),
            compute: self.compute.resolve(first),
        };
        log::trace!(
            "placement {:?} resolved to alloc={} compute={} (input on {})",
            self,
            resolved.alloc,
            resolved.compute,
            first.device()
        );
        resolved
    }
}

/// Concrete devices for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPlacement {
    /// Device of the result buffer.
    pub alloc: Device,
    /// Device the kernel runs on.
    pub compute: Device,
}

/// An input as seen from the compute device.
pub enum Staged<'a, T> {
    /// Already resident on the compute device.
    Resident(&'a Tensor<T>),
    /// Copied to the compute device for this call.
    Copied(Tensor<T>),
}

impl<T> Deref for Staged<'_, T> {
    type Target = Tensor<T>;

    fn deref(&self) -> &Tensor<T> {
        match self {
            Staged::Resident(t) => t,
            Staged::Copied(t) => t,
        }
    }
}

/// The compute device made current for the duration of one operation.
///
/// Dropping the scope restores the caller's device.
pub struct ComputeScope {
    _guard: DeviceGuard<'static, ThreadDeviceContext>,
    device: Device,
    backend: Arc<dyn Backend>,
    strategy: ExecutionStrategy,
    mode: ExecutionMode,
}

impl ComputeScope {
    /// Makes `device` current.
    pub fn enter(device: Device) -> Result<Self, TensorOpsError> {
        let backend = registry().backend(device)?;
        let guard = DeviceGuard::enter(&THREAD_CONTEXT, device)?;
        let config = registry().config();
        Ok(Self {
            _guard: guard,
            device,
            backend,
            strategy: config.strategy,
            mode: config.mode,
        })
    }

    /// The compute device.
    pub fn device(&self) -> Device {
        self.device
    }

    /// The kernel scheduling strategy.
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Makes `x` addressable from the compute device, copying it if needed.
    pub fn stage<'a, T: Copy>(&self, x: &'a Tensor<T>) -> Result<Staged<'a, T>, TensorOpsError> {
        if x.device() == self.device {
            return Ok(Staged::Resident(x));
        }
        log::debug!(
            "staging {:?} array from {} to {}",
            x.shape,
            x.device(),
            self.device
        );
        Ok(Staged::Copied(x.to_device(self.device)?))
    }

    /// Allocates a result buffer on the compute device.
    pub fn alloc<T: Copy>(&self, shape: &[usize], value: T) -> Result<Tensor<T>, TensorOpsError> {
        Ok(Tensor::from_shape_val(shape, value, self.device)?)
    }

    /// Waits for the kernel when running in blocking mode.
    pub fn sync(&self) -> Result<(), TensorOpsError> {
        if self.mode == ExecutionMode::Blocking {
            self.synchronize()?;
        }
        Ok(())
    }

    /// Waits for all submitted work regardless of the execution mode.
    pub fn synchronize(&self) -> Result<(), TensorOpsError> {
        Ok(self.backend.synchronize()?)
    }

    /// Completes a value-returning operation, moving the result to `alloc` if needed.
    pub fn finish<T: Copy>(&self, out: Tensor<T>, alloc: Device) -> Result<Tensor<T>, TensorOpsError> {
        if out.device() == alloc {
            self.sync()?;
            return Ok(out);
        }
        self.synchronize()?;
        log::debug!("moving result {:?} from {} to {}", out.shape, self.device, alloc);
        Ok(out.to_device(alloc)?)
    }

    /// Runs an in-place kernel on `x` from the compute device.
    ///
    /// When `x` lives elsewhere the kernel mutates a staged copy, which is
    /// written back only after the kernel succeeded.
    pub fn update<T, F>(&self, x: &mut Tensor<T>, op: F) -> Result<(), TensorOpsError>
    where
        T: Copy,
        F: FnOnce(&mut Tensor<T>) -> Result<(), TensorOpsError>,
    {
        if x.device() == self.device {
            op(x)?;
            return self.sync();
        }
        log::debug!(
            "in-place on {:?} array from {} via {}",
            x.shape,
            x.device(),
            self.device
        );
        let mut staged = x.to_device(self.device)?;
        op(&mut staged)?;
        self.synchronize()?;
        x.copy_from(&staged)?;
        Ok(())
    }
}
