//! Current-device state and the scoped guard that switches it.
//!
//! The current device is tracked per host thread, the way an accelerator
//! runtime tracks it. A thread that never selected a device sees the
//! registry's default device.

use std::cell::Cell;

use crate::{allocator::TensorAllocatorError, device::Device, registry::registry};

/// Query and update the device that work is submitted to.
pub trait DeviceContext: Send + Sync {
    /// Returns the device currently active for the calling thread.
    fn current_device(&self) -> Device;

    /// Makes `device` the active device for the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`TensorAllocatorError::DeviceUnavailable`] for devices without a backend.
    fn set_current_device(&self, device: Device) -> Result<(), TensorAllocatorError>;
}

thread_local! {
    static CURRENT: Cell<Option<Device>> = const { Cell::new(None) };
}

/// Device context backed by a thread-local slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDeviceContext;

/// The context used by the operation layer.
pub static THREAD_CONTEXT: ThreadDeviceContext = ThreadDeviceContext;

impl DeviceContext for ThreadDeviceContext {
    fn current_device(&self) -> Device {
        CURRENT
            .with(Cell::get)
            .unwrap_or_else(|| registry().default_device())
    }

    fn set_current_device(&self, device: Device) -> Result<(), TensorAllocatorError> {
        if !registry().contains(device) {
            return Err(TensorAllocatorError::DeviceUnavailable(device));
        }
        CURRENT.with(|slot| slot.set(Some(device)));
        Ok(())
    }
}

/// Returns the calling thread's current device.
pub fn current_device() -> Device {
    THREAD_CONTEXT.current_device()
}

/// Sets the calling thread's current device.
pub fn set_current_device(device: Device) -> Result<(), TensorAllocatorError> {
    THREAD_CONTEXT.set_current_device(device)
}

/// Switches the current device for the lifetime of the guard.
///
/// The previous device is restored when the guard is dropped, on every exit
/// path including `?` returns and unwinding.
pub struct DeviceGuard<'a, C: DeviceContext + ?Sized> {
    ctx: &'a C,
    previous: Device,
    device: Device,
}

impl<'a, C: DeviceContext + ?Sized> DeviceGuard<'a, C> {
    /// Makes `device` current, remembering the device that was active before.
    pub fn enter(ctx: &'a C, device: Device) -> Result<Self, TensorAllocatorError> {
        let previous = ctx.current_device();
        if previous != device {
            ctx.set_current_device(device)?;
            log::trace!("device switch {} -> {}", previous, device);
        }
        Ok(Self {
            ctx,
            previous,
            device,
        })
    }

    /// The device made current by this guard.
    pub fn device(&self) -> Device {
        self.device
    }

    /// The device that will be restored on drop.
    pub fn previous(&self) -> Device {
        self.previous
    }
}

impl<C: DeviceContext + ?Sized> Drop for DeviceGuard<'_, C> {
    fn drop(&mut self) {
        if self.previous == self.device {
            return;
        }
        match self.ctx.set_current_device(self.previous) {
            Ok(()) => log::trace!("device restore {} -> {}", self.device, self.previous),
            Err(e) => log::warn!("failed to restore device {}: {}", self.previous, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingContext {
        current: Mutex<Device>,
        history: Mutex<Vec<Device>>,
    }

    impl RecordingContext {
        fn new(device: Device) -> Self {
            Self {
                current: Mutex::new(device),
                history: Mutex::new(Vec::new()),
            }
        }
    }

    impl DeviceContext for RecordingContext {
        fn current_device(&self) -> Device {
            *self.current.lock().unwrap()
        }

        fn set_current_device(&self, device: Device) -> Result<(), TensorAllocatorError> {
            if device == Device::accelerator(9) {
                return Err(TensorAllocatorError::DeviceUnavailable(device));
            }
            *self.current.lock().unwrap() = device;
            self.history.lock().unwrap().push(device);
            Ok(())
        }
    }

    #[test]
    fn test_guard_restores_previous() -> Result<(), TensorAllocatorError> {
        let ctx = RecordingContext::new(Device::accelerator(0));
        {
            let guard = DeviceGuard::enter(&ctx, Device::Cpu)?;
            assert_eq!(guard.previous(), Device::accelerator(0));
            assert_eq!(ctx.current_device(), Device::Cpu);
        }
        assert_eq!(ctx.current_device(), Device::accelerator(0));
        assert_eq!(
            *ctx.history.lock().unwrap(),
            vec![Device::Cpu, Device::accelerator(0)]
        );
        Ok(())
    }

    #[test]
    fn test_guard_same_device_is_noop() -> Result<(), TensorAllocatorError> {
        let ctx = RecordingContext::new(Device::Cpu);
        {
            let _guard = DeviceGuard::enter(&ctx, Device::Cpu)?;
        }
        assert!(ctx.history.lock().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn test_guard_enter_failure_keeps_device() {
        let ctx = RecordingContext::new(Device::Cpu);
        let res = DeviceGuard::enter(&ctx, Device::accelerator(9));
        assert!(res.is_err());
        assert_eq!(ctx.current_device(), Device::Cpu);
    }

    #[test]
    fn test_guard_restores_on_unwind() {
        let ctx = RecordingContext::new(Device::Cpu);
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = DeviceGuard::enter(&ctx, Device::accelerator(0)).unwrap();
            panic!("kernel failure");
        }));
        assert!(res.is_err());
        assert_eq!(ctx.current_device(), Device::Cpu);
    }

    #[test]
    fn test_thread_context_is_per_thread() -> Result<(), TensorAllocatorError> {
        set_current_device(Device::Cpu)?;
        let other = std::thread::spawn(current_device).join().unwrap();
        assert_eq!(other, registry().default_device());
        assert_eq!(current_device(), Device::Cpu);
        Ok(())
    }

    #[test]
    fn test_thread_context_rejects_unknown_device() {
        let res = set_current_device(Device::accelerator(1000));
        assert_eq!(
            res,
            Err(TensorAllocatorError::DeviceUnavailable(Device::accelerator(1000)))
        );
    }
}
