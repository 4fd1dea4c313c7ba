//! Process-wide table of device backends.

use std::sync::{Arc, OnceLock};

use crate::{
    allocator::TensorAllocatorError,
    backend::{Backend, CpuBackend, EmulatedBackend},
    config::RuntimeConfig,
    device::Device,
    tensor::TensorError,
};

static REGISTRY: OnceLock<DeviceRegistry> = OnceLock::new();

/// Owns one backend per device and the runtime configuration they were built from.
pub struct DeviceRegistry {
    config: RuntimeConfig,
    cpu: Arc<dyn Backend>,
    accelerators: Vec<Arc<dyn Backend>>,
}

impl DeviceRegistry {
    /// Builds the backends described by `config`.
    pub fn new(config: RuntimeConfig) -> Self {
        let accelerators = (0..config.accelerators)
            .map(|id| {
                Arc::new(EmulatedBackend::new(id, config.device_memory_limit)) as Arc<dyn Backend>
            })
            .collect();
        log::debug!(
            "device registry: {} accelerator(s), memory limit {:?}, strategy {:?}, mode {:?}",
            config.accelerators,
            config.device_memory_limit,
            config.strategy,
            config.mode
        );
        Self {
            config,
            cpu: Arc::new(CpuBackend::new()),
            accelerators,
        }
    }

    /// Returns the backend serving `device`.
    pub fn backend(&self, device: Device) -> Result<Arc<dyn Backend>, TensorAllocatorError> {
        match device {
            Device::Cpu => Ok(self.cpu.clone()),
            Device::Accelerator { device_id } => self
                .accelerators
                .get(device_id)
                .cloned()
                .ok_or(TensorAllocatorError::DeviceUnavailable(device)),
        }
    }

    /// The device a thread starts on: accelerator 0 when present, the host otherwise.
    pub fn default_device(&self) -> Device {
        if self.accelerators.is_empty() {
            Device::Cpu
        } else {
            Device::accelerator(0)
        }
    }

    /// All devices known to the registry, host first.
    pub fn devices(&self) -> Vec<Device> {
        std::iter::once(Device::Cpu)
            .chain((0..self.accelerators.len()).map(Device::accelerator))
            .collect()
    }

    /// Returns true if `device` has a backend.
    pub fn contains(&self, device: Device) -> bool {
        match device {
            Device::Cpu => true,
            Device::Accelerator { device_id } => device_id < self.accelerators.len(),
        }
    }

    /// The configuration the registry was built with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

/// Returns the process registry, building it from defaults on first use.
pub fn registry() -> &'static DeviceRegistry {
    REGISTRY.get_or_init(|| DeviceRegistry::new(RuntimeConfig::default()))
}

/// Installs `config` as the process configuration.
///
/// # Errors
///
/// Fails if the registry was already built, either by an earlier `install`
/// or by any tensor allocation that happened before.
pub fn install(config: RuntimeConfig) -> Result<&'static DeviceRegistry, TensorError> {
    REGISTRY.set(DeviceRegistry::new(config)).map_err(|_| {
        TensorError::unsupported_operation("install", "device registry is already initialized")
    })?;
    Ok(registry())
}

/// Shorthand for `registry().backend(device)`.
pub fn backend(device: Device) -> Result<Arc<dyn Backend>, TensorAllocatorError> {
    registry().backend(device)
}
