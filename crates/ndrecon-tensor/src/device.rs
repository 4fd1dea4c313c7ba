/// Device enumeration for tensor allocation and kernel execution.
///
/// Represents the memory spaces a tensor can live in and the places a kernel
/// can be launched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Device {
    /// Host memory.
    #[default]
    Cpu,
    /// Accelerator device with an ordinal.
    Accelerator {
        /// The accelerator ordinal.
        device_id: usize,
    },
}

impl Device {
    /// Creates an accelerator device with the specified ordinal.
    pub fn accelerator(device_id: usize) -> Self {
        Device::Accelerator { device_id }
    }

    /// Returns the device type as a string.
    pub fn device_type(&self) -> &str {
        match self {
            Device::Cpu => "cpu",
            Device::Accelerator { .. } => "accel",
        }
    }

    /// Returns the device ordinal if applicable.
    pub fn device_id(&self) -> Option<usize> {
        match self {
            Device::Cpu => None,
            Device::Accelerator { device_id } => Some(*device_id),
        }
    }

    /// Returns true if the device is the host.
    pub fn is_cpu(&self) -> bool {
        matches!(self, Device::Cpu)
    }

    /// Returns true if the device is an accelerator.
    pub fn is_accelerator(&self) -> bool {
        !self.is_cpu()
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Accelerator { device_id } => write!(f, "accel:{}", device_id),
        }
    }
}
