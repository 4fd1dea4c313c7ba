//! Runtime configuration for the device registry and the kernel executors.

/// Controls how element kernels are scheduled on the host worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process every element in parallel.
    #[default]
    ParallelElements,

    /// Use the global Rayon thread pool to process fixed-size chunks in parallel.
    ///
    /// The chunk length is in elements and must be non-zero.
    Chunked(usize),

    /// Run sequentially on the calling thread.
    ///
    /// Useful for small arrays, debugging, or deterministic timing.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    Fixed(usize),
}

/// Whether the compute device is synchronized after every kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionMode {
    /// Every operation waits for its kernel before returning.
    #[default]
    Blocking,
    /// Kernels may still be in flight when the operation returns.
    ///
    /// Scalar results and cross-device transfers always synchronize. The bundled
    /// host and emulated backends finish every kernel before returning and their
    /// `synchronize` is a no-op, so on them this mode behaves like `Blocking`.
    Asynchronous,
}

/// Process-wide runtime settings.
///
/// Installed once through [`crate::registry::install`]; every field has a
/// default so an uninstalled process behaves as if `RuntimeConfig::default()`
/// had been installed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RuntimeConfig {
    /// Number of accelerator ordinals exposed by the registry.
    pub accelerators: usize,
    /// Per-accelerator memory capacity in bytes, unbounded when `None`.
    pub device_memory_limit: Option<usize>,
    /// Kernel scheduling strategy.
    pub strategy: ExecutionStrategy,
    /// Synchronization mode.
    pub mode: ExecutionMode,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            accelerators: 1,
            device_memory_limit: None,
            strategy: ExecutionStrategy::default(),
            mode: ExecutionMode::default(),
        }
    }
}

impl RuntimeConfig {
    /// Sets the number of accelerators.
    pub fn with_accelerators(mut self, accelerators: usize) -> Self {
        self.accelerators = accelerators;
        self
    }

    /// Sets the per-accelerator memory capacity in bytes.
    pub fn with_device_memory_limit(mut self, bytes: usize) -> Self {
        self.device_memory_limit = Some(bytes);
        self
    }

    /// Sets the kernel scheduling strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the synchronization mode.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.accelerators, 1);
        assert_eq!(config.device_memory_limit, None);
        assert_eq!(config.strategy, ExecutionStrategy::ParallelElements);
        assert_eq!(config.mode, ExecutionMode::Blocking);
    }

    #[test]
    fn test_builder() {
        let config = RuntimeConfig::default()
            .with_accelerators(2)
            .with_device_memory_limit(1 << 20)
            .with_strategy(ExecutionStrategy::Serial)
            .with_mode(ExecutionMode::Asynchronous);
        assert_eq!(config.accelerators, 2);
        assert_eq!(config.device_memory_limit, Some(1 << 20));
        assert_eq!(config.strategy, ExecutionStrategy::Serial);
        assert_eq!(config.mode, ExecutionMode::Asynchronous);
    }
}
