//! Accelerator handles and the registry that enumerates them

use crate::config::RuntimeConfig;
use crate::error::{Error, Result};
use crate::stream::Stream;
use offload_backends::{Backend, CpuBackend, DeviceId, KernelLibrary};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

struct DeviceInner {
    id: DeviceId,
    backend: Arc<RwLock<Box<dyn Backend + Send + Sync>>>,
    library: Arc<KernelLibrary>,
}

/// One accelerator: its memory, and the kernel library loaded for it
///
/// Cloning is cheap; clones refer to the same device. Two handles are equal
/// only when they refer to the same device instance.
#[derive(Clone)]
pub struct Device {
    inner: Arc<DeviceInner>,
}

impl Device {
    pub fn new(id: DeviceId, backend: Box<dyn Backend + Send + Sync>, library: KernelLibrary) -> Self {
        tracing::debug!(device = %id, library = library.name(), kernels = library.len(), "device_created");
        Self {
            inner: Arc::new(DeviceInner {
                id,
                backend: Arc::new(RwLock::new(backend)),
                library: Arc::new(library),
            }),
        }
    }

    /// Emulated accelerator on the host CPU with the `offload_array` kernels
    pub fn cpu(id: DeviceId) -> Self {
        Self::new(id, Box::new(CpuBackend::new()), KernelLibrary::offload_array())
    }

    pub fn id(&self) -> DeviceId {
        self.inner.id
    }

    pub fn library(&self) -> &Arc<KernelLibrary> {
        &self.inner.library
    }

    /// Number of device buffers currently allocated
    pub fn live_buffers(&self) -> usize {
        self.inner.backend.read().live_buffer_count()
    }

    pub(crate) fn backend(&self) -> &Arc<RwLock<Box<dyn Backend + Send + Sync>>> {
        &self.inner.backend
    }

    /// Open a new stream on this device
    pub fn stream(&self) -> Result<Stream> {
        Stream::new(self)
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Device {}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.inner.id)
            .field("library", &self.inner.library.name())
            .finish()
    }
}

/// All devices known to the runtime, indexed by id
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
    config: RuntimeConfig,
}

impl DeviceRegistry {
    /// Create `config.device_count` emulated devices
    #[tracing::instrument(skip(config), fields(device_count = config.device_count))]
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        if config.device_count == 0 {
            return Err(Error::InvalidArgument("device_count must be at least 1".into()));
        }

        let devices = (0..config.device_count)
            .map(|index| Device::cpu(DeviceId::new(index)))
            .collect();

        tracing::info!(devices = config.device_count, "device registry initialized");
        Ok(Self {
            devices,
            config: config.clone(),
        })
    }

    pub fn device(&self, id: usize) -> Result<Device> {
        self.devices.get(id).cloned().ok_or_else(|| {
            Error::InvalidArgument(format!("unknown device {id} (registry has {} devices)", self.devices.len()))
        })
    }

    /// Kernel table loaded for device `id`
    pub fn library(&self, id: usize) -> Result<Arc<KernelLibrary>> {
        self.device(id).map(|device| Arc::clone(device.library()))
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Open a stream on device `id` with the registry's stream options
    pub fn stream(&self, id: usize) -> Result<Stream> {
        let device = self.device(id)?;
        Stream::with_options(&device, self.config.stream_options())
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_enumerates_devices() {
        let config = RuntimeConfig {
            device_count: 3,
            ..RuntimeConfig::default()
        };
        let registry = DeviceRegistry::from_config(&config).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.device(2).unwrap().id(), DeviceId::new(2));
        assert!(registry.library(1).unwrap().contains("offload_array_add"));
    }

    #[test]
    fn test_unknown_device_is_invalid_argument() {
        let registry = DeviceRegistry::from_config(&RuntimeConfig::default()).unwrap();
        assert!(matches!(registry.device(5), Err(Error::InvalidArgument(_))));
        assert!(matches!(registry.library(5), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_zero_devices_rejected() {
        let config = RuntimeConfig {
            device_count: 0,
            ..RuntimeConfig::default()
        };
        assert!(matches!(DeviceRegistry::from_config(&config), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_device_identity() {
        let a = Device::cpu(DeviceId::new(0));
        let b = Device::cpu(DeviceId::new(0));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.live_buffers(), 0);
    }
}
