//! Device registry
//!
//! The switcher never enumerates hardware. It asks a [`DeviceRegistry`] to
//! resolve identifiers it was handed, so tests and the CLI can both feed it
//! a fixed list.

use crate::config::DeviceConfig;
use crate::device::DeviceClass;
use serde::Serialize;
use sysinfo::System;

/// A single compute device as known to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputeDevice {
    /// Stable device identifier (UUID for GPUs, `cpu0` style for CPUs)
    pub uuid: String,
    /// Marketing name, e.g. "GTX1070"
    pub name: String,
    /// Device class
    pub class: DeviceClass,
    /// Disabled devices are never handed to a miner
    pub enabled: bool,
}

/// Read-only view over the known compute devices
///
/// Shared between device groups running on different threads.
pub trait DeviceRegistry: Send + Sync {
    /// Looks up a device by identifier
    fn resolve(&self, uuid: &str) -> Option<&ComputeDevice>;

    /// Identifiers of all enabled devices whose name is in `names`
    fn enabled_identifiers_for_names(&self, names: &[String]) -> Vec<String>;

    /// Number of known devices carrying `name`
    fn count_by_name(&self, name: &str) -> usize;

    /// Every known device, in registration order
    fn devices(&self) -> &[ComputeDevice];
}

/// Device registry backed by a fixed list
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeviceRegistry {
    devices: Vec<ComputeDevice>,
}

impl InMemoryDeviceRegistry {
    /// Creates a registry from an explicit device list
    pub fn new(devices: Vec<ComputeDevice>) -> Self {
        InMemoryDeviceRegistry { devices }
    }

    /// Creates a registry from the `[[devices]]` config entries
    ///
    /// When `detect_cpu` is set and no CPU is configured, the host CPU is
    /// registered as `cpu0`.
    pub fn from_config(devices: &[DeviceConfig], detect_cpu: bool) -> Self {
        let mut registry = InMemoryDeviceRegistry::new(
            devices
                .iter()
                .map(|d| ComputeDevice {
                    uuid: d.uuid.clone(),
                    name: d.name.clone(),
                    class: d.class,
                    enabled: d.enabled,
                })
                .collect(),
        );

        if detect_cpu && !registry.devices.iter().any(|d| d.class == DeviceClass::Cpu) {
            let cpu = detect_host_cpu();
            log::info!("Detected host CPU: {}", cpu.name);
            registry.devices.push(cpu);
        }

        registry
    }
}

impl DeviceRegistry for InMemoryDeviceRegistry {
    fn resolve(&self, uuid: &str) -> Option<&ComputeDevice> {
        self.devices.iter().find(|d| d.uuid == uuid)
    }

    fn enabled_identifiers_for_names(&self, names: &[String]) -> Vec<String> {
        self.devices
            .iter()
            .filter(|d| d.enabled && names.contains(&d.name))
            .map(|d| d.uuid.clone())
            .collect()
    }

    fn count_by_name(&self, name: &str) -> usize {
        self.devices.iter().filter(|d| d.name == name).count()
    }

    fn devices(&self) -> &[ComputeDevice] {
        &self.devices
    }
}

/// Builds the `cpu0` record from the host's CPU brand string
fn detect_host_cpu() -> ComputeDevice {
    let mut system = System::new();
    system.refresh_cpu_all();

    let name = system
        .cpus()
        .first()
        .map(|c| c.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
        .unwrap_or_else(|| "CPU".to_string());

    ComputeDevice {
        uuid: "cpu0".to_string(),
        name,
        class: DeviceClass::Cpu,
        enabled: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(uuid: &str, name: &str, enabled: bool) -> ComputeDevice {
        ComputeDevice {
            uuid: uuid.into(),
            name: name.into(),
            class: DeviceClass::Nvidia,
            enabled,
        }
    }

    #[test]
    fn enabled_identifiers_skip_disabled_devices() {
        let registry = InMemoryDeviceRegistry::new(vec![
            device("GPU-a", "GTX1070", true),
            device("GPU-b", "GTX1070", false),
            device("GPU-c", "GTX1060", true),
        ]);

        let ids = registry.enabled_identifiers_for_names(&["GTX1070".to_string()]);
        assert_eq!(ids, vec!["GPU-a".to_string()]);
        assert_eq!(registry.count_by_name("GTX1070"), 2);
    }

    #[test]
    fn detects_cpu_only_when_none_configured() {
        let configured = vec![DeviceConfig {
            uuid: "cpu-main".into(),
            name: "Ryzen".into(),
            class: DeviceClass::Cpu,
            enabled: true,
        }];
        let registry = InMemoryDeviceRegistry::from_config(&configured, true);
        assert_eq!(registry.devices().len(), 1);

        let registry = InMemoryDeviceRegistry::from_config(&[], true);
        let cpu = registry.resolve("cpu0").unwrap();
        assert_eq!(cpu.class, DeviceClass::Cpu);
        assert!(!cpu.name.is_empty());

        let registry = InMemoryDeviceRegistry::from_config(&[], false);
        assert!(registry.devices().is_empty());
    }
}
