//! Device groups
//!
//! A group is built once from identifiers and never changes afterwards.
//! Its label, e.g. `{ 2 * GTX1070 }`, is what every log line about the
//! group shows.

use crate::device::{DeviceClass, DeviceRegistry};
use crate::utils::error::MinerError;
use std::collections::BTreeSet;
use std::fmt;

/// Immutable, homogeneous set of devices switched as one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceGroup {
    /// Enabled device identifiers handed to miners, sorted
    device_uuids: Vec<String>,
    class: DeviceClass,
    display_label: String,
}

impl DeviceGroup {
    /// Builds a group from a set of device identifiers
    ///
    /// The group class is taken from the first device; every other device
    /// must share it. The identifiers handed to miners are the registry's
    /// enabled devices carrying the member names, so disabled members drop
    /// out here.
    ///
    /// # Errors
    /// * `EmptyDeviceGroup` - `uuids` is empty
    /// * `DeviceNotFound` - an identifier does not resolve
    /// * `MixedDeviceClasses` - members disagree on device class
    pub fn new(uuids: &BTreeSet<String>, registry: &dyn DeviceRegistry) -> Result<Self, MinerError> {
        if uuids.is_empty() {
            return Err(MinerError::EmptyDeviceGroup);
        }

        let mut names = Vec::with_capacity(uuids.len());
        let mut class = None;
        for uuid in uuids {
            let device = registry
                .resolve(uuid)
                .ok_or_else(|| MinerError::DeviceNotFound(uuid.clone()))?;

            match class {
                None => class = Some(device.class),
                Some(expected) if expected != device.class => {
                    return Err(MinerError::MixedDeviceClasses {
                        uuid: uuid.clone(),
                        expected,
                        found: device.class,
                    });
                }
                Some(_) => {}
            }
            names.push(device.name.clone());
        }

        let mut device_uuids = registry.enabled_identifiers_for_names(&names);
        device_uuids.sort();
        device_uuids.dedup();

        Ok(DeviceGroup {
            device_uuids,
            class: class.unwrap_or(DeviceClass::Unclassified),
            display_label: display_label(&names),
        })
    }

    /// Enabled device identifiers, sorted
    pub fn device_uuids(&self) -> &[String] {
        &self.device_uuids
    }

    /// Class shared by every device in the group
    pub fn class(&self) -> DeviceClass {
        self.class
    }

    /// Human-readable summary, e.g. `{ 2 * GTX1070, 1 * GTX1060 }`
    pub fn display_label(&self) -> &str {
        &self.display_label
    }
}

impl fmt::Display for DeviceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.class, self.display_label)
    }
}

/// Counts each name, keeping first-appearance order
fn display_label(names: &[String]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for name in names {
        match counts.iter_mut().find(|(seen, _)| *seen == name.as_str()) {
            Some((_, count)) => *count += 1,
            None => counts.push((name.as_str(), 1)),
        }
    }

    let entries: Vec<String> = counts
        .iter()
        .map(|(name, count)| format!("{} * {}", count, name))
        .collect();
    format!("{{ {} }}", entries.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{ComputeDevice, InMemoryDeviceRegistry};

    fn registry() -> InMemoryDeviceRegistry {
        let gpu = |uuid: &str, name: &str, enabled: bool| ComputeDevice {
            uuid: uuid.into(),
            name: name.into(),
            class: DeviceClass::Nvidia,
            enabled,
        };
        InMemoryDeviceRegistry::new(vec![
            gpu("GPU-b", "GTX1070", true),
            gpu("GPU-a", "GTX1070", true),
            gpu("GPU-c", "GTX1060", true),
            gpu("GPU-d", "GTX1060", false),
            ComputeDevice {
                uuid: "cpu0".into(),
                name: "Ryzen 7".into(),
                class: DeviceClass::Cpu,
                enabled: true,
            },
        ])
    }

    fn ids(uuids: &[&str]) -> BTreeSet<String> {
        uuids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn aggregates_identical_names() {
        let group = DeviceGroup::new(&ids(&["GPU-a", "GPU-b"]), &registry()).unwrap();
        assert_eq!(group.display_label(), "{ 2 * GTX1070 }");
        assert_eq!(group.class(), DeviceClass::Nvidia);
        assert_eq!(group.device_uuids(), ["GPU-a".to_string(), "GPU-b".to_string()]);
    }

    #[test]
    fn label_keeps_first_appearance_order() {
        let group = DeviceGroup::new(&ids(&["GPU-a", "GPU-b", "GPU-c"]), &registry()).unwrap();
        assert_eq!(group.display_label(), "{ 2 * GTX1070, 1 * GTX1060 }");
    }

    #[test]
    fn disabled_devices_are_not_assigned() {
        let group = DeviceGroup::new(&ids(&["GPU-c", "GPU-d"]), &registry()).unwrap();
        assert_eq!(group.display_label(), "{ 2 * GTX1060 }");
        assert_eq!(group.device_uuids(), ["GPU-c".to_string()]);
    }

    #[test]
    fn unknown_device_fails_construction() {
        let err = DeviceGroup::new(&ids(&["GPU-a", "GPU-zz"]), &registry()).unwrap_err();
        assert!(matches!(err, MinerError::DeviceNotFound(uuid) if uuid == "GPU-zz"));
    }

    #[test]
    fn mixed_classes_fail_construction() {
        let err = DeviceGroup::new(&ids(&["GPU-a", "cpu0"]), &registry()).unwrap_err();
        assert!(matches!(
            err,
            MinerError::MixedDeviceClasses {
                expected: DeviceClass::Nvidia,
                found: DeviceClass::Cpu,
                ..
            }
        ));
    }

    #[test]
    fn empty_set_fails_construction() {
        let err = DeviceGroup::new(&BTreeSet::new(), &registry()).unwrap_err();
        assert!(matches!(err, MinerError::EmptyDeviceGroup));
    }
}
