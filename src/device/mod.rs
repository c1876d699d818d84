//! Compute devices and device groups
//!
//! A [`DeviceGroup`] is the unit the switcher works on: a fixed, homogeneous
//! set of devices that always mine the same algorithm through one miner.
//! Device discovery itself lives behind the [`DeviceRegistry`] trait.

/// Device group construction and display aggregation
pub mod group;

/// Device registry trait and the in-memory implementation
pub mod registry;

pub use group::DeviceGroup;
pub use registry::{ComputeDevice, DeviceRegistry, InMemoryDeviceRegistry};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of a compute device
///
/// Miners are built per class, so every device in a group shares one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Host CPU
    Cpu,
    /// NVIDIA GPU (CUDA miners)
    Nvidia,
    /// AMD GPU (OpenCL miners)
    Amd,
    /// Anything the registry could not classify
    Unclassified,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            DeviceClass::Cpu => "cpu",
            DeviceClass::Nvidia => "nvidia",
            DeviceClass::Amd => "amd",
            DeviceClass::Unclassified => "unclassified",
        })
    }
}
