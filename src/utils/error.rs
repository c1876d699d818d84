use crate::device::DeviceClass;
use crate::types::AlgorithmType;
use std::io;
use thiserror::Error;

/// Main error type for the group miner
///
/// Covers device group construction, algorithm switching, miner process
/// control and configuration.
#[derive(Error, Debug)]
pub enum MinerError {
    /// A device identifier did not resolve in the device registry
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// A group was built from devices of different classes
    #[error("Device {uuid} is {found}, but group is {expected}")]
    MixedDeviceClasses {
        /// Offending device
        uuid: String,
        /// Class of the group (taken from its first device)
        expected: DeviceClass,
        /// Class of the offending device
        found: DeviceClass,
    },

    /// A group was built from an empty identifier set
    #[error("Device group has no devices")]
    EmptyDeviceGroup,

    /// No pool endpoint is registered for the algorithm
    #[error("No endpoint registered for algorithm {0}")]
    UnknownAlgorithm(AlgorithmType),

    /// No miner can serve the algorithm on this class of devices
    #[error("No miner can run {algorithm} on {class} devices")]
    WorkerCreationUnsupported {
        /// Device class of the group
        class: DeviceClass,
        /// Requested algorithm
        algorithm: AlgorithmType,
    },

    /// Miner process spawn/stop failures
    #[error("Miner process error: {0}")]
    ProcessError(String),

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Thread communication channel errors
    #[error("Thread communication error: {0}")]
    ChannelError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Converts switch command send failures into MinerError
///
/// Happens when a group thread exited before the schedule finished.
impl<T> From<crossbeam_channel::SendError<T>> for MinerError {
    fn from(e: crossbeam_channel::SendError<T>) -> Self {
        MinerError::ChannelError(format!("Command send failed: {}", e))
    }
}

/// Converts TOML parse failures into `ConfigError`
impl From<toml::de::Error> for MinerError {
    fn from(e: toml::de::Error) -> Self {
        MinerError::ConfigError(format!("Invalid config format: {}", e))
    }
}
