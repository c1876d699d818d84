//! Group Miner - per-device-group mining process switching
//!
//! This crate keeps exactly one external miner process active per group of
//! identical compute devices, and switches it as the requested algorithm
//! changes:
//! - Device groups built from a device registry
//! - Cached miner wrappers, created lazily for GPU groups
//! - Stop/settle/start ordering between miners sharing the same hardware
//! - NiceHash stratum endpoint resolution

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Compute devices, device registry and device groups
pub mod device;

/// Miner switching core, lifecycle and group threads
pub mod miner;

/// Stratum endpoint resolution
pub mod network;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::Config;
pub use device::{ComputeDevice, DeviceClass, DeviceGroup, DeviceRegistry, InMemoryDeviceRegistry};
pub use miner::{
    ConfiguredMinerFactory, GroupMiners, GroupScheduler, MinerFactory, MinerWorker, ProcessMiner,
    Settle, SwitchCommand, SwitchOutcome, ThreadSleep, WorkerLifecycle,
};
pub use network::{AlgorithmEndpointRegistry, EndpointResolver, NiceHashEndpoints};
pub use types::{ActiveAlgorithm, AlgorithmType};
pub use utils::{MinerError, init_logging_with_level};
