// src/miner/mod.rs
//! Miner switching core
//!
//! This module contains everything that decides which miner process runs on
//! a device group:
//! - The [`MinerWorker`] interface the switcher drives
//! - Stop/settle/teardown rules ([`WorkerLifecycle`])
//! - Miner creation ([`MinerFactory`]) and the process-backed miner
//! - The per-group switching state machine ([`GroupMiners`])
//! - A thread-per-group command loop ([`GroupScheduler`])

/// Interface to a single miner process wrapper
pub mod worker;

/// Stop, settle and teardown of miners
pub mod lifecycle;

/// Miner creation per device class and algorithm
pub mod factory;

/// Miner backed by an external executable
pub mod process;

/// Per-group algorithm switching
pub mod switcher;

/// Thread-per-group command loop
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main components for cleaner imports
pub use self::factory::{ConfiguredMinerFactory, MinerFactory};
pub use self::lifecycle::{Settle, ThreadSleep, WorkerLifecycle};
pub use self::process::ProcessMiner;
pub use self::scheduler::{GroupScheduler, SwitchCommand};
pub use self::switcher::{GroupMiners, SwitchOutcome, switch_algorithm};
pub use self::worker::MinerWorker;
