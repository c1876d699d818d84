// src/config/mod.rs
//! Configuration management for the group miner
//!
//! Loads the TOML configuration describing devices, miner programs, device
//! groups and the switch schedule, and generates a commented template.

/// Core configuration implementation
///
/// Contains the [`Config`] struct and the per-section types.
pub mod config;

// Re-export key items for easy access
pub use config::{Config, DeviceConfig, GeneralConfig, GroupConfig, MinerConfig, ScheduleEntry};

use crate::utils::error::MinerError;
use std::path::PathBuf;

/// Loads group miner configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the configuration file (anything convertible to PathBuf)
///
/// # Returns
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(MinerError)` - If the file couldn't be read, parsed or validated
pub fn load(path: impl Into<PathBuf>) -> Result<Config, MinerError> {
    Config::load(path)
}

/// Generates a commented configuration template
pub fn generate_template() -> String {
    Config::generate_template()
}
