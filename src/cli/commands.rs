// src/cli/commands.rs
use crate::types::AlgorithmType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Group Miner CLI - switches mining processes per device group
#[derive(Parser, Debug)]
#[command(name = "group-miner-rs")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the group miner
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Build the configured groups and replay the switch schedule
    Run(RunOptions),

    /// Print the stratum endpoint for an algorithm and location
    Endpoint(EndpointOptions),

    /// List known devices and configured groups
    Devices(DevicesOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for running the switch schedule
#[derive(Parser, Debug)]
pub struct RunOptions {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Mining location (overrides config)
    #[arg(short, long)]
    pub location: Option<String>,

    /// Pool identity (overrides config)
    #[arg(short, long)]
    pub worker: Option<String>,

    /// Seconds to keep mining after the last scheduled switch
    #[arg(long, default_value_t = 60)]
    pub hold: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Options for resolving a stratum endpoint
#[derive(Parser, Debug)]
pub struct EndpointOptions {
    /// Algorithm to resolve
    #[arg(short, long)]
    pub algorithm: AlgorithmType,

    /// Mining location, e.g. eu or usa
    #[arg(short, long, default_value = "eu")]
    pub location: String,
}

/// Options for listing devices
#[derive(Parser, Debug)]
pub struct DevicesOptions {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,
}
