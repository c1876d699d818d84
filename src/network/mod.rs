// src/network/mod.rs
//! Pool endpoint resolution
//!
//! The switcher never talks to a pool itself. It only derives the stratum
//! URL a miner process should connect to for a given algorithm and mining
//! location.

/// Stratum endpoint registry and resolver
pub mod endpoint;

pub use endpoint::{
    AlgorithmEndpointRegistry, EndpointRecord, EndpointResolver, NiceHashEndpoints,
};
