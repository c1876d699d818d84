// src/network/endpoint.rs
use crate::types::AlgorithmType;
use crate::utils::error::MinerError;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Arc;

/// Base port of the NiceHash stratum servers; each algorithm adds its id
const NICEHASH_BASE_PORT: u16 = 3333;

lazy_static! {
    static ref NICEHASH_ENDPOINTS: HashMap<AlgorithmType, EndpointRecord> = AlgorithmType::ALL
        .iter()
        .map(|&algo| {
            (
                algo,
                EndpointRecord {
                    name: algo.name().to_string(),
                    port: NICEHASH_BASE_PORT + algo.id(),
                },
            )
        })
        .collect();
}

/// Stratum host prefix and port for one algorithm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRecord {
    /// Host prefix, e.g. "daggerhashimoto"
    pub name: String,
    /// Stratum port, e.g. 3353
    pub port: u16,
}

/// Static lookup table from algorithm to stratum endpoint
pub trait AlgorithmEndpointRegistry: Send + Sync {
    /// Endpoint record for `algorithm`, if one is registered
    fn lookup(&self, algorithm: AlgorithmType) -> Option<&EndpointRecord>;
}

/// The built-in NiceHash endpoint table
#[derive(Debug, Clone, Copy, Default)]
pub struct NiceHashEndpoints;

impl AlgorithmEndpointRegistry for NiceHashEndpoints {
    fn lookup(&self, algorithm: AlgorithmType) -> Option<&EndpointRecord> {
        NICEHASH_ENDPOINTS.get(&algorithm)
    }
}

impl AlgorithmEndpointRegistry for HashMap<AlgorithmType, EndpointRecord> {
    fn lookup(&self, algorithm: AlgorithmType) -> Option<&EndpointRecord> {
        self.get(&algorithm)
    }
}

/// Maps (algorithm, location) to a stratum connection string
#[derive(Clone)]
pub struct EndpointResolver {
    registry: Arc<dyn AlgorithmEndpointRegistry>,
}

impl Default for EndpointResolver {
    fn default() -> Self {
        EndpointResolver::new(Arc::new(NiceHashEndpoints))
    }
}

impl EndpointResolver {
    /// Creates a resolver over `registry`
    pub fn new(registry: Arc<dyn AlgorithmEndpointRegistry>) -> Self {
        EndpointResolver { registry }
    }

    /// Builds `stratum+tcp://<name>.<location>.nicehash.com:<port>`
    ///
    /// # Errors
    /// `UnknownAlgorithm` if the registry has no record. Callers only ever
    /// request registered algorithms, so this is logged as a contract
    /// violation before being returned.
    pub fn resolve(&self, algorithm: AlgorithmType, location: &str) -> Result<String, MinerError> {
        match self.registry.lookup(algorithm) {
            Some(record) => Ok(format!(
                "stratum+tcp://{}.{}.nicehash.com:{}",
                record.name, location, record.port
            )),
            None => {
                log::error!("No stratum endpoint registered for {}", algorithm);
                Err(MinerError::UnknownAlgorithm(algorithm))
            }
        }
    }
}
