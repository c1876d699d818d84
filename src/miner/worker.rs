//! Miner process wrapper interface
//!
//! A miner wraps one external mining program bound to one device group. The
//! switcher only ever talks to it through [`MinerWorker`]; spawning, output
//! parsing and hash-rate monitoring are the implementation's business.

use crate::types::{ActiveAlgorithm, AlgorithmType};
use crate::utils::error::MinerError;

/// Control surface of a miner process wrapper
///
/// Implementations must report `is_running() == true` only between a
/// successful `start` and the next `stop`/`end`, and keep
/// `active_algorithm` pointing at the last started algorithm.
pub trait MinerWorker: Send {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Whether the miner process is currently running
    fn is_running(&self) -> bool;

    /// Algorithm the miner was last started with
    fn active_algorithm(&self) -> ActiveAlgorithm;

    /// Whether this miner can serve `algorithm`. Fixed at creation.
    fn supports(&self, algorithm: AlgorithmType) -> bool;

    /// Sets the devices the miner will be launched on
    fn assign_devices(&mut self, device_uuids: &[String]);

    /// Launches the miner against `url`, identifying as `worker_label`
    fn start(
        &mut self,
        algorithm: AlgorithmType,
        url: &str,
        worker_label: &str,
    ) -> Result<(), MinerError>;

    /// Stops the running miner process
    fn stop(&mut self, graceful: bool) -> Result<(), MinerError>;

    /// Tears the miner down for good
    fn end(&mut self) -> Result<(), MinerError>;
}
