//! Per-group algorithm switching
//!
//! [`GroupMiners`] owns every miner created for one [`DeviceGroup`] and
//! keeps at most one of them running. Miners are cached once created:
//! switching away from a miner only stops it, and only [`GroupMiners::end`]
//! drops them.
//!
//! Calls are expected to be serialized by the caller; one `GroupMiners` is
//! driven by exactly one thread.

use crate::device::{DeviceClass, DeviceGroup};
use crate::miner::factory::MinerFactory;
use crate::miner::lifecycle::WorkerLifecycle;
use crate::miner::worker::MinerWorker;
use crate::network::EndpointResolver;
use crate::types::{ActiveAlgorithm, AlgorithmType};
use crate::utils::error::MinerError;
use std::sync::Arc;

/// What a switch request did to the miner that serves it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Already running the requested algorithm, nothing was touched
    Unchanged,
    /// Started from a stopped state
    Started,
    /// Stopped from `from`, settled, then started on the new algorithm
    Restarted {
        /// Algorithm the miner was running before
        from: AlgorithmType,
    },
}

/// Switches one miner onto `algorithm`
///
/// No-op when the miner already runs `algorithm`. A miner bound to another
/// algorithm is stopped (with the settle delay) before starting against
/// `endpoint`.
pub fn switch_algorithm(
    miner: &mut dyn MinerWorker,
    lifecycle: &WorkerLifecycle,
    algorithm: AlgorithmType,
    endpoint: &str,
    worker_label: &str,
) -> Result<SwitchOutcome, MinerError> {
    let current = miner.active_algorithm();
    if miner.is_running() && current == ActiveAlgorithm::Mining(algorithm) {
        return Ok(SwitchOutcome::Unchanged);
    }

    let mut outcome = SwitchOutcome::Started;
    if let ActiveAlgorithm::Mining(previous) = current {
        if lifecycle.stop(miner, true)? {
            outcome = SwitchOutcome::Restarted { from: previous };
        }
    }

    log::info!("Starting {} on {} ({})", miner.name(), algorithm, endpoint);
    miner.start(algorithm, endpoint, worker_label)?;
    Ok(outcome)
}

/// Miner cache and switching state for one device group
pub struct GroupMiners {
    group: DeviceGroup,
    miners: Vec<Box<dyn MinerWorker>>,
    /// Index into `miners` of the miner in charge
    active: Option<usize>,
    factory: Arc<dyn MinerFactory>,
    resolver: EndpointResolver,
    lifecycle: WorkerLifecycle,
}

impl GroupMiners {
    /// Creates an empty switcher for `group`
    pub fn new(
        group: DeviceGroup,
        factory: Arc<dyn MinerFactory>,
        resolver: EndpointResolver,
        lifecycle: WorkerLifecycle,
    ) -> Self {
        GroupMiners {
            group,
            miners: Vec::new(),
            active: None,
            factory,
            resolver,
            lifecycle,
        }
    }

    /// Adds a ready-made miner to the cache
    ///
    /// This is the only way CPU groups get miners.
    pub fn provision(&mut self, mut miner: Box<dyn MinerWorker>) {
        miner.assign_devices(self.group.device_uuids());
        log::debug!("Provisioned {} for {}", miner.name(), self.group);
        self.miners.push(miner);
    }

    /// Makes the group mine `algorithm` at `location` as `worker_label`
    ///
    /// Picks the first cached miner supporting `algorithm`, creating one for
    /// GPU groups when none does. A different previously active miner is
    /// stopped before the chosen one starts. Repeating a request that is
    /// already being served changes nothing.
    ///
    /// # Errors
    /// * `UnknownAlgorithm` - no endpoint registered, nothing is touched
    /// * `WorkerCreationUnsupported` - no miner can serve the algorithm on
    ///   this group; for CPU groups nothing is touched
    /// * miner start/stop failures, propagated as-is
    pub fn start_algorithm(
        &mut self,
        algorithm: AlgorithmType,
        location: &str,
        worker_label: &str,
    ) -> Result<SwitchOutcome, MinerError> {
        let endpoint = self.resolver.resolve(algorithm, location)?;
        let target = self.miner_for(algorithm)?;

        if let Some(previous) = self.active.filter(|&previous| previous != target) {
            log::info!(
                "Handing {} over from {} to {}",
                self.group.display_label(),
                self.miners[previous].name(),
                self.miners[target].name()
            );
            self.lifecycle.stop(self.miners[previous].as_mut(), true)?;
        }
        self.active = Some(target);

        switch_algorithm(
            self.miners[target].as_mut(),
            &self.lifecycle,
            algorithm,
            &endpoint,
            worker_label,
        )
    }

    /// Index of the cached miner for `algorithm`, creating it if allowed
    fn miner_for(&mut self, algorithm: AlgorithmType) -> Result<usize, MinerError> {
        if let Some(index) = self.miners.iter().position(|m| m.supports(algorithm)) {
            return Ok(index);
        }

        let class = self.group.class();
        if class == DeviceClass::Cpu {
            log::warn!(
                "No provisioned CPU miner supports {} on {}",
                algorithm,
                self.group.display_label()
            );
            return Err(MinerError::WorkerCreationUnsupported { class, algorithm });
        }

        let mut miner = self.factory.create(class, algorithm)?;
        miner.assign_devices(self.group.device_uuids());
        log::info!(
            "Created miner {} for {} on {}",
            miner.name(),
            algorithm,
            self.group.display_label()
        );
        self.miners.push(miner);
        Ok(self.miners.len() - 1)
    }

    /// Stops every cached miner, keeping them for later reuse
    pub fn stop(&mut self) -> Result<(), MinerError> {
        log::info!("Stopping all miners on {}", self.group.display_label());
        self.lifecycle.stop_all(&mut self.miners)
    }

    /// Tears down and drops every cached miner
    pub fn end(&mut self) -> Result<(), MinerError> {
        log::info!("Ending all miners on {}", self.group.display_label());
        let result = self.lifecycle.end_all(&mut self.miners);
        self.active = None;
        self.miners.clear();
        result
    }

    /// The device group being switched
    pub fn group(&self) -> &DeviceGroup {
        &self.group
    }

    /// Label for UI presentation, e.g. `{ 2 * GTX1070 }`
    pub fn display_label(&self) -> &str {
        self.group.display_label()
    }

    /// The miner currently in charge of the group, if any
    pub fn active_miner(&self) -> Option<&dyn MinerWorker> {
        self.active.map(|index| self.miners[index].as_ref())
    }

    /// Every cached miner in creation order
    pub fn miners(&self) -> impl Iterator<Item = &dyn MinerWorker> + '_ {
        self.miners.iter().map(|m| m.as_ref())
    }
}
