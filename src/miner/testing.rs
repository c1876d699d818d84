//! Recording doubles for switcher tests

use crate::device::DeviceClass;
use crate::miner::factory::MinerFactory;
use crate::miner::lifecycle::Settle;
use crate::miner::worker::MinerWorker;
use crate::types::{ActiveAlgorithm, AlgorithmType};
use crate::utils::error::MinerError;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinerEvent {
    Created {
        miner: String,
    },
    AssignDevices {
        miner: String,
        devices: Vec<String>,
    },
    Start {
        miner: String,
        algorithm: AlgorithmType,
        url: String,
        label: String,
    },
    Stop {
        miner: String,
        graceful: bool,
    },
    End {
        miner: String,
    },
    Settle(Duration),
}

/// Ordered log shared by every double in a test
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<MinerEvent>>>);

impl EventLog {
    pub fn push(&self, event: MinerEvent) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<MinerEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    pub fn count_settles(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, MinerEvent::Settle(_)))
            .count()
    }

    /// Only the start/stop/end events, without settles or assignments
    pub fn transitions(&self) -> Vec<MinerEvent> {
        self.events()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    MinerEvent::Start { .. } | MinerEvent::Stop { .. } | MinerEvent::End { .. }
                )
            })
            .collect()
    }
}

pub struct FakeMiner {
    name: String,
    algorithms: Vec<AlgorithmType>,
    running: bool,
    active: ActiveAlgorithm,
    fail_stop: bool,
    fail_start: bool,
    log: EventLog,
}

impl FakeMiner {
    pub fn new(name: &str, algorithms: &[AlgorithmType], log: &EventLog) -> Self {
        FakeMiner {
            name: name.to_string(),
            algorithms: algorithms.to_vec(),
            running: false,
            active: ActiveAlgorithm::None,
            fail_stop: false,
            fail_start: false,
            log: log.clone(),
        }
    }

    pub fn fail_stop(&mut self) {
        self.fail_stop = true;
    }

    pub fn fail_start(&mut self) {
        self.fail_start = true;
    }
}

impl MinerWorker for FakeMiner {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn active_algorithm(&self) -> ActiveAlgorithm {
        self.active
    }

    fn supports(&self, algorithm: AlgorithmType) -> bool {
        self.algorithms.contains(&algorithm)
    }

    fn assign_devices(&mut self, device_uuids: &[String]) {
        self.log.push(MinerEvent::AssignDevices {
            miner: self.name.clone(),
            devices: device_uuids.to_vec(),
        });
    }

    fn start(
        &mut self,
        algorithm: AlgorithmType,
        url: &str,
        worker_label: &str,
    ) -> Result<(), MinerError> {
        if self.fail_start {
            return Err(MinerError::ProcessError(format!("{} failed to launch", self.name)));
        }
        self.log.push(MinerEvent::Start {
            miner: self.name.clone(),
            algorithm,
            url: url.to_string(),
            label: worker_label.to_string(),
        });
        self.running = true;
        self.active = ActiveAlgorithm::Mining(algorithm);
        Ok(())
    }

    fn stop(&mut self, graceful: bool) -> Result<(), MinerError> {
        if self.fail_stop {
            return Err(MinerError::ProcessError(format!("{} refused to stop", self.name)));
        }
        self.log.push(MinerEvent::Stop {
            miner: self.name.clone(),
            graceful,
        });
        self.running = false;
        Ok(())
    }

    fn end(&mut self) -> Result<(), MinerError> {
        self.log.push(MinerEvent::End {
            miner: self.name.clone(),
        });
        self.running = false;
        self.active = ActiveAlgorithm::Invalid;
        Ok(())
    }
}

/// Settle that records the delay instead of sleeping
pub struct RecordingSettle {
    log: EventLog,
}

impl RecordingSettle {
    pub fn new(log: EventLog) -> Self {
        RecordingSettle { log }
    }
}

impl Settle for RecordingSettle {
    fn settle(&self, delay: Duration) {
        self.log.push(MinerEvent::Settle(delay));
    }
}

/// Factory building [`FakeMiner`]s from (name, class, algorithms) templates
pub struct FakeFactory {
    templates: Vec<(String, DeviceClass, Vec<AlgorithmType>)>,
    log: EventLog,
}

impl FakeFactory {
    pub fn new(log: &EventLog) -> Self {
        FakeFactory {
            templates: Vec::new(),
            log: log.clone(),
        }
    }

    pub fn with(mut self, name: &str, class: DeviceClass, algorithms: &[AlgorithmType]) -> Self {
        self.templates
            .push((name.to_string(), class, algorithms.to_vec()));
        self
    }
}

impl MinerFactory for FakeFactory {
    fn create(
        &self,
        class: DeviceClass,
        algorithm: AlgorithmType,
    ) -> Result<Box<dyn MinerWorker>, MinerError> {
        let (name, _, algorithms) = self
            .templates
            .iter()
            .find(|(_, c, algos)| *c == class && algos.contains(&algorithm))
            .ok_or(MinerError::WorkerCreationUnsupported { class, algorithm })?;

        self.log.push(MinerEvent::Created {
            miner: name.clone(),
        });
        Ok(Box::new(FakeMiner::new(name, algorithms, &self.log)))
    }
}
