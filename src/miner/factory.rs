//! Miner creation
//!
//! GPU groups create miners lazily, the first time an algorithm no cached
//! miner supports is requested. CPU miners are provisioned once when the
//! group is built and never created on demand.

use crate::config::MinerConfig;
use crate::device::DeviceClass;
use crate::miner::process::ProcessMiner;
use crate::miner::worker::MinerWorker;
use crate::types::AlgorithmType;
use crate::utils::error::MinerError;

/// Builds miners able to run an algorithm on a class of devices
pub trait MinerFactory: Send + Sync {
    /// Creates a fresh, stopped miner for `class` that supports `algorithm`
    ///
    /// # Errors
    /// `WorkerCreationUnsupported` if no miner type fits.
    fn create(
        &self,
        class: DeviceClass,
        algorithm: AlgorithmType,
    ) -> Result<Box<dyn MinerWorker>, MinerError>;
}

/// Factory driven by the `[[miners]]` config entries
#[derive(Debug, Clone, Default)]
pub struct ConfiguredMinerFactory {
    definitions: Vec<MinerConfig>,
}

impl ConfiguredMinerFactory {
    /// Creates a factory over miner definitions, first match wins
    pub fn new(definitions: Vec<MinerConfig>) -> Self {
        ConfiguredMinerFactory { definitions }
    }

    /// One miner per CPU definition, for pre-provisioning CPU groups
    pub fn provision_cpu_miners(&self) -> Vec<Box<dyn MinerWorker>> {
        self.definitions
            .iter()
            .filter(|d| d.class == DeviceClass::Cpu)
            .map(|d| Box::new(ProcessMiner::from_config(d)) as Box<dyn MinerWorker>)
            .collect()
    }
}

impl MinerFactory for ConfiguredMinerFactory {
    fn create(
        &self,
        class: DeviceClass,
        algorithm: AlgorithmType,
    ) -> Result<Box<dyn MinerWorker>, MinerError> {
        let definition = self
            .definitions
            .iter()
            .find(|d| d.class == class && d.algorithms.contains(&algorithm))
            .ok_or(MinerError::WorkerCreationUnsupported { class, algorithm })?;

        log::debug!("Creating {} miner {} for {}", class, definition.name, algorithm);
        Ok(Box::new(ProcessMiner::from_config(definition)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn definition(name: &str, class: DeviceClass, algorithms: &[AlgorithmType]) -> MinerConfig {
        MinerConfig {
            name: name.into(),
            class,
            algorithms: algorithms.to_vec(),
            path: PathBuf::from("/opt/miners").join(name),
            args: vec!["-o".into(), "{url}".into()],
            stop_grace_ms: 5000,
        }
    }

    fn factory() -> ConfiguredMinerFactory {
        ConfiguredMinerFactory::new(vec![
            definition("ccminer", DeviceClass::Nvidia, &[AlgorithmType::X11, AlgorithmType::Lyra2REv2]),
            definition("ethminer", DeviceClass::Nvidia, &[AlgorithmType::DaggerHashimoto]),
            definition("sgminer", DeviceClass::Amd, &[AlgorithmType::DaggerHashimoto]),
            definition("cpuminer", DeviceClass::Cpu, &[AlgorithmType::CryptoNight]),
        ])
    }

    #[test]
    fn picks_definition_by_class_and_algorithm() {
        let miner = factory()
            .create(DeviceClass::Nvidia, AlgorithmType::DaggerHashimoto)
            .unwrap();
        assert_eq!(miner.name(), "ethminer");
        assert!(!miner.is_running());

        let miner = factory()
            .create(DeviceClass::Amd, AlgorithmType::DaggerHashimoto)
            .unwrap();
        assert_eq!(miner.name(), "sgminer");
    }

    #[test]
    fn unsupported_pairing_is_reported() {
        let Err(err) = factory().create(DeviceClass::Amd, AlgorithmType::X11) else {
            panic!("amd has no x11 miner");
        };
        assert!(matches!(
            err,
            MinerError::WorkerCreationUnsupported {
                class: DeviceClass::Amd,
                algorithm: AlgorithmType::X11
            }
        ));
    }

    #[test]
    fn provisions_only_cpu_miners() {
        let miners = factory().provision_cpu_miners();
        assert_eq!(miners.len(), 1);
        assert_eq!(miners[0].name(), "cpuminer");
        assert!(miners[0].supports(AlgorithmType::CryptoNight));
    }
}
