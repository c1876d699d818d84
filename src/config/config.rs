use crate::device::DeviceClass;
use crate::types::AlgorithmType;
use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the group miner
///
/// Describes the known devices, the miner programs available per device
/// class, how devices are grouped, and an optional switch schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Settings shared by every group
    #[serde(default)]
    pub general: GeneralConfig,

    /// Known compute devices
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,

    /// Miner programs, first match per (class, algorithm) wins
    #[serde(default)]
    pub miners: Vec<MinerConfig>,

    /// Device groups, each switched independently
    #[serde(default)]
    pub groups: Vec<GroupConfig>,

    /// Algorithm switches to replay, in order of `after_secs`
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}

/// `[general]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Wait after stopping a miner before anything else starts
    /// (default: 500 ms)
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,

    /// Default mining location (default: "eu")
    #[serde(default = "default_location")]
    pub location: String,

    /// Pool identity, usually `<wallet>.<rig>` (default: "worker1")
    #[serde(default = "default_worker_label")]
    pub worker_label: String,

    /// Register the host CPU when no CPU device is configured
    /// (default: true)
    #[serde(default = "default_detect_cpu")]
    pub detect_cpu: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            restart_delay_ms: default_restart_delay_ms(),
            location: default_location(),
            worker_label: default_worker_label(),
            detect_cpu: default_detect_cpu(),
        }
    }
}

/// `[[devices]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device identifier
    pub uuid: String,
    /// Device name, e.g. "GTX1070"
    pub name: String,
    /// Device class
    pub class: DeviceClass,
    /// Disabled devices are never handed to miners (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// `[[miners]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Name used in logs
    pub name: String,
    /// Device class this miner runs on
    pub class: DeviceClass,
    /// Algorithms this miner can serve
    pub algorithms: Vec<AlgorithmType>,
    /// Executable path
    pub path: PathBuf,
    /// Argument templates, see [`crate::miner::ProcessMiner`]
    #[serde(default)]
    pub args: Vec<String>,
    /// How long a graceful stop waits for the process to exit on its own
    /// before killing it (default: 5000 ms)
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
}

impl MinerConfig {
    /// Grace period for a graceful stop
    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }
}

/// `[[groups]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Group name
    pub name: String,
    /// Identifiers of the member devices
    pub devices: Vec<String>,
}

/// `[[schedule]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Seconds after startup at which to switch
    #[serde(default)]
    pub after_secs: u64,
    /// Algorithm to switch to
    pub algorithm: AlgorithmType,
    /// Location override for this switch
    pub location: Option<String>,
}

fn default_restart_delay_ms() -> u64 {
    500
}

fn default_location() -> String {
    "eu".into()
}

fn default_worker_label() -> String {
    "worker1".into()
}

fn default_detect_cpu() -> bool {
    true
}

fn default_stop_grace_ms() -> u64 {
    5000
}

fn default_enabled() -> bool {
    true
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(MinerError)` - If file couldn't be read, parsed or validated
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        Config::parse(&config_str)
    }

    /// Parses and validates a TOML document
    pub fn parse(config_str: &str) -> Result<Self, MinerError> {
        let config: Config = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Settle delay applied after every miner stop
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.general.restart_delay_ms)
    }

    /// Schedule sorted by `after_secs`
    pub fn sorted_schedule(&self) -> Vec<ScheduleEntry> {
        let mut schedule = self.schedule.clone();
        schedule.sort_by_key(|entry| entry.after_secs);
        schedule
    }

    fn validate(&self) -> Result<(), MinerError> {
        let mut uuids = HashSet::new();
        for device in &self.devices {
            if !uuids.insert(device.uuid.as_str()) {
                return Err(MinerError::ConfigError(format!(
                    "Duplicate device uuid: {}",
                    device.uuid
                )));
            }
        }

        for miner in &self.miners {
            if miner.algorithms.is_empty() {
                return Err(MinerError::ConfigError(format!(
                    "Miner {} lists no algorithms",
                    miner.name
                )));
            }
        }

        let mut names = HashSet::new();
        for group in &self.groups {
            if !names.insert(group.name.as_str()) {
                return Err(MinerError::ConfigError(format!(
                    "Duplicate group name: {}",
                    group.name
                )));
            }
            if group.devices.is_empty() {
                return Err(MinerError::ConfigError(format!(
                    "Group {} has no devices",
                    group.name
                )));
            }
        }

        Ok(())
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# Group Miner Configuration\n\n");
        template.push_str("[general]\n");
        template.push_str("# Wait after stopping a miner before starting another\n");
        template.push_str("restart_delay_ms = 500\n");
        template.push_str("# Mining location: eu, usa, hk, jp\n");
        template.push_str("location = \"eu\"\n");
        template.push_str("# Pool identity, usually <wallet>.<rig>\n");
        template.push_str("worker_label = \"your_btc_address.rig1\"\n");
        template.push_str("# Register the host CPU as cpu0 when no CPU device is listed\n");
        template.push_str("detect_cpu = true\n\n");

        template.push_str("# Known devices (class: cpu, nvidia, amd)\n");
        template.push_str("[[devices]]\n");
        template.push_str("uuid = \"GPU-0\"\n");
        template.push_str("name = \"GTX1070\"\n");
        template.push_str("class = \"nvidia\"\n\n");
        template.push_str("[[devices]]\n");
        template.push_str("uuid = \"GPU-1\"\n");
        template.push_str("name = \"GTX1070\"\n");
        template.push_str("class = \"nvidia\"\n\n");

        template.push_str("# Miner programs; args may use {url}, {user}, {devices}, {algorithm}\n");
        template.push_str("[[miners]]\n");
        template.push_str("name = \"ccminer\"\n");
        template.push_str("class = \"nvidia\"\n");
        template.push_str("algorithms = [\"lyra2rev2\", \"x11gost\", \"neoscrypt\"]\n");
        template.push_str("path = \"bin/ccminer/ccminer\"\n");
        template.push_str("args = [\"-a\", \"{algorithm}\", \"-o\", \"{url}\", \"-u\", \"{user}\", \"-d\", \"{devices}\"]\n\n");
        template.push_str("[[miners]]\n");
        template.push_str("name = \"ethminer\"\n");
        template.push_str("class = \"nvidia\"\n");
        template.push_str("algorithms = [\"daggerhashimoto\"]\n");
        template.push_str("path = \"bin/ethminer/ethminer\"\n");
        template.push_str("args = [\"-U\", \"-S\", \"{url}\", \"-O\", \"{user}\"]\n\n");

        template.push_str("# Devices switched together\n");
        template.push_str("[[groups]]\n");
        template.push_str("name = \"gtx1070\"\n");
        template.push_str("devices = [\"GPU-0\", \"GPU-1\"]\n\n");

        template.push_str("# Switches replayed by `run`\n");
        template.push_str("[[schedule]]\n");
        template.push_str("after_secs = 0\n");
        template.push_str("algorithm = \"lyra2rev2\"\n\n");
        template.push_str("[[schedule]]\n");
        template.push_str("after_secs = 600\n");
        template.push_str("algorithm = \"daggerhashimoto\"\n");

        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_back() {
        let config = Config::parse(&Config::generate_template()).unwrap();
        assert_eq!(config.devices.len(), 2);
        assert_eq!(config.miners.len(), 2);
        assert_eq!(config.groups[0].devices, vec!["GPU-0", "GPU-1"]);
        assert_eq!(config.schedule[1].algorithm, AlgorithmType::DaggerHashimoto);
        assert_eq!(config.restart_delay(), Duration::from_millis(500));
        assert_eq!(config.miners[0].stop_grace(), Duration::from_secs(5));
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.general.restart_delay_ms, 500);
        assert_eq!(config.general.location, "eu");
        assert_eq!(config.general.worker_label, "worker1");
        assert!(config.general.detect_cpu);
        assert!(config.groups.is_empty());
    }

    #[test]
    fn device_enabled_defaults_to_true() {
        let config = Config::parse(
            r#"
            [[devices]]
            uuid = "GPU-0"
            name = "RX480"
            class = "amd"

            [[devices]]
            uuid = "GPU-1"
            name = "RX480"
            class = "amd"
            enabled = false
            "#,
        )
        .unwrap();
        assert!(config.devices[0].enabled);
        assert!(!config.devices[1].enabled);
        assert_eq!(config.devices[0].class, DeviceClass::Amd);
    }

    #[test]
    fn schedule_is_sorted_by_time() {
        let config = Config::parse(
            r#"
            [[schedule]]
            after_secs = 30
            algorithm = "equihash"

            [[schedule]]
            algorithm = "sia"
            location = "usa"
            "#,
        )
        .unwrap();
        let schedule = config.sorted_schedule();
        assert_eq!(schedule[0].algorithm, AlgorithmType::Sia);
        assert_eq!(schedule[0].location.as_deref(), Some("usa"));
        assert_eq!(schedule[1].after_secs, 30);
    }

    #[test]
    fn rejects_unknown_algorithm_names() {
        let err = Config::parse(
            r#"
            [[schedule]]
            algorithm = "ethash"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, MinerError::ConfigError(_)));
    }

    #[test]
    fn rejects_duplicate_groups_and_empty_miners() {
        let err = Config::parse(
            r#"
            [[groups]]
            name = "a"
            devices = ["GPU-0"]

            [[groups]]
            name = "a"
            devices = ["GPU-1"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate group name"));

        let err = Config::parse(
            r#"
            [[miners]]
            name = "idle"
            class = "cpu"
            algorithms = []
            path = "/bin/true"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("lists no algorithms"));
    }
}
