//! Miner backed by an external executable
//!
//! Launches the configured program with templated arguments and forwards its
//! output to the debug log. Output parsing and hash-rate tracking are left to
//! the program's own reporting.

use crate::config::MinerConfig;
use crate::miner::worker::MinerWorker;
use crate::types::{ActiveAlgorithm, AlgorithmType};
use crate::utils::error::MinerError;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use sysinfo::{Pid, ProcessesToUpdate, Signal, System};

/// Poll interval while waiting for a terminated miner to exit
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Miner process wrapper around a configured executable
///
/// Argument templates may contain `{url}`, `{user}`, `{devices}` (comma
/// separated device identifiers) and `{algorithm}`.
pub struct ProcessMiner {
    name: String,
    path: PathBuf,
    args: Vec<String>,
    algorithms: Vec<AlgorithmType>,
    stop_grace: Duration,
    devices: Vec<String>,
    /// Polled from `is_running`, which only has `&self`
    child: Mutex<Option<Child>>,
    active: ActiveAlgorithm,
    ended: bool,
}

impl ProcessMiner {
    /// Creates a stopped miner from its config definition
    pub fn from_config(definition: &MinerConfig) -> Self {
        ProcessMiner {
            name: definition.name.clone(),
            path: definition.path.clone(),
            args: definition.args.clone(),
            algorithms: definition.algorithms.clone(),
            stop_grace: definition.stop_grace(),
            devices: Vec::new(),
            child: Mutex::new(None),
            active: ActiveAlgorithm::None,
            ended: false,
        }
    }

    fn child_slot(&mut self) -> &mut Option<Child> {
        self.child.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Command line arguments for one launch
    fn render_args(&self, algorithm: AlgorithmType, url: &str, worker_label: &str) -> Vec<String> {
        let devices = self.devices.join(",");
        let algorithm = algorithm.to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{url}", url)
                    .replace("{user}", worker_label)
                    .replace("{devices}", &devices)
                    .replace("{algorithm}", &algorithm)
            })
            .collect()
    }

    fn forward_output(name: &str, stream: impl Read + Send + 'static, tag: &'static str) {
        let name = name.to_string();
        std::thread::spawn(move || {
            for line in BufReader::new(stream).lines().map_while(Result::ok) {
                log::debug!("[{}]{} {}", name, tag, line);
            }
        });
    }
}

/// Asks the process to terminate; false when the signal could not be sent
fn request_exit(pid: u32) -> bool {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system
        .process(pid)
        .and_then(|process| process.kill_with(Signal::Term))
        .unwrap_or(false)
}

/// Waits up to `grace` for `child` to exit
fn wait_for_exit(child: &mut Child, grace: Duration) -> Result<Option<ExitStatus>, MinerError> {
    let deadline = Instant::now() + grace;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        std::thread::sleep(EXIT_POLL_INTERVAL);
    }
}

/// Kills `child` and reaps it so no zombie is left behind
fn kill_and_reap(name: &str, child: &mut Child) -> Result<ExitStatus, MinerError> {
    if let Err(e) = child.kill() {
        // already exited processes cannot be killed, only reaped
        if child.try_wait()?.is_none() {
            return Err(MinerError::ProcessError(format!(
                "Failed to kill {}: {}",
                name, e
            )));
        }
    }
    Ok(child.wait()?)
}

impl MinerWorker for ProcessMiner {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_running(&self) -> bool {
        let mut slot = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(child) = slot.as_mut() else {
            return false;
        };

        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                log::warn!("Miner {} exited on its own with {}", self.name, status);
                *slot = None;
                false
            }
            Err(e) => {
                log::warn!("Cannot poll miner {}: {}", self.name, e);
                true
            }
        }
    }

    fn active_algorithm(&self) -> ActiveAlgorithm {
        self.active
    }

    fn supports(&self, algorithm: AlgorithmType) -> bool {
        self.algorithms.contains(&algorithm)
    }

    fn assign_devices(&mut self, device_uuids: &[String]) {
        self.devices = device_uuids.to_vec();
    }

    fn start(
        &mut self,
        algorithm: AlgorithmType,
        url: &str,
        worker_label: &str,
    ) -> Result<(), MinerError> {
        if self.ended {
            return Err(MinerError::ProcessError(format!(
                "{} was ended and cannot be restarted",
                self.name
            )));
        }
        if self.is_running() {
            return Err(MinerError::ProcessError(format!(
                "{} is already running",
                self.name
            )));
        }

        let args = self.render_args(algorithm, url, worker_label);
        log::info!("Launching {} {}", self.path.display(), args.join(" "));

        let mut child = Command::new(&self.path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                MinerError::ProcessError(format!(
                    "Failed to spawn {} ({}): {}",
                    self.name,
                    self.path.display(),
                    e
                ))
            })?;

        if let Some(stdout) = child.stdout.take() {
            Self::forward_output(&self.name, stdout, "");
        }
        if let Some(stderr) = child.stderr.take() {
            Self::forward_output(&self.name, stderr, " [STDERR]");
        }

        *self.child_slot() = Some(child);
        self.active = ActiveAlgorithm::Mining(algorithm);
        Ok(())
    }

    /// Graceful stops send a terminate signal and give the process
    /// `stop_grace` to exit before killing it. Either way the process is
    /// reaped before returning.
    fn stop(&mut self, graceful: bool) -> Result<(), MinerError> {
        let Some(mut child) = self.child_slot().take() else {
            return Ok(());
        };

        if graceful && request_exit(child.id()) {
            if let Some(status) = wait_for_exit(&mut child, self.stop_grace)? {
                log::debug!("{} exited with {}", self.name, status);
                return Ok(());
            }
            log::warn!(
                "{} still running {} ms after terminate, killing it",
                self.name,
                self.stop_grace.as_millis()
            );
        }

        let status = kill_and_reap(&self.name, &mut child)?;
        log::debug!("{} killed, exit {}", self.name, status);
        Ok(())
    }

    fn end(&mut self) -> Result<(), MinerError> {
        self.stop(false)?;
        self.ended = true;
        self.active = ActiveAlgorithm::Invalid;
        Ok(())
    }
}

impl Drop for ProcessMiner {
    fn drop(&mut self) {
        if let Some(mut child) = self.child_slot().take() {
            let _ = kill_and_reap(&self.name, &mut child);
        }
    }
}
