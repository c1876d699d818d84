//! Thread-per-group command loop
//!
//! Each device group is driven by its own thread, which owns the group's
//! [`GroupMiners`] and applies [`SwitchCommand`]s in arrival order. That
//! gives every group the serialized access the switcher expects while
//! letting different groups settle and restart in parallel.

use crate::miner::switcher::GroupMiners;
use crate::types::AlgorithmType;
use crate::utils::error::MinerError;
use crossbeam_channel::{Receiver, Sender};
use std::thread::JoinHandle;

/// Request sent to a group thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchCommand {
    /// Mine `algorithm` at `location` as `worker_label`
    Start {
        /// Requested algorithm
        algorithm: AlgorithmType,
        /// Mining location, e.g. "eu"
        location: String,
        /// Pool identity of the rig
        worker_label: String,
    },
    /// Stop every miner of the group, keeping them cached
    Stop,
    /// Tear the group down and exit the thread
    End,
}

struct GroupHandle {
    label: String,
    commands: Sender<SwitchCommand>,
    thread: JoinHandle<()>,
}

/// Owns the group threads and their command channels
#[derive(Default)]
pub struct GroupScheduler {
    groups: Vec<GroupHandle>,
}

impl GroupScheduler {
    /// Creates a scheduler with no groups
    pub fn new() -> Self {
        GroupScheduler::default()
    }

    /// Moves `miners` onto a new thread and starts serving commands for it
    pub fn spawn_group(&mut self, miners: GroupMiners) {
        let label = miners.display_label().to_string();
        let (commands, receiver) = crossbeam_channel::unbounded();
        let thread = std::thread::spawn(move || run_group(miners, receiver));

        log::debug!("Spawned group thread for {}", label);
        self.groups.push(GroupHandle {
            label,
            commands,
            thread,
        });
    }

    /// Number of groups being driven
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no group has been spawned
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sends `command` to every group
    pub fn broadcast(&self, command: &SwitchCommand) -> Result<(), MinerError> {
        for group in &self.groups {
            group.commands.send(command.clone())?;
        }
        Ok(())
    }

    /// Ends every group and waits for the threads to exit
    pub fn shutdown(self) -> Result<(), MinerError> {
        for group in &self.groups {
            // the thread ends its miners when the channel closes anyway
            let _ = group.commands.send(SwitchCommand::End);
        }

        let mut panicked = Vec::new();
        for group in self.groups {
            drop(group.commands);
            if group.thread.join().is_err() {
                panicked.push(group.label);
            }
        }

        if panicked.is_empty() {
            Ok(())
        } else {
            Err(MinerError::ChannelError(format!(
                "Group threads panicked: {}",
                panicked.join(", ")
            )))
        }
    }
}

/// Applies commands until `End` or until every sender is gone
fn run_group(mut miners: GroupMiners, commands: Receiver<SwitchCommand>) {
    for command in commands.iter() {
        match command {
            SwitchCommand::Start {
                algorithm,
                location,
                worker_label,
            } => match miners.start_algorithm(algorithm, &location, &worker_label) {
                Ok(outcome) => {
                    log::debug!("{}: {} -> {:?}", miners.display_label(), algorithm, outcome)
                }
                Err(MinerError::WorkerCreationUnsupported { class, algorithm }) => log::warn!(
                    "{}: no {} miner for {}, keeping current miner",
                    miners.display_label(),
                    class,
                    algorithm
                ),
                Err(e) => log::error!(
                    "{}: switch to {} failed: {}",
                    miners.display_label(),
                    algorithm,
                    e
                ),
            },
            SwitchCommand::Stop => {
                if let Err(e) = miners.stop() {
                    log::error!("{}: stop failed: {}", miners.display_label(), e);
                }
            }
            SwitchCommand::End => break,
        }
    }

    if let Err(e) = miners.end() {
        log::error!("{}: teardown failed: {}", miners.display_label(), e);
    }
}
