//! Miner stop and teardown rules
//!
//! Stopping a running miner is always followed by a settle delay so the
//! process can release device memory and handles before anything else
//! claims them. Teardown skips the delay.

use crate::miner::worker::MinerWorker;
use crate::utils::error::MinerError;
use std::sync::Arc;
use std::time::Duration;

/// Blocking wait used after a miner stops
pub trait Settle: Send + Sync {
    /// Blocks the calling thread for `delay`
    fn settle(&self, delay: Duration);
}

/// Settles by sleeping the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Settle for ThreadSleep {
    fn settle(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Stop/teardown operations shared by every miner of a group
#[derive(Clone)]
pub struct WorkerLifecycle {
    restart_delay: Duration,
    settle: Arc<dyn Settle>,
}

impl WorkerLifecycle {
    /// Creates a lifecycle waiting `restart_delay` after every stop
    pub fn new(restart_delay: Duration, settle: Arc<dyn Settle>) -> Self {
        WorkerLifecycle {
            restart_delay,
            settle,
        }
    }

    /// Stops `miner` if it is running, then waits the settle delay
    ///
    /// Returns whether a stop was actually issued. A stopped miner is left
    /// alone and no delay is taken.
    pub fn stop(&self, miner: &mut dyn MinerWorker, graceful: bool) -> Result<bool, MinerError> {
        if !miner.is_running() {
            return Ok(false);
        }

        log::info!(
            "Stopping miner {} ({})",
            miner.name(),
            miner.active_algorithm()
        );
        miner.stop(graceful)?;

        log::debug!(
            "Waiting {} ms for {} to release its devices",
            self.restart_delay.as_millis(),
            miner.name()
        );
        self.settle.settle(self.restart_delay);
        Ok(true)
    }

    /// Stops every miner in order
    ///
    /// Keeps going past failures and returns the first one.
    pub fn stop_all(&self, miners: &mut [Box<dyn MinerWorker>]) -> Result<(), MinerError> {
        let mut first_error = None;
        for miner in miners.iter_mut() {
            if let Err(e) = self.stop(miner.as_mut(), true) {
                log::error!("Failed to stop miner {}: {}", miner.name(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Tears down every miner without settling
    ///
    /// Keeps going past failures and returns the first one.
    pub fn end_all(&self, miners: &mut [Box<dyn MinerWorker>]) -> Result<(), MinerError> {
        let mut first_error = None;
        for miner in miners.iter_mut() {
            log::debug!("Ending miner {}", miner.name());
            if let Err(e) = miner.end() {
                log::error!("Failed to end miner {}: {}", miner.name(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::testing::{EventLog, FakeMiner, MinerEvent, RecordingSettle};
    use crate::types::AlgorithmType;

    const DELAY: Duration = Duration::from_millis(500);

    fn lifecycle(log: &EventLog) -> WorkerLifecycle {
        WorkerLifecycle::new(DELAY, Arc::new(RecordingSettle::new(log.clone())))
    }

    #[test]
    fn stop_waits_after_stopping_a_running_miner() {
        let log = EventLog::default();
        let mut miner = FakeMiner::new("ccminer", &[AlgorithmType::X11], &log);
        miner
            .start(AlgorithmType::X11, "stratum+tcp://x11.eu.nicehash.com:3336", "w")
            .unwrap();
        log.clear();

        assert!(lifecycle(&log).stop(&mut miner, true).unwrap());
        assert_eq!(
            log.events(),
            vec![
                MinerEvent::Stop {
                    miner: "ccminer".into(),
                    graceful: true
                },
                MinerEvent::Settle(DELAY),
            ]
        );
        assert!(!miner.is_running());
    }

    #[test]
    fn stop_on_stopped_miner_is_a_noop() {
        let log = EventLog::default();
        let mut miner = FakeMiner::new("ccminer", &[AlgorithmType::X11], &log);

        assert!(!lifecycle(&log).stop(&mut miner, true).unwrap());
        assert!(log.events().is_empty());
    }

    #[test]
    fn end_all_tears_down_without_settling() {
        let log = EventLog::default();
        let mut miners: Vec<Box<dyn MinerWorker>> = vec![
            Box::new(FakeMiner::new("a", &[AlgorithmType::X11], &log)),
            Box::new(FakeMiner::new("b", &[AlgorithmType::Sia], &log)),
        ];
        miners[1]
            .start(AlgorithmType::Sia, "stratum+tcp://sia.eu.nicehash.com:3360", "w")
            .unwrap();
        log.clear();

        lifecycle(&log).end_all(&mut miners).unwrap();
        assert_eq!(
            log.events(),
            vec![
                MinerEvent::End { miner: "a".into() },
                MinerEvent::End { miner: "b".into() },
            ]
        );
    }

    #[test]
    fn stop_all_continues_after_a_failure() {
        let log = EventLog::default();
        let mut failing = FakeMiner::new("a", &[AlgorithmType::X11], &log);
        failing
            .start(AlgorithmType::X11, "stratum+tcp://x11.eu.nicehash.com:3336", "w")
            .unwrap();
        failing.fail_stop();
        let mut healthy = FakeMiner::new("b", &[AlgorithmType::Sia], &log);
        healthy
            .start(AlgorithmType::Sia, "stratum+tcp://sia.eu.nicehash.com:3360", "w")
            .unwrap();
        let mut miners: Vec<Box<dyn MinerWorker>> = vec![Box::new(failing), Box::new(healthy)];
        log.clear();

        let err = lifecycle(&log).stop_all(&mut miners).unwrap_err();
        assert!(matches!(err, MinerError::ProcessError(_)));
        assert!(!miners[1].is_running());
        assert_eq!(log.count_settles(), 1);
    }
}
