//! Lock-free engine diagnostics.
//!
//! Counters are bumped from the notification path after the monitor lock is
//! released, one `Relaxed` fetch-add each. They are diagnostics only: they
//! never feed back into counting and are not reset by `start`.

use core::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::engine::{Anomaly, EdgeOutcome};

/// Point-in-time copy of [`EngineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineStatsSnapshot {
    /// Press/release cycles counted.
    pub completed_cycles: u64,
    /// Presses latched.
    pub presses_latched: u64,
    /// Unexpected level/latch combinations.
    pub anomalies: u64,
    /// Notifications whose level read failed.
    pub failed_reads: u64,
    /// Notifications discarded because the state was busy.
    pub dropped_contended: u64,
    /// Notifications ignored because counting was stopped.
    pub ignored_stopped: u64,
}

impl EngineStatsSnapshot {
    /// Notifications seen in total.
    #[must_use]
    pub fn notifications(&self) -> u64 {
        [
            self.completed_cycles,
            self.presses_latched,
            self.anomalies,
            self.failed_reads,
            self.dropped_contended,
            self.ignored_stopped,
        ]
        .iter()
        .fold(0u64, |acc, n| acc.saturating_add(*n))
    }
}

/// Atomic counters describing what the engine did with each notification.
#[derive(Debug, Default)]
pub struct EngineStats {
    completed_cycles: AtomicU64,
    presses_latched: AtomicU64,
    anomalies: AtomicU64,
    failed_reads: AtomicU64,
    dropped_contended: AtomicU64,
    ignored_stopped: AtomicU64,
}

impl EngineStats {
    /// All counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            completed_cycles: AtomicU64::new(0),
            presses_latched: AtomicU64::new(0),
            anomalies: AtomicU64::new(0),
            failed_reads: AtomicU64::new(0),
            dropped_contended: AtomicU64::new(0),
            ignored_stopped: AtomicU64::new(0),
        }
    }

    /// Account for one notification.
    pub fn record(&self, outcome: EdgeOutcome) {
        let counter = match outcome {
            EdgeOutcome::Ignored => &self.ignored_stopped,
            EdgeOutcome::Latched => &self.presses_latched,
            EdgeOutcome::Counted(_) => &self.completed_cycles,
            EdgeOutcome::Anomaly(Anomaly::ReadFailed) => &self.failed_reads,
            EdgeOutcome::Anomaly(_) => &self.anomalies,
            EdgeOutcome::Dropped => &self.dropped_contended,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter.
    #[must_use]
    pub fn snapshot(&self) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            completed_cycles: self.completed_cycles.load(Ordering::Relaxed),
            presses_latched: self.presses_latched.load(Ordering::Relaxed),
            anomalies: self.anomalies.load(Ordering::Relaxed),
            failed_reads: self.failed_reads.load(Ordering::Relaxed),
            dropped_contended: self.dropped_contended.load(Ordering::Relaxed),
            ignored_stopped: self.ignored_stopped.load(Ordering::Relaxed),
        }
    }
}
