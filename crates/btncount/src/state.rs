//! Monitor State: the single record shared by the control surface and the
//! notification path.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use btncount_gpio::{NotificationHandle, PinId};
use serde::{Deserialize, Serialize};

/// Highest count a monitor reaches; further cycles leave it there.
pub const MAX_COUNT: u64 = u64::MAX - 1;

/// Whether edge notifications are acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Not counting; notifications are ignored.
    #[default]
    Stopped,
    /// Counting.
    Running,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
        })
    }
}

/// Run state with the subscription it owns.
///
/// Holding the handle inside `Running` makes "handle present iff running"
/// true by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Run {
    Stopped,
    Running { handle: NotificationHandle },
}

/// Mutable part of the Monitor State. Only ever touched under the monitor
/// lock.
#[derive(Debug)]
pub(crate) struct MonitorState {
    pub(crate) run: Run,
    pub(crate) level_latched: bool,
    pub(crate) count: u64,
}

impl MonitorState {
    pub(crate) const fn new() -> Self {
        Self {
            run: Run::Stopped,
            level_latched: false,
            count: 0,
        }
    }

    pub(crate) fn run_state(&self) -> RunState {
        match self.run {
            Run::Stopped => RunState::Stopped,
            Run::Running { .. } => RunState::Running,
        }
    }

    pub(crate) fn handle(&self) -> Option<NotificationHandle> {
        match self.run {
            Run::Stopped => None,
            Run::Running { handle } => Some(handle),
        }
    }

    pub(crate) fn snapshot(&self, pin: PinId) -> MonitorSnapshot {
        MonitorSnapshot {
            pin,
            run_state: self.run_state(),
            subscribed: self.handle().is_some(),
            level_latched: self.level_latched,
            count: self.count,
        }
    }
}

/// Lock-free copy of what a query reports, in one word.
///
/// `0` means stopped; `n + 1` means running with count `n`. Written only
/// under the monitor lock, after the state it mirrors has been updated.
/// The engine never counts past [`MAX_COUNT`], so the encoding cannot wrap.
#[derive(Debug)]
pub(crate) struct PublishedCount(AtomicU64);

impl PublishedCount {
    const STOPPED: u64 = 0;

    pub(crate) const fn new() -> Self {
        Self(AtomicU64::new(Self::STOPPED))
    }

    pub(crate) fn publish(&self, state: &MonitorState) {
        let word = match state.run {
            Run::Stopped => Self::STOPPED,
            Run::Running { .. } => state.count.saturating_add(1),
        };
        self.0.store(word, Ordering::Release);
    }

    pub(crate) fn load(&self) -> Option<u64> {
        match self.0.load(Ordering::Acquire) {
            Self::STOPPED => None,
            word => Some(word.saturating_sub(1)),
        }
    }
}

/// A consistent copy of the Monitor State, taken under the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    /// The monitored line.
    pub pin: PinId,
    /// Current run state.
    pub run_state: RunState,
    /// Whether an edge subscription is held.
    pub subscribed: bool,
    /// Whether a press has been seen and not yet released.
    pub level_latched: bool,
    /// Completed press/release cycles since the last start.
    pub count: u64,
}

impl MonitorSnapshot {
    /// The value a query reports: the count while running, `None` otherwise.
    #[must_use]
    pub fn current_count(&self) -> Option<u64> {
        match self.run_state {
            RunState::Running => Some(self.count),
            RunState::Stopped => None,
        }
    }
}
