//! Control/Query Surface and notification-source lifecycle.
//!
//! [`ButtonMonitor`] owns the Monitor State behind one mutex and exposes the
//! only operations allowed to touch it. The two contexts acquire it
//! differently:
//!
//! - **Control** (`start`, `stop`) makes a single `try_lock` attempt and
//!   fails with [`BtnCountError::Busy`] on contention. It never queues.
//! - **Notification** (the edge handler) also makes a single `try_lock`
//!   attempt and drops the event when the state is held. A dropped event can
//!   only undercount; it can never stall the notification context.
//! - **Query** (`current_count`, `run_state`) reads a word published under
//!   the lock and never takes it, so queries cannot cause dropped events.
//!
//! `start` binds the edge source and seeds the latch while holding the
//! lock, so any firing it acts on happens after it returns. `stop` releases
//! the source while holding the lock and the platform drains in-flight
//! handlers before returning; those handlers see the lock held and drop out.

use std::fmt;
use std::sync::{Arc, Weak};

use btncount_gpio::{EdgeHandler, GpioPlatform, PinId, Polarity};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::config::MonitorConfig;
use crate::engine::{self, EdgeOutcome};
use crate::error::{BtnCountError, BtnCountResult};
use crate::state::{MonitorSnapshot, MonitorState, PublishedCount, Run, RunState};
use crate::stats::{EngineStats, EngineStatsSnapshot};

struct Shared<P> {
    pin: PinId,
    polarity: Polarity,
    platform: P,
    state: Mutex<MonitorState>,
    published: PublishedCount,
    stats: EngineStats,
}

impl<P: GpioPlatform> Shared<P> {
    /// Notification-context entry point.
    fn handle_edge(&self) -> EdgeOutcome {
        let outcome = match self.state.try_lock() {
            Some(mut state) => {
                let outcome = engine::on_edge(&mut state, self.pin, self.polarity, || {
                    self.platform.read_level(self.pin)
                });
                if let EdgeOutcome::Counted(_) = outcome {
                    self.published.publish(&state);
                }
                outcome
            }
            None => {
                warn!(pin = %self.pin, "monitor state busy; notification dropped");
                EdgeOutcome::Dropped
            }
        };
        self.stats.record(outcome);
        outcome
    }
}

/// Debounced press counter for one input line.
///
/// Dropping the monitor releases the edge source.
pub struct ButtonMonitor<P: GpioPlatform + 'static> {
    shared: Arc<Shared<P>>,
}

impl<P: GpioPlatform + 'static> fmt::Debug for ButtonMonitor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonMonitor")
            .field("pin", &self.shared.pin)
            .field("polarity", &self.shared.polarity)
            .finish_non_exhaustive()
    }
}

impl<P: GpioPlatform + 'static> ButtonMonitor<P> {
    /// Create a stopped monitor for `config.pin`.
    ///
    /// # Errors
    ///
    /// Returns [`BtnCountError::Configuration`] if the platform does not
    /// know the line.
    pub fn new(platform: P, config: MonitorConfig) -> BtnCountResult<Self> {
        if !platform.is_valid(config.pin) {
            return Err(BtnCountError::configuration(format!(
                "{} is not a valid input line",
                config.pin
            )));
        }
        Ok(Self {
            shared: Arc::new(Shared {
                pin: config.pin,
                polarity: config.polarity,
                platform,
                state: Mutex::new(MonitorState::new()),
                published: PublishedCount::new(),
                stats: EngineStats::new(),
            }),
        })
    }

    /// Start counting, or reset the count to zero if already counting.
    ///
    /// From `Stopped`, binds the edge source, seeds the latch from the
    /// current level and zeroes the count. From `Running`, only the count is
    /// zeroed; the subscription and latch are kept.
    ///
    /// # Errors
    ///
    /// - [`BtnCountError::Busy`] if the state is held by another operation
    /// - [`BtnCountError::Subscription`] if the edge source cannot be bound
    ///   or the line cannot be read to seed the latch; the monitor stays
    ///   stopped with count and latch untouched
    pub fn start(&self) -> BtnCountResult<()> {
        let shared = &self.shared;
        let mut state = shared.state.try_lock().ok_or(BtnCountError::Busy)?;

        if let Run::Running { .. } = state.run {
            state.count = 0;
            shared.published.publish(&state);
            info!(pin = %shared.pin, "count reset");
            return Ok(());
        }

        let handle = shared
            .platform
            .subscribe(shared.pin, edge_handler(Arc::downgrade(shared)))
            .map_err(|e| BtnCountError::subscription(shared.pin, e))?;

        let level = match shared.platform.read_level(shared.pin) {
            Ok(level) => level,
            Err(e) => {
                shared.platform.unsubscribe(handle);
                return Err(BtnCountError::subscription(shared.pin, e));
            }
        };

        state.level_latched = shared.polarity.is_asserted(level);
        state.count = 0;
        state.run = Run::Running { handle };
        shared.published.publish(&state);
        info!(pin = %shared.pin, %handle, %level, "counting started");
        Ok(())
    }

    /// Stop counting. The last count stays in the state.
    ///
    /// Stopping a stopped monitor succeeds without effect.
    ///
    /// # Errors
    ///
    /// Returns [`BtnCountError::Busy`] if the state is held by another
    /// operation.
    pub fn stop(&self) -> BtnCountResult<()> {
        let shared = &self.shared;
        let mut state = shared.state.try_lock().ok_or(BtnCountError::Busy)?;
        if let Run::Running { handle } = state.run {
            shared.platform.unsubscribe(handle);
            state.run = Run::Stopped;
            shared.published.publish(&state);
            info!(pin = %shared.pin, %handle, count = state.count, "counting stopped");
        } else {
            debug!(pin = %shared.pin, "stop while already stopped");
        }
        Ok(())
    }

    /// Run a decoded control command.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start) and [`stop`](Self::stop).
    pub fn execute(&self, command: Command) -> BtnCountResult<()> {
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
        }
    }

    /// The count while running, `None` while stopped.
    ///
    /// Lock-free; never observes a torn count/state pair.
    #[must_use]
    pub fn current_count(&self) -> Option<u64> {
        self.shared.published.load()
    }

    /// Current run state. Lock-free.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        match self.current_count() {
            Some(_) => RunState::Running,
            None => RunState::Stopped,
        }
    }

    /// A consistent copy of the whole Monitor State.
    ///
    /// Takes the lock briefly; a notification arriving meanwhile is dropped.
    #[must_use]
    pub fn snapshot(&self) -> MonitorSnapshot {
        self.shared.state.lock().snapshot(self.shared.pin)
    }

    /// Engine diagnostics.
    #[must_use]
    pub fn stats(&self) -> EngineStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// The monitored line.
    #[must_use]
    pub fn pin(&self) -> PinId {
        self.shared.pin
    }

    /// Configured polarity.
    #[must_use]
    pub fn polarity(&self) -> Polarity {
        self.shared.polarity
    }

    /// The platform the monitor reads from.
    #[must_use]
    pub fn platform(&self) -> &P {
        &self.shared.platform
    }

    /// Deliver one notification as the platform would.
    ///
    /// Useful for platforms that cannot call back on their own.
    pub fn notify_edge(&self) -> EdgeOutcome {
        self.shared.handle_edge()
    }
}

fn edge_handler<P: GpioPlatform + 'static>(shared: Weak<Shared<P>>) -> EdgeHandler {
    Arc::new(move || {
        if let Some(shared) = shared.upgrade() {
            shared.handle_edge();
        }
    })
}

impl<P: GpioPlatform + 'static> Drop for ButtonMonitor<P> {
    fn drop(&mut self) {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        if let Run::Running { handle } = state.run {
            shared.platform.unsubscribe(handle);
            state.run = Run::Stopped;
            shared.published.publish(&state);
            debug!(pin = %shared.pin, %handle, "edge source released on drop");
        }
    }
}
