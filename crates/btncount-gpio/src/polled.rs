//! Edge notifications synthesized by sampling a line on a worker thread.
//!
//! Each subscription owns one named worker thread. The worker samples the
//! line every `poll_interval` and invokes the handler whenever the sampled
//! level differs from the previous sample. Handlers therefore always run on
//! the worker, never on the thread that subscribed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{GpioError, GpioResult};
use crate::platform::{EdgeHandler, GpioPlatform, HandleAllocator};
use crate::types::{Level, NotificationHandle, PinId};

/// Default sampling period of a polled subscription.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A set of lines that can be read on demand.
pub trait LineSource: Send + Sync + 'static {
    /// Whether `pin` names a readable line.
    fn is_valid(&self, pin: PinId) -> bool;

    /// Whether `pin` may be used as an edge source.
    fn supports_edges(&self, pin: PinId) -> bool;

    /// Read the instantaneous level of `pin`.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be read.
    fn read_level(&self, pin: PinId) -> GpioResult<Level>;

    /// Prepare `pin` for edge delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the line refuses edge configuration.
    fn arm_edges(&self, _pin: PinId) -> GpioResult<()> {
        Ok(())
    }

    /// Undo [`arm_edges`](Self::arm_edges). Failures are only logged.
    fn disarm_edges(&self, _pin: PinId) {}
}

struct Worker {
    pin: PinId,
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// A [`GpioPlatform`] that turns level sampling into edge notifications.
pub struct PolledPlatform<S: LineSource> {
    source: Arc<S>,
    poll_interval: Duration,
    workers: Mutex<HashMap<NotificationHandle, Worker>>,
    handles: HandleAllocator,
}

impl<S: LineSource> fmt::Debug for PolledPlatform<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolledPlatform")
            .field("poll_interval", &self.poll_interval)
            .field("subscriptions", &self.workers.lock().len())
            .finish_non_exhaustive()
    }
}

impl<S: LineSource> PolledPlatform<S> {
    /// Create a platform over `source` sampling at [`DEFAULT_POLL_INTERVAL`].
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_poll_interval(source, DEFAULT_POLL_INTERVAL)
    }

    /// Create a platform with an explicit sampling period.
    ///
    /// A zero period is raised to one microsecond so the worker yields.
    #[must_use]
    pub fn with_poll_interval(source: S, poll_interval: Duration) -> Self {
        Self {
            source: Arc::new(source),
            poll_interval: poll_interval.max(Duration::from_micros(1)),
            workers: Mutex::new(HashMap::new()),
            handles: HandleAllocator::new(),
        }
    }

    /// The underlying line source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The sampling period.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn subscriptions(&self) -> usize {
        self.workers.lock().len()
    }

    fn stop_worker(&self, handle: NotificationHandle, worker: Worker) {
        worker.stop.store(true, Ordering::Release);
        if worker.thread.thread().id() == thread::current().id() {
            // Called from the handler itself; the loop exits on its own.
            warn!(pin = %worker.pin, %handle, "unsubscribe from notification context; not draining");
        } else if worker.thread.join().is_err() {
            warn!(pin = %worker.pin, %handle, "notification worker panicked");
        }
        self.source.disarm_edges(worker.pin);
        debug!(pin = %worker.pin, %handle, "polled edge source released");
    }
}

fn sample_loop<S: LineSource>(
    source: &S,
    pin: PinId,
    mut last: Level,
    interval: Duration,
    stop: &AtomicBool,
    handler: &EdgeHandler,
) {
    while !stop.load(Ordering::Acquire) {
        thread::sleep(interval);
        if stop.load(Ordering::Acquire) {
            break;
        }
        match source.read_level(pin) {
            Ok(level) if level != last => {
                last = level;
                handler();
            }
            Ok(_) => {}
            Err(e) => warn!(%pin, error = %e, "sampling failed"),
        }
    }
}

impl<S: LineSource> GpioPlatform for PolledPlatform<S> {
    fn is_valid(&self, pin: PinId) -> bool {
        self.source.is_valid(pin)
    }

    fn read_level(&self, pin: PinId) -> GpioResult<Level> {
        self.source.read_level(pin)
    }

    fn subscribe(&self, pin: PinId, handler: EdgeHandler) -> GpioResult<NotificationHandle> {
        if !self.source.is_valid(pin) {
            return Err(GpioError::InvalidPin(pin));
        }
        if !self.source.supports_edges(pin) {
            return Err(GpioError::NoInterrupt(pin));
        }

        let mut workers = self.workers.lock();
        if workers.values().any(|w| w.pin == pin) {
            return Err(GpioError::AlreadySubscribed(pin));
        }

        self.source.arm_edges(pin)?;
        let initial = match self.source.read_level(pin) {
            Ok(level) => level,
            Err(e) => {
                self.source.disarm_edges(pin);
                return Err(e);
            }
        };

        let stop = Arc::new(AtomicBool::new(false));
        let source = Arc::clone(&self.source);
        let interval = self.poll_interval;
        let worker_stop = Arc::clone(&stop);
        let spawned = thread::Builder::new()
            .name(format!("btncount-{pin}"))
            .spawn(move || sample_loop(&*source, pin, initial, interval, &worker_stop, &handler));

        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                self.source.disarm_edges(pin);
                return Err(GpioError::Worker {
                    pin,
                    reason: e.to_string(),
                });
            }
        };

        let handle = self.handles.allocate();
        workers.insert(handle, Worker { pin, stop, thread });
        debug!(%pin, %handle, interval_us = interval.as_micros(), "polled edge source bound");
        Ok(handle)
    }

    fn unsubscribe(&self, handle: NotificationHandle) {
        let worker = self.workers.lock().remove(&handle);
        if let Some(worker) = worker {
            self.stop_worker(handle, worker);
        }
    }
}

impl<S: LineSource> Drop for PolledPlatform<S> {
    fn drop(&mut self) {
        let workers: Vec<_> = self.workers.lock().drain().collect();
        for (handle, worker) in workers {
            self.stop_worker(handle, worker);
        }
    }
}
