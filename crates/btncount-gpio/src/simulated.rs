//! In-process GPIO platform driven from code.
//!
//! Levels are changed with [`SimulatedPlatform::set_level`]; a change on a
//! subscribed line invokes its handler on the calling thread, which plays the
//! role of the interrupt context. Firings hold a shared delivery guard that
//! [`GpioPlatform::unsubscribe`] takes exclusively, so unsubscribing drains
//! in-flight handlers before it returns.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::error::{GpioError, GpioResult};
use crate::platform::{EdgeHandler, GpioPlatform, HandleAllocator};
use crate::types::{Level, NotificationHandle, PinId};

/// Hook run at the start of every [`GpioPlatform::subscribe`] call.
///
/// Tests use it to stall a subscription and observe contention.
pub type SubscribeHook = Arc<dyn Fn(PinId) + Send + Sync>;

struct SimLine {
    level: Level,
    interrupt_capable: bool,
    failing_reads: bool,
    subscription: Option<(NotificationHandle, EdgeHandler)>,
}

impl SimLine {
    fn new(level: Level, interrupt_capable: bool) -> Self {
        Self {
            level,
            interrupt_capable,
            failing_reads: false,
            subscription: None,
        }
    }
}

/// A GPIO platform whose lines live in memory.
pub struct SimulatedPlatform {
    lines: Mutex<HashMap<PinId, SimLine>>,
    delivery: RwLock<()>,
    subscribe_hook: Mutex<Option<SubscribeHook>>,
    handles: HandleAllocator,
    delivered: AtomicU64,
}

impl fmt::Debug for SimulatedPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedPlatform")
            .field("lines", &self.lines.lock().len())
            .field("delivered", &self.delivered.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPlatform {
    /// Create a platform with no lines.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(HashMap::new()),
            delivery: RwLock::new(()),
            subscribe_hook: Mutex::new(None),
            handles: HandleAllocator::new(),
            delivered: AtomicU64::new(0),
        }
    }

    /// Add an interrupt-capable line at `level`.
    #[must_use]
    pub fn with_line(self, pin: PinId, level: Level) -> Self {
        self.add_line(pin, level, true);
        self
    }

    /// Add a line that can be read but cannot notify.
    #[must_use]
    pub fn with_polled_only_line(self, pin: PinId, level: Level) -> Self {
        self.add_line(pin, level, false);
        self
    }

    /// Add or replace a line. Replacing drops any subscription on it.
    pub fn add_line(&self, pin: PinId, level: Level, interrupt_capable: bool) {
        self.lines
            .lock()
            .insert(pin, SimLine::new(level, interrupt_capable));
    }

    /// Drive `pin` to `level`, firing its handler if the level changed.
    ///
    /// Returns whether a notification was delivered.
    ///
    /// # Errors
    ///
    /// Returns [`GpioError::InvalidPin`] for an unknown line.
    pub fn set_level(&self, pin: PinId, level: Level) -> GpioResult<bool> {
        let changed = {
            let mut lines = self.lines.lock();
            let line = lines.get_mut(&pin).ok_or(GpioError::InvalidPin(pin))?;
            let changed = line.level != level;
            line.level = level;
            changed
        };
        if changed {
            Ok(self.fire(pin))
        } else {
            Ok(false)
        }
    }

    /// Deliver a notification on `pin` without changing its level, as a
    /// noisy line or a double-triggering controller would.
    ///
    /// Returns whether a handler was invoked.
    pub fn fire(&self, pin: PinId) -> bool {
        let _delivery = self.delivery.read();
        let handler = self
            .lines
            .lock()
            .get(&pin)
            .and_then(|line| line.subscription.as_ref().map(|(_, h)| Arc::clone(h)));
        match handler {
            Some(handler) => {
                trace!(%pin, "delivering simulated edge");
                self.delivered.fetch_add(1, Ordering::Relaxed);
                handler();
                true
            }
            None => false,
        }
    }

    /// Make reads of `pin` fail (or succeed again).
    ///
    /// # Errors
    ///
    /// Returns [`GpioError::InvalidPin`] for an unknown line.
    pub fn set_failing_reads(&self, pin: PinId, failing: bool) -> GpioResult<()> {
        let mut lines = self.lines.lock();
        let line = lines.get_mut(&pin).ok_or(GpioError::InvalidPin(pin))?;
        line.failing_reads = failing;
        Ok(())
    }

    /// Install a hook run at the start of each subscribe call.
    pub fn set_subscribe_hook(&self, hook: Option<SubscribeHook>) {
        *self.subscribe_hook.lock() = hook;
    }

    /// Whether `pin` currently has an edge subscription.
    #[must_use]
    pub fn is_subscribed(&self, pin: PinId) -> bool {
        self.lines
            .lock()
            .get(&pin)
            .is_some_and(|line| line.subscription.is_some())
    }

    /// Total notifications delivered to handlers.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

impl GpioPlatform for SimulatedPlatform {
    fn is_valid(&self, pin: PinId) -> bool {
        self.lines.lock().contains_key(&pin)
    }

    fn read_level(&self, pin: PinId) -> GpioResult<Level> {
        let lines = self.lines.lock();
        let line = lines.get(&pin).ok_or(GpioError::InvalidPin(pin))?;
        if line.failing_reads {
            return Err(GpioError::read_failed(pin, "simulated read fault"));
        }
        Ok(line.level)
    }

    fn subscribe(&self, pin: PinId, handler: EdgeHandler) -> GpioResult<NotificationHandle> {
        let hook = self.subscribe_hook.lock().clone();
        if let Some(hook) = hook {
            hook(pin);
        }

        let mut lines = self.lines.lock();
        let line = lines.get_mut(&pin).ok_or(GpioError::InvalidPin(pin))?;
        if !line.interrupt_capable {
            return Err(GpioError::NoInterrupt(pin));
        }
        if line.subscription.is_some() {
            return Err(GpioError::AlreadySubscribed(pin));
        }
        let handle = self.handles.allocate();
        line.subscription = Some((handle, handler));
        trace!(%pin, %handle, "simulated edge source bound");
        Ok(handle)
    }

    fn unsubscribe(&self, handle: NotificationHandle) {
        let _drain = self.delivery.write();
        let mut lines = self.lines.lock();
        for (pin, line) in lines.iter_mut() {
            if line
                .subscription
                .as_ref()
                .is_some_and(|(bound, _)| *bound == handle)
            {
                line.subscription = None;
                trace!(%pin, %handle, "simulated edge source released");
            }
        }
    }
}
