//! The GPIO capability trait.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::GpioResult;
use crate::types::{Level, NotificationHandle, PinId};

/// Callback invoked from the notification context on every edge.
///
/// The handler receives no arguments; it is expected to read the line level
/// itself, as an interrupt handler would.
pub type EdgeHandler = Arc<dyn Fn() + Send + Sync>;

/// Access to digital input lines and their edge notification sources.
///
/// Implementations must deliver notifications on a context other than the
/// caller of [`subscribe`](Self::subscribe), and at most one handler per
/// subscription may run at a time.
pub trait GpioPlatform: Send + Sync {
    /// Whether `pin` names a usable input line.
    fn is_valid(&self, pin: PinId) -> bool;

    /// Read the instantaneous level of `pin`.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown or the backend read fails.
    fn read_level(&self, pin: PinId) -> GpioResult<Level>;

    /// Bind an edge notification source (both edges) on `pin` to `handler`.
    ///
    /// # Errors
    ///
    /// Returns [`GpioError::NoInterrupt`](crate::GpioError::NoInterrupt) if the
    /// line cannot notify, or another error if the source cannot be bound.
    fn subscribe(&self, pin: PinId, handler: EdgeHandler) -> GpioResult<NotificationHandle>;

    /// Disable the source bound under `handle`.
    ///
    /// Returns only after every handler invocation admitted under `handle`
    /// has finished. Unknown handles are ignored.
    fn unsubscribe(&self, handle: NotificationHandle);
}

impl<T: GpioPlatform + ?Sized> GpioPlatform for Arc<T> {
    fn is_valid(&self, pin: PinId) -> bool {
        (**self).is_valid(pin)
    }

    fn read_level(&self, pin: PinId) -> GpioResult<Level> {
        (**self).read_level(pin)
    }

    fn subscribe(&self, pin: PinId, handler: EdgeHandler) -> GpioResult<NotificationHandle> {
        (**self).subscribe(pin, handler)
    }

    fn unsubscribe(&self, handle: NotificationHandle) {
        (**self).unsubscribe(handle);
    }
}

/// Hands out unique subscription handles.
#[derive(Debug)]
pub(crate) struct HandleAllocator {
    next: AtomicU64,
}

impl HandleAllocator {
    pub(crate) const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub(crate) fn allocate(&self) -> NotificationHandle {
        NotificationHandle::from_raw(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
