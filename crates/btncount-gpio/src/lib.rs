//! # btncount-gpio
//!
//! The digital input capability consumed by the button counter: read the
//! instantaneous level of a line, bind an edge notification source to it and
//! release that source again.
//!
//! ## Backends
//!
//! - [`SimulatedPlatform`] - lines driven from code; notifications are
//!   delivered synchronously on the thread that changes the level
//! - [`PolledPlatform`] - samples a [`LineSource`] on a dedicated worker
//!   thread per subscription and fires on every level change
//! - [`SysfsLines`] - Linux `/sys/class/gpio` line source
//! - [`HalLine`] - any `embedded-hal` [`InputPin`](embedded_hal::digital::InputPin)
//!   as a line source
//!
//! ## Notification contract
//!
//! Handlers run in the platform's notification context, never on the
//! caller of [`GpioPlatform::subscribe`]. [`GpioPlatform::unsubscribe`] is a
//! synchronous drain: once it returns, no handler admitted under that handle
//! is still running.
//!
//! ## Example
//!
//! ```rust
//! use btncount_gpio::prelude::*;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! let pin = PinId::new(17);
//! let platform = SimulatedPlatform::new().with_line(pin, Level::High);
//!
//! let fired = Arc::new(AtomicU32::new(0));
//! let seen = Arc::clone(&fired);
//! let handle = platform
//!     .subscribe(pin, Arc::new(move || {
//!         seen.fetch_add(1, Ordering::Relaxed);
//!     }))
//!     .map_err(|e| e.to_string())?;
//!
//! platform.set_level(pin, Level::Low).map_err(|e| e.to_string())?;
//! platform.unsubscribe(handle);
//! platform.set_level(pin, Level::High).map_err(|e| e.to_string())?;
//!
//! assert_eq!(fired.load(Ordering::Relaxed), 1);
//! # Ok::<(), String>(())
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod hal;
pub mod platform;
pub mod polled;
pub mod simulated;
pub mod sysfs;
pub mod types;

pub mod prelude;

pub use error::{GpioError, GpioResult};
pub use hal::HalLine;
pub use platform::{EdgeHandler, GpioPlatform};
pub use polled::{LineSource, PolledPlatform, DEFAULT_POLL_INTERVAL};
pub use simulated::{SimulatedPlatform, SubscribeHook};
pub use sysfs::{SysfsLines, DEFAULT_SYSFS_ROOT};
pub use types::{Level, NotificationHandle, PinId, Polarity};
