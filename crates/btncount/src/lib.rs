//! # btncount
//!
//! Debounces a push-button on one digital input line and counts completed
//! press/release cycles, with a start/stop/reset control channel.
//!
//! ## Architecture
//!
//! - [`engine`] - level-based debounce/count state machine run from the
//!   edge notification context
//! - [`monitor`] - Monitor State behind a single lock, the control surface
//!   (`start`, `stop`, `current_count`) and the edge source lifecycle
//! - [`command`] - `start`/`stop` decoded from control bytes
//! - [`device`] - the read/write/open/close byte contract
//! - [`stats`] - lock-free diagnostics of what each notification did
//! - [`config`] and [`error`]
//!
//! ## Concurrency
//!
//! Both the control path and the notification path take the state lock
//! with one non-blocking attempt. Control callers get
//! [`BtnCountError::Busy`] and retry; notifications that lose the race are
//! dropped and counted in [`EngineStatsSnapshot::dropped_contended`].
//! `current_count` reads a word published under the lock and never
//! contends.
//!
//! ## Example
//!
//! ```rust
//! use btncount::prelude::*;
//! use btncount_gpio::{Level, PinId, SimulatedPlatform};
//! use std::sync::Arc;
//!
//! let pin = PinId::new(17);
//! let platform = Arc::new(SimulatedPlatform::new().with_line(pin, Level::High));
//! let device = ButtonDevice::register(Arc::clone(&platform), MonitorConfig::new(pin))?;
//!
//! let mut file = device.open();
//! file.write(b"start\n")?;
//!
//! // press, release
//! platform.set_level(pin, Level::Low).map_err(|e| e.to_string())?;
//! platform.set_level(pin, Level::High).map_err(|e| e.to_string())?;
//!
//! assert_eq!(file.read_to_string(), "1\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
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

pub mod command;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod state;
pub mod stats;

pub mod prelude;

pub use command::Command;
pub use config::{CONTROL_BUFFER_LEN, MonitorConfig, MonitorConfigBuilder};
pub use device::{ButtonDevice, DEVICE_NAME, DeviceFile, render_count};
pub use engine::{Anomaly, EdgeOutcome};
pub use error::{BtnCountError, BtnCountResult};
pub use monitor::ButtonMonitor;
pub use state::{MAX_COUNT, MonitorSnapshot, RunState};
pub use stats::{EngineStats, EngineStatsSnapshot};
