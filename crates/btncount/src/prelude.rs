//! Prelude for btncount.
//!
//! Re-exports the types needed to register a device and drive it.

pub use crate::command::Command;
pub use crate::config::{CONTROL_BUFFER_LEN, MonitorConfig};
pub use crate::device::{ButtonDevice, DeviceFile};
pub use crate::engine::{Anomaly, EdgeOutcome};
pub use crate::error::{BtnCountError, BtnCountResult};
pub use crate::monitor::ButtonMonitor;
pub use crate::state::{MonitorSnapshot, RunState};
pub use crate::stats::EngineStatsSnapshot;
