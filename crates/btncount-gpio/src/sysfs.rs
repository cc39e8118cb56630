//! Linux sysfs GPIO lines (`/sys/class/gpio/gpioN`).
//!
//! A line is valid when its `value` attribute exists and edge-capable when
//! its `edge` attribute exists; the kernel only creates `edge` for lines that
//! can raise an interrupt. Arming writes `both` to `edge`, disarming writes
//! `none`. Levels are sampled by [`PolledPlatform`](crate::PolledPlatform).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GpioError, GpioResult};
use crate::polled::LineSource;
use crate::types::{Level, PinId};

/// Default sysfs GPIO class directory.
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/gpio";

/// Exported sysfs GPIO lines under a class directory.
#[derive(Debug, Clone)]
pub struct SysfsLines {
    root: PathBuf,
}

impl Default for SysfsLines {
    fn default() -> Self {
        Self::new(DEFAULT_SYSFS_ROOT)
    }
}

impl SysfsLines {
    /// Lines under `root` (normally [`DEFAULT_SYSFS_ROOT`]).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The class directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn attribute(&self, pin: PinId, name: &str) -> PathBuf {
        self.root.join(format!("gpio{}", pin.get())).join(name)
    }
}

fn parse_value(pin: PinId, raw: &[u8]) -> GpioResult<Level> {
    match raw.first() {
        Some(b'0') => Ok(Level::Low),
        Some(b'1') => Ok(Level::High),
        Some(other) => Err(GpioError::read_failed(
            pin,
            format!("unexpected value byte 0x{other:02x}"),
        )),
        None => Err(GpioError::read_failed(pin, "empty value attribute")),
    }
}

impl LineSource for SysfsLines {
    fn is_valid(&self, pin: PinId) -> bool {
        self.attribute(pin, "value").is_file()
    }

    fn supports_edges(&self, pin: PinId) -> bool {
        self.attribute(pin, "edge").is_file()
    }

    fn read_level(&self, pin: PinId) -> GpioResult<Level> {
        let raw = fs::read(self.attribute(pin, "value")).map_err(|e| GpioError::io(pin, e))?;
        parse_value(pin, &raw)
    }

    fn arm_edges(&self, pin: PinId) -> GpioResult<()> {
        fs::write(self.attribute(pin, "edge"), b"both").map_err(|e| GpioError::io(pin, e))
    }

    fn disarm_edges(&self, pin: PinId) {
        if let Err(e) = fs::write(self.attribute(pin, "edge"), b"none") {
            debug!(%pin, error = %e, "failed to reset edge attribute");
        }
    }
}
