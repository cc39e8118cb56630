//! Byte-oriented device contract.
//!
//! [`ButtonDevice`] is what a character device would register: `write`
//! decodes a control command, `read_at` serves the count as one
//! newline-terminated decimal line (`-1\n` while stopped) from an offset
//! cursor. Openers share the single monitor; [`DeviceFile`] carries the
//! read cursor and the message it is reading.

use core::sync::atomic::{AtomicUsize, Ordering};

use btncount_gpio::GpioPlatform;
use tracing::{debug, error, info};

use crate::command::Command;
use crate::config::MonitorConfig;
use crate::error::BtnCountResult;
use crate::monitor::ButtonMonitor;

/// Device name used in logs.
pub const DEVICE_NAME: &str = "btn_count";

/// Render the read message for a query result.
#[must_use]
pub fn render_count(count: Option<u64>) -> String {
    match count {
        Some(count) => format!("{count}\n"),
        None => String::from("-1\n"),
    }
}

/// Copy the part of `message` at `offset` into `buf`.
fn copy_from_offset(message: &[u8], buf: &mut [u8], offset: u64) -> usize {
    let Ok(start) = usize::try_from(offset) else {
        return 0;
    };
    let Some(rest) = message.get(start..) else {
        return 0;
    };
    let n = rest.len().min(buf.len());
    match (buf.get_mut(..n), rest.get(..n)) {
        (Some(dst), Some(src)) => {
            dst.copy_from_slice(src);
            n
        }
        _ => 0,
    }
}

/// A registered button counter device.
#[derive(Debug)]
pub struct ButtonDevice<P: GpioPlatform + 'static> {
    monitor: ButtonMonitor<P>,
    openers: AtomicUsize,
}

impl<P: GpioPlatform + 'static> ButtonDevice<P> {
    /// Validate the configuration and register the device, stopped.
    ///
    /// # Errors
    ///
    /// Returns [`BtnCountError::Configuration`](crate::BtnCountError::Configuration)
    /// if the line is unusable; nothing is registered in that case.
    pub fn register(platform: P, config: MonitorConfig) -> BtnCountResult<Self> {
        let monitor = ButtonMonitor::new(platform, config).inspect_err(|e| {
            error!(device = DEVICE_NAME, pin = %config.pin, error = %e, "registration failed");
        })?;
        info!(device = DEVICE_NAME, pin = %config.pin, polarity = %config.polarity, "registered");
        Ok(Self {
            monitor,
            openers: AtomicUsize::new(0),
        })
    }

    /// Open the device. The returned file closes on drop.
    pub fn open(&self) -> DeviceFile<'_, P> {
        let openers = self.openers.fetch_add(1, Ordering::AcqRel).saturating_add(1);
        debug!(device = DEVICE_NAME, openers, "opened");
        DeviceFile {
            device: self,
            offset: 0,
            message: None,
        }
    }

    /// Number of open files.
    #[must_use]
    pub fn openers(&self) -> usize {
        self.openers.load(Ordering::Acquire)
    }

    /// Handle a control write.
    ///
    /// Returns the full input length on success. The command is decoded
    /// before the state is touched, so malformed input never contends.
    ///
    /// # Errors
    ///
    /// - [`BtnCountError::InvalidCommand`](crate::BtnCountError::InvalidCommand)
    ///   for anything but `start`/`stop`
    /// - [`BtnCountError::Busy`](crate::BtnCountError::Busy) on contention
    /// - [`BtnCountError::Subscription`](crate::BtnCountError::Subscription)
    ///   if `start` cannot bind the edge source
    pub fn write(&self, input: &[u8]) -> BtnCountResult<usize> {
        let command = Command::decode(input)?;
        debug!(device = DEVICE_NAME, %command, len = input.len(), "control write");
        self.monitor.execute(command)?;
        Ok(input.len())
    }

    /// The full read message for the current state.
    #[must_use]
    pub fn message(&self) -> String {
        render_count(self.monitor.current_count())
    }

    /// Read the message starting at `offset` into `buf`.
    ///
    /// Returns the number of bytes copied; zero once `offset` reaches the
    /// end of the message. Each call renders the current count, so partial
    /// reads that must agree go through a [`DeviceFile`].
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> usize {
        copy_from_offset(self.message().as_bytes(), buf, offset)
    }

    /// The underlying monitor.
    #[must_use]
    pub fn monitor(&self) -> &ButtonMonitor<P> {
        &self.monitor
    }
}

/// One open handle on a [`ButtonDevice`].
///
/// A read at offset zero renders the message and keeps it; later reads are
/// served from that copy until [`rewind`](Self::rewind), so one message
/// always carries one count.
#[derive(Debug)]
pub struct DeviceFile<'a, P: GpioPlatform + 'static> {
    device: &'a ButtonDevice<P>,
    offset: u64,
    message: Option<String>,
}

impl<P: GpioPlatform + 'static> DeviceFile<'_, P> {
    /// Read from the file cursor, advancing it.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        if self.offset == 0 {
            self.message = None;
        }
        let device = self.device;
        let message = self.message.get_or_insert_with(|| device.message());
        let n = copy_from_offset(message.as_bytes(), buf, self.offset);
        self.offset = self.offset.saturating_add(n as u64);
        n
    }

    /// Read the rest of the message in one go, advancing the cursor to
    /// end-of-stream.
    pub fn read_to_string(&mut self) -> String {
        let mut out = Vec::new();
        let mut chunk = [0u8; 8];
        loop {
            let n = self.read(&mut chunk);
            match chunk.get(..n) {
                Some(bytes) if n > 0 => out.extend_from_slice(bytes),
                _ => break,
            }
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Move the cursor back to the start of the message.
    pub fn rewind(&mut self) {
        self.offset = 0;
        self.message = None;
    }

    /// Current cursor position.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Forward a control write to the device.
    ///
    /// # Errors
    ///
    /// See [`ButtonDevice::write`].
    pub fn write(&self, input: &[u8]) -> BtnCountResult<usize> {
        self.device.write(input)
    }

    /// Close the file.
    pub fn close(self) {}
}

impl<P: GpioPlatform + 'static> Drop for DeviceFile<'_, P> {
    fn drop(&mut self) {
        let remaining = self
            .device
            .openers
            .fetch_sub(1, Ordering::AcqRel)
            .saturating_sub(1);
        debug!(device = DEVICE_NAME, openers = remaining, "closed");
    }
}
