//! Error types for GPIO line access.

use thiserror::Error;

use crate::types::PinId;

/// Errors reported by a [`GpioPlatform`](crate::GpioPlatform).
#[derive(Debug, Error)]
pub enum GpioError {
    /// The identifier does not name a usable line.
    #[error("{0} is not a valid GPIO line")]
    InvalidPin(PinId),

    /// The line exists but cannot deliver edge notifications.
    #[error("{0} has no edge notification capability")]
    NoInterrupt(PinId),

    /// An edge source is already bound to the line.
    #[error("{0} already has an active edge subscription")]
    AlreadySubscribed(PinId),

    /// The line level could not be read.
    #[error("failed to read level of {pin}: {reason}")]
    ReadFailed {
        /// The line being read.
        pin: PinId,
        /// Backend-specific detail.
        reason: String,
    },

    /// Filesystem access to a line failed.
    #[error("I/O error on {pin}: {source}")]
    Io {
        /// The line being accessed.
        pin: PinId,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The notification worker thread could not be started.
    #[error("failed to start notification worker for {pin}: {reason}")]
    Worker {
        /// The line being subscribed.
        pin: PinId,
        /// Spawn failure detail.
        reason: String,
    },
}

impl GpioError {
    /// Create a read failure.
    #[must_use]
    pub fn read_failed(pin: PinId, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            pin,
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error raised while touching `pin`.
    #[must_use]
    pub fn io(pin: PinId, source: std::io::Error) -> Self {
        Self::Io { pin, source }
    }

    /// The line the error refers to.
    #[must_use]
    pub fn pin(&self) -> PinId {
        match self {
            Self::InvalidPin(pin) | Self::NoInterrupt(pin) | Self::AlreadySubscribed(pin) => *pin,
            Self::ReadFailed { pin, .. } | Self::Io { pin, .. } | Self::Worker { pin, .. } => *pin,
        }
    }
}

/// A specialized `Result` type for GPIO operations.
pub type GpioResult<T> = std::result::Result<T, GpioError>;
