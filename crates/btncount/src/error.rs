//! Error types for the button counter.
//!
//! Every variant here is a control-path error returned synchronously to the
//! caller. The notification path never produces one of these; it records an
//! [`Anomaly`](crate::engine::Anomaly) instead.

use btncount_gpio::{GpioError, PinId};
use thiserror::Error;

/// Errors surfaced by registration and the control surface.
#[derive(Debug, Error)]
pub enum BtnCountError {
    /// The monitored line identifier is invalid or unusable.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// No edge notification source could be bound to the line.
    #[error("cannot bind edge notification on {pin}: {source}")]
    Subscription {
        /// The monitored line.
        pin: PinId,
        /// Platform failure.
        #[source]
        source: GpioError,
    },

    /// The control input is neither `start` nor `stop`.
    #[error("invalid command {0:?}")]
    InvalidCommand(String),

    /// Monitor state was held by another operation; retry.
    #[error("device busy, retry")]
    Busy,
}

impl BtnCountError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration(reason.into())
    }

    /// Create a subscription error.
    #[must_use]
    pub fn subscription(pin: PinId, source: GpioError) -> Self {
        Self::Subscription { pin, source }
    }

    /// Create an invalid command error.
    #[must_use]
    pub fn invalid_command(token: impl Into<String>) -> Self {
        Self::InvalidCommand(token.into())
    }

    /// The errno value a character device would report for this error.
    #[must_use]
    pub fn errno(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::InvalidCommand(_) => libc::EINVAL,
            Self::Subscription { .. } => libc::EIO,
            Self::Busy => libc::EBUSY,
        }
    }

    /// Whether the same call may succeed if simply retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// A specialized `Result` type for button counter operations.
pub type BtnCountResult<T> = std::result::Result<T, BtnCountError>;
