//! Error types for btncountd

use btncount::BtnCountError;
use btncount_gpio::GpioError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0} (errno {errno})", errno = .0.errno())]
    Device(#[from] BtnCountError),

    #[error("{0}")]
    Gpio(#[from] GpioError),

    #[error("`{0}` needs the simulated backend")]
    SimulatedOnly(String),

    #[error("bad argument to `{request}`: {reason}")]
    BadArgument { request: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for an error that ends the daemon.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Device(BtnCountError::Configuration(_)) => 2,
            Self::Device(BtnCountError::Subscription { .. }) | Self::Gpio(_) => 3,
            Self::Io(_) => 4,
            _ => 1,
        }
    }
}
