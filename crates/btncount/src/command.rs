//! Control commands decoded from written bytes.

use core::fmt;

use crate::config::CONTROL_BUFFER_LEN;
use crate::error::{BtnCountError, BtnCountResult};

/// A control request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Start counting, or reset the count if already counting.
    Start,
    /// Stop counting; the last count stays readable.
    Stop,
}

impl Command {
    /// Decode a written control message.
    ///
    /// The input is cut at [`CONTROL_BUFFER_LEN`], then one trailing newline
    /// is dropped, then the rest must equal `start` or `stop` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`BtnCountError::InvalidCommand`] for anything else, including
    /// empty input.
    pub fn decode(input: &[u8]) -> BtnCountResult<Self> {
        let bounded = input.get(..CONTROL_BUFFER_LEN).unwrap_or(input);
        let token = bounded.strip_suffix(b"\n").unwrap_or(bounded);
        match token {
            b"start" => Ok(Self::Start),
            b"stop" => Ok(Self::Stop),
            other => Err(BtnCountError::invalid_command(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }

    /// The wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
