//! Line-oriented request loop over a registered device.
//!
//! Every non-blank input line is one request and gets exactly one reply line:
//!
//! | request                      | reply                                   |
//! |------------------------------|-----------------------------------------|
//! | `read`                       | the query message, `N` or `-1`          |
//! | `status`                     | monitor snapshot as JSON                |
//! | `stats`                      | engine diagnostics as JSON              |
//! | `press`, `release`, `click [N]` | `ok`; drives the simulated line      |
//! | anything else                | written to the device; `ok` or `error: ...` |

use std::io::{BufRead, Write};
use std::sync::Arc;

use btncount::{ButtonDevice, DeviceFile};
use btncount_gpio::{GpioPlatform, PinId, Polarity, SimulatedPlatform};
use tracing::{debug, info};

use crate::error::CliError;

/// A simulated line the request stream may drive.
#[derive(Debug)]
struct SimulatedLine {
    platform: Arc<SimulatedPlatform>,
    pin: PinId,
    polarity: Polarity,
}

impl SimulatedLine {
    fn press(&self) -> Result<(), CliError> {
        self.platform
            .set_level(self.pin, self.polarity.asserted_level())?;
        Ok(())
    }

    fn release(&self) -> Result<(), CliError> {
        self.platform
            .set_level(self.pin, self.polarity.deasserted_level())?;
        Ok(())
    }
}

/// Serves one registered device.
pub struct Session<P: GpioPlatform + 'static> {
    device: ButtonDevice<P>,
    simulated: Option<SimulatedLine>,
}

impl<P: GpioPlatform + 'static> Session<P> {
    pub fn new(device: ButtonDevice<P>) -> Self {
        Self {
            device,
            simulated: None,
        }
    }

    /// Allow `press`/`release`/`click` to drive the monitored line on
    /// `platform`.
    pub fn with_simulated_line(mut self, platform: Arc<SimulatedPlatform>) -> Self {
        let monitor = self.device.monitor();
        self.simulated = Some(SimulatedLine {
            platform,
            pin: monitor.pin(),
            polarity: monitor.polarity(),
        });
        self
    }

    pub fn device(&self) -> &ButtonDevice<P> {
        &self.device
    }

    /// Answer requests from `input` until it ends. Returns the number of
    /// requests handled.
    ///
    /// Request failures are replies, not errors; only I/O on the streams
    /// ends the session early.
    pub fn serve(&self, input: impl BufRead, mut output: impl Write) -> Result<u64, CliError> {
        let mut file = self.device.open();
        info!(pin = %self.device.monitor().pin(), "session open");

        let mut handled = 0u64;
        for line in input.lines() {
            let line = line?;
            let request = line.trim_end_matches('\r');
            if request.trim().is_empty() {
                continue;
            }
            debug!(request, "request");
            let reply = match self.dispatch(&mut file, request) {
                Ok(reply) => reply,
                Err(e) => format!("error: {e}"),
            };
            writeln!(output, "{reply}")?;
            output.flush()?;
            handled += 1;
        }

        info!(handled, "session closed");
        Ok(handled)
    }

    fn simulated(&self, request: &str) -> Result<&SimulatedLine, CliError> {
        self.simulated
            .as_ref()
            .ok_or_else(|| CliError::SimulatedOnly(request.to_owned()))
    }

    fn dispatch(&self, file: &mut DeviceFile<'_, P>, request: &str) -> Result<String, CliError> {
        let mut words = request.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("read"), None, _) => {
                file.rewind();
                Ok(file.read_to_string().trim_end().to_owned())
            }
            (Some("status"), None, _) => {
                Ok(serde_json::to_string(&self.device.monitor().snapshot())?)
            }
            (Some("stats"), None, _) => Ok(serde_json::to_string(&self.device.monitor().stats())?),
            (Some("press"), None, _) => {
                self.simulated("press")?.press()?;
                Ok("ok".to_owned())
            }
            (Some("release"), None, _) => {
                self.simulated("release")?.release()?;
                Ok("ok".to_owned())
            }
            (Some("click"), arg, None) => {
                let line = self.simulated("click")?;
                for _ in 0..parse_times(arg)? {
                    line.press()?;
                    line.release()?;
                }
                Ok("ok".to_owned())
            }
            _ => {
                file.write(request.as_bytes())?;
                Ok("ok".to_owned())
            }
        }
    }
}

fn parse_times(arg: Option<&str>) -> Result<u32, CliError> {
    arg.map_or(Ok(1), |raw| {
        raw.parse().map_err(|e| CliError::BadArgument {
            request: "click".to_owned(),
            reason: format!("{raw:?}: {e}"),
        })
    })
}
