//! btncountd - push-button press counter daemon
//!
//! Registers a `btn_count` device on one GPIO line and serves it on
//! stdin/stdout, one request per line.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod error;
mod session;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use btncount::{ButtonDevice, DEVICE_NAME, MonitorConfig};
use btncount_gpio::{
    DEFAULT_SYSFS_ROOT, GpioPlatform, Polarity, PolledPlatform, SimulatedPlatform, SysfsLines,
};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::CliError;
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(name = "btncountd")]
#[command(about = "Count debounced push-button presses on a GPIO line")]
#[command(version)]
#[command(long_about = "
btncountd watches one GPIO input line and counts completed press/release
cycles. Requests are read from stdin, one per line:

  start | stop          control counting (start while counting resets to 0)
  read                  current count, or -1 when stopped
  status | stats        monitor snapshot / engine diagnostics as JSON
  press | release | click [N]
                        drive the line (simulated backend only)
")]
struct Cli {
    /// GPIO line the button is wired to
    #[arg(long, env = "BTNCOUNT_PIN")]
    pin: u32,

    /// Which level means "pressed"
    #[arg(long, value_enum, default_value_t = PolarityArg::ActiveLow)]
    polarity: PolarityArg,

    /// Where line levels come from
    #[arg(long, value_enum, default_value_t = Backend::Sysfs)]
    backend: Backend,

    /// GPIO class directory for the sysfs backend
    #[arg(long, default_value = DEFAULT_SYSFS_ROOT)]
    sysfs_root: PathBuf,

    /// Sampling period of the sysfs backend
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_ms: u64,

    /// Verbose logging
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    /// Linux sysfs GPIO, sampled on a worker thread
    Sysfs,
    /// In-process line driven by press/release requests
    Simulated,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PolarityArg {
    /// Pressed reads 0 (pull-up, button to ground)
    ActiveLow,
    /// Pressed reads 1
    ActiveHigh,
}

impl From<PolarityArg> for Polarity {
    fn from(arg: PolarityArg) -> Self {
        match arg {
            PolarityArg::ActiveLow => Self::ActiveLow,
            PolarityArg::ActiveHigh => Self::ActiveHigh,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries replies; logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("btncountd={log_level},btncount={log_level},btncount_gpio={log_level}")
                    .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match run(&cli) {
        Ok(handled) => {
            info!(device = DEVICE_NAME, handled, "exiting");
            Ok(())
        }
        Err(e) => {
            error!(device = DEVICE_NAME, error = %e, "fatal");
            eprintln!("btncountd: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

fn run(cli: &Cli) -> Result<u64, CliError> {
    let config = MonitorConfig::builder()
        .pin(cli.pin)
        .polarity(cli.polarity.into())
        .build()?;

    match cli.backend {
        Backend::Sysfs => {
            let lines = SysfsLines::new(cli.sysfs_root.clone());
            let platform = PolledPlatform::with_poll_interval(
                lines,
                Duration::from_millis(cli.poll_interval_ms),
            );
            serve(Session::new(ButtonDevice::register(platform, config)?))
        }
        Backend::Simulated => {
            let platform = Arc::new(
                SimulatedPlatform::new().with_line(config.pin, config.polarity.deasserted_level()),
            );
            let device = ButtonDevice::register(Arc::clone(&platform), config)?;
            serve(Session::new(device).with_simulated_line(platform))
        }
    }
}

fn serve<P: GpioPlatform + 'static>(session: Session<P>) -> Result<u64, CliError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let handled = session.serve(stdin.lock(), stdout.lock())?;
    debug!(openers = session.device().openers(), "input closed");
    Ok(handled)
}
