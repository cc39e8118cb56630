//! Debounce/Count Engine.
//!
//! Level-based debounce without a timer: each notification reads the line
//! once and compares the result with the latch.
//!
//! | observed    | latched | effect                         |
//! |-------------|---------|--------------------------------|
//! | asserted    | no      | latch the press                |
//! | deasserted  | yes     | count one cycle, clear latch   |
//! | asserted    | yes     | anomaly, no change             |
//! | deasserted  | no      | anomaly, no change             |
//! | read failed | any     | anomaly, no change             |
//!
//! The count advances on release, so a press+release pair is one event.
//! Bounces that survive to the instantaneous read are counted as the line
//! presents them; there is no timing window.

use core::fmt;

use btncount_gpio::{GpioResult, Level, PinId, Polarity};
use tracing::{debug, trace, warn};

use crate::state::{MAX_COUNT, MonitorState, RunState};

/// A notification that does not match an expected transition.
///
/// Diagnostic only; never returned as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anomaly {
    /// Asserted level seen while a press was already latched.
    AssertedWhileLatched,
    /// Deasserted level seen with no latched press.
    DeassertedWhileIdle,
    /// The line level could not be read.
    ReadFailed,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AssertedWhileLatched => "asserted while latched",
            Self::DeassertedWhileIdle => "deasserted while idle",
            Self::ReadFailed => "level read failed",
        })
    }
}

/// What one notification did to the Monitor State.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Counting is stopped; nothing was read or changed.
    Ignored,
    /// A press was latched.
    Latched,
    /// A cycle completed; carries the new count.
    Counted(u64),
    /// No state change.
    Anomaly(Anomaly),
    /// The state was busy and the notification was discarded.
    Dropped,
}

/// Apply one notification to `state`.
///
/// `read` is only called while running, so a stopped monitor performs no
/// line access at all. Latch and count are updated in the same critical
/// section the caller holds.
pub(crate) fn on_edge(
    state: &mut MonitorState,
    pin: PinId,
    polarity: Polarity,
    read: impl FnOnce() -> GpioResult<Level>,
) -> EdgeOutcome {
    if state.run_state() != RunState::Running {
        trace!(%pin, "notification while stopped");
        return EdgeOutcome::Ignored;
    }

    let level = match read() {
        Ok(level) => level,
        Err(e) => {
            warn!(%pin, error = %e, "level read failed; treating as no transition");
            return EdgeOutcome::Anomaly(Anomaly::ReadFailed);
        }
    };

    match (polarity.is_asserted(level), state.level_latched) {
        (true, false) => {
            state.level_latched = true;
            debug!(%pin, %level, "press latched");
            EdgeOutcome::Latched
        }
        (false, true) => {
            state.count = state.count.saturating_add(1).min(MAX_COUNT);
            state.level_latched = false;
            debug!(%pin, %level, count = state.count, "cycle counted");
            EdgeOutcome::Counted(state.count)
        }
        (asserted, latched) => {
            let anomaly = if asserted {
                Anomaly::AssertedWhileLatched
            } else {
                Anomaly::DeassertedWhileIdle
            };
            warn!(%pin, %level, latched, %anomaly, "unexpected notification");
            EdgeOutcome::Anomaly(anomaly)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Run;
    use btncount_gpio::{GpioError, NotificationHandle};

    const PIN: PinId = PinId::new(17);

    fn running() -> MonitorState {
        let mut state = MonitorState::new();
        state.run = Run::Running {
            handle: NotificationHandle::from_raw(1),
        };
        state
    }

    fn feed(state: &mut MonitorState, level: Level) -> EdgeOutcome {
        on_edge(state, PIN, Polarity::ActiveLow, || Ok(level))
    }

    #[test]
    fn test_press_then_release_counts_once() {
        let mut state = running();
        assert_eq!(feed(&mut state, Level::Low), EdgeOutcome::Latched);
        assert_eq!(state.count, 0);
        assert_eq!(feed(&mut state, Level::High), EdgeOutcome::Counted(1));
        assert!(!state.level_latched);
    }

    #[test]
    fn test_repeated_assert_is_anomaly() {
        let mut state = running();
        feed(&mut state, Level::Low);
        assert_eq!(
            feed(&mut state, Level::Low),
            EdgeOutcome::Anomaly(Anomaly::AssertedWhileLatched)
        );
        assert!(state.level_latched);
        assert_eq!(state.count, 0);
    }

    #[test]
    fn test_release_without_press_is_anomaly() {
        let mut state = running();
        assert_eq!(
            feed(&mut state, Level::High),
            EdgeOutcome::Anomaly(Anomaly::DeassertedWhileIdle)
        );
        assert_eq!(state.count, 0);
    }

    #[test]
    fn test_stopped_state_never_reads() {
        let mut state = MonitorState::new();
        let outcome = on_edge(&mut state, PIN, Polarity::ActiveLow, || {
            Err(GpioError::read_failed(PIN, "must not be called"))
        });
        assert_eq!(outcome, EdgeOutcome::Ignored);
        assert!(!state.level_latched);
    }

    #[test]
    fn test_failed_read_changes_nothing() {
        let mut state = running();
        state.level_latched = true;
        let outcome = on_edge(&mut state, PIN, Polarity::ActiveLow, || {
            Err(GpioError::read_failed(PIN, "bus fault"))
        });
        assert_eq!(outcome, EdgeOutcome::Anomaly(Anomaly::ReadFailed));
        assert!(state.level_latched);
        assert_eq!(state.count, 0);
    }

    #[test]
    fn test_active_high_polarity() {
        let mut state = running();
        let outcome = on_edge(&mut state, PIN, Polarity::ActiveHigh, || Ok(Level::High));
        assert_eq!(outcome, EdgeOutcome::Latched);
        let outcome = on_edge(&mut state, PIN, Polarity::ActiveHigh, || Ok(Level::Low));
        assert_eq!(outcome, EdgeOutcome::Counted(1));
    }

    #[test]
    fn test_count_saturates() {
        let mut state = running();
        state.count = MAX_COUNT - 1;
        feed(&mut state, Level::Low);
        assert_eq!(feed(&mut state, Level::High), EdgeOutcome::Counted(MAX_COUNT));
        feed(&mut state, Level::Low);
        assert_eq!(feed(&mut state, Level::High), EdgeOutcome::Counted(MAX_COUNT));
        assert_eq!(state.count, MAX_COUNT);
    }
}
