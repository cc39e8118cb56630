//! Insta snapshot tests for user-visible strings: error messages, query
//! messages and the serialized monitor snapshot.

use std::sync::Arc;

use btncount::prelude::*;
use btncount_gpio::{GpioError, Level, PinId, SimulatedPlatform};
use btncount_test_helpers::{SimButton, must, must_err};

const PIN: PinId = PinId::new(4);

fn device(button: &SimButton) -> ButtonDevice<Arc<SimulatedPlatform>> {
    must(ButtonDevice::register(
        button.platform(),
        MonitorConfig::new(button.pin()),
    ))
}

// -- Errors -------------------------------------------------------------------

#[test]
fn snapshot_busy_message() {
    insta::assert_snapshot!(BtnCountError::Busy, @"device busy, retry");
}

#[test]
fn snapshot_invalid_command_message() {
    let err = must_err(Command::decode(b"go\n"));
    insta::assert_snapshot!(err, @r#"invalid command "go""#);
}

#[test]
fn snapshot_unknown_line_message() {
    let platform = Arc::new(SimulatedPlatform::new());
    let err = must_err(ButtonDevice::register(platform, MonitorConfig::new(PinId::new(9))));
    insta::assert_snapshot!(err, @"invalid configuration: gpio9 is not a valid input line");
}

#[test]
fn snapshot_missing_pin_message() {
    let err = must_err(MonitorConfig::builder().build());
    insta::assert_snapshot!(err, @"invalid configuration: monitored line is required");
}

#[test]
fn snapshot_polled_only_line_message() {
    let platform = Arc::new(SimulatedPlatform::new().with_polled_only_line(PIN, Level::High));
    let device = must(ButtonDevice::register(platform, MonitorConfig::new(PIN)));
    let err = must_err(device.write(b"start"));
    insta::assert_snapshot!(
        err,
        @"cannot bind edge notification on gpio4: gpio4 has no edge notification capability"
    );
}

#[test]
fn snapshot_gpio_read_failure_message() {
    let err = GpioError::read_failed(PIN, "line released by kernel");
    insta::assert_snapshot!(err, @"failed to read level of gpio4: line released by kernel");
}

// -- Query messages -----------------------------------------------------------

#[test]
fn snapshot_stopped_message() {
    let button = SimButton::new(PIN);
    let device = device(&button);
    insta::assert_debug_snapshot!(device.message(), @r#""-1\n""#);
}

#[test]
fn snapshot_running_message_after_clicks() {
    let button = SimButton::new(PIN);
    let device = device(&button);
    must(device.write(b"start\n"));
    must(button.click(12));
    insta::assert_debug_snapshot!(device.message(), @r#""12\n""#);
}

#[test]
fn snapshot_monitor_snapshot_json() {
    let button = SimButton::new(PIN);
    let device = device(&button);
    must(device.write(b"start"));
    must(button.click(2));
    must(button.press());

    let json = must(serde_json::to_string(&device.monitor().snapshot()));
    insta::assert_snapshot!(
        json,
        @r#"{"pin":4,"run_state":"running","subscribed":true,"level_latched":true,"count":2}"#
    );
}
