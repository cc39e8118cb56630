//! Contention between the control path and the notification path.

use std::sync::mpsc;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use btncount::prelude::*;
use btncount_gpio::{PinId, SimulatedPlatform, SubscribeHook};
use btncount_test_helpers::SimButton;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const PIN: PinId = PinId::new(26);

/// Install a hook that parks `subscribe` until the returned sender fires.
/// The first receiver yields once a subscribe call has entered the hook.
fn stall_subscribe(platform: &SimulatedPlatform) -> (mpsc::Receiver<()>, mpsc::Sender<()>) {
    let (entered_tx, entered_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let entered_tx = Mutex::new(entered_tx);
    let release_rx = Mutex::new(release_rx);
    let hook: SubscribeHook = Arc::new(move |_pin| {
        if let Ok(tx) = entered_tx.lock() {
            let _sent = tx.send(());
        }
        if let Ok(rx) = release_rx.lock() {
            let _released = rx.recv_timeout(Duration::from_secs(5));
        }
    });
    platform.set_subscribe_hook(Some(hook));
    (entered_rx, release_tx)
}

#[test]
fn test_concurrent_control_calls_see_busy() -> TestResult {
    let button = SimButton::new(PIN);
    let device = Arc::new(ButtonDevice::register(
        button.platform(),
        MonitorConfig::new(PIN),
    )?);
    let (entered, release) = stall_subscribe(&button.platform());

    let starter = {
        let device = Arc::clone(&device);
        thread::spawn(move || device.monitor().start())
    };
    entered.recv_timeout(Duration::from_secs(5))?;

    // start holds the state inside subscribe
    let stop = device.monitor().stop();
    assert!(matches!(stop, Err(BtnCountError::Busy)));
    let write = device.write(b"start");
    assert!(matches!(&write, Err(e) if e.errno() == libc::EBUSY));

    release.send(())?;
    starter.join().map_err(|_| "starter panicked")??;
    assert_eq!(device.monitor().current_count(), Some(0));
    assert!(button.platform().is_subscribed(PIN));
    Ok(())
}

#[test]
fn test_query_does_not_block_during_start() -> TestResult {
    let button = SimButton::new(PIN);
    let device = Arc::new(ButtonDevice::register(
        button.platform(),
        MonitorConfig::new(PIN),
    )?);
    let (entered, release) = stall_subscribe(&button.platform());

    let starter = {
        let device = Arc::clone(&device);
        thread::spawn(move || device.monitor().start())
    };
    entered.recv_timeout(Duration::from_secs(5))?;

    assert_eq!(device.message(), "-1\n");

    release.send(())?;
    starter.join().map_err(|_| "starter panicked")??;
    assert_eq!(device.message(), "0\n");
    Ok(())
}

#[test]
fn test_racing_start_stop_never_deadlocks() -> TestResult {
    let button = SimButton::new(PIN);
    let device = Arc::new(ButtonDevice::register(
        button.platform(),
        MonitorConfig::new(PIN),
    )?);
    let threads = 4;
    let barrier = Arc::new(Barrier::new(threads + 1));

    let mut handles = Vec::new();
    for i in 0..threads {
        let device = Arc::clone(&device);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut busy = 0u32;
            for round in 0..200 {
                let command: &[u8] = if (round + i) % 2 == 0 { b"start" } else { b"stop" };
                match device.write(command) {
                    Ok(_) => {}
                    Err(BtnCountError::Busy) => busy += 1,
                    Err(other) => return Err(other.to_string()),
                }
            }
            Ok(busy)
        }));
    }

    let clicker = {
        let button = button.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..500 {
                if button.click(1).is_err() {
                    return false;
                }
            }
            true
        })
    };

    for handle in handles {
        handle.join().map_err(|_| "control thread panicked")??;
    }
    assert!(clicker.join().map_err(|_| "clicker panicked")?);

    let snap = device.monitor().snapshot();
    assert_eq!(snap.subscribed, snap.run_state == RunState::Running);
    assert_eq!(button.platform().is_subscribed(PIN), snap.subscribed);
    Ok(())
}

#[test]
fn test_queries_never_drop_notifications() -> TestResult {
    let button = SimButton::new(PIN);
    let device = Arc::new(ButtonDevice::register(
        button.platform(),
        MonitorConfig::new(PIN),
    )?);
    device.write(b"start")?;
    let clicks = 2_000;

    let reader = {
        let device = Arc::clone(&device);
        thread::spawn(move || {
            let mut last = 0u64;
            let mut monotonic = true;
            while last < clicks {
                let Some(count) = device.monitor().current_count() else {
                    return false;
                };
                monotonic &= count >= last;
                last = count;
                thread::yield_now();
            }
            monotonic
        })
    };

    button.click(usize::try_from(clicks)?)?;
    assert!(reader.join().map_err(|_| "reader panicked")?);
    assert_eq!(device.monitor().current_count(), Some(clicks));
    assert_eq!(device.monitor().stats().dropped_contended, 0);
    Ok(())
}

#[test]
fn test_stop_drains_and_freezes_count() -> TestResult {
    let button = SimButton::new(PIN);
    let device = Arc::new(ButtonDevice::register(
        button.platform(),
        MonitorConfig::new(PIN),
    )?);
    device.write(b"start")?;

    let clicker = {
        let button = button.clone();
        thread::spawn(move || {
            for _ in 0..1_000 {
                if button.click(1).is_err() {
                    break;
                }
            }
        })
    };

    thread::sleep(Duration::from_millis(1));
    loop {
        match device.monitor().stop() {
            Ok(()) => break,
            Err(BtnCountError::Busy) => thread::yield_now(),
            Err(other) => return Err(other.into()),
        }
    }
    let frozen = device.monitor().snapshot();
    clicker.join().map_err(|_| "clicker panicked")?;

    let after = device.monitor().snapshot();
    assert_eq!(after, frozen);
    assert!(after.count <= 1_000);
    Ok(())
}
