#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use autotheme_core::AutoThemeErr;
use autotheme_core::ThemeScheduler;
use autotheme_core::config::ThemeSchedule;
use core_test_support::FakeHost;
use core_test_support::HostCall;
use core_test_support::ManualClock;
use core_test_support::grid;
use pretty_assertions::assert_eq;

#[tokio::test(start_paused = true)]
async fn run_sleeps_poll_interval_between_cycles() {
    let host = Arc::new(FakeHost::new().with_windows(grid(1, 1, 2)));
    let clock = Arc::new(ManualClock::at_hour(12));
    let running = ThemeScheduler::new(
        Arc::clone(&host),
        Arc::clone(&clock),
        ThemeSchedule::default(),
    )
    .initialize()
    .await
    .unwrap();

    // Cycles start at t=0s and t=300s; the next one would be at t=600s.
    let result = tokio::time::timeout(Duration::from_secs(301), running.run()).await;

    assert!(result.is_err(), "run() must never return");
    assert_eq!(host.count_calls(|c| matches!(c, HostCall::ListWindows)), 2);
    assert_eq!(host.applied_presets().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn stale_session_is_retried_every_cycle() {
    let host = Arc::new(FakeHost::new().with_windows(grid(1, 1, 1)));
    let clock = Arc::new(ManualClock::at_hour(12));
    let schedule = ThemeSchedule {
        poll_interval: Duration::from_secs(10),
        ..Default::default()
    };
    let running = ThemeScheduler::new(Arc::clone(&host), Arc::clone(&clock), schedule)
        .initialize()
        .await
        .unwrap();
    host.close_session("w0t0s0");

    let _ = tokio::time::timeout(Duration::from_secs(25), running.run()).await;

    // t=0, t=10, t=20
    assert_eq!(
        host.count_calls(|c| matches!(c, HostCall::GetProfile(_))),
        3
    );
    assert!(host.applied_presets().is_empty());
}

#[tokio::test(start_paused = true)]
async fn run_returns_once_the_host_hangs_up() {
    let host = Arc::new(FakeHost::new().with_windows(grid(1, 1, 2)));
    let clock = Arc::new(ManualClock::at_hour(12));
    let running = ThemeScheduler::new(
        Arc::clone(&host),
        Arc::clone(&clock),
        ThemeSchedule::default(),
    )
    .initialize()
    .await
    .unwrap();
    host.hang_up();

    let result = tokio::time::timeout(Duration::from_secs(24 * 60 * 60), running.run())
        .await
        .expect("run() must return after the host hangs up");

    assert!(
        matches!(result, Err(AutoThemeErr::Disconnected)),
        "{result:?}"
    );
    assert_eq!(host.count_calls(|c| matches!(c, HostCall::GetColorPreset(_))), 1);
}
