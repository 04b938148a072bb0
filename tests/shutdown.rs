// tests/shutdown.rs

mod common;
use crate::common::{init_tracing, wait_until};

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use watchrun::config::KeypressOptions;
use watchrun::engine::RunningState;
use watchrun::types::SHUTDOWN_EXIT_CODE;
use watchrun::watch::{ChangeBatch, WatchService};
use watchrun_test_utils::{
    HarnessBuilder, Latch, RecordingBackend, ScriptedKeys, ScriptedWatchService, batch, ctrl, press,
    with_timeout,
};

fn instant_keys() -> KeypressOptions {
    KeypressOptions {
        enabled: true,
        startup_grace: Duration::ZERO,
        settle_delay: Duration::ZERO,
    }
}

#[test]
fn exit_code_is_documented_value() {
    assert_eq!(SHUTDOWN_EXIT_CODE, 11);
}

// Keeps the quit key from being dispatched before the trigger worker has
// picked up the preceding space.
fn spaced_keys() -> KeypressOptions {
    KeypressOptions {
        settle_delay: Duration::from_millis(200),
        ..instant_keys()
    }
}

#[test]
fn shutdown_runs_once_and_stops_everything() {
    init_tracing();
    let h = HarnessBuilder::new().build();
    let keys = ScriptedKeys::idle();
    let restores = keys.restore_counter();
    h.orchestrator
        .start(&h.watch, Some(Box::new(keys)), instant_keys())
        .expect("scripted start");

    assert_eq!(
        h.watch.subscribed_directory(),
        Some(h.orchestrator.config().directory.clone())
    );
    assert_eq!(h.orchestrator.running_state(), RunningState::Watching);
    assert!(h.orchestrator.shutdown());
    assert_eq!(h.orchestrator.running_state(), RunningState::Terminated);
    assert!(h.watch.is_stopped());
    assert_eq!(h.watch.stop_calls(), 1);
    assert_eq!(restores.load(Ordering::SeqCst), 1);

    // Second call is a no-op.
    assert!(!h.orchestrator.shutdown());
    assert_eq!(h.watch.stop_calls(), 1);
    assert_eq!(restores.load(Ordering::SeqCst), 1);

    let out = h.output.contents();
    let keys_at = out.find("Stopping the keypress monitor").expect("keypress step");
    let watch_at = out.find("Stopping the file watcher").expect("watch step");
    let bye_at = out.find("Thanks for playing").expect("farewell");
    assert!(keys_at < watch_at && watch_at < bye_at, "output was: {out}");
}

#[test]
fn concurrent_shutdowns_have_a_single_winner() {
    init_tracing();
    let h = HarnessBuilder::new().build();
    h.start();

    let winners: usize = (0..8)
        .map(|_| {
            let orchestrator = Arc::clone(&h.orchestrator);
            thread::spawn(move || orchestrator.shutdown())
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|t| t.join().expect("shutdown thread panicked") as usize)
        .sum();

    assert_eq!(winners, 1);
    assert_eq!(h.watch.stop_calls(), 1);
    assert_eq!(h.output.contents().matches("Thanks for playing").count(), 1);
}

#[test]
fn triggers_are_ignored_after_shutdown() {
    init_tracing();
    let h = HarnessBuilder::new().build();
    h.start();
    h.orchestrator.shutdown();

    assert!(h.orchestrator.on_batch(batch(5, 0, 0)).is_none());
    assert!(h.orchestrator.trigger_now().is_none());
    assert!(!h.watch.emit_counts(1, 0, 0));
    assert_eq!(h.backend.invocation_count(), 0);
}

#[test]
fn already_stopped_subscription_does_not_break_shutdown() {
    init_tracing();
    let h = HarnessBuilder::new().build();
    h.start();

    // Scripted handles share one switch; stopping another handle first
    // makes the orchestrator's own stop report AlreadyStopped.
    let mut other = h
        .watch
        .subscribe(Path::new("."), Arc::new(|_: ChangeBatch| {}))
        .expect("scripted subscribe");
    other.stop().expect("first stop succeeds");

    assert!(h.orchestrator.shutdown());
    assert_eq!(h.orchestrator.running_state(), RunningState::Terminated);
    assert_eq!(h.watch.stop_calls(), 2);
}

#[test]
fn shutdown_does_not_wait_for_an_in_flight_command() {
    init_tracing();
    let release = Latch::new();
    let backend = RecordingBackend::holding(release.clone());
    let h = HarnessBuilder::new().backend(backend.clone()).build();
    h.start();

    let orchestrator = Arc::clone(&h.orchestrator);
    let running = thread::spawn(move || orchestrator.on_batch(batch(1, 0, 0)));
    assert!(backend.started().wait_timeout(Duration::from_secs(2)));

    let (tx, rx) = mpsc::channel();
    let orchestrator = Arc::clone(&h.orchestrator);
    thread::spawn(move || {
        let _ = tx.send(orchestrator.shutdown());
    });
    let won = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("shutdown hung behind the running command");
    assert!(won);
    assert_eq!(h.orchestrator.running_state(), RunningState::Terminated);

    // The command itself still runs to completion.
    release.open();
    let report = running.join().expect("watch thread panicked");
    assert!(report.is_some());
}

#[test]
fn quit_key_mid_trigger_terminates() {
    init_tracing();
    let release = Latch::new();
    let backend = RecordingBackend::holding(release.clone());
    let h = HarnessBuilder::new().backend(backend.clone()).build();
    h.start();

    // Watch thread is busy running the command.
    let orchestrator = Arc::clone(&h.orchestrator);
    let running = thread::spawn(move || orchestrator.on_batch(batch(0, 1, 0)));
    assert!(backend.started().wait_timeout(Duration::from_secs(2)));

    let keypress = watchrun::keys::spawn_monitor(
        Box::new(ScriptedKeys::new([press('q')])),
        h.orchestrator.clone(),
        instant_keys(),
    )
    .expect("spawn monitor");
    h.orchestrator.attach_keypress(keypress);

    assert!(wait_until(Duration::from_secs(2), || {
        h.orchestrator.running_state() == RunningState::Terminated
    }));
    assert!(h.watch.is_stopped());

    release.open();
    running.join().expect("watch thread panicked");
}

#[test]
fn quit_key_mid_manual_trigger_terminates() {
    init_tracing();
    let release = Latch::new();
    let backend = RecordingBackend::holding(release.clone());
    let h = HarnessBuilder::new().backend(backend.clone()).build();
    h.orchestrator
        .start(
            &h.watch,
            Some(Box::new(ScriptedKeys::new([press(' '), press('q')]))),
            spaced_keys(),
        )
        .expect("scripted start");

    // Space started the command, which is now held open.
    assert!(backend.started().wait_timeout(Duration::from_secs(2)));

    assert!(wait_until(Duration::from_secs(2), || {
        h.orchestrator.running_state() == RunningState::Terminated
    }));
    assert!(h.watch.is_stopped());
    assert!(!release.is_open());

    release.open();
    assert_eq!(backend.invocation_count(), 1);
}

#[test]
fn ctrl_c_key_mid_manual_trigger_terminates() {
    init_tracing();
    let release = Latch::new();
    let backend = RecordingBackend::holding(release.clone());
    let h = HarnessBuilder::new().backend(backend.clone()).build();
    h.orchestrator
        .start(
            &h.watch,
            Some(Box::new(ScriptedKeys::new([press(' '), ctrl('c')]))),
            spaced_keys(),
        )
        .expect("scripted start");

    assert!(backend.started().wait_timeout(Duration::from_secs(2)));
    assert!(wait_until(Duration::from_secs(2), || {
        h.orchestrator.running_state() == RunningState::Terminated
    }));

    release.open();
}

#[test]
fn manual_trigger_waiting_on_the_guard_is_dropped_after_shutdown() {
    init_tracing();
    let release = Latch::new();
    let backend = RecordingBackend::holding(release.clone());
    let h = HarnessBuilder::new().backend(backend.clone()).build();
    h.start();

    let orchestrator = Arc::clone(&h.orchestrator);
    let running = thread::spawn(move || orchestrator.on_batch(batch(1, 0, 0)));
    assert!(backend.started().wait_timeout(Duration::from_secs(2)));

    // Passes the first state check, then blocks on the guard.
    let orchestrator = Arc::clone(&h.orchestrator);
    let waiting = thread::spawn(move || orchestrator.trigger_now());
    assert!(wait_until(Duration::from_secs(2), || {
        h.output.contents().contains("Invoking a manually-triggered refresh")
    }));

    let orchestrator = Arc::clone(&h.orchestrator);
    let late_batch = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        orchestrator.on_batch(batch(0, 1, 0))
    });

    assert!(h.orchestrator.shutdown());
    release.open();

    assert!(running.join().expect("watch thread panicked").is_some());
    assert!(waiting.join().expect("manual thread panicked").is_none());
    assert!(late_batch.join().expect("batch thread panicked").is_none());
    assert_eq!(backend.invocation_count(), 1);
    assert_eq!(h.orchestrator.run_count(), 1);
}

#[tokio::test]
async fn wait_terminated_wakes_after_shutdown_from_another_thread() {
    init_tracing();
    let h = HarnessBuilder::new().build();
    h.start();

    let orchestrator = Arc::clone(&h.orchestrator);
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        orchestrator.shutdown();
    });

    with_timeout(h.orchestrator.wait_terminated()).await;
    assert_eq!(h.orchestrator.running_state(), RunningState::Terminated);
}

#[tokio::test]
async fn wait_terminated_returns_immediately_when_already_terminated() {
    init_tracing();
    let h = HarnessBuilder::new().build();
    h.orchestrator.shutdown();

    with_timeout(h.orchestrator.wait_terminated()).await;
}

#[test]
fn failed_subscription_is_fatal() {
    init_tracing();
    let h = HarnessBuilder::new().build();
    let failing = ScriptedWatchService::failing();

    let err = h
        .orchestrator
        .start(&failing, None, instant_keys())
        .expect_err("subscription must fail");
    assert!(err.to_string().contains("cannot watch"));
}
