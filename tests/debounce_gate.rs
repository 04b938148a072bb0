// tests/debounce_gate.rs

mod common;
use crate::common::init_tracing;

use std::time::{Duration, Instant};

use watchrun::engine::{DebounceGate, TriggerReason};
use watchrun::state::ChangeCounters;
use watchrun_test_utils::{HarnessBuilder, batch};

const TEN_SECONDS: Duration = Duration::from_secs(10);

fn changed_counters() -> ChangeCounters {
    let mut counters = ChangeCounters::new(Instant::now());
    counters.increment(0, 1, 0);
    counters
}

#[test]
fn gate_is_open_before_the_first_run() {
    let gate = DebounceGate::new(TEN_SECONDS);
    assert_eq!(gate.minimum_frequency(), TEN_SECONDS);
    assert!(gate.should_fire(Instant::now(), None, &changed_counters()));
}

#[test]
fn gate_requires_strictly_more_than_the_interval() {
    let gate = DebounceGate::new(TEN_SECONDS);
    let last = Instant::now();
    let counters = changed_counters();

    assert!(!gate.should_fire(last + TEN_SECONDS, Some(last), &counters));
    assert!(gate.should_fire(
        last + TEN_SECONDS + Duration::from_millis(1),
        Some(last),
        &counters
    ));
}

#[test]
fn gate_stays_closed_without_changes() {
    let gate = DebounceGate::new(TEN_SECONDS);
    let last = Instant::now();
    let counters = ChangeCounters::new(last);

    assert!(!gate.should_fire(last + Duration::from_secs(3600), Some(last), &counters));
    assert!(!gate.should_fire(last, None, &counters));
}

#[test]
fn clock_going_backwards_keeps_the_gate_closed() {
    let gate = DebounceGate::new(TEN_SECONDS);
    let last = Instant::now() + Duration::from_secs(60);
    assert!(!gate.window_elapsed(Instant::now(), Some(last)));
}

#[test]
fn batch_after_the_window_fires_exactly_once() {
    init_tracing();
    let h = HarnessBuilder::new().interval(TEN_SECONDS).build();

    // last_run = T
    h.orchestrator.trigger_now().expect("manual trigger runs");
    let t = h.clock.now_offset();

    let epsilon = Duration::from_millis(250);
    h.clock.set(t + TEN_SECONDS + epsilon);
    let report = h
        .orchestrator
        .on_batch(batch(1, 0, 0))
        .expect("window elapsed with pending changes");

    assert_eq!(report.reason, TriggerReason::FileWatch);
    assert_eq!(report.snapshot.modified, 1);
    assert_eq!(h.backend.invocation_count(), 2);

    let state = h.orchestrator.shared_state();
    let last_run = state.last_run.expect("last run recorded");
    assert!(last_run >= h.clock.at(t + TEN_SECONDS + epsilon));
    assert!(!state.counters.changed());
}

#[test]
fn nothing_fires_without_pending_changes() {
    init_tracing();
    let h = HarnessBuilder::new().interval(TEN_SECONDS).build();
    h.orchestrator.trigger_now().expect("manual trigger runs");

    h.clock.advance(TEN_SECONDS * 3);
    assert!(h.orchestrator.on_batch(batch(0, 0, 0)).is_none());
    assert_eq!(h.backend.invocation_count(), 1);
}

#[test]
fn first_batch_fires_immediately() {
    init_tracing();
    let h = HarnessBuilder::new().interval(TEN_SECONDS).build();

    let report = h.orchestrator.on_batch(batch(0, 2, 0)).expect("never ran before");
    assert_eq!(report.snapshot.added, 2);
}

#[test]
fn ten_second_scenario() {
    init_tracing();
    let h = HarnessBuilder::new().interval(TEN_SECONDS).build();
    h.start();

    // Run at t=0 so the window starts there.
    h.orchestrator.trigger_now().expect("manual trigger runs");
    assert_eq!(h.orchestrator.run_count(), 1);

    // t=0: two files added, inside the window.
    assert!(h.watch.emit_counts(0, 2, 0));
    assert_eq!(h.orchestrator.run_count(), 1);

    // t=11: next batch opens the gate.
    h.clock.set(Duration::from_secs(11));
    h.output.clear();
    assert!(h.watch.emit_counts(1, 0, 0));
    assert_eq!(h.orchestrator.run_count(), 2);
    let out = h.output.contents();
    assert!(out.contains("   added: 2"), "report was: {out}");
    assert!(out.contains("modified: 1"), "report was: {out}");
    assert!(!h.orchestrator.shared_state().counters.changed());

    // t=12 and t=21 (exactly ten seconds later) stay closed.
    h.clock.set(Duration::from_secs(12));
    h.watch.emit_counts(1, 0, 0);
    h.clock.set(Duration::from_secs(21));
    h.watch.emit_counts(1, 0, 0);
    assert_eq!(h.orchestrator.run_count(), 2);
    assert_eq!(h.orchestrator.shared_state().counters.modified(), 2);

    // Just past t=21 the accumulated changes fire once.
    h.clock.set(Duration::from_secs(21) + Duration::from_millis(1));
    h.watch.emit_counts(1, 0, 0);
    assert_eq!(h.orchestrator.run_count(), 3);

    // Further batches start a new window.
    h.clock.set(Duration::from_secs(25));
    h.watch.emit_counts(0, 0, 1);
    assert_eq!(h.orchestrator.run_count(), 3);
}

#[test]
fn manual_trigger_before_the_window_ends_takes_the_pending_changes() {
    init_tracing();
    let h = HarnessBuilder::new().interval(TEN_SECONDS).build();
    h.orchestrator.trigger_now().expect("manual trigger runs");

    h.clock.set(Duration::from_secs(5));
    assert!(h.orchestrator.on_batch(batch(1, 0, 0)).is_none());

    let report = h.orchestrator.trigger_now().expect("manual always runs");
    assert_eq!(report.reason, TriggerReason::Manual);
    assert_eq!(report.snapshot.modified, 1);

    // The window restarted at t=5, so t=14 is still closed.
    h.clock.set(Duration::from_secs(14));
    assert!(h.orchestrator.on_batch(batch(1, 0, 0)).is_none());
}

#[test]
fn fires_once_per_set_of_changes() {
    init_tracing();
    let h = HarnessBuilder::new().interval(TEN_SECONDS).build();

    assert!(h.orchestrator.on_batch(batch(1, 0, 0)).is_some());

    // Well past the window, but only empty batches arrive.
    for secs in [20, 40, 60] {
        h.clock.set(Duration::from_secs(secs));
        assert!(h.orchestrator.on_batch(batch(0, 0, 0)).is_none());
    }
    assert_eq!(h.backend.invocation_count(), 1);
}
