//! Integration tests for the leak-guarded text field.
//!
//! Drives [`LeakGuardedTextField`] against the simulated platform
//! control, covering the full pipeline: layout signal -> repair ->
//! verification -> failure reporting.

use std::sync::{Arc, Mutex};

use blinkguard_core::bus::BlinkBus;
use blinkguard_core::control::TextFieldControl;
use blinkguard_field::{
    ErrorCode, Fault, FailureCallback, FailureReport, FailureReporter, LeakGuardedTextField,
    run_repair,
};
use blinkguard_harness::{SeverBehavior, SimTextField};
use proptest::prelude::*;

fn leaked_reporter() -> &'static FailureReporter {
    Box::leak(Box::new(FailureReporter::new()))
}

fn observer() -> (FailureCallback, Arc<Mutex<Vec<FailureReport>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback: FailureCallback = Arc::new(move |report: &FailureReport| {
        sink.lock().unwrap().push(report.clone());
    });
    (callback, seen)
}

// ============================================================================
// Leak behavior with and without the guard
// ============================================================================

#[test]
fn unguarded_field_leaks_and_spams_the_bus() {
    let bus = BlinkBus::new();
    let weak = {
        let mut field = SimTextField::new(&bus);
        field.layout();
        field.caret_weak()
    };

    // The field is gone but its caret state is pinned by the cycle, so
    // the bus keeps delivering ticks to it indefinitely.
    assert!(weak.upgrade().is_some());
    for _ in 0..10 {
        assert_eq!(bus.tick(), 1);
    }
    assert_eq!(bus.ticks_delivered(), 10);
}

#[test]
fn guarded_field_is_collectable_after_layout() {
    let bus = BlinkBus::new();
    let weak = {
        let mut field =
            LeakGuardedTextField::with_reporter(SimTextField::new(&bus), leaked_reporter());
        field.layout();
        field.inner().caret_weak()
    };

    assert!(weak.upgrade().is_none());
    assert_eq!(bus.tick(), 0);
}

#[test]
fn guard_survives_repeated_layout_storms() {
    let bus = BlinkBus::new();
    let reporter = leaked_reporter();
    let mut field = LeakGuardedTextField::with_reporter(SimTextField::new(&bus), reporter);

    for _ in 0..50 {
        field.layout();
    }
    assert!(!field.caret_owner_held());
    assert!(reporter.last_failure().is_none());
}

// ============================================================================
// Callback delivery
// ============================================================================

#[test]
fn failure_before_registration_is_replayed_once() {
    let bus = BlinkBus::new();
    let reporter = leaked_reporter();
    let mut field = LeakGuardedTextField::with_reporter(
        SimTextField::new(&bus).with_sever_behavior(SeverBehavior::Sticky),
        reporter,
    );
    field.layout();

    let (callback, seen) = observer();
    reporter.set_callback(Some(callback));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].code(), ErrorCode::NoFix);
}

#[test]
fn failure_after_registration_carries_the_cause() {
    let bus = BlinkBus::new();
    let reporter = leaked_reporter();
    let (callback, seen) = observer();
    reporter.set_callback(Some(callback));

    let mut field = LeakGuardedTextField::with_reporter(
        SimTextField::new(&bus).with_sever_behavior(SeverBehavior::Panic),
        reporter,
    );
    field.layout();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].code(), ErrorCode::Exception);
    match seen[0].fault() {
        Some(Fault::Exception { message }) => {
            assert!(message.contains("caret blink state"));
        }
        other => panic!("expected an exception fault, got {other:?}"),
    }
}

#[test]
fn first_failure_wins_across_controls() {
    let bus = BlinkBus::new();
    let reporter = leaked_reporter();

    let mut panicking = LeakGuardedTextField::with_reporter(
        SimTextField::new(&bus).with_sever_behavior(SeverBehavior::Panic),
        reporter,
    );
    let mut sticky = LeakGuardedTextField::with_reporter(
        SimTextField::new(&bus).with_sever_behavior(SeverBehavior::Sticky),
        reporter,
    );

    panicking.layout();
    sticky.layout();

    let (callback, seen) = observer();
    reporter.set_callback(Some(callback));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].code(), ErrorCode::Exception);
}

#[test]
fn replacing_the_callback_redirects_delivery() {
    let bus = BlinkBus::new();
    let reporter = leaked_reporter();

    let (first, first_seen) = observer();
    reporter.set_callback(Some(first));

    let (second, second_seen) = observer();
    reporter.set_callback(Some(second));

    let mut field = LeakGuardedTextField::with_reporter(
        SimTextField::new(&bus).with_sever_behavior(SeverBehavior::Sticky),
        reporter,
    );
    field.layout();

    assert!(first_seen.lock().unwrap().is_empty());
    assert_eq!(second_seen.lock().unwrap().len(), 1);
}

#[test]
fn persistent_fault_is_reported_once() {
    let bus = BlinkBus::new();
    let reporter = leaked_reporter();
    let (callback, seen) = observer();
    reporter.set_callback(Some(callback));

    let mut field = LeakGuardedTextField::with_reporter(
        SimTextField::new(&bus).with_sever_behavior(SeverBehavior::Sticky),
        reporter,
    );

    // The condition persists, so every layout signal re-attempts the
    // repair, but only the first failure reaches the callback.
    for _ in 0..5 {
        field.layout();
    }
    assert!(field.caret_owner_held());
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn static_hook_reaches_the_global_reporter() {
    // Registration only; nothing in the test suite records a failure to
    // the global reporter, so the callback must never fire.
    let (callback, seen) = observer();
    LeakGuardedTextField::<SimTextField>::set_failed_to_apply_fix_callback(Some(callback));
    LeakGuardedTextField::<SimTextField>::set_failed_to_apply_fix_callback(None);
    assert!(seen.lock().unwrap().is_empty());
}

// ============================================================================
// Repair ordering
// ============================================================================

#[test]
fn repair_order_does_not_change_base_layout_result() {
    let bus = BlinkBus::new();

    let mut repair_after = SimTextField::new(&bus).with_value("hello");
    repair_after.layout();
    run_repair(&mut repair_after, false);

    let mut repair_before = SimTextField::new(&bus).with_value("hello");
    run_repair(&mut repair_before, false);
    repair_before.layout();

    assert_eq!(repair_after.value(), repair_before.value());
    assert_eq!(repair_after.cursor(), repair_before.cursor());
    assert_eq!(repair_after.layout_passes(), repair_before.layout_passes());
    assert_eq!(
        repair_after.is_input_target(),
        repair_before.is_input_target()
    );
}

// ============================================================================
// Randomized interaction sequences
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Layout,
    Become,
    Resign,
    Insert(char),
    DeleteBack,
    Tick,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Layout),
        1 => Just(Op::Become),
        1 => Just(Op::Resign),
        2 => any::<char>().prop_map(Op::Insert),
        1 => Just(Op::DeleteBack),
        2 => Just(Op::Tick),
    ]
}

proptest! {
    #[test]
    fn guarded_field_never_ends_a_layout_pass_leaked(
        ops in proptest::collection::vec(op_strategy(), 1..64),
    ) {
        let bus = BlinkBus::new();
        let reporter = leaked_reporter();
        let mut field =
            LeakGuardedTextField::with_reporter(SimTextField::new(&bus), reporter);
        let mut ever_became_target = false;

        for op in ops {
            match op {
                Op::Layout => {
                    field.layout();
                    // The vulnerable condition must be gone once the
                    // signal returns, unless this instance belongs to
                    // the normal focus lifecycle.
                    if field.caret_owner_held() {
                        prop_assert!(field.is_input_target() || ever_became_target);
                    }
                }
                Op::Become => {
                    field.become_input_target();
                    ever_became_target = true;
                }
                Op::Resign => {
                    field.resign_input_target();
                }
                Op::Insert(c) => field.insert_char(c),
                Op::DeleteBack => field.delete_char_back(),
                Op::Tick => {
                    bus.tick();
                }
            }
        }

        // Clean severance never produces a failure.
        prop_assert!(reporter.last_failure().is_none());
    }

    #[test]
    fn sticky_severance_reports_at_most_once(
        ops in proptest::collection::vec(op_strategy(), 1..64),
    ) {
        let bus = BlinkBus::new();
        let reporter = leaked_reporter();
        let (callback, seen) = observer();
        reporter.set_callback(Some(callback));

        let mut field = LeakGuardedTextField::with_reporter(
            SimTextField::new(&bus).with_sever_behavior(SeverBehavior::Sticky),
            reporter,
        );

        for op in ops {
            match op {
                Op::Layout => field.layout(),
                Op::Become => {
                    field.become_input_target();
                }
                Op::Resign => {
                    field.resign_input_target();
                }
                Op::Insert(c) => field.insert_char(c),
                Op::DeleteBack => field.delete_char_back(),
                Op::Tick => {
                    bus.tick();
                }
            }
        }

        let seen = seen.lock().unwrap();
        prop_assert!(seen.len() <= 1);
        if let Some(report) = seen.first() {
            prop_assert_eq!(report.code(), ErrorCode::NoFix);
        }
    }
}
