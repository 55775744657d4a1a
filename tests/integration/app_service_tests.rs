//! Integration tests for the AppService → controllers → relays pipeline.
//!
//! These run on the host and drive whole frames through the service with
//! a synthetic clock, a scripted classifier, and recording relay outputs.

use std::time::Duration;

use moodrelay::app::events::AppEvent;
use moodrelay::app::service::AppService;
use moodrelay::config::{FaceLossPolicy, SystemConfig};
use moodrelay::control::relay::{ClassificationEvent, Level, Output, ReleaseReason, RelayState};
use moodrelay::error::{ClassifierError, Error, PreconditionError};

use super::mock_hw::{ManualClock, MockRelays, RecordingSink, ScriptedClassifier};

use ClassificationEvent::{Happy, NoFace, NotHappy};

const MS: Duration = Duration::from_millis(1);

fn make_app(config: &SystemConfig, clock: &ManualClock) -> (AppService, MockRelays, RecordingSink) {
    let mut app = AppService::new(config, clock.peek());
    let mut hw = MockRelays::new();
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink).unwrap();
    (app, hw, sink)
}

fn run(
    app: &mut AppService,
    frames: usize,
    classifier: &mut ScriptedClassifier,
    clock: &ManualClock,
    hw: &mut MockRelays,
    sink: &mut RecordingSink,
) {
    for _ in 0..frames {
        app.process_frame(classifier, clock, hw, sink).unwrap();
    }
}

// ── Start-up ─────────────────────────────────────────────────

#[test]
fn start_drives_both_outputs_released() {
    let clock = ManualClock::new(MS);
    let (app, hw, sink) = make_app(&SystemConfig::default(), &clock);

    assert_eq!(
        hw.writes,
        vec![(Output::Happy, Level::DeEnergized), (Output::NotHappy, Level::DeEnergized)]
    );
    assert!(matches!(sink.events.as_slice(), [AppEvent::Started]));
    assert_eq!(app.relay_state(), RelayState::Idle);
}

// ── Relay hold behaviour ─────────────────────────────────────

#[test]
fn verdict_switch_releases_before_energizing() {
    let clock = ManualClock::new(MS);
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), &clock);
    let mut classifier = ScriptedClassifier::new([Some(Happy), Some(NotHappy)]);

    run(&mut app, 2, &mut classifier, &clock, &mut hw, &mut sink);

    assert_eq!(hw.energized(), Some(Output::NotHappy));
    let tail = &hw.writes[hw.writes.len() - 3..];
    assert_eq!(
        tail,
        [
            (Output::Happy, Level::DeEnergized),
            (Output::NotHappy, Level::DeEnergized),
            (Output::NotHappy, Level::Energized),
        ]
    );
}

#[test]
fn hold_expires_without_new_verdict() {
    let clock = ManualClock::new(MS);
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), &clock);
    let mut classifier = ScriptedClassifier::new([Some(Happy)]);
    classifier.push(None);
    classifier.push(None);

    run(&mut app, 1, &mut classifier, &clock, &mut hw, &mut sink);
    assert_eq!(hw.energized(), Some(Output::Happy));

    clock.advance(Duration::from_secs(3));
    run(&mut app, 1, &mut classifier, &clock, &mut hw, &mut sink);
    assert_eq!(hw.energized(), Some(Output::Happy), "still inside the hold");

    clock.advance(Duration::from_secs(1));
    run(&mut app, 1, &mut classifier, &clock, &mut hw, &mut sink);
    assert_eq!(hw.energized(), None);
    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::RelayReleased(ReleaseReason::HoldExpired)))
    );
}

#[test]
fn repeated_verdict_does_not_extend_hold() {
    let clock = ManualClock::new(MS);
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), &clock);
    let mut classifier = ScriptedClassifier::repeating(Some(Happy));

    run(&mut app, 1, &mut classifier, &clock, &mut hw, &mut sink);
    let first = app.relay_state().activated_at().unwrap();

    for _ in 0..3 {
        clock.advance(Duration::from_secs(1));
        run(&mut app, 1, &mut classifier, &clock, &mut hw, &mut sink);
        assert_eq!(app.relay_state().activated_at(), Some(first));
    }

    clock.advance(Duration::from_secs(1));
    run(&mut app, 1, &mut classifier, &clock, &mut hw, &mut sink);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RelayReleased(ReleaseReason::HoldExpired))),
        1
    );
}

#[test]
fn face_loss_releases_immediately_by_default() {
    let clock = ManualClock::new(MS);
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), &clock);
    let mut classifier = ScriptedClassifier::new([Some(NotHappy), Some(NoFace)]);

    run(&mut app, 2, &mut classifier, &clock, &mut hw, &mut sink);

    assert_eq!(hw.energized(), None);
    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::RelayReleased(ReleaseReason::FaceLost))
    ));
}

#[test]
fn hold_through_policy_keeps_relay_on_face_loss() {
    let mut config = SystemConfig::default();
    config.relay.face_loss = FaceLossPolicy::HoldThrough;
    let clock = ManualClock::new(MS);
    let (mut app, mut hw, mut sink) = make_app(&config, &clock);
    let mut classifier = ScriptedClassifier::new([Some(Happy), Some(NoFace)]);

    run(&mut app, 2, &mut classifier, &clock, &mut hw, &mut sink);
    assert_eq!(hw.energized(), Some(Output::Happy));
}

#[test]
fn ambiguous_frame_changes_nothing() {
    let clock = ManualClock::new(MS);
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), &clock);
    let mut classifier = ScriptedClassifier::new([Some(Happy), None]);

    run(&mut app, 1, &mut classifier, &clock, &mut hw, &mut sink);
    let writes = hw.writes.len();
    let report = app
        .process_frame(&mut classifier, &clock, &mut hw, &mut sink)
        .unwrap();

    assert!(report.classified);
    assert_eq!(report.verdict, None);
    assert_eq!(hw.writes.len(), writes);
    assert_eq!(hw.energized(), Some(Output::Happy));
}

// ── Adaptive rate ────────────────────────────────────────────

#[test]
fn slow_classifier_raises_skip_and_classifies_less() {
    // Each classification takes 200 ms against a 15 fps target.
    let clock = ManualClock::new(Duration::from_millis(200));
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), &clock);
    let mut classifier = ScriptedClassifier::repeating(None);

    run(&mut app, 60, &mut classifier, &clock, &mut hw, &mut sink);

    assert_eq!(app.current_skip(), 3);
    assert!(classifier.calls < 30, "classified {} of 60 frames", classifier.calls);
    assert!(sink.count(|e| matches!(e, AppEvent::SkipChanged { .. })) >= 2);
    assert!(sink.count(|e| matches!(e, AppEvent::Telemetry(_))) >= 1);
    assert!(app.current_fps() > 0.0);
}

#[test]
fn fast_classifier_keeps_every_frame() {
    let clock = ManualClock::new(Duration::from_millis(10));
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), &clock);
    let mut classifier = ScriptedClassifier::repeating(None);

    run(&mut app, 40, &mut classifier, &clock, &mut hw, &mut sink);

    assert_eq!(app.current_skip(), 1);
    assert_eq!(classifier.calls, 40);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SkipChanged { .. })), 0);
}

// ── Failure handling ─────────────────────────────────────────

#[test]
fn failed_energize_is_reapplied_next_frame() {
    let clock = ManualClock::new(MS);
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), &clock);
    let mut classifier = ScriptedClassifier::new([Some(Happy), None]);
    hw.fail_once = Some((Output::Happy, Level::Energized));

    let err = app
        .process_frame(&mut classifier, &clock, &mut hw, &mut sink)
        .unwrap_err();
    assert!(matches!(err, Error::Actuator(_)));
    assert!(app.outputs_dirty());
    assert_eq!(hw.energized(), None);
    assert_eq!(app.relay_state().current_output(), Some(Output::Happy));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::OutputFault(_))), 1);

    app.process_frame(&mut classifier, &clock, &mut hw, &mut sink)
        .unwrap();
    assert!(!app.outputs_dirty());
    assert_eq!(hw.energized(), Some(Output::Happy));
}

#[test]
fn failed_release_blocks_the_other_output() {
    let clock = ManualClock::new(MS);
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), &clock);
    let mut classifier = ScriptedClassifier::new([Some(Happy), Some(NotHappy), None]);
    run(&mut app, 1, &mut classifier, &clock, &mut hw, &mut sink);

    hw.fail_once = Some((Output::Happy, Level::DeEnergized));
    assert!(app
        .process_frame(&mut classifier, &clock, &mut hw, &mut sink)
        .is_err());
    assert_eq!(hw.energized(), Some(Output::Happy), "stuck output stays, other untouched");

    app.process_frame(&mut classifier, &clock, &mut hw, &mut sink)
        .unwrap();
    assert_eq!(hw.energized(), Some(Output::NotHappy));
}

#[test]
fn hold_expires_while_classifier_keeps_failing() {
    let clock = ManualClock::new(MS);
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), &clock);
    let mut classifier =
        ScriptedClassifier::new([Some(Happy)]).then_fail_forever(ClassifierError::Malformed);

    run(&mut app, 1, &mut classifier, &clock, &mut hw, &mut sink);
    assert_eq!(hw.energized(), Some(Output::Happy));

    // Inside the hold: errors surface, output untouched.
    assert_eq!(
        app.process_frame(&mut classifier, &clock, &mut hw, &mut sink),
        Err(Error::Classifier(ClassifierError::Malformed))
    );
    assert_eq!(hw.energized(), Some(Output::Happy));

    clock.advance(Duration::from_secs(30));
    assert_eq!(
        app.process_frame(&mut classifier, &clock, &mut hw, &mut sink),
        Err(Error::Classifier(ClassifierError::Malformed))
    );
    assert_eq!(hw.energized(), None);
    assert_eq!(app.relay_state(), RelayState::Idle);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RelayReleased(ReleaseReason::HoldExpired))),
        1
    );
    assert_eq!(app.frame_count(), 3);
    assert_eq!(classifier.calls, 3);
}

#[test]
fn backwards_clock_is_reported() {
    let clock = ManualClock::new(MS);
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), &clock);
    let mut classifier = ScriptedClassifier::repeating(None);

    clock.advance(Duration::from_secs(5));
    run(&mut app, 1, &mut classifier, &clock, &mut hw, &mut sink);

    clock.set(moodrelay::time::Timestamp::from_secs_f32(2.0));
    let err = app
        .process_frame(&mut classifier, &clock, &mut hw, &mut sink)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Precondition(PreconditionError::NonMonotonicClock { .. })
    ));
}

// ── Shutdown ─────────────────────────────────────────────────

#[test]
fn shutdown_releases_held_output_and_reports_stats() {
    let clock = ManualClock::new(MS);
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), &clock);
    let mut classifier = ScriptedClassifier::new([Some(Happy), None, None]);
    run(&mut app, 3, &mut classifier, &clock, &mut hw, &mut sink);
    assert_eq!(hw.energized(), Some(Output::Happy));

    app.shutdown(&mut hw, &mut sink);

    assert_eq!(hw.energized(), None);
    assert_eq!(app.relay_state(), RelayState::Idle);
    match sink.events.last() {
        Some(AppEvent::Stopped(stats)) => {
            assert_eq!(stats.frames, 3);
            assert_eq!(stats.processed_frames, 3);
            assert_eq!(stats.relay, RelayState::Idle);
        }
        other => panic!("expected Stopped, got {:?}", other),
    }
}

#[test]
fn shutdown_survives_a_failing_output() {
    let clock = ManualClock::new(MS);
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), &clock);
    let mut classifier = ScriptedClassifier::new([Some(NotHappy)]);
    run(&mut app, 1, &mut classifier, &clock, &mut hw, &mut sink);

    hw.fail_once = Some((Output::Happy, Level::DeEnergized));
    app.shutdown(&mut hw, &mut sink);

    assert!(!hw.is_energized(Output::NotHappy), "second write still attempted");
    assert!(matches!(sink.events.last(), Some(AppEvent::Stopped(_))));
}
