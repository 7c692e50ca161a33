//! # Playback Controller Tests
//!
//! Transport operations, boundaries, timer tokens, invalidation, speed, and
//! the frames delivered to observers.

use std::time::Duration;

use matviz_core::config::PlaybackConfig;
use matviz_core::sim::Trace;
use matviz_core::{Matrix, Model, PlaybackController, PlaybackState, Run, SimError};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::fixtures::{example_a, example_b, example_product};
use crate::common::harness::TestContext;
use crate::common::mocks::observer::RecordingObserver;

// ══════════════════════════════════════════════════════════
// 1. Initial position and manual stepping
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(Model::Sequential, None)]
#[case(Model::Parallel, None)]
#[case(Model::Systolic, Some(0))]
fn starts_idle_at_run_start(#[case] model: Model, #[case] start: Option<usize>) {
    let ctx = TestContext::new(model, &example_a(), &example_b());
    let ctl = &ctx.controller;
    assert_eq!(ctl.state(), PlaybackState::Idle);
    assert_eq!(ctl.cycle_index(), start);
    assert!(!ctl.is_running());
    assert_eq!(ctl.pending_timer(), None);

    let frame = ctl.frame();
    assert_eq!(frame.cycle_index, start);
    assert_eq!(frame.snapshot.is_some(), start.is_some());
    assert_eq!(frame.total_cycles, model.active_cycles(2));
}

#[test]
fn sequential_steps_from_unstarted_and_back() {
    let mut ctx = TestContext::new(Model::Sequential, &example_a(), &example_b());
    assert!(ctx.controller.step_forward());
    assert_eq!(ctx.controller.cycle_index(), Some(0));
    assert!(ctx.controller.step_forward());
    assert_eq!(ctx.controller.cycle_index(), Some(1));
    assert!(ctx.controller.step_backward());
    assert!(ctx.controller.step_backward());
    assert_eq!(ctx.controller.cycle_index(), None);
    assert!(!ctx.controller.step_backward());
    assert_eq!(ctx.cursor_trail(), vec![Some(0), Some(1), Some(0), None]);
}

#[test]
fn systolic_cannot_step_before_idle_state() {
    let mut ctx = TestContext::new(Model::Systolic, &example_a(), &example_b());
    assert!(!ctx.controller.step_backward());
    assert_eq!(ctx.controller.cycle_index(), Some(0));
    assert!(ctx.frames.borrow().is_empty());
}

#[rstest]
#[case(Model::Sequential)]
#[case(Model::Parallel)]
#[case(Model::Systolic)]
fn step_forward_stops_at_last(#[case] model: Model) {
    let mut ctx = TestContext::new(model, &example_a(), &example_b());
    let mut moves = 0;
    while ctx.controller.step_forward() {
        moves += 1;
    }
    let last = ctx.controller.run().last_index();
    assert_eq!(ctx.controller.cycle_index(), last);
    assert_eq!(moves, model.step_count(2) - usize::from(model == Model::Systolic));
    let emitted = ctx.frames.borrow().len();
    assert!(!ctx.controller.step_forward());
    assert_eq!(ctx.frames.borrow().len(), emitted);
    assert_eq!(ctx.controller.state(), PlaybackState::Idle);
}

#[rstest]
#[case(Model::Sequential, 3)]
#[case(Model::Parallel, 1)]
#[case(Model::Systolic, 2)]
fn forward_then_back_restores_snapshot(#[case] model: Model, #[case] at: usize) {
    let mut ctx = TestContext::new(model, &Matrix::random(3, 5), &Matrix::random(3, 6));
    assert!(ctx.controller.seek(at));
    let before = ctx.last_frame().unwrap();
    assert!(ctx.controller.step_forward());
    assert!(ctx.controller.step_backward());
    assert_eq!(ctx.last_frame().unwrap(), before);
}

#[test]
fn seek_clamps_to_last() {
    let mut ctx = TestContext::new(Model::Parallel, &example_a(), &example_b());
    assert!(ctx.controller.seek(100));
    assert_eq!(ctx.controller.cycle_index(), Some(2));
    assert!(!ctx.controller.seek(2));
    assert!(ctx.controller.seek(0));
    assert_eq!(ctx.cursor_trail(), vec![Some(2), Some(0)]);
}

// ══════════════════════════════════════════════════════════
// 2. Timer-driven playback
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(Model::Sequential, 8)]
#[case(Model::Parallel, 3)]
#[case(Model::Systolic, 5)]
fn plays_to_finished(#[case] model: Model, #[case] ticks: usize) {
    let mut ctx = TestContext::new(model, &example_a(), &example_b());
    assert!(ctx.controller.start().is_some());
    assert!(ctx.controller.is_running());
    assert_eq!(ctx.run_to_completion(), ticks);
    assert_eq!(ctx.controller.state(), PlaybackState::Finished);
    assert_eq!(ctx.controller.pending_timer(), None);
    assert_eq!(ctx.controller.cycle_index(), ctx.controller.run().last_index());

    let last = ctx.last_frame().unwrap();
    assert_eq!(last.output, Some(example_product()));
    assert!(!last.is_running);
}

#[test]
fn start_while_running_keeps_token() {
    let mut ctx = TestContext::ones(Model::Systolic, 2);
    let first = ctx.controller.start().unwrap();
    assert_eq!(ctx.controller.start(), Some(first));
}

#[test]
fn start_from_finished_replays_from_beginning() {
    let mut ctx = TestContext::new(Model::Sequential, &example_a(), &example_b());
    let _ = ctx.controller.start();
    let _ = ctx.run_to_completion();
    ctx.frames.borrow_mut().clear();

    let token = ctx.controller.start().unwrap();
    assert_eq!(ctx.controller.state(), PlaybackState::Running);
    assert_eq!(ctx.controller.cycle_index(), None);
    let _ = ctx.controller.on_timer(token);
    assert_eq!(ctx.cursor_trail(), vec![None, Some(0)]);
}

#[test]
fn reset_then_replay_yields_identical_frames() {
    let mut ctx = TestContext::new(Model::Systolic, &Matrix::random(3, 1), &Matrix::random(3, 2));
    let _ = ctx.controller.start();
    let _ = ctx.run_to_completion();
    let first: Vec<_> = ctx.frames.borrow_mut().drain(..).collect();

    ctx.controller.reset();
    assert_eq!(ctx.controller.state(), PlaybackState::Idle);
    assert_eq!(ctx.controller.cycle_index(), Some(0));
    ctx.frames.borrow_mut().clear();

    let _ = ctx.controller.start();
    let _ = ctx.run_to_completion();
    let second: Vec<_> = ctx.frames.borrow().clone();
    assert_eq!(first, second);
}

#[test]
fn pause_keeps_position_and_resume_continues() {
    let mut ctx = TestContext::ones(Model::Sequential, 2);
    let t1 = ctx.controller.start().unwrap();
    let t2 = ctx.controller.on_timer(t1).unwrap();
    let _ = ctx.controller.on_timer(t2);
    ctx.controller.pause();
    assert_eq!(ctx.controller.state(), PlaybackState::Paused);
    assert_eq!(ctx.controller.cycle_index(), Some(1));

    let t3 = ctx.controller.start().unwrap();
    assert_eq!(ctx.controller.state(), PlaybackState::Running);
    let _ = ctx.controller.on_timer(t3);
    assert_eq!(ctx.controller.cycle_index(), Some(2));
}

#[test]
fn pause_outside_running_is_a_no_op() {
    let mut ctx = TestContext::ones(Model::Parallel, 2);
    ctx.controller.pause();
    assert_eq!(ctx.controller.state(), PlaybackState::Idle);
}

#[test]
fn stale_tokens_are_ignored() {
    let mut ctx = TestContext::ones(Model::Sequential, 2);

    let before_pause = ctx.controller.start().unwrap();
    ctx.controller.pause();
    assert_eq!(ctx.controller.on_timer(before_pause), None);

    let before_reset = ctx.controller.start().unwrap();
    assert_ne!(before_reset, before_pause);
    ctx.controller.reset();
    let _ = ctx.controller.start();
    assert_eq!(ctx.controller.on_timer(before_reset), None);
    assert_eq!(ctx.controller.on_timer(before_pause), None);

    assert_eq!(ctx.controller.cycle_index(), None);
    assert!(ctx.frames.borrow().is_empty());
}

#[test]
fn manual_steps_while_finished_return_to_paused() {
    let mut ctx = TestContext::ones(Model::Parallel, 2);
    let _ = ctx.controller.start();
    let _ = ctx.run_to_completion();
    assert!(ctx.controller.step_backward());
    assert_eq!(ctx.controller.state(), PlaybackState::Paused);
}

// ══════════════════════════════════════════════════════════
// 3. Invalidation
// ══════════════════════════════════════════════════════════

#[test]
fn rebuild_at_midpoint_resets_cursor_and_sequence() {
    let mut ctx = TestContext::new(Model::Sequential, &example_a(), &example_b());
    let mut token = ctx.controller.start();
    for _ in 0..4 {
        token = token.and_then(|t| ctx.controller.on_timer(t));
    }
    assert_eq!(ctx.controller.cycle_index(), Some(3));
    let stale = token.unwrap();

    let a = Matrix::identity(2);
    let b = Matrix::random(2, 9);
    ctx.controller.rebuild(&a, &b).unwrap();

    assert_eq!(ctx.controller.state(), PlaybackState::Idle);
    assert_eq!(ctx.controller.cycle_index(), None);
    assert_eq!(ctx.controller.pending_timer(), None);
    assert_eq!(ctx.controller.on_timer(stale), None);
    assert_eq!(ctx.controller.run().result(), b);
    assert_eq!(ctx.controller.run().model(), Model::Sequential);

    let last = ctx.last_frame().unwrap();
    assert_eq!(last.cycle_index, None);
    assert_eq!(last.output, None);
}

#[test]
fn rebuild_with_mismatched_operands_keeps_run() {
    let mut ctx = TestContext::new(Model::Parallel, &example_a(), &example_b());
    assert!(ctx.controller.step_forward());
    let err = ctx
        .controller
        .rebuild(&Matrix::ones(2), &Matrix::ones(3))
        .unwrap_err();
    assert!(matches!(err, SimError::DimensionMismatch { .. }));
    assert_eq!(ctx.controller.cycle_index(), Some(0));
    assert_eq!(ctx.controller.run().result(), example_product());
}

#[test]
fn load_switches_model() {
    let mut ctx = TestContext::new(Model::Sequential, &example_a(), &example_b());
    let stale = ctx.controller.start().unwrap();
    let run = Run::generate(Model::Systolic, &example_a(), &example_b()).unwrap();
    ctx.controller.load(run);
    assert_eq!(ctx.controller.run().model(), Model::Systolic);
    assert_eq!(ctx.controller.cycle_index(), Some(0));
    assert_eq!(ctx.controller.on_timer(stale), None);
    assert_eq!(ctx.last_frame().unwrap().total_cycles, 5);
}

// ══════════════════════════════════════════════════════════
// 4. Speed and elapsed time
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0.5, 2000)]
#[case(1.0, 1000)]
#[case(2.0, 500)]
#[case(10.0, 100)]
fn interval_is_base_over_speed(#[case] speed: f64, #[case] ms: u64) {
    let mut ctx = TestContext::ones(Model::Systolic, 2);
    ctx.controller.set_speed(speed).unwrap();
    assert_eq!(ctx.controller.interval(), Duration::from_millis(ms));
}

#[test]
fn out_of_range_speed_is_rejected_and_ignored() {
    let mut ctx = TestContext::ones(Model::Systolic, 2);
    ctx.controller.set_speed(4.0).unwrap();
    for bad in [0.0, 0.25, 10.5, -1.0, f64::NAN] {
        assert!(matches!(
            ctx.controller.set_speed(bad),
            Err(SimError::SpeedOutOfRange { .. })
        ));
    }
    assert_eq!(ctx.controller.interval(), Duration::from_millis(250));
}

#[test]
fn invalid_initial_speed_fails_construction() {
    let config = PlaybackConfig {
        speed: 50.0,
        ..PlaybackConfig::default()
    };
    let run = Run::generate(Model::Parallel, &example_a(), &example_b()).unwrap();
    assert!(PlaybackController::new(run, &config).is_err());
}

#[test]
fn speed_change_keeps_pending_tick() {
    let mut ctx = TestContext::ones(Model::Systolic, 2);
    let token = ctx.controller.start().unwrap();
    ctx.controller.set_speed(8.0).unwrap();
    assert_eq!(ctx.controller.pending_timer(), Some(token));
    assert!(ctx.controller.on_timer(token).is_some());
}

#[test]
fn advance_fires_once_per_full_interval() {
    let mut ctx = TestContext::ones(Model::Sequential, 2);
    assert!(!ctx.controller.advance(Duration::from_secs(5)));

    let _ = ctx.controller.start();
    assert!(!ctx.controller.advance(Duration::from_millis(600)));
    assert!(ctx.controller.advance(Duration::from_millis(400)));
    assert_eq!(ctx.controller.cycle_index(), Some(0));

    // A long stall still advances by a single step.
    assert!(ctx.controller.advance(Duration::from_secs(30)));
    assert_eq!(ctx.controller.cycle_index(), Some(1));
}

#[test]
fn advance_respects_speed() {
    let config = PlaybackConfig {
        speed: 4.0,
        ..PlaybackConfig::default()
    };
    let mut ctx = TestContext::with_config(Model::Parallel, &example_a(), &example_b(), &config);
    let _ = ctx.controller.start();
    assert!(!ctx.controller.advance(Duration::from_millis(200)));
    assert!(ctx.controller.advance(Duration::from_millis(50)));
    assert_eq!(ctx.controller.cycle_index(), Some(0));
}

#[test]
fn advance_does_nothing_after_pause() {
    let mut ctx = TestContext::ones(Model::Systolic, 2);
    let _ = ctx.controller.start();
    assert!(!ctx.controller.advance(Duration::from_millis(900)));
    ctx.controller.pause();
    assert!(!ctx.controller.advance(Duration::from_millis(900)));
    let _ = ctx.controller.start();
    // Time accumulated before the pause is discarded.
    assert!(!ctx.controller.advance(Duration::from_millis(900)));
    assert_eq!(ctx.controller.cycle_index(), Some(0));
}

// ══════════════════════════════════════════════════════════
// 5. Observers and edge cases
// ══════════════════════════════════════════════════════════

#[test]
fn subscribe_delivers_current_frame() {
    let run = Run::generate(Model::Systolic, &example_a(), &example_b()).unwrap();
    let mut ctl = PlaybackController::new(run, &PlaybackConfig::default()).unwrap();
    let (observer, log) = RecordingObserver::with_log();
    ctl.subscribe(Box::new(observer));
    let frames = log.borrow();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].cycle_index, Some(0));
    assert_eq!(frames[0].cycle, Some(0));
    assert_eq!(frames[0].output, Some(Matrix::zeros(2)));
}

#[test]
fn frames_report_running_state() {
    let mut ctx = TestContext::ones(Model::Parallel, 2);
    let token = ctx.controller.start().unwrap();
    let _ = ctx.controller.on_timer(token);
    let frame = ctx.last_frame().unwrap();
    assert!(frame.is_running);
    assert_eq!(frame.state, PlaybackState::Running);
    assert_eq!(frame.cycle, Some(0));
}

#[test]
fn stepping_onto_last_step_while_running_finishes() {
    let mut ctx = TestContext::ones(Model::Parallel, 2);
    let token = ctx.controller.start().unwrap();
    while ctx.controller.step_forward() {}

    assert_eq!(ctx.controller.cycle_index(), Some(2));
    assert_eq!(ctx.controller.state(), PlaybackState::Finished);
    assert_eq!(ctx.controller.pending_timer(), None);
    let frame = ctx.last_frame().unwrap();
    assert!(!frame.is_running);
    assert_eq!(frame.state, PlaybackState::Finished);

    let emitted = ctx.frames.borrow().len();
    assert_eq!(ctx.controller.on_timer(token), None);
    assert_eq!(ctx.frames.borrow().len(), emitted);
}

#[test]
fn seeking_while_running_finishes_only_at_last_step() {
    let mut ctx = TestContext::ones(Model::Systolic, 2);
    let _ = ctx.controller.start();
    assert!(ctx.controller.seek(3));
    assert_eq!(ctx.controller.state(), PlaybackState::Running);
    assert!(ctx.controller.pending_timer().is_some());

    assert!(ctx.controller.seek(100));
    assert_eq!(ctx.controller.cycle_index(), Some(5));
    assert_eq!(ctx.controller.state(), PlaybackState::Finished);
    assert_eq!(ctx.controller.pending_timer(), None);
    assert_eq!(ctx.last_frame().unwrap().state, PlaybackState::Finished);
}

#[test]
fn every_observer_is_notified() {
    let mut ctx = TestContext::ones(Model::Systolic, 2);
    let (second, log) = RecordingObserver::with_log();
    ctx.controller.subscribe(Box::new(second));
    log.borrow_mut().clear();
    assert!(ctx.controller.step_forward());
    assert_eq!(ctx.frames.borrow().len(), 1);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn empty_run_cannot_start() {
    let empty = Matrix::zeros(0);
    let run = Run::generate(Model::Sequential, &empty, &empty).unwrap();
    assert!(run.is_empty());
    let mut ctl = PlaybackController::new(run, &PlaybackConfig::default()).unwrap();
    assert_eq!(ctl.start(), None);
    assert_eq!(ctl.state(), PlaybackState::Idle);
    assert!(!ctl.step_forward());
    assert!(!ctl.seek(3));
}
