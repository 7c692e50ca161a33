//! Playback controller.
//!
//! The controller owns a cursor into one [`Run`] and moves it forward and
//! backward in response to transport calls and timer ticks. It is model-agnostic:
//! everything it needs from a run is the [`Trace`] capability plus the run's
//! start convention.
//!
//! # State machine
//!
//! ```text
//!            start             last index reached
//!   Idle ───────────▶ Running ───────────────────▶ Finished
//!    ▲                 │   ▲                          │
//!    │ reset     pause │   │ start                    │ start (replays from the beginning)
//!    │                 ▼   │                          │
//!    └──────────────── Paused ◀───────────────────────┘
//! ```
//!
//! # Timers
//!
//! The controller never sleeps. While running it hands out a [`TimerToken`] for
//! the next tick and the host calls [`PlaybackController::on_timer`] with it once
//! [`interval`](PlaybackController::interval) has elapsed, or simply feeds wall
//! time into [`advance`](PlaybackController::advance). Every pause, reset, or
//! run change bumps an epoch, so a token issued before the change no longer
//! matches and its tick is swallowed.

use std::fmt;
use std::time::Duration;

use tracing::{info, trace, warn};

use super::run::{Run, Trace};
use super::snapshot::Snapshot;
use crate::common::{Matrix, Result};
use crate::config::PlaybackConfig;

/// Transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    /// At the start of the run, not playing.
    #[default]
    Idle,
    /// Advancing on every timer tick.
    Running,
    /// Stopped part-way; the cursor is kept.
    Paused,
    /// Reached the last step while running. Behaves like `Paused`, except that
    /// `start` replays from the beginning.
    Finished,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Handle for one scheduled tick.
///
/// Only the most recently issued token is honoured; all earlier tokens are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    epoch: u64,
}

/// What the rendering side sees at any instant.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Cursor position; `None` before the first step of an unstarted run.
    pub cycle_index: Option<usize>,
    /// Modeled execution cycles of the run.
    pub total_cycles: usize,
    /// Whether the timer is advancing the cursor.
    pub is_running: bool,
    /// Transport state.
    pub state: PlaybackState,
    /// Step under the cursor; `None` before the first step.
    pub snapshot: Option<Snapshot<'a>>,
}

impl<'a> Frame<'a> {
    fn capture(run: &'a Run, cursor: Option<usize>, state: PlaybackState) -> Self {
        Self {
            cycle_index: cursor,
            total_cycles: run.total_cycles(),
            is_running: state == PlaybackState::Running,
            state,
            snapshot: cursor.and_then(|i| run.snapshot_at(i)),
        }
    }
}

/// Receives a [`Frame`] every time the cursor moves or a new run is loaded.
pub trait FrameObserver {
    /// Called after the cursor changed.
    fn on_frame(&mut self, frame: &Frame<'_>);
}

/// Drives a cursor through a [`Run`].
pub struct PlaybackController {
    run: Run,
    cursor: Option<usize>,
    state: PlaybackState,
    config: PlaybackConfig,
    speed: f64,
    epoch: u64,
    pending: Option<TimerToken>,
    elapsed: Duration,
    observers: Vec<Box<dyn FrameObserver>>,
}

impl fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("model", &self.run.model())
            .field("cursor", &self.cursor)
            .field("state", &self.state)
            .field("speed", &self.speed)
            .field("epoch", &self.epoch)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl PlaybackController {
    /// Creates a controller positioned at the start of `run`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::SpeedOutOfRange`](crate::common::SimError::SpeedOutOfRange)
    /// if `config.speed` lies outside the configured bounds.
    pub fn new(run: Run, config: &PlaybackConfig) -> Result<Self> {
        let speed = config.validate_speed(config.speed)?;
        Ok(Self {
            cursor: run.start_index(),
            run,
            state: PlaybackState::Idle,
            config: config.clone(),
            speed,
            epoch: 0,
            pending: None,
            elapsed: Duration::ZERO,
            observers: Vec::new(),
        })
    }

    /// Registers an observer; it receives the current frame immediately.
    pub fn subscribe(&mut self, mut observer: Box<dyn FrameObserver>) {
        observer.on_frame(&Frame::capture(&self.run, self.cursor, self.state));
        self.observers.push(observer);
    }

    /// The active run.
    pub const fn run(&self) -> &Run {
        &self.run
    }

    /// Cursor position; `None` before the first step.
    pub const fn cycle_index(&self) -> Option<usize> {
        self.cursor
    }

    /// Transport state.
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether the timer is advancing the cursor.
    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Running
    }

    /// Current speed multiplier.
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Time between ticks at the current speed: `base_interval / speed`.
    pub fn interval(&self) -> Duration {
        self.config.base_interval().div_f64(self.speed)
    }

    /// Token of the tick currently scheduled, if playing.
    pub const fn pending_timer(&self) -> Option<TimerToken> {
        self.pending
    }

    /// Current frame.
    pub fn frame(&self) -> Frame<'_> {
        Frame::capture(&self.run, self.cursor, self.state)
    }

    /// Step under the cursor.
    pub fn current(&self) -> Option<Snapshot<'_>> {
        self.cursor.and_then(|i| self.run.snapshot_at(i))
    }

    /// Starts or resumes playback and returns the token for the first tick.
    ///
    /// From the last step, the cursor first rewinds to the start. Calling
    /// `start` while already running returns the pending token unchanged.
    /// Returns `None` for an empty run.
    pub fn start(&mut self) -> Option<TimerToken> {
        if self.state == PlaybackState::Running {
            return self.pending;
        }
        let last = self.run.last_index()?;
        if self.cursor == Some(last) {
            self.move_to(self.run.start_index());
        }
        self.elapsed = Duration::ZERO;
        self.transition(PlaybackState::Running);
        let token = self.schedule();
        Some(token)
    }

    /// Stops the timer and keeps the cursor. No effect unless running.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Running {
            self.cancel_timer();
            self.transition(PlaybackState::Paused);
        }
    }

    /// Stops the timer and rewinds to the start. The run itself is untouched.
    pub fn reset(&mut self) {
        self.cancel_timer();
        self.transition(PlaybackState::Idle);
        self.move_to(self.run.start_index());
    }

    /// Moves one step forward. Returns `false` (and does nothing) at the last step.
    ///
    /// Reaching the last step while running finishes playback.
    pub fn step_forward(&mut self) -> bool {
        let next = self.cursor.map_or(0, |i| i + 1);
        match self.run.last_index() {
            Some(last) if next <= last => {
                self.settle_at(Some(next));
                self.move_to(Some(next));
                true
            }
            _ => false,
        }
    }

    /// Moves one step backward. Returns `false` (and does nothing) at the start.
    ///
    /// For runs that start before their first step, stepping back from step 0
    /// returns to that unstarted position.
    pub fn step_backward(&mut self) -> bool {
        if self.cursor == self.run.start_index() {
            return false;
        }
        let Some(current) = self.cursor else {
            return false;
        };
        self.leave_finished();
        self.move_to(current.checked_sub(1));
        true
    }

    /// Jumps to step `index`, clamped to the last step.
    ///
    /// Landing on the last step while running finishes playback.
    /// Returns whether the cursor moved.
    pub fn seek(&mut self, index: usize) -> bool {
        let Some(last) = self.run.last_index() else {
            return false;
        };
        let target = Some(index.min(last));
        if target == self.cursor {
            return false;
        }
        self.settle_at(target);
        self.move_to(target);
        true
    }

    /// Changes the speed multiplier; the new interval applies from the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::SpeedOutOfRange`](crate::common::SimError::SpeedOutOfRange)
    /// for values outside `[min_speed, max_speed]`; the speed is left unchanged.
    pub fn set_speed(&mut self, multiplier: f64) -> Result<()> {
        match self.config.validate_speed(multiplier) {
            Ok(speed) => {
                self.speed = speed;
                trace!(speed, interval = ?self.interval(), "speed changed");
                Ok(())
            }
            Err(e) => {
                warn!(multiplier, "rejected speed");
                Err(e)
            }
        }
    }

    /// Handles a fired tick.
    ///
    /// Advances one step when `token` is the pending token and playback is
    /// running; stale tokens are ignored. Returns the token for the following
    /// tick, or `None` once playback stops.
    pub fn on_timer(&mut self, token: TimerToken) -> Option<TimerToken> {
        if self.state != PlaybackState::Running || self.pending != Some(token) {
            trace!(epoch = token.epoch, current = self.epoch, "stale tick ignored");
            return None;
        }
        let last = self.run.last_index()?;
        let next = self.cursor.map_or(0, |i| i + 1).min(last);
        if next == last {
            // The final frame already reports `Finished`.
            self.cancel_timer();
            self.transition(PlaybackState::Finished);
            if self.cursor == Some(next) {
                self.notify();
            } else {
                self.move_to(Some(next));
            }
            return None;
        }
        self.move_to(Some(next));
        trace!(cursor = next, "tick");
        Some(self.schedule())
    }

    /// Feeds elapsed wall time into the timer.
    ///
    /// Fires at most one tick per call once a full interval has accumulated;
    /// time beyond that is dropped rather than replayed. Returns whether a tick fired.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        if self.state != PlaybackState::Running {
            self.elapsed = Duration::ZERO;
            return false;
        }
        self.elapsed += elapsed;
        if self.elapsed < self.interval() {
            return false;
        }
        self.elapsed = Duration::ZERO;
        if let Some(token) = self.pending {
            let _ = self.on_timer(token);
        }
        true
    }

    /// Replaces the run, cancels any pending tick, and returns to the start in `Idle`.
    pub fn load(&mut self, run: Run) {
        self.cancel_timer();
        self.elapsed = Duration::ZERO;
        info!(model = %run.model(), n = run.size(), steps = run.len(), "run loaded");
        self.cursor = run.start_index();
        self.run = run;
        self.state = PlaybackState::Idle;
        self.notify();
    }

    /// Regenerates the run for new operands with the same model.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DimensionMismatch`](crate::common::SimError::DimensionMismatch)
    /// when `a` and `b` differ in size; the current run is kept in that case.
    pub fn rebuild(&mut self, a: &Matrix, b: &Matrix) -> Result<()> {
        let run = Run::generate(self.run.model(), a, b)?;
        self.load(run);
        Ok(())
    }

    fn schedule(&mut self) -> TimerToken {
        self.epoch += 1;
        let token = TimerToken { epoch: self.epoch };
        self.pending = Some(token);
        token
    }

    fn cancel_timer(&mut self) {
        if self.pending.take().is_some() {
            self.epoch += 1;
        }
    }

    fn transition(&mut self, to: PlaybackState) {
        if self.state != to {
            info!(from = %self.state, to = %to, cursor = ?self.cursor, "playback state");
            self.state = to;
        }
    }

    /// State change for a manual move to `target`.
    fn settle_at(&mut self, target: Option<usize>) {
        let at_last = target.is_some() && target == self.run.last_index();
        if self.state == PlaybackState::Running && at_last {
            self.cancel_timer();
            self.transition(PlaybackState::Finished);
        } else {
            self.leave_finished();
        }
    }

    fn leave_finished(&mut self) {
        if self.state == PlaybackState::Finished {
            self.transition(PlaybackState::Paused);
        }
    }

    fn move_to(&mut self, cursor: Option<usize>) {
        if self.cursor != cursor {
            self.cursor = cursor;
            self.notify();
        }
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let frame = Frame::capture(&self.run, self.cursor, self.state);
        for observer in &mut self.observers {
            observer.on_frame(&frame);
        }
    }
}
