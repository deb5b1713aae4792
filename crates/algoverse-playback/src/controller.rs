//! The playback state machine.
//!
//! ```text
//!            load                 play (not at terminal)
//!   Idle ──────────▶ Paused ───────────────────────────▶ Playing
//!    ▲                 ▲  ◀──── pause / seek / tick reaches terminal ──┘
//!    └──── unload ─────┘
//! ```
//!
//! Stepping is only allowed while paused. Every operation on an idle
//! controller reports [`Outcome::NothingLoaded`] instead of failing.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use algoverse_core::{StepRecord, TraceRun};

use crate::clock::{Clock, SystemClock};
use crate::error::PlaybackError;
use crate::render::RenderSink;

/// Slowest accepted speed multiplier.
pub const MIN_SPEED: f64 = 0.25;
/// Fastest accepted speed multiplier.
pub const MAX_SPEED: f64 = 4.0;

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// No trace run loaded.
    Idle,
    Paused,
    /// The cursor advances on every elapsed period.
    Playing,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Paused => "paused",
            PlaybackState::Playing => "playing",
        };
        f.write_str(name)
    }
}

/// Load counter used to discard results of superseded recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// What a navigation call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The cursor moved. The state may also have changed (e.g. a tick that
    /// reached the terminal step pauses playback).
    Moved { from: usize, to: usize },
    /// The state changed without moving the cursor.
    StateChanged(PlaybackState),
    /// Nothing to do: already at a boundary, already in the target state,
    /// or no period elapsed.
    Unchanged,
    /// The controller is idle.
    NothingLoaded,
    /// Stepping was requested while playing.
    RequiresPause,
    /// `load_if_current` received a result for an outdated generation.
    Stale,
}

/// Configuration for a playback controller.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Time between automatic advances at speed 1.0. Default: 1000 ms.
    pub base_interval: Duration,
    /// Speed multiplier at construction. Default: 1.0.
    pub initial_speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            base_interval: Duration::from_millis(1000),
            initial_speed: 1.0,
        }
    }
}

/// Validates a speed multiplier and clamps it into `[MIN_SPEED, MAX_SPEED]`.
fn normalize_speed(speed: f64) -> Result<f64, PlaybackError> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(PlaybackError::InvalidSpeed { speed });
    }
    Ok(speed.clamp(MIN_SPEED, MAX_SPEED))
}

/// Navigation over one loaded trace run.
pub struct PlaybackController<C: Clock = SystemClock> {
    config: PlaybackConfig,
    clock: C,
    run: Option<TraceRun>,
    cursor: usize,
    state: PlaybackState,
    speed: f64,
    generation: Generation,
    /// Clock reading the current period is measured from.
    period_start: Duration,
    sink: Option<Box<dyn RenderSink>>,
}

impl<C: Clock> fmt::Debug for PlaybackController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("len", &self.len())
            .field("speed", &self.speed)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<C: Clock> PlaybackController<C> {
    /// Creates an idle controller with the default configuration.
    pub fn new(clock: C) -> Self {
        PlaybackController {
            config: PlaybackConfig::default(),
            clock,
            run: None,
            cursor: 0,
            state: PlaybackState::Idle,
            speed: 1.0,
            generation: Generation(0),
            period_start: Duration::ZERO,
            sink: None,
        }
    }

    /// Creates an idle controller, validating `config.initial_speed`.
    pub fn with_config(config: PlaybackConfig, clock: C) -> Result<Self, PlaybackError> {
        let speed = normalize_speed(config.initial_speed)?;
        let mut controller = Self::new(clock);
        controller.config = config;
        controller.speed = speed;
        Ok(controller)
    }

    /// Attaches the sink that receives the step under the cursor.
    pub fn with_sink(mut self, sink: impl RenderSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn set_sink(&mut self, sink: impl RenderSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    // -- Loading --------------------------------------------------------

    /// Replaces the loaded run, resets the cursor to 0 and pauses.
    ///
    /// An empty run is rejected and leaves the controller untouched.
    pub fn load(&mut self, run: TraceRun) -> Result<Generation, PlaybackError> {
        if run.is_empty() {
            error!(
                algorithm = %run.algorithm,
                "refusing to load an empty trace run"
            );
            return Err(PlaybackError::EmptyTrace);
        }

        self.generation = Generation(self.generation.0 + 1);
        debug!(
            algorithm = %run.algorithm,
            steps = run.len(),
            generation = %self.generation,
            "loaded trace run"
        );
        self.run = Some(run);
        self.cursor = 0;
        self.state = PlaybackState::Paused;
        self.period_start = self.clock.now();
        self.render();
        Ok(self.generation)
    }

    /// Loads `run` only if no load or unload happened since `expected` was
    /// read from [`generation`](Self::generation).
    pub fn load_if_current(
        &mut self,
        expected: Generation,
        run: TraceRun,
    ) -> Result<Outcome, PlaybackError> {
        if expected != self.generation {
            debug!(
                expected = %expected,
                current = %self.generation,
                "discarding superseded trace run"
            );
            return Ok(Outcome::Stale);
        }
        self.load(run)?;
        Ok(Outcome::StateChanged(PlaybackState::Paused))
    }

    /// Drops the loaded run and returns to `Idle`.
    pub fn unload(&mut self) -> Outcome {
        if self.run.take().is_none() {
            return Outcome::NothingLoaded;
        }
        self.generation = Generation(self.generation.0 + 1);
        self.cursor = 0;
        self.state = PlaybackState::Idle;
        Outcome::StateChanged(PlaybackState::Idle)
    }

    // -- Navigation -----------------------------------------------------

    /// Starts auto-advance. At the terminal step this is a no-op and the
    /// controller stays paused.
    pub fn play(&mut self) -> Outcome {
        match self.state {
            PlaybackState::Idle => Outcome::NothingLoaded,
            PlaybackState::Playing => Outcome::Unchanged,
            PlaybackState::Paused if self.at_terminal() => Outcome::Unchanged,
            PlaybackState::Paused => {
                self.state = PlaybackState::Playing;
                self.period_start = self.clock.now();
                trace!(cursor = self.cursor, "playing");
                Outcome::StateChanged(PlaybackState::Playing)
            }
        }
    }

    pub fn pause(&mut self) -> Outcome {
        match self.state {
            PlaybackState::Idle => Outcome::NothingLoaded,
            PlaybackState::Paused => Outcome::Unchanged,
            PlaybackState::Playing => {
                self.state = PlaybackState::Paused;
                trace!(cursor = self.cursor, "paused");
                Outcome::StateChanged(PlaybackState::Paused)
            }
        }
    }

    /// Moves one step forward; a no-op at the terminal step.
    pub fn step_forward(&mut self) -> Outcome {
        match self.state {
            PlaybackState::Idle => Outcome::NothingLoaded,
            PlaybackState::Playing => Outcome::RequiresPause,
            PlaybackState::Paused => self.move_to(self.cursor.saturating_add(1)),
        }
    }

    /// Moves one step back; a no-op at index 0.
    pub fn step_backward(&mut self) -> Outcome {
        match self.state {
            PlaybackState::Idle => Outcome::NothingLoaded,
            PlaybackState::Playing => Outcome::RequiresPause,
            PlaybackState::Paused => self.move_to(self.cursor.saturating_sub(1)),
        }
    }

    /// Jumps to `index` (clamped) and pauses.
    pub fn seek(&mut self, index: usize) -> Outcome {
        if self.state == PlaybackState::Idle {
            return Outcome::NothingLoaded;
        }
        let was_playing = self.state == PlaybackState::Playing;
        self.state = PlaybackState::Paused;
        match self.move_to(index) {
            Outcome::Unchanged if was_playing => Outcome::StateChanged(PlaybackState::Paused),
            other => other,
        }
    }

    /// Sets the speed multiplier, clamped into `[MIN_SPEED, MAX_SPEED]`.
    /// Returns the effective speed. The next tick uses the new period.
    pub fn set_speed(&mut self, speed: f64) -> Result<f64, PlaybackError> {
        let effective = normalize_speed(speed)?;
        if effective != speed {
            debug!(requested = speed, effective, "clamped playback speed");
        }
        self.speed = effective;
        Ok(effective)
    }

    /// Timer callback. While playing, advances one step per elapsed period
    /// (`base_interval / speed`), catching up on missed periods, and pauses
    /// on reaching the terminal step.
    pub fn tick(&mut self) -> Outcome {
        match self.state {
            PlaybackState::Idle => return Outcome::NothingLoaded,
            PlaybackState::Paused => return Outcome::Unchanged,
            PlaybackState::Playing => {}
        }

        let period = self.period();
        let now = self.clock.now();
        let elapsed = now.saturating_sub(self.period_start);
        let periods = elapsed.as_nanos() / period.as_nanos();
        if periods == 0 {
            return Outcome::Unchanged;
        }

        let periods = u32::try_from(periods).unwrap_or(u32::MAX);
        self.period_start += period * periods;
        let outcome = self.move_to(self.cursor.saturating_add(periods as usize));
        if self.at_terminal() {
            self.state = PlaybackState::Paused;
            debug!(cursor = self.cursor, "playback reached the terminal step");
        }
        outcome
    }

    fn period(&self) -> Duration {
        self.config
            .base_interval
            .div_f64(self.speed)
            .max(Duration::from_nanos(1))
    }

    /// Clamps `target` into the run and moves there, rendering on change.
    fn move_to(&mut self, target: usize) -> Outcome {
        let Some(last) = self.last_index() else {
            return Outcome::NothingLoaded;
        };
        let to = target.min(last);
        let from = self.cursor;
        if to == from {
            return Outcome::Unchanged;
        }
        self.cursor = to;
        trace!(from, to, "cursor moved");
        self.render();
        Outcome::Moved { from, to }
    }

    fn render(&mut self) {
        if let (Some(sink), Some(run)) = (self.sink.as_mut(), self.run.as_ref()) {
            if let Some(step) = run.get(self.cursor) {
                sink.render(step);
            }
        }
    }

    // -- Queries --------------------------------------------------------

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Cursor position, `None` while idle.
    pub fn cursor(&self) -> Option<usize> {
        self.run.as_ref().map(|_| self.cursor)
    }

    /// The step under the cursor.
    pub fn current(&self) -> Option<&StepRecord> {
        self.run.as_ref().and_then(|run| run.get(self.cursor))
    }

    pub fn run(&self) -> Option<&TraceRun> {
        self.run.as_ref()
    }

    /// Number of steps in the loaded run (0 while idle).
    pub fn len(&self) -> usize {
        self.run.as_ref().map_or(0, TraceRun::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Position in percent: 0 at the first step, 100 at the terminal step.
    /// A single-step run is always at 100; an idle controller at 0.
    pub fn progress(&self) -> f64 {
        match self.last_index() {
            None => 0.0,
            Some(0) => 100.0,
            Some(last) => self.cursor as f64 / last as f64 * 100.0,
        }
    }

    pub fn at_terminal(&self) -> bool {
        self.last_index() == Some(self.cursor)
    }

    fn last_index(&self) -> Option<usize> {
        self.run
            .as_ref()
            .filter(|run| !run.is_empty())
            .map(|run| run.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::clock::ManualClock;
    use algoverse_core::{StateSnapshot, StepKind};

    fn step(i: usize, terminal: bool) -> StepRecord {
        StepRecord {
            sequence_index: i,
            kind: if terminal { StepKind::Outcome } else { StepKind::Compare },
            description: format!("step {}", i),
            snapshot: StateSnapshot::sequence(&[i as i64]),
            highlights: Default::default(),
            annotations: Default::default(),
            terminal,
        }
    }

    fn run_of(len: usize) -> TraceRun {
        TraceRun::new("test", (0..len).map(|i| step(i, i + 1 == len)).collect())
    }

    fn controller() -> (PlaybackController<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (PlaybackController::new(clock.clone()), clock)
    }

    const SECOND: Duration = Duration::from_secs(1);

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    #[test]
    fn load_pauses_at_first_step() {
        let (mut c, _) = controller();
        assert_eq!(c.state(), PlaybackState::Idle);
        c.load(run_of(3)).unwrap();
        assert_eq!(c.state(), PlaybackState::Paused);
        assert_eq!(c.cursor(), Some(0));
        assert_eq!(c.current().map(|s| s.description.as_str()), Some("step 0"));
    }

    #[test]
    fn empty_run_is_rejected_without_side_effects() {
        let (mut c, _) = controller();
        c.load(run_of(2)).unwrap();
        c.step_forward();
        let generation = c.generation();
        assert_eq!(c.load(TraceRun::new("x", vec![])), Err(PlaybackError::EmptyTrace));
        assert_eq!(c.cursor(), Some(1));
        assert_eq!(c.generation(), generation);
    }

    #[test]
    fn reload_resets_cursor_and_state() {
        let (mut c, _) = controller();
        c.load(run_of(5)).unwrap();
        c.seek(3);
        c.play();
        c.load(run_of(2)).unwrap();
        assert_eq!(c.cursor(), Some(0));
        assert_eq!(c.state(), PlaybackState::Paused);
    }

    #[test]
    fn stale_generation_is_discarded() {
        let (mut c, _) = controller();
        let before = c.generation();
        c.load(run_of(4)).unwrap();
        assert_eq!(c.load_if_current(before, run_of(9)), Ok(Outcome::Stale));
        assert_eq!(c.len(), 4);

        let current = c.generation();
        assert_eq!(
            c.load_if_current(current, run_of(9)),
            Ok(Outcome::StateChanged(PlaybackState::Paused))
        );
        assert_eq!(c.len(), 9);
        assert!(c.generation() > current);
    }

    #[test]
    fn unload_returns_to_idle_and_invalidates_pending_loads() {
        let (mut c, _) = controller();
        c.load(run_of(3)).unwrap();
        let pending = c.generation();
        assert_eq!(c.unload(), Outcome::StateChanged(PlaybackState::Idle));
        assert_eq!(c.cursor(), None);
        assert_eq!(c.load_if_current(pending, run_of(3)), Ok(Outcome::Stale));
        assert_eq!(c.unload(), Outcome::NothingLoaded);
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    #[test]
    fn idle_operations_report_nothing_loaded() {
        let (mut c, _) = controller();
        assert_eq!(c.play(), Outcome::NothingLoaded);
        assert_eq!(c.pause(), Outcome::NothingLoaded);
        assert_eq!(c.step_forward(), Outcome::NothingLoaded);
        assert_eq!(c.step_backward(), Outcome::NothingLoaded);
        assert_eq!(c.seek(2), Outcome::NothingLoaded);
        assert_eq!(c.tick(), Outcome::NothingLoaded);
        assert_eq!(c.progress(), 0.0);
        assert!(c.current().is_none());
    }

    #[test]
    fn stepping_clamps_at_both_ends() {
        let (mut c, _) = controller();
        c.load(run_of(3)).unwrap();
        assert_eq!(c.step_backward(), Outcome::Unchanged);
        assert_eq!(c.cursor(), Some(0));
        assert_eq!(c.step_forward(), Outcome::Moved { from: 0, to: 1 });
        assert_eq!(c.step_forward(), Outcome::Moved { from: 1, to: 2 });
        assert_eq!(c.step_forward(), Outcome::Unchanged);
        assert_eq!(c.cursor(), Some(2));
    }

    #[test]
    fn single_step_run_never_moves() {
        let (mut c, clock) = controller();
        c.load(run_of(1)).unwrap();
        assert_eq!(c.step_forward(), Outcome::Unchanged);
        assert_eq!(c.step_backward(), Outcome::Unchanged);
        assert_eq!(c.play(), Outcome::Unchanged);
        clock.advance(SECOND * 5);
        assert_eq!(c.tick(), Outcome::Unchanged);
        assert_eq!(c.progress(), 100.0);
    }

    #[test]
    fn stepping_while_playing_requires_pause() {
        let (mut c, _) = controller();
        c.load(run_of(3)).unwrap();
        c.play();
        assert_eq!(c.step_forward(), Outcome::RequiresPause);
        assert_eq!(c.step_backward(), Outcome::RequiresPause);
        assert_eq!(c.pause(), Outcome::StateChanged(PlaybackState::Paused));
        assert_eq!(c.pause(), Outcome::Unchanged);
    }

    #[test]
    fn seek_clamps_and_pauses() {
        let (mut c, _) = controller();
        c.load(run_of(4)).unwrap();
        c.play();
        assert_eq!(c.seek(99), Outcome::Moved { from: 0, to: 3 });
        assert_eq!(c.state(), PlaybackState::Paused);

        c.seek(1);
        c.play();
        assert_eq!(c.seek(1), Outcome::StateChanged(PlaybackState::Paused));
        assert_eq!(c.seek(1), Outcome::Unchanged);
    }

    #[test]
    fn progress_spans_zero_to_hundred() {
        let (mut c, _) = controller();
        c.load(run_of(5)).unwrap();
        assert_eq!(c.progress(), 0.0);
        c.seek(2);
        assert_eq!(c.progress(), 50.0);
        c.seek(4);
        assert_eq!(c.progress(), 100.0);
    }

    // -----------------------------------------------------------------------
    // Timing
    // -----------------------------------------------------------------------

    #[test]
    fn tick_advances_once_per_period() {
        let (mut c, clock) = controller();
        c.load(run_of(5)).unwrap();
        c.play();
        clock.advance(Duration::from_millis(999));
        assert_eq!(c.tick(), Outcome::Unchanged);
        clock.advance(Duration::from_millis(1));
        assert_eq!(c.tick(), Outcome::Moved { from: 0, to: 1 });
        assert_eq!(c.tick(), Outcome::Unchanged);
    }

    #[test]
    fn late_tick_catches_up() {
        let (mut c, clock) = controller();
        c.load(run_of(10)).unwrap();
        c.play();
        clock.advance(Duration::from_millis(3500));
        assert_eq!(c.tick(), Outcome::Moved { from: 0, to: 3 });
        clock.advance(Duration::from_millis(500));
        assert_eq!(c.tick(), Outcome::Moved { from: 3, to: 4 });
    }

    #[test]
    fn playing_auto_stops_at_terminal() {
        let (mut c, clock) = controller();
        c.load(run_of(3)).unwrap();
        c.play();
        clock.advance(SECOND * 60);
        assert_eq!(c.tick(), Outcome::Moved { from: 0, to: 2 });
        assert_eq!(c.state(), PlaybackState::Paused);
        assert!(c.at_terminal());
        assert_eq!(c.play(), Outcome::Unchanged);
    }

    #[test]
    fn speed_scales_the_period() {
        let (mut c, clock) = controller();
        c.load(run_of(10)).unwrap();
        assert_eq!(c.set_speed(2.0), Ok(2.0));
        c.play();
        clock.advance(SECOND);
        assert_eq!(c.tick(), Outcome::Moved { from: 0, to: 2 });
    }

    #[test]
    fn speed_is_clamped_or_rejected() {
        let (mut c, _) = controller();
        assert_eq!(c.set_speed(10.0), Ok(MAX_SPEED));
        assert_eq!(c.set_speed(0.1), Ok(MIN_SPEED));
        assert_eq!(c.set_speed(0.0), Err(PlaybackError::InvalidSpeed { speed: 0.0 }));
        assert!(c.set_speed(f64::NAN).is_err());
        assert!(c.set_speed(f64::INFINITY).is_err());
        assert_eq!(c.speed(), MIN_SPEED);
    }

    #[test]
    fn invalid_initial_speed_is_rejected() {
        let config = PlaybackConfig {
            initial_speed: -1.0,
            ..PlaybackConfig::default()
        };
        assert!(PlaybackController::with_config(config, ManualClock::new()).is_err());
    }

    #[test]
    fn paused_time_does_not_count() {
        let (mut c, clock) = controller();
        c.load(run_of(5)).unwrap();
        clock.advance(SECOND * 10);
        c.play();
        assert_eq!(c.tick(), Outcome::Unchanged);
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    #[test]
    fn sink_sees_every_cursor_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let clock = ManualClock::new();
        let mut c = PlaybackController::new(clock.clone())
            .with_sink(move |s: &StepRecord| log.borrow_mut().push(s.sequence_index));

        c.load(run_of(4)).unwrap();
        c.step_forward();
        c.step_backward();
        c.step_backward();
        c.seek(3);
        assert_eq!(*seen.borrow(), vec![0, 1, 0, 3]);
    }
}
