//! VCR-style navigation over a recorded trace run.
//!
//! A [`PlaybackController`] owns one [`TraceRun`](algoverse_core::TraceRun)
//! and a cursor into it. Navigation is driven by explicit calls and by
//! [`PlaybackController::tick`], the timer callback, which reads time from
//! an injected [`Clock`] so playback can be tested without real timers.

pub mod clock;
pub mod controller;
pub mod error;
pub mod render;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{
    Generation, Outcome, PlaybackConfig, PlaybackController, PlaybackState, MAX_SPEED, MIN_SPEED,
};
pub use error::PlaybackError;
pub use render::RenderSink;
