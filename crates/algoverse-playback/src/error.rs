use thiserror::Error;

/// Errors from playback operations.
///
/// Routine UI situations (nothing loaded, cursor at a boundary) are not
/// errors; they are reported through [`Outcome`](crate::Outcome).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// A trace run with no steps was offered to `load`. Recorded runs always
    /// hold at least the terminal step, so this indicates a recorder bug.
    #[error("cannot load an empty trace run")]
    EmptyTrace,

    /// Speed multipliers must be positive and finite.
    #[error("invalid playback speed {speed}: expected a positive finite multiplier")]
    InvalidSpeed { speed: f64 },
}
