//! Control surface errors.

use thiserror::Error;

/// Rejected control-surface requests.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Note number above 127.
    #[error("note {0} is outside the MIDI range 0-127")]
    NoteOutOfRange(u8),

    /// Velocity outside `[0, 1]` or not a number.
    #[error("velocity {0} is outside 0.0-1.0")]
    InvalidVelocity(f32),

    /// NaN or infinite parameter value.
    #[error("{param} must be a finite number")]
    NotFinite {
        /// Parameter label.
        param: &'static str,
    },

    /// Finite value outside the parameter range.
    #[error("{param} value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Parameter label.
        param: &'static str,
        /// Rejected value.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Tempo of zero beats per minute.
    #[error("tempo must be at least 1 bpm")]
    ZeroBpm,

    /// The note queue is full and the event was dropped.
    #[error("note event queue is full, event dropped")]
    QueueFull,

    /// The audio worker is gone.
    #[error("audio engine is no longer running")]
    Disconnected,
}
