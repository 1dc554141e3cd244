//! Errors raised when configuring the engine.
//!
//! Rendering never fails; these only come out of constructors and setters.

/// Engine configuration errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthError {
    /// The voice pool must hold at least one voice.
    #[error("polyphony must be at least 1")]
    ZeroPolyphony,
    /// The FM ratio table must not be empty.
    #[error("FM ratio table is empty")]
    EmptyRatioTable,
    /// The FM index range is inverted or not finite.
    #[error("invalid FM index range {min}..={max}")]
    InvalidIndexRange {
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },
    /// The sequencer needs at least one note to choose from.
    #[error("sequencer note set is empty")]
    EmptyNoteSet,
    /// A note outside the MIDI range 0-127.
    #[error("note {0} is outside the MIDI range 0-127")]
    NoteOutOfRange(u8),
}
