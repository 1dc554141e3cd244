//! Note events queued by a control surface for the render thread.

use crate::synth::Synth;

/// A note command to apply at the start of the next rendered period.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoteEvent {
    /// Start a note.
    On {
        /// MIDI note number.
        note: u8,
        /// Velocity in `[0, 1]`.
        velocity: f32,
    },
    /// Release a note.
    Off {
        /// MIDI note number.
        note: u8,
    },
    /// Release every sounding voice.
    AllOff,
}

impl NoteEvent {
    /// Apply the event to `synth`.
    pub fn apply(self, synth: &mut Synth) {
        match self {
            NoteEvent::On { note, velocity } => synth.note_on(note, velocity),
            NoteEvent::Off { note } => synth.note_off(note),
            NoteEvent::AllOff => synth.all_notes_off(),
        }
    }
}
