//! Pitch helpers.

/// Convert a MIDI note number to frequency in Hz (A4 = 69 = 440 Hz).
///
/// Takes a float so callers can pass fractional notes for pitch bends.
#[inline]
pub fn midi_to_hz(note: f32) -> f32 {
    440.0 * libm::powf(2.0, (note - 69.0) / 12.0)
}
