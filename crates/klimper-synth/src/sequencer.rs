//! Probabilistic note sequencer.
//!
//! The sequencer plays random notes from a fixed scale. Between two notes it
//! waits a random pause (quarter, eighth or sixteenth note), and every note
//! gets its own random duration and velocity. Time advances only through
//! [`Sequencer::process`], which the render loop calls once per sub-block
//! with the number of frames about to be rendered.

use alloc::vec::Vec;

use klimper_dsp::Xorshift32;

use crate::error::SynthError;

/// Number of notes the sequencer can hold at the same time.
pub const SEQUENCER_SLOTS: usize = 8;

/// Receiver of note events.
pub trait NoteSink {
    /// Start `note` at `velocity` in `[0, 1]`.
    fn note_on(&mut self, note: u8, velocity: f32);
    /// Release `note`.
    fn note_off(&mut self, note: u8);
}

/// Musical duration classes for pauses and notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteDuration {
    /// 1/4 note
    Quarter,
    /// 1/8 note
    Eighth,
    /// 1/16 note
    Sixteenth,
}

impl NoteDuration {
    /// All duration classes, in table order.
    pub const ALL: [NoteDuration; 3] = [
        NoteDuration::Quarter,
        NoteDuration::Eighth,
        NoteDuration::Sixteenth,
    ];

    fn index(self) -> usize {
        match self {
            NoteDuration::Quarter => 0,
            NoteDuration::Eighth => 1,
            NoteDuration::Sixteenth => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    note: u8,
    remaining: i64,
}

/// Random-note sequencer.
///
/// # Example
///
/// ```rust
/// use klimper_synth::{NoteSink, Sequencer};
///
/// #[derive(Default)]
/// struct Count(usize);
///
/// impl NoteSink for Count {
///     fn note_on(&mut self, _note: u8, _velocity: f32) { self.0 += 1; }
///     fn note_off(&mut self, _note: u8) {}
/// }
///
/// let mut seq = Sequencer::new(44100.0, &[60, 62, 64], 120, 1).unwrap();
/// let mut sink = Count::default();
/// seq.process(220, &mut sink);
/// assert_eq!(sink.0, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Sequencer {
    sample_rate: f32,
    notes: Vec<u8>,
    bpm: u32,
    running: bool,
    slots: [Slot; SEQUENCER_SLOTS],
    durations: [i64; 3],
    pause_remaining: i64,
    rng: Xorshift32,
}

impl Sequencer {
    /// Create a running sequencer over `notes` at `bpm`.
    pub fn new(sample_rate: f32, notes: &[u8], bpm: u32, seed: u32) -> Result<Self, SynthError> {
        check_notes(notes)?;

        let mut seq = Self {
            sample_rate,
            notes: notes.to_vec(),
            bpm: 0,
            running: true,
            slots: [Slot::default(); SEQUENCER_SLOTS],
            durations: [0; 3],
            pause_remaining: 0,
            rng: Xorshift32::new(seed),
        };
        seq.set_bpm(bpm);
        Ok(seq)
    }

    /// Set the tempo and recompute note durations. Zero is treated as 1.
    pub fn set_bpm(&mut self, bpm: u32) {
        let bpm = bpm.max(1);
        self.bpm = bpm;

        let quarter = (f64::from(self.sample_rate) * 60.0 / f64::from(bpm)) as i64;
        let eighth = quarter / 2;
        self.durations = [quarter, eighth, eighth / 2];

        #[cfg(feature = "tracing")]
        tracing::debug!(bpm, quarter, eighth, sixteenth = eighth / 2, "sequencer tempo set");
    }

    /// Tempo in beats per minute.
    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Start or stop generating notes. Sounding notes still get their note-off.
    ///
    /// The pending pause is cleared, so a restart plays immediately.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
        self.pause_remaining = 0;
    }

    /// Whether new notes are generated.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Replace the scale notes are drawn from.
    pub fn set_notes(&mut self, notes: &[u8]) -> Result<(), SynthError> {
        check_notes(notes)?;
        self.notes.clear();
        self.notes.extend_from_slice(notes);
        Ok(())
    }

    /// The scale notes are drawn from.
    pub fn notes(&self) -> &[u8] {
        &self.notes
    }

    /// Length of a duration class in frames at the current tempo.
    pub fn duration_samples(&self, duration: NoteDuration) -> i64 {
        self.durations[duration.index()]
    }

    /// Number of notes currently held by the sequencer.
    pub fn sounding_notes(&self) -> usize {
        self.slots.iter().filter(|s| s.remaining > 0).count()
    }

    /// Advance by `frames` and emit the resulting note events into `sink`.
    pub fn process(&mut self, frames: usize, sink: &mut impl NoteSink) {
        let passed = frames as i64;

        for slot in self.slots.iter_mut().filter(|s| s.remaining > 0) {
            slot.remaining -= passed;
            if slot.remaining <= 0 {
                #[cfg(feature = "tracing")]
                tracing::trace!(note = slot.note, "sequencer note off");
                sink.note_off(slot.note);
            }
        }

        if !self.running {
            return;
        }

        self.pause_remaining -= passed;
        if self.pause_remaining > 0 {
            return;
        }

        self.pause_remaining = self.random_duration();

        if let Some(index) = self.slots.iter().position(|s| s.remaining <= 0) {
            let note = self.notes[self.rng.below(self.notes.len() as u32) as usize];
            let remaining = self.random_duration();
            let velocity = self.rng.unit_256();

            self.slots[index] = Slot { note, remaining };

            #[cfg(feature = "tracing")]
            tracing::trace!(note, velocity, remaining, "sequencer note on");

            sink.note_on(note, velocity);
        }
    }

    fn random_duration(&mut self) -> i64 {
        let class = NoteDuration::ALL[self.rng.below(NoteDuration::ALL.len() as u32) as usize];
        self.duration_samples(class)
    }
}

fn check_notes(notes: &[u8]) -> Result<(), SynthError> {
    if notes.is_empty() {
        return Err(SynthError::EmptyNoteSet);
    }
    if let Some(&bad) = notes.iter().find(|&&n| n > 127) {
        return Err(SynthError::NoteOutOfRange(bad));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<(bool, u8, f32)>,
    }

    impl NoteSink for Recorder {
        fn note_on(&mut self, note: u8, velocity: f32) {
            self.events.push((true, note, velocity));
        }

        fn note_off(&mut self, note: u8) {
            self.events.push((false, note, 0.0));
        }
    }

    impl Recorder {
        fn ons(&self) -> usize {
            self.events.iter().filter(|e| e.0).count()
        }

        fn offs(&self) -> usize {
            self.events.iter().filter(|e| !e.0).count()
        }
    }

    const SCALE: [u8; 8] = [48, 50, 52, 53, 55, 57, 59, 60];

    #[test]
    fn test_durations_from_bpm() {
        let seq = Sequencer::new(44100.0, &SCALE, 80, 1).unwrap();
        assert_eq!(seq.duration_samples(NoteDuration::Quarter), 33075);
        assert_eq!(seq.duration_samples(NoteDuration::Eighth), 16537);
        assert_eq!(seq.duration_samples(NoteDuration::Sixteenth), 8268);
    }

    #[test]
    fn test_zero_bpm_clamped() {
        let mut seq = Sequencer::new(1000.0, &SCALE, 60, 1).unwrap();
        seq.set_bpm(0);
        assert_eq!(seq.bpm(), 1);
        assert_eq!(seq.duration_samples(NoteDuration::Quarter), 60_000);
    }

    #[test]
    fn test_rejects_bad_note_sets() {
        assert_eq!(
            Sequencer::new(44100.0, &[], 80, 1).unwrap_err(),
            SynthError::EmptyNoteSet
        );
        assert_eq!(
            Sequencer::new(44100.0, &[60, 200], 80, 1).unwrap_err(),
            SynthError::NoteOutOfRange(200)
        );
        let mut seq = Sequencer::new(44100.0, &SCALE, 80, 1).unwrap();
        assert!(seq.set_notes(&[]).is_err());
        assert_eq!(seq.notes(), &SCALE);
    }

    #[test]
    fn test_first_call_plays_immediately() {
        let mut seq = Sequencer::new(44100.0, &SCALE, 80, 3).unwrap();
        let mut rec = Recorder::default();
        seq.process(220, &mut rec);
        assert_eq!(rec.ons(), 1);
        let (_, note, velocity) = rec.events[0];
        assert!(SCALE.contains(&note));
        assert!((0.0..1.0).contains(&velocity));
        assert_eq!(seq.sounding_notes(), 1);
    }

    #[test]
    fn test_stopped_never_plays() {
        let mut seq = Sequencer::new(44100.0, &SCALE, 300, 3).unwrap();
        seq.set_running(false);
        let mut rec = Recorder::default();
        for _ in 0..10_000 {
            seq.process(220, &mut rec);
        }
        assert!(rec.events.is_empty());
    }

    #[test]
    fn test_stopping_still_releases_notes() {
        let mut seq = Sequencer::new(44100.0, &SCALE, 120, 3).unwrap();
        let mut rec = Recorder::default();
        seq.process(220, &mut rec);
        seq.set_running(false);
        for _ in 0..200 {
            seq.process(220, &mut rec);
        }
        assert_eq!(rec.ons(), 1);
        assert_eq!(rec.offs(), 1);
        assert_eq!(seq.sounding_notes(), 0);
    }

    #[test]
    fn test_restart_plays_immediately() {
        let mut seq = Sequencer::new(44100.0, &SCALE, 80, 3).unwrap();
        let mut rec = Recorder::default();
        seq.process(220, &mut rec);
        seq.set_running(false);
        seq.set_running(true);
        seq.process(220, &mut rec);
        assert_eq!(rec.ons(), 2);
    }

    #[test]
    fn test_pause_between_notes() {
        let mut seq = Sequencer::new(44100.0, &SCALE, 80, 9).unwrap();
        let mut rec = Recorder::default();
        seq.process(1, &mut rec);
        // A sixteenth is the shortest pause
        let shortest = seq.duration_samples(NoteDuration::Sixteenth) as usize;
        for _ in 0..shortest - 2 {
            seq.process(1, &mut rec);
        }
        assert_eq!(rec.ons(), 1);
    }

    #[test]
    fn test_slots_bound_polyphony() {
        let mut seq = Sequencer::new(44100.0, &SCALE, 1000, 5).unwrap();
        let mut rec = Recorder::default();
        for _ in 0..20_000 {
            seq.process(220, &mut rec);
            assert!(seq.sounding_notes() <= SEQUENCER_SLOTS);
        }
        assert!(rec.ons() > SEQUENCER_SLOTS);
        assert!(rec.ons() - rec.offs() <= SEQUENCER_SLOTS);
    }
}
