//! Polyphonic FM synthesizer engine.
//!
//! [`Synth`] owns a fixed pool of [`Voice`]s allocated once at construction.
//! Note events pick a voice with a single scan:
//!
//! 1. **Retrigger** - a voice that last played the same note, sounding or not
//! 2. **Free** - otherwise the last inactive voice in the pool
//! 3. **Steal** - otherwise the quietest voice (velocity × envelope level)
//!
//! The render loop accumulates into an interleaved stereo buffer and never
//! allocates.

use alloc::boxed::Box;
use alloc::vec::Vec;

use klimper_dsp::{AdsrValues, Panner, Xorshift32};

use crate::error::SynthError;
use crate::sequencer::NoteSink;
use crate::voice::Voice;

/// Number of discrete FM index values between the range bounds.
const FM_INDEX_STEPS: u32 = 256;

/// Pan LFO rate range in Hz.
const LFO_RATE_MIN: f32 = 0.33;
const LFO_RATE_MAX: f32 = 3.33;

/// Construction parameters for [`Synth`].
#[derive(Debug, Clone, PartialEq)]
pub struct SynthSettings {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Number of voices in the pool.
    pub polyphony: usize,
    /// Master volume, applied to every voice.
    pub volume: f32,
    /// Carrier (amplitude) envelope template.
    pub carrier_envelope: AdsrValues,
    /// Modulator envelope template.
    pub modulator_envelope: AdsrValues,
    /// Modulator/carrier frequency ratios to pick from per note.
    pub fm_ratios: Vec<f32>,
    /// Smallest FM index picked per note.
    pub fm_index_min: f32,
    /// Largest FM index picked per note.
    pub fm_index_max: f32,
    /// PRNG seed for voice parameters.
    pub seed: u32,
}

impl Default for SynthSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            polyphony: 8,
            volume: 1.0,
            carrier_envelope: AdsrValues::default(),
            modulator_envelope: AdsrValues::default(),
            fm_ratios: alloc::vec![0.5, 1.0, 2.0, 3.0, 4.0],
            fm_index_min: 0.1,
            fm_index_max: 1.5,
            seed: 0x4B4C_4D50,
        }
    }
}

/// Polyphonic two-operator FM synthesizer.
///
/// # Example
///
/// ```rust
/// use klimper_synth::{Synth, SynthSettings};
///
/// let mut synth = Synth::new(SynthSettings { polyphony: 2, ..SynthSettings::default() }).unwrap();
/// synth.note_on(60, 1.0);
/// synth.note_on(64, 1.0);
/// synth.note_on(67, 1.0); // steals the quieter of the two
///
/// let mut block = [0.0f32; 64];
/// synth.process(&mut block);
/// assert_eq!(synth.active_voice_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Synth {
    sample_rate: f32,
    volume: f32,
    gain_staging: f32,
    carrier_envelope: AdsrValues,
    modulator_envelope: AdsrValues,
    fm_ratios: Vec<f32>,
    fm_index_min: f32,
    fm_index_max: f32,
    voices: Box<[Voice]>,
    panner: Panner,
    rng: Xorshift32,
}

impl Synth {
    /// Build the engine and its voice pool.
    pub fn new(settings: SynthSettings) -> Result<Self, SynthError> {
        if settings.polyphony == 0 {
            return Err(SynthError::ZeroPolyphony);
        }
        if settings.fm_ratios.is_empty() {
            return Err(SynthError::EmptyRatioTable);
        }
        check_index_range(settings.fm_index_min, settings.fm_index_max)?;

        let mut rng = Xorshift32::new(settings.seed);
        let voices = (0..settings.polyphony)
            .map(|_| {
                let lfo_rate = rng.stepped(LFO_RATE_MIN, LFO_RATE_MAX, 256);
                Voice::new(
                    settings.sample_rate,
                    lfo_rate,
                    settings.carrier_envelope,
                    settings.modulator_envelope,
                )
            })
            .collect();

        #[cfg(feature = "tracing")]
        tracing::info!(
            polyphony = settings.polyphony,
            sample_rate = settings.sample_rate,
            "synth engine created"
        );

        Ok(Self {
            sample_rate: settings.sample_rate,
            volume: settings.volume,
            gain_staging: 1.0 / settings.polyphony as f32,
            carrier_envelope: settings.carrier_envelope,
            modulator_envelope: settings.modulator_envelope,
            fm_ratios: settings.fm_ratios,
            fm_index_min: settings.fm_index_min,
            fm_index_max: settings.fm_index_max,
            voices,
            panner: Panner::new(),
            rng,
        })
    }

    /// Start `note` with `velocity` in `[0, 1]` on the voice chosen by the
    /// retrigger / free / steal scan.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        let mut retrigger = None;
        let mut free = None;
        let mut steal = None;
        let mut steal_amp = f32::MAX;

        for (i, voice) in self.voices.iter().enumerate() {
            if voice.note() == Some(note) {
                retrigger = Some(i);
            }
            if !voice.is_active() {
                free = Some(i);
            } else {
                let amp = voice.amplitude();
                if amp < steal_amp {
                    steal = Some(i);
                    steal_amp = amp;
                }
            }
        }

        // A non-empty pool always yields one of the three
        let Some(index) = retrigger.or(free).or(steal) else {
            return;
        };

        let ratio = self.fm_ratios[self.rng.below(self.fm_ratios.len() as u32) as usize];
        let fm_index = self
            .rng
            .stepped(self.fm_index_min, self.fm_index_max, FM_INDEX_STEPS);

        #[cfg(feature = "tracing")]
        tracing::trace!(note, velocity, voice = index, ratio, fm_index, "note on");

        self.voices[index].start(note, velocity, ratio, fm_index);
    }

    /// Release every sounding voice that is playing `note`.
    pub fn note_off(&mut self, note: u8) {
        for voice in self.voices.iter_mut() {
            if voice.note() == Some(note) && voice.is_active() {
                voice.release();
            }
        }
    }

    /// Release every sounding voice.
    pub fn all_notes_off(&mut self) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.release();
        }
    }

    /// Mix the next `buffer.len() / 2` frames into `buffer` (interleaved
    /// stereo). Existing content is added to, not overwritten.
    ///
    /// Idle voices are rendered too; their envelopes output zero.
    pub fn process(&mut self, buffer: &mut [f32]) {
        let gain = self.gain_staging * self.volume;

        for frame in buffer.chunks_exact_mut(2) {
            for voice in self.voices.iter_mut() {
                let (left, right) = voice.render(gain, &self.panner);
                frame[0] += left;
                frame[1] += right;
            }
        }

        for voice in self.voices.iter_mut() {
            voice.refresh_activity();
        }
    }

    /// Set the master volume.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    /// Master volume.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Replace the carrier envelope on every voice.
    pub fn set_carrier_envelope(&mut self, values: AdsrValues) {
        self.carrier_envelope = values;
        for voice in self.voices.iter_mut() {
            voice.set_carrier_envelope(values);
        }
    }

    /// Current carrier envelope template.
    pub fn carrier_envelope(&self) -> AdsrValues {
        self.carrier_envelope
    }

    /// Replace the modulator envelope on every voice.
    pub fn set_modulator_envelope(&mut self, values: AdsrValues) {
        self.modulator_envelope = values;
        for voice in self.voices.iter_mut() {
            voice.set_modulator_envelope(values);
        }
    }

    /// Current modulator envelope template.
    pub fn modulator_envelope(&self) -> AdsrValues {
        self.modulator_envelope
    }

    /// Replace the FM ratio table. Takes effect on the next note.
    pub fn set_fm_ratios(&mut self, ratios: &[f32]) -> Result<(), SynthError> {
        if ratios.is_empty() {
            return Err(SynthError::EmptyRatioTable);
        }
        self.fm_ratios.clear();
        self.fm_ratios.extend_from_slice(ratios);
        Ok(())
    }

    /// FM ratio table.
    pub fn fm_ratios(&self) -> &[f32] {
        &self.fm_ratios
    }

    /// Set the range FM indices are drawn from. Takes effect on the next note.
    pub fn set_fm_index_range(&mut self, min: f32, max: f32) -> Result<(), SynthError> {
        check_index_range(min, max)?;
        self.fm_index_min = min;
        self.fm_index_max = max;
        Ok(())
    }

    /// FM index range as `(min, max)`.
    pub fn fm_index_range(&self) -> (f32, f32) {
        (self.fm_index_min, self.fm_index_max)
    }

    /// The voice pool.
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Number of voices whose carrier envelope was running after the last block.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Pool size.
    pub fn polyphony(&self) -> usize {
        self.voices.len()
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

impl NoteSink for Synth {
    fn note_on(&mut self, note: u8, velocity: f32) {
        Synth::note_on(self, note, velocity);
    }

    fn note_off(&mut self, note: u8) {
        Synth::note_off(self, note);
    }
}

fn check_index_range(min: f32, max: f32) -> Result<(), SynthError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(SynthError::InvalidIndexRange { min, max })
    }
}
