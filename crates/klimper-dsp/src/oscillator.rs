//! Phase-accumulator wavetable oscillator with linear FM input.

use crate::wavetable::Wavetable;

/// Wavetable oscillator.
///
/// Reads a borrowed [`Wavetable`] with linear interpolation. The phase index
/// counts table samples, not radians, so `phase_increment` is
/// `frequency * table_len / sample_rate`.
///
/// Frequency modulation is linear: the modulation input passed to
/// [`tick`](Self::tick) is scaled by `fm_scale` and added to the phase
/// increment. With `fm_scale` equal to the oscillator's own increment, a
/// modulation value `m` shifts the instantaneous frequency by `m` times the
/// base frequency.
///
/// # Example
///
/// ```rust
/// use klimper_dsp::{Oscillator, Wavetable, Waveform};
///
/// let mut osc = Oscillator::new(Wavetable::shared(Waveform::Sine), 48000.0);
/// osc.reinit(1000.0, true);
///
/// let block: Vec<f32> = (0..48).map(|_| osc.tick(0.0)).collect();
/// assert!(block.iter().all(|s| s.abs() <= 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator<'t> {
    table: &'t Wavetable,
    sample_rate: f32,
    frequency: f32,
    phase_increment: f32,
    phase_index: f32,
    fm_scale: f32,
}

impl<'t> Oscillator<'t> {
    /// Create a silent oscillator (0 Hz, phase 0) reading `table`.
    pub fn new(table: &'t Wavetable, sample_rate: f32) -> Self {
        Self {
            table,
            sample_rate,
            frequency: 0.0,
            phase_increment: 0.0,
            phase_index: 0.0,
            fm_scale: 1.0,
        }
    }

    /// Set a new frequency, optionally restarting the phase.
    ///
    /// Keeping the phase allows glitch-free pitch changes.
    pub fn reinit(&mut self, frequency: f32, reset_phase: bool) {
        self.frequency = frequency;
        self.phase_increment = frequency * self.table.len() as f32 / self.sample_rate;
        if reset_phase {
            self.phase_index = 0.0;
        }
    }

    /// Scale applied to the modulation input of [`tick`](Self::tick).
    pub fn set_fm_scale(&mut self, scale: f32) {
        self.fm_scale = scale;
    }

    /// Current FM scale.
    pub fn fm_scale(&self) -> f32 {
        self.fm_scale
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Table samples advanced per output sample.
    pub fn phase_increment(&self) -> f32 {
        self.phase_increment
    }

    /// Current read position in `[0, table_len)`.
    pub fn phase_index(&self) -> f32 {
        self.phase_index
    }

    /// The table this oscillator reads.
    pub fn table(&self) -> &'t Wavetable {
        self.table
    }

    /// Produce the sample at the current phase, then advance.
    #[inline]
    pub fn tick(&mut self, modulation: f32) -> f32 {
        let sample = self.table.read_interpolated(self.phase_index);

        let len = self.table.len() as f32;
        let mut index = self.phase_index + self.phase_increment + modulation * self.fm_scale;
        if !index.is_finite() {
            index = 0.0;
        }
        if !(0.0..len).contains(&index) {
            index = libm::fmodf(index, len);
            if index < 0.0 {
                index += len;
            }
            // A tiny negative remainder plus `len` can round up to `len`
            if index >= len {
                index = 0.0;
            }
        }
        self.phase_index = index;

        sample
    }
}
