//! Precomputed single-period waveform tables.
//!
//! A [`Wavetable`] stores one period of a waveform sampled at `length`
//! equally spaced points, followed by `guard` copies of the first samples so
//! that linear interpolation never has to wrap at the end of the table.
//!
//! The tables that the engine actually plays are built once per process and
//! shared by reference through [`Wavetable::shared`].

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::f32::consts::TAU;
use once_cell::race::OnceBox;

/// Default number of samples per period.
pub const DEFAULT_LENGTH: usize = 512;

/// Default number of guard points appended after the period.
pub const DEFAULT_GUARD_POINTS: usize = 1;

/// Errors raised while building a wavetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WavetableError {
    /// The table must hold at least one sample per period.
    #[error("wavetable length must be non-zero")]
    EmptyTable,
    /// Interpolation reads one sample past the index, so one guard is required.
    #[error("wavetable needs at least one guard point for interpolation")]
    MissingGuard,
    /// More guard points than samples cannot be filled from one period.
    #[error("guard count {guards} exceeds table length {length}")]
    TooManyGuards {
        /// Requested guard count.
        guards: usize,
        /// Samples per period.
        length: usize,
    },
}

/// Shared waveform kinds available from the process-wide registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// `sin(x)` over one period.
    Sine,
    /// `cos(x)` over one period.
    Cosine,
}

impl Waveform {
    /// All registry entries, in registry order.
    pub const ALL: [Waveform; 2] = [Waveform::Sine, Waveform::Cosine];

    /// Evaluate the generator at `x` radians.
    #[inline]
    pub fn generate(self, x: f32) -> f32 {
        match self {
            Waveform::Sine => libm::sinf(x),
            Waveform::Cosine => libm::cosf(x),
        }
    }

    fn slot(self) -> &'static OnceBox<Wavetable> {
        match self {
            Waveform::Sine => &SINE,
            Waveform::Cosine => &COSINE,
        }
    }
}

static SINE: OnceBox<Wavetable> = OnceBox::new();
static COSINE: OnceBox<Wavetable> = OnceBox::new();

/// One period of a waveform plus guard points.
///
/// # Example
///
/// ```rust
/// use klimper_dsp::Wavetable;
///
/// let table = Wavetable::new(4, 1, |x| x).unwrap();
/// assert_eq!(table.len(), 4);
/// assert_eq!(table.samples().len(), 5);
/// // The guard point repeats the first sample
/// assert_eq!(table.samples()[4], table.samples()[0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Wavetable {
    length: usize,
    guards: usize,
    samples: Vec<f32>,
}

impl Wavetable {
    /// Sample `generator` at `length` points over `[0, 2π)` and append
    /// `guards` copies of the leading samples.
    pub fn new(
        length: usize,
        guards: usize,
        generator: impl Fn(f32) -> f32,
    ) -> Result<Self, WavetableError> {
        if length == 0 {
            return Err(WavetableError::EmptyTable);
        }
        if guards == 0 {
            return Err(WavetableError::MissingGuard);
        }
        if guards > length {
            return Err(WavetableError::TooManyGuards { guards, length });
        }

        Ok(Self::build(length, guards, generator))
    }

    /// Build a table for one of the registry waveforms with the default geometry.
    pub fn for_waveform(waveform: Waveform) -> Self {
        Self::build(DEFAULT_LENGTH, DEFAULT_GUARD_POINTS, |x| waveform.generate(x))
    }

    fn build(length: usize, guards: usize, generator: impl Fn(f32) -> f32) -> Self {
        let step = TAU / length as f32;
        let mut samples = Vec::with_capacity(length + guards);
        samples.extend((0..length).map(|i| generator(i as f32 * step)));
        samples.extend_from_within(..guards);
        Self {
            length,
            guards,
            samples,
        }
    }

    /// Get the process-wide table for `waveform`, building it on first use.
    ///
    /// Tables are never freed; the returned reference lives as long as the
    /// process.
    pub fn shared(waveform: Waveform) -> &'static Wavetable {
        waveform.slot().get_or_init(|| {
            #[cfg(feature = "tracing")]
            tracing::debug!(?waveform, length = DEFAULT_LENGTH, "building shared wavetable");
            Box::new(Self::for_waveform(waveform))
        })
    }

    /// Samples per period (excluding guard points).
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Always false; construction rejects empty tables.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of guard points.
    #[inline]
    pub fn guards(&self) -> usize {
        self.guards
    }

    /// All stored samples including guard points.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Read the table at a fractional index with linear interpolation.
    ///
    /// `index` must lie in `[0, len)`. The oscillator's wrap logic keeps it
    /// there; no wrapping happens here.
    #[inline]
    pub fn read_interpolated(&self, index: f32) -> f32 {
        let whole = index as usize;
        let value = self.samples[whole];
        let slope = self.samples[whole + 1] - value;
        value + slope * (index - whole as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_geometry() {
        assert_eq!(
            Wavetable::new(0, 1, |x| x).unwrap_err(),
            WavetableError::EmptyTable
        );
        assert_eq!(
            Wavetable::new(16, 0, |x| x).unwrap_err(),
            WavetableError::MissingGuard
        );
        assert!(matches!(
            Wavetable::new(2, 3, |x| x),
            Err(WavetableError::TooManyGuards { guards: 3, length: 2 })
        ));
    }

    #[test]
    fn test_guard_points_replicate_head() {
        let table = Wavetable::new(8, 3, |x| x).unwrap();
        let s = table.samples();
        assert_eq!(s.len(), 11);
        assert_eq!(&s[8..11], &s[0..3]);
    }

    #[test]
    fn test_interpolation_midpoint() {
        let table = Wavetable::new(4, 1, |x| x).unwrap();
        let s = table.samples();
        let mid = table.read_interpolated(1.5);
        assert!((mid - (s[1] + s[2]) * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_read_at_zero_is_first_sample() {
        let table = Wavetable::shared(Waveform::Cosine);
        assert_eq!(table.read_interpolated(0.0), table.samples()[0]);
        assert!((table.samples()[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_boundary_interpolates_into_guard() {
        let table = Wavetable::shared(Waveform::Sine);
        let last = table.len() as f32 - 0.5;
        let value = table.read_interpolated(last);
        // Halfway between sin(-step) and sin(0)
        assert!(value < 0.0 && value > -0.01, "got {value}");
    }

    #[test]
    fn test_shared_tables_are_cached() {
        let a = Wavetable::shared(Waveform::Sine);
        let b = Wavetable::shared(Waveform::Sine);
        assert!(core::ptr::eq(a, b));
        assert_eq!(a.len(), DEFAULT_LENGTH);
        assert_eq!(a.guards(), DEFAULT_GUARD_POINTS);
    }
}
