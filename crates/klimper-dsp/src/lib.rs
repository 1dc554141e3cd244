//! Klimper DSP - wavetable primitives for the klimper synthesizer
//!
//! This crate provides the leaf building blocks of the synthesis engine. All of
//! them are designed for a hard real-time render loop: nothing here allocates
//! after construction, and every per-sample method is a handful of float
//! operations.
//!
//! # Core Components
//!
//! - [`Wavetable`] - One precomputed waveform period with guard points
//! - [`Waveform`] - The closed set of shared tables (sine, cosine)
//! - [`Oscillator`] - Phase-accumulator table reader with linear FM input
//! - [`Envelope`] - Linear-segment ADSR envelope generator
//! - [`Panner`] - Table-based equal-power stereo panning
//! - [`Xorshift32`] - Tiny PRNG for voice parameters and sequencing
//!
//! ```rust
//! use klimper_dsp::{Oscillator, Wavetable, Waveform};
//!
//! let mut osc = Oscillator::new(Wavetable::shared(Waveform::Sine), 44100.0);
//! osc.reinit(440.0, true);
//!
//! let sample = osc.tick(0.0);
//! assert_eq!(sample, 0.0);
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc` for table storage).
//! Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! klimper-dsp = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod envelope;
pub mod math;
pub mod oscillator;
pub mod pan;
pub mod rng;
pub mod wavetable;

pub use envelope::{AdsrValues, Breakpoint, Envelope, EnvelopeStatus};
pub use math::midi_to_hz;
pub use oscillator::Oscillator;
pub use pan::Panner;
pub use rng::Xorshift32;
pub use wavetable::{DEFAULT_GUARD_POINTS, DEFAULT_LENGTH, Waveform, Wavetable, WavetableError};
