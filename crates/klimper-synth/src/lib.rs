//! Klimper Synth - FM voice engine and sequencer
//!
//! This crate builds the musical layer on top of [`klimper_dsp`]:
//!
//! ## Voices and the engine
//!
//! - [`Voice`] - Carrier and modulator oscillator pairs with their envelopes,
//!   plus a slow LFO that sweeps the stereo position
//! - [`Synth`] - Fixed voice pool with retrigger / free / steal allocation
//!
//! ```rust
//! use klimper_synth::{Synth, SynthSettings};
//!
//! let mut synth = Synth::new(SynthSettings::default()).unwrap();
//! synth.note_on(60, 1.0);
//!
//! // Interleaved stereo, accumulated into the buffer
//! let mut block = vec![0.0f32; 2 * 220];
//! synth.process(&mut block);
//! assert_eq!(synth.active_voice_count(), 1);
//! ```
//!
//! ## Sequencing
//!
//! - [`Sequencer`] - Random notes from a scale, random pauses and durations
//! - [`NoteSink`] - Anything that accepts note events (the [`Synth`] does)
//!
//! ## Control
//!
//! - [`SharedParams`] - Lock-free parameter bank for a control thread to
//!   write and the render thread to apply
//! - [`NoteEvent`] - Note commands queued for the render thread
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc` for the voice pool).
//!
//! ```toml
//! [dependencies]
//! klimper-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod error;
pub mod event;
pub mod params;
pub mod sequencer;
pub mod synth;
pub mod voice;

pub use error::SynthError;
pub use event::NoteEvent;
pub use params::{ParamId, ParamInfo, SharedParams};
pub use sequencer::{NoteDuration, NoteSink, SEQUENCER_SLOTS, Sequencer};
pub use synth::{Synth, SynthSettings};
pub use voice::Voice;

pub use klimper_dsp::{AdsrValues, EnvelopeStatus};
