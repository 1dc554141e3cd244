//! Audio pipeline for the klimper synthesizer.
//!
//! Audio leaves the engine the way it does on the embedded target: an output
//! device plays a ring of fixed-size periods, and each time it finishes one it
//! raises an "interrupt". The interrupt handler posts the descriptor of the
//! freshly emptied period into a single-slot [`Mailbox`] and wakes the
//! [`Worker`], which renders the next period into that region.
//!
//! This crate provides:
//!
//! - **Handoff**: [`Mailbox`] and [`Descriptor`], a lock-free overwrite slot
//! - **Shared memory**: [`PeriodRing`], the 16-bit PCM ring both sides address
//! - **Rendering**: [`Worker`], which runs sequencer, synth and quantizer
//! - **Sinks**: [`CpalSink`] for a real device, [`OfflineSink`] for
//!   deterministic rendering
//! - **Files**: [`PcmWavWriter`] and [`read_wav_pcm16`] for 16-bit WAV
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use klimper_io::{AudioSink, ControlInputs, CpalSink, Pipeline, PipelineConfig};
//!
//! let mut pipeline = Pipeline::new(synth, sequencer, PipelineConfig::default(), ControlInputs::default())?;
//! pipeline.prime();
//! let running = pipeline.spawn()?;
//! let mut sink = CpalSink::new(None, 44100);
//! sink.start(running.ring(), running.interrupt_handler())?;
//! ```

mod cpal_sink;
mod interrupt;
mod mailbox;
mod offline;
pub mod pcm;
mod pipeline;
mod ring;
mod sink;
mod wav;
mod worker;

pub use cpal_sink::{AudioDevice, CpalSink, list_devices};
pub use interrupt::{InterruptHandler, PipelineStats};
pub use mailbox::{Descriptor, Mailbox};
pub use offline::OfflineSink;
pub use pipeline::{Pipeline, PipelineConfig, RunningPipeline};
pub use ring::PeriodRing;
pub use sink::AudioSink;
pub use wav::{PcmWavWriter, read_wav_pcm16};
pub use worker::{ControlInputs, Worker};

/// Error types for the audio pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Period geometry the pipeline cannot run with.
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// The sink was started twice.
    #[error("Audio sink already started")]
    AlreadyStarted,

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
