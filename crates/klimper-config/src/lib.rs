//! Configuration for the klimper synthesizer.
//!
//! A [`KlimperConfig`] describes how the engine is set up: audio geometry,
//! voice pool and envelopes, sequencer tempo and scale. It is stored as TOML,
//! checked by [`validate_config`], and turned into a ready
//! [`Synth`](klimper_synth::Synth) and [`Sequencer`](klimper_synth::Sequencer)
//! by [`KlimperConfig::build_engine`].
//!
//! # Example
//!
//! ```rust,no_run
//! use klimper_config::{KlimperConfig, default_config_path};
//!
//! let path = default_config_path();
//! let config = if path.exists() {
//!     KlimperConfig::load(&path).unwrap()
//! } else {
//!     KlimperConfig::default()
//! };
//!
//! let (synth, sequencer) = config.build_engine().unwrap();
//! ```

mod config;
mod error;

/// Platform-specific configuration paths.
pub mod paths;

/// Configuration validation.
pub mod validation;

pub use config::{AudioConfig, EnvelopeConfig, KlimperConfig, SequencerConfig, SynthConfig};
pub use error::ConfigError;
pub use paths::{CONFIG_FILE_NAME, default_config_path, ensure_user_config_dir, user_config_dir};
pub use validation::{ValidationError, ValidationResult, validate_config};
