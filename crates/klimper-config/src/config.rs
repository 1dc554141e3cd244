//! Configuration file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use klimper_synth::{AdsrValues, Sequencer, Synth, SynthSettings};

use crate::error::ConfigError;
use crate::validation;

/// Complete klimper configuration.
///
/// Only the engine setup is stored. What the sequencer plays at any moment
/// is never persisted.
///
/// # TOML Format
///
/// ```toml
/// [audio]
/// sample_rate = 44100
/// period_samples = 880
/// periods = 2
/// sub_block_samples = 220
///
/// [synth]
/// polyphony = 8
/// volume = 1.0
/// fm_ratios = [0.5, 1.0, 2.0, 3.0, 4.0]
///
/// [synth.carrier_envelope]
/// attack = 0.1
/// decay = 0.3
/// sustain = 0.5
/// release = 0.5
///
/// [sequencer]
/// bpm = 80
/// notes = [48, 50, 52, 53, 55, 57, 59, 60]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KlimperConfig {
    /// Audio output and period geometry.
    pub audio: AudioConfig,
    /// Voice engine setup.
    pub synth: SynthConfig,
    /// Sequencer setup.
    pub sequencer: SequencerConfig,
}

/// Audio output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved samples per period.
    pub period_samples: usize,
    /// Periods in the ring.
    pub periods: usize,
    /// Interleaved samples per sequencer/synth step. Must divide the period.
    pub sub_block_samples: usize,
    /// Output device name or index. Default device when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            period_samples: 880,
            periods: 2,
            sub_block_samples: 220,
            device: None,
        }
    }
}

/// ADSR values in seconds and linear level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Attack time in seconds.
    pub attack: f32,
    /// Level reached at the end of the attack.
    pub peak: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        AdsrValues::default().into()
    }
}

impl From<AdsrValues> for EnvelopeConfig {
    fn from(v: AdsrValues) -> Self {
        Self {
            attack: v.attack,
            peak: v.peak,
            decay: v.decay,
            sustain: v.sustain,
            release: v.release,
        }
    }
}

impl From<EnvelopeConfig> for AdsrValues {
    fn from(c: EnvelopeConfig) -> Self {
        Self {
            attack: c.attack,
            peak: c.peak,
            decay: c.decay,
            sustain: c.sustain,
            release: c.release,
        }
    }
}

/// Voice engine settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthConfig {
    /// Number of voices.
    pub polyphony: usize,
    /// Master volume in `[0, 1]`.
    pub volume: f32,
    /// Amplitude envelope.
    pub carrier_envelope: EnvelopeConfig,
    /// Modulation depth envelope.
    pub modulator_envelope: EnvelopeConfig,
    /// Modulator/carrier ratios picked from per note.
    pub fm_ratios: Vec<f32>,
    /// Smallest FM index picked per note.
    pub fm_index_min: f32,
    /// Largest FM index picked per note.
    pub fm_index_max: f32,
    /// PRNG seed for per-voice randomness.
    pub seed: u32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        let s = SynthSettings::default();
        Self {
            polyphony: s.polyphony,
            volume: s.volume,
            carrier_envelope: s.carrier_envelope.into(),
            modulator_envelope: s.modulator_envelope.into(),
            fm_ratios: s.fm_ratios,
            fm_index_min: s.fm_index_min,
            fm_index_max: s.fm_index_max,
            seed: s.seed,
        }
    }
}

/// Sequencer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SequencerConfig {
    /// Tempo in beats per minute.
    pub bpm: u32,
    /// MIDI notes to pick from.
    pub notes: Vec<u8>,
    /// Whether the sequencer plays on startup.
    pub running: bool,
    /// PRNG seed for note choice and timing.
    pub seed: u32,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            bpm: 80,
            notes: vec![48, 50, 52, 53, 55, 57, 59, 60],
            running: true,
            seed: 0x5EC0_0001,
        }
    }
}

impl KlimperConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load a configuration from a TOML string. Missing keys take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value. See [`validation::validate_config`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)?;
        Ok(())
    }

    /// Engine settings for [`Synth::new`].
    pub fn synth_settings(&self) -> SynthSettings {
        SynthSettings {
            sample_rate: self.audio.sample_rate as f32,
            polyphony: self.synth.polyphony,
            volume: self.synth.volume,
            carrier_envelope: self.synth.carrier_envelope.into(),
            modulator_envelope: self.synth.modulator_envelope.into(),
            fm_ratios: self.synth.fm_ratios.clone(),
            fm_index_min: self.synth.fm_index_min,
            fm_index_max: self.synth.fm_index_max,
            seed: self.synth.seed,
        }
    }

    /// Validate and build the synth and sequencer.
    pub fn build_engine(&self) -> Result<(Synth, Sequencer), ConfigError> {
        self.validate()?;
        let synth = Synth::new(self.synth_settings())?;
        let mut sequencer = Sequencer::new(
            self.audio.sample_rate as f32,
            &self.sequencer.notes,
            self.sequencer.bpm,
            self.sequencer.seed,
        )?;
        sequencer.set_running(self.sequencer.running);
        Ok((synth, sequencer))
    }
}
