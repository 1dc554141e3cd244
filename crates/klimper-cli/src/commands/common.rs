//! Shared CLI helpers used across multiple commands.

use std::path::Path;

use anyhow::Context;
use clap::Args;
use klimper_config::{KlimperConfig, default_config_path};
use klimper_io::PipelineConfig;

/// Engine overrides accepted by `play` and `render`.
#[derive(Args, Debug, Default)]
pub struct EngineArgs {
    /// Tempo in beats per minute
    #[arg(long)]
    pub bpm: Option<u32>,

    /// Notes to pick from (e.g. "48,52,55,60")
    #[arg(long, value_delimiter = ',')]
    pub notes: Option<Vec<u8>>,

    /// Seed for sequencer and voice randomness
    #[arg(long)]
    pub seed: Option<u32>,

    /// Number of voices
    #[arg(long)]
    pub polyphony: Option<usize>,

    /// Master volume (0.0 - 1.0)
    #[arg(long)]
    pub volume: Option<f32>,
}

impl EngineArgs {
    /// Apply the overrides on top of `config`.
    pub fn apply(&self, config: &mut KlimperConfig) {
        if let Some(bpm) = self.bpm {
            config.sequencer.bpm = bpm;
        }
        if let Some(notes) = &self.notes {
            config.sequencer.notes.clone_from(notes);
        }
        if let Some(seed) = self.seed {
            config.sequencer.seed = seed;
            config.synth.seed = seed.rotate_left(16) ^ 0x9E37_79B9;
        }
        if let Some(polyphony) = self.polyphony {
            config.synth.polyphony = polyphony;
        }
        if let Some(volume) = self.volume {
            config.synth.volume = volume;
        }
    }
}

/// Load the configuration.
///
/// An explicit path must exist. Without one, the user config file is used
/// when present, and the built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<KlimperConfig> {
    if let Some(path) = path {
        return KlimperConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()));
    }

    let default = default_config_path();
    if default.is_file() {
        tracing::info!(path = %default.display(), "using user configuration");
        return KlimperConfig::load(&default)
            .with_context(|| format!("loading configuration {}", default.display()));
    }

    Ok(KlimperConfig::default())
}

/// Period geometry for the pipeline.
pub fn pipeline_config(config: &KlimperConfig) -> PipelineConfig {
    PipelineConfig {
        period_samples: config.audio.period_samples,
        periods: config.audio.periods,
        sub_block_samples: config.audio.sub_block_samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_applied() {
        let mut config = KlimperConfig::default();
        let args = EngineArgs {
            bpm: Some(120),
            notes: Some(vec![60, 64]),
            seed: Some(7),
            polyphony: Some(2),
            volume: Some(0.5),
        };
        args.apply(&mut config);
        assert_eq!(config.sequencer.bpm, 120);
        assert_eq!(config.sequencer.notes, vec![60, 64]);
        assert_eq!(config.sequencer.seed, 7);
        assert_eq!(config.synth.polyphony, 2);
        assert_eq!(config.synth.volume, 0.5);
    }

    #[test]
    fn no_overrides_keeps_config() {
        let mut config = KlimperConfig::default();
        EngineArgs::default().apply(&mut config);
        assert_eq!(config, KlimperConfig::default());
    }

    #[test]
    fn pipeline_geometry_from_config() {
        let config = KlimperConfig::default();
        assert_eq!(pipeline_config(&config), PipelineConfig::default());
    }
}
