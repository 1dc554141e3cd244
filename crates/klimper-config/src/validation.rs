//! Configuration validation.
//!
//! Every check runs and all failures are reported together, so a user
//! fixing a config file sees every problem at once.
//!
//! ```rust
//! use klimper_config::{KlimperConfig, ValidationError, validate_config};
//!
//! let mut config = KlimperConfig::default();
//! assert!(validate_config(&config).is_ok());
//!
//! config.synth.polyphony = 0;
//! config.sequencer.bpm = 0;
//! assert!(matches!(validate_config(&config), Err(ValidationError::Multiple(_))));
//! ```

use klimper_synth::ParamId;
use thiserror::Error;

use crate::config::{EnvelopeConfig, KlimperConfig};

/// Largest interleaved period a descriptor can carry.
pub const MAX_PERIOD_SAMPLES: usize = 0xFFFF;

/// Largest ring offset a descriptor can carry.
pub const MAX_RING_OFFSET: usize = 0x7FFF;

/// Largest voice pool accepted from a file.
pub const MAX_POLYPHONY: usize = 64;

/// Accepted sample rates in Hz.
pub const SAMPLE_RATE_RANGE: core::ops::RangeInclusive<u32> = 8000..=192_000;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Numeric value out of range.
    #[error("'{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the field.
        field: String,
        /// The rejected value.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// A value that is not a finite number.
    #[error("'{field}' must be a finite number")]
    NotFinite {
        /// Dotted path of the field.
        field: String,
    },

    /// Period geometry the pipeline cannot run with.
    #[error("invalid period geometry: {0}")]
    Geometry(String),

    /// A list that must not be empty.
    #[error("'{0}' must not be empty")]
    Empty(String),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_range(errors: &mut Vec<ValidationError>, field: &str, value: f64, min: f64, max: f64) {
    if !value.is_finite() {
        errors.push(ValidationError::NotFinite {
            field: field.to_string(),
        });
    } else if value < min || value > max {
        errors.push(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
}

fn check_param(errors: &mut Vec<ValidationError>, field: &str, id: ParamId, value: f32) {
    let info = id.info();
    check_range(
        errors,
        field,
        f64::from(value),
        f64::from(info.min),
        f64::from(info.max),
    );
}

fn check_envelope(
    errors: &mut Vec<ValidationError>,
    prefix: &str,
    env: &EnvelopeConfig,
    ids: [ParamId; 5],
) {
    let [attack, peak, decay, sustain, release] = ids;
    check_param(errors, &format!("{prefix}.attack"), attack, env.attack);
    check_param(errors, &format!("{prefix}.peak"), peak, env.peak);
    check_param(errors, &format!("{prefix}.decay"), decay, env.decay);
    check_param(errors, &format!("{prefix}.sustain"), sustain, env.sustain);
    check_param(errors, &format!("{prefix}.release"), release, env.release);
}

fn check_geometry(errors: &mut Vec<ValidationError>, config: &KlimperConfig) {
    let audio = &config.audio;
    let period = audio.period_samples;
    let sub_block = audio.sub_block_samples;

    if period == 0 || period % 2 != 0 {
        errors.push(ValidationError::Geometry(format!(
            "period of {period} samples is not a whole number of stereo frames"
        )));
    } else if period > MAX_PERIOD_SAMPLES {
        errors.push(ValidationError::Geometry(format!(
            "period of {period} samples exceeds {MAX_PERIOD_SAMPLES}"
        )));
    }

    if audio.periods < 2 {
        errors.push(ValidationError::Geometry(format!(
            "ring needs at least 2 periods, got {}",
            audio.periods
        )));
    } else if (audio.periods - 1).saturating_mul(period) > MAX_RING_OFFSET {
        errors.push(ValidationError::Geometry(format!(
            "{} periods of {period} samples exceed the ring offset limit {MAX_RING_OFFSET}",
            audio.periods
        )));
    }

    if sub_block == 0 || sub_block % 2 != 0 {
        errors.push(ValidationError::Geometry(format!(
            "sub-block of {sub_block} samples is not a whole number of stereo frames"
        )));
    } else if period % sub_block != 0 {
        errors.push(ValidationError::Geometry(format!(
            "sub-block of {sub_block} samples does not divide the {period}-sample period"
        )));
    }
}

/// Check a whole configuration.
///
/// Returns the single error when exactly one check fails and
/// [`ValidationError::Multiple`] otherwise.
pub fn validate_config(config: &KlimperConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if !SAMPLE_RATE_RANGE.contains(&config.audio.sample_rate) {
        errors.push(ValidationError::OutOfRange {
            field: "audio.sample_rate".into(),
            value: f64::from(config.audio.sample_rate),
            min: f64::from(*SAMPLE_RATE_RANGE.start()),
            max: f64::from(*SAMPLE_RATE_RANGE.end()),
        });
    }
    check_geometry(&mut errors, config);

    let synth = &config.synth;
    check_range(
        &mut errors,
        "synth.polyphony",
        synth.polyphony as f64,
        1.0,
        MAX_POLYPHONY as f64,
    );
    check_param(&mut errors, "synth.volume", ParamId::Volume, synth.volume);
    check_envelope(
        &mut errors,
        "synth.carrier_envelope",
        &synth.carrier_envelope,
        [
            ParamId::CarrierAttack,
            ParamId::CarrierPeak,
            ParamId::CarrierDecay,
            ParamId::CarrierSustain,
            ParamId::CarrierRelease,
        ],
    );
    check_envelope(
        &mut errors,
        "synth.modulator_envelope",
        &synth.modulator_envelope,
        [
            ParamId::ModulatorAttack,
            ParamId::ModulatorPeak,
            ParamId::ModulatorDecay,
            ParamId::ModulatorSustain,
            ParamId::ModulatorRelease,
        ],
    );

    if synth.fm_ratios.is_empty() {
        errors.push(ValidationError::Empty("synth.fm_ratios".into()));
    }
    for (i, &ratio) in synth.fm_ratios.iter().enumerate() {
        check_range(
            &mut errors,
            &format!("synth.fm_ratios[{i}]"),
            f64::from(ratio),
            1.0 / 64.0,
            64.0,
        );
    }
    check_range(
        &mut errors,
        "synth.fm_index_min",
        f64::from(synth.fm_index_min),
        0.0,
        64.0,
    );
    check_range(
        &mut errors,
        "synth.fm_index_max",
        f64::from(synth.fm_index_max),
        f64::from(synth.fm_index_min.max(0.0)),
        64.0,
    );

    let seq = &config.sequencer;
    check_param(&mut errors, "sequencer.bpm", ParamId::Bpm, seq.bpm as f32);
    if seq.notes.is_empty() {
        errors.push(ValidationError::Empty("sequencer.notes".into()));
    }
    for (i, &note) in seq.notes.iter().enumerate() {
        check_range(
            &mut errors,
            &format!("sequencer.notes[{i}]"),
            f64::from(note),
            0.0,
            127.0,
        );
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => {
            tracing::debug!(count = errors.len(), "configuration rejected");
            Err(ValidationError::Multiple(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(validate_config(&KlimperConfig::default()), Ok(()));
    }

    #[test]
    fn zero_polyphony_rejected() {
        let mut c = KlimperConfig::default();
        c.synth.polyphony = 0;
        assert!(matches!(
            validate_config(&c),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "synth.polyphony"
        ));
    }

    #[test]
    fn zero_bpm_rejected() {
        let mut c = KlimperConfig::default();
        c.sequencer.bpm = 0;
        assert!(matches!(
            validate_config(&c),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "sequencer.bpm"
        ));
    }

    #[test]
    fn empty_notes_rejected() {
        let mut c = KlimperConfig::default();
        c.sequencer.notes.clear();
        assert_eq!(
            validate_config(&c),
            Err(ValidationError::Empty("sequencer.notes".into()))
        );
    }

    #[test]
    fn note_above_midi_range_rejected() {
        let mut c = KlimperConfig::default();
        c.sequencer.notes.push(128);
        assert!(validate_config(&c).is_err());
    }

    #[test]
    fn sub_block_must_divide_period() {
        let mut c = KlimperConfig::default();
        c.audio.sub_block_samples = 300;
        assert!(matches!(validate_config(&c), Err(ValidationError::Geometry(_))));
    }

    #[test]
    fn ring_offset_limit() {
        let mut c = KlimperConfig::default();
        c.audio.period_samples = 0x4000;
        c.audio.sub_block_samples = 0x400;
        c.audio.periods = 3;
        assert!(matches!(validate_config(&c), Err(ValidationError::Geometry(_))));
    }

    #[test]
    fn nan_envelope_rejected() {
        let mut c = KlimperConfig::default();
        c.synth.carrier_envelope.release = f32::NAN;
        assert_eq!(
            validate_config(&c),
            Err(ValidationError::NotFinite {
                field: "synth.carrier_envelope.release".into()
            })
        );
    }

    #[test]
    fn inverted_index_range_rejected() {
        let mut c = KlimperConfig::default();
        c.synth.fm_index_min = 2.0;
        c.synth.fm_index_max = 1.0;
        assert!(validate_config(&c).is_err());
    }

    #[test]
    fn errors_collected() {
        let mut c = KlimperConfig::default();
        c.synth.polyphony = 0;
        c.sequencer.bpm = 0;
        c.synth.fm_ratios.clear();
        let Err(ValidationError::Multiple(errors)) = validate_config(&c) else {
            panic!("expected multiple errors");
        };
        assert_eq!(errors.len(), 3);
        assert!(ValidationError::Multiple(errors).to_string().contains("; "));
    }
}
