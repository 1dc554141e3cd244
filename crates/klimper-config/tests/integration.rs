//! Integration tests for klimper-config.

use klimper_config::{ConfigError, KlimperConfig, ValidationError};
use tempfile::TempDir;

#[test]
fn test_default_roundtrips_through_toml() {
    let config = KlimperConfig::default();
    let toml = config.to_toml().unwrap();
    let back = KlimperConfig::from_toml(&toml).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_save_and_load_nested_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("klimper.toml");

    let mut config = KlimperConfig::default();
    config.audio.device = Some("USB".into());
    config.synth.polyphony = 4;
    config.sequencer.bpm = 132;
    config.sequencer.notes = vec![60, 63, 65, 67, 70];

    config.save(&path).unwrap();
    assert!(path.exists());

    let loaded = KlimperConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = KlimperConfig::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
}

#[test]
fn test_loaded_config_builds_running_engine() {
    let toml = r#"
[audio]
sample_rate = 48000

[synth]
polyphony = 2
volume = 0.5

[synth.carrier_envelope]
attack = 0.0
decay = 0.0
sustain = 1.0
release = 0.1

[sequencer]
bpm = 300
notes = [69]
"#;
    let config = KlimperConfig::from_toml(toml).unwrap();
    let (mut synth, mut sequencer) = config.build_engine().unwrap();
    assert_eq!(synth.sample_rate(), 48000.0);
    assert_eq!(synth.volume(), 0.5);

    // One second is plenty for a note at 300 bpm
    let mut block = [0.0f32; 440];
    let mut heard = false;
    for _ in 0..(48000 / 220) {
        block.fill(0.0);
        sequencer.process(220, &mut synth);
        synth.process(&mut block);
        heard |= block.iter().any(|&s| s != 0.0);
    }
    assert!(heard);
}

#[test]
fn test_invalid_file_reports_all_problems() {
    let toml = r#"
[audio]
sub_block_samples = 300

[synth]
polyphony = 0

[sequencer]
bpm = 0
notes = []
"#;
    let config = KlimperConfig::from_toml(toml).unwrap();
    let Err(ConfigError::Validation(ValidationError::Multiple(errors))) = config.validate() else {
        panic!("expected collected validation errors");
    };
    assert_eq!(errors.len(), 4);
}
