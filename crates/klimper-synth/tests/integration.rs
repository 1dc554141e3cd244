//! Integration tests for klimper-synth crate.
//!
//! Tests cover voice allocation and stealing, release timing, sequencer
//! driving the engine, and output bounds.

use klimper_synth::{
    AdsrValues, NoteSink, ParamId, Sequencer, SharedParams, Synth, SynthSettings,
};
use proptest::prelude::*;

const SR: f32 = 44100.0;
const BLOCK: usize = 220;

fn synth(polyphony: usize) -> Synth {
    Synth::new(SynthSettings {
        sample_rate: SR,
        polyphony,
        ..SynthSettings::default()
    })
    .unwrap()
}

fn render(synth: &mut Synth, frames: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(frames * 2);
    let mut block = [0.0f32; BLOCK * 2];
    let mut left = frames;
    while left > 0 {
        let n = left.min(BLOCK);
        block[..n * 2].fill(0.0);
        synth.process(&mut block[..n * 2]);
        out.extend_from_slice(&block[..n * 2]);
        left -= n;
    }
    out
}

// ---------------------------------------------------------------------------
// 1. Voice allocation and stealing
// ---------------------------------------------------------------------------

#[test]
fn allocation_fills_all_voices() {
    let mut s = synth(8);
    for note in 60..68 {
        s.note_on(note, 1.0);
    }
    assert_eq!(s.active_voice_count(), 8);
}

#[test]
fn one_extra_note_steals_exactly_one_voice() {
    let mut s = synth(8);
    for note in 60..68 {
        s.note_on(note, 1.0);
    }
    render(&mut s, 500);
    s.note_on(80, 1.0);

    let notes: Vec<u8> = s.voices().iter().filter_map(|v| v.note()).collect();
    assert_eq!(s.active_voice_count(), 8);
    assert!(notes.contains(&80));
    let survivors = (60..68).filter(|n| notes.contains(n)).count();
    assert_eq!(survivors, 7, "exactly one voice stolen: {notes:?}");
}

#[test]
fn repeated_note_reuses_its_voice() {
    let mut s = synth(8);
    s.note_on(60, 1.0);
    render(&mut s, 100);
    let before: Vec<_> = s.voices().iter().map(|v| v.note()).collect();
    s.note_on(60, 1.0);
    render(&mut s, 100);
    let after: Vec<_> = s.voices().iter().map(|v| v.note()).collect();
    assert_eq!(before, after);
    assert_eq!(s.active_voice_count(), 1);
}

// ---------------------------------------------------------------------------
// 2. Envelope-driven lifetime
// ---------------------------------------------------------------------------

#[test]
fn release_takes_release_time() {
    let mut s = Synth::new(SynthSettings {
        carrier_envelope: AdsrValues {
            attack: 0.0,
            peak: 1.0,
            decay: 0.0,
            sustain: 0.5,
            release: 0.5,
        },
        ..SynthSettings::default()
    })
    .unwrap();

    // 20 ms of sustained note, then release
    s.note_on(60, 1.0);
    render(&mut s, (0.020 * SR) as usize);
    assert_eq!(s.active_voice_count(), 1);
    s.note_off(60);

    let mut frames = 0;
    while s.active_voice_count() > 0 {
        render(&mut s, BLOCK);
        frames += BLOCK;
        assert!(frames < 30_000, "voice never released");
    }
    let expected = (0.5 * SR) as usize;
    assert!(
        frames >= expected && frames <= expected + BLOCK,
        "released after {frames} frames"
    );

    // Stays silent for good
    let tail = render(&mut s, 10_000);
    assert!(tail.iter().all(|&x| x == 0.0));
    assert_eq!(s.active_voice_count(), 0);
}

#[test]
fn all_notes_off_silences_everything() {
    let mut s = synth(4);
    for note in [60, 64, 67] {
        s.note_on(note, 1.0);
    }
    render(&mut s, 1000);
    s.all_notes_off();
    render(&mut s, SR as usize);
    assert_eq!(s.active_voice_count(), 0);
}

// ---------------------------------------------------------------------------
// 3. Sequencer driving the engine
// ---------------------------------------------------------------------------

#[test]
fn sequencer_plays_through_synth() {
    let mut s = synth(8);
    let mut seq = Sequencer::new(SR, &[48, 50, 52, 53, 55, 57, 59, 60], 80, 7).unwrap();
    let mut block = [0.0f32; BLOCK * 2];
    let mut peak = 0.0f32;

    for _ in 0..(SR as usize * 2 / BLOCK) {
        block.fill(0.0);
        seq.process(BLOCK, &mut s);
        s.process(&mut block);
        peak = block.iter().fold(peak, |p, x| p.max(x.abs()));
    }

    assert!(peak > 0.0, "sequencer produced silence");
    assert!(s.voices().iter().any(|v| v.note().is_some()));
}

#[test]
fn stopped_sequencer_leaves_synth_silent() {
    let mut s = synth(8);
    let mut seq = Sequencer::new(SR, &[60], 80, 7).unwrap();
    seq.set_running(false);
    let mut block = [0.0f32; BLOCK * 2];
    for _ in 0..200 {
        seq.process(BLOCK, &mut s);
        s.process(&mut block);
    }
    assert!(block.iter().all(|&x| x == 0.0));
}

#[test]
fn shared_params_reach_the_engine() {
    let mut s = synth(2);
    let mut seq = Sequencer::new(SR, &[60], 80, 7).unwrap();
    let params = SharedParams::capture(&s, &seq);
    let mut seen = params.version();

    params.set(ParamId::Volume, 0.0);
    params.sync_if_changed(&mut seen, &mut s, &mut seq);

    NoteSink::note_on(&mut s, 60, 1.0);
    let out = render(&mut s, 5000);
    assert!(out.iter().all(|&x| x == 0.0));
}

// ---------------------------------------------------------------------------
// 4. Output bounds
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any burst of notes keeps the pool bounded and the mix within [-1, 1].
    #[test]
    fn output_stays_bounded(
        notes in prop::collection::vec((0u8..128, 0.0f32..=1.0f32), 1..24),
        polyphony in 1usize..10,
    ) {
        let mut s = synth(polyphony);
        for &(note, velocity) in &notes {
            s.note_on(note, velocity);
            prop_assert!(s.active_voice_count() <= polyphony);
        }
        let out = render(&mut s, 4410);
        for &x in &out {
            prop_assert!(x.is_finite());
            prop_assert!(x.abs() <= 1.0 + 1e-5, "sample {} out of range", x);
        }
    }
}
