//! Criterion benchmarks for klimper-dsp primitives
//!
//! Run with: cargo bench -p klimper-dsp

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use klimper_dsp::{Envelope, Oscillator, Panner, Waveform, Wavetable};

const SAMPLE_RATE: f32 = 44100.0;
const BLOCK_SIZES: &[usize] = &[64, 220, 512, 880];

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oscillator");

    for &block_size in BLOCK_SIZES {
        let mut osc = Oscillator::new(Wavetable::shared(Waveform::Sine), SAMPLE_RATE);
        osc.reinit(440.0, true);

        group.bench_with_input(BenchmarkId::new("Plain", block_size), &block_size, |b, &size| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for _ in 0..size {
                    sum += osc.tick(0.0);
                }
                black_box(sum)
            })
        });

        let mut carrier = Oscillator::new(Wavetable::shared(Waveform::Sine), SAMPLE_RATE);
        let mut modulator = Oscillator::new(Wavetable::shared(Waveform::Sine), SAMPLE_RATE);
        carrier.reinit(440.0, true);
        carrier.set_fm_scale(carrier.phase_increment());
        modulator.reinit(880.0, true);

        group.bench_with_input(BenchmarkId::new("FM", block_size), &block_size, |b, &size| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for _ in 0..size {
                    let m = modulator.tick(0.0) * 0.8;
                    sum += carrier.tick(m);
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}

fn bench_envelope_and_pan(c: &mut Criterion) {
    let mut group = c.benchmark_group("Envelope_Pan");

    for &block_size in BLOCK_SIZES {
        let mut env = Envelope::new(SAMPLE_RATE);
        let panner = Panner::new();
        env.trigger_attack();

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, &size| {
                b.iter(|| {
                    let mut acc = (0.0f32, 0.0f32);
                    for i in 0..size {
                        let pan = (i as f32 / size as f32) * 2.0 - 1.0;
                        let (l, r) = panner.stereo(env.tick(), pan);
                        acc.0 += l;
                        acc.1 += r;
                    }
                    black_box(acc)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_oscillator, bench_envelope_and_pan);
criterion_main!(benches);
