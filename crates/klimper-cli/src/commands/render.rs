//! Offline render to a WAV file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use klimper_io::{AudioSink, ControlInputs, OfflineSink, PcmWavWriter, Pipeline};

use super::common::{EngineArgs, load_config, pipeline_config};

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Length in seconds
    #[arg(short, long, default_value = "10.0")]
    duration: f32,

    #[command(flatten)]
    engine: EngineArgs,
}

pub fn run(args: RenderArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    if !args.duration.is_finite() || args.duration <= 0.0 {
        anyhow::bail!("duration must be a positive number of seconds");
    }

    let mut config = load_config(config_path)?;
    args.engine.apply(&mut config);
    let (synth, sequencer) = config.build_engine()?;

    let sample_rate = config.audio.sample_rate;
    let period = config.audio.period_samples;
    let total_samples = (f64::from(args.duration) * f64::from(sample_rate)).ceil() as usize * 2;
    let periods = total_samples.div_ceil(period);

    println!(
        "Rendering {:.2}s at {} Hz, {} bpm, {} voices...",
        args.duration, sample_rate, config.sequencer.bpm, config.synth.polyphony
    );

    let mut pipeline = Pipeline::new(
        synth,
        sequencer,
        pipeline_config(&config),
        ControlInputs::default(),
    )?;
    pipeline.prime();

    let mut sink = OfflineSink::new();
    sink.start(pipeline.ring(), pipeline.interrupt_handler())?;

    let mut writer = PcmWavWriter::create(&args.output, sample_rate, 2)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let pb = ProgressBar::new(periods as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} periods ({eta})")?
            .progress_chars("##-"),
    );

    let mut remaining = total_samples;
    let mut peak = 0i16;
    sink.render(pipeline.worker_mut(), periods, |samples| {
        let n = samples.len().min(remaining);
        let samples = &samples[..n];
        peak = samples.iter().fold(peak, |p, s| p.max(s.saturating_abs()));
        writer.write(samples)?;
        remaining -= n;
        pb.inc(1);
        Ok(())
    })?;
    sink.stop();
    pb.finish_with_message("done");

    let written = writer.samples_written();
    writer.finalize()?;

    let stats = pipeline.stats();
    let peak_db = if peak == 0 {
        -120.0
    } else {
        20.0 * (f32::from(peak) / 32767.0).log10()
    };
    println!("\nStats:");
    println!("  Frames:  {}", written / 2);
    println!("  Peak:    {peak_db:.1} dBFS");
    println!("  Periods: {}", stats.periods_rendered());
    println!("\nWrote {}", args.output.display());

    Ok(())
}
