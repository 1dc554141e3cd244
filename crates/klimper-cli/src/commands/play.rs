//! Live playback on an audio device.

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use clap::Args;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use klimper_io::{AudioSink, ControlInputs, CpalSink, Pipeline};
use klimper_platform::{
    ConsoleDisplay, ControlSurface, DEFAULT_EVENT_CAPACITY, MenuEvent, MenuNavigator,
    default_menu,
};
use klimper_synth::SharedParams;

use super::common::{EngineArgs, load_config, pipeline_config};

#[derive(Args)]
pub struct PlayArgs {
    /// Output device (index, exact name, or partial name)
    #[arg(short, long)]
    output: Option<String>,

    /// Stop after this many seconds
    #[arg(short, long)]
    duration: Option<f32>,

    /// Drive the menu from the keyboard (e/x/h/+/- then Enter)
    #[arg(short, long)]
    interactive: bool,

    /// Start with the sequencer stopped
    #[arg(long)]
    paused: bool,

    #[command(flatten)]
    engine: EngineArgs,
}

pub fn run(args: PlayArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.engine.apply(&mut config);
    if args.paused {
        config.sequencer.running = false;
    }
    if args.output.is_some() {
        config.audio.device.clone_from(&args.output);
    }
    let (synth, sequencer) = config.build_engine()?;

    let params = Arc::new(SharedParams::capture(&synth, &sequencer));
    let (surface, events) = ControlSurface::new(Arc::clone(&params), DEFAULT_EVENT_CAPACITY);
    let controls = ControlInputs {
        params: Some(params),
        events: Some(events),
    };

    let mut pipeline = Pipeline::new(synth, sequencer, pipeline_config(&config), controls)?;
    pipeline.prime();
    let running = pipeline.spawn()?;

    let mut sink = CpalSink::new(config.audio.device.clone(), config.audio.sample_rate);
    sink.start(running.ring(), running.interrupt_handler())?;

    println!(
        "\nPlaying at {} bpm with {} voices... Press Ctrl+C to stop.\n",
        config.sequencer.bpm, config.synth.polyphony
    );

    let active = Arc::new(AtomicBool::new(true));
    let a = Arc::clone(&active);
    ctrlc::set_handler(move || {
        a.store(false, Ordering::SeqCst);
    })?;

    let deadline = args
        .duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| Instant::now() + Duration::from_secs_f32(d));

    if args.interactive {
        run_menu(&surface, &active, deadline)?;
    } else {
        while active.load(Ordering::SeqCst) && deadline.is_none_or(|d| Instant::now() < d) {
            std::thread::sleep(Duration::from_millis(50));
        }
    }

    println!("\nStopping...");
    sink.stop();
    let worker = running.stop()?;

    let stats = worker.stats();
    println!(
        "Rendered {} periods, {} skipped, {} late.",
        stats.periods_rendered(),
        stats.overruns(),
        stats.late_periods()
    );

    Ok(())
}

fn spawn_stdin_reader() -> std::io::Result<Receiver<String>> {
    let (tx, rx) = crossbeam_channel::bounded(16);
    std::thread::Builder::new()
        .name("klimper-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

fn run_menu(
    surface: &ControlSurface,
    active: &AtomicBool,
    deadline: Option<Instant>,
) -> anyhow::Result<()> {
    let menu = default_menu();
    let mut nav = MenuNavigator::new(&menu, surface.clone());
    let mut display = ConsoleDisplay::new(std::io::stdout());
    let lines = spawn_stdin_reader()?;

    println!("Keys: e=enter x=exit h=home +=up -=down, then Enter. q quits.");
    nav.show(&mut display)?;

    while active.load(Ordering::SeqCst) && deadline.is_none_or(|d| Instant::now() < d) {
        let line = match lines.recv_timeout(Duration::from_millis(100)) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let mut refresh = false;
        for key in line.chars() {
            if key.eq_ignore_ascii_case(&'q') {
                return Ok(());
            }
            let Some(event) = MenuEvent::from_key(key) else {
                continue;
            };
            match nav.handle(event) {
                Ok(changed) => refresh |= changed,
                Err(e) => tracing::warn!(error = %e, "menu command rejected"),
            }
        }
        if refresh {
            nav.show(&mut display)?;
        }
    }

    Ok(())
}
