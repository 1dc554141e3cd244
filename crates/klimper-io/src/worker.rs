//! The audio worker: renders one period per interrupt.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use klimper_synth::{NoteEvent, Sequencer, SharedParams, Synth};

use crate::interrupt::PipelineStats;
use crate::mailbox::{Descriptor, Mailbox};
use crate::pcm;
use crate::ring::PeriodRing;
use crate::{Error, Result};

/// Control-surface inputs the worker applies before every period.
#[derive(Debug, Default, Clone)]
pub struct ControlInputs {
    /// Parameter bank, synced when its version changes.
    pub params: Option<Arc<SharedParams>>,
    /// Queued note events, drained without blocking.
    pub events: Option<Receiver<NoteEvent>>,
}

/// Single consumer of the mailbox and sole owner of the engine while rendering.
pub struct Worker {
    synth: Synth,
    sequencer: Sequencer,
    controls: ControlInputs,
    last_version: u32,

    ring: Arc<PeriodRing>,
    mailbox: Arc<Mailbox>,
    stats: Arc<PipelineStats>,

    scratch: Vec<f32>,
    pcm: Vec<i16>,
    sub_block: usize,
    period_budget: Duration,
    reported_overruns: u64,
}

impl Worker {
    /// Create a worker rendering `sub_block`-sample slices into `ring`.
    ///
    /// The scratch buffers are sized to one period here and never grow.
    pub fn new(
        synth: Synth,
        sequencer: Sequencer,
        ring: Arc<PeriodRing>,
        mailbox: Arc<Mailbox>,
        stats: Arc<PipelineStats>,
        sub_block: usize,
        controls: ControlInputs,
    ) -> Result<Self> {
        if sub_block == 0 || sub_block % 2 != 0 {
            return Err(Error::InvalidConfig(format!(
                "sub-block of {sub_block} samples is not a whole number of stereo frames"
            )));
        }

        let period = ring.period_len();
        let frames = period / 2;
        let period_budget = Duration::from_secs_f64(frames as f64 / f64::from(synth.sample_rate()));
        let last_version = controls.params.as_ref().map_or(0, |p| p.version());

        Ok(Self {
            synth,
            sequencer,
            controls,
            last_version,
            ring,
            mailbox,
            stats,
            scratch: vec![0.0; period],
            pcm: vec![0; period],
            sub_block,
            period_budget,
            reported_overruns: 0,
        })
    }

    /// Render into the region `descriptor` names, writing exactly
    /// `descriptor.len()` samples.
    pub fn render_period(&mut self, descriptor: Descriptor) {
        let started = Instant::now();
        self.apply_controls();

        let mut written = 0;
        while written < descriptor.len() {
            let n = (descriptor.len() - written).min(self.scratch.len());
            let chunk = &mut self.scratch[..n];
            chunk.fill(0.0);

            for sub in chunk.chunks_mut(self.sub_block) {
                self.sequencer.process(sub.len() / 2, &mut self.synth);
                self.synth.process(sub);
            }

            pcm::quantize_into(chunk, &mut self.pcm[..n]);
            self.ring.write(descriptor.offset() + written, &self.pcm[..n]);
            written += n;
        }

        self.stats.record_rendered();
        let elapsed = started.elapsed();
        if elapsed > self.period_budget {
            self.stats.record_late();
            tracing::warn!(
                elapsed_us = elapsed.as_micros() as u64,
                budget_us = self.period_budget.as_micros() as u64,
                "period rendered late"
            );
        }
    }

    /// Take a pending descriptor and render it. Returns whether one was pending.
    pub fn poll(&mut self) -> bool {
        let Some(descriptor) = self.mailbox.take() else {
            return false;
        };
        self.render_period(descriptor);
        self.report_overruns();
        true
    }

    /// Render until `stop` is set, parking between interrupts.
    ///
    /// Whoever sets `stop` must unpark this thread afterwards.
    pub fn run(&mut self, stop: &AtomicBool) {
        tracing::info!(
            period = self.ring.period_len(),
            sub_block = self.sub_block,
            "audio worker started"
        );

        while !stop.load(Ordering::Acquire) {
            if !self.poll() {
                std::thread::park();
            }
        }

        tracing::info!(
            periods = self.stats.periods_rendered(),
            overruns = self.stats.overruns(),
            late = self.stats.late_periods(),
            "audio worker stopped"
        );
    }

    /// The synth engine.
    pub fn synth(&self) -> &Synth {
        &self.synth
    }

    /// Mutable access to the synth engine, for setup before streaming.
    pub fn synth_mut(&mut self) -> &mut Synth {
        &mut self.synth
    }

    /// The sequencer.
    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Mutable access to the sequencer, for setup before streaming.
    pub fn sequencer_mut(&mut self) -> &mut Sequencer {
        &mut self.sequencer
    }

    /// The ring this worker renders into.
    pub fn ring(&self) -> &Arc<PeriodRing> {
        &self.ring
    }

    /// Shared counters.
    pub fn stats(&self) -> &Arc<PipelineStats> {
        &self.stats
    }

    fn apply_controls(&mut self) {
        if let Some(params) = &self.controls.params {
            params.sync_if_changed(&mut self.last_version, &mut self.synth, &mut self.sequencer);
        }
        if let Some(events) = &self.controls.events {
            for event in events.try_iter() {
                tracing::debug!(?event, "applying note event");
                event.apply(&mut self.synth);
            }
        }
    }

    fn report_overruns(&mut self) {
        let overruns = self.stats.overruns();
        if overruns > self.reported_overruns {
            tracing::warn!(
                missed = overruns - self.reported_overruns,
                total = overruns,
                "worker fell behind, periods skipped"
            );
            self.reported_overruns = overruns;
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("period", &self.ring.period_len())
            .field("sub_block", &self.sub_block)
            .field("active_voices", &self.synth.active_voice_count())
            .finish_non_exhaustive()
    }
}
