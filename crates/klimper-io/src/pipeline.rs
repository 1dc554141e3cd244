//! Wiring of ring, mailbox, worker and worker thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use klimper_synth::{Sequencer, Synth};

use crate::interrupt::{InterruptHandler, PipelineStats};
use crate::mailbox::Mailbox;
use crate::ring::PeriodRing;
use crate::worker::{ControlInputs, Worker};
use crate::{Error, Result};

/// Period geometry, in interleaved stereo samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Samples per hardware period.
    pub period_samples: usize,
    /// Number of periods in the ring.
    pub periods: usize,
    /// Samples rendered per sequencer/synth step.
    pub sub_block_samples: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            period_samples: 880,
            periods: 2,
            sub_block_samples: 220,
        }
    }
}

/// A configured pipeline that has not started streaming yet.
#[derive(Debug)]
pub struct Pipeline {
    worker: Worker,
    mailbox: Arc<Mailbox>,
    stats: Arc<PipelineStats>,
    ring: Arc<PeriodRing>,
}

impl Pipeline {
    /// Allocate everything the real-time path needs.
    pub fn new(
        synth: Synth,
        sequencer: Sequencer,
        config: PipelineConfig,
        controls: ControlInputs,
    ) -> Result<Self> {
        if config.sub_block_samples == 0 || config.period_samples % config.sub_block_samples != 0 {
            return Err(Error::InvalidConfig(format!(
                "sub-block of {} samples does not divide the {}-sample period",
                config.sub_block_samples, config.period_samples
            )));
        }

        let ring = Arc::new(PeriodRing::new(config.period_samples, config.periods)?);
        let mailbox = Arc::new(Mailbox::new());
        let stats = Arc::new(PipelineStats::default());
        let worker = Worker::new(
            synth,
            sequencer,
            Arc::clone(&ring),
            Arc::clone(&mailbox),
            Arc::clone(&stats),
            config.sub_block_samples,
            controls,
        )?;

        tracing::debug!(
            period = config.period_samples,
            periods = config.periods,
            sub_block = config.sub_block_samples,
            "pipeline allocated"
        );

        Ok(Self {
            worker,
            mailbox,
            stats,
            ring,
        })
    }

    /// Fill every period once so playback starts with audio instead of silence.
    pub fn prime(&mut self) {
        for i in 0..self.ring.periods() {
            let descriptor = self.ring.descriptor(i);
            self.worker.render_period(descriptor);
        }
    }

    /// The worker, for synchronous driving.
    pub fn worker(&self) -> &Worker {
        &self.worker
    }

    /// Mutable worker, for synchronous driving and setup.
    pub fn worker_mut(&mut self) -> &mut Worker {
        &mut self.worker
    }

    /// The shared ring.
    pub fn ring(&self) -> Arc<PeriodRing> {
        Arc::clone(&self.ring)
    }

    /// Shared counters.
    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    /// Interrupt handler for a sink driven on the caller's thread.
    pub fn interrupt_handler(&self) -> InterruptHandler {
        InterruptHandler::new(Arc::clone(&self.mailbox), Arc::clone(&self.stats), None)
    }

    /// Move the worker onto its own thread.
    pub fn spawn(self) -> Result<RunningPipeline> {
        let stop = Arc::new(AtomicBool::new(false));
        let mut worker = self.worker;
        let thread_stop = Arc::clone(&stop);

        let handle = std::thread::Builder::new()
            .name("klimper-worker".into())
            .spawn(move || {
                worker.run(&thread_stop);
                worker
            })?;

        let interrupt = InterruptHandler::new(
            self.mailbox,
            Arc::clone(&self.stats),
            Some(handle.thread().clone()),
        );

        Ok(RunningPipeline {
            handle: Some(handle),
            stop,
            interrupt,
            ring: self.ring,
            stats: self.stats,
        })
    }
}

/// A pipeline whose worker runs on its own thread.
#[derive(Debug)]
pub struct RunningPipeline {
    handle: Option<JoinHandle<Worker>>,
    stop: Arc<AtomicBool>,
    interrupt: InterruptHandler,
    ring: Arc<PeriodRing>,
    stats: Arc<PipelineStats>,
}

impl RunningPipeline {
    /// Handler to give to the sink.
    pub fn interrupt_handler(&self) -> InterruptHandler {
        self.interrupt.clone()
    }

    /// The shared ring.
    pub fn ring(&self) -> Arc<PeriodRing> {
        Arc::clone(&self.ring)
    }

    /// Shared counters.
    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    /// Stop the worker and get it back.
    pub fn stop(mut self) -> Result<Worker> {
        self.shutdown()
            .ok_or_else(|| Error::Stream("audio worker already stopped".into()))?
    }

    fn shutdown(&mut self) -> Option<Result<Worker>> {
        let handle = self.handle.take()?;
        self.stop.store(true, Ordering::Release);
        handle.thread().unpark();
        Some(
            handle
                .join()
                .map_err(|_| Error::Stream("audio worker panicked".into())),
        )
    }
}

impl Drop for RunningPipeline {
    fn drop(&mut self) {
        if let Some(Err(e)) = self.shutdown() {
            tracing::error!(error = %e, "audio worker did not shut down cleanly");
        }
    }
}
