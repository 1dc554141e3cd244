//! Deterministic sink for rendering without a device.
//!
//! Drives exactly the same interrupt → mailbox → worker path as the device
//! sink, but one period at a time on the caller's thread, so renders are
//! reproducible and tests can observe the engine between periods.

use std::sync::Arc;

use crate::interrupt::InterruptHandler;
use crate::ring::PeriodRing;
use crate::sink::AudioSink;
use crate::worker::Worker;
use crate::{Error, Result};

/// Offline sink. Call [`play_period`](Self::play_period) to advance.
#[derive(Debug, Default)]
pub struct OfflineSink {
    ring: Option<Arc<PeriodRing>>,
    interrupt: Option<InterruptHandler>,
    next_period: usize,
    played: Vec<i16>,
}

impl OfflineSink {
    /// Create an idle sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// "Play" the next period: copy it out, raise the interrupt for it, and
    /// let `worker` refill it. Returns the samples that were played.
    pub fn play_period(&mut self, worker: &mut Worker) -> Result<&[i16]> {
        let (Some(ring), Some(interrupt)) = (&self.ring, &self.interrupt) else {
            return Err(Error::Stream("offline sink not started".into()));
        };

        let descriptor = ring.descriptor(self.next_period);
        self.played.clear();
        ring.read_into(descriptor, &mut self.played);

        interrupt.on_buffer_consumed(descriptor);
        worker.poll();

        self.next_period = (self.next_period + 1) % ring.periods();
        Ok(&self.played)
    }

    /// Play `periods` periods, handing each to `consume`.
    pub fn render<F>(&mut self, worker: &mut Worker, periods: usize, mut consume: F) -> Result<()>
    where
        F: FnMut(&[i16]) -> Result<()>,
    {
        for _ in 0..periods {
            let samples = self.play_period(worker)?;
            consume(samples)?;
        }
        Ok(())
    }
}

impl AudioSink for OfflineSink {
    fn start(&mut self, ring: Arc<PeriodRing>, interrupt: InterruptHandler) -> Result<()> {
        if self.ring.is_some() {
            return Err(Error::AlreadyStarted);
        }
        self.played.reserve(ring.period_len());
        self.ring = Some(ring);
        self.interrupt = Some(interrupt);
        self.next_period = 0;
        Ok(())
    }

    fn stop(&mut self) {
        self.ring = None;
        self.interrupt = None;
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
