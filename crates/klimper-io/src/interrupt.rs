//! The "buffer consumed" interrupt handler.
//!
//! Everything here must be safe to call from a device callback: one atomic
//! swap, a counter increment and a thread unpark. No allocation, no locks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::Thread;

use crate::mailbox::{Descriptor, Mailbox};

/// Counters shared by the interrupt side and the worker.
#[derive(Debug, Default)]
pub struct PipelineStats {
    interrupts: AtomicU64,
    overruns: AtomicU64,
    periods_rendered: AtomicU64,
    late_periods: AtomicU64,
}

impl PipelineStats {
    /// Interrupts raised so far.
    pub fn interrupts(&self) -> u64 {
        self.interrupts.load(Ordering::Relaxed)
    }

    /// Descriptors discarded because the worker had not taken the previous one.
    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Relaxed)
    }

    /// Periods the worker has rendered.
    pub fn periods_rendered(&self) -> u64 {
        self.periods_rendered.load(Ordering::Relaxed)
    }

    /// Periods whose rendering took longer than one period of audio.
    pub fn late_periods(&self) -> u64 {
        self.late_periods.load(Ordering::Relaxed)
    }

    pub(crate) fn record_rendered(&self) {
        self.periods_rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_late(&self) {
        self.late_periods.fetch_add(1, Ordering::Relaxed);
    }
}

/// Handler a sink invokes each time it has finished playing a period.
///
/// Cloning is cheap; all clones post into the same mailbox.
#[derive(Debug, Clone)]
pub struct InterruptHandler {
    mailbox: Arc<Mailbox>,
    stats: Arc<PipelineStats>,
    worker: Option<Thread>,
}

impl InterruptHandler {
    /// Create a handler that wakes `worker` after each post.
    ///
    /// Pass `None` when the worker is polled synchronously.
    pub fn new(mailbox: Arc<Mailbox>, stats: Arc<PipelineStats>, worker: Option<Thread>) -> Self {
        Self {
            mailbox,
            stats,
            worker,
        }
    }

    /// Hand the now-empty period to the worker.
    #[inline]
    pub fn on_buffer_consumed(&self, descriptor: Descriptor) {
        self.stats.interrupts.fetch_add(1, Ordering::Relaxed);
        if self.mailbox.post(descriptor) {
            self.stats.overruns.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(worker) = &self.worker {
            worker.unpark();
        }
    }

    /// Shared counters.
    pub fn stats(&self) -> &Arc<PipelineStats> {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overruns_counted() {
        let mailbox = Arc::new(Mailbox::new());
        let stats = Arc::new(PipelineStats::default());
        let handler = InterruptHandler::new(Arc::clone(&mailbox), Arc::clone(&stats), None);

        let d = Descriptor::new(0, 8).unwrap();
        handler.on_buffer_consumed(d);
        handler.on_buffer_consumed(d);
        assert_eq!(stats.interrupts(), 2);
        assert_eq!(stats.overruns(), 1);

        mailbox.take();
        handler.on_buffer_consumed(d);
        assert_eq!(stats.overruns(), 1);
    }

    #[test]
    fn test_unparks_worker() {
        let mailbox = Arc::new(Mailbox::new());
        let stats = Arc::new(PipelineStats::default());

        let waiter = {
            let mailbox = Arc::clone(&mailbox);
            std::thread::spawn(move || {
                loop {
                    if let Some(d) = mailbox.take() {
                        return d;
                    }
                    std::thread::park();
                }
            })
        };

        let handler = InterruptHandler::new(mailbox, stats, Some(waiter.thread().clone()));
        let d = Descriptor::new(880, 880).unwrap();
        handler.on_buffer_consumed(d);
        assert_eq!(waiter.join().unwrap(), d);
    }
}
