//! Audio sink abstraction.
//!
//! A sink plays the [`PeriodRing`] in order and calls the
//! [`InterruptHandler`] once per finished period. It must never block in
//! that call; the handler only posts and wakes.

use std::sync::Arc;

use crate::Result;
use crate::interrupt::InterruptHandler;
use crate::ring::PeriodRing;

/// Something that consumes the period ring on a fixed schedule.
///
/// Delivery contract: after the handler fires for a period, the worker has
/// until the sink comes back around to that period to fill all of its
/// samples.
pub trait AudioSink {
    /// Begin consuming `ring`, firing `interrupt` after each period.
    fn start(&mut self, ring: Arc<PeriodRing>, interrupt: InterruptHandler) -> Result<()>;

    /// Stop consuming. Dropping the sink also stops it.
    fn stop(&mut self);

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
