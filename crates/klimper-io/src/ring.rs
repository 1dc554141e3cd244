//! Shared ring of 16-bit PCM periods.
//!
//! Stands in for the DMA buffer ring of the embedded target. The device side
//! reads sample by sample while the worker writes whole periods; every cell
//! is an `AtomicI16` so both sides can share the memory without locks.

use std::sync::atomic::{AtomicI16, Ordering};

use crate::mailbox::{Descriptor, MAX_LEN, MAX_OFFSET};
use crate::{Error, Result};

/// Ring of `periods` regions of `period_len` interleaved samples.
#[derive(Debug)]
pub struct PeriodRing {
    cells: Box<[AtomicI16]>,
    period_len: usize,
    periods: usize,
}

impl PeriodRing {
    /// Allocate a zeroed ring.
    pub fn new(period_len: usize, periods: usize) -> Result<Self> {
        if period_len == 0 || periods == 0 {
            return Err(Error::InvalidConfig(
                "period length and count must be non-zero".into(),
            ));
        }
        if period_len > MAX_LEN || (periods - 1) * period_len > MAX_OFFSET {
            return Err(Error::InvalidConfig(format!(
                "{periods} periods of {period_len} samples exceed the descriptor range"
            )));
        }

        let cells = (0..period_len * periods).map(|_| AtomicI16::new(0)).collect();
        Ok(Self {
            cells,
            period_len,
            periods,
        })
    }

    /// Samples per period.
    pub fn period_len(&self) -> usize {
        self.period_len
    }

    /// Number of periods.
    pub fn periods(&self) -> usize {
        self.periods
    }

    /// Total samples.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; construction rejects empty rings.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Descriptor of period `index` (taken modulo the period count).
    pub fn descriptor(&self, index: usize) -> Descriptor {
        // `new` keeps every period inside the descriptor range
        Descriptor::from_checked((index % self.periods) * self.period_len, self.period_len)
    }

    /// Copy `samples` into the ring starting at `offset`.
    ///
    /// Writes are truncated at the end of the ring.
    pub fn write(&self, offset: usize, samples: &[i16]) {
        let Some(region) = self.cells.get(offset..) else {
            return;
        };
        for (cell, &sample) in region.iter().zip(samples) {
            cell.store(sample, Ordering::Relaxed);
        }
    }

    /// Read the sample at `index`, or silence past the end.
    #[inline]
    pub fn load(&self, index: usize) -> i16 {
        self.cells
            .get(index)
            .map_or(0, |cell| cell.load(Ordering::Relaxed))
    }

    /// Copy the region described by `descriptor` into `out`.
    pub fn read_into(&self, descriptor: Descriptor, out: &mut Vec<i16>) {
        let start = descriptor.offset();
        out.extend((start..start + descriptor.len()).map(|i| self.load(i)));
    }
}
