//! Single-slot overwrite mailbox between interrupt and worker.
//!
//! The whole slot is one `AtomicU32`, so posting and taking are single
//! wait-free instructions on any target with 32-bit atomics:
//!
//! ```text
//!  31   30 ........ 16  15 ........ 0
//! [full][   offset    ][     len     ]
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

const FULL: u32 = 1 << 31;
const EMPTY: u32 = 0;
const OFFSET_SHIFT: u32 = 16;
const OFFSET_MASK: u32 = 0x7FFF;
const LEN_MASK: u32 = 0xFFFF;

/// Largest offset a descriptor can carry.
pub(crate) const MAX_OFFSET: usize = OFFSET_MASK as usize;
/// Largest length a descriptor can carry.
pub(crate) const MAX_LEN: usize = LEN_MASK as usize;

/// Location of one empty period in the [`PeriodRing`](crate::PeriodRing),
/// in samples.
///
/// Only values that fit the packed slot can be built, so a descriptor always
/// survives the mailbox unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Descriptor {
    offset: usize,
    len: usize,
}

impl Descriptor {
    /// Create a descriptor. Returns `None` if it does not fit the packed slot.
    pub fn new(offset: usize, len: usize) -> Option<Self> {
        (offset <= MAX_OFFSET && len <= MAX_LEN).then_some(Self { offset, len })
    }

    /// Build from values the caller has already range-checked.
    pub(crate) fn from_checked(offset: usize, len: usize) -> Self {
        debug_assert!(offset <= MAX_OFFSET && len <= MAX_LEN);
        Self { offset, len }
    }

    /// First sample of the region.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of samples in the region.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the region holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn pack(self) -> u32 {
        FULL | ((self.offset as u32 & OFFSET_MASK) << OFFSET_SHIFT) | (self.len as u32 & LEN_MASK)
    }

    fn unpack(bits: u32) -> Option<Self> {
        (bits & FULL != 0).then(|| Self {
            offset: ((bits >> OFFSET_SHIFT) & OFFSET_MASK) as usize,
            len: (bits & LEN_MASK) as usize,
        })
    }
}

/// Capacity-one mailbox where a new post replaces an unread one.
///
/// ```rust
/// use klimper_io::{Descriptor, Mailbox};
///
/// let mailbox = Mailbox::new();
/// let a = Descriptor::new(0, 880).unwrap();
/// let b = Descriptor::new(880, 880).unwrap();
///
/// assert!(!mailbox.post(a));
/// assert!(mailbox.post(b)); // `a` was never taken
/// assert_eq!(mailbox.take(), Some(b));
/// assert_eq!(mailbox.take(), None);
/// ```
#[derive(Debug, Default)]
pub struct Mailbox {
    slot: AtomicU32,
}

impl Mailbox {
    /// Create an empty mailbox.
    pub const fn new() -> Self {
        Self {
            slot: AtomicU32::new(EMPTY),
        }
    }

    /// Store `descriptor`, replacing any unread one.
    ///
    /// Returns `true` if an unread descriptor was discarded.
    #[inline]
    pub fn post(&self, descriptor: Descriptor) -> bool {
        self.slot.swap(descriptor.pack(), Ordering::AcqRel) & FULL != 0
    }

    /// Remove and return the pending descriptor, if any.
    #[inline]
    pub fn take(&self) -> Option<Descriptor> {
        Descriptor::unpack(self.slot.swap(EMPTY, Ordering::AcqRel))
    }

    /// Whether no descriptor is pending.
    pub fn is_empty(&self) -> bool {
        self.slot.load(Ordering::Acquire) & FULL == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_limits() {
        assert!(Descriptor::new(MAX_OFFSET, MAX_LEN).is_some());
        assert!(Descriptor::new(MAX_OFFSET + 1, 1).is_none());
        assert!(Descriptor::new(0, MAX_LEN + 1).is_none());
    }

    #[test]
    fn test_out_of_range_cannot_be_posted() {
        assert_eq!(Descriptor::new(0x8000, 4), None);
        assert_eq!(Descriptor::new(0, 0x1_0004), None);

        let mailbox = Mailbox::new();
        let d = Descriptor::new(MAX_OFFSET, MAX_LEN).unwrap();
        mailbox.post(d);
        let taken = mailbox.take().unwrap();
        assert_eq!((taken.offset(), taken.len()), (MAX_OFFSET, MAX_LEN));
    }

    #[test]
    fn test_extreme_values_survive_packing() {
        let mailbox = Mailbox::new();
        for (offset, len) in [(0, 0), (MAX_OFFSET, MAX_LEN), (880, 880), (1, MAX_LEN)] {
            let d = Descriptor::new(offset, len).unwrap();
            mailbox.post(d);
            assert_eq!(mailbox.take(), Some(d));
        }
    }

    #[test]
    fn test_empty_length_still_counts_as_posted() {
        let mailbox = Mailbox::new();
        mailbox.post(Descriptor::new(0, 0).unwrap());
        assert!(!mailbox.is_empty());
    }

    #[test]
    fn test_take_empties() {
        let mailbox = Mailbox::new();
        assert!(mailbox.is_empty());
        mailbox.post(Descriptor::new(4, 8).unwrap());
        assert!(mailbox.take().is_some());
        assert!(mailbox.is_empty());
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn test_concurrent_posts_never_duplicate() {
        use std::sync::Arc;

        let mailbox = Arc::new(Mailbox::new());
        let producer = {
            let mailbox = Arc::clone(&mailbox);
            std::thread::spawn(move || {
                let mut overwritten = 0u32;
                for i in 0..10_000 {
                    if mailbox.post(Descriptor::new(i % 2 * 880, 880).unwrap()) {
                        overwritten += 1;
                    }
                }
                overwritten
            })
        };

        let mut taken = 0u32;
        for _ in 0..10_000 {
            if mailbox.take().is_some() {
                taken += 1;
            }
        }
        let overwritten = producer.join().unwrap();
        if mailbox.take().is_some() {
            taken += 1;
        }
        // Every post is either consumed once or discarded once
        assert_eq!(taken + overwritten, 10_000);
    }
}
