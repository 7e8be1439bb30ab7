//! Disk-space budget for a run.
//!
//! Free space is sampled once when the run starts; every accepted download
//! reserves its estimated size before the transfer and settles to the real
//! size afterwards. The filesystem is never re-queried, so the budget drifts
//! if other processes fill the disk concurrently.

/// True if a download of `size_bytes` fits into `free_bytes`.
///
/// Strict: a download that would use up the last byte is refused.
pub fn has_budget(free_bytes: u64, size_bytes: u64) -> bool {
    size_bytes < free_bytes
}

/// Bytes charged against the budget for one in-flight download.
///
/// Must be handed back via [`DiskBudget::settle`] or [`DiskBudget::release`].
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct Reservation {
    bytes: u64,
    /// Remaining budget before this reservation was taken.
    ceiling: u64,
}

impl Reservation {
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Largest body the download may write without exhausting the budget.
    pub fn max_bytes(&self) -> u64 {
        self.ceiling.saturating_sub(1)
    }
}

/// Running estimate of remaining free space in the download directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskBudget {
    remaining: u64,
}

impl DiskBudget {
    pub fn new(free_bytes: u64) -> Self {
        Self {
            remaining: free_bytes,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Charge `size` if it fits (see [`has_budget`]). Returns None when it doesn't.
    pub fn try_reserve(&mut self, size: u64) -> Option<Reservation> {
        if !has_budget(self.remaining, size) {
            return None;
        }
        let ceiling = self.remaining;
        self.remaining -= size;
        Some(Reservation {
            bytes: size,
            ceiling,
        })
    }

    /// Replace the reserved amount with what was actually written.
    pub fn settle(&mut self, reservation: Reservation, actual: u64) {
        let restored = self.remaining + reservation.bytes;
        if actual >= restored {
            tracing::warn!(
                actual,
                remaining = restored,
                "download used more space than the tracked budget"
            );
        }
        self.remaining = restored.saturating_sub(actual);
    }

    /// Give back a reservation whose download did not happen.
    pub fn release(&mut self, reservation: Reservation) {
        self.remaining += reservation.bytes;
    }
}
