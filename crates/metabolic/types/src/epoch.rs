//! Epochs: the discrete, monotonically increasing governance time step.
//!
//! The control plane never advances time itself. An [`EpochSource`] is
//! injected into every component; [`EpochClock`] is the in-process
//! implementation used by the plane and the tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// A governance time step.
pub type Epoch = u64;

/// Supplies the current epoch. Must be monotonic non-decreasing.
pub trait EpochSource: Send + Sync {
    fn current_epoch(&self) -> Epoch;
}

/// Atomic epoch counter that only moves when told to.
#[derive(Debug, Default)]
pub struct EpochClock {
    epoch: AtomicU64,
}

impl EpochClock {
    pub fn new(start: Epoch) -> Self {
        Self {
            epoch: AtomicU64::new(start),
        }
    }

    /// Advance by one epoch and return the new value.
    pub fn advance(&self) -> Epoch {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Jump forward to `epoch`. Never moves backward; returns the epoch in
    /// effect after the call.
    pub fn advance_to(&self, epoch: Epoch) -> Epoch {
        let previous = self.epoch.fetch_max(epoch, Ordering::SeqCst);
        previous.max(epoch)
    }
}

impl EpochSource for EpochClock {
    fn current_epoch(&self) -> Epoch {
        self.epoch.load(Ordering::SeqCst)
    }
}
