use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

/// Per-provider scope lifecycle counters.
#[derive(Debug, Default)]
pub struct ScopeCounters {
    acquired: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
    released: AtomicU64,
    in_flight: AtomicU64,
    peak_in_flight: AtomicU64,
}

/// Point-in-time copy of [`ScopeCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeStats {
    pub acquired: u64,
    pub committed: u64,
    pub rolled_back: u64,
    pub released: u64,
    pub in_flight: u64,
    pub peak_in_flight: u64,
}

impl ScopeCounters {
    pub fn scope_acquired(&self) {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::AcqRel);
    }

    pub fn scope_committed(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn scope_rolled_back(&self) {
        self.rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    pub fn scope_released(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn snapshot(&self) -> ScopeStats {
        ScopeStats {
            acquired: self.acquired.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            rolled_back: self.rolled_back.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Acquire),
            peak_in_flight: self.peak_in_flight.load(Ordering::Acquire),
        }
    }

    pub fn log_snapshot(&self, label: &str) {
        let s = self.snapshot();
        info!(
            label = label,
            acquired = s.acquired,
            committed = s.committed,
            rolled_back = s.rolled_back,
            released = s.released,
            in_flight = s.in_flight,
            peak_in_flight = s.peak_in_flight,
            "scope counters"
        );
    }
}
