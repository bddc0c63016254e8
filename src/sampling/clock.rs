//! Fixed-period sample gate over a free-running microsecond counter.
//!
//! The counter is a `u32` that wraps roughly every 71.6 minutes, exactly like
//! a microcontroller `micros()`. All comparisons use wrapping subtraction so
//! the gate keeps working across the wrap.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Source of the free-running microsecond counter
pub trait ClockSource {
    fn now_us(&self) -> u32;
}

/// Wall clock based on `Instant`, truncated to 32 bits
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for MonotonicClock {
    fn now_us(&self) -> u32 {
        // truncation is the wraparound
        self.start.elapsed().as_micros() as u32
    }
}

/// Manually advanced clock for deterministic runs
///
/// Clones share the same counter, so a test can hold one handle while the
/// sampling loop owns another.
#[derive(Clone, Default)]
pub struct SimulatedClock {
    now: Arc<AtomicU32>,
}

impl SimulatedClock {
    pub fn new(start_us: u32) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(start_us)),
        }
    }

    pub fn advance(&self, us: u32) {
        // fetch_add wraps on overflow
        self.now.fetch_add(us, Ordering::Relaxed);
    }

    pub fn set(&self, us: u32) {
        self.now.store(us, Ordering::Relaxed);
    }
}

impl ClockSource for SimulatedClock {
    fn now_us(&self) -> u32 {
        self.now.load(Ordering::Relaxed)
    }
}

/// Gate that admits at most one sample per period
///
/// A late check fires immediately and re-anchors on the time it was observed,
/// so processing jitter never accumulates and the clock itself never skips or
/// duplicates a sample.
#[derive(Debug, Clone)]
pub struct SampleClock {
    period_us: u32,
    last: u32,
}

impl SampleClock {
    pub fn new(period_us: u32) -> Self {
        Self {
            period_us: period_us.max(1),
            last: 0,
        }
    }

    /// True when a full period has elapsed since the last accepted sample.
    ///
    /// Records `now` as the new reference on success.
    pub fn should_sample(&mut self, now: u32) -> bool {
        if now.wrapping_sub(self.last) >= self.period_us {
            self.last = now;
            true
        } else {
            false
        }
    }

    /// True when more than one whole period has been missed.
    ///
    /// Check before [`should_sample`](Self::should_sample), which re-anchors.
    pub fn overran(&self, now: u32) -> bool {
        now.wrapping_sub(self.last) >= self.period_us.saturating_mul(2)
    }

    /// Elapsed microseconds since the last accepted sample
    pub fn elapsed(&self, now: u32) -> u32 {
        now.wrapping_sub(self.last)
    }

    pub fn reset(&mut self, now: u32) {
        self.last = now;
    }

    pub fn period_us(&self) -> u32 {
        self.period_us
    }
}
