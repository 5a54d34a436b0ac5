//! SimClock trait - simulation time source abstraction
//!
//! The scheduler consumes sim time, it never owns or advances it. Sim time
//! is monotonic non-decreasing except on an explicit simulation reset,
//! which schedulers must detect and survive.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of simulation time.
///
/// Implementations must be cheap to read: the scheduler samples the clock
/// once per step and fans the value out to every container.
pub trait SimClock: Send + Sync {
    /// Current simulation time in seconds.
    fn now(&self) -> f64;
}

/// Manually driven simulation clock.
///
/// Stores the time as raw `f64` bits in an atomic, so it can be advanced
/// from the main loop while scheduler tasks read it concurrently. This is
/// the clock used by fixed-step runs and by deterministic tests.
///
/// # Examples
/// ```
/// use contracts::{ManualClock, SimClock};
///
/// let clock = ManualClock::new();
/// assert_eq!(clock.now(), 0.0);
/// clock.advance(0.05);
/// clock.advance(0.05);
/// assert!((clock.now() - 0.1).abs() < 1e-12);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    /// Create a clock starting at sim time zero.
    pub fn new() -> Self {
        Self {
            bits: AtomicU64::new(0.0_f64.to_bits()),
        }
    }

    /// Create a clock starting at the given sim time.
    pub fn starting_at(t: f64) -> Self {
        Self {
            bits: AtomicU64::new(t.to_bits()),
        }
    }

    /// Set the sim time to an absolute value.
    ///
    /// Setting a value earlier than the current one models a simulation
    /// reset; schedulers observe this as a time rewind.
    pub fn set(&self, t: f64) {
        self.bits.store(t.to_bits(), Ordering::SeqCst);
    }

    /// Advance the sim time by `dt` seconds.
    pub fn advance(&self, dt: f64) {
        let next = self.now() + dt;
        self.set(next);
    }
}

impl SimClock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}
