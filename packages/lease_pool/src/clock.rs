use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// The time source a pool measures cooldowns and idle occupancy against.
///
/// The pool never reads wall-clock time on its own; every timestamp comes
/// from the clock injected at build time. The default is [`MonotonicClock`].
/// Hosts that run on their own notion of time (a game clock, a simulation
/// step) provide their own implementation, and tests drive a [`ManualClock`].
///
/// Readings are seconds as `f64` and must never decrease.
pub trait Clock: fmt::Debug + Send {
    /// The current reading, in seconds since an arbitrary fixed origin.
    fn now(&self) -> f64;
}

/// A [`Clock`] backed by [`Instant`], anchored at its creation time.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose readings start at zero now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A [`Clock`] that only moves when told to.
///
/// Cloning yields a second handle to the same reading, so a test can keep one
/// handle while the pool owns the other and advance time deterministically.
///
/// # Example
///
/// ```rust
/// use lease_pool::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
///
/// handle.advance(2.5);
/// assert_eq!(clock.now(), 2.5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    // f64 seconds stored as raw bits.
    reading: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reading to an absolute value.
    pub fn set(&self, seconds: f64) {
        self.reading.store(seconds.to_bits(), Ordering::Relaxed);
    }

    /// Moves the reading forward.
    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.reading.load(Ordering::Relaxed))
    }
}
