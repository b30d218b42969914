use std::fmt;

use crate::{
    Clock, CreateFlags, LeasePool, LocalLeasePool, RawLeasePool, ReclaimStrategy,
    ResourceLifecycle,
};

/// The capacity a pool gets when none is configured.
pub const DEFAULT_CAPACITY: usize = 50;

/// The sweep interval a pool gets when none is configured, in seconds.
pub const DEFAULT_TICK_INTERVAL_SECONDS: f64 = 1.0;

/// A rejected pool configuration.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// The capacity was zero; a pool must be able to hold at least one
    /// resource.
    #[error("pool capacity must be at least 1")]
    ZeroCapacity,

    /// More warmup resources were requested than the pool can hold.
    #[error("initial count {initial} exceeds capacity {capacity}")]
    InitialCountExceedsCapacity {
        /// The requested warmup count.
        initial: usize,
        /// The configured capacity.
        capacity: usize,
    },

    /// An adoption-only pool was asked to construct warmup resources, which
    /// it is forbidden from doing.
    #[error("adoption-only pools cannot pre-construct resources (initial count {initial})")]
    AdoptionOnlyWithInitialCount {
        /// The requested warmup count.
        initial: usize,
    },
}

/// Configures and validates a pool before it exists.
///
/// A builder is the only way to make a pool, so validation happens exactly
/// once and a live pool can never be re-initialized out from under its
/// leases. Finish with [`build_local()`][Self::build_local] for the
/// single-threaded pool, [`build()`][Self::build] for the thread-safe one or
/// [`build_raw()`][Self::build_raw] for the bare core.
///
/// # Example
///
/// ```rust
/// use lease_pool::{Factory, LeasePoolBuilder, ReclaimStrategy};
///
/// let pool = LeasePoolBuilder::new(Factory::new(String::new))
///     .capacity(16)
///     .initial_count(4)
///     .cooldown_seconds(0.5)
///     .reclaim_strategy(ReclaimStrategy::Oldest)
///     .build_local()
///     .unwrap();
///
/// assert_eq!(pool.len(), 4);
/// assert_eq!(pool.capacity(), 16);
/// ```
pub struct LeasePoolBuilder<L: ResourceLifecycle> {
    pub(crate) lifecycle: L,
    pub(crate) capacity: usize,
    pub(crate) initial_count: usize,
    pub(crate) cooldown_seconds: f64,
    pub(crate) max_inactive_seconds: f64,
    pub(crate) tick_interval_seconds: f64,
    pub(crate) tick_enabled: bool,
    pub(crate) reclaim_strategy: ReclaimStrategy,
    pub(crate) adoption_only: bool,
    pub(crate) create_flags: CreateFlags,
    pub(crate) disable_activation_logic: bool,
    pub(crate) clock: Option<Box<dyn Clock>>,
    pub(crate) activate_override: Option<Box<dyn FnMut(&mut L::Resource) + Send>>,
    pub(crate) deactivate_override: Option<Box<dyn FnMut(&mut L::Resource) + Send>>,
}

impl<L: ResourceLifecycle> LeasePoolBuilder<L> {
    /// Starts a configuration around the given lifecycle.
    #[must_use]
    pub fn new(lifecycle: L) -> Self {
        Self {
            lifecycle,
            capacity: DEFAULT_CAPACITY,
            initial_count: 0,
            cooldown_seconds: -1.0,
            max_inactive_seconds: -1.0,
            tick_interval_seconds: DEFAULT_TICK_INTERVAL_SECONDS,
            tick_enabled: false,
            reclaim_strategy: ReclaimStrategy::default(),
            adoption_only: false,
            create_flags: CreateFlags::NONE,
            disable_activation_logic: false,
            clock: None,
            activate_override: None,
            deactivate_override: None,
        }
    }

    /// The most resources the pool will ever hold at once. Default 50.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// How many resources to construct eagerly at build time. Default 0.
    ///
    /// A construction failure during warmup is logged and skipped; the pool
    /// simply starts smaller.
    #[must_use]
    pub fn initial_count(mut self, count: usize) -> Self {
        self.initial_count = count;
        self
    }

    /// The minimum rest a returned resource gets before it can be leased
    /// again, in seconds. Non-positive disables the cooldown, which is the
    /// default.
    ///
    /// A cooldown also changes reuse order (oldest return first instead of
    /// most recent first) and disables forced reclamation; see
    /// [`RawLeasePool::acquire`].
    #[must_use]
    pub fn cooldown_seconds(mut self, seconds: f64) -> Self {
        self.cooldown_seconds = seconds;
        self
    }

    /// How long a resource may sit inactive before the sweep destroys it, in
    /// seconds. Non-positive disables eviction, which is the default.
    ///
    /// A positive value also enables ticking, since eviction only happens
    /// from the sweep.
    #[must_use]
    pub fn max_inactive_seconds(mut self, seconds: f64) -> Self {
        self.max_inactive_seconds = seconds;
        if seconds > 0.0 {
            self.tick_enabled = true;
        }
        self
    }

    /// The minimum time between occupancy sweeps, in seconds. Default 1.
    #[must_use]
    pub fn tick_interval_seconds(mut self, seconds: f64) -> Self {
        self.tick_interval_seconds = seconds;
        self
    }

    /// Whether [`tick()`][RawLeasePool::tick] does anything. Default off.
    #[must_use]
    pub fn tick_enabled(mut self, enabled: bool) -> Self {
        self.tick_enabled = enabled;
        self
    }

    /// The victim-picking strategy for forced reclamation. Default
    /// [`ReclaimStrategy::Oldest`].
    #[must_use]
    pub fn reclaim_strategy(mut self, strategy: ReclaimStrategy) -> Self {
        self.reclaim_strategy = strategy;
        self
    }

    /// Forbids the pool from constructing resources itself; every resource
    /// must arrive through [`adopt()`][RawLeasePool::adopt]. Default off.
    #[must_use]
    pub fn adoption_only(mut self, adoption_only: bool) -> Self {
        self.adoption_only = adoption_only;
        self
    }

    /// Flags forwarded verbatim to every
    /// [`construct`][ResourceLifecycle::construct] call.
    #[must_use]
    pub fn create_flags(mut self, flags: CreateFlags) -> Self {
        self.create_flags = flags;
        self
    }

    /// Suppresses all activation and deactivation work, including any
    /// overrides. Default off.
    #[must_use]
    pub fn disable_activation_logic(mut self, disable: bool) -> Self {
        self.disable_activation_logic = disable;
        self
    }

    /// Replaces [`ResourceLifecycle::activate`] entirely.
    #[must_use]
    pub fn activate_override(
        mut self,
        callback: impl FnMut(&mut L::Resource) + Send + 'static,
    ) -> Self {
        self.activate_override = Some(Box::new(callback));
        self
    }

    /// Replaces [`ResourceLifecycle::deactivate`] entirely.
    #[must_use]
    pub fn deactivate_override(
        mut self,
        callback: impl FnMut(&mut L::Resource) + Send + 'static,
    ) -> Self {
        self.deactivate_override = Some(Box::new(callback));
        self
    }

    /// The time source for cooldowns, eviction and the reclaim registry.
    /// Default [`MonotonicClock`][crate::MonotonicClock].
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    fn validate(&self) -> Result<(), BuildError> {
        if self.capacity == 0 {
            return Err(BuildError::ZeroCapacity);
        }
        if self.initial_count > self.capacity {
            return Err(BuildError::InitialCountExceedsCapacity {
                initial: self.initial_count,
                capacity: self.capacity,
            });
        }
        if self.adoption_only && self.initial_count > 0 {
            return Err(BuildError::AdoptionOnlyWithInitialCount {
                initial: self.initial_count,
            });
        }
        Ok(())
    }

    /// Builds the bare [`RawLeasePool`], mutated through `&mut self`.
    pub fn build_raw(self) -> Result<RawLeasePool<L>, BuildError> {
        self.validate()?;
        Ok(RawLeasePool::from_builder(self))
    }

    /// Builds a single-threaded [`LocalLeasePool`].
    pub fn build_local(self) -> Result<LocalLeasePool<L>, BuildError> {
        Ok(LocalLeasePool::from(self.build_raw()?))
    }

    /// Builds a thread-safe [`LeasePool`].
    pub fn build(self) -> Result<LeasePool<L>, BuildError> {
        Ok(LeasePool::from(self.build_raw()?))
    }
}

impl<L: ResourceLifecycle> fmt::Debug for LeasePoolBuilder<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeasePoolBuilder")
            .field("capacity", &self.capacity)
            .field("initial_count", &self.initial_count)
            .field("cooldown_seconds", &self.cooldown_seconds)
            .field("max_inactive_seconds", &self.max_inactive_seconds)
            .field("tick_interval_seconds", &self.tick_interval_seconds)
            .field("tick_enabled", &self.tick_enabled)
            .field("reclaim_strategy", &self.reclaim_strategy)
            .field("adoption_only", &self.adoption_only)
            .field("create_flags", &self.create_flags)
            .field("disable_activation_logic", &self.disable_activation_logic)
            .finish_non_exhaustive()
    }
}
