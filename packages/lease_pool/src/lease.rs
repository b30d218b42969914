use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{LeasePool, RawLease, ResourceLifecycle, SlotId};

/// A reference-counted lease over a resource in a [`LeasePool`].
///
/// Behaves like [`LocalLease`][crate::LocalLease] but may be cloned to,
/// used on and dropped on any thread. When the last clone is dropped, the
/// resource returns to the pool automatically. [`release()`][Self::release]
/// hands the resource back early and [`steal()`][Self::steal] takes it out
/// of the pool entirely; either way every remaining clone goes inert.
///
/// Resource access takes the pool's lock for the duration of the closure,
/// so closures passed to [`with()`][Self::with] and
/// [`with_mut()`][Self::with_mut] must not call back into the pool.
pub struct Lease<L: ResourceLifecycle> {
    inner: Arc<LeaseInner<L>>,
}

struct LeaseInner<L: ResourceLifecycle> {
    lease: RawLease,

    // A strong handle, so the pool outlives every lease taken from it.
    pool: LeasePool<L>,

    invalidated: AtomicBool,
}

impl<L: ResourceLifecycle> Lease<L> {
    pub(crate) fn new(lease: RawLease, pool: LeasePool<L>) -> Self {
        Self {
            inner: Arc::new(LeaseInner {
                lease,
                pool,
                invalidated: AtomicBool::new(false),
            }),
        }
    }

    /// The identity of the leased slot. Remains readable after the lease
    /// goes stale.
    #[must_use]
    pub fn id(&self) -> SlotId {
        self.inner.lease.id()
    }

    /// The generation this lease was taken at.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.lease.generation()
    }

    /// Whether this lease still grants access to its resource.
    ///
    /// Goes `false` once the lease is released, stolen, or forcibly
    /// reclaimed by the pool.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.inner.invalidated.load(Ordering::Acquire)
            && self.inner.pool.is_live_raw(self.inner.lease)
    }

    /// Calls `f` with the leased resource. Returns `None` if the lease has
    /// gone stale.
    pub fn with<R>(&self, f: impl FnOnce(&L::Resource) -> R) -> Option<R> {
        if self.inner.invalidated.load(Ordering::Acquire) {
            return None;
        }

        self.inner.pool.with_resource(self.inner.lease, f)
    }

    /// Calls `f` with the leased resource, mutably. Returns `None` if the
    /// lease has gone stale.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut L::Resource) -> R) -> Option<R> {
        if self.inner.invalidated.load(Ordering::Acquire) {
            return None;
        }

        self.inner.pool.with_resource_mut(self.inner.lease, f)
    }

    /// Calls `f` with whatever resource currently occupies this lease's
    /// slot, even if the lease has gone stale. Returns `None` only when the
    /// slot itself is gone from the pool.
    ///
    /// Useful for reading residual state off a resource that was reclaimed
    /// out from under this lease.
    pub fn with_even_if_stale<R>(&self, f: impl FnOnce(&L::Resource) -> R) -> Option<R> {
        self.inner.pool.with_peek(self.inner.lease.id(), f)
    }

    /// Returns the resource to the pool now instead of at drop.
    ///
    /// Every clone of this lease goes inert. Returns `false` if the lease
    /// had already gone stale.
    pub fn release(&self) -> bool {
        if self.inner.invalidated.swap(true, Ordering::AcqRel) {
            return false;
        }

        self.inner.pool.release_raw(self.inner.lease)
    }

    /// Takes the resource out of the pool, transferring ownership to the
    /// caller.
    ///
    /// The slot is gone for good and every clone of this lease goes inert.
    /// Neither the deactivation nor the destruction hook runs. Returns
    /// `None` if the lease had already gone stale.
    pub fn steal(&self) -> Option<L::Resource> {
        if self.inner.invalidated.swap(true, Ordering::AcqRel) {
            return None;
        }

        self.inner.pool.steal_raw(self.inner.lease)
    }
}

impl<L: ResourceLifecycle> Drop for LeaseInner<L> {
    fn drop(&mut self) {
        if !self.invalidated.load(Ordering::Acquire) {
            // Stale leases (forced reclamation, pool-side removal) make
            // this a no-op inside the pool.
            let _returned = self.pool.release_raw(self.lease);
        }
    }
}

impl<L: ResourceLifecycle> Clone for Lease<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: ResourceLifecycle> fmt::Debug for Lease<L> {
    #[cfg_attr(test, mutants::skip)] // Diagnostic formatting only - nothing worth mutation testing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("lease", &self.inner.lease)
            .field(
                "invalidated",
                &self.inner.invalidated.load(Ordering::Relaxed),
            )
            .finish()
    }
}
