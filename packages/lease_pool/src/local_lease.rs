use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::{Generation, LocalLeasePool, RawLease, ResourceLifecycle, SlotId};

/// A reference-counted lease of a resource in a [`LocalLeasePool`].
///
/// Cloning a handle does not lease another resource; every clone aliases the
/// same lease. When the last clone is dropped the resource returns to the
/// pool automatically. Returning early through [`release()`][Self::release],
/// or taking the resource out with [`steal()`][Self::steal], invalidates
/// every clone at once.
///
/// The pool owns the resource, so access is scoped: [`with()`][Self::with]
/// and [`with_mut()`][Self::with_mut] borrow it for the duration of a
/// closure and refuse once the lease is stale. There is deliberately no way
/// to keep a reference to the resource beyond a closure.
///
/// # Example
///
/// ```rust
/// use lease_pool::{Factory, LeasePoolBuilder, ReclaimPolicy};
///
/// let pool = LeasePoolBuilder::new(Factory::new(Vec::<u8>::new))
///     .capacity(4)
///     .build_local()
///     .unwrap();
///
/// let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
/// lease.with_mut(|buffer| buffer.extend_from_slice(b"payload"));
///
/// let alias = lease.clone();
/// assert!(lease.release());
///
/// // Every clone went stale together.
/// assert!(!alias.is_valid());
/// assert!(alias.with(|buffer| buffer.len()).is_none());
/// ```
pub struct LocalLease<L: ResourceLifecycle> {
    inner: Rc<LocalLeaseInner<L>>,
}

/// The shared state behind every clone of one lease handle.
struct LocalLeaseInner<L: ResourceLifecycle> {
    lease: RawLease,

    /// Keeps the pool alive for as long as the lease exists.
    pool: LocalLeasePool<L>,

    /// Set once this lease was explicitly released, stolen or force-returned
    /// through this handle; the drop hook then stays out of the pool's way.
    invalidated: Cell<bool>,
}

impl<L: ResourceLifecycle> LocalLease<L> {
    pub(crate) fn new(lease: RawLease, pool: LocalLeasePool<L>) -> Self {
        Self {
            inner: Rc::new(LocalLeaseInner {
                lease,
                pool,
                invalidated: Cell::new(false),
            }),
        }
    }

    /// The identity of the leased slot. Stays readable after the lease goes
    /// stale, for diagnostics.
    #[must_use]
    pub fn id(&self) -> SlotId {
        self.inner.lease.id()
    }

    /// The generation this lease was granted under.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.inner.lease.generation()
    }

    /// Whether this lease still grants access to the resource.
    ///
    /// A lease goes stale when any clone releases or steals it, and when the
    /// pool force-returns it to satisfy another acquire.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.inner.invalidated.get() && self.inner.pool.is_live_raw(self.inner.lease)
    }

    /// Borrows the resource for the duration of the closure, or `None` if
    /// the lease is stale.
    ///
    /// The pool is borrowed while the closure runs; the closure must not
    /// call back into the pool.
    pub fn with<R>(&self, f: impl FnOnce(&L::Resource) -> R) -> Option<R> {
        if self.inner.invalidated.get() {
            return None;
        }
        self.inner.pool.with_resource(self.inner.lease, f)
    }

    /// Mutably borrows the resource for the duration of the closure, or
    /// `None` if the lease is stale.
    ///
    /// The pool is borrowed while the closure runs; the closure must not
    /// call back into the pool.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut L::Resource) -> R) -> Option<R> {
        if self.inner.invalidated.get() {
            return None;
        }
        self.inner.pool.with_resource_mut(self.inner.lease, f)
    }

    /// Borrows the resource even if the lease is stale, as long as the slot
    /// itself still exists.
    ///
    /// Escape hatch for cleanup and diagnostics. If the slot has since been
    /// leased to someone else, this observes their resource state; prefer
    /// [`with()`][Self::with] everywhere except teardown paths.
    pub fn with_even_if_stale<R>(&self, f: impl FnOnce(&L::Resource) -> R) -> Option<R> {
        self.inner.pool.with_peek(self.inner.lease.id(), f)
    }

    /// Returns the resource to the pool now, invalidating every clone.
    ///
    /// Returns `false` if the lease was already stale.
    pub fn release(&self) -> bool {
        if self.inner.invalidated.replace(true) {
            return false;
        }
        self.inner.pool.release_raw(self.inner.lease)
    }

    /// Permanently removes the resource from the pool and hands it to the
    /// caller, invalidating every clone.
    ///
    /// Returns `None` if the lease was already stale.
    pub fn steal(&self) -> Option<L::Resource> {
        if self.inner.invalidated.replace(true) {
            return None;
        }
        self.inner.pool.steal_raw(self.inner.lease)
    }
}

impl<L: ResourceLifecycle> Clone for LocalLease<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<L: ResourceLifecycle> Drop for LocalLeaseInner<L> {
    /// Returns the resource to the pool, unless some clone already ended the
    /// lease. A lease force-returned by the pool is already stale by now, so
    /// the release call inside is a harmless no-op.
    fn drop(&mut self) {
        if !self.invalidated.get() {
            let _returned = self.pool.release_raw(self.lease);
        }
    }
}

impl<L: ResourceLifecycle> fmt::Debug for LocalLease<L> {
    #[cfg_attr(test, mutants::skip)] // Diagnostic formatting only - nothing worth mutation testing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalLease")
            .field("id", &self.inner.lease.id())
            .field("generation", &self.inner.lease.generation())
            .field("invalidated", &self.inner.invalidated.get())
            .finish()
    }
}
