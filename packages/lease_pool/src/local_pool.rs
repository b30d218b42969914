use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{
    Generation, LeasePoolBuilder, LeaseTransition, LocalLease, RawLease, RawLeasePool,
    ReclaimPolicy, ReclaimStrategy, ResourceLifecycle, SlotId,
};

/// A single-threaded wrapper around [`RawLeasePool`] whose leases return
/// themselves.
///
/// This type is a cloneable handle to a shared pool; each [`LocalLease`] it
/// hands out also keeps the pool alive, so a resource can never outlive its
/// container. When the last copy of a lease handle is dropped the resource
/// goes back to the pool automatically.
///
/// # Single-threaded design
///
/// This type is designed for single-threaded use and is neither [`Send`] nor
/// [`Sync`]. For multi-threaded scenarios, use [`LeasePool`][crate::LeasePool]
/// instead.
///
/// The pool is borrowed for the duration of each operation, including the
/// closures passed to [`LocalLease::with`] and notification callbacks, so
/// none of those may call back into the pool.
///
/// # Example
///
/// ```rust
/// use lease_pool::{Factory, LeasePoolBuilder, ReclaimPolicy};
///
/// let pool = LeasePoolBuilder::new(Factory::new(String::new))
///     .capacity(8)
///     .build_local()
///     .unwrap();
///
/// {
///     let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
///     lease.with_mut(|s| s.push_str("busy")).unwrap();
///     assert_eq!(pool.active_count(), 1);
/// }
///
/// // The lease went out of scope, so the resource is back at rest.
/// assert_eq!(pool.active_count(), 0);
/// assert_eq!(pool.inactive_count(), 1);
/// ```
pub struct LocalLeasePool<L: ResourceLifecycle> {
    inner: Rc<RefCell<RawLeasePool<L>>>,
}

impl<L: ResourceLifecycle> LocalLeasePool<L> {
    /// Starts configuring a pool; finish with
    /// [`build_local()`][LeasePoolBuilder::build_local].
    #[must_use]
    pub fn builder(lifecycle: L) -> LeasePoolBuilder<L> {
        LeasePoolBuilder::new(lifecycle)
    }

    /// Leases a resource, wrapped in an auto-returning handle.
    ///
    /// Sourcing order and the cooldown/reclamation interplay are documented
    /// on [`RawLeasePool::acquire`].
    #[must_use]
    pub fn acquire(&self, auto_activate: bool, policy: ReclaimPolicy) -> Option<LocalLease<L>> {
        let lease = self.inner.borrow_mut().acquire(auto_activate, policy)?;
        Some(LocalLease::new(lease, self.clone()))
    }

    /// Leases the first rested resource with the given
    /// [`tag`][ResourceLifecycle::tag]; see [`RawLeasePool::acquire_by_tag`].
    #[must_use]
    pub fn acquire_by_tag(
        &self,
        tag: &str,
        auto_activate: bool,
        policy: ReclaimPolicy,
    ) -> Option<LocalLease<L>> {
        let lease = self
            .inner
            .borrow_mut()
            .acquire_by_tag(tag, auto_activate, policy)?;
        Some(LocalLease::new(lease, self.clone()))
    }

    /// Leases the first rested resource the predicate accepts; see
    /// [`RawLeasePool::acquire_where`].
    #[must_use]
    pub fn acquire_where(
        &self,
        predicate: impl FnMut(&L::Resource) -> bool,
        auto_activate: bool,
        policy: ReclaimPolicy,
    ) -> Option<LocalLease<L>> {
        let lease = self
            .inner
            .borrow_mut()
            .acquire_where(predicate, auto_activate, policy)?;
        Some(LocalLease::new(lease, self.clone()))
    }

    /// Takes ownership of an external resource as a fresh inactive slot; see
    /// [`RawLeasePool::adopt`].
    pub fn adopt(&self, resource: L::Resource) -> Result<SlotId, L::Resource> {
        self.inner.borrow_mut().adopt(resource)
    }

    /// Runs the rate-limited maintenance sweep; see [`RawLeasePool::tick`].
    pub fn tick(&self) {
        self.inner.borrow_mut().tick();
    }

    /// Forces an immediate eviction sweep; see
    /// [`RawLeasePool::evaluate_occupancy`].
    pub fn evaluate_occupancy(&self) -> usize {
        self.inner.borrow_mut().evaluate_occupancy()
    }

    /// Destroys every inactive resource. Returns how many were destroyed.
    pub fn clear_inactive(&self) -> usize {
        self.inner.borrow_mut().clear_inactive()
    }

    /// Destroys one specific inactive slot; see
    /// [`RawLeasePool::remove_inactive`].
    pub fn remove_inactive(&self, id: SlotId) -> bool {
        self.inner.borrow_mut().remove_inactive(id)
    }

    /// Destroys exactly `count` inactive resources, or nothing; see
    /// [`RawLeasePool::remove_inactive_count`].
    pub fn remove_inactive_count(&self, count: usize) -> bool {
        self.inner.borrow_mut().remove_inactive_count(count)
    }

    /// Changes the pool's capacity; see [`RawLeasePool::set_capacity`].
    pub fn set_capacity(&self, capacity: usize) -> bool {
        self.inner.borrow_mut().set_capacity(capacity)
    }

    /// Changes the maximum inactive occupancy; see
    /// [`RawLeasePool::set_max_inactive_seconds`].
    pub fn set_max_inactive_seconds(&self, seconds: f64) {
        self.inner.borrow_mut().set_max_inactive_seconds(seconds);
    }

    /// Enables or disables the maintenance sweep.
    pub fn set_tick_enabled(&self, enabled: bool) {
        self.inner.borrow_mut().set_tick_enabled(enabled);
    }

    /// Changes the minimum time between maintenance sweeps.
    pub fn set_tick_interval(&self, seconds: f64) {
        self.inner.borrow_mut().set_tick_interval(seconds);
    }

    /// Registers a callback for every resource that enters the pool.
    pub fn on_resource_added(&self, callback: impl FnMut(SlotId) + Send + 'static) {
        self.inner.borrow_mut().on_resource_added(callback);
    }

    /// Registers a callback for every resource that leaves the pool for
    /// good.
    pub fn on_resource_removed(&self, callback: impl FnMut(SlotId, Generation) + Send + 'static) {
        self.inner.borrow_mut().on_resource_removed(callback);
    }

    /// Registers a callback for every acquire and return.
    pub fn on_lease_changed(
        &self,
        callback: impl FnMut(SlotId, Generation, LeaseTransition) + Send + 'static,
    ) {
        self.inner.borrow_mut().on_lease_changed(callback);
    }

    /// The number of live slots, active and inactive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Whether the pool holds no resources at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// The most resources the pool may hold at once.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity()
    }

    /// Whether the pool has reached its capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.inner.borrow().is_full()
    }

    /// How many resources are currently leased out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.inner.borrow().active_count()
    }

    /// How many resources are at rest in the pool.
    #[must_use]
    pub fn inactive_count(&self) -> usize {
        self.inner.borrow().inactive_count()
    }

    /// How many active leases are registered for forced reclamation.
    #[must_use]
    pub fn reclaimable_count(&self) -> usize {
        self.inner.borrow().reclaimable_count()
    }

    /// Whether the slot exists and is at rest in the pool.
    #[must_use]
    pub fn is_inactive(&self, id: SlotId) -> bool {
        self.inner.borrow().is_inactive(id)
    }

    /// When the slot's resource was constructed or adopted, in clock
    /// seconds.
    #[must_use]
    pub fn created_at(&self, id: SlotId) -> Option<f64> {
        self.inner.borrow().created_at(id)
    }

    /// The configured reuse cooldown, in seconds. Non-positive means none.
    #[must_use]
    pub fn cooldown_seconds(&self) -> f64 {
        self.inner.borrow().cooldown_seconds()
    }

    /// The configured maximum inactive occupancy, in seconds. Non-positive
    /// means eviction is off.
    #[must_use]
    pub fn max_inactive_seconds(&self) -> f64 {
        self.inner.borrow().max_inactive_seconds()
    }

    /// The minimum time between maintenance sweeps, in seconds.
    #[must_use]
    pub fn tick_interval_seconds(&self) -> f64 {
        self.inner.borrow().tick_interval_seconds()
    }

    /// Whether the maintenance sweep is enabled.
    #[must_use]
    pub fn tick_enabled(&self) -> bool {
        self.inner.borrow().tick_enabled()
    }

    /// The configured forced-reclamation strategy.
    #[must_use]
    pub fn reclaim_strategy(&self) -> ReclaimStrategy {
        self.inner.borrow().reclaim_strategy()
    }

    pub(crate) fn release_raw(&self, lease: RawLease) -> bool {
        self.inner.borrow_mut().release(lease)
    }

    pub(crate) fn steal_raw(&self, lease: RawLease) -> Option<L::Resource> {
        self.inner.borrow_mut().steal(lease)
    }

    pub(crate) fn is_live_raw(&self, lease: RawLease) -> bool {
        self.inner.borrow().is_live(lease)
    }

    pub(crate) fn with_resource<R>(
        &self,
        lease: RawLease,
        f: impl FnOnce(&L::Resource) -> R,
    ) -> Option<R> {
        let pool = self.inner.borrow();
        pool.resource(lease).map(f)
    }

    pub(crate) fn with_resource_mut<R>(
        &self,
        lease: RawLease,
        f: impl FnOnce(&mut L::Resource) -> R,
    ) -> Option<R> {
        let mut pool = self.inner.borrow_mut();
        pool.resource_mut(lease).map(f)
    }

    pub(crate) fn with_peek<R>(&self, id: SlotId, f: impl FnOnce(&L::Resource) -> R) -> Option<R> {
        let pool = self.inner.borrow();
        pool.peek(id).map(f)
    }
}

impl<L: ResourceLifecycle> From<RawLeasePool<L>> for LocalLeasePool<L> {
    /// Wraps an existing raw pool in single-threaded shared ownership.
    fn from(pool: RawLeasePool<L>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(pool)),
        }
    }
}

impl<L: ResourceLifecycle> Clone for LocalLeasePool<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<L: ResourceLifecycle> fmt::Debug for LocalLeasePool<L> {
    #[cfg_attr(test, mutants::skip)] // Diagnostic formatting only - nothing worth mutation testing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalLeasePool")
            .field("inner", &self.inner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Factory;

    fn pool(capacity: usize) -> LocalLeasePool<Factory<fn() -> String>> {
        LeasePoolBuilder::new(Factory::new(String::new as fn() -> String))
            .capacity(capacity)
            .build_local()
            .unwrap()
    }

    #[test]
    fn dropping_the_last_handle_returns_the_resource() {
        let pool = pool(2);
        let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
        assert_eq!(pool.active_count(), 1);

        drop(lease);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.inactive_count(), 1);
    }

    #[test]
    fn clones_alias_one_lease() {
        let pool = pool(2);
        let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
        let alias = lease.clone();

        // Two handles, still one lease.
        assert_eq!(pool.active_count(), 1);

        drop(lease);
        // The alias still holds the lease open.
        assert_eq!(pool.active_count(), 1);
        assert!(alias.is_valid());

        drop(alias);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn explicit_release_invalidates_all_clones() {
        let pool = pool(2);
        let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
        let alias = lease.clone();

        assert!(lease.release());
        assert!(!lease.is_valid());
        assert!(!alias.is_valid());
        assert!(!alias.release());
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn pool_handles_are_shared() {
        let pool = pool(2);
        let other = pool.clone();
        let _lease = other.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn pool_outlives_its_owner_handle_while_leases_exist() {
        let lease = {
            let pool = pool(2);
            pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap()
        };

        // The pool handle is gone, but the lease keeps the pool alive.
        assert!(lease.is_valid());
        assert!(lease.with(|resource| resource.is_empty()).unwrap());
    }
}
