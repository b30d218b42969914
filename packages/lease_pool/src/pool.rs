use std::fmt;
use std::sync::{Arc, Mutex};

use crate::constants::ERR_POISONED_LOCK;
use crate::{
    Generation, Lease, LeasePoolBuilder, LeaseTransition, RawLease, RawLeasePool, ReclaimPolicy,
    ReclaimStrategy, ResourceLifecycle, SlotId,
};

/// A thread-safe wrapper around [`RawLeasePool`] whose leases return
/// themselves.
///
/// This type is a cloneable handle to a shared pool; handles and the
/// [`Lease`]s they produce may move between and be dropped on any thread.
/// All pool mutation is serialized by an internal mutex, so the pooling
/// logic itself still runs one operation at a time.
///
/// The mutex is held for the duration of each operation, including the
/// closures passed to [`Lease::with`] and notification callbacks, so none
/// of those may call back into the pool.
///
/// # Example
///
/// ```rust
/// use lease_pool::{Factory, LeasePoolBuilder, ReclaimPolicy};
///
/// let pool = LeasePoolBuilder::new(Factory::new(String::new))
///     .capacity(8)
///     .build()
///     .unwrap();
///
/// let worker_pool = pool.clone();
/// let worker = std::thread::spawn(move || {
///     let lease = worker_pool
///         .acquire(true, ReclaimPolicy::NonReclaimable)
///         .unwrap();
///     lease.with_mut(|s| s.push_str("from afar")).unwrap();
/// });
/// worker.join().unwrap();
///
/// // The worker's lease was dropped on its thread; the resource is back.
/// assert_eq!(pool.inactive_count(), 1);
/// ```
pub struct LeasePool<L: ResourceLifecycle> {
    inner: Arc<Mutex<RawLeasePool<L>>>,
}

impl<L: ResourceLifecycle> LeasePool<L> {
    /// Starts configuring a pool; finish with
    /// [`build()`][LeasePoolBuilder::build].
    #[must_use]
    pub fn builder(lifecycle: L) -> LeasePoolBuilder<L> {
        LeasePoolBuilder::new(lifecycle)
    }

    /// Leases a resource, wrapped in an auto-returning handle.
    ///
    /// Sourcing order and the cooldown/reclamation interplay are documented
    /// on [`RawLeasePool::acquire`].
    #[must_use]
    pub fn acquire(&self, auto_activate: bool, policy: ReclaimPolicy) -> Option<Lease<L>> {
        let lease = self
            .inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .acquire(auto_activate, policy)?;
        Some(Lease::new(lease, self.clone()))
    }

    /// Leases the first rested resource with the given
    /// [`tag`][ResourceLifecycle::tag]; see [`RawLeasePool::acquire_by_tag`].
    #[must_use]
    pub fn acquire_by_tag(
        &self,
        tag: &str,
        auto_activate: bool,
        policy: ReclaimPolicy,
    ) -> Option<Lease<L>> {
        let lease = self
            .inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .acquire_by_tag(tag, auto_activate, policy)?;
        Some(Lease::new(lease, self.clone()))
    }

    /// Leases the first rested resource the predicate accepts; see
    /// [`RawLeasePool::acquire_where`].
    #[must_use]
    pub fn acquire_where(
        &self,
        predicate: impl FnMut(&L::Resource) -> bool,
        auto_activate: bool,
        policy: ReclaimPolicy,
    ) -> Option<Lease<L>> {
        let lease = self
            .inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .acquire_where(predicate, auto_activate, policy)?;
        Some(Lease::new(lease, self.clone()))
    }

    /// Takes ownership of an external resource as a fresh inactive slot; see
    /// [`RawLeasePool::adopt`].
    pub fn adopt(&self, resource: L::Resource) -> Result<SlotId, L::Resource> {
        self.inner.lock().expect(ERR_POISONED_LOCK).adopt(resource)
    }

    /// Runs the rate-limited maintenance sweep; see [`RawLeasePool::tick`].
    pub fn tick(&self) {
        self.inner.lock().expect(ERR_POISONED_LOCK).tick();
    }

    /// Forces an immediate eviction sweep; see
    /// [`RawLeasePool::evaluate_occupancy`].
    pub fn evaluate_occupancy(&self) -> usize {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .evaluate_occupancy()
    }

    /// Destroys every inactive resource. Returns how many were destroyed.
    pub fn clear_inactive(&self) -> usize {
        self.inner.lock().expect(ERR_POISONED_LOCK).clear_inactive()
    }

    /// Destroys one specific inactive slot; see
    /// [`RawLeasePool::remove_inactive`].
    pub fn remove_inactive(&self, id: SlotId) -> bool {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .remove_inactive(id)
    }

    /// Destroys exactly `count` inactive resources, or nothing; see
    /// [`RawLeasePool::remove_inactive_count`].
    pub fn remove_inactive_count(&self, count: usize) -> bool {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .remove_inactive_count(count)
    }

    /// Changes the pool's capacity; see [`RawLeasePool::set_capacity`].
    pub fn set_capacity(&self, capacity: usize) -> bool {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .set_capacity(capacity)
    }

    /// Changes the maximum inactive occupancy; see
    /// [`RawLeasePool::set_max_inactive_seconds`].
    pub fn set_max_inactive_seconds(&self, seconds: f64) {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .set_max_inactive_seconds(seconds);
    }

    /// Enables or disables the maintenance sweep.
    pub fn set_tick_enabled(&self, enabled: bool) {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .set_tick_enabled(enabled);
    }

    /// Changes the minimum time between maintenance sweeps.
    pub fn set_tick_interval(&self, seconds: f64) {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .set_tick_interval(seconds);
    }

    /// Registers a callback for every resource that enters the pool.
    pub fn on_resource_added(&self, callback: impl FnMut(SlotId) + Send + 'static) {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .on_resource_added(callback);
    }

    /// Registers a callback for every resource that leaves the pool for
    /// good.
    pub fn on_resource_removed(&self, callback: impl FnMut(SlotId, Generation) + Send + 'static) {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .on_resource_removed(callback);
    }

    /// Registers a callback for every acquire and return.
    pub fn on_lease_changed(
        &self,
        callback: impl FnMut(SlotId, Generation, LeaseTransition) + Send + 'static,
    ) {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .on_lease_changed(callback);
    }

    /// The number of live slots, active and inactive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().expect(ERR_POISONED_LOCK).len()
    }

    /// Whether the pool holds no resources at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().expect(ERR_POISONED_LOCK).is_empty()
    }

    /// The most resources the pool may hold at once.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.lock().expect(ERR_POISONED_LOCK).capacity()
    }

    /// Whether the pool has reached its capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.inner.lock().expect(ERR_POISONED_LOCK).is_full()
    }

    /// How many resources are currently leased out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.inner.lock().expect(ERR_POISONED_LOCK).active_count()
    }

    /// How many resources are at rest in the pool.
    #[must_use]
    pub fn inactive_count(&self) -> usize {
        self.inner.lock().expect(ERR_POISONED_LOCK).inactive_count()
    }

    /// How many active leases are registered for forced reclamation.
    #[must_use]
    pub fn reclaimable_count(&self) -> usize {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .reclaimable_count()
    }

    /// Whether the slot exists and is at rest in the pool.
    #[must_use]
    pub fn is_inactive(&self, id: SlotId) -> bool {
        self.inner.lock().expect(ERR_POISONED_LOCK).is_inactive(id)
    }

    /// When the slot's resource was constructed or adopted, in clock
    /// seconds.
    #[must_use]
    pub fn created_at(&self, id: SlotId) -> Option<f64> {
        self.inner.lock().expect(ERR_POISONED_LOCK).created_at(id)
    }

    /// The configured reuse cooldown, in seconds. Non-positive means none.
    #[must_use]
    pub fn cooldown_seconds(&self) -> f64 {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .cooldown_seconds()
    }

    /// The configured maximum inactive occupancy, in seconds. Non-positive
    /// means eviction is off.
    #[must_use]
    pub fn max_inactive_seconds(&self) -> f64 {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .max_inactive_seconds()
    }

    /// The minimum time between maintenance sweeps, in seconds.
    #[must_use]
    pub fn tick_interval_seconds(&self) -> f64 {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .tick_interval_seconds()
    }

    /// Whether the maintenance sweep is enabled.
    #[must_use]
    pub fn tick_enabled(&self) -> bool {
        self.inner.lock().expect(ERR_POISONED_LOCK).tick_enabled()
    }

    /// The configured forced-reclamation strategy.
    #[must_use]
    pub fn reclaim_strategy(&self) -> ReclaimStrategy {
        self.inner
            .lock()
            .expect(ERR_POISONED_LOCK)
            .reclaim_strategy()
    }

    pub(crate) fn release_raw(&self, lease: RawLease) -> bool {
        self.inner.lock().expect(ERR_POISONED_LOCK).release(lease)
    }

    pub(crate) fn steal_raw(&self, lease: RawLease) -> Option<L::Resource> {
        self.inner.lock().expect(ERR_POISONED_LOCK).steal(lease)
    }

    pub(crate) fn is_live_raw(&self, lease: RawLease) -> bool {
        self.inner.lock().expect(ERR_POISONED_LOCK).is_live(lease)
    }

    pub(crate) fn with_resource<R>(
        &self,
        lease: RawLease,
        f: impl FnOnce(&L::Resource) -> R,
    ) -> Option<R> {
        let pool = self.inner.lock().expect(ERR_POISONED_LOCK);
        pool.resource(lease).map(f)
    }

    pub(crate) fn with_resource_mut<R>(
        &self,
        lease: RawLease,
        f: impl FnOnce(&mut L::Resource) -> R,
    ) -> Option<R> {
        let mut pool = self.inner.lock().expect(ERR_POISONED_LOCK);
        pool.resource_mut(lease).map(f)
    }

    pub(crate) fn with_peek<R>(&self, id: SlotId, f: impl FnOnce(&L::Resource) -> R) -> Option<R> {
        let pool = self.inner.lock().expect(ERR_POISONED_LOCK);
        pool.peek(id).map(f)
    }
}

impl<L: ResourceLifecycle> From<RawLeasePool<L>> for LeasePool<L> {
    /// Wraps an existing raw pool in thread-safe shared ownership.
    fn from(pool: RawLeasePool<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }
}

impl<L: ResourceLifecycle> Clone for LeasePool<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: ResourceLifecycle> fmt::Debug for LeasePool<L> {
    #[cfg_attr(test, mutants::skip)] // Diagnostic formatting only - nothing worth mutation testing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeasePool")
            .field("inner", &self.inner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::{CreateFlags, Factory};

    #[derive(Debug)]
    struct StringLifecycle;

    impl ResourceLifecycle for StringLifecycle {
        type Resource = String;

        fn construct(&mut self, _flags: CreateFlags) -> Option<String> {
            Some(String::new())
        }
    }

    assert_impl_all!(LeasePool<StringLifecycle>: Send, Sync);
    assert_impl_all!(Lease<StringLifecycle>: Send, Sync);

    fn pool(capacity: usize) -> LeasePool<Factory<fn() -> String>> {
        LeasePoolBuilder::new(Factory::new(String::new as fn() -> String))
            .capacity(capacity)
            .build()
            .unwrap()
    }

    #[test]
    fn leases_work_across_threads() {
        let pool = pool(2);

        let worker_pool = pool.clone();
        let worker = thread::spawn(move || {
            let lease = worker_pool
                .acquire(true, ReclaimPolicy::NonReclaimable)
                .unwrap();
            lease.with_mut(|s| s.push_str("worker")).unwrap();
            lease.id()
        });
        let id = worker.join().unwrap();

        // Dropped on the worker thread, back at rest here.
        assert!(pool.is_inactive(id));
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn a_lease_can_be_dropped_on_another_thread() {
        let pool = pool(2);
        let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();

        thread::spawn(move || drop(lease)).join().unwrap();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.inactive_count(), 1);
    }

    #[test]
    fn shared_handles_observe_the_same_pool() {
        let pool = pool(4);
        let other = pool.clone();

        let lease = other.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
        assert_eq!(pool.active_count(), 1);
        assert!(lease.release());
        assert_eq!(pool.active_count(), 0);
    }
}
