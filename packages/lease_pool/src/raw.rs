use std::{fmt, mem};

use foldhash::{HashMap, HashMapExt};

use crate::constants::COOLDOWN_GRACE;
use crate::events::PoolCallbacks;
use crate::slot::Slot;
use crate::{
    Clock, CreateFlags, Generation, LeasePoolBuilder, LeaseTransition, MonotonicClock, RawLease,
    ReclaimPolicy, ReclaimRegistry, ReclaimStrategy, ResourceLifecycle, SlotId,
};

/// A bounded generational pool of recyclable resources.
///
/// Every resource lives in a slot with a never-reused identity and a
/// generation counter that is bumped on each acquire and each return. An
/// operation presented with a [`RawLease`] whose generation no longer matches
/// is a silent no-op, so a stale token can never reach a resource that has
/// since been handed to someone else.
///
/// This is the bare core: all mutation goes through `&mut self` and leases
/// are plain [`Copy`] tokens that the caller must hand back explicitly. The
/// [`LocalLeasePool`][crate::LocalLeasePool] and
/// [`LeasePool`][crate::LeasePool] wrappers add shared ownership and
/// auto-returning handles on top.
///
/// # Example
///
/// ```rust
/// use lease_pool::{Factory, LeasePoolBuilder, ReclaimPolicy};
///
/// let mut pool = LeasePoolBuilder::new(Factory::new(String::new))
///     .capacity(4)
///     .build_raw()
///     .unwrap();
///
/// let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
/// pool.resource_mut(lease).unwrap().push_str("in use");
///
/// assert!(pool.release(lease));
/// // The token went stale the moment it was returned.
/// assert!(!pool.release(lease));
/// ```
///
/// # Thread safety
///
/// This type is thread-mobile ([`Send`], given a `Send` lifecycle and
/// resource type) but not thread-safe ([`Sync`]). For concurrent use, wrap
/// it in [`LeasePool`][crate::LeasePool].
pub struct RawLeasePool<L: ResourceLifecycle> {
    lifecycle: L,

    clock: Box<dyn Clock>,

    /// All live slots, active and inactive. We use foldhash for better
    /// performance with small hash tables.
    slots: HashMap<SlotId, Slot<L::Resource>>,

    /// Identities of the slots currently at rest. Pushed on return, popped
    /// from the back for warm reuse; scanned front to back when a cooldown
    /// makes submission order matter.
    inactive: Vec<SlotId>,

    reclaimable: ReclaimRegistry,

    callbacks: PoolCallbacks,

    next_id: u64,
    capacity: usize,
    cooldown_seconds: f64,
    max_inactive_seconds: f64,
    tick_interval_seconds: f64,
    tick_enabled: bool,
    last_sweep_at: f64,
    reclaim_strategy: ReclaimStrategy,
    adoption_only: bool,
    create_flags: CreateFlags,
    disable_activation_logic: bool,
    activate_override: Option<Box<dyn FnMut(&mut L::Resource) + Send>>,
    deactivate_override: Option<Box<dyn FnMut(&mut L::Resource) + Send>>,
}

impl<L: ResourceLifecycle> RawLeasePool<L> {
    pub(crate) fn from_builder(builder: LeasePoolBuilder<L>) -> Self {
        let clock = builder
            .clock
            .unwrap_or_else(|| Box::new(MonotonicClock::new()));
        let now = clock.now();

        let mut pool = Self {
            lifecycle: builder.lifecycle,
            clock,
            slots: HashMap::new(),
            inactive: Vec::new(),
            reclaimable: ReclaimRegistry::default(),
            callbacks: PoolCallbacks::default(),
            next_id: 0,
            capacity: builder.capacity,
            cooldown_seconds: builder.cooldown_seconds,
            max_inactive_seconds: builder.max_inactive_seconds,
            tick_interval_seconds: builder.tick_interval_seconds,
            tick_enabled: builder.tick_enabled,
            last_sweep_at: now,
            reclaim_strategy: builder.reclaim_strategy,
            adoption_only: builder.adoption_only,
            create_flags: builder.create_flags,
            disable_activation_logic: builder.disable_activation_logic,
            activate_override: builder.activate_override,
            deactivate_override: builder.deactivate_override,
        };

        for _ in 0..builder.initial_count {
            let now = pool.clock.now();
            if pool.create_slot(now).is_none() {
                tracing::debug!("warmup construction failed, pool starts smaller");
            }
        }

        pool
    }

    /// Leases a resource out of the pool, or `None` if it cannot.
    ///
    /// The source is chosen in this order:
    ///
    /// 1. An inactive resource. Without a cooldown the most recently
    ///    returned one is taken, on the expectation that it is still warm in
    ///    cache. With a cooldown the inactive list is scanned oldest return
    ///    first and the first resource whose rest meets the cooldown wins.
    /// 2. A newly constructed resource, while the pool is below capacity and
    ///    not adoption-only.
    /// 3. Forced reclamation of an active [`Reclaimable`] lease, picked by
    ///    the configured [`ReclaimStrategy`]. Reclamation is only consulted
    ///    when no cooldown is configured; a forced return could never
    ///    satisfy its own cooldown, so with one configured an exhausted
    ///    acquire simply fails.
    ///
    /// Exhaustion is an expected outcome, not an error: the caller decides
    /// whether to retry, degrade or skip.
    ///
    /// `auto_activate` controls whether the activation hook runs before the
    /// lease is handed out; pass `false` to activate manually later.
    /// `policy` decides whether this particular lease is registered for
    /// forced reclamation.
    ///
    /// [`Reclaimable`]: ReclaimPolicy::Reclaimable
    pub fn acquire(&mut self, auto_activate: bool, policy: ReclaimPolicy) -> Option<RawLease> {
        let now = self.clock.now();

        if self.inactive.is_empty() {
            if self.slots.len() < self.capacity && !self.adoption_only {
                self.create_slot(now)?;
            } else if !self.cooldown_enabled() {
                let id = self.try_reclaim()?;
                return Some(self.activate_slot(id, auto_activate, policy, now));
            } else {
                tracing::debug!(
                    "acquire failed, pool exhausted and reclamation is unavailable under a cooldown"
                );
                return None;
            }
        }

        if !self.cooldown_enabled() {
            let id = self
                .inactive
                .pop()
                .expect("inactive list was just verified or made non-empty");
            return Some(self.activate_slot(id, auto_activate, policy, now));
        }

        // Oldest return first, so each resource gets the longest possible rest.
        let rested = self.inactive.iter().enumerate().find_map(|(index, id)| {
            let slot = self
                .slots
                .get(id)
                .expect("inactive list only holds live slot identities");
            (now - slot.last_active_at >= self.cooldown_seconds).then_some((index, *id))
        });
        if let Some((index, id)) = rested {
            self.inactive.remove(index);
            return Some(self.activate_slot(id, auto_activate, policy, now));
        }

        if self.slots.len() < self.capacity && !self.adoption_only {
            let id = self.create_slot(now)?;
            let index = self
                .inactive
                .iter()
                .position(|candidate| *candidate == id)
                .expect("a freshly created slot starts on the inactive list");
            self.inactive.remove(index);
            return Some(self.activate_slot(id, auto_activate, policy, now));
        }

        tracing::debug!("acquire failed, every inactive resource is still cooling down");
        None
    }

    /// Leases the first inactive resource whose
    /// [`tag`][ResourceLifecycle::tag] equals `tag`.
    ///
    /// Respects the cooldown. When no inactive resource matches and no
    /// cooldown is configured, active [`ReclaimPolicy::Reclaimable`] leases
    /// with a matching tag are eligible for forced reclamation. No new
    /// resource is ever constructed for a tag lookup.
    pub fn acquire_by_tag(
        &mut self,
        tag: &str,
        auto_activate: bool,
        policy: ReclaimPolicy,
    ) -> Option<RawLease> {
        self.acquire_matching(auto_activate, policy, |lifecycle, resource| {
            lifecycle.tag(resource) == Some(tag)
        })
    }

    /// Leases the first inactive resource the predicate accepts.
    ///
    /// Same sourcing rules as [`acquire_by_tag()`][Self::acquire_by_tag].
    pub fn acquire_where(
        &mut self,
        mut predicate: impl FnMut(&L::Resource) -> bool,
        auto_activate: bool,
        policy: ReclaimPolicy,
    ) -> Option<RawLease> {
        self.acquire_matching(auto_activate, policy, |_, resource| predicate(resource))
    }

    fn acquire_matching(
        &mut self,
        auto_activate: bool,
        policy: ReclaimPolicy,
        mut matches: impl FnMut(&L, &L::Resource) -> bool,
    ) -> Option<RawLease> {
        let now = self.clock.now();
        let cooldown_enabled = self.cooldown_enabled();

        let found = self.inactive.iter().enumerate().find_map(|(index, id)| {
            let slot = self
                .slots
                .get(id)
                .expect("inactive list only holds live slot identities");
            if cooldown_enabled && now - slot.last_active_at < self.cooldown_seconds {
                return None;
            }
            matches(&self.lifecycle, &slot.resource).then_some((index, *id))
        });
        if let Some((index, id)) = found {
            self.inactive.remove(index);
            return Some(self.activate_slot(id, auto_activate, policy, now));
        }

        if !cooldown_enabled {
            let candidate = self
                .reclaimable
                .entries()
                .iter()
                .find(|entry| {
                    let slot = self
                        .slots
                        .get(&entry.id)
                        .expect("reclaim registry only holds live slot identities");
                    slot.generation == entry.generation && matches(&self.lifecycle, &slot.resource)
                })
                .copied();
            if let Some(entry) = candidate {
                let lease = RawLease::new(entry.id, entry.generation);
                if self.release_inner(lease, true) {
                    return Some(self.activate_slot(entry.id, auto_activate, policy, now));
                }
            }
        }

        tracing::debug!("acquire failed, no pooled resource matched the filter");
        None
    }

    /// Returns a leased resource to the pool.
    ///
    /// The slot's generation is bumped, so every other copy of the lease
    /// token goes stale at once. Returns `false`, without touching anything,
    /// if the lease is already stale or the slot no longer exists.
    pub fn release(&mut self, lease: RawLease) -> bool {
        self.release_inner(lease, false)
    }

    fn release_inner(&mut self, lease: RawLease, skip_inactive_list: bool) -> bool {
        let Some(slot) = self.slots.get_mut(&lease.id()) else {
            tracing::debug!(id = %lease.id(), "release ignored, slot no longer exists");
            return false;
        };
        if slot.generation != lease.generation() || !slot.active {
            tracing::debug!(id = %lease.id(), "release ignored, lease is stale");
            return false;
        }

        let held_generation = slot.generation;
        slot.generation = slot.generation.wrapping_add(1);
        slot.active = false;
        let was_reclaimable = slot.reclaimable;
        slot.reclaimable = false;

        if !self.disable_activation_logic {
            match self.deactivate_override.as_mut() {
                Some(callback) => callback(&mut slot.resource),
                None => self.lifecycle.deactivate(&mut slot.resource),
            }
        }

        if !skip_inactive_list {
            self.inactive.push(lease.id());
        }
        if was_reclaimable {
            self.reclaimable.remove(lease.id());
        }
        self.callbacks
            .notify_lease_changed(lease.id(), held_generation, LeaseTransition::Returned);
        true
    }

    /// Permanently removes a leased resource from the pool and hands it to
    /// the caller.
    ///
    /// The slot is gone for good; its identity is never reused and the pool
    /// shrinks by one. Neither the deactivation hook nor
    /// [`destroy`][ResourceLifecycle::destroy] runs, since ownership moves
    /// to the caller. Returns `None` if the lease is stale.
    pub fn steal(&mut self, lease: RawLease) -> Option<L::Resource> {
        let Some(slot) = self.slots.get(&lease.id()) else {
            tracing::debug!(id = %lease.id(), "steal ignored, slot no longer exists");
            return None;
        };
        if slot.generation != lease.generation() {
            tracing::debug!(id = %lease.id(), "steal ignored, lease is stale");
            return None;
        }

        let was_active = slot.active;
        let was_reclaimable = slot.reclaimable;

        let position = if was_active {
            None
        } else {
            self.inactive
                .iter()
                .position(|candidate| *candidate == lease.id())
        };
        if let Some(position) = position {
            self.inactive.remove(position);
        }
        if was_reclaimable {
            self.reclaimable.remove(lease.id());
        }

        let slot = self
            .slots
            .remove(&lease.id())
            .expect("slot existence was verified above");
        self.callbacks.notify_removed(lease.id(), slot.generation);
        Some(slot.resource)
    }

    /// Takes ownership of an externally created resource and parks it as a
    /// fresh inactive slot.
    ///
    /// The slot gets a brand-new identity; adoption is how resources enter
    /// an adoption-only pool at all. The deactivation hook runs so the
    /// resource arrives at rest like any returned one. A pool at capacity
    /// refuses and hands the resource back.
    pub fn adopt(&mut self, resource: L::Resource) -> Result<SlotId, L::Resource> {
        if self.slots.len() >= self.capacity {
            tracing::debug!("adoption rejected, pool is at capacity");
            return Err(resource);
        }

        let now = self.clock.now();
        let mut resource = resource;
        if !self.disable_activation_logic {
            match self.deactivate_override.as_mut() {
                Some(callback) => callback(&mut resource),
                None => self.lifecycle.deactivate(&mut resource),
            }
        }

        let id = self.allocate_id();
        self.slots.insert(
            id,
            Slot {
                resource,
                generation: 0,
                created_at: now,
                last_active_at: self.initial_last_active(now),
                active: false,
                reclaimable: false,
            },
        );
        self.inactive.push(id);
        self.callbacks.notify_added(id);
        Ok(id)
    }

    /// Runs the rate-limited maintenance sweep.
    ///
    /// Call this from the host's frame or timer loop; the pool does nothing
    /// unless ticking is enabled and at least the tick interval has passed
    /// since the last sweep. Each sweep reports occupancy at trace level and
    /// evicts overdue inactive resources when a maximum inactive occupancy
    /// is configured.
    pub fn tick(&mut self) {
        if !self.tick_enabled {
            return;
        }
        let now = self.clock.now();
        if now - self.last_sweep_at < self.tick_interval_seconds {
            return;
        }
        self.last_sweep_at = now;

        tracing::trace!(
            total = self.slots.len(),
            active = self.active_count(),
            inactive = self.inactive.len(),
            reclaimable = self.reclaimable.len(),
            "pool occupancy"
        );

        if self.max_inactive_seconds > 0.0 {
            self.evaluate_occupancy();
        }
    }

    /// Destroys every inactive resource that has rested longer than the
    /// configured maximum inactive occupancy. Returns how many were
    /// destroyed.
    ///
    /// [`tick()`][Self::tick] calls this on its own schedule; calling it
    /// directly forces an immediate sweep.
    pub fn evaluate_occupancy(&mut self) -> usize {
        if self.max_inactive_seconds <= 0.0 {
            return 0;
        }
        let now = self.clock.now();

        let mut expired = Vec::new();
        {
            let slots = &self.slots;
            let threshold = self.max_inactive_seconds;
            self.inactive.retain(|id| {
                let slot = slots
                    .get(id)
                    .expect("inactive list only holds live slot identities");
                if now - slot.last_active_at >= threshold {
                    expired.push(*id);
                    false
                } else {
                    true
                }
            });
        }

        for id in &expired {
            self.destroy_slot(*id);
        }
        expired.len()
    }

    /// Destroys every inactive resource. Returns how many were destroyed.
    pub fn clear_inactive(&mut self) -> usize {
        let drained = mem::take(&mut self.inactive);
        let count = drained.len();
        for id in drained {
            self.destroy_slot(id);
        }
        count
    }

    /// Destroys one specific inactive slot. Returns `false` if the slot does
    /// not exist or is currently leased out.
    pub fn remove_inactive(&mut self, id: SlotId) -> bool {
        let Some(slot) = self.slots.get(&id) else {
            return false;
        };
        if slot.active {
            tracing::debug!(%id, "removal ignored, resource is leased out");
            return false;
        }
        let position = self
            .inactive
            .iter()
            .position(|candidate| *candidate == id)
            .expect("an inactive slot is always on the inactive list");
        self.inactive.remove(position);
        self.destroy_slot(id);
        true
    }

    /// Destroys exactly `count` inactive resources, most recently returned
    /// first. All or nothing: returns `false` without destroying anything if
    /// fewer than `count` are inactive.
    pub fn remove_inactive_count(&mut self, count: usize) -> bool {
        if count > self.inactive.len() {
            tracing::debug!(
                requested = count,
                available = self.inactive.len(),
                "removal ignored, not enough inactive resources"
            );
            return false;
        }
        for _ in 0..count {
            let id = self
                .inactive
                .pop()
                .expect("count was verified against the inactive list length");
            self.destroy_slot(id);
        }
        true
    }

    /// Changes the pool's capacity. Raising always succeeds. Lowering
    /// succeeds only while no more than `capacity` leases are out; surplus
    /// inactive resources are destroyed to fit.
    pub fn set_capacity(&mut self, capacity: usize) -> bool {
        if capacity == 0 {
            tracing::debug!("capacity change rejected, capacity must be at least 1");
            return false;
        }
        if capacity >= self.capacity {
            self.capacity = capacity;
            return true;
        }
        if self.active_count() > capacity {
            tracing::debug!(
                requested = capacity,
                active = self.active_count(),
                "capacity change rejected, too many leases are out"
            );
            return false;
        }
        if self.slots.len() > capacity {
            let surplus = self
                .slots
                .len()
                .checked_sub(capacity)
                .expect("pool size was just verified to exceed the requested capacity");
            self.remove_inactive_count(surplus);
        }
        self.capacity = capacity;
        true
    }

    /// Changes the maximum inactive occupancy. A positive value enables
    /// ticking so the eviction sweep actually runs; a non-positive value
    /// disables both eviction and ticking.
    pub fn set_max_inactive_seconds(&mut self, seconds: f64) {
        if seconds > 0.0 {
            self.max_inactive_seconds = seconds;
            self.tick_enabled = true;
        } else {
            self.max_inactive_seconds = -1.0;
            self.tick_enabled = false;
        }
    }

    /// Enables or disables the maintenance sweep.
    pub fn set_tick_enabled(&mut self, enabled: bool) {
        self.tick_enabled = enabled;
    }

    /// Changes the minimum time between maintenance sweeps.
    pub fn set_tick_interval(&mut self, seconds: f64) {
        self.tick_interval_seconds = seconds;
    }

    /// Registers a callback for every resource that enters the pool.
    ///
    /// Callbacks run while the pool is being mutated and must not call back
    /// into it.
    pub fn on_resource_added(&mut self, callback: impl FnMut(SlotId) + Send + 'static) {
        self.callbacks.push_added(Box::new(callback));
    }

    /// Registers a callback for every resource that leaves the pool for
    /// good, fired before the resource is destroyed.
    ///
    /// Callbacks run while the pool is being mutated and must not call back
    /// into it.
    pub fn on_resource_removed(
        &mut self,
        callback: impl FnMut(SlotId, Generation) + Send + 'static,
    ) {
        self.callbacks.push_removed(Box::new(callback));
    }

    /// Registers a callback for every acquire and return. A return reports
    /// the generation the lease was held under.
    ///
    /// Callbacks run while the pool is being mutated and must not call back
    /// into it.
    pub fn on_lease_changed(
        &mut self,
        callback: impl FnMut(SlotId, Generation, LeaseTransition) + Send + 'static,
    ) {
        self.callbacks.push_lease_changed(Box::new(callback));
    }

    /// Borrows the leased resource, or `None` if the lease is stale.
    #[must_use]
    pub fn resource(&self, lease: RawLease) -> Option<&L::Resource> {
        let slot = self.slots.get(&lease.id())?;
        (slot.generation == lease.generation()).then_some(&slot.resource)
    }

    /// Mutably borrows the leased resource, or `None` if the lease is stale.
    #[must_use]
    pub fn resource_mut(&mut self, lease: RawLease) -> Option<&mut L::Resource> {
        let slot = self.slots.get_mut(&lease.id())?;
        (slot.generation == lease.generation()).then_some(&mut slot.resource)
    }

    /// Borrows a slot's resource by identity alone, ignoring staleness.
    ///
    /// Escape hatch for cleanup and diagnostics; `None` only once the slot
    /// itself is gone.
    #[must_use]
    pub fn peek(&self, id: SlotId) -> Option<&L::Resource> {
        self.slots.get(&id).map(|slot| &slot.resource)
    }

    /// Whether the lease is still current.
    #[must_use]
    pub fn is_live(&self, lease: RawLease) -> bool {
        self.slots
            .get(&lease.id())
            .is_some_and(|slot| slot.generation == lease.generation())
    }

    /// Whether the slot exists and is at rest in the pool.
    #[must_use]
    pub fn is_inactive(&self, id: SlotId) -> bool {
        self.slots.get(&id).is_some_and(|slot| !slot.active)
    }

    /// When the slot's resource was constructed or adopted, in clock
    /// seconds.
    #[must_use]
    pub fn created_at(&self, id: SlotId) -> Option<f64> {
        self.slots.get(&id).map(|slot| slot.created_at)
    }

    /// The number of live slots, active and inactive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool holds no resources at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The most resources the pool may hold at once.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the pool has reached its capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// How many resources are currently leased out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots
            .len()
            .checked_sub(self.inactive.len())
            .expect("the inactive list can never outgrow the slot table")
    }

    /// How many resources are at rest in the pool.
    #[must_use]
    pub fn inactive_count(&self) -> usize {
        self.inactive.len()
    }

    /// How many active leases are registered for forced reclamation.
    #[must_use]
    pub fn reclaimable_count(&self) -> usize {
        self.reclaimable.len()
    }

    /// The configured reuse cooldown, in seconds. Non-positive means none.
    #[must_use]
    pub fn cooldown_seconds(&self) -> f64 {
        self.cooldown_seconds
    }

    /// The configured maximum inactive occupancy, in seconds. Non-positive
    /// means eviction is off.
    #[must_use]
    pub fn max_inactive_seconds(&self) -> f64 {
        self.max_inactive_seconds
    }

    /// The minimum time between maintenance sweeps, in seconds.
    #[must_use]
    pub fn tick_interval_seconds(&self) -> f64 {
        self.tick_interval_seconds
    }

    /// Whether the maintenance sweep is enabled.
    #[must_use]
    pub fn tick_enabled(&self) -> bool {
        self.tick_enabled
    }

    /// The configured forced-reclamation strategy.
    #[must_use]
    pub fn reclaim_strategy(&self) -> ReclaimStrategy {
        self.reclaim_strategy
    }

    fn cooldown_enabled(&self) -> bool {
        self.cooldown_seconds > 0.0
    }

    fn allocate_id(&mut self) -> SlotId {
        let id = SlotId::new(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .expect("slot identity counter cannot realistically overflow a u64");
        id
    }

    /// Fresh slots start with enough simulated rest that a configured
    /// cooldown never gates their first use.
    fn initial_last_active(&self, now: f64) -> f64 {
        if self.cooldown_enabled() {
            now - self.cooldown_seconds - COOLDOWN_GRACE
        } else {
            now
        }
    }

    /// Constructs one resource and parks it on the inactive list.
    fn create_slot(&mut self, now: f64) -> Option<SlotId> {
        let Some(resource) = self.lifecycle.construct(self.create_flags) else {
            tracing::debug!("resource construction failed, no slot created");
            return None;
        };
        let id = self.allocate_id();
        self.slots.insert(
            id,
            Slot {
                resource,
                generation: 0,
                created_at: now,
                last_active_at: self.initial_last_active(now),
                active: false,
                reclaimable: false,
            },
        );
        self.inactive.push(id);
        self.callbacks.notify_added(id);
        Some(id)
    }

    /// Marks a slot active and hands out the lease for it. The slot must
    /// already be off the inactive list.
    fn activate_slot(
        &mut self,
        id: SlotId,
        auto_activate: bool,
        policy: ReclaimPolicy,
        now: f64,
    ) -> RawLease {
        let slot = self
            .slots
            .get_mut(&id)
            .expect("caller passes a live slot identity");
        slot.generation = slot.generation.wrapping_add(1);
        slot.active = true;
        slot.reclaimable = policy == ReclaimPolicy::Reclaimable;
        slot.last_active_at = now;

        if auto_activate && !self.disable_activation_logic {
            match self.activate_override.as_mut() {
                Some(callback) => callback(&mut slot.resource),
                None => self.lifecycle.activate(&mut slot.resource),
            }
        }

        let generation = slot.generation;
        if policy == ReclaimPolicy::Reclaimable {
            self.reclaimable.insert(id, generation, now);
        }
        self.callbacks
            .notify_lease_changed(id, generation, LeaseTransition::Acquired);
        RawLease::new(id, generation)
    }

    /// Forces the reclaim registry's pick back into the pool and returns its
    /// slot identity, ready to activate for a new lease.
    fn try_reclaim(&mut self) -> Option<SlotId> {
        let entry = self.reclaimable.select(self.reclaim_strategy)?;
        tracing::debug!(
            id = %entry.id,
            "forcing an active lease back to satisfy a new acquire"
        );
        let lease = RawLease::new(entry.id, entry.generation);
        if self.release_inner(lease, true) {
            Some(entry.id)
        } else {
            // A registry entry that fails to release is stale; drop it.
            self.reclaimable.remove(entry.id);
            None
        }
    }

    /// Destroys a slot that is already off the inactive list.
    fn destroy_slot(&mut self, id: SlotId) {
        if let Some(slot) = self.slots.remove(&id) {
            self.callbacks.notify_removed(id, slot.generation);
            self.lifecycle.destroy(slot.resource);
        }
    }
}

impl<L: ResourceLifecycle> Drop for RawLeasePool<L> {
    /// Destroys every remaining resource through the lifecycle, leased or
    /// not.
    fn drop(&mut self) {
        for (_, slot) in self.slots.drain() {
            self.lifecycle.destroy(slot.resource);
        }
    }
}

impl<L: ResourceLifecycle> fmt::Debug for RawLeasePool<L> {
    #[cfg_attr(test, mutants::skip)] // Diagnostic formatting only - nothing worth mutation testing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawLeasePool")
            .field("len", &self.slots.len())
            .field("capacity", &self.capacity)
            .field("active", &self.active_count())
            .field("inactive", &self.inactive.len())
            .field("reclaimable", &self.reclaimable.len())
            .field("cooldown_seconds", &self.cooldown_seconds)
            .field("max_inactive_seconds", &self.max_inactive_seconds)
            .field("tick_enabled", &self.tick_enabled)
            .finish_non_exhaustive()
    }
}
