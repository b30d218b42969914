use std::fmt;

/// The identity of a pool slot.
///
/// Identifiers are handed out from an ever-incrementing counter and are never
/// reused, even after the slot they named is destroyed. This makes a `SlotId`
/// safe to hold across the slot's whole lifetime: a lookup with the identifier
/// of a destroyed slot simply finds nothing.
///
/// # Example
///
/// ```rust
/// use lease_pool::{Factory, LeasePoolBuilder, ReclaimPolicy};
///
/// let pool = LeasePoolBuilder::new(Factory::new(String::new))
///     .build_local()
///     .unwrap();
///
/// let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
/// let id = lease.id();
///
/// // The identifier stays meaningful even after the lease ends.
/// drop(lease);
/// assert!(pool.is_inactive(id));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SlotId(u64);

impl SlotId {
    pub(crate) const fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The checkout counter of a slot.
///
/// Bumped on every acquire and every return, so each lease of a slot observes
/// a value no past or future lease of that slot ever sees.
pub type Generation = u64;

/// A copyable lease token issued by [`RawLeasePool`][crate::RawLeasePool].
///
/// The token pairs a slot identity with the generation the lease was granted
/// under. It carries no lifetime obligations of its own; pass it back to the
/// pool to release or steal the resource, or to check whether the lease is
/// still current. A token whose generation no longer matches the slot is
/// stale and every operation through it becomes a no-op.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RawLease {
    id: SlotId,
    generation: Generation,
}

impl RawLease {
    pub(crate) const fn new(id: SlotId, generation: Generation) -> Self {
        Self { id, generation }
    }

    /// The identity of the leased slot.
    #[must_use]
    pub const fn id(&self) -> SlotId {
        self.id
    }

    /// The generation this lease was granted under.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }
}

/// One entry in the slot table.
#[derive(Debug)]
pub(crate) struct Slot<T> {
    pub(crate) resource: T,

    /// Bumped on acquire and on return; a lease is current only while its
    /// captured generation equals this.
    pub(crate) generation: Generation,

    pub(crate) created_at: f64,

    /// Stamped at activation only. Both the reuse cooldown and idle eviction
    /// measure elapsed time from this.
    pub(crate) last_active_at: f64,

    pub(crate) active: bool,

    /// Whether the current lease may be forcibly returned under capacity
    /// pressure. Meaningful only while `active`.
    pub(crate) reclaimable: bool,
}
