use std::fmt;

use crate::{Generation, SlotId};

/// Which way a lease-changed notification went.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum LeaseTransition {
    /// A resource was leased out of the pool.
    Acquired,

    /// A resource came back to the pool, voluntarily or by force.
    Returned,
}

type AddedFn = Box<dyn FnMut(SlotId) + Send>;
type RemovedFn = Box<dyn FnMut(SlotId, Generation) + Send>;
type LeaseFn = Box<dyn FnMut(SlotId, Generation, LeaseTransition) + Send>;

/// The three notification streams a pool broadcasts on.
///
/// Resource-added fires after a slot is constructed or adopted,
/// resource-removed when a slot leaves the pool for good (eviction, steal,
/// explicit removal) and lease-changed on every acquire and return.
#[derive(Default)]
pub(crate) struct PoolCallbacks {
    added: Vec<AddedFn>,
    removed: Vec<RemovedFn>,
    lease_changed: Vec<LeaseFn>,
}

impl PoolCallbacks {
    pub(crate) fn push_added(&mut self, callback: AddedFn) {
        self.added.push(callback);
    }

    pub(crate) fn push_removed(&mut self, callback: RemovedFn) {
        self.removed.push(callback);
    }

    pub(crate) fn push_lease_changed(&mut self, callback: LeaseFn) {
        self.lease_changed.push(callback);
    }

    pub(crate) fn notify_added(&mut self, id: SlotId) {
        for callback in &mut self.added {
            callback(id);
        }
    }

    pub(crate) fn notify_removed(&mut self, id: SlotId, generation: Generation) {
        for callback in &mut self.removed {
            callback(id, generation);
        }
    }

    pub(crate) fn notify_lease_changed(
        &mut self,
        id: SlotId,
        generation: Generation,
        transition: LeaseTransition,
    ) {
        for callback in &mut self.lease_changed {
            callback(id, generation, transition);
        }
    }
}

impl fmt::Debug for PoolCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolCallbacks")
            .field("added", &self.added.len())
            .field("removed", &self.removed.len())
            .field("lease_changed", &self.lease_changed.len())
            .finish()
    }
}
