use rand::Rng;

use crate::{Generation, SlotId};

/// Whether a lease may be forcibly ended to satisfy a later acquire.
///
/// Chosen per acquire, not per pool: the same slot can be leased as
/// [`Reclaimable`][Self::Reclaimable] by one caller and
/// [`NonReclaimable`][Self::NonReclaimable] by the next.
///
/// A reclaimable lease is registered with the pool's reclaim registry for as
/// long as it is out. When the pool is exhausted and no reuse cooldown is
/// configured, a new acquire may pick a registered lease, force it back and
/// hand the resource to the new caller. Every handle of the forced lease
/// becomes stale at that moment, exactly as if it had been returned.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum ReclaimPolicy {
    /// The lease runs until it is returned, stolen or dropped. This is the
    /// default.
    #[default]
    NonReclaimable,

    /// The lease may be forcibly returned under capacity pressure.
    Reclaimable,
}

/// How a pool picks the victim among its reclaimable leases.
///
/// Configured once at build time and applied whenever an exhausted,
/// cooldown-free acquire falls through to forced reclamation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum ReclaimStrategy {
    /// The lease that has been out the longest. Costs a linear scan of the
    /// registry. This is the default.
    #[default]
    Oldest,

    /// The first registry entry, cheapest to pick.
    FirstFound,

    /// The most recently registered entry.
    LastFound,

    /// A uniformly random entry.
    Random,
}

/// One reclaimable lease currently out of the pool.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ReclaimEntry {
    pub(crate) id: SlotId,
    pub(crate) generation: Generation,
    pub(crate) acquired_at: f64,
}

/// The side list of reclaimable leases.
///
/// Order is not meaningful; removal swaps the last entry into the gap so
/// both insert and remove stay constant time.
#[derive(Debug, Default)]
pub(crate) struct ReclaimRegistry {
    entries: Vec<ReclaimEntry>,
}

impl ReclaimRegistry {
    pub(crate) fn insert(&mut self, id: SlotId, generation: Generation, acquired_at: f64) {
        self.entries.push(ReclaimEntry {
            id,
            generation,
            acquired_at,
        });
    }

    /// Removes the entry for `id`, if one exists.
    pub(crate) fn remove(&mut self, id: SlotId) {
        if let Some(position) = self.entries.iter().position(|entry| entry.id == id) {
            self.entries.swap_remove(position);
        }
    }

    /// Picks a victim according to `strategy` without removing it.
    pub(crate) fn select(&self, strategy: ReclaimStrategy) -> Option<ReclaimEntry> {
        match strategy {
            ReclaimStrategy::Oldest => self
                .entries
                .iter()
                .min_by(|a, b| {
                    a.acquired_at
                        .partial_cmp(&b.acquired_at)
                        .expect("lease timestamps come from a Clock and are never NaN")
                })
                .copied(),
            ReclaimStrategy::FirstFound => self.entries.first().copied(),
            ReclaimStrategy::LastFound => self.entries.last().copied(),
            ReclaimStrategy::Random => {
                if self.entries.is_empty() {
                    None
                } else {
                    let index = rand::rng().random_range(0..self.entries.len());
                    self.entries.get(index).copied()
                }
            }
        }
    }

    pub(crate) fn entries(&self) -> &[ReclaimEntry] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_of(timestamps: &[f64]) -> ReclaimRegistry {
        let mut registry = ReclaimRegistry::default();
        for (index, acquired_at) in timestamps.iter().enumerate() {
            registry.insert(SlotId::new(index as u64), 1, *acquired_at);
        }
        registry
    }

    #[test]
    fn empty_registry_selects_nothing() {
        let registry = ReclaimRegistry::default();
        for strategy in [
            ReclaimStrategy::Oldest,
            ReclaimStrategy::FirstFound,
            ReclaimStrategy::LastFound,
            ReclaimStrategy::Random,
        ] {
            assert!(registry.select(strategy).is_none());
        }
    }

    #[test]
    fn oldest_selects_minimum_acquired_at() {
        let registry = registry_of(&[5.0, 1.0, 3.0]);
        let entry = registry.select(ReclaimStrategy::Oldest).unwrap();
        assert_eq!(entry.id, SlotId::new(1));
    }

    #[test]
    fn first_and_last_found_select_the_ends() {
        let registry = registry_of(&[5.0, 1.0, 3.0]);
        assert_eq!(
            registry.select(ReclaimStrategy::FirstFound).unwrap().id,
            SlotId::new(0)
        );
        assert_eq!(
            registry.select(ReclaimStrategy::LastFound).unwrap().id,
            SlotId::new(2)
        );
    }

    #[test]
    fn random_selects_some_registered_entry() {
        let registry = registry_of(&[5.0, 1.0, 3.0]);
        let entry = registry.select(ReclaimStrategy::Random).unwrap();
        assert!(registry.entries().iter().any(|e| e.id == entry.id));
    }

    #[test]
    fn remove_is_swap_and_pop() {
        let mut registry = registry_of(&[5.0, 1.0, 3.0]);
        registry.remove(SlotId::new(0));
        assert_eq!(registry.len(), 2);
        // The last entry took the removed entry's place.
        assert_eq!(registry.entries().first().unwrap().id, SlotId::new(2));
    }

    #[test]
    fn removing_an_unknown_id_is_a_no_op() {
        let mut registry = registry_of(&[5.0]);
        registry.remove(SlotId::new(42));
        assert_eq!(registry.len(), 1);
    }
}
