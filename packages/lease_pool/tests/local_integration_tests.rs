//! End-to-end tests for the single-threaded pool.

use std::cell::Cell;
use std::rc::Rc;

use lease_pool::{
    CreateFlags, LeasePoolBuilder, ManualClock, ReclaimPolicy, ResourceLifecycle,
};

/// A scratch buffer pool where activation and deactivation track state.
#[derive(Debug)]
struct BufferLifecycle {
    size: usize,
    live: Rc<Cell<usize>>,
}

impl ResourceLifecycle for BufferLifecycle {
    type Resource = Vec<u8>;

    fn construct(&mut self, _flags: CreateFlags) -> Option<Vec<u8>> {
        self.live.set(self.live.get() + 1);
        Some(vec![0; self.size])
    }

    fn deactivate(&mut self, buffer: &mut Vec<u8>) {
        buffer.fill(0);
    }

    fn destroy(&mut self, buffer: Vec<u8>) {
        self.live.set(self.live.get() - 1);
        drop(buffer);
    }
}

fn buffer_pool(
    capacity: usize,
    size: usize,
) -> (lease_pool::LocalLeasePool<BufferLifecycle>, Rc<Cell<usize>>) {
    let live = Rc::new(Cell::new(0));
    let pool = LeasePoolBuilder::new(BufferLifecycle {
        size,
        live: Rc::clone(&live),
    })
    .capacity(capacity)
    .build_local()
    .unwrap();
    (pool, live)
}

#[test]
fn buffers_come_back_zeroed() {
    let (pool, _live) = buffer_pool(4, 16);

    let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    lease.with_mut(|b| b[0] = 0xFF).unwrap();
    drop(lease);

    let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    assert_eq!(lease.with(|b| b[0]).unwrap(), 0);
}

#[test]
fn warm_reuse_prefers_the_most_recently_returned_buffer() {
    let (pool, live) = buffer_pool(4, 16);

    let first = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    let second = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    let first_id = first.id();
    let second_id = second.id();
    drop(first);
    drop(second);

    // No cooldown: last in, first out.
    let reused = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    assert_eq!(reused.id(), second_id);
    drop(reused);

    let reused = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    assert_eq!(reused.id(), second_id);

    let other = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    assert_eq!(other.id(), first_id);
    assert_eq!(live.get(), 2);
}

#[test]
fn cooldown_prefers_the_longest_rested_buffer() {
    let clock = ManualClock::new();
    let live = Rc::new(Cell::new(0));
    let pool = LeasePoolBuilder::new(BufferLifecycle {
        size: 16,
        live: Rc::clone(&live),
    })
    .capacity(4)
    .cooldown_seconds(2.0)
    .clock(clock.clone())
    .build_local()
    .unwrap();

    let first = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    clock.advance(1.0);
    let second = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    let first_id = first.id();
    let second_id = second.id();
    drop(first);
    drop(second);

    clock.advance(5.0);
    let reused = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    assert_eq!(reused.id(), first_id);

    let reused = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    assert_eq!(reused.id(), second_id);
}

#[test]
fn pool_capacity_can_shrink_once_buffers_go_idle() {
    let (pool, live) = buffer_pool(8, 16);

    let leases: Vec<_> = (0..6)
        .map(|_| pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap())
        .collect();
    assert_eq!(live.get(), 6);

    // All six are leased out; shrinking below that is refused.
    assert!(!pool.set_capacity(4));

    drop(leases);
    assert!(pool.set_capacity(4));
    assert_eq!(pool.capacity(), 4);
    assert_eq!(live.get(), 4);
}

#[test]
fn leases_outlive_the_pool_handle() {
    let (pool, live) = buffer_pool(2, 16);
    let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    drop(pool);

    // The lease keeps the pool alive underneath it.
    assert!(lease.is_valid());
    assert_eq!(lease.with(Vec::len).unwrap(), 16);

    drop(lease);
    assert_eq!(live.get(), 0);
}

#[test]
fn predicate_acquire_scans_in_return_order() {
    let (pool, _live) = buffer_pool(4, 4);

    let small = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    let big = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
    big.with_mut(|b| b.resize(64, 0)).unwrap();
    let big_id = big.id();
    drop(small);
    drop(big);

    let lease = pool
        .acquire_where(|b| b.len() >= 64, true, ReclaimPolicy::NonReclaimable)
        .unwrap();
    assert_eq!(lease.id(), big_id);

    // Nothing at rest satisfies an impossible predicate, and predicate
    // acquisition never constructs.
    assert!(
        pool.acquire_where(|b| b.len() > 1000, true, ReclaimPolicy::NonReclaimable)
            .is_none()
    );
}

#[test]
fn remove_inactive_count_is_all_or_nothing() {
    let (pool, live) = buffer_pool(4, 16);

    let leases: Vec<_> = (0..3)
        .map(|_| pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap())
        .collect();
    drop(leases);
    assert_eq!(pool.inactive_count(), 3);

    assert!(!pool.remove_inactive_count(5));
    assert_eq!(pool.inactive_count(), 3);

    assert!(pool.remove_inactive_count(2));
    assert_eq!(pool.inactive_count(), 1);
    assert_eq!(live.get(), 1);
}
