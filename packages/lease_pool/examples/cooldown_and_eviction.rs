//! Example demonstrating cooldown-gated reuse and idle eviction, driven by
//! a manual clock so the whole thing runs instantly.

use lease_pool::{Factory, LeasePoolBuilder, ManualClock, ReclaimPolicy};

fn main() {
    println!("=== LocalLeasePool: Cooldown and Eviction ===");

    let clock = ManualClock::new();
    let pool = LeasePoolBuilder::new(Factory::new(|| vec![0_u8; 1024]))
        .capacity(8)
        .cooldown_seconds(5.0)
        .max_inactive_seconds(30.0)
        .tick_interval_seconds(1.0)
        .clock(clock.clone())
        .build_local()
        .expect("configuration is valid");

    // Use a buffer and return it.
    let lease = pool
        .acquire(true, ReclaimPolicy::NonReclaimable)
        .expect("pool has free capacity");
    let first_id = lease.id();
    drop(lease);
    println!("Buffer {first_id} returned at t=0");

    // Two seconds later the buffer is still cooling down, so the pool
    // builds a second one instead of reusing it.
    clock.advance(2.0);
    let lease = pool
        .acquire(true, ReclaimPolicy::NonReclaimable)
        .expect("pool has free capacity");
    println!("t=2: got buffer {} (cooldown blocked reuse of {first_id})", lease.id());
    drop(lease);

    // Once the cooldown elapses, the first buffer is preferred again.
    clock.advance(4.0);
    let lease = pool
        .acquire(true, ReclaimPolicy::NonReclaimable)
        .expect("pool has free capacity");
    println!("t=6: got buffer {} (cooldown elapsed)", lease.id());
    drop(lease);

    // Long idle periods let the maintenance sweep retire buffers.
    clock.advance(60.0);
    pool.tick();
    println!("t=66: sweep ran, {} buffers remain", pool.len());
}
