//! Example demonstrating basic usage of `LeasePool` with auto-returning
//! leases.
//!
//! This shows the thread-safe pool with automatic return on drop. Best
//! choice for most use cases.

use lease_pool::{Factory, LeasePoolBuilder, ReclaimPolicy};

fn main() {
    println!("=== LeasePool: Thread-safe, Auto-returning ===");

    // Create a pool of scratch strings, two built up front.
    let pool = LeasePoolBuilder::new(Factory::new(String::new))
        .capacity(8)
        .initial_count(2)
        .build()
        .expect("configuration is valid");

    println!("Pool starts with {} resources at rest", pool.inactive_count());

    // Lease a string and work with it.
    let lease = pool
        .acquire(true, ReclaimPolicy::NonReclaimable)
        .expect("pool has free capacity");
    lease
        .with_mut(|s| s.push_str("hello from the pool"))
        .expect("lease is valid");
    println!("Leased slot {} holds: {:?}", lease.id(), lease.with(String::clone));

    // Clone handles freely; the resource returns when the last one drops.
    let sibling = lease.clone();
    drop(lease);
    println!("One clone dropped, lease still valid: {}", sibling.is_valid());

    // Thread-safe sharing.
    let pool_clone = pool.clone();
    std::thread::spawn(move || {
        let worker_lease = pool_clone
            .acquire(true, ReclaimPolicy::NonReclaimable)
            .expect("pool has free capacity");
        worker_lease
            .with_mut(|s| s.push_str("worker was here"))
            .expect("lease is valid");
    })
    .join()
    .expect("worker thread does not panic");

    drop(sibling);
    println!("Everything returned: {} at rest", pool.inactive_count());

    // Stealing removes the resource from pool management entirely.
    let lease = pool
        .acquire(true, ReclaimPolicy::NonReclaimable)
        .expect("pool has free capacity");
    let owned = lease.steal().expect("lease is valid");
    println!("Stole a string of length {}; pool now holds {}", owned.len(), pool.len());
}
