//! This package provides [`LeasePool`], a generational object pool that
//! hands out resources on lease and takes them back when the lease ends.
//!
//! Every slot carries a generation stamp that changes on each acquire and
//! each return, so a handle that outlives its lease simply goes stale
//! instead of touching a resource that now belongs to someone else.
//!
//! # Features
//!
//! - **Generational staleness**: Held-too-long handles go inert instead of
//!   aliasing a reassigned resource.
//! - **Warm reuse**: Without a cooldown, the most recently returned resource
//!   is leased first.
//! - **Cooldown-gated reuse**: With a cooldown, resources rest for a
//!   configurable period and the longest-rested one is leased first.
//! - **Forced reclamation**: A full pool may pull a resource back from a
//!   consenting lease holder instead of refusing the request.
//! - **Adoption**: Externally constructed resources can be handed to the
//!   pool, which manages them from then on.
//! - **Auto-returning leases**: Reference-counted handles return the
//!   resource when the last clone is dropped; [`Lease::steal`] takes the
//!   resource out of the pool instead.
//! - **Thread-safe and single-threaded variants**: [`LeasePool`] for
//!   multi-threaded use, [`LocalLeasePool`] for single-threaded
//!   performance, [`RawLeasePool`] for manual lease management.
//! - **Capacity-driven eviction**: A rate-limited maintenance sweep
//!   destroys resources that have idled too long.
//!
//! # Example
//!
//! ```rust
//! use lease_pool::{Factory, LeasePoolBuilder, ReclaimPolicy};
//!
//! let pool = LeasePoolBuilder::new(Factory::new(String::new))
//!     .capacity(8)
//!     .initial_count(2)
//!     .build()
//!     .unwrap();
//!
//! let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
//! lease.with_mut(|s| s.push_str("hello")).unwrap();
//!
//! // Dropping the lease returns the string to the pool, contents intact.
//! drop(lease);
//! assert_eq!(pool.inactive_count(), 2);
//! ```
//!
//! For single-threaded use:
//!
//! ```rust
//! use lease_pool::{Factory, LeasePoolBuilder, ReclaimPolicy};
//!
//! let pool = LeasePoolBuilder::new(Factory::new(|| vec![0_u8; 64]))
//!     .capacity(4)
//!     .build_local()
//!     .unwrap();
//!
//! let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
//! assert_eq!(lease.with(Vec::len).unwrap(), 64);
//! ```
//!
//! For manual lease management:
//!
//! ```rust
//! use lease_pool::{Factory, LeasePoolBuilder, ReclaimPolicy};
//!
//! let mut pool = LeasePoolBuilder::new(Factory::new(String::new))
//!     .capacity(4)
//!     .build_raw()
//!     .unwrap();
//!
//! let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
//! pool.resource_mut(lease).unwrap().push_str("manual");
//!
//! // Nothing happens automatically; the lease must be handed back.
//! assert!(pool.release(lease));
//!
//! // The copy we kept is now a stale token.
//! assert!(pool.resource(lease).is_none());
//! ```

mod builder;
mod clock;
mod constants;
mod events;
mod lease;
mod lifecycle;
mod local_lease;
mod local_pool;
mod pool;
mod raw;
mod reclaim;
mod slot;

pub use builder::*;
pub use clock::*;
pub use events::*;
pub use lease::*;
pub use lifecycle::*;
pub use local_lease::*;
pub use local_pool::*;
pub use pool::*;
pub use raw::*;
pub use reclaim::*;
pub use slot::*;
