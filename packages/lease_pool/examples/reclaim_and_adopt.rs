//! Example demonstrating forced reclamation under pressure and adoption of
//! externally constructed resources.

use lease_pool::{
    CreateFlags, LeasePoolBuilder, ReclaimPolicy, ReclaimStrategy, ResourceLifecycle,
};

#[derive(Debug)]
struct Particle {
    label: String,
}

#[derive(Debug)]
struct ParticleLifecycle;

impl ResourceLifecycle for ParticleLifecycle {
    type Resource = Particle;

    // This pool only manages particles made elsewhere.
    fn construct(&mut self, _flags: CreateFlags) -> Option<Particle> {
        None
    }

    fn tag<'r>(&self, particle: &'r Particle) -> Option<&'r str> {
        Some(&particle.label)
    }
}

fn main() {
    println!("=== LeasePool: Reclamation and Adoption ===");

    let pool = LeasePoolBuilder::new(ParticleLifecycle)
        .capacity(2)
        .adoption_only(true)
        .reclaim_strategy(ReclaimStrategy::Oldest)
        .build_local()
        .expect("configuration is valid");

    // Hand two externally built particles to the pool.
    for label in ["spark", "ember"] {
        let id = pool
            .adopt(Particle {
                label: label.to_string(),
            })
            .expect("pool has free capacity");
        println!("Adopted {label:?} as slot {id}");
    }

    // Lease both, consenting to reclamation for the first.
    let background = pool
        .acquire_by_tag("spark", true, ReclaimPolicy::Reclaimable)
        .expect("spark is at rest");
    let _foreground = pool
        .acquire_by_tag("ember", true, ReclaimPolicy::NonReclaimable)
        .expect("ember is at rest");
    println!("Pool is full: {}", pool.is_full());

    // The pool is full, so this acquire pulls the consenting lease back.
    let urgent = pool
        .acquire(true, ReclaimPolicy::NonReclaimable)
        .expect("a reclaimable lease exists");
    println!(
        "Urgent request recycled slot {}; background lease valid: {}",
        urgent.id(),
        background.is_valid()
    );

    // The stale handle can still inspect the resource that got away.
    let label = background
        .with_even_if_stale(|p| p.label.clone())
        .expect("the slot still exists");
    println!("Residual read through the stale lease: {label:?}");
}
