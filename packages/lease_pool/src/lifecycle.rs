use std::fmt;

/// Opaque construction flags passed through to
/// [`ResourceLifecycle::construct`].
///
/// The pool attaches no meaning to the bits; they exist so a host can route
/// per-pool construction options (spawn flags, allocation hints) to its own
/// lifecycle implementation without the pool knowing about them.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct CreateFlags(u32);

impl CreateFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);

    /// Wraps raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

/// How a pool creates, recycles and destroys the resources it manages.
///
/// The pool owns the resources; this trait is the seam through which all
/// category-specific behavior flows. [`construct`][Self::construct] runs when
/// the pool grows, [`activate`][Self::activate] when a resource is leased
/// out, [`deactivate`][Self::deactivate] when it comes back to rest, and
/// [`destroy`][Self::destroy] when the pool evicts it or is itself dropped.
///
/// `activate` and `deactivate` default to doing nothing, which suits plain
/// data resources. [`tag`][Self::tag] names a resource for tag-based
/// acquisition and defaults to unnamed.
///
/// For pools of uniform resources that need no recycling hooks, wrap a
/// closure in [`Factory`] instead of implementing the trait by hand.
pub trait ResourceLifecycle {
    /// The resource type this lifecycle produces.
    type Resource;

    /// Builds one new resource.
    ///
    /// Returning `None` signals a construction failure. The pool logs it and
    /// carries on without a new slot; the triggering acquire behaves as if
    /// the pool were exhausted.
    fn construct(&mut self, flags: CreateFlags) -> Option<Self::Resource>;

    /// Prepares a resource that was just leased out.
    fn activate(&mut self, _resource: &mut Self::Resource) {}

    /// Puts a returned resource back to rest.
    fn deactivate(&mut self, _resource: &mut Self::Resource) {}

    /// Disposes of a resource leaving the pool for good.
    ///
    /// The default lets the resource drop.
    fn destroy(&mut self, resource: Self::Resource) {
        drop(resource);
    }

    /// The name used to match this resource in tag-based acquisition.
    fn tag<'r>(&self, _resource: &'r Self::Resource) -> Option<&'r str> {
        None
    }
}

/// Adapts a plain `FnMut() -> T` closure into a [`ResourceLifecycle`] with
/// default recycling hooks.
///
/// # Example
///
/// ```rust
/// use lease_pool::{Factory, LeasePoolBuilder, ReclaimPolicy};
///
/// let pool = LeasePoolBuilder::new(Factory::new(|| Vec::<u8>::with_capacity(1024)))
///     .capacity(4)
///     .build_local()
///     .unwrap();
///
/// let lease = pool.acquire(true, ReclaimPolicy::NonReclaimable).unwrap();
/// let capacity = lease.with(|buffer| buffer.capacity()).unwrap();
/// assert!(capacity >= 1024);
/// ```
pub struct Factory<F> {
    construct: F,
}

impl<F> Factory<F> {
    /// Wraps the construction closure.
    #[must_use]
    pub fn new(construct: F) -> Self {
        Self { construct }
    }
}

impl<T, F> ResourceLifecycle for Factory<F>
where
    F: FnMut() -> T,
{
    type Resource = T;

    fn construct(&mut self, _flags: CreateFlags) -> Option<T> {
        Some((self.construct)())
    }
}

impl<F> fmt::Debug for Factory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_flags_round_trip() {
        assert_eq!(CreateFlags::NONE.bits(), 0);
        assert_eq!(CreateFlags::from_bits(0b1010).bits(), 0b1010);
    }

    #[test]
    fn factory_constructs_through_the_closure() {
        let mut factory = Factory::new(|| 7_u32);
        assert_eq!(factory.construct(CreateFlags::NONE), Some(7));
    }

    #[test]
    fn default_hooks_do_nothing() {
        let mut factory = Factory::new(String::new);
        let mut value = "hello".to_string();
        factory.activate(&mut value);
        factory.deactivate(&mut value);
        assert_eq!(value, "hello");
        assert_eq!(factory.tag(&value), None);
    }
}
