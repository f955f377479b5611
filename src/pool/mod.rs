//! Per-worker object pooling for short-lived frame and message objects.
//!
//! [`ObjectPool`] is a type-keyed cache of reset instances owned by a single
//! worker context. It amortises allocation on the hot path without any
//! cross-thread traffic: the pool moves with its worker and is deliberately
//! not shareable, so acquire/release never lock. An instance released on one
//! worker is simply invisible to every other worker; that is the throughput
//! trade-off over a synchronised global pool.
//!
//! Reset logic lives centrally on each type via [`Pooled::reset`], never at
//! call sites. Debug builds verify the reset actually cleared the instance;
//! release builds compile the check out. Recycling can be disabled wholesale
//! so use-after-release bugs surface as fresh-state effects instead of being
//! masked by reuse.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

use log::trace;

/// Default number of cached instances kept per type.
pub const DEFAULT_PER_TYPE_CAPACITY: usize = 8;

/// An object eligible for pooling.
///
/// `reset` must return the instance to its default-observable state: every
/// field cleared and any held buffer released. [`Pooled::is_reset`] is the
/// debug-build probe asserting that contract.
pub trait Pooled: Default + Send + 'static {
    /// Clear every field, releasing held resources.
    fn reset(&mut self);

    /// Whether the instance currently observes as freshly constructed.
    fn is_reset(&self) -> bool { true }
}

/// Type-keyed cache of reusable instances, owned by one worker.
pub struct ObjectPool {
    slots: HashMap<TypeId, Vec<Box<dyn Any + Send>>>,
    per_type_capacity: usize,
    recycling: bool,
}

impl std::fmt::Debug for ObjectPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("types", &self.slots.len())
            .field("per_type_capacity", &self.per_type_capacity)
            .field("recycling", &self.recycling)
            .finish()
    }
}

impl Default for ObjectPool {
    fn default() -> Self { Self::new() }
}

impl ObjectPool {
    /// Create a pool with the default per-type capacity, recycling enabled.
    #[must_use]
    pub fn new() -> Self { Self::with_capacity(DEFAULT_PER_TYPE_CAPACITY) }

    /// Create a pool keeping at most `per_type_capacity` instances per type.
    #[must_use]
    pub fn with_capacity(per_type_capacity: usize) -> Self {
        Self {
            slots: HashMap::new(),
            per_type_capacity,
            recycling: true,
        }
    }

    /// Enable or disable recycling. While disabled, `release` drops and
    /// `acquire` always constructs fresh.
    pub fn set_recycling(&mut self, enabled: bool) {
        self.recycling = enabled;
        if !enabled {
            self.slots.clear();
        }
    }

    /// Whether recycling is currently enabled.
    #[must_use]
    pub const fn recycling_enabled(&self) -> bool { self.recycling }

    /// Number of cached instances of `T`.
    #[must_use]
    pub fn cached<T: Pooled>(&self) -> usize {
        self.slots.get(&TypeId::of::<T>()).map_or(0, Vec::len)
    }

    /// Take a recycled instance of `T` if one is cached, else construct a
    /// fresh default. Never blocks.
    #[must_use]
    pub fn acquire<T: Pooled>(&mut self) -> T {
        if self.recycling
            && let Some(slot) = self.slots.get_mut(&TypeId::of::<T>())
            && let Some(boxed) = slot.pop()
            && let Ok(instance) = boxed.downcast::<T>()
        {
            return *instance;
        }
        T::default()
    }

    /// Reset `instance` and cache it for reuse, up to the per-type capacity;
    /// overflow instances are dropped, not queued.
    pub fn release<T: Pooled>(&mut self, mut instance: T) {
        if !self.recycling {
            return;
        }
        instance.reset();
        debug_assert!(
            instance.is_reset(),
            "pooled instance not fully reset on release"
        );
        let slot = self.slots.entry(TypeId::of::<T>()).or_default();
        if slot.len() < self.per_type_capacity {
            slot.push(Box::new(instance));
        } else {
            trace!("pool slot full, dropping released instance");
        }
    }
}
