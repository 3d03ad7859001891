//! Bounded object pools with scoped leases.
//!
//! A [`Lease`] hands out exclusive access to a pooled value and gives it back
//! when dropped, on every exit path. Returned values are [`Poolable::reset`]
//! first, so a fresh lease always starts from a clean state. Pools are
//! single-threaded (`Rc`-based); use one pool per thread.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::{Rc, Weak};

/// A value that can be recycled through a [`Pool`].
pub trait Poolable {
    /// Clear all per-use state. Called whenever a lease returns the value.
    fn reset(&mut self);
}

/// Bookkeeping counters of a [`Pool`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Values built by the factory.
    pub created: usize,
    /// Leases handed out.
    pub leased: usize,
    /// Values taken back into the free list.
    pub returned: usize,
    /// Values dropped because the free list was full.
    pub discarded: usize,
    /// Values currently waiting in the free list.
    pub idle: usize,
}

impl PoolStats {
    /// Leases not yet given back.
    pub fn outstanding(&self) -> usize {
        self.leased - self.returned - self.discarded
    }
}

struct PoolShared<T> {
    name: &'static str,
    capacity: usize,
    free: RefCell<Vec<T>>,
    factory: Box<dyn Fn() -> T>,
    stats: Cell<PoolStats>,
}

impl<T> PoolShared<T> {
    fn update(&self, f: impl FnOnce(&mut PoolStats)) {
        let mut s = self.stats.get();
        f(&mut s);
        self.stats.set(s);
    }

    fn give_back(&self, value: T) {
        let mut free = self.free.borrow_mut();
        if free.len() < self.capacity {
            free.push(value);
            let idle = free.len();
            drop(free);
            self.update(|s| {
                s.returned += 1;
                s.idle = idle;
            });
        } else {
            drop(free);
            log::trace!("{} pool full, discarding returned value", self.name);
            self.update(|s| s.discarded += 1);
        }
    }
}

/// A bounded free list of reusable values.
///
/// Cloning a `Pool` yields another handle to the same free list.
pub struct Pool<T: Poolable> {
    shared: Rc<PoolShared<T>>,
}

impl<T: Poolable> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: Poolable> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("name", &self.shared.name)
            .field("capacity", &self.shared.capacity)
            .field("stats", &self.shared.stats.get())
            .finish()
    }
}

impl<T: Poolable> Pool<T> {
    /// A pool keeping at most `capacity` idle values, building new ones with
    /// `factory` when empty.
    pub fn new(name: &'static str, capacity: usize, factory: impl Fn() -> T + 'static) -> Self {
        Self {
            shared: Rc::new(PoolShared {
                name,
                capacity,
                free: RefCell::new(Vec::with_capacity(capacity)),
                factory: Box::new(factory),
                stats: Cell::new(PoolStats::default()),
            }),
        }
    }

    /// Take a value from the pool, building one if none is idle.
    pub fn lease(&self) -> Lease<T> {
        let reused = self.shared.free.borrow_mut().pop();
        let value = match reused {
            Some(v) => {
                let idle = self.shared.free.borrow().len();
                self.shared.update(|s| s.idle = idle);
                v
            }
            None => {
                self.shared.update(|s| s.created += 1);
                (self.shared.factory)()
            }
        };
        self.shared.update(|s| s.leased += 1);
        Lease {
            value: Some(value),
            pool: Rc::downgrade(&self.shared),
        }
    }

    pub fn stats(&self) -> PoolStats {
        self.shared.stats.get()
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn name(&self) -> &'static str {
        self.shared.name
    }
}

/// Exclusive, scoped access to a pooled value.
///
/// Dropping the lease resets the value and returns it to its pool. If the
/// pool is gone or full the value is simply dropped.
pub struct Lease<T: Poolable> {
    value: Option<T>,
    pool: Weak<PoolShared<T>>,
}

impl<T: Poolable> Lease<T> {
    /// Give the value back now. Equivalent to dropping the lease.
    pub fn dispose(self) {
        drop(self);
    }
}

impl<T: Poolable> Deref for Lease<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.value {
            Some(v) => v,
            // Only `drop` takes the value out.
            None => unreachable!("lease used after release"),
        }
    }
}

impl<T: Poolable> DerefMut for Lease<T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.value {
            Some(v) => v,
            None => unreachable!("lease used after release"),
        }
    }
}

impl<T: Poolable + fmt::Debug> fmt::Debug for Lease<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Lease").field(&self.value).finish()
    }
}

impl<T: Poolable> Drop for Lease<T> {
    fn drop(&mut self) {
        let Some(mut value) = self.value.take() else {
            return;
        };
        value.reset();
        match self.pool.upgrade() {
            Some(pool) => pool.give_back(value),
            None => log::trace!("lease outlived its pool, dropping value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Scratch {
        items: Vec<u32>,
    }

    impl Poolable for Scratch {
        fn reset(&mut self) {
            self.items.clear();
        }
    }

    fn scratch_pool(capacity: usize) -> Pool<Scratch> {
        Pool::new("scratch", capacity, Scratch::default)
    }

    #[test]
    fn sequential_leases_reuse_one_value() {
        let pool = scratch_pool(2);
        for i in 0..10 {
            let mut l = pool.lease();
            assert!(l.items.is_empty(), "lease {i} must start reset");
            l.items.push(i);
        }
        let s = pool.stats();
        assert_eq!(s.created, 1);
        assert_eq!(s.leased, 10);
        assert_eq!(s.returned, 10);
        assert_eq!(s.idle, 1);
        assert_eq!(s.outstanding(), 0);
    }

    #[test]
    fn free_list_never_exceeds_capacity() {
        let pool = scratch_pool(2);
        let leases: Vec<_> = (0..5).map(|_| pool.lease()).collect();
        assert_eq!(pool.stats().outstanding(), 5);
        drop(leases);
        let s = pool.stats();
        assert_eq!(s.created, 5);
        assert_eq!(s.idle, 2);
        assert_eq!(s.returned, 2);
        assert_eq!(s.discarded, 3);
        assert_eq!(s.outstanding(), 0);
    }

    #[test]
    fn dispose_returns_immediately() {
        let pool = scratch_pool(1);
        let l = pool.lease();
        assert_eq!(pool.stats().idle, 0);
        l.dispose();
        assert_eq!(pool.stats().idle, 1);
    }

    #[test]
    fn lease_outliving_pool_is_tolerated() {
        let pool = scratch_pool(1);
        let mut l = pool.lease();
        l.items.push(1);
        drop(pool);
        drop(l);
    }

    #[test]
    fn cloned_handles_share_the_free_list() {
        let a = scratch_pool(4);
        let b = a.clone();
        a.lease().dispose();
        let _l = b.lease();
        assert_eq!(b.stats().created, 1);
        assert_eq!(a.stats().leased, 2);
        assert_eq!(a.name(), "scratch");
        assert_eq!(b.capacity(), 4);
    }
}
