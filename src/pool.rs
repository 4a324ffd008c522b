//! Generic bounded pool of reusable UI-element handles.
//!
//! Markers and tooltips are expensive to construct in the presentation
//! layer, so released handles go onto a free list (reset and hidden) instead
//! of being destroyed, and acquisition reuses an idle handle whenever one is
//! available. The pool maps directly to a free-list with ownership
//! transferred on acquire/release; no garbage-collection mechanism is
//! involved.

use crate::error::Result;

/// Counters describing pool activity since construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Handles constructed through the factory.
    pub created: u64,
    /// Acquisitions served from the free list.
    pub recycled: u64,
    /// Handles destroyed on overflow or drain.
    pub destroyed: u64,
}

/// Bounded free list of reusable handles.
///
/// A handle is either *free* (held here) or *in use* (owned by the caller),
/// never both. The number of live handles (free plus in use) never
/// exceeds `max_size`.
#[derive(Debug)]
pub struct ComponentPool<H> {
    free: Vec<H>,
    max_size: usize,
    in_use: usize,
    stats: PoolStats,
}

impl<H> ComponentPool<H> {
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "pool max size must be greater than zero");
        Self {
            free: Vec::new(),
            max_size,
            in_use: 0,
            stats: PoolStats::default(),
        }
    }

    /// Acquire a handle, reusing an idle one if available, otherwise
    /// constructing a new one via `create`.
    ///
    /// Returns `Ok(None)` when every handle is already in use; the cap is
    /// the caller's degradation point (truncate, don't error), and the pool
    /// enforces it regardless of what the caller checked first.
    pub fn acquire_with<F>(&mut self, create: F) -> Result<Option<H>>
    where
        F: FnOnce() -> Result<H>,
    {
        if let Some(handle) = self.free.pop() {
            self.in_use += 1;
            self.stats.recycled += 1;
            return Ok(Some(handle));
        }

        if self.in_use >= self.max_size {
            return Ok(None);
        }

        let handle = create()?;
        self.in_use += 1;
        self.stats.created += 1;
        Ok(Some(handle))
    }

    /// Return a handle to the free list. If the free list is already at
    /// capacity the handle is handed back to the caller for destruction.
    #[must_use = "an overflow handle must be destroyed by the presenter"]
    pub fn release(&mut self, handle: H) -> Option<H> {
        self.in_use = self.in_use.saturating_sub(1);
        if self.free.len() < self.max_size {
            self.free.push(handle);
            None
        } else {
            self.stats.destroyed += 1;
            Some(handle)
        }
    }

    /// Construct up to `batch` spare handles ahead of demand.
    ///
    /// Stops early when the pool reaches capacity; returns how many were
    /// actually created.
    pub fn prewarm_with<F>(&mut self, batch: usize, mut create: F) -> Result<usize>
    where
        F: FnMut() -> Result<H>,
    {
        let mut made = 0;
        while made < batch && self.live() < self.max_size {
            self.free.push(create()?);
            self.stats.created += 1;
            made += 1;
        }
        Ok(made)
    }

    /// Empty the free list, handing every pooled handle to the caller for
    /// destruction. In-flight handles are unaffected.
    pub fn drain(&mut self) -> Vec<H> {
        self.stats.destroyed += self.free.len() as u64;
        std::mem::take(&mut self.free)
    }

    /// True when no idle handle exists and no new one may be constructed.
    pub fn is_exhausted(&self) -> bool {
        self.free.is_empty() && self.in_use >= self.max_size
    }

    /// Live handles: free plus in use.
    pub fn live(&self) -> usize {
        self.free.len() + self.in_use
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn in_use(&self) -> usize {
        self.in_use
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make() -> Result<u32> {
        Ok(0)
    }

    #[test]
    fn test_acquire_reuses_before_creating() {
        let mut pool: ComponentPool<u32> = ComponentPool::new(4);
        let h = pool.acquire_with(make).unwrap().unwrap();
        assert_eq!(pool.stats().created, 1);

        assert!(pool.release(h).is_none());
        let _h = pool.acquire_with(make).unwrap().unwrap();
        assert_eq!(pool.stats().recycled, 1);
        assert_eq!(pool.stats().created, 1);
    }

    #[test]
    fn test_acquire_refuses_at_capacity() {
        let mut pool: ComponentPool<u32> = ComponentPool::new(2);
        let _a = pool.acquire_with(make).unwrap().unwrap();
        let _b = pool.acquire_with(make).unwrap().unwrap();

        // At capacity the pool itself says no; the factory is never called.
        assert!(pool.acquire_with(|| panic!("factory called")).unwrap().is_none());
        assert_eq!(pool.stats().created, 2);
        assert_eq!(pool.live(), 2);
    }

    #[test]
    fn test_pool_never_exceeds_max_size() {
        let mut pool: ComponentPool<u32> = ComponentPool::new(3);
        let handles: Vec<u32> = (0..3)
            .map(|_| pool.acquire_with(make).unwrap().unwrap())
            .collect();
        assert!(pool.is_exhausted());

        let mut overflowed = 0;
        for h in handles {
            if pool.release(h).is_some() {
                overflowed += 1;
            }
        }
        // All three fit back on the free list.
        assert_eq!(overflowed, 0);
        assert_eq!(pool.free_count(), 3);
        assert!(pool.live() <= pool.max_size());
    }

    #[test]
    fn test_overflow_release_hands_handle_back() {
        let mut pool: ComponentPool<u32> = ComponentPool::new(2);
        let a = pool.acquire_with(make).unwrap().unwrap();
        let b = pool.acquire_with(make).unwrap().unwrap();
        assert!(pool.release(a).is_none());
        assert!(pool.release(b).is_none());

        // Free list is full; a foreign release overflows.
        assert!(pool.release(99).is_some());
        assert_eq!(pool.stats().destroyed, 1);
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn test_prewarm_respects_capacity() {
        let mut pool: ComponentPool<u32> = ComponentPool::new(5);
        assert_eq!(pool.prewarm_with(3, make).unwrap(), 3);
        assert_eq!(pool.prewarm_with(10, make).unwrap(), 2);
        assert_eq!(pool.free_count(), 5);
        assert_eq!(pool.prewarm_with(1, make).unwrap(), 0);
    }

    #[test]
    fn test_drain_empties_free_list() {
        let mut pool: ComponentPool<u32> = ComponentPool::new(4);
        pool.prewarm_with(4, make).unwrap();
        let drained = pool.drain();
        assert_eq!(drained.len(), 4);
        assert_eq!(pool.free_count(), 0);
        assert_eq!(pool.stats().destroyed, 4);
    }
}
