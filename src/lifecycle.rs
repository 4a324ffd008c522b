//! Marker lifecycle reconciliation.
//!
//! Diffs the previously visible set against the newly resolved one and
//! applies the minimal add/remove delta through the presentation layer:
//! exactly one release per disappeared id, exactly one acquire per appeared
//! id, nothing for ids that stayed. All per-marker state is owned here,
//! keyed by entity id; multiple engine instances never share anything.

use crate::error::Result;
use crate::pool::ComponentPool;
use crate::types::Entity;
use rustc_hash::{FxHashMap, FxHashSet};

/// Presentation-layer capability interface.
///
/// The engine drives rendering exclusively through these callbacks, so the
/// core algorithms are testable without a real map backend; a fake
/// recording implementation suffices.
///
/// Errors from `attach`/`detach` are propagated out of `reconcile`, never
/// swallowed: a stuck attach is a user-visible defect. After a failed
/// attach the handle is still considered in use, so it cannot leak back to
/// the pool in an inconsistent state; the next reconciliation retries.
pub trait MarkerPresenter {
    /// Opaque UI-element handle (a DOM marker, a sprite, a test double).
    type Handle;

    /// Construct a fresh, unbound handle.
    fn create_handle(&mut self) -> Result<Self::Handle>;

    /// Bind the handle to an entity and attach it to the map.
    fn attach(&mut self, handle: &mut Self::Handle, entity: &Entity) -> Result<()>;

    /// Detach the handle from the map.
    ///
    /// May be called for a handle whose earlier `attach` failed: the engine
    /// keeps such a handle bound and detaches it when its entity leaves the
    /// visible set. Implementations must treat detaching a never-attached
    /// handle as a no-op rather than an error.
    fn detach(&mut self, handle: &mut Self::Handle, entity_id: &str) -> Result<()>;

    /// Reset bound state before the handle goes back on the free list.
    fn reset(&mut self, handle: &mut Self::Handle);

    /// Destroy a handle the pool can no longer hold.
    fn destroy(&mut self, handle: Self::Handle);
}

/// Counters for one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileStats {
    /// Markers newly attached this pass.
    pub attached: usize,
    /// Markers detached this pass.
    pub detached: usize,
    /// Ids present in both the previous and the new visible set.
    pub retained: usize,
    /// Ids dropped because the pool was exhausted (designed degradation,
    /// lowest-priority entities go first).
    pub truncated: usize,
}

/// Owns the visible set, the id-to-handle binding and the handle pool.
#[derive(Debug)]
pub struct MarkerLifecycleManager<H> {
    visible: Vec<String>,
    bound: FxHashMap<String, H>,
    pool: ComponentPool<H>,
}

impl<H> MarkerLifecycleManager<H> {
    pub fn new(max_pool_size: usize) -> Self {
        Self {
            visible: Vec::new(),
            bound: FxHashMap::default(),
            pool: ComponentPool::new(max_pool_size),
        }
    }

    /// Reconcile the rendered markers against `next`, the newly resolved
    /// visible set in priority order.
    ///
    /// Guarantees: an entity never holds two live handles, a handle is never
    /// attached to two entities, and unchanged ids cause no presenter
    /// traffic at all.
    pub fn reconcile<P>(&mut self, presenter: &mut P, next: &[&Entity]) -> Result<ReconcileStats>
    where
        P: MarkerPresenter<Handle = H>,
    {
        let mut stats = ReconcileStats::default();
        let result = self.apply(presenter, next, &mut stats);
        // Whatever happened, `visible` must mirror the bound map so a failed
        // pass leaves consistent state for the retry.
        self.sync_visible(next);
        result.map(|_| stats)
    }

    fn apply<P>(
        &mut self,
        presenter: &mut P,
        next: &[&Entity],
        stats: &mut ReconcileStats,
    ) -> Result<()>
    where
        P: MarkerPresenter<Handle = H>,
    {
        let next_ids: FxHashSet<&str> = next.iter().map(|e| e.id.as_str()).collect();

        // Phase 1: detach and release everything that left the visible set.
        let to_remove: Vec<String> = self
            .visible
            .iter()
            .filter(|id| !next_ids.contains(id.as_str()))
            .cloned()
            .collect();

        for id in to_remove {
            let Some(mut handle) = self.bound.remove(&id) else {
                continue;
            };
            if let Err(err) = presenter.detach(&mut handle, &id) {
                // Still attached as far as we know; keep it bound.
                self.bound.insert(id, handle);
                return Err(err);
            }
            presenter.reset(&mut handle);
            if let Some(overflow) = self.pool.release(handle) {
                presenter.destroy(overflow);
            }
            stats.detached += 1;
        }

        // Phase 2: acquire and attach newcomers, in priority order, until
        // the pool budget runs out.
        for entity in next {
            if self.bound.contains_key(&entity.id) {
                stats.retained += 1;
                continue;
            }

            let Some(mut handle) = self.pool.acquire_with(|| presenter.create_handle())? else {
                stats.truncated += 1;
                continue;
            };
            let attached = presenter.attach(&mut handle, entity);
            // In use either way; a half-attached handle must not reach the
            // free list.
            self.bound.insert(entity.id.clone(), handle);
            attached?;
            stats.attached += 1;
        }

        if stats.truncated > 0 {
            log::debug!(
                "Marker pool exhausted; {} lowest-priority entities not rendered this pass",
                stats.truncated
            );
        }

        Ok(())
    }

    /// Rebuild `visible` from the bound map, preferring the order of `next`
    /// and keeping any stragglers a failed pass left behind.
    fn sync_visible(&mut self, next: &[&Entity]) {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut visible = Vec::with_capacity(self.bound.len());
        for entity in next {
            if self.bound.contains_key(&entity.id) && seen.insert(entity.id.as_str()) {
                visible.push(entity.id.clone());
            }
        }
        for id in &self.visible {
            if self.bound.contains_key(id) && !visible.contains(id) {
                visible.push(id.clone());
            }
        }
        self.visible = visible;
    }

    /// Detach every live marker and destroy all pooled handles.
    pub fn teardown<P>(&mut self, presenter: &mut P) -> Result<()>
    where
        P: MarkerPresenter<Handle = H>,
    {
        self.reconcile(presenter, &[])?;
        for handle in self.pool.drain() {
            presenter.destroy(handle);
        }
        Ok(())
    }

    /// Ids currently rendered, in priority order.
    pub fn visible_ids(&self) -> &[String] {
        &self.visible
    }

    /// Number of markers with a live handle.
    pub fn live_markers(&self) -> usize {
        self.bound.len()
    }

    pub fn pool(&self) -> &ComponentPool<H> {
        &self.pool
    }

    /// Idle-time pool prewarming; see [`ComponentPool::prewarm_with`].
    pub fn prewarm<P>(&mut self, presenter: &mut P, batch: usize) -> Result<usize>
    where
        P: MarkerPresenter<Handle = H>,
    {
        self.pool.prewarm_with(batch, || presenter.create_handle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CartomarkError;

    /// Recording fake presenter; handles are plain counters.
    #[derive(Debug, Default)]
    struct FakePresenter {
        created: usize,
        attaches: Vec<String>,
        detaches: Vec<String>,
        destroyed: usize,
        fail_attach_for: Option<String>,
    }

    impl MarkerPresenter for FakePresenter {
        type Handle = usize;

        fn create_handle(&mut self) -> Result<usize> {
            self.created += 1;
            Ok(self.created)
        }

        fn attach(&mut self, _handle: &mut usize, entity: &Entity) -> Result<()> {
            if self.fail_attach_for.as_deref() == Some(entity.id.as_str()) {
                return Err(CartomarkError::presenter("attach", &entity.id, "boom"));
            }
            self.attaches.push(entity.id.clone());
            Ok(())
        }

        fn detach(&mut self, _handle: &mut usize, entity_id: &str) -> Result<()> {
            self.detaches.push(entity_id.to_string());
            Ok(())
        }

        fn reset(&mut self, _handle: &mut usize) {}

        fn destroy(&mut self, _handle: usize) {
            self.destroyed += 1;
        }
    }

    fn entities(ids: &[&str]) -> Vec<Entity> {
        ids.iter().map(|id| Entity::new(*id, 0.0, 0.0)).collect()
    }

    fn refs(entities: &[Entity]) -> Vec<&Entity> {
        entities.iter().collect()
    }

    #[test]
    fn test_diff_minimality() {
        let mut presenter = FakePresenter::default();
        let mut manager: MarkerLifecycleManager<usize> = MarkerLifecycleManager::new(16);

        let a = entities(&["1", "2", "3"]);
        let stats = manager.reconcile(&mut presenter, &refs(&a)).unwrap();
        assert_eq!(stats.attached, 3);
        assert_eq!(stats.detached, 0);

        // B = {2, 3, 4}: exactly one attach, exactly one detach.
        let b = entities(&["2", "3", "4"]);
        let stats = manager.reconcile(&mut presenter, &refs(&b)).unwrap();
        assert_eq!(stats.attached, 1);
        assert_eq!(stats.detached, 1);
        assert_eq!(stats.retained, 2);
        assert_eq!(presenter.attaches, vec!["1", "2", "3", "4"]);
        assert_eq!(presenter.detaches, vec!["1"]);
    }

    #[test]
    fn test_unchanged_set_is_a_no_op() {
        let mut presenter = FakePresenter::default();
        let mut manager: MarkerLifecycleManager<usize> = MarkerLifecycleManager::new(16);

        let a = entities(&["1", "2"]);
        manager.reconcile(&mut presenter, &refs(&a)).unwrap();
        let before = presenter.attaches.len();

        let stats = manager.reconcile(&mut presenter, &refs(&a)).unwrap();
        assert_eq!(stats.attached, 0);
        assert_eq!(stats.detached, 0);
        assert_eq!(stats.retained, 2);
        assert_eq!(presenter.attaches.len(), before);
    }

    #[test]
    fn test_handles_are_recycled_across_passes() {
        let mut presenter = FakePresenter::default();
        let mut manager: MarkerLifecycleManager<usize> = MarkerLifecycleManager::new(16);

        let a = entities(&["1"]);
        manager.reconcile(&mut presenter, &refs(&a)).unwrap();
        let b = entities(&["2"]);
        manager.reconcile(&mut presenter, &refs(&b)).unwrap();

        // The handle released for "1" served "2"; only one was ever made.
        assert_eq!(presenter.created, 1);
        assert_eq!(manager.pool().stats().recycled, 1);
    }

    #[test]
    fn test_pool_exhaustion_truncates_lowest_priority() {
        let mut presenter = FakePresenter::default();
        let mut manager: MarkerLifecycleManager<usize> = MarkerLifecycleManager::new(2);

        let a = entities(&["1", "2", "3", "4"]);
        let stats = manager.reconcile(&mut presenter, &refs(&a)).unwrap();
        assert_eq!(stats.attached, 2);
        assert_eq!(stats.truncated, 2);
        // Priority order is preserved: the first two ids won.
        assert_eq!(manager.visible_ids(), &["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_attach_failure_keeps_handle_in_use_and_propagates() {
        let mut presenter = FakePresenter {
            fail_attach_for: Some("bad".to_string()),
            ..FakePresenter::default()
        };
        let mut manager: MarkerLifecycleManager<usize> = MarkerLifecycleManager::new(8);

        let a = entities(&["good", "bad"]);
        let err = manager.reconcile(&mut presenter, &refs(&a)).unwrap_err();
        assert!(matches!(err, CartomarkError::Presenter { .. }));

        // The failed handle is still accounted as in use, not pooled.
        assert_eq!(manager.live_markers(), 2);
        assert_eq!(manager.pool().free_count(), 0);

        // The next refresh retries and succeeds.
        presenter.fail_attach_for = None;
        let b = entities(&["good", "bad"]);
        let stats = manager.reconcile(&mut presenter, &refs(&b)).unwrap();
        assert_eq!(stats.retained, 2);
        assert_eq!(stats.attached, 0);
    }

    #[test]
    fn test_failed_attach_handle_is_detached_on_removal() {
        let mut presenter = FakePresenter {
            fail_attach_for: Some("bad".to_string()),
            ..FakePresenter::default()
        };
        let mut manager: MarkerLifecycleManager<usize> = MarkerLifecycleManager::new(8);

        let a = entities(&["bad"]);
        assert!(manager.reconcile(&mut presenter, &refs(&a)).is_err());
        assert_eq!(manager.live_markers(), 1);

        // The entity leaves; its never-attached handle still gets the
        // detach callback, which presenters must tolerate.
        manager.teardown(&mut presenter).unwrap();
        assert_eq!(presenter.detaches, vec!["bad"]);
        assert_eq!(manager.live_markers(), 0);
        assert_eq!(presenter.destroyed, 1);
    }

    #[test]
    fn test_teardown_detaches_and_destroys_everything() {
        let mut presenter = FakePresenter::default();
        let mut manager: MarkerLifecycleManager<usize> = MarkerLifecycleManager::new(8);

        let a = entities(&["1", "2", "3"]);
        manager.reconcile(&mut presenter, &refs(&a)).unwrap();
        manager.teardown(&mut presenter).unwrap();

        assert_eq!(manager.live_markers(), 0);
        assert_eq!(manager.pool().free_count(), 0);
        assert_eq!(presenter.detaches.len(), 3);
        assert_eq!(presenter.destroyed, 3);
    }
}
