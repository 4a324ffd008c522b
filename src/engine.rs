//! The assembled marker engine.
//!
//! Data flow per update: camera bounds and zoom arrive from the external
//! map engine, the scheduler coalesces them, the viewport tracker is
//! updated, the resolver queries the quadtree (or linear-scans small
//! snapshots), the mode selector picks the representation strategy, and the
//! lifecycle manager diffs against the previous visible set, acquiring and
//! releasing pooled handles through the presenter callbacks.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::lifecycle::{MarkerLifecycleManager, MarkerPresenter, ReconcileStats};
use crate::mode::{ModeChange, ModeSelector, RenderMode};
use crate::quadtree::QuadTree;
use crate::scheduler::{Due, UpdateScheduler};
use crate::types::{Entity, EngineStats, SnapshotSummary, ViewportBounds};
use crate::validation::{validate_entity, validate_viewport, validate_zoom};
use crate::viewport::ViewportTracker;
use crate::visibility;
use rustc_hash::FxHashSet;
use std::time::{Duration, Instant};

/// Result of one applied update pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Mode the pass rendered in.
    pub mode: RenderMode,
    /// Set when this pass crossed a mode boundary.
    pub mode_change: Option<ModeChange>,
    /// Marker churn of the reconciliation.
    pub reconcile: ReconcileStats,
    /// Size of the visible set after the pass.
    pub visible: usize,
}

/// What a frame callback produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No update was pending.
    Idle,
    /// An update is pending but the cooldown has not elapsed; poll again
    /// after the given delay.
    Deferred(Duration),
    /// An update was applied.
    Applied(UpdateSummary),
}

/// Marker rendering engine over a presenter implementation.
///
/// Single-threaded and host-driven: the embedding application forwards
/// camera events to [`report_viewport_change`](Self::report_viewport_change)
/// and calls [`on_frame`](Self::on_frame) from its frame callback. All state
/// is instance-owned, so independent map views run independent engines.
#[derive(Debug)]
pub struct MarkerEngine<P: MarkerPresenter> {
    presenter: P,
    config: EngineConfig,
    entities: Vec<Entity>,
    index: Option<QuadTree>,
    viewport: ViewportTracker,
    selector: ModeSelector,
    lifecycle: MarkerLifecycleManager<P::Handle>,
    scheduler: UpdateScheduler,
    stats: EngineStats,
}

impl<P: MarkerPresenter> MarkerEngine<P> {
    pub fn new(presenter: P) -> Self {
        Self::with_config(presenter, EngineConfig::default())
    }

    pub fn with_config(presenter: P, config: EngineConfig) -> Self {
        let viewport = ViewportTracker::world(config.viewport_buffer);
        let lifecycle = MarkerLifecycleManager::new(config.max_pool_size);
        let scheduler = UpdateScheduler::new(config.update_cooldown());
        Self {
            presenter,
            config,
            entities: Vec::new(),
            index: None,
            viewport,
            selector: ModeSelector::new(),
            lifecycle,
            scheduler,
            stats: EngineStats::default(),
        }
    }

    /// Replace the entity snapshot wholesale.
    ///
    /// Entities with invalid geometry or duplicate ids are skipped with a
    /// warning rather than aborting the ingest. The quadtree is rebuilt when
    /// the accepted count reaches the virtualization threshold and dropped
    /// when it falls below; rebuild is cheaper than incremental removal
    /// under snapshot-replace semantics. An update with the current viewport
    /// is scheduled so the next frame reflects the new data.
    pub fn set_entities(&mut self, snapshot: Vec<Entity>) -> SnapshotSummary {
        let mut accepted = Vec::with_capacity(snapshot.len());
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut skipped = 0usize;

        for entity in snapshot {
            if let Err(err) = validate_entity(&entity) {
                log::warn!("Skipping entity '{}': {}", entity.id, err);
                skipped += 1;
                continue;
            }
            if !seen.insert(entity.id.clone()) {
                log::warn!("Skipping duplicate entity id '{}'", entity.id);
                skipped += 1;
                continue;
            }
            accepted.push(entity);
        }

        self.entities = accepted;
        self.index = if self.entities.len() >= self.config.virtualization_threshold {
            QuadTree::from_entities(
                &self.entities,
                self.config.quadtree_node_capacity,
                self.config.index_padding_degrees,
            )
        } else {
            None
        };

        self.stats.snapshots += 1;
        self.stats.entities_skipped += skipped as u64;

        // Re-render on the next frame. A pending camera event is newer than
        // the tracker state and already forces a pass over the new snapshot,
        // so it must not be overwritten with the last-applied viewport.
        if !self.scheduler.has_pending() {
            self.scheduler
                .schedule(self.viewport.bounds(), self.viewport.zoom());
        }

        SnapshotSummary {
            accepted: self.entities.len(),
            skipped,
            indexed: self.index.is_some(),
        }
    }

    /// Forward a camera-change notification from the map engine.
    ///
    /// Returns `true` when the host should request a frame callback. A
    /// degenerate viewport is skipped and logged; it never aborts the
    /// pipeline.
    pub fn report_viewport_change(&mut self, bounds: ViewportBounds, zoom: f64) -> bool {
        if let Err(err) = validate_viewport(&bounds).and_then(|_| validate_zoom(zoom)) {
            log::warn!("Ignoring camera change: {}", err);
            return false;
        }
        self.scheduler.schedule(bounds, zoom)
    }

    /// Run the update pipeline from the host's frame callback.
    ///
    /// At most one recomputation happens per call, using only the most
    /// recently reported viewport. Presenter failures propagate; the next
    /// frame or snapshot refresh retries reconciliation.
    pub fn on_frame(&mut self, now: Instant) -> Result<FrameOutcome> {
        match self.scheduler.take_due(now) {
            Due::Idle => Ok(FrameOutcome::Idle),
            Due::Cooldown(wait) => Ok(FrameOutcome::Deferred(wait)),
            Due::Ready { bounds, zoom } => {
                let summary = self.apply_update(bounds, zoom)?;
                Ok(FrameOutcome::Applied(summary))
            }
        }
    }

    fn apply_update(&mut self, bounds: ViewportBounds, zoom: f64) -> Result<UpdateSummary> {
        self.viewport.update(bounds, zoom)?;

        let mode_change = self
            .selector
            .evaluate(self.entities.len(), zoom, &self.config);
        // evaluate() always commits a mode on first use.
        let mode = self.selector.current().unwrap_or(RenderMode::Scan);

        let visible: Vec<&Entity> = match mode {
            // Clusters are drawn by the external map engine from the full
            // snapshot; no individual markers remain.
            RenderMode::Clustered => Vec::new(),
            RenderMode::Scan => self.entities.iter().collect(),
            RenderMode::VirtualizedIndividual => {
                let slots = visibility::resolve(
                    &self.entities,
                    &self.viewport,
                    self.index.as_ref(),
                    &self.config,
                );
                slots
                    .into_iter()
                    .take(self.config.max_visible_markers)
                    .map(|slot| &self.entities[slot as usize])
                    .collect()
            }
        };

        let reconcile = self.lifecycle.reconcile(&mut self.presenter, &visible)?;

        self.stats.updates_applied += 1;
        self.stats.last_visible = self.lifecycle.visible_ids().len();

        Ok(UpdateSummary {
            mode,
            mode_change,
            reconcile,
            visible: self.stats.last_visible,
        })
    }

    /// Idle-time pool prewarming.
    ///
    /// Creates at most one configured batch of spare handles per call, and
    /// skips entirely for small datasets where warming is not worth it. Call
    /// from an idle callback, never from the frame path.
    pub fn on_idle(&mut self) -> Result<usize> {
        if self.entities.len() < self.config.clustering_threshold {
            return Ok(0);
        }
        self.lifecycle
            .prewarm(&mut self.presenter, self.config.prewarm_batch)
    }

    /// Detach all markers and destroy every pooled handle.
    pub fn teardown(&mut self) -> Result<()> {
        self.scheduler.cancel();
        self.lifecycle.teardown(&mut self.presenter)
    }

    /// Ids currently rendered, in priority order.
    pub fn visible_entity_ids(&self) -> &[String] {
        self.lifecycle.visible_ids()
    }

    /// Mode of the most recent update, if one has run.
    pub fn current_mode(&self) -> Option<RenderMode> {
        self.selector.current()
    }

    /// The full snapshot, for the external clustering engine to aggregate.
    pub fn cluster_source(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Whether the current snapshot is served by a quadtree.
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    pub fn has_pending_update(&self) -> bool {
        self.scheduler.has_pending()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}
