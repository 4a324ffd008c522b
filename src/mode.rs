//! Representation-mode selection.
//!
//! One explicit state machine instead of cooperating boolean flags: the
//! desired mode is a pure function of entity count and zoom, and a
//! transition happens only when the desired mode differs from the current
//! one. That single equality check is the hysteresis rule: re-evaluating at
//! an unchanged zoom and count is a no-op, so markers are never torn down
//! and recreated redundantly frame after frame.

use crate::config::EngineConfig;
use serde::{Deserialize, Serialize};

/// How the current snapshot should be represented on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Small dataset: every entity is an individual marker, no cap.
    Scan,
    /// Large dataset while zoomed out: aggregated clusters, drawn by the
    /// external map engine from the full snapshot.
    Clustered,
    /// Individual markers for the visible set only, capped at the
    /// configured maximum.
    VirtualizedIndividual,
}

/// A committed mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub from: Option<RenderMode>,
    pub to: RenderMode,
}

/// Tracks the current representation mode across updates.
#[derive(Debug, Default)]
pub struct ModeSelector {
    current: Option<RenderMode>,
}

impl ModeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mode a dataset of `entity_count` at `zoom` should be in.
    pub fn desired(entity_count: usize, zoom: f64, config: &EngineConfig) -> RenderMode {
        if entity_count >= config.clustering_threshold {
            if zoom <= config.cluster_dissolve_zoom {
                RenderMode::Clustered
            } else {
                RenderMode::VirtualizedIndividual
            }
        } else if entity_count >= config.virtualization_threshold {
            RenderMode::VirtualizedIndividual
        } else {
            RenderMode::Scan
        }
    }

    /// Evaluate the desired mode and commit it, reporting the change if and
    /// only if the mode actually moved.
    pub fn evaluate(
        &mut self,
        entity_count: usize,
        zoom: f64,
        config: &EngineConfig,
    ) -> Option<ModeChange> {
        let desired = Self::desired(entity_count, zoom, config);
        if self.current == Some(desired) {
            return None;
        }
        let change = ModeChange {
            from: self.current,
            to: desired,
        };
        self.current = Some(desired);
        Some(change)
    }

    pub fn current(&self) -> Option<RenderMode> {
        self.current
    }
}
