//! Engine configuration.
//!
//! All tunables live in one serializable struct so a host application can
//! load them from JSON alongside the rest of its settings while keeping
//! sensible defaults for everything it does not mention.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Marker engine configuration.
///
/// # Example
///
/// ```rust
/// use cartomark::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.max_visible_markers, 500);
///
/// // Load from JSON, defaulting everything that is omitted
/// let json = r#"{
///     "max_visible_markers": 250,
///     "cluster_dissolve_zoom": 15.0
/// }"#;
/// let config = EngineConfig::from_json(json).unwrap();
/// assert_eq!(config.max_visible_markers, 250);
/// assert_eq!(config.virtualization_threshold, 1000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Entity count at or above which the dataset is represented as
    /// aggregated clusters (while zoomed out).
    #[serde(default = "EngineConfig::default_clustering_threshold")]
    pub clustering_threshold: usize,

    /// Entity count at or above which the quadtree is built and the visible
    /// set is capped. Below it a linear scan is cheaper than rebuilding an
    /// index on every snapshot change.
    #[serde(default = "EngineConfig::default_virtualization_threshold")]
    pub virtualization_threshold: usize,

    /// Hard cap on individually rendered markers per pass.
    #[serde(default = "EngineConfig::default_max_visible_markers")]
    pub max_visible_markers: usize,

    /// Zoom level above which clusters dissolve into individual markers.
    #[serde(default = "EngineConfig::default_cluster_dissolve_zoom")]
    pub cluster_dissolve_zoom: f64,

    /// Zoom level above which visible entities are ordered by distance from
    /// the viewport center, so truncation keeps the nearest ones.
    #[serde(default = "EngineConfig::default_distance_sort_zoom")]
    pub distance_sort_zoom: f64,

    /// Fraction by which the viewport rectangle is expanded before querying,
    /// so off-screen-but-near entities are pre-rendered.
    #[serde(default = "EngineConfig::default_viewport_buffer")]
    pub viewport_buffer: f64,

    /// Points a quadtree node holds before subdividing.
    #[serde(default = "EngineConfig::default_quadtree_node_capacity")]
    pub quadtree_node_capacity: usize,

    /// Padding (degrees) added around the snapshot's bounding box when the
    /// index is built, so edge points survive floating-point rounding.
    #[serde(default = "EngineConfig::default_index_padding_degrees")]
    pub index_padding_degrees: f64,

    /// Upper bound on pooled marker handles (free + in use).
    #[serde(default = "EngineConfig::default_max_pool_size")]
    pub max_pool_size: usize,

    /// Minimum interval between two applied updates during a continuous
    /// pan/zoom gesture.
    #[serde(default = "EngineConfig::default_update_cooldown_ms")]
    pub update_cooldown_ms: u64,

    /// Handles created per idle-time prewarm tick.
    #[serde(default = "EngineConfig::default_prewarm_batch")]
    pub prewarm_batch: usize,
}

impl EngineConfig {
    const fn default_clustering_threshold() -> usize {
        500
    }

    const fn default_virtualization_threshold() -> usize {
        1000
    }

    const fn default_max_visible_markers() -> usize {
        500
    }

    const fn default_cluster_dissolve_zoom() -> f64 {
        14.0
    }

    const fn default_distance_sort_zoom() -> f64 {
        12.0
    }

    const fn default_viewport_buffer() -> f64 {
        0.10
    }

    const fn default_quadtree_node_capacity() -> usize {
        4
    }

    const fn default_index_padding_degrees() -> f64 {
        0.01
    }

    const fn default_max_pool_size() -> usize {
        600
    }

    const fn default_update_cooldown_ms() -> u64 {
        300
    }

    const fn default_prewarm_batch() -> usize {
        16
    }

    /// Parse a configuration from JSON, applying defaults for omitted fields.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.warn_on_extremes())
    }

    pub fn with_clustering_threshold(mut self, threshold: usize) -> Self {
        self.clustering_threshold = threshold;
        self
    }

    pub fn with_virtualization_threshold(mut self, threshold: usize) -> Self {
        self.virtualization_threshold = threshold;
        self
    }

    pub fn with_max_visible_markers(mut self, max: usize) -> Self {
        assert!(max > 0, "max_visible_markers must be greater than zero");
        self.max_visible_markers = max;
        self
    }

    pub fn with_cluster_dissolve_zoom(mut self, zoom: f64) -> Self {
        self.cluster_dissolve_zoom = zoom;
        self
    }

    pub fn with_viewport_buffer(mut self, buffer: f64) -> Self {
        assert!(
            buffer >= 0.0 && buffer.is_finite(),
            "viewport_buffer must be a finite non-negative fraction"
        );
        self.viewport_buffer = buffer;
        self
    }

    pub fn with_max_pool_size(mut self, max: usize) -> Self {
        assert!(max > 0, "max_pool_size must be greater than zero");
        self.max_pool_size = max;
        self
    }

    pub fn with_update_cooldown(mut self, cooldown: Duration) -> Self {
        self.update_cooldown_ms = cooldown.as_millis() as u64;
        self
    }

    /// Scheduler cooldown as a [`Duration`].
    pub fn update_cooldown(&self) -> Duration {
        Duration::from_millis(self.update_cooldown_ms)
    }

    fn warn_on_extremes(self) -> Self {
        if self.max_pool_size > 10_000 {
            log::warn!(
                "max_pool_size of {} is very large; each pooled handle keeps a \
                live presentation element alive",
                self.max_pool_size
            );
        }
        if self.max_visible_markers > self.max_pool_size {
            log::warn!(
                "max_visible_markers ({}) exceeds max_pool_size ({}); the pool \
                cap will truncate the visible set first",
                self.max_visible_markers,
                self.max_pool_size
            );
        }
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clustering_threshold: Self::default_clustering_threshold(),
            virtualization_threshold: Self::default_virtualization_threshold(),
            max_visible_markers: Self::default_max_visible_markers(),
            cluster_dissolve_zoom: Self::default_cluster_dissolve_zoom(),
            distance_sort_zoom: Self::default_distance_sort_zoom(),
            viewport_buffer: Self::default_viewport_buffer(),
            quadtree_node_capacity: Self::default_quadtree_node_capacity(),
            index_padding_degrees: Self::default_index_padding_degrees(),
            max_pool_size: Self::default_max_pool_size(),
            update_cooldown_ms: Self::default_update_cooldown_ms(),
            prewarm_batch: Self::default_prewarm_batch(),
        }
    }
}
