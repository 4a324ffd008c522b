//! Engine builder for flexible configuration.

use crate::config::EngineConfig;
use crate::engine::MarkerEngine;
use crate::lifecycle::MarkerPresenter;
use std::time::Duration;

/// Builder for a [`MarkerEngine`] with non-default tuning.
///
/// # Example
///
/// ```rust
/// use cartomark::{EngineBuilder, MarkerPresenter, Entity, Result};
///
/// struct Null;
/// impl MarkerPresenter for Null {
///     type Handle = ();
///     fn create_handle(&mut self) -> Result<()> { Ok(()) }
///     fn attach(&mut self, _: &mut (), _: &Entity) -> Result<()> { Ok(()) }
///     fn detach(&mut self, _: &mut (), _: &str) -> Result<()> { Ok(()) }
///     fn reset(&mut self, _: &mut ()) {}
///     fn destroy(&mut self, _: ()) {}
/// }
///
/// let engine = EngineBuilder::new()
///     .max_visible_markers(250)
///     .build(Null);
/// assert_eq!(engine.config().max_visible_markers, 250);
/// ```
#[derive(Debug, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_visible_markers(mut self, max: usize) -> Self {
        self.config = self.config.with_max_visible_markers(max);
        self
    }

    pub fn clustering_threshold(mut self, threshold: usize) -> Self {
        self.config = self.config.with_clustering_threshold(threshold);
        self
    }

    pub fn virtualization_threshold(mut self, threshold: usize) -> Self {
        self.config = self.config.with_virtualization_threshold(threshold);
        self
    }

    pub fn max_pool_size(mut self, max: usize) -> Self {
        self.config = self.config.with_max_pool_size(max);
        self
    }

    pub fn update_cooldown(mut self, cooldown: Duration) -> Self {
        self.config = self.config.with_update_cooldown(cooldown);
        self
    }

    /// Build the engine over the given presenter.
    pub fn build<P: MarkerPresenter>(self, presenter: P) -> MarkerEngine<P> {
        MarkerEngine::with_config(presenter, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_applies_tuning() {
        let builder = EngineBuilder::new()
            .clustering_threshold(50)
            .update_cooldown(Duration::from_millis(100));
        assert_eq!(builder.config.clustering_threshold, 50);
        assert_eq!(builder.config.update_cooldown_ms, 100);
    }
}
