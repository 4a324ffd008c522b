//! Embedded marker clustering and viewport-virtualization engine for
//! interactive maps.
//!
//! Given a wholesale snapshot of point entities and a stream of camera
//! changes, the engine decides which entities are visible and how they are
//! represented (aggregated clusters while zoomed out, individual pooled
//! markers once zoomed in) while bounding cost through quadtree indexing,
//! viewport virtualization and UI-handle pooling.
//!
//! The engine has no rendering backend of its own. It drives the
//! presentation layer through the [`MarkerPresenter`] callbacks and reads
//! camera state the host forwards from its map engine, so the core is fully
//! testable with a fake presenter.
//!
//! ```rust
//! use cartomark::{Entity, MarkerEngine, MarkerPresenter, Result, ViewportBounds};
//! use std::time::Instant;
//!
//! struct Console;
//! impl MarkerPresenter for Console {
//!     type Handle = ();
//!     fn create_handle(&mut self) -> Result<()> { Ok(()) }
//!     fn attach(&mut self, _: &mut (), _: &Entity) -> Result<()> { Ok(()) }
//!     fn detach(&mut self, _: &mut (), _: &str) -> Result<()> { Ok(()) }
//!     fn reset(&mut self, _: &mut ()) {}
//!     fn destroy(&mut self, _: ()) {}
//! }
//!
//! let mut engine = MarkerEngine::new(Console);
//! engine.set_entities(vec![
//!     Entity::new("car-1", -74.0060, 40.7128).with_price(59.0),
//!     Entity::new("car-2", -73.9857, 40.7484).with_price(89.0),
//! ]);
//!
//! engine.report_viewport_change(ViewportBounds::new(40.8, 40.6, -73.9, -74.1), 12.0);
//! engine.on_frame(Instant::now())?;
//! assert_eq!(engine.visible_entity_ids().len(), 2);
//! # Ok::<(), cartomark::CartomarkError>(())
//! ```

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod mode;
pub mod pool;
pub mod quadtree;
pub mod scheduler;
pub mod types;
pub mod validation;
pub mod viewport;
pub mod visibility;

pub use builder::EngineBuilder;
pub use config::EngineConfig;
pub use engine::{FrameOutcome, MarkerEngine, UpdateSummary};
pub use error::{CartomarkError, Result};
pub use lifecycle::{MarkerLifecycleManager, MarkerPresenter, ReconcileStats};
pub use mode::{ModeChange, ModeSelector, RenderMode};
pub use pool::{ComponentPool, PoolStats};
pub use quadtree::QuadTree;
pub use scheduler::{Due, UpdateScheduler};
pub use types::{
    AvailabilityStatus, EngineStats, Entity, EntityMeta, SnapshotSummary, ViewportBounds,
};
pub use viewport::ViewportTracker;

pub use geo::{Point, Rect};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{
        AvailabilityStatus, CartomarkError, EngineBuilder, EngineConfig, Entity, EntityMeta,
        FrameOutcome, MarkerEngine, MarkerPresenter, RenderMode, Result, ViewportBounds,
    };

    pub use std::time::{Duration, Instant};
}
