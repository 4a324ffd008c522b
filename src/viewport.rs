//! Tracking of the currently visible map region.

use crate::error::Result;
use crate::types::ViewportBounds;
use crate::validation::{validate_viewport, validate_zoom};
use geo::{Rect, coord};

/// Holds the current camera bounds, zoom level and expansion buffer.
///
/// Mutated only by the update pipeline in response to camera-change
/// notifications from the external map engine; everything downstream reads
/// from it.
#[derive(Debug, Clone)]
pub struct ViewportTracker {
    bounds: ViewportBounds,
    zoom: f64,
    buffer: f64,
}

impl ViewportTracker {
    /// Create a tracker with an initial viewport.
    pub fn new(bounds: ViewportBounds, zoom: f64, buffer: f64) -> Result<Self> {
        validate_viewport(&bounds)?;
        validate_zoom(zoom)?;
        Ok(Self {
            bounds,
            zoom,
            buffer,
        })
    }

    /// Whole-world viewport at zoom 0, used before the first camera event.
    pub fn world(buffer: f64) -> Self {
        Self {
            bounds: ViewportBounds::new(90.0, -90.0, 180.0, -180.0),
            zoom: 0.0,
            buffer,
        }
    }

    /// Replace the tracked camera state.
    pub fn update(&mut self, bounds: ViewportBounds, zoom: f64) -> Result<()> {
        validate_viewport(&bounds)?;
        validate_zoom(zoom)?;
        self.bounds = bounds;
        self.zoom = zoom;
        Ok(())
    }

    pub fn bounds(&self) -> ViewportBounds {
        self.bounds
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// The buffered rectangle used for visibility queries.
    pub fn expanded(&self) -> ViewportBounds {
        self.bounds.expanded(self.buffer)
    }

    /// Buffered rectangle as a `geo` rect (x = longitude, y = latitude).
    pub fn query_rect(&self) -> Rect<f64> {
        let b = self.expanded();
        Rect::new(
            coord! { x: b.west, y: b.south },
            coord! { x: b.east, y: b.north },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_replaces_state() {
        let mut tracker = ViewportTracker::world(0.1);
        assert_eq!(tracker.zoom(), 0.0);

        let vp = ViewportBounds::new(41.0, 40.0, -73.0, -74.0);
        tracker.update(vp, 12.0).unwrap();
        assert_eq!(tracker.zoom(), 12.0);
        assert_eq!(tracker.bounds(), vp);
    }

    #[test]
    fn test_degenerate_update_rejected_and_state_kept() {
        let mut tracker = ViewportTracker::world(0.1);
        let bad = ViewportBounds::new(40.0, 41.0, -73.0, -74.0);
        assert!(tracker.update(bad, 12.0).is_err());
        // Previous state survives a rejected update.
        assert_eq!(tracker.zoom(), 0.0);
    }

    #[test]
    fn test_query_rect_is_buffered() {
        let vp = ViewportBounds::new(41.0, 40.0, -73.0, -74.0);
        let tracker = ViewportTracker::new(vp, 12.0, 0.1).unwrap();
        let rect = tracker.query_rect();
        assert!(rect.min().y < 40.0);
        assert!(rect.max().y > 41.0);
        assert!(rect.min().x < -74.0);
        assert!(rect.max().x > -73.0);
    }
}
