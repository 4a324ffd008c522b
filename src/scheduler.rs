//! Coalescing of camera-change bursts into bounded recomputation.
//!
//! Pan and zoom gestures fire camera notifications many times per second.
//! The scheduler keeps only the most recently reported viewport and hands it
//! out at most once per host frame, with a minimum inter-update cooldown on
//! top so recomputation frequency stays bounded independent of frame rate.
//!
//! Scheduling a newer viewport supersedes any pending one; stale
//! intermediate states are never processed, so an older viewport can never
//! be applied over a newer one.

use crate::types::ViewportBounds;
use std::time::{Duration, Instant};

/// The latest not-yet-applied camera state.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingViewport {
    bounds: ViewportBounds,
    zoom: f64,
}

/// What the host should do after polling the scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Due {
    /// Nothing pending.
    Idle,
    /// A pending update exists but the cooldown has not elapsed; poll again
    /// after the given delay.
    Cooldown(Duration),
    /// Apply this viewport now.
    Ready { bounds: ViewportBounds, zoom: f64 },
}

/// Single-threaded cooperative update scheduler.
///
/// The host drives it: [`schedule`](Self::schedule) on every camera event,
/// [`take_due`](Self::take_due) from its frame callback.
#[derive(Debug)]
pub struct UpdateScheduler {
    pending: Option<PendingViewport>,
    generation: u64,
    last_applied: Option<Instant>,
    min_interval: Duration,
}

impl UpdateScheduler {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            pending: None,
            generation: 0,
            last_applied: None,
            min_interval,
        }
    }

    /// Record a camera change, superseding any pending one.
    ///
    /// Returns `true` when the host needs to request a frame callback,
    /// i.e. when no update was already pending. Repeated calls within one
    /// frame coalesce into the single most recent state.
    pub fn schedule(&mut self, bounds: ViewportBounds, zoom: f64) -> bool {
        self.generation += 1;
        let was_idle = self.pending.is_none();
        self.pending = Some(PendingViewport { bounds, zoom });
        was_idle
    }

    /// Poll from the host frame callback.
    ///
    /// Hands out the pending viewport if the cooldown allows, consuming it;
    /// otherwise reports how long to wait.
    pub fn take_due(&mut self, now: Instant) -> Due {
        let Some(pending) = self.pending else {
            return Due::Idle;
        };

        if let Some(last) = self.last_applied {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.min_interval {
                return Due::Cooldown(self.min_interval - elapsed);
            }
        }

        self.pending = None;
        self.last_applied = Some(now);
        Due::Ready {
            bounds: pending.bounds,
            zoom: pending.zoom,
        }
    }

    /// Drop any pending update without applying it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Monotonic count of scheduled camera events.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp(north: f64) -> ViewportBounds {
        ViewportBounds::new(north, north - 1.0, 1.0, 0.0)
    }

    #[test]
    fn test_burst_coalesces_to_latest() {
        let mut scheduler = UpdateScheduler::new(Duration::from_millis(300));

        assert!(scheduler.schedule(vp(10.0), 8.0));
        // Later events within the same frame do not need a new callback.
        assert!(!scheduler.schedule(vp(11.0), 9.0));
        assert!(!scheduler.schedule(vp(12.0), 10.0));

        let now = Instant::now();
        match scheduler.take_due(now) {
            Due::Ready { bounds, zoom } => {
                assert_eq!(bounds, vp(12.0));
                assert_eq!(zoom, 10.0);
            }
            other => panic!("expected Ready, got {:?}", other),
        }

        // Exactly one pass per burst.
        assert_eq!(scheduler.take_due(now), Due::Idle);
    }

    #[test]
    fn test_cooldown_defers_and_then_releases() {
        let mut scheduler = UpdateScheduler::new(Duration::from_millis(300));
        let t0 = Instant::now();

        scheduler.schedule(vp(10.0), 8.0);
        assert!(matches!(scheduler.take_due(t0), Due::Ready { .. }));

        // A follow-up gesture event during the cooldown window.
        scheduler.schedule(vp(11.0), 8.0);
        let t1 = t0 + Duration::from_millis(100);
        match scheduler.take_due(t1) {
            Due::Cooldown(wait) => assert_eq!(wait, Duration::from_millis(200)),
            other => panic!("expected Cooldown, got {:?}", other),
        }
        assert!(scheduler.has_pending());

        let t2 = t0 + Duration::from_millis(300);
        assert!(matches!(scheduler.take_due(t2), Due::Ready { .. }));
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut scheduler = UpdateScheduler::new(Duration::from_millis(300));
        scheduler.schedule(vp(10.0), 8.0);
        scheduler.cancel();
        assert_eq!(scheduler.take_due(Instant::now()), Due::Idle);
    }

    #[test]
    fn test_newer_schedule_supersedes_older() {
        let mut scheduler = UpdateScheduler::new(Duration::ZERO);
        scheduler.schedule(vp(10.0), 8.0);
        scheduler.schedule(vp(20.0), 9.0);
        let g = scheduler.generation();
        assert_eq!(g, 2);

        match scheduler.take_due(Instant::now()) {
            Due::Ready { bounds, .. } => assert_eq!(bounds, vp(20.0)),
            other => panic!("expected Ready, got {:?}", other),
        }
    }
}
