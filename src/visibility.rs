//! Visibility determination: which entities fall inside the buffered
//! viewport, and in what priority order.

use crate::config::EngineConfig;
use crate::quadtree::QuadTree;
use crate::types::Entity;
use crate::viewport::ViewportTracker;
use geo::{Distance, Haversine};
use std::cmp::Ordering;

/// Resolve the slots of entities inside the buffered viewport rectangle.
///
/// With an index present the buffered rectangle is answered by a quadtree
/// range query; without one the snapshot is linear-scanned against the same
/// rectangle, so both paths return identical contents.
///
/// Above the distance-sort zoom the result is ordered by haversine distance
/// from the viewport center, ascending, so that truncation by the visible
/// cap preferentially keeps entities nearest the user's focus. Below that
/// zoom the ordering cost is not justified; typically everything fits.
pub fn resolve(
    entities: &[Entity],
    tracker: &ViewportTracker,
    index: Option<&QuadTree>,
    config: &EngineConfig,
) -> Vec<u32> {
    let mut slots = match index {
        Some(tree) => tree.query(&tracker.query_rect()),
        None => {
            let bounds = tracker.expanded();
            entities
                .iter()
                .enumerate()
                .filter(|(_, e)| bounds.contains(e.lng, e.lat))
                .map(|(slot, _)| slot as u32)
                .collect()
        }
    };

    if tracker.zoom() > config.distance_sort_zoom {
        sort_by_distance_to_center(entities, tracker, &mut slots);
    }

    slots
}

fn sort_by_distance_to_center(entities: &[Entity], tracker: &ViewportTracker, slots: &mut [u32]) {
    let center = tracker.bounds().center();
    let mut keyed: Vec<(u32, f64)> = slots
        .iter()
        .map(|&slot| {
            let e = &entities[slot as usize];
            (slot, Haversine.distance(center, e.position()))
        })
        .collect();

    keyed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    for (dst, (slot, _)) in slots.iter_mut().zip(keyed) {
        *dst = slot;
    }
}
