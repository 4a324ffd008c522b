//! Point quadtree over entity coordinates.
//!
//! A node holds points directly until its capacity is exceeded, then
//! subdivides into four equal quadrants and re-routes its points into them.
//! Range queries prune any subtree whose bounds do not intersect the query
//! rectangle.
//!
//! The tree is rebuilt wholesale whenever the entity snapshot changes;
//! snapshots are full replacements, so a rebuild is cheaper than incremental
//! removal bookkeeping. It is only built at all once the snapshot crosses the
//! virtualization threshold; below that a linear scan wins.

use crate::types::Entity;
use geo::{Coord, Rect, coord};
use smallvec::SmallVec;

/// Subdivision stops here; co-located points overflow into the deepest node
/// instead of recursing forever.
const MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    x: f64,
    y: f64,
    /// Index into the entity snapshot this tree was built from.
    slot: u32,
}

#[derive(Debug)]
struct Node {
    bounds: Rect<f64>,
    depth: usize,
    points: SmallVec<[IndexedPoint; 4]>,
    children: Option<Box<[Node; 4]>>,
}

/// Point quadtree mapping snapshot slots to quadrants.
///
/// Stores slot indices rather than entity clones: the resolver that issues
/// queries owns the snapshot and translates slots back to entities.
#[derive(Debug)]
pub struct QuadTree {
    root: Node,
    node_capacity: usize,
    len: usize,
}

impl QuadTree {
    /// Create an empty tree over fixed bounds.
    pub fn new(bounds: Rect<f64>, node_capacity: usize) -> Self {
        assert!(node_capacity > 0, "node capacity must be greater than zero");
        Self {
            root: Node::new(bounds, 0),
            node_capacity,
            len: 0,
        }
    }

    /// Build a tree from a snapshot, sizing the bounds to the snapshot's
    /// min/max coordinates plus `padding` degrees on every side.
    ///
    /// The padding keeps edge-of-extent points insertable despite
    /// floating-point rounding. Returns `None` for an empty snapshot.
    pub fn from_entities(entities: &[Entity], node_capacity: usize, padding: f64) -> Option<Self> {
        let first = entities.first()?;
        let (mut min_x, mut max_x) = (first.lng, first.lng);
        let (mut min_y, mut max_y) = (first.lat, first.lat);
        for e in &entities[1..] {
            min_x = min_x.min(e.lng);
            max_x = max_x.max(e.lng);
            min_y = min_y.min(e.lat);
            max_y = max_y.max(e.lat);
        }

        let bounds = Rect::new(
            coord! { x: min_x - padding, y: min_y - padding },
            coord! { x: max_x + padding, y: max_y + padding },
        );

        let mut tree = Self::new(bounds, node_capacity);
        for (slot, e) in entities.iter().enumerate() {
            if !tree.insert(slot as u32, e.lng, e.lat) {
                // Unreachable for points the bounds were computed from.
                log::warn!("Entity '{}' fell outside the computed index bounds", e.id);
            }
        }
        Some(tree)
    }

    /// Insert a point; returns `false` if it lies outside the indexed bounds.
    pub fn insert(&mut self, slot: u32, lng: f64, lat: f64) -> bool {
        if !contains(&self.root.bounds, lng, lat) {
            return false;
        }
        self.root.insert(
            IndexedPoint {
                x: lng,
                y: lat,
                slot,
            },
            self.node_capacity,
        );
        self.len += 1;
        true
    }

    /// Collect the slots of all points lying within `rect` (edges inclusive),
    /// in unspecified order.
    pub fn query(&self, rect: &Rect<f64>) -> Vec<u32> {
        let mut out = Vec::new();
        self.root.query_into(rect, &mut out);
        out
    }

    /// Bounds the tree was built over.
    pub fn bounds(&self) -> Rect<f64> {
        self.root.bounds
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Node {
    fn new(bounds: Rect<f64>, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            points: SmallVec::new(),
            children: None,
        }
    }

    fn insert(&mut self, point: IndexedPoint, capacity: usize) {
        let idx = self.quadrant_of(point.x, point.y);
        if let Some(children) = self.children.as_mut() {
            children[idx].insert(point, capacity);
            return;
        }

        if self.points.len() < capacity || self.depth >= MAX_DEPTH {
            self.points.push(point);
            return;
        }

        // Over capacity: subdivide and re-route everything held here.
        self.subdivide();
        let held = std::mem::take(&mut self.points);
        for p in held.into_iter().chain(std::iter::once(point)) {
            let idx = self.quadrant_of(p.x, p.y);
            if let Some(children) = self.children.as_mut() {
                children[idx].insert(p, capacity);
            }
        }
    }

    /// Route a point to exactly one quadrant by comparing against the node
    /// center, so boundary points never land in two children.
    #[inline]
    fn quadrant_of(&self, x: f64, y: f64) -> usize {
        let c: Coord<f64> = self.bounds.center();
        match (y >= c.y, x >= c.x) {
            (true, false) => 0,  // NW
            (true, true) => 1,   // NE
            (false, false) => 2, // SW
            (false, true) => 3,  // SE
        }
    }

    fn subdivide(&mut self) {
        let min = self.bounds.min();
        let max = self.bounds.max();
        let c = self.bounds.center();
        let depth = self.depth + 1;

        let nw = Node::new(
            Rect::new(coord! { x: min.x, y: c.y }, coord! { x: c.x, y: max.y }),
            depth,
        );
        let ne = Node::new(
            Rect::new(coord! { x: c.x, y: c.y }, coord! { x: max.x, y: max.y }),
            depth,
        );
        let sw = Node::new(
            Rect::new(coord! { x: min.x, y: min.y }, coord! { x: c.x, y: c.y }),
            depth,
        );
        let se = Node::new(
            Rect::new(coord! { x: c.x, y: min.y }, coord! { x: max.x, y: c.y }),
            depth,
        );

        self.children = Some(Box::new([nw, ne, sw, se]));
    }

    fn query_into(&self, rect: &Rect<f64>, out: &mut Vec<u32>) {
        if !intersects(&self.bounds, rect) {
            return;
        }

        for p in &self.points {
            if contains(rect, p.x, p.y) {
                out.push(p.slot);
            }
        }

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query_into(rect, out);
            }
        }
    }
}

#[inline]
fn contains(rect: &Rect<f64>, x: f64, y: f64) -> bool {
    let min = rect.min();
    let max = rect.max();
    x >= min.x && x <= max.x && y >= min.y && y <= max.y
}

#[inline]
fn intersects(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    !(a.max().x < b.min().x
        || a.min().x > b.max().x
        || a.max().y < b.min().y
        || a.min().y > b.max().y)
}
