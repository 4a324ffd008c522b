//! Core data types for the marker engine.
//!
//! Entities are supplied wholesale by the presentation layer on every data
//! refresh; the engine treats each snapshot as a read-only replacement for
//! the previous one, never an incremental patch.

use geo::Point;
use serde::{Deserialize, Serialize};

/// Availability of a rentable vehicle at its current location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    #[default]
    Available,
    InUse,
    SoonAvailable,
    Unavailable,
}

/// Presentation metadata carried along with an entity.
///
/// The engine never interprets these fields; they are handed verbatim to the
/// presenter when a marker is bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EntityMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

/// A point-located rentable vehicle record.
///
/// `id` must be unique within a snapshot; `lat ∈ [-90, 90]`,
/// `lng ∈ [-180, 180]`. Records violating these invariants are skipped
/// (with a warning) when a snapshot is ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub lng: f64,
    pub lat: f64,
    #[serde(default)]
    pub price_per_day: f64,
    #[serde(default)]
    pub availability: AvailabilityStatus,
    #[serde(default)]
    pub meta: EntityMeta,
}

impl Entity {
    /// Create an entity at the given WGS84 coordinates.
    pub fn new(id: impl Into<String>, lng: f64, lat: f64) -> Self {
        Self {
            id: id.into(),
            lng,
            lat,
            price_per_day: 0.0,
            availability: AvailabilityStatus::default(),
            meta: EntityMeta::default(),
        }
    }

    pub fn with_price(mut self, price_per_day: f64) -> Self {
        self.price_per_day = price_per_day;
        self
    }

    pub fn with_availability(mut self, availability: AvailabilityStatus) -> Self {
        self.availability = availability;
        self
    }

    pub fn with_meta(mut self, meta: EntityMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Position as a `geo` point (x = longitude, y = latitude).
    #[inline]
    pub fn position(&self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

/// A geographic rectangle in degrees plus the zoom it was captured at.
///
/// `north > south` is required. East and west are treated independently;
/// viewports crossing the antimeridian (east < west) are an explicitly
/// unhandled limitation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl ViewportBounds {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Geographic center of the rectangle.
    #[inline]
    pub fn center(&self) -> Point<f64> {
        Point::new((self.east + self.west) / 2.0, (self.north + self.south) / 2.0)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Expand the rectangle by a fraction of its own size on every edge.
    ///
    /// A 10% buffer pre-renders entities just off screen so panning does not
    /// pop markers in at the edge.
    pub fn expanded(&self, buffer: f64) -> Self {
        let dx = self.width() * buffer;
        let dy = self.height() * buffer;
        Self {
            north: self.north + dy,
            south: self.south - dy,
            east: self.east + dx,
            west: self.west - dx,
        }
    }

    /// Point-in-rectangle test (edges inclusive).
    #[inline]
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        lng >= self.west && lng <= self.east && lat >= self.south && lat <= self.north
    }
}

/// Counters describing what a snapshot ingest did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotSummary {
    /// Entities accepted into the snapshot.
    pub accepted: usize,
    /// Entities dropped for invalid geometry or duplicate ids.
    pub skipped: usize,
    /// Whether a quadtree was (re)built for this snapshot.
    pub indexed: bool,
}

/// Aggregate counters for the lifetime of an engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    /// Snapshots ingested.
    pub snapshots: u64,
    /// Scheduled updates actually applied.
    pub updates_applied: u64,
    /// Entities skipped across all snapshots.
    pub entities_skipped: u64,
    /// Size of the visible set after the most recent update.
    pub last_visible: usize,
}
