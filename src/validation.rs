//! Validation for geographic coordinates and viewport rectangles.

use crate::error::{CartomarkError, Result};
use crate::types::{Entity, ViewportBounds};

/// Validates that an entity's coordinates are finite and inside WGS84 range.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use cartomark::validation::validate_entity;
/// use cartomark::Entity;
///
/// let nyc = Entity::new("car-1", -74.0060, 40.7128);
/// assert!(validate_entity(&nyc).is_ok());
///
/// let bad_lng = Entity::new("car-2", 200.0, 40.0);
/// assert!(validate_entity(&bad_lng).is_err());
///
/// let bad_lat = Entity::new("car-3", -74.0, 95.0);
/// assert!(validate_entity(&bad_lat).is_err());
/// ```
pub fn validate_entity(entity: &Entity) -> Result<()> {
    if entity.id.is_empty() {
        return Err(CartomarkError::InvalidInput(
            "Entity id must not be empty".to_string(),
        ));
    }

    if !entity.lng.is_finite() {
        return Err(CartomarkError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            entity.lng
        )));
    }

    if !entity.lat.is_finite() {
        return Err(CartomarkError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            entity.lat
        )));
    }

    if !(-180.0..=180.0).contains(&entity.lng) {
        return Err(CartomarkError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            entity.lng
        )));
    }

    if !(-90.0..=90.0).contains(&entity.lat) {
        return Err(CartomarkError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            entity.lat
        )));
    }

    Ok(())
}

/// Validates viewport bounds ordering.
///
/// Requires `north > south` and finite edges. East/west are checked for
/// finiteness only: a viewport with `east < west` would cross the
/// antimeridian, which this engine does not handle and rejects as degenerate.
///
/// # Examples
///
/// ```
/// use cartomark::validation::validate_viewport;
/// use cartomark::ViewportBounds;
///
/// let vp = ViewportBounds::new(41.0, 40.0, -73.0, -74.0);
/// assert!(validate_viewport(&vp).is_ok());
///
/// let inverted = ViewportBounds::new(40.0, 41.0, -73.0, -74.0);
/// assert!(validate_viewport(&inverted).is_err());
/// ```
pub fn validate_viewport(bounds: &ViewportBounds) -> Result<()> {
    for (name, value) in [
        ("north", bounds.north),
        ("south", bounds.south),
        ("east", bounds.east),
        ("west", bounds.west),
    ] {
        if !value.is_finite() {
            return Err(CartomarkError::InvalidViewport(format!(
                "{} edge must be finite, got: {}",
                name, value
            )));
        }
    }

    if bounds.north <= bounds.south {
        return Err(CartomarkError::InvalidViewport(format!(
            "north ({}) must be greater than south ({})",
            bounds.north, bounds.south
        )));
    }

    if bounds.east < bounds.west {
        return Err(CartomarkError::InvalidViewport(format!(
            "east ({}) is less than west ({}); antimeridian-crossing \
            viewports are not supported",
            bounds.east, bounds.west
        )));
    }

    Ok(())
}

/// Validates a zoom level.
pub fn validate_zoom(zoom: f64) -> Result<()> {
    if !zoom.is_finite() || zoom < 0.0 {
        return Err(CartomarkError::InvalidInput(format!(
            "Zoom must be finite and non-negative, got: {}",
            zoom
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_coordinates_are_valid() {
        assert!(validate_entity(&Entity::new("a", 180.0, 90.0)).is_ok());
        assert!(validate_entity(&Entity::new("b", -180.0, -90.0)).is_ok());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(validate_entity(&Entity::new("a", f64::NAN, 0.0)).is_err());
        assert!(validate_entity(&Entity::new("a", 0.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(validate_entity(&Entity::new("", 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_antimeridian_viewport_rejected() {
        let vp = ViewportBounds::new(10.0, -10.0, -170.0, 170.0);
        assert!(validate_viewport(&vp).is_err());
    }

    #[test]
    fn test_zoom_validation() {
        assert!(validate_zoom(0.0).is_ok());
        assert!(validate_zoom(22.0).is_ok());
        assert!(validate_zoom(-1.0).is_err());
        assert!(validate_zoom(f64::NAN).is_err());
    }
}
