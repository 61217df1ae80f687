//! Point in polygon tests for spatial filters

use dv_core::PolygonFeature;
use geo_types::{Coord, LineString};

/// Whether `[lng, lat]` lies inside the feature.
///
/// A point is inside when it falls within some polygon's exterior ring and
/// outside all of that polygon's holes. Points exactly on an edge may land
/// on either side.
pub fn is_in_polygon(point: [f64; 2], feature: &PolygonFeature) -> bool {
    let [x, y] = point;
    if !x.is_finite() || !y.is_finite() {
        return false;
    }
    let p = Coord { x, y };

    feature.geometry.0.iter().any(|polygon| {
        ring_contains(polygon.exterior(), p)
            && !polygon.interiors().iter().any(|hole| ring_contains(hole, p))
    })
}

/// Even-odd crossing test against one ring
fn ring_contains(ring: &LineString<f64>, p: Coord<f64>) -> bool {
    let coords = &ring.0;
    if coords.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = coords.len() - 1;
    for i in 0..coords.len() {
        let (a, b) = (coords[i], coords[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
