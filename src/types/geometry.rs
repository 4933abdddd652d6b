use geo::{BoundingRect, ConvexHull, Coord, LineString, MultiPoint, Point, Polygon, Rect};
use rstar::AABB;
use std::f64::consts::PI;

/// Closed vehicle outline in the map frame (exterior ring, first == last)
pub type Footprint = Polygon<f64>;

/// Closed ring polygon from coordinate pairs; the ring is closed if needed
pub fn polygon_from_coords(coords: &[(f64, f64)]) -> Polygon<f64> {
    let ring: Vec<Coord<f64>> = coords.iter().map(|&(x, y)| Coord { x, y }).collect();
    Polygon::new(LineString::new(ring), vec![])
}

/// Exterior ring of a polygon as coordinate pairs (closing point included)
pub fn polygon_to_coords(polygon: &Polygon<f64>) -> Vec<(f64, f64)> {
    polygon.exterior().coords().map(|c| (c.x, c.y)).collect()
}

/// Convex hull over every vertex of every footprint
pub fn create_hull_from_footprints(footprints: &[Footprint]) -> Polygon<f64> {
    let combined: MultiPoint<f64> = footprints
        .iter()
        .flat_map(|footprint| footprint.exterior().coords().map(|c| Point::from(*c)))
        .collect::<Vec<_>>()
        .into();

    combined.convex_hull()
}

/// Bounding box of a geometry as an R-tree envelope
pub fn rect_to_envelope(rect: Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

/// Envelope of a polygon, `None` for an empty ring
pub fn polygon_envelope(polygon: &Polygon<f64>) -> Option<AABB<[f64; 2]>> {
    polygon.bounding_rect().map(rect_to_envelope)
}

/// Normalize an angle to (-π, π]
pub fn normalize_radian(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}
