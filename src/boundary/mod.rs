//! Uncrossable boundary detection
//!
//! # Build phase
//! Typed map linestrings (road borders, curbs...) are split into two-point
//! segments; only segments closer to the ego than the search length are
//! indexed, so the tree size follows the reachable neighbourhood rather than
//! the map size.
//!
//! # Query phase
//! Footprints are tested in time order against the tree; the first hit wins.

pub mod boundary_tree;

pub use boundary_tree::{BoundarySegment, BoundaryTree, SpatialBoundarySegment};

use crate::config::VehicleInfo;
use crate::lanelet::MapLineString;
use crate::trajectory::calc_arc_length;
use crate::types::{Footprint, HasPose};
use geo::{Coord, EuclideanDistance, Line, Point};

/// Search radius covering every place the swept outline can reach
pub fn calc_max_search_length_for_boundaries<P: HasPose>(
    trajectory: &[P],
    vehicle_info: &VehicleInfo,
) -> f64 {
    calc_arc_length(trajectory) + vehicle_info.max_radial_extent()
}

/// Untyped linestrings never match
pub fn has_types(line_string: &MapLineString, types: &[String]) -> bool {
    match line_string.line_type.as_deref() {
        Some(line_type) if !line_type.is_empty() => types.iter().any(|t| t == line_type),
        _ => false,
    }
}

/// Index every typed boundary segment within `max_search_length` of `ego_point`
pub fn extract_uncrossable_boundaries(
    line_strings: &[MapLineString],
    ego_point: Coord<f64>,
    max_search_length: f64,
    boundary_types_to_detect: &[String],
) -> BoundaryTree {
    let ego_p = Point::from(ego_point);

    let segments: Vec<BoundarySegment> = line_strings
        .iter()
        .filter(|ls| has_types(ls, boundary_types_to_detect))
        .flat_map(|ls| {
            ls.geometry.lines().map(move |line| BoundarySegment {
                line_string_id: ls.id,
                line,
            })
        })
        .filter(|segment| segment_distance(&segment.line, &ego_p) < max_search_length)
        .collect();

    log::trace!(
        "Indexed {} uncrossable segment(s) within {:.1} m",
        segments.len(),
        max_search_length
    );

    BoundaryTree::from_segments(segments)
}

fn segment_distance(line: &Line<f64>, point: &Point<f64>) -> f64 {
    point.euclidean_distance(line)
}

/// True on the first footprint touching any indexed segment
pub fn will_cross_boundary(vehicle_footprints: &[Footprint], uncrossable_segments: &BoundaryTree) -> bool {
    if uncrossable_segments.is_empty() {
        return false;
    }

    vehicle_footprints
        .iter()
        .any(|footprint| uncrossable_segments.intersects_polygon(footprint))
}
