//! Path-based departure checks against a fused lane region
//!
//! Unlike the per-vertex test in `candidates`, these require every footprint
//! to lie entirely inside the union of the lanelets under the path. The two
//! tests can disagree near lanelet seams and are kept separate.

use super::{Lanelet, LaneletMap};
use crate::config::VehicleInfo;
use crate::error::Result;
use crate::footprint::create_vehicle_footprints_without_margin;
use crate::types::{create_hull_from_footprints, PathWithLaneId};
use geo::{BooleanOps, Contains, MultiPolygon};

/// Map lanelets touching the convex hull of the path's footprints
///
/// # Returns
/// (distance, lanelet) pairs, all at distance 0, in map order
pub fn get_lanelets_from_path<'a>(
    vehicle_info: &VehicleInfo,
    lanelet_map: &'a LaneletMap,
    path: &PathWithLaneId,
) -> Result<Vec<(f64, &'a Lanelet)>> {
    let vehicle_footprints = create_vehicle_footprints_without_margin(vehicle_info, &path.points)?;
    let footprint_hull = create_hull_from_footprints(&vehicle_footprints);

    Ok(lanelet_map.find_within_2d(&footprint_hull, 0.0))
}

/// Union of lanelet polygons, accumulated one lanelet at a time
///
/// Each step may split into several disjoint polygons; all of them are carried
/// into the next union. `None` when there is nothing to fuse.
pub fn fuse_lanelet_polygons<'a, I>(lanelets: I) -> Option<MultiPolygon<f64>>
where
    I: IntoIterator<Item = &'a Lanelet>,
{
    let mut lanelets = lanelets.into_iter();
    let first = lanelets.next()?;

    let mut merged = MultiPolygon::new(vec![first.polygon.clone()]);
    for lanelet in lanelets {
        let next = MultiPolygon::new(vec![lanelet.polygon.clone()]);
        merged = next.union(&merged);
    }

    if merged.0.is_empty() {
        return None;
    }
    Some(merged)
}

pub fn get_fused_lanelet_polygon_for_path(
    vehicle_info: &VehicleInfo,
    lanelet_map: &LaneletMap,
    path: &PathWithLaneId,
) -> Result<Option<MultiPolygon<f64>>> {
    let lanelets = get_lanelets_from_path(vehicle_info, lanelet_map, path)?;
    Ok(fuse_lanelet_polygons(lanelets.into_iter().map(|(_, l)| l)))
}

/// True unless every footprint along the path is fully inside the fused region
///
/// No lanelet under the path counts as leaving the lane.
pub fn check_path_will_leave_lane(
    vehicle_info: &VehicleInfo,
    lanelet_map: &LaneletMap,
    path: &PathWithLaneId,
) -> Result<bool> {
    let vehicle_footprints = create_vehicle_footprints_without_margin(vehicle_info, &path.points)?;
    let Some(fused) = get_fused_lanelet_polygon_for_path(vehicle_info, lanelet_map, path)? else {
        return Ok(true);
    };

    Ok(!vehicle_footprints
        .iter()
        .all(|footprint| fused.contains(footprint)))
}

/// Drop path points whose footprint leaves the fused region
///
/// Points after `end_index` are kept unconditionally. An empty path, or a
/// path with no lanelets under it, yields an empty path.
pub fn crop_points_outside_of_lanes(
    vehicle_info: &VehicleInfo,
    lanelet_map: &LaneletMap,
    path: &PathWithLaneId,
    end_index: usize,
) -> Result<PathWithLaneId> {
    if path.points.is_empty() {
        return Ok(PathWithLaneId::default());
    }
    let Some(fused) = get_fused_lanelet_polygon_for_path(vehicle_info, lanelet_map, path)? else {
        return Ok(PathWithLaneId::default());
    };

    let vehicle_footprints = create_vehicle_footprints_without_margin(vehicle_info, &path.points)?;
    let points = path
        .points
        .iter()
        .zip(vehicle_footprints.iter())
        .enumerate()
        .filter(|(idx, (_, footprint))| *idx > end_index || fused.contains(*footprint))
        .map(|(_, (point, _))| point.clone())
        .collect();

    let mut cropped_path = path.clone();
    cropped_path.points = points;
    Ok(cropped_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{polygon_from_coords, PathPoint, Pose};
    use geo::Area;

    fn make_vehicle() -> VehicleInfo {
        // 4 m x 2 m box, base_link 1 m from the rear
        VehicleInfo {
            wheel_base: 2.0,
            wheel_tread: 1.0,
            front_overhang: 1.0,
            rear_overhang: 1.0,
            left_overhang: 0.5,
            right_overhang: 0.5,
        }
    }

    fn make_rect_lanelet(id: u64, x0: f64, y0: f64, x1: f64, y1: f64) -> Lanelet {
        Lanelet::new(
            id,
            polygon_from_coords(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)]),
        )
    }

    fn make_path(coords: &[(f64, f64)]) -> PathWithLaneId {
        PathWithLaneId {
            points: coords
                .iter()
                .map(|&(x, y)| PathPoint {
                    pose: Pose::new(x, y, 0.0),
                    longitudinal_velocity_mps: 1.0,
                    lane_ids: vec![1],
                })
                .collect(),
        }
    }

    /// Two lanes side by side along x, joined seamlessly at y = 4
    fn make_two_lane_map() -> LaneletMap {
        LaneletMap::new(
            vec![
                make_rect_lanelet(1, 0.0, 0.0, 30.0, 4.0),
                make_rect_lanelet(2, 0.0, 4.0, 30.0, 8.0),
                make_rect_lanelet(3, 200.0, 0.0, 230.0, 4.0),
            ],
            vec![],
        )
    }

    #[test]
    fn test_lanelets_from_path() {
        let map = make_two_lane_map();
        let path = make_path(&[(2.0, 2.0), (6.0, 2.0), (10.0, 2.0)]);
        let found: Vec<u64> = get_lanelets_from_path(&make_vehicle(), &map, &path)
            .unwrap()
            .iter()
            .map(|(_, l)| l.id)
            .collect();
        // Footprint spans y in [1, 3]: only the first lane
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn test_fuse_adjacent_lanelets() {
        let map = make_two_lane_map();
        let fused = fuse_lanelet_polygons(&map.lanelets()[..2]).unwrap();
        assert_eq!(fused.0.len(), 1);
        assert!((fused.unsigned_area() - 240.0).abs() < 1e-6);
    }

    #[test]
    fn test_fuse_keeps_disjoint_parts() {
        let map = make_two_lane_map();
        let fused = fuse_lanelet_polygons(map.lanelets()).unwrap();
        assert_eq!(fused.0.len(), 2);
        assert!((fused.unsigned_area() - 360.0).abs() < 1e-6);
    }

    #[test]
    fn test_fuse_nothing() {
        let none: Vec<Lanelet> = vec![];
        assert!(fuse_lanelet_polygons(&none).is_none());
    }

    #[test]
    fn test_lane_change_across_seam_stays_in_lane() {
        let map = make_two_lane_map();
        // Footprint straddles y = 4 at the middle point
        let path = make_path(&[(2.0, 2.0), (10.0, 4.0), (18.0, 6.0)]);
        assert!(!check_path_will_leave_lane(&make_vehicle(), &map, &path).unwrap());
    }

    #[test]
    fn test_path_leaving_road_is_detected() {
        let map = make_two_lane_map();
        let path = make_path(&[(2.0, 2.0), (10.0, 2.0), (28.0, 2.0)]);
        // Last footprint reaches x = 31 > 30
        assert!(check_path_will_leave_lane(&make_vehicle(), &map, &path).unwrap());
    }

    #[test]
    fn test_path_off_map_is_departure() {
        let map = make_two_lane_map();
        let path = make_path(&[(100.0, 100.0), (104.0, 100.0)]);
        assert!(check_path_will_leave_lane(&make_vehicle(), &map, &path).unwrap());
    }

    #[test]
    fn test_crop_points_outside_of_lanes() {
        let map = make_two_lane_map();
        let path = make_path(&[(2.0, 2.0), (2.0, 7.5), (10.0, 2.0), (10.0, 7.5), (20.0, 7.5)]);

        // Index 1 and 3 stick out over y = 8; index 4 is past end_index and kept
        let cropped = crop_points_outside_of_lanes(&make_vehicle(), &map, &path, 3).unwrap();
        let xs: Vec<(f64, f64)> = cropped.points.iter().map(|p| (p.pose.x, p.pose.y)).collect();
        assert_eq!(xs, vec![(2.0, 2.0), (10.0, 2.0), (20.0, 7.5)]);
    }

    #[test]
    fn test_crop_empty_inputs() {
        let map = make_two_lane_map();
        let empty = PathWithLaneId::default();
        assert!(crop_points_outside_of_lanes(&make_vehicle(), &map, &empty, 0)
            .unwrap()
            .points
            .is_empty());

        let off_map = make_path(&[(100.0, 100.0)]);
        assert!(crop_points_outside_of_lanes(&make_vehicle(), &map, &off_map, 10)
            .unwrap()
            .points
            .is_empty());
    }
}
