pub mod candidates;
pub mod fused;
pub mod map;

pub use candidates::{get_candidate_lanelets, is_in_any_lane, is_out_of_lane, will_leave_lane};
pub use fused::{
    check_path_will_leave_lane, crop_points_outside_of_lanes, fuse_lanelet_polygons,
    get_fused_lanelet_polygon_for_path, get_lanelets_from_path,
};
pub use map::{Lanelet, LaneletMap, MapLineString, SpatialLanelet};
