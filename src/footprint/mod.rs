//! Vehicle footprint sweep along a trajectory
//!
//! # Pipeline
//! 1. Local outline from `VehicleInfo`, optionally grown by a margin derived
//!    from the planar pose covariance
//! 2. Rigid transform of the outline onto every trajectory pose
//! 3. Convex hull of each consecutive footprint pair (passing areas), which
//!    covers the area swept between two samples

use crate::config::VehicleInfo;
use crate::error::{ensure_points, Result};
use crate::types::{
    create_hull_from_footprints, planar_covariance, rotate_covariance_into_frame, Footprint,
    HasPose, Pose, PoseWithCovariance,
};
use geo::{Coord, MapCoords};
use nalgebra::Point2;

/// Footprint growth in the vehicle frame (metres)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FootprintMargin {
    pub lon: f64,
    pub lat: f64,
}

/// Margin from pose covariance: vehicle-frame variances scaled by `scale`
pub fn calc_footprint_margin(covariance: &PoseWithCovariance, scale: f64) -> Result<FootprintMargin> {
    let cov_xy_map = planar_covariance(&covariance.covariance)?;
    let cov_xy_vehicle = rotate_covariance_into_frame(&cov_xy_map, covariance.pose.yaw);

    Ok(FootprintMargin {
        lon: cov_xy_vehicle[(0, 0)] * scale,
        lat: cov_xy_vehicle[(1, 1)] * scale,
    })
}

/// Move a base_link outline onto `pose`
pub fn transform_footprint(local: &Footprint, pose: &Pose) -> Footprint {
    let iso = pose.isometry();
    local.map_coords(|c| {
        let p = iso * Point2::new(c.x, c.y);
        Coord { x: p.x, y: p.y }
    })
}

/// One footprint per point, in point order
pub fn create_footprints_along<P: HasPose>(local: &Footprint, points: &[P]) -> Result<Vec<Footprint>> {
    ensure_points("footprint sweep", 1, points.len())?;

    Ok(points
        .iter()
        .map(|p| transform_footprint(local, p.pose()))
        .collect())
}

/// Footprints inflated by the current localisation uncertainty
pub fn create_vehicle_footprints<P: HasPose>(
    vehicle_info: &VehicleInfo,
    covariance: &PoseWithCovariance,
    points: &[P],
    margin_scale: f64,
) -> Result<Vec<Footprint>> {
    let margin = calc_footprint_margin(covariance, margin_scale)?;
    let local_vehicle_footprint = vehicle_info.create_footprint(margin.lat, margin.lon);
    create_footprints_along(&local_vehicle_footprint, points)
}

/// Footprints of the bare vehicle outline (discrete paths carry no covariance)
pub fn create_vehicle_footprints_without_margin<P: HasPose>(
    vehicle_info: &VehicleInfo,
    points: &[P],
) -> Result<Vec<Footprint>> {
    let local_vehicle_footprint = vehicle_info.create_footprint(0.0, 0.0);
    create_footprints_along(&local_vehicle_footprint, points)
}

/// Convex hull of each adjacent footprint pair; empty for fewer than two
pub fn create_vehicle_passing_areas(footprints: &[Footprint]) -> Vec<Footprint> {
    footprints
        .windows(2)
        .map(create_hull_from_footprints)
        .collect()
}
