use super::nearest::find_first_nearest_index_with_soft_constraints;
use crate::error::Result;
use crate::types::{normalize_radian, Pose, Trajectory};
use serde::{Deserialize, Serialize};

/// Offset of a target pose as seen from a base pose
///
/// - lateral: signed perpendicular distance (+ left of base heading)
/// - longitudinal: distance along base heading (+ ahead)
/// - yaw: target heading minus base heading, in (-π, π]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseDeviation {
    pub lateral: f64,
    pub longitudinal: f64,
    pub yaw: f64,
}

pub fn calc_lateral_deviation(base: &Pose, target: &Pose) -> f64 {
    let dx = target.x - base.x;
    let dy = target.y - base.y;
    base.yaw.cos() * dy - base.yaw.sin() * dx
}

pub fn calc_longitudinal_deviation(base: &Pose, target: &Pose) -> f64 {
    let dx = target.x - base.x;
    let dy = target.y - base.y;
    base.yaw.cos() * dx + base.yaw.sin() * dy
}

pub fn calc_yaw_deviation(base: &Pose, target: &Pose) -> f64 {
    normalize_radian(target.yaw - base.yaw)
}

pub fn calc_pose_deviation(base: &Pose, target: &Pose) -> PoseDeviation {
    PoseDeviation {
        lateral: calc_lateral_deviation(base, target),
        longitudinal: calc_longitudinal_deviation(base, target),
        yaw: calc_yaw_deviation(base, target),
    }
}

/// Deviation of `pose` from its nearest point on the reference trajectory
pub fn calc_trajectory_deviation(
    trajectory: &Trajectory,
    pose: &Pose,
    dist_threshold: f64,
    yaw_threshold: f64,
) -> Result<PoseDeviation> {
    let nearest_idx = find_first_nearest_index_with_soft_constraints(
        &trajectory.points,
        pose,
        dist_threshold,
        yaw_threshold,
    )?;
    Ok(calc_pose_deviation(&trajectory.points[nearest_idx].pose, pose))
}
