use crate::error::{ensure_points, Result};
use crate::types::{normalize_radian, HasPose, Pose};

/// Index of the point closest to `pose` in the plane
pub fn find_nearest_index<P: HasPose>(points: &[P], pose: &Pose) -> Result<usize> {
    ensure_points("nearest search", 1, points.len())?;

    let mut min_idx = 0;
    let mut min_squared_dist = f64::MAX;
    for (i, point) in points.iter().enumerate() {
        let squared_dist = squared_distance_2d(point.pose(), pose);
        if squared_dist < min_squared_dist {
            min_squared_dist = squared_dist;
            min_idx = i;
        }
    }
    Ok(min_idx)
}

/// Nearest index preferring points that face the same way as `pose`
///
/// # Search order
/// 1. First contiguous run of points within `dist_threshold` and with
///    |yaw difference| <= `yaw_threshold`; closest point of that run
/// 2. Same with the distance threshold only
/// 3. Globally closest point
///
/// Taking the first run rather than the global minimum keeps the match on the
/// near section of self-overlapping trajectories (loops, U-turns).
pub fn find_first_nearest_index_with_soft_constraints<P: HasPose>(
    points: &[P],
    pose: &Pose,
    dist_threshold: f64,
    yaw_threshold: f64,
) -> Result<usize> {
    ensure_points("nearest search", 1, points.len())?;

    let squared_dist_threshold = dist_threshold * dist_threshold;

    let with_yaw = first_run_minimum(points, pose, |p, squared_dist| {
        let yaw = normalize_radian(pose.yaw - p.yaw);
        squared_dist <= squared_dist_threshold && yaw.abs() <= yaw_threshold
    });
    if let Some(idx) = with_yaw {
        return Ok(idx);
    }

    let dist_only = first_run_minimum(points, pose, |_, squared_dist| {
        squared_dist <= squared_dist_threshold
    });
    if let Some(idx) = dist_only {
        return Ok(idx);
    }

    find_nearest_index(points, pose)
}

fn first_run_minimum<P, F>(points: &[P], pose: &Pose, within: F) -> Option<usize>
where
    P: HasPose,
    F: Fn(&Pose, f64) -> bool,
{
    let mut min_squared_dist = f64::MAX;
    let mut min_idx = None;

    for (i, point) in points.iter().enumerate() {
        let squared_dist = squared_distance_2d(point.pose(), pose);
        if !within(point.pose(), squared_dist) {
            if min_idx.is_some() {
                // left the first run
                break;
            }
            continue;
        }
        if squared_dist < min_squared_dist {
            min_squared_dist = squared_dist;
            min_idx = Some(i);
        }
    }

    min_idx
}

fn squared_distance_2d(a: &Pose, b: &Pose) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}
