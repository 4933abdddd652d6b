//! Trajectory preprocessing: resampling, braking-horizon cutting and
//! the braking-distance model that sizes the horizon.

pub mod deviation;
pub mod nearest;

pub use deviation::{calc_pose_deviation, calc_trajectory_deviation, PoseDeviation};
pub use nearest::{find_first_nearest_index_with_soft_constraints, find_nearest_index};

use crate::config::Param;
use crate::error::{ensure_points, CheckerError, Result};
use crate::types::{HasPose, Pose, TrajectoryPoint, TrajectoryPoints};

/// Speeds below this are treated as standstill (m/s)
pub const MIN_VELOCITY: f64 = 0.01;

/// Tolerance for "budget exhausted exactly at a vertex" (m)
const CUT_EPSILON: f64 = 1e-9;

/// Stopping distance: v² / (2·a_max) + t_delay·v
pub fn calc_braking_distance(abs_velocity: f64, max_deceleration: f64, delay_time: f64) -> f64 {
    (abs_velocity * abs_velocity) / (2.0 * max_deceleration) + delay_time * abs_velocity
}

/// Braking horizon for the current speed, never shorter than `min_braking_distance`
pub fn estimate_braking_distance(velocity: f64, param: &Param) -> f64 {
    let raw_abs_velocity = velocity.abs();
    let abs_velocity = if raw_abs_velocity < MIN_VELOCITY {
        0.0
    } else {
        raw_abs_velocity
    };

    param.min_braking_distance.max(calc_braking_distance(
        abs_velocity,
        param.max_deceleration,
        param.delay_time,
    ))
}

/// Total planar length of a polyline through the points
pub fn calc_arc_length<P: HasPose>(points: &[P]) -> f64 {
    points
        .windows(2)
        .map(|w| w[0].pose().distance_2d(w[1].pose()))
        .sum()
}

/// Thin a dense trajectory so kept points are more than `interval` apart
///
/// First and last points are always kept. Assumes the input is sampled
/// densely enough that skipping points does not cut corners.
pub fn resample_trajectory(points: &[TrajectoryPoint], interval: f64) -> Result<TrajectoryPoints> {
    ensure_points("trajectory to resample", 2, points.len())?;
    if !(interval > 0.0) {
        return Err(CheckerError::InvalidParameter(format!(
            "resample interval must be > 0, got {}",
            interval
        )));
    }

    let mut resampled = Vec::with_capacity(points.len());
    resampled.push(points[0].clone());

    let mut last_kept = points[0].pose;
    for point in &points[1..points.len() - 1] {
        if last_kept.distance_2d(&point.pose) > interval {
            resampled.push(point.clone());
            last_kept = point.pose;
        }
    }
    resampled.push(points[points.len() - 1].clone());

    Ok(resampled)
}

/// Keep the prefix of a trajectory whose planar arc length fits in `length`
///
/// When the trajectory is longer than `length`, the final point is
/// interpolated on the straddling segment so the result ends exactly at
/// `length`. Shorter trajectories come back unchanged.
pub fn cut_trajectory(points: &[TrajectoryPoint], length: f64) -> Result<TrajectoryPoints> {
    ensure_points("trajectory to cut", 1, points.len())?;
    if !(length >= 0.0) {
        return Err(CheckerError::InvalidParameter(format!(
            "cut length must be >= 0, got {}",
            length
        )));
    }

    let mut cut = Vec::with_capacity(points.len());
    cut.push(points[0].clone());

    let mut total_length = 0.0;
    let mut prev = &points[0];
    for point in &points[1..] {
        let remain_distance = length - total_length;

        // Over length
        if remain_distance <= 0.0 {
            break;
        }

        let points_distance = prev.pose.distance_2d(&point.pose);

        if remain_distance <= points_distance + CUT_EPSILON {
            if points_distance - remain_distance <= CUT_EPSILON {
                // Lands on the vertex (also covers coincident points)
                cut.push(point.clone());
            } else {
                cut.push(interpolate(prev, point, remain_distance / points_distance));
            }
            break;
        }

        cut.push(point.clone());
        total_length += points_distance;
        prev = point;
    }

    Ok(cut)
}

/// Point at `ratio` along p1 -> p2; heading taken from p2
fn interpolate(p1: &TrajectoryPoint, p2: &TrajectoryPoint, ratio: f64) -> TrajectoryPoint {
    let lerp = |a: f64, b: f64| a + ratio * (b - a);

    TrajectoryPoint {
        pose: Pose {
            x: lerp(p1.pose.x, p2.pose.x),
            y: lerp(p1.pose.y, p2.pose.y),
            z: lerp(p1.pose.z, p2.pose.z),
            yaw: p2.pose.yaw,
        },
        longitudinal_velocity_mps: lerp(
            p1.longitudinal_velocity_mps,
            p2.longitudinal_velocity_mps,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_straight(count: usize, spacing: f64) -> TrajectoryPoints {
        (0..count)
            .map(|i| TrajectoryPoint::new(Pose::new(i as f64 * spacing, 0.0, 0.0), 5.0))
            .collect()
    }

    fn make_points(coords: &[(f64, f64)]) -> TrajectoryPoints {
        coords
            .iter()
            .map(|&(x, y)| TrajectoryPoint::new(Pose::new(x, y, 0.0), 1.0))
            .collect()
    }

    #[test]
    fn test_braking_distance_formula() {
        // 5² / (2·2) + 1·5 = 11.25
        assert_relative_eq!(calc_braking_distance(5.0, 2.0, 1.0), 11.25);
    }

    #[test]
    fn test_braking_distance_min_and_jitter() {
        let param = Param {
            max_deceleration: 2.0,
            delay_time: 1.0,
            min_braking_distance: 1.0,
            ..Param::default()
        };

        assert_relative_eq!(estimate_braking_distance(5.0, &param), 11.25);
        assert_relative_eq!(estimate_braking_distance(-5.0, &param), 11.25);
        // Near-stop jitter snaps to zero speed, so the floor applies
        assert_relative_eq!(estimate_braking_distance(0.009, &param), 1.0);
        assert_relative_eq!(estimate_braking_distance(0.0, &param), 1.0);
    }

    #[test]
    fn test_arc_length() {
        assert_relative_eq!(calc_arc_length(&make_straight(10, 1.0)), 9.0);
        assert_relative_eq!(calc_arc_length(&make_points(&[(0.0, 0.0), (3.0, 4.0)])), 5.0);
        assert_relative_eq!(calc_arc_length(&make_straight(1, 1.0)), 0.0);
    }

    #[test]
    fn test_resample_skips_point_exactly_at_interval() {
        let input = make_straight(10, 1.0);
        let resampled = resample_trajectory(&input, 2.0).unwrap();

        // 2.0 is not more than 2.0, so index 2 is skipped in favour of index 3
        let xs: Vec<f64> = resampled.iter().map(|p| p.pose.x).collect();
        assert_eq!(xs, vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn test_resample_just_below_spacing() {
        let input = make_straight(10, 1.0);
        let resampled = resample_trajectory(&input, 1.9).unwrap();

        let xs: Vec<f64> = resampled.iter().map(|p| p.pose.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0, 6.0, 8.0, 9.0]);
    }

    #[test]
    fn test_resample_invariants() {
        let input = make_points(&[
            (0.0, 0.0),
            (0.4, 0.1),
            (1.5, 0.2),
            (1.6, 0.2),
            (3.0, 1.0),
            (3.1, 1.1),
        ]);
        let interval = 1.0;
        let resampled = resample_trajectory(&input, interval).unwrap();

        assert!(resampled.len() >= 2);
        assert!(resampled.len() <= input.len());
        assert_eq!(resampled.first(), input.first());
        assert_eq!(resampled.last(), input.last());
        for w in resampled[..resampled.len() - 1].windows(2) {
            assert!(w[0].pose.distance_2d(&w[1].pose) > interval);
        }
    }

    #[test]
    fn test_resample_two_points_unchanged() {
        let input = make_points(&[(0.0, 0.0), (0.1, 0.0)]);
        assert_eq!(resample_trajectory(&input, 5.0).unwrap(), input);
    }

    #[test]
    fn test_resample_rejects_short_input() {
        let input = make_straight(1, 1.0);
        assert!(matches!(
            resample_trajectory(&input, 1.0),
            Err(CheckerError::InsufficientPoints { required: 2, actual: 1, .. })
        ));
        assert!(resample_trajectory(&[], 1.0).is_err());
    }

    #[test]
    fn test_resample_rejects_bad_interval() {
        let input = make_straight(3, 1.0);
        assert!(resample_trajectory(&input, 0.0).is_err());
        assert!(resample_trajectory(&input, -1.0).is_err());
    }

    #[test]
    fn test_cut_longer_than_trajectory_is_identity() {
        let input = make_straight(5, 1.0);
        assert_eq!(cut_trajectory(&input, 4.0).unwrap(), input);
        assert_eq!(cut_trajectory(&input, 100.0).unwrap(), input);
    }

    #[test]
    fn test_cut_interpolates_last_point() {
        let input = make_points(&[(0.0, 0.0), (5.0, 0.0), (20.0, 0.0)]);
        let cut = cut_trajectory(&input, 11.25).unwrap();

        assert_eq!(cut.len(), 3);
        assert_relative_eq!(cut[2].pose.x, 11.25);
        assert_relative_eq!(cut[2].pose.y, 0.0);
        assert_relative_eq!(calc_arc_length(&cut), 11.25, epsilon = 1e-9);
    }

    #[test]
    fn test_cut_on_diagonal_segment() {
        let input = make_points(&[(0.0, 0.0), (3.0, 4.0), (6.0, 8.0)]);
        let cut = cut_trajectory(&input, 7.5).unwrap();

        assert_eq!(cut.len(), 3);
        assert_relative_eq!(cut[2].pose.x, 4.5, epsilon = 1e-9);
        assert_relative_eq!(cut[2].pose.y, 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cut_exactly_at_vertex_keeps_original_point() {
        let mut input = make_straight(5, 1.0);
        input[2].pose.yaw = 0.3;
        let cut = cut_trajectory(&input, 2.0).unwrap();

        assert_eq!(cut.len(), 3);
        assert_eq!(cut[2], input[2]);
    }

    #[test]
    fn test_cut_zero_length_keeps_first_point() {
        let input = make_straight(5, 1.0);
        let cut = cut_trajectory(&input, 0.0).unwrap();
        assert_eq!(cut, vec![input[0].clone()]);
    }

    #[test]
    fn test_cut_coincident_points_do_not_produce_nan() {
        let input = make_points(&[(0.0, 0.0), (0.0, 0.0), (2.0, 0.0)]);
        let cut = cut_trajectory(&input, 1.0).unwrap();

        assert_eq!(cut.len(), 3);
        assert!(cut.iter().all(|p| p.pose.x.is_finite() && p.pose.y.is_finite()));
        assert_relative_eq!(cut[2].pose.x, 1.0);
    }

    #[test]
    fn test_cut_interpolates_velocity() {
        let mut input = make_points(&[(0.0, 0.0), (10.0, 0.0)]);
        input[0].longitudinal_velocity_mps = 10.0;
        input[1].longitudinal_velocity_mps = 0.0;
        let cut = cut_trajectory(&input, 2.5).unwrap();

        assert_relative_eq!(cut[1].longitudinal_velocity_mps, 7.5);
    }

    #[test]
    fn test_cut_rejects_bad_input() {
        assert!(cut_trajectory(&[], 1.0).is_err());
        assert!(cut_trajectory(&make_straight(3, 1.0), -1.0).is_err());
    }
}
