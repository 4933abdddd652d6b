pub mod geometry;
pub mod linalg;

pub use geometry::*;
pub use linalg::*;

use geo::Coord;
use nalgebra::{Isometry2, Vector2};
use serde::{Deserialize, Serialize};

/// Planar pose with height, heading in radians (map frame)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    pub yaw: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Pose { x, y, z: 0.0, yaw }
    }

    pub fn coord(&self) -> Coord<f64> {
        Coord { x: self.x, y: self.y }
    }

    /// Rigid transform from the vehicle frame into the map frame
    pub fn isometry(&self) -> Isometry2<f64> {
        Isometry2::new(Vector2::new(self.x, self.y), self.yaw)
    }

    /// Planar (x, y) distance, height ignored
    pub fn distance_2d(&self, other: &Pose) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Twist {
    pub linear_x: f64,
    #[serde(default)]
    pub angular_z: f64,
}

/// Pose with a 6x6 row-major covariance over (x, y, z, roll, pitch, yaw)
///
/// An empty covariance means "no uncertainty".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseWithCovariance {
    pub pose: Pose,
    #[serde(default)]
    pub covariance: Vec<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Odometry {
    pub pose: PoseWithCovariance,
    pub twist: Twist,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub pose: Pose,
    #[serde(default)]
    pub longitudinal_velocity_mps: f64,
}

impl TrajectoryPoint {
    pub fn new(pose: Pose, longitudinal_velocity_mps: f64) -> Self {
        TrajectoryPoint {
            pose,
            longitudinal_velocity_mps,
        }
    }
}

pub type TrajectoryPoints = Vec<TrajectoryPoint>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub points: TrajectoryPoints,
}

impl Trajectory {
    pub fn new(points: TrajectoryPoints) -> Self {
        Trajectory { points }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub pose: Pose,
    #[serde(default)]
    pub longitudinal_velocity_mps: f64,
    #[serde(default)]
    pub lane_ids: Vec<i64>,
}

/// Discretised path tagged with the lane ids each point belongs to
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathWithLaneId {
    pub points: Vec<PathPoint>,
}

/// Anything sampled along a path that carries a pose
pub trait HasPose {
    fn pose(&self) -> &Pose;
}

impl HasPose for Pose {
    fn pose(&self) -> &Pose {
        self
    }
}

impl HasPose for TrajectoryPoint {
    fn pose(&self) -> &Pose {
        &self.pose
    }
}

impl HasPose for PathPoint {
    fn pose(&self) -> &Pose {
        &self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    #[test]
    fn test_distance_2d_ignores_height() {
        let a = Pose { x: 0.0, y: 0.0, z: 0.0, yaw: 0.0 };
        let b = Pose { x: 3.0, y: 4.0, z: 10.0, yaw: 1.0 };
        assert_relative_eq!(a.distance_2d(&b), 5.0);
    }

    #[test]
    fn test_isometry_rotates_then_translates() {
        let pose = Pose::new(10.0, 5.0, std::f64::consts::FRAC_PI_2);
        let p = pose.isometry() * Point2::new(1.0, 0.0);
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_trajectory_point_deserialize_defaults() {
        let json = r#"{ "pose": { "x": 1.0, "y": 2.0, "yaw": 0.5 } }"#;
        let point: TrajectoryPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.pose.z, 0.0);
        assert_eq!(point.longitudinal_velocity_mps, 0.0);
    }
}
