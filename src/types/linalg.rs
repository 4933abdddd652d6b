//! Linear algebra helpers for pose uncertainty
//!
//! Pose covariance arrives as a flat 6x6 row-major array over
//! (x, y, z, roll, pitch, yaw); only the planar position block is used.

use crate::error::{CheckerError, Result};
use nalgebra::{Matrix2, Rotation2};

// ===== Covariance Dimensions =====
pub const POSE_COV_DIM: usize = 6;
pub const POSE_COV_LEN: usize = POSE_COV_DIM * POSE_COV_DIM; // 36

pub type PlanarCovariance = Matrix2<f64>;

/// Extract the (x, y) block of a row-major 6x6 pose covariance
///
/// An empty slice yields a zero matrix.
pub fn planar_covariance(covariance: &[f64]) -> Result<PlanarCovariance> {
    if covariance.is_empty() {
        return Ok(PlanarCovariance::zeros());
    }
    if covariance.len() != POSE_COV_LEN {
        return Err(CheckerError::InvalidParameter(format!(
            "pose covariance must have {} entries, got {}",
            POSE_COV_LEN,
            covariance.len()
        )));
    }

    Ok(PlanarCovariance::new(
        covariance[0],
        covariance[1],
        covariance[POSE_COV_DIM],
        covariance[POSE_COV_DIM + 1],
    ))
}

/// Express a map-frame planar covariance in a frame rotated by `yaw`
///
/// C_vehicle = R(-yaw) * C_map * R(-yaw)^T
pub fn rotate_covariance_into_frame(cov_map: &PlanarCovariance, yaw: f64) -> PlanarCovariance {
    let r = Rotation2::new(-yaw).into_inner();
    r * cov_map * r.transpose()
}
