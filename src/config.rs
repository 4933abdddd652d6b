use crate::error::{CheckerError, Result};
use crate::types::{polygon_from_coords, Footprint};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tuning parameters of the departure checker
///
/// All lengths in metres, times in seconds, accelerations in m/s².
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Param {
    /// Multiplier applied to the pose variance when inflating the footprint
    pub footprint_margin_scale: f64,
    /// Minimum spacing kept between resampled trajectory points
    pub resample_interval: f64,
    pub max_deceleration: f64,
    pub delay_time: f64,
    pub max_lateral_deviation: f64,
    pub max_longitudinal_deviation: f64,
    pub max_yaw_deviation_deg: f64,
    pub min_braking_distance: f64,
    // nearest search to ego
    pub ego_nearest_dist_threshold: f64,
    pub ego_nearest_yaw_threshold: f64,
    /// Linestring types treated as uncrossable (e.g. "road_border", "curbstone")
    pub boundary_types_to_detect: Vec<String>,
}

impl Default for Param {
    fn default() -> Self {
        Param {
            footprint_margin_scale: 1.0,
            resample_interval: 0.3,
            max_deceleration: 2.8,
            delay_time: 1.3,
            max_lateral_deviation: 2.0,
            max_longitudinal_deviation: 2.0,
            max_yaw_deviation_deg: 60.0,
            min_braking_distance: 0.0,
            ego_nearest_dist_threshold: 3.0,
            ego_nearest_yaw_threshold: 1.046,
            boundary_types_to_detect: vec!["road_border".to_string()],
        }
    }
}

impl Param {
    pub fn validate(&self) -> Result<()> {
        if !(self.resample_interval > 0.0) {
            return Err(invalid("resample_interval must be > 0", self.resample_interval));
        }
        if !(self.max_deceleration > 0.0) {
            return Err(invalid("max_deceleration must be > 0", self.max_deceleration));
        }

        let non_negative = [
            ("footprint_margin_scale", self.footprint_margin_scale),
            ("delay_time", self.delay_time),
            ("min_braking_distance", self.min_braking_distance),
            ("max_lateral_deviation", self.max_lateral_deviation),
            ("max_longitudinal_deviation", self.max_longitudinal_deviation),
            ("max_yaw_deviation_deg", self.max_yaw_deviation_deg),
            ("ego_nearest_dist_threshold", self.ego_nearest_dist_threshold),
            ("ego_nearest_yaw_threshold", self.ego_nearest_yaw_threshold),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(CheckerError::InvalidParameter(format!(
                    "{} must be >= 0, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

fn invalid(msg: &str, value: f64) -> CheckerError {
    CheckerError::InvalidParameter(format!("{}, got {}", msg, value))
}

/// Physical vehicle dimensions (metres, base_link at the rear axle centre)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleInfo {
    pub wheel_base: f64,
    pub wheel_tread: f64,
    pub front_overhang: f64,
    pub rear_overhang: f64,
    pub left_overhang: f64,
    pub right_overhang: f64,
}

impl Default for VehicleInfo {
    fn default() -> Self {
        VehicleInfo {
            wheel_base: 2.79,
            wheel_tread: 1.64,
            front_overhang: 1.0,
            rear_overhang: 1.1,
            left_overhang: 0.128,
            right_overhang: 0.128,
        }
    }
}

impl VehicleInfo {
    pub fn max_longitudinal_offset(&self) -> f64 {
        self.front_overhang + self.wheel_base
    }

    pub fn min_longitudinal_offset(&self) -> f64 {
        -self.rear_overhang
    }

    pub fn max_lateral_offset(&self) -> f64 {
        self.wheel_tread / 2.0 + self.left_overhang
    }

    pub fn min_lateral_offset(&self) -> f64 {
        -(self.wheel_tread / 2.0 + self.right_overhang)
    }

    pub fn vehicle_length(&self) -> f64 {
        self.front_overhang + self.wheel_base + self.rear_overhang
    }

    pub fn vehicle_width(&self) -> f64 {
        self.wheel_tread + self.left_overhang + self.right_overhang
    }

    /// Distance from base_link to the farthest corner of the outline
    pub fn max_radial_extent(&self) -> f64 {
        let max_lon = self
            .max_longitudinal_offset()
            .abs()
            .max(self.min_longitudinal_offset().abs());
        let max_lat = self
            .max_lateral_offset()
            .abs()
            .max(self.min_lateral_offset().abs());
        max_lon.hypot(max_lat)
    }

    /// Vehicle outline in base_link, grown by the given margins
    ///
    /// Six vertices, counter-clockwise from front-left; the ring is closed.
    pub fn create_footprint(&self, lat_margin: f64, lon_margin: f64) -> Footprint {
        let x_front = self.max_longitudinal_offset() + lon_margin;
        let x_center = self.wheel_base / 2.0;
        let x_rear = self.min_longitudinal_offset() - lon_margin;
        let y_left = self.max_lateral_offset() + lat_margin;
        let y_right = self.min_lateral_offset() - lat_margin;

        polygon_from_coords(&[
            (x_front, y_left),
            (x_front, y_right),
            (x_center, y_right),
            (x_rear, y_right),
            (x_rear, y_left),
            (x_center, y_left),
            (x_front, y_left),
        ])
    }

    pub fn validate(&self) -> Result<()> {
        let dims = [
            ("wheel_base", self.wheel_base),
            ("wheel_tread", self.wheel_tread),
            ("front_overhang", self.front_overhang),
            ("rear_overhang", self.rear_overhang),
            ("left_overhang", self.left_overhang),
            ("right_overhang", self.right_overhang),
        ];
        for (name, value) in dims {
            if !(value >= 0.0) {
                return Err(CheckerError::InvalidParameter(format!(
                    "vehicle {} must be >= 0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Complete configuration snapshot for one checker instance
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    pub param: Param,
    pub vehicle_info: VehicleInfo,
}

impl CheckerConfig {
    pub fn validate(&self) -> Result<()> {
        self.param.validate()?;
        self.vehicle_info.validate()
    }
}

/// Parse and validate a configuration document
pub fn parse_config(json: &str) -> Result<CheckerConfig> {
    let config: CheckerConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load `{ "param": {...}, "vehicle_info": {...} }` from a JSON file
pub fn load_config(path: &Path) -> Result<CheckerConfig> {
    let json = fs::read_to_string(path)?;
    let config = parse_config(&json)?;
    log::info!("Loaded checker config from {}", path.display());
    Ok(config)
}
