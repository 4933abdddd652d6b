//! Offline scenario documents
//!
//! # File Format
//! One JSON object, optionally gzip-compressed (`*.json.gz`):
//! ```text
//! {
//!   "config": { "param": {...}, "vehicle_info": {...} },   // optional
//!   "current_odom": { "pose": { "pose": {...}, "covariance": [...] }, "twist": {...} },
//!   "lanelets": [ { "id": 1, "polygon": [[x, y], ...] } ],
//!   "line_strings": [ { "id": 10, "type": "road_border", "coords": [[x, y], ...] } ],
//!   "route_lanelet_ids": [1],
//!   "shoulder_lanelet_ids": [],
//!   "reference_trajectory": { "points": [...] },
//!   "predicted_trajectory": { "points": [...] }
//! }
//! ```

use crate::checker::{Input, Output};
use crate::config::CheckerConfig;
use crate::error::Result;
use crate::lanelet::{Lanelet, LaneletMap, MapLineString};
use crate::types::{polygon_from_coords, polygon_to_coords, Odometry, Trajectory};
use flate2::read::GzDecoder;
use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Serializable wrapper for Lanelet (geo types don't derive Serialize)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerializableLanelet {
    pub id: u64,
    /// Outer ring; closing vertex optional
    pub polygon: Vec<(f64, f64)>,
}

impl From<&Lanelet> for SerializableLanelet {
    fn from(lanelet: &Lanelet) -> Self {
        SerializableLanelet {
            id: lanelet.id,
            polygon: polygon_to_coords(&lanelet.polygon),
        }
    }
}

impl From<SerializableLanelet> for Lanelet {
    fn from(ser: SerializableLanelet) -> Self {
        Lanelet::new(ser.id, polygon_from_coords(&ser.polygon))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerializableLineString {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub line_type: Option<String>,
    pub coords: Vec<(f64, f64)>,
}

impl From<&MapLineString> for SerializableLineString {
    fn from(ls: &MapLineString) -> Self {
        SerializableLineString {
            id: ls.id,
            line_type: ls.line_type.clone(),
            coords: ls.geometry.0.iter().map(|c| (c.x, c.y)).collect(),
        }
    }
}

impl From<SerializableLineString> for MapLineString {
    fn from(ser: SerializableLineString) -> Self {
        let points: Vec<Coord<f64>> = ser
            .coords
            .into_iter()
            .map(|(x, y)| Coord { x, y })
            .collect();

        MapLineString {
            id: ser.id,
            line_type: ser.line_type,
            geometry: LineString::new(points),
        }
    }
}

/// On-disk scenario document
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: Option<CheckerConfig>,
    pub current_odom: Odometry,
    #[serde(default)]
    pub lanelets: Vec<SerializableLanelet>,
    #[serde(default)]
    pub line_strings: Vec<SerializableLineString>,
    #[serde(default)]
    pub route_lanelet_ids: Vec<u64>,
    #[serde(default)]
    pub shoulder_lanelet_ids: Vec<u64>,
    pub reference_trajectory: Trajectory,
    pub predicted_trajectory: Trajectory,
}

/// Scenario with the map built and lanelet ids resolved
pub struct PreparedScenario {
    pub config: Option<CheckerConfig>,
    pub current_odom: Odometry,
    pub lanelet_map: LaneletMap,
    pub route_lanelets: Vec<Lanelet>,
    pub shoulder_lanelets: Vec<Lanelet>,
    pub reference_trajectory: Trajectory,
    pub predicted_trajectory: Trajectory,
}

impl Scenario {
    pub fn prepare(self) -> PreparedScenario {
        let lanelets: Vec<Lanelet> = self.lanelets.into_iter().map(Lanelet::from).collect();
        let line_strings: Vec<MapLineString> =
            self.line_strings.into_iter().map(MapLineString::from).collect();
        let lanelet_map = LaneletMap::new(lanelets, line_strings);

        let route_lanelets = resolve_lanelets(&lanelet_map, &self.route_lanelet_ids, "route");
        let shoulder_lanelets =
            resolve_lanelets(&lanelet_map, &self.shoulder_lanelet_ids, "shoulder");

        PreparedScenario {
            config: self.config,
            current_odom: self.current_odom,
            lanelet_map,
            route_lanelets,
            shoulder_lanelets,
            reference_trajectory: self.reference_trajectory,
            predicted_trajectory: self.predicted_trajectory,
        }
    }
}

fn resolve_lanelets(lanelet_map: &LaneletMap, ids: &[u64], role: &str) -> Vec<Lanelet> {
    let lanelets = lanelet_map.lanelets_by_ids(ids);
    if lanelets.len() != ids.len() {
        log::warn!(
            "{} of {} {} lanelet id(s) not found in map",
            ids.len() - lanelets.len(),
            ids.len(),
            role
        );
    }
    lanelets
}

impl PreparedScenario {
    pub fn input(&self) -> Input<'_> {
        Input {
            current_odom: &self.current_odom,
            lanelet_map: &self.lanelet_map,
            route_lanelets: &self.route_lanelets,
            shoulder_lanelets: &self.shoulder_lanelets,
            reference_trajectory: &self.reference_trajectory,
            predicted_trajectory: &self.predicted_trajectory,
        }
    }
}

pub fn parse_scenario(json: &str) -> Result<Scenario> {
    Ok(serde_json::from_str(json)?)
}

/// Load a scenario from `.json` or `.json.gz`
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let file = File::open(path)?;
    let scenario: Scenario = if path.extension().map(|e| e == "gz").unwrap_or(false) {
        serde_json::from_reader(BufReader::new(GzDecoder::new(file)))?
    } else {
        serde_json::from_reader(BufReader::new(file))?
    };

    log::info!(
        "Loaded scenario {}: {} lanelet(s), {} linestring(s), {} predicted point(s)",
        path.display(),
        scenario.lanelets.len(),
        scenario.line_strings.len(),
        scenario.predicted_trajectory.points.len()
    );
    Ok(scenario)
}

/// JSON view of a check result; polygons as `[[x, y], ...]`
pub fn output_to_json(output: &Output) -> Value {
    let polygons = |items: &[geo::Polygon<f64>]| -> Vec<Vec<(f64, f64)>> {
        items.iter().map(polygon_to_coords).collect()
    };

    json!({
        "will_leave_lane": output.will_leave_lane,
        "is_out_of_lane": output.is_out_of_lane,
        "will_cross_boundary": output.will_cross_boundary,
        "trajectory_deviation": output.trajectory_deviation,
        "candidate_lanelet_ids": output.candidate_lanelets.iter().map(|l| l.id).collect::<Vec<_>>(),
        "resampled_trajectory": output.resampled_trajectory,
        "vehicle_footprints": polygons(&output.vehicle_footprints),
        "vehicle_passing_areas": polygons(&output.vehicle_passing_areas),
        "processing_time_ms": output.processing_time_map,
    })
}
