use crate::boundary::{
    calc_max_search_length_for_boundaries, extract_uncrossable_boundaries, will_cross_boundary,
};
use crate::config::{CheckerConfig, Param, VehicleInfo};
use crate::error::{ensure_points, Result};
use crate::footprint::{
    create_vehicle_footprints, create_vehicle_footprints_without_margin,
    create_vehicle_passing_areas,
};
use crate::lanelet::{
    check_path_will_leave_lane, crop_points_outside_of_lanes, get_candidate_lanelets,
    get_fused_lanelet_polygon_for_path, get_lanelets_from_path, is_out_of_lane, will_leave_lane,
    Lanelet, LaneletMap,
};
use crate::trajectory::{
    calc_trajectory_deviation, cut_trajectory, estimate_braking_distance, resample_trajectory,
    PoseDeviation,
};
use crate::types::{Footprint, Odometry, PathWithLaneId, Trajectory, TrajectoryPoints};
use geo::MultiPolygon;
use std::collections::BTreeMap;
use std::time::Instant;

/// Snapshot of everything one check reads
pub struct Input<'a> {
    pub current_odom: &'a Odometry,
    pub lanelet_map: &'a LaneletMap,
    pub route_lanelets: &'a [Lanelet],
    pub shoulder_lanelets: &'a [Lanelet],
    pub reference_trajectory: &'a Trajectory,
    pub predicted_trajectory: &'a Trajectory,
}

#[derive(Clone, Debug, Default)]
pub struct Output {
    /// Stage name -> elapsed milliseconds
    pub processing_time_map: BTreeMap<String, f64>,
    pub will_leave_lane: bool,
    pub is_out_of_lane: bool,
    pub will_cross_boundary: bool,
    pub trajectory_deviation: PoseDeviation,
    pub candidate_lanelets: Vec<Lanelet>,
    pub resampled_trajectory: TrajectoryPoints,
    pub vehicle_footprints: Vec<Footprint>,
    pub vehicle_passing_areas: Vec<Footprint>,
}

struct StopWatch {
    start: Instant,
}

impl StopWatch {
    fn new() -> Self {
        StopWatch {
            start: Instant::now(),
        }
    }

    /// Elapsed milliseconds since the last reset
    fn toc_ms(&mut self, reset: bool) -> f64 {
        let elapsed = self.start.elapsed().as_secs_f64() * 1000.0;
        if reset {
            self.start = Instant::now();
        }
        elapsed
    }
}

/// Lane departure checker
///
/// # Architecture
/// - Holds the configuration snapshot (`Param`, `VehicleInfo`); setters need
///   `&mut self`, `update` only `&self`, so configuration is fixed for the
///   duration of a check
/// - Every intermediate (footprints, hulls, boundary index) is rebuilt per
///   call; nothing is cached between calls
///
/// # Usage
/// ```no_run
/// use lane_departure_rs::checker::{Input, LaneDepartureChecker};
/// use lane_departure_rs::config::{Param, VehicleInfo};
///
/// let checker = LaneDepartureChecker::new(Param::default(), VehicleInfo::default());
/// # let input: Input = unimplemented!();
/// let output = checker.update(&input)?;
/// if output.will_leave_lane {
///     println!("departure ahead");
/// }
/// # Ok::<(), lane_departure_rs::error::CheckerError>(())
/// ```
#[derive(Clone, Debug)]
pub struct LaneDepartureChecker {
    param: Param,
    vehicle_info: VehicleInfo,
}

impl LaneDepartureChecker {
    pub fn new(param: Param, vehicle_info: VehicleInfo) -> Self {
        LaneDepartureChecker {
            param,
            vehicle_info,
        }
    }

    /// Build from a validated configuration
    pub fn from_config(config: CheckerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.param, config.vehicle_info))
    }

    pub fn param(&self) -> &Param {
        &self.param
    }

    pub fn vehicle_info(&self) -> &VehicleInfo {
        &self.vehicle_info
    }

    pub fn set_param(&mut self, param: Param) {
        self.param = param;
    }

    pub fn set_vehicle_info(&mut self, vehicle_info: VehicleInfo) {
        self.vehicle_info = vehicle_info;
    }

    pub fn set_config(&mut self, config: CheckerConfig) {
        self.param = config.param;
        self.vehicle_info = config.vehicle_info;
    }

    /// Run one full departure check
    ///
    /// # Errors
    /// `InsufficientPoints` when the reference trajectory is empty or the
    /// predicted trajectory has fewer than two points; `InvalidParameter` for
    /// a non-positive resample interval or malformed covariance.
    pub fn update(&self, input: &Input) -> Result<Output> {
        ensure_points("reference trajectory", 1, input.reference_trajectory.points.len())?;
        ensure_points("predicted trajectory", 2, input.predicted_trajectory.points.len())?;

        let mut output = Output::default();
        let mut stop_watch = StopWatch::new();

        output.trajectory_deviation = calc_trajectory_deviation(
            input.reference_trajectory,
            &input.current_odom.pose.pose,
            self.param.ego_nearest_dist_threshold,
            self.param.ego_nearest_yaw_threshold,
        )?;
        record(&mut output, "trajectory_deviation", &mut stop_watch);

        {
            let braking_distance =
                estimate_braking_distance(input.current_odom.twist.linear_x, &self.param);

            output.resampled_trajectory = cut_trajectory(
                &resample_trajectory(
                    &input.predicted_trajectory.points,
                    self.param.resample_interval,
                )?,
                braking_distance,
            )?;
            record(&mut output, "resample_trajectory", &mut stop_watch);
        }

        output.vehicle_footprints = create_vehicle_footprints(
            &self.vehicle_info,
            &input.current_odom.pose,
            &output.resampled_trajectory,
            self.param.footprint_margin_scale,
        )?;
        record(&mut output, "create_vehicle_footprints", &mut stop_watch);

        output.vehicle_passing_areas = create_vehicle_passing_areas(&output.vehicle_footprints);
        record(&mut output, "create_vehicle_passing_areas", &mut stop_watch);

        let candidate_road_lanelets =
            get_candidate_lanelets(input.route_lanelets, &output.vehicle_footprints);
        let candidate_shoulder_lanelets =
            get_candidate_lanelets(input.shoulder_lanelets, &output.vehicle_footprints);
        output.candidate_lanelets = candidate_road_lanelets;
        output.candidate_lanelets.extend(candidate_shoulder_lanelets);
        if output.candidate_lanelets.is_empty() {
            log::warn!("No candidate lanelets around the footprint sweep; treating as out of lane");
        }
        record(&mut output, "get_candidate_lanelets", &mut stop_watch);

        output.will_leave_lane =
            will_leave_lane(&output.candidate_lanelets, &output.vehicle_footprints);
        record(&mut output, "will_leave_lane", &mut stop_watch);

        // Non-empty: the cut trajectory always keeps its first point
        output.is_out_of_lane = output
            .vehicle_footprints
            .first()
            .map(|footprint| is_out_of_lane(&output.candidate_lanelets, footprint))
            .unwrap_or(true);
        record(&mut output, "is_out_of_lane", &mut stop_watch);

        let max_search_length_for_boundaries = calc_max_search_length_for_boundaries(
            &input.predicted_trajectory.points,
            &self.vehicle_info,
        );
        let uncrossable_boundaries = extract_uncrossable_boundaries(
            input.lanelet_map.line_strings(),
            input.predicted_trajectory.points[0].pose.coord(),
            max_search_length_for_boundaries,
            &self.param.boundary_types_to_detect,
        );
        output.will_cross_boundary =
            will_cross_boundary(&output.vehicle_footprints, &uncrossable_boundaries);
        record(&mut output, "will_cross_boundary", &mut stop_watch);

        log::debug!(
            "will_leave_lane={} is_out_of_lane={} will_cross_boundary={} footprints={} candidates={} times={:?}",
            output.will_leave_lane,
            output.is_out_of_lane,
            output.will_cross_boundary,
            output.vehicle_footprints.len(),
            output.candidate_lanelets.len(),
            output.processing_time_map
        );

        Ok(output)
    }

    /// Per-vertex departure test of a path against a given lanelet set
    pub fn check_path_will_leave_lane_in(
        &self,
        lanelets: &[Lanelet],
        path: &PathWithLaneId,
    ) -> Result<bool> {
        let vehicle_footprints =
            create_vehicle_footprints_without_margin(&self.vehicle_info, &path.points)?;
        let candidate_lanelets = get_candidate_lanelets(lanelets, &vehicle_footprints);
        Ok(will_leave_lane(&candidate_lanelets, &vehicle_footprints))
    }

    pub fn get_lanelets_from_path<'a>(
        &self,
        lanelet_map: &'a LaneletMap,
        path: &PathWithLaneId,
    ) -> Result<Vec<(f64, &'a Lanelet)>> {
        get_lanelets_from_path(&self.vehicle_info, lanelet_map, path)
    }

    pub fn get_fused_lanelet_polygon_for_path(
        &self,
        lanelet_map: &LaneletMap,
        path: &PathWithLaneId,
    ) -> Result<Option<MultiPolygon<f64>>> {
        get_fused_lanelet_polygon_for_path(&self.vehicle_info, lanelet_map, path)
    }

    /// Full-containment departure test of a path against the fused map region
    pub fn check_path_will_leave_lane(
        &self,
        lanelet_map: &LaneletMap,
        path: &PathWithLaneId,
    ) -> Result<bool> {
        check_path_will_leave_lane(&self.vehicle_info, lanelet_map, path)
    }

    pub fn crop_points_outside_of_lanes(
        &self,
        lanelet_map: &LaneletMap,
        path: &PathWithLaneId,
        end_index: usize,
    ) -> Result<PathWithLaneId> {
        crop_points_outside_of_lanes(&self.vehicle_info, lanelet_map, path, end_index)
    }
}

fn record(output: &mut Output, stage: &str, stop_watch: &mut StopWatch) {
    output
        .processing_time_map
        .insert(stage.to_string(), stop_watch.toc_ms(true));
}
