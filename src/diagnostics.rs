use crate::checker::Output;
use crate::config::Param;
use crate::trajectory::PoseDeviation;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Ok,
    Warn,
    Error,
}

/// Summarised health of one check result
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiagnosticStatus {
    pub level: DiagnosticLevel,
    pub message: String,
}

impl DiagnosticStatus {
    fn new(level: DiagnosticLevel, message: &str) -> Self {
        DiagnosticStatus {
            level,
            message: message.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.level == DiagnosticLevel::Ok
    }
}

/// Error when already out of lane, warning for a predicted departure
pub fn lane_departure_status(output: &Output) -> DiagnosticStatus {
    if output.is_out_of_lane {
        return DiagnosticStatus::new(DiagnosticLevel::Error, "vehicle is out of lane");
    }
    if output.will_leave_lane {
        return DiagnosticStatus::new(DiagnosticLevel::Warn, "vehicle will leave lane");
    }
    if output.will_cross_boundary {
        return DiagnosticStatus::new(DiagnosticLevel::Warn, "vehicle will cross boundary");
    }
    DiagnosticStatus::new(DiagnosticLevel::Ok, "OK")
}

/// Error when any deviation component reaches its limit
pub fn trajectory_deviation_status(deviation: &PoseDeviation, param: &Param) -> DiagnosticStatus {
    let exceeded: Vec<&str> = [
        (
            "lateral",
            deviation.lateral.abs() >= param.max_lateral_deviation,
        ),
        (
            "longitudinal",
            deviation.longitudinal.abs() >= param.max_longitudinal_deviation,
        ),
        (
            "yaw",
            deviation.yaw.abs() >= param.max_yaw_deviation_deg.to_radians(),
        ),
    ]
    .into_iter()
    .filter(|(_, over)| *over)
    .map(|(name, _)| name)
    .collect();

    if exceeded.is_empty() {
        return DiagnosticStatus::new(DiagnosticLevel::Ok, "OK");
    }

    DiagnosticStatus {
        level: DiagnosticLevel::Error,
        message: format!("trajectory deviation is too large: {}", exceeded.join(", ")),
    }
}
