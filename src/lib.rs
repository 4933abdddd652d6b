//! Lane departure checking for a planned vehicle trajectory
//!
//! Sweeps the vehicle outline along the predicted trajectory (cut to the
//! braking horizon) and reports whether it leaves the drivable lanelets or
//! touches an uncrossable map boundary.

pub mod boundary;
pub mod checker;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod footprint;
pub mod lanelet;
pub mod scenario;
pub mod trajectory;
pub mod types;

pub use checker::{Input, LaneDepartureChecker, Output};
pub use config::{CheckerConfig, Param, VehicleInfo};
pub use error::{CheckerError, Result};
