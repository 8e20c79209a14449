//! rendergrid-scheduler: admission-controlled GPU scheduler
//!
//! This crate decides when and where render jobs run:
//! - Telemetry probe querying per-device memory
//! - Threshold calibration from live usage sampling
//! - Free-memory admission control
//! - Round-robin GPU selection
//! - The scheduler loop and its run report

pub mod admission;
pub mod calibrate;
pub mod probe;
pub mod scheduler;
pub mod select;

pub use admission::AdmissionController;
pub use calibrate::ThresholdCalibrator;
pub use probe::{SmiProbe, TelemetryProbe};
pub use scheduler::{RenderScheduler, RunReport};
pub use select::RoundRobin;
