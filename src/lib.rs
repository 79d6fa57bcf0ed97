pub mod behavior;
pub mod config;
pub mod constants;
pub mod error;
pub mod estimation;
pub mod output;
pub mod processing;
pub mod sensors;
pub mod signal_processing;
pub mod trace;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::SenseConfig;
pub use error::{Result, SenseError};
pub use processing::{MotionEstimator, MotionSnapshot};
