mod imu;
mod profile;

pub use imu::{simulate, true_heading_degrees};
pub use profile::{ImpactConfig, SimulationConfig, TurnSegment};
