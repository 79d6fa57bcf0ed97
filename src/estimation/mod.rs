pub mod calibration;
pub mod collision;
pub mod heading;

pub use calibration::run_gyro_calibration;
pub use collision::{AccelSample, CollisionDetector};
pub use heading::HeadingIntegrator;
