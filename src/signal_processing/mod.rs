pub mod math;
pub mod running_average;

pub use math::{
    atan2_degrees, internal_angle_to_degrees, internal_angle_to_signed_degrees,
    rate_to_internal_angle,
};
pub use running_average::{Accumulate, RunningAverage};
