use crate::constants::{DPS_TO_INTERNAL_ANGLE_DEN, DPS_TO_INTERNAL_ANGLE_NUM};

/// Two-argument arctangent in degrees, `(-180, 180]`
pub fn atan2_degrees(y: f32, x: f32) -> f32 {
    y.atan2(x).to_degrees()
}

/// Whole degrees `[0, 360)` of an internal angle (full `u32` range = one turn)
pub fn internal_angle_to_degrees(angle: u32) -> u32 {
    ((angle >> 16) * 360) >> 16
}

/// Whole degrees `[-180, 180)` of an internal angle read as signed
pub fn internal_angle_to_signed_degrees(angle: u32) -> i32 {
    ((angle as i32 >> 16) * 360) >> 16
}

/// Internal angle units swept by `rate` gyro digits over `elapsed_us`
///
/// The product is formed in 128 bits before dividing, so any `i32` rate
/// over any `u32` interval is exact. The result is truncated to `u32` so
/// adding it to a heading wraps modulo one full turn.
///
/// # Arguments
/// * `rate` - Bias-corrected angular rate in gyro digits
/// * `elapsed_us` - Time since the previous update in microseconds
///
/// # Returns
/// Signed angle increment, as a wrapping `u32` in internal units
pub fn rate_to_internal_angle(rate: i32, elapsed_us: u32) -> u32 {
    let d = rate as i128 * elapsed_us as i128;
    (d * DPS_TO_INTERNAL_ANGLE_NUM as i128 / DPS_TO_INTERNAL_ANGLE_DEN as i128) as u32
}
