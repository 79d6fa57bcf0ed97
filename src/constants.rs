//! Fixed-point and hardware constants
//!
//! Heading is kept as a `u32` where the full range is one full turn, so
//! 0x2000_0000 is 45 degrees and wrapping addition is modulo-360 arithmetic.

/// Internal angle units for a 45 degree turn.
pub const TURN_ANGLE_45: u32 = 0x2000_0000;

/// Internal angle units for a 90 degree turn.
pub const TURN_ANGLE_90: u32 = TURN_ANGLE_45 * 2;

/// Internal angle units for a 1 degree turn (rounded).
pub const TURN_ANGLE_1: u32 = (TURN_ANGLE_45 + 22) / 45;

/// Radians to internal angle units (0x8000_0000 / pi).
pub const RAD_TO_INTERNAL_ANGLE: u32 = 0x28BE_60DB;

/// Numerator of the gyro digit·µs to internal angle conversion.
///
/// (0.07 dps/digit) * (1/1_000_000 s/µs) * (2^29/45 unit/degree)
/// = 14680063/17578125 unit/(digit*µs)
pub const DPS_TO_INTERNAL_ANGLE_NUM: i64 = 14_680_063;

/// Denominator of the gyro digit·µs to internal angle conversion.
pub const DPS_TO_INTERNAL_ANGLE_DEN: i64 = 17_578_125;

/// L3GD20H sensitivity at the default full scale, degrees per second per digit.
pub const GYRO_DPS_PER_DIGIT: f32 = 0.07;

/// Number of stationary gyro samples averaged into the zero-rate bias.
pub const GYRO_CALIB_COUNT: u32 = 512;

/// Gyro CTRL1 value: 800 Hz output data rate, 100 Hz bandwidth, all axes on.
pub const GYRO_LOW_PASS: u8 = 0b1111_1111;

/// Gyro CTRL4 value: 2000 dps full scale.
pub const GYRO_MED_PASS: u8 = 0b0010_0000;

/// Gyro CTRL5 value: high-pass filter disabled.
pub const GYRO_HIGH_PASS: u8 = 0b0000_0000;

/// Accelerometer CTRL_REG1_A: normal power mode, all axes enabled.
pub const ACCEL_CTRL_REG1: u8 = 0x27;

/// Accelerometer CTRL_REG4_A: high resolution mode (LSM303DLHC only).
pub const ACCEL_CTRL_REG4_HIGH_RES: u8 = 0x08;

/// Smoothed XY acceleration above this magnitude counts as contact (raw units).
pub const XY_ACCELERATION_THRESHOLD: i32 = 2400;

/// Window of the per-axis acceleration running average.
pub const ACCEL_SMOOTHING_WINDOW: usize = 3;

/// Time to let the gyro settle after configuration before calibrating.
pub const GYRO_SETTLE_MS: u32 = 400;
