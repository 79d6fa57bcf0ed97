//! Hardware collaborators
//!
//! The estimators only see these traits. Reads are blocking and infallible:
//! the bus returns whatever is in the output registers, and a dead bus shows
//! up as stuck values rather than as an error.

pub mod mock;

use crate::config::{AccelConfig, GyroFilterConfig};

/// Raw three-axis register reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vector3<T> {
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

pub trait Accelerometer {
    /// Read the acceleration output registers
    fn read_acceleration(&mut self) -> Vector3<i16>;
}

pub trait Gyroscope {
    /// Whether a new angular-rate sample is available (status register ZYXDA)
    fn data_ready(&mut self) -> bool;

    /// Read the angular-rate output registers
    fn read_rate(&mut self) -> Vector3<i16>;
}

/// The combined IMU as wired on the robot
pub trait ImuBus: Accelerometer + Gyroscope {
    fn configure_accelerometer(&mut self, config: &AccelConfig);

    fn configure_gyro(&mut self, filter: &GyroFilterConfig);
}

/// Free-running hardware counters
///
/// Both counters wrap at 32 bits; callers take differences with
/// `wrapping_sub`.
pub trait Clock {
    fn millis(&self) -> u32;

    fn micros(&self) -> u32;

    /// Busy-wait for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// Text output used by calibration routines (LCD or serial)
pub trait Display {
    fn clear(&mut self);

    fn print(&mut self, text: &str);

    /// Move the cursor without clearing
    fn goto_xy(&mut self, _col: u8, _row: u8) {}

    /// Status LED shown while calibrating
    fn set_indicator(&mut self, _on: bool) {}
}

pub trait Button {
    /// True once per debounced press-and-release
    fn released(&mut self) -> bool;
}
