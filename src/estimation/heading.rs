use crate::constants::GYRO_DPS_PER_DIGIT;
use crate::error::{Result, SenseError};
use crate::sensors::Gyroscope;
use crate::signal_processing::{
    internal_angle_to_degrees, internal_angle_to_signed_degrees, rate_to_internal_angle,
};

/// Gyro heading integrator
///
/// Integrates the bias-corrected Z angular rate over the microsecond clock
/// into a `u32` heading where the full range is one full turn. Both the
/// clock and the heading wrap on purpose: elapsed time is a wrapping
/// difference (correct across at most one counter wrap between updates) and
/// turning past 360 degrees wraps the heading back through zero.
#[derive(Debug, Clone, Default)]
pub struct HeadingIntegrator {
    last_tick_us: u32,
    bias: i16,
    rate: i32,
    angle: u32,
}

impl HeadingIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Average `sample_count` Z readings into the zero-rate bias
    ///
    /// The robot must be stationary. Busy-waits on the gyro's data-ready
    /// flag before every read with no timeout, so a gyro that never reports
    /// ready blocks forever; see [`calibrate_bounded`](Self::calibrate_bounded).
    ///
    /// # Arguments
    /// * `gyro` - Gyroscope polled for data-ready and Z rate
    /// * `sample_count` - Readings to average; zero keeps the current bias
    pub fn calibrate<G: Gyroscope + ?Sized>(&mut self, gyro: &mut G, sample_count: u32) {
        if sample_count == 0 {
            log::warn!("Gyro calibration with zero samples, keeping bias {}", self.bias);
            return;
        }

        let mut total: i64 = 0;
        for _ in 0..sample_count {
            while !gyro.data_ready() {
                std::hint::spin_loop();
            }
            total += gyro.read_rate().z as i64;
        }

        self.bias = (total / sample_count as i64) as i16;
        log::debug!("Gyro bias {} from {} samples", self.bias, sample_count);
    }

    /// Like [`calibrate`](Self::calibrate) but gives up when a sample is not
    /// ready within `max_polls` status reads
    ///
    /// On timeout the previous bias is kept.
    pub fn calibrate_bounded<G: Gyroscope + ?Sized>(
        &mut self,
        gyro: &mut G,
        sample_count: u32,
        max_polls: u32,
    ) -> Result<i16> {
        if sample_count == 0 {
            return Err(SenseError::Config(
                "gyro calibration needs at least one sample".to_string(),
            ));
        }

        let mut total: i64 = 0;
        for _ in 0..sample_count {
            let mut polls = 0;
            while !gyro.data_ready() {
                polls += 1;
                if polls >= max_polls {
                    log::warn!("Gyro not ready after {} polls, calibration aborted", polls);
                    return Err(SenseError::SensorTimeout { polls });
                }
            }
            total += gyro.read_rate().z as i64;
        }

        self.bias = (total / sample_count as i64) as i16;
        log::debug!("Gyro bias {} from {} samples", self.bias, sample_count);
        Ok(self.bias)
    }

    /// Zero the heading and restart elapsed-time measurement at `now_us`
    pub fn reset(&mut self, now_us: u32) {
        self.angle = 0;
        self.last_tick_us = now_us;
    }

    /// Read one Z rate sample and integrate it up to `now_us`
    ///
    /// Does not wait for data-ready.
    ///
    /// # Arguments
    /// * `gyro` - Gyroscope to read the Z rate from
    /// * `now_us` - Current microsecond tick; the elapsed time is the
    ///   wrapping difference from the previous update or reset
    pub fn update<G: Gyroscope + ?Sized>(&mut self, gyro: &mut G, now_us: u32) {
        let z = gyro.read_rate().z;
        self.integrate(z, now_us);
    }

    /// Integrate an already-read Z rate sample up to `now_us`
    pub fn integrate(&mut self, z: i16, now_us: u32) {
        self.rate = z as i32 - self.bias as i32;

        let dt = now_us.wrapping_sub(self.last_tick_us);
        self.last_tick_us = now_us;

        self.angle = self
            .angle
            .wrapping_add(rate_to_internal_angle(self.rate, dt));
    }

    /// Heading in whole degrees, `[0, 360)`
    pub fn heading_degrees(&self) -> u32 {
        internal_angle_to_degrees(self.angle)
    }

    /// Heading in whole degrees, `[-180, 180)`, counter-clockwise positive
    pub fn signed_heading_degrees(&self) -> i32 {
        internal_angle_to_signed_degrees(self.angle)
    }

    /// Raw heading, full `u32` range = 360 degrees
    pub fn angle(&self) -> u32 {
        self.angle
    }

    /// Bias-corrected rate of the last update, in gyro digits
    pub fn rate(&self) -> i32 {
        self.rate
    }

    pub fn rate_dps(&self) -> f32 {
        self.rate as f32 * GYRO_DPS_PER_DIGIT
    }

    pub fn bias(&self) -> i16 {
        self.bias
    }

    /// Restore a previously measured bias
    pub fn set_bias(&mut self, bias: i16) {
        self.bias = bias;
    }

    pub fn last_tick_us(&self) -> u32 {
        self.last_tick_us
    }
}
