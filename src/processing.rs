use crate::config::SenseConfig;
use crate::error::Result;
use crate::estimation::{CollisionDetector, HeadingIntegrator, run_gyro_calibration};
use crate::output::MotionReport;
use crate::sensors::{Button, Clock, Display, ImuBus};

/// Estimator outputs for one control loop iteration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionSnapshot {
    pub timestamp_ms: u32,
    /// Whether the accelerometer produced a fresh sample this iteration
    pub fresh_sample: bool,
    pub contact: bool,
    pub heading_degrees: u32,
    pub signed_heading_degrees: i32,
    pub heading_rate_dps: f32,
    pub smoothed_squared_magnitude: i64,
}

/// The robot's motion estimation context
///
/// Owns the IMU bus, the clock and both estimators. Everything is driven
/// from the one control loop, so no state here is shared.
pub struct MotionEstimator<B, C> {
    bus: B,
    clock: C,
    collision: CollisionDetector,
    heading: HeadingIntegrator,
    config: SenseConfig,
}

impl<B: ImuBus, C: Clock> MotionEstimator<B, C> {
    /// Configure the sensors and build both estimators
    pub fn new(mut bus: B, clock: C, config: &SenseConfig) -> Result<Self> {
        config.validate()?;

        bus.configure_accelerometer(&config.accel);
        bus.configure_gyro(&config.gyro.filter);

        let mut heading = HeadingIntegrator::new();
        heading.reset(clock.micros());

        Ok(Self {
            bus,
            clock,
            collision: CollisionDetector::new(&config.collision),
            heading,
            config: config.clone(),
        })
    }

    /// Settle, measure the gyro bias and zero the heading
    ///
    /// The robot must be stationary. Blocks until every calibration sample
    /// has been read.
    pub fn calibrate(&mut self) -> i16 {
        self.clock.delay_ms(self.config.gyro.settle_ms);
        self.heading
            .calibrate(&mut self.bus, self.config.gyro.calibration_samples);
        self.heading.reset(self.clock.micros());
        self.heading.bias()
    }

    /// [`calibrate`](Self::calibrate) that fails instead of hanging on a silent gyro
    pub fn calibrate_bounded(&mut self, max_polls: u32) -> Result<i16> {
        self.clock.delay_ms(self.config.gyro.settle_ms);
        let bias = self.heading.calibrate_bounded(
            &mut self.bus,
            self.config.gyro.calibration_samples,
            max_polls,
        )?;
        self.heading.reset(self.clock.micros());
        Ok(bias)
    }

    /// Power-on calibration with live heading display, see [`run_gyro_calibration`]
    pub fn calibrate_interactive<D, K>(&mut self, display: &mut D, button: &mut K) -> i16
    where
        D: Display + ?Sized,
        K: Button + ?Sized,
    {
        run_gyro_calibration(
            &mut self.heading,
            &mut self.bus,
            &mut self.clock,
            display,
            button,
            &self.config.gyro,
        )
    }

    /// Use a previously measured gyro bias instead of calibrating
    pub fn set_gyro_bias(&mut self, bias: i16) {
        self.heading.set_bias(bias);
    }

    pub fn reset_heading(&mut self) {
        self.heading.reset(self.clock.micros());
    }

    /// Run both estimators once and return their outputs
    pub fn poll(&mut self) -> MotionSnapshot {
        let timestamp_ms = self.clock.millis();
        let fresh_sample = self.collision.poll(&mut self.bus, timestamp_ms);
        self.heading.update(&mut self.bus, self.clock.micros());

        MotionSnapshot {
            timestamp_ms,
            fresh_sample,
            contact: self.collision.is_contact(),
            heading_degrees: self.heading.heading_degrees(),
            signed_heading_degrees: self.heading.signed_heading_degrees(),
            heading_rate_dps: self.heading.rate_dps(),
            smoothed_squared_magnitude: self.collision.smoothed_squared_magnitude(),
        }
    }

    /// Log line for the current state, as printed on the serial console
    pub fn report(&self) -> MotionReport {
        MotionReport::from_estimators(&self.collision, &self.heading)
    }

    pub fn collision(&self) -> &CollisionDetector {
        &self.collision
    }

    pub fn heading(&self) -> &HeadingIntegrator {
        &self.heading
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn config(&self) -> &SenseConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollisionConfig;
    use crate::sensors::mock::{ManualClock, ScriptedImu};

    fn small_config() -> SenseConfig {
        let mut config = SenseConfig {
            collision: CollisionConfig { threshold: 1000 },
            ..SenseConfig::default()
        };
        config.gyro.calibration_samples = 2;
        config.gyro.settle_ms = 10;
        config
    }

    #[test]
    fn test_new_configures_sensors() {
        let config = small_config();
        let est = MotionEstimator::new(ScriptedImu::new(), ManualClock::new(), &config).unwrap();
        assert_eq!(est.bus().accel_config, Some(config.accel));
        assert_eq!(est.bus().gyro_filter, Some(config.gyro.filter));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = small_config();
        config.collision.threshold = -1;
        assert!(MotionEstimator::new(ScriptedImu::new(), ManualClock::new(), &config).is_err());
    }

    #[test]
    fn test_poll_produces_snapshot() {
        let mut imu = ScriptedImu::new();
        imu.push_gyro_z(5);
        imu.push_gyro_z(5);
        imu.push_gyro_z(1005);
        imu.push_accel(3000, 0);

        let mut est = MotionEstimator::new(imu, ManualClock::new(), &small_config()).unwrap();
        assert_eq!(est.calibrate(), 5);
        assert_eq!(est.clock().millis(), 10);

        est.clock().advance_ms(1000);
        let snap = est.poll();
        assert!(snap.fresh_sample);
        assert!(snap.contact);
        assert_eq!(snap.timestamp_ms, 1010);
        assert_eq!(snap.signed_heading_degrees, 69);
        assert!((snap.heading_rate_dps - 70.0).abs() < 1e-3);

        // Registers unchanged: stale accel sample, contact state is held
        est.clock().advance_ms(10);
        let snap = est.poll();
        assert!(!snap.fresh_sample);
        assert!(snap.contact);
    }

    #[test]
    fn test_calibrate_bounded_propagates_timeout() {
        let mut est =
            MotionEstimator::new(ScriptedImu::new().stalled(), ManualClock::new(), &small_config())
                .unwrap();
        assert!(est.calibrate_bounded(50).is_err());
    }
}
