use crate::config::CollisionConfig;
use crate::constants::ACCEL_SMOOTHING_WINDOW;
use crate::sensors::{Accelerometer, Clock, Vector3};
use crate::signal_processing::{RunningAverage, atan2_degrees};

/// One accepted accelerometer reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccelSample {
    /// Millisecond tick at which the sample was accepted
    pub timestamp_ms: u32,
    pub x: i16,
    pub y: i16,
}

/// Acceleration-based contact detector
///
/// Each axis of the XY acceleration is smoothed over a window of `N`
/// accepted samples. Contact is reported when the squared magnitude of the
/// smoothed vector exceeds the squared threshold, which keeps the hot path
/// in integer arithmetic with no square root.
///
/// The accelerometer output registers update slower than the control loop
/// polls them, so a reading identical to the last accepted one is treated as
/// stale and ignored.
#[derive(Debug, Clone)]
pub struct CollisionDetector<const N: usize = ACCEL_SMOOTHING_WINDOW> {
    current: Vector3<i16>,
    last: AccelSample,
    avg_x: RunningAverage<i32, N>,
    avg_y: RunningAverage<i32, N>,
    threshold: i32,
    threshold_squared: i64,
    accepted: u64,
}

impl CollisionDetector {
    /// Create a detector with the default smoothing window
    pub fn new(config: &CollisionConfig) -> Self {
        Self::with_window(config)
    }
}

impl<const N: usize> CollisionDetector<N> {
    /// Create a detector smoothing over `N` samples
    pub fn with_window(config: &CollisionConfig) -> Self {
        let threshold = config.threshold as i64;
        Self {
            current: Vector3::default(),
            last: AccelSample::default(),
            avg_x: RunningAverage::new(),
            avg_y: RunningAverage::new(),
            threshold: config.threshold,
            threshold_squared: threshold * threshold,
            accepted: 0,
        }
    }

    /// Read the accelerometer and process the sample
    ///
    /// # Arguments
    /// * `accel` - Accelerometer to read the XY registers from
    /// * `timestamp_ms` - Millisecond tick stamped on an accepted sample
    ///
    /// # Returns
    /// `true` if the reading was accepted into the smoothing windows,
    /// `false` when it repeats the last accepted sample and was skipped
    pub fn poll<A: Accelerometer + ?Sized>(&mut self, accel: &mut A, timestamp_ms: u32) -> bool {
        let reading = accel.read_acceleration();
        self.ingest(reading, timestamp_ms)
    }

    /// Process a reading that has already been taken from the bus
    ///
    /// The reading always becomes the current one for
    /// [`instant_magnitude`](Self::instant_magnitude); only a reading whose
    /// X or Y differs from the last accepted sample updates the averages.
    /// Returns whether it was accepted, as [`poll`](Self::poll) does.
    pub fn ingest(&mut self, reading: Vector3<i16>, timestamp_ms: u32) -> bool {
        self.current = reading;
        if reading.x == self.last.x && reading.y == self.last.y {
            return false;
        }

        self.last = AccelSample {
            timestamp_ms,
            x: reading.x,
            y: reading.y,
        };
        self.avg_x.add(reading.x as i32);
        self.avg_y.add(reading.y as i32);
        self.accepted += 1;

        log::trace!(
            "accel t={}ms x={} y={} ss_avg={}",
            timestamp_ms,
            reading.x,
            reading.y,
            self.smoothed_squared_magnitude()
        );
        true
    }

    /// Poll with the millisecond clock and report contact
    pub fn check_for_contact<A, C>(&mut self, accel: &mut A, clock: &C) -> bool
    where
        A: Accelerometer + ?Sized,
        C: Clock + ?Sized,
    {
        self.poll(accel, clock.millis());
        self.is_contact()
    }

    /// Magnitude metric of the raw reading
    ///
    /// Computed as `sqrt(last.x * cur.x + last.y * cur.y)` over the last
    /// accepted sample and the latest reading. This is not a Euclidean norm
    /// of either vector; it is NaN when the cross term is negative.
    pub fn instant_magnitude(&self) -> f32 {
        let cross = self.last.x as i64 * self.current.x as i64
            + self.last.y as i64 * self.current.y as i64;
        (cross as f32).sqrt()
    }

    /// Direction of the last accepted sample, `atan2(x, y)` in degrees
    pub fn instant_direction(&self) -> f32 {
        atan2_degrees(self.last.x as f32, self.last.y as f32)
    }

    pub fn smoothed_x(&self) -> i32 {
        self.avg_x.average()
    }

    pub fn smoothed_y(&self) -> i32 {
        self.avg_y.average()
    }

    /// Squared magnitude of the smoothed XY vector
    pub fn smoothed_squared_magnitude(&self) -> i64 {
        let x = self.smoothed_x() as i64;
        let y = self.smoothed_y() as i64;
        x * x + y * y
    }

    /// Direction of the smoothed vector, `atan2(x_avg, y_avg)` in degrees
    pub fn smoothed_direction(&self) -> f32 {
        atan2_degrees(self.smoothed_x() as f32, self.smoothed_y() as f32)
    }

    pub fn is_contact(&self) -> bool {
        self.smoothed_squared_magnitude() > self.threshold_squared
    }

    pub fn last_sample(&self) -> AccelSample {
        self.last
    }

    pub fn current_reading(&self) -> Vector3<i16> {
        self.current
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Number of samples accepted since construction or the last reset
    pub fn accepted_samples(&self) -> u64 {
        self.accepted
    }

    pub fn reset(&mut self) {
        self.current = Vector3::default();
        self.last = AccelSample::default();
        self.avg_x.reset();
        self.avg_y.reset();
        self.accepted = 0;
    }
}
