//! Scripted collaborators for host tests

use std::cell::Cell;
use std::collections::VecDeque;

use super::{Accelerometer, Button, Clock, Display, Gyroscope, ImuBus, Vector3};
use crate::config::{AccelConfig, GyroFilterConfig};

/// IMU that replays queued readings
///
/// Each read pops the next queued value; once a queue runs dry the last
/// value keeps being returned, like a sensor whose registers have not
/// been refreshed.
#[derive(Debug, Default)]
pub struct ScriptedImu {
    accel: VecDeque<Vector3<i16>>,
    gyro: VecDeque<Vector3<i16>>,
    last_accel: Vector3<i16>,
    last_gyro: Vector3<i16>,
    not_ready_polls: u32,
    never_ready: bool,
    pub accel_config: Option<AccelConfig>,
    pub gyro_filter: Option<GyroFilterConfig>,
    pub ready_polls: u32,
}

impl ScriptedImu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_accel(&mut self, x: i16, y: i16) {
        self.accel.push_back(Vector3::new(x, y, 0));
    }

    pub fn push_gyro_z(&mut self, z: i16) {
        self.gyro.push_back(Vector3::new(0, 0, z));
    }

    /// Report not-ready this many times before each gyro sample
    pub fn with_not_ready_polls(mut self, polls: u32) -> Self {
        self.not_ready_polls = polls;
        self
    }

    /// Never report gyro data ready
    pub fn stalled(mut self) -> Self {
        self.never_ready = true;
        self
    }
}

impl Accelerometer for ScriptedImu {
    fn read_acceleration(&mut self) -> Vector3<i16> {
        if let Some(v) = self.accel.pop_front() {
            self.last_accel = v;
        }
        self.last_accel
    }
}

impl Gyroscope for ScriptedImu {
    fn data_ready(&mut self) -> bool {
        if self.never_ready {
            return false;
        }
        self.ready_polls += 1;
        self.ready_polls > self.not_ready_polls
    }

    fn read_rate(&mut self) -> Vector3<i16> {
        self.ready_polls = 0;
        if let Some(v) = self.gyro.pop_front() {
            self.last_gyro = v;
        }
        self.last_gyro
    }
}

impl ImuBus for ScriptedImu {
    fn configure_accelerometer(&mut self, config: &AccelConfig) {
        self.accel_config = Some(*config);
    }

    fn configure_gyro(&mut self, filter: &GyroFilterConfig) {
        self.gyro_filter = Some(*filter);
    }
}

/// Clock advanced by hand
///
/// The millisecond and microsecond counters are kept separately and each
/// wraps at 32 bits on its own, like two free-running hardware timers.
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: Cell<u32>,
    millis: Cell<u32>,
    sub_ms_us: Cell<u32>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at_us(us: u32) -> Self {
        Self {
            micros: Cell::new(us),
            millis: Cell::new(us / 1000),
            sub_ms_us: Cell::new(us % 1000),
        }
    }

    pub fn advance_us(&self, us: u32) {
        self.micros.set(self.micros.get().wrapping_add(us));

        let pending = self.sub_ms_us.get() as u64 + us as u64;
        self.millis
            .set(self.millis.get().wrapping_add((pending / 1000) as u32));
        self.sub_ms_us.set((pending % 1000) as u32);
    }

    pub fn advance_ms(&self, ms: u32) {
        self.micros.set(self.micros.get().wrapping_add(ms.wrapping_mul(1000)));
        self.millis.set(self.millis.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn millis(&self) -> u32 {
        self.millis.get()
    }

    fn micros(&self) -> u32 {
        self.micros.get()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance_ms(ms);
    }
}

/// Display that keeps everything printed since the last clear
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub lines: Vec<String>,
    pub clears: usize,
    pub indicator_history: Vec<bool>,
}

impl Display for RecordingDisplay {
    fn clear(&mut self) {
        self.lines.clear();
        self.clears += 1;
    }

    fn print(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn set_indicator(&mut self, on: bool) {
        self.indicator_history.push(on);
    }
}

/// Button released after a fixed number of polls
#[derive(Debug)]
pub struct ScriptedButton {
    polls_until_release: usize,
    pub polls: usize,
}

impl ScriptedButton {
    pub fn released_after(polls: usize) -> Self {
        Self {
            polls_until_release: polls,
            polls: 0,
        }
    }
}

impl Button for ScriptedButton {
    fn released(&mut self) -> bool {
        self.polls += 1;
        self.polls > self.polls_until_release
    }
}
