use std::path::Path;

use crate::error::{Result, SenseError};

/// Scripted robot motion and sensor imperfections for a synthetic trace
///
/// Loadable from TOML; omitted keys keep their defaults:
///
/// ```toml
/// seed = 7
/// duration_ms = 4000
/// gyro_bias = 15.0
///
/// [[turns]]
/// start_ms = 1500
/// duration_ms = 1000
/// rate_dps = 90.0
///
/// [[impacts]]
/// at_ms = 3000
/// duration_ms = 60
/// x = 6000
/// y = -1500
/// ```
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// RNG seed; `None` draws a fresh one
    pub seed: Option<u64>,
    pub duration_ms: u32,
    /// Control loop period, one trace row per iteration
    pub loop_period_us: u32,
    /// Accelerometer output data period; registers hold between updates
    pub accel_update_us: u32,
    /// Initial value of the microsecond counter
    pub start_us: u32,
    /// Gyro zero-rate offset in digits
    pub gyro_bias: f32,
    /// Gyro noise standard deviation in digits
    pub gyro_noise: f32,
    /// Resting accelerometer XY offset in raw units
    pub accel_offset: (f32, f32),
    /// Accelerometer noise standard deviation in raw units
    pub accel_noise: f32,
    pub turns: Vec<TurnSegment>,
    pub impacts: Vec<ImpactConfig>,
}

/// Constant-rate rotation, counter-clockwise positive
#[derive(Clone, Debug, serde::Deserialize)]
pub struct TurnSegment {
    pub start_ms: u32,
    pub duration_ms: u32,
    pub rate_dps: f32,
}

impl TurnSegment {
    /// End of the segment, exclusive
    pub fn end_ms(&self) -> u64 {
        self.start_ms as u64 + self.duration_ms as u64
    }
}

/// Acceleration pulse from a collision, added on top of the resting offset
#[derive(Clone, Debug, serde::Deserialize)]
pub struct ImpactConfig {
    pub at_ms: u32,
    pub duration_ms: u32,
    pub x: f32,
    pub y: f32,
}

impl ImpactConfig {
    /// End of the pulse, exclusive
    pub fn end_ms(&self) -> u64 {
        self.at_ms as u64 + self.duration_ms as u64
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            duration_ms: 2000,
            loop_period_us: 1000,
            accel_update_us: 10_000,
            start_us: 0,
            gyro_bias: 0.0,
            gyro_noise: 0.0,
            accel_offset: (0.0, 0.0),
            accel_noise: 0.0,
            turns: Vec::new(),
            impacts: Vec::new(),
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| SenseError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.loop_period_us == 0 || self.accel_update_us == 0 {
            return Err(SenseError::Config(
                "loop and accelerometer periods must be positive".to_string(),
            ));
        }
        if !(self.gyro_noise >= 0.0 && self.accel_noise >= 0.0) {
            return Err(SenseError::Config(
                "noise levels must be non-negative".to_string(),
            ));
        }
        let ends = self
            .turns
            .iter()
            .map(TurnSegment::end_ms)
            .chain(self.impacts.iter().map(ImpactConfig::end_ms));
        for end in ends {
            if end > u32::MAX as u64 {
                return Err(SenseError::Config(format!(
                    "segment ends at {} ms, past the millisecond counter range",
                    end
                )));
            }
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_turn(mut self, start_ms: u32, duration_ms: u32, rate_dps: f32) -> Self {
        self.turns.push(TurnSegment {
            start_ms,
            duration_ms,
            rate_dps,
        });
        self
    }

    pub fn with_impact(mut self, at_ms: u32, duration_ms: u32, x: f32, y: f32) -> Self {
        self.impacts.push(ImpactConfig {
            at_ms,
            duration_ms,
            x,
            y,
        });
        self
    }

    /// Commanded rotation rate at `t_ms`
    pub fn rate_at(&self, t_ms: f32) -> f32 {
        self.turns
            .iter()
            .filter(|s| t_ms >= s.start_ms as f32 && t_ms < s.end_ms() as f32)
            .map(|s| s.rate_dps)
            .sum()
    }

    /// Noise-free XY acceleration at `t_ms`
    pub fn accel_at(&self, t_ms: f32) -> (f32, f32) {
        self.impacts
            .iter()
            .filter(|i| t_ms >= i.at_ms as f32 && t_ms < i.end_ms() as f32)
            .fold(self.accel_offset, |(x, y), i| (x + i.x, y + i.y))
    }
}
