//! Configuration for the motion estimators.
//!
//! Every field defaults to the firmware's compile-time constants, so
//! `SenseConfig::default()` reproduces the robot as built. A TOML file only
//! needs the keys it overrides:
//!
//! ```toml
//! [collision]
//! threshold = 2000
//!
//! [gyro]
//! calibration_samples = 256
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::constants::{
    ACCEL_CTRL_REG1, ACCEL_CTRL_REG4_HIGH_RES, GYRO_CALIB_COUNT, GYRO_HIGH_PASS, GYRO_LOW_PASS,
    GYRO_MED_PASS, GYRO_SETTLE_MS, XY_ACCELERATION_THRESHOLD,
};
use crate::error::{Result, SenseError};

/// Top-level estimator configuration
///
/// # Example
/// ```
/// use sumosense::config::SenseConfig;
///
/// let config = SenseConfig::from_toml_str("[collision]\nthreshold = 1800\n").unwrap();
/// assert_eq!(config.collision.threshold, 1800);
/// assert_eq!(config.gyro.calibration_samples, 512);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SenseConfig {
    /// Accelerometer contact detection
    pub collision: CollisionConfig,
    /// Gyro calibration and filtering
    pub gyro: GyroConfig,
    /// Accelerometer register setup
    pub accel: AccelConfig,
}

/// Collision detector configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Smoothed XY acceleration magnitude above which contact is reported (raw units)
    pub threshold: i32,
}

/// Gyro heading configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GyroConfig {
    /// Stationary samples averaged into the zero-rate bias
    pub calibration_samples: u32,
    /// Delay between configuring the gyro and starting calibration
    pub settle_ms: u32,
    /// Filter bandwidth register selectors
    pub filter: GyroFilterConfig,
}

/// L3GD20H filter bandwidth selectors (CTRL1, CTRL4, CTRL5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GyroFilterConfig {
    pub low_pass: u8,
    pub med_pass: u8,
    pub high_pass: u8,
}

/// LSM303 accelerometer setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccelConfig {
    /// CTRL_REG1_A value
    pub ctrl_reg1: u8,
    /// Enable high resolution mode (CTRL_REG4_A) on parts that support it
    pub high_resolution: bool,
}

impl AccelConfig {
    /// CTRL_REG4_A value implied by `high_resolution`
    pub fn ctrl_reg4(&self) -> u8 {
        if self.high_resolution {
            ACCEL_CTRL_REG4_HIGH_RES
        } else {
            0
        }
    }
}

impl SenseConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| SenseError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.collision.threshold <= 0 {
            return Err(SenseError::Config(format!(
                "collision threshold must be positive, got {}",
                self.collision.threshold
            )));
        }
        if self.gyro.calibration_samples == 0 {
            return Err(SenseError::Config(
                "gyro calibration_samples must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            threshold: XY_ACCELERATION_THRESHOLD,
        }
    }
}

impl Default for GyroConfig {
    fn default() -> Self {
        Self {
            calibration_samples: GYRO_CALIB_COUNT,
            settle_ms: GYRO_SETTLE_MS,
            filter: GyroFilterConfig::default(),
        }
    }
}

impl Default for GyroFilterConfig {
    fn default() -> Self {
        Self {
            low_pass: GYRO_LOW_PASS,
            med_pass: GYRO_MED_PASS,
            high_pass: GYRO_HIGH_PASS,
        }
    }
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self {
            ctrl_reg1: ACCEL_CTRL_REG1,
            high_resolution: true,
        }
    }
}
