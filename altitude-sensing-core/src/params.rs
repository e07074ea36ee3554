use serde::{Deserialize, Serialize};

/// Tuning for the rangefinder fusion layer.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RangefinderParams {
    /// false: the subsystem is configured out, both orientations read as absent
    pub enabled: bool,
    pub tilt_correction: bool,
    /// lower clamp on the tilt factor, keeps slant correction away from 90°
    pub min_tilt_factor: f32,
    pub filter_cutoff_hz: f32,
    /// step handed to the altitude filter on every healthy reading
    pub filter_dt_s: f32,
    /// consecutive valid readings the driver must report before we trust it
    pub health_min_valid_count: u8,
    pub glitch_threshold_cm: i32,
    pub glitch_clear_samples: u8,
    pub timeout_ms: u32,
    /// surface tracking time constant for the terrain offset, 0 tracks instantly
    pub terrain_time_constant_s: f32,
}

impl Default for RangefinderParams {
    fn default() -> Self {
        Self {
            enabled: true,
            tilt_correction: true,
            min_tilt_factor: 0.707,
            filter_cutoff_hz: 0.5,
            filter_dt_s: 0.05,
            health_min_valid_count: 3,
            glitch_threshold_cm: 200,
            glitch_clear_samples: 3,
            timeout_ms: 1000,
            terrain_time_constant_s: 1.0,
        }
    }
}

impl RangefinderParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !self.filter_cutoff_hz.is_finite() || self.filter_cutoff_hz <= 0.0 {
            return Err(ParamsError::FilterCutoff);
        }
        if !self.filter_dt_s.is_finite() || self.filter_dt_s <= 0.0 {
            return Err(ParamsError::FilterTimeStep);
        }
        if !(self.min_tilt_factor > 0.0 && self.min_tilt_factor <= 1.0) {
            return Err(ParamsError::MinTiltFactor);
        }
        if self.glitch_threshold_cm <= 0 {
            return Err(ParamsError::GlitchThreshold);
        }
        if self.glitch_clear_samples == 0 {
            return Err(ParamsError::GlitchClearSamples);
        }
        if self.timeout_ms == 0 {
            return Err(ParamsError::Timeout);
        }
        if !self.terrain_time_constant_s.is_finite() || self.terrain_time_constant_s < 0.0 {
            return Err(ParamsError::TerrainTimeConstant);
        }
        Ok(())
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WheelOdometryParams {
    /// sensor timestamp gaps of zero or above this fall back to local clock pacing
    pub max_sensor_interval_ms: u32,
}

impl Default for WheelOdometryParams {
    fn default() -> Self {
        Self {
            max_sensor_interval_ms: 100,
        }
    }
}

impl WheelOdometryParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.max_sensor_interval_ms == 0 {
            return Err(ParamsError::MaxSensorInterval);
        }
        Ok(())
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamsError {
    FilterCutoff,
    FilterTimeStep,
    MinTiltFactor,
    GlitchThreshold,
    GlitchClearSamples,
    Timeout,
    TerrainTimeConstant,
    MaxSensorInterval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(RangefinderParams::default().validate(), Ok(()));
        assert_eq!(WheelOdometryParams::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_rangefinder_params() {
        let base = RangefinderParams::default();

        let params = RangefinderParams {
            filter_cutoff_hz: f32::NAN,
            ..base.clone()
        };
        assert_eq!(params.validate(), Err(ParamsError::FilterCutoff));

        let params = RangefinderParams {
            min_tilt_factor: 1.5,
            ..base.clone()
        };
        assert_eq!(params.validate(), Err(ParamsError::MinTiltFactor));

        let params = RangefinderParams {
            glitch_threshold_cm: 0,
            ..base.clone()
        };
        assert_eq!(params.validate(), Err(ParamsError::GlitchThreshold));

        let params = RangefinderParams {
            glitch_clear_samples: 0,
            ..base.clone()
        };
        assert_eq!(params.validate(), Err(ParamsError::GlitchClearSamples));

        let params = RangefinderParams {
            terrain_time_constant_s: -1.0,
            ..base
        };
        assert_eq!(params.validate(), Err(ParamsError::TerrainTimeConstant));
    }

    #[test]
    fn rejects_zero_wheel_interval_ceiling() {
        let params = WheelOdometryParams {
            max_sensor_interval_ms: 0,
        };
        assert_eq!(params.validate(), Err(ParamsError::MaxSensorInterval));
    }
}
