mod fusion;
mod terrain;

pub use fusion::RangefinderFusion;

use crate::{
    filter::LowPassFilter, interfaces::RangefinderDriver, params::RangefinderParams,
    utils::elapsed_ms,
};

/// Mounting direction of a rangefinder. The only behavioural difference
/// between the two is the sign used when turning a range into terrain height.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// pitch 270, measures distance to the ground below
    Down,
    /// pitch 90, measures distance to a ceiling or obstacle above
    Up,
}

impl Orientation {
    /// Height of the surface the sensor is looking at, relative to the
    /// inertial origin.
    pub fn terrain_offset_cm(&self, inertial_alt_cm: f32, range_cm: f32) -> f32 {
        match self {
            Orientation::Down => inertial_alt_cm - range_cm,
            Orientation::Up => inertial_alt_cm + range_cm,
        }
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangefinderStatus {
    NotConnected,
    NoData,
    OutOfRangeLow,
    OutOfRangeHigh,
    Good,
}

/// One cycle's worth of driver output for a single orientation.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangefinderReading {
    pub status: RangefinderStatus,
    pub valid_count: u8,
    pub distance_cm: f32,
}

impl RangefinderReading {
    pub fn from_driver(driver: &impl RangefinderDriver, orientation: Orientation) -> Self {
        Self {
            status: driver.status(orientation),
            valid_count: driver.valid_count(orientation),
            distance_cm: driver.distance_cm(orientation),
        }
    }
}

/// What happened during one [`RangefinderState::update`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// no healthy reading within the timeout, measured before this cycle's reading
    pub timed_out: bool,
    pub terrain_offset_reset: bool,
}

/// Fused state of one rangefinder orientation.
#[derive(Debug, Clone)]
pub struct RangefinderState {
    orientation: Orientation,
    enabled: bool,
    alt_healthy: bool,
    /// tilt corrected, unfiltered, not glitch protected
    alt_cm: i32,
    alt_cm_glitch_protected: i32,
    /// >0: run of high glitches, <0: run of low glitches
    glitch_count: i32,
    alt_cm_filt: LowPassFilter,
    inertial_alt_cm: f32,
    terrain_offset_cm: f32,
    last_healthy_ms: u32,
    glitch_cleared_ms: u32,
}

impl RangefinderState {
    pub fn new(orientation: Orientation, enabled: bool, filter_cutoff_hz: f32) -> Self {
        Self {
            orientation,
            enabled,
            alt_healthy: false,
            alt_cm: 0,
            alt_cm_glitch_protected: 0,
            glitch_count: 0,
            alt_cm_filt: LowPassFilter::new(filter_cutoff_hz),
            inertial_alt_cm: 0.0,
            terrain_offset_cm: 0.0,
            last_healthy_ms: 0,
            glitch_cleared_ms: 0,
        }
    }

    /// Run one reading through health check, tilt correction, glitch
    /// rejection and filtering.
    pub fn update(
        &mut self,
        reading: &RangefinderReading,
        inertial_alt_cm: f32,
        tilt_factor: f32,
        now_ms: u32,
        params: &RangefinderParams,
    ) -> UpdateOutcome {
        let timed_out = elapsed_ms(now_ms, self.last_healthy_ms) > params.timeout_ms;

        if !self.enabled {
            self.alt_healthy = false;
            return UpdateOutcome {
                timed_out,
                terrain_offset_reset: false,
            };
        }

        self.alt_healthy = reading.status == RangefinderStatus::Good
            && reading.valid_count >= params.health_min_valid_count;

        self.alt_cm = (tilt_factor * reading.distance_cm) as i32;
        self.inertial_alt_cm = inertial_alt_cm;

        let mut terrain_offset_reset = self.reject_glitches(now_ms, params);

        if self.alt_healthy {
            if timed_out {
                // nothing healthy within the timeout, restart from this reading
                log_debug!(
                    "{} rangefinder: no healthy reading within timeout, filter reset to {}cm",
                    self.orientation_name(),
                    self.alt_cm
                );
                self.alt_cm_filt.reset(self.alt_cm as f32);
                terrain_offset_reset = true;
            } else {
                self.alt_cm_filt.apply(self.alt_cm as f32, params.filter_dt_s);
            }
            self.last_healthy_ms = now_ms;
        }

        if terrain_offset_reset {
            self.terrain_offset_cm = self
                .orientation
                .terrain_offset_cm(self.inertial_alt_cm, self.alt_cm as f32);
        }

        UpdateOutcome {
            timed_out,
            terrain_offset_reset,
        }
    }

    /// Returns true when a sustained glitch run was force-accepted.
    fn reject_glitches(&mut self, now_ms: u32, params: &RangefinderParams) -> bool {
        let glitch_cm = self.alt_cm.saturating_sub(self.alt_cm_glitch_protected);
        if glitch_cm >= params.glitch_threshold_cm {
            self.glitch_count = self.glitch_count.saturating_add(1).max(1);
        } else if glitch_cm <= -params.glitch_threshold_cm {
            self.glitch_count = self.glitch_count.saturating_sub(1).min(-1);
        } else {
            self.glitch_count = 0;
            self.alt_cm_glitch_protected = self.alt_cm;
        }

        if self.glitch_count.unsigned_abs() >= params.glitch_clear_samples as u32 {
            log_debug!(
                "{} rangefinder glitch cleared after {} samples, accepting {}cm",
                self.orientation_name(),
                self.glitch_count.unsigned_abs(),
                self.alt_cm
            );
            self.glitch_count = 0;
            self.alt_cm_glitch_protected = self.alt_cm;
            self.glitch_cleared_ms = now_ms;
            return true;
        }
        false
    }

    /// Configured out: report absent without consulting the driver.
    pub(crate) fn set_disabled(&mut self) {
        self.enabled = false;
        self.alt_healthy = false;
        self.alt_cm = 0;
    }

    pub fn is_usable(&self) -> bool {
        self.enabled && self.alt_healthy
    }

    /// Filtered altitude carried forward by how far the vehicle has moved
    /// vertically since the reading was taken.
    pub fn height_interpolated_cm(&self, current_inertial_alt_cm: f32) -> Option<i32> {
        if !self.is_usable() {
            return None;
        }
        Some((self.alt_cm_filt.get() + (current_inertial_alt_cm - self.inertial_alt_cm)) as i32)
    }

    fn orientation_name(&self) -> &'static str {
        match self.orientation {
            Orientation::Down => "downward",
            Orientation::Up => "upward",
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn alt_healthy(&self) -> bool {
        self.alt_healthy
    }

    pub fn alt_cm(&self) -> i32 {
        self.alt_cm
    }

    pub fn alt_cm_glitch_protected(&self) -> i32 {
        self.alt_cm_glitch_protected
    }

    pub fn glitch_count(&self) -> i32 {
        self.glitch_count
    }

    pub fn alt_cm_filt(&self) -> f32 {
        self.alt_cm_filt.get()
    }

    pub fn inertial_alt_cm(&self) -> f32 {
        self.inertial_alt_cm
    }

    pub fn terrain_offset_cm(&self) -> f32 {
        self.terrain_offset_cm
    }

    pub fn last_healthy_ms(&self) -> u32 {
        self.last_healthy_ms
    }

    /// Time of the last forced glitch clearance, surface tracking resets its
    /// target when this changes.
    pub fn glitch_cleared_ms(&self) -> u32 {
        self.glitch_cleared_ms
    }
}
