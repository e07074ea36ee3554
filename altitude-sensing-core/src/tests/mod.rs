#[cfg(feature = "log")]
use log::LevelFilter;
use nalgebra::Vector3;

use crate::{
    interfaces::{
        AttitudeSource, Clock, InertialNav, ProximityConsumer, RangefinderDriver,
        TerrainOffsetConsumer, WheelEncoderDriver, WheelOdometrySink,
    },
    rangefinder::{Orientation, RangefinderStatus},
    wheel_odometry::WheelOdometrySample,
};

pub fn init_logger() {
    #[cfg(feature = "log")]
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .filter(Some("altitude_sensing_core"), LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

#[derive(Debug, Clone, Copy)]
pub struct MockRange {
    pub status: RangefinderStatus,
    pub valid_count: u8,
    pub distance_cm: f32,
}

impl MockRange {
    pub fn good(distance_cm: f32) -> Self {
        Self {
            status: RangefinderStatus::Good,
            valid_count: 10,
            distance_cm,
        }
    }

    pub fn out_of_range() -> Self {
        Self {
            status: RangefinderStatus::OutOfRangeHigh,
            valid_count: 0,
            distance_cm: 0.0,
        }
    }
}

/// `None` means no sensor fitted at that orientation.
#[derive(Debug, Default)]
pub struct MockRangefinderDriver {
    pub down: Option<MockRange>,
    pub up: Option<MockRange>,
    pub updates: u32,
}

impl MockRangefinderDriver {
    pub fn set(&mut self, orientation: Orientation, range: MockRange) {
        match orientation {
            Orientation::Down => self.down = Some(range),
            Orientation::Up => self.up = Some(range),
        }
    }

    fn get(&self, orientation: Orientation) -> Option<&MockRange> {
        match orientation {
            Orientation::Down => self.down.as_ref(),
            Orientation::Up => self.up.as_ref(),
        }
    }
}

impl RangefinderDriver for MockRangefinderDriver {
    fn update(&mut self) {
        self.updates += 1;
    }

    fn has_orientation(&self, orientation: Orientation) -> bool {
        self.get(orientation).is_some()
    }

    fn status(&self, orientation: Orientation) -> RangefinderStatus {
        self.get(orientation)
            .map(|r| r.status)
            .unwrap_or(RangefinderStatus::NotConnected)
    }

    fn valid_count(&self, orientation: Orientation) -> u8 {
        self.get(orientation).map(|r| r.valid_count).unwrap_or(0)
    }

    fn distance_cm(&self, orientation: Orientation) -> f32 {
        self.get(orientation).map(|r| r.distance_cm).unwrap_or(0.0)
    }
}

#[derive(Debug)]
pub struct MockAhrs {
    pub tilt_cos: f32,
}

impl Default for MockAhrs {
    fn default() -> Self {
        Self { tilt_cos: 1.0 }
    }
}

impl AttitudeSource for MockAhrs {
    fn tilt_cos(&self) -> f32 {
        self.tilt_cos
    }
}

#[derive(Debug, Default)]
pub struct MockInertialNav {
    pub z_cm: f32,
}

impl InertialNav for MockInertialNav {
    fn position_z_up_cm(&self) -> f32 {
        self.z_cm
    }
}

#[derive(Debug, Default)]
pub struct MockClock {
    pub now_ms: u32,
}

impl MockClock {
    pub fn advance(&mut self, ms: u32) {
        self.now_ms = self.now_ms.wrapping_add(ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        self.now_ms
    }
}

#[derive(Debug, Default)]
pub struct RecordingProximity {
    pub calls: Vec<(bool, bool, f32)>,
}

impl ProximityConsumer for RecordingProximity {
    fn set_rangefinder_alt(&mut self, enabled: bool, healthy: bool, alt_cm: f32) {
        self.calls.push((enabled, healthy, alt_cm));
    }
}

#[derive(Debug)]
pub struct RecordingTerrainConsumer {
    pub rangefinder_used: bool,
    pub calls: Vec<(bool, bool, f32)>,
}

impl Default for RecordingTerrainConsumer {
    fn default() -> Self {
        Self {
            rangefinder_used: true,
            calls: Vec::new(),
        }
    }
}

impl TerrainOffsetConsumer for RecordingTerrainConsumer {
    fn set_rangefinder_terrain_offset(
        &mut self,
        enabled: bool,
        healthy: bool,
        terrain_offset_cm: f32,
    ) {
        self.calls.push((enabled, healthy, terrain_offset_cm));
    }

    fn rangefinder_used(&self) -> bool {
        self.rangefinder_used
    }
}

#[derive(Debug, Clone)]
pub struct MockWheel {
    pub angle_rad: f32,
    pub reading_ms: u32,
    pub distance_m: f32,
    pub position_offset: Vector3<f32>,
    pub radius_m: f32,
}

impl MockWheel {
    pub fn new(y_offset_m: f32) -> Self {
        Self {
            angle_rad: 0.0,
            reading_ms: 0,
            distance_m: 0.0,
            position_offset: Vector3::new(0.0, y_offset_m, 0.0),
            radius_m: 0.05,
        }
    }

    /// Turn the wheel by `angle_rad`, stamped at `reading_ms`.
    pub fn rotate(&mut self, angle_rad: f32, reading_ms: u32) {
        self.angle_rad += angle_rad;
        self.distance_m += angle_rad * self.radius_m;
        self.reading_ms = reading_ms;
    }
}

#[derive(Debug, Default)]
pub struct MockWheelEncoders {
    pub wheels: Vec<MockWheel>,
    pub updates: u32,
}

impl WheelEncoderDriver for MockWheelEncoders {
    fn num_sensors(&self) -> usize {
        self.wheels.len()
    }

    fn update(&mut self) {
        self.updates += 1;
    }

    fn distance_m(&self, instance: usize) -> f32 {
        self.wheels[instance].distance_m
    }

    fn delta_angle_rad(&self, instance: usize) -> f32 {
        self.wheels[instance].angle_rad
    }

    fn last_reading_ms(&self, instance: usize) -> u32 {
        self.wheels[instance].reading_ms
    }

    fn position_offset(&self, instance: usize) -> Vector3<f32> {
        self.wheels[instance].position_offset
    }

    fn wheel_radius_m(&self, instance: usize) -> f32 {
        self.wheels[instance].radius_m
    }
}

#[derive(Debug, Default)]
pub struct RecordingOdometrySink {
    pub samples: Vec<WheelOdometrySample>,
}

impl WheelOdometrySink for RecordingOdometrySink {
    fn write_wheel_odometry(&mut self, sample: &WheelOdometrySample) {
        self.samples.push(sample.clone());
    }
}
