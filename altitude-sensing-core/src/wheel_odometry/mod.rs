
use heapless::Vec;
use nalgebra::Vector3;

use crate::{
    interfaces::{Clock, WheelEncoderDriver, WheelOdometrySink},
    params::WheelOdometryParams,
    utils::elapsed_ms,
};

pub const WHEEL_ENCODER_MAX_INSTANCES: usize = 4;

/// Wheel rotation over one interval, in the form the state estimator fuses.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub struct WheelOdometrySample {
    pub instance: usize,
    /// positive for forward motion of the vehicle (rad)
    pub delta_angle_rad: f32,
    /// interval the rotation was measured over, always > 0 (s)
    pub delta_time_s: f32,
    /// time the rotation was last measured (ms)
    pub timestamp_ms: u32,
    /// wheel hub position in the body frame (m)
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    pub position_offset: Vector3<f32>,
    pub wheel_radius_m: f32,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelEncoderChannel {
    pub last_angle_rad: f32,
    pub last_reading_ms: u32,
    /// cumulative distance, refreshed every cycle for reporting
    pub last_distance_m: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// next cycle seeds every channel and emits nothing
    Uninitialised,
    /// one channel per cycle, round robin
    Steady { next_index: usize },
}

/// Turns cumulative wheel encoder angles into per-interval odometry samples,
/// one encoder per cycle so the estimator sees a bounded update rate however
/// many wheels are fitted.
pub struct WheelOdometry<W, C> {
    driver: W,
    clock: C,
    params: WheelOdometryParams,
    channels: Vec<WheelEncoderChannel, WHEEL_ENCODER_MAX_INSTANCES>,
    phase: Phase,
}

impl<W, C> WheelOdometry<W, C>
where
    W: WheelEncoderDriver,
    C: Clock,
{
    pub fn new(driver: W, clock: C, params: WheelOdometryParams) -> Self {
        Self {
            driver,
            clock,
            params,
            channels: Vec::new(),
            phase: Phase::Uninitialised,
        }
    }

    pub fn update(&mut self, sink: &mut dyn WheelOdometrySink) {
        let num_sensors = self.driver.num_sensors();
        if num_sensors == 0 {
            return;
        }

        self.driver.update();

        let count = num_sensors.min(WHEEL_ENCODER_MAX_INSTANCES);
        if self.channels.len() != count {
            self.resize_channels(num_sensors, count);
        }

        for (instance, channel) in self.channels.iter_mut().enumerate() {
            channel.last_distance_m = self.driver.distance_m(instance);
        }

        match self.phase {
            Phase::Uninitialised => {
                for (instance, channel) in self.channels.iter_mut().enumerate() {
                    channel.last_angle_rad = self.driver.delta_angle_rad(instance);
                    channel.last_reading_ms = self.driver.last_reading_ms(instance);
                }
                self.phase = Phase::Steady { next_index: 0 };
            }
            Phase::Steady { next_index } => {
                let instance = if next_index < count { next_index } else { 0 };
                self.phase = Phase::Steady {
                    next_index: (instance + 1) % count,
                };
                if let Some(sample) = self.advance_channel(instance) {
                    sink.write_wheel_odometry(&sample);
                }
            }
        }
    }

    fn resize_channels(&mut self, num_sensors: usize, count: usize) {
        if num_sensors > WHEEL_ENCODER_MAX_INSTANCES {
            log_warn!(
                "{} wheel encoders reported, only the first {} are used",
                num_sensors,
                WHEEL_ENCODER_MAX_INSTANCES
            );
        }
        if self.channels.is_empty() {
            log_info!("wheel odometry: {} encoders detected", count);
        } else {
            log_warn!(
                "wheel encoder count changed from {} to {}, re-seeding",
                self.channels.len(),
                count
            );
        }

        self.channels.clear();
        // count never exceeds the capacity
        let _ = self.channels.resize(count, WheelEncoderChannel::default());
        self.phase = Phase::Uninitialised;
    }

    fn advance_channel(&mut self, instance: usize) -> Option<WheelOdometrySample> {
        let current_angle_rad = self.driver.delta_angle_rad(instance);
        let sensor_reading_ms = self.driver.last_reading_ms(instance);
        let now_ms = self.clock.now_ms();
        let channel = self.channels.get_mut(instance)?;

        // use the sensor's own interval unless it is missing or implausible,
        // then fall back to time since this channel was last sent
        let sensor_dt_ms = elapsed_ms(sensor_reading_ms, channel.last_reading_ms);
        let (dt_ms, timestamp_ms) =
            if sensor_dt_ms == 0 || sensor_dt_ms > self.params.max_sensor_interval_ms {
                (elapsed_ms(now_ms, channel.last_reading_ms), now_ms)
            } else {
                (sensor_dt_ms, sensor_reading_ms)
            };

        // zero, or negative once wrapped
        if dt_ms as i32 <= 0 {
            log_trace!("wheel encoder {}: no time elapsed since last sample, skipped", instance);
            return None;
        }

        let delta_angle_rad = current_angle_rad - channel.last_angle_rad;
        channel.last_angle_rad = current_angle_rad;
        channel.last_reading_ms = timestamp_ms;

        Some(WheelOdometrySample {
            instance,
            delta_angle_rad,
            delta_time_s: dt_ms as f32 * 0.001,
            timestamp_ms,
            position_offset: self.driver.position_offset(instance),
            wheel_radius_m: self.driver.wheel_radius_m(instance),
        })
    }

    pub fn is_initialised(&self) -> bool {
        matches!(self.phase, Phase::Steady { .. })
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, instance: usize) -> Option<&WheelEncoderChannel> {
        self.channels.get(instance)
    }

    /// Cumulative distance of one wheel as of the last update (m).
    pub fn distance_m(&self, instance: usize) -> Option<f32> {
        self.channels.get(instance).map(|c| c.last_distance_m)
    }

    pub fn driver_mut(&mut self) -> &mut W {
        &mut self.driver
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
