//! Collaborators the fusion layer reads from and publishes to.
//!
//! Read-only sources are implemented for `&T` and mutable ones for `&mut T`,
//! so an orchestrator can either own its collaborator or borrow one that the
//! rest of the flight stack also uses.

use nalgebra::Vector3;

use crate::{
    rangefinder::{Orientation, RangefinderStatus},
    wheel_odometry::WheelOdometrySample,
};

pub trait RangefinderDriver {
    /// Pull new measurements from the hardware, once per cycle.
    fn update(&mut self);
    fn has_orientation(&self, orientation: Orientation) -> bool;
    fn status(&self, orientation: Orientation) -> RangefinderStatus;
    /// Number of consecutive good readings at this orientation.
    fn valid_count(&self, orientation: Orientation) -> u8;
    fn distance_cm(&self, orientation: Orientation) -> f32;
}

pub trait AttitudeSource {
    /// z-z element of the body to NED rotation, i.e. cos of the tilt angle.
    fn tilt_cos(&self) -> f32;
}

pub trait InertialNav {
    /// Vertical position above the navigation origin, positive up.
    fn position_z_up_cm(&self) -> f32;
}

/// Monotonic millisecond clock. Wraps after ~49 days, callers use wrapping math.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

pub trait WheelEncoderDriver {
    fn num_sensors(&self) -> usize;
    fn update(&mut self);
    /// Cumulative distance travelled by the wheel (m).
    fn distance_m(&self, instance: usize) -> f32;
    /// Total angle turned since startup (rad).
    fn delta_angle_rad(&self, instance: usize) -> f32;
    fn last_reading_ms(&self, instance: usize) -> u32;
    /// Wheel hub position in the body frame (m).
    fn position_offset(&self, instance: usize) -> Vector3<f32>;
    fn wheel_radius_m(&self, instance: usize) -> f32;
}

pub trait ProximityConsumer {
    fn set_rangefinder_alt(&mut self, enabled: bool, healthy: bool, alt_cm: f32);
}

pub trait TerrainOffsetConsumer {
    fn set_rangefinder_terrain_offset(
        &mut self,
        enabled: bool,
        healthy: bool,
        terrain_offset_cm: f32,
    );

    /// Whether this consumer is currently steering by the rangefinder.
    fn rangefinder_used(&self) -> bool {
        true
    }
}

pub trait WheelOdometrySink {
    fn write_wheel_odometry(&mut self, sample: &WheelOdometrySample);
}

impl<T: AttitudeSource + ?Sized> AttitudeSource for &T {
    fn tilt_cos(&self) -> f32 {
        (**self).tilt_cos()
    }
}

impl<T: InertialNav + ?Sized> InertialNav for &T {
    fn position_z_up_cm(&self) -> f32 {
        (**self).position_z_up_cm()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

impl<T: RangefinderDriver + ?Sized> RangefinderDriver for &mut T {
    fn update(&mut self) {
        (**self).update()
    }

    fn has_orientation(&self, orientation: Orientation) -> bool {
        (**self).has_orientation(orientation)
    }

    fn status(&self, orientation: Orientation) -> RangefinderStatus {
        (**self).status(orientation)
    }

    fn valid_count(&self, orientation: Orientation) -> u8 {
        (**self).valid_count(orientation)
    }

    fn distance_cm(&self, orientation: Orientation) -> f32 {
        (**self).distance_cm(orientation)
    }
}

impl<T: WheelEncoderDriver + ?Sized> WheelEncoderDriver for &mut T {
    fn num_sensors(&self) -> usize {
        (**self).num_sensors()
    }

    fn update(&mut self) {
        (**self).update()
    }

    fn distance_m(&self, instance: usize) -> f32 {
        (**self).distance_m(instance)
    }

    fn delta_angle_rad(&self, instance: usize) -> f32 {
        (**self).delta_angle_rad(instance)
    }

    fn last_reading_ms(&self, instance: usize) -> u32 {
        (**self).last_reading_ms(instance)
    }

    fn position_offset(&self, instance: usize) -> Vector3<f32> {
        (**self).position_offset(instance)
    }

    fn wheel_radius_m(&self, instance: usize) -> f32 {
        (**self).wheel_radius_m(instance)
    }
}
