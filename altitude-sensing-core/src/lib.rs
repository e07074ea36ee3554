// only use std when feature = "std" is enabled or during testing
#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod fmt;

pub mod filter;
pub mod interfaces;
pub mod params;
pub mod rangefinder;
pub mod utils;
pub mod wheel_odometry;

pub use filter::LowPassFilter;
pub use params::{ParamsError, RangefinderParams, WheelOdometryParams};
pub use rangefinder::{
    Orientation, RangefinderFusion, RangefinderReading, RangefinderState, RangefinderStatus,
    UpdateOutcome,
};
pub use wheel_odometry::{
    WHEEL_ENCODER_MAX_INSTANCES, WheelEncoderChannel, WheelOdometry, WheelOdometrySample,
};

#[cfg(test)]
mod tests;
