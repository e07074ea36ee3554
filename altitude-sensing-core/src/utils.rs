use crate::params::RangefinderParams;

/// Scale applied to a slant range to approximate vertical distance.
/// `tilt_cos` is the cosine of the angle between body z and earth z.
pub fn tilt_correction_factor(tilt_cos: f32, params: &RangefinderParams) -> f32 {
    if params.tilt_correction {
        tilt_cos.max(params.min_tilt_factor)
    } else {
        1.0
    }
}

/// z-z element of the body to NED rotation for the given roll and pitch,
/// for attitude sources that only expose Euler angles.
pub fn tilt_cos_from_euler(roll_rad: f32, pitch_rad: f32) -> f32 {
    libm::cosf(roll_rad) * libm::cosf(pitch_rad)
}

/// Milliseconds from `then` to `now` on a wrapping u32 clock.
pub fn elapsed_ms(now_ms: u32, then_ms: u32) -> u32 {
    now_ms.wrapping_sub(then_ms)
}

/// Gain of a first order smoother with time constant `time_constant_s`
/// stepped by `dt_s`, saturating at 1 once `dt_s` reaches the time constant.
pub fn first_order_gain(dt_s: f32, time_constant_s: f32) -> f32 {
    if !(dt_s > 0.0) {
        return 0.0;
    }
    dt_s / time_constant_s.max(dt_s)
}
