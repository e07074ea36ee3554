use crate::{
    rangefinder::RangefinderState,
    utils::{elapsed_ms, first_order_gain},
};

impl RangefinderState {
    /// Height of the sensed surface right now, from the glitch protected
    /// range (the filtered one is already smoothed).
    pub fn instantaneous_terrain_offset_cm(&self) -> f32 {
        self.orientation
            .terrain_offset_cm(self.inertial_alt_cm, self.alt_cm_glitch_protected as f32)
    }

    /// Step the slow terrain offset estimate toward the instantaneous one.
    ///
    /// ```text
    /// offset += (instantaneous - offset) · dt / max(tc, dt)
    /// ```
    pub fn update_terrain_offset(&mut self, dt_s: f32, time_constant_s: f32) {
        let target = self.instantaneous_terrain_offset_cm();
        let error = target - self.terrain_offset_cm;
        if error == 0.0 {
            return;
        }
        self.terrain_offset_cm += error * first_order_gain(dt_s, time_constant_s);
    }

    /// Navigation only hears about the offset while the sensor is healthy, or
    /// once it has been silent for longer than the timeout. A short dropout
    /// leaves the consumer holding the last healthy value.
    pub fn terrain_offset_publishable(&self, now_ms: u32, timeout_ms: u32) -> bool {
        self.alt_healthy || elapsed_ms(now_ms, self.last_healthy_ms) > timeout_ms
    }
}
