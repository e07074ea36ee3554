use core::f32::consts::PI;

/// Single-pole low-pass filter with an explicit time step per sample.
///
/// ```text
/// α  = dt / (dt + 1 / (2π · f_c))
/// yₖ = yₖ₋₁ + α · (xₖ - yₖ₋₁)
/// ```
///
/// A cutoff of zero (or a non-positive `dt`) passes samples straight through.
/// The first sample after construction seeds the output directly.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Default)]
pub struct LowPassFilter {
    cutoff_hz: f32,
    output: f32,
    initialised: bool,
}

impl LowPassFilter {
    pub fn new(cutoff_hz: f32) -> Self {
        let mut filter = Self::default();
        filter.set_cutoff_frequency(cutoff_hz);
        filter
    }

    pub fn set_cutoff_frequency(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz.max(0.0);
    }

    /// Discard history and continue from `value`.
    pub fn reset(&mut self, value: f32) {
        self.output = value;
        self.initialised = true;
    }

    pub fn apply(&mut self, sample: f32, dt_s: f32) -> f32 {
        if !self.initialised {
            self.reset(sample);
            return self.output;
        }

        if self.cutoff_hz <= 0.0 || dt_s <= 0.0 {
            self.output = sample;
            return self.output;
        }

        let rc = 1.0 / (2.0 * PI * self.cutoff_hz);
        let alpha = dt_s / (dt_s + rc);
        self.output += (sample - self.output) * alpha;
        self.output
    }

    pub fn get(&self) -> f32 {
        self.output
    }
}
