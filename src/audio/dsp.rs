// Utilitaires DSP - Hygiène audio et smoothing

/// Flush denormals to zero (anti-dénormaux)
#[inline]
pub fn flush_denormals_to_zero(x: f32) -> f32 {
    if x.abs() < 1e-15 { 0.0 } else { x }
}

/// Soft clipping avec tanh (saturation douce)
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// Smoother 1-pole: y[n] = y[n-1] + α * (x[n] - y[n-1])
pub struct OnePoleSmoother {
    current: f32,
    coefficient: f32,
}

impl OnePoleSmoother {
    pub fn new(initial_value: f32, time_constant_ms: f32, sample_rate: f32) -> Self {
        let time_constant_samples = (time_constant_ms * 0.001 * sample_rate).max(1.0);
        Self {
            current: initial_value,
            coefficient: 1.0 / time_constant_samples,
        }
    }

    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        self.current += self.coefficient * (target - self.current);
        self.current
    }
}
