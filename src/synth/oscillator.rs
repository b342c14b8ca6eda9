// Oscillateurs - Générateurs de formes d'onde et de bruit

use std::f32::consts::PI;

pub trait Oscillator {
    fn next_sample(&mut self) -> f32;
    fn set_frequency(&mut self, freq: f32);
    fn reset(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaveformType {
    Sine,
    Square,
    Triangle,
}

pub struct SimpleOscillator {
    waveform: WaveformType,
    phase: f32,
    phase_increment: f32,
    sample_rate: f32,
}

impl SimpleOscillator {
    pub fn new(waveform: WaveformType, sample_rate: f32) -> Self {
        Self {
            waveform,
            phase: 0.0,
            phase_increment: 0.0,
            sample_rate,
        }
    }
}

impl Oscillator for SimpleOscillator {
    fn next_sample(&mut self) -> f32 {
        let sample = match self.waveform {
            WaveformType::Sine => (self.phase * 2.0 * PI).sin(),
            WaveformType::Square => {
                if self.phase < 0.5 { 1.0 } else { -1.0 }
            }
            WaveformType::Triangle => {
                if self.phase < 0.5 {
                    (self.phase * 4.0) - 1.0
                } else {
                    3.0 - (self.phase * 4.0)
                }
            }
        };

        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }

    fn set_frequency(&mut self, freq: f32) {
        self.phase_increment = freq / self.sample_rate;
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// White noise from a xorshift32 generator (no allocation, audio-thread safe)
pub struct NoiseGenerator {
    state: u32,
}

impl NoiseGenerator {
    pub fn new(seed: u32) -> Self {
        // xorshift is stuck at 0
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        // [0, 1) -> [-1, 1)
        (x >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new(0x1234_5678)
    }
}

/// Pink (-3 dB/octave) noise, economy three-pole filter over white noise
pub struct PinkNoise {
    white: NoiseGenerator,
    b0: f32,
    b1: f32,
    b2: f32,
}

impl PinkNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            white: NoiseGenerator::new(seed),
            b0: 0.0,
            b1: 0.0,
            b2: 0.0,
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        let white = self.white.next_sample();
        self.b0 = 0.99765 * self.b0 + white * 0.099_046;
        self.b1 = 0.963 * self.b1 + white * 0.296_516_4;
        self.b2 = 0.57 * self.b2 + white * 1.052_691_3;
        ((self.b0 + self.b1 + self.b2 + white * 0.1848) * 0.25).clamp(-1.0, 1.0)
    }
}
