// Drum kit - synthesized one-shot percussion
//
// kick  : sine with a downward pitch sweep
// snare : white noise burst
// hi-hat: cluster of detuned square waves through a high-pass
// clap  : band-passed pink noise

use super::envelope::{AdsrEnvelope, AdsrParams};
use super::oscillator::{NoiseGenerator, Oscillator, PinkNoise, SimpleOscillator, WaveformType};
use crate::sequencer::layout::DrumKind;
use std::f32::consts::PI;

pub const MAX_DRUM_VOICES: usize = 8;

const KICK_START_HZ: f32 = 160.0;
const KICK_END_HZ: f32 = 45.0;
const KICK_SWEEP_SECONDS: f32 = 0.06;
const HIHAT_PARTIALS: [f32; 6] = [205.3, 304.4, 369.6, 522.7, 540.0, 800.0];
const HIHAT_RATIO: f32 = 2.0;

/// One-pole filter, low-pass output with the high-pass as its complement
struct OnePole {
    coefficient: f32,
    state: f32,
}

impl OnePole {
    fn new(cutoff: f32, sample_rate: f32) -> Self {
        Self {
            coefficient: 1.0 - (-2.0 * PI * cutoff / sample_rate).exp(),
            state: 0.0,
        }
    }

    fn low_pass(&mut self, input: f32) -> f32 {
        self.state += self.coefficient * (input - self.state);
        self.state
    }

    fn high_pass(&mut self, input: f32) -> f32 {
        input - self.low_pass(input)
    }

    fn reset(&mut self) {
        self.state = 0.0;
    }
}

pub struct DrumVoice {
    kind: DrumKind,
    envelope: AdsrEnvelope,
    sample_rate: f32,
    /// Samples since the hit
    elapsed: u32,
    gate: Option<u32>,
    velocity: f32,
    age: u64,
    body: SimpleOscillator,
    partials: [SimpleOscillator; 6],
    white: NoiseGenerator,
    pink: PinkNoise,
    high_pass: OnePole,
    band_high: OnePole,
    band_low: OnePole,
}

impl DrumVoice {
    pub fn new(sample_rate: f32, seed: u32) -> Self {
        Self {
            kind: DrumKind::Kick,
            envelope: AdsrEnvelope::new(AdsrParams::percussive(0.3), sample_rate),
            sample_rate,
            elapsed: 0,
            gate: None,
            velocity: 0.0,
            age: 0,
            body: SimpleOscillator::new(WaveformType::Sine, sample_rate),
            partials: std::array::from_fn(|_| SimpleOscillator::new(WaveformType::Square, sample_rate)),
            white: NoiseGenerator::new(seed),
            pink: PinkNoise::new(seed.wrapping_mul(31).wrapping_add(1)),
            high_pass: OnePole::new(7000.0, sample_rate),
            band_high: OnePole::new(800.0, sample_rate),
            band_low: OnePole::new(2500.0, sample_rate),
        }
    }

    fn decay_for(kind: DrumKind) -> f32 {
        match kind {
            DrumKind::Kick => 0.4,
            DrumKind::Snare => 0.2,
            DrumKind::HiHat => 0.08,
            DrumKind::Clap => 0.15,
        }
    }

    pub fn trigger(&mut self, kind: DrumKind, velocity: u8, duration: f32, age: u64) {
        self.kind = kind;
        self.velocity = velocity as f32 / 127.0;
        self.elapsed = 0;
        self.age = age;
        self.gate = Some((duration.max(0.0) * self.sample_rate) as u32);

        self.envelope.set_params(AdsrParams::percussive(Self::decay_for(kind)));
        self.envelope.note_on();

        self.body.reset();
        for (osc, freq) in self.partials.iter_mut().zip(HIHAT_PARTIALS) {
            osc.reset();
            osc.set_frequency(freq * HIHAT_RATIO);
        }
        self.high_pass.reset();
        self.band_high.reset();
        self.band_low.reset();
    }

    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    pub fn kind(&self) -> DrumKind {
        self.kind
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn kill(&mut self) {
        self.gate = None;
        self.envelope.reset();
    }

    fn source(&mut self) -> f32 {
        match self.kind {
            DrumKind::Kick => {
                let t = self.elapsed as f32 / self.sample_rate;
                let sweep = (-t / KICK_SWEEP_SECONDS).exp();
                self.body
                    .set_frequency(KICK_END_HZ + (KICK_START_HZ - KICK_END_HZ) * sweep);
                self.body.next_sample()
            }
            DrumKind::Snare => self.white.next_sample(),
            DrumKind::HiHat => {
                let cluster =
                    self.partials.iter_mut().map(|o| o.next_sample()).sum::<f32>() / 6.0;
                self.high_pass.high_pass(cluster)
            }
            DrumKind::Clap => {
                let noise = self.pink.next_sample();
                let band = self.band_low.low_pass(noise);
                self.band_high.high_pass(band) * 2.0
            }
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        if !self.envelope.is_active() {
            return 0.0;
        }

        if let Some(remaining) = self.gate {
            if remaining == 0 {
                self.gate = None;
                self.envelope.note_off();
            } else {
                self.gate = Some(remaining - 1);
            }
        }

        let sample = self.source() * self.velocity * self.envelope.process();
        self.elapsed = self.elapsed.saturating_add(1);
        sample
    }
}

/// Fixed pool of drum voices, oldest hit stolen first
pub struct DrumKit {
    voices: [DrumVoice; MAX_DRUM_VOICES],
    age_counter: u64,
}

impl DrumKit {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: std::array::from_fn(|i| DrumVoice::new(sample_rate, 0xA5A5_0001 + i as u32)),
            age_counter: 0,
        }
    }

    pub fn trigger(&mut self, kind: DrumKind, velocity: u8, duration: f32) {
        self.age_counter = self.age_counter.wrapping_add(1);
        let index = self
            .voices
            .iter()
            .position(|v| !v.is_active())
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.age())
                    .map(|(i, _)| i)
            })
            .unwrap_or(0);
        self.voices[index].trigger(kind, velocity, duration, self.age_counter);
    }

    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        self.voices.iter_mut().map(|v| v.next_sample()).sum::<f32>() / 2.0
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44100.0;

    fn render(voice: &mut DrumVoice, samples: usize) -> Vec<f32> {
        (0..samples).map(|_| voice.next_sample()).collect()
    }

    fn energy(samples: &[f32]) -> f32 {
        samples.iter().map(|s| s * s).sum::<f32>() / samples.len().max(1) as f32
    }

    #[test]
    fn test_every_kind_sounds_then_stops() {
        for kind in DrumKind::ALL {
            let mut voice = DrumVoice::new(SAMPLE_RATE, 42);
            voice.trigger(kind, 127, 1.0, 1);

            let hit = render(&mut voice, 2000);
            assert!(energy(&hit) > 1e-4, "{:?} is silent", kind);
            assert!(hit.iter().all(|s| s.is_finite() && s.abs() <= 2.0));

            render(&mut voice, SAMPLE_RATE as usize);
            assert!(!voice.is_active(), "{:?} never ends", kind);
        }
    }

    #[test]
    fn test_short_gate_cuts_the_hit() {
        let mut voice = DrumVoice::new(SAMPLE_RATE, 1);
        // 16th note at 120 BPM
        voice.trigger(DrumKind::Kick, 100, 0.125, 1);
        // Gate (5512 samples) then the 50ms release
        render(&mut voice, 8000);
        assert!(!voice.is_active());
    }

    #[test]
    fn test_kick_pitch_drops() {
        let mut voice = DrumVoice::new(SAMPLE_RATE, 1);
        voice.trigger(DrumKind::Kick, 127, 1.0, 1);
        let samples = render(&mut voice, 8000);

        let crossings = |s: &[f32]| s.windows(2).filter(|w| w[0] <= 0.0 && w[1] > 0.0).count();
        assert!(crossings(&samples[..2000]) > crossings(&samples[6000..8000]));
    }

    #[test]
    fn test_kit_steals_oldest() {
        let mut kit = DrumKit::new(SAMPLE_RATE);
        for _ in 0..MAX_DRUM_VOICES {
            kit.trigger(DrumKind::Kick, 100, 1.0);
        }
        kit.trigger(DrumKind::Clap, 100, 1.0);
        assert_eq!(kit.active_voice_count(), MAX_DRUM_VOICES);
        assert_eq!(
            kit.voices.iter().filter(|v| v.kind() == DrumKind::Clap).count(),
            1
        );

        kit.all_notes_off();
        assert_eq!(kit.active_voice_count(), 0);
    }
}
