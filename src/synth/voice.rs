// Voice - Une note jouée
//
// A voice is either held (keyboard, MIDI) until `note_off`, or gated: it
// releases on its own after a fixed number of samples (scheduled triggers).

use super::envelope::{AdsrEnvelope, AdsrParams};
use super::oscillator::{Oscillator, SimpleOscillator, WaveformType};
use crate::sequencer::note::pitch_to_frequency;

pub struct ToneVoice {
    oscillator: SimpleOscillator,
    envelope: AdsrEnvelope,
    note: u8,
    velocity: f32,
    /// Samples left before an automatic note-off
    gate: Option<u32>,
    held: bool,
    /// Age counter for voice stealing priority (higher = newer)
    age: u64,
}

impl ToneVoice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            oscillator: SimpleOscillator::new(WaveformType::Triangle, sample_rate),
            envelope: AdsrEnvelope::new(AdsrParams::tone(), sample_rate),
            note: 0,
            velocity: 0.0,
            gate: None,
            held: false,
            age: 0,
        }
    }

    pub fn note_on(&mut self, note: u8, velocity: u8, gate: Option<u32>, age: u64) {
        self.note = note;
        self.velocity = velocity as f32 / 127.0;
        self.gate = gate;
        self.held = true;
        self.age = age;

        self.oscillator.set_frequency(pitch_to_frequency(note));
        self.oscillator.reset();
        self.envelope.note_on();
    }

    pub fn note_off(&mut self) {
        self.held = false;
        self.gate = None;
        self.envelope.note_off();
    }

    pub fn kill(&mut self) {
        self.held = false;
        self.gate = None;
        self.envelope.reset();
    }

    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    /// Key released but still sounding
    pub fn is_releasing(&self) -> bool {
        !self.held && self.envelope.is_active()
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn next_sample(&mut self) -> f32 {
        if let Some(remaining) = self.gate {
            if remaining == 0 {
                self.note_off();
            } else {
                self.gate = Some(remaining - 1);
            }
        }

        let envelope_value = self.envelope.process();
        self.oscillator.next_sample() * self.velocity * envelope_value
    }
}
