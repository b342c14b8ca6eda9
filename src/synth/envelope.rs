// ADSR Envelope
//
// Linear Attack-Decay-Sustain-Release amplitude envelope. Release always
// starts from the level reached when the gate closed.

/// ADSR Envelope parameters (seconds, sustain as a level)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl AdsrParams {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.clamp(0.001, 5.0),
            decay: decay.clamp(0.001, 5.0),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.clamp(0.001, 5.0),
        }
    }

    /// Tone voices: short attack, soft sustain
    pub fn tone() -> Self {
        Self::new(0.005, 0.1, 0.3, 1.0)
    }

    /// Drum hits: instant attack, no sustain
    pub fn percussive(decay: f32) -> Self {
        Self::new(0.001, decay, 0.0, 0.05)
    }
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self::tone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvelopeState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct AdsrEnvelope {
    params: AdsrParams,
    state: EnvelopeState,
    value: f32,
    sample_rate: f32,
    /// Samples spent in the current stage
    position: f32,
    release_from: f32,
}

impl AdsrEnvelope {
    pub fn new(params: AdsrParams, sample_rate: f32) -> Self {
        Self {
            params,
            state: EnvelopeState::Idle,
            value: 0.0,
            sample_rate,
            position: 0.0,
            release_from: 0.0,
        }
    }

    pub fn set_params(&mut self, params: AdsrParams) {
        self.params = params;
    }

    pub fn note_on(&mut self) {
        self.state = EnvelopeState::Attack;
        self.position = 0.0;
        self.value = 0.0;
    }

    pub fn note_off(&mut self) {
        if self.state != EnvelopeState::Idle {
            self.release_from = self.value;
            self.state = EnvelopeState::Release;
            self.position = 0.0;
        }
    }

    /// Next envelope value in [0, 1]
    pub fn process(&mut self) -> f32 {
        let stage_samples = |seconds: f32| (seconds * self.sample_rate).max(1.0);

        match self.state {
            EnvelopeState::Idle => self.value = 0.0,
            EnvelopeState::Attack => {
                let len = stage_samples(self.params.attack);
                self.position += 1.0;
                self.value = (self.position / len).min(1.0);
                if self.position >= len {
                    self.state = EnvelopeState::Decay;
                    self.position = 0.0;
                }
            }
            EnvelopeState::Decay => {
                let len = stage_samples(self.params.decay);
                self.position += 1.0;
                let progress = (self.position / len).min(1.0);
                self.value = 1.0 - progress * (1.0 - self.params.sustain);
                if self.position >= len {
                    self.state = if self.params.sustain > 0.0 {
                        EnvelopeState::Sustain
                    } else {
                        EnvelopeState::Idle
                    };
                    self.value = self.params.sustain;
                }
            }
            EnvelopeState::Sustain => self.value = self.params.sustain,
            EnvelopeState::Release => {
                let len = stage_samples(self.params.release);
                self.position += 1.0;
                let progress = (self.position / len).min(1.0);
                self.value = self.release_from * (1.0 - progress);
                if self.position >= len {
                    self.state = EnvelopeState::Idle;
                    self.value = 0.0;
                }
            }
        }

        self.value
    }

    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    pub fn is_releasing(&self) -> bool {
        self.state == EnvelopeState::Release
    }

    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.value = 0.0;
        self.position = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SAMPLE_RATE: f32 = 48000.0;

    fn run(envelope: &mut AdsrEnvelope, samples: usize) -> f32 {
        let mut last = 0.0;
        for _ in 0..samples {
            last = envelope.process();
        }
        last
    }

    #[test]
    fn test_adsr_params_clamping() {
        let params = AdsrParams::new(-1.0, 10.0, 1.5, 0.0001);
        assert_eq!(params.attack, 0.001);
        assert_eq!(params.decay, 5.0);
        assert_eq!(params.sustain, 1.0);
        assert_eq!(params.release, 0.001);
    }

    #[test]
    fn test_envelope_starts_idle() {
        let mut envelope = AdsrEnvelope::new(AdsrParams::default(), TEST_SAMPLE_RATE);
        assert!(!envelope.is_active());
        assert_eq!(envelope.process(), 0.0);
    }

    #[test]
    fn test_full_cycle() {
        let params = AdsrParams::new(0.01, 0.01, 0.5, 0.01);
        let mut envelope = AdsrEnvelope::new(params, TEST_SAMPLE_RATE);

        envelope.note_on();
        // Attack peak
        let peak = run(&mut envelope, 480);
        assert!((peak - 1.0).abs() < 0.01);

        // Sustain
        let held = run(&mut envelope, 2000);
        assert!((held - 0.5).abs() < 1e-6);

        envelope.note_off();
        assert!(envelope.is_releasing());
        run(&mut envelope, 481);
        assert!(!envelope.is_active());
    }

    #[test]
    fn test_release_starts_from_current_level() {
        let params = AdsrParams::new(0.1, 0.1, 0.8, 0.1);
        let mut envelope = AdsrEnvelope::new(params, TEST_SAMPLE_RATE);

        envelope.note_on();
        let mid_attack = run(&mut envelope, 2400);
        envelope.note_off();
        let first_release = envelope.process();

        assert!(first_release <= mid_attack);
        assert!(first_release > mid_attack * 0.9);
    }

    #[test]
    fn test_percussive_ends_without_note_off() {
        let mut envelope = AdsrEnvelope::new(AdsrParams::percussive(0.05), TEST_SAMPLE_RATE);
        envelope.note_on();
        run(&mut envelope, 48 + 2400 + 10);
        assert!(!envelope.is_active());
    }
}
