// Voice Manager - Polyphony handling

use super::voice::ToneVoice;

pub const MAX_VOICES: usize = 16;

pub struct VoiceManager {
    voices: [ToneVoice; MAX_VOICES],
    sample_rate: f32,
    /// Incremented on each note_on for voice stealing priority
    age_counter: u64,
}

impl VoiceManager {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: std::array::from_fn(|_| ToneVoice::new(sample_rate)),
            sample_rate,
            age_counter: 0,
        }
    }

    /// Held note, released by `note_off`
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        self.start(note, velocity, None);
    }

    /// Note released automatically after `duration` seconds
    pub fn trigger(&mut self, note: u8, velocity: u8, duration: f32) {
        let gate = (duration.max(0.0) * self.sample_rate) as u32;
        self.start(note, velocity, Some(gate));
    }

    fn start(&mut self, note: u8, velocity: u8, gate: Option<u32>) {
        self.age_counter = self.age_counter.wrapping_add(1);

        let index = self
            .voices
            .iter()
            .position(|v| !v.is_active())
            .unwrap_or_else(|| self.find_voice_to_steal());
        self.voices[index].note_on(note, velocity, gate, self.age_counter);
    }

    /// Releasing voices first, then the oldest one
    fn find_voice_to_steal(&self) -> usize {
        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| (!v.is_releasing(), v.age()))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn note_off(&mut self, note: u8) {
        for voice in &mut self.voices {
            if voice.is_active() && voice.note() == note {
                voice.note_off();
            }
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        self.voices.iter_mut().map(|v| v.next_sample()).sum::<f32>() / 4.0
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44100.0;

    #[test]
    fn test_voice_allocation() {
        let mut vm = VoiceManager::new(SAMPLE_RATE);
        assert_eq!(vm.active_voice_count(), 0);

        vm.note_on(60, 100);
        vm.note_on(64, 100);
        vm.trigger(67, 100, 0.25);
        assert_eq!(vm.active_voice_count(), 3);
    }

    #[test]
    fn test_note_off_releases() {
        let mut vm = VoiceManager::new(SAMPLE_RATE);
        vm.note_on(60, 100);
        vm.note_on(64, 100);

        vm.note_off(64);
        // Still in release phase
        assert_eq!(vm.active_voice_count(), 2);

        for _ in 0..(SAMPLE_RATE as usize + 100) {
            vm.next_sample();
        }
        assert_eq!(vm.active_voice_count(), 1);
    }

    #[test]
    fn test_voice_stealing() {
        let mut vm = VoiceManager::new(SAMPLE_RATE);
        for i in 0..MAX_VOICES {
            vm.note_on(60 + i as u8, 100);
        }
        assert_eq!(vm.active_voice_count(), MAX_VOICES);

        vm.note_on(90, 100);
        assert_eq!(vm.active_voice_count(), MAX_VOICES);
        // The oldest voice (note 60) was stolen
        assert!(!vm.voices.iter().any(|v| v.note() == 60));
    }

    #[test]
    fn test_voice_stealing_prioritizes_releasing() {
        let mut vm = VoiceManager::new(SAMPLE_RATE);
        for i in 0..MAX_VOICES {
            vm.note_on(60 + i as u8, 100);
        }
        vm.note_off(65);

        vm.note_on(90, 100);
        assert!(vm.voices.iter().any(|v| v.note() == 60));
        assert!(!vm.voices.iter().any(|v| v.note() == 65));
    }

    #[test]
    fn test_all_notes_off() {
        let mut vm = VoiceManager::new(SAMPLE_RATE);
        vm.note_on(60, 100);
        vm.trigger(62, 100, 1.0);
        vm.all_notes_off();
        assert_eq!(vm.active_voice_count(), 0);
    }
}
