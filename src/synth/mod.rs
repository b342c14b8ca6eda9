// Synth module
// Tone voices for the piano roll and keyboard, one-shot drum voices

pub mod drum;
pub mod envelope;
pub mod oscillator;
pub mod voice;
pub mod voice_manager;

pub use drum::{DrumKit, DrumVoice};
pub use envelope::{AdsrEnvelope, AdsrParams};
pub use voice_manager::VoiceManager;
