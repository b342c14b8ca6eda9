// Audio module
// Output engine, microphone capture, clip playback, recording codecs and
// waveform sampling

pub mod capture;
pub mod clip;
pub mod decode;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod parameters;
pub mod waveform;

pub use capture::{CaptureBuffer, CaptureStream};
pub use clip::{AudioClip, ClipPlayer};
pub use decode::{SampleBuffer, decode_blob, encode_wav};
pub use engine::{AudioEngine, Renderer};
pub use error::AudioError;
pub use parameters::AtomicF32;
pub use waveform::{WaveformBar, waveform_bars};
