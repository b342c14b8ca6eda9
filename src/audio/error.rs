// Audio errors - devices, streams and codecs

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoOutputDevice,

    #[error("No audio input device found")]
    NoInputDevice,

    #[error("Audio device configuration error: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Failed to open audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("Unsupported sample format: {0}. Supported formats: F32, I16, U16")]
    UnsupportedFormat(String),

    #[error("WAV codec error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Audio decode error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("No audio track in file")]
    NoAudioTrack,

    #[error("Nothing was recorded")]
    EmptyRecording,
}
