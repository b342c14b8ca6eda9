// gridstudio - Library exports for tests and benchmarks

pub mod audio;
pub mod config;
pub mod files;
pub mod messaging;
pub mod midi;
pub mod sequencer;
pub mod studio;
pub mod synth;
pub mod ui;

// Re-export commonly used types for convenience
pub use audio::engine::AudioEngine;
pub use audio::waveform::{WaveformBar, waveform_bars};
pub use config::{ConfigError, StudioConfig};
pub use files::ExportTarget;
pub use messaging::channels::{create_command_channel, create_notification_channel};
pub use messaging::notification::Notifier;
pub use messaging::sink::{CollectingSink, CommandSink, NoteSink};
pub use midi::event::MidiEvent;
pub use midi::file::{read_first_track, read_first_track_seconds, write_smf};
pub use sequencer::{
    GridLayout, ManualScheduler, NoteEvent, PlaybackTimeline, StepGrid, Tempo, ThreadScheduler,
    Transport, TransportListener,
};
pub use studio::{Feature, Studio, StudioError};
