// MIDI module
// Live note messages, hardware input and Standard MIDI Files

pub mod event;
pub mod file;
pub mod input;

pub use event::MidiEvent;
pub use file::{MidiFileError, read_first_track, read_first_track_seconds, write_smf};
pub use input::{MidiEventConsumer, MidiEventProducer, MidiInput, MidiInputError};
