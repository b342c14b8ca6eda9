// Types de commandes - Communication UI → Audio

use crate::audio::clip::AudioClip;
use crate::midi::event::MidiEvent;
use crate::sequencer::layout::Instrument;
use std::sync::Arc;

/// One scheduled or played note: the engine gates it off after `duration`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    pub instrument: Instrument,
    pub note: u8,
    pub velocity: u8,
    /// Seconds
    pub duration: f32,
}

impl Trigger {
    pub const DEFAULT_VELOCITY: u8 = 100;

    pub fn new(instrument: Instrument, note: u8, duration: f32) -> Self {
        Self {
            instrument,
            note,
            velocity: Self::DEFAULT_VELOCITY,
            duration: duration.max(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Trigger(Trigger),
    /// Held note from the keyboard or a hardware controller
    Midi(MidiEvent),
    SetVolume(f32),
    AllNotesOff,
    /// Play a recording from its start, replacing any clip already playing
    PlayClip(Arc<AudioClip>),
    StopClip,
}
