// Note recorder - Captures keyboard presses into a timestamped note list
// Used by the keyboard synth: append-only while recording, replaced on import

use crate::sequencer::note::{NoteEvent, note_name};
use crate::sequencer::timeline::Tempo;

/// A key press captured from the keyboard synth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedNote {
    pub pitch: u8,
    /// Seconds on the capturing clock. Only differences matter.
    pub time: f64,
}

impl TimedNote {
    pub fn new(pitch: u8, time: f64) -> Self {
        Self { pitch, time }
    }

    pub fn name(&self) -> String {
        note_name(self.pitch)
    }
}

/// Records key presses while armed
#[derive(Debug, Default, Clone)]
pub struct NoteRecorder {
    notes: Vec<TimedNote>,
    recording: bool,
}

impl NoteRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the recorder; previous notes are discarded
    pub fn start(&mut self) {
        self.notes.clear();
        self.recording = true;
    }

    pub fn stop(&mut self) {
        self.recording = false;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Append a press. Returns false when not recording.
    pub fn record(&mut self, pitch: u8, time: f64) -> bool {
        if !self.recording {
            return false;
        }
        self.notes.push(TimedNote::new(pitch, time));
        true
    }

    pub fn notes(&self) -> &[TimedNote] {
        &self.notes
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Replace the whole list (import)
    pub fn replace(&mut self, notes: Vec<TimedNote>) {
        self.notes = notes;
    }

    /// Time of the first note; every offset is relative to it
    pub fn base_time(&self) -> Option<f64> {
        self.notes.first().map(|n| n.time)
    }

    /// Notes as (seconds since the first note, pitch)
    pub fn offsets(&self) -> Vec<(f64, u8)> {
        let Some(base) = self.base_time() else {
            return Vec::new();
        };
        self.notes.iter().map(|n| (n.time - base, n.pitch)).collect()
    }

    /// Seconds from the first to the last note
    pub fn span_seconds(&self) -> f64 {
        match (self.notes.first(), self.notes.last()) {
            (Some(first), Some(last)) => (last.time - first.time).max(0.0),
            _ => 0.0,
        }
    }

    /// Notes as timed events in quarter notes, relative to the first note
    pub fn to_events(&self, tempo: &Tempo, duration: f64) -> Vec<NoteEvent> {
        self.offsets()
            .into_iter()
            .map(|(offset, pitch)| NoteEvent::new(pitch, tempo.seconds_to_beats(offset), duration))
            .collect()
    }

    /// Rebuild a note list from imported events timed in seconds
    pub fn notes_from_events(events: &[NoteEvent]) -> Vec<TimedNote> {
        events
            .iter()
            .map(|e| TimedNote::new(e.pitch, e.start))
            .collect()
    }
}
