// Keyboard synth panel - live keys, note recording and sequence playback

use crate::files::ExportTarget;
use crate::messaging::command::Trigger;
use crate::messaging::sink::NoteSink;
use crate::midi::event::MidiEvent;
use crate::midi::file::{MidiFileError, read_first_track_seconds, write_smf};
use crate::sequencer::layout::Instrument;
use crate::sequencer::note_list::{NoteRecorder, TimedNote};
use crate::sequencer::playback::PlaybackTimeline;
use crate::sequencer::schedule::{
    Schedule, ScheduledEvent, Scheduler, ThreadScheduler, TriggerCallback,
};
use crate::sequencer::timeline::{Subdivision, Tempo};
use crate::sequencer::transport::TransportListener;
use log::{debug, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Lowest and highest key of the on-screen keyboard (C4..B5)
pub const FIRST_KEY: u8 = 60;
pub const LAST_KEY: u8 = 83;

/// Silence kept after the last note before a sequence counts as finished
pub const SEQUENCE_TAIL_SECONDS: f64 = 1.0;

/// Length written for every exported synth note
pub const EXPORT_NOTE_SECONDS: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent {
    Note { index: usize, pitch: u8 },
    End,
}

pub struct SynthPanel {
    recorder: NoteRecorder,
    timeline: PlaybackTimeline<SequenceEvent>,
    sink: Arc<dyn NoteSink>,
    tempo: Tempo,
    origin: Instant,
    sequence_active: Arc<AtomicBool>,
}

impl SynthPanel {
    pub fn new(sink: Arc<dyn NoteSink>, tempo: Tempo) -> Self {
        Self::with_scheduler(sink, Box::new(ThreadScheduler::new()), tempo)
    }

    pub fn with_scheduler(
        sink: Arc<dyn NoteSink>,
        scheduler: Box<dyn Scheduler<SequenceEvent>>,
        tempo: Tempo,
    ) -> Self {
        Self {
            recorder: NoteRecorder::new(),
            timeline: PlaybackTimeline::new(scheduler),
            sink,
            tempo,
            origin: Instant::now(),
            sequence_active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn target(&self) -> ExportTarget {
        ExportTarget::SynthRecording
    }

    pub fn notes(&self) -> &[TimedNote] {
        self.recorder.notes()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// True from `play_sequence` until the tail after the last note
    pub fn is_sequence_playing(&self) -> bool {
        self.sequence_active.load(Ordering::Acquire)
    }

    /// Index of the note last played by the sequence
    pub fn current_note(&self) -> Option<usize> {
        self.timeline.current_step()
    }

    pub fn set_tempo(&mut self, tempo: Tempo) {
        self.tempo = tempo;
    }

    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn key_trigger(&self, pitch: u8) -> Trigger {
        let seconds = self.tempo.subdivision_seconds(Subdivision::Eighth);
        Trigger::new(Instrument::Tone, pitch, seconds as f32)
    }

    /// Click on a key: play an eighth note and record it
    pub fn press_key(&mut self, pitch: u8) {
        let now = self.now();
        self.press_key_at(pitch, now);
    }

    /// Same as [`SynthPanel::press_key`] on an explicit clock, in seconds
    pub fn press_key_at(&mut self, pitch: u8, time: f64) {
        self.sink.trigger(self.key_trigger(pitch));
        self.record_note(pitch, time);
    }

    /// Held key (computer keyboard or MIDI controller)
    pub fn key_down(&mut self, pitch: u8, velocity: u8) {
        self.sink.note_on(pitch, velocity);
        let now = self.now();
        self.record_note(pitch, now);
    }

    /// A running sequence is rebuilt from the new note list
    fn record_note(&mut self, pitch: u8, time: f64) {
        if !self.recorder.record(pitch, time) {
            return;
        }
        debug!("Recorded {} at {:.3}s", pitch, time);
        if self.is_sequence_playing() {
            self.play_sequence();
        }
    }

    pub fn key_up(&mut self, pitch: u8) {
        self.sink.note_off(pitch);
    }

    pub fn handle_midi(&mut self, event: MidiEvent) {
        match event {
            MidiEvent::NoteOn { note, velocity } => self.key_down(note, velocity),
            MidiEvent::NoteOff { note } => self.key_up(note),
        }
    }

    /// Start a new recording, discarding the previous notes
    pub fn start_recording(&mut self) {
        self.stop_sequence();
        self.recorder.start();
        info!("Synth recording started");
    }

    pub fn stop_recording(&mut self) {
        self.recorder.stop();
        info!("Synth recording stopped: {} notes", self.recorder.notes().len());
    }

    /// Play the recorded notes relative to the first one
    pub fn play_sequence(&mut self) {
        if self.recorder.is_empty() {
            debug!("Nothing recorded, sequence not started");
            self.stop_sequence();
            return;
        }

        let offsets = self.recorder.offsets();
        let end_beat = self
            .tempo
            .seconds_to_beats(self.recorder.span_seconds() + SEQUENCE_TAIL_SECONDS);
        let tempo = self.tempo;
        let indicator = self.timeline.indicator();
        let sink = Arc::clone(&self.sink);
        let active = Arc::clone(&self.sequence_active);
        let note_trigger = self.key_trigger(0);

        active.store(true, Ordering::Release);
        self.timeline.sync(true, move || {
            let mut events: Vec<_> = offsets
                .into_iter()
                .enumerate()
                .map(|(index, (offset, pitch))| {
                    ScheduledEvent::new(
                        tempo.seconds_to_beats(offset),
                        SequenceEvent::Note { index, pitch },
                    )
                })
                .collect();
            events.push(ScheduledEvent::new(end_beat, SequenceEvent::End));

            let callback: TriggerCallback<SequenceEvent> = Box::new(move |event| match *event {
                SequenceEvent::Note { index, pitch } => {
                    indicator.set(index);
                    sink.trigger(Trigger {
                        note: pitch,
                        ..note_trigger
                    });
                }
                SequenceEvent::End => {
                    indicator.clear();
                    active.store(false, Ordering::Release);
                }
            });
            (Schedule::once(events, tempo), callback)
        });
    }

    pub fn stop_sequence(&mut self) {
        self.timeline.stop();
        self.sequence_active.store(false, Ordering::Release);
    }

    pub fn export_midi(&self) -> Result<Vec<u8>, MidiFileError> {
        let duration = self.tempo.seconds_to_beats(EXPORT_NOTE_SECONDS);
        write_smf(&self.recorder.to_events(&self.tempo, duration), &self.tempo)
    }

    /// Replace the note list with the first track of a MIDI file, timed by
    /// the file's own tempo. Returns the number of notes.
    pub fn import_midi(&mut self, bytes: &[u8]) -> Result<usize, MidiFileError> {
        let events = read_first_track_seconds(bytes)?;
        self.stop_sequence();
        self.recorder
            .replace(NoteRecorder::notes_from_events(&events));
        info!("Synth: imported {} notes", events.len());
        Ok(events.len())
    }
}

impl TransportListener for SynthPanel {
    fn transport_changed(&mut self, playing: bool) {
        if playing {
            self.play_sequence();
        } else {
            self.stop_sequence();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::command::Command;
    use crate::messaging::sink::CollectingSink;
    use crate::sequencer::schedule::ManualScheduler;

    fn synth_panel() -> (SynthPanel, ManualScheduler<SequenceEvent>, CollectingSink) {
        let clock = ManualScheduler::new();
        let sink = CollectingSink::new();
        let panel = SynthPanel::with_scheduler(
            Arc::new(sink.clone()),
            Box::new(clock.clone()),
            Tempo::default(),
        );
        (panel, clock, sink)
    }

    #[test]
    fn test_keys_sound_without_recording() {
        let (mut panel, _, sink) = synth_panel();
        panel.press_key_at(60, 1.0);

        let triggers = sink.triggers();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].note, 60);
        assert!((triggers[0].duration - 0.25).abs() < 1e-6);
        assert!(panel.notes().is_empty());
    }

    #[test]
    fn test_recording_captures_presses() {
        let (mut panel, _, _) = synth_panel();
        panel.start_recording();
        panel.press_key_at(60, 10.0);
        panel.press_key_at(64, 10.5);
        panel.stop_recording();
        panel.press_key_at(67, 11.0);

        assert_eq!(panel.notes(), &[TimedNote::new(60, 10.0), TimedNote::new(64, 10.5)]);
    }

    #[test]
    fn test_sequence_plays_relative_to_first_note() {
        let (mut panel, clock, sink) = synth_panel();
        panel.start_recording();
        panel.press_key_at(60, 10.0);
        panel.press_key_at(64, 10.5);
        panel.stop_recording();
        sink.clear();

        panel.play_sequence();
        assert!(panel.is_sequence_playing());

        // 0.5 s = 1 beat at 120 BPM
        clock.advance(0.0);
        assert_eq!(sink.triggers().len(), 1);
        assert_eq!(panel.current_note(), Some(0));

        clock.advance(1.0);
        assert_eq!(sink.triggers()[1].note, 64);
        assert_eq!(panel.current_note(), Some(1));

        // End lands 1 s (2 beats) after the last note
        clock.advance(1.5);
        assert!(panel.is_sequence_playing());
        clock.advance(0.5);
        assert!(!panel.is_sequence_playing());
        assert_eq!(panel.current_note(), None);
    }

    #[test]
    fn test_pause_stops_sequence() {
        let (mut panel, clock, sink) = synth_panel();
        panel.start_recording();
        panel.press_key_at(60, 0.0);
        panel.press_key_at(62, 2.0);
        panel.stop_recording();
        sink.clear();

        panel.transport_changed(true);
        clock.advance(0.5);
        panel.transport_changed(false);
        clock.advance(10.0);

        assert_eq!(sink.triggers().len(), 1);
        assert!(!panel.is_sequence_playing());
    }

    #[test]
    fn test_empty_sequence_does_not_schedule() {
        let (mut panel, clock, _) = synth_panel();
        panel.play_sequence();
        assert_eq!(clock.schedule_count(), 0);
        assert!(!panel.is_sequence_playing());
    }

    #[test]
    fn test_midi_events_hold_notes() {
        let (mut panel, _, sink) = synth_panel();
        panel.handle_midi(MidiEvent::NoteOn {
            note: 72,
            velocity: 80,
        });
        panel.handle_midi(MidiEvent::NoteOff { note: 72 });

        assert_eq!(
            sink.commands(),
            vec![
                Command::Midi(MidiEvent::NoteOn {
                    note: 72,
                    velocity: 80
                }),
                Command::Midi(MidiEvent::NoteOff { note: 72 }),
            ]
        );
    }

    #[test]
    fn test_export_import_normalises_base_time() {
        let (mut panel, _, _) = synth_panel();
        panel.start_recording();
        panel.press_key_at(60, 42.0);
        panel.press_key_at(64, 42.5);
        panel.stop_recording();
        let bytes = panel.export_midi().unwrap();

        let (mut fresh, _, _) = synth_panel();
        assert_eq!(fresh.import_midi(&bytes).unwrap(), 2);
        let notes = fresh.notes();
        assert_eq!(notes[0].pitch, 60);
        assert!(notes[0].time.abs() < 1e-6);
        assert_eq!(notes[1].pitch, 64);
        assert!((notes[1].time - 0.5).abs() < 1e-6);
    }
}
