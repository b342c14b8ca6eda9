// Standard MIDI File import/export
//
// Export writes a single-track (format 0) file at 480 ticks per quarter note
// with one tempo meta event. Import reads the first track only and turns
// note on/off pairs into `NoteEvent`s measured in quarter notes, or in
// seconds through the file's tempo map.

use crate::sequencer::note::NoteEvent;
use crate::sequencer::timeline::{TICKS_PER_QUARTER, Tempo, beats_to_ticks, ticks_to_beats};
use log::debug;
use midly::num::{u4, u7, u15, u24, u28};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use std::collections::HashMap;

const EXPORT_VELOCITY: u8 = 100;

#[derive(Debug, thiserror::Error)]
pub enum MidiFileError {
    #[error("Invalid MIDI file: {0}")]
    Parse(#[from] midly::Error),

    #[error("Failed to write MIDI file: {0}")]
    Write(#[from] std::io::Error),
}

/// Serialize notes into a single-track MIDI file
pub fn write_smf(notes: &[NoteEvent], tempo: &Tempo) -> Result<Vec<u8>, MidiFileError> {
    let channel = u4::new(0);

    // (tick, order, kind): note offs sort before note ons on the same tick
    let mut events: Vec<(u32, u8, TrackEventKind<'static>)> = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        let key = u7::new(note.pitch.min(127));
        let start = beats_to_ticks(note.start);
        let end = beats_to_ticks(note.end()).max(start + 1);

        events.push((
            start,
            1,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(EXPORT_VELOCITY),
                },
            },
        ));
        events.push((
            end,
            0,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key,
                    vel: u7::new(0),
                },
            },
        ));
    }
    events.sort_by_key(|(tick, order, _)| (*tick, *order));

    let mut track: Track<'static> = Vec::with_capacity(events.len() + 2);
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo.micros_per_quarter()))),
    });

    let mut last_tick = 0u32;
    for (tick, _, kind) in events {
        track.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind,
        });
        last_tick = tick;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: Header::new(Format::SingleTrack, Timing::Metrical(u15::new(TICKS_PER_QUARTER))),
        tracks: vec![track],
    };

    let mut buffer = Vec::new();
    smf.write_std(&mut buffer)?;
    debug!("Wrote MIDI file: {} notes, {} bytes", notes.len(), buffer.len());
    Ok(buffer)
}

/// Converts absolute ticks to quarter notes or seconds for a file's time division
struct TickClock {
    timing: Timing,
    tempo: Tempo,
    /// Last tempo change, as (tick, seconds)
    anchor_tick: u64,
    anchor_seconds: f64,
}

impl TickClock {
    fn new(timing: Timing) -> Self {
        Self {
            timing,
            tempo: Tempo::default(),
            anchor_tick: 0,
            anchor_seconds: 0.0,
        }
    }

    fn ticks_per_second(fps: midly::Fps, subframes: u8) -> f64 {
        fps.as_f32() as f64 * subframes as f64
    }

    fn beats(&self, tick: u64) -> f64 {
        match self.timing {
            Timing::Metrical(ticks_per_quarter) => ticks_to_beats(tick, ticks_per_quarter.as_int()),
            Timing::Timecode(fps, subframes) => {
                let ticks_per_second = Self::ticks_per_second(fps, subframes);
                if ticks_per_second <= 0.0 {
                    return 0.0;
                }
                self.tempo.seconds_to_beats(tick as f64 / ticks_per_second)
            }
        }
    }

    fn seconds_per_tick(&self) -> f64 {
        match self.timing {
            Timing::Metrical(ticks_per_quarter) => match ticks_per_quarter.as_int() {
                0 => 0.0,
                tpq => self.tempo.beat_duration_seconds() / tpq as f64,
            },
            Timing::Timecode(fps, subframes) => {
                let ticks_per_second = Self::ticks_per_second(fps, subframes);
                if ticks_per_second <= 0.0 {
                    0.0
                } else {
                    1.0 / ticks_per_second
                }
            }
        }
    }

    /// Tempo changes only affect ticks after `tick`
    fn seconds(&self, tick: u64) -> f64 {
        let elapsed = tick.saturating_sub(self.anchor_tick) as f64;
        self.anchor_seconds + elapsed * self.seconds_per_tick()
    }

    fn set_tempo(&mut self, tick: u64, tempo: Tempo) {
        self.anchor_seconds = self.seconds(tick);
        self.anchor_tick = tick;
        self.tempo = tempo;
    }

    fn time(&self, tick: u64, unit: TimeUnit) -> f64 {
        match unit {
            TimeUnit::Beats => self.beats(tick),
            TimeUnit::Seconds => self.seconds(tick),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeUnit {
    Beats,
    Seconds,
}

/// Read the notes of the first track, timed in quarter notes
///
/// Other tracks are ignored. A note-on with velocity 0 counts as a note-off;
/// notes still held at the end of the track end on the last event.
pub fn read_first_track(bytes: &[u8]) -> Result<Vec<NoteEvent>, MidiFileError> {
    read_notes(bytes, TimeUnit::Beats)
}

/// Same as [`read_first_track`] with `start` and `duration` in seconds,
/// following the file's own tempo map
pub fn read_first_track_seconds(bytes: &[u8]) -> Result<Vec<NoteEvent>, MidiFileError> {
    read_notes(bytes, TimeUnit::Seconds)
}

fn read_notes(bytes: &[u8], unit: TimeUnit) -> Result<Vec<NoteEvent>, MidiFileError> {
    let smf = Smf::parse(bytes)?;

    let Some(track) = smf.tracks.first() else {
        debug!("MIDI file has no tracks");
        return Ok(Vec::new());
    };

    let mut clock = TickClock::new(smf.header.timing);

    let mut notes = Vec::new();
    let mut held: HashMap<u8, Vec<f64>> = HashMap::new();
    let mut tick: u64 = 0;

    for event in track {
        tick += event.delta.as_int() as u64;
        let time = clock.time(tick, unit);

        match event.kind {
            TrackEventKind::Midi { message, .. } => match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    held.entry(key.as_int()).or_default().push(time);
                }
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    let pitch = key.as_int();
                    if let Some(starts) = held.get_mut(&pitch)
                        && !starts.is_empty()
                    {
                        let start = starts.remove(0);
                        notes.push(NoteEvent::new(pitch, start, (time - start).max(0.0)));
                    }
                }
                _ => {}
            },
            TrackEventKind::Meta(MetaMessage::Tempo(micros)) => {
                if let Some(tempo) = Tempo::from_micros_per_quarter(micros.as_int()) {
                    clock.set_tempo(tick, tempo);
                }
            }
            _ => {}
        }
    }

    let end = clock.time(tick, unit);
    for (pitch, starts) in held {
        for start in starts {
            notes.push(NoteEvent::new(pitch, start, (end - start).max(0.0)));
        }
    }

    notes.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.pitch.cmp(&b.pitch)));
    debug!(
        "Read {} notes ({:?}) from track 0 of {} track(s)",
        notes.len(),
        unit,
        smf.tracks.len()
    );
    Ok(notes)
}
