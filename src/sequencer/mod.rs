// Sequencer module
// Step grids, note lists, musical time and the playback timeline

pub mod grid;
pub mod layout;
pub mod note;
pub mod note_list;
pub mod playback;
pub mod schedule;
pub mod timeline;
pub mod transport;

pub use grid::{GridError, StepGrid};
pub use layout::{DrumKind, GridLayout, Instrument, LayoutKind, RowSpec};
pub use note::{NoteEvent, note_name, parse_note_name};
pub use note_list::{NoteRecorder, TimedNote};
pub use playback::{PlaybackTimeline, StepIndicator, TimelineState};
pub use schedule::{
    ManualScheduler, Schedule, ScheduledEvent, Scheduler, ThreadScheduler, TriggerCallback,
};
pub use timeline::{
    GRID_NOTE_DURATION, STEP_BEATS, STEPS_PER_BAR, Subdivision, TICKS_PER_QUARTER, Tempo,
};
pub use transport::{Transport, TransportEvent, TransportListener, TransportState};
