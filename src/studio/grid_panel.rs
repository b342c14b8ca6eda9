// Grid panel - piano roll and drum sequencer
//
// Owns one step grid and its playback timeline. Every toggle, import or
// tempo change while playing rebuilds the schedule from the new snapshot.

use crate::config::StudioConfig;
use crate::files::ExportTarget;
use crate::messaging::command::Trigger;
use crate::messaging::sink::NoteSink;
use crate::midi::file::{MidiFileError, read_first_track, write_smf};
use crate::sequencer::grid::{GridError, StepGrid};
use crate::sequencer::layout::GridLayout;
use crate::sequencer::playback::PlaybackTimeline;
use crate::sequencer::schedule::{
    Schedule, ScheduledEvent, Scheduler, ThreadScheduler, TriggerCallback,
};
use crate::sequencer::timeline::{GRID_NOTE_DURATION, STEP_BEATS, Tempo, step_to_beats};
use crate::sequencer::transport::TransportListener;
use log::{debug, info};
use std::sync::Arc;

/// Everything that sounds on one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepTrigger {
    pub step: usize,
    pub hits: Vec<Trigger>,
}

pub struct GridPanel {
    target: ExportTarget,
    grid: StepGrid,
    timeline: PlaybackTimeline<StepTrigger>,
    sink: Arc<dyn NoteSink>,
    tempo: Tempo,
    loop_playback: bool,
    playing: bool,
}

impl GridPanel {
    pub fn piano_roll(sink: Arc<dyn NoteSink>, config: &StudioConfig) -> Self {
        Self::with_scheduler(
            GridLayout::piano_roll(),
            ExportTarget::PianoRoll,
            sink,
            Box::new(ThreadScheduler::new()),
            config,
        )
    }

    pub fn drum_grid(sink: Arc<dyn NoteSink>, config: &StudioConfig) -> Self {
        Self::with_scheduler(
            GridLayout::drum_grid(),
            ExportTarget::DrumGrid,
            sink,
            Box::new(ThreadScheduler::new()),
            config,
        )
    }

    pub fn with_scheduler(
        layout: GridLayout,
        target: ExportTarget,
        sink: Arc<dyn NoteSink>,
        scheduler: Box<dyn Scheduler<StepTrigger>>,
        config: &StudioConfig,
    ) -> Self {
        Self {
            target,
            grid: StepGrid::new(Arc::new(layout), config.steps_per_bar),
            timeline: PlaybackTimeline::new(scheduler),
            sink,
            tempo: config.tempo(),
            loop_playback: config.loop_playback,
            playing: false,
        }
    }

    pub fn target(&self) -> ExportTarget {
        self.target
    }

    pub fn grid(&self) -> &StepGrid {
        &self.grid
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_scheduled(&self) -> bool {
        self.timeline.is_scheduled()
    }

    /// Step under the playhead, `None` when stopped
    pub fn current_step(&self) -> Option<usize> {
        self.timeline.current_step()
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn set_tempo(&mut self, tempo: Tempo) {
        self.tempo = tempo;
        self.resync();
    }

    /// Flip one cell. Returns its new state.
    pub fn toggle(&mut self, row: usize, step: usize) -> Result<bool, GridError> {
        let active = self.grid.toggle(row, step)?;
        debug!("{:?} cell ({}, {}) -> {}", self.target, row, step, active);
        self.resync();
        Ok(active)
    }

    /// Per-step trigger lists for the current grid, empty steps included
    pub fn step_triggers(&self) -> Vec<StepTrigger> {
        let layout = self.grid.layout();
        (0..self.grid.steps())
            .map(|step| StepTrigger {
                step,
                hits: self
                    .grid
                    .active_rows_at(step)
                    .filter_map(|row| layout.row(row))
                    .map(|spec| {
                        let seconds = self
                            .tempo
                            .subdivision_seconds(spec.instrument.trigger_length());
                        Trigger::new(spec.instrument, spec.pitch, seconds as f32)
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn export_midi(&self) -> Result<Vec<u8>, MidiFileError> {
        let events = self.grid.to_events(STEP_BEATS, GRID_NOTE_DURATION);
        write_smf(&events, &self.tempo)
    }

    /// Replace the grid with the first track of a MIDI file.
    /// Returns the number of active cells.
    pub fn import_midi(&mut self, bytes: &[u8]) -> Result<usize, MidiFileError> {
        let events = read_first_track(bytes)?;
        self.grid = StepGrid::from_events(
            Arc::clone(self.grid.layout()),
            self.grid.steps(),
            &events,
            STEP_BEATS,
        );
        info!(
            "{:?}: imported {} notes into {} cells",
            self.target,
            events.len(),
            self.grid.active_count()
        );
        self.resync();
        Ok(self.grid.active_count())
    }

    fn resync(&mut self) {
        let snapshot = self.step_triggers();
        let indicator = self.timeline.indicator();
        let sink = Arc::clone(&self.sink);
        let tempo = self.tempo;
        let loop_beats = self
            .loop_playback
            .then(|| self.grid.steps() as f64 * STEP_BEATS);

        self.timeline.sync(self.playing, move || {
            let events = snapshot
                .into_iter()
                .map(|trigger| ScheduledEvent::new(step_to_beats(trigger.step), trigger))
                .collect();
            let schedule = match loop_beats {
                Some(len) => Schedule::looping(events, tempo, len),
                None => Schedule::once(events, tempo),
            };
            let callback: TriggerCallback<StepTrigger> = Box::new(move |trigger| {
                indicator.set(trigger.step);
                for hit in &trigger.hits {
                    sink.trigger(*hit);
                }
            });
            (schedule, callback)
        });
    }
}

impl TransportListener for GridPanel {
    fn transport_changed(&mut self, playing: bool) {
        self.playing = playing;
        self.resync();
    }
}
