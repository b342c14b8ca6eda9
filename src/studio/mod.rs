// Studio - feature panels behind one transport
//
// The studio keeps one instance of every panel so their state survives
// switching features. Transport changes are drained after each action and
// forwarded to the active panel only.

pub mod grid_panel;
pub mod recorder_panel;
pub mod synth_panel;

pub use grid_panel::{GridPanel, StepTrigger};
pub use recorder_panel::RecorderPanel;
pub use synth_panel::{SequenceEvent, SynthPanel};

use crate::audio::error::AudioError;
use crate::config::{ConfigError, StudioConfig};
use crate::files::{self, ExportTarget, FileError};
use crate::messaging::command::Command;
use crate::messaging::notification::{NotificationCategory, Notifier};
use crate::messaging::sink::NoteSink;
use crate::midi::event::MidiEvent;
use crate::midi::file::MidiFileError;
use crate::sequencer::grid::GridError;
use crate::sequencer::layout::GridLayout;
use crate::sequencer::schedule::Scheduler;
use crate::sequencer::timeline::Tempo;
use crate::sequencer::transport::{Transport, TransportListener};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feature {
    #[default]
    Piano,
    Drums,
    Recorder,
    Synth,
    ImportExport,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Piano,
        Feature::Drums,
        Feature::Recorder,
        Feature::Synth,
        Feature::ImportExport,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Feature::Piano => "Piano",
            Feature::Drums => "Drums",
            Feature::Recorder => "Recorder",
            Feature::Synth => "Synth",
            Feature::ImportExport => "Import/Export",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Feature::Piano => "🎹",
            Feature::Drums => "🥁",
            Feature::Recorder => "🎤",
            Feature::Synth => "🎛",
            Feature::ImportExport => "⇅",
        }
    }

    /// Heading of the right sidebar
    pub fn title(&self) -> &'static str {
        match self {
            Feature::Piano => "MIDI Piano Editor",
            Feature::Drums => "Drum Sequencer",
            Feature::Recorder => "Audio Recorder",
            Feature::Synth => "Keyboard Synth",
            Feature::ImportExport => "Import/Export",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error(transparent)]
    Midi(#[from] MidiFileError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("Nothing to export for {}", .0.file_name())]
    NothingToExport(ExportTarget),

    #[error("Invalid tempo: {0} BPM")]
    InvalidTempo(f64),

    #[error("{} has no step grid", .0.label())]
    NoGrid(Feature),
}

impl StudioError {
    pub fn category(&self) -> NotificationCategory {
        match self {
            StudioError::Midi(_) | StudioError::Grid(_) => NotificationCategory::Midi,
            StudioError::Audio(_) => NotificationCategory::Audio,
            StudioError::File(_) | StudioError::NothingToExport(_) => NotificationCategory::File,
            StudioError::Config(_) => NotificationCategory::Config,
            StudioError::InvalidTempo(_) | StudioError::NoGrid(_) => NotificationCategory::Generic,
        }
    }
}

/// Schedulers handed to the panels, one per timeline
pub struct PanelSchedulers {
    pub piano: Box<dyn Scheduler<StepTrigger>>,
    pub drums: Box<dyn Scheduler<StepTrigger>>,
    pub synth: Box<dyn Scheduler<SequenceEvent>>,
}

pub struct Studio {
    config: StudioConfig,
    transport: Transport,
    active: Feature,
    piano: GridPanel,
    drums: GridPanel,
    synth: SynthPanel,
    recorder: RecorderPanel,
    sink: Arc<dyn NoteSink>,
    notifier: Notifier,
}

impl Studio {
    pub fn new(config: StudioConfig, sink: Arc<dyn NoteSink>, notifier: Notifier) -> Self {
        let piano = GridPanel::piano_roll(Arc::clone(&sink), &config);
        let drums = GridPanel::drum_grid(Arc::clone(&sink), &config);
        let synth = SynthPanel::new(Arc::clone(&sink), config.tempo());
        Self::assemble(config, sink, notifier, piano, drums, synth)
    }

    pub fn with_schedulers(
        config: StudioConfig,
        sink: Arc<dyn NoteSink>,
        notifier: Notifier,
        schedulers: PanelSchedulers,
    ) -> Self {
        let piano = GridPanel::with_scheduler(
            GridLayout::piano_roll(),
            ExportTarget::PianoRoll,
            Arc::clone(&sink),
            schedulers.piano,
            &config,
        );
        let drums = GridPanel::with_scheduler(
            GridLayout::drum_grid(),
            ExportTarget::DrumGrid,
            Arc::clone(&sink),
            schedulers.drums,
            &config,
        );
        let synth = SynthPanel::with_scheduler(Arc::clone(&sink), schedulers.synth, config.tempo());
        Self::assemble(config, sink, notifier, piano, drums, synth)
    }

    fn assemble(
        config: StudioConfig,
        sink: Arc<dyn NoteSink>,
        notifier: Notifier,
        piano: GridPanel,
        drums: GridPanel,
        synth: SynthPanel,
    ) -> Self {
        let recorder = RecorderPanel::new(
            notifier.clone(),
            Arc::clone(&sink),
            config.waveform_width,
            config.waveform_height,
        );
        sink.send(Command::SetVolume(config.master_volume));
        Self {
            transport: Transport::new(config.tempo()),
            config,
            active: Feature::default(),
            piano,
            drums,
            synth,
            recorder,
            sink,
            notifier,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn active_feature(&self) -> Feature {
        self.active
    }

    pub fn piano(&self) -> &GridPanel {
        &self.piano
    }

    pub fn piano_mut(&mut self) -> &mut GridPanel {
        &mut self.piano
    }

    pub fn drums(&self) -> &GridPanel {
        &self.drums
    }

    pub fn drums_mut(&mut self) -> &mut GridPanel {
        &mut self.drums
    }

    pub fn synth(&self) -> &SynthPanel {
        &self.synth
    }

    pub fn synth_mut(&mut self) -> &mut SynthPanel {
        &mut self.synth
    }

    pub fn recorder(&self) -> &RecorderPanel {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut RecorderPanel {
        &mut self.recorder
    }

    fn listener(&mut self, feature: Feature) -> Option<&mut dyn TransportListener> {
        match feature {
            Feature::Piano => Some(&mut self.piano),
            Feature::Drums => Some(&mut self.drums),
            Feature::Synth => Some(&mut self.synth),
            // The recorder ignores the play flag
            Feature::Recorder | Feature::ImportExport => None,
        }
    }

    /// Switch panels: the old one stops, the new one follows the transport
    pub fn select_feature(&mut self, feature: Feature) {
        if feature == self.active {
            return;
        }
        if let Some(old) = self.listener(self.active) {
            old.transport_changed(false);
        }
        self.active = feature;
        let playing = self.transport.is_playing();
        if let Some(new) = self.listener(feature) {
            new.transport_changed(playing);
        }
        debug!("Active feature: {:?}", feature);
    }

    fn dispatch_transport(&mut self) {
        for event in self.transport.drain_events() {
            if let Some(listener) = self.listener(self.active) {
                listener.transport_changed(event.is_playing());
            }
        }
    }

    pub fn play(&mut self) {
        self.transport.play();
        self.dispatch_transport();
    }

    pub fn pause(&mut self) {
        self.transport.pause();
        self.sink.all_notes_off();
        self.dispatch_transport();
    }

    pub fn toggle_play(&mut self) {
        if self.transport.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn replay(&mut self) {
        self.transport.replay();
        self.dispatch_transport();
    }

    pub fn set_tempo(&mut self, bpm: f64) -> Result<(), StudioError> {
        let tempo = Tempo::try_new(bpm).ok_or(StudioError::InvalidTempo(bpm))?;
        self.transport.set_tempo(tempo);
        self.config.tempo_bpm = bpm;
        self.piano.set_tempo(tempo);
        self.drums.set_tempo(tempo);
        self.synth.set_tempo(tempo);
        info!("Tempo set to {}", tempo);
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.config.master_volume = volume;
        self.sink.send(Command::SetVolume(volume));
    }

    pub fn toggle_cell(&mut self, feature: Feature, row: usize, step: usize) -> Result<bool, StudioError> {
        let panel = match feature {
            Feature::Piano => &mut self.piano,
            Feature::Drums => &mut self.drums,
            Feature::Recorder | Feature::Synth | Feature::ImportExport => {
                return Err(StudioError::NoGrid(feature));
            }
        };
        Ok(panel.toggle(row, step)?)
    }

    /// Bytes a target would be saved as
    pub fn export_bytes(&self, target: ExportTarget) -> Result<Vec<u8>, StudioError> {
        let bytes = match target {
            ExportTarget::PianoRoll => self.piano.export_midi()?,
            ExportTarget::DrumGrid => self.drums.export_midi()?,
            ExportTarget::SynthRecording => self.synth.export_midi()?,
            ExportTarget::Recording => self
                .recorder
                .export_blob()
                .ok_or(StudioError::NothingToExport(target))?
                .to_vec(),
        };
        Ok(bytes)
    }

    /// Save under the fixed filename in the export directory
    pub fn export(&self, target: ExportTarget) -> Result<PathBuf, StudioError> {
        let bytes = self.export_bytes(target)?;
        let path = files::save_blob(&self.config.export_dir(), target, &bytes)?;
        self.notifier.info(
            NotificationCategory::File,
            format!("Exported {}", path.display()),
        );
        Ok(path)
    }

    /// Save to an explicit path (file dialog)
    pub fn export_to(&self, target: ExportTarget, path: &Path) -> Result<(), StudioError> {
        let bytes = self.export_bytes(target)?;
        files::save_blob_to(path, &bytes)?;
        self.notifier.info(
            NotificationCategory::File,
            format!("Exported {}", path.display()),
        );
        Ok(())
    }

    /// Replace a panel's content with a file. Returns the number of notes
    /// (or frames, for a recording) that made it in.
    pub fn import(&mut self, target: ExportTarget, path: &Path) -> Result<usize, StudioError> {
        let bytes = files::load_blob(path, target.import_extensions())?;
        let count = match target {
            ExportTarget::PianoRoll => self.piano.import_midi(&bytes)?,
            ExportTarget::DrumGrid => self.drums.import_midi(&bytes)?,
            ExportTarget::SynthRecording => self.synth.import_midi(&bytes)?,
            ExportTarget::Recording => {
                let extension = files::extension(path);
                self.recorder.import_audio(bytes, extension.as_deref())?;
                self.recorder.audio().map_or(0, |audio| audio.frames())
            }
        };
        self.notifier.info(
            NotificationCategory::File,
            format!("Imported {}", path.display()),
        );
        Ok(count)
    }

    pub fn start_recording(&mut self) -> Result<(), StudioError> {
        Ok(self.recorder.start_recording()?)
    }

    pub fn stop_recording(&mut self) -> Result<(), StudioError> {
        Ok(self.recorder.stop_recording()?)
    }

    pub fn play_recording(&mut self) -> Result<(), StudioError> {
        Ok(self.recorder.play_recording()?)
    }

    pub fn stop_playback(&mut self) {
        self.recorder.stop_playback();
    }

    /// Per-frame housekeeping
    pub fn poll(&mut self) {
        self.recorder.poll();
    }

    /// Hardware MIDI always plays through the keyboard synth
    pub fn handle_midi(&mut self, event: MidiEvent) {
        self.synth.handle_midi(event);
    }

    /// Surface a failure to the user
    pub fn report(&self, error: &StudioError) {
        self.notifier.error(error.category(), error.to_string());
    }

    pub fn save_config(&self) -> Result<(), StudioError> {
        Ok(self.config.save()?)
    }
}
