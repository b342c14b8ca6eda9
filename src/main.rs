use gridstudio::messaging::NotificationCategory;
use gridstudio::messaging::channels::{COMMAND_CAPACITY, NOTIFICATION_CAPACITY};
use gridstudio::midi::input::{MidiInput, create_midi_channel};
use gridstudio::ui::StudioApp;
use gridstudio::ui::theme;
use gridstudio::{
    AudioEngine, CommandSink, Notifier, Studio, StudioConfig, create_command_channel,
    create_notification_channel,
};
use log::{error, info, warn};
use std::sync::Arc;

// Bursts from a controller stay well under this between two UI frames
const MIDI_INPUT_CAPACITY: usize = 256;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("=== gridstudio {} ===", env!("CARGO_PKG_VERSION"));

    let config = StudioConfig::load_or_default();

    let (command_tx, command_rx) = create_command_channel(COMMAND_CAPACITY);
    let (notification_tx, notification_rx) = create_notification_channel(NOTIFICATION_CAPACITY);
    let notifier = Notifier::new(notification_tx);

    // The studio stays usable (editing, import/export) without an output device
    let _audio_engine = match AudioEngine::new(command_rx, notifier.clone(), config.master_volume) {
        Ok(engine) => Some(engine),
        Err(e) => {
            notifier.error(
                NotificationCategory::Audio,
                format!("Audio output unavailable: {}", e),
            );
            None
        }
    };

    let (midi_tx, midi_rx) = create_midi_channel(MIDI_INPUT_CAPACITY);
    let midi_input = match MidiInput::connect(config.midi_input_port.as_deref(), midi_tx) {
        Ok(input) => input,
        Err(e) => {
            warn!("MIDI input unavailable: {}", e);
            notifier.error(
                NotificationCategory::Midi,
                e.to_string(),
            );
            MidiInput::disconnected()
        }
    };

    let studio = Studio::new(config, Arc::new(CommandSink::new(command_tx)), notifier);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 600.0])
            .with_title("gridstudio"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "gridstudio",
        native_options,
        Box::new(|cc| {
            theme::apply(&cc.egui_ctx);
            Ok(Box::new(StudioApp::new(
                studio,
                notification_rx,
                midi_rx,
                midi_input,
            )))
        }),
    );

    if let Err(e) = result {
        error!("UI error: {}", e);
    }
}
