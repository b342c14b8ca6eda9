// Main UI App - studio shell (sidebars, transport bar, feature panels)

use crate::files::ExportTarget;
use crate::messaging::channels::NotificationConsumer;
use crate::messaging::command::Trigger;
use crate::messaging::notification::{Notification, NotificationLevel};
use crate::midi::input::{MidiEventConsumer, MidiInput};
use crate::sequencer::timeline::{MAX_BPM, MIN_BPM};
use crate::studio::{Feature, Studio, StudioError};
use crate::ui::{grid_view, keyboard, theme, waveform};
use eframe::egui::{self, Color32, RichText};
use ringbuf::traits::Consumer;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

const MAX_NOTIFICATIONS: usize = 10;
const NOTIFICATION_MS: u64 = 5000;

pub struct StudioApp {
    studio: Studio,
    notification_rx: NotificationConsumer,
    notification_queue: VecDeque<Notification>,
    midi_rx: MidiEventConsumer,
    midi_input: MidiInput,
    held_keys: HashSet<u8>,
    tempo_ui: f64,
    volume_ui: f32,
}

impl StudioApp {
    pub fn new(
        studio: Studio,
        notification_rx: NotificationConsumer,
        midi_rx: MidiEventConsumer,
        midi_input: MidiInput,
    ) -> Self {
        let tempo_ui = studio.config().tempo_bpm;
        let volume_ui = studio.config().master_volume;
        Self {
            studio,
            notification_rx,
            notification_queue: VecDeque::new(),
            midi_rx,
            midi_input,
            held_keys: HashSet::new(),
            tempo_ui,
            volume_ui,
        }
    }

    fn update_notifications(&mut self) {
        while let Some(notification) = self.notification_rx.try_pop() {
            self.notification_queue.push_back(notification);
            if self.notification_queue.len() > MAX_NOTIFICATIONS {
                self.notification_queue.pop_front();
            }
        }
    }

    fn check<T>(&self, result: Result<T, StudioError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.studio.report(&e);
                None
            }
        }
    }

    fn drain_midi(&mut self) {
        while let Some(event) = self.midi_rx.try_pop() {
            self.studio.handle_midi(event);
        }
    }

    /// Computer keyboard plays the synth while its panel is shown
    fn handle_computer_keys(&mut self, ctx: &egui::Context) {
        if self.studio.active_feature() != Feature::Synth || ctx.wants_keyboard_input() {
            return;
        }
        for (key, pitch) in keyboard::COMPUTER_KEYS {
            let (pressed, released) = ctx.input(|i| (i.key_pressed(key), i.key_released(key)));
            if pressed && self.held_keys.insert(pitch) {
                self.studio
                    .synth_mut()
                    .key_down(pitch, Trigger::DEFAULT_VELOCITY);
            }
            if released && self.held_keys.remove(&pitch) {
                self.studio.synth_mut().key_up(pitch);
            }
        }
    }

    fn export(&self, target: ExportTarget) {
        self.check(self.studio.export(target));
    }

    fn import(&mut self, target: ExportTarget) {
        let filter = match target {
            ExportTarget::Recording => "Audio",
            _ => "MIDI",
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter(filter, target.import_extensions())
            .pick_file()
        else {
            return;
        };
        let result = self.studio.import(target, &path);
        self.check(result);
    }

    fn draw_left_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("feature_selector")
            .exact_width(theme::LEFT_SIDEBAR_WIDTH)
            .resizable(false)
            .frame(egui::Frame::none().fill(theme::SIDEBAR))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(16.0);
                    for feature in Feature::ALL {
                        let active = self.studio.active_feature() == feature;
                        let button = egui::Button::new(
                            RichText::new(feature.icon())
                                .size(22.0)
                                .color(theme::SIDEBAR_TEXT),
                        )
                        .fill(if active { theme::ACCENT } else { Color32::TRANSPARENT })
                        .rounding(theme::ICON_SIZE / 2.0)
                        .min_size(egui::vec2(theme::ICON_SIZE, theme::ICON_SIZE));
                        if ui.add(button).on_hover_text(feature.label()).clicked() {
                            self.studio.select_feature(feature);
                        }
                        ui.add_space(12.0);
                    }
                });
            });
    }

    fn draw_right_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("feature_details")
            .exact_width(theme::RIGHT_SIDEBAR_WIDTH)
            .resizable(false)
            .frame(egui::Frame::none().fill(theme::SILVER).inner_margin(16.0))
            .show(ctx, |ui| {
                let feature = self.studio.active_feature();
                ui.heading(feature.title());
                ui.add_space(8.0);

                ui.label("Tempo (BPM)");
                let tempo = ui.add(egui::Slider::new(&mut self.tempo_ui, MIN_BPM..=240.0_f64.min(MAX_BPM)));
                if tempo.drag_stopped() || tempo.lost_focus() {
                    let result = self.studio.set_tempo(self.tempo_ui);
                    self.check(result);
                }

                ui.label("Volume");
                if ui
                    .add(egui::Slider::new(&mut self.volume_ui, 0.0..=1.0))
                    .changed()
                {
                    self.studio.set_volume(self.volume_ui);
                }

                ui.add_space(8.0);
                ui.separator();
                match self.midi_input.port_name() {
                    Some(port) => ui.colored_label(Color32::DARK_GREEN, format!("● MIDI: {}", port)),
                    None => ui.colored_label(Color32::GRAY, "○ No MIDI input"),
                };

                ui.add_space(8.0);
                if ui.button("Save settings").clicked() {
                    let result = self.studio.save_config();
                    self.check(result);
                }
            });
    }

    fn draw_transport(&mut self, ui: &mut egui::Ui) {
        let playing = self.studio.is_playing();
        let round = |label: &str, active: bool| {
            egui::Button::new(RichText::new(label).size(18.0))
                .fill(if active { theme::ACCENT } else { Color32::WHITE })
                .stroke(egui::Stroke::new(1.0, theme::BORDER))
                .rounding(20.0)
                .min_size(egui::vec2(40.0, 40.0))
        };

        egui::Frame::none()
            .fill(theme::SILVER)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = 20.0;
                    ui.add_enabled(false, round("⏮", false)).on_hover_text("Previous");
                    if ui.add(round("▶", playing)).on_hover_text("Play").clicked() {
                        self.studio.play();
                    }
                    if ui.add(round("⏸", !playing)).on_hover_text("Pause").clicked() {
                        self.studio.pause();
                    }
                    ui.add_enabled(false, round("⏭", false)).on_hover_text("Next");
                    if ui.add(round("🔁", false)).on_hover_text("Replay").clicked() {
                        self.studio.replay();
                    }
                });
            });
    }

    fn draw_grid_panel(&mut self, ui: &mut egui::Ui, feature: Feature) {
        let panel = match feature {
            Feature::Drums => self.studio.drums(),
            _ => self.studio.piano(),
        };
        let target = panel.target();
        let clicked = egui::ScrollArea::both()
            .show(ui, |ui| grid_view::show(ui, panel.grid(), panel.current_step()))
            .inner;
        if let Some((row, step)) = clicked {
            let result = self.studio.toggle_cell(feature, row, step);
            self.check(result);
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("Export MIDI").clicked() {
                self.export(target);
            }
            if ui.button("Import MIDI").clicked() {
                self.import(target);
            }
        });
    }

    fn draw_recorder(&mut self, ui: &mut egui::Ui) {
        let recording = self.studio.recorder().is_recording();
        ui.horizontal(|ui| {
            if !recording && ui.button("⏺ Record").clicked() {
                let result = self.studio.start_recording();
                self.check(result);
            }
            if recording && ui.button("⏹ Stop").clicked() {
                let result = self.studio.stop_recording();
                self.check(result);
            }
            let has_recording = self.studio.recorder().has_recording();
            if self.studio.recorder().is_playing() {
                if ui.button("⏹ Stop playback").clicked() {
                    self.studio.stop_playback();
                }
            } else if ui
                .add_enabled(!recording && has_recording, egui::Button::new("▶ Play"))
                .clicked()
            {
                let result = self.studio.play_recording();
                self.check(result);
            }
            if ui
                .add_enabled(has_recording, egui::Button::new("Export"))
                .clicked()
            {
                self.export(ExportTarget::Recording);
            }
            if ui.button("Import").clicked() {
                self.import(ExportTarget::Recording);
            }
        });

        ui.add_space(8.0);
        let config = self.studio.config();
        let (width, height) = (config.waveform_width, config.waveform_height);
        let available = ui.available_width().max(1.0) as usize;
        let width = width.min(available);
        self.studio.recorder_mut().set_waveform_size(width, height);
        waveform::show(ui, self.studio.recorder().waveform(), width as f32, height);
        ui.label(format!(
            "{:.1} s",
            self.studio.recorder().duration_seconds()
        ));
    }

    fn draw_synth(&mut self, ui: &mut egui::Ui) {
        let sounding = self
            .studio
            .synth()
            .current_note()
            .and_then(|i| self.studio.synth().notes().get(i))
            .map(|n| n.pitch)
            .or_else(|| self.held_keys.iter().next().copied());
        if let Some(pitch) = keyboard::show(ui, sounding) {
            self.studio.synth_mut().press_key(pitch);
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let synth = self.studio.synth_mut();
            if !synth.is_recording() && ui.button("⏺ Record").clicked() {
                synth.start_recording();
            }
            if synth.is_recording() && ui.button("⏹ Stop").clicked() {
                synth.stop_recording();
            }
            if ui.button("▶ Play sequence").clicked() {
                synth.play_sequence();
            }
            if ui.button("Export MIDI").clicked() {
                self.export(ExportTarget::SynthRecording);
            }
            if ui.button("Import MIDI").clicked() {
                self.import(ExportTarget::SynthRecording);
            }
        });

        let notes = self.studio.synth().notes();
        ui.label(format!("{} recorded notes", notes.len()));
        let names: Vec<String> = notes.iter().take(32).map(|n| n.name()).collect();
        ui.label(names.join(" "));
    }

    fn draw_import_export(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("import_export")
            .num_columns(3)
            .spacing([16.0, 8.0])
            .show(ui, |ui| {
                for target in [
                    ExportTarget::PianoRoll,
                    ExportTarget::DrumGrid,
                    ExportTarget::SynthRecording,
                    ExportTarget::Recording,
                ] {
                    ui.label(target.file_name());
                    if ui.button("Export").clicked() {
                        self.export(target);
                    }
                    if ui.button("Import").clicked() {
                        self.import(target);
                    }
                    ui.end_row();
                }
            });
        ui.add_space(8.0);
        ui.label(format!(
            "Exports go to {}",
            self.studio.config().export_dir().display()
        ));
    }

    /// Affiche les notifications récentes en bas de la fenêtre
    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let recent: Vec<&Notification> = self
                .notification_queue
                .iter()
                .rev()
                .filter(|n| n.is_recent(NOTIFICATION_MS))
                .take(3)
                .collect();

            if recent.is_empty() {
                ui.label("Ready");
            }
            for notification in recent {
                let (icon, color) = match notification.level {
                    NotificationLevel::Info => ("ℹ", Color32::from_rgb(60, 110, 220)),
                    NotificationLevel::Warning => ("⚠", Color32::from_rgb(230, 140, 0)),
                    NotificationLevel::Error => ("✖", Color32::RED),
                };
                ui.colored_label(color, icon);
                ui.colored_label(color, &notification.message);
                ui.add_space(10.0);
            }
        });
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Playhead and capture need regular frames
        ctx.request_repaint_after(Duration::from_millis(16));

        self.update_notifications();
        self.drain_midi();
        self.studio.poll();
        self.handle_computer_keys(ctx);

        self.draw_left_sidebar(ctx);
        self.draw_right_sidebar(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.draw_status_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_transport(ui);
            ui.add_space(12.0);

            let feature = self.studio.active_feature();
            match feature {
                Feature::Piano | Feature::Drums => self.draw_grid_panel(ui, feature),
                Feature::Recorder => self.draw_recorder(ui),
                Feature::Synth => self.draw_synth(ui),
                Feature::ImportExport => self.draw_import_export(ui),
            }
        });
    }
}
