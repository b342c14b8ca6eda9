// On-screen keyboard - 24 keys C4..B5 plus the computer keyboard mapping

use crate::sequencer::note::{is_black_key, note_name};
use crate::studio::synth_panel::{FIRST_KEY, LAST_KEY};
use crate::ui::theme;
use eframe::egui::{self, Color32, Ui};

/// Mapping QWERTY keyboard → MIDI notes (C4 = 60)
pub const COMPUTER_KEYS: [(egui::Key, u8); 16] = [
    (egui::Key::A, 60), // C4
    (egui::Key::W, 61), // C#4
    (egui::Key::S, 62), // D4
    (egui::Key::E, 63), // D#4
    (egui::Key::D, 64), // E4
    (egui::Key::F, 65), // F4
    (egui::Key::T, 66), // F#4
    (egui::Key::G, 67), // G4
    (egui::Key::Y, 68), // G#4
    (egui::Key::H, 69), // A4
    (egui::Key::U, 70), // A#4
    (egui::Key::J, 71), // B4
    (egui::Key::K, 72), // C5
    (egui::Key::O, 73), // C#5
    (egui::Key::L, 74), // D5
    (egui::Key::P, 75), // D#5
];

pub fn computer_key_pitch(key: egui::Key) -> Option<u8> {
    COMPUTER_KEYS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, pitch)| *pitch)
}

fn computer_key_label(pitch: u8) -> Option<&'static str> {
    COMPUTER_KEYS
        .iter()
        .find(|(_, p)| *p == pitch)
        .map(|(key, _)| key.name())
}

/// Draw the keys; returns the key clicked this frame
pub fn show(ui: &mut Ui, sounding: Option<u8>) -> Option<u8> {
    let mut clicked = None;
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 2.0;
        for pitch in FIRST_KEY..=LAST_KEY {
            let black = is_black_key(pitch);
            let label = match computer_key_label(pitch) {
                Some(key) => format!("{}\n({})", note_name(pitch), key),
                None => note_name(pitch),
            };
            let active = sounding == Some(pitch);
            let (fill, text) = match (black, active) {
                (_, true) => (theme::ACCENT, Color32::WHITE),
                (true, false) => (Color32::from_gray(40), Color32::WHITE),
                (false, false) => (Color32::WHITE, theme::TEXT),
            };
            let button = egui::Button::new(egui::RichText::new(label).color(text).small())
                .fill(fill)
                .stroke(egui::Stroke::new(1.0, theme::BORDER))
                .min_size(egui::vec2(30.0, if black { 70.0 } else { 90.0 }));
            if ui.add(button).clicked() {
                clicked = Some(pitch);
            }
        }
    });
    clicked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computer_key_pitch() {
        assert_eq!(computer_key_pitch(egui::Key::A), Some(60));
        assert_eq!(computer_key_pitch(egui::Key::K), Some(72));
        assert_eq!(computer_key_pitch(egui::Key::P), Some(75));
        assert_eq!(computer_key_pitch(egui::Key::Z), None);
    }

    #[test]
    fn test_mapping_stays_on_the_keyboard() {
        assert!(
            COMPUTER_KEYS
                .iter()
                .all(|(_, pitch)| (FIRST_KEY..=LAST_KEY).contains(pitch))
        );
        assert_eq!(computer_key_label(61), Some("W"));
    }
}
