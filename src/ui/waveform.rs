// Waveform view - paints precomputed bars

use crate::audio::waveform::WaveformBar;
use crate::ui::theme;
use eframe::egui::{self, Pos2, Rect, Sense, Ui, Vec2};

/// Paint `bars` into a `width` x `height` area; returns the allocated size
pub fn show(ui: &mut Ui, bars: &[WaveformBar], width: f32, height: f32) -> Vec2 {
    let (response, painter) = ui.allocate_painter(Vec2::new(width, height), Sense::hover());
    let rect = response.rect;

    painter.rect_filled(rect, 4.0, theme::CELL_OFF);
    painter.rect_stroke(rect, 4.0, egui::Stroke::new(1.0, theme::BORDER));

    for bar in bars {
        let x = rect.left() + bar.x as f32;
        let top = rect.top() + bar.top;
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(x, top), Vec2::new(1.0, bar.height)),
            0.0,
            theme::ACCENT,
        );
    }

    rect.size()
}
