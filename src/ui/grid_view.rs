// Grid view - step grid editor shared by the piano roll and the drum sequencer

use crate::sequencer::grid::StepGrid;
use crate::ui::theme;
use eframe::egui::{self, Align2, FontId, Pos2, Rect, Sense, Ui, Vec2};

pub const LABEL_WIDTH: f32 = 56.0;
pub const CELL_SIZE: f32 = 24.0;
const CELL_GAP: f32 = 2.0;

/// Cell under a point, relative to the top-left corner of the cell area
pub fn cell_at(offset: Vec2, rows: usize, steps: usize) -> Option<(usize, usize)> {
    if offset.x < 0.0 || offset.y < 0.0 {
        return None;
    }
    let step = (offset.x / CELL_SIZE) as usize;
    let row = (offset.y / CELL_SIZE) as usize;
    (row < rows && step < steps).then_some((row, step))
}

/// Draw the grid and return the cell clicked this frame, if any
pub fn show(ui: &mut Ui, grid: &StepGrid, current_step: Option<usize>) -> Option<(usize, usize)> {
    let rows = grid.rows();
    let steps = grid.steps();
    let size = Vec2::new(
        LABEL_WIDTH + steps as f32 * CELL_SIZE,
        rows as f32 * CELL_SIZE,
    );
    let (response, painter) = ui.allocate_painter(size, Sense::click());
    let origin = response.rect.min;
    let cells_origin = origin + Vec2::new(LABEL_WIDTH, 0.0);

    for (row, spec) in grid.layout().rows().iter().enumerate() {
        let y = origin.y + row as f32 * CELL_SIZE;
        painter.text(
            Pos2::new(origin.x + 4.0, y + CELL_SIZE / 2.0),
            Align2::LEFT_CENTER,
            &spec.label,
            FontId::monospace(12.0),
            theme::TEXT,
        );

        for step in 0..steps {
            let min = cells_origin + Vec2::new(step as f32 * CELL_SIZE, row as f32 * CELL_SIZE);
            let rect = Rect::from_min_size(min, Vec2::splat(CELL_SIZE - CELL_GAP));
            let fill = if grid.is_active(row, step) {
                theme::rgb(spec.color)
            } else if current_step == Some(step) {
                theme::CELL_PLAYHEAD
            } else {
                theme::CELL_OFF
            };
            painter.rect_filled(rect, 3.0, fill);
            if current_step == Some(step) {
                painter.rect_stroke(rect, 3.0, egui::Stroke::new(1.5, theme::ACCENT));
            }
        }
    }

    if response.clicked()
        && let Some(pos) = response.interact_pointer_pos()
    {
        return cell_at(pos - cells_origin, rows, steps);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_at() {
        assert_eq!(cell_at(Vec2::new(1.0, 1.0), 4, 16), Some((0, 0)));
        assert_eq!(cell_at(Vec2::new(CELL_SIZE * 3.5, CELL_SIZE * 2.5), 4, 16), Some((2, 3)));
        assert_eq!(cell_at(Vec2::new(-1.0, 5.0), 4, 16), None);
        assert_eq!(cell_at(Vec2::new(CELL_SIZE * 16.0, 0.0), 4, 16), None);
        assert_eq!(cell_at(Vec2::new(0.0, CELL_SIZE * 4.0), 4, 16), None);
    }
}
