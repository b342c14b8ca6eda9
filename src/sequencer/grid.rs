// Step grid - rectangular boolean matrix (rows = pitches or drum voices, columns = steps)

use crate::sequencer::layout::GridLayout;
use crate::sequencer::note::NoteEvent;
use crate::sequencer::timeline::beats_to_step;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Cell ({row}, {step}) is outside the {rows}x{steps} grid")]
    OutOfRange {
        row: usize,
        step: usize,
        rows: usize,
        steps: usize,
    },
}

/// A quantized pattern
///
/// Cells are stored row-major. The shape is fixed at construction; the only
/// mutation is [`StepGrid::toggle`], and imports build a new grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepGrid {
    layout: Arc<GridLayout>,
    steps: usize,
    cells: Vec<bool>,
}

impl StepGrid {
    /// Create an empty grid
    pub fn new(layout: Arc<GridLayout>, steps: usize) -> Self {
        assert!(steps > 0, "Grid must have at least one step");
        let cells = vec![false; layout.len() * steps];
        Self {
            layout,
            steps,
            cells,
        }
    }

    pub fn layout(&self) -> &Arc<GridLayout> {
        &self.layout
    }

    pub fn rows(&self) -> usize {
        self.layout.len()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    fn index(&self, row: usize, step: usize) -> Result<usize, GridError> {
        if row >= self.rows() || step >= self.steps {
            return Err(GridError::OutOfRange {
                row,
                step,
                rows: self.rows(),
                steps: self.steps,
            });
        }
        Ok(row * self.steps + step)
    }

    /// Out-of-range cells read as inactive
    pub fn is_active(&self, row: usize, step: usize) -> bool {
        self.index(row, step)
            .map(|i| self.cells[i])
            .unwrap_or(false)
    }

    /// Flip a single cell and return its new state
    pub fn toggle(&mut self, row: usize, step: usize) -> Result<bool, GridError> {
        let index = self.index(row, step)?;
        self.cells[index] = !self.cells[index];
        Ok(self.cells[index])
    }

    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Rows active at a given step, top to bottom
    pub fn active_rows_at(&self, step: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.rows()).filter(move |row| self.is_active(*row, step))
    }

    /// Flatten active cells into timed notes, step by step
    pub fn to_events(&self, step_beats: f64, duration: f64) -> Vec<NoteEvent> {
        let mut events = Vec::with_capacity(self.active_count());
        for step in 0..self.steps {
            for row in self.active_rows_at(step) {
                let pitch = self.layout.rows()[row].pitch;
                events.push(NoteEvent::new(pitch, step as f64 * step_beats, duration));
            }
        }
        events
    }

    /// Build a grid from imported notes
    ///
    /// Each note lands on `round(start / step_beats)`. Notes whose pitch has no
    /// row or whose step falls outside the grid are dropped. Several notes on
    /// the same cell set it once.
    pub fn from_events<'a>(
        layout: Arc<GridLayout>,
        steps: usize,
        events: impl IntoIterator<Item = &'a NoteEvent>,
        step_beats: f64,
    ) -> Self {
        let mut grid = Self::new(layout, steps);
        for event in events {
            let Some(row) = grid.layout.row_for_pitch(event.pitch) else {
                continue;
            };
            let step = beats_to_step(event.start, step_beats);
            if step < 0 || step as usize >= grid.steps {
                continue;
            }
            let index = row * grid.steps + step as usize;
            grid.cells[index] = true;
        }
        grid
    }
}
