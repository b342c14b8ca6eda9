// UI module
// egui shell and the widgets of each feature panel

pub mod app;
pub mod grid_view;
pub mod keyboard;
pub mod theme;
pub mod waveform;

pub use app::StudioApp;
