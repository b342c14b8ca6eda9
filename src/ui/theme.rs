// Theme - palette and panel sizes of the studio window

use eframe::egui::{self, Color32};

pub const BACKGROUND: Color32 = Color32::from_rgb(0xf4, 0xf5, 0xf7);
pub const SIDEBAR: Color32 = Color32::from_rgb(0x23, 0x26, 0x2e);
pub const SILVER: Color32 = Color32::from_rgb(0xd2, 0xd5, 0xdb);
pub const ACCENT: Color32 = Color32::from_rgb(0x3a, 0x7b, 0xd5);
pub const BORDER: Color32 = Color32::from_rgb(0xb0, 0xb4, 0xbc);
pub const TEXT: Color32 = Color32::from_rgb(0x1b, 0x1d, 0x22);
pub const SIDEBAR_TEXT: Color32 = Color32::from_rgb(0xee, 0xee, 0xee);

/// Cell colours of the step grids
pub const CELL_OFF: Color32 = Color32::from_rgb(0xe8, 0xea, 0xee);
pub const CELL_PLAYHEAD: Color32 = Color32::from_rgb(0xff, 0xe0, 0x82);

pub const LEFT_SIDEBAR_WIDTH: f32 = 70.0;
pub const RIGHT_SIDEBAR_WIDTH: f32 = 270.0;
pub const ICON_SIZE: f32 = 48.0;

pub fn rgb(color: [u8; 3]) -> Color32 {
    Color32::from_rgb(color[0], color[1], color[2])
}

/// Light visuals with the studio palette
pub fn apply(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::light();
    visuals.panel_fill = BACKGROUND;
    visuals.window_fill = BACKGROUND;
    visuals.selection.bg_fill = ACCENT;
    visuals.override_text_color = Some(TEXT);
    ctx.set_visuals(visuals);
}
