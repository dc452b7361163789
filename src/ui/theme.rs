// LogPulse - ui/theme.rs
//
// Colour scheme, level colour mapping, and layout constants.
// No dependencies on app state or business logic.

use crate::core::model::{ConnectionStatus, Level};
use crate::core::stats::level_rgb;
use egui::Color32;

/// Colour for a level badge. Shared with the charts so both agree.
pub fn level_colour(level: Level) -> Color32 {
    let [r, g, b] = level_rgb(level);
    Color32::from_rgb(r, g, b)
}

/// Subtle row tint for WARN and ERROR rows.
pub fn level_bg_colour(level: Level) -> Option<Color32> {
    match level {
        Level::Error => Some(Color32::from_rgba_premultiplied(239, 68, 68, 22)),
        Level::Warn => Some(Color32::from_rgba_premultiplied(245, 158, 11, 15)),
        Level::Info => None,
    }
}

/// Foreground for row text: white in dark mode, near-black in light mode.
pub fn row_text_colour(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(243, 244, 246) // Gray 100
    } else {
        Color32::from_rgb(17, 24, 39) // Gray 900
    }
}

/// Badge colour and label for the push-channel state.
pub fn connection_badge(status: &ConnectionStatus) -> (Color32, String) {
    match status {
        ConnectionStatus::Connecting => (Color32::from_rgb(156, 163, 175), "Connecting".into()),
        ConnectionStatus::Connected => (Color32::from_rgb(34, 197, 94), "Connected".into()),
        ConnectionStatus::Reconnecting { attempt, delay_ms } => (
            Color32::from_rgb(245, 158, 11),
            format!("Reconnecting (attempt {attempt}, {:.1}s)", *delay_ms as f64 / 1000.0),
        ),
        ConnectionStatus::Stopped => (Color32::from_rgb(107, 114, 128), "Stopped".into()),
    }
}

pub const LIVE_GREEN: Color32 = Color32::from_rgb(34, 197, 94); // Green 500
pub const ERROR_TEXT: Color32 = Color32::from_rgb(248, 113, 113); // Red 400
pub const WARNING_TEXT: Color32 = Color32::from_rgb(253, 186, 116); // Orange 300

/// Layout constants.
pub const SIDEBAR_WIDTH: f32 = 260.0;
pub const DETAIL_PANE_HEIGHT: f32 = 180.0;
pub const STATS_PANEL_HEIGHT: f32 = 190.0;
pub const ROW_HEIGHT: f32 = 20.0;
pub const CHART_HEIGHT: f32 = 140.0;

/// Apply dark/light visuals and the body font size.
pub fn apply(ctx: &egui::Context, dark_mode: bool, font_size: f32) {
    ctx.set_visuals(if dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    });
    ctx.style_mut(|style| {
        for (text_style, font) in style.text_styles.iter_mut() {
            match text_style {
                egui::TextStyle::Body | egui::TextStyle::Button | egui::TextStyle::Monospace => {
                    font.size = font_size;
                }
                egui::TextStyle::Small => font.size = font_size * 0.8,
                egui::TextStyle::Heading => font.size = font_size * 1.4,
                _ => {}
            }
        }
    });
}
