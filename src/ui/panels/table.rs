// LogPulse - ui/panels/table.rs
//
// Virtual-scrolling log table over the visible slice.
//
// Uses egui's `ScrollArea::show_rows`, which renders only the rows currently
// in the viewport. Newest records are at the top, so in real-time mode new
// pushes appear without scrolling.
//
// Each row is a LayoutJob: the level badge keeps its level hue while the
// rest of the row uses `theme::row_text_colour`, so text stays readable on
// the tinted WARN / ERROR rows.

use crate::app::state::DashboardState;
use crate::ui::theme;
use egui::text::{LayoutJob, TextFormat};

/// Render the log table (central area).
pub fn render(ui: &mut egui::Ui, state: &mut DashboardState) {
    let rows = state.controller.visible().len();

    if rows == 0 {
        ui.centered_and_justified(|ui| {
            if state.controller.is_loading() {
                ui.spinner();
            } else if state.controller.store().is_empty() {
                ui.label("No log records received yet.");
            } else {
                ui.label("No records match the current filters.");
            }
        });
        return;
    }

    let row_height = theme::ROW_HEIGHT;
    let body_colour = theme::row_text_colour(state.dark_mode);
    let font = egui::FontId::monospace(state.font_size * 0.85);

    // Clicks are collected and applied after show_rows so `state` is not
    // mutably borrowed while rows hold references into the visible slice.
    let mut clicked: Option<String> = None;

    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show_rows(ui, row_height, rows, |ui, row_range| {
            for idx in row_range {
                let Some(record) = state.controller.visible().get(idx) else {
                    continue;
                };

                let is_selected = state.selected_id.as_deref() == Some(record.id.as_str());
                let level_colour = theme::level_colour(record.level);
                let first_line = record.message.lines().next().unwrap_or(&record.message);

                let mut job = LayoutJob::default();
                job.append(
                    &format!("[{:<5}] ", record.level.as_str()),
                    0.0,
                    TextFormat {
                        font_id: font.clone(),
                        color: level_colour,
                        ..Default::default()
                    },
                );
                job.append(
                    &format!(
                        "{} | {:>14} | {}",
                        record.timestamp.format("%H:%M:%S%.3f"),
                        truncate_left(&record.service, 14),
                        first_line
                    ),
                    0.0,
                    TextFormat {
                        font_id: font.clone(),
                        color: body_colour,
                        ..Default::default()
                    },
                );

                if let Some(bg) = theme::level_bg_colour(record.level) {
                    let rect = egui::Rect::from_min_size(
                        ui.cursor().min,
                        egui::vec2(ui.available_width(), row_height),
                    );
                    ui.painter().rect_filled(rect, 0.0, bg);
                }

                let response = ui.selectable_label(is_selected, job);
                if response.clicked() {
                    clicked = Some(record.id.clone());
                }
                response.on_hover_ui(|ui| {
                    ui.label(record.timestamp.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string());
                    ui.label(egui::RichText::new(&record.id).monospace().small());
                });
            }
        });

    if let Some(id) = clicked {
        state.selected_id = Some(id);
    }
}

/// Keep the last `max` characters of `s`, right-aligned to `max` columns.
fn truncate_left(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        format!("{s:>max$}")
    } else {
        s.chars().skip(count - max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_left_pads_short_names() {
        assert_eq!(truncate_left("api", 6), "   api");
    }

    #[test]
    fn test_truncate_left_keeps_tail_of_long_names() {
        assert_eq!(truncate_left("payments-gateway", 7), "gateway");
    }
}
