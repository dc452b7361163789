// LogPulse - ui/panels/summary.rs
//
// Session summary window: history and stream counters, connection state,
// and accumulated warnings.

use crate::app::state::DashboardState;
use crate::ui::theme;

/// Render the session summary dialog (if `state.show_summary` is true).
pub fn render(ctx: &egui::Context, state: &mut DashboardState) {
    if !state.show_summary {
        return;
    }

    let mut open = true;
    let mut close_clicked = false;
    egui::Window::new("Session Summary")
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .min_width(420.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            let ctl = &state.controller;
            let counters = ctl.counters();

            ui.strong("Overview");
            egui::Grid::new("summary_overview")
                .num_columns(2)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    ui.label("Mode:");
                    ui.label(if ctl.is_realtime() { "Real-time" } else { "Polling" });
                    ui.end_row();

                    ui.label("Event stream:");
                    let (colour, text) = theme::connection_badge(ctl.connection());
                    ui.colored_label(colour, text);
                    ui.end_row();

                    ui.label("History:");
                    ui.label(format!(
                        "{} / {} records",
                        ctl.store().len(),
                        ctl.store().capacity()
                    ));
                    ui.end_row();

                    ui.label("Visible:");
                    ui.label(ctl.visible().len().to_string());
                    ui.end_row();

                    ui.label("Pushed records:");
                    ui.label(counters.pushed.to_string());
                    ui.end_row();

                    ui.label("Dropped while polling:");
                    ui.label(counters.dropped_while_polling.to_string());
                    ui.end_row();

                    ui.label("Rejected payloads:");
                    let colour = if counters.rejected > 0 {
                        theme::WARNING_TEXT
                    } else {
                        ui.style().visuals.text_color()
                    };
                    ui.colored_label(colour, counters.rejected.to_string());
                    ui.end_row();

                    ui.label("Superseded responses:");
                    ui.label(counters.stale_responses.to_string());
                    ui.end_row();
                });

            if let Some(err) = ctl.last_error() {
                ui.add_space(6.0);
                ui.colored_label(theme::ERROR_TEXT, format!("Last error: {err}"));
            }

            if !state.warnings.is_empty() {
                ui.add_space(8.0);
                ui.separator();
                ui.strong(format!("Warnings ({})", state.warnings.len()));

                egui::ScrollArea::vertical()
                    .id_salt("summary_warnings")
                    .max_height(160.0)
                    .show(ui, |ui| {
                        for warn in &state.warnings {
                            ui.label(egui::RichText::new(warn).color(theme::WARNING_TEXT).small());
                        }
                    });
            }

            ui.add_space(8.0);
            ui.separator();
            if ui.button("Close").clicked() {
                close_clicked = true;
            }
        });

    if !open || close_clicked {
        state.show_summary = false;
    }
}
