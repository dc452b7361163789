// LogPulse - ui/panels/detail.rs
//
// Record detail pane showing the full message and metadata.

use crate::app::state::DashboardState;
use crate::ui::theme;

/// Render the detail pane (bottom panel).
pub fn render(ui: &mut egui::Ui, state: &DashboardState) {
    let Some(record) = state.selected_record() else {
        ui.centered_and_justified(|ui| {
            ui.label("Select a record to view details.");
        });
        return;
    };

    egui::Grid::new("detail_grid")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            ui.label("Level:");
            ui.colored_label(theme::level_colour(record.level), record.level.as_str());
            ui.end_row();

            ui.label("Service:");
            ui.label(&record.service);
            ui.end_row();

            ui.label("Timestamp:");
            ui.label(record.timestamp.to_rfc3339());
            ui.end_row();

            ui.label("Id:");
            ui.label(egui::RichText::new(&record.id).monospace());
            ui.end_row();
        });

    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Message:");
        if ui.small_button("Copy").clicked() {
            ui.ctx().copy_text(record.message.clone());
        }
    });
    egui::ScrollArea::vertical()
        .max_height(100.0)
        .show(ui, |ui| {
            ui.label(egui::RichText::new(&record.message).monospace());
        });
}
