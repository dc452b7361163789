// LogPulse - ui/panels/stats.rs
//
// Stats strip above the table: summary cards for the backend's rolling
// window, followed by the bar and share charts.

use crate::app::state::DashboardState;
use crate::core::model::Level;
use crate::core::stats::{chart_data, error_rate_label};
use crate::ui::panels::charts;
use crate::ui::theme;

/// Render the stats cards and charts (top panel).
pub fn render(ui: &mut egui::Ui, state: &DashboardState) {
    let Some(stats) = state.controller.stats() else {
        ui.centered_and_justified(|ui| {
            ui.label("Waiting for statistics...");
        });
        return;
    };

    let window = state.controller.config().stats_window_secs;
    ui.horizontal(|ui| {
        card(ui, &format!("Total ({window}s)"), stats.total.to_string(), None);
        for &level in Level::all() {
            card(
                ui,
                level.as_str(),
                stats.counts.get(level).to_string(),
                Some(theme::level_colour(level)),
            );
        }
        let rate_colour = match stats.error_rate {
            Some(rate) if rate > 0.0 => Some(theme::ERROR_TEXT),
            _ => None,
        };
        card(ui, "Error rate", error_rate_label(stats), rate_colour);
    });

    ui.add_space(6.0);

    let data = chart_data(stats);
    let half = (ui.available_width() / 2.0 - 8.0).max(120.0);
    let size = egui::vec2(half, theme::CHART_HEIGHT);
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(egui::RichText::new("Records by level").small().weak());
            charts::bar_chart(ui, &data, size);
        });
        ui.separator();
        ui.vertical(|ui| {
            ui.label(egui::RichText::new("Level share").small().weak());
            charts::pie_chart(ui, &data, size);
        });
    });
}

fn card(ui: &mut egui::Ui, title: &str, value: String, accent: Option<egui::Color32>) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_width(90.0);
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(title).small().weak());
            let text = egui::RichText::new(value).size(20.0).strong();
            match accent {
                Some(c) => ui.label(text.color(c)),
                None => ui.label(text),
            };
        });
    });
}
