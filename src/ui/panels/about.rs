// LogPulse - ui/panels/about.rs
//
// About dialog, rendered as a centred, non-resizable window.

use crate::app::state::DashboardState;
use crate::util::constants::{APP_NAME, APP_VERSION};

/// Render the About dialog (if `state.show_about` is true).
pub fn render(ctx: &egui::Context, state: &mut DashboardState) {
    if !state.show_about {
        return;
    }

    let mut open = true;
    egui::Window::new(format!("About {APP_NAME}"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .min_width(360.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(8.0);

            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(APP_NAME).size(28.0).strong());
                ui.add_space(4.0);
                ui.label(egui::RichText::new(format!("v{APP_VERSION}")).size(14.0).weak());
            });

            ui.add_space(12.0);
            ui.separator();
            ui.add_space(8.0);

            ui.vertical_centered(|ui| {
                ui.label("A live dashboard for backend log streams");
                ui.label("with filtering, pagination and level statistics.");
            });

            ui.add_space(8.0);
            egui::Grid::new("about_build_info")
                .num_columns(2)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    for (key, value) in build_info(state.debug_mode) {
                        ui.label(egui::RichText::new(key).weak());
                        ui.label(value);
                        ui.end_row();
                    }
                });

            ui.add_space(8.0);
            ui.separator();
            ui.add_space(6.0);

            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Built with Rust & egui").small().weak());
            });

            ui.add_space(8.0);
        });

    if !open {
        state.show_about = false;
    }
}

/// Key/value rows shown under the description.
fn build_info(debug_mode: bool) -> Vec<(&'static str, String)> {
    let logging = if debug_mode {
        "debug (--debug)".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "from config".to_string())
    };
    vec![
        ("Version", APP_VERSION.to_string()),
        ("Platform", std::env::consts::OS.to_string()),
        ("Logging", logging),
    ]
}
