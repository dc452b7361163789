// LogPulse - ui/panels/filters.rs
//
// Filter controls sidebar: level, service, search, page size, pagination,
// and the real-time toggle.
//
// Text inputs are committed on Enter or when focus leaves the field, so a
// polling dashboard issues one request per edit rather than one per
// keystroke.

use crate::app::controller::Action;
use crate::app::state::DashboardState;
use crate::core::model::Level;
use crate::ui::theme;
use crate::util::constants::PAGE_SIZE_CHOICES;

/// Render the filter controls.
pub fn render(ui: &mut egui::Ui, state: &mut DashboardState) {
    ui.heading("Filters");
    ui.separator();

    render_mode_toggle(ui, state);
    ui.separator();

    // Level
    ui.label("Level:");
    let current = state.controller.filter().level();
    let mut selected = current;
    egui::ComboBox::from_id_salt("level_filter")
        .selected_text(selected.map_or("All levels", |l| l.as_str()))
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut selected, None, "All levels");
            for level in Level::all() {
                ui.selectable_value(&mut selected, Some(*level), level.as_str());
            }
        });
    if selected != current {
        state.dispatch(Action::SetLevel(selected));
    }

    ui.add_space(4.0);

    // Service
    ui.label("Service:");
    let response = ui.add(
        egui::TextEdit::singleline(&mut state.service_input).hint_text("exact service name"),
    );
    if committed(&response) {
        state.dispatch(Action::SetService(Some(state.service_input.clone())));
    }

    ui.add_space(4.0);

    // Search
    ui.label("Message contains:");
    let response = ui.add(
        egui::TextEdit::singleline(&mut state.search_input).hint_text("case-insensitive"),
    );
    if committed(&response) {
        state.dispatch(Action::SetSearch(Some(state.search_input.clone())));
    }

    ui.add_space(4.0);

    // Page size
    ui.label("Page size:");
    let current_limit = state.controller.filter().limit();
    let mut limit = current_limit;
    egui::ComboBox::from_id_salt("page_size")
        .selected_text(limit.to_string())
        .show_ui(ui, |ui| {
            for &choice in PAGE_SIZE_CHOICES {
                ui.selectable_value(&mut limit, choice, choice.to_string());
            }
        });
    if limit != current_limit {
        state.dispatch(Action::SetLimit(limit));
    }

    ui.add_space(6.0);
    if ui.button("Clear Filters").clicked() {
        state.service_input.clear();
        state.search_input.clear();
        state.dispatch(Action::SetLevel(None));
        state.dispatch(Action::SetService(None));
        state.dispatch(Action::SetSearch(None));
    }

    ui.separator();
    render_pagination(ui, state);
}

/// A single-line edit loses focus on Enter as well as on click-away.
/// Unchanged values are no-ops in the controller.
fn committed(response: &egui::Response) -> bool {
    response.lost_focus()
}

fn render_mode_toggle(ui: &mut egui::Ui, state: &mut DashboardState) {
    let realtime = state.controller.is_realtime();
    ui.horizontal(|ui| {
        let mut value = realtime;
        if ui.checkbox(&mut value, "Real-time").changed() {
            state.dispatch(Action::SetRealtime(value));
        }
        if realtime {
            ui.label(egui::RichText::new("\u{25cf} LIVE").strong().color(theme::LIVE_GREEN));
        } else {
            ui.label(
                egui::RichText::new(format!(
                    "polling every {}s",
                    state.controller.config().poll_interval.as_secs()
                ))
                .weak(),
            );
        }
    });
    if ui
        .button("\u{27f3} Refresh")
        .on_hover_text("Fetch logs and stats now")
        .clicked()
    {
        state.dispatch(Action::Refresh);
    }
}

fn render_pagination(ui: &mut egui::Ui, state: &mut DashboardState) {
    ui.strong("Pagination");
    let page = state.controller.filter().page();
    let realtime = state.controller.is_realtime();

    match state.controller.pagination() {
        Some((p, stale)) => {
            let text = format!("Page {} of {} ({} records)", page, p.pages.max(1), p.total);
            if stale {
                ui.label(egui::RichText::new(text).weak())
                    .on_hover_text("Reported before real-time mode began");
            } else {
                ui.label(text);
            }
        }
        None => {
            ui.label(egui::RichText::new(format!("Page {page}")).weak());
        }
    }

    let last_page = state
        .controller
        .pagination()
        .map(|(p, _)| p.pages.max(1))
        .unwrap_or(1);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(page > 1, egui::Button::new("\u{25c0} Prev"))
            .clicked()
        {
            state.dispatch(Action::SetPage(page - 1));
        }
        if ui
            .add_enabled(page < last_page, egui::Button::new("Next \u{25b6}"))
            .clicked()
        {
            state.dispatch(Action::SetPage(page + 1));
        }
    });
    if realtime {
        ui.label(
            egui::RichText::new("Page changes do not fetch in real-time mode.")
                .small()
                .weak(),
        );
    }
}
