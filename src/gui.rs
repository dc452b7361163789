// LogPulse - gui.rs
//
// Top-level eframe::App implementation.
// Wires the panels to the dashboard state and executes the controller's
// commands with the fetch manager. The event stream is opened once, when
// the app is created, and released when it exits.

use crate::app::controller::{Action, Command};
use crate::app::fetcher::{FetchManager, FetchOutcome, SnapshotSource};
use crate::app::state::DashboardState;
use crate::app::subscriber::StreamManager;
use crate::core::model::StreamProgress;
use crate::ui;
use crate::util::constants::{
    MAX_FETCH_MESSAGES_PER_FRAME, MAX_STREAM_MESSAGES_PER_FRAME, REALTIME_REPAINT_INTERVAL_MS,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The LogPulse application.
pub struct LogPulseApp {
    pub state: DashboardState,
    fetch_manager: FetchManager,
    stream_manager: StreamManager,
}

impl LogPulseApp {
    /// Create the application, issue the initial snapshot requests and open
    /// the event stream.
    pub fn new(
        mut state: DashboardState,
        source: Arc<dyn SnapshotSource>,
        events_url: String,
        stream_idle_timeout: Duration,
    ) -> Self {
        let fetch_manager = FetchManager::new(source);
        let mut stream_manager = StreamManager::new().with_idle_timeout(stream_idle_timeout);

        let commands = state.controller.start(Instant::now());
        stream_manager.start(events_url);

        let app = Self {
            state,
            fetch_manager,
            stream_manager,
        };
        app.execute(commands);
        app
    }

    fn execute(&self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::FetchLogs { seq, filter } => {
                    tracing::debug!(seq, page = filter.page(), "Requesting log page");
                    self.fetch_manager.request_logs(seq, filter);
                }
                Command::FetchStats { seq, window_secs } => {
                    self.fetch_manager.request_stats(seq, window_secs);
                }
            }
        }
    }

    /// Drain background messages into the controller. Returns true if the
    /// stream budget was exhausted and more messages are likely waiting.
    fn drain_background(&mut self, now: Instant) -> bool {
        for outcome in self.fetch_manager.poll_results(MAX_FETCH_MESSAGES_PER_FRAME) {
            let action = match outcome {
                FetchOutcome::Logs { seq, result } => Action::LogsFetched { seq, result },
                FetchOutcome::Stats { seq, result } => Action::StatsFetched { seq, result },
            };
            let commands = self.state.apply(action, now);
            self.execute(commands);
        }

        let messages = self
            .stream_manager
            .poll_progress(MAX_STREAM_MESSAGES_PER_FRAME);
        let saturated = messages.len() == MAX_STREAM_MESSAGES_PER_FRAME;
        for msg in messages {
            match &msg {
                StreamProgress::Malformed { event, reason } => {
                    self.state
                        .push_warning(format!("Dropped malformed '{event}' event: {reason}"));
                }
                StreamProgress::Disconnected { error, .. } => {
                    self.state.push_warning(format!("Event stream: {error}"));
                }
                _ => {}
            }
            let commands = self.state.apply(Action::Stream(msg), now);
            self.execute(commands);
        }
        saturated
    }

    fn export(&mut self, json: bool) {
        let (label, ext) = if json { ("JSON", "json") } else { ("CSV", "csv") };
        let Some(dest) = rfd::FileDialog::new()
            .add_filter(label, &[ext])
            .set_file_name(format!("logs.{ext}"))
            .save_file()
        else {
            return;
        };

        let records = self.state.controller.visible().to_vec();
        let result = std::fs::File::create(&dest)
            .map_err(|e| crate::util::error::ExportError::Io {
                path: dest.clone(),
                source: e,
            })
            .and_then(|file| {
                let writer = std::io::BufWriter::new(file);
                if json {
                    crate::core::export::export_json(&records, writer, &dest)
                } else {
                    crate::core::export::export_csv(&records, writer, &dest)
                }
            });

        self.state.status_message = match result {
            Ok(n) => {
                tracing::info!(count = n, path = %dest.display(), "Export complete");
                format!("Exported {n} records to {label}.")
            }
            Err(e) => {
                tracing::warn!(error = %e, "Export failed");
                format!("{label} export failed: {e}")
            }
        };
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    let has_records = !self.state.controller.visible().is_empty();
                    ui.add_enabled_ui(has_records, |ui| {
                        ui.menu_button("Export", |ui| {
                            if ui.button("Export CSV\u{2026}").clicked() {
                                ui.close_menu();
                                self.export(false);
                            }
                            if ui.button("Export JSON\u{2026}").clicked() {
                                ui.close_menu();
                                self.export(true);
                            }
                        });
                    });
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui.button("Session Summary").clicked() {
                        self.state.show_summary = true;
                        ui.close_menu();
                    }
                    let n = self.state.controller.visible().len();
                    ui.add_enabled_ui(n > 0, |ui| {
                        if ui.button(format!("Copy Visible Records ({n})")).clicked() {
                            ctx.copy_text(self.state.visible_report());
                            self.state.status_message =
                                format!("Copied {n} records to clipboard.");
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    let theme_label = if self.state.dark_mode {
                        "Light Theme"
                    } else {
                        "Dark Theme"
                    };
                    if ui.button(theme_label).clicked() {
                        self.state.dark_mode = !self.state.dark_mode;
                        ui::theme::apply(ctx, self.state.dark_mode, self.state.font_size);
                        ui.close_menu();
                    }
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("\u{24d8}").on_hover_text("About").clicked() {
                        self.state.show_about = true;
                    }
                });
            });
        });
    }

    fn status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let ctl = &self.state.controller;
                if ctl.is_realtime() {
                    ui.label(
                        egui::RichText::new(" \u{25cf} LIVE ")
                            .strong()
                            .color(ui::theme::LIVE_GREEN),
                    );
                } else {
                    ui.label(egui::RichText::new(" POLLING ").strong().weak());
                }
                ui.separator();

                if self.state.debug_mode {
                    ui.label(
                        egui::RichText::new(" DEBUG ")
                            .strong()
                            .color(ui::theme::WARNING_TEXT),
                    )
                    .on_hover_text("Debug logging is enabled");
                    ui.separator();
                }

                let (colour, text) = ui::theme::connection_badge(ctl.connection());
                ui.colored_label(colour, text);
                ui.separator();

                if ctl.is_loading() {
                    ui.spinner();
                }
                if let Some(err) = ctl.last_error() {
                    ui.colored_label(ui::theme::ERROR_TEXT, err)
                        .on_hover_text("Showing the last successfully fetched data");
                } else {
                    ui.label(&self.state.status_message);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!(
                        "{} shown / {} in history",
                        ctl.visible().len(),
                        ctl.store().len()
                    ));
                });
            });
        });
    }
}

impl eframe::App for LogPulseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let saturated = self.drain_background(now);

        // Panels queued their actions last frame; apply them and tick the
        // poll timer.
        let commands = self.state.process(now);
        self.execute(commands);

        self.menu_bar(ctx);
        self.status_bar(ctx);

        egui::TopBottomPanel::bottom("detail_pane")
            .resizable(true)
            .default_height(ui::theme::DETAIL_PANE_HEIGHT)
            .show(ctx, |ui| {
                ui::panels::detail::render(ui, &self.state);
            });

        egui::SidePanel::left("sidebar")
            .default_width(ui::theme::SIDEBAR_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        ui::panels::filters::render(ui, &mut self.state);
                    });
            });

        egui::TopBottomPanel::top("stats_panel")
            .resizable(true)
            .default_height(ui::theme::STATS_PANEL_HEIGHT)
            .show(ctx, |ui| {
                ui::panels::stats::render(ui, &self.state);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui::panels::table::render(ui, &mut self.state);
        });

        ui::panels::summary::render(ctx, &mut self.state);
        ui::panels::about::render(ctx, &mut self.state);

        // Keep frames coming so the poll timer ticks and stream messages are
        // drained even when the user is idle.
        if saturated {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(Duration::from_millis(REALTIME_REPAINT_INTERVAL_MS));
        }
    }

    /// Called by eframe when the window is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.save_session();
        self.stream_manager.stop();
    }
}
