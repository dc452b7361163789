// LogPulse - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation
// 3. Session restore and CLI overrides
// 4. eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` can use
// `crate::app::...`, `crate::core::...` etc.
pub use logpulse::app;

pub use logpulse::core;
pub use logpulse::platform;
pub use logpulse::ui;
pub use logpulse::util;

use crate::app::controller::{ControllerConfig, ViewController};
use crate::app::fetcher::HttpSnapshotSource;
use crate::app::session;
use crate::app::state::DashboardState;
use crate::core::filter::FilterSpec;
use crate::core::model::Level;
use crate::platform::config::{self as app_config, PlatformPaths};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// LogPulse - live dashboard for backend log streams.
///
/// Connects to a log backend's REST API and event stream, and shows the
/// newest records with level/service/search filters and level statistics.
#[derive(Parser, Debug)]
#[command(name = "LogPulse", version, about)]
struct Cli {
    /// Backend API base address (overrides config.toml).
    #[arg(short = 'u', long = "base-url")]
    base_url: Option<String>,

    /// Initial level filter (INFO, WARN or ERROR).
    #[arg(short = 'l', long = "level", value_parser = parse_level)]
    level: Option<Level>,

    /// Initial service filter.
    #[arg(short = 's', long = "service")]
    service: Option<String>,

    /// Start in polling mode instead of real-time mode.
    #[arg(short = 'p', long = "polling")]
    polling: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Directory holding config.toml and session.json (overrides the
    /// platform default).
    #[arg(short = 'c', long = "config-dir")]
    config_dir: Option<PathBuf>,
}

fn parse_level(value: &str) -> Result<Level, String> {
    Level::from_wire(&value.to_uppercase())
        .ok_or_else(|| format!("unknown level '{value}' (expected INFO, WARN or ERROR)"))
}

fn main() {
    let cli = Cli::parse();

    // Resolve platform paths
    let paths = match cli.config_dir {
        Some(ref dir) => PlatformPaths::in_dir(dir.clone()),
        None => PlatformPaths::resolve(),
    };

    // Config is read before logging starts so its level can take effect;
    // its warnings are logged once the subscriber is installed.
    let (mut config, config_warnings) = app_config::load_config(&paths.config_dir);

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config_dir = %paths.config_dir.display(),
        "LogPulse starting"
    );
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }
    let mut warnings = config_warnings;

    if let Some(url) = cli.base_url {
        if app_config::is_valid_base_url(&url) {
            config.base_url = url.trim_end_matches('/').to_string();
        } else {
            let msg = format!(
                "--base-url '{url}' is not an http:// or https:// address. Using {}.",
                config.base_url
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
        }
    }

    // Restore the previous session, then apply CLI overrides on top.
    let session_path = session::session_path(&paths.data_dir);
    let restored = session::load(&session_path);
    let (mut filter, mut realtime) = match restored {
        Some(ref data) => (data.filter.to_filter(config.page_size), data.realtime),
        None => (FilterSpec::new(config.page_size), config.start_realtime),
    };
    if let Some(level) = cli.level {
        filter.set_level(Some(level));
    }
    if let Some(ref service) = cli.service {
        filter.set_service(Some(service));
    }
    if cli.polling {
        realtime = false;
    }

    let source = match HttpSnapshotSource::new(&config.base_url, config.request_timeout()) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!(error = %e, "Cannot create HTTP client");
            eprintln!("Error: cannot create HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let controller = ViewController::new(
        ControllerConfig {
            poll_interval: config.poll_interval(),
            stats_window_secs: config.stats_window_secs,
            max_history: config.max_history,
        },
        filter,
        realtime,
    );

    let mut state = DashboardState::new(controller, cli.debug);
    state.dark_mode = config.dark_mode;
    state.font_size = config.font_size;
    state.session_path = Some(session_path);
    for warning in warnings {
        state.push_warning(warning);
    }

    let events_url = config.events_url();
    let stream_idle_timeout = config.stream_idle_timeout();
    tracing::info!(
        base_url = %config.base_url,
        events_url = %events_url,
        realtime,
        "Ready to launch GUI"
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([860.0, 560.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |cc| {
            ui::theme::apply(&cc.egui_ctx, state.dark_mode, state.font_size);
            Ok(Box::new(gui::LogPulseApp::new(
                state,
                source,
                events_url,
                stream_idle_timeout,
            )))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch LogPulse GUI: {e}");
        std::process::exit(1);
    }
}
