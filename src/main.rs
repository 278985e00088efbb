mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::TempoDashApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    // The dashboard has nothing to show without its table: load failures end the process.
    let config = match DashboardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e:#}");
            std::process::exit(2);
        }
    };
    let table = match data::loader::load_cached(&config) {
        Ok(table) => table,
        Err(e) => {
            log::error!("Failed to load {}: {e:#}", config.source);
            eprintln!("tempo-dash: failed to load {}: {e:#}", config.source);
            std::process::exit(1);
        }
    };
    if table.is_empty() {
        log::warn!("{} contains no team-seasons; every view will be empty", config.source);
    }
    log::info!(
        "Loaded {} team-seasons with columns {:?}",
        table.len(),
        table.columns()
    );

    let state = AppState::new(table, &config.default_conferences);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tempo Dash – Playstyle Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(TempoDashApp::new(state)))),
    )
}
