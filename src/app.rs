use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{insights, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TempoDashApp {
    pub state: AppState,
}

impl TempoDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for TempoDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.heading("Tempo, Playstyle, and Winning Patterns");
                    panels::kpi_row(ui, &self.state);
                    ui.separator();

                    plot::color_selector(ui, &mut self.state);
                    plot::tempo_vs_stats(ui, &mut self.state);
                    ui.separator();
                    plot::roster_vs_tempo(ui, &mut self.state);
                    ui.separator();
                    plot::roster_vs_win(ui, &mut self.state);
                    ui.separator();

                    insights::cluster_insights(ui, &mut self.state);
                    ui.separator();
                    insights::height_chart(ui, &self.state);
                    ui.separator();

                    table::data_preview(ui, &self.state);
                });
        });
    }
}
