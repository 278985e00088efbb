use std::collections::BTreeSet;
use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::aggregate::POSITIONAL_HEIGHT;
use crate::data::export::EXPORT_FILE_NAME;
use crate::data::filter::{CoachChange, FilterAction};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Generic multi-select
// ---------------------------------------------------------------------------

/// What the user did with a multi-select this frame.
enum Pick<T> {
    Toggle(T),
    All,
    None,
}

/// Collapsible checkbox list with "All"/"None" buttons and an
/// `(selected/total)` counter in the header.
fn multi_select<T, F>(
    ui: &mut Ui,
    title: &str,
    options: &BTreeSet<T>,
    selected: &BTreeSet<T>,
    offer_all: bool,
    swatch: F,
) -> Option<Pick<T>>
where
    T: Ord + Clone + ToString,
    F: Fn(&T) -> Option<Color32>,
{
    let n_selected = selected.iter().filter(|v| options.contains(*v)).count();
    let header_text = format!("{title}  ({n_selected}/{})", options.len());
    let mut pick = None;

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if offer_all && ui.small_button("All").clicked() {
                    pick = Some(Pick::All);
                }
                if ui.small_button("None").clicked() {
                    pick = Some(Pick::None);
                }
            });

            for val in options {
                let mut text = RichText::new(val.to_string());
                if let Some(c) = swatch(val) {
                    text = text.color(c);
                }
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, text).changed() {
                    pick = Some(Pick::Toggle(val.clone()));
                }
            }
        });

    pick
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let table = Arc::clone(&state.table);
    let catalog = table.catalog();
    let mut actions: Vec<FilterAction> = Vec::new();
    let mut height_toggles: Vec<&'static str> = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let filters = &state.filters;

            // ---- Seasons ----
            match multi_select(ui, "Season(s)", &catalog.seasons, &filters.seasons, true, |_| None) {
                Some(Pick::Toggle(s)) => actions.push(FilterAction::ToggleSeason(s)),
                Some(Pick::All) => actions.push(FilterAction::SetSeasons(catalog.seasons.clone())),
                Some(Pick::None) => actions.push(FilterAction::SetSeasons(BTreeSet::new())),
                None => {}
            }

            // ---- Conferences (cascade into teams) ----
            match multi_select(
                ui,
                "Conference(s)",
                &catalog.conferences,
                &filters.conferences,
                true,
                |_| None,
            ) {
                Some(Pick::Toggle(c)) => actions.push(FilterAction::ToggleConference(c)),
                Some(Pick::All) => {
                    actions.push(FilterAction::SetConferences(catalog.conferences.clone()))
                }
                Some(Pick::None) => actions.push(FilterAction::SetConferences(BTreeSet::new())),
                None => {}
            }

            // ---- Teams ----
            let mut all_teams = filters.all_conference_teams;
            if ui
                .checkbox(&mut all_teams, "Select all teams from selected conferences")
                .changed()
            {
                actions.push(FilterAction::SetAllConferenceTeams(all_teams));
            }
            if !filters.all_conference_teams {
                let options = filters.teams_in_selected_conferences(catalog);
                match multi_select(ui, "Team(s)", &options, &filters.teams, true, |_| None) {
                    Some(Pick::Toggle(t)) => actions.push(FilterAction::ToggleTeam(t)),
                    Some(Pick::All) => {
                        let mut teams = filters.teams.clone();
                        teams.extend(options.iter().cloned());
                        actions.push(FilterAction::SetTeams(teams));
                    }
                    Some(Pick::None) => actions.push(FilterAction::SetTeams(BTreeSet::new())),
                    None => {}
                }
            }

            match multi_select(
                ui,
                "Add teams (other conferences)",
                &catalog.teams,
                &filters.extra_teams,
                false,
                |_| None,
            ) {
                Some(Pick::Toggle(t)) => actions.push(FilterAction::ToggleExtraTeam(t)),
                Some(Pick::None) => actions.push(FilterAction::ClearExtraTeams),
                Some(Pick::All) | None => {}
            }

            // ---- Coach change ----
            ui.add_space(4.0);
            ui.strong("Coach change");
            let current = filters.coach_change;
            egui::ComboBox::from_id_salt("coach_change")
                .selected_text(current.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for option in CoachChange::ALL {
                        if ui
                            .selectable_label(current == option, option.to_string())
                            .clicked()
                            && option != current
                        {
                            actions.push(FilterAction::SetCoachChange(option));
                        }
                    }
                });
            ui.separator();

            // ---- Playstyle clusters ----
            ui.strong("Playstyle clusters");
            let colors = &state.cluster_colors;
            match multi_select(
                ui,
                "Clusters",
                &catalog.clusters,
                &filters.active_clusters,
                true,
                |c: &String| Some(colors.color_for(c)),
            ) {
                Some(Pick::Toggle(c)) => actions.push(FilterAction::ToggleCluster(c)),
                Some(Pick::All) => actions.push(FilterAction::SetClusters(catalog.clusters.clone())),
                Some(Pick::None) => actions.push(FilterAction::SetClusters(BTreeSet::new())),
                None => {}
            }
            ui.separator();

            // ---- Height metrics for the positional bar chart ----
            ui.strong("Height metrics");
            for m in POSITIONAL_HEIGHT {
                let mut checked = state.height_columns.contains(&m.column);
                if ui.checkbox(&mut checked, m.column).changed() {
                    height_toggles.push(m.column);
                }
            }
        });

    for action in actions {
        state.dispatch(action);
    }
    for column in height_toggles {
        state.toggle_height_column(column);
    }
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

/// Headline metrics over the filtered rows.
pub fn kpi_row(ui: &mut Ui, state: &AppState) {
    let kpis = &state.kpis;
    let cards = [
        ("Avg Tempo", kpis.tempo_text()),
        ("Avg Win%", kpis.win_pct_text()),
        ("Avg Height (in)", kpis.height_text()),
        ("Team-seasons", kpis.rows.to_string()),
    ];
    ui.columns(cards.len(), |cols: &mut [Ui]| {
        for (col, (label, value)) in cols.iter_mut().zip(cards.iter()) {
            col.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(*label).weak());
                ui.label(RichText::new(value).size(28.0).strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export filtered data…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} team-seasons loaded, {} filtered, {} in active clusters",
            state.table.len(),
            state.view.rows.len(),
            state.view.cluster_rows.len()
        ));

        ui.separator();

        if ui.button("Download filtered CSV").clicked() {
            save_file_dialog(state);
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_to(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
