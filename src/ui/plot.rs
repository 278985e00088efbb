use std::collections::BTreeMap;
use std::sync::Arc;

use eframe::egui::{self, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoint, PlotPoints, Points};

use crate::color::ColorDimension;
use crate::data::aggregate::TrendLine;
use crate::data::columns;
use crate::data::model::{CellValue, TeamSeasonTable};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 420.0;

// ---------------------------------------------------------------------------
// Scatter charts (central panel)
// ---------------------------------------------------------------------------

/// "Color points by" selector shared by the three scatters.
pub fn color_selector(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Color points by:");
        let current = state.color_dimension;
        egui::ComboBox::from_id_salt("color_by")
            .selected_text(current.column())
            .show_ui(ui, |ui: &mut Ui| {
                for dim in ColorDimension::ALL {
                    if ui.selectable_label(current == dim, dim.column()).clicked() {
                        state.set_color_dimension(dim);
                    }
                }
            });
    });
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (group, color) in state.color_map.legend_entries() {
            ui.label(RichText::new(format!("● {group}")).color(color));
        }
    });
}

/// Combo box over a fixed list of column names.
fn axis_selector(ui: &mut Ui, id: &str, label: &str, options: &[&'static str], current: &mut &'static str) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(*current)
            .show_ui(ui, |ui: &mut Ui| {
                for &opt in options {
                    ui.selectable_value(current, opt, opt);
                }
            });
    });
}

/// Tempo on x, a chosen game stat on y.
pub fn tempo_vs_stats(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Tempo vs Game Stats");
    axis_selector(
        ui,
        "game_stat",
        "Choose Y-axis (Game Stat):",
        columns::GAME_STAT_OPTIONS,
        &mut state.game_stat,
    );
    let y = state.game_stat;
    scatter(ui, state, "tempo_vs_stats", columns::TEMPO, y, columns::TEMPO_STATS_HOVER);
}

/// A roster metric on x, Tempo on y.
pub fn roster_vs_tempo(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Roster Info vs Tempo");
    axis_selector(
        ui,
        "roster_tempo",
        "Choose X-axis (Roster Metric):",
        columns::ROSTER_OPTIONS,
        &mut state.roster_tempo_axis,
    );
    let x = state.roster_tempo_axis;
    scatter(ui, state, "roster_vs_tempo", x, columns::TEMPO, columns::ROSTER_TEMPO_HOVER);
}

/// A roster metric on x, win percentage on y.
pub fn roster_vs_win(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Roster Info vs Win%");
    axis_selector(
        ui,
        "roster_win",
        "Choose X-axis (Roster Metric):",
        columns::ROSTER_OPTIONS,
        &mut state.roster_win_axis,
    );
    let x = state.roster_win_axis;
    scatter(ui, state, "roster_vs_win", x, columns::WIN_PCT, columns::ROSTER_WIN_HOVER);
}

/// One colour group of a scatter: points and the table rows they came from,
/// index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScatterGroup {
    pub points: Vec<[f64; 2]>,
    pub rows: Vec<usize>,
}

impl ScatterGroup {
    /// Row of the point closest to `at`, if one lies within rounding distance.
    pub fn row_at(&self, at: [f64; 2]) -> Option<usize> {
        let close = |a: f64, b: f64| (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0);
        self.points
            .iter()
            .zip(&self.rows)
            .filter(|(p, _)| close(p[0], at[0]) && close(p[1], at[1]))
            .min_by(|(p, _), (q, _)| {
                let d = |r: &[f64; 2]| (r[0] - at[0]).powi(2) + (r[1] - at[1]).powi(2);
                d(*p).total_cmp(&d(*q))
            })
            .map(|(_, &row)| row)
    }
}

/// Points of the filtered rows grouped by the colour dimension.
/// Rows missing either coordinate are skipped.
pub fn scatter_groups(state: &AppState, x_col: &str, y_col: &str) -> BTreeMap<String, ScatterGroup> {
    let table = &state.table;
    let mut groups: BTreeMap<String, ScatterGroup> = BTreeMap::new();
    for &row in &state.view.rows {
        let (Some(x), Some(y)) = (table.numeric(row, x_col), table.numeric(row, y_col)) else {
            continue;
        };
        let key = state.color_dimension.key(table.record(row));
        let group = groups.entry(key).or_default();
        group.points.push([x, y]);
        group.rows.push(row);
    }
    groups
}

/// Tooltip for one team-season: team and season, both axes, then the
/// chart's extra columns.
pub fn hover_text(table: &TeamSeasonTable, row: usize, x_col: &str, y_col: &str, extra: &[&str]) -> String {
    let rec = table.record(row);
    let mut text = format!("{} ({})", rec.team, rec.season);
    for col in [x_col, y_col]
        .into_iter()
        .chain(extra.iter().copied().filter(|c| *c != x_col && *c != y_col))
    {
        let value = match table.value(row, col) {
            Some(CellValue::Null) | None => "—".to_string(),
            Some(cell) => cell.to_string(),
        };
        text.push_str(&format!("\n{col}: {value}"));
    }
    text
}

fn scatter(
    ui: &mut Ui,
    state: &AppState,
    id: &str,
    x_col: &str,
    y_col: &str,
    hover: &'static [&'static str],
) {
    let groups = scatter_groups(state, x_col, y_col);
    if groups.is_empty() {
        ui.label(format!("No data for {x_col} vs {y_col} with the current filters."));
        return;
    }

    let table = Arc::clone(&state.table);
    let lookup = groups.clone();
    let (x_name, y_name) = (x_col.to_string(), y_col.to_string());

    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(x_col)
        .y_axis_label(y_col)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .label_formatter(move |name: &str, value: &PlotPoint| {
            match lookup.get(name).and_then(|g| g.row_at([value.x, value.y])) {
                Some(row) => hover_text(&table, row, &x_name, &y_name, hover),
                None => format!("{x_name}: {:.2}\n{y_name}: {:.2}", value.x, value.y),
            }
        })
        .show(ui, |plot_ui| {
            for (group, series) in &groups {
                let color = state.color_map.color_for(group);
                let points = &series.points;

                if let Some(segment) = TrendLine::fit(points).and_then(|t| t.segment(points)) {
                    plot_ui.line(
                        Line::new(PlotPoints::from(segment.to_vec()))
                            .name(group)
                            .color(color)
                            .width(1.5),
                    );
                }

                plot_ui.points(
                    Points::new(PlotPoints::from(points.clone()))
                        .name(group)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::FilterAction;
    use crate::data::model::tests::fixture_table;

    #[test]
    fn scatter_groups_follow_color_dimension() {
        let mut state = AppState::new(Arc::new(fixture_table()), &["acc".to_string()]);
        let groups = scatter_groups(&state, columns::TEMPO, columns::WIN_PCT);
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["acc"]);
        assert_eq!(groups["acc"].points.len(), 3);
        assert_eq!(groups["acc"].rows, vec![3, 4, 5]);

        state.set_color_dimension(ColorDimension::Cluster);
        let groups = scatter_groups(&state, columns::TEMPO, columns::WIN_PCT);
        // The cluster-less Duke 2023 row still appears in the scatter.
        assert_eq!(groups["<none>"].points, vec![[68.0, 0.70]]);
    }

    #[test]
    fn scatter_ignores_cluster_toggles() {
        let mut state = AppState::new(Arc::new(fixture_table()), &["acc".to_string()]);
        let before = scatter_groups(&state, columns::TEMPO, columns::WIN_PCT);
        state.dispatch(FilterAction::SetClusters(Default::default()));
        assert_eq!(scatter_groups(&state, columns::TEMPO, columns::WIN_PCT), before);
    }

    #[test]
    fn rows_without_the_axis_column_are_skipped() {
        let state = AppState::new(Arc::new(fixture_table()), &["acc".to_string()]);
        assert!(scatter_groups(&state, columns::TEMPO, "avg_fga").is_empty());
    }

    #[test]
    fn hovered_point_resolves_to_its_team() {
        let state = AppState::new(Arc::new(fixture_table()), &["acc".to_string()]);
        let groups = scatter_groups(&state, columns::TEMPO, columns::WIN_PCT);
        let acc = &groups["acc"];

        let row = acc.row_at([60.0, 0.65]).unwrap();
        assert_eq!(state.table.record(row).team, "Virginia");
        assert_eq!(acc.row_at([60.5, 0.65]), None);

        let text = hover_text(&state.table, row, columns::TEMPO, columns::WIN_PCT, columns::ROSTER_WIN_HOVER);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Virginia (2023)");
        assert_eq!(lines[1], "Tempo: 60.0000");
        assert_eq!(lines[2], "win_pct: 0.6500");
        // Tempo is already an axis; absent columns render as a dash.
        assert_eq!(&lines[3..], &["OffEff: —", "DefEff: —"]);
    }
}
