use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::color::{ClusterColors, ColorDimension, ColorMap};
use crate::data::aggregate::{self, ClusterInsights, Kpis};
use crate::data::columns;
use crate::data::export;
use crate::data::filter::{self, FilterAction, FilterState, FilteredView};
use crate::data::model::TeamSeasonTable;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table, shared read-only with the process cache.
    pub table: Arc<TeamSeasonTable>,

    /// Current widget selections.
    pub filters: FilterState,

    /// Rows passing the current filters (cached).
    pub view: FilteredView,

    pub kpis: Kpis,

    pub insights: ClusterInsights,

    /// Session-wide cluster colours.
    pub cluster_colors: ClusterColors,

    /// Which attribute colours the scatter points, and its colour map over
    /// the groups present in `view.rows`.
    pub color_dimension: ColorDimension,
    pub color_map: ColorMap,

    /// Y axis of "Tempo vs Game Stats".
    pub game_stat: &'static str,
    /// X axis of "Roster Info vs Tempo".
    pub roster_tempo_axis: &'static str,
    /// X axis of "Roster Info vs Win%".
    pub roster_win_axis: &'static str,

    /// Positional height columns shown in the height chart.
    pub height_columns: Vec<&'static str>,

    /// Selected tab of the cluster insights section.
    pub insight_tab: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Build the start-up state for a freshly loaded table.
    pub fn new(table: Arc<TeamSeasonTable>, default_conferences: &[String]) -> Self {
        let filters = FilterState::initial(table.catalog(), default_conferences);
        let cluster_colors = ClusterColors::new(&table.catalog().clusters);
        let color_dimension = ColorDimension::default();
        let color_map = ColorMap::new(color_dimension, &BTreeSet::new(), &cluster_colors);

        let mut state = Self {
            table,
            filters,
            view: FilteredView::default(),
            kpis: Kpis::default(),
            insights: ClusterInsights::default(),
            cluster_colors,
            color_dimension,
            color_map,
            game_stat: columns::GAME_STAT_OPTIONS[0],
            roster_tempo_axis: columns::ROSTER_OPTIONS[0],
            roster_win_axis: columns::ROSTER_OPTIONS[0],
            height_columns: aggregate::POSITIONAL_HEIGHT.iter().map(|m| m.column).collect(),
            insight_tab: 0,
            status_message: None,
        };
        state.refilter();
        state
    }

    /// Apply one filter interaction and recompute everything downstream.
    pub fn dispatch(&mut self, action: FilterAction) {
        log::debug!("filter action {action:?}");
        self.filters = filter::reconcile(&self.filters, action, self.table.catalog());
        self.refilter();
    }

    /// Recompute the filtered view, KPIs and cluster insights from scratch.
    pub fn refilter(&mut self) {
        let criteria = self.filters.criteria(self.table.catalog());
        self.view = filter::apply(&self.table, &criteria);
        self.kpis = Kpis::compute(&self.table, &self.view.rows);
        self.rebuild_color_map();
        self.recompute_insights();
        log::debug!(
            "{} rows filtered, {} in active clusters",
            self.view.rows.len(),
            self.view.cluster_rows.len()
        );
    }

    fn recompute_insights(&mut self) {
        self.insights = ClusterInsights::compute(&self.table, &self.view, &self.height_columns);
    }

    /// Set the colour dimension and rebuild the map.
    pub fn set_color_dimension(&mut self, dimension: ColorDimension) {
        if dimension == self.color_dimension {
            return;
        }
        self.color_dimension = dimension;
        self.rebuild_color_map();
    }

    /// Legend groups come from the filtered rows; cluster colours stay
    /// session-wide through `cluster_colors`.
    fn rebuild_color_map(&mut self) {
        let groups: BTreeSet<String> = self
            .view
            .rows
            .iter()
            .map(|&row| self.color_dimension.key(self.table.record(row)))
            .collect();
        self.color_map = ColorMap::new(self.color_dimension, &groups, &self.cluster_colors);
    }

    /// Toggle one positional height column, keeping the canonical order.
    pub fn toggle_height_column(&mut self, column: &'static str) {
        if let Some(pos) = self.height_columns.iter().position(|c| *c == column) {
            self.height_columns.remove(pos);
        } else {
            self.height_columns = aggregate::POSITIONAL_HEIGHT
                .iter()
                .map(|m| m.column)
                .filter(|c| *c == column || self.height_columns.contains(c))
                .collect();
        }
        self.recompute_insights();
    }

    /// Write the filtered rows (before the cluster restriction) to `path`.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        export::export_to_path(&self.table, &self.view.rows, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::CoachChange;
    use crate::data::model::tests::fixture_table;

    fn state() -> AppState {
        AppState::new(Arc::new(fixture_table()), &["big_ten".to_string()])
    }

    #[test]
    fn starts_with_default_conference_rows() {
        let s = state();
        assert_eq!(s.view.rows.len(), 3);
        assert_eq!(s.kpis.rows, 3);
        assert_eq!(s.height_columns.len(), 5);
    }

    #[test]
    fn dispatch_recomputes_view_and_kpis() {
        let mut s = state();
        s.dispatch(FilterAction::SetCoachChange(CoachChange::Yes));
        assert_eq!(s.view.rows.len(), 1);
        assert_eq!(s.kpis.avg_tempo, Some(70.0));

        s.dispatch(FilterAction::ToggleConference("acc".into()));
        assert_eq!(s.view.rows.len(), 2);
    }

    #[test]
    fn cluster_toggle_leaves_kpis_alone() {
        let mut s = state();
        let kpis = s.kpis;
        s.dispatch(FilterAction::ToggleCluster("Inside Out".into()));
        assert_eq!(s.kpis, kpis);
        assert_eq!(s.view.cluster_rows.len(), 1);
        for agg in &s.insights.groups {
            assert!(!agg.by_cluster.contains_key("Inside Out"));
        }
    }

    #[test]
    fn height_columns_toggle_in_canonical_order() {
        let mut s = state();
        s.toggle_height_column("avgPointGuardHeight");
        s.toggle_height_column("avgCenterHeight");
        assert_eq!(s.height_columns.len(), 3);
        s.toggle_height_column("avgPointGuardHeight");
        assert_eq!(s.height_columns[0], "avgPointGuardHeight");

        for c in aggregate::POSITIONAL_HEIGHT {
            if s.height_columns.contains(&c.column) {
                s.toggle_height_column(c.column);
            }
        }
        assert!(s.insights.height.is_none());
    }

    #[test]
    fn color_dimension_switch_rebuilds_legend() {
        let mut s = state();
        let legend = |s: &AppState| -> Vec<String> {
            s.color_map.legend_entries().into_iter().map(|(k, _)| k).collect()
        };
        assert_eq!(legend(&s), vec!["big_ten"]);
        s.set_color_dimension(ColorDimension::CoachChange);
        assert_eq!(legend(&s), vec!["0", "1"]);
    }

    #[test]
    fn legend_tracks_filtered_rows() {
        let mut s = state();
        s.dispatch(FilterAction::ToggleConference("acc".into()));
        let groups: Vec<String> = s.color_map.legend_entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(groups, vec!["acc", "big_ten"]);

        // Cluster colours do not move when the visible clusters change.
        s.set_color_dimension(ColorDimension::Cluster);
        let before = s.color_map.color_for("Pace and Space");
        s.dispatch(FilterAction::SetConferences(["acc".to_string()].into_iter().collect()));
        assert_eq!(s.color_map.color_for("Pace and Space"), before);
        assert_eq!(before, s.cluster_colors.color_for("Pace and Space"));
        let groups: Vec<String> = s.color_map.legend_entries().into_iter().map(|(k, _)| k).collect();
        assert!(!groups.contains(&"Inside Out".to_string()));
    }
}
