use std::collections::BTreeMap;

use super::columns;
use super::filter::FilteredView;
use super::model::TeamSeasonTable;

// ---------------------------------------------------------------------------
// Metric groups
// ---------------------------------------------------------------------------

/// A source column and the label it is charted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricColumn {
    pub column: &'static str,
    pub label: &'static str,
}

const fn metric(column: &'static str, label: &'static str) -> MetricColumn {
    MetricColumn { column, label }
}

/// How a group is drawn in the insights section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupChart {
    /// One pie per cluster.
    Pie,
    /// Grouped bars: one bar group per column, one bar per cluster.
    GroupedBar,
}

/// A named set of related numeric columns aggregated together.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricGroup {
    pub title: &'static str,
    pub chart: GroupChart,
    pub columns: Vec<MetricColumn>,
}

pub const POINT_SHARE: &[MetricColumn] = &[
    metric("O3PT_Share", "3PT"),
    metric("O2PT_Share", "2PT"),
    metric("OFT_Share", "FT"),
];

pub const SHOT_ATTEMPTS: &[MetricColumn] = &[
    metric("avg_fga3", "3PT Attempts"),
    metric("avg_fga", "2PT Attempts"),
    metric("avg_fta", "FT Attempts"),
];

pub const OFFENSIVE_REBOUNDS: &[MetricColumn] = &[
    metric("avgCenterOffensiveRebounds", "Center"),
    metric("avgPowerForwardOffensiveRebounds", "Power Forward"),
    metric("avgSmallForwardOffensiveRebounds", "Small Forward"),
    metric("avgShootingGuardOffensiveRebounds", "Shooting Guard"),
    metric("avgPointGuardOffensiveRebounds", "Point Guard"),
];

pub const DEFENSIVE_REBOUNDS: &[MetricColumn] = &[
    metric("avgCenterDefensiveRebounds", "Center"),
    metric("avgPowerForwardDefensiveRebounds", "Power Forward"),
    metric("avgSmallForwardDefensiveRebounds", "Small Forward"),
    metric("avgShootingGuardDefensiveRebounds", "Shooting Guard"),
    metric("avgPointGuardDefensiveRebounds", "Point Guard"),
];

pub const POINTS_BY_POSITION: &[MetricColumn] = &[
    metric("avgCenterPoints", "Center"),
    metric("avgPowerForwardPoints", "Power Forward"),
    metric("avgSmallForwardPoints", "Small Forward"),
    metric("avgShootingGuardPoints", "Shooting Guard"),
    metric("avgPointGuardPoints", "Point Guard"),
];

/// Candidates for the positional-height chart, guard to center.
pub const POSITIONAL_HEIGHT: &[MetricColumn] = &[
    metric("avgPointGuardHeight", "Point Guard"),
    metric("avgShootingGuardHeight", "Shooting Guard"),
    metric("avgSmallForwardHeight", "Small Forward"),
    metric("avgPowerForwardHeight", "Power Forward"),
    metric("avgCenterHeight", "Center"),
];

/// The five fixed insight groups, in tab order.
pub fn insight_groups() -> Vec<MetricGroup> {
    vec![
        MetricGroup {
            title: "Point Share",
            chart: GroupChart::Pie,
            columns: POINT_SHARE.to_vec(),
        },
        MetricGroup {
            title: "Shot Attempts",
            chart: GroupChart::Pie,
            columns: SHOT_ATTEMPTS.to_vec(),
        },
        MetricGroup {
            title: "Offensive Rebounds",
            chart: GroupChart::Pie,
            columns: OFFENSIVE_REBOUNDS.to_vec(),
        },
        MetricGroup {
            title: "Defensive Rebounds",
            chart: GroupChart::Pie,
            columns: DEFENSIVE_REBOUNDS.to_vec(),
        },
        MetricGroup {
            title: "Points by Position",
            chart: GroupChart::GroupedBar,
            columns: POINTS_BY_POSITION.to_vec(),
        },
    ]
}

/// Positional-height group over the selected column subset, kept in
/// [`POSITIONAL_HEIGHT`] order. `None` when nothing is selected.
pub fn height_group(selected: &[&str]) -> Option<MetricGroup> {
    let columns: Vec<MetricColumn> = POSITIONAL_HEIGHT
        .iter()
        .filter(|m| selected.contains(&m.column))
        .copied()
        .collect();
    if columns.is_empty() {
        return None;
    }
    Some(MetricGroup {
        title: "Average Positional Heights",
        chart: GroupChart::GroupedBar,
        columns,
    })
}

// ---------------------------------------------------------------------------
// Cluster means
// ---------------------------------------------------------------------------

/// cluster → one mean per group column (same order). A `None` mean means
/// the cluster had no numeric value for that column.
pub type ClusterMeans = BTreeMap<String, Vec<Option<f64>>>;

/// Unweighted arithmetic mean, `None` over an empty input.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Group `rows` by cluster and average each group column.
///
/// Only clusters with at least one row appear. Rows without a cluster are
/// skipped.
pub fn cluster_means(table: &TeamSeasonTable, rows: &[usize], group: &MetricGroup) -> ClusterMeans {
    let mut by_cluster: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for &row in rows {
        if let Some(cluster) = table.record(row).cluster.as_deref() {
            by_cluster.entry(cluster).or_default().push(row);
        }
    }

    by_cluster
        .into_iter()
        .map(|(cluster, members)| {
            let means = group
                .columns
                .iter()
                .map(|m| mean(members.iter().filter_map(|&r| table.numeric(r, m.column))))
                .collect();
            (cluster.to_string(), means)
        })
        .collect()
}

/// One long-form row for grouped bar charts.
#[derive(Debug, Clone, PartialEq)]
pub struct MeltedRow {
    pub cluster: String,
    pub label: &'static str,
    pub value: f64,
}

/// One pie slice. `index` is the column's position in its group, so a
/// dropped column does not shift the colours of the ones after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    pub index: usize,
    pub label: &'static str,
    pub value: f64,
}

/// A group together with its per-cluster means.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate {
    pub group: MetricGroup,
    pub by_cluster: ClusterMeans,
}

impl GroupAggregate {
    pub fn compute(table: &TeamSeasonTable, rows: &[usize], group: MetricGroup) -> Self {
        let by_cluster = cluster_means(table, rows, &group);
        GroupAggregate { group, by_cluster }
    }

    /// Slices for one cluster; columns with no mean are dropped, the rest
    /// keep their column position.
    pub fn slices(&self, cluster: &str) -> Option<Vec<Slice>> {
        let means = self.by_cluster.get(cluster)?;
        Some(
            self.group
                .columns
                .iter()
                .zip(means)
                .enumerate()
                .filter_map(|(index, (m, v))| {
                    v.map(|value| Slice {
                        index,
                        label: m.label,
                        value,
                    })
                })
                .collect(),
        )
    }

    /// Long form, column-major: all clusters for the first column, then the next.
    pub fn melt(&self) -> Vec<MeltedRow> {
        let mut out = Vec::with_capacity(self.group.columns.len() * self.by_cluster.len());
        for (col_idx, m) in self.group.columns.iter().enumerate() {
            for (cluster, means) in &self.by_cluster {
                if let Some(value) = means[col_idx] {
                    out.push(MeltedRow {
                        cluster: cluster.clone(),
                        label: m.label,
                        value,
                    });
                }
            }
        }
        out
    }
}

/// Everything the cluster insights section draws.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterInsights {
    pub groups: Vec<GroupAggregate>,
    pub height: Option<GroupAggregate>,
}

impl ClusterInsights {
    pub fn compute(table: &TeamSeasonTable, view: &FilteredView, height_columns: &[&str]) -> Self {
        let rows = &view.cluster_rows;
        let groups = insight_groups()
            .into_iter()
            .map(|g| GroupAggregate::compute(table, rows, g))
            .collect();
        let height = height_group(height_columns).map(|g| GroupAggregate::compute(table, rows, g));
        ClusterInsights { groups, height }
    }
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// Headline numbers over the base filtered rows. `None` when undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kpis {
    pub rows: usize,
    pub avg_tempo: Option<f64>,
    /// Win percentage already scaled to 0–100.
    pub avg_win_pct: Option<f64>,
    pub avg_height: Option<f64>,
}

impl Kpis {
    pub fn compute(table: &TeamSeasonTable, rows: &[usize]) -> Self {
        let column_mean =
            |column: &str| mean(rows.iter().filter_map(|&r| table.numeric(r, column)));
        Kpis {
            rows: rows.len(),
            avg_tempo: column_mean(columns::TEMPO),
            avg_win_pct: column_mean(columns::WIN_PCT).map(|v| v * 100.0),
            avg_height: column_mean(columns::AVG_HEIGHT),
        }
    }

    pub fn tempo_text(&self) -> String {
        format_kpi(self.avg_tempo, 2, "")
    }

    pub fn win_pct_text(&self) -> String {
        format_kpi(self.avg_win_pct, 1, "%")
    }

    pub fn height_text(&self) -> String {
        format_kpi(self.avg_height, 2, "")
    }
}

fn format_kpi(value: Option<f64>, decimals: usize, suffix: &str) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}{suffix}"),
        None => "—".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Trend line
// ---------------------------------------------------------------------------

/// Ordinary least-squares fit `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub intercept: f64,
    pub slope: f64,
}

impl TrendLine {
    /// `None` with fewer than two points or no spread in x. Spread is judged
    /// against the magnitude of x, so tiny units still fit and rounding noise
    /// around a large constant does not.
    pub fn fit(points: &[[f64; 2]]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p[0]).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p[1]).sum::<f64>() / n;
        let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), p| {
            let dx = p[0] - mean_x;
            (sxy + dx * (p[1] - mean_y), sxx + dx * dx)
        });
        let scale = n * mean_x * mean_x;
        if sxx <= scale * f64::EPSILON {
            return None;
        }
        let slope = sxy / sxx;
        Some(TrendLine {
            intercept: mean_y - slope * mean_x,
            slope,
        })
    }

    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Two points spanning the x-range of `points`.
    pub fn segment(&self, points: &[[f64; 2]]) -> Option<[[f64; 2]; 2]> {
        let min = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
        let max = points.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);
        (min.is_finite() && max.is_finite()).then(|| [[min, self.at(min)], [max, self.at(max)]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterCriteria};
    use crate::data::model::tests::fixture_table;
    use std::collections::BTreeSet;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn all_rows(table: &TeamSeasonTable) -> FilterCriteria {
        let c = table.catalog();
        FilterCriteria {
            seasons: c.seasons.clone(),
            conferences: c.conferences.clone(),
            teams: c.teams.clone(),
            active_clusters: c.clusters.clone(),
            ..Default::default()
        }
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(mean([1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn cluster_means_match_manual_average() {
        let table = fixture_table();
        let view = apply(&table, &all_rows(&table));
        let group = MetricGroup {
            title: "Point Share",
            chart: GroupChart::Pie,
            columns: POINT_SHARE.to_vec(),
        };
        let means = cluster_means(&table, &view.cluster_rows, &group);

        // Inside Out: Purdue 2023 + Purdue 2022.
        let inside_out = &means["Inside Out"];
        assert!(approx(inside_out[0].unwrap(), (0.30 + 0.28) / 2.0));
        // Pace and Space: Illinois 2023 + Duke 2022.
        let pace = &means["Pace and Space"];
        assert!(approx(pace[1].unwrap(), (0.44 + 0.46) / 2.0));
        // Duke 2023 has no cluster and contributes nowhere.
        assert_eq!(means.len(), 3);
    }

    #[test]
    fn clusters_without_rows_are_absent() {
        let table = fixture_table();
        let mut criteria = all_rows(&table);
        criteria.active_clusters = ["Grind".to_string()].into_iter().collect();
        let view = apply(&table, &criteria);
        let insights = ClusterInsights::compute(&table, &view, &["avgCenterHeight"]);
        for agg in &insights.groups {
            assert_eq!(agg.by_cluster.keys().collect::<Vec<_>>(), vec!["Grind"]);
        }
        let height = insights.height.unwrap();
        assert_eq!(height.by_cluster["Grind"], vec![Some(82.0)]);
    }

    #[test]
    fn missing_columns_yield_absent_means() {
        let table = fixture_table();
        let view = apply(&table, &all_rows(&table));
        let agg = GroupAggregate::compute(
            &table,
            &view.cluster_rows,
            MetricGroup {
                title: "Offensive Rebounds",
                chart: GroupChart::Pie,
                columns: OFFENSIVE_REBOUNDS.to_vec(),
            },
        );
        assert!(agg.by_cluster.values().flatten().all(Option::is_none));
        assert_eq!(agg.slices("Grind"), Some(Vec::new()));
        assert!(agg.melt().is_empty());
    }

    #[test]
    fn slices_keep_column_positions_when_a_mean_is_missing() {
        let agg = GroupAggregate {
            group: insight_groups().swap_remove(0),
            by_cluster: [("Grind".to_string(), vec![Some(0.3), None, Some(0.2)])]
                .into_iter()
                .collect(),
        };
        let slices = agg.slices("Grind").unwrap();
        let positions: Vec<(usize, &str)> = slices.iter().map(|s| (s.index, s.label)).collect();
        assert_eq!(positions, vec![(0, "3PT"), (2, "FT")]);
        assert_eq!(agg.slices("Inside Out"), None);
    }

    #[test]
    fn empty_view_produces_empty_aggregates() {
        let table = fixture_table();
        let view = FilteredView::default();
        let insights = ClusterInsights::compute(&table, &view, &["avgCenterHeight"]);
        assert!(insights.groups.iter().all(|g| g.by_cluster.is_empty()));
        assert_eq!(Kpis::compute(&table, &view.rows).avg_tempo, None);
        assert_eq!(Kpis::compute(&table, &view.rows).tempo_text(), "—");
    }

    #[test]
    fn height_group_keeps_position_order_and_skips_empty() {
        assert_eq!(height_group(&[]), None);
        let g = height_group(&["avgCenterHeight", "avgPointGuardHeight"]).unwrap();
        let labels: Vec<_> = g.columns.iter().map(|m| m.label).collect();
        assert_eq!(labels, vec!["Point Guard", "Center"]);
    }

    #[test]
    fn melt_is_column_major() {
        let table = fixture_table();
        let view = apply(&table, &all_rows(&table));
        let agg = GroupAggregate::compute(
            &table,
            &view.cluster_rows,
            height_group(&["avgCenterHeight"]).unwrap(),
        );
        let melted = agg.melt();
        let clusters: Vec<&str> = melted.iter().map(|m| m.cluster.as_str()).collect();
        assert_eq!(clusters, vec!["Grind", "Inside Out", "Pace and Space"]);
        assert!(melted.iter().all(|m| m.label == "Center"));
    }

    #[test]
    fn avg_tempo_for_big_ten_2023() {
        let table = fixture_table();
        let criteria = FilterCriteria {
            seasons: [2023].into_iter().collect(),
            conferences: ["big_ten".to_string()].into_iter().collect(),
            teams: table.catalog().teams_in(&["big_ten".to_string()]),
            active_clusters: BTreeSet::new(),
            ..Default::default()
        };
        let view = apply(&table, &criteria);
        let kpis = Kpis::compute(&table, &view.rows);
        assert_eq!(kpis.rows, 2);
        assert!(approx(kpis.avg_tempo.unwrap(), (64.0 + 70.0) / 2.0));
        assert!(approx(kpis.avg_win_pct.unwrap(), (0.85 + 0.60) / 2.0 * 100.0));
        assert_eq!(kpis.tempo_text(), "67.00");
        assert_eq!(kpis.win_pct_text(), "72.5%");
    }

    #[test]
    fn trend_line_fits_exact_line() {
        let points = [[0.0, 1.0], [1.0, 3.0], [2.0, 5.0]];
        let fit = TrendLine::fit(&points).unwrap();
        assert!(approx(fit.slope, 2.0));
        assert!(approx(fit.intercept, 1.0));
        assert_eq!(fit.segment(&points), Some([[0.0, 1.0], [2.0, 5.0]]));
    }

    #[test]
    fn trend_line_needs_spread() {
        assert_eq!(TrendLine::fit(&[[1.0, 2.0]]), None);
        assert_eq!(TrendLine::fit(&[[1.0, 2.0], [1.0, 4.0]]), None);
        assert_eq!(TrendLine::fit(&[[0.0, 2.0], [0.0, 4.0]]), None);
    }

    #[test]
    fn trend_line_spread_is_relative_to_scale() {
        // Small units: the spread is far below machine epsilon in absolute terms.
        let tiny = [[1e-9, 1.0], [2e-9, 2.0], [3e-9, 3.0]];
        let fit = TrendLine::fit(&tiny).unwrap();
        assert!((fit.slope - 1e9).abs() / 1e9 < 1e-6);

        // A large constant x with one-ulp jitter has no real spread.
        let big = 1e9_f64;
        let jitter = [[big, 1.0], [big + big * f64::EPSILON, 2.0], [big, 3.0]];
        assert_eq!(TrendLine::fit(&jitter), None);
    }
}
