use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, LineStyle, Plot, VLine};

use crate::color::{self, ClusterColors};
use crate::data::aggregate::{GroupAggregate, GroupChart, Slice};
use crate::state::AppState;

const PIE_SIZE: f32 = 220.0;
/// Widest wedge drawn as one convex polygon.
const MAX_WEDGE: f64 = std::f64::consts::FRAC_PI_4;
/// Slices below this share get no in-pie label.
const MIN_LABELLED_SHARE: f64 = 0.04;

/// Slice palettes for the pie tabs, in tab order.
const PIE_PALETTES: [&[&str]; 4] = [
    color::SHOT_TYPE_COLORS,
    color::SHOT_TYPE_COLORS,
    color::OFF_REBOUND_COLORS,
    color::DEF_REBOUND_COLORS,
];

// ---------------------------------------------------------------------------
// Cluster composition insights
// ---------------------------------------------------------------------------

/// Tabbed per-cluster breakdowns.
pub fn cluster_insights(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Cluster Composition Insights");

    ui.horizontal(|ui: &mut Ui| {
        for (i, agg) in state.insights.groups.iter().enumerate() {
            ui.selectable_value(&mut state.insight_tab, i, agg.group.title);
        }
    });
    ui.separator();

    let Some(agg) = state.insights.groups.get(state.insight_tab) else {
        return;
    };
    if agg.by_cluster.is_empty() {
        ui.label("No playstyle cluster has rows under the current filters.");
        return;
    }

    match agg.group.chart {
        GroupChart::Pie => {
            let palette = color::hex_palette(PIE_PALETTES.get(state.insight_tab).copied().unwrap_or(color::SET2));
            ui.label(RichText::new(format!("{} breakdown by playstyle cluster", agg.group.title)).strong());
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for cluster in agg.by_cluster.keys() {
                    if let Some(slices) = agg.slices(cluster) {
                        pie(ui, &format!("{cluster} - {}", agg.group.title), &slices, &palette);
                    }
                }
            });
        }
        GroupChart::GroupedBar => {
            grouped_bars(ui, "insight_bars", agg, &state.cluster_colors, "Average Points");
        }
    }
}

/// Average positional heights, one bar per active cluster.
pub fn height_chart(ui: &mut Ui, state: &AppState) {
    ui.heading("Average Positional Heights by Playstyle Cluster");
    match &state.insights.height {
        None => {
            ui.label("Pick at least one height metric in the side panel.");
        }
        Some(agg) if agg.by_cluster.is_empty() => {
            ui.label("No playstyle cluster has rows under the current filters.");
        }
        Some(agg) => grouped_bars(ui, "height_bars", agg, &state.cluster_colors, "Average Height (inches)"),
    }
}

// ---------------------------------------------------------------------------
// Grouped bars
// ---------------------------------------------------------------------------

/// x positions for `n` side-by-side bars centred on an integer slot,
/// together with the bar width.
pub fn bar_offsets(n: usize) -> (Vec<f64>, f64) {
    if n == 0 {
        return (Vec::new(), 0.0);
    }
    let width = 0.8 / n as f64;
    let mid = (n as f64 - 1.0) / 2.0;
    let offsets = (0..n).map(|i| (i as f64 - mid) * width).collect();
    (offsets, width)
}

fn grouped_bars(ui: &mut Ui, id: &str, agg: &GroupAggregate, colors: &ClusterColors, y_label: &str) {
    let labels: Vec<&'static str> = agg.group.columns.iter().map(|m| m.label).collect();
    let clusters: Vec<&String> = agg.by_cluster.keys().collect();
    let (offsets, width) = bar_offsets(clusters.len());
    let melted = agg.melt();
    let n_slots = labels.len();

    let charts: Vec<BarChart> = clusters
        .iter()
        .zip(&offsets)
        .map(|(cluster, offset)| {
            let bars = melted
                .iter()
                .filter(|m| &m.cluster == *cluster)
                .filter_map(|m| {
                    let slot = labels.iter().position(|l| *l == m.label)?;
                    Some(
                        Bar::new(slot as f64 + offset, m.value)
                            .width(width)
                            .name(format!("{cluster} - {}", m.label)),
                    )
                })
                .collect();
            BarChart::new(bars)
                .name(cluster.as_str())
                .color(colors.color_for(cluster))
        })
        .collect();

    Plot::new(id)
        .legend(Legend::default())
        .height(420.0)
        .y_axis_label(y_label)
        .show_grid([false, true])
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let slot = mark.value.round();
            if (mark.value - slot).abs() < 1e-6 && slot >= 0.0 && (slot as usize) < labels.len() {
                labels[slot as usize].to_string()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
            for i in 1..n_slots {
                plot_ui.vline(
                    VLine::new(i as f64 - 0.5)
                        .color(Color32::LIGHT_GRAY)
                        .style(LineStyle::dashed_loose()),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Pies
// ---------------------------------------------------------------------------

/// Fraction of the total for each slice; negative values count as zero.
/// Empty when nothing is positive.
pub fn pie_shares(slices: &[Slice]) -> Vec<Slice> {
    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    slices
        .iter()
        .map(|s| Slice {
            value: s.value.max(0.0) / total,
            ..*s
        })
        .collect()
}

/// Palette entry for a slice, chosen by its column position.
pub fn slice_color(slice: &Slice, palette: &[Color32]) -> Color32 {
    if palette.is_empty() {
        return Color32::GRAY;
    }
    palette[slice.index % palette.len()]
}

fn pie(ui: &mut Ui, title: &str, slices: &[Slice], palette: &[Color32]) {
    ui.vertical(|ui: &mut Ui| {
        ui.set_width(PIE_SIZE);
        ui.label(RichText::new(title).strong());

        let shares = pie_shares(slices);
        if shares.is_empty() {
            ui.label("No data");
            return;
        }

        let (response, painter) = ui.allocate_painter(egui::vec2(PIE_SIZE, PIE_SIZE), Sense::hover());
        let center = response.rect.center();
        let radius = (PIE_SIZE * 0.45) as f64;
        let point = |angle: f64, r: f64| {
            Pos2::new(center.x + (r * angle.cos()) as f32, center.y + (r * angle.sin()) as f32)
        };

        let mut start = -FRAC_PI_2;
        for slice in &shares {
            let share = slice.value;
            let sweep = share * TAU;
            let fill = slice_color(slice, palette);

            let steps = (sweep / MAX_WEDGE).ceil().max(1.0) as usize;
            for s in 0..steps {
                let a0 = start + sweep * s as f64 / steps as f64;
                let a1 = start + sweep * (s + 1) as f64 / steps as f64;
                let mut wedge = vec![center];
                for k in 0..=8 {
                    wedge.push(point(a0 + (a1 - a0) * k as f64 / 8.0, radius));
                }
                painter.add(Shape::convex_polygon(wedge, fill, Stroke::NONE));
            }

            if share >= MIN_LABELLED_SHARE {
                painter.text(
                    point(start + sweep / 2.0, radius * 0.62),
                    Align2::CENTER_CENTER,
                    format!("{}\n{:.1}%", slice.label, share * 100.0),
                    FontId::proportional(12.0),
                    Color32::BLACK,
                );
            }
            start += sweep;
        }
    });
}
