use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::columns;
use crate::data::model::TeamSeasonRecord;

// ---------------------------------------------------------------------------
// Fixed palettes
// ---------------------------------------------------------------------------

/// Qualitative "Set2" palette used for playstyle clusters.
pub const SET2: &[&str] = &[
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];

/// 3PT / 2PT / FT slices.
pub const SHOT_TYPE_COLORS: &[&str] = &["#045a8d", "#238b45", "#fe9929"];
/// Purple gradient, center to point guard.
pub const OFF_REBOUND_COLORS: &[&str] = &["#54278f", "#756bb1", "#9e9ac8", "#bcbddc", "#dadaeb"];
/// Green gradient, center to point guard.
pub const DEF_REBOUND_COLORS: &[&str] = &["#00441b", "#1b7837", "#5aae61", "#a6dba0", "#d9f0d3"];

/// Parse `#rrggbb`. Malformed input renders gray.
pub fn hex(code: &str) -> Color32 {
    match Srgb::<u8>::from_str(code) {
        Ok(rgb) => Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        Err(e) => {
            log::warn!("bad color literal {code}: {e}");
            Color32::GRAY
        }
    }
}

/// Parse a whole fixed palette.
pub fn hex_palette(codes: &[&str]) -> Vec<Color32> {
    codes.iter().map(|c| hex(c)).collect()
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Cluster colours
// ---------------------------------------------------------------------------

/// Cluster label → colour, shared by every chart in the session.
/// Labels are taken in sorted order and indexed modulo the palette size.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterColors {
    mapping: BTreeMap<String, Color32>,
}

impl ClusterColors {
    pub fn new(clusters: &BTreeSet<String>) -> Self {
        let palette = hex_palette(SET2);
        let mapping = clusters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), palette[i % palette.len()]))
            .collect();
        ClusterColors { mapping }
    }

    pub fn color_for(&self, cluster: &str) -> Color32 {
        self.mapping.get(cluster).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Color-by dimension for the scatter plots
// ---------------------------------------------------------------------------

/// Which record attribute colours the scatter points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorDimension {
    #[default]
    Conference,
    Cluster,
    CoachChange,
}

impl ColorDimension {
    pub const ALL: [ColorDimension; 3] = [
        ColorDimension::Conference,
        ColorDimension::Cluster,
        ColorDimension::CoachChange,
    ];

    /// Column name shown in the selector.
    pub fn column(self) -> &'static str {
        match self {
            ColorDimension::Conference => columns::CONFERENCE,
            ColorDimension::Cluster => columns::CLUSTER,
            ColorDimension::CoachChange => columns::COACH_CHANGE,
        }
    }

    /// Legend group a record falls into.
    pub fn key(self, rec: &TeamSeasonRecord) -> String {
        match self {
            ColorDimension::Conference => rec.conference.clone(),
            ColorDimension::Cluster => rec.cluster.clone().unwrap_or_else(|| "<none>".into()),
            ColorDimension::CoachChange => match rec.coach_change {
                Some(true) => "1".into(),
                Some(false) => "0".into(),
                None => "<unknown>".into(),
            },
        }
    }
}

/// Maps legend groups of the chosen dimension to colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Clusters reuse the session cluster colours; other dimensions get
    /// evenly spaced hues over their sorted groups.
    pub fn new(dimension: ColorDimension, groups: &BTreeSet<String>, clusters: &ClusterColors) -> Self {
        let mapping: BTreeMap<String, Color32> = match dimension {
            ColorDimension::Cluster => groups
                .iter()
                .map(|g| (g.clone(), clusters.color_for(g)))
                .collect(),
            _ => groups
                .iter()
                .cloned()
                .zip(generate_palette(groups.len()))
                .collect(),
        };

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a legend group.
    pub fn color_for(&self, group: &str) -> Color32 {
        self.mapping.get(group).copied().unwrap_or(self.default_color)
    }

    /// Return the legend entries (group label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping.iter().map(|(v, c)| (v.clone(), *c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn hex_parses_palette_entries() {
        assert_eq!(hex("#66c2a5"), Color32::from_rgb(0x66, 0xc2, 0xa5));
        assert_eq!(hex("not a colour"), Color32::GRAY);
        assert_eq!(hex_palette(SET2).len(), 8);
    }

    #[test]
    fn cluster_colors_follow_sorted_order() {
        let colors = ClusterColors::new(&labels(&["Pace and Space", "Grind", "Inside Out"]));
        let set2 = hex_palette(SET2);
        assert_eq!(colors.color_for("Grind"), set2[0]);
        assert_eq!(colors.color_for("Inside Out"), set2[1]);
        assert_eq!(colors.color_for("Pace and Space"), set2[2]);
        assert_eq!(colors.color_for("unknown"), Color32::GRAY);
    }

    #[test]
    fn cluster_colors_wrap_and_are_deterministic() {
        let many: BTreeSet<String> = (0..10).map(|i| format!("c{i}")).collect();
        let a = ClusterColors::new(&many);
        let b = ClusterColors::new(&many);
        assert_eq!(a, b);
        assert_eq!(a.color_for("c8"), a.color_for("c0"));
    }

    #[test]
    fn color_map_reuses_cluster_colors() {
        let clusters = ClusterColors::new(&labels(&["Grind", "Inside Out"]));
        let map = ColorMap::new(ColorDimension::Cluster, &labels(&["Inside Out"]), &clusters);
        assert_eq!(map.color_for("Inside Out"), clusters.color_for("Inside Out"));
    }

    #[test]
    fn generated_palette_has_distinct_entries() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[2]);
        assert!(generate_palette(0).is_empty());
    }
}
