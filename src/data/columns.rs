//! Display-facing column names and the raw → display rename table.

pub const SEASON: &str = "Season";
pub const TEAM: &str = "Team";
pub const CONFERENCE: &str = "Conference";
pub const TEMPO: &str = "Tempo";
pub const CLUSTER: &str = "Playstyle_Cluster";
pub const AVG_HEIGHT: &str = "AvgHeight";
pub const COACH_CHANGE: &str = "CoachChange";
pub const WIN_PCT: &str = "win_pct";
pub const OFF_EFF: &str = "OffEff";
pub const DEF_EFF: &str = "DefEff";

/// Raw source identifier → display name. Applied once, at load time.
/// Columns not listed keep their source name.
pub const RENAME_MAP: &[(&str, &str)] = &[
    ("season", SEASON),
    ("team_name", TEAM),
    ("conference", CONFERENCE),
    ("adjusted_tempo_rating", TEMPO),
    ("adjusted_offensive_efficiency_rating", OFF_EFF),
    ("adjusted_defensive_efficiency_rating", DEF_EFF),
    ("three_point_share_offense", "O3PT_Share"),
    ("two_point_share_offense", "O2PT_Share"),
    ("ft_point_share_offense", "OFT_Share"),
    ("three_point_share_defense", "D3PT_Share"),
    ("two_point_share_defense", "D2PT_Share"),
    ("ft_point_share_defense", "DFT_Share"),
    ("playstyle_name", CLUSTER),
    ("avgHeightOnCourt_MinutesWeighted", AVG_HEIGHT),
    ("three_point_share_offense_rank", "O3PT_Share_rank"),
    ("two_point_share_offense_rank", "O2PT_Share_rank"),
    ("ft_point_share_offense_rank", "OFT_Share_rank"),
    ("three_point_share_defense_rank", "D3PT_Share_rank"),
    ("two_point_share_defense_rank", "D2PT_Share_rank"),
    ("ft_point_share_defense_rank", "DFT_Share_rank"),
];

/// Display name for a single raw column identifier.
pub fn display_name(raw: &str) -> &str {
    let raw = raw.trim();
    RENAME_MAP
        .iter()
        .find(|(from, _)| *from == raw)
        .map(|(_, to)| *to)
        .unwrap_or(raw)
}

/// Rename a full header row.
pub fn normalize(headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| display_name(h).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Axis choices offered by the chart selectors
// ---------------------------------------------------------------------------

/// Y-axis choices for the "Tempo vs Game Stats" scatter.
pub const GAME_STAT_OPTIONS: &[&str] = &[
    WIN_PCT,
    OFF_EFF,
    DEF_EFF,
    "O3PT_Share",
    "O2PT_Share",
    "OFT_Share",
    "D3PT_Share",
    "D2PT_Share",
    "DFT_Share",
    "avg_fga",
    "avg_fga3",
    "avg_fta",
    "avg_orb",
    "avg_drb",
    "avg_ast",
    "avg_to",
    "avg_stl",
    "avg_blk",
    "avg_pf",
    "avgBenchPoints",
];

/// X-axis choices for the two roster scatters.
pub const ROSTER_OPTIONS: &[&str] = &[
    AVG_HEIGHT,
    "avgCenterHeight",
    "avgPowerForwardHeight",
    "avgSmallForwardHeight",
    "avgShootingGuardHeight",
    "avgPointGuardHeight",
    "avgYearsOfExperience",
];

/// Extra fields shown when hovering a point, per scatter.
pub const TEMPO_STATS_HOVER: &[&str] = &[WIN_PCT, OFF_EFF, DEF_EFF, "avg_orb", "avg_ast"];
pub const ROSTER_TEMPO_HOVER: &[&str] = &[WIN_PCT, OFF_EFF, DEF_EFF];
pub const ROSTER_WIN_HOVER: &[&str] = &[TEMPO, OFF_EFF, DEF_EFF];
