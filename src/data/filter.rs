use std::collections::BTreeSet;
use std::fmt;

use super::model::{Catalog, TeamSeasonRecord, TeamSeasonTable};

// ---------------------------------------------------------------------------
// Coach-change tri-state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoachChange {
    #[default]
    Any,
    Yes,
    No,
}

impl CoachChange {
    pub const ALL: [CoachChange; 3] = [CoachChange::Any, CoachChange::Yes, CoachChange::No];

    /// Strict equality on the flag once the filter is constrained.
    /// Records with an unknown flag only pass `Any`.
    pub fn matches(self, flag: Option<bool>) -> bool {
        match self {
            CoachChange::Any => true,
            CoachChange::Yes => flag == Some(true),
            CoachChange::No => flag == Some(false),
        }
    }
}

impl fmt::Display for CoachChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoachChange::Any => write!(f, "All"),
            CoachChange::Yes => write!(f, "Yes"),
            CoachChange::No => write!(f, "No"),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria – the effective predicate
// ---------------------------------------------------------------------------

/// Effective selection handed to the filter engine.
/// Empty sets select nothing; there is no implicit "all".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub seasons: BTreeSet<i64>,
    pub conferences: BTreeSet<String>,
    pub teams: BTreeSet<String>,
    pub coach_change: CoachChange,
    pub active_clusters: BTreeSet<String>,
}

impl FilterCriteria {
    /// Season/conference/team/coach-change predicate (no cluster restriction).
    pub fn admits(&self, rec: &TeamSeasonRecord) -> bool {
        self.seasons.contains(&rec.season)
            && self.conferences.contains(&rec.conference)
            && self.teams.contains(&rec.team)
            && self.coach_change.matches(rec.coach_change)
    }

    /// Whether the record belongs to an active cluster. Null clusters never do.
    pub fn admits_cluster(&self, rec: &TeamSeasonRecord) -> bool {
        rec.cluster
            .as_ref()
            .is_some_and(|c| self.active_clusters.contains(c))
    }
}

// ---------------------------------------------------------------------------
// Filtered views
// ---------------------------------------------------------------------------

/// Row indices into the table for both filter stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    /// Rows passing season/conference/team/coach-change. Drives KPIs,
    /// scatters, the preview table and the export.
    pub rows: Vec<usize>,
    /// Subset of `rows` whose cluster is active. Drives the cluster insights.
    pub cluster_rows: Vec<usize>,
}

/// Return indices of records that pass the base criteria.
pub fn filtered_indices(table: &TeamSeasonTable, criteria: &FilterCriteria) -> Vec<usize> {
    table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.admits(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Apply both filter stages.
pub fn apply(table: &TeamSeasonTable, criteria: &FilterCriteria) -> FilteredView {
    let rows = filtered_indices(table, criteria);
    let cluster_rows = rows
        .iter()
        .copied()
        .filter(|&i| criteria.admits_cluster(table.record(i)))
        .collect();
    FilteredView { rows, cluster_rows }
}

// ---------------------------------------------------------------------------
// FilterState – what the widgets hold
// ---------------------------------------------------------------------------

/// UI-level selection. [`FilterState::criteria`] derives the effective
/// [`FilterCriteria`]; [`reconcile`] is the only way it changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub seasons: BTreeSet<i64>,
    pub conferences: BTreeSet<String>,
    /// Manual selection among teams of the selected conferences.
    pub teams: BTreeSet<String>,
    /// When set, every team of the selected conferences is used instead of `teams`.
    pub all_conference_teams: bool,
    /// Teams added from any conference.
    pub extra_teams: BTreeSet<String>,
    pub coach_change: CoachChange,
    pub active_clusters: BTreeSet<String>,
}

impl FilterState {
    /// Start-up selection: every season, the default conferences (all of them
    /// when none of the defaults exist in the data), their teams, every cluster.
    pub fn initial(catalog: &Catalog, default_conferences: &[String]) -> Self {
        let mut conferences: BTreeSet<String> = default_conferences
            .iter()
            .filter(|c| catalog.conferences.contains(*c))
            .cloned()
            .collect();
        if conferences.is_empty() {
            conferences = catalog.conferences.clone();
        }
        let teams = catalog.teams_in(&conferences);
        FilterState {
            seasons: catalog.seasons.clone(),
            conferences,
            teams,
            all_conference_teams: false,
            extra_teams: BTreeSet::new(),
            coach_change: CoachChange::Any,
            active_clusters: catalog.clusters.clone(),
        }
    }

    /// Teams offered by the team multi-select.
    pub fn teams_in_selected_conferences(&self, catalog: &Catalog) -> BTreeSet<String> {
        catalog.teams_in(&self.conferences)
    }

    /// Effective team set: conference-scoped selection ∪ extra teams.
    pub fn effective_teams(&self, catalog: &Catalog) -> BTreeSet<String> {
        let mut teams = if self.all_conference_teams {
            self.teams_in_selected_conferences(catalog)
        } else {
            self.teams.clone()
        };
        teams.extend(self.extra_teams.iter().cloned());
        teams
    }

    pub fn criteria(&self, catalog: &Catalog) -> FilterCriteria {
        FilterCriteria {
            seasons: self.seasons.clone(),
            conferences: self.conferences.clone(),
            teams: self.effective_teams(catalog),
            coach_change: self.coach_change,
            active_clusters: self.active_clusters.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// One user interaction with the filter widgets.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterAction {
    SetSeasons(BTreeSet<i64>),
    ToggleSeason(i64),
    SetConferences(BTreeSet<String>),
    ToggleConference(String),
    SetTeams(BTreeSet<String>),
    ToggleTeam(String),
    SetAllConferenceTeams(bool),
    ToggleExtraTeam(String),
    ClearExtraTeams,
    SetCoachChange(CoachChange),
    ToggleCluster(String),
    SetClusters(BTreeSet<String>),
}

/// Pure transition: `next = reconcile(prev, action)`.
///
/// Conference changes cascade into the team selection: teams of newly added
/// conferences are unioned in. Removing a conference leaves the team
/// selection untouched.
pub fn reconcile(prev: &FilterState, action: FilterAction, catalog: &Catalog) -> FilterState {
    let mut next = prev.clone();
    match action {
        FilterAction::SetSeasons(seasons) => next.seasons = seasons,
        FilterAction::ToggleSeason(season) => toggle(&mut next.seasons, season),
        FilterAction::SetConferences(conferences) => next.conferences = conferences,
        FilterAction::ToggleConference(conf) => toggle(&mut next.conferences, conf),
        FilterAction::SetTeams(teams) => next.teams = teams,
        FilterAction::ToggleTeam(team) => toggle(&mut next.teams, team),
        FilterAction::SetAllConferenceTeams(on) => next.all_conference_teams = on,
        FilterAction::ToggleExtraTeam(team) => toggle(&mut next.extra_teams, team),
        FilterAction::ClearExtraTeams => next.extra_teams.clear(),
        FilterAction::SetCoachChange(cc) => next.coach_change = cc,
        FilterAction::ToggleCluster(cluster) => toggle(&mut next.active_clusters, cluster),
        FilterAction::SetClusters(clusters) => next.active_clusters = clusters,
    }

    let added: Vec<&String> = next.conferences.difference(&prev.conferences).collect();
    if !added.is_empty() {
        let new_teams = catalog.teams_in(added);
        log::debug!("conference cascade adds {} teams", new_teams.len());
        next.teams.extend(new_teams);
    }
    next
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::fixture_table;

    fn set<T: Ord + Clone>(items: &[T]) -> BTreeSet<T> {
        items.iter().cloned().collect()
    }

    fn strings(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn everything(table: &TeamSeasonTable) -> FilterCriteria {
        let c = table.catalog();
        FilterCriteria {
            seasons: c.seasons.clone(),
            conferences: c.conferences.clone(),
            teams: c.teams.clone(),
            coach_change: CoachChange::Any,
            active_clusters: c.clusters.clone(),
        }
    }

    #[test]
    fn every_filtered_row_satisfies_the_predicate() {
        let table = fixture_table();
        let criteria = FilterCriteria {
            seasons: set(&[2023]),
            conferences: strings(&["big_ten", "acc"]),
            teams: strings(&["Purdue", "Duke", "Virginia"]),
            coach_change: CoachChange::No,
            active_clusters: BTreeSet::new(),
        };
        let rows = filtered_indices(&table, &criteria);
        let teams: Vec<&str> = rows.iter().map(|&i| table.record(i).team.as_str()).collect();
        assert_eq!(teams, vec!["Purdue", "Virginia"]);
        for &i in &rows {
            let rec = table.record(i);
            assert_eq!(rec.season, 2023);
            assert_eq!(rec.coach_change, Some(false));
        }
    }

    #[test]
    fn empty_selection_yields_empty_result() {
        let table = fixture_table();
        let mut criteria = everything(&table);
        criteria.teams.clear();
        assert!(apply(&table, &criteria).rows.is_empty());

        let mut criteria = everything(&table);
        criteria.seasons.clear();
        assert!(apply(&table, &criteria).rows.is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let table = fixture_table();
        let mut criteria = everything(&table);
        criteria.seasons = set(&[2023]);
        let once = filtered_indices(&table, &criteria);
        let twice: Vec<usize> = once
            .iter()
            .copied()
            .filter(|&i| criteria.admits(table.record(i)))
            .collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn cluster_toggles_only_restrict_the_cluster_view() {
        let table = fixture_table();
        let mut criteria = everything(&table);
        let all = apply(&table, &criteria);
        // Duke 2023 has no cluster: in rows, not in cluster_rows.
        assert_eq!(all.rows.len(), 6);
        assert_eq!(all.cluster_rows.len(), 5);

        criteria.active_clusters = strings(&["Grind"]);
        let narrowed = apply(&table, &criteria);
        assert_eq!(narrowed.rows, all.rows);
        assert_eq!(narrowed.cluster_rows.len(), 1);
        assert!(narrowed.cluster_rows.iter().all(|i| narrowed.rows.contains(i)));
    }

    #[test]
    fn unknown_coach_flag_only_passes_any() {
        assert!(CoachChange::Any.matches(None));
        assert!(!CoachChange::Yes.matches(None));
        assert!(!CoachChange::No.matches(None));
    }

    #[test]
    fn initial_state_selects_default_conference_teams() {
        let table = fixture_table();
        let state = FilterState::initial(table.catalog(), &["big_ten".to_string()]);
        assert_eq!(state.conferences, strings(&["big_ten"]));
        assert_eq!(state.teams, strings(&["Illinois", "Purdue"]));
        assert_eq!(state.seasons, set(&[2022, 2023]));

        let fallback = FilterState::initial(table.catalog(), &["sec".to_string()]);
        assert_eq!(fallback.conferences, strings(&["acc", "big_ten"]));
    }

    #[test]
    fn adding_a_conference_unions_its_teams() {
        let table = fixture_table();
        let catalog = table.catalog();
        let mut state = FilterState::initial(catalog, &["big_ten".to_string()]);
        state = reconcile(&state, FilterAction::ToggleTeam("Illinois".into()), catalog);
        assert_eq!(state.teams, strings(&["Purdue"]));

        let next = reconcile(&state, FilterAction::ToggleConference("acc".into()), catalog);
        // Manual deselection of Illinois survives; acc teams are added.
        assert_eq!(next.teams, strings(&["Duke", "Purdue", "Virginia"]));
        assert!(state.teams.is_subset(&next.teams));
    }

    #[test]
    fn removing_a_conference_keeps_its_teams() {
        let table = fixture_table();
        let catalog = table.catalog();
        let state = FilterState::initial(catalog, &["big_ten".to_string(), "acc".to_string()]);
        let next = reconcile(&state, FilterAction::SetConferences(strings(&["acc"])), catalog);
        assert_eq!(next.conferences, strings(&["acc"]));
        assert_eq!(next.teams, state.teams);
        // ...but the conference predicate still drops the big_ten rows.
        let view = apply(&table, &next.criteria(catalog));
        assert!(view.rows.iter().all(|&i| table.record(i).conference == "acc"));
    }

    #[test]
    fn non_conference_actions_never_cascade() {
        let table = fixture_table();
        let catalog = table.catalog();
        let state = FilterState::initial(catalog, &["big_ten".to_string()]);
        let next = reconcile(&state, FilterAction::SetTeams(BTreeSet::new()), catalog);
        assert!(next.teams.is_empty());
        let next = reconcile(&next, FilterAction::SetCoachChange(CoachChange::Yes), catalog);
        assert!(next.teams.is_empty());
    }

    #[test]
    fn extra_teams_still_need_a_selected_conference() {
        let table = fixture_table();
        let catalog = table.catalog();
        let state = FilterState::initial(catalog, &["big_ten".to_string()]);
        let state = reconcile(&state, FilterAction::ToggleExtraTeam("Duke".into()), catalog);
        let criteria = state.criteria(catalog);
        assert!(criteria.teams.contains("Duke"));
        let view = apply(&table, &criteria);
        assert!(view.rows.iter().all(|&i| table.record(i).team != "Duke"));
    }

    #[test]
    fn select_all_teams_overrides_manual_selection() {
        let table = fixture_table();
        let catalog = table.catalog();
        let state = FilterState::initial(catalog, &["acc".to_string()]);
        let state = reconcile(&state, FilterAction::SetTeams(BTreeSet::new()), catalog);
        assert!(state.effective_teams(catalog).is_empty());
        let state = reconcile(&state, FilterAction::SetAllConferenceTeams(true), catalog);
        assert_eq!(state.effective_teams(catalog), strings(&["Duke", "Virginia"]));
    }
}
