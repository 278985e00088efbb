use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use thiserror::Error;

use super::columns;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the team-season table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes of the source CSV.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Guess the type of a raw text cell. Empty text is `Null`.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            // pandas writes missing floats as NaN when not told otherwise
            if f.is_nan() {
                return CellValue::Null;
            }
            return CellValue::Float(f);
        }
        match s {
            "true" | "True" | "TRUE" => CellValue::Bool(true),
            "false" | "False" | "FALSE" => CellValue::Bool(false),
            _ => CellValue::String(s.to_string()),
        }
    }

    /// Try to interpret the value as an `f64` for means and plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integral view; floats with no fractional part count (`2023.0`).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text view used for the key columns. Numbers are rendered verbatim.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::String(s) => Some(s.clone()),
            CellValue::Integer(i) => Some(i.to_string()),
            CellValue::Float(v) => Some(v.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Null => None,
        }
    }

    /// Interpret the cell as a yes/no flag (`1/0`, `true/false`, `yes/no`).
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Integer(1) => Some(true),
            CellValue::Integer(0) => Some(false),
            CellValue::Float(v) if *v == 1.0 => Some(true),
            CellValue::Float(v) if *v == 0.0 => Some(false),
            CellValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "yes" | "y" | "true" | "1" => Some(true),
                "no" | "n" | "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Render for CSV output: full precision, empty for null. Written so
    /// that [`CellValue::parse`] reads back the same variant: whole floats
    /// keep a `.0` and bools use pandas' `True`/`False`.
    pub fn to_csv_field(&self) -> String {
        match self {
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => format!("{v:.1}"),
            CellValue::Float(v) => v.to_string(),
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
            CellValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Structural problems found while building a [`TeamSeasonTable`].
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),

    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("row {row}: expected {expected} cells, found {found}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: invalid {column} value '{value}'")]
    InvalidKey {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("duplicate record for team '{team}' in season {season}")]
    DuplicateRecord { team: String, season: i64 },
}

// ---------------------------------------------------------------------------
// TeamSeasonRecord – one row of the table
// ---------------------------------------------------------------------------

/// One (team, season) row. Key fields are extracted once; every source
/// column stays available in `cells`, aligned with the table's column list.
#[derive(Debug, Clone)]
pub struct TeamSeasonRecord {
    pub season: i64,
    pub team: String,
    pub conference: String,
    /// Playstyle cluster label, `None` when the source cell is empty.
    pub cluster: Option<String>,
    /// Coach-change flag, `None` when missing or unreadable.
    pub coach_change: Option<bool>,
    pub cells: Vec<CellValue>,
}

// ---------------------------------------------------------------------------
// Catalog – distinct values used to populate the filter widgets
// ---------------------------------------------------------------------------

/// Sorted distinct key values plus the conference → teams index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub seasons: BTreeSet<i64>,
    pub conferences: BTreeSet<String>,
    pub teams: BTreeSet<String>,
    /// Non-null cluster labels only.
    pub clusters: BTreeSet<String>,
    pub conference_teams: BTreeMap<String, BTreeSet<String>>,
}

impl Catalog {
    fn from_records(records: &[TeamSeasonRecord]) -> Self {
        let mut catalog = Catalog::default();
        for rec in records {
            catalog.seasons.insert(rec.season);
            catalog.conferences.insert(rec.conference.clone());
            catalog.teams.insert(rec.team.clone());
            if let Some(cluster) = &rec.cluster {
                catalog.clusters.insert(cluster.clone());
            }
            catalog
                .conference_teams
                .entry(rec.conference.clone())
                .or_default()
                .insert(rec.team.clone());
        }
        catalog
    }

    /// Union of the teams that ever played in any of `conferences`.
    pub fn teams_in<'a, I>(&self, conferences: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        conferences
            .into_iter()
            .filter_map(|conf| self.conference_teams.get(conf))
            .flatten()
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// TeamSeasonTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The normalized table. Read-only once built.
#[derive(Debug, Clone)]
pub struct TeamSeasonTable {
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    records: Vec<TeamSeasonRecord>,
    catalog: Catalog,
}

impl TeamSeasonTable {
    /// Build the table from already-normalized column names and raw rows.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, TableError> {
        let mut column_index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if column_index.insert(name.clone(), i).is_some() {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }

        let require = |name: &'static str| {
            column_index
                .get(name)
                .copied()
                .ok_or(TableError::MissingColumn(name))
        };
        let season_idx = require(columns::SEASON)?;
        let team_idx = require(columns::TEAM)?;
        let conference_idx = require(columns::CONFERENCE)?;
        let cluster_idx = column_index.get(columns::CLUSTER).copied();
        let coach_idx = column_index.get(columns::COACH_CHANGE).copied();

        let mut seen: BTreeSet<(String, i64)> = BTreeSet::new();
        let mut records = Vec::with_capacity(rows.len());

        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(TableError::RowWidth {
                    row,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }

            let season = cells[season_idx]
                .as_i64()
                .ok_or_else(|| TableError::InvalidKey {
                    row,
                    column: columns::SEASON,
                    value: cells[season_idx].to_string(),
                })?;
            let team = key_text(&cells[team_idx], row, columns::TEAM)?;
            let conference = key_text(&cells[conference_idx], row, columns::CONFERENCE)?;
            let cluster = cluster_idx
                .and_then(|i| cells[i].as_text())
                .filter(|c| !c.trim().is_empty());
            let coach_change = coach_idx.and_then(|i| cells[i].as_flag());

            if !seen.insert((team.clone(), season)) {
                return Err(TableError::DuplicateRecord { team, season });
            }

            records.push(TeamSeasonRecord {
                season,
                team,
                conference,
                cluster,
                coach_change,
                cells,
            });
        }

        let catalog = Catalog::from_records(&records);
        Ok(TeamSeasonTable {
            columns,
            column_index,
            records,
            catalog,
        })
    }

    /// Column names in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    pub fn records(&self) -> &[TeamSeasonRecord] {
        &self.records
    }

    pub fn record(&self, row: usize) -> &TeamSeasonRecord {
        &self.records[row]
    }

    /// Cell at `row` for the named column.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.records.get(row).map(|r| &r.cells[col])
    }

    /// Numeric cell at `row`, `None` for missing columns and non-numeric cells.
    pub fn numeric(&self, row: usize, column: &str) -> Option<f64> {
        self.value(row, column).and_then(CellValue::as_f64)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Number of team-seasons.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn key_text(cell: &CellValue, row: usize, column: &'static str) -> Result<String, TableError> {
    cell.as_text()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TableError::InvalidKey {
            row,
            column,
            value: cell.to_string(),
        })
}
