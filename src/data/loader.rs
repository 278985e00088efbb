use std::io::Read;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::columns;
use super::model::{CellValue, TeamSeasonTable};
use crate::config::{DashboardConfig, DataSource};

// ---------------------------------------------------------------------------
// Process-wide cache
// ---------------------------------------------------------------------------

static TABLE: OnceLock<Arc<TeamSeasonTable>> = OnceLock::new();

/// Load the configured source once per process; later calls return the
/// cached table without touching the source again.
pub fn load_cached(config: &DashboardConfig) -> Result<Arc<TeamSeasonTable>> {
    if let Some(table) = TABLE.get() {
        return Ok(Arc::clone(table));
    }
    let table = Arc::new(load_source(config)?);
    // A concurrent first load would have produced the same table.
    Ok(Arc::clone(TABLE.get_or_init(|| table)))
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and normalize the team-season table from the configured source.
pub fn load_source(config: &DashboardConfig) -> Result<TeamSeasonTable> {
    let raw = match &config.source {
        DataSource::Url(url) => fetch_csv(url, config)?,
        DataSource::Path(path) => read_file(path)?,
    };
    log::info!(
        "Read {} rows x {} columns from {}",
        raw.rows.len(),
        raw.headers.len(),
        config.source
    );
    raw.into_table()
}

/// Header row and typed cells as found in the source, before renaming.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Apply the column rename table and build the validated table.
    pub fn into_table(self) -> Result<TeamSeasonTable> {
        let columns = columns::normalize(&self.headers);
        TeamSeasonTable::from_rows(columns, self.rows).context("building team-season table")
    }
}

// ---------------------------------------------------------------------------
// Remote CSV
// ---------------------------------------------------------------------------

fn fetch_csv(url: &str, config: &DashboardConfig) -> Result<RawTable> {
    log::info!("Fetching {url}");
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("tempo-dash/", env!("CARGO_PKG_VERSION")))
        .timeout(config.http_timeout)
        .build()
        .context("building http client")?;
    let body = client
        .get(url)
        .send()
        .with_context(|| format!("request {url}"))?
        .error_for_status()
        .with_context(|| format!("status for {url}"))?
        .bytes()
        .with_context(|| format!("reading body of {url}"))?;
    read_csv(body.as_ref())
}

// ---------------------------------------------------------------------------
// Local files
// ---------------------------------------------------------------------------

/// Read a local file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one team-season per line
/// * `.json`    – `[{ "season": 2023, "team_name": "...", ... }, ...]`
///   or `{ "columns": [...], "data": [[...], ...] }`
/// * `.parquet` – flat columns (strings, ints, floats, bools)
pub fn read_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            read_csv(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            read_json(&text)
        }
        "parquet" | "pq" => read_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// CSV layout: header row with raw column names, every cell type-guessed.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(CellValue::parse).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// The two pandas `to_json` layouts the loader understands.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonTable {
    /// `orient='records'`: one object per team-season.
    Records(Vec<serde_json::Map<String, JsonValue>>),
    /// `orient='split'`: a header plus row arrays.
    Split {
        columns: Vec<String>,
        data: Vec<Vec<JsonValue>>,
    },
}

/// Records columns are taken in first-seen order; keys missing from a
/// record become null cells.
pub fn read_json(text: &str) -> Result<RawTable> {
    let parsed: JsonTable = serde_json::from_str(text)
        .context("Expected a JSON array of records or a {columns, data} object")?;

    match parsed {
        JsonTable::Records(records) => {
            let mut headers: Vec<String> = Vec::new();
            for key in records.iter().flat_map(|obj| obj.keys()) {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
            let rows: Vec<Vec<CellValue>> = records
                .iter()
                .map(|obj| {
                    headers
                        .iter()
                        .map(|h| obj.get(h).map_or(CellValue::Null, json_to_cell))
                        .collect::<Vec<_>>()
                })
                .collect();
            Ok(RawTable { headers, rows })
        }
        JsonTable::Split { columns, data } => {
            let rows: Vec<Vec<CellValue>> = data
                .iter()
                .map(|row| row.iter().map(json_to_cell).collect::<Vec<_>>())
                .collect();
            Ok(RawTable { headers: columns, rows })
        }
    }
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::parse(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Flat Parquet file as written by `df.to_parquet()` or the sample generator.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(batch.columns().iter().map(|col| extract_cell(col, row)).collect());
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let cell = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| CellValue::parse(a.value(row))),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| CellValue::parse(a.value(row))),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| CellValue::Bool(a.value(row))),
        other => {
            log::warn!("Unsupported parquet column type {other:?}; cell read as null");
            None
        }
    };
    cell.unwrap_or(CellValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_CSV: &str = "\
season,team_name,conference,adjusted_tempo_rating,playstyle_name,CoachChange,three_point_share_offense_rank
2023,Purdue,big_ten,64.1,Inside Out,0,12
2023,Duke,acc,68.3,,1,40
";

    #[test]
    fn csv_is_normalized_on_load() {
        let table = read_csv(RAW_CSV.as_bytes()).unwrap().into_table().unwrap();
        assert_eq!(
            table.columns(),
            &["Season", "Team", "Conference", "Tempo", "Playstyle_Cluster", "CoachChange", "O3PT_Share_rank"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.numeric(1, "Tempo"), Some(68.3));
        assert_eq!(table.record(0).cluster.as_deref(), Some("Inside Out"));
        assert_eq!(table.record(1).cluster, None);
        assert_eq!(table.record(1).coach_change, Some(true));
    }

    #[test]
    fn json_records_fill_missing_keys_with_null() {
        let text = r#"[
            {"season": 2023, "team_name": "Purdue", "conference": "big_ten", "win_pct": 0.85},
            {"season": 2023, "team_name": "Duke", "conference": "acc"}
        ]"#;
        let raw = read_json(text).unwrap();
        assert_eq!(raw.rows[1].len(), raw.headers.len());
        let table = raw.into_table().unwrap();
        assert_eq!(table.numeric(0, "win_pct"), Some(0.85));
        assert_eq!(table.value(1, "win_pct"), Some(&CellValue::Null));
    }

    #[test]
    fn json_split_layout_is_accepted() {
        let text = r#"{
            "columns": ["season", "team_name", "conference", "adjusted_tempo_rating"],
            "data": [[2023, "Purdue", "big_ten", 66.5], [2022, "Purdue", "big_ten", null]]
        }"#;
        let table = read_json(text).unwrap().into_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.numeric(0, "Tempo"), Some(66.5));
        assert_eq!(table.value(1, "Tempo"), Some(&CellValue::Null));
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(read_json("{}").is_err());
        assert!(read_json("[1, 2]").is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = read_file(Path::new("teams.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn missing_key_column_fails_the_load() {
        let raw = read_csv("season,conference\n2023,acc\n".as_bytes()).unwrap();
        assert!(raw.into_table().is_err());
    }

    #[test]
    fn ragged_csv_rows_fail_the_load() {
        assert!(read_csv("season,team_name,conference\n2023,Duke\n".as_bytes()).is_err());
    }

    // The only test that touches the process-wide cache.
    #[test]
    fn cached_table_outlives_its_source_file() {
        let path = std::env::temp_dir().join(format!("tempo-dash-cache-{}.csv", std::process::id()));
        std::fs::write(&path, RAW_CSV).unwrap();
        let config = DashboardConfig {
            source: DataSource::Path(path.clone()),
            ..DashboardConfig::default()
        };

        let first = load_cached(&config).unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = load_cached(&config).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
        assert!(load_source(&config).is_err());
    }
}
