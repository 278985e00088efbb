use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Playstyle archetype: (name, tempo, three-point share, average height).
const PLAYSTYLES: &[(&str, f64, f64, f64)] = &[
    ("Pace and Space", 71.0, 0.38, 77.2),
    ("Inside Out", 65.5, 0.27, 78.3),
    ("Grind", 62.5, 0.31, 77.6),
    ("Balanced", 67.5, 0.33, 77.8),
];

const CONFERENCES: &[(&str, &[&str])] = &[
    ("big_ten", &["Purdue", "Illinois", "Michigan St.", "Wisconsin", "Iowa", "Indiana"]),
    ("acc", &["Duke", "North Carolina", "Virginia", "Clemson", "Miami FL"]),
    ("big_12", &["Houston", "Kansas", "Baylor", "Iowa St.", "Texas Tech"]),
    ("sec", &["Alabama", "Tennessee", "Auburn", "Kentucky", "Florida"]),
];

const SEASONS: &[i64] = &[2021, 2022, 2023, 2024];

const POSITIONS: &[&str] = &["Center", "PowerForward", "SmallForward", "ShootingGuard", "PointGuard"];

/// Numeric columns in output order, named as in the published source file.
struct NumericColumns {
    names: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl NumericColumns {
    fn new() -> Self {
        let mut names: Vec<String> = [
            "adjusted_tempo_rating",
            "adjusted_offensive_efficiency_rating",
            "adjusted_defensive_efficiency_rating",
            "three_point_share_offense",
            "two_point_share_offense",
            "ft_point_share_offense",
            "three_point_share_defense",
            "two_point_share_defense",
            "ft_point_share_defense",
            "win_pct",
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
            "avgHeightOnCourt_MinutesWeighted",
            "avgYearsOfExperience",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for suffix in ["Height", "OffensiveRebounds", "DefensiveRebounds", "Points"] {
            for pos in POSITIONS {
                names.push(format!("avg{pos}{suffix}"));
            }
        }
        let values = vec![Vec::new(); names.len()];
        NumericColumns { names, values }
    }

    fn push_row(&mut self, row: Vec<f64>) {
        for (col, v) in self.values.iter_mut().zip(row) {
            col.push(v);
        }
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut seasons: Vec<i64> = Vec::new();
    let mut teams: Vec<String> = Vec::new();
    let mut conferences: Vec<String> = Vec::new();
    let mut clusters: Vec<Option<String>> = Vec::new();
    let mut coach_change: Vec<i64> = Vec::new();
    let mut numeric = NumericColumns::new();

    for &season in SEASONS {
        for (conference, members) in CONFERENCES {
            for team in members.iter() {
                let (style, tempo, three_share, height) =
                    PLAYSTYLES[(rng.next_u64() % PLAYSTYLES.len() as u64) as usize];

                let tempo = rng.gauss(tempo, 1.5);
                let three = (three_share + rng.gauss(0.0, 0.02)).clamp(0.15, 0.5);
                let ft = (0.18 + rng.gauss(0.0, 0.015)).clamp(0.1, 0.25);
                let two = 1.0 - three - ft;
                let d_three = (0.33 + rng.gauss(0.0, 0.03)).clamp(0.15, 0.5);
                let d_ft = (0.18 + rng.gauss(0.0, 0.015)).clamp(0.1, 0.25);
                let off_eff = rng.gauss(112.0, 5.0);
                let def_eff = rng.gauss(98.0, 4.0);
                let win_pct = (0.5 + (off_eff - def_eff - 14.0) * 0.025).clamp(0.1, 0.95);
                let avg_height = rng.gauss(height, 0.5);

                let mut row = vec![
                    tempo,
                    off_eff,
                    def_eff,
                    three,
                    two,
                    ft,
                    d_three,
                    1.0 - d_three - d_ft,
                    d_ft,
                    win_pct,
                    rng.gauss(58.0 + (tempo - 67.0) * 0.8, 2.0),
                    rng.gauss(58.0 * three * 0.9, 1.5),
                    rng.gauss(19.0, 2.5),
                    rng.gauss(9.5, 1.5),
                    rng.gauss(24.5, 1.8),
                    rng.gauss(13.5, 1.6),
                    rng.gauss(11.5, 1.4),
                    rng.gauss(6.5, 1.2),
                    rng.gauss(3.5, 1.0),
                    rng.gauss(17.0, 1.6),
                    rng.gauss(18.0, 5.0),
                    avg_height,
                    rng.gauss(2.1, 0.4),
                ];
                let base_heights = [83.0, 81.0, 79.0, 76.5, 74.5];
                for h in base_heights {
                    row.push(rng.gauss(h + (avg_height - 77.8), 0.8));
                }
                for orb in [2.4, 2.0, 1.5, 1.0, 0.7] {
                    row.push(rng.gauss(orb, 0.3).max(0.0));
                }
                for drb in [5.5, 4.8, 3.9, 3.1, 2.6] {
                    row.push(rng.gauss(drb, 0.5).max(0.0));
                }
                for pts in [12.5, 11.0, 13.0, 12.0, 12.5] {
                    row.push(rng.gauss(pts, 2.0).max(0.0));
                }
                numeric.push_row(row);

                seasons.push(season);
                teams.push(team.to_string());
                conferences.push(conference.to_string());
                // A few team-seasons have no cluster assignment.
                clusters.push((rng.next_f64() > 0.05).then(|| style.to_string()));
                coach_change.push(i64::from(rng.next_f64() < 0.15));
            }
        }
    }

    // Build Arrow arrays
    let mut fields = vec![
        Field::new("season", DataType::Int64, false),
        Field::new("team_name", DataType::Utf8, false),
        Field::new("conference", DataType::Utf8, false),
    ];
    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(seasons.clone())),
        Arc::new(StringArray::from(teams.clone())),
        Arc::new(StringArray::from(conferences.clone())),
    ];
    for (name, values) in numeric.names.iter().zip(&numeric.values) {
        fields.push(Field::new(name.as_str(), DataType::Float64, false));
        arrays.push(Arc::new(Float64Array::from(values.clone())));
    }
    fields.push(Field::new("playstyle_name", DataType::Utf8, true));
    arrays.push(Arc::new(StringArray::from(clusters.clone())));
    fields.push(Field::new("CoachChange", DataType::Int64, false));
    arrays.push(Arc::new(Int64Array::from(coach_change.clone())));

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    // Write Parquet
    let parquet_path = "sample_team_seasons.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema.clone(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    // Write CSV with the same columns
    let csv_path = "sample_team_seasons.csv";
    let mut csv_writer = csv::Writer::from_path(csv_path).context("creating CSV output")?;
    let header: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    csv_writer.write_record(&header)?;
    for i in 0..seasons.len() {
        let mut record = vec![seasons[i].to_string(), teams[i].clone(), conferences[i].clone()];
        record.extend(numeric.values.iter().map(|col| format!("{:.4}", col[i])));
        record.push(clusters[i].clone().unwrap_or_default());
        record.push(coach_change[i].to_string());
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;

    println!(
        "Wrote {} team-seasons ({} columns) to {parquet_path} and {csv_path}",
        seasons.len(),
        header.len()
    );
    Ok(())
}
