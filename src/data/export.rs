use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::TeamSeasonTable;

/// Default file name offered by the save dialog.
pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";

/// Write the given rows as CSV: every table column in table order, header
/// row first.
pub fn write_csv<W: Write>(table: &TeamSeasonTable, rows: &[usize], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(table.columns())
        .context("writing CSV header")?;
    for &row in rows {
        let rec = table.record(row);
        writer
            .write_record(rec.cells.iter().map(|c| c.to_csv_field()))
            .with_context(|| format!("writing CSV row for {} {}", rec.team, rec.season))?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

/// Export to a file on disk.
pub fn export_to_path(table: &TeamSeasonTable, rows: &[usize], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(table, rows, std::io::BufWriter::new(file))?;
    log::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}
