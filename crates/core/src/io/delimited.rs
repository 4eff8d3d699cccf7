//! CSV codec.
//!
//! Used for any path when no workbook library is compiled in, so a file
//! named `TB_US_202501.xlsx` may well hold CSV text.

use std::path::Path;

use super::error::TableError;
use super::store::TableCodec;
use super::table::Table;

/// Comma-separated text with a header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedCodec;

impl TableCodec for DelimitedCodec {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn read(&self, path: &Path) -> Result<Table, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| TableError::delimited(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| TableError::delimited(path, e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect::<Vec<_>>();
        let mut table = Table::new(headers);

        for record in reader.records() {
            let record = record.map_err(|e| TableError::delimited(path, e))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            table.push_row(record.iter().map(str::to_string).collect());
        }

        Ok(table)
    }

    fn write(&self, table: &Table, path: &Path) -> Result<(), TableError> {
        if table.columns().is_empty() {
            return std::fs::write(path, b"").map_err(|e| TableError::io(path, e));
        }

        let mut writer = csv::Writer::from_path(path).map_err(|e| TableError::delimited(path, e))?;
        writer
            .write_record(table.columns())
            .map_err(|e| TableError::delimited(path, e))?;
        for row in table.rows() {
            writer
                .write_record(row)
                .map_err(|e| TableError::delimited(path, e))?;
        }
        writer.flush().map_err(|e| TableError::io(path, e))?;
        Ok(())
    }
}
