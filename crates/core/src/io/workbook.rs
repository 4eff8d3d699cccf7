//! Excel workbook codec (`xlsx` feature).
//!
//! Reads the first worksheet with calamine and writes a single-sheet
//! workbook with rust_xlsxwriter. Paths ending in `.csv`, and files that are
//! not zip containers, are delegated to the CSV codec so mixed folders keep
//! working.

use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::Workbook;

use super::delimited::DelimitedCodec;
use super::error::TableError;
use super::store::TableCodec;
use super::table::Table;

/// Zip local-file signature that every xlsx starts with.
const ZIP_MAGIC: &[u8; 2] = b"PK";

/// Real `.xlsx` workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookCodec;

fn is_csv_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

fn is_zip_container(path: &Path) -> Result<bool, TableError> {
    let mut file = std::fs::File::open(path).map_err(|e| TableError::io(path, e))?;
    let mut magic = [0u8; 2];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(&magic == ZIP_MAGIC),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(TableError::io(path, e)),
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// True when writing `value` as a number reads back as the same text.
fn is_canonical_number(value: &str) -> Option<f64> {
    let parsed: f64 = value.parse().ok()?;
    (parsed.is_finite() && parsed.to_string() == value).then_some(parsed)
}

impl TableCodec for WorkbookCodec {
    fn name(&self) -> &'static str {
        "workbook"
    }

    fn read(&self, path: &Path) -> Result<Table, TableError> {
        if is_csv_path(path) || !is_zip_container(path)? {
            return DelimitedCodec.read(path);
        }

        let mut workbook =
            open_workbook_auto(path).map_err(|e| TableError::workbook(path, e.to_string()))?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(|e| TableError::workbook(path, e.to_string()))?,
            None => return Ok(Table::default()),
        };

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Ok(Table::default());
        };
        let mut table = Table::new(header.iter().map(cell_text));
        for row in rows {
            let values: Vec<String> = row.iter().map(cell_text).collect();
            if values.iter().all(String::is_empty) {
                continue;
            }
            table.push_row(values);
        }
        Ok(table)
    }

    fn write(&self, table: &Table, path: &Path) -> Result<(), TableError> {
        if is_csv_path(path) {
            return DelimitedCodec.write(table, path);
        }

        let too_large = |message: &str| TableError::TooLarge {
            path: path.to_path_buf(),
            message: message.to_string(),
        };
        let xlsx = |e: rust_xlsxwriter::XlsxError| TableError::workbook(path, e.to_string());

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        for (col, name) in table.columns().iter().enumerate() {
            let col = u16::try_from(col).map_err(|_| too_large("column count"))?;
            sheet.write_string(0, col, name).map_err(xlsx)?;
        }
        for (row_index, row) in table.rows().iter().enumerate() {
            let row_num = u32::try_from(row_index + 1).map_err(|_| too_large("row count"))?;
            for (col, value) in row.iter().enumerate() {
                let col = u16::try_from(col).map_err(|_| too_large("column count"))?;
                match is_canonical_number(value) {
                    Some(number) => sheet.write_number(row_num, col, number).map_err(xlsx)?,
                    None => sheet.write_string(row_num, col, value).map_err(xlsx)?,
                };
            }
        }

        workbook.save(path).map_err(xlsx)?;
        Ok(())
    }
}
