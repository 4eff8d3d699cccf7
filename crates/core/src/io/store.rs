//! Tabular backend selection.
//!
//! Steps never talk to a codec directly: they go through a `TableStore`,
//! which wraps whichever backend was chosen at startup.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::delimited::DelimitedCodec;
use super::error::TableError;
use super::table::Table;

/// A tabular file format.
pub trait TableCodec: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Reads the first sheet (or the whole file) as a table; first row is the header.
    fn read(&self, path: &Path) -> Result<Table, TableError>;

    /// Writes `table` to `path`, replacing any existing file.
    fn write(&self, table: &Table, path: &Path) -> Result<(), TableError>;
}

/// Shared handle to the active tabular backend.
#[derive(Clone)]
pub struct TableStore {
    codec: Arc<dyn TableCodec>,
}

impl TableStore {
    /// Wraps an explicit codec.
    #[must_use]
    pub fn new(codec: Arc<dyn TableCodec>) -> Self {
        Self { codec }
    }

    /// Selects the best backend compiled into this build.
    ///
    /// Real workbooks when the `xlsx` feature is enabled, CSV otherwise.
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(feature = "xlsx")]
        let store = Self::new(Arc::new(super::workbook::WorkbookCodec));
        #[cfg(not(feature = "xlsx"))]
        let store = Self::delimited();

        debug!(backend = store.backend(), "Selected table backend");
        store
    }

    /// CSV backend regardless of build features.
    #[must_use]
    pub fn delimited() -> Self {
        Self::new(Arc::new(DelimitedCodec))
    }

    /// Name of the active backend.
    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.codec.name()
    }

    /// Reads a table.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Table, TableError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TableError::NotFound {
                path: path.to_path_buf(),
            });
        }
        self.codec.read(path)
    }

    /// Writes a table, creating parent directories as needed.
    pub fn write(&self, table: &Table, path: impl AsRef<Path>) -> Result<(), TableError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TableError::io(parent, e))?;
        }
        self.codec.write(table, path)?;
        debug!(path = %path.display(), rows = table.len(), "Wrote table");
        Ok(())
    }
}

impl Default for TableStore {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Debug for TableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableStore")
            .field("backend", &self.backend())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimited_store_round_trip_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("table.xlsx");
        let table = Table::from_str_rows(&["A", "B"], &[&["1", "2"], &["3", "x y"]]);

        let store = TableStore::delimited();
        store.write(&table, &path).unwrap();
        assert_eq!(store.read(&path).unwrap(), table);
        assert_eq!(store.backend(), "delimited");
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let err = TableStore::delimited()
            .read("/no/such/table.xlsx")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_debug_shows_backend() {
        let rendered = format!("{:?}", TableStore::delimited());
        assert!(rendered.contains("delimited"));
    }
}
