//! In-memory tabular data.
//!
//! A `Table` is an ordered header plus rows of text cells. Every codec reads
//! into and writes from this shape, and normalization edits it in place
//! before rows are converted into typed records.

/// Ordered columns and rows of text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Borrowed view of one row, addressable by column name.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a [String],
    values: &'a [String],
}

impl Table {
    /// Creates an empty table with the given header.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from string slices; handy for fixtures.
    #[must_use]
    pub fn from_str_rows(columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Self::new(columns.iter().copied());
        for row in rows {
            table.push_row(row.iter().map(|v| (*v).to_string()).collect());
        }
        table
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` in the header (exact match).
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// True if the header contains `name`.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Appends a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// Renames the column at `index`.
    pub fn rename_column(&mut self, index: usize, name: impl Into<String>) {
        if let Some(column) = self.columns.get_mut(index) {
            *column = name.into();
        }
    }

    /// Returns the index of `name`, appending it filled with `fill` if absent.
    pub fn ensure_column(&mut self, name: &str, fill: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(fill.to_string());
        }
        self.columns.len() - 1
    }

    /// Value at (`row`, `column`), if both exist.
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| r[index].as_str())
    }

    /// Iterates the values of `column`, or `None` if it does not exist.
    pub fn column_values(&self, column: &str) -> Option<impl Iterator<Item = &str>> {
        let index = self.column_index(column)?;
        Some(self.rows.iter().map(move |r| r[index].as_str()))
    }

    /// Rewrites every cell of the column at `index`.
    pub fn map_column<F>(&mut self, index: usize, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(index) {
                *cell = f(cell);
            }
        }
    }

    /// Sets every cell of the column at `index` to `value`.
    pub fn fill_column(&mut self, index: usize, value: &str) {
        self.map_column(index, |_| value.to_string());
    }

    /// Iterates rows as name-addressable records.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(|values| Record {
            columns: &self.columns,
            values,
        })
    }

    /// Moves all rows of `other` into this table, matching columns by name.
    ///
    /// Columns missing from `other` are left blank; extra columns are dropped.
    pub fn append(&mut self, other: &Table) {
        let mapping: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|c| other.column_index(c))
            .collect();
        for row in &other.rows {
            let projected = mapping
                .iter()
                .map(|source| source.map(|i| row[i].clone()).unwrap_or_default())
                .collect();
            self.rows.push(projected);
        }
    }
}

impl<'a> Record<'a> {
    /// Value of `column`, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i].as_str())
    }

    /// Value of `column`, or the empty string.
    #[must_use]
    pub fn get_or_empty(&self, column: &str) -> &'a str {
        self.get(column).unwrap_or("")
    }

    /// Cell values in column order.
    #[must_use]
    pub fn values(&self) -> &'a [String] {
        self.values
    }

    /// `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}
