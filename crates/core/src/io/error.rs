//! Tabular file error types.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while reading or writing tabular files.
#[derive(Debug, Error)]
pub enum TableError {
    /// The file does not exist.
    #[error("table file not found: {}", .path.display())]
    NotFound {
        /// Missing path.
        path: PathBuf,
    },

    /// Underlying filesystem failure.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    /// The delimited file could not be parsed or written.
    #[error("malformed delimited file {}: {message}", .path.display())]
    Delimited {
        /// Offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The workbook could not be parsed or written.
    #[error("workbook error in {}: {message}", .path.display())]
    Workbook {
        /// Offending file.
        path: PathBuf,
        /// Library message.
        message: String,
    },

    /// The table exceeds the limits of the target format.
    #[error("table too large for {}: {message}", .path.display())]
    TooLarge {
        /// Target file.
        path: PathBuf,
        /// Which limit was hit.
        message: String,
    },
}

impl TableError {
    /// Wraps an I/O error, mapping `NotFound` to the dedicated variant.
    #[must_use]
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Wraps a `csv` crate error.
    #[must_use]
    pub fn delimited(path: &Path, err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Self::io(path, source),
            other => Self::Delimited {
                path: path.to_path_buf(),
                message: format!("{other:?}"),
            },
        }
    }

    /// Creates a workbook error.
    #[must_use]
    pub fn workbook(path: &Path, message: impl Into<String>) -> Self {
        Self::Workbook {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Returns true if the error means the file is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_is_detected() {
        let err = TableError::io(
            Path::new("missing.xlsx"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "nope"),
        );
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "table file not found: missing.xlsx");
    }

    #[test]
    fn test_other_io_kept() {
        let err = TableError::io(
            Path::new("locked.xlsx"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_not_found());
        assert!(matches!(err, TableError::Io { .. }));
    }
}
