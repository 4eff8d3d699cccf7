//! Append-only automation log.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tracing::debug;

use super::error::PipelineResult;
use crate::contracts::StepLog;
use crate::io::{Table, TableStore};

/// File name of the automation log inside the logs folder.
pub const AUDIT_LOG_FILE: &str = "Automation_Log.xlsx";

/// Audit log header.
pub const AUDIT_COLUMNS: [&str; 8] = [
    "StepName",
    "Period",
    "Status",
    "Messages",
    "Metrics",
    "InputHashes",
    "OutputHashes",
    "LoggedAt",
];

/// Appends one row for `log` to `<folder>/Automation_Log.xlsx`.
///
/// The file is created with a header when absent. Columns added to an
/// existing log by hand are kept (blank for new rows).
///
/// # Errors
///
/// Returns an error if the log cannot be read, encoded or written.
pub fn append_step_log(
    folder: impl AsRef<Path>,
    log: &StepLog,
    store: &TableStore,
) -> PipelineResult<PathBuf> {
    let path = folder.as_ref().join(AUDIT_LOG_FILE);
    let mut table = match store.read(&path) {
        Ok(table) => table,
        Err(e) if e.is_not_found() => Table::new(AUDIT_COLUMNS),
        Err(e) => return Err(e.into()),
    };

    let mut entry = Table::new(AUDIT_COLUMNS);
    entry.push_row(vec![
        log.step_name.clone(),
        log.period.clone(),
        log.status.to_string(),
        serde_json::to_string(&log.messages)?,
        serde_json::to_string(&log.metrics)?,
        serde_json::to_string(&log.input_hashes)?,
        serde_json::to_string(&log.output_hashes)?,
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    ]);
    for column in AUDIT_COLUMNS {
        table.ensure_column(column, "");
    }
    table.append(&entry);

    store.write(&table, &path)?;
    debug!(path = %path.display(), step = %log.step_name, "Appended automation log");
    Ok(path)
}
