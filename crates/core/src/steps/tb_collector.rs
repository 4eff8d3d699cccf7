//! Trial balance collection.
//!
//! Scans the TB folder for `TB_*_{period}.xlsx`, normalizes each file into
//! the canonical schema, validates it, and merges every row into the master
//! trial balance. The first non-conforming file fails the step and nothing
//! is written.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::contracts::{StepIO, ValidationResult};
use crate::io::Table;
use crate::ledger::{TrialBalanceRow, require_columns, rows_to_table, validate_table_balance};
use crate::normalization::{
    COLUMN_ALIASES, coerce_tb_types, infer_entity_from_filename, infer_period_from_filename,
    is_tb_file_for_period, resolve_columns, split_amount,
};
use crate::pipeline::{PipelineError, PipelineResult, Step, StepContext, parse_params, planned};
use crate::schema::{Schema, columns};

/// Registered step name.
pub const NAME: &str = "TBCollector";

/// Master file name when `naming.master_tb` is not configured.
pub const DEFAULT_MASTER_TB: &str = "Master_TB_{period}.xlsx";

const fn enabled() -> bool {
    true
}

/// TBCollector parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct TbCollectorParams {
    /// Columns every source file must provide after normalization.
    pub required_columns: Vec<String>,
    /// Reject files whose debits and credits differ.
    #[serde(default = "enabled")]
    pub enforce_balanced: bool,
    /// Allow fuzzy header matching.
    #[serde(default = "enabled")]
    pub fuzzy_match: bool,
}

/// Normalization telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CollectMetrics {
    files: usize,
    rows: usize,
    aliased_columns: usize,
    coerced_numeric_cells: usize,
    entity_inferred_from_filename: usize,
    period_inferred_from_filename: usize,
}

impl CollectMetrics {
    fn into_map(self) -> BTreeMap<String, Value> {
        [
            ("files", self.files),
            ("rows", self.rows),
            ("aliased_columns", self.aliased_columns),
            ("coerced_numeric_cells", self.coerced_numeric_cells),
            ("entity_inferred_from_filename", self.entity_inferred_from_filename),
            ("period_inferred_from_filename", self.period_inferred_from_filename),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), json!(value)))
        .collect()
    }
}

enum FileOutcome {
    Accepted(Vec<TrialBalanceRow>),
    Rejected(String),
}

/// Collects per-entity trial balances into the master trial balance.
#[derive(Debug, Clone)]
pub struct TbCollector {
    ctx: StepContext,
    params: TbCollectorParams,
}

/// Builds the step from raw parameters.
///
/// # Errors
///
/// Returns `InvalidParams` when `required_columns` is missing or malformed.
pub fn build(ctx: StepContext, params: &Value) -> PipelineResult<Box<dyn Step>> {
    Ok(Box::new(TbCollector::new(ctx, parse_params(NAME, params)?)))
}

impl TbCollector {
    /// Creates the step.
    #[must_use]
    pub fn new(ctx: StepContext, params: TbCollectorParams) -> Self {
        Self { ctx, params }
    }

    fn source_files(&self, folder: &Path) -> PipelineResult<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(folder) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(folder = %folder.display(), "TB folder does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(PipelineError::io(folder, e)),
        };

        let period = self.ctx.period.as_str();
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| PipelineError::io(folder, e))?.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| is_tb_file_for_period(name, period));
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn normalize_file(&self, path: &Path, metrics: &mut CollectMetrics) -> PipelineResult<FileOutcome> {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let mut table = self.ctx.tables.read(path)?;

        metrics.aliased_columns +=
            resolve_columns(&mut table, Schema::TrialBalance.columns(), COLUMN_ALIASES, self.params.fuzzy_match);
        metrics.coerced_numeric_cells += split_amount(&mut table);

        if is_blank_column(&table, columns::ENTITY_CODE)
            && let Some(entity) = infer_entity_from_filename(path)
        {
            fill(&mut table, columns::ENTITY_CODE, &entity);
            metrics.entity_inferred_from_filename += 1;
        }
        if is_blank_column(&table, columns::PERIOD)
            && let Some(period) = infer_period_from_filename(path)
        {
            fill(&mut table, columns::PERIOD, &period);
            metrics.period_inferred_from_filename += 1;
        }

        // Checked before coercion, which would add every canonical column.
        let missing = require_columns(&table, &self.params.required_columns);
        if !missing.is_empty() {
            return Ok(FileOutcome::Rejected(format!(
                "{name}: unresolved columns {missing:?}"
            )));
        }

        metrics.coerced_numeric_cells += coerce_tb_types(&mut table);

        if self.params.enforce_balanced
            && let Err(err) = validate_table_balance(&table)
        {
            debug!(file = %name, error = %err, "Rejected unbalanced trial balance");
            return Ok(FileOutcome::Rejected(format!("{name}: debits != credits")));
        }

        debug!(file = %name, rows = table.len(), "Normalized trial balance");
        Ok(FileOutcome::Accepted(TrialBalanceRow::from_table(&table)))
    }
}

fn is_blank_column(table: &Table, column: &str) -> bool {
    table
        .column_values(column)
        .is_none_or(|mut values| values.all(|v| v.trim().is_empty()))
}

fn fill(table: &mut Table, column: &str, value: &str) {
    let idx = table.ensure_column(column, "");
    table.fill_column(idx, value);
}

impl Step for TbCollector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn plan_io(&self) -> PipelineResult<StepIO> {
        let tb = self.ctx.folder(NAME, "tb")?;
        let master = self.ctx.file_name("master_tb", DEFAULT_MASTER_TB)?;
        Ok(StepIO::new()
            .with_input("tb_folder", tb)
            .with_output("master_tb", format!("{tb}/{master}")))
    }

    fn run(&self, io: &StepIO) -> PipelineResult<ValidationResult> {
        let folder = Path::new(planned(NAME, &io.inputs, "tb_folder")?);
        let master_path = planned(NAME, &io.outputs, "master_tb")?;

        let mut metrics = CollectMetrics::default();
        let mut rows = Vec::new();
        for path in self.source_files(folder)? {
            match self.normalize_file(&path, &mut metrics)? {
                FileOutcome::Accepted(file_rows) => {
                    metrics.files += 1;
                    metrics.rows += file_rows.len();
                    rows.extend(file_rows);
                }
                FileOutcome::Rejected(message) => {
                    return Ok(ValidationResult::failure([message]).with_metrics(metrics.into_map()));
                }
            }
        }

        self.ctx.tables.write(&rows_to_table(&rows), master_path)?;
        info!(path = master_path, rows = rows.len(), files = metrics.files, "Wrote master TB");

        Ok(ValidationResult::success([format!(
            "Master TB rows={} files={}",
            rows.len(),
            metrics.files
        )])
        .with_metrics(metrics.into_map()))
    }
}
