//! Currency translation of the master trial balance.
//!
//! Every row is translated with its currency's rate; one missing rate fails
//! the whole step before anything is written.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::contracts::{StepIO, ValidationResult};
use crate::currency::{RateError, Translation};
use crate::io::Table;
use crate::ledger::TrialBalanceRow;
use crate::normalization::load_fx_rates;
use crate::pipeline::{PipelineError, PipelineResult, Step, StepContext, parse_params, planned};
use crate::schema::{Schema, TRANSLATION_COLUMNS, columns};

use super::tb_collector::DEFAULT_MASTER_TB;

/// Registered step name.
pub const NAME: &str = "FXTranslator";

/// Rate file name when `naming.fx_rates` is not configured.
pub const DEFAULT_FX_RATES: &str = "FX_Rates_{period}.xlsx";

/// Adjustment extract name when `naming.fx_adjustments` is not configured.
pub const DEFAULT_FX_ADJUSTMENTS: &str = "FX_Adjustments_{period}.xlsx";

/// The only supported rate source.
pub const FILE_SOURCE: &str = "file";

fn default_fx_source() -> String {
    FILE_SOURCE.to_string()
}

fn default_tolerance() -> Value {
    json!(5)
}

/// FXTranslator parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct FxTranslatorParams {
    /// Where rates come from.
    #[serde(default = "default_fx_source")]
    pub fx_source: String,
    /// Recorded in metrics.
    #[serde(default = "default_tolerance")]
    pub tolerance: Value,
}

/// Translates the master trial balance into the reporting currency.
#[derive(Debug, Clone)]
pub struct FxTranslator {
    ctx: StepContext,
    params: FxTranslatorParams,
}

/// Builds the step from raw parameters.
///
/// # Errors
///
/// Returns `InvalidParams` for malformed parameters or a rate source other
/// than `"file"`.
pub fn build(ctx: StepContext, params: &Value) -> PipelineResult<Box<dyn Step>> {
    let params: FxTranslatorParams = parse_params(NAME, params)?;
    if params.fx_source != FILE_SOURCE {
        return Err(PipelineError::invalid_params(
            NAME,
            format!("unsupported fx_source '{}'; only 'file' is supported", params.fx_source),
        ));
    }
    Ok(Box::new(FxTranslator::new(ctx, params)))
}

/// `{dir}/{stem}_Adjusted.{ext}` for a master file name.
fn adjusted_name(master: &str) -> String {
    let path = Path::new(master);
    let stem = path
        .file_stem()
        .map_or_else(|| master.to_string(), |s| s.to_string_lossy().into_owned());
    match path.extension() {
        Some(ext) => format!("{stem}_Adjusted.{}", ext.to_string_lossy()),
        None => format!("{stem}_Adjusted"),
    }
}

impl FxTranslator {
    /// Creates the step.
    #[must_use]
    pub fn new(ctx: StepContext, params: FxTranslatorParams) -> Self {
        Self { ctx, params }
    }
}

impl Step for FxTranslator {
    fn name(&self) -> &'static str {
        NAME
    }

    fn plan_io(&self) -> PipelineResult<StepIO> {
        let tb = self.ctx.folder(NAME, "tb")?;
        let fx = self.ctx.folder(NAME, "fx")?;
        let master = self.ctx.file_name("master_tb", DEFAULT_MASTER_TB)?;
        let rates = self.ctx.file_name("fx_rates", DEFAULT_FX_RATES)?;
        let adjustments = self.ctx.file_name("fx_adjustments", DEFAULT_FX_ADJUSTMENTS)?;

        Ok(StepIO::new()
            .with_input("master_tb", format!("{tb}/{master}"))
            .with_input("fx_rates", format!("{fx}/{rates}"))
            .with_output("adjusted_tb", format!("{tb}/{}", adjusted_name(&master)))
            .with_output("fx_adjustments", format!("{fx}/{adjustments}")))
    }

    fn run(&self, io: &StepIO) -> PipelineResult<ValidationResult> {
        let master_path = planned(NAME, &io.inputs, "master_tb")?;
        let rates_path = planned(NAME, &io.inputs, "fx_rates")?;
        let adjusted_path = planned(NAME, &io.outputs, "adjusted_tb")?;
        let adjustments_path = planned(NAME, &io.outputs, "fx_adjustments")?;

        let mut tb = match self.ctx.tables.read(master_path) {
            Ok(table) => table,
            Err(e) if e.is_not_found() => {
                return Ok(ValidationResult::failure([format!(
                    "Master TB not found: {master_path}"
                )]));
            }
            Err(e) => return Err(e.into()),
        };

        let rates = match load_fx_rates(rates_path, &self.ctx.tables) {
            Ok(rates) => rates,
            Err(e) if e.is_not_found() => {
                return Ok(ValidationResult::failure([format!(
                    "FX rates file not found: {rates_path}"
                )]));
            }
            Err(e @ RateError::MissingColumns { .. }) => {
                return Ok(ValidationResult::failure([e.to_string()]));
            }
            Err(RateError::Table(e)) => return Err(e.into()),
        };

        if !tb.is_empty() && !tb.has_column(columns::CURRENCY_CODE) {
            return Ok(ValidationResult::failure(["Missing CurrencyCode in TB"]));
        }

        let rows = TrialBalanceRow::from_table(&tb);
        let missing = rates.missing(rows.iter().map(|r| r.currency_code.as_str()));
        if !missing.is_empty() {
            return Ok(ValidationResult::failure([format!(
                "Missing FX rates for: {missing:?}"
            )]));
        }

        let translations: Vec<Translation> = rows
            .iter()
            .filter_map(|row| Translation::for_row(row, &rates))
            .collect();

        let mut adjustments = Table::new(Schema::FxAdjustments.columns().iter().copied());
        for (row, t) in rows.iter().zip(&translations) {
            adjustments.push_row(vec![
                row.entity_code.clone(),
                row.account_code.clone(),
                t.local_amount.normalize().to_string(),
                t.rate.to_string(),
                t.reporting_amount.to_string(),
                self.ctx.period.to_string(),
            ]);
        }

        let appended: Vec<usize> = TRANSLATION_COLUMNS
            .iter()
            .map(|column| tb.ensure_column(column, ""))
            .collect();
        let mut cells = translations.iter().map(|t| {
            [
                t.rate.to_string(),
                t.local_amount.normalize().to_string(),
                t.reporting_amount.to_string(),
            ]
        });
        let mut translated_rows = Table::new(tb.columns().iter().cloned());
        for row in tb.rows() {
            let mut row = row.clone();
            if let Some(values) = cells.next() {
                for (idx, value) in appended.iter().zip(values) {
                    row[*idx] = value;
                }
            }
            translated_rows.push_row(row);
        }

        self.ctx.tables.write(&translated_rows, adjusted_path)?;
        self.ctx.tables.write(&adjustments, adjustments_path)?;
        info!(rows = rows.len(), path = adjusted_path, "Applied FX translation");

        Ok(
            ValidationResult::success([format!("Applied FX to {} rows", rows.len())])
                .with_metric("rows", rows.len())
                .with_metric("tolerance", self.params.tolerance.clone())
                .with_metric("reporting_currency", self.ctx.reporting_currency.clone()),
        )
    }
}
