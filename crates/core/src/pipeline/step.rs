//! The step trait and the context every step is built with.

use std::collections::BTreeMap;

use closeflow_shared::{Period, PipelineConfig};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{PipelineError, PipelineResult};
use crate::contracts::{StepIO, ValidationResult};
use crate::io::{TableStore, expand};

/// A pipeline step.
///
/// Lifecycle: `plan_io` → `before` → `run` → `after`. A step reports
/// expected failures through `ValidationResult::ok`; an `Err` aborts the
/// whole pipeline.
pub trait Step {
    /// Registered name.
    fn name(&self) -> &'static str;

    /// Resolves the logical inputs and outputs.
    ///
    /// # Errors
    ///
    /// Returns an error when a required folder, naming key or parameter is
    /// missing.
    fn plan_io(&self) -> PipelineResult<StepIO>;

    /// Hook run before `run`.
    ///
    /// # Errors
    ///
    /// Implementations may abort the run.
    fn before(&self, _io: &StepIO) -> PipelineResult<()> {
        Ok(())
    }

    /// Executes the step.
    ///
    /// # Errors
    ///
    /// Returns an error for unexpected conditions (unreadable or unwritable
    /// files).
    fn run(&self, io: &StepIO) -> PipelineResult<ValidationResult>;

    /// Hook run after `run`.
    ///
    /// # Errors
    ///
    /// Implementations may abort the run.
    fn after(&self, _io: &StepIO, _result: &ValidationResult) -> PipelineResult<()> {
        Ok(())
    }
}

/// Pipeline-wide settings handed to each step.
#[derive(Debug, Clone)]
pub struct StepContext {
    /// Reporting period.
    pub period: Period,
    /// Reporting currency code.
    pub reporting_currency: String,
    /// Folder name → path.
    pub folders: BTreeMap<String, String>,
    /// Naming key → filename template.
    pub naming: BTreeMap<String, String>,
    /// Tabular backend.
    pub tables: TableStore,
}

impl StepContext {
    /// Builds a context from configuration.
    #[must_use]
    pub fn new(config: &PipelineConfig, period: Period, tables: TableStore) -> Self {
        Self {
            period,
            reporting_currency: config.reporting_currency.clone(),
            folders: config.folders.clone(),
            naming: config.naming.clone(),
            tables,
        }
    }

    /// Path of folder `key`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParams` naming `step` when the folder is not configured.
    pub fn folder(&self, step: &str, key: &str) -> PipelineResult<&str> {
        self.folders
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| PipelineError::invalid_params(step, format!("missing folders.{key}")))
    }

    /// Naming template for `key`, or `default`.
    #[must_use]
    pub fn naming_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.naming.get(key).map_or(default, String::as_str)
    }

    /// Variables available to path templates: every folder, every naming
    /// key, `period` and `reporting_currency`.
    #[must_use]
    pub fn template_vars(&self) -> BTreeMap<String, String> {
        let mut vars = self.naming.clone();
        vars.extend(self.folders.clone());
        vars.insert("period".to_string(), self.period.to_string());
        vars.insert(
            "reporting_currency".to_string(),
            self.reporting_currency.clone(),
        );
        vars
    }

    /// Expands a path template with [`Self::template_vars`].
    ///
    /// # Errors
    ///
    /// Returns an error for unknown placeholders or unbalanced braces.
    pub fn expand(&self, template: &str) -> PipelineResult<String> {
        Ok(expand(template, &self.template_vars())?)
    }

    /// Expands the naming template `key` (or `default`) into a file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be expanded.
    pub fn file_name(&self, key: &str, default: &str) -> PipelineResult<String> {
        self.expand(self.naming_or(key, default))
    }
}

/// Looks up a planned path by logical name.
///
/// # Errors
///
/// Returns `InvalidParams` naming `step` when the plan has no such entry.
pub fn planned<'a>(step: &str, paths: &'a BTreeMap<String, String>, name: &str) -> PipelineResult<&'a str> {
    paths
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| PipelineError::invalid_params(step, format!("no planned path for '{name}'")))
}

/// Deserializes step parameters; `null` is treated as an empty object.
///
/// # Errors
///
/// Returns `InvalidParams` naming `step` when the parameters do not match `T`.
pub fn parse_params<T: DeserializeOwned>(step: &str, params: &Value) -> PipelineResult<T> {
    let params = if params.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        params.clone()
    };
    serde_json::from_value(params)
        .map_err(|e| PipelineError::invalid_params(step, format!("invalid params: {e}")))
}
