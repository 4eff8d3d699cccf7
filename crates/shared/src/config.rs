//! Pipeline configuration management.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::types::Period;

/// Environment prefix for configuration overrides (`CLOSEFLOW__PERIOD=202502`).
pub const ENV_PREFIX: &str = "CLOSEFLOW";

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Reporting period in `YYYYMM` form.
    pub period: String,
    /// Currency amounts are translated into.
    #[serde(default = "default_reporting_currency")]
    pub reporting_currency: String,
    /// Logical folder name to directory (`tb`, `fx`, `support`, `logs`, ...).
    #[serde(default)]
    pub folders: BTreeMap<String, String>,
    /// Logical artifact name to filename template (`master_tb`, `fx_rates`, ...).
    #[serde(default)]
    pub naming: BTreeMap<String, String>,
    /// Steps to execute, in order.
    #[serde(default)]
    pub pipeline: Vec<StepConfig>,
}

/// One configured pipeline step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Registered step name (e.g. `TBCollector`).
    pub step: String,
    /// Step-specific parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

fn default_reporting_currency() -> String {
    "USD".to_string()
}

impl PipelineConfig {
    /// Creates an empty configuration for `period`.
    #[must_use]
    pub fn new(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            reporting_currency: default_reporting_currency(),
            folders: BTreeMap::new(),
            naming: BTreeMap::new(),
            pipeline: Vec::new(),
        }
    }

    /// Loads configuration from a YAML, JSON or TOML file plus environment overrides.
    ///
    /// The format is inferred from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialized, or if the
    /// period is not a valid `YYYYMM` value.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AppError::NotFound(format!(
                "pipeline configuration {}",
                path.display()
            )));
        }

        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Parses configuration from an in-memory document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or the period is invalid.
    pub fn from_str_with_format(content: &str, format: config::FileFormat) -> AppResult<Self> {
        let loaded: Self = config::Config::builder()
            .add_source(config::File::from_str(content, format))
            .build()?
            .try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Checks invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed period or an unnamed step.
    pub fn validate(&self) -> AppResult<()> {
        Period::parse(&self.period)?;
        if let Some(index) = self.pipeline.iter().position(|s| s.step.trim().is_empty()) {
            return Err(AppError::Validation(format!(
                "pipeline entry {index} has an empty step name"
            )));
        }
        Ok(())
    }

    /// Returns the validated reporting period.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `period` is not `YYYYMM`.
    pub fn reporting_period(&self) -> AppResult<Period> {
        Ok(Period::parse(&self.period)?)
    }

    /// Adds a folder mapping.
    #[must_use]
    pub fn with_folder(mut self, key: impl Into<String>, path: impl Into<String>) -> Self {
        self.folders.insert(key.into(), path.into());
        self
    }

    /// Adds a naming template.
    #[must_use]
    pub fn with_naming(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.naming.insert(key.into(), template.into());
        self
    }

    /// Appends a step.
    #[must_use]
    pub fn with_step(mut self, step: impl Into<String>, params: serde_json::Value) -> Self {
        self.pipeline.push(StepConfig {
            step: step.into(),
            params,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r"
period: 202301
folders:
  tb: data/tb
  fx: data/fx
naming:
  master_tb: Master_TB_{period}.xlsx
pipeline:
  - step: TBCollector
    params:
      required_columns: [EntityCode, AccountCode, Debit, Credit]
      enforce_balanced: true
  - step: FXTranslator
";

    #[test]
    fn test_parse_yaml_document() {
        let cfg = PipelineConfig::from_str_with_format(YAML, config::FileFormat::Yaml).unwrap();
        assert_eq!(cfg.period, "202301");
        assert_eq!(cfg.reporting_currency, "USD");
        assert_eq!(cfg.folders["tb"], "data/tb");
        assert_eq!(cfg.pipeline.len(), 2);
        assert_eq!(cfg.pipeline[0].step, "TBCollector");
        assert_eq!(
            cfg.pipeline[0].params["required_columns"][1],
            serde_json::json!("AccountCode")
        );
        assert!(cfg.pipeline[1].params.is_null());
    }

    #[test]
    fn test_parse_json_document() {
        let json = r#"{"period": "202412", "reporting_currency": "EUR", "pipeline": []}"#;
        let cfg = PipelineConfig::from_str_with_format(json, config::FileFormat::Json).unwrap();
        assert_eq!(cfg.reporting_currency, "EUR");
        assert_eq!(cfg.reporting_period().unwrap().month(), 12);
    }

    #[test]
    fn test_invalid_period_rejected() {
        let json = r#"{"period": "2024-12"}"#;
        let err = PipelineConfig::from_str_with_format(json, config::FileFormat::Json).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_empty_step_name_rejected() {
        let cfg = PipelineConfig::new("202401").with_step("  ", serde_json::Value::Null);
        assert!(matches!(cfg.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(&path, YAML).unwrap();

        temp_env::with_var("CLOSEFLOW__REPORTING_CURRENCY", Some("GBP"), || {
            let cfg = PipelineConfig::load(&path).unwrap();
            assert_eq!(cfg.reporting_currency, "GBP");
            assert_eq!(cfg.naming["master_tb"], "Master_TB_{period}.xlsx");
        });
    }

    #[test]
    fn test_load_missing_file() {
        let err = PipelineConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
