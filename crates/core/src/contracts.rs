//! Contracts exchanged between the runner and its steps.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::io::file_hash;

/// Planned input and output paths of a step, keyed by logical name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepIO {
    /// Logical input name → path.
    pub inputs: BTreeMap<String, String>,
    /// Logical output name → path.
    pub outputs: BTreeMap<String, String>,
}

impl StepIO {
    /// Empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an input.
    #[must_use]
    pub fn with_input(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.inputs.insert(name.into(), path.into());
        self
    }

    /// Adds an output.
    #[must_use]
    pub fn with_output(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.outputs.insert(name.into(), path.into());
        self
    }

    /// Path of input `name`.
    #[must_use]
    pub fn input(&self, name: &str) -> Option<&str> {
        self.inputs.get(name).map(String::as_str)
    }

    /// Path of output `name`.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs.get(name).map(String::as_str)
    }
}

/// Outcome of one step execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the step succeeded.
    pub ok: bool,
    /// Human-readable messages, in order.
    pub messages: Vec<String>,
    /// Named metrics.
    pub metrics: BTreeMap<String, Value>,
}

impl ValidationResult {
    /// Successful result.
    #[must_use]
    pub fn success<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ok: true,
            messages: messages.into_iter().map(Into::into).collect(),
            metrics: BTreeMap::new(),
        }
    }

    /// Failed result.
    #[must_use]
    pub fn failure<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ok: false,
            ..Self::success(messages)
        }
    }

    /// Adds or replaces a metric.
    #[must_use]
    pub fn with_metric(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metrics.insert(name.into(), value.into());
        self
    }

    /// Replaces all metrics.
    #[must_use]
    pub fn with_metrics(mut self, metrics: BTreeMap<String, Value>) -> Self {
        self.metrics = metrics;
        self
    }
}

/// Step outcome recorded in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step returned `ok`.
    Ok,
    /// Step returned a failure.
    Error,
}

impl StepStatus {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record of one executed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepLog {
    /// Registered step name.
    pub step_name: String,
    /// Reporting period.
    pub period: String,
    /// Outcome.
    pub status: StepStatus,
    /// Messages from the result.
    pub messages: Vec<String>,
    /// Metrics from the result.
    pub metrics: BTreeMap<String, Value>,
    /// SHA-256 of each planned input that is a regular file.
    pub input_hashes: BTreeMap<String, String>,
    /// SHA-256 of each planned output that is a regular file.
    pub output_hashes: BTreeMap<String, String>,
}

impl StepLog {
    /// Builds a log from a finished step, hashing files that exist now.
    #[must_use]
    pub fn from_result(step_name: &str, period: &str, io: &StepIO, result: &ValidationResult) -> Self {
        Self {
            step_name: step_name.to_string(),
            period: period.to_string(),
            status: if result.ok {
                StepStatus::Ok
            } else {
                StepStatus::Error
            },
            messages: result.messages.clone(),
            metrics: result.metrics.clone(),
            input_hashes: hash_existing(&io.inputs),
            output_hashes: hash_existing(&io.outputs),
        }
    }

    /// True when the step succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == StepStatus::Ok
    }
}

fn hash_existing(paths: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    paths
        .iter()
        .filter(|(_, path)| Path::new(path).is_file())
        .filter_map(|(name, path)| match file_hash(path) {
            Ok(hash) => Some((name.clone(), hash)),
            Err(e) => {
                warn!(path = %path, error = %e, "Could not hash file");
                None
            }
        })
        .collect()
}
