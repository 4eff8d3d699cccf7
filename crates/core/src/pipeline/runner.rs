//! Sequential pipeline runner.

use closeflow_shared::PipelineConfig;
use tracing::{info, info_span, warn};

use super::audit::append_step_log;
use super::error::PipelineResult;
use super::registry::StepRegistry;
use super::step::StepContext;
use crate::contracts::StepLog;
use crate::io::TableStore;

/// Folder key that enables the automation log.
pub const LOGS_FOLDER: &str = "logs";

/// Runs configured steps in order and collects their logs.
#[derive(Debug, Clone)]
pub struct Runner {
    registry: StepRegistry,
    tables: TableStore,
}

impl Runner {
    /// Runner over an explicit registry.
    #[must_use]
    pub fn new(registry: StepRegistry, tables: TableStore) -> Self {
        Self { registry, tables }
    }

    /// Runner with every built-in step registered.
    #[must_use]
    pub fn with_builtin_steps(tables: TableStore) -> Self {
        Self::new(StepRegistry::with_builtin_steps(), tables)
    }

    /// Executes the pipeline.
    ///
    /// Each step goes through `plan_io → before → run → after` and yields one
    /// [`StepLog`]. The run stops after the first step that reports a failure;
    /// its log is included and later steps are skipped. When `folders.logs`
    /// is configured every log is also appended to the automation log.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid configuration, unknown steps, bad
    /// parameters, or unexpected I/O failures inside a step.
    pub fn run(&self, config: &PipelineConfig) -> PipelineResult<Vec<StepLog>> {
        config.validate()?;
        let period = config.reporting_period()?;
        let audit_folder = config.folders.get(LOGS_FOLDER);

        info!(
            period = %period,
            steps = config.pipeline.len(),
            backend = self.tables.backend(),
            "Starting pipeline"
        );

        let mut logs = Vec::with_capacity(config.pipeline.len());
        for entry in &config.pipeline {
            let span = info_span!("step", step = %entry.step, period = %period);
            let _guard = span.enter();

            let ctx = StepContext::new(config, period.clone(), self.tables.clone());
            let step = self.registry.build(&entry.step, ctx, &entry.params)?;

            let io = step.plan_io()?;
            step.before(&io)?;
            let result = step.run(&io)?;
            step.after(&io, &result)?;

            let log = StepLog::from_result(&entry.step, period.as_str(), &io, &result);
            if log.is_ok() {
                info!(messages = ?log.messages, "Step succeeded");
            } else {
                warn!(messages = ?log.messages, "Step failed");
            }
            if let Some(folder) = audit_folder {
                append_step_log(folder, &log, &self.tables)?;
            }

            let ok = log.is_ok();
            logs.push(log);
            if !ok {
                warn!("Halting pipeline after failed step");
                break;
            }
        }

        info!(executed = logs.len(), "Pipeline finished");
        Ok(logs)
    }
}
