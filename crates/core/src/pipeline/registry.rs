//! Step registry: name → factory.

use std::collections::BTreeMap;

use serde_json::Value;

use super::error::{PipelineError, PipelineResult};
use super::step::{Step, StepContext};
use crate::steps;

/// Builds a step from the shared context and its raw parameters.
pub type StepFactory = fn(StepContext, &Value) -> PipelineResult<Box<dyn Step>>;

/// Explicit mapping from step names to factories, owned by the runner.
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    factories: BTreeMap<String, StepFactory>,
}

impl StepRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in step.
    #[must_use]
    pub fn with_builtin_steps() -> Self {
        let mut registry = Self::new();
        registry
            .register(steps::tb_collector::NAME, steps::tb_collector::build)
            .register(steps::fx_translator::NAME, steps::fx_translator::build)
            .register(steps::pdf_assembler::NAME, steps::pdf_assembler::build)
            .register(steps::engagement_letter::NAME, steps::engagement_letter::build);
        registry
    }

    /// Registers (or replaces) a factory.
    pub fn register(&mut self, name: impl Into<String>, factory: StepFactory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// True if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Builds the step registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStep` for unregistered names, or the factory's error.
    pub fn build(&self, name: &str, ctx: StepContext, params: &Value) -> PipelineResult<Box<dyn Step>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| PipelineError::UnknownStep {
                name: name.to_string(),
                registered: self.names().join(", "),
            })?;
        factory(ctx, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{StepIO, ValidationResult};
    use crate::io::TableStore;
    use closeflow_shared::PipelineConfig;

    struct Noop;

    impl Step for Noop {
        fn name(&self) -> &'static str {
            "Noop"
        }

        fn plan_io(&self) -> PipelineResult<StepIO> {
            Ok(StepIO::new())
        }

        fn run(&self, _io: &StepIO) -> PipelineResult<ValidationResult> {
            Ok(ValidationResult::success(["noop"]))
        }
    }

    fn build_noop(_ctx: StepContext, _params: &Value) -> PipelineResult<Box<dyn Step>> {
        Ok(Box::new(Noop))
    }

    fn context() -> StepContext {
        let config = PipelineConfig::new("202501");
        StepContext::new(&config, config.reporting_period().unwrap(), TableStore::delimited())
    }

    #[test]
    fn test_builtin_names() {
        let registry = StepRegistry::with_builtin_steps();
        assert_eq!(
            registry.names(),
            vec![
                "ClientEngagementLetterDraft",
                "FXTranslator",
                "PDFAssembler",
                "TBCollector"
            ]
        );
    }

    #[test]
    fn test_register_and_build() {
        let mut registry = StepRegistry::new();
        registry.register("Noop", build_noop);
        assert!(registry.contains("Noop"));

        let step = registry.build("Noop", context(), &Value::Null).unwrap();
        assert_eq!(step.name(), "Noop");
    }

    #[test]
    fn test_unknown_step_lists_registered() {
        let mut registry = StepRegistry::new();
        registry.register("B", build_noop).register("A", build_noop);

        let err = registry.build("C", context(), &Value::Null).err().unwrap();
        assert!(matches!(
            err,
            PipelineError::UnknownStep { ref registered, .. } if registered == "A, B"
        ));
    }
}
