//! Step-plugin pipeline.
//!
//! Steps are looked up by name in an explicit [`StepRegistry`], built with a
//! shared [`StepContext`], and executed one at a time by the [`Runner`].

pub mod audit;
pub mod error;
pub mod registry;
pub mod runner;
pub mod step;

pub use audit::{AUDIT_COLUMNS, AUDIT_LOG_FILE, append_step_log};
pub use error::{PipelineError, PipelineResult};
pub use registry::{StepFactory, StepRegistry};
pub use runner::{LOGS_FOLDER, Runner};
pub use step::{Step, StepContext, parse_params, planned};
