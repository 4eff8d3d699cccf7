//! Close pipeline for Closeflow.
//!
//! A month-end close is a configured sequence of steps. Each step plans
//! the files it reads and writes, runs, and reports a validation result
//! that the runner records in an audit workbook.
//!
//! # Modules
//!
//! - `pipeline` - Step trait, registry, runner and audit log
//! - `steps` - Built-in steps (TB collection, FX translation, support
//!   packages, engagement letters)
//! - `normalization` - Column aliasing and type coercion for source files
//! - `ledger` - Trial balance rows and balance checks
//! - `currency` - FX rates and translation into the reporting currency
//! - `io` - Tabular files, path templates and content hashing
//! - `contracts` - Data exchanged between steps and the runner

pub mod contracts;
pub mod currency;
pub mod io;
pub mod ledger;
pub mod normalization;
pub mod pipeline;
pub mod schema;
pub mod steps;

pub use contracts::{StepIO, StepLog, StepStatus, ValidationResult};
pub use io::{Table, TableStore};
pub use pipeline::{PipelineError, PipelineResult, Runner, Step, StepContext, StepRegistry};
